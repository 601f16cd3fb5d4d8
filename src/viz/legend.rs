//! Legend box drawn in a corner of the plot area.

use anyhow::Result;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::layout::LegendEntry;
use super::text::{estimate_text_width_px, line_height_px};
use super::types::{LegendPosition, LegendStyle};

// Layout constants (shared by size estimate and drawing)
const PAD: i32 = 6;
const SWATCH: i32 = 10;
const SWATCH_TO_TEXT: i32 = 8;
const ROW_GAP: i32 = 3;
const INSET: i32 = 8;

/// Pixel size `(w, h)` of the legend box for these entries.
pub fn legend_box_size(items: &[LegendEntry], font_px: u32) -> (i32, i32) {
    let text_w = items
        .iter()
        .map(|e| estimate_text_width_px(&e.label, font_px) as i32)
        .max()
        .unwrap_or(0);
    let row_h = line_height_px(font_px).max(SWATCH);
    let n = items.len() as i32;
    let w = PAD + SWATCH + SWATCH_TO_TEXT + text_w + PAD;
    let h = 2 * PAD + n * row_h + (n - 1).max(0) * ROW_GAP;
    (w, h)
}

/// Top-left corner of the legend box inside `plot` (`(left, top), (right, bottom)`).
pub fn legend_origin(
    plot: ((i32, i32), (i32, i32)),
    size: (i32, i32),
    position: LegendPosition,
) -> (i32, i32) {
    let ((left, top), (right, bottom)) = plot;
    let (w, h) = size;
    match position {
        LegendPosition::UpperLeft => (left + INSET, top + INSET),
        LegendPosition::UpperRight => (right - INSET - w, top + INSET),
        LegendPosition::LowerLeft => (left + INSET, bottom - INSET - h),
        LegendPosition::LowerRight => (right - INSET - w, bottom - INSET - h),
    }
}

/// Draw the legend: translucent white box, thin border, one swatch + label per row.
pub fn draw_legend_box<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    plot: ((i32, i32), (i32, i32)),
    items: &[LegendEntry],
    style: &LegendStyle,
) -> Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    let font_px = style.font_size;
    let size = legend_box_size(items, font_px);
    let (x0, y0) = legend_origin(plot, size, style.position);
    let (x1, y1) = (x0 + size.0, y0 + size.1);

    area.draw(&Rectangle::new([(x0, y0), (x1, y1)], WHITE.mix(0.85).filled()))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    area.draw(&Rectangle::new([(x0, y0), (x1, y1)], BLACK.stroke_width(1)))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;

    let label_style: TextStyle =
        TextStyle::from((FontFamily::SansSerif, font_px)).pos(Pos::new(HPos::Left, VPos::Center));
    let row_h = line_height_px(font_px).max(SWATCH);

    let mut y = y0 + PAD;
    for entry in items {
        let center_y = y + row_h / 2;
        let sx = x0 + PAD;
        area.draw(&Rectangle::new(
            [(sx, center_y - SWATCH / 2), (sx + SWATCH, center_y + SWATCH / 2)],
            entry.color.to_plotters().filled(),
        ))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        area.draw(&Text::new(
            entry.label.as_str(),
            (sx + SWATCH + SWATCH_TO_TEXT, center_y),
            label_style.clone(),
        ))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        y += row_h + ROW_GAP;
    }
    Ok(())
}
