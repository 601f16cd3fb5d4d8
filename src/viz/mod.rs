//! Visualization: lay out stacked waterfalls and render them to **SVG** or **PNG**.
//!
//! - One [`Figure`] holds any number of laid-out waterfalls sharing one pair of axes,
//!   which is how waterfalls are chained side by side
//! - Dashed stair-step connectors, optional total bar and shaded span
//! - Tick names, bracket group labels and a corner legend
//! - Locale-aware y tick labels (`30,000` vs `30.000`)

pub mod layout;
pub mod legend;
pub mod text;
pub mod types;
pub mod util;

// Re-export types for public API
pub use layout::{WaterfallLayout, bracket_geometry, layout_waterfall};
pub use types::{
    BarStyle, BracketLineStyle, BracketStyle, LegendPosition, LegendStyle, LinkStyle,
    RenderOptions,
};

use anyhow::{Result, anyhow, bail};
use log::debug;

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::Path;
use std::sync::Once;

use layout::LegendEntry;
use legend::draw_legend_box;
use text::{line_height_px, wrap_text_to_width, wrapped_height_px};
use util::{compute_left_label_area_px, format_value};

/// One-time registration for a fallback "sans-serif" font when using the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    // Safe to call many times; only runs once.
    INIT_FONTS.call_once(|| {
        // From `src/viz/mod.rs` → project root → `assets/DejaVuSans.ttf`
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
    });
}

const MARGIN: i32 = 16;
const TICK_FONT_PX: u32 = 12;
const Y_LABELS: usize = 8;
/// Space between the x axis and the first line of a tick name.
const TICK_PAD_PX: i32 = 6;
/// Length of the x axis tick marks drawn under numeric labels.
const X_TICK_MARK_PX: i32 = 5;

/// A drawing surface for one or more waterfalls.
#[derive(Debug, Clone)]
pub struct Figure {
    layouts: Vec<WaterfallLayout>,
    width: u32,
    height: u32,
    title: Option<String>,
    y_desc: Option<String>,
}

impl Default for Figure {
    /// 800 × 500 px.
    fn default() -> Self {
        Self::new(800, 500)
    }
}

impl Figure {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            layouts: Vec::new(),
            width,
            height,
            title: None,
            y_desc: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into()).filter(|t: &String| !t.trim().is_empty());
        self
    }

    pub fn with_y_desc(mut self, desc: impl Into<String>) -> Self {
        self.y_desc = Some(desc.into()).filter(|d: &String| !d.trim().is_empty());
        self
    }

    pub fn push(&mut self, layout: WaterfallLayout) -> &mut Self {
        self.layouts.push(layout);
        self
    }

    pub fn layouts(&self) -> &[WaterfallLayout] {
        &self.layouts
    }

    /// Horizontal data range covering every waterfall.
    pub fn x_range(&self) -> Option<(f64, f64)> {
        self.layouts
            .iter()
            .map(WaterfallLayout::x_extent)
            .reduce(|(a0, a1), (b0, b1)| (a0.min(b0), a1.max(b1)))
    }

    /// Vertical data range covering every bar, with 5 % headroom.
    pub fn y_range(&self) -> Option<(f64, f64)> {
        let (lo, hi) = self
            .layouts
            .iter()
            .map(WaterfallLayout::y_extent)
            .reduce(|(a0, a1), (b0, b1)| (a0.min(b0), a1.max(b1)))?;
        if hi - lo <= f64::EPSILON {
            // all-zero data
            return Some((lo, lo + 1.0));
        }
        let span = hi - lo;
        let lo = if lo < 0.0 { lo - 0.05 * span } else { lo };
        Some((lo, hi + 0.05 * span))
    }

    /// Render to `out_path`: `.svg` → SVG, anything else → PNG.
    pub fn save<P: AsRef<Path>>(&self, out_path: P) -> Result<()> {
        ensure_fonts_registered();
        let out_path = out_path.as_ref();
        let path_string = out_path.to_string_lossy().into_owned();

        if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
            let root =
                SVGBackend::new(path_string.as_str(), (self.width, self.height)).into_drawing_area();
            self.draw_on(&root)?;
            root.present().map_err(|e| anyhow!("{:?}", e))?;
        } else {
            let root = BitMapBackend::new(path_string.as_str(), (self.width, self.height))
                .into_drawing_area();
            self.draw_on(&root)?;
            root.present().map_err(|e| anyhow!("{:?}", e))?;
        }
        debug!("rendered {} waterfall(s) to {}", self.layouts.len(), path_string);
        Ok(())
    }

    /// Draw every waterfall on any Plotters drawing area.
    pub fn draw_on<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        ensure_fonts_registered();
        let (Some((x_min, x_max)), Some((y_min, y_max))) = (self.x_range(), self.y_range()) else {
            bail!("nothing to draw: figure has no waterfalls");
        };
        let locale = self.layouts[0].locale.as_str();

        root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

        // ----------------------------
        // 1) Gutters
        // ----------------------------
        let left_px = compute_left_label_area_px(y_min, y_max, Y_LABELS, TICK_FONT_PX, locale);
        let (root_w, root_h) = root.dim_in_pixel();
        let plot_w_px = (root_w as i32 - 2 * MARGIN - left_px as i32).max(40);
        let px_per_unit = plot_w_px as f64 / (x_max - x_min);

        let named = self.layouts.iter().any(|l| !l.ticks.is_empty());
        let tick_block_px = if named {
            self.layouts
                .iter()
                .flat_map(|l| {
                    let max_px = name_width_px(l, px_per_unit);
                    l.ticks
                        .iter()
                        .map(move |t| wrapped_height_px(&t.name, TICK_FONT_PX, max_px))
                })
                .max()
                .unwrap_or_else(|| line_height_px(TICK_FONT_PX))
        } else {
            line_height_px(TICK_FONT_PX)
        };
        let bracket_px = self
            .layouts
            .iter()
            .filter_map(|l| l.group_label.as_ref())
            .map(|g| (0.07 * root_h as f64).ceil() as i32 + line_height_px(g.line.font_size))
            .max()
            .unwrap_or(0);
        let bottom_px = X_TICK_MARK_PX + TICK_PAD_PX + tick_block_px + bracket_px + 12;

        // ----------------------------
        // 2) Chart & mesh
        // ----------------------------
        let mut builder = ChartBuilder::on(root);
        builder
            .margin(MARGIN as u32)
            .set_label_area_size(LabelAreaPosition::Left, left_px)
            .set_label_area_size(LabelAreaPosition::Bottom, bottom_px as u32);
        if let Some(title) = &self.title {
            builder.caption(title.as_str(), (FontFamily::SansSerif, 22));
        }
        let mut chart = builder
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(|e| anyhow!("{:?}", e))?;

        let y_label_fmt = |v: &f64| format_value(*v, locale);
        let x_label_fmt = |v: &f64| format_value(*v, locale);
        let mut mesh = chart.configure_mesh();
        mesh.disable_x_mesh()
            .set_tick_mark_size(LabelAreaPosition::Bottom, X_TICK_MARK_PX)
            .x_labels(if named { 0 } else { 8 })
            .y_labels(Y_LABELS)
            .x_label_formatter(&x_label_fmt)
            .y_label_formatter(&y_label_fmt)
            .label_style((FontFamily::SansSerif, TICK_FONT_PX))
            .axis_desc_style((FontFamily::SansSerif, 14));
        if let Some(desc) = &self.y_desc {
            mesh.y_desc(desc.as_str());
        }
        mesh.draw().map_err(|e| anyhow!("{:?}", e))?;

        // ----------------------------
        // 3) Shade, links, bars (back to front)
        // ----------------------------
        for l in &self.layouts {
            if let Some(shade) = &l.shade {
                chart
                    .draw_series(std::iter::once(Rectangle::new(
                        [(shade.start, y_min), (shade.end, y_max)],
                        shade.color.to_plotters().mix(0.1).filled(),
                    )))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
        }
        for l in &self.layouts {
            let link_style = l.links.color.to_plotters().stroke_width(l.links.width);
            let mut lines = l.connector_segments();
            if let Some(reference) = l.reference_line {
                lines.push(reference.to_vec());
            }
            for line in lines {
                chart
                    .draw_series(DashedLineSeries::new(
                        line,
                        l.links.dash,
                        l.links.spacing,
                        link_style,
                    ))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
        }
        for l in &self.layouts {
            for bar in l.visible_bars() {
                let fill = bar.fill.to_plotters().mix(l.bar_style.opacity);
                chart
                    .draw_series(std::iter::once(Rectangle::new(bar.corners(), fill.filled())))
                    .map_err(|e| anyhow!("{:?}", e))?;
                if l.bar_style.line_width > 0 && !bar.edge.is_transparent() {
                    let edge = bar.edge.to_plotters().stroke_width(l.bar_style.line_width);
                    chart
                        .draw_series(std::iter::once(Rectangle::new(bar.corners(), edge)))
                        .map_err(|e| anyhow!("{:?}", e))?;
                }
            }
        }

        // ----------------------------
        // 4) Tick names & brackets (pixel space on the root area)
        // ----------------------------
        let base = root.get_base_pixel();
        let to_area = |(x, y): (i32, i32)| (x - base.0, y - base.1);
        let (x_px, y_px) = chart.plotting_area().get_pixel_range();
        let plot_h = (y_px.end - y_px.start).max(1) as f64;
        let axis_y = chart.backend_coord(&(x_min, y_min)).1;

        let tick_style: TextStyle = TextStyle::from((FontFamily::SansSerif, TICK_FONT_PX))
            .pos(Pos::new(HPos::Center, VPos::Top));
        for l in &self.layouts {
            let max_px = name_width_px(l, px_per_unit);
            for tick in &l.ticks {
                let (px, _) = chart.backend_coord(&(tick.x, y_min));
                for (i, line) in wrap_text_to_width(&tick.name, TICK_FONT_PX, max_px)
                    .iter()
                    .enumerate()
                {
                    let y = axis_y + TICK_PAD_PX + i as i32 * line_height_px(TICK_FONT_PX);
                    root.draw(&Text::new(line.as_str(), to_area((px, y)), tick_style.clone()))
                        .map_err(|e| anyhow!("{:?}", e))?;
                }
            }
        }

        // Depth of the tallest tick label (named or numeric), in axes fractions.
        let label_depth = if named {
            (TICK_PAD_PX + tick_block_px) as f64 / plot_h
        } else {
            (X_TICK_MARK_PX + TICK_PAD_PX + line_height_px(TICK_FONT_PX)) as f64 / plot_h
        };
        // Mixed coordinates: x in data units, y as a fraction of the plot height.
        let mixed = |(x, frac): (f64, f64)| {
            let px = chart.backend_coord(&(x, y_min)).0;
            to_area((px, axis_y - (frac * plot_h).round() as i32))
        };
        for l in &self.layouts {
            let Some(group) = &l.group_label else {
                continue;
            };
            let geometry = bracket_geometry(group, label_depth);
            let stroke = group.line.color.to_plotters().stroke_width(group.line.width);
            for [a, b] in &geometry.segments {
                root.draw(&PathElement::new(vec![mixed(*a), mixed(*b)], stroke))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
            let label_style: TextStyle =
                TextStyle::from((FontFamily::SansSerif, group.line.font_size))
                    .pos(Pos::new(HPos::Center, VPos::Top));
            root.draw(&Text::new(
                group.text.as_str(),
                mixed(geometry.label_anchor),
                label_style,
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
        }

        // ----------------------------
        // 5) Legend
        // ----------------------------
        let entries: Vec<LegendEntry> = self
            .layouts
            .iter()
            .filter(|l| l.show_legend)
            .flat_map(|l| l.legend.iter().cloned())
            .collect();
        if let Some(first) = self.layouts.iter().find(|l| l.show_legend) {
            let plot_rect = (
                to_area((x_px.start, y_px.start)),
                to_area((x_px.end, y_px.end)),
            );
            draw_legend_box(root, plot_rect, &entries, &first.legend_style)?;
        }

        Ok(())
    }
}

/// Widest a tick name may be: one bar pitch in pixels.
fn name_width_px(layout: &WaterfallLayout, px_per_unit: f64) -> u32 {
    ((layout.bar_width + layout.gap) * px_per_unit).floor().max(24.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WaterfallChart;

    #[test]
    fn ranges_cover_all_layouts() {
        let a = WaterfallChart::new(vec![vec![1.0], vec![2.0]])
            .layout(&RenderOptions::default())
            .unwrap();
        let b = WaterfallChart::new(vec![vec![-4.0]])
            .layout(&RenderOptions {
                xstart: 2.0,
                ..RenderOptions::default()
            })
            .unwrap();
        let mut fig = Figure::default();
        fig.push(a).push(b);
        let (x0, x1) = fig.x_range().unwrap();
        assert!((x0 + 0.3).abs() < 1e-9);
        assert!((x1 - 2.3).abs() < 1e-9);
        let (y0, y1) = fig.y_range().unwrap();
        assert!(y0 < -4.0 && y1 > 3.0);
    }

    #[test]
    fn all_zero_data_still_has_height() {
        let l = WaterfallChart::new(vec![vec![0.0]])
            .layout(&RenderOptions::default())
            .unwrap();
        let mut fig = Figure::default();
        fig.push(l);
        let (y0, y1) = fig.y_range().unwrap();
        assert!(y1 > y0);
    }

    #[test]
    fn empty_figure_is_error() {
        let tmp = std::env::temp_dir().join("swf_empty_figure.svg");
        assert!(Figure::default().save(&tmp).is_err());
    }
}
