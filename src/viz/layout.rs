//! Geometry of one waterfall in data coordinates.
//!
//! [`layout_waterfall`] turns the prepared table, labels and colors into an
//! immutable [`WaterfallLayout`]: bar rectangles, the dashed stair-step
//! connectors, the reference line to the total bar, the shaded span, tick
//! names and legend entries. Nothing here touches a drawing backend, so a
//! layout can be inspected, combined with others on one [`Figure`](super::Figure)
//! and rendered any number of times.
//!
//! The bracket under the x axis is the only piece that depends on rendered
//! text; [`bracket_geometry`] takes the measured tick label depth and returns
//! segments in mixed coordinates (x in data units, y in fractions of the plot
//! height, negative below the axis).

use log::debug;

use crate::error::WaterfallError;
use crate::palette::palette;
use crate::style::Rgba;
use crate::table::WaterfallTable;

use super::types::{BarStyle, BracketLineStyle, BracketStyle, LegendStyle, LinkStyle, RenderOptions};

/// Height of bracket end/center ticks, in axes fractions.
pub const BRACKET_HEIGHT: f64 = 0.015;
/// Distance between the axis (or the tick labels) and the bracket line.
pub const BRACKET_OFFSET: f64 = 0.02;
/// Space between a plain bracket line and its label.
pub const BRACKET_LABEL_PAD: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarKind {
    Total,
    Segment { group: usize, level: usize },
}

/// One rectangle, centered on `x`, spanning `base..base + height`.
#[derive(Debug, Clone, PartialEq)]
pub struct BarRect {
    pub kind: BarKind,
    pub x: f64,
    pub width: f64,
    pub base: f64,
    pub height: f64,
    pub fill: Rgba,
    pub edge: Rgba,
}

impl BarRect {
    pub fn top(&self) -> f64 {
        self.base + self.height
    }

    /// Zero-height segments keep their stacking slot but draw nothing.
    pub fn is_empty(&self) -> bool {
        self.height == 0.0
    }

    /// Opposite corners `(left, base)` and `(right, top)`.
    pub fn corners(&self) -> [(f64, f64); 2] {
        let half = self.width / 2.0;
        [(self.x - half, self.base), (self.x + half, self.top())]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShadeSpan {
    pub start: f64,
    pub end: f64,
    pub color: Rgba,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub x: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgba,
}

/// Text and extent of the bracket naming all groups of a waterfall.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupLabel {
    pub text: String,
    pub style: Option<BracketStyle>,
    /// Position of the first bar (the total bar when present).
    pub first_x: f64,
    pub last_x: f64,
    pub gap: f64,
    pub line: BracketLineStyle,
}

/// Bracket lines and label anchor in mixed coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct BracketGeometry {
    pub segments: Vec<[(f64, f64); 2]>,
    /// Top-center of the label text.
    pub label_anchor: (f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaterfallLayout {
    pub bar_width: f64,
    pub gap: f64,
    /// Center of every group, left to right.
    pub xlocs: Vec<f64>,
    pub x_total: Option<f64>,
    pub total_value: Option<f64>,
    /// Total bar first (when present), then level by level across groups.
    pub bars: Vec<BarRect>,
    /// Stair-step polyline; `None` breaks the line between steps.
    pub connectors: Vec<Option<(f64, f64)>>,
    pub reference_line: Option<[(f64, f64); 2]>,
    pub shade: Option<ShadeSpan>,
    pub ticks: Vec<Tick>,
    pub group_label: Option<GroupLabel>,
    pub legend: Vec<LegendEntry>,
    pub show_legend: bool,
    pub legend_style: LegendStyle,
    pub bar_style: BarStyle,
    pub links: LinkStyle,
    pub locale: String,
    /// Number of generated colors (one per non-zero segment).
    pub palette_size: usize,
}

impl WaterfallLayout {
    /// X of the last group; start the next chained waterfall to its right.
    pub fn last_x(&self) -> f64 {
        self.xlocs.last().copied().unwrap_or_default()
    }

    /// X of the leftmost bar, the total bar when there is one.
    pub fn first_x(&self) -> f64 {
        self.x_total
            .or_else(|| self.xlocs.first().copied())
            .unwrap_or_default()
    }

    /// Horizontal room the waterfall needs, including the shaded span.
    pub fn x_extent(&self) -> (f64, f64) {
        let reach = self.bar_width / 2.0 + self.gap;
        (self.first_x() - reach, self.last_x() + reach)
    }

    /// Lowest and highest drawn value; always includes zero.
    pub fn y_extent(&self) -> (f64, f64) {
        let mut lo: f64 = 0.0;
        let mut hi: f64 = 0.0;
        for b in &self.bars {
            lo = lo.min(b.base).min(b.top());
            hi = hi.max(b.base).max(b.top());
        }
        (lo, hi)
    }

    /// Connector polyline split at its gaps.
    pub fn connector_segments(&self) -> Vec<Vec<(f64, f64)>> {
        self.connectors
            .split(Option::is_none)
            .map(|run| run.iter().flatten().copied().collect::<Vec<_>>())
            .filter(|run| run.len() >= 2)
            .collect()
    }

    /// Bars with a visible height.
    pub fn visible_bars(&self) -> impl Iterator<Item = &BarRect> {
        self.bars.iter().filter(|b| !b.is_empty())
    }
}

/// Lay out one waterfall. `labels` and `colors` must already be arranged to
/// the table's shape (see [`crate::table`]).
pub fn layout_waterfall(
    table: &WaterfallTable,
    labels: &[Vec<String>],
    colors: &[Vec<Option<Rgba>>],
    opts: &RenderOptions,
) -> Result<WaterfallLayout, WaterfallError> {
    opts.validate()?;
    let n_groups = table.n_groups();
    let rectangular = |rows: &[usize]| {
        rows.len() == n_groups && rows.iter().all(|n| *n == table.n_levels())
    };
    if !rectangular(&labels.iter().map(Vec::len).collect::<Vec<_>>()) {
        return Err(WaterfallError::ShapeMismatch {
            what: "labels",
            detail: "label table is not arranged to the data shape".into(),
        });
    }
    if !rectangular(&colors.iter().map(Vec::len).collect::<Vec<_>>()) {
        return Err(WaterfallError::ShapeMismatch {
            what: "colors",
            detail: "color table is not arranged to the data shape".into(),
        });
    }
    if !opts.bar_names.is_empty() && opts.bar_names.len() != n_groups {
        return Err(WaterfallError::ShapeMismatch {
            what: "bar names",
            detail: format!("{} names given, data has {n_groups} groups", opts.bar_names.len()),
        });
    }

    let pitch = opts.pitch();
    let half = opts.bar_width / 2.0;
    let mut bars = Vec::with_capacity(n_groups * table.n_levels() + 1);
    let mut legend = Vec::new();

    let (x_total, total_value, first_group_x) = if opts.total {
        let value = table.grand_total();
        bars.push(BarRect {
            kind: BarKind::Total,
            x: opts.xstart,
            width: opts.bar_width,
            base: 0.0,
            height: value,
            fill: opts.total_color,
            edge: opts.edge_color.unwrap_or(opts.total_color),
        });
        legend.push(LegendEntry {
            label: "Total".to_string(),
            color: opts.total_color,
        });
        (Some(opts.xstart), Some(value), opts.xstart + pitch)
    } else {
        (None, None, opts.xstart)
    };
    let xlocs: Vec<f64> = (0..n_groups)
        .map(|i| first_group_x + i as f64 * pitch)
        .collect();

    // Generated colors go to non-zero segments only, level by level.
    let palette_size = table.nonzero_count();
    let generated = palette(palette_size);
    let mut next_color = 0usize;
    for level in 0..table.n_levels() {
        for (group, x) in xlocs.iter().enumerate() {
            let height = table.value(group, level);
            let fill = if height != 0.0 {
                let default = generated[next_color];
                next_color += 1;
                colors[group][level].unwrap_or(default)
            } else {
                colors[group][level].unwrap_or(Rgba::TRANSPARENT)
            };
            bars.push(BarRect {
                kind: BarKind::Segment { group, level },
                x: *x,
                width: opts.bar_width,
                base: table.segment_base(group, level),
                height,
                fill,
                edge: opts.edge_color.unwrap_or(fill),
            });
            if height != 0.0 {
                legend.push(LegendEntry {
                    label: labels[group][level].clone(),
                    color: fill,
                });
            }
        }
    }

    let mut connectors = Vec::new();
    if opts.plot_links {
        for (i, pair) in xlocs.windows(2).enumerate() {
            if i > 0 {
                connectors.push(None);
            }
            let y = table.cumulative()[i];
            connectors.push(Some((pair[0] + half, y)));
            connectors.push(Some((pair[1] - half, y)));
        }
    }

    let last_x = xlocs.last().copied().unwrap_or(first_group_x);
    let first_x = x_total.unwrap_or(first_group_x);
    let reference_line = match (x_total, total_value) {
        (Some(xt), Some(v)) => Some([(xt, v), (last_x, v)]),
        _ => None,
    };

    let shade = opts
        .shade_color
        .filter(|c| !c.is_transparent())
        .map(|color| ShadeSpan {
            start: first_x - opts.gap,
            end: last_x + opts.gap,
            color,
        });

    let mut ticks = Vec::new();
    if !opts.bar_names.is_empty() {
        if let Some(xt) = x_total {
            ticks.push(Tick {
                x: xt,
                name: "Total".to_string(),
            });
        }
        ticks.extend(xlocs.iter().zip(&opts.bar_names).map(|(x, name)| Tick {
            x: *x,
            name: name.clone(),
        }));
    }

    let group_label = opts.group_label.as_ref().map(|text| GroupLabel {
        text: text.clone(),
        style: opts.group_label_style,
        first_x,
        last_x,
        gap: opts.gap,
        line: opts.bracket.clone(),
    });

    debug!(
        "laid out waterfall: {} bars, {} legend entries, palette of {}",
        bars.len(),
        legend.len(),
        palette_size
    );

    Ok(WaterfallLayout {
        bar_width: opts.bar_width,
        gap: opts.gap,
        xlocs,
        x_total,
        total_value,
        bars,
        connectors,
        reference_line,
        shade,
        ticks,
        group_label,
        legend,
        show_legend: opts.legend,
        legend_style: opts.legend_style.clone(),
        bar_style: opts.bar.clone(),
        links: opts.links.clone(),
        locale: opts.locale.clone(),
        palette_size,
    })
}

/// Bracket segments below the axis. `label_depth` is how far the tallest
/// tick label reaches below the axis, as a fraction of the plot height
/// (0 without tick names).
pub fn bracket_geometry(label: &GroupLabel, label_depth: f64) -> BracketGeometry {
    let offset = BRACKET_OFFSET + label_depth.max(0.0);
    let x_mid = (label.first_x + label.last_x) / 2.0;
    let x_a = label.first_x - label.gap + label.gap / 5.0;
    let x_b = label.last_x + label.gap - label.gap / 5.0;
    let y = -offset;

    let Some(style) = label.style else {
        return BracketGeometry {
            segments: Vec::new(),
            label_anchor: (x_mid, y),
        };
    };

    let mut segments = vec![[(x_a, y), (x_b, y)]];
    let mut label_y = y - BRACKET_LABEL_PAD;
    if style.has_end_ticks() {
        segments.push([(x_a, y), (x_a, y + BRACKET_HEIGHT)]);
        segments.push([(x_b, y), (x_b, y + BRACKET_HEIGHT)]);
    }
    if style.has_center_drop() {
        segments.push([(x_mid, y), (x_mid, y - BRACKET_HEIGHT)]);
        label_y = y - 2.0 * BRACKET_HEIGHT;
    }
    BracketGeometry {
        segments,
        label_anchor: (x_mid, label_y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{arrange_colors, arrange_labels};

    fn layout_of(data: &[Vec<f64>], opts: &RenderOptions) -> WaterfallLayout {
        let table = WaterfallTable::prepare(data).unwrap();
        let labels = arrange_labels(&table, None, "en").unwrap();
        let colors = arrange_colors(&table, None).unwrap();
        layout_waterfall(&table, &labels, &colors, opts).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn connectors_run_from_right_edge_to_next_left_edge() {
        let l = layout_of(
            &[vec![1.0, 2.0], vec![3.0], vec![0.0, 4.0]],
            &RenderOptions::default(),
        );
        let segs = l.connector_segments();
        assert_eq!(segs.len(), 2);
        assert!(close(segs[0][0].0, 0.1) && close(segs[0][1].0, 0.3));
        assert_eq!(segs[0][0].1, 3.0);
        assert!(close(segs[1][0].0, 0.5) && close(segs[1][1].0, 0.7));
        assert_eq!(segs[1][1].1, 6.0);
        assert_eq!(l.connectors.iter().filter(|p| p.is_none()).count(), 1);
    }

    #[test]
    fn no_links_when_disabled_or_single_group() {
        let opts = RenderOptions {
            plot_links: false,
            ..RenderOptions::default()
        };
        assert!(layout_of(&[vec![1.0], vec![2.0]], &opts).connectors.is_empty());
        let single = layout_of(&[vec![1.0, 2.0]], &RenderOptions::default());
        assert!(single.connector_segments().is_empty());
        assert_eq!(single.last_x(), 0.0);
    }

    #[test]
    fn segments_stack_on_group_bottom() {
        let l = layout_of(&[vec![1.0, 2.0], vec![3.0, 4.0]], &RenderOptions::default());
        let seg = |g, lv| {
            l.bars
                .iter()
                .find(|b| b.kind == BarKind::Segment { group: g, level: lv })
                .unwrap()
                .clone()
        };
        assert_eq!(seg(0, 1).base, 1.0);
        assert_eq!(seg(1, 0).base, 3.0);
        assert_eq!(seg(1, 1).base, 6.0);
        assert_eq!(seg(1, 1).top(), 10.0);
        assert_eq!(l.y_extent(), (0.0, 10.0));
    }

    #[test]
    fn shade_and_extent_anchor_on_total_bar() {
        let opts = RenderOptions {
            total: true,
            shade_color: Some(Rgba::rgb(0, 0, 255)),
            ..RenderOptions::default()
        };
        let l = layout_of(&[vec![1.0], vec![2.0]], &opts);
        let shade = l.shade.clone().unwrap();
        assert!(close(shade.start, -0.2));
        assert!(close(shade.end, 0.8 + 0.2));
        assert_eq!(l.first_x(), 0.0);
        assert_eq!(l.reference_line, Some([(0.0, 3.0), (0.8, 3.0)]));
        let (lo, hi) = l.x_extent();
        assert!(close(lo, -0.3) && close(hi, 1.1));
    }

    #[test]
    fn transparent_shade_is_skipped() {
        let opts = RenderOptions {
            shade_color: Some(Rgba::TRANSPARENT),
            ..RenderOptions::default()
        };
        assert!(layout_of(&[vec![1.0]], &opts).shade.is_none());
    }

    #[test]
    fn edge_color_overrides_fill() {
        let opts = RenderOptions {
            edge_color: Some(Rgba::BLACK),
            total: true,
            ..RenderOptions::default()
        };
        let l = layout_of(&[vec![1.0]], &opts);
        assert!(l.bars.iter().all(|b| b.edge == Rgba::BLACK));
        let l = layout_of(&[vec![1.0]], &RenderOptions::default());
        assert!(l.bars.iter().all(|b| b.edge == b.fill));
    }

    #[test]
    fn ticks_prefix_total() {
        let opts = RenderOptions {
            total: true,
            bar_names: vec!["A".into(), "B".into()],
            ..RenderOptions::default()
        };
        let l = layout_of(&[vec![1.0], vec![2.0]], &opts);
        let names: Vec<&str> = l.ticks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Total", "A", "B"]);
        assert!(close(l.ticks[2].x, 0.8));
    }

    #[test]
    fn wrong_name_count_is_an_error() {
        let table = WaterfallTable::prepare(&[vec![1.0], vec![2.0]]).unwrap();
        let labels = arrange_labels(&table, None, "en").unwrap();
        let colors = arrange_colors(&table, None).unwrap();
        let opts = RenderOptions {
            bar_names: vec!["only one".into()],
            ..RenderOptions::default()
        };
        let err = layout_waterfall(&table, &labels, &colors, &opts).unwrap_err();
        assert!(matches!(err, WaterfallError::ShapeMismatch { what: "bar names", .. }));
    }

    fn group_label(style: Option<BracketStyle>) -> GroupLabel {
        GroupLabel {
            text: "Costs".into(),
            style,
            first_x: 0.0,
            last_x: 1.0,
            gap: 0.5,
            line: BracketLineStyle::default(),
        }
    }

    #[test]
    fn plain_bracket_is_one_line() {
        let g = bracket_geometry(&group_label(Some(BracketStyle::Line)), 0.0);
        assert_eq!(g.segments.len(), 1);
        let [(xa, ya), (xb, yb)] = g.segments[0];
        assert!(close(xa, -0.4) && close(xb, 1.4));
        assert!(close(ya, -0.02) && close(yb, -0.02));
        assert!(close(g.label_anchor.0, 0.5));
        assert!(close(g.label_anchor.1, -0.04));
    }

    #[test]
    fn end_ticks_rise_towards_axis() {
        let g = bracket_geometry(&group_label(Some(BracketStyle::EndTicks)), 0.1);
        assert_eq!(g.segments.len(), 3);
        let [(_, y0), (_, y1)] = g.segments[1];
        assert!(close(y0, -0.12) && close(y1, -0.105));
        assert!(close(g.label_anchor.1, -0.14));
    }

    #[test]
    fn center_drop_moves_label_down() {
        let g = bracket_geometry(&group_label(Some(BracketStyle::CenterDrop)), 0.0);
        assert_eq!(g.segments.len(), 2);
        let [(xm, y0), (_, y1)] = g.segments[1];
        assert!(close(xm, 0.5) && close(y0, -0.02) && close(y1, -0.035));
        assert!(close(g.label_anchor.1, -0.05));

        let g = bracket_geometry(&group_label(Some(BracketStyle::EndTicksCenterDrop)), 0.0);
        assert_eq!(g.segments.len(), 4);
    }

    #[test]
    fn label_only_without_style() {
        let g = bracket_geometry(&group_label(None), 0.05);
        assert!(g.segments.is_empty());
        assert!(close(g.label_anchor.1, -0.07));
    }
}
