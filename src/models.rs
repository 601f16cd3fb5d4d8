use serde::{Deserialize, Serialize};

use crate::chart::WaterfallChart;
use crate::error::WaterfallError;
use crate::style::Rgba;
use crate::viz::{Figure, RenderOptions, WaterfallLayout};

/// How far (in bar pitches) a chained waterfall starts after the previous one.
pub const CHAIN_PITCHES: f64 = 2.0;

/// JSON description of one waterfall.
///
/// `null` values count as zero, like missing levels in ragged groups.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartSpec {
    pub data: Vec<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<Vec<Option<Rgba>>>>,
    /// Overrides `options.xstart`. Left out on a chart after the first, the
    /// chart is chained to the right of its predecessor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xstart: Option<f64>,
    #[serde(default)]
    pub options: RenderOptions,
}

impl ChartSpec {
    pub fn chart(&self) -> WaterfallChart {
        let data = self
            .data
            .iter()
            .map(|group| group.iter().map(|v| v.unwrap_or(0.0)).collect())
            .collect();
        let mut chart = WaterfallChart::new(data);
        if let Some(labels) = &self.labels {
            chart = chart.with_labels(labels.clone());
        }
        if let Some(colors) = &self.colors {
            chart = chart.with_colors(colors.clone());
        }
        chart
    }
}

/// JSON description of a figure: one or more waterfalls on shared axes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FigureSpec {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub y_label: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    pub charts: Vec<ChartSpec>,
}

impl FigureSpec {
    /// Lay out every chart, resolving chained start positions.
    pub fn layouts(&self) -> Result<Vec<WaterfallLayout>, WaterfallError> {
        if self.charts.is_empty() {
            return Err(WaterfallError::EmptyData);
        }
        let mut out: Vec<WaterfallLayout> = Vec::with_capacity(self.charts.len());
        for spec in &self.charts {
            let mut opts = spec.options.clone();
            match (spec.xstart, out.last()) {
                (Some(x), _) => opts.xstart = x,
                (None, Some(prev)) => {
                    opts.xstart = prev.last_x() + CHAIN_PITCHES * (prev.bar_width + prev.gap)
                }
                (None, None) => {}
            }
            out.push(spec.chart().layout(&opts)?);
        }
        Ok(out)
    }

    /// Build the figure at the given size (falling back to the description's own
    /// size, then 800 × 500).
    pub fn to_figure(
        &self,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<Figure, WaterfallError> {
        let mut figure = Figure::new(
            width.or(self.width).unwrap_or(800),
            height.or(self.height).unwrap_or(500),
        );
        if let Some(t) = &self.title {
            figure = figure.with_title(t.clone());
        }
        if let Some(y) = &self.y_label {
            figure = figure.with_y_desc(y.clone());
        }
        for layout in self.layouts()? {
            figure.push(layout);
        }
        Ok(figure)
    }
}
