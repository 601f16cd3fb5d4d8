//! The waterfall chart: input data plus the pipeline that turns it into a
//! layout and, optionally, an image file.

use std::path::Path;

use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::WaterfallError;
use crate::style::Rgba;
use crate::table::{WaterfallTable, arrange_colors, arrange_labels};
use crate::viz::layout::{WaterfallLayout, layout_waterfall};
use crate::viz::{Figure, RenderOptions};

/// Nested segment values with optional labels and color overrides.
///
/// ```rust
/// use stacked_waterfalls::{RenderOptions, WaterfallChart};
///
/// let chart = WaterfallChart::new(vec![vec![1.0, 2.0], vec![3.0], vec![0.0, 4.0]]);
/// let table = chart.table()?;
/// assert_eq!(table.cumulative(), &[3.0, 6.0, 10.0]);
///
/// let layout = chart.layout(&RenderOptions { total: true, ..Default::default() })?;
/// assert_eq!(layout.total_value, Some(10.0));
/// # Ok::<(), stacked_waterfalls::WaterfallError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WaterfallChart {
    data: Vec<Vec<f64>>,
    labels: Option<Vec<Vec<String>>>,
    colors: Option<Vec<Vec<Option<Rgba>>>>,
}

impl WaterfallChart {
    pub fn new(data: Vec<Vec<f64>>) -> Self {
        Self {
            data,
            labels: None,
            colors: None,
        }
    }

    /// Display labels per segment (legend text). Missing entries stay blank.
    pub fn with_labels(mut self, labels: Vec<Vec<String>>) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Color per segment; `None` entries fall back to the generated palette.
    pub fn with_colors(mut self, colors: Vec<Vec<Option<Rgba>>>) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn data(&self) -> &[Vec<f64>] {
        &self.data
    }

    pub fn table(&self) -> Result<WaterfallTable, WaterfallError> {
        WaterfallTable::prepare(&self.data)
    }

    pub fn labels(&self, locale_tag: &str) -> Result<Vec<Vec<String>>, WaterfallError> {
        let table = self.table()?;
        arrange_labels(&table, self.labels.as_deref(), locale_tag)
    }

    /// Run table preparation, label/color arrangement and layout.
    pub fn layout(&self, opts: &RenderOptions) -> Result<WaterfallLayout, WaterfallError> {
        let table = self.table()?;
        let labels = arrange_labels(&table, self.labels.as_deref(), &opts.locale)?;
        let colors = arrange_colors(&table, self.colors.as_deref())?;
        layout_waterfall(&table, &labels, &colors, opts)
    }

    /// Render this chart alone to `out_path` (`.svg` → SVG, anything else → PNG)
    /// and return the x position of the last group.
    pub fn plot<P: AsRef<Path>>(
        &self,
        opts: &RenderOptions,
        out_path: P,
        width: u32,
        height: u32,
    ) -> Result<f64> {
        let layout = self.layout(opts)?;
        let last_x = layout.last_x();
        let mut figure = Figure::new(width, height);
        figure.push(layout);
        figure.save(out_path.as_ref())?;
        info!("wrote waterfall to {}", out_path.as_ref().display());
        Ok(last_x)
    }
}
