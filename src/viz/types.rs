//! Public types and defaults for rendering a waterfall.

use serde::{Deserialize, Serialize};

use crate::error::WaterfallError;
use crate::style::Rgba;

/// Bracket drawn under the x axis to name the whole set of groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BracketStyle {
    /// `|` plain horizontal line.
    #[serde(rename = "|", alias = "line")]
    Line,
    /// `]` line with end ticks rising towards the axis.
    #[serde(rename = "]", alias = "end_ticks")]
    EndTicks,
    /// `]-` end ticks plus a center tick dropping to the label.
    #[serde(rename = "]-", alias = "end_ticks_center_drop")]
    EndTicksCenterDrop,
    /// `|-` plain line plus a center drop tick.
    #[serde(rename = "|-", alias = "center_drop")]
    CenterDrop,
}

impl BracketStyle {
    pub fn has_end_ticks(self) -> bool {
        matches!(self, BracketStyle::EndTicks | BracketStyle::EndTicksCenterDrop)
    }

    pub fn has_center_drop(self) -> bool {
        matches!(self, BracketStyle::CenterDrop | BracketStyle::EndTicksCenterDrop)
    }
}

/// Corner of the plot area holding the legend box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendPosition {
    #[default]
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

/// Extra styling for the stacked segment bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarStyle {
    /// Edge stroke width in pixels (0 draws no edge).
    pub line_width: u32,
    /// Fill opacity in `0..=1`.
    pub opacity: f64,
}

impl Default for BarStyle {
    fn default() -> Self {
        Self {
            line_width: 1,
            opacity: 1.0,
        }
    }
}

/// Dashed connector and reference-line styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkStyle {
    pub color: Rgba,
    pub width: u32,
    /// Dash length in pixels.
    pub dash: u32,
    /// Gap between dashes in pixels.
    pub spacing: u32,
}

impl Default for LinkStyle {
    fn default() -> Self {
        Self {
            color: Rgba::BLACK,
            width: 1,
            dash: 4,
            spacing: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendStyle {
    pub position: LegendPosition,
    pub font_size: u32,
}

impl Default for LegendStyle {
    fn default() -> Self {
        Self {
            position: LegendPosition::UpperLeft,
            font_size: 12,
        }
    }
}

/// Bracket line and group label styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BracketLineStyle {
    pub color: Rgba,
    pub width: u32,
    pub font_size: u32,
}

impl Default for BracketLineStyle {
    fn default() -> Self {
        Self {
            color: Rgba::BLACK,
            width: 1,
            font_size: 14,
        }
    }
}

/// Everything that controls how one waterfall is laid out and drawn.
///
/// All fields have defaults, so a JSON description only needs the ones it
/// changes:
///
/// ```rust
/// use stacked_waterfalls::viz::RenderOptions;
///
/// let o: RenderOptions = serde_json::from_str(r#"{"total": true, "gap": 0.1}"#).unwrap();
/// assert!(o.total);
/// assert_eq!(o.bar_width, 0.2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// X position of the first bar (the total bar when `total` is set).
    pub xstart: f64,
    /// Draw a leading bar with the sum of all values.
    pub total: bool,
    /// Edge color for every bar; `None` uses each bar's fill.
    pub edge_color: Option<Rgba>,
    pub bar_width: f64,
    pub gap: f64,
    pub bar: BarStyle,
    pub plot_links: bool,
    pub links: LinkStyle,
    pub total_color: Rgba,
    /// Background span behind the groups; `None` disables it.
    pub shade_color: Option<Rgba>,
    pub legend: bool,
    pub legend_style: LegendStyle,
    pub group_label: Option<String>,
    pub group_label_style: Option<BracketStyle>,
    pub bracket: BracketLineStyle,
    /// Tick names, one per group.
    pub bar_names: Vec<String>,
    /// Locale tag for value labels and y ticks (`en`, `de`, …).
    pub locale: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            xstart: 0.0,
            total: false,
            edge_color: None,
            bar_width: 0.2,
            gap: 0.2,
            bar: BarStyle::default(),
            plot_links: true,
            links: LinkStyle::default(),
            total_color: Rgba::DIMGREY,
            shade_color: None,
            legend: true,
            legend_style: LegendStyle::default(),
            group_label: None,
            group_label_style: Some(BracketStyle::Line),
            bracket: BracketLineStyle::default(),
            bar_names: Vec::new(),
            locale: "en".to_string(),
        }
    }
}

impl RenderOptions {
    pub fn validate(&self) -> Result<(), WaterfallError> {
        if !(self.bar_width.is_finite() && self.bar_width > 0.0) {
            return Err(WaterfallError::InvalidOption(format!(
                "bar_width must be positive, got {}",
                self.bar_width
            )));
        }
        if !(self.gap.is_finite() && self.gap >= 0.0) {
            return Err(WaterfallError::InvalidOption(format!(
                "gap must be non-negative, got {}",
                self.gap
            )));
        }
        if !self.xstart.is_finite() {
            return Err(WaterfallError::InvalidOption("xstart must be finite".into()));
        }
        if !(0.0..=1.0).contains(&self.bar.opacity) {
            return Err(WaterfallError::InvalidOption(format!(
                "bar opacity must be within 0..=1, got {}",
                self.bar.opacity
            )));
        }
        Ok(())
    }

    /// Distance between neighbouring group centers.
    pub fn pitch(&self) -> f64 {
        self.bar_width + self.gap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracket_styles_use_short_names() {
        let s: BracketStyle = serde_json::from_str("\"]-\"").unwrap();
        assert_eq!(s, BracketStyle::EndTicksCenterDrop);
        let s: BracketStyle = serde_json::from_str("\"center_drop\"").unwrap();
        assert_eq!(s, BracketStyle::CenterDrop);
        assert!(s.has_center_drop() && !s.has_end_ticks());
    }

    #[test]
    fn null_style_disables_bracket() {
        let o: RenderOptions =
            serde_json::from_str(r#"{"group_label": "Costs", "group_label_style": null}"#).unwrap();
        assert_eq!(o.group_label.as_deref(), Some("Costs"));
        assert_eq!(o.group_label_style, None);
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        let o = RenderOptions {
            bar_width: 0.0,
            ..RenderOptions::default()
        };
        assert!(o.validate().is_err());
        let o = RenderOptions {
            gap: -0.1,
            ..RenderOptions::default()
        };
        assert!(o.validate().is_err());
        assert!(RenderOptions::default().validate().is_ok());
    }
}
