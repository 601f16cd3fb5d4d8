//! Color values used throughout the chart: parsing from user strings,
//! hex formatting and conversion to Plotters colors.
//!
//! Colors are written the way chart users usually write them:
//!
//! ```rust
//! use stacked_waterfalls::style::Rgba;
//!
//! let c: Rgba = "#1f77b4".parse().unwrap();
//! assert_eq!(c, Rgba::rgb(0x1f, 0x77, 0xb4));
//! assert_eq!("dimgrey".parse::<Rgba>().unwrap().to_hex(), "#696969");
//! assert!("none".parse::<Rgba>().unwrap().is_transparent());
//! ```

use std::fmt;
use std::str::FromStr;

use plotters::style::RGBAColor;
use serde::{Deserialize, Serialize};

use crate::error::WaterfallError;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const DIMGREY: Rgba = Rgba::rgb(105, 105, 105);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    /// Create a new RGBA color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Build from float channels in `0..=1`, rounding to the nearest byte.
    pub fn from_unit_rgb(r: f64, g: f64, b: f64) -> Self {
        let q = |c: f64| (clamp01(c) * 255.0).round() as u8;
        Self::rgb(q(r), q(g), q(b))
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// `#rrggbb` for opaque colors, `#rrggbbaa` otherwise.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_plotters(&self) -> RGBAColor {
        RGBAColor(self.r, self.g, self.b, self.a as f64 / 255.0)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgba {
    type Err = WaterfallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if let Some(hex) = t.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| WaterfallError::InvalidColor(s.to_string()));
        }
        named_color(&t.to_ascii_lowercase()).ok_or_else(|| WaterfallError::InvalidColor(s.to_string()))
    }
}

impl TryFrom<String> for Rgba {
    type Error = WaterfallError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Rgba> for String {
    fn from(c: Rgba) -> Self {
        if c.is_transparent() {
            "none".to_string()
        } else {
            c.to_hex()
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            // #abc -> #aabbcc
            let nib = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
            Some(Rgba::rgb(nib(0)?, nib(1)?, nib(2)?))
        }
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Rgba> {
    let c = match name {
        "none" | "transparent" => Rgba::TRANSPARENT,
        "black" | "k" => Rgba::BLACK,
        "white" | "w" => Rgba::WHITE,
        "dimgrey" | "dimgray" => Rgba::DIMGREY,
        "grey" | "gray" => Rgba::rgb(128, 128, 128),
        "darkgrey" | "darkgray" => Rgba::rgb(169, 169, 169),
        "lightgrey" | "lightgray" => Rgba::rgb(211, 211, 211),
        "silver" => Rgba::rgb(192, 192, 192),
        "red" | "r" => Rgba::rgb(255, 0, 0),
        "green" | "g" => Rgba::rgb(0, 128, 0),
        "blue" | "b" => Rgba::rgb(0, 0, 255),
        "cyan" | "aqua" => Rgba::rgb(0, 255, 255),
        "magenta" | "fuchsia" => Rgba::rgb(255, 0, 255),
        "yellow" => Rgba::rgb(255, 255, 0),
        // single-letter shades are darker than their long names
        "c" => Rgba::rgb(0, 191, 191),
        "m" => Rgba::rgb(191, 0, 191),
        "y" => Rgba::rgb(191, 191, 0),
        "orange" => Rgba::rgb(255, 165, 0),
        "navy" => Rgba::rgb(0, 0, 128),
        "steelblue" => Rgba::rgb(70, 130, 180),
        "teal" => Rgba::rgb(0, 128, 128),
        "purple" => Rgba::rgb(128, 0, 128),
        "brown" => Rgba::rgb(165, 42, 42),
        "gold" => Rgba::rgb(255, 215, 0),
        _ => return None,
    };
    Some(c)
}

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!("#fff".parse::<Rgba>().unwrap(), Rgba::WHITE);
        assert_eq!("#FF8000".parse::<Rgba>().unwrap(), Rgba::rgb(255, 128, 0));
        assert_eq!(
            "#11223344".parse::<Rgba>().unwrap(),
            Rgba::new(0x11, 0x22, 0x33, 0x44)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            "#12".parse::<Rgba>(),
            Err(WaterfallError::InvalidColor(_))
        ));
        assert!("#gggggg".parse::<Rgba>().is_err());
        assert!("chartreuse-ish".parse::<Rgba>().is_err());
    }

    #[test]
    fn named_colors_are_case_insensitive() {
        assert_eq!("DimGray".parse::<Rgba>().unwrap(), Rgba::DIMGREY);
        assert_eq!(" k ".parse::<Rgba>().unwrap(), Rgba::BLACK);
    }

    #[test]
    fn long_names_are_full_intensity() {
        assert_eq!("cyan".parse::<Rgba>().unwrap().to_hex(), "#00ffff");
        assert_eq!("magenta".parse::<Rgba>().unwrap().to_hex(), "#ff00ff");
        assert_eq!("Yellow".parse::<Rgba>().unwrap().to_hex(), "#ffff00");
        assert_eq!("c".parse::<Rgba>().unwrap(), Rgba::rgb(0, 191, 191));
        assert_eq!("m".parse::<Rgba>().unwrap(), Rgba::rgb(191, 0, 191));
        assert_eq!("y".parse::<Rgba>().unwrap(), Rgba::rgb(191, 191, 0));
    }

    #[test]
    fn serde_uses_strings() {
        let c: Rgba = serde_json::from_str("\"#0a0b0c\"").unwrap();
        assert_eq!(c, Rgba::rgb(10, 11, 12));
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#0a0b0c\"");
        assert_eq!(serde_json::to_string(&Rgba::TRANSPARENT).unwrap(), "\"none\"");
        assert!(serde_json::from_str::<Rgba>("\"nope\"").is_err());
    }

    #[test]
    fn plotters_alpha_is_scaled() {
        let RGBAColor(_, _, _, a) = Rgba::new(1, 2, 3, 0).to_plotters();
        assert_eq!(a, 0.0);
        let RGBAColor(r, g, b, a) = Rgba::rgb(1, 2, 3).to_plotters();
        assert_eq!((r, g, b, a), (1, 2, 3, 1.0));
    }
}
