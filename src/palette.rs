//! Default segment colors.
//!
//! Hues are spread with the golden-ratio step, so consecutive colors land far
//! apart on the color wheel and no hue repeats for any practical count.
//! Brightness follows the same fractional value so that neighbours also differ
//! in value, not just hue.

use crate::style::Rgba;

/// Fractional part of the golden ratio.
pub const GOLDEN_RATIO_CONJUGATE: f64 = 0.618033988749895;

/// Saturation shared by all generated colors.
pub const PALETTE_SATURATION: f64 = 0.7;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsv {
    pub h: f64, // 0..1
    pub s: f64, // 0..1
    pub v: f64, // 0..1
}

/// HSV triple for palette index `i`.
pub fn palette_hsv(i: usize) -> Hsv {
    let x = i as f64 * GOLDEN_RATIO_CONJUGATE;
    Hsv {
        h: x % 1.0,
        s: PALETTE_SATURATION,
        v: (1.0 - x % 0.5).sqrt(),
    }
}

/// Color for palette index `i`.
pub fn palette_color(i: usize) -> Rgba {
    hsv_to_rgba(palette_hsv(i))
}

/// `n` distinct colors, index `i` always mapping to the same color.
pub fn palette(n: usize) -> Vec<Rgba> {
    (0..n).map(palette_color).collect()
}

// HSV -> RGB conversion (six-sector form)
pub fn hsv_to_rgba(hsv: Hsv) -> Rgba {
    let h = hsv.h.rem_euclid(1.0);
    let s = hsv.s.clamp(0.0, 1.0);
    let v = hsv.v.clamp(0.0, 1.0);

    if s == 0.0 {
        return Rgba::from_unit_rgb(v, v, v);
    }

    let h6 = h * 6.0;
    let sector = h6.floor() as u8 % 6;
    let f = h6 - h6.floor();
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match sector {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Rgba::from_unit_rgb(r, g, b)
}
