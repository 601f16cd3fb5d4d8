use stacked_waterfalls::Rgba;
use stacked_waterfalls::palette::{GOLDEN_RATIO_CONJUGATE, palette, palette_color, palette_hsv};

fn distance(a: Rgba, b: Rgba) -> u32 {
    (a.r as i32 - b.r as i32).unsigned_abs()
        + (a.g as i32 - b.g as i32).unsigned_abs()
        + (a.b as i32 - b.b as i32).unsigned_abs()
}

#[test]
fn palette_is_deterministic() {
    assert_eq!(palette(64), palette(64));
    // a shorter palette is a prefix of a longer one
    assert_eq!(palette(5)[..], palette(40)[..5]);
    for (i, c) in palette(16).into_iter().enumerate() {
        assert_eq!(c, palette_color(i));
    }
}

#[test]
fn neighbours_are_clearly_different() {
    let colors = palette(500);
    for (i, pair) in colors.windows(2).enumerate() {
        let d = distance(pair[0], pair[1]);
        assert!(d > 100, "colors {i} and {} too close: {} vs {}", i + 1, pair[0], pair[1]);
    }
}

#[test]
fn hue_follows_golden_ratio_steps() {
    for i in [0usize, 1, 2, 10, 123] {
        let hsv = palette_hsv(i);
        let expected = (i as f64 * GOLDEN_RATIO_CONJUGATE).fract();
        assert!((hsv.h - expected).abs() < 1e-12);
        assert_eq!(hsv.s, 0.7);
        assert!((hsv.v - (1.0 - (i as f64 * GOLDEN_RATIO_CONJUGATE) % 0.5).sqrt()).abs() < 1e-12);
    }
}

#[test]
fn colors_are_opaque_hex() {
    for c in palette(10) {
        assert!(!c.is_transparent());
        let hex = c.to_hex();
        assert_eq!(hex.len(), 7);
        assert_eq!(hex.parse::<Rgba>().unwrap(), c);
    }
}
