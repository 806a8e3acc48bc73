//! RGB ↔ HSL conversion on the 8-bit scale.
//!
//! Channels are `f32` on the `0..=255` scale and may transiently leave that
//! range (white-balance gains push whites above 255). Hue is in degrees
//! `[0, 360)`, saturation and lightness in percent.
//!
//! # Algorithm
//! Standard max/min derivation:
//! ```text
//! l = (max + min) / 2
//! s = d / (2 − max − min)   if l > 0.5
//!     d / (max + min)       otherwise
//! h = 60 × sector offset of the max channel
//! ```
//! Achromatic input (`max == min`) has `h = 0` and `s = 0`. A saturation
//! denominator at or below zero only occurs for over-range input and is
//! treated as fully saturated, so the conversion is total.

/// Rec. 601 luma weights, applied on the 8-bit scale.
pub const LUMA_REC601: [f32; 3] = [0.299, 0.587, 0.114];

const EPSILON: f32 = 1e-6;

/// Hue/saturation/lightness triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    /// Hue in degrees, `[0, 360)`.
    pub hue: f32,
    /// Saturation in percent.
    pub saturation: f32,
    /// Lightness in percent.
    pub lightness: f32,
}

/// Rec. 601 luma of an 8-bit-scale RGB triple.
#[inline]
pub fn luma(rgb: [f32; 3]) -> f32 {
    rgb[0] * LUMA_REC601[0] + rgb[1] * LUMA_REC601[1] + rgb[2] * LUMA_REC601[2]
}

/// Wrap a hue in degrees into `[0, 360)`.
#[inline]
pub fn normalize_hue(hue: f32) -> f32 {
    let h = hue.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if h >= 360.0 { 0.0 } else { h }
}

/// Convert 8-bit-scale RGB to HSL.
pub fn rgb_to_hsl(rgb: [f32; 3]) -> Hsl {
    let r = rgb[0] / 255.0;
    let g = rgb[1] / 255.0;
    let b = rgb[2] / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let lightness = (max + min) * 0.5;

    let delta = max - min;
    if delta.abs() < EPSILON {
        return Hsl {
            hue: 0.0,
            saturation: 0.0,
            lightness: lightness * 100.0,
        };
    }

    let denom = if lightness > 0.5 {
        2.0 - max - min
    } else {
        max + min
    };
    let saturation = if denom > EPSILON {
        (delta / denom).min(1.0)
    } else {
        1.0
    };

    let sector = if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    Hsl {
        hue: normalize_hue(sector * 60.0),
        saturation: saturation * 100.0,
        lightness: lightness * 100.0,
    }
}

/// Convert HSL back to 8-bit-scale RGB. The result is not clamped.
pub fn hsl_to_rgb(hsl: Hsl) -> [f32; 3] {
    let h = hsl.hue / 360.0;
    let s = hsl.saturation / 100.0;
    let l = hsl.lightness / 100.0;

    if s == 0.0 {
        let v = l * 255.0;
        return [v, v, v];
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    [
        hue_to_channel(p, q, h + 1.0 / 3.0) * 255.0,
        hue_to_channel(p, q, h) * 255.0,
        hue_to_channel(p, q, h - 1.0 / 3.0) * 255.0,
    ]
}

fn hue_to_channel(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-3;

    #[test]
    fn test_roundtrip_within_one_over_sampled_cube() {
        for r in (0..=255).step_by(5) {
            for g in (0..=255).step_by(5) {
                for b in (0..=255).step_by(5) {
                    let rgb = [r as f32, g as f32, b as f32];
                    let back = hsl_to_rgb(rgb_to_hsl(rgb));
                    for c in 0..3 {
                        assert!(
                            (back[c] - rgb[c]).abs() <= 1.0,
                            "({r},{g},{b}) ch{c}: {:.3}",
                            back[c]
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_roundtrip_extremes() {
        for rgb in [[0.0, 0.0, 0.0], [255.0, 255.0, 255.0], [255.0, 0.0, 0.0], [0.0, 0.0, 255.0], [1.0, 254.0, 128.0]] {
            let back = hsl_to_rgb(rgb_to_hsl(rgb));
            for c in 0..3 {
                assert!((back[c] - rgb[c]).abs() <= 1.0, "{rgb:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn test_gray_is_achromatic() {
        let hsl = rgb_to_hsl([128.0, 128.0, 128.0]);
        assert_eq!(hsl.hue, 0.0);
        assert_eq!(hsl.saturation, 0.0);
        assert!((hsl.lightness - 50.196).abs() < EPSILON);
    }

    #[test]
    fn test_primary_hues() {
        assert!((rgb_to_hsl([255.0, 0.0, 0.0]).hue - 0.0).abs() < EPSILON);
        assert!((rgb_to_hsl([0.0, 255.0, 0.0]).hue - 120.0).abs() < EPSILON);
        assert!((rgb_to_hsl([0.0, 0.0, 255.0]).hue - 240.0).abs() < EPSILON);
        // magenta-leaning red wraps below 360 rather than going negative
        let h = rgb_to_hsl([255.0, 0.0, 10.0]).hue;
        assert!(h > 350.0 && h < 360.0, "hue {h}");
    }

    #[test]
    fn test_over_range_white_does_not_divide_by_zero() {
        // 255 × 1.05, 255, 255 × 0.95 puts max + min at exactly 2.0
        let hsl = rgb_to_hsl([267.75, 255.0, 242.25]);
        assert!(hsl.saturation.is_finite());
        assert!(hsl.saturation >= 0.0 && hsl.saturation <= 100.0);
        let back = hsl_to_rgb(hsl);
        for c in back {
            assert!(c.is_finite());
            assert!(c >= 254.0, "white should stay white, got {back:?}");
        }
    }

    #[test]
    fn test_normalize_hue_wraps_not_clamps() {
        assert!((normalize_hue(390.0) - 30.0).abs() < EPSILON);
        assert!((normalize_hue(-30.0) - 330.0).abs() < EPSILON);
        assert_eq!(normalize_hue(360.0), 0.0);
        assert_eq!(normalize_hue(-1e-9), 0.0);
    }

    #[test]
    fn test_luma_weights_sum_to_one() {
        assert!((luma([255.0, 255.0, 255.0]) - 255.0).abs() < EPSILON);
    }
}
