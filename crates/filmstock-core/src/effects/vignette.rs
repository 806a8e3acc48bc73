//! Optical vignette: radial darkening toward the corners of the photo.
//!
//! # Formula
//! ```text
//! d = |p − centre|                          (pixel centres)
//! t = clamp((d − r0) / (r1 − r0), 0, 1)     r0 = inner × w, r1 = outer × w
//! α = piecewise-linear over the alpha stops at t
//! out = out × (1 − α + α × tint)            (multiply)
//! ```
//! Radii are fractions of the photo width, so the falloff is circular even
//! on non-square photos.

use glam::Vec2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::effects::blend::{BlendMode, composite_pixel};
use crate::error::{RenderError, RenderResult};
use crate::image::{CHANNELS, PixelBuffer, Rect};

/// One `(offset, alpha)` stop of the radial gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient in `[0, 1]`.
    pub offset: f32,
    /// Alpha at this position.
    pub alpha: f32,
}

/// Radial vignette settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vignette {
    /// Inner radius as a fraction of the photo width.
    pub inner_radius: f32,
    /// Outer radius as a fraction of the photo width.
    pub outer_radius: f32,
    /// Alpha stops sorted by offset.
    pub stops: Vec<GradientStop>,
    /// Gradient colour, 8-bit sRGB.
    pub tint: [u8; 3],
}

impl Default for Vignette {
    fn default() -> Self {
        Self {
            inner_radius: 0.3,
            outer_radius: 0.8,
            stops: vec![
                GradientStop { offset: 0.0, alpha: 0.0 },
                GradientStop { offset: 0.6, alpha: 0.05 },
                GradientStop { offset: 1.0, alpha: 0.4 },
            ],
            tint: [0, 0, 0],
        }
    }
}

impl Vignette {
    /// Reject degenerate radii and malformed stops.
    pub fn validate(&self) -> RenderResult<()> {
        if !(self.inner_radius >= 0.0 && self.outer_radius > self.inner_radius) {
            return Err(RenderError::InvalidParameter(format!(
                "vignette radii must satisfy 0 <= inner < outer (got {} / {})",
                self.inner_radius, self.outer_radius
            )));
        }
        if self.stops.is_empty() {
            return Err(RenderError::InvalidParameter("vignette needs at least one stop".into()));
        }
        for pair in self.stops.windows(2) {
            if pair[1].offset < pair[0].offset {
                return Err(RenderError::InvalidParameter("vignette stops must be sorted".into()));
            }
        }
        if self.stops.iter().any(|s| !(0.0..=1.0).contains(&s.alpha)) {
            return Err(RenderError::InvalidParameter("vignette alphas must lie in [0, 1]".into()));
        }
        Ok(())
    }

    /// Gradient alpha at position `t`. Values outside the stops extend the end stops.
    pub fn alpha_at(&self, t: f32) -> f32 {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return 0.0;
        };
        if t <= first.offset {
            return first.alpha;
        }
        if t >= last.offset {
            return last.alpha;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.offset {
                let span = b.offset - a.offset;
                if span <= 0.0 {
                    return b.alpha;
                }
                return a.alpha + (b.alpha - a.alpha) * (t - a.offset) / span;
            }
        }
        last.alpha
    }

    /// Darken `region` of `target`. Pixels outside the region are not read or written.
    pub fn apply(&self, target: &mut PixelBuffer, region: Rect) -> RenderResult<()> {
        if !region.fits_within(target.width(), target.height()) {
            return Err(RenderError::SizeMismatch(format!(
                "vignette region {}x{}+{}+{} exceeds {}x{} buffer",
                region.width,
                region.height,
                region.x,
                region.y,
                target.width(),
                target.height()
            )));
        }
        if region.width == 0 || region.height == 0 {
            return Ok(());
        }

        let w = region.width as f32;
        let centre = Vec2::new(region.width as f32 / 2.0, region.height as f32 / 2.0);
        let r0 = self.inner_radius * w;
        let r1 = self.outer_radius * w;
        let tint = [
            self.tint[0] as f32 / 255.0,
            self.tint[1] as f32 / 255.0,
            self.tint[2] as f32 / 255.0,
        ];

        let stride = target.stride();
        let x0 = region.x as usize * CHANNELS;
        let row_len = region.width as usize * CHANNELS;
        target
            .as_bytes_mut()
            .par_chunks_mut(stride)
            .skip(region.y as usize)
            .take(region.height as usize)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, px) in row[x0..x0 + row_len].chunks_exact_mut(CHANNELS).enumerate() {
                    let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                    let t = ((p.distance(centre) - r0) / (r1 - r0)).clamp(0.0, 1.0);
                    let alpha = self.alpha_at(t);
                    if alpha <= 0.0 {
                        continue;
                    }
                    let src = [tint[0], tint[1], tint[2], alpha];
                    let out = composite_pixel([px[0], px[1], px[2], px[3]], src, 1.0, BlendMode::Multiply);
                    px.copy_from_slice(&out);
                }
            });
        tracing::trace!(r0, r1, "vignette applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn gray(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::from_rgba(width, height, [200u8, 200, 200, 255].repeat((width * height) as usize)).unwrap()
    }

    #[test]
    fn test_alpha_stops_interpolate() {
        let v = Vignette::default();
        assert_eq!(v.alpha_at(0.0), 0.0);
        assert!((v.alpha_at(0.3) - 0.025).abs() < EPSILON);
        assert!((v.alpha_at(0.6) - 0.05).abs() < EPSILON);
        assert!((v.alpha_at(0.8) - 0.225).abs() < EPSILON);
        assert!((v.alpha_at(1.0) - 0.4).abs() < EPSILON);
        assert!((v.alpha_at(2.0) - 0.4).abs() < EPSILON);
    }

    #[test]
    fn test_centre_untouched_corners_darkened() {
        let mut buf = gray(100, 100);
        let bounds = buf.bounds();
        Vignette::default().apply(&mut buf, bounds).unwrap();
        assert_eq!(buf.pixel(50, 50), [200, 200, 200, 255]);
        let corner = buf.pixel(0, 0);
        assert!(corner[0] < 200, "corner {corner:?}");
        // corner distance ~70 px: t = (70 − 30) / 50 = 0.8, α ≈ 0.22
        assert!((150..=160).contains(&corner[0]), "corner {corner:?}");
    }

    #[test]
    fn test_never_brightens_and_keeps_alpha() {
        let mut buf = gray(64, 48);
        let bounds = buf.bounds();
        Vignette::default().apply(&mut buf, bounds).unwrap();
        for p in buf.pixels() {
            assert!(p[0] <= 200);
            assert_eq!(p[3], 255);
        }
    }

    #[test]
    fn test_outside_region_untouched() {
        let mut buf = gray(40, 40);
        Vignette::default().apply(&mut buf, Rect::new(10, 10, 20, 20)).unwrap();
        assert_eq!(buf.pixel(0, 0), [200, 200, 200, 255]);
        assert_eq!(buf.pixel(39, 39), [200, 200, 200, 255]);
        assert!(buf.pixel(10, 10)[0] < 200);
    }

    #[test]
    fn test_validate() {
        assert!(Vignette::default().validate().is_ok());
        let bad = Vignette {
            outer_radius: 0.1,
            ..Vignette::default()
        };
        assert!(matches!(bad.validate(), Err(RenderError::InvalidParameter(_))));
    }
}
