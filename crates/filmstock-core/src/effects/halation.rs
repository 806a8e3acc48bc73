//! Highlight bloom.
//!
//! Bright film highlights scatter off the base and re-expose the emulsion
//! around them. This is simulated by keying highlights into a layer,
//! blurring it and screening it back over the source.
//!
//! # Algorithm
//! ```text
//! key(p)   = luma(p) > threshold ? (colour, α) : transparent
//!            α = 1                                         (full alpha)
//!            α = (luma − threshold) / (255 − threshold)    (proportional)
//! glow     = gaussian_blur(key, σ scaled to the region's short side)
//! out      = screen(out, glow) at opacity
//! ```
//!
//! The effect reads and writes only the target region.

use rayon::prelude::*;

use crate::color::luma;
use crate::effects::blend::{BlendMode, composite_layer};
use crate::effects::blur::gaussian_blur;
use crate::error::RenderResult;
use crate::grading::profile::{Halation, HalationMask};
use crate::image::{Layer, PixelBuffer, Rect};

/// Applies [`Halation`] settings to a region of a buffer.
#[derive(Debug, Clone, Copy)]
pub struct HalationEffect<'a> {
    settings: &'a Halation,
}

impl<'a> HalationEffect<'a> {
    /// Wrap a profile's halation settings.
    pub fn new(settings: &'a Halation) -> Self {
        Self { settings }
    }

    /// Key the highlights of `source` into a straight-alpha layer.
    pub fn highlight_map(&self, source: &PixelBuffer) -> Layer {
        let s = self.settings;
        let range = (255.0 - s.threshold).max(f32::EPSILON);
        let tint = s.tint.map(|t| [t[0] as f32 / 255.0, t[1] as f32 / 255.0, t[2] as f32 / 255.0]);

        let pixels = source
            .pixels()
            .par_iter()
            .map(|px| {
                let rgb = [px[0] as f32, px[1] as f32, px[2] as f32];
                let y = luma(rgb);
                if y <= s.threshold || px[3] == 0 {
                    return [0.0; 4];
                }
                let alpha = match s.mask {
                    HalationMask::FullAlpha => 1.0,
                    HalationMask::Proportional => ((y - s.threshold) / range).min(1.0),
                };
                let [r, g, b] = tint.unwrap_or([rgb[0] / 255.0, rgb[1] / 255.0, rgb[2] / 255.0]);
                [r, g, b, alpha]
            })
            .collect();

        Layer {
            width: source.width(),
            height: source.height(),
            pixels,
        }
    }

    /// Bloom the highlights inside `region` of `target`.
    ///
    /// Returns `false` when nothing in the region crossed the threshold, in
    /// which case `target` is untouched.
    pub fn apply(&self, target: &mut PixelBuffer, region: Rect) -> RenderResult<bool> {
        let source = target.extract_region(region)?;
        let mut glow = self.highlight_map(&source);
        if glow.is_clear() {
            tracing::debug!("halation: no highlights above {}", self.settings.threshold);
            return Ok(false);
        }

        let sigma = self.settings.sigma_for(region.width, region.height);
        gaussian_blur(&mut glow, sigma);
        composite_layer(
            target,
            &glow,
            region.x,
            region.y,
            BlendMode::Screen,
            self.settings.opacity,
        )?;
        tracing::debug!(sigma, opacity = self.settings.opacity, "halation applied");
        Ok(true)
    }
}
