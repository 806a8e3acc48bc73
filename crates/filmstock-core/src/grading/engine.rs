//! Per-pixel film grading.
//!
//! Every pixel runs the same fixed sequence. Order matters and every step
//! works on `f32`; the only clamp is the final write back to 8 bits.
//!
//! ```text
//!   tone curve ──→ ×WB gains ──→ luma tint ──→ RGB→HSL ──→ ×saturation
//!        ──→ hue bands ──→ rolloff ──→ HSL→RGB ──→ +grain ──→ clamp → u8
//! ```
//!
//! Pixels are independent, so the buffer is graded in parallel with rayon.
//! Output is identical to a sequential pass.

use rand::Rng;
use rayon::prelude::*;

use crate::color::{Hsl, hsl_to_rgb, luma, rgb_to_hsl};
use crate::error::RenderResult;
use crate::grading::grain::GrainField;
use crate::grading::profile::FilmProfile;
use crate::grading::tone_curve::ToneCurve;
use crate::image::PixelBuffer;

/// Applies one [`FilmProfile`] to pixel buffers.
///
/// The tone curve is baked once on construction and reused for every buffer.
#[derive(Debug, Clone)]
pub struct GradingEngine<'a> {
    profile: &'a FilmProfile,
    curve: ToneCurve,
}

impl<'a> GradingEngine<'a> {
    /// Bake the profile's tone curve.
    pub fn new(profile: &'a FilmProfile) -> Self {
        Self {
            profile,
            curve: ToneCurve::build(&profile.tone_curve),
        }
    }

    /// The profile being applied.
    pub fn profile(&self) -> &FilmProfile {
        self.profile
    }

    /// Draw a fresh grain field from `rng` and grade `buffer` in place.
    pub fn grade<R: Rng + ?Sized>(&self, buffer: &mut PixelBuffer, rng: &mut R) -> RenderResult<()> {
        let grain = GrainField::generate(
            buffer.width(),
            buffer.height(),
            self.profile.grain_strength,
            rng,
        );
        self.grade_with_grain(buffer, &grain)
    }

    /// Grade `buffer` in place using a precomputed grain field.
    ///
    /// A zero-area buffer is a no-op. Alpha is preserved.
    pub fn grade_with_grain(&self, buffer: &mut PixelBuffer, grain: &GrainField) -> RenderResult<()> {
        grain.ensure_matches(buffer.width(), buffer.height())?;
        if buffer.is_empty() {
            return Ok(());
        }

        buffer
            .pixels_mut()
            .par_iter_mut()
            .zip(grain.deltas().par_iter())
            .for_each(|(px, &delta)| {
                let out = self.grade_pixel([px[0], px[1], px[2]], delta);
                px[0] = out[0];
                px[1] = out[1];
                px[2] = out[2];
            });

        tracing::trace!(
            profile = %self.profile.name,
            width = buffer.width(),
            height = buffer.height(),
            "graded buffer"
        );
        Ok(())
    }

    /// Run the full sequence on a single pixel.
    pub fn grade_pixel(&self, rgb: [u8; 3], grain_delta: f32) -> [u8; 3] {
        let graded = self.grade_unclamped(rgb);
        [
            quantize(graded[0] + grain_delta),
            quantize(graded[1] + grain_delta),
            quantize(graded[2] + grain_delta),
        ]
    }

    /// Tone curve, white balance and luma tints: the RGB-domain steps before HSL.
    pub fn balance(&self, rgb: [u8; 3]) -> [f32; 3] {
        let p = self.profile;

        // 1. tone curve
        let curved = self.curve.map_rgb(rgb);
        let mut c = [curved[0] as f32, curved[1] as f32, curved[2] as f32];

        // 2. white balance
        c[0] *= p.warm_shift.r_gain;
        c[2] *= p.warm_shift.b_gain;

        // 3. luma-keyed tints
        let y = luma(c);
        if let Some(tint) = &p.shadow_tint {
            tint.apply(&mut c, y);
        }
        if let Some(tint) = &p.highlight_tint {
            tint.apply(&mut c, y);
        }
        c
    }

    /// Every step up to, but excluding, grain and the final clamp.
    ///
    /// Values may lie outside `0..=255`.
    pub fn grade_unclamped(&self, rgb: [u8; 3]) -> [f32; 3] {
        let p = self.profile;
        let c = self.balance(rgb);

        // 4–6. HSL: global saturation, then bands in order
        let Hsl {
            mut hue,
            mut saturation,
            mut lightness,
        } = rgb_to_hsl(c);
        saturation *= p.global_saturation_scale;
        for band in &p.hue_bands {
            band.apply(&mut hue, &mut saturation, &mut lightness);
        }
        if let Some(rolloff) = &p.highlight_rolloff {
            lightness = rolloff.apply(lightness);
        }

        // 7. back to RGB
        hsl_to_rgb(Hsl {
            hue,
            saturation,
            lightness,
        })
    }
}

/// Clamp to `0..=255` and round to the nearest integer. NaN maps to 0.
#[inline]
fn quantize(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.clamp(0.0, 255.0).round() as u8
}
