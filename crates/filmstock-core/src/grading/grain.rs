//! Procedural monochromatic film grain.
//!
//! Each pixel receives one luminance delta drawn uniformly from
//! `[−strength/2, +strength/2)`. The same delta is added to R, G and B, so
//! grain never introduces chroma noise.
//!
//! The random source is injected. Production renders seed a fresh generator
//! per call; tests pass a seeded `StdRng` to get reproducible fields.

use rand::Rng;

use crate::error::{RenderError, RenderResult};

/// Per-pixel grain deltas for one buffer, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct GrainField {
    width: u32,
    height: u32,
    deltas: Vec<f32>,
}

impl GrainField {
    /// A field with no grain.
    pub fn zero(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            deltas: vec![0.0; width as usize * height as usize],
        }
    }

    /// Draw a new field from `rng`.
    ///
    /// Draws happen in row-major order, so the same seed always yields the same field.
    pub fn generate<R: Rng + ?Sized>(width: u32, height: u32, strength: f32, rng: &mut R) -> Self {
        let count = width as usize * height as usize;
        let deltas = (0..count)
            .map(|_| (rng.r#gen::<f32>() - 0.5) * strength)
            .collect();
        Self {
            width,
            height,
            deltas,
        }
    }

    /// Field width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Field height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// All deltas, row-major.
    pub fn deltas(&self) -> &[f32] {
        &self.deltas
    }

    /// Delta for the pixel at linear index `index`.
    #[inline]
    pub fn delta(&self, index: usize) -> f32 {
        self.deltas[index]
    }

    /// Fail unless the field covers exactly a `width` × `height` buffer.
    pub fn ensure_matches(&self, width: u32, height: u32) -> RenderResult<()> {
        if self.width != width || self.height != height {
            return Err(RenderError::SizeMismatch(format!(
                "grain field is {}x{}, buffer is {width}x{height}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}
