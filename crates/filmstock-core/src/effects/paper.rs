//! Paper substrate texture.
//!
//! A small square tile of uniform grey noise is drawn at very low alpha,
//! repeated across the target and multiplied into it. The result breaks up
//! the flat digital gradient of the frame.
//!
//! # Formula
//! ```text
//! g   = tile[(x mod n, y mod n)]            uniform in [0, 255]
//! α   = alpha / 255
//! out = out × (1 − α + α × g / 255)
//! ```

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::effects::blend::{BlendMode, composite_pixel};
use crate::error::{RenderError, RenderResult};
use crate::image::{CHANNELS, PixelBuffer};

/// Paper texture settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperTexture {
    /// Side of the square noise tile in pixels.
    pub tile_size: u32,
    /// Tile alpha on the 8-bit scale.
    pub alpha: u8,
}

impl Default for PaperTexture {
    fn default() -> Self {
        Self {
            tile_size: 100,
            alpha: 15,
        }
    }
}

impl PaperTexture {
    /// Largest accepted tile side in pixels.
    pub const MAX_TILE_SIZE: u32 = 4096;

    /// Reject an empty or oversized tile.
    pub fn validate(&self) -> RenderResult<()> {
        if self.tile_size == 0 || self.tile_size > Self::MAX_TILE_SIZE {
            return Err(RenderError::InvalidParameter(format!(
                "paper tile size must lie in [1, {}]",
                Self::MAX_TILE_SIZE
            )));
        }
        Ok(())
    }

    /// Draw a fresh noise tile, row-major, one grey level per pixel.
    pub fn generate_tile<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<u8> {
        let n = self.tile_size as usize;
        (0..n * n)
            .map(|_| (rng.r#gen::<f32>() * 255.0).round() as u8)
            .collect()
    }

    /// Multiply a fresh tile across all of `target`.
    pub fn apply<R: Rng + ?Sized>(&self, target: &mut PixelBuffer, rng: &mut R) -> RenderResult<()> {
        self.validate()?;
        let tile = self.generate_tile(rng);
        self.apply_tile(target, &tile)
    }

    /// Multiply an existing tile across all of `target`.
    pub fn apply_tile(&self, target: &mut PixelBuffer, tile: &[u8]) -> RenderResult<()> {
        let n = self.tile_size as usize;
        if n == 0 || tile.len() != n * n {
            return Err(RenderError::SizeMismatch(format!(
                "paper tile has {} texels, expected {n}x{n}",
                tile.len()
            )));
        }
        if self.alpha == 0 || target.is_empty() {
            return Ok(());
        }

        let alpha = self.alpha as f32 / 255.0;
        let stride = target.stride();
        target
            .as_bytes_mut()
            .par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row)| {
                let tile_row = &tile[(y % n) * n..(y % n + 1) * n];
                for (x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
                    let g = tile_row[x % n] as f32 / 255.0;
                    let out = composite_pixel([px[0], px[1], px[2], px[3]], [g, g, g, alpha], 1.0, BlendMode::Multiply);
                    px.copy_from_slice(&out);
                }
            });
        Ok(())
    }
}
