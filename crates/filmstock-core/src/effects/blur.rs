//! Separable Gaussian blur for [`Layer`]s.
//!
//! # Algorithm
//! 1. Premultiply colour by alpha so transparent pixels carry no colour
//! 2. Convolve rows with a 1-D kernel
//! 3. Transpose, convolve rows again, transpose back
//! 4. Un-premultiply
//!
//! Samples outside the layer are transparent black, so coverage fades out
//! toward the edges instead of smearing the border pixels.
//!
//! # Complexity
//! O(w × h × r) with `r = ⌈3σ⌉`, rows in parallel.

use rayon::prelude::*;

use crate::image::Layer;

/// Largest σ accepted from configuration, in pixels.
pub const MAX_SIGMA: f32 = 64.0;

/// Normalized 1-D Gaussian kernel of radius `⌈3σ⌉`.
///
/// σ ≤ 0 yields the identity kernel `[1.0]`.
pub fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    if !(sigma > 0.0) {
        return vec![1.0];
    }
    let radius = (sigma * 3.0).ceil() as i32;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / two_sigma_sq).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Blur `layer` in place with standard deviation `sigma` pixels.
pub fn gaussian_blur(layer: &mut Layer, sigma: f32) {
    let (w, h) = (layer.width as usize, layer.height as usize);
    if w == 0 || h == 0 || !(sigma > 0.0) {
        return;
    }
    let kernel = gaussian_kernel(sigma);

    layer.pixels.par_iter_mut().for_each(premultiply);

    let horizontal = convolve_rows(&layer.pixels, w, &kernel);
    let transposed = transpose(&horizontal, w, h);
    let vertical = convolve_rows(&transposed, h, &kernel);
    layer.pixels = transpose(&vertical, h, w);

    layer.pixels.par_iter_mut().for_each(unpremultiply);
    tracing::trace!(width = w, height = h, sigma, taps = kernel.len(), "gaussian blur");
}

fn premultiply(px: &mut [f32; 4]) {
    let a = px[3];
    px[0] *= a;
    px[1] *= a;
    px[2] *= a;
}

fn unpremultiply(px: &mut [f32; 4]) {
    let a = px[3];
    if a > 1e-6 {
        px[0] /= a;
        px[1] /= a;
        px[2] /= a;
    } else {
        *px = [0.0; 4];
    }
}

fn convolve_rows(src: &[[f32; 4]], width: usize, kernel: &[f32]) -> Vec<[f32; 4]> {
    let radius = (kernel.len() / 2) as isize;
    let mut dst = vec![[0.0f32; 4]; src.len()];
    dst.par_chunks_mut(width)
        .zip(src.par_chunks(width))
        .for_each(|(out_row, in_row)| {
            for (x, out) in out_row.iter_mut().enumerate() {
                let mut acc = [0.0f32; 4];
                for (k, &weight) in kernel.iter().enumerate() {
                    let sx = x as isize + k as isize - radius;
                    if sx < 0 || sx >= width as isize {
                        continue;
                    }
                    let s = in_row[sx as usize];
                    for c in 0..4 {
                        acc[c] += s[c] * weight;
                    }
                }
                *out = acc;
            }
        });
    dst
}

fn transpose(src: &[[f32; 4]], width: usize, height: usize) -> Vec<[f32; 4]> {
    let mut dst = vec![[0.0f32; 4]; src.len()];
    dst.par_chunks_mut(height).enumerate().for_each(|(x, col)| {
        for (y, out) in col.iter_mut().enumerate() {
            *out = src[y * width + x];
        }
    });
    dst
}
