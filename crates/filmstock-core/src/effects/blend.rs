//! Explicit blend-mode compositing.
//!
//! There is no drawing context: every composite names its source, its
//! destination, its blend mode and its opacity.
//!
//! # Formula
//! Separable blend modes composited source-over (W3C Compositing Level 1),
//! on straight-alpha values in `0..=1`:
//! ```text
//! αs = src.a × opacity
//! αo = αs + αb × (1 − αs)
//! Co = (αs × (1 − αb) × Cs + αs × αb × B(Cb, Cs) + (1 − αs) × αb × Cb) / αo
//! ```
//!
//! - [`BlendMode::Normal`]:   `B = Cs`
//! - [`BlendMode::Multiply`]: `B = Cb × Cs`
//! - [`BlendMode::Screen`]:   `B = 1 − (1 − Cb) × (1 − Cs)`

use rayon::prelude::*;

use crate::error::{RenderError, RenderResult};
use crate::image::{CHANNELS, Layer, PixelBuffer, Rect};

/// Blend mode for compositing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Normal (over) blending.
    #[default]
    Normal,
    /// Multiply (darken).
    Multiply,
    /// Screen (lighten).
    Screen,
}

impl BlendMode {
    /// Blend one backdrop channel `cb` with one source channel `cs`.
    #[inline]
    pub fn blend(self, cb: f32, cs: f32) -> f32 {
        match self {
            Self::Normal => cs,
            Self::Multiply => cb * cs,
            Self::Screen => 1.0 - (1.0 - cb) * (1.0 - cs),
        }
    }
}

/// Composite one straight-alpha source pixel onto an RGBA8 backdrop pixel.
#[inline]
pub fn composite_pixel(dst: [u8; 4], src: [f32; 4], opacity: f32, mode: BlendMode) -> [u8; 4] {
    let a_s = (src[3] * opacity).clamp(0.0, 1.0);
    if a_s <= 0.0 {
        return dst;
    }
    let a_b = dst[3] as f32 / 255.0;
    let a_o = a_s + a_b * (1.0 - a_s);
    if a_o < 1e-8 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        let cb = dst[c] as f32 / 255.0;
        let cs = src[c];
        let co = a_s * (1.0 - a_b) * cs + a_s * a_b * mode.blend(cb, cs) + (1.0 - a_s) * a_b * cb;
        out[c] = to_u8(co / a_o);
    }
    out[3] = to_u8(a_o);
    out
}

/// Composite a whole layer onto `dst` with its top-left corner at `(x, y)`.
///
/// The layer must lie entirely inside `dst`.
pub fn composite_layer(
    dst: &mut PixelBuffer,
    layer: &Layer,
    x: u32,
    y: u32,
    mode: BlendMode,
    opacity: f32,
) -> RenderResult<()> {
    let rect = Rect::new(x, y, layer.width, layer.height);
    if !rect.fits_within(dst.width(), dst.height()) {
        return Err(RenderError::SizeMismatch(format!(
            "layer {}x{} at +{x}+{y} exceeds {}x{} target",
            layer.width,
            layer.height,
            dst.width(),
            dst.height()
        )));
    }
    if layer.pixels.is_empty() {
        return Ok(());
    }

    let stride = dst.stride();
    let lw = layer.width as usize;
    let x0 = x as usize * CHANNELS;
    dst.as_bytes_mut()
        .par_chunks_mut(stride)
        .skip(y as usize)
        .take(layer.height as usize)
        .enumerate()
        .for_each(|(ly, row)| {
            let src_row = &layer.pixels[ly * lw..(ly + 1) * lw];
            let dst_row = &mut row[x0..x0 + lw * CHANNELS];
            for (px, src) in dst_row.chunks_exact_mut(CHANNELS).zip(src_row) {
                let out = composite_pixel([px[0], px[1], px[2], px[3]], *src, opacity, mode);
                px.copy_from_slice(&out);
            }
        });
    Ok(())
}

/// Fill `rect` of `dst` with a solid straight-alpha colour.
pub fn fill_rect(dst: &mut PixelBuffer, rect: Rect, color: [f32; 4], mode: BlendMode) -> RenderResult<()> {
    let layer = Layer {
        width: rect.width,
        height: rect.height,
        pixels: vec![color; rect.width as usize * rect.height as usize],
    };
    composite_layer(dst, &layer, rect.x, rect.y, mode, 1.0)
}

/// Draw an RGBA8 image onto `dst` at `(x, y)` with source-over.
///
/// Opaque source pixels are copied verbatim, so an opaque blit is lossless.
pub fn blit(dst: &mut PixelBuffer, src: &PixelBuffer, x: u32, y: u32) -> RenderResult<()> {
    let rect = Rect::new(x, y, src.width(), src.height());
    if !rect.fits_within(dst.width(), dst.height()) {
        return Err(RenderError::SizeMismatch(format!(
            "{}x{} image at +{x}+{y} exceeds {}x{} target",
            src.width(),
            src.height(),
            dst.width(),
            dst.height()
        )));
    }
    if src.is_empty() {
        return Ok(());
    }

    let stride = dst.stride();
    let src_stride = src.stride();
    let x0 = x as usize * CHANNELS;
    let src_bytes = src.as_bytes();
    dst.as_bytes_mut()
        .par_chunks_mut(stride)
        .skip(y as usize)
        .take(src.height() as usize)
        .enumerate()
        .for_each(|(sy, row)| {
            let src_row = &src_bytes[sy * src_stride..(sy + 1) * src_stride];
            let dst_row = &mut row[x0..x0 + src_stride];
            for (px, s) in dst_row.chunks_exact_mut(CHANNELS).zip(src_row.chunks_exact(CHANNELS)) {
                match s[3] {
                    255 => px.copy_from_slice(s),
                    0 => {}
                    a => {
                        let src_px = [
                            s[0] as f32 / 255.0,
                            s[1] as f32 / 255.0,
                            s[2] as f32 / 255.0,
                            a as f32 / 255.0,
                        ];
                        let out = composite_pixel([px[0], px[1], px[2], px[3]], src_px, 1.0, BlendMode::Normal);
                        px.copy_from_slice(&out);
                    }
                }
            }
        });
    Ok(())
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_never_darkens() {
        for cb in [0.0, 0.2, 0.7, 1.0] {
            for cs in [0.0, 0.5, 1.0] {
                assert!(BlendMode::Screen.blend(cb, cs) >= cb - 1e-6);
            }
        }
    }

    #[test]
    fn test_multiply_with_white_is_identity() {
        let dst = [120, 60, 200, 255];
        let out = composite_pixel(dst, [1.0, 1.0, 1.0, 1.0], 1.0, BlendMode::Multiply);
        assert_eq!(out, dst);
    }

    #[test]
    fn test_multiply_black_at_alpha_darkens_proportionally() {
        let out = composite_pixel([200, 100, 50, 255], [0.0, 0.0, 0.0, 0.4], 1.0, BlendMode::Multiply);
        assert_eq!(out, [120, 60, 30, 255]);
    }

    #[test]
    fn test_normal_over_transparent_takes_source() {
        let out = composite_pixel([0, 0, 0, 0], [1.0, 0.5, 0.0, 0.5], 1.0, BlendMode::Normal);
        assert_eq!(out, [255, 128, 0, 128]);
    }

    #[test]
    fn test_zero_opacity_is_noop() {
        let dst = [10, 20, 30, 255];
        assert_eq!(composite_pixel(dst, [1.0; 4], 0.0, BlendMode::Screen), dst);
    }

    #[test]
    fn test_composite_layer_respects_offset() {
        let mut dst = PixelBuffer::from_rgba(3, 3, [100u8, 100, 100, 255].repeat(9)).unwrap();
        let layer = Layer {
            width: 1,
            height: 1,
            pixels: vec![[1.0, 1.0, 1.0, 1.0]],
        };
        composite_layer(&mut dst, &layer, 2, 1, BlendMode::Screen, 1.0).unwrap();
        assert_eq!(dst.pixel(2, 1), [255, 255, 255, 255]);
        assert_eq!(dst.pixel(1, 1), [100, 100, 100, 255]);
        assert_eq!(dst.pixel(2, 2), [100, 100, 100, 255]);
    }

    #[test]
    fn test_composite_layer_out_of_bounds() {
        let mut dst = PixelBuffer::new(2, 2).unwrap();
        let layer = Layer::transparent(2, 2);
        assert!(composite_layer(&mut dst, &layer, 1, 0, BlendMode::Normal, 1.0).is_err());
    }

    #[test]
    fn test_opaque_blit_is_exact() {
        let mut dst = PixelBuffer::from_rgba(4, 4, [9u8, 9, 9, 255].repeat(16)).unwrap();
        let src = PixelBuffer::from_rgba(2, 1, vec![1, 2, 3, 255, 4, 5, 6, 255]).unwrap();
        blit(&mut dst, &src, 1, 2).unwrap();
        assert_eq!(dst.pixel(1, 2), [1, 2, 3, 255]);
        assert_eq!(dst.pixel(2, 2), [4, 5, 6, 255]);
        assert_eq!(dst.pixel(0, 2), [9, 9, 9, 255]);
    }

    #[test]
    fn test_fill_rect() {
        let mut dst = PixelBuffer::new(3, 2).unwrap();
        fill_rect(&mut dst, Rect::new(1, 0, 2, 2), [0.1, 0.1, 0.1, 1.0], BlendMode::Normal).unwrap();
        assert_eq!(dst.pixel(0, 0), [0, 0, 0, 0]);
        assert_eq!(dst.pixel(2, 1), [26, 26, 26, 255]);
    }
}
