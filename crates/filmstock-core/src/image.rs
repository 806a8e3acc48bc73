//! Raster representations shared by every pipeline stage.

use crate::error::{RenderError, RenderResult};

/// Bytes per RGBA8 pixel.
pub const CHANNELS: usize = 4;

/// An axis-aligned pixel rectangle inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Create a rectangle from its origin and size.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Returns `true` if the rectangle lies entirely inside a `width` × `height` buffer.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        let right = self.x as u64 + self.width as u64;
        let bottom = self.y as u64 + self.height as u64;
        right <= width as u64 && bottom <= height as u64
    }

    /// Returns `true` if `(x, y)` lies inside the rectangle.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x
            && y >= self.y
            && (x - self.x) < self.width
            && (y - self.y) < self.height
    }
}

/// Interleaved RGBA8 raster.
///
/// The pipeline hands a `PixelBuffer` from stage to stage by value or by
/// exclusive borrow. Regions are copied out with [`PixelBuffer::extract_region`]
/// and copied back with [`PixelBuffer::write_region`]; no two stages alias the
/// same bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a fully transparent buffer.
    ///
    /// Allocation goes through `try_reserve_exact`, so an oversized request is
    /// reported as [`RenderError::RenderTargetUnavailable`] instead of aborting.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let len = byte_len(width, height).ok_or_else(|| {
            RenderError::RenderTargetUnavailable(format!("{width}x{height} overflows usize"))
        })?;

        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|e| {
            RenderError::RenderTargetUnavailable(format!("{width}x{height}: {e}"))
        })?;
        data.resize(len, 0);

        Ok(Self { width, height, data })
    }

    /// Wrap existing RGBA8 bytes.
    ///
    /// Fails with [`RenderError::InvalidImage`] if `data.len() != width × height × 4`.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> RenderResult<Self> {
        match byte_len(width, height) {
            Some(len) if len == data.len() => Ok(Self { width, height, data }),
            Some(len) => Err(RenderError::InvalidImage(format!(
                "{width}x{height} expects {len} bytes, got {}",
                data.len()
            ))),
            None => Err(RenderError::InvalidImage(format!(
                "{width}x{height} overflows usize"
            ))),
        }
    }

    /// Reject buffers that cannot be used as a render source.
    pub fn ensure_renderable(&self) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidImage(format!(
                "source has zero area ({}x{})",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `true` for a zero-area buffer.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw interleaved bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Raw interleaved bytes, mutable.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the buffer and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Pixels as `[R, G, B, A]` arrays.
    pub fn pixels(&self) -> &[[u8; 4]] {
        bytemuck::cast_slice(&self.data)
    }

    /// Pixels as `[R, G, B, A]` arrays, mutable.
    pub fn pixels_mut(&mut self) -> &mut [[u8; 4]] {
        bytemuck::cast_slice_mut(&mut self.data)
    }

    /// Pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels()[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// Bounds of the whole buffer.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Copy a rectangle out into a new buffer.
    pub fn extract_region(&self, rect: Rect) -> RenderResult<PixelBuffer> {
        self.check_rect(rect)?;

        let row_len = rect.width as usize * CHANNELS;
        let mut data = Vec::with_capacity(row_len * rect.height as usize);
        for row in 0..rect.height as usize {
            let start = (rect.y as usize + row) * self.stride() + rect.x as usize * CHANNELS;
            data.extend_from_slice(&self.data[start..start + row_len]);
        }

        Ok(PixelBuffer {
            width: rect.width,
            height: rect.height,
            data,
        })
    }

    /// Copy `region` back into this buffer with its top-left corner at `(x, y)`.
    pub fn write_region(&mut self, x: u32, y: u32, region: &PixelBuffer) -> RenderResult<()> {
        let rect = Rect::new(x, y, region.width, region.height);
        self.check_rect(rect)?;

        let row_len = region.stride();
        let stride = self.stride();
        for (row, src) in region.data.chunks_exact(row_len.max(1)).enumerate() {
            let start = (y as usize + row) * stride + x as usize * CHANNELS;
            self.data[start..start + row_len].copy_from_slice(src);
        }
        Ok(())
    }

    fn check_rect(&self, rect: Rect) -> RenderResult<()> {
        if !rect.fits_within(self.width, self.height) {
            return Err(RenderError::SizeMismatch(format!(
                "region {}x{}+{}+{} exceeds {}x{} buffer",
                rect.width, rect.height, rect.x, rect.y, self.width, self.height
            )));
        }
        Ok(())
    }

    /// Convert into an `image` crate buffer for encoding.
    pub fn into_rgba_image(self) -> RenderResult<image::RgbaImage> {
        let (width, height) = (self.width, self.height);
        image::RgbaImage::from_raw(width, height, self.data).ok_or_else(|| {
            RenderError::SizeMismatch(format!("{width}x{height} does not match its byte length"))
        })
    }
}

impl From<image::RgbaImage> for PixelBuffer {
    fn from(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

fn byte_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
}

/// Floating-point RGBA layer with straight (non-premultiplied) alpha in `0..=1`.
///
/// Used for effect masks that are blurred and composited over a
/// [`PixelBuffer`]: highlight maps, drop shadows.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Layer width in pixels.
    pub width: u32,
    /// Layer height in pixels.
    pub height: u32,
    /// Pixel data in RGBA f32 format.
    pub pixels: Vec<[f32; 4]>,
}

impl Layer {
    /// A fully transparent layer.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0.0; 4]; width as usize * height as usize],
        }
    }

    /// Returns `true` if no pixel has any coverage.
    pub fn is_clear(&self) -> bool {
        self.pixels.iter().all(|p| p[3] <= 0.0)
    }
}
