//! Instant-print frame geometry.
//!
//! # Formula
//! ```text
//! margin  = max(min_margin,        round(margin_ratio × W))
//! bottom  = max(min_bottom_margin, round(bottom_ratio × W))
//! total_w = W + 2 × margin
//! total_h = H + margin + bottom
//! ```
//! Both margins scale with the photo width only, so portrait and landscape
//! photos of the same width get identical borders.

use crate::error::{RenderError, RenderResult};
use crate::frame::style::FrameStyle;
use crate::image::Rect;

/// Pixel layout of one framed print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    /// Photo width in pixels.
    pub photo_width: u32,
    /// Photo height in pixels.
    pub photo_height: u32,
    /// Left, right and top margin.
    pub margin: u32,
    /// Bottom margin (the caption strip).
    pub bottom_margin: u32,
    /// Frame width.
    pub total_width: u32,
    /// Frame height.
    pub total_height: u32,
}

impl FrameGeometry {
    /// Lay out a `width` × `height` photo.
    ///
    /// Fails with [`RenderError::InvalidImage`] for a zero-area photo and with
    /// [`RenderError::RenderTargetUnavailable`] if either frame side overflows
    /// or exceeds `style.max_dimension`.
    pub fn compute(width: u32, height: u32, style: &FrameStyle) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidImage(format!(
                "source has zero area ({width}x{height})"
            )));
        }

        let margin = scaled(width, style.margin_ratio).max(style.min_margin);
        let bottom_margin = scaled(width, style.bottom_ratio).max(style.min_bottom_margin);

        let too_large = || {
            RenderError::RenderTargetUnavailable(format!(
                "frame for {width}x{height} exceeds {} px per side",
                style.max_dimension
            ))
        };
        let total_width = margin
            .checked_mul(2)
            .and_then(|m| m.checked_add(width))
            .ok_or_else(too_large)?;
        let total_height = margin
            .checked_add(bottom_margin)
            .and_then(|m| m.checked_add(height))
            .ok_or_else(too_large)?;
        if total_width > style.max_dimension || total_height > style.max_dimension {
            return Err(too_large());
        }

        Ok(Self {
            photo_width: width,
            photo_height: height,
            margin,
            bottom_margin,
            total_width,
            total_height,
        })
    }

    /// Where the photo sits inside the frame.
    pub fn photo_rect(&self) -> Rect {
        Rect::new(self.margin, self.margin, self.photo_width, self.photo_height)
    }
}

fn scaled(width: u32, ratio: f32) -> u32 {
    let v = (width as f64 * ratio as f64).round();
    if v >= u32::MAX as f64 { u32::MAX } else { v.max(0.0) as u32 }
}
