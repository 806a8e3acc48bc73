//! Instant-print frame appearance.

use palette::{Mix, Srgb};
use serde::{Deserialize, Serialize};

use crate::effects::blur::MAX_SIGMA;
use crate::effects::paper::PaperTexture;
use crate::effects::vignette::Vignette;
use crate::error::{RenderError, RenderResult};

/// Soft drop shadow painted behind the photo inset.
///
/// `blur` follows the HTML canvas convention: the Gaussian σ is `blur / 2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropShadow {
    /// Shadow colour.
    pub color: Srgb<u8>,
    /// Shadow alpha in `[0, 1]`.
    pub alpha: f32,
    /// Canvas-style blur length in pixels.
    pub blur: f32,
    /// Horizontal offset in pixels.
    pub offset_x: i32,
    /// Vertical offset in pixels.
    pub offset_y: i32,
}

impl Default for DropShadow {
    fn default() -> Self {
        Self {
            color: Srgb::new(0, 0, 0),
            alpha: 0.25,
            blur: 15.0,
            offset_x: 0,
            offset_y: 2,
        }
    }
}

impl DropShadow {
    /// Gaussian σ for [`crate::effects::blur::gaussian_blur`].
    pub fn sigma(&self) -> f32 {
        self.blur / 2.0
    }
}

/// Everything about the frame that is not the photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameStyle {
    /// Side and top margin as a fraction of the photo width.
    pub margin_ratio: f32,
    /// Lower bound for the side and top margin in pixels.
    pub min_margin: u32,
    /// Bottom margin as a fraction of the photo width.
    pub bottom_ratio: f32,
    /// Lower bound for the bottom margin in pixels.
    pub min_bottom_margin: u32,
    /// Paper colour at the top edge.
    pub paper_top: Srgb<u8>,
    /// Paper colour at the bottom edge.
    pub paper_bottom: Srgb<u8>,
    /// Substrate noise.
    pub paper_texture: PaperTexture,
    /// Shadow behind the inset.
    pub shadow: DropShadow,
    /// Solid fill of the inset before the photo is drawn.
    pub backing: Srgb<u8>,
    /// Lens falloff over the graded photo.
    pub vignette: Vignette,
    /// Largest frame side that will be allocated.
    pub max_dimension: u32,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            margin_ratio: 0.06,
            min_margin: 20,
            bottom_ratio: 0.22,
            min_bottom_margin: 60,
            paper_top: Srgb::new(0xff, 0xff, 0xff),
            paper_bottom: Srgb::new(0xf2, 0xf0, 0xea),
            paper_texture: PaperTexture::default(),
            shadow: DropShadow::default(),
            backing: Srgb::new(0x1a, 0x1a, 0x1a),
            vignette: Vignette::default(),
            max_dimension: 32767,
        }
    }
}

impl FrameStyle {
    /// Paper colour `t` of the way from the top (0) to the bottom (1) edge.
    pub fn paper_at(&self, t: f32) -> [u8; 4] {
        let top: Srgb<f32> = self.paper_top.into_format();
        let bottom: Srgb<f32> = self.paper_bottom.into_format();
        let c: Srgb<u8> = top.mix(bottom, t.clamp(0.0, 1.0)).into_format();
        [c.red, c.green, c.blue, 255]
    }

    /// Reject nonsensical margins, shadows and effect settings.
    pub fn validate(&self) -> RenderResult<()> {
        let ratios = [self.margin_ratio, self.bottom_ratio];
        if ratios.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(RenderError::InvalidParameter(
                "frame margin ratios must be finite and non-negative".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.shadow.alpha) {
            return Err(RenderError::InvalidParameter("shadow alpha must lie in [0, 1]".into()));
        }
        if !(self.shadow.blur >= 0.0 && self.shadow.sigma() <= MAX_SIGMA) {
            return Err(RenderError::InvalidParameter(format!(
                "shadow blur must lie in [0, {}]",
                MAX_SIGMA * 2.0
            )));
        }
        if self.max_dimension == 0 {
            return Err(RenderError::InvalidParameter("max_dimension must be positive".into()));
        }
        self.paper_texture.validate()?;
        self.vignette.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_gradient_endpoints() {
        let style = FrameStyle::default();
        assert_eq!(style.paper_at(0.0), [255, 255, 255, 255]);
        assert_eq!(style.paper_at(1.0), [0xf2, 0xf0, 0xea, 255]);
        let mid = style.paper_at(0.5);
        assert!(mid[2] < 255 && mid[2] > 0xea);
    }

    #[test]
    fn test_shadow_sigma_is_half_blur() {
        assert!((DropShadow::default().sigma() - 7.5).abs() < 1e-6);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let style: FrameStyle = serde_json::from_str(r#"{"min_margin": 8}"#).unwrap();
        assert_eq!(style.min_margin, 8);
        assert_eq!(style.max_dimension, 32767);
        assert_eq!(style.backing, Srgb::new(0x1a, 0x1a, 0x1a));
    }

    #[test]
    fn test_validate_rejects_negative_ratio() {
        let style = FrameStyle {
            margin_ratio: -0.1,
            ..FrameStyle::default()
        };
        assert!(matches!(style.validate(), Err(RenderError::InvalidParameter(_))));
        assert!(FrameStyle::default().validate().is_ok());
    }

    #[test]
    fn test_validate_caps_shadow_blur() {
        let mut style = FrameStyle::default();
        style.shadow.blur = 1e30;
        assert!(matches!(style.validate(), Err(RenderError::InvalidParameter(_))));
        style.shadow.blur = 128.0;
        assert!(style.validate().is_ok());
        style.shadow.blur = f32::NAN;
        assert!(style.validate().is_err());
    }
}
