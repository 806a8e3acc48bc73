//! Render configuration: both film profiles plus the frame style.
//!
//! Every field has a default equal to the built-in look, so a JSON file only
//! needs the values it changes:
//!
//! ```json
//! { "frame": { "min_margin": 32 }, "cool_stock": { "grain_strength": 10.0, ... } }
//! ```
//!
//! A profile given in the file replaces the built-in profile wholesale.

use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::RenderResult;
use crate::frame::style::FrameStyle;
use crate::grading::profile::{FilmProfile, FilterKind};

static BUILTIN: LazyLock<RenderConfig> = LazyLock::new(RenderConfig::default);

/// Everything a render needs besides the photo and the RNG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Profile used for [`FilterKind::WarmStock`].
    pub warm_stock: FilmProfile,
    /// Profile used for [`FilterKind::CoolStock`].
    pub cool_stock: FilmProfile,
    /// Frame appearance.
    pub frame: FrameStyle,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            warm_stock: FilmProfile::warm_stock().clone(),
            cool_stock: FilmProfile::cool_stock().clone(),
            frame: FrameStyle::default(),
        }
    }
}

impl RenderConfig {
    /// Shared default configuration.
    pub fn builtin() -> &'static RenderConfig {
        &BUILTIN
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> RenderResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!("loaded render config from {}", path.display());
        Ok(config)
    }

    /// Check every profile and the frame style.
    pub fn validate(&self) -> RenderResult<()> {
        self.warm_stock.validate()?;
        self.cool_stock.validate()?;
        self.frame.validate()
    }

    /// Profile for `kind`, or `None` for [`FilterKind::None`].
    pub fn profile(&self, kind: FilterKind) -> Option<&FilmProfile> {
        match kind {
            FilterKind::None => None,
            FilterKind::WarmStock => Some(&self.warm_stock),
            FilterKind::CoolStock => Some(&self.cool_stock),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> RenderResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;

    #[test]
    fn test_empty_document_is_default() {
        let config = RenderConfig::from_json_str("{}").unwrap();
        assert_eq!(config, RenderConfig::default());
        assert_eq!(&config, RenderConfig::builtin());
    }

    #[test]
    fn test_default_roundtrips_through_json() {
        let json = RenderConfig::default().to_json_pretty().unwrap();
        assert_eq!(RenderConfig::from_json_str(&json).unwrap(), RenderConfig::default());
    }

    #[test]
    fn test_partial_frame_override() {
        let config = RenderConfig::from_json_str(r#"{"frame": {"min_margin": 32}}"#).unwrap();
        assert_eq!(config.frame.min_margin, 32);
        assert_eq!(config.warm_stock, *FilmProfile::warm_stock());
    }

    #[test]
    fn test_profile_lookup() {
        let config = RenderConfig::default();
        assert!(config.profile(FilterKind::None).is_none());
        assert_eq!(config.profile(FilterKind::CoolStock).unwrap().name, "Cool Stock");
    }

    #[test]
    fn test_bad_json_and_bad_values() {
        assert!(matches!(RenderConfig::from_json_str("{"), Err(RenderError::Config(_))));
        let err = RenderConfig::from_json_str(r#"{"frame": {"paper_texture": {"tile_size": 0}}}"#).unwrap_err();
        assert!(matches!(err, RenderError::InvalidParameter(_)));
    }

    #[test]
    fn test_unbounded_blur_and_tile_are_rejected() {
        for doc in [
            r#"{"frame": {"shadow": {"blur": 1e30}}}"#,
            r#"{"frame": {"paper_texture": {"tile_size": 100000}}}"#,
        ] {
            let err = RenderConfig::from_json_str(doc).unwrap_err();
            assert!(matches!(err, RenderError::InvalidParameter(_)), "{doc}: {err}");
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = RenderConfig::load("/nonexistent/filmstock.json").unwrap_err();
        assert!(matches!(err, RenderError::Io(_)));
    }
}
