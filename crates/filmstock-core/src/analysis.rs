//! Boundary to the external scene-analysis service.
//!
//! The service looks at a photo and suggests a film look plus a short
//! caption. It is optional and unreliable, so callers go through
//! [`analyze_or_default`], which turns every failure into a usable
//! suggestion and never blocks a render.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::grading::profile::FilterKind;
use crate::image::PixelBuffer;

/// Caption used when no credentials are configured.
pub const MISSING_CREDENTIALS_CAPTION: &str = "Golden memories.";
/// Caption used when the service fails for any other reason.
pub const FALLBACK_CAPTION: &str = "Moment captured.";

/// Failures of the analysis service.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No API credentials are configured.
    #[error("analysis credentials are not configured")]
    MissingCredentials,

    /// The service answered with an empty body.
    #[error("analysis service returned an empty response")]
    EmptyResponse,

    /// The response is not the expected JSON.
    #[error("malformed analysis response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Transport or service-side failure.
    #[error("analysis service failed: {0}")]
    Service(String),
}

/// A suggested look for one photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Suggested filter.
    #[serde(deserialize_with = "filter_by_name")]
    pub suggested_filter: FilterKind,
    /// Short explanation, if the service gave one.
    #[serde(default)]
    pub reasoning: Option<String>,
    /// Caption for the print's bottom strip.
    pub caption: String,
}

impl AnalysisResult {
    /// Parse a service response body.
    pub fn from_json(body: &str) -> Result<Self, AnalysisError> {
        if body.trim().is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }
        Ok(serde_json::from_str(body)?)
    }

    /// Suggestion used when no credentials are configured.
    pub fn missing_credentials() -> Self {
        Self {
            suggested_filter: FilterKind::WarmStock,
            reasoning: Some("No API key configured; warm stock is the default.".to_string()),
            caption: MISSING_CREDENTIALS_CAPTION.to_string(),
        }
    }

    /// Suggestion used after any other failure.
    pub fn fallback() -> Self {
        Self {
            suggested_filter: FilterKind::WarmStock,
            reasoning: Some("Analysis unavailable.".to_string()),
            caption: FALLBACK_CAPTION.to_string(),
        }
    }
}

/// Accepts any spelling [`FilterKind`]'s `FromStr` does (`WARM_STOCK`, `warm`, …).
fn filter_by_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<FilterKind, D::Error> {
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(serde::de::Error::custom)
}

/// Something that can suggest a look for a photo.
pub trait SceneAnalyzer {
    /// Analyse `image`.
    fn analyze(&self, image: &PixelBuffer) -> Result<AnalysisResult, AnalysisError>;
}

/// Ask `analyzer` for a suggestion, substituting a default on failure.
pub fn analyze_or_default<A: SceneAnalyzer + ?Sized>(analyzer: &A, image: &PixelBuffer) -> AnalysisResult {
    match analyzer.analyze(image) {
        Ok(result) => {
            tracing::debug!("analysis suggested {}", result.suggested_filter);
            result
        }
        Err(AnalysisError::MissingCredentials) => {
            tracing::warn!("analysis skipped: credentials not configured");
            AnalysisResult::missing_credentials()
        }
        Err(e) => {
            tracing::warn!("analysis failed, using fallback: {e}");
            AnalysisResult::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(fn() -> Result<AnalysisResult, AnalysisError>);

    impl SceneAnalyzer for Canned {
        fn analyze(&self, _image: &PixelBuffer) -> Result<AnalysisResult, AnalysisError> {
            (self.0)()
        }
    }

    fn image() -> PixelBuffer {
        PixelBuffer::from_rgba(1, 1, vec![0, 0, 0, 255]).unwrap()
    }

    #[test]
    fn test_parse_service_response() {
        let r = AnalysisResult::from_json(
            r#"{"suggestedFilter":"COOL_STOCK","reasoning":"deep greens","caption":"Forest light."}"#,
        )
        .unwrap();
        assert_eq!(r.suggested_filter, FilterKind::CoolStock);
        assert_eq!(r.reasoning.as_deref(), Some("deep greens"));
        assert_eq!(r.caption, "Forest light.");
    }

    #[test]
    fn test_reasoning_is_optional_and_names_are_lenient() {
        let r = AnalysisResult::from_json(r#"{"suggestedFilter":"warm","caption":"x"}"#).unwrap();
        assert_eq!(r.suggested_filter, FilterKind::WarmStock);
        assert!(r.reasoning.is_none());
    }

    #[test]
    fn test_unknown_filter_is_malformed() {
        let err = AnalysisResult::from_json(r#"{"suggestedFilter":"SEPIA","caption":"x"}"#).unwrap_err();
        assert!(matches!(err, AnalysisError::Malformed(_)));
        assert!(matches!(AnalysisResult::from_json("  "), Err(AnalysisError::EmptyResponse)));
    }

    #[test]
    fn test_missing_credentials_fallback() {
        let r = analyze_or_default(&Canned(|| Err(AnalysisError::MissingCredentials)), &image());
        assert_eq!(r.suggested_filter, FilterKind::WarmStock);
        assert_eq!(r.caption, MISSING_CREDENTIALS_CAPTION);
    }

    #[test]
    fn test_service_failure_fallback() {
        let r = analyze_or_default(&Canned(|| Err(AnalysisError::Service("timeout".into()))), &image());
        assert_eq!(r.suggested_filter, FilterKind::WarmStock);
        assert_eq!(r.caption, FALLBACK_CAPTION);
    }

    #[test]
    fn test_success_passes_through_including_none() {
        let r = analyze_or_default(
            &Canned(|| {
                Ok(AnalysisResult {
                    suggested_filter: FilterKind::None,
                    reasoning: None,
                    caption: "Plain.".into(),
                })
            }),
            &image(),
        );
        assert_eq!(r.suggested_filter, FilterKind::None);
        assert_eq!(r.caption, "Plain.");
    }
}
