//! Scene analysis backed by a saved service response.
//!
//! The binary has no network client. A response captured from the analysis
//! service (or written by hand) is replayed instead; without one, the
//! analyzer reports missing credentials and the default look is used.

use std::path::PathBuf;

use filmstock_core::{AnalysisError, AnalysisResult, PixelBuffer, SceneAnalyzer};

/// Replays a JSON response file.
#[derive(Debug, Clone, Default)]
pub struct ResponseFileAnalyzer {
    path: Option<PathBuf>,
}

impl ResponseFileAnalyzer {
    /// Analyzer reading `path`, or one with no credentials when `None`.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl SceneAnalyzer for ResponseFileAnalyzer {
    fn analyze(&self, _image: &PixelBuffer) -> Result<AnalysisResult, AnalysisError> {
        let path = self.path.as_ref().ok_or(AnalysisError::MissingCredentials)?;
        let body = std::fs::read_to_string(path)
            .map_err(|e| AnalysisError::Service(format!("{}: {e}", path.display())))?;
        AnalysisResult::from_json(&body)
    }
}
