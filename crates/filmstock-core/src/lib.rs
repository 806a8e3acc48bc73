//! Filmstock Core: analog-film print rendering.
//!
//! This crate turns a decoded RGBA8 photo into a framed instant print with a
//! simulated film look: tone curves, white balance, HSL remapping, grain,
//! halation, vignette and a textured paper frame. No file or network I/O
//! beyond optional JSON config loading.

pub mod analysis;
pub mod color;
pub mod config;
pub mod effects;
pub mod error;
pub mod frame;
pub mod grading;
pub mod image;

use rand::SeedableRng;
use rand::rngs::StdRng;

// Re-exports for convenience.
pub use analysis::{AnalysisError, AnalysisResult, SceneAnalyzer, analyze_or_default};
pub use config::RenderConfig;
pub use error::{RenderError, RenderResult};
pub use frame::{FrameCompositor, FrameGeometry, FrameStyle};
pub use grading::{FilmProfile, FilterKind, GradingEngine};
pub use image::{PixelBuffer, Rect};

/// Render `source` with the built-in configuration and fresh randomness.
pub fn render(source: &PixelBuffer, filter: FilterKind) -> RenderResult<PixelBuffer> {
    let mut rng = StdRng::from_entropy();
    FrameCompositor::new(RenderConfig::builtin())?.render(source, filter, &mut rng)
}
