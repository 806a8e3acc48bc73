//! Image effects layered around the grading pass.

pub mod blend;
pub mod blur;
pub mod halation;
pub mod paper;
pub mod vignette;

pub use blend::BlendMode;
pub use halation::HalationEffect;
pub use paper::PaperTexture;
pub use vignette::{GradientStop, Vignette};
