//! Film grading: tone curves, grain, profiles and the per-pixel engine.

pub mod engine;
pub mod grain;
pub mod profile;
pub mod tone_curve;

pub use engine::GradingEngine;
pub use grain::GrainField;
pub use profile::{FilmProfile, FilterKind};
pub use tone_curve::{ToneCurve, ToneCurveKind};
