//! Color-space primitives used by the grading engine and effects.

pub mod hsl;

pub use hsl::{Hsl, hsl_to_rgb, luma, normalize_hue, rgb_to_hsl};
