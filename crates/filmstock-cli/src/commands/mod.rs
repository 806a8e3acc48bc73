//! CLI command implementations

pub mod geometry;
pub mod profiles;
pub mod render;
