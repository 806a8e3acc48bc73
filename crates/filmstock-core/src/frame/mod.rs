//! The instant-print frame and the render orchestration around it.

pub mod compositor;
pub mod geometry;
pub mod style;

pub use compositor::FrameCompositor;
pub use geometry::FrameGeometry;
pub use style::{DropShadow, FrameStyle};
