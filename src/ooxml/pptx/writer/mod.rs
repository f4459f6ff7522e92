//! Presentation writer: scene slides back to a `.pptx` package.

pub mod pres;
pub mod shape;
pub mod slide;

// Re-export main types
pub use pres::{PresentationWriter, write_presentation};
pub use shape::{MediaPart, ShapeWriter};
pub use slide::{SlidePart, write_slide};
