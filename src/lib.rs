//! slidescene - convert PowerPoint presentations to and from canvas scenes
//!
//! This library reads Office Open XML presentations (.pptx) and produces a
//! JSON-friendly scene description: per slide, an ordered list of positioned,
//! styled objects (rectangles, triangles, text boxes, vector paths, images
//! and groups) in points and degrees. It can also rebuild a presentation
//! from such a description.
//!
//! # Features
//!
//! - **Theme-aware colors**: scheme, system and preset colors with luminance,
//!   tint, shade and alpha modifiers
//! - **Fills and effects**: solid and gradient fills, outer shadows, glow and
//!   soft edges
//! - **Geometry**: custom geometry paths with guide evaluation, arcs, lines
//!   and connectors, group coordinate spaces, placeholder inheritance
//! - **Text**: run style inheritance with a per-character style map
//! - **Round trip**: scene slides back to a complete `.pptx` package
//!
//! # Example - presentation to scene
//!
//! ```no_run
//! use slidescene::{ConvertOptions, pptx_file_to_scene};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let slides = pptx_file_to_scene("deck.pptx", &ConvertOptions::default())?;
//! for slide in &slides {
//!     println!("slide {} has {} objects", slide.slide_number, slide.objects.len());
//! }
//! println!("{}", serde_json::to_string_pretty(&slides)?);
//! # Ok(())
//! # }
//! ```
//!
//! # Example - scene to presentation
//!
//! ```no_run
//! use slidescene::{ConvertOptions, scene_json_to_pptx};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let json = r##"[{"width": 720, "height": 540, "objects": [
//!     {"type": "rect", "left": 100, "top": 100, "width": 200, "height": 50, "fill": "#4472c4"}
//! ]}]"##;
//! let bytes = scene_json_to_pptx(json, &ConvertOptions::default())?;
//! std::fs::write("out.pptx", bytes)?;
//! # Ok(())
//! # }
//! ```

/// Common utilities shared across the reader and writer
pub mod common;

/// Conversion options
pub mod config;

/// OOXML package, DOM and PresentationML support
pub mod ooxml;

/// Scene description model
pub mod scene;

use std::path::Path;

pub use common::{Error, Result};
pub use config::{ConvertOptions, GroupMode};
pub use scene::{
    ClipRect, ColorStop, Gradient, GradientCoords, GradientKind, ObjectBase, Paint, PathCommand, PathData,
    SceneObject, SceneSlide, Shadow,
};

/// Convert presentation bytes to scene slides.
pub fn pptx_to_scene(bytes: &[u8], options: &ConvertOptions) -> Result<Vec<SceneSlide>> {
    ooxml::pptx::read_presentation(bytes, options)
}

/// Convert a presentation file to scene slides.
pub fn pptx_file_to_scene<P: AsRef<Path>>(path: P, options: &ConvertOptions) -> Result<Vec<SceneSlide>> {
    let bytes = std::fs::read(path)?;
    pptx_to_scene(&bytes, options)
}

/// Build presentation bytes from scene slides.
pub fn scene_to_pptx(slides: &[SceneSlide], options: &ConvertOptions) -> Result<Vec<u8>> {
    ooxml::pptx::write_presentation(slides, options)
}

/// Build presentation bytes from a scene document: a slide array or an
/// object with a `fabric` slide array.
pub fn scene_json_to_pptx(json: &str, options: &ConvertOptions) -> Result<Vec<u8>> {
    let slides = scene::slides_from_json(json)?;
    scene_to_pptx(&slides, options)
}
