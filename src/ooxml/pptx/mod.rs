//! PowerPoint (.pptx) presentation support.
//!
//! Reading turns each slide's shape tree into scene objects: shapes are
//! classified and dispatched in [`shapes`], and their colors, fills, effects,
//! geometry and text are resolved by the sibling modules against the
//! presentation [`theme`]. Writing goes the other way through [`writer`].
//!
//! # Example
//!
//! ```rust,no_run
//! use slidescene::ConvertOptions;
//! use slidescene::ooxml::pptx::PresentationReader;
//!
//! let bytes = std::fs::read("deck.pptx")?;
//! let options = ConvertOptions::default();
//! let reader = PresentationReader::new(&bytes, &options)?;
//! for slide in reader.read_slides(&options)? {
//!     println!("slide {}: {} objects", slide.slide_number, slide.objects.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod color;
pub mod effects;
pub mod fill;
pub mod geometry;
pub mod reader;
pub mod shapes;
pub mod template;
pub mod text;
pub mod theme;
pub mod writer;

pub use reader::{PresentationReader, read_presentation};
pub use theme::{Theme, ThemeRole};
pub use writer::{PresentationWriter, write_presentation};
