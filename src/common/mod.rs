//! Common types and utilities shared by both conversion directions.
//!
//! This module holds the error type, unit conversions, color arithmetic and
//! XML text helpers used by the OOXML reader and writer.

// Submodule declarations
pub mod error;
pub mod style;
pub mod unit;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};
pub use style::RGBColor;
