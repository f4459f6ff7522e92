//! Unified error type for slidescene.
//!
//! Only structural failures surface through this type. Missing elements and
//! unsupported features are modeled as `Option`/defaults by the extractors and
//! never reach the caller; a failure confined to one shape is reported as
//! [`Error::Shape`] and swallowed by the slide assembler.
use thiserror::Error;

/// Main error type for slidescene operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The ZIP container could not be opened or written
    #[error("ZIP error: {0}")]
    Zip(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// A required package part is missing
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// The package opened but does not look like a presentation
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// The scene description could not be parsed or emitted
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A single shape could not be converted
    #[error("Shape '{name}' failed: {reason}")]
    Shape { name: String, reason: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a shape-scoped error.
    pub fn shape(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Shape {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is confined to a single shape.
    #[inline]
    pub fn is_shape_local(&self) -> bool {
        matches!(self, Error::Shape { .. })
    }
}

/// Result type for slidescene operations.
pub type Result<T> = std::result::Result<T, Error>;
