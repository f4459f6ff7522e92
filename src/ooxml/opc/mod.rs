//! Open Packaging Conventions (OPC) layer.
//!
//! Reads a zip-packaged presentation into memory, resolves relationships
//! between parts, and writes new packages with their content types.

pub mod constants;
pub mod package;
pub mod packuri;
pub mod rel;
pub mod writer;

pub use package::{ContentTypeMap, Package};
pub use packuri::PackURI;
pub use rel::{Relationship, Relationships};
pub use writer::PackageWriter;
