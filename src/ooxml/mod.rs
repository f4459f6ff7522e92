//! Office Open XML (OOXML) format implementation.
//!
//! The module is organized into layers:
//!
//! 1. **DOM** (`dom`): a namespace-canonicalizing element tree over quick-xml
//! 2. **OPC Layer** (`opc`): package handling (ZIP, parts, content types, relationships)
//! 3. **PresentationML** (`pptx`): slide reading and writing
pub mod dom;
pub mod opc;
pub mod pptx;

// Re-export commonly used types from OPC layer
pub use opc::{Package, PackURI};
