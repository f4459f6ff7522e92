//! Unified error types for slidescene.
//!
//! This module provides the single error type returned by both conversion
//! directions, presenting a consistent API to users.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
