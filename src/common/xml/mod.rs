//! XML text helpers shared by the reader and the writers.

mod escape;

pub use escape::{escape_xml, unescape_xml};
