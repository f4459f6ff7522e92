//! Conversion options.
//!
//! This module defines [`ConvertOptions`], shared by both conversion
//! directions, plus the fixed text defaults used when a document says nothing.

use serde::{Deserialize, Serialize};

/// Font family used when no run, paragraph or list style names one.
pub const DEFAULT_FONT_FAMILY: &str = "Arial";
/// Font size in points used when no style sets one.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;
/// Text color used when no style sets one.
pub const DEFAULT_TEXT_COLOR: &str = "#000000";
/// Stroke applied to auto-shapes and lines without an explicit outline.
pub const DEFAULT_STROKE_COLOR: &str = "#000000";
pub const DEFAULT_STROKE_WIDTH: f64 = 1.0;

/// How group shapes appear in the produced scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
    /// Splice group children into the enclosing object list.
    #[default]
    Flatten,
    /// Keep `group` objects with their children nested.
    Nested,
}

/// Options for converting between presentation packages and scene documents.
///
/// # Examples
///
/// ```rust
/// use slidescene::{ConvertOptions, GroupMode};
///
/// let options = ConvertOptions::new()
///     .with_group_mode(GroupMode::Nested)
///     .with_style_fallback(true);
/// assert_eq!(options.group_mode, GroupMode::Nested);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertOptions {
    /// Flatten or nest groups in the forward direction
    pub group_mode: GroupMode,
    /// Resolve `p:style` fill/line references when a shape has no explicit fill or line
    pub style_fallback: bool,
    /// Also prepend the background rectangle to each slide's object list
    pub background_in_objects: bool,
    /// Slide width in points when the package does not declare one
    pub default_slide_width: f64,
    /// Slide height in points when the package does not declare one
    pub default_slide_height: f64,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            group_mode: GroupMode::Flatten,
            style_fallback: false,
            background_in_objects: false,
            // 10in x 7.5in
            default_slide_width: 720.0,
            default_slide_height: 540.0,
        }
    }
}

impl ConvertOptions {
    /// Create a new `ConvertOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how groups are emitted.
    #[inline]
    pub fn with_group_mode(mut self, mode: GroupMode) -> Self {
        self.group_mode = mode;
        self
    }

    /// Set whether theme style references fill in missing fills and lines.
    ///
    /// Off by default, so a shape without a fill element converts to
    /// `transparent`.
    #[inline]
    pub fn with_style_fallback(mut self, enabled: bool) -> Self {
        self.style_fallback = enabled;
        self
    }

    #[inline]
    pub fn with_background_in_objects(mut self, enabled: bool) -> Self {
        self.background_in_objects = enabled;
        self
    }

    /// Set the fallback slide size in points.
    #[inline]
    pub fn with_default_slide_size(mut self, width: f64, height: f64) -> Self {
        self.default_slide_width = width;
        self.default_slide_height = height;
        self
    }
}
