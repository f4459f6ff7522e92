//! Fill, gradient and shadow descriptors.

use serde::{Deserialize, Serialize};

/// Sentinel fill value for "nothing painted".
pub const TRANSPARENT: &str = "transparent";

/// Object fill: a CSS color string (possibly `transparent`) or a gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Paint {
    Color(String),
    Gradient(Gradient),
}

impl Paint {
    #[inline]
    pub fn transparent() -> Self {
        Paint::Color(TRANSPARENT.to_string())
    }

    pub fn is_transparent(&self) -> bool {
        matches!(self, Paint::Color(c) if c.eq_ignore_ascii_case(TRANSPARENT))
    }

    /// The solid color, if this is a non-transparent color fill.
    pub fn as_color(&self) -> Option<&str> {
        match self {
            Paint::Color(c) if !c.eq_ignore_ascii_case(TRANSPARENT) => Some(c),
            _ => None,
        }
    }

    /// A single representative color: the solid color or the first gradient stop.
    pub fn representative_color(&self) -> Option<&str> {
        match self {
            Paint::Gradient(g) => g.color_stops.first().map(|s| s.color.as_str()),
            other => other.as_color(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    Linear,
    Radial,
}

/// Gradient endpoints in the unit square of the object's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientCoords {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r2: Option<f64>,
}

impl GradientCoords {
    /// Endpoints of a linear gradient running at `angle_deg`, both on the
    /// circle of radius 0.5 around the box center.
    pub fn linear(angle_deg: f64) -> Self {
        let theta = angle_deg.to_radians();
        let (sin, cos) = theta.sin_cos();
        Self {
            x1: 0.5 - 0.5 * cos,
            y1: 0.5 - 0.5 * sin,
            x2: 0.5 + 0.5 * cos,
            y2: 0.5 + 0.5 * sin,
            r1: None,
            r2: None,
        }
    }

    /// Fixed center-to-edge radial layout.
    pub fn radial() -> Self {
        Self {
            x1: 0.5,
            y1: 0.5,
            x2: 0.5,
            y2: 0.5,
            r1: Some(0.0),
            r2: Some(0.5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Position along the gradient axis in `[0, 1]`.
    pub offset: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gradient {
    #[serde(rename = "type")]
    pub kind: GradientKind,
    pub coords: GradientCoords,
    pub color_stops: Vec<ColorStop>,
}

/// Drop shadow; glow and soft edges are expressed as centered shadows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub color: String,
    pub blur: f64,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
    #[serde(default = "full_opacity")]
    pub opacity: f64,
}

fn full_opacity() -> f64 {
    1.0
}

/// Clip region in the object's local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "rect")]
pub struct ClipRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}
