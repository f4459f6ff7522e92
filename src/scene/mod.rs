//! Scene description model.
//!
//! A scene document is an ordered list of [`SceneSlide`]s, each holding an
//! ordered list of [`SceneObject`]s in a canvas-editor friendly JSON layout:
//! camelCase keys, a `type` tag per object, lengths in points and angles in
//! degrees.
//!
//! Deserialization is lenient the way canvas exports need it to be: objects
//! of unknown kinds are skipped, numeric fields accept numeric strings and
//! missing fields take defaults.

pub mod paint;
pub mod path;

pub use paint::{ClipRect, ColorStop, Gradient, GradientCoords, GradientKind, Paint, Shadow};
pub use path::{PathCommand, PathData};

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// One slide of a scene document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSlide {
    #[serde(default, deserialize_with = "lenient_objects")]
    pub objects: Vec<SceneObject>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub width: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub height: f64,
    #[serde(default)]
    pub slide_number: u32,
    #[serde(default, deserialize_with = "lenient_background")]
    pub background: Option<Box<SceneObject>>,
}

/// A drawable element, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SceneObject {
    Rect(ShapeObject),
    Triangle(ShapeObject),
    Textbox(TextboxObject),
    Path(PathObject),
    Image(ImageObject),
    Group(GroupObject),
}

/// Attributes shared by every object kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectBase {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub left: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub top: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub width: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub height: f64,
    /// Rotation in degrees, normalized to `[0, 360)`.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub angle: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Paint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub flip_x: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub flip_y: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Rect and triangle objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeObject {
    #[serde(flatten)]
    pub base: ObjectBase,
}

/// Per-character style override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub linethrough: bool,
    /// `"sub"` or `"super"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<String>,
    /// Alignment of the paragraph holding the character.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
}

/// Text box. `fill` on the base carries the dominant text color; the shape's
/// own fill is reported as `backgroundColor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextboxObject {
    #[serde(flatten)]
    pub base: ObjectBase,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size", deserialize_with = "lenient_f64")]
    pub font_size: f64,
    #[serde(default = "default_font_weight")]
    pub font_weight: String,
    #[serde(default = "default_font_style")]
    pub font_style: String,
    #[serde(default = "default_text_align")]
    pub text_align: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Sparse style map keyed by character offset into `text`.
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "offset_keyed_styles"
    )]
    pub styles: BTreeMap<usize, CharStyle>,
}

impl Default for TextboxObject {
    fn default() -> Self {
        Self {
            base: ObjectBase::default(),
            text: String::new(),
            font_family: default_font_family(),
            font_size: default_font_size(),
            font_weight: default_font_weight(),
            font_style: default_font_style(),
            text_align: default_text_align(),
            line_height: None,
            background_color: None,
            styles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathObject {
    #[serde(flatten)]
    pub base: ObjectBase,
    #[serde(default)]
    pub path: PathData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_path: Option<ClipRect>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageObject {
    #[serde(flatten)]
    pub base: ObjectBase,
    /// `data:<content-type>;base64,<payload>` URL.
    #[serde(default)]
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_origin: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupObject {
    #[serde(flatten)]
    pub base: ObjectBase,
    #[serde(default, deserialize_with = "lenient_objects")]
    pub objects: Vec<SceneObject>,
}

impl SceneObject {
    /// The `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            SceneObject::Rect(_) => "rect",
            SceneObject::Triangle(_) => "triangle",
            SceneObject::Textbox(_) => "textbox",
            SceneObject::Path(_) => "path",
            SceneObject::Image(_) => "image",
            SceneObject::Group(_) => "group",
        }
    }

    pub fn base(&self) -> &ObjectBase {
        match self {
            SceneObject::Rect(o) | SceneObject::Triangle(o) => &o.base,
            SceneObject::Textbox(o) => &o.base,
            SceneObject::Path(o) => &o.base,
            SceneObject::Image(o) => &o.base,
            SceneObject::Group(o) => &o.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut ObjectBase {
        match self {
            SceneObject::Rect(o) | SceneObject::Triangle(o) => &mut o.base,
            SceneObject::Textbox(o) => &mut o.base,
            SceneObject::Path(o) => &mut o.base,
            SceneObject::Image(o) => &mut o.base,
            SceneObject::Group(o) => &mut o.base,
        }
    }

    /// Inline-splice accessor: groups are replaced by their (recursively
    /// flattened) children, everything else is returned as is.
    pub fn into_flat(self) -> Vec<SceneObject> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<SceneObject>) {
        match self {
            SceneObject::Group(group) => {
                for child in group.objects {
                    child.flatten_into(out);
                }
            },
            other => out.push(other),
        }
    }

    /// Full-slide background rectangle.
    pub fn background(width: f64, height: f64, fill: Paint) -> Self {
        SceneObject::Rect(ShapeObject {
            base: ObjectBase {
                width,
                height,
                fill: Some(fill),
                selectable: Some(false),
                ..Default::default()
            },
        })
    }
}

impl SceneSlide {
    /// Empty slide of the given size.
    pub fn new(width: f64, height: f64, slide_number: u32) -> Self {
        Self {
            objects: Vec::new(),
            width,
            height,
            slide_number,
            background: None,
        }
    }
}

/// Parse a scene document: a bare slide array or an object with a `fabric` array.
pub fn slides_from_json(json: &str) -> crate::Result<Vec<SceneSlide>> {
    let value: Value = serde_json::from_str(json)?;
    let slides = match value {
        Value::Object(mut map) => match map.remove("fabric") {
            Some(inner) => inner,
            None => {
                return Err(crate::Error::InvalidFormat(
                    "scene object must carry a 'fabric' slide array".to_string(),
                ));
            },
        },
        other => other,
    };
    Ok(serde_json::from_value(slides)?)
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn default_font_family() -> String {
    crate::config::DEFAULT_FONT_FAMILY.to_string()
}

fn default_font_size() -> f64 {
    crate::config::DEFAULT_FONT_SIZE
}

fn default_font_weight() -> String {
    "normal".to_string()
}

fn default_font_style() -> String {
    "normal".to_string()
}

fn default_text_align() -> String {
    "left".to_string()
}

/// Numbers, numeric strings, or anything else as `0`.
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// Offsets arrive as string keys; entries with non-numeric keys are dropped.
fn offset_keyed_styles<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<usize, CharStyle>, D::Error> {
    let raw = Option::<BTreeMap<String, CharStyle>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|(k, v)| k.trim().parse::<usize>().ok().map(|k| (k, v)))
        .collect())
}

fn parse_object(value: Value) -> Option<SceneObject> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("<untyped>")
        .to_string();
    match serde_json::from_value::<SceneObject>(value) {
        Ok(obj) => Some(obj),
        Err(err) => {
            debug!(kind = %kind, error = %err, "skipping scene object");
            None
        },
    }
}

fn lenient_objects<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<SceneObject>, D::Error> {
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values.into_iter().filter_map(parse_object).collect())
}

fn lenient_background<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Box<SceneObject>>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        // A bare color is accepted as a full-slide fill.
        Value::String(color) => Some(Box::new(SceneObject::background(
            0.0,
            0.0,
            Paint::Color(color),
        ))),
        other => parse_object(other).map(Box::new),
    })
}
