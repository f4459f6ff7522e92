//! Shape dispatch.
//!
//! Every child of a `p:spTree` is classified into exactly one [`ShapeKind`]
//! and handed to the matching builder, which produces at most one
//! [`SceneObject`]. Fill, outline, effect and custom-geometry enrichment is
//! layered on top of the per-kind result whenever the shape carries a
//! properties block.
//!
//! Groups always come back nested, with children already mapped to slide
//! coordinates; [`flatten`] splices them for the flat accessor.

pub mod picture;
pub mod xfrm;

pub use picture::{PictureImage, decode_data_url};
pub use xfrm::{Transform, Xfrm};

use crate::common::unit::{EMUS_PER_PT, angle_to_deg, normalize_degrees};
use crate::common::{Error, Result};
use crate::config::{ConvertOptions, DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WIDTH, GroupMode};
use crate::ooxml::dom::XmlNode;
use crate::ooxml::opc::{Package, Relationships};
use crate::ooxml::pptx::effects::shape_effect;
use crate::ooxml::pptx::fill::{FillContext, LineStyle, fill_from_properties, line_style, style_fill, style_line};
use crate::ooxml::pptx::geometry::{custom_geometry, line_path};
use crate::ooxml::pptx::text::extract_text_body;
use crate::ooxml::pptx::theme::Theme;
use crate::scene::paint::TRANSPARENT;
use crate::scene::{
    GroupObject, ImageObject, ObjectBase, Paint, PathData, PathObject, SceneObject, ShapeObject,
};
use tracing::{debug, warn};

/// Classification of a shape-tree element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// `p:grpSp`
    Group,
    /// `p:pic`
    Picture,
    /// Text box, or placeholder holding text
    Textbox,
    /// Preset-geometry `p:sp`
    AutoShape,
    /// `p:sp` with custom geometry
    Freeform,
    /// `p:cxnSp`, or a line preset
    Line,
    /// Graphic frames, content parts, empty placeholders, ...
    Unsupported,
}

const LINE_PRESETS: [&str; 2] = ["line", "straightConnector1"];

/// Classify one shape-tree child. Exactly one kind per element.
pub fn classify(node: &XmlNode) -> ShapeKind {
    match node.name() {
        "p:grpSp" => ShapeKind::Group,
        "p:pic" => ShapeKind::Picture,
        "p:cxnSp" => ShapeKind::Line,
        "p:sp" => classify_sp(node),
        _ => ShapeKind::Unsupported,
    }
}

fn classify_sp(sp: &XmlNode) -> ShapeKind {
    let is_text_box = sp
        .path(&["p:nvSpPr", "p:cNvSpPr"])
        .is_some_and(|c| c.attr_bool("txBox"));
    let placeholder = sp.path(&["p:nvSpPr", "p:nvPr", "p:ph"]).is_some();
    let has_text = sp
        .child("p:txBody")
        .is_some_and(|body| body.find_all("a:t").iter().any(|t| !t.text().trim().is_empty()));

    if is_text_box || (placeholder && has_text) {
        return ShapeKind::Textbox;
    }
    if placeholder {
        return ShapeKind::Unsupported;
    }
    let Some(props) = sp.child("p:spPr") else {
        return ShapeKind::AutoShape;
    };
    if props.child("a:custGeom").is_some() {
        return ShapeKind::Freeform;
    }
    match props.child("a:prstGeom").and_then(|g| g.attr("prst")) {
        Some(prst) if LINE_PRESETS.contains(&prst) => ShapeKind::Line,
        _ => ShapeKind::AutoShape,
    }
}

/// Per-slide inputs shared by every shape on it.
#[derive(Debug, Clone, Copy)]
pub struct SlideContext<'a> {
    pub package: &'a Package,
    /// Relationships of the slide part, for image lookups.
    pub rels: &'a Relationships,
    pub theme: &'a Theme,
    pub layout: Option<&'a XmlNode>,
    pub master: Option<&'a XmlNode>,
    pub options: &'a ConvertOptions,
}

/// State inherited from enclosing groups.
#[derive(Debug, Clone, Copy, Default)]
struct Scope<'p> {
    transform: Transform,
    /// Added to child rotation; positions are not rotated.
    angle: f64,
    group_fill: Option<&'p Paint>,
}

/// Dispatch every shape of a shape tree, in document order.
///
/// A shape that fails is logged and dropped; the rest of the tree is kept.
pub fn dispatch_tree(sp_tree: &XmlNode, ctx: &SlideContext<'_>) -> Vec<SceneObject> {
    dispatch_children(sp_tree, ctx, Scope::default())
}

fn dispatch_children(parent: &XmlNode, ctx: &SlideContext<'_>, scope: Scope<'_>) -> Vec<SceneObject> {
    let mut objects = Vec::new();
    for node in parent.children() {
        if matches!(node.name(), "p:nvGrpSpPr" | "p:grpSpPr" | "p:extLst") {
            continue;
        }
        match dispatch_shape(node, ctx, scope) {
            Ok(Some(object)) => objects.push(object),
            Ok(None) => {},
            Err(e) => warn!(error = %e, "dropping shape"),
        }
    }
    objects
}

/// Apply the configured group mode to a dispatched object list.
pub fn apply_group_mode(objects: Vec<SceneObject>, mode: GroupMode) -> Vec<SceneObject> {
    match mode {
        GroupMode::Nested => objects,
        GroupMode::Flatten => flatten(objects),
    }
}

/// Inline-splice accessor over a list.
pub fn flatten(objects: Vec<SceneObject>) -> Vec<SceneObject> {
    objects.into_iter().flat_map(SceneObject::into_flat).collect()
}

fn shape_name(node: &XmlNode) -> &str {
    node.children()
        .iter()
        .find_map(|nv| nv.child("p:cNvPr"))
        .and_then(|c| c.attr("name"))
        .unwrap_or("")
}

/// Dispatch one shape-tree element.
fn dispatch_shape(node: &XmlNode, ctx: &SlideContext<'_>, scope: Scope<'_>) -> Result<Option<SceneObject>> {
    let kind = classify(node);
    let name = shape_name(node);
    debug!(?kind, name, "dispatching shape");

    let object = match kind {
        ShapeKind::Unsupported => {
            debug!(element = node.name(), name, "unsupported shape dropped");
            return Ok(None);
        },
        ShapeKind::Group => return group(node, ctx, scope),
        ShapeKind::Picture => picture(node, name, ctx, scope)?,
        ShapeKind::Textbox => textbox(node, ctx, scope),
        ShapeKind::AutoShape => auto_shape(node, ctx, scope),
        ShapeKind::Freeform => freeform(node, name, ctx, scope)?,
        ShapeKind::Line => line(node, ctx, scope),
    };
    Ok(Some(object))
}

fn shape_xfrm(node: &XmlNode, ctx: &SlideContext<'_>) -> Xfrm {
    if let Some(x) = Xfrm::of_shape(node) {
        return x;
    }
    xfrm::placeholder_of(node)
        .and_then(|ph| xfrm::inherited_xfrm(ph, ctx.layout, ctx.master))
        .unwrap_or_default()
}

/// Position, size, rotation, flips and name.
fn base_of(node: &XmlNode, xfrm: &Xfrm, scope: Scope<'_>) -> ObjectBase {
    let (x, y, cx, cy) = scope.transform.apply(xfrm.x, xfrm.y, xfrm.cx, xfrm.cy);
    let name = shape_name(node);
    ObjectBase {
        left: x / EMUS_PER_PT as f64,
        top: y / EMUS_PER_PT as f64,
        width: cx / EMUS_PER_PT as f64,
        height: cy / EMUS_PER_PT as f64,
        angle: normalize_degrees(angle_to_deg(xfrm.rot) + scope.angle),
        flip_x: xfrm.flip_h,
        flip_y: xfrm.flip_v,
        name: (!name.is_empty()).then(|| name.to_string()),
        ..Default::default()
    }
}

fn properties(node: &XmlNode) -> Option<&XmlNode> {
    node.child("p:spPr").or_else(|| node.child("p:grpSpPr"))
}

/// Explicit fill, then the theme style reference when enabled, else transparent.
fn resolve_fill(node: &XmlNode, ctx: &SlideContext<'_>, scope: Scope<'_>) -> Paint {
    let fill_ctx = FillContext {
        theme: ctx.theme,
        group_fill: scope.group_fill,
    };
    if let Some(paint) = properties(node).and_then(|p| fill_from_properties(p, &fill_ctx)) {
        return paint;
    }
    if ctx.options.style_fallback {
        if let Some(paint) = node.child("p:style").and_then(|s| style_fill(s, ctx.theme)) {
            return paint;
        }
    }
    Paint::transparent()
}

/// Outline of a shape; `with_default` substitutes the default stroke for
/// missing color or width.
fn resolve_stroke(node: &XmlNode, ctx: &SlideContext<'_>, with_default: bool) -> (Option<String>, Option<f64>) {
    let declared = properties(node).map_or(LineStyle::Unspecified, |p| line_style(p, ctx.theme));
    let from_style = || {
        if ctx.options.style_fallback {
            node.child("p:style")
                .map_or(LineStyle::Unspecified, |s| style_line(s, ctx.theme))
        } else {
            LineStyle::Unspecified
        }
    };
    let (color, width) = match declared {
        LineStyle::NoLine => return (None, None),
        LineStyle::Line { color, width } => {
            let style_color = match (&color, from_style()) {
                (None, LineStyle::Line { color, .. }) => color,
                _ => None,
            };
            (color.or(style_color), width)
        },
        LineStyle::Unspecified => match from_style() {
            LineStyle::NoLine => return (None, None),
            LineStyle::Line { color, width } => (color, width),
            LineStyle::Unspecified => (None, None),
        },
    };
    if with_default {
        (
            Some(color.unwrap_or_else(|| DEFAULT_STROKE_COLOR.to_string())),
            Some(width.unwrap_or(DEFAULT_STROKE_WIDTH)),
        )
    } else {
        // A width alone is not an outline
        match color {
            Some(c) => (Some(c), Some(width.unwrap_or(DEFAULT_STROKE_WIDTH))),
            None => (None, None),
        }
    }
}

fn apply_effect(base: &mut ObjectBase, node: &XmlNode, ctx: &SlideContext<'_>) {
    if let Some(shadow) = properties(node).and_then(|p| shape_effect(p, ctx.theme)) {
        base.shadow = Some(shadow);
    }
}

fn group(node: &XmlNode, ctx: &SlideContext<'_>, scope: Scope<'_>) -> Result<Option<SceneObject>> {
    let xfrm = Xfrm::of_shape(node).unwrap_or_default();
    let mut base = base_of(node, &xfrm, scope);
    let fill = resolve_fill(node, ctx, scope);
    let child_scope = Scope {
        transform: Transform::for_group(&xfrm).then(scope.transform),
        angle: scope.angle + angle_to_deg(xfrm.rot),
        group_fill: Some(&fill),
    };
    let objects = dispatch_children(node, ctx, child_scope);
    if objects.is_empty() {
        debug!("empty group dropped");
        return Ok(None);
    }
    apply_effect(&mut base, node, ctx);
    Ok(Some(SceneObject::Group(GroupObject { base, objects })))
}

fn picture(node: &XmlNode, name: &str, ctx: &SlideContext<'_>, scope: Scope<'_>) -> Result<SceneObject> {
    let image = PictureImage::from_picture(node, name, ctx.package, ctx.rels)?;
    let xfrm = shape_xfrm(node, ctx);
    let mut base = base_of(node, &xfrm, scope);
    base.opacity = Some(image.opacity);
    let (stroke, stroke_width) = resolve_stroke(node, ctx, false);
    base.stroke = stroke;
    base.stroke_width = stroke_width;
    apply_effect(&mut base, node, ctx);
    Ok(SceneObject::Image(ImageObject {
        base,
        src: image.to_data_url(),
        cross_origin: Some("anonymous".to_string()),
    }))
}

fn textbox(node: &XmlNode, ctx: &SlideContext<'_>, scope: Scope<'_>) -> SceneObject {
    let xfrm = shape_xfrm(node, ctx);
    let mut base = base_of(node, &xfrm, scope);
    let (stroke, stroke_width) = resolve_stroke(node, ctx, false);
    base.stroke = stroke;
    base.stroke_width = stroke_width;
    apply_effect(&mut base, node, ctx);

    // list styles of the layout/master placeholder this shape fills
    let inherited: Vec<&XmlNode> = xfrm::placeholder_of(node)
        .map(|ph| {
            [ctx.layout, ctx.master]
                .into_iter()
                .flatten()
                .filter_map(|root| xfrm::find_placeholder(ph, root))
                .filter_map(|sp| sp.path(&["p:txBody", "a:lstStyle"]))
                .collect()
        })
        .unwrap_or_default();

    let body = node
        .child("p:txBody")
        .map(|b| extract_text_body(b, ctx.theme, &inherited))
        .unwrap_or_default();
    let mut textbox = body.into_textbox(base);
    let fill = resolve_fill(node, ctx, scope);
    textbox.background_color = Some(fill.representative_color().unwrap_or(TRANSPARENT).to_string());
    SceneObject::Textbox(textbox)
}

fn auto_shape(node: &XmlNode, ctx: &SlideContext<'_>, scope: Scope<'_>) -> SceneObject {
    let xfrm = shape_xfrm(node, ctx);
    let mut base = base_of(node, &xfrm, scope);
    base.fill = Some(resolve_fill(node, ctx, scope));
    let (stroke, stroke_width) = resolve_stroke(node, ctx, true);
    base.stroke = stroke;
    base.stroke_width = stroke_width;
    apply_effect(&mut base, node, ctx);

    let preset = properties(node)
        .and_then(|p| p.child("a:prstGeom"))
        .and_then(|g| g.attr("prst"));
    if preset == Some("triangle") {
        // marker triangles point down
        base.angle = normalize_degrees(base.angle + 180.0);
        return SceneObject::Triangle(ShapeObject { base });
    }
    SceneObject::Rect(ShapeObject { base })
}

fn freeform(node: &XmlNode, name: &str, ctx: &SlideContext<'_>, scope: Scope<'_>) -> Result<SceneObject> {
    let xfrm = shape_xfrm(node, ctx);
    let mut base = base_of(node, &xfrm, scope);
    let cust_geom = properties(node)
        .and_then(|p| p.child("a:custGeom"))
        .ok_or_else(|| Error::shape(name, "freeform without custom geometry"))?;
    // box size after any group scaling
    let geometry = custom_geometry(
        cust_geom,
        (base.width * EMUS_PER_PT as f64).round() as i64,
        (base.height * EMUS_PER_PT as f64).round() as i64,
    );

    base.fill = Some(resolve_fill(node, ctx, scope));
    let (stroke, stroke_width) = resolve_stroke(node, ctx, false);
    base.stroke = stroke;
    base.stroke_width = stroke_width;
    apply_effect(&mut base, node, ctx);

    Ok(SceneObject::Path(PathObject {
        base,
        path: PathData(geometry.commands),
        clip_path: geometry.clip,
    }))
}

fn line(node: &XmlNode, ctx: &SlideContext<'_>, scope: Scope<'_>) -> SceneObject {
    let xfrm = shape_xfrm(node, ctx);
    let mut base = base_of(node, &xfrm, scope);
    let commands = line_path(base.width, base.height, xfrm.flip_h, xfrm.flip_v);
    base.fill = Some(Paint::transparent());
    let (stroke, stroke_width) = resolve_stroke(node, ctx, true);
    base.stroke = stroke;
    base.stroke_width = stroke_width;
    apply_effect(&mut base, node, ctx);
    SceneObject::Path(PathObject {
        base,
        path: PathData(commands),
        clip_path: None,
    })
}
