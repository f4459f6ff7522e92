//! Scene objects to shape-tree elements.
//!
//! Each object kind has one writer. Geometry is converted from points to
//! EMU; fills and strokes become solid DrawingML colors. Gradients, per-run
//! text styles and effects are not reconstructed.

use crate::common::Result;
use crate::common::style::RGBColor;
use crate::common::unit::{deg_to_angle, normalize_degrees, pt_to_emu, unit_to_pct};
use crate::common::xml::escape_xml;
use crate::config::DEFAULT_STROKE_WIDTH;
use crate::ooxml::opc::{PackURI, Relationships};
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::pptx::geometry::{ArcParams, svg_arc_to_arc_to};
use crate::ooxml::pptx::shapes::{decode_data_url, picture::media_partname};
use crate::ooxml::pptx::text::Alignment;
use crate::scene::{ImageObject, ObjectBase, PathCommand, PathObject, SceneObject, TextboxObject};
use std::fmt::Write as FmtWrite;
use tracing::{debug, warn};

/// A media part collected while writing slides.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaPart {
    pub partname: PackURI,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Writes the objects of one slide into its shape tree.
///
/// Shape ids are unique per slide; id 1 belongs to the tree itself. Images
/// are appended to the presentation-wide media list and referenced through
/// the slide's relationships.
pub struct ShapeWriter<'a> {
    next_id: u32,
    rels: &'a mut Relationships,
    media: &'a mut Vec<MediaPart>,
}

impl<'a> ShapeWriter<'a> {
    pub fn new(rels: &'a mut Relationships, media: &'a mut Vec<MediaPart>) -> Self {
        Self {
            next_id: 2,
            rels,
            media,
        }
    }

    fn take_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Append the element for `object`. Groups are spliced: their children
    /// already carry slide coordinates.
    pub fn write(&mut self, xml: &mut String, object: &SceneObject) -> Result<()> {
        debug!(kind = object.kind(), "writing object");
        match object {
            SceneObject::Group(group) => {
                for child in &group.objects {
                    self.write(xml, child)?;
                }
                Ok(())
            },
            SceneObject::Rect(shape) => self.write_preset(xml, &shape.base, "rect", shape.base.angle),
            // the reader turns triangles around by 180 degrees
            SceneObject::Triangle(shape) => {
                let angle = normalize_degrees(shape.base.angle - 180.0);
                self.write_preset(xml, &shape.base, "triangle", angle)
            },
            SceneObject::Textbox(textbox) => self.write_textbox(xml, textbox),
            SceneObject::Path(path) => self.write_path(xml, path),
            SceneObject::Image(image) => match self.write_picture(xml, image) {
                Ok(()) => Ok(()),
                Err(e) => {
                    warn!(error = %e, name = image.base.name.as_deref(), "skipping image");
                    Ok(())
                },
            },
        }
    }

    fn open_sp(&mut self, xml: &mut String, base: &ObjectBase, default_name: &str, txbox: bool) -> Result<()> {
        let id = self.take_id();
        let name = match &base.name {
            Some(name) => escape_xml(name),
            None => format!("{default_name} {}", id - 1),
        };
        xml.push_str("<p:sp><p:nvSpPr>");
        write!(xml, r#"<p:cNvPr id="{id}" name="{name}"/>"#)?;
        xml.push_str(if txbox { r#"<p:cNvSpPr txBox="1"/>"# } else { "<p:cNvSpPr/>" });
        xml.push_str("<p:nvPr/></p:nvSpPr>");
        Ok(())
    }

    fn write_preset(&mut self, xml: &mut String, base: &ObjectBase, prst: &str, angle: f64) -> Result<()> {
        let default_name = if prst == "rect" { "Rectangle" } else { "Triangle" };
        self.open_sp(xml, base, default_name, false)?;
        xml.push_str("<p:spPr>");
        write_xfrm(xml, base, angle, None)?;
        write!(xml, r#"<a:prstGeom prst="{prst}"><a:avLst/></a:prstGeom>"#)?;
        write_fill(xml, fill_color(base).as_deref(), base.opacity)?;
        write_line(xml, base)?;
        xml.push_str("</p:spPr></p:sp>");
        Ok(())
    }

    fn write_textbox(&mut self, xml: &mut String, textbox: &TextboxObject) -> Result<()> {
        let base = &textbox.base;
        self.open_sp(xml, base, "TextBox", true)?;
        xml.push_str("<p:spPr>");
        write_xfrm(xml, base, base.angle, None)?;
        xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
        let background = textbox
            .background_color
            .as_deref()
            .and_then(RGBColor::from_css)
            .map(|c| c.to_hex());
        match background {
            Some(hex) => write_fill(xml, Some(&hex), None)?,
            None => xml.push_str("<a:noFill/>"),
        }
        xml.push_str("</p:spPr>");

        xml.push_str("<p:txBody>");
        xml.push_str(r#"<a:bodyPr wrap="square" rtlCol="0"/>"#);
        xml.push_str("<a:lstStyle/>");

        let algn = Alignment::from_css(&textbox.text_align).to_algn();
        let text_color = fill_color(base);
        for line in textbox.text.split('\n') {
            write!(xml, r#"<a:p><a:pPr algn="{algn}"/>"#)?;
            if line.is_empty() {
                write_run_properties(xml, "a:endParaRPr", textbox, text_color.as_deref())?;
            } else {
                xml.push_str("<a:r>");
                write_run_properties(xml, "a:rPr", textbox, text_color.as_deref())?;
                write!(xml, "<a:t>{}</a:t>", escape_xml(line))?;
                xml.push_str("</a:r>");
            }
            xml.push_str("</a:p>");
        }
        xml.push_str("</p:txBody></p:sp>");
        Ok(())
    }

    fn write_path(&mut self, xml: &mut String, path: &PathObject) -> Result<()> {
        let base = &path.base;
        let commands = &path.path.0;
        let (extent_w, extent_h) = extent(commands);
        let width = if base.width > 0.0 { base.width } else { extent_w };
        let height = if base.height > 0.0 { base.height } else { extent_h };
        let (w, h) = (pt_to_emu(width), pt_to_emu(height));

        self.open_sp(xml, base, "Freeform", false)?;
        xml.push_str("<p:spPr>");
        write_xfrm(xml, base, base.angle, Some((w, h)))?;
        xml.push_str("<a:custGeom><a:avLst/><a:gdLst/><a:ahLst/><a:cxnLst/>");
        xml.push_str(r#"<a:rect l="l" t="t" r="r" b="b"/>"#);
        write!(xml, r#"<a:pathLst><a:path w="{w}" h="{h}">"#)?;
        write_commands(xml, commands)?;
        xml.push_str("</a:path></a:pathLst></a:custGeom>");
        write_fill(xml, fill_color(base).as_deref(), base.opacity)?;
        write_line(xml, base)?;
        xml.push_str("</p:spPr></p:sp>");
        Ok(())
    }

    fn write_picture(&mut self, xml: &mut String, image: &ImageObject) -> Result<()> {
        let (content_type, bytes) = decode_data_url(&image.src)?;
        let partname = media_partname(self.media.len() + 1, &content_type)?;
        let r_id = self
            .rels
            .add(rt::IMAGE, &format!("../media/{}", partname.filename()));
        self.media.push(MediaPart {
            partname,
            content_type,
            bytes,
        });

        let base = &image.base;
        let id = self.take_id();
        let name = match &base.name {
            Some(name) => escape_xml(name),
            None => format!("Picture {}", id - 1),
        };
        xml.push_str("<p:pic><p:nvPicPr>");
        write!(xml, r#"<p:cNvPr id="{id}" name="{name}"/>"#)?;
        xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#);
        xml.push_str("<p:blipFill>");
        match base.opacity.filter(|o| *o < 1.0) {
            Some(opacity) => write!(
                xml,
                r#"<a:blip r:embed="{r_id}"><a:alphaModFix amt="{}"/></a:blip>"#,
                unit_pct(opacity)
            )?,
            None => write!(xml, r#"<a:blip r:embed="{r_id}"/>"#)?,
        }
        xml.push_str("<a:stretch><a:fillRect/></a:stretch></p:blipFill>");
        xml.push_str("<p:spPr>");
        write_xfrm(xml, base, base.angle, None)?;
        xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
        xml.push_str("</p:spPr></p:pic>");
        Ok(())
    }
}

fn unit_pct(value: f64) -> i64 {
    unit_to_pct(value.clamp(0.0, 1.0))
}

/// Hex color of the object's fill: the solid color, or the first stop of a gradient.
fn fill_color(base: &ObjectBase) -> Option<String> {
    base.fill
        .as_ref()
        .and_then(|p| p.representative_color())
        .and_then(RGBColor::from_css)
        .map(|c| c.to_hex())
}

fn write_xfrm(xml: &mut String, base: &ObjectBase, angle: f64, ext: Option<(i64, i64)>) -> Result<()> {
    let (cx, cy) = ext.unwrap_or((pt_to_emu(base.width), pt_to_emu(base.height)));
    xml.push_str("<a:xfrm");
    let rot = deg_to_angle(normalize_degrees(angle));
    if rot != 0 {
        write!(xml, r#" rot="{rot}""#)?;
    }
    if base.flip_x {
        xml.push_str(r#" flipH="1""#);
    }
    if base.flip_y {
        xml.push_str(r#" flipV="1""#);
    }
    xml.push('>');
    write!(
        xml,
        r#"<a:off x="{}" y="{}"/><a:ext cx="{cx}" cy="{cy}"/>"#,
        pt_to_emu(base.left),
        pt_to_emu(base.top)
    )?;
    xml.push_str("</a:xfrm>");
    Ok(())
}

fn write_fill(xml: &mut String, hex: Option<&str>, opacity: Option<f64>) -> Result<()> {
    let Some(hex) = hex else {
        xml.push_str("<a:noFill/>");
        return Ok(());
    };
    match opacity.filter(|o| *o < 1.0) {
        Some(opacity) => write!(
            xml,
            r#"<a:solidFill><a:srgbClr val="{hex}"><a:alpha val="{}"/></a:srgbClr></a:solidFill>"#,
            unit_pct(opacity)
        )?,
        None => write!(xml, r#"<a:solidFill><a:srgbClr val="{hex}"/></a:solidFill>"#)?,
    }
    Ok(())
}

/// Outline from `stroke` / `strokeWidth`; no stroke color means no line.
fn write_line(xml: &mut String, base: &ObjectBase) -> Result<()> {
    let color = base
        .stroke
        .as_deref()
        .and_then(RGBColor::from_css)
        .map(|c| c.to_hex());
    match color {
        Some(hex) => {
            let width = base.stroke_width.unwrap_or(DEFAULT_STROKE_WIDTH);
            write!(
                xml,
                r#"<a:ln w="{}"><a:solidFill><a:srgbClr val="{hex}"/></a:solidFill></a:ln>"#,
                pt_to_emu(width)
            )?;
        },
        None => xml.push_str("<a:ln><a:noFill/></a:ln>"),
    }
    Ok(())
}

fn write_run_properties(xml: &mut String, element: &str, textbox: &TextboxObject, color: Option<&str>) -> Result<()> {
    write!(
        xml,
        r#"<{element} lang="en-US" sz="{}""#,
        (textbox.font_size * 100.0).round() as i64
    )?;
    if is_bold(&textbox.font_weight) {
        xml.push_str(r#" b="1""#);
    }
    if matches!(textbox.font_style.as_str(), "italic" | "oblique") {
        xml.push_str(r#" i="1""#);
    }
    xml.push_str(r#" dirty="0">"#);
    if let Some(hex) = color {
        write!(xml, r#"<a:solidFill><a:srgbClr val="{hex}"/></a:solidFill>"#)?;
    }
    if !textbox.font_family.is_empty() {
        write!(xml, r#"<a:latin typeface="{}"/>"#, escape_xml(&textbox.font_family))?;
    }
    write!(xml, "</{element}>")?;
    Ok(())
}

/// `bold`, `bolder` or a numeric weight of 600 and up.
fn is_bold(weight: &str) -> bool {
    match weight.trim() {
        "bold" | "bolder" => true,
        other => other.parse::<f64>().is_ok_and(|w| w >= 600.0),
    }
}

/// Largest coordinate any command reaches, for paths without a box size.
fn extent(commands: &[PathCommand]) -> (f64, f64) {
    let mut max = (0.0f64, 0.0f64);
    let mut reach = |x: f64, y: f64| {
        max.0 = max.0.max(x);
        max.1 = max.1.max(y);
    };
    for command in commands {
        match *command {
            PathCommand::CubicTo { x1, y1, x2, y2, x, y } => {
                reach(x1, y1);
                reach(x2, y2);
                reach(x, y);
            },
            PathCommand::QuadTo { x1, y1, x, y } => {
                reach(x1, y1);
                reach(x, y);
            },
            other => {
                if let Some((x, y)) = other.end_point() {
                    reach(x, y);
                }
            },
        }
    }
    max
}

fn write_pt(xml: &mut String, x: f64, y: f64) -> Result<()> {
    write!(xml, r#"<a:pt x="{}" y="{}"/>"#, pt_to_emu(x), pt_to_emu(y))?;
    Ok(())
}

/// Largest distance, in points, between an arc's recorded end point and the
/// end point its stored angles produce for the stored angles to be used.
const ARC_END_TOLERANCE: f64 = 0.01;

/// The arc's own start and sweep angles, as long as they still land on its
/// end point. Arcs whose end point was edited are recomputed instead.
fn stored_arc(
    from: (f64, f64),
    rx: f64,
    ry: f64,
    angles: Option<(f64, f64)>,
    to: (f64, f64),
) -> Option<ArcParams> {
    let (start, sweep) = angles?;
    let arc = ArcParams { rx, ry, start, sweep };
    let ((ex, ey), _, _) = arc.endpoint(from);
    ((ex - to.0).abs() <= ARC_END_TOLERANCE && (ey - to.1).abs() <= ARC_END_TOLERANCE).then_some(arc)
}

/// Path commands in box-local points to `a:path` children in EMU.
fn write_commands(xml: &mut String, commands: &[PathCommand]) -> Result<()> {
    let mut current = (0.0, 0.0);
    let mut start = (0.0, 0.0);
    for command in commands {
        match *command {
            PathCommand::MoveTo { x, y } => {
                xml.push_str("<a:moveTo>");
                write_pt(xml, x, y)?;
                xml.push_str("</a:moveTo>");
                start = (x, y);
            },
            PathCommand::LineTo { x, y } => {
                xml.push_str("<a:lnTo>");
                write_pt(xml, x, y)?;
                xml.push_str("</a:lnTo>");
            },
            PathCommand::CubicTo { x1, y1, x2, y2, x, y } => {
                xml.push_str("<a:cubicBezTo>");
                write_pt(xml, x1, y1)?;
                write_pt(xml, x2, y2)?;
                write_pt(xml, x, y)?;
                xml.push_str("</a:cubicBezTo>");
            },
            PathCommand::QuadTo { x1, y1, x, y } => {
                xml.push_str("<a:quadBezTo>");
                write_pt(xml, x1, y1)?;
                write_pt(xml, x, y)?;
                xml.push_str("</a:quadBezTo>");
            },
            PathCommand::ArcTo {
                rx,
                ry,
                large_arc,
                sweep,
                x,
                y,
                angles,
            } => match stored_arc(current, rx, ry, angles, (x, y))
                .or_else(|| svg_arc_to_arc_to(current, rx, ry, large_arc, sweep, (x, y)))
            {
                Some(arc) => write!(
                    xml,
                    r#"<a:arcTo wR="{}" hR="{}" stAng="{}" swAng="{}"/>"#,
                    pt_to_emu(arc.rx),
                    pt_to_emu(arc.ry),
                    deg_to_angle(arc.start),
                    deg_to_angle(arc.sweep)
                )?,
                None => {
                    xml.push_str("<a:lnTo>");
                    write_pt(xml, x, y)?;
                    xml.push_str("</a:lnTo>");
                },
            },
            PathCommand::Close => {
                xml.push_str("<a:close/>");
                current = start;
                continue;
            },
        }
        if let Some(end) = command.end_point() {
            current = end;
        }
    }
    Ok(())
}
