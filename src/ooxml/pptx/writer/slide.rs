//! One scene slide to a `p:sld` part.

use crate::common::Result;
use crate::common::style::RGBColor;
use crate::ooxml::opc::Relationships;
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::pptx::writer::shape::{MediaPart, ShapeWriter};
use crate::scene::{SceneObject, SceneSlide};
use std::fmt::Write as FmtWrite;
use tracing::debug;

/// Target of every slide's layout relationship.
pub const LAYOUT_TARGET: &str = "../slideLayouts/slideLayout1.xml";

/// A serialized slide part with its relationships.
#[derive(Debug)]
pub struct SlidePart {
    pub xml: String,
    pub rels: Relationships,
}

/// Serialize `slide`. Images are appended to `media`.
pub fn write_slide(slide: &SceneSlide, media: &mut Vec<MediaPart>) -> Result<SlidePart> {
    let mut rels = Relationships::new("/ppt/slides");
    rels.add(rt::SLIDE_LAYOUT, LAYOUT_TARGET);

    let mut xml = String::with_capacity(1024 + slide.objects.len() * 512);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#);
    xml.push_str(r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#);
    xml.push_str(r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#);
    xml.push_str("<p:cSld>");

    if let Some(hex) = slide.background.as_deref().and_then(background_hex) {
        write!(
            xml,
            r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{hex}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#
        )?;
    }

    xml.push_str("<p:spTree>");
    xml.push_str("<p:nvGrpSpPr>");
    xml.push_str(r#"<p:cNvPr id="1" name=""/>"#);
    xml.push_str("<p:cNvGrpSpPr/>");
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvGrpSpPr>");
    xml.push_str("<p:grpSpPr>");
    xml.push_str(r#"<a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm>"#);
    xml.push_str("</p:grpSpPr>");

    let mut writer = ShapeWriter::new(&mut rels, media);
    let mut written = 0usize;
    for object in &slide.objects {
        if is_background_copy(object, slide) {
            continue;
        }
        writer.write(&mut xml, object)?;
        written += 1;
    }

    xml.push_str("</p:spTree>");
    xml.push_str("</p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sld>");

    debug!(slide = slide.slide_number, objects = written, "slide written");
    Ok(SlidePart { xml, rels })
}

/// Solid color of a background object; gradients contribute their first stop.
fn background_hex(background: &SceneObject) -> Option<String> {
    background
        .base()
        .fill
        .as_ref()
        .and_then(|p| p.representative_color())
        .and_then(RGBColor::from_css)
        .map(|c| c.to_hex())
}

/// The background rectangle the reader prepends to `objects` on request.
/// It is written as the slide background, not as a shape.
fn is_background_copy(object: &SceneObject, slide: &SceneSlide) -> bool {
    let Some(background) = slide.background.as_deref() else {
        return false;
    };
    let base = object.base();
    matches!(object, SceneObject::Rect(_)) && base.selectable == Some(false) && object == background
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::dom::XmlNode;
    use crate::scene::{ObjectBase, Paint, ShapeObject};

    fn shape(left: f64) -> SceneObject {
        SceneObject::Rect(ShapeObject {
            base: ObjectBase {
                left,
                width: 10.0,
                height: 10.0,
                fill: Some(Paint::Color("#00ff00".to_string())),
                ..Default::default()
            },
        })
    }

    #[test]
    fn test_slide_with_background() {
        let background = SceneObject::background(720.0, 540.0, Paint::Color("#102030".to_string()));
        let mut slide = SceneSlide::new(720.0, 540.0, 1);
        slide.objects = vec![background.clone(), shape(1.0), shape(2.0)];
        slide.background = Some(Box::new(background));

        let mut media = Vec::new();
        let part = write_slide(&slide, &mut media).unwrap();
        let root = XmlNode::parse(part.xml.as_bytes()).unwrap();

        assert_eq!(
            root.path(&["p:cSld", "p:bg", "p:bgPr", "a:solidFill", "a:srgbClr"])
                .and_then(|c| c.attr("val")),
            Some("102030")
        );
        let tree = root.path(&["p:cSld", "p:spTree"]).unwrap();
        assert_eq!(tree.children_named("p:sp").count(), 2);
        assert_eq!(
            part.rels.target_of_type(rt::SLIDE_LAYOUT).map(|u| u.as_str().to_string()),
            Some("/ppt/slideLayouts/slideLayout1.xml".to_string())
        );
        assert!(media.is_empty());
    }

    #[test]
    fn test_slide_without_background() {
        let slide = SceneSlide::new(720.0, 540.0, 1);
        let part = write_slide(&slide, &mut Vec::new()).unwrap();
        let root = XmlNode::parse(part.xml.as_bytes()).unwrap();
        assert!(root.path(&["p:cSld", "p:bg"]).is_none());
        assert!(root.path(&["p:clrMapOvr", "a:masterClrMapping"]).is_some());
    }
}
