//! In-memory presentation fixtures.
#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

pub const NS: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#
);

const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const RT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// One slide: optional `p:bg` markup, shape tree children, extra relationships.
#[derive(Debug, Clone, Default)]
pub struct SlideFixture {
    pub background: Option<String>,
    pub shapes: String,
    /// `(rId, type suffix, target)`; `rId1` is taken by the layout.
    pub rels: Vec<(String, String, String)>,
    /// Listed in the presentation but its part is left out of the archive.
    pub missing: bool,
}

impl SlideFixture {
    pub fn with_shapes(shapes: impl Into<String>) -> Self {
        Self {
            shapes: shapes.into(),
            ..Default::default()
        }
    }

    pub fn missing() -> Self {
        Self {
            missing: true,
            ..Default::default()
        }
    }

    pub fn with_rel(mut self, r_id: &str, kind: &str, target: &str) -> Self {
        self.rels.push((r_id.to_string(), kind.to_string(), target.to_string()));
        self
    }
}

/// Builder for a minimal presentation package.
#[derive(Debug, Clone, Default)]
pub struct PptxFixture {
    pub slide_size: Option<(i64, i64)>,
    pub slides: Vec<SlideFixture>,
    /// `a:clrScheme` children; the theme part is left out when `None`.
    pub color_scheme: Option<String>,
    pub layout_shapes: String,
    pub master_shapes: String,
    pub master_background: Option<String>,
    pub media: Vec<(String, Vec<u8>)>,
}

impl PptxFixture {
    pub fn new() -> Self {
        Self {
            slide_size: Some((9_144_000, 6_858_000)),
            ..Default::default()
        }
    }

    pub fn slide(mut self, slide: SlideFixture) -> Self {
        self.slides.push(slide);
        self
    }

    pub fn shapes(self, shapes: &str) -> Self {
        self.slide(SlideFixture::with_shapes(shapes))
    }

    pub fn color_scheme(mut self, scheme: &str) -> Self {
        self.color_scheme = Some(scheme.to_string());
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let mut add = |name: &str, content: &[u8]| {
            zip.start_file(name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content).unwrap();
        };

        let mut types = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        types.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
        types.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
        types.push_str(r#"<Default Extension="png" ContentType="image/png"/>"#);
        types.push_str(r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#);
        for n in 1..=self.slides.len() {
            types.push_str(&format!(
                r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
            ));
        }
        types.push_str("</Types>");
        add("[Content_Types].xml", types.as_bytes());

        add(
            "_rels/.rels",
            rels(&[("rId1", "officeDocument", "ppt/presentation.xml")]).as_bytes(),
        );

        let mut pres = format!(r#"<p:presentation {NS}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
        pres.push_str("<p:sldIdLst>");
        for n in 0..self.slides.len() {
            pres.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + n, n + 2));
        }
        pres.push_str("</p:sldIdLst>");
        if let Some((cx, cy)) = self.slide_size {
            pres.push_str(&format!(r#"<p:sldSz cx="{cx}" cy="{cy}"/>"#));
        }
        pres.push_str("</p:presentation>");
        add("ppt/presentation.xml", pres.as_bytes());

        let slide_targets: Vec<(String, String)> = (1..=self.slides.len())
            .map(|n| (format!("rId{}", n + 1), format!("slides/slide{n}.xml")))
            .collect();
        let mut pres_rels: Vec<(&str, &str, &str)> = vec![("rId1", "slideMaster", "slideMasters/slideMaster1.xml")];
        for (r_id, target) in &slide_targets {
            pres_rels.push((r_id.as_str(), "slide", target.as_str()));
        }
        add("ppt/_rels/presentation.xml.rels", rels(&pres_rels).as_bytes());

        for (i, slide) in self.slides.iter().enumerate() {
            if slide.missing {
                continue;
            }
            let n = i + 1;
            let xml = format!(
                r#"<p:sld {NS}><p:cSld>{}{}</p:cSld></p:sld>"#,
                slide.background.as_deref().unwrap_or(""),
                sp_tree(&slide.shapes)
            );
            add(&format!("ppt/slides/slide{n}.xml"), xml.as_bytes());
            let mut slide_rels = vec![("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")];
            for (r_id, kind, target) in &slide.rels {
                slide_rels.push((r_id.as_str(), kind.as_str(), target.as_str()));
            }
            add(&format!("ppt/slides/_rels/slide{n}.xml.rels"), rels(&slide_rels).as_bytes());
        }

        let layout = format!(
            r#"<p:sldLayout {NS}><p:cSld>{}</p:cSld></p:sldLayout>"#,
            sp_tree(&self.layout_shapes)
        );
        add("ppt/slideLayouts/slideLayout1.xml", layout.as_bytes());
        add(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]).as_bytes(),
        );

        let master = format!(
            r#"<p:sldMaster {NS}><p:cSld>{}{}</p:cSld></p:sldMaster>"#,
            self.master_background.as_deref().unwrap_or(""),
            sp_tree(&self.master_shapes)
        );
        add("ppt/slideMasters/slideMaster1.xml", master.as_bytes());
        let mut master_rels = vec![("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")];
        if self.color_scheme.is_some() {
            master_rels.push(("rId2", "theme", "../theme/theme1.xml"));
        }
        add("ppt/slideMasters/_rels/slideMaster1.xml.rels", rels(&master_rels).as_bytes());

        if let Some(scheme) = &self.color_scheme {
            let theme = format!(
                r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Test"><a:themeElements><a:clrScheme name="Test">{scheme}</a:clrScheme><a:fontScheme name="Test"><a:majorFont><a:latin typeface="Georgia"/></a:majorFont><a:minorFont><a:latin typeface="Verdana"/></a:minorFont></a:fontScheme></a:themeElements></a:theme>"#
            );
            add("ppt/theme/theme1.xml", theme.as_bytes());
        }

        for (name, bytes) in &self.media {
            add(&format!("ppt/media/{name}"), bytes.as_slice());
        }

        zip.finish().unwrap().into_inner()
    }
}

fn sp_tree(children: &str) -> String {
    format!(
        r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{children}</p:spTree>"#
    )
}

fn rels(entries: &[(&str, &str, &str)]) -> String {
    let mut xml = format!(r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="{REL_NS}">"#);
    for (r_id, kind, target) in entries {
        xml.push_str(&format!(
            r#"<Relationship Id="{r_id}" Type="{RT}/{kind}" Target="{target}"/>"#
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// A `p:sp` auto-shape. Lengths in EMU; `sp_pr_extra` follows the geometry.
pub fn auto_shape(id: u32, prst: &str, off: (i64, i64), ext: (i64, i64), sp_pr_extra: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Shape {id}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="{prst}"><a:avLst/></a:prstGeom>{sp_pr_extra}</p:spPr></p:sp>"#,
        off.0, off.1, ext.0, ext.1
    )
}

/// A text box holding `paragraphs` (raw `a:p` markup).
pub fn text_box(id: u32, off: (i64, i64), ext: (i64, i64), paragraphs: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Text {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#,
        off.0, off.1, ext.0, ext.1
    )
}

/// Bytes of a 1x1 PNG.
pub fn tiny_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, 0x00, 0x00,
        0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4, 0x89, 0x00, 0x00, 0x00,
        0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D,
        0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}
