//! Scene slides to a complete presentation package.
use crate::common::Result;
use crate::common::unit::pt_to_emu;
use crate::config::ConvertOptions;
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use crate::ooxml::opc::packuri::PACKAGE_URI;
use crate::ooxml::opc::{PackURI, PackageWriter, Relationships};
use crate::ooxml::pptx::template;
use crate::ooxml::pptx::writer::shape::MediaPart;
use crate::ooxml::pptx::writer::slide::{SlidePart, write_slide};
use crate::scene::SceneSlide;
use std::fmt::Write as FmtWrite;
use tracing::debug;

const PRESENTATION_URI: &str = "/ppt/presentation.xml";
const MASTER_URI: &str = "/ppt/slideMasters/slideMaster1.xml";
const LAYOUT_URI: &str = "/ppt/slideLayouts/slideLayout1.xml";
const THEME_URI: &str = "/ppt/theme/theme1.xml";
const CORE_URI: &str = "/docProps/core.xml";
const APP_URI: &str = "/docProps/app.xml";

/// First slide id; ids below 256 are reserved.
const FIRST_SLIDE_ID: u32 = 256;

/// Bounds of `ST_SlideSizeCoordinate` (1 inch to 56 inches).
const MIN_SLIDE_EMU: i64 = 914_400;
const MAX_SLIDE_EMU: i64 = 51_206_400;

/// Builds a presentation package from scene slides.
///
/// Every slide uses the single blank layout of the generated master.
#[derive(Debug)]
pub struct PresentationWriter<'a> {
    slides: &'a [SceneSlide],
    /// Slide width in EMUs
    slide_width: i64,
    /// Slide height in EMUs
    slide_height: i64,
}

impl<'a> PresentationWriter<'a> {
    /// The slide size comes from the first slide, or the configured default
    /// when there are no slides or the first has no size. Both sides are
    /// clamped to the range PowerPoint accepts for `p:sldSz`.
    pub fn new(slides: &'a [SceneSlide], options: &ConvertOptions) -> Self {
        let (width, height) = slides
            .first()
            .filter(|s| s.width > 0.0 && s.height > 0.0)
            .map_or((options.default_slide_width, options.default_slide_height), |s| {
                (s.width, s.height)
            });
        Self {
            slides,
            slide_width: pt_to_emu(width).clamp(MIN_SLIDE_EMU, MAX_SLIDE_EMU),
            slide_height: pt_to_emu(height).clamp(MIN_SLIDE_EMU, MAX_SLIDE_EMU),
        }
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slide size in EMUs.
    pub fn slide_size(&self) -> (i64, i64) {
        (self.slide_width, self.slide_height)
    }

    /// Generate presentation.xml content with the given slide relationship ids.
    pub fn generate_presentation_xml(&self, slide_rel_ids: &[String]) -> Result<String> {
        let mut xml = String::with_capacity(1024 + slide_rel_ids.len() * 48);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(r#"<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#);
        xml.push_str(r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#);
        xml.push_str(r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" saveSubsetFonts="1">"#);

        xml.push_str("<p:sldMasterIdLst>");
        xml.push_str(r#"<p:sldMasterId id="2147483648" r:id="rId1"/>"#);
        xml.push_str("</p:sldMasterIdLst>");

        if !slide_rel_ids.is_empty() {
            xml.push_str("<p:sldIdLst>");
            for (id, r_id) in (FIRST_SLIDE_ID..).zip(slide_rel_ids) {
                write!(xml, r#"<p:sldId id="{id}" r:id="{r_id}"/>"#)?;
            }
            xml.push_str("</p:sldIdLst>");
        }

        write!(
            xml,
            r#"<p:sldSz cx="{}" cy="{}"/>"#,
            self.slide_width, self.slide_height
        )?;
        xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
        xml.push_str("</p:presentation>");

        Ok(xml)
    }

    /// Serialize the whole package.
    pub fn write(&self) -> Result<Vec<u8>> {
        let mut package = PackageWriter::new();

        let mut media: Vec<MediaPart> = Vec::new();
        let slide_parts: Vec<SlidePart> = self
            .slides
            .iter()
            .map(|slide| write_slide(slide, &mut media))
            .collect::<Result<_>>()?;

        let presentation = PackURI::new(PRESENTATION_URI)?;
        let mut pres_rels = Relationships::new(presentation.base_uri());
        pres_rels.add(rt::SLIDE_MASTER, "slideMasters/slideMaster1.xml");

        for (i, part) in slide_parts.iter().enumerate() {
            let uri = PackURI::new(format!("/ppt/slides/slide{}.xml", i + 1))?;
            package.add_part(&uri, Some(ct::PML_SLIDE), part.xml.as_bytes())?;
            package.add_rels(&uri, &part.rels)?;
        }
        let slide_rel_ids: Vec<String> = (1..=slide_parts.len())
            .map(|n| pres_rels.add(rt::SLIDE, &format!("slides/slide{n}.xml")))
            .collect();
        pres_rels.add(rt::THEME, "theme/theme1.xml");

        let pres_xml = self.generate_presentation_xml(&slide_rel_ids)?;
        package.add_part(&presentation, Some(ct::PML_PRESENTATION_MAIN), pres_xml.as_bytes())?;
        package.add_rels(&presentation, &pres_rels)?;

        self.write_fixed_parts(&mut package)?;

        for part in &media {
            package.add_media(&part.partname, &part.content_type, &part.bytes)?;
        }

        let mut root_rels = Relationships::new(PACKAGE_URI);
        root_rels.add(rt::OFFICE_DOCUMENT, "ppt/presentation.xml");
        root_rels.add(rt::CORE_PROPERTIES, "docProps/core.xml");
        root_rels.add(rt::EXTENDED_PROPERTIES, "docProps/app.xml");
        package.add_rels(&PackURI::new(PACKAGE_URI)?, &root_rels)?;

        debug!(
            slides = slide_parts.len(),
            media = media.len(),
            width = self.slide_width,
            height = self.slide_height,
            "presentation written"
        );
        package.finish()
    }

    /// Theme, master, layout and document properties.
    fn write_fixed_parts(&self, package: &mut PackageWriter) -> Result<()> {
        let master = PackURI::new(MASTER_URI)?;
        package.add_part(&master, Some(ct::PML_SLIDE_MASTER), template::SLIDE_MASTER_XML.as_bytes())?;
        let mut master_rels = Relationships::new(master.base_uri());
        master_rels.add(rt::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
        master_rels.add(rt::THEME, "../theme/theme1.xml");
        package.add_rels(&master, &master_rels)?;

        let layout = PackURI::new(LAYOUT_URI)?;
        package.add_part(&layout, Some(ct::PML_SLIDE_LAYOUT), template::SLIDE_LAYOUT_BLANK_XML.as_bytes())?;
        let mut layout_rels = Relationships::new(layout.base_uri());
        layout_rels.add(rt::SLIDE_MASTER, "../slideMasters/slideMaster1.xml");
        package.add_rels(&layout, &layout_rels)?;

        package.add_part(&PackURI::new(THEME_URI)?, Some(ct::OFC_THEME), template::THEME_XML.as_bytes())?;

        let core = template::core_properties_xml("Presentation")?;
        package.add_part(&PackURI::new(CORE_URI)?, Some(ct::OPC_CORE_PROPERTIES), core.as_bytes())?;
        let app = template::app_properties_xml(self.slides.len())?;
        package.add_part(&PackURI::new(APP_URI)?, Some(ct::OFC_EXTENDED_PROPERTIES), app.as_bytes())?;
        Ok(())
    }
}

/// Build a presentation package from scene slides.
pub fn write_presentation(slides: &[SceneSlide], options: &ConvertOptions) -> Result<Vec<u8>> {
    PresentationWriter::new(slides, options).write()
}
