//! Forward slide assembly: presentation package to scene slides.

use crate::common::unit::emu_to_pt;
use crate::common::Result;
use crate::config::ConvertOptions;
use crate::ooxml::dom::XmlNode;
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::{Package, PackURI, Relationships};
use crate::ooxml::pptx::color::resolve_color;
use crate::ooxml::pptx::fill::{FillContext, fill_from_properties};
use crate::ooxml::pptx::shapes::{SlideContext, apply_group_mode, dispatch_tree};
use crate::ooxml::pptx::theme::Theme;
use crate::scene::{Paint, SceneObject, SceneSlide};
use tracing::{debug, debug_span, warn};

/// A presentation package opened for conversion.
#[derive(Debug)]
pub struct PresentationReader {
    package: Package,
    slides: Vec<PackURI>,
    width: f64,
    height: f64,
    theme: Theme,
}

impl PresentationReader {
    /// Open a package and read its global slide size, slide list and theme.
    pub fn new(bytes: &[u8], options: &ConvertOptions) -> Result<Self> {
        let package = Package::from_bytes(bytes)?;
        let pres_uri = package.main_document()?;
        let pres = package.xml(&pres_uri)?;
        let pres_rels = package.rels(&pres_uri)?;

        let (width, height) = match pres.child("p:sldSz") {
            Some(size) => (emu_to_pt(size.attr_or_zero("cx")), emu_to_pt(size.attr_or_zero("cy"))),
            None => {
                debug!("no slide size declared, using defaults");
                (options.default_slide_width, options.default_slide_height)
            },
        };

        let slides = slide_list(&pres, &pres_rels);
        let theme = load_theme(&package, slides.first(), &pres_rels);
        debug!(slides = slides.len(), width, height, "opened presentation");

        Ok(Self {
            package,
            slides,
            width,
            height,
            theme,
        })
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Slide size in points.
    pub fn slide_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Convert every slide, in presentation order. A slide whose part or
    /// relationships cannot be read is skipped; the others keep their
    /// presentation-order numbers.
    pub fn read_slides(&self, options: &ConvertOptions) -> Result<Vec<SceneSlide>> {
        let slides = self
            .slides
            .iter()
            .enumerate()
            .filter_map(|(i, uri)| {
                let number = i as u32 + 1;
                let span = debug_span!("slide", number, part = uri.as_str());
                let _enter = span.enter();
                match self.read_slide(uri, number, options) {
                    Ok(slide) => Some(slide),
                    Err(e) => {
                        warn!(part = uri.as_str(), error = %e, "skipping unreadable slide");
                        None
                    },
                }
            })
            .collect();
        Ok(slides)
    }

    fn read_slide(&self, uri: &PackURI, number: u32, options: &ConvertOptions) -> Result<SceneSlide> {
        let slide = self.package.xml(uri)?;
        let rels = self.package.rels(uri)?;

        let (layout_uri, layout) = related_part(&self.package, &rels, rt::SLIDE_LAYOUT);
        let master = layout_uri.as_ref().and_then(|l| {
            let layout_rels = self.package.rels(l).ok()?;
            related_part(&self.package, &layout_rels, rt::SLIDE_MASTER).1
        });

        let ctx = SlideContext {
            package: &self.package,
            rels: &rels,
            theme: &self.theme,
            layout: layout.as_ref(),
            master: master.as_ref(),
            options,
        };

        let objects = slide
            .path(&["p:cSld", "p:spTree"])
            .map(|tree| dispatch_tree(tree, &ctx))
            .unwrap_or_default();
        let mut objects = apply_group_mode(objects, options.group_mode);

        let background = [Some(&slide), layout.as_ref(), master.as_ref()]
            .into_iter()
            .flatten()
            .find_map(|root| root.path(&["p:cSld", "p:bg"]))
            .map(|bg| background_paint(bg, &self.theme))
            .map(|paint| Box::new(SceneObject::background(self.width, self.height, paint)));

        if options.background_in_objects {
            if let Some(bg) = &background {
                objects.insert(0, bg.as_ref().clone());
            }
        }
        debug!(objects = objects.len(), "slide converted");

        Ok(SceneSlide {
            objects,
            width: self.width,
            height: self.height,
            slide_number: number,
            background,
        })
    }
}

/// Slide parts in `p:sldIdLst` order; without a list, slide relationships
/// in declaration order.
fn slide_list(pres: &XmlNode, rels: &Relationships) -> Vec<PackURI> {
    match pres.child("p:sldIdLst") {
        Some(list) => list
            .children_named("p:sldId")
            .filter_map(|id| {
                let r_id = id.attr("r:id")?;
                let target = rels.target_of(r_id);
                if target.is_none() {
                    warn!(r_id, "slide id without a relationship target");
                }
                target
            })
            .collect(),
        None => rels
            .iter()
            .filter(|r| r.reltype() == rt::SLIDE)
            .filter_map(|r| r.target_partname())
            .collect(),
    }
}

/// Load the part of the given relationship type, logging rather than failing.
fn related_part(package: &Package, rels: &Relationships, reltype: &str) -> (Option<PackURI>, Option<XmlNode>) {
    let Some(uri) = rels.target_of_type(reltype) else {
        return (None, None);
    };
    match package.xml(&uri) {
        Ok(xml) => (Some(uri), Some(xml)),
        Err(e) => {
            warn!(part = uri.as_str(), error = %e, "unreadable related part");
            (None, None)
        },
    }
}

/// Theme reached from the first slide through its layout and master,
/// else the presentation's own theme relationship, else the built-in palette.
fn load_theme(package: &Package, first_slide: Option<&PackURI>, pres_rels: &Relationships) -> Theme {
    let via_master = || -> Option<PackURI> {
        let slide_rels = package.rels(first_slide?).ok()?;
        let layout = slide_rels.target_of_type(rt::SLIDE_LAYOUT)?;
        let master = package.rels(&layout).ok()?.target_of_type(rt::SLIDE_MASTER)?;
        package.rels(&master).ok()?.target_of_type(rt::THEME)
    };
    let Some(uri) = via_master().or_else(|| pres_rels.target_of_type(rt::THEME)) else {
        debug!("no theme part, using built-in palette");
        return Theme::default();
    };
    match package.xml(&uri) {
        Ok(root) => Theme::from_xml(&root),
        Err(e) => {
            warn!(part = uri.as_str(), error = %e, "unreadable theme, using built-in palette");
            Theme::default()
        },
    }
}

/// Fill of a `p:bg`: its `p:bgPr` fill, or the color of a `p:bgRef`.
fn background_paint(bg: &XmlNode, theme: &Theme) -> Paint {
    if let Some(props) = bg.child("p:bgPr") {
        return fill_from_properties(props, &FillContext::new(theme)).unwrap_or_else(Paint::transparent);
    }
    bg.child("p:bgRef")
        .and_then(|r| resolve_color(r, theme))
        .map_or_else(Paint::transparent, |c| Paint::Color(c.css()))
}

/// Convert a whole package.
pub fn read_presentation(bytes: &[u8], options: &ConvertOptions) -> Result<Vec<SceneSlide>> {
    let reader = PresentationReader::new(bytes, options)?;
    if reader.slide_count() == 0 {
        debug!("presentation has no slides");
    }
    reader.read_slides(options)
}
