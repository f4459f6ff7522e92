//! Color resolution.
//!
//! A DrawingML color choice (`a:srgbClr`, `a:sysClr`, `a:schemeClr`,
//! `a:prstClr`, `a:scrgbClr`) appears as a child of a fill, line, effect or
//! gradient stop element. Resolution order, first success wins:
//!
//! 1. direct RGB
//! 2. system color (`lastClr`, then the well-known `window`/`windowText` values)
//! 3. theme reference through the [`Theme`] table
//! 4. the caller's default
//!
//! Modifier children (`lumMod`, `lumOff`, `tint`, `shade`, `alpha`) are
//! applied to whichever color was chosen.

use crate::common::RGBColor;
use crate::common::unit::pct_to_unit;
use crate::ooxml::dom::XmlNode;
use crate::ooxml::pptx::theme::Theme;
use phf::phf_map;
use tracing::trace;

/// A concrete color with its opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedColor {
    pub rgb: RGBColor,
    /// Opacity in `[0, 1]`.
    pub alpha: f64,
}

impl ResolvedColor {
    #[inline]
    pub fn opaque(rgb: RGBColor) -> Self {
        Self { rgb, alpha: 1.0 }
    }

    /// `#rrggbb`
    #[inline]
    pub fn css(&self) -> String {
        self.rgb.to_css()
    }
}

static PRESET_COLORS: phf::Map<&'static str, (u8, u8, u8)> = phf_map! {
    "black" => (0x00, 0x00, 0x00),
    "white" => (0xFF, 0xFF, 0xFF),
    "red" => (0xFF, 0x00, 0x00),
    "green" => (0x00, 0x80, 0x00),
    "lime" => (0x00, 0xFF, 0x00),
    "blue" => (0x00, 0x00, 0xFF),
    "yellow" => (0xFF, 0xFF, 0x00),
    "cyan" => (0x00, 0xFF, 0xFF),
    "aqua" => (0x00, 0xFF, 0xFF),
    "magenta" => (0xFF, 0x00, 0xFF),
    "fuchsia" => (0xFF, 0x00, 0xFF),
    "gray" => (0x80, 0x80, 0x80),
    "grey" => (0x80, 0x80, 0x80),
    "silver" => (0xC0, 0xC0, 0xC0),
    "ltGray" => (0xD3, 0xD3, 0xD3),
    "dkGray" => (0xA9, 0xA9, 0xA9),
    "maroon" => (0x80, 0x00, 0x00),
    "navy" => (0x00, 0x00, 0x80),
    "olive" => (0x80, 0x80, 0x00),
    "purple" => (0x80, 0x00, 0x80),
    "teal" => (0x00, 0x80, 0x80),
    "orange" => (0xFF, 0xA5, 0x00),
    "brown" => (0xA5, 0x2A, 0x2A),
    "pink" => (0xFF, 0xC0, 0xCB),
    "gold" => (0xFF, 0xD7, 0x00),
    "indigo" => (0x4B, 0x00, 0x82),
    "violet" => (0xEE, 0x82, 0xEE),
    "tan" => (0xD2, 0xB4, 0x8C),
    "coral" => (0xFF, 0x7F, 0x50),
    "salmon" => (0xFA, 0x80, 0x72),
    "crimson" => (0xDC, 0x14, 0x3C),
    "skyBlue" => (0x87, 0xCE, 0xEB),
    "dkBlue" => (0x00, 0x00, 0x8B),
    "dkRed" => (0x8B, 0x00, 0x00),
    "dkGreen" => (0x00, 0x64, 0x00),
    "ltBlue" => (0xAD, 0xD8, 0xE6),
    "ltGreen" => (0x90, 0xEE, 0x90),
    "ltYellow" => (0xFF, 0xFF, 0xE0),
};

/// Fallbacks for system colors written without `lastClr`.
fn system_color(val: &str) -> Option<RGBColor> {
    match val {
        "window" | "btnHighlight" | "highlightText" | "menu" | "infoBk" => Some(RGBColor::WHITE),
        "windowText" | "btnText" | "menuText" | "captionText" | "infoText" => Some(RGBColor::BLACK),
        "btnFace" | "3dLight" | "menuBar" => Some(RGBColor::new(0xF0, 0xF0, 0xF0)),
        "grayText" | "btnShadow" => Some(RGBColor::new(0x80, 0x80, 0x80)),
        "highlight" | "hotLight" => Some(RGBColor::new(0x00, 0x78, 0xD7)),
        _ => None,
    }
}

/// Base color of a single color-choice element, before modifiers.
fn base_color(elem: &XmlNode, theme: &Theme) -> Option<RGBColor> {
    match elem.name() {
        "a:srgbClr" => elem.attr("val").and_then(RGBColor::from_hex),
        "a:sysClr" => elem
            .attr("lastClr")
            .and_then(RGBColor::from_hex)
            .or_else(|| elem.attr("val").and_then(system_color)),
        "a:schemeClr" => {
            let val = elem.attr("val")?;
            let color = theme.scheme_color(val);
            if color.is_none() {
                trace!(val, "scheme color not in theme table");
            }
            color
        },
        "a:prstClr" => elem
            .attr("val")
            .and_then(|v| PRESET_COLORS.get(v))
            .map(|&(r, g, b)| RGBColor::new(r, g, b)),
        "a:scrgbClr" => {
            // Linear percentages; gamma is ignored.
            let channel = |k: &str| (pct_to_unit(elem.attr_or_zero(k)).clamp(0.0, 1.0) * 255.0).round() as u8;
            Some(RGBColor::new(channel("r"), channel("g"), channel("b")))
        },
        _ => None,
    }
}

/// Apply modifier children in document order (`lumMod`/`lumOff` together).
fn apply_modifiers(elem: &XmlNode, rgb: RGBColor) -> ResolvedColor {
    let mut color = rgb;
    let mut alpha = 1.0;
    let lum_mod = elem.child("a:lumMod").and_then(|m| m.attr_i64("val"));
    let lum_off = elem.child("a:lumOff").and_then(|m| m.attr_i64("val"));
    if lum_mod.is_some() || lum_off.is_some() {
        color = color.lum_mod_off(
            lum_mod.map_or(1.0, pct_to_unit),
            lum_off.map_or(0.0, pct_to_unit),
        );
    }
    for modifier in elem.children() {
        let Some(val) = modifier.attr_i64("val") else {
            continue;
        };
        match modifier.name() {
            "a:tint" => color = color.tint(pct_to_unit(val)),
            "a:shade" => color = color.shade(pct_to_unit(val)),
            "a:alpha" => alpha = pct_to_unit(val).clamp(0.0, 1.0),
            _ => {},
        }
    }
    ResolvedColor { rgb: color, alpha }
}

/// Color choice elements in resolution priority order.
const COLOR_CHOICES: [&str; 5] = [
    "a:srgbClr",
    "a:sysClr",
    "a:schemeClr",
    "a:prstClr",
    "a:scrgbClr",
];

/// Resolve the color chosen by the children of `container`.
pub fn resolve_color(container: &XmlNode, theme: &Theme) -> Option<ResolvedColor> {
    COLOR_CHOICES.iter().find_map(|name| {
        let elem = container.child(name)?;
        base_color(elem, theme).map(|rgb| apply_modifiers(elem, rgb))
    })
}

/// [`resolve_color`] with the caller-supplied default as the last step.
pub fn resolve_color_or(container: &XmlNode, theme: &Theme, default: RGBColor) -> ResolvedColor {
    resolve_color(container, theme).unwrap_or_else(|| ResolvedColor::opaque(default))
}
