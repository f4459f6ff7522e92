//! Effect translation.
//!
//! At most one effect survives per shape, chosen by priority
//! shadow > glow > soft edge. Glow and soft edge have no canvas equivalent
//! and are expressed as centered shadows.

use crate::common::RGBColor;
use crate::common::unit::{angle_to_deg, emu_to_pt};
use crate::ooxml::dom::XmlNode;
use crate::ooxml::pptx::color::resolve_color_or;
use crate::ooxml::pptx::theme::Theme;
use crate::scene::Shadow;

/// Opacity given to the shadow standing in for a soft edge.
const SOFT_EDGE_OPACITY: f64 = 0.1;

/// Snap floating noise from trigonometry (e.g. `cos 90°`) to zero.
fn clean(v: f64) -> f64 {
    if v.abs() < 1e-9 { 0.0 } else { v }
}

/// The single effect retained for a shape-properties block, if any.
pub fn shape_effect(props: &XmlNode, theme: &Theme) -> Option<Shadow> {
    let list = props.child("a:effectLst")?;

    if let Some(shdw) = list
        .child("a:outerShdw")
        .or_else(|| list.child("a:prstShdw"))
    {
        return Some(outer_shadow(shdw, theme));
    }
    if let Some(glow) = list.child("a:glow") {
        let color = resolve_color_or(glow, theme, RGBColor::BLACK);
        return Some(Shadow {
            color: color.css(),
            blur: emu_to_pt(glow.attr_or_zero("rad")) * 2.0,
            offset_x: 0.0,
            offset_y: 0.0,
            opacity: color.alpha,
        });
    }
    if let Some(soft) = list.child("a:softEdge") {
        return Some(Shadow {
            color: RGBColor::BLACK.to_css(),
            blur: emu_to_pt(soft.attr_or_zero("rad")),
            offset_x: 0.0,
            offset_y: 0.0,
            opacity: SOFT_EDGE_OPACITY,
        });
    }
    None
}

/// Offsets come from the polar `dist`/`dir` pair.
fn outer_shadow(shdw: &XmlNode, theme: &Theme) -> Shadow {
    let color = resolve_color_or(shdw, theme, RGBColor::BLACK);
    let dist = emu_to_pt(shdw.attr_or_zero("dist"));
    let dir = angle_to_deg(shdw.attr_or_zero("dir")).to_radians();
    Shadow {
        color: color.css(),
        blur: emu_to_pt(shdw.attr_or_zero("blurRad")),
        offset_x: clean(dist * dir.cos()),
        offset_y: clean(dist * dir.sin()),
        opacity: color.alpha,
    }
}
