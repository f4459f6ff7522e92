//! Fill and outline translation.
//!
//! Maps the fill choice of a shape-properties block (`p:spPr`, `p:bgPr`,
//! `p:grpSpPr`) to a scene [`Paint`], and `a:ln` to an outline description.

use crate::common::RGBColor;
use crate::common::unit::{angle_to_deg, emu_to_pt, pct_to_unit};
use crate::ooxml::dom::XmlNode;
use crate::ooxml::pptx::color::{resolve_color, resolve_color_or};
use crate::ooxml::pptx::theme::Theme;
use crate::scene::{ColorStop, Gradient, GradientCoords, GradientKind, Paint};
use tracing::trace;

/// Inputs that fill resolution may need beyond the element itself.
#[derive(Debug, Clone, Copy)]
pub struct FillContext<'a> {
    pub theme: &'a Theme,
    /// Fill of the enclosing group, for `a:grpFill`.
    pub group_fill: Option<&'a Paint>,
}

impl<'a> FillContext<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self {
            theme,
            group_fill: None,
        }
    }
}

const FILL_CHOICES: [&str; 6] = [
    "a:noFill",
    "a:solidFill",
    "a:gradFill",
    "a:pattFill",
    "a:blipFill",
    "a:grpFill",
];

/// Fill declared directly in `props`, or `None` when no fill element is present.
pub fn fill_from_properties(props: &XmlNode, ctx: &FillContext<'_>) -> Option<Paint> {
    let elem = props
        .children()
        .iter()
        .find(|c| FILL_CHOICES.contains(&c.name()))?;
    Some(fill_from_element(elem, ctx))
}

/// Translate one fill element.
pub fn fill_from_element(elem: &XmlNode, ctx: &FillContext<'_>) -> Paint {
    match elem.name() {
        "a:solidFill" => match resolve_color(elem, ctx.theme) {
            Some(color) => Paint::Color(color.css()),
            None => {
                trace!("solid fill without a resolvable color");
                Paint::transparent()
            },
        },
        "a:gradFill" => Paint::Gradient(gradient_from(elem, ctx.theme)),
        // Patterns collapse to their foreground color.
        "a:pattFill" => elem
            .child("a:fgClr")
            .and_then(|fg| resolve_color(fg, ctx.theme))
            .map_or_else(Paint::transparent, |c| Paint::Color(c.css())),
        "a:grpFill" => ctx
            .group_fill
            .cloned()
            .unwrap_or_else(Paint::transparent),
        // noFill, and picture fills which a color or gradient cannot express
        _ => Paint::transparent(),
    }
}

/// Build a gradient descriptor from `a:gradFill`.
pub fn gradient_from(grad: &XmlNode, theme: &Theme) -> Gradient {
    let color_stops = grad
        .child("a:gsLst")
        .map(|list| {
            list.children_named("a:gs")
                .map(|gs| ColorStop {
                    offset: pct_to_unit(gs.attr_or_zero("pos")).clamp(0.0, 1.0),
                    color: resolve_color_or(gs, theme, RGBColor::BLACK).css(),
                })
                .collect()
        })
        .unwrap_or_default();

    if grad.child("a:path").is_some() {
        return Gradient {
            kind: GradientKind::Radial,
            coords: GradientCoords::radial(),
            color_stops,
        };
    }

    let angle = grad
        .child("a:lin")
        .map_or(0.0, |lin| angle_to_deg(lin.attr_or_zero("ang")));
    Gradient {
        kind: GradientKind::Linear,
        coords: GradientCoords::linear(angle),
        color_stops,
    }
}

/// Outline declared by a shape.
#[derive(Debug, Clone, PartialEq)]
pub enum LineStyle {
    /// No `a:ln` at all.
    Unspecified,
    /// Explicit `a:noFill` outline.
    NoLine,
    /// An outline; `color` is `None` when `a:ln` has no fill of its own.
    Line { color: Option<String>, width: Option<f64> },
}

/// Read `a:ln` from a shape-properties block.
pub fn line_style(props: &XmlNode, theme: &Theme) -> LineStyle {
    let Some(ln) = props.child("a:ln") else {
        return LineStyle::Unspecified;
    };
    if ln.child("a:noFill").is_some() {
        return LineStyle::NoLine;
    }
    let ctx = FillContext::new(theme);
    let color = fill_from_properties(ln, &ctx).and_then(|paint| {
        paint.representative_color().map(str::to_string)
    });
    let width = ln.attr_i64("w").map(emu_to_pt);
    LineStyle::Line { color, width }
}

/// Fill implied by `p:style/a:fillRef`; index 0 means no fill.
pub fn style_fill(style: &XmlNode, theme: &Theme) -> Option<Paint> {
    let fill_ref = style.child("a:fillRef")?;
    if fill_ref.attr_or_zero("idx") == 0 {
        return Some(Paint::transparent());
    }
    resolve_color(fill_ref, theme).map(|c| Paint::Color(c.css()))
}

/// Outline implied by `p:style/a:lnRef`; index 0 means no line.
pub fn style_line(style: &XmlNode, theme: &Theme) -> LineStyle {
    let Some(ln_ref) = style.child("a:lnRef") else {
        return LineStyle::Unspecified;
    };
    if ln_ref.attr_or_zero("idx") == 0 {
        return LineStyle::NoLine;
    }
    LineStyle::Line {
        color: resolve_color(ln_ref, theme).map(|c| c.css()),
        width: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp_pr(inner: &str) -> XmlNode {
        let xml = format!(
            r#"<p:spPr xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
                       xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">{}</p:spPr>"#,
            inner
        );
        XmlNode::parse(xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_no_fill_element_is_none() {
        let theme = Theme::default();
        let props = sp_pr(r#"<a:prstGeom prst="rect"/>"#);
        assert_eq!(fill_from_properties(&props, &FillContext::new(&theme)), None);
    }

    #[test]
    fn test_no_fill_is_transparent() {
        let theme = Theme::default();
        let props = sp_pr("<a:noFill/>");
        let fill = fill_from_properties(&props, &FillContext::new(&theme)).unwrap();
        assert!(fill.is_transparent());
    }

    #[test]
    fn test_solid_theme_fill() {
        let theme = Theme::default();
        let props = sp_pr(r#"<a:solidFill><a:schemeClr val="accent2"/></a:solidFill>"#);
        let fill = fill_from_properties(&props, &FillContext::new(&theme)).unwrap();
        assert_eq!(fill, Paint::Color("#ed7d31".to_string()));
    }

    #[test]
    fn test_linear_gradient() {
        let theme = Theme::default();
        let props = sp_pr(
            r#"<a:gradFill><a:gsLst>
                 <a:gs pos="0"><a:srgbClr val="FF0000"/></a:gs>
                 <a:gs pos="100000"><a:srgbClr val="0000FF"/></a:gs>
               </a:gsLst><a:lin ang="5400000" scaled="0"/></a:gradFill>"#,
        );
        let Some(Paint::Gradient(g)) = fill_from_properties(&props, &FillContext::new(&theme)) else {
            panic!("expected gradient");
        };
        assert_eq!(g.kind, GradientKind::Linear);
        assert_eq!(g.color_stops.len(), 2);
        assert_eq!(g.color_stops[1].offset, 1.0);
        assert_eq!(g.color_stops[1].color, "#0000ff");
        // 90 degrees runs top to bottom
        assert!((g.coords.x1 - 0.5).abs() < 1e-9 && g.coords.y1.abs() < 1e-9);
        assert!((g.coords.x2 - 0.5).abs() < 1e-9 && (g.coords.y2 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_radial_gradient_ignores_angle() {
        let theme = Theme::default();
        let props = sp_pr(
            r#"<a:gradFill><a:gsLst><a:gs pos="50000"><a:srgbClr val="00FF00"/></a:gs></a:gsLst>
               <a:path path="circle"/><a:lin ang="2700000"/></a:gradFill>"#,
        );
        let Some(Paint::Gradient(g)) = fill_from_properties(&props, &FillContext::new(&theme)) else {
            panic!("expected gradient");
        };
        assert_eq!(g.kind, GradientKind::Radial);
        assert_eq!(g.coords, GradientCoords::radial());
        assert_eq!(g.color_stops[0].offset, 0.5);
    }

    #[test]
    fn test_group_fill_inherits() {
        let theme = Theme::default();
        let parent = Paint::Color("#010203".to_string());
        let ctx = FillContext {
            theme: &theme,
            group_fill: Some(&parent),
        };
        let props = sp_pr("<a:grpFill/>");
        assert_eq!(fill_from_properties(&props, &ctx), Some(parent.clone()));
    }

    #[test]
    fn test_line_styles() {
        let theme = Theme::default();
        assert_eq!(line_style(&sp_pr(""), &theme), LineStyle::Unspecified);
        assert_eq!(
            line_style(&sp_pr("<a:ln><a:noFill/></a:ln>"), &theme),
            LineStyle::NoLine
        );
        assert_eq!(
            line_style(
                &sp_pr(r#"<a:ln w="25400"><a:solidFill><a:srgbClr val="00FF00"/></a:solidFill></a:ln>"#),
                &theme
            ),
            LineStyle::Line {
                color: Some("#00ff00".to_string()),
                width: Some(2.0)
            }
        );
    }
}
