//! Shape transforms and placeholder geometry inheritance.

use crate::ooxml::dom::XmlNode;

/// Contents of an `a:xfrm` (or `p:xfrm`) element, in EMU and 60000ths of a degree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Xfrm {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
    pub rot: i64,
    pub flip_h: bool,
    pub flip_v: bool,
    /// Child coordinate space of a group (`a:chOff` / `a:chExt`).
    pub ch_x: i64,
    pub ch_y: i64,
    pub ch_cx: i64,
    pub ch_cy: i64,
}

impl Xfrm {
    pub fn from_node(xfrm: &XmlNode) -> Self {
        let pair = |name: &str, a: &str, b: &str| {
            xfrm.child(name)
                .map_or((0, 0), |n| (n.attr_or_zero(a), n.attr_or_zero(b)))
        };
        let (x, y) = pair("a:off", "x", "y");
        let (cx, cy) = pair("a:ext", "cx", "cy");
        let (ch_x, ch_y) = pair("a:chOff", "x", "y");
        let (ch_cx, ch_cy) = pair("a:chExt", "cx", "cy");
        Self {
            x,
            y,
            cx,
            cy,
            rot: xfrm.attr_or_zero("rot"),
            flip_h: xfrm.attr_bool("flipH"),
            flip_v: xfrm.attr_bool("flipV"),
            ch_x,
            ch_y,
            ch_cx,
            ch_cy,
        }
    }

    /// The transform declared by a shape element of any kind.
    pub fn of_shape(shape: &XmlNode) -> Option<Self> {
        let props = ["p:spPr", "p:grpSpPr"]
            .iter()
            .find_map(|name| shape.child(name));
        props
            .and_then(|p| p.child("a:xfrm"))
            .or_else(|| shape.child("p:xfrm"))
            .map(Self::from_node)
    }
}

/// Axis-aligned affine map `p' = s·p + t` from a group's child space to
/// slide space, in EMU.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub sx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        sx: 1.0,
        sy: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Child-to-parent map of a group. An empty child extent maps 1:1.
    pub fn for_group(xfrm: &Xfrm) -> Self {
        let sx = if xfrm.ch_cx != 0 { xfrm.cx as f64 / xfrm.ch_cx as f64 } else { 1.0 };
        let sy = if xfrm.ch_cy != 0 { xfrm.cy as f64 / xfrm.ch_cy as f64 } else { 1.0 };
        Self {
            sx,
            sy,
            tx: xfrm.x as f64 - xfrm.ch_x as f64 * sx,
            ty: xfrm.y as f64 - xfrm.ch_y as f64 * sy,
        }
    }

    /// Apply `self` first, then `outer`.
    pub fn then(self, outer: Transform) -> Transform {
        Transform {
            sx: outer.sx * self.sx,
            sy: outer.sy * self.sy,
            tx: outer.sx * self.tx + outer.tx,
            ty: outer.sy * self.ty + outer.ty,
        }
    }

    /// Map a box `(x, y, cx, cy)` in EMU.
    pub fn apply(&self, x: i64, y: i64, cx: i64, cy: i64) -> (f64, f64, f64, f64) {
        (
            self.sx * x as f64 + self.tx,
            self.sy * y as f64 + self.ty,
            self.sx * cx as f64,
            self.sy * cy as f64,
        )
    }
}

/// Placeholder type with `ctrTitle` folded into `title`; absent means `body`.
fn placeholder_type(ph: &XmlNode) -> &str {
    match ph.attr("type").unwrap_or("body") {
        "ctrTitle" => "title",
        other => other,
    }
}

/// The `p:ph` of any shape element, whichever non-visual block
/// (`p:nvSpPr`, `p:nvPicPr`, `p:nvCxnSpPr`, `p:nvGrpSpPr`) carries it.
pub fn placeholder_of(shape: &XmlNode) -> Option<&XmlNode> {
    shape
        .children()
        .iter()
        .filter(|nv| nv.local_name().starts_with("nv"))
        .find_map(|nv| nv.path(&["p:nvPr", "p:ph"]))
}

/// Find the shape on a layout or master part matching placeholder `ph`,
/// first by `idx`, then by type.
pub fn find_placeholder<'a>(ph: &XmlNode, part_root: &'a XmlNode) -> Option<&'a XmlNode> {
    let candidates: Vec<(&XmlNode, &XmlNode)> = part_root
        .find_all("p:sp")
        .into_iter()
        .chain(part_root.find_all("p:pic"))
        .filter_map(|sp| placeholder_of(sp).map(|p| (sp, p)))
        .collect();

    if let Some(idx) = ph.attr("idx") {
        if let Some((sp, _)) = candidates.iter().find(|(_, p)| p.attr("idx") == Some(idx)) {
            return Some(*sp);
        }
    }
    let wanted = placeholder_type(ph);
    candidates
        .iter()
        .find(|(_, p)| placeholder_type(p) == wanted)
        .map(|(sp, _)| *sp)
}

/// Geometry for a placeholder shape without its own `a:xfrm`: the layout's
/// matching placeholder, else the master's.
pub fn inherited_xfrm(ph: &XmlNode, layout: Option<&XmlNode>, master: Option<&XmlNode>) -> Option<Xfrm> {
    [layout, master]
        .into_iter()
        .flatten()
        .filter_map(|root| find_placeholder(ph, root))
        .find_map(Xfrm::of_shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

    #[test]
    fn test_read_xfrm() {
        let xml = format!(
            r#"<p:sp {NS}><p:spPr><a:xfrm rot="5400000" flipH="1"><a:off x="10" y="20"/><a:ext cx="30" cy="40"/></a:xfrm></p:spPr></p:sp>"#
        );
        let sp = XmlNode::parse(xml.as_bytes()).unwrap();
        let x = Xfrm::of_shape(&sp).unwrap();
        assert_eq!((x.x, x.y, x.cx, x.cy, x.rot), (10, 20, 30, 40, 5_400_000));
        assert!(x.flip_h && !x.flip_v);
    }

    #[test]
    fn test_group_transform_composes() {
        // Group at (100, 100) drawn at twice its child scale.
        let outer = Transform::for_group(&Xfrm {
            x: 100,
            y: 100,
            cx: 200,
            cy: 200,
            ch_x: 0,
            ch_y: 0,
            ch_cx: 100,
            ch_cy: 100,
            ..Default::default()
        });
        // Nested group with offset child space.
        let inner = Transform::for_group(&Xfrm {
            x: 10,
            y: 10,
            cx: 50,
            cy: 50,
            ch_x: 1000,
            ch_y: 1000,
            ch_cx: 50,
            ch_cy: 50,
            ..Default::default()
        });
        let total = inner.then(outer);
        assert_eq!(total.apply(1000, 1000, 50, 50), (120.0, 120.0, 100.0, 100.0));
        assert_eq!(Transform::IDENTITY.apply(1, 2, 3, 4), (1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_placeholder_inheritance() {
        let layout = format!(
            r#"<p:sldLayout {NS}><p:cSld><p:spTree>
                 <p:sp><p:nvSpPr><p:cNvPr id="2" name="Title"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
                   <p:spPr/></p:sp>
                 <p:sp><p:nvSpPr><p:cNvPr id="3" name="Body"/><p:cNvSpPr/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr>
                   <p:spPr><a:xfrm><a:off x="5" y="6"/><a:ext cx="7" cy="8"/></a:xfrm></p:spPr></p:sp>
               </p:spTree></p:cSld></p:sldLayout>"#
        );
        let master = format!(
            r#"<p:sldMaster {NS}><p:cSld><p:spTree>
                 <p:sp><p:nvSpPr><p:cNvPr id="2" name="Title"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
                   <p:spPr><a:xfrm><a:off x="1" y="2"/><a:ext cx="3" cy="4"/></a:xfrm></p:spPr></p:sp>
               </p:spTree></p:cSld></p:sldMaster>"#
        );
        let layout = XmlNode::parse(layout.as_bytes()).unwrap();
        let master = XmlNode::parse(master.as_bytes()).unwrap();

        let body = XmlNode::new("p:ph").with_attr("idx", "1");
        let x = inherited_xfrm(&body, Some(&layout), Some(&master)).unwrap();
        assert_eq!((x.x, x.cy), (5, 8));

        // Layout title has no xfrm, so the master supplies it.
        let title = XmlNode::new("p:ph").with_attr("type", "ctrTitle");
        let x = inherited_xfrm(&title, Some(&layout), Some(&master)).unwrap();
        assert_eq!((x.x, x.y), (1, 2));

        let missing = XmlNode::new("p:ph").with_attr("type", "dt");
        assert!(inherited_xfrm(&missing, Some(&layout), None).is_none());
    }

    #[test]
    fn test_placeholder_of_any_shape_kind() {
        let xml = format!(
            r#"<p:spTree {NS}>
                 <p:pic><p:nvPicPr><p:cNvPr id="2" name="Picture"/><p:cNvPicPr/><p:nvPr><p:ph type="pic" idx="13"/></p:nvPr></p:nvPicPr></p:pic>
                 <p:sp><p:nvSpPr><p:cNvPr id="3" name="Plain"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr></p:sp>
               </p:spTree>"#
        );
        let tree = XmlNode::parse(xml.as_bytes()).unwrap();
        let pic = &tree.children()[0];
        assert_eq!(placeholder_of(pic).and_then(|ph| ph.attr("idx")), Some("13"));
        assert!(placeholder_of(&tree.children()[1]).is_none());
        // layout placeholders may themselves be pictures
        let ph = XmlNode::new("p:ph").with_attr("idx", "13");
        assert!(find_placeholder(&ph, &tree).is_some_and(|found| found.is("p:pic")));
    }
}
