//! Geometry and path extraction.
//!
//! Custom geometry (`a:custGeom`) is walked path by path, command by command,
//! with the current point threaded through. Coordinates are scaled from each
//! path's own `w`/`h` space into the shape box and converted to points, so
//! every emitted command is box-local in points.
//!
//! Arcs are approximated: `arcTo` carries radii plus start and sweep angles,
//! and is emitted as an SVG end-point arc whose end point is computed from
//! the implied ellipse center.

use std::collections::HashMap;

use crate::common::unit::{EMUS_PER_PT, angle_to_deg};
use crate::ooxml::dom::XmlNode;
use crate::scene::{ClipRect, PathCommand};
use smallvec::SmallVec;
use tracing::trace;

/// Result of walking one `a:custGeom`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomGeometry {
    pub commands: Vec<PathCommand>,
    /// The `a:rect` text/bounding rectangle, box-local in points.
    pub clip: Option<ClipRect>,
}

/// Arc parameters in DrawingML terms; angles in degrees, clockwise positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcParams {
    pub rx: f64,
    pub ry: f64,
    pub start: f64,
    pub sweep: f64,
}

impl ArcParams {
    /// End point, large-arc flag and sweep flag of an arc starting at `from`.
    pub fn endpoint(&self, from: (f64, f64)) -> ((f64, f64), bool, bool) {
        let st = self.start.to_radians();
        let end = (self.start + self.sweep).to_radians();
        let cx = from.0 - self.rx * st.cos();
        let cy = from.1 - self.ry * st.sin();
        let to = (cx + self.rx * end.cos(), cy + self.ry * end.sin());
        (to, self.sweep.abs() > 180.0, self.sweep > 0.0)
    }

    /// The equivalent end-point arc command from `from`.
    pub fn to_command(&self, from: (f64, f64)) -> PathCommand {
        let ((x, y), large_arc, sweep) = self.endpoint(from);
        PathCommand::ArcTo {
            rx: self.rx,
            ry: self.ry,
            large_arc,
            sweep,
            x,
            y,
            angles: Some((self.start, self.sweep)),
        }
    }
}

/// Guide values visible to one path: the built-in box names plus any
/// constant `gd` formulas of the geometry.
struct Guides {
    values: HashMap<String, f64>,
}

impl Guides {
    fn new(cust_geom: &XmlNode, w: f64, h: f64) -> Self {
        let mut values = HashMap::new();
        for (name, v) in [
            ("l", 0.0),
            ("t", 0.0),
            ("r", w),
            ("b", h),
            ("w", w),
            ("h", h),
            ("hc", w / 2.0),
            ("vc", h / 2.0),
            ("wd2", w / 2.0),
            ("hd2", h / 2.0),
        ] {
            values.insert(name.to_string(), v);
        }
        for list in ["a:avLst", "a:gdLst"] {
            let Some(list) = cust_geom.child(list) else {
                continue;
            };
            for gd in list.children_named("a:gd") {
                let (Some(name), Some(fmla)) = (gd.attr("name"), gd.attr("fmla")) else {
                    continue;
                };
                match fmla.strip_prefix("val ").and_then(|v| v.trim().parse::<f64>().ok()) {
                    Some(v) => {
                        values.insert(name.to_string(), v);
                    },
                    None => trace!(name, fmla, "unsupported guide formula"),
                }
            }
        }
        Self { values }
    }

    /// A literal number or a guide name; unknown names read as 0.
    fn get(&self, token: Option<&str>) -> f64 {
        let Some(token) = token else {
            return 0.0;
        };
        if let Ok(v) = token.parse::<f64>() {
            return v;
        }
        self.values.get(token).copied().unwrap_or_else(|| {
            trace!(token, "unknown guide");
            0.0
        })
    }
}

/// Maps path-space coordinates into box-local points.
#[derive(Clone, Copy)]
struct Scale {
    sx: f64,
    sy: f64,
}

impl Scale {
    fn point(&self, guides: &Guides, pt: &XmlNode) -> (f64, f64) {
        (
            guides.get(pt.attr("x")) * self.sx,
            guides.get(pt.attr("y")) * self.sy,
        )
    }
}

/// Walk every path of `cust_geom` for a shape box of `box_cx` × `box_cy` EMU.
pub fn custom_geometry(cust_geom: &XmlNode, box_cx: i64, box_cy: i64) -> CustomGeometry {
    let emu_pt = EMUS_PER_PT as f64;
    let mut geometry = CustomGeometry::default();

    let paths: Vec<&XmlNode> = cust_geom
        .child("a:pathLst")
        .map(|l| l.children_named("a:path").collect())
        .unwrap_or_default();

    for path in &paths {
        // A path without its own size uses the box coordinate space.
        let pw = path.attr_i64("w").filter(|&w| w > 0).unwrap_or(box_cx) as f64;
        let ph = path.attr_i64("h").filter(|&h| h > 0).unwrap_or(box_cy) as f64;
        let scale = Scale {
            sx: if pw > 0.0 { box_cx as f64 / pw / emu_pt } else { 0.0 },
            sy: if ph > 0.0 { box_cy as f64 / ph / emu_pt } else { 0.0 },
        };
        let guides = Guides::new(cust_geom, pw, ph);
        let closes = path.attr("fill") != Some("none");
        geometry.commands.extend(walk_path(path, &guides, scale, closes));
    }

    if let Some(rect) = cust_geom.child("a:rect") {
        let (pw, ph) = paths
            .first()
            .map(|p| {
                (
                    p.attr_i64("w").filter(|&w| w > 0).unwrap_or(box_cx) as f64,
                    p.attr_i64("h").filter(|&h| h > 0).unwrap_or(box_cy) as f64,
                )
            })
            .unwrap_or((box_cx as f64, box_cy as f64));
        let guides = Guides::new(cust_geom, pw, ph);
        let sx = if pw > 0.0 { box_cx as f64 / pw / emu_pt } else { 0.0 };
        let sy = if ph > 0.0 { box_cy as f64 / ph / emu_pt } else { 0.0 };
        let l = guides.get(rect.attr("l")) * sx;
        let t = guides.get(rect.attr("t")) * sy;
        let r = guides.get(rect.attr("r")) * sx;
        let b = guides.get(rect.attr("b")) * sy;
        geometry.clip = Some(ClipRect {
            left: l,
            top: t,
            width: r - l,
            height: b - t,
        });
    }

    geometry
}

/// Commands of one `a:path`. A plain polygon (one `moveTo` then `lnTo`s)
/// of a filled path goes through [`vertex_path`] and gets an explicit close.
fn walk_path(path: &XmlNode, guides: &Guides, scale: Scale, closes: bool) -> Vec<PathCommand> {
    let mut commands = Vec::new();
    let mut current = (0.0, 0.0);
    let mut vertices: SmallVec<[(f64, f64); 16]> = SmallVec::new();
    let mut polygon = closes;

    for cmd in path.children() {
        let pts: SmallVec<[(f64, f64); 3]> = cmd
            .children_named("a:pt")
            .map(|p| scale.point(guides, p))
            .collect();
        match cmd.local_name() {
            "moveTo" => {
                let Some(&(x, y)) = pts.first() else {
                    trace!("moveTo without a point");
                    continue;
                };
                polygon &= commands.is_empty();
                vertices.push((x, y));
                commands.push(PathCommand::MoveTo { x, y });
                current = (x, y);
            },
            "lnTo" => {
                let Some(&(x, y)) = pts.first() else {
                    trace!("lnTo without a point");
                    continue;
                };
                vertices.push((x, y));
                commands.push(PathCommand::LineTo { x, y });
                current = (x, y);
            },
            "cubicBezTo" => {
                polygon = false;
                if pts.len() < 3 {
                    trace!(points = pts.len(), "cubicBezTo needs 3 points, skipped");
                    continue;
                }
                let (x, y) = pts[2];
                commands.push(PathCommand::CubicTo {
                    x1: pts[0].0,
                    y1: pts[0].1,
                    x2: pts[1].0,
                    y2: pts[1].1,
                    x,
                    y,
                });
                current = (x, y);
            },
            "quadBezTo" => {
                polygon = false;
                if pts.len() < 2 {
                    trace!(points = pts.len(), "quadBezTo needs 2 points, skipped");
                    continue;
                }
                let (x, y) = pts[1];
                commands.push(PathCommand::QuadTo {
                    x1: pts[0].0,
                    y1: pts[0].1,
                    x,
                    y,
                });
                current = (x, y);
            },
            "arcTo" => {
                polygon = false;
                let arc = ArcParams {
                    rx: guides.get(cmd.attr("wR")) * scale.sx,
                    ry: guides.get(cmd.attr("hR")) * scale.sy,
                    start: angle_to_deg(guides.get(cmd.attr("stAng")) as i64),
                    sweep: angle_to_deg(guides.get(cmd.attr("swAng")) as i64),
                };
                let command = arc.to_command(current);
                if let Some(end) = command.end_point() {
                    current = end;
                }
                commands.push(command);
            },
            "close" => {
                polygon = false;
                commands.push(PathCommand::Close);
                if let Some(&start) = vertices.first() {
                    current = start;
                }
            },
            other => trace!(command = other, "unknown path command"),
        }
    }

    if polygon && vertices.len() > 1 {
        return vertex_path(&vertices);
    }
    commands
}

/// Move to the first vertex, line to each following one, then close.
pub fn vertex_path(points: &[(f64, f64)]) -> Vec<PathCommand> {
    let Some((&(x, y), rest)) = points.split_first() else {
        return Vec::new();
    };
    let mut commands = Vec::with_capacity(points.len() + 1);
    commands.push(PathCommand::MoveTo { x, y });
    commands.extend(rest.iter().map(|&(x, y)| PathCommand::LineTo { x, y }));
    commands.push(PathCommand::Close);
    commands
}

/// A straight segment across a `width` × `height` box, corner to corner.
pub fn line_path(width: f64, height: f64, flip_h: bool, flip_v: bool) -> Vec<PathCommand> {
    let (x0, x1) = if flip_h { (width, 0.0) } else { (0.0, width) };
    let (y0, y1) = if flip_v { (height, 0.0) } else { (0.0, height) };
    vec![
        PathCommand::MoveTo { x: x0, y: y0 },
        PathCommand::LineTo { x: x1, y: y1 },
    ]
}

/// Recover start/sweep angles from an SVG end-point arc (no axis rotation).
///
/// Radii too small to span the chord are scaled up as SVG prescribes.
/// Returns `None` for degenerate arcs, which draw as straight lines.
pub fn svg_arc_to_arc_to(
    from: (f64, f64),
    rx: f64,
    ry: f64,
    large_arc: bool,
    sweep: bool,
    to: (f64, f64),
) -> Option<ArcParams> {
    let (mut rx, mut ry) = (rx.abs(), ry.abs());
    if rx < f64::EPSILON || ry < f64::EPSILON {
        return None;
    }
    if (from.0 - to.0).abs() < f64::EPSILON && (from.1 - to.1).abs() < f64::EPSILON {
        return None;
    }

    let x1p = (from.0 - to.0) / 2.0;
    let y1p = (from.1 - to.1) / 2.0;

    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }

    let num = rx * rx * ry * ry - rx * rx * y1p * y1p - ry * ry * x1p * x1p;
    let den = rx * rx * y1p * y1p + ry * ry * x1p * x1p;
    let sign = if large_arc != sweep { 1.0 } else { -1.0 };
    let coef = sign * (num / den).max(0.0).sqrt();
    let cxp = coef * rx * y1p / ry;
    let cyp = -coef * ry * x1p / rx;

    let ux = (x1p - cxp) / rx;
    let uy = (y1p - cyp) / ry;
    let vx = (-x1p - cxp) / rx;
    let vy = (-y1p - cyp) / ry;

    let start = uy.atan2(ux).to_degrees();
    let mut delta = (vy.atan2(vx) - uy.atan2(ux)).to_degrees().rem_euclid(360.0);
    if !sweep && delta > 0.0 {
        delta -= 360.0;
    }

    Some(ArcParams {
        rx,
        ry,
        start,
        sweep: delta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cust_geom(inner: &str) -> XmlNode {
        let xml = format!(
            r#"<a:custGeom xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">{}</a:custGeom>"#,
            inner
        );
        XmlNode::parse(xml.as_bytes()).unwrap()
    }

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-6 && (a.1 - b.1).abs() < 1e-6
    }

    #[test]
    fn test_polygon_gets_explicit_close() {
        // path space 100 x 100 scaled into a 200pt x 100pt box
        let geom = cust_geom(
            r#"<a:pathLst><a:path w="100" h="100">
                 <a:moveTo><a:pt x="0" y="0"/></a:moveTo>
                 <a:lnTo><a:pt x="100" y="0"/></a:lnTo>
                 <a:lnTo><a:pt x="50" y="100"/></a:lnTo>
               </a:path></a:pathLst>"#,
        );
        let g = custom_geometry(&geom, 200 * 12700, 100 * 12700);
        assert_eq!(
            g.commands,
            vec![
                PathCommand::MoveTo { x: 0.0, y: 0.0 },
                PathCommand::LineTo { x: 200.0, y: 0.0 },
                PathCommand::LineTo { x: 100.0, y: 100.0 },
                PathCommand::Close,
            ]
        );
        assert!(g.clip.is_none());
    }

    #[test]
    fn test_open_path_stays_open() {
        let geom = cust_geom(
            r#"<a:pathLst><a:path w="10" h="10" fill="none">
                 <a:moveTo><a:pt x="0" y="0"/></a:moveTo>
                 <a:lnTo><a:pt x="10" y="10"/></a:lnTo>
               </a:path></a:pathLst>"#,
        );
        let g = custom_geometry(&geom, 127_000, 127_000);
        assert_eq!(g.commands.len(), 2);
        assert_eq!(g.commands[1], PathCommand::LineTo { x: 10.0, y: 10.0 });
    }

    #[test]
    fn test_short_cubic_is_skipped() {
        let geom = cust_geom(
            r#"<a:pathLst><a:path w="12700" h="12700">
                 <a:moveTo><a:pt x="0" y="0"/></a:moveTo>
                 <a:cubicBezTo><a:pt x="1" y="1"/><a:pt x="2" y="2"/></a:cubicBezTo>
                 <a:quadBezTo><a:pt x="12700" y="0"/><a:pt x="12700" y="12700"/></a:quadBezTo>
                 <a:close/>
               </a:path></a:pathLst>"#,
        );
        let g = custom_geometry(&geom, 12700, 12700);
        assert_eq!(
            g.commands,
            vec![
                PathCommand::MoveTo { x: 0.0, y: 0.0 },
                PathCommand::QuadTo {
                    x1: 1.0,
                    y1: 0.0,
                    x: 1.0,
                    y: 1.0
                },
                PathCommand::Close,
            ]
        );
    }

    #[test]
    fn test_arc_end_point_and_flags() {
        // Quarter circle from the right-most point of a circle of radius 10,
        // clockwise (downward on screen).
        let geom = cust_geom(
            r#"<a:pathLst><a:path w="254000" h="254000">
                 <a:moveTo><a:pt x="254000" y="127000"/></a:moveTo>
                 <a:arcTo wR="127000" hR="127000" stAng="0" swAng="5400000"/>
               </a:path></a:pathLst>"#,
        );
        let g = custom_geometry(&geom, 254_000, 254_000);
        let PathCommand::ArcTo {
            rx,
            ry,
            large_arc,
            sweep,
            x,
            y,
            angles,
        } = g.commands[1]
        else {
            panic!("expected arc");
        };
        assert_eq!((rx, ry), (10.0, 10.0));
        assert_eq!(angles, Some((0.0, 90.0)));
        assert!(!large_arc);
        assert!(sweep);
        assert!(close((x, y), (10.0, 20.0)));
    }

    #[test]
    fn test_guides_and_clip_rect() {
        let geom = cust_geom(
            r#"<a:gdLst><a:gd name="inset" fmla="val 10"/></a:gdLst>
               <a:rect l="inset" t="t" r="r" b="b"/>
               <a:pathLst><a:path w="100" h="100">
                 <a:moveTo><a:pt x="l" y="t"/></a:moveTo>
                 <a:lnTo><a:pt x="r" y="vc"/></a:lnTo>
                 <a:lnTo><a:pt x="inset" y="b"/></a:lnTo>
               </a:path></a:pathLst>"#,
        );
        let g = custom_geometry(&geom, 100 * 12700, 100 * 12700);
        assert_eq!(g.commands[1], PathCommand::LineTo { x: 100.0, y: 50.0 });
        assert_eq!(g.commands[2], PathCommand::LineTo { x: 10.0, y: 100.0 });
        assert_eq!(
            g.clip,
            Some(ClipRect {
                left: 10.0,
                top: 0.0,
                width: 90.0,
                height: 100.0
            })
        );
    }

    #[test]
    fn test_line_path_flips() {
        assert_eq!(
            line_path(10.0, 5.0, true, false),
            vec![
                PathCommand::MoveTo { x: 10.0, y: 0.0 },
                PathCommand::LineTo { x: 0.0, y: 5.0 },
            ]
        );
    }

    #[test]
    fn test_vertex_path() {
        assert!(vertex_path(&[]).is_empty());
        let cmds = vertex_path(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        assert_eq!(cmds.len(), 4);
        assert_eq!(cmds[3], PathCommand::Close);
    }

    #[test]
    fn test_degenerate_svg_arc() {
        assert!(svg_arc_to_arc_to((0.0, 0.0), 0.0, 5.0, false, true, (1.0, 1.0)).is_none());
        assert!(svg_arc_to_arc_to((1.0, 1.0), 5.0, 5.0, false, true, (1.0, 1.0)).is_none());
    }

    proptest! {
        #[test]
        fn prop_arc_round_trip(
            fx in -100.0f64..100.0,
            fy in -100.0f64..100.0,
            rx in 5.0f64..200.0,
            ry in 5.0f64..200.0,
            start in -180.0f64..180.0,
            magnitude in prop_oneof![5.0f64..170.0, 190.0f64..355.0],
            clockwise in any::<bool>(),
        ) {
            let sweep = if clockwise { magnitude } else { -magnitude };
            let arc = ArcParams { rx, ry, start, sweep };
            let ((tx, ty), large, sweep_flag) = arc.endpoint((fx, fy));
            let back = svg_arc_to_arc_to((fx, fy), rx, ry, large, sweep_flag, (tx, ty)).unwrap();
            prop_assert!((back.rx - rx).abs() < 1e-6 * rx);
            prop_assert!((back.ry - ry).abs() < 1e-6 * ry);
            prop_assert!((back.sweep - sweep).abs() < 1e-4);
            let d = (back.start - start).rem_euclid(360.0);
            prop_assert!(d < 1e-4 || d > 360.0 - 1e-4);
        }
    }
}
