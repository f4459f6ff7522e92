//! Path command lists.
//!
//! Commands serialize as arrays in the canvas convention, e.g. `["M", 0, 0]`
//! or `["A", rx, ry, 0, large, sweep, x, y]`. Arcs read from DrawingML append
//! their start and sweep angles in degrees, `["A", ..., x, y, stAng, swAng]`;
//! canvas renderers ignore the trailing pair. On input both the array form
//! and an SVG path string (`"M 0 0 L 10 10 Z"`, relative commands allowed)
//! are accepted and normalized to absolute commands.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

/// One absolute drawing command; coordinates in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo {
        x: f64,
        y: f64,
    },
    LineTo {
        x: f64,
        y: f64,
    },
    CubicTo {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x: f64,
        y: f64,
    },
    QuadTo {
        x1: f64,
        y1: f64,
        x: f64,
        y: f64,
    },
    /// Elliptical arc in SVG end-point form (no axis rotation).
    ArcTo {
        rx: f64,
        ry: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
        /// Start and sweep angles in degrees, clockwise positive, when known.
        angles: Option<(f64, f64)>,
    },
    Close,
}

impl PathCommand {
    /// The point this command leaves as the current point, if it moves it.
    pub fn end_point(&self) -> Option<(f64, f64)> {
        match *self {
            PathCommand::MoveTo { x, y }
            | PathCommand::LineTo { x, y }
            | PathCommand::CubicTo { x, y, .. }
            | PathCommand::QuadTo { x, y, .. }
            | PathCommand::ArcTo { x, y, .. } => Some((x, y)),
            PathCommand::Close => None,
        }
    }

    fn letter(&self) -> &'static str {
        match self {
            PathCommand::MoveTo { .. } => "M",
            PathCommand::LineTo { .. } => "L",
            PathCommand::CubicTo { .. } => "C",
            PathCommand::QuadTo { .. } => "Q",
            PathCommand::ArcTo { .. } => "A",
            PathCommand::Close => "Z",
        }
    }

    fn operands(&self) -> SmallVec<[f64; 9]> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        match *self {
            PathCommand::MoveTo { x, y } | PathCommand::LineTo { x, y } => SmallVec::from_slice(&[x, y]),
            PathCommand::CubicTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => SmallVec::from_slice(&[x1, y1, x2, y2, x, y]),
            PathCommand::QuadTo { x1, y1, x, y } => SmallVec::from_slice(&[x1, y1, x, y]),
            PathCommand::ArcTo {
                rx,
                ry,
                large_arc,
                sweep,
                x,
                y,
                angles,
            } => {
                let mut ops = SmallVec::from_slice(&[rx, ry, 0.0, flag(large_arc), flag(sweep), x, y]);
                if let Some((start, sweep_angle)) = angles {
                    ops.extend_from_slice(&[start, sweep_angle]);
                }
                ops
            },
            PathCommand::Close => SmallVec::new(),
        }
    }
}

impl Serialize for PathCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let operands = self.operands();
        let mut seq = serializer.serialize_seq(Some(operands.len() + 1))?;
        seq.serialize_element(self.letter())?;
        for v in operands {
            seq.serialize_element(&v)?;
        }
        seq.end()
    }
}

/// A full path, deserializable from either array or string form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathData(pub Vec<PathCommand>);

impl Serialize for PathData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PathData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let tokens = match value {
            Value::String(s) => tokenize(&s).map_err(de::Error::custom)?,
            Value::Array(items) => array_tokens(&items).map_err(de::Error::custom)?,
            Value::Null => return Ok(PathData::default()),
            other => {
                return Err(de::Error::custom(format!(
                    "path must be an array or string, got {}",
                    other
                )));
            },
        };
        build_commands(&tokens)
            .map(PathData)
            .map_err(de::Error::custom)
    }
}

impl PathData {
    /// Parse an SVG path string.
    pub fn parse_svg(s: &str) -> Result<Self, String> {
        build_commands(&tokenize(s)?).map(PathData)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Cmd(char),
    Num(f64),
    /// Trailing start/sweep pair of an array-form arc.
    ArcAngles(f64, f64),
}

/// Length of an array-form arc that carries its angles.
const ARC_WITH_ANGLES_LEN: usize = 10;

fn array_tokens(items: &[Value]) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    for item in items {
        let Value::Array(parts) = item else {
            return Err(format!("path command must be an array, got {}", item));
        };
        let is_arc = matches!(parts.first(), Some(Value::String(s)) if s.eq_ignore_ascii_case("a"));
        let (plain, angles) = if is_arc && parts.len() == ARC_WITH_ANGLES_LEN {
            parts.split_at(ARC_WITH_ANGLES_LEN - 2)
        } else {
            (parts.as_slice(), &[][..])
        };
        for part in plain {
            tokens.push(part_token(part)?);
        }
        if let [start, sweep] = angles {
            match (part_token(start)?, part_token(sweep)?) {
                (Token::Num(start), Token::Num(sweep)) => tokens.push(Token::ArcAngles(start, sweep)),
                _ => return Err("arc angles must be numbers".to_string()),
            }
        }
    }
    Ok(tokens)
}

fn part_token(part: &Value) -> Result<Token, String> {
    match part {
        Value::String(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => Ok(Token::Cmd(c)),
                _ => s
                    .trim()
                    .parse::<f64>()
                    .map(Token::Num)
                    .map_err(|_| format!("bad path token '{}'", s)),
            }
        },
        Value::Number(n) => Ok(Token::Num(n.as_f64().unwrap_or(0.0))),
        Value::Bool(b) => Ok(Token::Num(if *b { 1.0 } else { 0.0 })),
        other => Err(format!("bad path token {}", other)),
    }
}

fn tokenize(s: &str) -> Result<Vec<Token>, String> {
    let bytes = s.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() || c == b',' {
            i += 1;
        } else if c.is_ascii_alphabetic() && c != b'e' && c != b'E' {
            tokens.push(Token::Cmd(c as char));
            i += 1;
        } else {
            let start = i;
            if bytes[i] == b'+' || bytes[i] == b'-' {
                i += 1;
            }
            let mut seen_dot = false;
            while i < bytes.len() {
                match bytes[i] {
                    b'0'..=b'9' => i += 1,
                    b'.' if !seen_dot => {
                        seen_dot = true;
                        i += 1;
                    },
                    b'e' | b'E' => {
                        i += 1;
                        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
                            i += 1;
                        }
                    },
                    _ => break,
                }
            }
            let text = &s[start..i];
            let value = text
                .parse::<f64>()
                .map_err(|_| format!("bad number '{}' in path", text))?;
            tokens.push(Token::Num(value));
        }
    }
    Ok(tokens)
}

/// Walk tokens with current-point threading and emit absolute commands.
fn build_commands(tokens: &[Token]) -> Result<Vec<PathCommand>, String> {
    let mut out = Vec::new();
    let mut cur = (0.0, 0.0);
    let mut start = (0.0, 0.0);
    // Last control point of a C/S or Q/T command, for reflection.
    let mut last_cubic_ctrl: Option<(f64, f64)> = None;
    let mut last_quad_ctrl: Option<(f64, f64)> = None;
    let mut i = 0;
    let mut cmd: Option<char> = None;

    while i < tokens.len() {
        if let Token::Cmd(c) = tokens[i] {
            cmd = Some(c);
            i += 1;
            if c == 'Z' || c == 'z' {
                out.push(PathCommand::Close);
                cur = start;
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
                continue;
            }
        }
        let Some(c) = cmd else {
            return Err("path data must start with a command".to_string());
        };
        let arity = match c.to_ascii_uppercase() {
            'M' | 'L' | 'T' => 2,
            'H' | 'V' => 1,
            'C' => 6,
            'S' | 'Q' => 4,
            'A' => 7,
            'Z' => {
                return Err("unexpected operands after close".to_string());
            },
            other => return Err(format!("unsupported path command '{}'", other)),
        };
        let mut args = [0.0f64; 7];
        for slot in args.iter_mut().take(arity) {
            match tokens.get(i) {
                Some(Token::Num(v)) => *slot = *v,
                _ => return Err(format!("command '{}' expects {} operands", c, arity)),
            }
            i += 1;
        }
        let rel = c.is_ascii_lowercase();
        let (ox, oy) = if rel { cur } else { (0.0, 0.0) };
        let pt = |x: f64, y: f64| (x + ox, y + oy);

        let mut next_cubic = None;
        let mut next_quad = None;
        let command = match c.to_ascii_uppercase() {
            'M' => {
                let (x, y) = pt(args[0], args[1]);
                start = (x, y);
                // Subsequent pairs are implicit line-tos.
                cmd = Some(if rel { 'l' } else { 'L' });
                PathCommand::MoveTo { x, y }
            },
            'L' => {
                let (x, y) = pt(args[0], args[1]);
                PathCommand::LineTo { x, y }
            },
            'H' => {
                let x = args[0] + ox;
                PathCommand::LineTo { x, y: cur.1 }
            },
            'V' => {
                let y = args[0] + oy;
                PathCommand::LineTo { x: cur.0, y }
            },
            'C' => {
                let (x1, y1) = pt(args[0], args[1]);
                let (x2, y2) = pt(args[2], args[3]);
                let (x, y) = pt(args[4], args[5]);
                next_cubic = Some((x2, y2));
                PathCommand::CubicTo {
                    x1,
                    y1,
                    x2,
                    y2,
                    x,
                    y,
                }
            },
            'S' => {
                let (x1, y1) = reflect(last_cubic_ctrl, cur);
                let (x2, y2) = pt(args[0], args[1]);
                let (x, y) = pt(args[2], args[3]);
                next_cubic = Some((x2, y2));
                PathCommand::CubicTo {
                    x1,
                    y1,
                    x2,
                    y2,
                    x,
                    y,
                }
            },
            'Q' => {
                let (x1, y1) = pt(args[0], args[1]);
                let (x, y) = pt(args[2], args[3]);
                next_quad = Some((x1, y1));
                PathCommand::QuadTo { x1, y1, x, y }
            },
            'T' => {
                let (x1, y1) = reflect(last_quad_ctrl, cur);
                let (x, y) = pt(args[0], args[1]);
                next_quad = Some((x1, y1));
                PathCommand::QuadTo { x1, y1, x, y }
            },
            _ => {
                let (x, y) = pt(args[5], args[6]);
                let angles = match tokens.get(i) {
                    Some(&Token::ArcAngles(start, sweep)) => {
                        i += 1;
                        Some((start, sweep))
                    },
                    _ => None,
                };
                PathCommand::ArcTo {
                    rx: args[0].abs(),
                    ry: args[1].abs(),
                    large_arc: args[3] != 0.0,
                    sweep: args[4] != 0.0,
                    x,
                    y,
                    angles,
                }
            },
        };
        if let Some(end) = command.end_point() {
            cur = end;
        }
        last_cubic_ctrl = next_cubic;
        last_quad_ctrl = next_quad;
        out.push(command);
    }
    Ok(out)
}

fn reflect(ctrl: Option<(f64, f64)>, cur: (f64, f64)) -> (f64, f64) {
    match ctrl {
        Some((cx, cy)) => (2.0 * cur.0 - cx, 2.0 * cur.1 - cy),
        None => cur,
    }
}
