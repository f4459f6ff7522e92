//! Text model extraction.
//!
//! Walks `a:p` / `a:r` structure of a text body in document order. Each run
//! property is resolved independently through the chain
//! `a:rPr` → `a:pPr/a:defRPr` → `a:lstStyle/a:lvlNpPr/a:defRPr` → defaults.
//!
//! Whole-box properties are the mode over runs (alignment: over paragraphs),
//! ties broken by the first value seen. Per-run styles survive as a sparse
//! map keyed by character offset into the joined text.

use std::collections::BTreeMap;

use crate::common::unit::{FONT_SIZE_UNITS_PER_PT, pct_to_unit};
use crate::config::{DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_TEXT_COLOR};
use crate::ooxml::dom::XmlNode;
use crate::ooxml::pptx::color::resolve_color;
use crate::ooxml::pptx::theme::Theme;
use crate::scene::{CharStyle, ObjectBase, Paint, TextboxObject};

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Map an `algn` value; anything outside the table is left.
    pub fn from_algn(value: &str) -> Self {
        match value {
            "ctr" => Alignment::Center,
            "r" => Alignment::Right,
            "just" | "justLow" | "dist" | "thaiDist" => Alignment::Justify,
            _ => Alignment::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }

    pub fn to_algn(self) -> &'static str {
        match self {
            Alignment::Left => "l",
            Alignment::Center => "ctr",
            Alignment::Right => "r",
            Alignment::Justify => "just",
        }
    }

    pub fn from_css(value: &str) -> Self {
        match value {
            "center" => Alignment::Center,
            "right" => Alignment::Right,
            "justify" => Alignment::Justify,
            _ => Alignment::Left,
        }
    }
}

/// Fully resolved run style.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStyle {
    pub font_family: String,
    pub font_size: f64,
    pub color: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    /// `"sub"` or `"super"`.
    pub baseline: Option<&'static str>,
}

impl Default for RunStyle {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            color: DEFAULT_TEXT_COLOR.to_string(),
            bold: false,
            italic: false,
            underline: false,
            strike: false,
            baseline: None,
        }
    }
}

impl RunStyle {
    fn to_char_style(&self) -> CharStyle {
        CharStyle {
            font_family: Some(self.font_family.clone()),
            font_size: Some(self.font_size),
            fill: Some(self.color.clone()),
            font_weight: Some(weight(self.bold).to_string()),
            font_style: Some(slant(self.italic).to_string()),
            underline: self.underline,
            linethrough: self.strike,
            baseline: self.baseline.map(str::to_string),
            text_align: None,
        }
    }
}

fn weight(bold: bool) -> &'static str {
    if bold { "bold" } else { "normal" }
}

fn slant(italic: bool) -> &'static str {
    if italic { "italic" } else { "normal" }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub style: RunStyle,
}

/// One paragraph; `text` includes soft breaks as `\n`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
    pub align: Alignment,
    /// Space before, in points.
    pub space_before: Option<f64>,
    /// Space after, in points.
    pub space_after: Option<f64>,
    /// Line spacing as a multiple of single spacing.
    pub line_spacing: Option<f64>,
    /// Paragraph text, with line breaks.
    pub text: String,
}

/// Extracted text body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBody {
    pub paragraphs: Vec<Paragraph>,
}

/// Most frequent value; ties go to the value seen first.
pub fn mode<T: PartialEq + Clone>(values: &[T]) -> Option<T> {
    let mut counts: Vec<(&T, usize)> = Vec::new();
    for v in values {
        match counts.iter_mut().find(|(seen, _)| *seen == v) {
            Some((_, n)) => *n += 1,
            None => counts.push((v, 1)),
        }
    }
    let mut best: Option<(&T, usize)> = None;
    for (v, n) in counts {
        if best.is_none_or(|(_, b)| n > b) {
            best = Some((v, n));
        }
    }
    best.map(|(v, _)| v.clone())
}

/// Property sources for one paragraph, most specific first.
struct StyleChain<'a> {
    sources: Vec<&'a XmlNode>,
    theme: &'a Theme,
}

impl<'a> StyleChain<'a> {
    fn attr(&self, key: &str) -> Option<&'a str> {
        self.sources.iter().find_map(|n| n.attr(key))
    }

    fn child(&self, qname: &str) -> Option<&'a XmlNode> {
        self.sources.iter().find_map(|n| n.child(qname))
    }

    fn resolve(&self) -> RunStyle {
        let defaults = RunStyle::default();
        let font_family = self
            .child("a:latin")
            .and_then(|l| l.attr("typeface"))
            .and_then(|t| self.theme.resolve_typeface(t))
            .map_or(defaults.font_family, str::to_string);
        let font_size = self
            .attr("sz")
            .and_then(|v| v.parse::<f64>().ok())
            .map_or(defaults.font_size, |sz| sz / FONT_SIZE_UNITS_PER_PT);
        let color = self
            .child("a:solidFill")
            .and_then(|f| resolve_color(f, self.theme))
            .map_or(defaults.color, |c| c.css());
        let flag = |key: &str| self.attr(key).is_some_and(|v| v == "1" || v == "true");
        let baseline = match self.attr("baseline").and_then(|v| v.parse::<i64>().ok()) {
            Some(b) if b > 0 => Some("super"),
            Some(b) if b < 0 => Some("sub"),
            _ => None,
        };
        RunStyle {
            font_family,
            font_size,
            color,
            bold: flag("b"),
            italic: flag("i"),
            underline: self.attr("u").is_some_and(|u| u != "none"),
            strike: self.attr("strike").is_some_and(|s| s != "noStrike"),
            baseline,
        }
    }
}

/// Extract a text body (`p:txBody` or `a:txBody`).
///
/// `inherited_lists` are list styles from layout or master placeholders,
/// consulted after the body's own `a:lstStyle`.
pub fn extract_text_body(tx_body: &XmlNode, theme: &Theme, inherited_lists: &[&XmlNode]) -> TextBody {
    let mut lists: Vec<&XmlNode> = Vec::with_capacity(inherited_lists.len() + 1);
    if let Some(own) = tx_body.child("a:lstStyle") {
        lists.push(own);
    }
    lists.extend_from_slice(inherited_lists);

    let paragraphs = tx_body
        .children_named("a:p")
        .map(|p| extract_paragraph(p, theme, &lists))
        .collect();
    TextBody { paragraphs }
}

fn extract_paragraph(p: &XmlNode, theme: &Theme, lists: &[&XmlNode]) -> Paragraph {
    let ppr = p.child("a:pPr");
    let level = ppr.and_then(|n| n.attr_i64("lvl")).unwrap_or(0).clamp(0, 8);
    let level_name = format!("a:lvl{}pPr", level + 1);
    let level_props: Vec<&XmlNode> = lists.iter().filter_map(|l| l.child(&level_name)).collect();

    // paragraph-level property sources: own pPr, then list levels
    let para_sources: Vec<&XmlNode> = ppr.into_iter().chain(level_props.iter().copied()).collect();
    let para_attr = |key: &str| para_sources.iter().find_map(|n| n.attr(key));
    let para_points = |qname: &str| {
        para_sources
            .iter()
            .find_map(|n| n.path(&[qname, "a:spcPts"]))
            .and_then(|s| s.attr_i64("val"))
            .map(|v| v as f64 / 100.0)
    };

    let mut defaults: Vec<&XmlNode> = Vec::new();
    if let Some(def) = ppr.and_then(|n| n.child("a:defRPr")) {
        defaults.push(def);
    }
    defaults.extend(level_props.iter().filter_map(|l| l.child("a:defRPr")));

    let mut paragraph = Paragraph {
        align: para_attr("algn").map(Alignment::from_algn).unwrap_or_default(),
        space_before: para_points("a:spcBef"),
        space_after: para_points("a:spcAft"),
        line_spacing: para_sources
            .iter()
            .find_map(|n| n.path(&["a:lnSpc", "a:spcPct"]))
            .and_then(|s| s.attr_i64("val"))
            .map(pct_to_unit),
        ..Default::default()
    };

    for child in p.children() {
        match child.name() {
            "a:r" | "a:fld" => {
                let text = child.child("a:t").map(|t| t.text()).unwrap_or_default();
                paragraph.text.push_str(text);
                if text.is_empty() {
                    continue;
                }
                let mut sources = Vec::with_capacity(defaults.len() + 1);
                if let Some(rpr) = child.child("a:rPr") {
                    sources.push(rpr);
                }
                sources.extend_from_slice(&defaults);
                let style = StyleChain { sources, theme }.resolve();
                paragraph.runs.push(TextRun {
                    text: text.to_string(),
                    style,
                });
            },
            "a:br" => paragraph.text.push('\n'),
            _ => {},
        }
    }
    paragraph
}

impl TextBody {
    /// Paragraph texts joined with `\n`.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// True when the body holds no visible characters.
    pub fn is_blank(&self) -> bool {
        self.paragraphs.iter().all(|p| p.text.trim().is_empty())
    }

    fn runs(&self) -> impl Iterator<Item = &TextRun> {
        self.paragraphs.iter().flat_map(|p| p.runs.iter())
    }

    /// Per-character style map keyed by char offset into [`TextBody::text`].
    pub fn style_map(&self) -> BTreeMap<usize, CharStyle> {
        let mut styles = BTreeMap::new();
        let mut offset = 0usize;
        for (i, paragraph) in self.paragraphs.iter().enumerate() {
            if i > 0 {
                offset += 1;
            }
            // Runs are located in order; breaks between them are skipped.
            let mut cursor = 0usize;
            let chars: Vec<char> = paragraph.text.chars().collect();
            for run in &paragraph.runs {
                let run_chars: Vec<char> = run.text.chars().collect();
                let Some(start) = find_chars(&chars, &run_chars, cursor) else {
                    continue;
                };
                let style = CharStyle {
                    text_align: Some(paragraph.align.as_str().to_string()),
                    ..run.style.to_char_style()
                };
                for k in 0..run_chars.len() {
                    styles.insert(offset + start + k, style.clone());
                }
                cursor = start + run_chars.len();
            }
            offset += chars.len();
        }
        styles
    }

    /// Textbox with whole-box properties set to the mode over runs.
    pub fn into_textbox(self, base: ObjectBase) -> TextboxObject {
        let runs: Vec<&TextRun> = self.runs().collect();
        let pick = |f: &dyn Fn(&RunStyle) -> String| mode(&runs.iter().map(|r| f(&r.style)).collect::<Vec<_>>());

        let font_family = pick(&|s: &RunStyle| s.font_family.clone()).unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string());
        let color = pick(&|s: &RunStyle| s.color.clone()).unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string());
        let font_weight = pick(&|s: &RunStyle| weight(s.bold).to_string()).unwrap_or_else(|| weight(false).to_string());
        let font_style = pick(&|s: &RunStyle| slant(s.italic).to_string()).unwrap_or_else(|| slant(false).to_string());
        // f64 is not Eq; compare sizes in hundredths of a point
        let sizes: Vec<i64> = runs
            .iter()
            .map(|r| (r.style.font_size * FONT_SIZE_UNITS_PER_PT).round() as i64)
            .collect();
        let font_size = mode(&sizes).map_or(DEFAULT_FONT_SIZE, |s| s as f64 / FONT_SIZE_UNITS_PER_PT);

        let aligns: Vec<Alignment> = self.paragraphs.iter().map(|p| p.align).collect();
        let text_align = mode(&aligns).unwrap_or_default();
        let spacings: Vec<i64> = self
            .paragraphs
            .iter()
            .filter_map(|p| p.line_spacing)
            .map(|l| (l * 1000.0).round() as i64)
            .collect();
        let line_height = mode(&spacings).map(|l| l as f64 / 1000.0);

        TextboxObject {
            base: ObjectBase {
                fill: Some(Paint::Color(color)),
                ..base
            },
            text: self.text(),
            font_family,
            font_size,
            font_weight,
            font_style,
            text_align: text_align.as_str().to_string(),
            line_height,
            background_color: None,
            styles: self.style_map(),
        }
    }
}

fn find_chars(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }
    (from..=haystack.len().saturating_sub(needle.len())).find(|&i| haystack[i..].starts_with(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(inner: &str) -> XmlNode {
        let xml = format!(
            r#"<p:txBody xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
                         xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
                 <a:bodyPr/>{}</p:txBody>"#,
            inner
        );
        XmlNode::parse(xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_mode_ties_to_first_seen() {
        assert_eq!(mode(&[3, 1, 1, 3]), Some(3));
        assert_eq!(mode(&[1, 2, 2]), Some(2));
        assert_eq!(mode::<i32>(&[]), None);
    }

    #[test]
    fn test_font_size_mode_with_style_map() {
        let tx = body(
            r#"<a:p><a:r><a:rPr sz="1200"/><a:t>ab</a:t></a:r>
                    <a:r><a:rPr sz="1200"/><a:t>cd</a:t></a:r>
                    <a:r><a:rPr sz="1800"/><a:t>ef</a:t></a:r></a:p>"#,
        );
        let extracted = extract_text_body(&tx, &Theme::default(), &[]);
        let textbox = extracted.into_textbox(ObjectBase::default());
        assert_eq!(textbox.text, "abcdef");
        assert_eq!(textbox.font_size, 12.0);
        assert_eq!(textbox.styles[&0].font_size, Some(12.0));
        assert_eq!(textbox.styles[&4].font_size, Some(18.0));
        assert_eq!(textbox.styles[&5].font_size, Some(18.0));
        assert_eq!(textbox.styles.len(), 6);
    }

    #[test]
    fn test_paragraphs_and_breaks() {
        let tx = body(
            r#"<a:p><a:pPr algn="ctr"/><a:r><a:t>one</a:t></a:r><a:br/><a:r><a:t>two</a:t></a:r></a:p>
               <a:p><a:pPr algn="ctr"/><a:fld type="slidenum"><a:t>3</a:t></a:fld></a:p>
               <a:p><a:pPr algn="r"/></a:p>"#,
        );
        let extracted = extract_text_body(&tx, &Theme::default(), &[]);
        assert_eq!(extracted.text(), "one\ntwo\n3\n");
        let map = extracted.style_map();
        // "two" starts after "one\n"
        assert!(map.contains_key(&4));
        assert!(!map.contains_key(&3));
        // field on the second paragraph, after "one\ntwo\n"
        assert!(map.contains_key(&8));
        let textbox = extracted.into_textbox(ObjectBase::default());
        assert_eq!(textbox.text_align, "center");
    }

    #[test]
    fn test_style_map_carries_paragraph_alignment() {
        let tx = body(
            r#"<a:p><a:pPr algn="ctr"/><a:r><a:t>ab</a:t></a:r></a:p>
               <a:p><a:pPr algn="r"/><a:r><a:t>cd</a:t></a:r></a:p>
               <a:p><a:r><a:t>e</a:t></a:r></a:p>"#,
        );
        let map = extract_text_body(&tx, &Theme::default(), &[]).style_map();
        assert_eq!(map[&0].text_align.as_deref(), Some("center"));
        assert_eq!(map[&1].text_align.as_deref(), Some("center"));
        // "cd" follows "ab\n"
        assert_eq!(map[&3].text_align.as_deref(), Some("right"));
        assert_eq!(map[&6].text_align.as_deref(), Some("left"));
        // every character keeps its full style, not a diff against the box
        assert_eq!(map[&6].font_family.as_deref(), Some("Arial"));
    }

    #[test]
    fn test_empty_body_defaults() {
        let tx = body("<a:p/>");
        let extracted = extract_text_body(&tx, &Theme::default(), &[]);
        assert!(extracted.is_blank());
        let textbox = extracted.into_textbox(ObjectBase::default());
        assert_eq!(textbox.font_family, "Arial");
        assert_eq!(textbox.font_size, 12.0);
        assert_eq!(textbox.base.fill, Some(Paint::Color("#000000".to_string())));
        assert_eq!(textbox.text_align, "left");
        assert!(textbox.styles.is_empty());
    }

    #[test]
    fn test_style_inheritance_chain() {
        let tx = body(
            r#"<a:lstStyle><a:lvl1pPr algn="just"><a:lnSpc><a:spcPct val="150000"/></a:lnSpc>
                 <a:defRPr sz="2000" b="1"><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr></a:lstStyle>
               <a:p><a:pPr><a:spcBef><a:spcPts val="600"/></a:spcBef>
                 <a:defRPr><a:solidFill><a:schemeClr val="accent1"/></a:solidFill></a:defRPr></a:pPr>
                 <a:r><a:rPr i="1" u="sng" strike="sngStrike" baseline="30000"/><a:t>x</a:t></a:r></a:p>"#,
        );
        let theme_xml = XmlNode::parse(
            br#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><a:themeElements>
                 <a:fontScheme name="f"><a:majorFont><a:latin typeface="Georgia"/></a:majorFont>
                 <a:minorFont><a:latin typeface="Verdana"/></a:minorFont></a:fontScheme>
               </a:themeElements></a:theme>"#,
        )
        .unwrap();
        let theme = Theme::from_xml(&theme_xml);
        let extracted = extract_text_body(&tx, &theme, &[]);
        let paragraph = &extracted.paragraphs[0];
        assert_eq!(paragraph.align, Alignment::Justify);
        assert_eq!(paragraph.space_before, Some(6.0));
        assert_eq!(paragraph.line_spacing, Some(1.5));
        let style = &paragraph.runs[0].style;
        assert_eq!(style.font_family, "Verdana");
        assert_eq!(style.font_size, 20.0);
        assert_eq!(style.color, "#4472c4");
        assert!(style.bold && style.italic && style.underline && style.strike);
        assert_eq!(style.baseline, Some("super"));

        let textbox = extracted.into_textbox(ObjectBase::default());
        assert_eq!(textbox.font_weight, "bold");
        assert_eq!(textbox.font_style, "italic");
        assert_eq!(textbox.line_height, Some(1.5));
    }
}
