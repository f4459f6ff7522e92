//! Lightweight element tree over DrawingML / PresentationML parts.
//!
//! Parts are small enough to hold in memory, so each one is parsed into an
//! owned [`XmlNode`] tree. Element and attribute prefixes are canonicalized
//! while parsing: whatever prefix a producer bound to the DrawingML,
//! PresentationML or relationships namespace, the tree always spells it
//! `a:`, `p:` or `r:`. Lookups therefore use fixed qualified names such as
//! `"a:srgbClr"` regardless of how the document declared its namespaces.
//!
//! Absence is never an error at this layer: lookups return `Option` and
//! numeric attribute helpers default to `0`.

use crate::common::xml::unescape_xml;
use crate::common::{Error, Result};
use crate::ooxml::opc::constants::namespace as ns;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Map a namespace URI to its canonical prefix.
fn canonical_prefix(uri: &str) -> Option<&'static str> {
    match uri {
        ns::DML_MAIN => Some("a"),
        ns::PML_MAIN => Some("p"),
        ns::OFC_RELATIONSHIPS => Some("r"),
        _ => None,
    }
}

/// One element of a parsed part.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<XmlNode>,
    text: String,
}

/// In-scope prefix bindings, innermost last.
struct Scopes {
    bindings: Vec<(String, String, usize)>,
}

impl Scopes {
    fn resolve(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|(p, _, _)| p == prefix)
            .map(|(_, uri, _)| uri.as_str())
    }

    fn pop_depth(&mut self, depth: usize) {
        while self.bindings.last().is_some_and(|(_, _, d)| *d >= depth) {
            self.bindings.pop();
        }
    }

    /// Rewrite `prefix:local` so that known namespaces use their canonical prefix.
    fn qualify(&self, raw: &str) -> String {
        match raw.split_once(':') {
            Some((prefix, local)) => match self.resolve(prefix).and_then(canonical_prefix) {
                Some(canonical) => format!("{}:{}", canonical, local),
                None => raw.to_string(),
            },
            None => match self.resolve("").and_then(canonical_prefix) {
                Some(canonical) => format!("{}:{}", canonical, raw),
                None => raw.to_string(),
            },
        }
    }

    /// Attributes without a prefix stay unqualified per the XML namespaces rules.
    fn qualify_attr(&self, raw: &str) -> String {
        if raw.contains(':') {
            self.qualify(raw)
        } else {
            raw.to_string()
        }
    }
}

impl XmlNode {
    /// Create a detached element, mainly for tests and synthesized defaults.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Builder: add an attribute.
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.push((key.to_string(), value.to_string()));
        self
    }

    /// Builder: add a child element.
    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    /// Parse a complete XML part and return its root element.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();
        let mut stack: Vec<XmlNode> = Vec::new();
        let mut scopes = Scopes {
            bindings: Vec::new(),
        };

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let node = Self::open_element(e, &mut scopes, stack.len())?;
                    stack.push(node);
                },
                Event::Empty(ref e) => {
                    let node = Self::open_element(e, &mut scopes, stack.len())?;
                    scopes.pop_depth(stack.len());
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => return Ok(node),
                    }
                },
                Event::End(_) => {
                    scopes.pop_depth(stack.len().saturating_sub(1));
                    if let Some(node) = stack.pop() {
                        match stack.last_mut() {
                            Some(parent) => parent.children.push(node),
                            None => return Ok(node),
                        }
                    }
                },
                Event::Text(ref t) => {
                    if let Some(current) = stack.last_mut() {
                        let raw = std::str::from_utf8(t)?;
                        current.text.push_str(&unescape_xml(raw));
                    }
                },
                Event::CData(ref t) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(std::str::from_utf8(t)?);
                    }
                },
                Event::GeneralRef(ref r) => {
                    if let Some(current) = stack.last_mut() {
                        let name = std::str::from_utf8(r)?;
                        current.text.push_str(&unescape_xml(&format!("&{};", name)));
                    }
                },
                Event::Eof => break,
                _ => {},
            }
            buf.clear();
        }

        Err(Error::Xml("No root element found".to_string()))
    }

    fn open_element(e: &BytesStart<'_>, scopes: &mut Scopes, depth: usize) -> Result<Self> {
        let mut raw_attrs = Vec::new();
        for attr in e.attributes() {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
            let value = unescape_xml(std::str::from_utf8(&attr.value)?);
            if key == "xmlns" {
                scopes.bindings.push((String::new(), value, depth));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                scopes.bindings.push((prefix.to_string(), value, depth));
            } else {
                raw_attrs.push((key, value));
            }
        }

        let raw_name = std::str::from_utf8(e.name().as_ref())?.to_string();
        Ok(Self {
            name: scopes.qualify(&raw_name),
            attrs: raw_attrs
                .into_iter()
                .map(|(k, v)| (scopes.qualify_attr(&k), v))
                .collect(),
            children: Vec::new(),
            text: String::new(),
        })
    }

    /// Qualified (canonical) element name, e.g. `a:solidFill`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element name without its prefix.
    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    #[inline]
    pub fn is(&self, qname: &str) -> bool {
        self.name == qname
    }

    /// Concatenated character data directly inside this element.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Integer attribute; `None` if absent or not an integer.
    pub fn attr_i64(&self, key: &str) -> Option<i64> {
        self.attr(key).and_then(|v| v.trim().parse().ok())
    }

    /// Integer attribute with the missing-means-zero rule.
    #[inline]
    pub fn attr_or_zero(&self, key: &str) -> i64 {
        self.attr_i64(key).unwrap_or(0)
    }

    /// Boolean attribute (`1`/`true`); absent is `false`.
    pub fn attr_bool(&self, key: &str) -> bool {
        matches!(self.attr(key), Some("1") | Some("true") | Some("on"))
    }

    /// First direct child with the given name.
    pub fn child(&self, qname: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == qname)
    }

    /// All direct children with the given name.
    pub fn children_named<'a>(&'a self, qname: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.name == qname)
    }

    /// Follow a chain of direct children.
    pub fn path(&self, names: &[&str]) -> Option<&XmlNode> {
        names
            .iter()
            .try_fold(self, |node, name| node.child(name))
    }

    /// First matching descendant, depth-first, excluding `self`.
    pub fn find(&self, qname: &str) -> Option<&XmlNode> {
        for child in &self.children {
            if child.name == qname {
                return Some(child);
            }
            if let Some(found) = child.find(qname) {
                return Some(found);
            }
        }
        None
    }

    /// All matching descendants in document order.
    pub fn find_all<'a>(&'a self, qname: &str) -> Vec<&'a XmlNode> {
        let mut out = Vec::new();
        self.collect(qname, &mut out);
        out
    }

    fn collect<'a>(&'a self, qname: &str, out: &mut Vec<&'a XmlNode>) {
        for child in &self.children {
            if child.name == qname {
                out.push(child);
            }
            child.collect(qname, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
       xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld><p:spTree>
    <p:sp><p:spPr><a:xfrm rot="5400000"><a:off x="100" y="200"/></a:xfrm></p:spPr>
      <p:txBody><a:p><a:r><a:t>Q &amp; A&#x21;</a:t></a:r></a:p></p:txBody>
    </p:sp>
  </p:spTree></p:cSld>
</p:sld>"#;

    #[test]
    fn test_parse_and_find() {
        let root = XmlNode::parse(SLIDE.as_bytes()).unwrap();
        assert_eq!(root.name(), "p:sld");
        let off = root.find("a:off").unwrap();
        assert_eq!(off.attr_i64("x"), Some(100));
        assert_eq!(off.attr_or_zero("missing"), 0);
        let xfrm = root.find("a:xfrm").unwrap();
        assert_eq!(xfrm.attr_i64("rot"), Some(5_400_000));
        assert_eq!(root.find("a:t").unwrap().text(), "Q & A!");
        assert!(root.find("a:nothing").is_none());
    }

    #[test]
    fn test_prefixes_are_canonicalized() {
        let xml = r#"<x:sld xmlns:x="http://schemas.openxmlformats.org/presentationml/2006/main"
                          xmlns:d="http://schemas.openxmlformats.org/drawingml/2006/main"
                          xmlns:rel="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
                       <d:blip rel:embed="rId2"/></x:sld>"#;
        let root = XmlNode::parse(xml.as_bytes()).unwrap();
        assert_eq!(root.name(), "p:sld");
        let blip = root.child("a:blip").unwrap();
        assert_eq!(blip.attr("r:embed"), Some("rId2"));
        assert_eq!(blip.local_name(), "blip");
    }

    #[test]
    fn test_default_namespace_and_path() {
        let xml = r#"<Relationships xmlns="urn:other"><Relationship Id="rId1"/></Relationships>"#;
        let root = XmlNode::parse(xml.as_bytes()).unwrap();
        assert_eq!(root.name(), "Relationships");
        assert_eq!(
            root.path(&["Relationship"]).and_then(|r| r.attr("Id")),
            Some("rId1")
        );
    }

    #[test]
    fn test_whitespace_in_text_is_kept() {
        let xml = r#"<a:t xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"> two  spaces </a:t>"#;
        let root = XmlNode::parse(xml.as_bytes()).unwrap();
        assert_eq!(root.text(), " two  spaces ");
    }

    #[test]
    fn test_empty_document_is_error() {
        assert!(XmlNode::parse(b"").is_err());
    }
}
