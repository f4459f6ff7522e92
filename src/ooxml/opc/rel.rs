/// Relationship-related objects for OPC packages.
///
/// This module provides types for reading and writing the relationships between
/// parts in a package, including internal and external relationships.
use crate::common::Result;
use crate::common::xml::escape_xml;
use crate::ooxml::dom::XmlNode;
use crate::ooxml::opc::constants::{namespace, target_mode};
use crate::ooxml::opc::packuri::PackURI;
use smallvec::SmallVec;
use std::fmt::Write as FmtWrite;

/// A single relationship from a source part to a target.
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1", "rId2")
    r_id: String,

    /// Relationship type URI
    reltype: String,

    /// Target reference - either a relative part reference or external URL
    target_ref: String,

    /// Base URI for resolving relative references
    base_uri: String,

    /// Whether this is an external relationship
    is_external: bool,
}

impl Relationship {
    /// Get the relationship ID.
    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    /// Get the relationship type.
    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    /// Get the target reference as written in the .rels part.
    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    /// Check if this is an external relationship.
    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    /// Get the absolute target partname for internal relationships.
    ///
    /// Returns `None` for external relationships.
    pub fn target_partname(&self) -> Option<PackURI> {
        if self.is_external {
            return None;
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref).ok()
    }
}

/// Collection of relationships from a single source, in document order.
#[derive(Debug, Clone)]
pub struct Relationships {
    /// Base URI for resolving relative references
    base_uri: String,

    rels: SmallVec<[Relationship; 8]>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new(base_uri: &str) -> Self {
        Self {
            base_uri: base_uri.to_string(),
            rels: SmallVec::new(),
        }
    }

    /// Parse a `.rels` part. `base_uri` is the directory of the source part.
    pub fn from_xml(xml: &[u8], base_uri: &str) -> Result<Self> {
        let root = XmlNode::parse(xml)?;
        let mut rels = Self::new(base_uri);
        for node in root.children().iter().filter(|n| n.local_name() == "Relationship") {
            let (Some(r_id), Some(reltype), Some(target)) =
                (node.attr("Id"), node.attr("Type"), node.attr("Target"))
            else {
                continue;
            };
            rels.rels.push(Relationship {
                r_id: r_id.to_string(),
                reltype: reltype.to_string(),
                target_ref: target.to_string(),
                base_uri: rels.base_uri.clone(),
                is_external: node.attr("TargetMode") == Some(target_mode::EXTERNAL),
            });
        }
        Ok(rels)
    }

    /// Add an internal relationship and return its new rId.
    pub fn add(&mut self, reltype: &str, target_ref: &str) -> String {
        let r_id = self.next_r_id();
        self.rels.push(Relationship {
            r_id: r_id.clone(),
            reltype: reltype.to_string(),
            target_ref: target_ref.to_string(),
            base_uri: self.base_uri.clone(),
            is_external: false,
        });
        r_id
    }

    /// Get a relationship by its ID.
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.r_id == r_id)
    }

    /// First relationship of the given type.
    pub fn first_of_type(&self, reltype: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.reltype == reltype)
    }

    /// Resolve the target partname of relationship `r_id`.
    pub fn target_of(&self, r_id: &str) -> Option<PackURI> {
        self.get(r_id).and_then(Relationship::target_partname)
    }

    /// Resolve the target partname of the first relationship of `reltype`.
    pub fn target_of_type(&self, reltype: &str) -> Option<PackURI> {
        self.first_of_type(reltype)
            .and_then(Relationship::target_partname)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// Next rId not yet in use.
    fn next_r_id(&self) -> String {
        let mut n = self.rels.len() + 1;
        loop {
            let candidate = format!("rId{}", n);
            if self.get(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    /// Serialize to a `.rels` part.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(128 + self.rels.len() * 160);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        write!(xml, r#"<Relationships xmlns="{}">"#, namespace::OPC_RELATIONSHIPS)?;
        for rel in &self.rels {
            write!(
                xml,
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                rel.r_id,
                rel.reltype,
                escape_xml(&rel.target_ref)
            )?;
            if rel.is_external {
                write!(xml, r#" TargetMode="{}""#, target_mode::EXTERNAL)?;
            }
            xml.push_str("/>");
        }
        xml.push_str("</Relationships>");
        Ok(xml)
    }
}
