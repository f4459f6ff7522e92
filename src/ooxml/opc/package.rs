//! In-memory presentation package.
//!
//! The whole archive is decompressed once when the package is opened; the
//! parts live in a map for the duration of one conversion and are released
//! when the [`Package`] is dropped, on every exit path.

use crate::common::{Error, Result};
use crate::ooxml::dom::XmlNode;
use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::rel::Relationships;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use tracing::debug;

/// Content type lookup built from `[Content_Types].xml`.
#[derive(Debug, Default)]
pub struct ContentTypeMap {
    /// Maps file extensions (lower case) to content types
    defaults: HashMap<String, String>,
    /// Maps specific partnames to override content types
    overrides: HashMap<String, String>,
}

impl ContentTypeMap {
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let root = XmlNode::parse(xml)?;
        let mut map = Self::default();
        for node in root.children() {
            match node.local_name() {
                "Default" => {
                    if let (Some(ext), Some(ct)) = (node.attr("Extension"), node.attr("ContentType"))
                    {
                        map.defaults.insert(ext.to_ascii_lowercase(), ct.to_string());
                    }
                },
                "Override" => {
                    if let (Some(pn), Some(ct)) = (node.attr("PartName"), node.attr("ContentType")) {
                        map.overrides.insert(pn.to_string(), ct.to_string());
                    }
                },
                _ => {},
            }
        }
        Ok(map)
    }

    /// Override first, then the extension default.
    pub fn get(&self, uri: &PackURI) -> Option<&str> {
        self.overrides
            .get(uri.as_str())
            .or_else(|| self.defaults.get(&uri.ext().to_ascii_lowercase()))
            .map(String::as_str)
    }
}

/// A presentation package held fully in memory.
#[derive(Debug, Default)]
pub struct Package {
    /// Part bytes keyed by membername (no leading slash)
    parts: HashMap<String, Vec<u8>>,
    content_types: ContentTypeMap,
}

/// Upper bound on the buffer reserved up front for one part. The declared
/// uncompressed size comes from the archive and is not trusted beyond this.
const MAX_PREALLOC: u64 = 1 << 20;

fn prealloc_len(declared: u64) -> usize {
    declared.min(MAX_PREALLOC) as usize
}

impl Package {
    /// Open a package from the raw bytes of a zip archive.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = HashMap::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut content = Vec::with_capacity(prealloc_len(file.size()));
            file.read_to_end(&mut content)?;
            parts.insert(file.name().trim_start_matches('/').to_string(), content);
        }
        debug!(parts = parts.len(), "package loaded");

        let content_types_uri = PackURI::new(CONTENT_TYPES_URI)?;
        let content_types = match parts.get(content_types_uri.membername()) {
            Some(xml) => ContentTypeMap::from_xml(xml)?,
            None => return Err(Error::PartNotFound("[Content_Types].xml".to_string())),
        };

        Ok(Self {
            parts,
            content_types,
        })
    }

    /// Raw bytes of a part.
    pub fn part(&self, uri: &PackURI) -> Result<&[u8]> {
        self.parts
            .get(uri.membername())
            .map(Vec::as_slice)
            .ok_or_else(|| Error::PartNotFound(uri.to_string()))
    }

    #[inline]
    pub fn contains(&self, uri: &PackURI) -> bool {
        self.parts.contains_key(uri.membername())
    }

    /// Parse a part as XML.
    pub fn xml(&self, uri: &PackURI) -> Result<XmlNode> {
        XmlNode::parse(self.part(uri)?)
    }

    /// Relationships whose source is `source`; empty when the part has no `.rels`.
    pub fn rels(&self, source: &PackURI) -> Result<Relationships> {
        let rels_uri = source.rels_uri()?;
        match self.parts.get(rels_uri.membername()) {
            Some(xml) => Relationships::from_xml(xml, source.base_uri()),
            None => Ok(Relationships::new(source.base_uri())),
        }
    }

    /// Declared content type of a part, falling back to the image extension table.
    pub fn content_type(&self, uri: &PackURI) -> Option<&str> {
        self.content_types
            .get(uri)
            .or_else(|| ct::for_image_ext(uri.ext()))
    }

    /// Partname of the main presentation part.
    pub fn main_document(&self) -> Result<PackURI> {
        let package_uri = PackURI::new(PACKAGE_URI)?;
        self.rels(&package_uri)?
            .target_of_type(rt::OFFICE_DOCUMENT)
            .ok_or_else(|| Error::PartNotFound("officeDocument relationship".to_string()))
    }
}
