//! Package writer for presentation packages.
//!
//! Parts are streamed into an in-memory zip archive as they are added; the
//! `[Content_Types].xml` part is assembled from the registered defaults and
//! overrides and written last.

use crate::common::Result;
use crate::common::xml::escape_xml;
use crate::ooxml::opc::constants::{content_type as ct, namespace};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PackURI};
use crate::ooxml::opc::rel::Relationships;
use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;
use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

/// Builder for a zip-packaged OPC document.
///
/// # Examples
///
/// ```
/// use slidescene::ooxml::opc::{PackageWriter, PackURI};
///
/// let mut writer = PackageWriter::new();
/// let part = PackURI::new("/ppt/presentation.xml")?;
/// writer.add_part(&part, Some("application/xml"), b"<p:presentation/>")?;
/// let bytes = writer.finish()?;
/// assert!(bytes.starts_with(b"PK"));
/// # Ok::<(), slidescene::Error>(())
/// ```
pub struct PackageWriter {
    zip_writer: ZipWriter<Cursor<Vec<u8>>>,
    defaults: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
}

impl PackageWriter {
    /// Create a new package writer that writes to memory
    pub fn new() -> Self {
        let mut defaults = BTreeMap::new();
        defaults.insert("rels".to_string(), ct::OPC_RELATIONSHIPS.to_string());
        defaults.insert("xml".to_string(), ct::XML.to_string());
        Self {
            zip_writer: ZipWriter::new(Cursor::new(Vec::new())),
            defaults,
            overrides: BTreeMap::new(),
        }
    }

    fn options() -> SimpleFileOptions {
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated)
    }

    /// Add a part. With `content_type` set, an override is registered for it.
    pub fn add_part(
        &mut self,
        partname: &PackURI,
        content_type: Option<&str>,
        content: &[u8],
    ) -> Result<()> {
        if let Some(content_type) = content_type {
            self.overrides
                .insert(partname.as_str().to_string(), content_type.to_string());
        }
        self.zip_writer
            .start_file(partname.membername(), Self::options())?;
        self.zip_writer.write_all(content)?;
        Ok(())
    }

    /// Add a binary part typed through an extension default (media files).
    pub fn add_media(&mut self, partname: &PackURI, content_type: &str, content: &[u8]) -> Result<()> {
        self.defaults
            .entry(partname.ext().to_ascii_lowercase())
            .or_insert_with(|| content_type.to_string());
        self.add_part(partname, None, content)
    }

    /// Write the `.rels` part belonging to `source`.
    pub fn add_rels(&mut self, source: &PackURI, rels: &Relationships) -> Result<()> {
        let rels_uri = source.rels_uri()?;
        let xml = rels.to_xml()?;
        self.add_part(&rels_uri, None, xml.as_bytes())
    }

    fn content_types_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(256 + self.overrides.len() * 160);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        write!(xml, r#"<Types xmlns="{}">"#, namespace::OPC_CONTENT_TYPES)?;
        for (ext, content_type) in &self.defaults {
            write!(
                xml,
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                content_type
            )?;
        }
        for (partname, content_type) in &self.overrides {
            write!(
                xml,
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(partname),
                content_type
            )?;
        }
        xml.push_str("</Types>");
        Ok(xml)
    }

    /// Write `[Content_Types].xml` and return the finished archive.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let xml = self.content_types_xml()?;
        let uri = PackURI::new(CONTENT_TYPES_URI)?;
        self.zip_writer.start_file(uri.membername(), Self::options())?;
        self.zip_writer.write_all(xml.as_bytes())?;
        Ok(self.zip_writer.finish()?.into_inner())
    }
}

impl Default for PackageWriter {
    fn default() -> Self {
        Self::new()
    }
}
