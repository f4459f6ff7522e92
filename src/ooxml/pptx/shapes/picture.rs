//! Picture payloads.
//!
//! Forward: a `p:pic` blip is resolved through the slide relationships to a
//! media part and inlined as a `data:` URL. Reverse: the URL is decoded back
//! to bytes and a content type.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::common::unit::pct_to_unit;
use crate::common::{Error, Result};
use crate::ooxml::dom::XmlNode;
use crate::ooxml::opc::{Package, PackURI, Relationships};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// An embedded image resolved from a picture shape.
#[derive(Debug, Clone, PartialEq)]
pub struct PictureImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
    /// From `a:alphaModFix amt`, default 1.
    pub opacity: f64,
}

impl PictureImage {
    /// Resolve the blip of `pic`. Failures are shape-local errors naming `name`.
    pub fn from_picture(pic: &XmlNode, name: &str, package: &Package, rels: &Relationships) -> Result<Self> {
        let blip = pic
            .path(&["p:blipFill", "a:blip"])
            .ok_or_else(|| Error::shape(name, "picture has no blip"))?;
        let r_id = blip
            .attr("r:embed")
            .ok_or_else(|| Error::shape(name, "blip has no embedded image reference"))?;
        let uri = rels
            .target_of(r_id)
            .ok_or_else(|| Error::shape(name, format!("relationship {r_id} not found")))?;
        let bytes = package
            .part(&uri)
            .map_err(|e| Error::shape(name, e.to_string()))?
            .to_vec();
        let content_type = package
            .content_type(&uri)
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let opacity = blip
            .child("a:alphaModFix")
            .and_then(|a| a.attr_i64("amt"))
            .map_or(1.0, |amt| pct_to_unit(amt).clamp(0.0, 1.0));
        Ok(Self {
            content_type,
            bytes,
            opacity,
        })
    }

    /// `data:<content-type>;base64,<payload>`
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}

/// Split a `data:` URL into content type and decoded bytes.
///
/// A bare base64 payload without the `data:` prefix is accepted as PNG.
pub fn decode_data_url(src: &str) -> Result<(String, Vec<u8>)> {
    let (content_type, payload) = match src.strip_prefix("data:") {
        Some(rest) => {
            let (meta, payload) = rest
                .split_once(',')
                .ok_or_else(|| Error::InvalidFormat("data URL without payload".to_string()))?;
            let Some(content_type) = meta.strip_suffix(";base64") else {
                return Err(Error::InvalidFormat("only base64 data URLs are supported".to_string()));
            };
            (content_type, payload)
        },
        None => ("image/png", src),
    };
    let content_type = if content_type.is_empty() { "image/png" } else { content_type };
    // whitespace from wrapped payloads
    let cleaned: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok((content_type.to_string(), STANDARD.decode(cleaned)?))
}

/// Media part name for the `n`-th image of a content type.
pub fn media_partname(n: usize, content_type: &str) -> Result<PackURI> {
    let ext = crate::ooxml::opc::constants::content_type::image_ext(content_type);
    PackURI::new(format!("/ppt/media/image{n}.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_round_trip() {
        let image = PictureImage {
            content_type: "image/png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
            opacity: 1.0,
        };
        let url = image.to_data_url();
        assert!(url.starts_with("data:image/png;base64,"));
        let (ct, bytes) = decode_data_url(&url).unwrap();
        assert_eq!(ct, "image/png");
        assert_eq!(bytes, image.bytes);
    }

    #[test]
    fn test_decode_rejects_non_base64() {
        assert!(decode_data_url("data:image/svg+xml,<svg/>").is_err());
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());
        let (ct, bytes) = decode_data_url("AAEC").unwrap();
        assert_eq!(ct, "image/png");
        assert_eq!(bytes, vec![0, 1, 2]);
    }

    #[test]
    fn test_media_partname() {
        assert_eq!(media_partname(2, "image/jpeg").unwrap().as_str(), "/ppt/media/image2.jpeg");
    }
}
