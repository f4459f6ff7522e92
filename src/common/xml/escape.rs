use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;

const ENTITIES: [&str; 5] = ["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"];
const CHARS: [&str; 5] = ["&", "<", ">", "\"", "'"];

// Built once, shared across threads
static XML_ESCAPER: Lazy<AhoCorasick> =
    Lazy::new(|| AhoCorasick::new(CHARS).expect("Failed to build XML escaper"));

static XML_UNESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(ENTITIES)
        .expect("Failed to build XML unescaper")
});

/// Escape XML special characters for element text and attribute values.
///
/// # Examples
///
/// ```
/// use slidescene::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("\"Q&A\""), "&quot;Q&amp;A&quot;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER.replace_all(s, &ENTITIES)
}

/// Unescape the five predefined entities and numeric character references.
///
/// Unknown or malformed references are left unchanged.
///
/// # Examples
///
/// ```
/// use slidescene::common::xml::unescape_xml;
/// assert_eq!(unescape_xml("&lt;a &amp; b&gt;"), "<a & b>");
/// assert_eq!(unescape_xml("&#x41;&#66;"), "AB");
/// assert_eq!(unescape_xml("&amp;lt;"), "&lt;");
/// ```
pub fn unescape_xml(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let named = XML_UNESCAPER.replace_all(s, &CHARS);
    if !named.contains("&#") {
        return named;
    }
    decode_char_refs(&named)
}

/// Replace `&#NN;` and `&#xHH;` references.
fn decode_char_refs(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("&#") {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let decoded = tail.find(';').and_then(|end| {
            let body = &tail[..end];
            let code = match body.strip_prefix('x').or_else(|| body.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => body.parse::<u32>().ok(),
            };
            code.and_then(char::from_u32).map(|c| (c, end))
        });
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            },
            None => {
                out.push_str("&#");
                rest = tail;
            },
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_all_specials() {
        assert_eq!(escape_xml("<a href='x'>"), "&lt;a href=&apos;x&apos;&gt;");
    }

    #[test]
    fn test_unescape_leaves_unknown() {
        assert_eq!(unescape_xml("&invalid;"), "&invalid;");
        assert_eq!(unescape_xml("&#zz;"), "&#zz;");
        assert_eq!(unescape_xml("plain"), "plain");
    }
}
