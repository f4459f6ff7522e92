//! Theme table.
//!
//! The ten semantic color roles of a theme's `a:clrScheme` resolved to
//! concrete colors, plus the major/minor Latin typefaces of `a:fontScheme`.
//! Built once per document and read-only afterwards. Every role has a
//! built-in default, so lookups never fail.

use crate::common::RGBColor;
use crate::ooxml::dom::XmlNode;
use phf::phf_map;
use tracing::trace;

/// Semantic color roles, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeRole {
    Background1,
    Background2,
    Text1,
    Text2,
    Accent1,
    Accent2,
    Accent3,
    Accent4,
    Accent5,
    Accent6,
}

impl ThemeRole {
    pub const ALL: [ThemeRole; 10] = [
        ThemeRole::Background1,
        ThemeRole::Background2,
        ThemeRole::Text1,
        ThemeRole::Text2,
        ThemeRole::Accent1,
        ThemeRole::Accent2,
        ThemeRole::Accent3,
        ThemeRole::Accent4,
        ThemeRole::Accent5,
        ThemeRole::Accent6,
    ];

    /// Upper-case role name, e.g. `BACKGROUND_1`.
    pub fn name(self) -> &'static str {
        match self {
            ThemeRole::Background1 => "BACKGROUND_1",
            ThemeRole::Background2 => "BACKGROUND_2",
            ThemeRole::Text1 => "TEXT_1",
            ThemeRole::Text2 => "TEXT_2",
            ThemeRole::Accent1 => "ACCENT_1",
            ThemeRole::Accent2 => "ACCENT_2",
            ThemeRole::Accent3 => "ACCENT_3",
            ThemeRole::Accent4 => "ACCENT_4",
            ThemeRole::Accent5 => "ACCENT_5",
            ThemeRole::Accent6 => "ACCENT_6",
        }
    }

    /// Look up a role by its upper-case name.
    pub fn from_name(name: &str) -> Option<Self> {
        ThemeRole::ALL.into_iter().find(|r| r.name() == name)
    }

    /// The `a:clrScheme` child element defining this role.
    fn scheme_element(self) -> &'static str {
        match self {
            ThemeRole::Background1 => "a:lt1",
            ThemeRole::Background2 => "a:lt2",
            ThemeRole::Text1 => "a:dk1",
            ThemeRole::Text2 => "a:dk2",
            ThemeRole::Accent1 => "a:accent1",
            ThemeRole::Accent2 => "a:accent2",
            ThemeRole::Accent3 => "a:accent3",
            ThemeRole::Accent4 => "a:accent4",
            ThemeRole::Accent5 => "a:accent5",
            ThemeRole::Accent6 => "a:accent6",
        }
    }

    fn default_color(self) -> RGBColor {
        match self {
            ThemeRole::Background1 => RGBColor::new(0xFF, 0xFF, 0xFF),
            ThemeRole::Background2 => RGBColor::new(0xF2, 0xF2, 0xF2),
            ThemeRole::Text1 => RGBColor::new(0x00, 0x00, 0x00),
            ThemeRole::Text2 => RGBColor::new(0x66, 0x66, 0x66),
            ThemeRole::Accent1 => RGBColor::new(0x44, 0x72, 0xC4),
            ThemeRole::Accent2 => RGBColor::new(0xED, 0x7D, 0x31),
            ThemeRole::Accent3 => RGBColor::new(0xA5, 0xA5, 0xA5),
            ThemeRole::Accent4 => RGBColor::new(0xFF, 0xC0, 0x00),
            ThemeRole::Accent5 => RGBColor::new(0x5B, 0x9B, 0xD5),
            ThemeRole::Accent6 => RGBColor::new(0x70, 0xAD, 0x47),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// `a:schemeClr val` values to their upper-case role names.
static SCHEME_ROLE_NAMES: phf::Map<&'static str, &'static str> = phf_map! {
    "bg1" => "BACKGROUND_1",
    "lt1" => "BACKGROUND_1",
    "bg2" => "BACKGROUND_2",
    "lt2" => "BACKGROUND_2",
    "tx1" => "TEXT_1",
    "dk1" => "TEXT_1",
    "tx2" => "TEXT_2",
    "dk2" => "TEXT_2",
    "accent1" => "ACCENT_1",
    "accent2" => "ACCENT_2",
    "accent3" => "ACCENT_3",
    "accent4" => "ACCENT_4",
    "accent5" => "ACCENT_5",
    "accent6" => "ACCENT_6",
};

/// Resolved theme colors and fonts for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    colors: [RGBColor; 10],
    major_font: Option<String>,
    minor_font: Option<String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            colors: ThemeRole::ALL.map(ThemeRole::default_color),
            major_font: None,
            minor_font: None,
        }
    }
}

impl Theme {
    /// Build from a theme part's root (`a:theme`). Roles that cannot be read
    /// keep their defaults.
    pub fn from_xml(root: &XmlNode) -> Self {
        let mut theme = Self::default();

        match root.find("a:clrScheme") {
            Some(scheme) => {
                for role in ThemeRole::ALL {
                    match scheme.child(role.scheme_element()).and_then(scheme_entry_color) {
                        Some(color) => theme.colors[role.index()] = color,
                        None => trace!(role = role.name(), "theme role unresolved, using default"),
                    }
                }
            },
            None => trace!("theme has no color scheme"),
        }

        if let Some(fonts) = root.find("a:fontScheme") {
            let latin = |name: &str| {
                fonts
                    .path(&[name, "a:latin"])
                    .and_then(|l| l.attr("typeface"))
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
            };
            theme.major_font = latin("a:majorFont");
            theme.minor_font = latin("a:minorFont");
        }

        theme
    }

    #[inline]
    pub fn color(&self, role: ThemeRole) -> RGBColor {
        self.colors[role.index()]
    }

    /// Resolve an `a:schemeClr val` (e.g. `accent1`, `tx1`) through the
    /// upper-cased role name.
    pub fn scheme_color(&self, val: &str) -> Option<RGBColor> {
        let name = SCHEME_ROLE_NAMES.get(val)?;
        ThemeRole::from_name(name).map(|role| self.color(role))
    }

    pub fn major_font(&self) -> Option<&str> {
        self.major_font.as_deref()
    }

    pub fn minor_font(&self) -> Option<&str> {
        self.minor_font.as_deref()
    }

    /// Replace `+mj-lt` / `+mn-lt` theme font references with the theme's typefaces.
    pub fn resolve_typeface<'a>(&'a self, typeface: &'a str) -> Option<&'a str> {
        match typeface {
            "+mj-lt" | "+mj-ea" | "+mj-cs" => self.major_font(),
            "+mn-lt" | "+mn-ea" | "+mn-cs" => self.minor_font(),
            "" => None,
            other => Some(other),
        }
    }
}

/// Direct RGB first, then the system color's last rendered value.
fn scheme_entry_color(entry: &XmlNode) -> Option<RGBColor> {
    if let Some(rgb) = entry.child("a:srgbClr").and_then(|c| c.attr("val")) {
        return RGBColor::from_hex(rgb);
    }
    entry
        .child("a:sysClr")
        .and_then(|c| c.attr("lastClr"))
        .and_then(RGBColor::from_hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THEME: &str = r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office">
  <a:themeElements>
    <a:clrScheme name="Custom">
      <a:dk1><a:sysClr val="windowText" lastClr="111111"/></a:dk1>
      <a:lt1><a:sysClr val="window" lastClr="FEFEFE"/></a:lt1>
      <a:dk2><a:srgbClr val="1F497D"/></a:dk2>
      <a:lt2><a:srgbClr val="EEECE1"/></a:lt2>
      <a:accent1><a:srgbClr val="C0504D"/></a:accent1>
      <a:accent2><a:srgbClr val="nonsense"/></a:accent2>
    </a:clrScheme>
    <a:fontScheme name="Office">
      <a:majorFont><a:latin typeface="Calibri Light"/></a:majorFont>
      <a:minorFont><a:latin typeface="Calibri"/></a:minorFont>
    </a:fontScheme>
  </a:themeElements>
</a:theme>"#;

    #[test]
    fn test_theme_from_xml() {
        let root = XmlNode::parse(THEME.as_bytes()).unwrap();
        let theme = Theme::from_xml(&root);
        assert_eq!(theme.color(ThemeRole::Text1), RGBColor::new(0x11, 0x11, 0x11));
        assert_eq!(theme.color(ThemeRole::Background1), RGBColor::new(0xFE, 0xFE, 0xFE));
        assert_eq!(theme.color(ThemeRole::Accent1), RGBColor::new(0xC0, 0x50, 0x4D));
        // Unparseable and missing roles keep the built-in palette.
        assert_eq!(theme.color(ThemeRole::Accent2), RGBColor::new(0xED, 0x7D, 0x31));
        assert_eq!(theme.color(ThemeRole::Accent6), RGBColor::new(0x70, 0xAD, 0x47));
        assert_eq!(theme.resolve_typeface("+mj-lt"), Some("Calibri Light"));
        assert_eq!(theme.resolve_typeface("+mn-lt"), Some("Calibri"));
        assert_eq!(theme.resolve_typeface("Georgia"), Some("Georgia"));
    }

    #[test]
    fn test_scheme_aliases() {
        let theme = Theme::default();
        assert_eq!(theme.scheme_color("tx1"), theme.scheme_color("dk1"));
        assert_eq!(theme.scheme_color("bg2"), Some(RGBColor::new(0xF2, 0xF2, 0xF2)));
        assert_eq!(theme.scheme_color("accent4"), Some(RGBColor::new(0xFF, 0xC0, 0x00)));
        assert_eq!(theme.scheme_color("phClr"), None);
        assert_eq!(ThemeRole::from_name("ACCENT_3"), Some(ThemeRole::Accent3));
    }

    #[test]
    fn test_empty_theme_is_default() {
        let root = XmlNode::parse(br#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"/>"#).unwrap();
        assert_eq!(Theme::from_xml(&root), Theme::default());
    }
}
