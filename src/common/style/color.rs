use std::fmt;

/// RGB color representation.
///
/// Represents a color using red, green, and blue components, each in the range 0-255.
///
/// # Examples
///
/// ```rust
/// use slidescene::common::RGBColor;
///
/// let red = RGBColor::new(255, 0, 0);
/// let blue = RGBColor::from_hex("0000FF").unwrap();
/// assert_eq!(red.to_css(), "#ff0000");
/// assert_eq!(blue.to_hex(), "0000FF");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RGBColor {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
}

impl RGBColor {
    pub const BLACK: RGBColor = RGBColor::new(0, 0, 0);
    pub const WHITE: RGBColor = RGBColor::new(255, 255, 255);

    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create an RGB color from a six digit hex string, with or without `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Self::new(r, g, b))
    }

    /// Parse a CSS-style color as produced by canvas editors.
    ///
    /// Accepts `#rrggbb`, `#rgb`, `rgb(r, g, b)` and `rgba(r, g, b, a)`.
    /// Returns `None` for `transparent` and anything unrecognized.
    pub fn from_css(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            return match hex.len() {
                6 => Self::from_hex(hex),
                3 => {
                    let mut expanded = String::with_capacity(6);
                    for c in hex.chars() {
                        expanded.push(c);
                        expanded.push(c);
                    }
                    Self::from_hex(&expanded)
                },
                _ => None,
            };
        }

        let lower = value.to_ascii_lowercase();
        let inner = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))?
            .strip_suffix(')')?;
        let mut parts = inner.split(',').map(|p| p.trim());
        let mut channel = || -> Option<u8> {
            let v: f64 = parts.next()?.parse().ok()?;
            Some(v.clamp(0.0, 255.0).round() as u8)
        };
        Some(Self::new(channel()?, channel()?, channel()?))
    }

    /// Convert to upper-case hex string without `#`, the form DrawingML stores.
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Convert to the lower-case `#rrggbb` form used in the scene description.
    pub fn to_css(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Scale luminance by `modulation` then add `offset` (both unit fractions).
    pub fn lum_mod_off(&self, modulation: f64, offset: f64) -> Self {
        let (h, s, l) = self.to_hsl();
        Self::from_hsl(h, s, (l * modulation + offset).clamp(0.0, 1.0))
    }

    /// Mix toward white; `amount` is the fraction of the original color kept.
    pub fn tint(&self, amount: f64) -> Self {
        let mix = |c: u8| -> u8 {
            let c = c as f64;
            (c * amount + 255.0 * (1.0 - amount)).clamp(0.0, 255.0).round() as u8
        };
        Self::new(mix(self.r), mix(self.g), mix(self.b))
    }

    /// Mix toward black; `amount` is the fraction of the original color kept.
    pub fn shade(&self, amount: f64) -> Self {
        let mix = |c: u8| -> u8 { (c as f64 * amount).clamp(0.0, 255.0).round() as u8 };
        Self::new(mix(self.r), mix(self.g), mix(self.b))
    }

    fn to_hsl(self) -> (f64, f64, f64) {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        if (max - min).abs() < f64::EPSILON {
            return (0.0, 0.0, l);
        }
        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        (h / 6.0, s, l)
    }

    fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        if s == 0.0 {
            let v = (l * 255.0).round() as u8;
            return Self::new(v, v, v);
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let hue = |mut t: f64| -> f64 {
            if t < 0.0 {
                t += 1.0;
            }
            if t > 1.0 {
                t -= 1.0;
            }
            if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            }
        };
        let to_u8 = |v: f64| (v * 255.0).clamp(0.0, 255.0).round() as u8;
        Self::new(
            to_u8(hue(h + 1.0 / 3.0)),
            to_u8(hue(h)),
            to_u8(hue(h - 1.0 / 3.0)),
        )
    }
}

impl fmt::Display for RGBColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let c = RGBColor::from_hex("4472C4").unwrap();
        assert_eq!(c, RGBColor::new(0x44, 0x72, 0xC4));
        assert_eq!(c.to_hex(), "4472C4");
        assert_eq!(c.to_css(), "#4472c4");
        assert!(RGBColor::from_hex("12345").is_none());
        assert!(RGBColor::from_hex("GG0000").is_none());
    }

    #[test]
    fn test_css_forms() {
        assert_eq!(RGBColor::from_css("#fff"), Some(RGBColor::WHITE));
        assert_eq!(
            RGBColor::from_css("rgb(255, 128, 0)"),
            Some(RGBColor::new(255, 128, 0))
        );
        assert_eq!(
            RGBColor::from_css("rgba(1,2,3,0.5)"),
            Some(RGBColor::new(1, 2, 3))
        );
        assert_eq!(RGBColor::from_css("transparent"), None);
    }

    #[test]
    fn test_luminance_modifiers() {
        // White at 50% luminance becomes mid gray.
        let gray = RGBColor::WHITE.lum_mod_off(0.5, 0.0);
        assert_eq!(gray, RGBColor::new(128, 128, 128));
        // lumMod 100% / lumOff 0 is the identity.
        let c = RGBColor::new(0x44, 0x72, 0xC4);
        assert_eq!(c.lum_mod_off(1.0, 0.0), c);
    }

    #[test]
    fn test_tint_and_shade() {
        assert_eq!(RGBColor::BLACK.tint(0.0), RGBColor::WHITE);
        assert_eq!(RGBColor::WHITE.shade(0.5), RGBColor::new(128, 128, 128));
    }
}
