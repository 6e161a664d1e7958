use std::fmt;

/// RGB color representation.
///
/// # Examples
///
/// ```rust
/// use docsplice::common::RGBColor;
///
/// let blue = RGBColor::from_hex("0000FF").unwrap();
/// assert_eq!(blue.to_hex(), "0000FF");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RGBColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RGBColor {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a six digit hex string, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Self::new(r, g, b))
    }

    /// Uppercase hex without `#`, the form WordprocessingML stores.
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for RGBColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// Value of a `w:color/@w:val` or `w:u/@w:color` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorValue {
    /// `auto`, the application picks a contrasting color
    Auto,
    Rgb(RGBColor),
    /// Anything else is carried through untouched
    Other(String),
}

impl ColorValue {
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("auto") {
            return ColorValue::Auto;
        }
        match RGBColor::from_hex(s) {
            Some(c) => ColorValue::Rgb(c),
            None => ColorValue::Other(s.to_string()),
        }
    }

    pub fn to_attr(&self) -> String {
        match self {
            ColorValue::Auto => "auto".to_string(),
            ColorValue::Rgb(c) => c.to_hex(),
            ColorValue::Other(s) => s.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(RGBColor::from_hex("#FF0000"), Some(RGBColor::new(255, 0, 0)));
        assert_eq!(RGBColor::from_hex("ff00"), None);
        assert_eq!(RGBColor::from_hex("GG0000"), None);
    }

    #[test]
    fn test_color_value() {
        assert_eq!(ColorValue::parse("auto"), ColorValue::Auto);
        assert_eq!(ColorValue::parse("1f4e79").to_attr(), "1F4E79");
        assert_eq!(ColorValue::parse("accent1").to_attr(), "accent1");
    }
}
