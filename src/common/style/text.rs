//! Character-level text properties.

/// Vertical text position (superscript/subscript), stored in `w:vertAlign`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalPosition {
    #[default]
    Normal,
    Superscript,
    Subscript,
}

impl VerticalPosition {
    /// Parse an `ST_VerticalAlignRun` value.
    pub fn from_ooxml(val: &str) -> Option<Self> {
        match val {
            "baseline" => Some(VerticalPosition::Normal),
            "superscript" => Some(VerticalPosition::Superscript),
            "subscript" => Some(VerticalPosition::Subscript),
            _ => None,
        }
    }

    pub fn as_ooxml(&self) -> &'static str {
        match self {
            VerticalPosition::Normal => "baseline",
            VerticalPosition::Superscript => "superscript",
            VerticalPosition::Subscript => "subscript",
        }
    }

    #[inline]
    pub fn is_normal(&self) -> bool {
        matches!(self, VerticalPosition::Normal)
    }
}

/// Interpret an `ST_OnOff` value.
///
/// An absent value means on; `0`, `false` and `off` mean off.
pub fn parse_on_off(val: Option<&str>) -> bool {
    !matches!(val, Some("0" | "false" | "off"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_position() {
        assert_eq!(
            VerticalPosition::from_ooxml("superscript"),
            Some(VerticalPosition::Superscript)
        );
        assert_eq!(VerticalPosition::from_ooxml("raised"), None);
        assert_eq!(VerticalPosition::Subscript.as_ooxml(), "subscript");
    }

    #[test]
    fn test_on_off() {
        assert!(parse_on_off(None));
        assert!(parse_on_off(Some("1")));
        assert!(parse_on_off(Some("true")));
        assert!(parse_on_off(Some("on")));
        assert!(!parse_on_off(Some("0")));
        assert!(!parse_on_off(Some("false")));
        assert!(!parse_on_off(Some("off")));
    }
}
