//! Shared formatting helpers for property containers (`w:rPr`, `w:pPr`, `w:tcPr`).
//!
//! WordprocessingML requires the children of a property container to appear
//! in schema order. The helpers here insert or replace a single property
//! element while keeping that order, and leave every other child untouched.

use crate::common::xml::{XmlElement, XmlNode};

/// Child order of `CT_RPr`.
pub const RUN_PROPERTY_ORDER: &[&str] = &[
    "rStyle", "rFonts", "b", "bCs", "i", "iCs", "caps", "smallCaps", "strike", "dstrike", "outline", "shadow",
    "emboss", "imprint", "noProof", "snapToGrid", "vanish", "webHidden", "color", "spacing", "w", "kern",
    "position", "sz", "szCs", "highlight", "u", "effect", "bdr", "shd", "fitText", "vertAlign", "rtl", "cs", "em",
    "lang", "eastAsianLayout", "specVanish", "oMath", "rPrChange",
];

/// Child order of `CT_PPr`.
pub const PARAGRAPH_PROPERTY_ORDER: &[&str] = &[
    "pStyle", "keepNext", "keepLines", "pageBreakBefore", "framePr", "widowControl", "numPr",
    "suppressLineNumbers", "pBdr", "shd", "tabs", "suppressAutoHyphens", "kinsoku", "wordWrap", "overflowPunct",
    "topLinePunct", "autoSpaceDE", "autoSpaceDN", "bidi", "adjustRightInd", "snapToGrid", "spacing", "ind",
    "contextualSpacing", "mirrorIndents", "suppressOverlap", "jc", "textDirection", "textAlignment",
    "textboxTightWrap", "outlineLvl", "divId", "cnfStyle", "rPr", "sectPr", "pPrChange",
];

/// Child order of `CT_TcPr`.
pub const CELL_PROPERTY_ORDER: &[&str] = &[
    "cnfStyle", "tcW", "gridSpan", "hMerge", "vMerge", "tcBorders", "shd", "noWrap", "tcMar", "textDirection",
    "tcFitText", "vAlign", "hideMark", "headers", "cellIns", "cellDel", "cellMerge", "tcPrChange",
];

/// Paragraph alignment (`w:jc/@w:val`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParagraphAlignment {
    /// Leading edge; mirrors in right-to-left paragraphs
    Start,
    /// Trailing edge; mirrors in right-to-left paragraphs
    End,
    Left,
    Center,
    Right,
    Justify,
    Distribute,
    /// Values outside the common set are carried through verbatim
    Other(String),
}

impl ParagraphAlignment {
    pub fn from_ooxml(val: &str) -> Self {
        match val {
            "start" => Self::Start,
            "end" => Self::End,
            "left" => Self::Left,
            "center" => Self::Center,
            "right" => Self::Right,
            "both" => Self::Justify,
            "distribute" => Self::Distribute,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "both",
            Self::Distribute => "distribute",
            Self::Other(s) => s,
        }
    }
}

fn rank(order: &[&str], local: &str) -> Option<usize> {
    order.iter().position(|name| *name == local)
}

/// Insert `element` into `parent`, replacing an existing child with the same
/// local name, or placing it before the first known child that sorts after it.
pub fn upsert_child(parent: &mut XmlElement, order: &[&str], element: XmlElement) {
    let local = element.local_name().to_string();
    if let Some(idx) = parent.child_index(&local) {
        parent.children[idx] = XmlNode::Element(element);
        return;
    }

    let insert_at = rank(order, &local).and_then(|own| {
        parent.children.iter().position(|node| {
            node.as_element()
                .and_then(|e| rank(order, e.local_name()))
                .is_some_and(|other| other > own)
        })
    });
    match insert_at {
        Some(idx) => parent.children.insert(idx, XmlNode::Element(element)),
        None => parent.children.push(XmlNode::Element(element)),
    }
}

/// A property element named with `parent`'s namespace prefix.
pub fn property(parent: &XmlElement, local: &str) -> XmlElement {
    XmlElement::new(parent.qualified(local))
}

/// A property element carrying a single `val` attribute.
pub fn val_property(parent: &XmlElement, local: &str, val: &str) -> XmlElement {
    let attr = parent.qualified("val");
    property(parent, local).with_attr(&attr, val)
}
