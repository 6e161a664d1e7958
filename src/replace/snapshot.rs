//! Format snapshots: capture the explicitly set formatting of a fragment,
//! paragraph, or cell, and replay it after a structural edit.
//!
//! A snapshot only holds attributes that are present on the source; absent
//! keys are no-ops when applied. Capturing what was just applied yields the
//! same snapshot again.

use smallvec::SmallVec;

use crate::common::style::{ColorValue, VerticalPosition, parse_on_off};
use crate::common::xml::XmlElement;
use crate::ooxml::docx::format::{
    CELL_PROPERTY_ORDER, PARAGRAPH_PROPERTY_ORDER, ParagraphAlignment, RUN_PROPERTY_ORDER, property, upsert_child,
    val_property,
};
use crate::ooxml::docx::{Block, Cell, Fragment};

/// Capture and replay of a fixed attribute set on one kind of element.
pub trait Snapshot: Default + PartialEq + Sized {
    type Target;

    /// Read the explicitly set attributes of `target`.
    fn capture(target: &Self::Target) -> Self;

    /// Write every present attribute to `target`.
    fn apply(&self, target: &mut Self::Target);

    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Attributes of one property element, by qualified name, unescaped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrSet(SmallVec<[(String, String); 4]>);

impl AttrSet {
    fn capture(element: &XmlElement) -> Self {
        Self(element.attrs.iter().map(|a| (a.name.clone(), a.value())).collect())
    }

    pub fn get(&self, local: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name.rsplit(':').next() == Some(local))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for AttrSet {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }
}

fn capture_attrs(parent: &XmlElement, local: &str) -> Option<AttrSet> {
    parent.child(local).map(AttrSet::capture)
}

/// The `local` child of `parent` as it stands, or a fresh one.
fn existing_or_new(parent: &XmlElement, local: &str) -> XmlElement {
    parent.child(local).cloned().unwrap_or_else(|| property(parent, local))
}

/// Merge `attrs` into the `local` child of `parent`, creating it if needed.
fn apply_attrs(parent: &mut XmlElement, order: &[&str], local: &str, attrs: &AttrSet) {
    let mut element = existing_or_new(parent, local);
    for (name, value) in attrs.iter() {
        element.set_attr(name, value);
    }
    upsert_child(parent, order, element);
}

/// Set `w:val` on the `local` child of `parent`, keeping its other attributes.
fn apply_val(parent: &mut XmlElement, order: &[&str], local: &str, val: &str) {
    let mut element = existing_or_new(parent, local);
    if element.attr("val").as_deref() == Some(val) {
        return;
    }
    element.set_attr(&parent.qualified("val"), val);
    upsert_child(parent, order, element);
}

fn capture_on_off(parent: &XmlElement, local: &str) -> Option<bool> {
    parent
        .child(local)
        .map(|e| parse_on_off(e.attr("val").as_deref()))
}

fn apply_on_off(parent: &mut XmlElement, order: &[&str], local: &str, on: bool) {
    if capture_on_off(parent, local) == Some(on) {
        return;
    }
    let element = if on {
        property(parent, local)
    } else {
        val_property(parent, local, "0")
    };
    upsert_child(parent, order, element);
}

fn capture_val(parent: &XmlElement, local: &str) -> Option<String> {
    parent.child(local).and_then(|e| e.attr("val"))
}

/// `w:color`: explicit value and theme reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextColor {
    pub value: Option<ColorValue>,
    pub theme_color: Option<String>,
    pub theme_tint: Option<String>,
    pub theme_shade: Option<String>,
}

/// Character formatting of a fragment (`w:rPr`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatSnapshot {
    /// `w:rFonts` (ascii, hAnsi, eastAsia, cs and their theme variants)
    pub fonts: Option<AttrSet>,
    /// Size as written: half-points in transitional documents, possibly
    /// with a unit (`14pt`) in strict ones
    pub size: Option<String>,
    pub size_complex: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    /// `w:u`, every attribute including its theme color
    pub underline: Option<AttrSet>,
    pub color: Option<TextColor>,
    pub highlight: Option<String>,
    pub strike: Option<bool>,
    pub double_strike: Option<bool>,
    pub vertical_position: Option<VerticalPosition>,
}

impl FormatSnapshot {
    pub fn capture_properties(rpr: &XmlElement) -> Self {
        Self {
            fonts: capture_attrs(rpr, "rFonts"),
            size: capture_val(rpr, "sz"),
            size_complex: capture_val(rpr, "szCs"),
            bold: capture_on_off(rpr, "b"),
            italic: capture_on_off(rpr, "i"),
            underline: capture_attrs(rpr, "u"),
            color: rpr.child("color").map(|c| TextColor {
                value: c.attr("val").map(|v| ColorValue::parse(&v)),
                theme_color: c.attr("themeColor"),
                theme_tint: c.attr("themeTint"),
                theme_shade: c.attr("themeShade"),
            }),
            highlight: capture_val(rpr, "highlight"),
            strike: capture_on_off(rpr, "strike"),
            double_strike: capture_on_off(rpr, "dstrike"),
            vertical_position: capture_val(rpr, "vertAlign").and_then(|v| VerticalPosition::from_ooxml(&v)),
        }
    }

    /// Size in half-points, when written as a plain number.
    pub fn half_points(&self) -> Option<u32> {
        self.size.as_deref().and_then(|v| v.parse().ok())
    }

    pub fn apply_properties(&self, rpr: &mut XmlElement) {
        let order = RUN_PROPERTY_ORDER;
        if let Some(fonts) = &self.fonts {
            apply_attrs(rpr, order, "rFonts", fonts);
        }
        if let Some(size) = &self.size {
            apply_val(rpr, order, "sz", size);
        }
        if let Some(size) = &self.size_complex {
            apply_val(rpr, order, "szCs", size);
        }
        if let Some(on) = self.bold {
            apply_on_off(rpr, order, "b", on);
        }
        if let Some(on) = self.italic {
            apply_on_off(rpr, order, "i", on);
        }
        if let Some(u) = &self.underline {
            apply_attrs(rpr, order, "u", u);
        }
        if let Some(c) = &self.color {
            let mut el = existing_or_new(rpr, "color");
            if let Some(value) = &c.value {
                el.set_attr(&rpr.qualified("val"), &value.to_attr());
            }
            for (local, v) in [
                ("themeColor", &c.theme_color),
                ("themeTint", &c.theme_tint),
                ("themeShade", &c.theme_shade),
            ] {
                if let Some(v) = v {
                    el.set_attr(&rpr.qualified(local), v);
                }
            }
            upsert_child(rpr, order, el);
        }
        if let Some(h) = &self.highlight {
            apply_val(rpr, order, "highlight", h);
        }
        if let Some(on) = self.strike {
            apply_on_off(rpr, order, "strike", on);
        }
        if let Some(on) = self.double_strike {
            apply_on_off(rpr, order, "dstrike", on);
        }
        if let Some(pos) = self.vertical_position {
            apply_val(rpr, order, "vertAlign", pos.as_ooxml());
        }
    }
}

impl Snapshot for FormatSnapshot {
    type Target = Fragment;

    fn capture(fragment: &Fragment) -> Self {
        fragment.properties().map(Self::capture_properties).unwrap_or_default()
    }

    fn apply(&self, fragment: &mut Fragment) {
        if self.is_empty() {
            return;
        }
        self.apply_properties(fragment.properties_mut());
    }
}

/// Paragraph layout (`w:pPr`): alignment, indentation, and line spacing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockFormat {
    pub alignment: Option<ParagraphAlignment>,
    /// `w:ind`
    pub indentation: Option<AttrSet>,
    /// `w:spacing`
    pub spacing: Option<AttrSet>,
}

impl Snapshot for BlockFormat {
    type Target = Block;

    fn capture(block: &Block) -> Self {
        let Some(ppr) = block.properties() else {
            return Self::default();
        };
        Self {
            alignment: capture_val(ppr, "jc").map(|v| ParagraphAlignment::from_ooxml(&v)),
            indentation: capture_attrs(ppr, "ind"),
            spacing: capture_attrs(ppr, "spacing"),
        }
    }

    fn apply(&self, block: &mut Block) {
        if self.is_empty() {
            return;
        }
        let ppr = block.properties_mut();
        let order = PARAGRAPH_PROPERTY_ORDER;
        if let Some(spacing) = &self.spacing {
            apply_attrs(ppr, order, "spacing", spacing);
        }
        if let Some(ind) = &self.indentation {
            apply_attrs(ppr, order, "ind", ind);
        }
        if let Some(alignment) = &self.alignment {
            apply_val(ppr, order, "jc", alignment.as_str());
        }
    }
}

/// Cell appearance (`w:tcPr`): shading, borders, width, vertical alignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellFormat {
    /// `w:shd`
    pub shading: Option<AttrSet>,
    /// `w:tcBorders`, kept whole since it nests one element per edge
    pub borders: Option<XmlElement>,
    /// `w:tcW`
    pub width: Option<AttrSet>,
    /// `w:vAlign`
    pub vertical_alignment: Option<String>,
}

impl Snapshot for CellFormat {
    type Target = Cell;

    fn capture(cell: &Cell) -> Self {
        let Some(tcpr) = cell.properties() else {
            return Self::default();
        };
        Self {
            shading: capture_attrs(tcpr, "shd"),
            borders: tcpr.child("tcBorders").cloned(),
            width: capture_attrs(tcpr, "tcW"),
            vertical_alignment: capture_val(tcpr, "vAlign"),
        }
    }

    fn apply(&self, cell: &mut Cell) {
        if self.is_empty() {
            return;
        }
        let tcpr = cell.properties_mut();
        let order = CELL_PROPERTY_ORDER;
        if let Some(width) = &self.width {
            apply_attrs(tcpr, order, "tcW", width);
        }
        if let Some(borders) = &self.borders {
            upsert_child(tcpr, order, borders.clone());
        }
        if let Some(shading) = &self.shading {
            apply_attrs(tcpr, order, "shd", shading);
        }
        if let Some(v) = &self.vertical_alignment {
            apply_val(tcpr, order, "vAlign", v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::xml::XmlDocument;
    use crate::common::RGBColor;

    fn fragment(xml: &str) -> Fragment {
        Fragment::from_element(XmlDocument::parse(xml.as_bytes()).unwrap().root).unwrap()
    }

    const RICH: &str = r#"<w:r><w:rPr><w:rStyle w:val="Emphasis"/><w:rFonts w:ascii="Arial" w:eastAsia="SimSun" w:hAnsiTheme="minorHAnsi"/><w:b/><w:i w:val="0"/><w:strike w:val="false"/><w:color w:val="1F4E79" w:themeColor="accent1" w:themeShade="BF"/><w:sz w:val="28"/><w:highlight w:val="yellow"/><w:u w:val="double" w:color="FF0000"/><w:vertAlign w:val="superscript"/></w:rPr><w:t>x</w:t></w:r>"#;

    #[test]
    fn test_capture_reads_explicit_attributes() {
        let s = FormatSnapshot::capture(&fragment(RICH));
        assert_eq!(s.bold, Some(true));
        assert_eq!(s.italic, Some(false));
        assert_eq!(s.strike, Some(false));
        assert_eq!(s.double_strike, None);
        assert_eq!(s.size.as_deref(), Some("28"));
        assert_eq!(s.half_points(), Some(28));
        assert_eq!(s.size_complex, None);
        assert_eq!(s.highlight.as_deref(), Some("yellow"));
        assert_eq!(s.vertical_position, Some(VerticalPosition::Superscript));
        assert_eq!(s.fonts.as_ref().unwrap().get("eastAsia"), Some("SimSun"));
        let color = s.color.as_ref().unwrap();
        assert_eq!(color.value, Some(ColorValue::Rgb(RGBColor::new(0x1F, 0x4E, 0x79))));
        assert_eq!(color.theme_color.as_deref(), Some("accent1"));
        let u = s.underline.as_ref().unwrap();
        assert_eq!(u.get("val"), Some("double"));
        assert_eq!(u.get("color"), Some("FF0000"));
    }

    #[test]
    fn test_plain_fragment_captures_nothing() {
        let s = FormatSnapshot::capture(&Fragment::new("plain"));
        assert!(s.is_empty());
        let mut f = Fragment::new("plain");
        s.apply(&mut f);
        assert!(f.properties().is_none());
    }

    #[test]
    fn test_capture_apply_law_on_blank_fragment() {
        let s = FormatSnapshot::capture(&fragment(RICH));
        let mut blank = Fragment::new("y");
        s.apply(&mut blank);
        assert_eq!(FormatSnapshot::capture(&blank), s);
        // schema order inside rPr
        let names: Vec<_> = blank.properties().unwrap().elements().map(|e| e.local_name()).collect();
        assert_eq!(
            names,
            ["rFonts", "b", "i", "strike", "color", "sz", "highlight", "u", "vertAlign"]
        );
    }

    #[test]
    fn test_capture_apply_law_on_self() {
        let mut f = fragment(RICH);
        let s = FormatSnapshot::capture(&f);
        s.apply(&mut f);
        assert_eq!(FormatSnapshot::capture(&f), s);
        // unmodeled properties survive
        assert!(f.properties().unwrap().child("rStyle").is_some());
    }

    #[test]
    fn test_theme_underline_and_unit_size_survive() {
        let xml = r#"<w:r><w:rPr><w:sz w:val="14pt"/><w:u w:val="single" w:themeColor="accent2" w:themeTint="99"/></w:rPr><w:t>x</w:t></w:r>"#;
        let s = FormatSnapshot::capture(&fragment(xml));
        assert_eq!(s.size.as_deref(), Some("14pt"));
        assert_eq!(s.half_points(), None);

        let mut blank = Fragment::new("y");
        s.apply(&mut blank);
        let rpr = blank.properties().unwrap();
        assert_eq!(rpr.child("sz").unwrap().attr("val").as_deref(), Some("14pt"));
        let u = rpr.child("u").unwrap();
        assert_eq!(u.attr("themeColor").as_deref(), Some("accent2"));
        assert_eq!(u.attr("themeTint").as_deref(), Some("99"));
        assert_eq!(FormatSnapshot::capture(&blank), s);
    }

    #[test]
    fn test_apply_on_self_is_byte_identical() {
        let xml = r#"<w:r><w:rPr><w:b w:val="on"/><w:highlight w:val="yellow" w14:extra="1"/><w:u w:val="single" w:themeColor="accent2"/></w:rPr><w:t>x</w:t></w:r>"#;
        let mut f = fragment(xml);
        let before = f.properties().unwrap().to_xml();
        FormatSnapshot::capture(&f).apply(&mut f);
        assert_eq!(f.properties().unwrap().to_xml(), before);
    }

    #[test]
    fn test_block_format_law() {
        let p = XmlDocument::parse(
            br#"<w:p><w:pPr><w:pStyle w:val="Heading1"/><w:spacing w:before="120" w:line="360" w:lineRule="auto"/><w:ind w:left="720" w:hanging="360"/><w:jc w:val="center"/></w:pPr></w:p>"#,
        )
        .unwrap()
        .root;
        let source = Block::from_element(p);
        let s = BlockFormat::capture(&source);
        assert_eq!(s.alignment, Some(ParagraphAlignment::Center));
        assert_eq!(s.indentation.as_ref().unwrap().get("hanging"), Some("360"));

        let mut blank = Block::new();
        s.apply(&mut blank);
        assert_eq!(BlockFormat::capture(&blank), s);
    }

    #[test]
    fn test_block_format_keeps_logical_alignment() {
        let p = XmlDocument::parse(br#"<w:p><w:pPr><w:bidi/><w:jc w:val="start"/></w:pPr></w:p>"#)
            .unwrap()
            .root;
        let mut block = Block::from_element(p);
        let before = block.properties().unwrap().to_xml();
        let s = BlockFormat::capture(&block);
        assert_eq!(s.alignment, Some(ParagraphAlignment::Start));

        s.apply(&mut block);
        assert_eq!(block.properties().unwrap().to_xml(), before);
    }

    #[test]
    fn test_cell_format_law() {
        let tc = XmlDocument::parse(
            br#"<w:tc><w:tcPr><w:tcW w:w="2394" w:type="dxa"/><w:tcBorders><w:top w:val="single" w:sz="4"/><w:bottom w:val="double"/></w:tcBorders><w:shd w:val="clear" w:color="auto" w:fill="D9E2F3"/><w:vAlign w:val="center"/></w:tcPr><w:p/></w:tc>"#,
        )
        .unwrap()
        .root;
        let source = Cell::from_element(tc);
        let s = CellFormat::capture(&source);
        assert_eq!(s.shading.as_ref().unwrap().get("fill"), Some("D9E2F3"));
        assert_eq!(s.vertical_alignment.as_deref(), Some("center"));

        let mut blank = Cell::new();
        s.apply(&mut blank);
        assert_eq!(CellFormat::capture(&blank), s);
    }
}
