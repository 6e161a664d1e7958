//! Paragraphs (blocks) and their text runs (fragments).
//!
//! A run whose content is plain text becomes a [`Fragment`]. Everything else
//! inside a paragraph (fields, drawings, bookmarks, hyperlinks, revision
//! marks) is kept as an opaque [`Inline`] at its original position.
use std::fmt::Write as _;

use crate::common::xml::{XmlAttr, XmlElement, XmlNode};

/// A formatted run of plain text (`w:r`).
///
/// The original element is retained until the fragment is modified, so an
/// untouched run serializes exactly as it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    name: String,
    attrs: Vec<XmlAttr>,
    /// `w:rPr`
    properties: Option<XmlElement>,
    text: String,
    source: Option<XmlElement>,
}

impl Fragment {
    /// A new unformatted fragment in the `w` namespace.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            name: "w:r".to_string(),
            attrs: Vec::new(),
            properties: None,
            text: text.into(),
            source: None,
        }
    }

    /// Convert a `w:r` element. Runs carrying anything other than text,
    /// tabs, and plain line breaks are handed back unchanged.
    pub fn from_element(element: XmlElement) -> Result<Self, XmlElement> {
        if element.local_name() != "r" {
            return Err(element);
        }

        let Some((properties, text)) = read_text_run(&element) else {
            return Err(element);
        };

        Ok(Self {
            name: element.name.clone(),
            attrs: element.attrs.clone(),
            properties,
            text,
            source: Some(element),
        })
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.source = None;
    }

    /// A sibling fragment with the same element attributes and run
    /// properties but different text.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            name: self.name.clone(),
            attrs: self.attrs.clone(),
            properties: self.properties.clone(),
            text: text.into(),
            source: None,
        }
    }

    /// Run properties (`w:rPr`), if present.
    #[inline]
    pub fn properties(&self) -> Option<&XmlElement> {
        self.properties.as_ref()
    }

    /// Run properties for editing, created empty when absent.
    pub fn properties_mut(&mut self) -> &mut XmlElement {
        self.source = None;
        let name = qualify(&self.name, "rPr");
        self.properties.get_or_insert_with(|| XmlElement::new(name))
    }

    /// True once the fragment no longer matches the element it was read from.
    #[inline]
    pub fn is_modified(&self) -> bool {
        self.source.is_none()
    }

    pub fn write_to(&self, out: &mut String) {
        if let Some(source) = &self.source {
            source.write_to(out);
            return;
        }

        let shell = XmlElement {
            name: self.name.clone(),
            attrs: self.attrs.clone(),
            children: Vec::new(),
        };
        let has_content = self.properties.is_some() || !self.text.is_empty();
        shell.write_open(out, !has_content);
        if !has_content {
            return;
        }
        if let Some(props) = &self.properties {
            props.write_to(out);
        }
        write_run_text(&self.name, &self.text, out);
        shell.write_close(out);
    }
}

/// Run properties and text of a text-only run, or None for any other run.
fn read_text_run(run: &XmlElement) -> Option<(Option<XmlElement>, String)> {
    let mut properties = None;
    let mut text = String::new();
    for child in &run.children {
        match child {
            XmlNode::Element(e) => match e.local_name() {
                "rPr" if properties.is_none() && text.is_empty() => properties = Some(e.clone()),
                "t" if e.elements().next().is_none() => text.push_str(&e.text()),
                "tab" if e.children.is_empty() => text.push('\t'),
                "br" | "cr" if e.attrs.is_empty() && e.children.is_empty() => text.push('\n'),
                "lastRenderedPageBreak" => {},
                _ => return None,
            },
            node if node.is_whitespace() => {},
            _ => return None,
        }
    }
    Some((properties, text))
}

/// `prefix:local` using the prefix of `name`.
fn qualify(name: &str, local: &str) -> String {
    match name.rfind(':') {
        Some(i) => format!("{}:{}", &name[..i], local),
        None => local.to_string(),
    }
}

/// Emit run content for `text`: `w:t` segments with `w:tab` for tabs and
/// `w:br` for line breaks.
fn write_run_text(run_name: &str, text: &str, out: &mut String) {
    let t = qualify(run_name, "t");
    let mut segment = String::new();
    let flush = |segment: &mut String, out: &mut String| {
        if segment.is_empty() {
            return;
        }
        let preserve = segment.starts_with(char::is_whitespace) || segment.ends_with(char::is_whitespace);
        let mut el = XmlElement::new(t.clone());
        if preserve {
            el.set_attr("xml:space", "preserve");
        }
        el.children.push(XmlNode::Text(std::mem::take(segment)));
        el.write_to(out);
    };

    for c in text.chars() {
        match c {
            '\t' => {
                flush(&mut segment, out);
                let _ = write!(out, "<{}/>", qualify(run_name, "tab"));
            },
            '\n' => {
                flush(&mut segment, out);
                let _ = write!(out, "<{}/>", qualify(run_name, "br"));
            },
            c => segment.push(c),
        }
    }
    flush(&mut segment, out);
}

/// Paragraph content in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Fragment(Fragment),
    /// Anything the model does not interpret
    Opaque(XmlNode),
}

/// Paragraph children that mark a position without showing anything.
const INVISIBLE_MARKERS: &[&str] = &["bookmarkStart", "bookmarkEnd", "proofErr", "permStart", "permEnd"];

impl Inline {
    /// True when this inline shows something between its neighbours, so text
    /// on either side of it must not be read as contiguous.
    ///
    /// Only fragments, pure position markers (bookmarks, comment and revision
    /// ranges, proofing marks) and non-element nodes are see-through.
    pub fn breaks_text(&self) -> bool {
        match self {
            Inline::Fragment(_) => false,
            Inline::Opaque(XmlNode::Element(e)) => {
                let local = e.local_name();
                !(INVISIBLE_MARKERS.contains(&local) || local.ends_with("RangeStart") || local.ends_with("RangeEnd"))
            },
            Inline::Opaque(node) => !node.is_whitespace() && !matches!(node, XmlNode::Comment(_) | XmlNode::Raw(_)),
        }
    }

    fn write_to(&self, out: &mut String) {
        match self {
            Inline::Fragment(f) => f.write_to(out),
            Inline::Opaque(node) => node.write_to(out),
        }
    }
}

/// A paragraph (`w:p`): block-level properties plus ordered inline content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    name: String,
    attrs: Vec<XmlAttr>,
    /// `w:pPr`
    properties: Option<XmlElement>,
    inlines: Vec<Inline>,
}

impl Block {
    /// An empty paragraph in the `w` namespace.
    pub fn new() -> Self {
        Self {
            name: "w:p".to_string(),
            attrs: Vec::new(),
            properties: None,
            inlines: Vec::new(),
        }
    }

    /// A paragraph holding one fragment per entry of `texts`.
    pub fn from_texts<S: AsRef<str>>(texts: &[S]) -> Self {
        let mut block = Self::new();
        block.inlines = texts
            .iter()
            .map(|t| Inline::Fragment(Fragment::new(t.as_ref())))
            .collect();
        block
    }

    pub fn from_element(element: XmlElement) -> Self {
        let XmlElement { name, attrs, children } = element;
        let mut properties = None;
        let mut inlines = Vec::with_capacity(children.len());

        for child in children {
            match child {
                XmlNode::Element(e) if properties.is_none() && inlines.is_empty() && e.local_name() == "pPr" => {
                    properties = Some(e);
                },
                XmlNode::Element(e) => match Fragment::from_element(e) {
                    Ok(fragment) => inlines.push(Inline::Fragment(fragment)),
                    Err(e) => inlines.push(Inline::Opaque(XmlNode::Element(e))),
                },
                other => inlines.push(Inline::Opaque(other)),
            }
        }

        Self {
            name,
            attrs,
            properties,
            inlines,
        }
    }

    /// Concatenated text of all fragments.
    pub fn text(&self) -> String {
        self.fragments().map(Fragment::text).collect()
    }

    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.inlines.iter().filter_map(|i| match i {
            Inline::Fragment(f) => Some(f),
            Inline::Opaque(_) => None,
        })
    }

    pub fn fragments_mut(&mut self) -> impl Iterator<Item = &mut Fragment> {
        self.inlines.iter_mut().filter_map(|i| match i {
            Inline::Fragment(f) => Some(f),
            Inline::Opaque(_) => None,
        })
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments().count()
    }

    #[inline]
    pub fn inlines(&self) -> &[Inline] {
        &self.inlines
    }

    /// Move the inline sequence out, leaving the block empty.
    pub fn take_inlines(&mut self) -> Vec<Inline> {
        std::mem::take(&mut self.inlines)
    }

    /// Swap in a rebuilt inline sequence.
    pub fn set_inlines(&mut self, inlines: Vec<Inline>) {
        self.inlines = inlines;
    }

    pub fn push_fragment(&mut self, fragment: Fragment) {
        self.inlines.push(Inline::Fragment(fragment));
    }

    /// Paragraph properties (`w:pPr`), if present.
    #[inline]
    pub fn properties(&self) -> Option<&XmlElement> {
        self.properties.as_ref()
    }

    /// Paragraph properties for editing, created empty when absent.
    pub fn properties_mut(&mut self) -> &mut XmlElement {
        let name = qualify(&self.name, "pPr");
        self.properties.get_or_insert_with(|| XmlElement::new(name))
    }

    pub fn write_to(&self, out: &mut String) {
        let shell = XmlElement {
            name: self.name.clone(),
            attrs: self.attrs.clone(),
            children: Vec::new(),
        };
        let empty = self.properties.is_none() && self.inlines.is_empty();
        shell.write_open(out, empty);
        if empty {
            return;
        }
        if let Some(props) = &self.properties {
            props.write_to(out);
        }
        for inline in &self.inlines {
            inline.write_to(out);
        }
        shell.write_close(out);
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::new()
    }
}
