//! Owned XML tree used for lossless editing of package parts.
//!
//! The tree keeps every node it does not understand (comments, processing
//! instructions, unknown entity references, whitespace) so that a parsed
//! part can be written back without losing content. Attribute values are
//! stored in their escaped form exactly as read, which keeps numeric
//! character references such as `&#10;` intact across a round trip.

use std::fmt::Write as _;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::escape::{escape_xml, resolve_entity, unescape_xml};
use crate::common::error::{Error, Result};

/// Nesting limit for raw XML elements.
pub const MAX_XML_DEPTH: usize = 1024;

/// A single attribute with its value kept in escaped form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttr {
    pub name: String,
    pub raw_value: String,
}

impl XmlAttr {
    /// Create an attribute from an unescaped value.
    pub fn new(name: impl Into<String>, value: &str) -> Self {
        Self {
            name: name.into(),
            raw_value: escape_xml(value),
        }
    }

    /// The unescaped value.
    pub fn value(&self) -> String {
        unescape_xml(&self.raw_value).into_owned()
    }

    /// Local part of the qualified name.
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }
}

/// A node in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    /// Character data, unescaped
    Text(String),
    CData(String),
    Comment(String),
    /// An entity reference the reader could not resolve, written back as `&name;`
    EntityRef(String),
    /// Processing instruction or doctype, written back verbatim
    Raw(String),
}

impl XmlNode {
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlNode::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut XmlElement> {
        match self {
            XmlNode::Element(e) => Some(e),
            _ => None,
        }
    }

    /// True for text nodes made only of XML whitespace.
    pub fn is_whitespace(&self) -> bool {
        match self {
            XmlNode::Text(t) => t.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n')),
            _ => false,
        }
    }

    pub fn write_to(&self, out: &mut String) {
        match self {
            XmlNode::Element(e) => e.write_to(out),
            XmlNode::Text(t) => out.push_str(&escape_text(t)),
            XmlNode::CData(t) => {
                out.push_str("<![CDATA[");
                out.push_str(t);
                out.push_str("]]>");
            },
            XmlNode::Comment(t) => {
                out.push_str("<!--");
                out.push_str(t);
                out.push_str("-->");
            },
            XmlNode::EntityRef(name) => {
                let _ = write!(out, "&{};", name);
            },
            XmlNode::Raw(raw) => out.push_str(raw),
        }
    }
}

/// Escape character data. Quotes need no escaping outside attributes.
fn escape_text(s: &str) -> String {
    if !s.contains(['&', '<', '>']) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

#[inline]
fn local_part(name: &str) -> &str {
    match name.rfind(':') {
        Some(i) => &name[i + 1..],
        None => name,
    }
}

/// An element with its attributes and children in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attrs: Vec<XmlAttr>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Local part of the element name (`p` for `w:p`).
    #[inline]
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Namespace prefix of the element name, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.name.rfind(':').map(|i| &self.name[..i])
    }

    /// Qualify `local` with this element's prefix.
    pub fn qualified(&self, local: &str) -> String {
        match self.prefix() {
            Some(p) => format!("{}:{}", p, local),
            None => local.to_string(),
        }
    }

    /// Look up an attribute value.
    ///
    /// A `name` with a prefix must match exactly; a bare name matches on the
    /// local part, so `attr("val")` finds `w:val`.
    pub fn attr(&self, name: &str) -> Option<String> {
        self.find_attr(name).map(|a| a.value())
    }

    fn find_attr(&self, name: &str) -> Option<&XmlAttr> {
        if name.contains(':') {
            self.attrs.iter().find(|a| a.name == name)
        } else {
            self.attrs.iter().find(|a| a.local_name() == name)
        }
    }

    /// Set an attribute, replacing an existing one with the same qualified name.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(a) => a.raw_value = escape_xml(value),
            None => self.attrs.push(XmlAttr::new(name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<XmlAttr> {
        let idx = self.attrs.iter().position(|a| a.name == name)?;
        Some(self.attrs.remove(idx))
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Child elements in order.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(XmlNode::as_element_mut)
    }

    /// First child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.local_name() == local)
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|e| e.local_name() == local)
    }

    /// Index into `children` of the first element with the given local name.
    pub fn child_index(&self, local: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|n| n.as_element().is_some_and(|e| e.local_name() == local))
    }

    /// Remove every child element with the given local name. Returns how many went.
    pub fn remove_children(&mut self, local: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|n| !n.as_element().is_some_and(|e| e.local_name() == local));
        before - self.children.len()
    }

    /// Concatenated character data of all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(t) | XmlNode::CData(t) => out.push_str(t),
                XmlNode::Element(e) => e.collect_text(out),
                _ => {},
            }
        }
    }

    /// Serialize this element and its subtree.
    pub fn write_to(&self, out: &mut String) {
        self.write_open(out, self.children.is_empty());
        if self.children.is_empty() {
            return;
        }
        for child in &self.children {
            child.write_to(out);
        }
        self.write_close(out);
    }

    /// Write the start tag, or an empty-element tag when `empty` is set.
    pub fn write_open(&self, out: &mut String, empty: bool) {
        out.push('<');
        out.push_str(&self.name);
        for attr in &self.attrs {
            let quote = if attr.raw_value.contains('"') { '\'' } else { '"' };
            let _ = write!(out, " {}={}{}{}", attr.name, quote, attr.raw_value, quote);
        }
        out.push_str(if empty { "/>" } else { ">" });
    }

    pub fn write_close(&self, out: &mut String) {
        let _ = write!(out, "</{}>", self.name);
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    fn from_start(e: &BytesStart<'_>) -> Result<Self> {
        let name = utf8(e.name().as_ref())?.to_string();
        let mut attrs = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| Error::Format(format!("bad attribute in <{}>: {}", name, err)))?;
            attrs.push(XmlAttr {
                name: utf8(attr.key.as_ref())?.to_string(),
                raw_value: utf8(&attr.value)?.to_string(),
            });
        }
        Ok(Self {
            name,
            attrs,
            children: Vec::new(),
        })
    }
}

#[inline]
fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| Error::Format(format!("invalid UTF-8 in XML: {}", e)))
}

/// A parsed XML part: declaration, prolog nodes, and the root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    /// Content of the `<?xml ...?>` declaration without the delimiters
    pub declaration: Option<String>,
    /// Comments, processing instructions and doctype before the root
    pub prolog: Vec<XmlNode>,
    pub root: XmlElement,
    /// Nodes after the root element
    pub epilog: Vec<XmlNode>,
}

impl XmlDocument {
    /// Parse a complete XML part.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();
        let mut declaration = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut stack: Vec<XmlElement> = Vec::new();

        loop {
            let event = reader.read_event_into(&mut buf).map_err(|e| {
                Error::Format(format!(
                    "XML parse error at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            })?;
            match event {
                Event::Decl(d) => {
                    declaration = Some(utf8(d.as_ref())?.trim().to_string());
                },
                Event::Start(e) => {
                    if root.is_some() {
                        return Err(Error::Format("content after the root element".to_string()));
                    }
                    if stack.len() >= MAX_XML_DEPTH {
                        return Err(Error::Structural(format!(
                            "XML nesting exceeds {} levels",
                            MAX_XML_DEPTH
                        )));
                    }
                    stack.push(XmlElement::from_start(&e)?);
                },
                Event::Empty(e) => {
                    let element = XmlElement::from_start(&e)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Element(element)),
                        None if root.is_none() => root = Some(element),
                        None => return Err(Error::Format("multiple root elements".to_string())),
                    }
                },
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::Format("unbalanced end tag".to_string()))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Element(element)),
                        None => root = Some(element),
                    }
                },
                Event::Text(t) => {
                    let text = unescape_xml(utf8(&t)?).into_owned();
                    push_node(&mut stack, root.is_some(), &mut prolog, &mut epilog, XmlNode::Text(text), true);
                },
                Event::GeneralRef(r) => {
                    let name = utf8(&r)?;
                    let node = match resolve_entity(name) {
                        Some(c) => XmlNode::Text(c.to_string()),
                        None => XmlNode::EntityRef(name.to_string()),
                    };
                    push_node(&mut stack, root.is_some(), &mut prolog, &mut epilog, node, true);
                },
                Event::CData(t) => {
                    let text = utf8(&t)?.to_string();
                    push_node(&mut stack, root.is_some(), &mut prolog, &mut epilog, XmlNode::CData(text), false);
                },
                Event::Comment(t) => {
                    let text = utf8(&t)?.to_string();
                    push_node(&mut stack, root.is_some(), &mut prolog, &mut epilog, XmlNode::Comment(text), false);
                },
                Event::PI(p) => {
                    let raw = format!("<?{}?>", utf8(&p)?);
                    push_node(&mut stack, root.is_some(), &mut prolog, &mut epilog, XmlNode::Raw(raw), false);
                },
                Event::DocType(t) => {
                    prolog.push(XmlNode::Raw(format!("<!DOCTYPE {}>", utf8(t.as_ref())?)));
                },
                Event::Eof => break,
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(Error::Format("unexpected end of XML: unclosed elements".to_string()));
        }
        let root = root.ok_or_else(|| Error::Format("XML part has no root element".to_string()))?;
        Ok(Self {
            declaration,
            prolog,
            root,
            epilog,
        })
    }

    /// Serialize the document back to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string_with(|root, out| root.write_to(out)).into_bytes()
    }

    /// Serialize with a custom writer for the root element.
    pub fn to_string_with(&self, write_root: impl FnOnce(&XmlElement, &mut String)) -> String {
        let mut out = String::new();
        if let Some(decl) = &self.declaration {
            let _ = write!(out, "<?{}?>", decl);
            // Word writes a line break after the declaration
            out.push_str("\r\n");
        }
        for node in &self.prolog {
            node.write_to(&mut out);
        }
        write_root(&self.root, &mut out);
        for node in &self.epilog {
            node.write_to(&mut out);
        }
        out
    }
}

/// Attach a node to the open element, or to the prolog/epilog at top level.
///
/// Character data outside the root element is whitespace by construction
/// and is dropped; the declaration writer supplies its own line break.
fn push_node(
    stack: &mut [XmlElement],
    after_root: bool,
    prolog: &mut Vec<XmlNode>,
    epilog: &mut Vec<XmlNode>,
    node: XmlNode,
    merge_text: bool,
) {
    if let Some(parent) = stack.last_mut() {
        if merge_text
            && let XmlNode::Text(new) = &node
            && let Some(XmlNode::Text(prev)) = parent.children.last_mut()
        {
            prev.push_str(new);
            return;
        }
        parent.children.push(node);
        return;
    }
    if matches!(node, XmlNode::Text(_)) {
        return;
    }
    if after_root {
        epilog.push(node);
    } else {
        prolog.push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="urn:w"><!-- note --><w:body><w:p><w:r><w:t xml:space="preserve"> a &amp; b &#x4E2D; </w:t></w:r></w:p><w:sectPr w:rsidR="00A1"/></w:body></w:document>"#;

    #[test]
    fn test_parse_structure() {
        let doc = XmlDocument::parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(
            doc.declaration.as_deref(),
            Some(r#"xml version="1.0" encoding="UTF-8" standalone="yes""#)
        );
        assert_eq!(doc.root.local_name(), "document");
        let body = doc.root.child("body").unwrap();
        assert_eq!(body.elements().count(), 2);
        assert_eq!(body.text(), " a & b 中 ");
        assert_eq!(body.child("sectPr").unwrap().attr("rsidR").as_deref(), Some("00A1"));
    }

    #[test]
    fn test_roundtrip_is_stable() {
        let doc = XmlDocument::parse(SAMPLE.as_bytes()).unwrap();
        let once = doc.to_bytes();
        let again = XmlDocument::parse(&once).unwrap();
        assert_eq!(doc, again);
        assert_eq!(once, again.to_bytes());
    }

    #[test]
    fn test_unknown_entity_preserved() {
        let mut el = XmlElement::new("a");
        el.children.push(XmlNode::EntityRef("custom".into()));
        assert_eq!(el.to_xml(), "<a>&custom;</a>");
    }

    #[test]
    fn test_attr_lookup_by_local_name() {
        let el = XmlElement::new("w:b").with_attr("w:val", "0");
        assert_eq!(el.attr("val").as_deref(), Some("0"));
        assert_eq!(el.attr("w:val").as_deref(), Some("0"));
        assert_eq!(el.attr("x:val"), None);
        assert_eq!(el.qualified("i"), "w:i");
    }

    #[test]
    fn test_attr_escaping() {
        let el = XmlElement::new("x").with_attr("v", "a<\"b\">");
        let xml = el.to_xml();
        let parsed = XmlDocument::parse(xml.as_bytes()).unwrap();
        assert_eq!(parsed.root.attr("v").as_deref(), Some("a<\"b\">"));
    }

    #[test]
    fn test_depth_limit() {
        let mut xml = String::new();
        for _ in 0..=MAX_XML_DEPTH {
            xml.push_str("<a>");
        }
        for _ in 0..=MAX_XML_DEPTH {
            xml.push_str("</a>");
        }
        assert!(matches!(XmlDocument::parse(xml.as_bytes()), Err(Error::Structural(_))));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(XmlDocument::parse(b"<a><b></a>").is_err());
        assert!(XmlDocument::parse(b"").is_err());
    }
}
