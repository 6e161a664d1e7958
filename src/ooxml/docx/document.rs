/// Document - the main document part as an editable tree.
use crate::common::xml::{XmlDocument, XmlElement, XmlNode};
use crate::ooxml::docx::paragraph::Block;
use crate::ooxml::docx::statistics::DocumentStatistics;
use crate::ooxml::docx::table::Table;
use crate::ooxml::error::{OoxmlError, Result};

/// Top-level children of `w:body`, in body order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyItem {
    Block(Block),
    Table(Table),
    /// Section properties, content controls, and anything else
    Other(XmlNode),
}

/// A Word document body.
///
/// Parsing splits `w:body` into paragraphs, tables, and opaque nodes; the
/// rest of the part (declaration, root attributes, namespace declarations,
/// `w:background`) is kept and written back unchanged.
///
/// # Examples
///
/// ```rust
/// use docsplice::ooxml::docx::Document;
///
/// let xml = br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Hi</w:t></w:r></w:p></w:body></w:document>"#;
/// let doc = Document::parse(xml)?;
/// assert_eq!(doc.text(), "Hi");
/// # Ok::<(), docsplice::ooxml::error::OoxmlError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The part with the body's children moved into `content`
    xml: XmlDocument,
    /// Index of `w:body` within the root's children
    body_index: usize,
    content: Vec<BodyItem>,
}

impl Document {
    /// Parse the main document part.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut xml = XmlDocument::parse(bytes)?;
        if xml.root.local_name() != "document" {
            return Err(OoxmlError::InvalidFormat(format!(
                "main part root is <{}>, expected <w:document>",
                xml.root.name
            )));
        }
        let body_index = xml
            .root
            .child_index("body")
            .ok_or_else(|| OoxmlError::InvalidFormat("document has no <w:body>".to_string()))?;

        let children = match &mut xml.root.children[body_index] {
            XmlNode::Element(body) => std::mem::take(&mut body.children),
            _ => Vec::new(),
        };
        let content = children
            .into_iter()
            .map(|child| match child {
                XmlNode::Element(e) if e.local_name() == "p" => BodyItem::Block(Block::from_element(e)),
                XmlNode::Element(e) if e.local_name() == "tbl" => BodyItem::Table(Table::from_element(e)),
                other => BodyItem::Other(other),
            })
            .collect();

        Ok(Self {
            xml,
            body_index,
            content,
        })
    }

    #[inline]
    pub fn content(&self) -> &[BodyItem] {
        &self.content
    }

    #[inline]
    pub fn content_mut(&mut self) -> &mut [BodyItem] {
        &mut self.content
    }

    /// Top-level paragraphs.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.content.iter().filter_map(|i| match i {
            BodyItem::Block(b) => Some(b),
            _ => None,
        })
    }

    /// Top-level tables.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.content.iter().filter_map(|i| match i {
            BodyItem::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Text of the top-level paragraphs, one per line.
    pub fn text(&self) -> String {
        self.blocks().map(|b| b.text()).collect::<Vec<_>>().join("\n")
    }

    /// Every paragraph in body order, descending into tables pre-order.
    pub fn all_blocks(&self) -> Vec<&Block> {
        fn visit_table<'a>(table: &'a Table, out: &mut Vec<&'a Block>) {
            for cell in table.rows().flat_map(|r| r.cells()) {
                out.extend(cell.blocks());
                for nested in cell.tables() {
                    visit_table(nested, out);
                }
            }
        }

        let mut out = Vec::new();
        for item in &self.content {
            match item {
                BodyItem::Block(b) => out.push(b),
                BodyItem::Table(t) => visit_table(t, &mut out),
                BodyItem::Other(_) => {},
            }
        }
        out
    }

    /// Paragraph, table, cell, word and character counts.
    pub fn statistics(&self) -> DocumentStatistics {
        fn visit_table(table: &Table, stats: &mut DocumentStatistics) {
            stats.add_table();
            for cell in table.rows().flat_map(|r| r.cells()) {
                stats.add_cells(1);
                for block in cell.blocks() {
                    stats.add_paragraph(&block.text());
                }
                for nested in cell.tables() {
                    visit_table(nested, stats);
                }
            }
        }

        let mut stats = DocumentStatistics::new();
        for item in &self.content {
            match item {
                BodyItem::Block(b) => stats.add_paragraph(&b.text()),
                BodyItem::Table(t) => visit_table(t, &mut stats),
                BodyItem::Other(_) => {},
            }
        }
        stats
    }

    /// Serialize the part.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.xml
            .to_string_with(|root, out| {
                root.write_open(out, false);
                for (idx, child) in root.children.iter().enumerate() {
                    match child {
                        XmlNode::Element(body) if idx == self.body_index => self.write_body(body, out),
                        other => other.write_to(out),
                    }
                }
                root.write_close(out);
            })
            .into_bytes()
    }

    fn write_body(&self, body: &XmlElement, out: &mut String) {
        body.write_open(out, self.content.is_empty());
        if self.content.is_empty() {
            return;
        }
        for item in &self.content {
            match item {
                BodyItem::Block(b) => b.write_to(out),
                BodyItem::Table(t) => t.write_to(out),
                BodyItem::Other(node) => node.write_to(out),
            }
        }
        body.write_close(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" mc:Ignorable="w14"><w:body><w:p><w:r><w:t>Intro text</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:p><w:r><w:t>a b</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:p><w:r><w:t>deep</w:t></w:r></w:p></w:tc><w:tc><w:p/></w:tc></w:tr></w:tbl></w:tc></w:tr></w:tbl><w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr></w:body></w:document>"#;

    #[test]
    fn test_parse_body() {
        let doc = Document::parse(DOC.as_bytes()).unwrap();
        assert_eq!(doc.content().len(), 3);
        assert_eq!(doc.blocks().count(), 1);
        assert_eq!(doc.tables().count(), 1);
        assert_eq!(doc.text(), "Intro text");
        let texts: Vec<String> = doc.all_blocks().iter().map(|b| b.text()).collect();
        assert_eq!(texts, ["Intro text", "a b", "deep", ""]);
    }

    #[test]
    fn test_statistics() {
        let stats = Document::parse(DOC.as_bytes()).unwrap().statistics();
        assert_eq!(stats.paragraph_count(), 4);
        assert_eq!(stats.table_count(), 2);
        assert_eq!(stats.cell_count(), 3);
        assert_eq!(stats.word_count(), 5);
    }

    #[test]
    fn test_roundtrip() {
        let doc = Document::parse(DOC.as_bytes()).unwrap();
        let bytes = doc.to_bytes();
        let again = Document::parse(&bytes).unwrap();
        assert_eq!(doc, again);
        assert_eq!(bytes, again.to_bytes());
        assert!(String::from_utf8(bytes).unwrap().contains("<w:pgSz w:w=\"12240\" w:h=\"15840\"/>"));
    }

    #[test]
    fn test_rejects_non_document_root() {
        assert!(matches!(
            Document::parse(b"<w:styles/>"),
            Err(OoxmlError::InvalidFormat(_))
        ));
        assert!(matches!(
            Document::parse(b"<w:document></w:document>"),
            Err(OoxmlError::InvalidFormat(_))
        ));
    }
}
