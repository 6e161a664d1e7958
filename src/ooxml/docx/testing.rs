//! Fixture builders for tests: minimal but complete .docx packages.

use crate::common::xml::escape_xml;
use crate::ooxml::opc::build_package;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#;

const APP_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>docsplice-tests</Application></Properties>"#;

/// A `w:document` part wrapping `body_xml`.
pub fn document_xml(body_xml: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}"><w:body>{}<w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr></w:body></w:document>"#,
        W_NS, body_xml
    )
}

/// A run with the given half-point size, so each run is distinguishable.
pub fn run_xml(text: &str, size: u32) -> String {
    format!(
        r#"<w:r><w:rPr><w:sz w:val="{}"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
        size,
        escape_xml(text)
    )
}

/// A paragraph with one run per entry; run `i` has size `20 + 2 * i`.
pub fn paragraph_xml(runs: &[&str]) -> String {
    let mut xml = String::from("<w:p>");
    for (i, text) in runs.iter().enumerate() {
        xml.push_str(&run_xml(text, 20 + 2 * i as u32));
    }
    xml.push_str("</w:p>");
    xml
}

/// A table nested `depth` levels deep; the innermost cell holds `inner_xml`
/// and every level's cell starts with a paragraph naming its level.
pub fn nested_table_xml(depth: usize, inner_xml: &str) -> String {
    let mut xml = inner_xml.to_string();
    for level in (1..=depth).rev() {
        xml = format!(
            "<w:tbl><w:tr><w:tc>{}{}</w:tc></w:tr></w:tbl>",
            paragraph_xml(&[&format!("level {}", level)]),
            xml
        );
    }
    xml
}

/// Complete .docx bytes whose body is `body_xml`.
pub fn docx_bytes(body_xml: &str) -> Vec<u8> {
    let document = document_xml(body_xml);
    build_package(&[
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS.as_bytes()),
        ("word/document.xml", document.as_bytes()),
        ("docProps/app.xml", APP_XML.as_bytes()),
    ])
    .unwrap_or_default()
}
