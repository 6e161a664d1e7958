/// Constant values related to the Open Packaging Convention.
///
/// Only the content types and relationship types needed to locate and
/// validate the main WordprocessingML part are listed here.

/// Content type URIs that specify a part's format
pub mod content_type {
    pub const OPC_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";

    pub const WML_DOCUMENT_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
    pub const WML_DOCUMENT_MACRO_MAIN: &str = "application/vnd.ms-word.document.macroEnabled.main+xml";
    pub const WML_TEMPLATE_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml";
    pub const WML_TEMPLATE_MACRO_MAIN: &str = "application/vnd.ms-word.template.macroEnabledTemplate.main+xml";

    /// Content types accepted for the main document part.
    pub const WML_MAIN_PARTS: [&str; 4] = [
        WML_DOCUMENT_MAIN,
        WML_DOCUMENT_MACRO_MAIN,
        WML_TEMPLATE_MAIN,
        WML_TEMPLATE_MACRO_MAIN,
    ];
}

/// Relationship target modes
pub mod target_mode {
    pub const INTERNAL: &str = "Internal";
    pub const EXTERNAL: &str = "External";
}

/// Relationship type URIs
pub mod relationship_type {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    /// ISO/IEC 29500 strict variant
    pub const OFFICE_DOCUMENT_STRICT: &str = "http://purl.oclc.org/ooxml/officeDocument/relationships/officeDocument";
}

/// Member names every WordprocessingML package must contain.
pub const REQUIRED_MEMBERS: [&str; 3] = ["[Content_Types].xml", "_rels/.rels", "word/document.xml"];

/// Fallback location of the main document part.
pub const DEFAULT_MAIN_PART: &str = "/word/document.xml";
