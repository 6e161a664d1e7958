/// The in-memory OPC package.
///
/// OpcPackage keeps every member of the container, the content type map, and
/// the package-level relationships. Parts are addressed by PackURI and can be
/// replaced in place; serialization writes all members back in their original
/// order.
use std::io::{Read, Seek};
use std::path::Path;

use smallvec::SmallVec;
use zip::ZipArchive;

use crate::ooxml::opc::constants::{DEFAULT_MAIN_PART, REQUIRED_MEMBERS, relationship_type};
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::phys_pkg::{Compression, Member, PhysPkgReader, PhysPkgWriter};
use crate::ooxml::opc::pkgreader::{ContentTypeMap, SerializedRelationship, parse_rels_xml};

pub struct OpcPackage {
    members: Vec<Member>,
    content_types: ContentTypeMap,
    pkg_rels: SmallVec<[SerializedRelationship; 8]>,
}

impl OpcPackage {
    /// Open an OPC package from a file.
    ///
    /// # Example
    /// ```no_run
    /// use docsplice::ooxml::opc::OpcPackage;
    ///
    /// let pkg = OpcPackage::open("report.docx").unwrap();
    /// println!("{}", pkg.main_document_partname().unwrap());
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OpcError::PackageNotFound(path.display().to_string()));
        }
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Load an OPC package from the bytes of a ZIP archive.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let members = PhysPkgReader::read_members(data)?;

        let content_types_xml = find_member(&members, CONTENT_TYPES_URI.trim_start_matches('/'))
            .ok_or_else(|| OpcError::PartNotFound("[Content_Types].xml".to_string()))?;
        let content_types = ContentTypeMap::from_xml(&content_types_xml.data)?;

        let package_uri = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        let pkg_rels = match find_member(&members, package_uri.rels_uri().membername()) {
            Some(m) => parse_rels_xml(&m.data, package_uri.base_uri())?,
            None => SmallVec::new(),
        };

        Ok(Self {
            members,
            content_types,
            pkg_rels,
        })
    }

    /// Package-level relationships from `_rels/.rels`.
    pub fn pkg_rels(&self) -> &[SerializedRelationship] {
        &self.pkg_rels
    }

    pub fn content_type(&self, partname: &PackURI) -> Result<&str> {
        self.content_types.get(partname)
    }

    /// Partname of the main document, found through the `officeDocument`
    /// relationship. Falls back to `/word/document.xml` when the package
    /// relationships do not name it.
    pub fn main_document_partname(&self) -> Result<PackURI> {
        let rel = self.pkg_rels.iter().find(|r| {
            !r.is_external()
                && (r.reltype == relationship_type::OFFICE_DOCUMENT
                    || r.reltype == relationship_type::OFFICE_DOCUMENT_STRICT)
        });
        match rel {
            Some(rel) => rel.target_partname(),
            None => PackURI::new(DEFAULT_MAIN_PART).map_err(OpcError::InvalidPackUri),
        }
    }

    pub fn contains(&self, partname: &PackURI) -> bool {
        find_member(&self.members, partname.membername()).is_some()
    }

    /// Bytes of a part.
    pub fn part_data(&self, partname: &PackURI) -> Result<&[u8]> {
        find_member(&self.members, partname.membername())
            .map(|m| m.data.as_slice())
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Replace the bytes of an existing part, keeping its position and compression.
    pub fn set_part_data(&mut self, partname: &PackURI, data: Vec<u8>) -> Result<()> {
        let name = partname.membername();
        let member = self
            .members
            .iter_mut()
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))?;
        member.data = data;
        Ok(())
    }

    /// Member names in archive order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.name.as_str())
    }

    /// Serialize the package to ZIP bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = PhysPkgWriter::new();
        for member in &self.members {
            writer.write(member)?;
        }
        writer.finish()
    }
}

fn find_member<'a>(members: &'a [Member], name: &str) -> Option<&'a Member> {
    members.iter().find(|m| !m.is_dir && m.name.eq_ignore_ascii_case(name))
}

/// Check that `reader` holds a ZIP archive containing the members every
/// WordprocessingML package needs. Returns the first missing member name.
///
/// Only the central directory is read; no member is decompressed.
pub fn missing_required_member<R: Read + Seek>(reader: R) -> Result<Option<&'static str>> {
    let archive = ZipArchive::new(reader)?;
    Ok(REQUIRED_MEMBERS
        .iter()
        .find(|req| !archive.file_names().any(|name| name.eq_ignore_ascii_case(req)))
        .copied())
}

/// Build a package from scratch; used by tests and fixtures.
pub fn build_package(parts: &[(&str, &[u8])]) -> Result<Vec<u8>> {
    let mut writer = PhysPkgWriter::new();
    for (name, data) in parts {
        writer.write(&Member {
            name: name.to_string(),
            data: data.to_vec(),
            compression: Compression::Deflated,
            is_dir: false,
            last_modified: None,
        })?;
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CT: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/main.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;
    const RELS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/main.xml"/></Relationships>"#;

    #[test]
    fn test_main_part_from_relationship() {
        let bytes = build_package(&[
            ("[Content_Types].xml", CT),
            ("_rels/.rels", RELS),
            ("word/main.xml", b"<w:document/>"),
        ])
        .unwrap();
        let pkg = OpcPackage::from_bytes(&bytes).unwrap();
        let main = pkg.main_document_partname().unwrap();
        assert_eq!(main.as_str(), "/word/main.xml");
        assert!(pkg.content_type(&main).unwrap().ends_with("document.main+xml"));
        assert_eq!(pkg.part_data(&main).unwrap(), b"<w:document/>");
    }

    #[test]
    fn test_fallback_main_part() {
        let bytes = build_package(&[("[Content_Types].xml", CT), ("word/document.xml", b"<x/>")]).unwrap();
        let pkg = OpcPackage::from_bytes(&bytes).unwrap();
        assert_eq!(pkg.main_document_partname().unwrap().as_str(), DEFAULT_MAIN_PART);
    }

    #[test]
    fn test_set_part_and_reserialize() {
        let bytes = build_package(&[
            ("[Content_Types].xml", CT),
            ("_rels/.rels", RELS),
            ("word/main.xml", b"<old/>"),
            ("docProps/app.xml", b"<app/>"),
        ])
        .unwrap();
        let mut pkg = OpcPackage::from_bytes(&bytes).unwrap();
        let main = pkg.main_document_partname().unwrap();
        pkg.set_part_data(&main, b"<new/>".to_vec()).unwrap();

        let again = OpcPackage::from_bytes(&pkg.to_bytes().unwrap()).unwrap();
        assert_eq!(again.part_data(&main).unwrap(), b"<new/>");
        let names: Vec<_> = again.member_names().collect();
        assert_eq!(names, ["[Content_Types].xml", "_rels/.rels", "word/main.xml", "docProps/app.xml"]);
    }

    #[test]
    fn test_missing_content_types() {
        let bytes = build_package(&[("word/document.xml", b"<x/>")]).unwrap();
        assert!(matches!(OpcPackage::from_bytes(&bytes), Err(OpcError::PartNotFound(_))));
        assert_eq!(
            missing_required_member(std::io::Cursor::new(&bytes)).unwrap(),
            Some("[Content_Types].xml")
        );
    }
}
