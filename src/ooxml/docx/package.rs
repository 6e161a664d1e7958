/// Package implementation for Word documents.
use std::path::Path;

use log::debug;

use crate::common::fs::write_atomic;
use crate::ooxml::docx::document::Document;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::{OpcPackage, PackURI};

/// A Word (.docx) package.
///
/// This is the main entry point for working with Word documents. It wraps
/// an OPC package and keeps the main document part parsed and editable;
/// every other member is carried through untouched.
///
/// # Examples
///
/// ```rust,no_run
/// use docsplice::ooxml::docx::Package;
///
/// let mut pkg = Package::open("document.docx")?;
/// println!("{}", pkg.document().text());
/// pkg.save("copy.docx")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Package {
    opc: OpcPackage,
    main_part: PackURI,
    document: Document,
}

impl Package {
    /// Open a .docx package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let opc = OpcPackage::open(path)?;
        Self::from_opc(opc)
    }

    /// Load a .docx package from the bytes of the file.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let opc = OpcPackage::from_bytes(data)?;
        Self::from_opc(opc)
    }

    fn from_opc(opc: OpcPackage) -> Result<Self> {
        let main_part = opc.main_document_partname()?;
        if !opc.contains(&main_part) {
            return Err(OoxmlError::PartNotFound(format!("main document part {}", main_part)));
        }

        // Verify it's a Word document by checking the main part's content type
        let content_type = opc.content_type(&main_part)?;
        if !ct::WML_MAIN_PARTS.iter().any(|m| *m == content_type) {
            return Err(OoxmlError::InvalidContentType {
                expected: ct::WML_DOCUMENT_MAIN.to_string(),
                got: content_type.to_string(),
            });
        }

        let document = Document::parse(opc.part_data(&main_part)?)?;
        debug!("loaded main part {} ({} body items)", main_part, document.content().len());
        Ok(Self {
            opc,
            main_part,
            document,
        })
    }

    #[inline]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[inline]
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Partname of the main document part.
    #[inline]
    pub fn main_part(&self) -> &PackURI {
        &self.main_part
    }

    /// Serialize the package with the current document tree.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let xml = self.document.to_bytes();
        self.opc.set_part_data(&self.main_part, xml)?;
        Ok(self.opc.to_bytes()?)
    }

    /// Write the package to `path`, replacing any existing file atomically.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        write_atomic(path.as_ref(), &bytes)?;
        Ok(())
    }
}
