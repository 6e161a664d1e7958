//! Parsing of the package-level metadata parts: `[Content_Types].xml`
//! and relationship (`.rels`) parts.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::common::xml::XmlDocument;
use crate::ooxml::opc::constants::target_mode;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;

/// A relationship read from a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedRelationship {
    /// Directory of the source part, used to resolve relative targets
    pub base_uri: String,
    pub r_id: String,
    pub reltype: String,
    pub target_ref: String,
    pub target_mode: String,
}

impl SerializedRelationship {
    #[inline]
    pub fn is_external(&self) -> bool {
        self.target_mode == target_mode::EXTERNAL
    }

    /// Absolute partname of the target. Only valid for internal relationships.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external() {
            return Err(OpcError::InvalidPackUri(format!(
                "relationship {} targets an external resource",
                self.r_id
            )));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref).map_err(OpcError::InvalidPackUri)
    }
}

/// Parse a relationships part.
pub fn parse_rels_xml(rels_xml: &[u8], base_uri: &str) -> Result<SmallVec<[SerializedRelationship; 8]>> {
    let doc = XmlDocument::parse(rels_xml).map_err(|e| OpcError::XmlError(format!("Rels parse error: {}", e)))?;
    let mut srels = SmallVec::new();

    for rel in doc.root.elements().filter(|e| e.local_name() == "Relationship") {
        if let (Some(r_id), Some(reltype), Some(target_ref)) = (rel.attr("Id"), rel.attr("Type"), rel.attr("Target")) {
            srels.push(SerializedRelationship {
                base_uri: base_uri.to_string(),
                r_id,
                reltype,
                target_ref,
                target_mode: rel
                    .attr("TargetMode")
                    .unwrap_or_else(|| target_mode::INTERNAL.to_string()),
            });
        }
    }

    Ok(srels)
}

/// Content types declared by `[Content_Types].xml`.
#[derive(Debug, Clone, Default)]
pub struct ContentTypeMap {
    /// Maps lowercase file extensions to default content types
    defaults: HashMap<String, String>,
    /// Maps partnames (compared case-insensitively) to override content types
    overrides: HashMap<String, String>,
}

impl ContentTypeMap {
    /// Parse content types from `[Content_Types].xml`.
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let doc =
            XmlDocument::parse(xml).map_err(|e| OpcError::XmlError(format!("Content types parse error: {}", e)))?;
        let mut map = Self::default();

        for e in doc.root.elements() {
            match e.local_name() {
                "Default" => {
                    if let (Some(ext), Some(ct)) = (e.attr("Extension"), e.attr("ContentType")) {
                        map.defaults.insert(ext.to_ascii_lowercase(), ct);
                    }
                },
                "Override" => {
                    if let (Some(pn), Some(ct)) = (e.attr("PartName"), e.attr("ContentType")) {
                        map.overrides.insert(pn.to_ascii_lowercase(), ct);
                    }
                },
                _ => {},
            }
        }

        Ok(map)
    }

    /// Content type for a partname: an override first, then the extension default.
    pub fn get(&self, pack_uri: &PackURI) -> Result<&str> {
        if let Some(ct) = self.overrides.get(&pack_uri.as_str().to_ascii_lowercase()) {
            return Ok(ct.as_str());
        }
        if let Some(ct) = self.defaults.get(&pack_uri.ext().to_ascii_lowercase()) {
            return Ok(ct.as_str());
        }
        Err(OpcError::ContentTypeNotFound(pack_uri.to_string()))
    }
}
