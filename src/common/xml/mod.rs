//! XML helpers: entity escaping and an owned, order-preserving element tree.

pub mod escape;
pub mod node;

pub use escape::{escape_xml, resolve_entity, unescape_xml};
pub use node::{MAX_XML_DEPTH, XmlAttr, XmlDocument, XmlElement, XmlNode};
