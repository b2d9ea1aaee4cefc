//! Errors raised while loading an XN document and building its topology

use quick_xml::events::attributes::AttrError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum XnError {
    #[error("Invalid namespace, expected root {{{expected}}}Network but found {found}")]
    InvalidNamespace { expected: String, found: String },
    #[error("Malformed frequency: {0:?}")]
    MalformedFrequency(String),
    #[error("Unknown link label: {0:?}")]
    UnknownLinkLabel(String),
    #[error("Link must have exactly two LinkEndpoint elements, found {found}")]
    MissingEndpoints { found: usize },
    #[error("<{element}> is missing required attribute {attribute:?}")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },
    #[error("Malformed tile reference: {0:?}")]
    MalformedTileReference(String),
    #[error("Link endpoint refers to undeclared node {0:?}")]
    UnknownNode(String),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Invalid XML attribute: {0}")]
    Attribute(#[from] AttrError),
    #[error("Document has no root element")]
    EmptyDocument,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to extract XN from container: {0}")]
    Container(String),
}
