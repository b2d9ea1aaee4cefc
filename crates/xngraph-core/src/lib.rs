//! xngraph Core - XN parsing and link topology for XMOS networks
//!
//! This crate provides the pieces needed to turn an XN platform description
//! into a directed graph of nodes and links:
//! - Namespace-aware XML document loading
//! - Frequency and link label normalization
//! - Node and link extraction into a topology graph
//! - DOT rendering of the resulting graph
//! - Extraction of the embedded XN section from `.xe` binaries

pub mod container;
pub mod document;
pub mod dot;
pub mod error;
pub mod frequency;
pub mod link;
pub mod node;
pub mod topology;
pub mod xn;

pub use document::Element;
pub use dot::render_dot;
pub use error::XnError;
pub use frequency::parse_frequency;
pub use link::{channel_for_label, DeclaredLink, Endpoint, LinkLabel};
pub use node::Node;
pub use topology::{Edge, LinkAttributes, TopologyGraph};
pub use xn::{ReaderOptions, XnReader, XN_NAMESPACE};
