//! Node extraction
//!
//! Every `Node` declaration on the compute fabric becomes a [`Node`] record
//! with its clock frequencies resolved to Hertz and its tile reference
//! resolved to an integer.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::document::Element;
use crate::error::XnError;
use crate::frequency::parse_frequency;
use crate::topology::TopologyGraph;
use crate::xn::{ReaderOptions, XN_NAMESPACE};

pub const DEFAULT_OSCILLATOR_HZ: f64 = 20e6;
pub const DEFAULT_SYSTEM_FREQ_HZ: f64 = 400e6;
pub const DEFAULT_REFERENCE_FREQ_HZ: f64 = 100e6;

/// Node type of off-fabric devices (flash, etc.), never part of the graph
const DEVICE_TYPE: &str = "device:";
const PERIPHERAL_PREFIX: &str = "periph:";

/// A node in the topology graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node ID as declared
    pub id: String,
    pub oscillator_hz: f64,
    pub system_freq_hz: f64,
    pub reference_freq_hz: f64,
    /// Tile index from the first core reference, or the numeric node ID
    pub tile_ref: Option<u32>,
    /// Set when `tile_ref` was read from a `Core` rather than the node ID
    #[serde(default)]
    pub tile_from_core: bool,
    /// Routing ID, carried through unchanged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_id: Option<String>,
    #[serde(default)]
    pub is_peripheral: bool,
}

impl Node {
    /// A node with the default clock setup and no declared overrides
    pub fn with_defaults(id: &str) -> Self {
        Self {
            id: id.to_string(),
            oscillator_hz: DEFAULT_OSCILLATOR_HZ,
            system_freq_hz: DEFAULT_SYSTEM_FREQ_HZ,
            reference_freq_hz: DEFAULT_REFERENCE_FREQ_HZ,
            tile_ref: id.parse().ok(),
            tile_from_core: false,
            routing_id: None,
            is_peripheral: false,
        }
    }

    /// Build a node from its `Node` declaration
    ///
    /// Only the first `Core` below the node is consulted. Nodes with more
    /// than one core keep the reference of the first.
    pub fn from_element(element: &Element, tile_refs: &[&str]) -> Result<Self, XnError> {
        let id = element.required_attribute("Id")?;
        let mut node = Self::with_defaults(id);

        if let Some(value) = element.attribute("Oscillator") {
            node.oscillator_hz = parse_frequency(value)?;
        }
        if let Some(value) = element.attribute("SystemFrequency") {
            node.system_freq_hz = parse_frequency(value)?;
        }
        if let Some(value) = element.attribute("ReferenceFrequency") {
            node.reference_freq_hz = parse_frequency(value)?;
        }

        node.routing_id = element.attribute("RoutingId").map(str::to_string);
        node.is_peripheral = element
            .attribute("Type")
            .is_some_and(|t| t.starts_with(PERIPHERAL_PREFIX));

        if let Some(core) = element.find_all(XN_NAMESPACE, "Core").next() {
            let reference = match core.attribute("Reference") {
                Some(r) => r.to_string(),
                None => format!("tile[{}]", id),
            };
            node.tile_ref = Some(parse_tile_reference(&reference, tile_refs)?);
            node.tile_from_core = true;
        }

        Ok(node)
    }

    /// True when a core reference names a tile other than the node's own ID
    pub fn tile_ref_differs(&self) -> bool {
        self.tile_from_core
            && self
                .tile_ref
                .is_some_and(|tile| tile.to_string() != self.id)
    }
}

/// Extract the integer inside the first `[...]` of a core reference like `tile[2]`
pub fn parse_tile_reference(reference: &str, tile_refs: &[&str]) -> Result<u32, XnError> {
    let malformed = || XnError::MalformedTileReference(reference.to_string());

    let open = reference.find('[').ok_or_else(malformed)?;
    let close = reference[open + 1..].find(']').ok_or_else(malformed)? + open + 1;

    let prefix = reference[..open].trim();
    if !prefix.is_empty() && !tile_refs.contains(&prefix) {
        debug!(reference, prefix, "Core reference uses an unknown tile reference name");
    }

    reference[open + 1..close]
        .trim()
        .parse()
        .map_err(|_| malformed())
}

/// Add every qualifying node below `root` to the graph
///
/// Returns the IDs of `device:` nodes, which are declared but not part of
/// the compute fabric.
pub fn extract_nodes(
    root: &Element,
    options: &ReaderOptions,
    graph: &mut TopologyGraph,
) -> Result<HashSet<String>, XnError> {
    let tile_refs = options.tile_ref_names();
    let mut off_fabric = HashSet::new();

    for element in root.find_all(XN_NAMESPACE, "Node") {
        let id = element.required_attribute("Id")?;

        if options.ignore_nodes.contains(id) {
            debug!(node = id, "Ignoring node");
            continue;
        }
        if element.attribute("Type") == Some(DEVICE_TYPE) {
            debug!(node = id, "Skipping off-fabric device node");
            off_fabric.insert(id.to_string());
            continue;
        }

        let node = Node::from_element(element, &tile_refs)?;
        debug!(
            node = %node.id,
            tile = ?node.tile_ref,
            peripheral = node.is_peripheral,
            "Extracted node"
        );
        graph.insert_node(node);
    }

    Ok(off_fabric)
}
