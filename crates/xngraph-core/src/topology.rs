//! Topology graph of XN nodes and the directed edges between them

use serde::Serialize;
use std::collections::HashMap;

use crate::node::Node;

/// Per-direction link properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkAttributes {
    /// Link encoding (`2` or `5` wire), first character of the declared value
    pub encoding: char,
    /// Delay in clock cycles with the `clk` suffix stripped, if declared
    pub delay: Option<String>,
}

/// One direction of a physical link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    /// Source node ID
    pub src: String,
    /// Destination node ID
    pub dst: String,
    /// Channel index of the link at the source node
    pub channel: u8,
    pub attributes: LinkAttributes,
}

/// Nodes keyed by ID plus the ordered list of directed edges
#[derive(Debug, Clone, Default, Serialize)]
pub struct TopologyGraph {
    /// Nodes in declaration order
    nodes: Vec<Node>,
    /// Node ID to position in `nodes`
    #[serde(skip)]
    index: HashMap<String, usize>,
    /// Edges in declaration order, both directions of a link adjacent
    edges: Vec<Edge>,
}

impl TopologyGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. A node with an ID already present replaces the old one in place.
    pub fn insert_node(&mut self, node: Node) {
        match self.index.get(&node.id) {
            Some(&pos) => self.nodes[pos] = node,
            None => {
                self.index.insert(node.id.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    /// Append an edge
    pub fn push_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Check whether a node ID is present
    pub fn contains_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Get a node by ID
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&pos| &self.nodes[pos])
    }

    /// All nodes in declaration order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// All edges in declaration order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Serialize the graph as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
