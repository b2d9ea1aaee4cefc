//! Link label resolution and link extraction
//!
//! A `Link` in an XN file is declared once with two `LinkEndpoint`s but
//! each direction carries its own delay, so every physical link becomes two
//! directed edges.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use tracing::debug;

use crate::document::Element;
use crate::error::XnError;
use crate::topology::{Edge, LinkAttributes, TopologyGraph};
use crate::xn::XN_NAMESPACE;

/// Encoding used when a link does not declare one
pub const DEFAULT_ENCODING: char = '2';

/// Physical link letter on a node
///
/// The letter to channel assignment follows the chip's pin wiring and is
/// deliberately not sequential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkLabel {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl LinkLabel {
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            'E' => Some(Self::E),
            'F' => Some(Self::F),
            'G' => Some(Self::G),
            'H' => Some(Self::H),
            _ => None,
        }
    }

    /// Channel index for this link
    pub fn channel(self) -> u8 {
        match self {
            Self::A => 2,
            Self::B => 3,
            Self::C => 0,
            Self::D => 1,
            Self::E => 6,
            Self::F => 7,
            Self::G => 4,
            Self::H => 5,
        }
    }
}

impl FromStr for LinkLabel {
    type Err = XnError;

    /// Parse a link name such as `XLG` or `X0LA`; only the last letter matters
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .last()
            .and_then(Self::from_letter)
            .ok_or_else(|| XnError::UnknownLinkLabel(s.to_string()))
    }
}

/// Resolve a link name to its channel index
pub fn channel_for_label(label: &str) -> Result<u8, XnError> {
    label.parse::<LinkLabel>().map(LinkLabel::channel)
}

/// One side of a declared link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub node_id: String,
    pub label: LinkLabel,
    /// Endpoint delay, falling back to the link-level delay
    pub delay: Option<String>,
}

/// A bidirectional link as declared in the XN file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredLink {
    pub endpoints: [Endpoint; 2],
    pub encoding: char,
}

impl DeclaredLink {
    /// Resolve a `Link` element with the given two endpoint elements
    pub fn from_elements(link: &Element, ends: [&Element; 2]) -> Result<Self, XnError> {
        let encoding = link
            .attribute("Encoding")
            .and_then(|e| e.chars().next())
            .unwrap_or(DEFAULT_ENCODING);
        let link_delay = link.attribute("Delays").map(strip_clk);

        let [first, second] = ends;
        Ok(Self {
            endpoints: [
                Endpoint::from_element(first, link_delay.as_deref())?,
                Endpoint::from_element(second, link_delay.as_deref())?,
            ],
            encoding,
        })
    }

    /// Split into the two directed edges, first endpoint's direction first
    pub fn into_edges(self) -> [Edge; 2] {
        let [a, b] = self.endpoints;
        let forward = Edge {
            src: a.node_id.clone(),
            dst: b.node_id.clone(),
            channel: a.label.channel(),
            attributes: LinkAttributes {
                encoding: self.encoding,
                delay: a.delay,
            },
        };
        let reverse = Edge {
            src: b.node_id,
            dst: a.node_id,
            channel: b.label.channel(),
            attributes: LinkAttributes {
                encoding: self.encoding,
                delay: b.delay,
            },
        };
        [forward, reverse]
    }
}

impl Endpoint {
    fn from_element(end: &Element, link_delay: Option<&str>) -> Result<Self, XnError> {
        Ok(Self {
            node_id: end.required_attribute("NodeId")?.to_string(),
            label: end.required_attribute("Link")?.parse()?,
            delay: end
                .attribute("Delays")
                .map(strip_clk)
                .or_else(|| link_delay.map(str::to_string)),
        })
    }
}

fn strip_clk(delay: &str) -> String {
    delay.replace("clk", "")
}

/// Add both directions of every physical link below `root` to the graph
///
/// Nodes must already be in the graph. Links touching an ID in `excluded`
/// are dropped whole.
pub fn extract_links(
    root: &Element,
    excluded: &HashSet<String>,
    graph: &mut TopologyGraph,
) -> Result<(), XnError> {
    for link in root.find_all(XN_NAMESPACE, "Link") {
        // SOD and XSCOPE links are debug transports, not part of the fabric
        if let Some(flags @ ("SOD" | "XSCOPE")) = link.attribute("Flags") {
            debug!(flags, "Skipping debug link");
            continue;
        }
        if link.attribute("direction").is_some() {
            debug!("Skipping directional link record");
            continue;
        }

        let ends: Vec<&Element> = link.child_elements(XN_NAMESPACE, "LinkEndpoint").collect();
        let &[first, second] = ends.as_slice() else {
            return Err(XnError::MissingEndpoints { found: ends.len() });
        };

        let ids = [
            first.required_attribute("NodeId")?,
            second.required_attribute("NodeId")?,
        ];
        if ids.iter().any(|id| excluded.contains(*id)) {
            debug!(src = ids[0], dst = ids[1], "Skipping link to excluded node");
            continue;
        }
        if let Some(unknown) = ids.iter().find(|id| !graph.contains_node(id)) {
            return Err(XnError::UnknownNode(unknown.to_string()));
        }

        let declared = DeclaredLink::from_elements(link, [first, second])?;
        for edge in declared.into_edges() {
            debug!(
                src = %edge.src,
                dst = %edge.dst,
                channel = edge.channel,
                "Extracted edge"
            );
            graph.push_edge(edge);
        }
    }

    Ok(())
}
