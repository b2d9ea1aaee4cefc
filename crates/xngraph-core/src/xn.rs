//! XN (XMOS network description) reader
//!
//! Turns an XN document into a [`TopologyGraph`]: nodes first, then the
//! links between them. XN files may also be read out of compiled `.xe`
//! binaries, which embed the XN the program was built for.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::container::{self, DEFAULT_XESECTION};
use crate::document::Element;
use crate::error::XnError;
use crate::link::extract_links;
use crate::node::extract_nodes;
use crate::topology::TopologyGraph;

/// Namespace of every element in an XN file
pub const XN_NAMESPACE: &str = "http://www.xmos.com";

/// Tile reference names used by the XMOS tools
pub const COMMON_TILE_REFS: [&str; 3] = ["stdcore", "stdtile", "tile"];

/// Options controlling which parts of a network are read
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReaderOptions {
    /// Node IDs to leave out, along with every link touching them
    #[serde(default)]
    pub ignore_nodes: HashSet<String>,
    /// Extra tile reference names beyond [`COMMON_TILE_REFS`]
    #[serde(default)]
    pub tile_refs: Vec<String>,
}

impl ReaderOptions {
    /// Known tile reference names, built-in ones first
    pub fn tile_ref_names(&self) -> Vec<&str> {
        COMMON_TILE_REFS
            .iter()
            .copied()
            .chain(self.tile_refs.iter().map(String::as_str))
            .collect()
    }
}

/// Builds topology graphs from XN documents
#[derive(Debug, Clone)]
pub struct XnReader {
    options: ReaderOptions,
    xesection: PathBuf,
}

impl XnReader {
    pub fn new(options: ReaderOptions) -> Self {
        Self {
            options,
            xesection: PathBuf::from(DEFAULT_XESECTION),
        }
    }

    /// Use a specific `xesection` executable for `.xe` files
    pub fn with_xesection(mut self, tool: impl Into<PathBuf>) -> Self {
        self.xesection = tool.into();
        self
    }

    /// Build the topology graph from a parsed document
    pub fn read_document(&self, root: &Element) -> Result<TopologyGraph, XnError> {
        check_root(root)?;

        let mut graph = TopologyGraph::new();
        let off_fabric = extract_nodes(root, &self.options, &mut graph)?;

        let mut excluded = self.options.ignore_nodes.clone();
        excluded.extend(off_fabric);
        extract_links(root, &excluded, &mut graph)?;

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Built topology graph"
        );
        Ok(graph)
    }

    /// Build the topology graph from XN text
    pub fn read_str(&self, xml: &str) -> Result<TopologyGraph, XnError> {
        self.read_document(&Element::parse(xml)?)
    }

    /// Build the topology graph from an `.xn` file or an `.xe` binary
    pub fn read_file(&self, path: &Path) -> Result<TopologyGraph, XnError> {
        if container::is_container(path) {
            info!(path = %path.display(), "Extracting XN from binary");
            let xml = container::extract_from_container(path, &self.xesection)?;
            self.read_str(&xml)
        } else {
            self.read_document(&Element::from_file(path)?)
        }
    }
}

impl Default for XnReader {
    fn default() -> Self {
        Self::new(ReaderOptions::default())
    }
}

/// Check that the root is an XN `Network` element
pub fn check_root(root: &Element) -> Result<(), XnError> {
    if root.is(XN_NAMESPACE, "Network") {
        Ok(())
    } else {
        Err(XnError::InvalidNamespace {
            expected: XN_NAMESPACE.to_string(),
            found: root.qualified_name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Network xmlns="http://www.xmos.com"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
         xsi:schemaLocation="http://www.xmos.com http://www.xmos.com">
  <Type>Board</Type>
  <Declarations>
    <Declaration>core stdcore[2]</Declaration>
  </Declarations>
  <Packages>
    <Package id="P0" Type="XS1-G4B-FB512">
      <Nodes>
        <Node Id="0" Type="XS1-G4B" Oscillator="25MHz" SystemFrequency="500MHz" RoutingId="0x8000">
          <Core Number="0" Reference="stdcore[0]"/>
        </Node>
        <Node Id="1" Type="XS1-G4B" ReferenceFrequency="100 MHz">
          <Core Number="0" Reference="stdcore[1]"/>
        </Node>
        <Node Id="usb" Type="periph:XS1-SU" Oscillator="24MHz"/>
        <Node Id="flash" Type="device:"/>
      </Nodes>
    </Package>
  </Packages>
  <Links>
    <Link Encoding="5wire" Delays="4clk">
      <LinkEndpoint NodeId="0" Link="X0LA"/>
      <LinkEndpoint NodeId="1" Link="X0LB" Delays="2clk"/>
    </Link>
    <Link Encoding="2wire">
      <LinkEndpoint NodeId="1" Link="XLG"/>
      <LinkEndpoint NodeId="usb" Link="XLC"/>
    </Link>
    <Link Flags="XSCOPE">
      <LinkEndpoint NodeId="0" Link="XLZ"/>
      <LinkEndpoint RoutingId="0x8000" Chanend="1"/>
    </Link>
    <Link direction="out">
      <LinkEndpoint NodeId="0" Link="XLA"/>
      <LinkEndpoint NodeId="1" Link="XLB"/>
    </Link>
    <Link>
      <LinkEndpoint NodeId="0" Link="XLH"/>
      <LinkEndpoint NodeId="flash" Link="XLE"/>
    </Link>
  </Links>
</Network>"#;

    #[test]
    fn test_read_board() {
        let graph = XnReader::default().read_str(BOARD).unwrap();

        let ids: Vec<_> = graph.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "usb"]);

        let n0 = graph.node("0").unwrap();
        assert_eq!(n0.oscillator_hz, 25e6);
        assert_eq!(n0.system_freq_hz, 500e6);
        assert_eq!(n0.reference_freq_hz, 100e6);
        assert_eq!(n0.routing_id.as_deref(), Some("0x8000"));
        assert_eq!(n0.tile_ref, Some(0));

        let usb = graph.node("usb").unwrap();
        assert!(usb.is_peripheral);
        assert_eq!(usb.oscillator_hz, 24e6);

        let edges: Vec<_> = graph
            .edges()
            .map(|e| {
                (
                    e.src.as_str(),
                    e.dst.as_str(),
                    e.channel,
                    e.attributes.encoding,
                    e.attributes.delay.as_deref(),
                )
            })
            .collect();
        assert_eq!(
            edges,
            vec![
                ("0", "1", 2, '5', Some("4")),
                ("1", "0", 3, '5', Some("2")),
                ("1", "usb", 4, '2', None),
                ("usb", "1", 0, '2', None),
            ]
        );
    }

    #[test]
    fn test_edges_only_reference_present_nodes() {
        let graph = XnReader::default().read_str(BOARD).unwrap();
        for edge in graph.edges() {
            assert!(graph.contains_node(&edge.src));
            assert!(graph.contains_node(&edge.dst));
        }
    }

    #[test]
    fn test_ignore_nodes() {
        let options = ReaderOptions {
            ignore_nodes: HashSet::from(["usb".to_string()]),
            ..Default::default()
        };
        let graph = XnReader::new(options).read_str(BOARD).unwrap();

        assert!(!graph.contains_node("usb"));
        assert!(graph.edges().all(|e| e.src != "usb" && e.dst != "usb"));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_invalid_namespace() {
        let xml = r#"<Network xmlns="http://example.com">
  <Node Id="0" Oscillator="bad"/>
</Network>"#;
        let err = XnReader::default().read_str(xml).unwrap_err();
        match err {
            XnError::InvalidNamespace { expected, found } => {
                assert_eq!(expected, XN_NAMESPACE);
                assert_eq!(found, "{http://example.com}Network");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_root_name() {
        let xml = r#"<Board xmlns="http://www.xmos.com"/>"#;
        assert!(matches!(
            XnReader::default().read_str(xml),
            Err(XnError::InvalidNamespace { .. })
        ));
    }

    #[test]
    fn test_missing_endpoint_is_fatal() {
        let xml = r#"<Network xmlns="http://www.xmos.com">
  <Node Id="0"/>
  <Link><LinkEndpoint NodeId="0" Link="XLA"/></Link>
</Network>"#;
        assert!(matches!(
            XnReader::default().read_str(xml),
            Err(XnError::MissingEndpoints { found: 1 })
        ));
    }

    #[test]
    fn test_tile_ref_names() {
        let options = ReaderOptions {
            tile_refs: vec!["mytile".to_string()],
            ..Default::default()
        };
        assert_eq!(
            options.tile_ref_names(),
            vec!["stdcore", "stdtile", "tile", "mytile"]
        );
    }

    #[test]
    fn test_options_deserialize() {
        let options: ReaderOptions =
            serde_json::from_str(r#"{"ignore_nodes": ["a", "b"]}"#).unwrap();
        assert_eq!(options.ignore_nodes.len(), 2);
        assert!(options.tile_refs.is_empty());
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.xn");
        std::fs::write(&path, BOARD).unwrap();

        let graph = XnReader::default().read_file(&path).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 4);
    }
}
