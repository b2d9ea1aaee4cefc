//! Graphviz DOT rendering
//!
//! Nodes are drawn as records labelled `name | osc / ref / sys` and edges
//! are labelled `encoding,delay`.

use std::fmt;
use std::path::Path;

use crate::node::Node;
use crate::topology::TopologyGraph;

/// Render the graph as a left-to-right `digraph`
pub fn render_dot(graph: &TopologyGraph, name: &str) -> String {
    Dot { graph, name }.to_string()
}

/// DOT view of a topology graph
pub struct Dot<'a> {
    pub graph: &'a TopologyGraph,
    pub name: &'a str,
}

impl fmt::Display for Dot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph \"{}\" {{", escape(self.name))?;
        writeln!(f, "    rankdir=LR")?;

        for node in self.graph.nodes() {
            writeln!(f, "    \"{}\" [", escape(&node.id))?;
            writeln!(f, "        shape = \"record\"")?;
            writeln!(
                f,
                "        label = \"{} | {} / {} / {}\"",
                escape(&display_name(node)),
                scientific(node.oscillator_hz),
                scientific(node.reference_freq_hz),
                scientific(node.system_freq_hz),
            )?;
            writeln!(f, "    ];")?;
        }

        for edge in self.graph.edges() {
            writeln!(
                f,
                "    \"{}\" -> \"{}\" [label=\"{},{}\"];",
                escape(&edge.src),
                escape(&edge.dst),
                edge.attributes.encoding,
                escape(edge.attributes.delay.as_deref().unwrap_or("")),
            )?;
        }

        writeln!(f, "}}")
    }
}

/// Graph name for an input file: the file name without its extension
pub fn graph_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Name shown in a node's record label
pub fn display_name(node: &Node) -> String {
    if node.is_peripheral {
        return format!("{} (periph)", node.id);
    }
    match node.tile_ref {
        Some(tile) if node.tile_ref_differs() => format!("{} [{}]", node.id, tile),
        _ => node.id.clone(),
    }
}

/// Format like C's `%e`: six fractional digits and a signed two-digit exponent
fn scientific(value: f64) -> String {
    let formatted = format!("{:.6e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => formatted,
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
