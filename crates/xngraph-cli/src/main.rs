//! xngraph - Produce a graph description of an XMOS XN file
//!
//! Reads the nodes and links of an XN platform description (or the XN
//! embedded in an `.xe` binary) and prints them as a Graphviz digraph.
//! Nodes show their oscillator / reference / system frequencies, edges
//! show the link encoding and delay.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use xngraph_core::dot::{graph_name, render_dot};
use xngraph_core::XnReader;

use config::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "xngraph")]
#[command(about = "Produce a graph description of an XMOS XN file")]
#[command(version)]
struct Args {
    /// The XN file (or .xe binary) containing node and link info for a platform
    xnfile: PathBuf,

    /// Ignore the specified node IDs
    #[arg(long, value_delimiter = ',', value_name = "NODE1,NODE2,...")]
    ignore_nodes: Vec<String>,

    /// Additional tile reference name (repeatable)
    #[arg(long = "tile-ref", value_name = "NAME")]
    tile_refs: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, default_value = "xngraph.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&args.log_level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = config::load_config(&args.config)?;

    // Command line values add to the configured ones
    config.reader.ignore_nodes.extend(args.ignore_nodes);
    config.reader.tile_refs.extend(args.tile_refs);
    if let Some(format) = args.format {
        config.output.format = format;
    }

    let reader = XnReader::new(config.reader).with_xesection(config.xesection.path);
    let graph = reader
        .read_file(&args.xnfile)
        .with_context(|| format!("Failed to read {}", args.xnfile.display()))?;

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Read topology"
    );

    let rendered = match config.output.format {
        OutputFormat::Dot => render_dot(&graph, &graph_name(&args.xnfile)),
        OutputFormat::Json => {
            let mut json = graph.to_json()?;
            json.push('\n');
            json
        }
    };

    match args.output {
        Some(path) => std::fs::write(&path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", rendered),
    }

    Ok(())
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}
