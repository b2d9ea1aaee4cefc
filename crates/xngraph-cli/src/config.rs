//! Configuration loading

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use xngraph_core::container::DEFAULT_XESECTION;
use xngraph_core::ReaderOptions;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reader: ReaderOptions,
    #[serde(default)]
    pub xesection: XesectionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XesectionConfig {
    /// Path to the `xesection` tool used for `.xe` binaries
    #[serde(default = "default_xesection")]
    pub path: PathBuf,
}

impl Default for XesectionConfig {
    fn default() -> Self {
        Self {
            path: default_xesection(),
        }
    }
}

fn default_xesection() -> PathBuf {
    PathBuf::from(DEFAULT_XESECTION)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Rendering of the topology graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Graphviz digraph
    #[default]
    Dot,
    /// Nodes and edges as JSON
    Json,
}

/// Load configuration from file, falling back to defaults if it does not exist
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("xngraph.toml")).unwrap();

        assert!(config.reader.ignore_nodes.is_empty());
        assert!(config.reader.tile_refs.is_empty());
        assert_eq!(config.xesection.path, PathBuf::from("xesection"));
        assert_eq!(config.output.format, OutputFormat::Dot);
    }

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xngraph.toml");
        std::fs::write(
            &path,
            r#"
[reader]
ignore_nodes = ["2", "3"]
tile_refs = ["xcore"]

[xesection]
path = "/opt/xmos/bin/xesection"

[output]
format = "json"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert!(config.reader.ignore_nodes.contains("2"));
        assert!(config.reader.ignore_nodes.contains("3"));
        assert_eq!(config.reader.tile_refs, vec!["xcore".to_string()]);
        assert_eq!(config.xesection.path, PathBuf::from("/opt/xmos/bin/xesection"));
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_partial_config() {
        let config: Config = toml::from_str("[output]\nformat = \"dot\"\n").unwrap();
        assert!(config.reader.ignore_nodes.is_empty());
        assert_eq!(config.xesection.path, PathBuf::from("xesection"));
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xngraph.toml");
        std::fs::write(&path, "[output]\nformat = \"svg\"\n").unwrap();

        assert!(load_config(&path).is_err());
    }
}
