//! Launch configuration.
//!
//! This covers how the program runs (layout, tick rate, cell metrics,
//! logging), never the parameter groups themselves: those always start from
//! their defaults and live only in memory. Nothing here is ever written back.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::host::CellMetrics;
use crate::overlay::layout::LayoutStrategy;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutName {
    #[default]
    ChordRows,
    FlatRow,
    WrapGrid,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub layout: LayoutName,
    #[serde(default = "default_wrap_columns")]
    pub wrap_columns: u16,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_cell_width_px")]
    pub cell_width_px: u16,
    #[serde(default = "default_cell_height_px")]
    pub cell_height_px: u16,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub debug: bool,
}

fn default_wrap_columns() -> u16 {
    6
}
fn default_tick_ms() -> u64 {
    50
}
fn default_cell_width_px() -> u16 {
    8
}
fn default_cell_height_px() -> u16 {
    16
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: LayoutName::default(),
            wrap_columns: default_wrap_columns(),
            tick_ms: default_tick_ms(),
            cell_width_px: default_cell_width_px(),
            cell_height_px: default_cell_height_px(),
            theme: None,
            log_file: None,
            debug: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keyway")
            .join("config.toml")
    }

    pub fn layout_strategy(&self) -> LayoutStrategy {
        match self.layout {
            LayoutName::ChordRows => LayoutStrategy::ChordRows,
            LayoutName::FlatRow => LayoutStrategy::FlatRow,
            LayoutName::WrapGrid => LayoutStrategy::WrapGrid {
                columns: self.wrap_columns.max(1),
            },
        }
    }

    pub fn cell_metrics(&self) -> CellMetrics {
        CellMetrics {
            width_px: self.cell_width_px.max(1),
            height_px: self.cell_height_px.max(1),
        }
    }

    pub fn tick(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_ms.clamp(10, 1000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.layout_strategy(), LayoutStrategy::ChordRows);
    }

    #[test]
    fn test_config_wrap_grid() {
        let toml_str = r#"
layout = "wrap-grid"
wrap_columns = 0
tick_ms = 5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.layout_strategy(), LayoutStrategy::WrapGrid { columns: 1 });
        assert_eq!(config.tick(), std::time::Duration::from_millis(10));
    }

    #[test]
    fn test_load_from_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "layout = \"flat-row\"\ndebug = true\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.layout, LayoutName::FlatRow);
        assert!(config.debug);
    }

    #[test]
    fn test_load_from_malformed_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "layout = \"spiral\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
