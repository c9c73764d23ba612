//! Configuration for dpp-view tools.
//!
//! The configuration is stored in `dpp-view.json` files and is discovered
//! by walking up from the working directory.

use std::path::{Path, PathBuf};

use dpp_view::{CompositionRenderer, MetricSpec, Palette, ParserConfig, RenderConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The standard configuration filename.
pub const CONFIG_FILENAME: &str = "dpp-view.json";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfig {
    pub parser: ParserConfig,
    pub render: RenderConfig,
    /// Composition chart colors.
    pub palette: Palette,
    /// Headline metric table. Replaces the built-in table when present.
    pub metrics: Vec<MetricSpec>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            render: RenderConfig::default(),
            palette: Palette::default(),
            metrics: MetricSpec::defaults(),
        }
    }
}

impl ViewConfig {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    /// Parse configuration from a string.
    pub fn parse_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Find the configuration file by searching upward from the given directory.
    pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
        let mut current = start_dir.to_path_buf();
        loop {
            let config_path = current.join(CONFIG_FILENAME);
            if config_path.is_file() {
                debug!(path = %config_path.display(), "found configuration file");
                return Some(config_path);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration by searching upward from the given directory.
    pub fn load_from_dir(start_dir: &Path) -> Result<Option<(PathBuf, Self)>, ConfigError> {
        if let Some(config_path) = Self::find_config_file(start_dir) {
            let config = Self::load(&config_path)?;
            Ok(Some((config_path, config)))
        } else {
            Ok(None)
        }
    }

    /// A composition renderer using the configured palette and compact mode.
    pub fn composition_renderer(&self) -> CompositionRenderer {
        CompositionRenderer::new(self.palette.clone(), self.render.compact_composition)
    }
}
