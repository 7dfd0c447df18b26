use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::core::EngineConfig;
use crate::engine::renderer::TextureFilter;
use crate::engine::resources::AssetManifest;
use crate::grid::GridLayout;
use crate::grid::animation::PulseConfig;

pub const DEFAULT_CONFIG_PATH: &str = "swapgrid.ron";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub engine: EngineConfig,
    pub layout: GridLayout,
    pub pulse: PulseConfig,
    pub texture_filter: TextureFilter,
    pub assets: AssetManifest,
}

impl DemoConfig {
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).context("invalid demo config")
    }

    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("failed to serialize demo config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_ron_str(&source).with_context(|| format!("parsing {}", path.display()))
    }

    /// Missing file means defaults. A broken file is reported and also falls back.
    pub fn load_or_default(path: &Path) -> Self {
        match fs::metadata(path) {
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!(target: "config", path = %path.display(), "no config file, using defaults");
                return Self::default();
            }
            _ => {}
        }

        match Self::load(path) {
            Ok(config) => {
                tracing::info!(target: "config", path = %path.display(), "config loaded");
                config
            }
            Err(err) => {
                tracing::warn!(target: "config", "{err:#}, using defaults");
                Self::default()
            }
        }
    }
}
