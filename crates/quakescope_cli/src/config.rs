//! Quakescope configuration file handling

use anyhow::{Context, Result};
use quakescope_charts::HistogramMetric;
use quakescope_core::{ZoneRegion, ZoneTable};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "quakescope.toml";

/// Top-level configuration (quakescope.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct QuakescopeConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub histogram: HistogramConfig,
    #[serde(default)]
    pub timezones: TimezoneConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Input catalogue
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DataConfig {
    /// CSV used when no INPUT argument is given
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HistogramConfig {
    /// Initial binning dimension
    #[serde(default)]
    pub metric: HistogramMetric,
}

/// Timezone lookup table
#[derive(Debug, Deserialize, Serialize)]
pub struct TimezoneConfig {
    /// Append the built-in regions after the user ones
    #[serde(default = "default_true")]
    pub builtin: bool,
    /// Checked first, in order
    #[serde(default)]
    pub regions: Vec<ZoneRegion>,
}

fn default_true() -> bool {
    true
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            regions: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LogConfig {
    /// tracing filter directive; RUST_LOG takes precedence
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl QuakescopeConfig {
    /// Load `explicit`, or `quakescope.toml` from the working directory if it
    /// exists, or fall back to defaults.
    ///
    /// An explicitly named file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::load_from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// User regions first, then the built-in table if enabled.
    pub fn zone_table(&self) -> ZoneTable {
        let mut table = ZoneTable::new(self.timezones.regions.clone());
        if self.timezones.builtin {
            table.extend(ZoneTable::builtin());
        }
        table
    }
}
