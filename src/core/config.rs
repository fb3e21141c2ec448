//! Configuration parsing and validation.
//!
//! Configuration is loaded from a TOML file with CLI overrides:
//!
//! ```toml
//! [splits]
//! host_id = 7                 # optional, derived from the hostname otherwise
//! file = "splits.json"        # optional JSON object {"shard": count}
//!
//! [splits.shards]
//! "shard123" = 3
//!
//! [telemetry]
//! log_level = "info"
//! ```

use crate::core::host::HostId;
use crate::split::lookup::{parse_split_table, ShardSplitter};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Shard split configuration.
    #[serde(default)]
    pub splits: SplitsConfig,

    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Directory of the file this config was read from. Relative paths in
    /// the config resolve against it.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

/// Shard split configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SplitsConfig {
    /// Fixed host id. Derived from the hostname when unset.
    #[serde(default)]
    pub host_id: Option<u64>,

    /// Inline split table: shard id → split count.
    #[serde(default)]
    pub shards: HashMap<String, u64>,

    /// Path to a JSON split table. Inline entries override file entries.
    /// Relative to the config file's directory.
    #[serde(default)]
    pub file: Option<String>,
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let mut config: Config =
            toml::from_str(&content).with_context(|| "failed to parse config file")?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).with_context(|| "failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI overrides to the configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref log_level) = overrides.log_level {
            self.telemetry.log_level = log_level.clone();
        }
        if let Some(host_id) = overrides.host_id {
            self.splits.host_id = Some(host_id);
        }
    }

    /// Validate configuration consistency.
    pub fn validate(&self) -> Result<()> {
        self.validate_splits()?;
        self.validate_telemetry()?;
        Ok(())
    }

    fn validate_splits(&self) -> Result<()> {
        ShardSplitter::new(self.splits.shards.clone()).context("invalid splits.shards")?;

        if let Some(ref file) = self.splits.file {
            if file.trim().is_empty() {
                anyhow::bail!("splits.file must not be empty when set");
            }
        }

        Ok(())
    }

    fn validate_telemetry(&self) -> Result<()> {
        if !VALID_LOG_LEVELS.contains(&self.telemetry.log_level.as_str()) {
            anyhow::bail!(
                "telemetry.log_level must be one of {:?}, got: {}",
                VALID_LOG_LEVELS,
                self.telemetry.log_level
            );
        }
        Ok(())
    }

    /// Build the split table from the file (if any) and the inline entries.
    pub fn shard_splitter(&self) -> Result<ShardSplitter> {
        let mut splits: HashMap<String, u64> = HashMap::new();

        if let Some(path) = self.split_file() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read split table: {}", path.display()))?;
            let from_file = parse_split_table(&content)
                .with_context(|| format!("failed to parse split table: {}", path.display()))?;
            splits.extend(from_file);
        }

        splits.extend(self.splits.shards.clone());

        ShardSplitter::new(splits).context("invalid shard split table")
    }

    /// Path of the JSON split table, resolved against the config file's
    /// directory.
    pub fn split_file(&self) -> Option<PathBuf> {
        let file = Path::new(self.splits.file.as_deref()?);
        match self.base_dir {
            Some(ref dir) if file.is_relative() => Some(dir.join(file)),
            _ => Some(file.to_path_buf()),
        }
    }

    /// Resolve the host id: configured value, else derived from the hostname.
    pub fn host_id(&self) -> HostId {
        HostId::resolve(self.splits.host_id)
    }
}

/// CLI override options that can be applied to configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override log level.
    pub log_level: Option<String>,
    /// Override host id.
    pub host_id: Option<u64>,
}
