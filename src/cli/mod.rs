//! Command-line interface.
//!
//! Operator tooling for inspecting shard split routing.

pub mod commands;

use crate::core::config::{Config, ConfigOverrides};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::Path;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/shardsplit.toml";

/// shardsplit - shard split routing for a memcache proxy.
#[derive(Parser, Debug)]
#[command(name = "shardsplit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path.
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show where a request would be routed.
    Inspect(commands::InspectArgs),
    /// Print split key suffixes for offsets.
    Suffix(commands::SuffixArgs),
    /// Configuration operations.
    Config(commands::ConfigArgs),
}

/// Load the configuration for a command.
///
/// An explicit path must exist. Without one, the default path is used if
/// present and built-in defaults otherwise.
pub fn load_config(path: Option<&str>, overrides: &ConfigOverrides) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(Path::new(path))?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            Config::from_file(Path::new(DEFAULT_CONFIG_PATH))?
        }
        None => Config::default(),
    };
    config.apply_overrides(overrides);
    config.validate()?;
    Ok(config)
}
