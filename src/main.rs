//! shardsplit - unified CLI entrypoint.
//!
//! Usage:
//!   shardsplit inspect --op get --key /region/cluster/prefix:123:suffix
//!   shardsplit inspect --op delete --key prefix:123:suffix --dispatch
//!   shardsplit suffix 0 1 27
//!   shardsplit --config config/shardsplit.toml config validate

use anyhow::Result;
use clap::Parser;
use shardsplit::cli::commands::{run_config, run_inspect, run_suffix};
use shardsplit::cli::{load_config, Cli, Commands, DEFAULT_CONFIG_PATH};
use shardsplit::core::config::ConfigOverrides;
use std::path::Path;

/// Initialize tracing subscriber if the telemetry feature is enabled.
#[cfg(feature = "telemetry")]
fn init_tracing(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

#[cfg(not(feature = "telemetry"))]
fn init_tracing(_log_level: &str) {}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect(args) => {
            let overrides = ConfigOverrides {
                log_level: cli.log_level.clone(),
                host_id: args.host_id,
            };
            let config = load_config(cli.config.as_deref(), &overrides)?;
            init_tracing(&config.telemetry.log_level);
            run_inspect(args, &config).await
        }
        Commands::Suffix(args) => run_suffix(args),
        Commands::Config(args) => {
            init_tracing(cli.log_level.as_deref().unwrap_or("info"));
            let path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
            run_config(args, Path::new(path))
        }
    }
}
