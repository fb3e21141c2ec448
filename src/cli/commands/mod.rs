//! CLI command implementations.

mod config;
mod inspect;
mod suffix;

pub use config::{run_config, ConfigArgs};
pub use inspect::{run_inspect, InspectArgs};
pub use suffix::{run_suffix, SuffixArgs};
