//! Suffix command implementation.

use crate::split::codec::{shard_split_suffix, MAX_SPLIT_OFFSETS};
use anyhow::Result;
use clap::Args;

/// Print split key suffixes.
#[derive(Args, Debug)]
pub struct SuffixArgs {
    /// Split offsets to encode.
    #[arg(required = true)]
    pub offsets: Vec<usize>,
}

/// Run the suffix command.
pub fn run_suffix(args: SuffixArgs) -> Result<()> {
    for offset in args.offsets {
        if offset >= MAX_SPLIT_OFFSETS {
            anyhow::bail!(
                "split offset {} out of range (max {})",
                offset,
                MAX_SPLIT_OFFSETS - 1
            );
        }
        println!("{}\t{}", offset, shard_split_suffix(offset));
    }
    Ok(())
}
