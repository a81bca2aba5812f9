//! CLI argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "loadscope",
    about = "Reconstruct and inspect a process's loader hierarchy",
    after_help = "\
EXAMPLES:
    loadscope --host host.json tree                 Print the loader tree
    loadscope --host host.json tree --ping          Probe remote loaders for liveness
    loadscope --host host.json details 1234         Show paths/types of loader 1234
    loadscope --host host.json type acme.Order 1234 Resolve a type through loader 1234
    loadscope operations                            List management operations"
)]
pub struct Args {
    /// Recorded host description (JSON) to observe
    #[arg(long, value_name = "FILE", global = true)]
    pub host: Option<PathBuf>,

    /// Loader kind to drop from the tree (repeatable, replaces the defaults)
    #[arg(long = "exclude-kind", value_name = "KIND", global = true)]
    pub exclude_kinds: Vec<String>,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the loader tree
    Tree {
        /// Probe remote loaders for liveness (slow)
        #[arg(long)]
        ping: bool,

        /// Give up on a probing render after N seconds
        #[arg(long, default_value = "30", value_name = "SECS")]
        timeout: u64,
    },

    /// Show kind-specific detail of one loader
    Details {
        /// Loader identity as printed by `tree`
        id: u64,
    },

    /// Resolve a type through a loader and show its supertype chain
    Type {
        /// Fully qualified type name
        name: String,

        /// Loader identity as printed by `tree`
        id: u64,
    },

    /// List the management operations and their parameters
    Operations,
}
