//! CLI argument definitions for modorder.
//!
//! Uses `clap` derive macros to define the full command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "modorder",
    version,
    about = "Deterministic load order resolution for game mods",
    long_about = "modorder computes a load order for the active mods of a pool file, \
                  activating missing requirements, reporting conflicts and ordering \
                  overrides after the mods they override."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Pool file to use instead of the nearest modorder.toml
    #[arg(long, global = true, env = "MODORDER_POOL")]
    pub pool: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the load order and write it to the pool file
    Resolve {
        /// Print the order without writing the pool file
        #[arg(long)]
        dry_run: bool,
    },

    /// Resolve without writing and fail on any error diagnostic
    Check,

    /// List active and inactive modules
    List,

    /// Move a module to the end of the active pool
    Activate {
        /// Module id
        id: String,
    },

    /// Move a module to the inactive pool
    Deactivate {
        /// Module id
        id: String,
    },

    /// Exchange two modules within the same pool
    Swap {
        /// First module id
        first: String,
        /// Second module id
        second: String,
    },

    /// Move a module to the end of its pool
    MoveToEnd {
        /// Module id
        id: String,
    },

    /// Evaluate a condition expression such as "ifhas('123') & !ifhas('456')"
    Condition {
        /// Condition expression
        expr: String,
        /// Module id to treat as active (repeatable)
        #[arg(short, long = "active", value_name = "ID")]
        active: Vec<String>,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
