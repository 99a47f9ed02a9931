//! Command dispatch and handler modules.

mod check;
mod condition;
mod edit;
mod list;
mod resolve;

use std::path::{Path, PathBuf};

use miette::Result;
use modorder_core::config::GlobalConfig;
use modorder_ops::ops_edit::PoolEdit;
use modorder_util::errors::ModorderError;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let pool = cli.pool.as_deref();
    match cli.command {
        Command::Resolve { dry_run } => resolve::exec(pool, dry_run),
        Command::Check => check::exec(pool),
        Command::List => list::exec(pool),
        Command::Activate { id } => edit::exec(pool, PoolEdit::Activate(id)),
        Command::Deactivate { id } => edit::exec(pool, PoolEdit::Deactivate(id)),
        Command::Swap { first, second } => edit::exec(pool, PoolEdit::Swap(first, second)),
        Command::MoveToEnd { id } => edit::exec(pool, PoolEdit::MoveToEnd(id)),
        Command::Condition { expr, active } => condition::exec(&expr, &active),
    }
}

/// Locate the pool file and load the global configuration.
fn workspace(pool: Option<&Path>) -> Result<(PathBuf, GlobalConfig)> {
    let cwd = std::env::current_dir().map_err(ModorderError::Io)?;
    let pool_path = modorder_ops::ops_pool::locate(pool, &cwd)?;
    let config = GlobalConfig::load()?;
    Ok((pool_path, config))
}
