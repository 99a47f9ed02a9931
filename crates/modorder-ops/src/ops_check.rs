//! Operation: resolve without persisting and report problems.
//!
//! Used to validate a pool before launching the game: the pool file is never
//! written, and any error diagnostic makes the check fail.

use std::path::Path;

use modorder_core::config::GlobalConfig;
use modorder_util::errors::ModorderError;

use crate::{ops_pool, ops_resolve};

/// Counts reported by a passing check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSummary {
    pub modules: usize,
    pub warnings: usize,
}

/// Check the pools stored at `pool_path`.
pub fn check(pool_path: &Path, config: &GlobalConfig) -> miette::Result<CheckSummary> {
    let mut ctx = ops_pool::load_context(pool_path, config)?;
    let resolution = ops_resolve::run(&mut ctx, config)?;

    let errors = resolution.report.errors().count();
    let warnings = resolution.report.warnings().count();
    if errors > 0 {
        return Err(ModorderError::Resolution {
            message: format!(
                "{errors} error(s) and {warnings} warning(s) in {} modules",
                resolution.order.len()
            ),
        }
        .into());
    }

    modorder_util::progress::status(
        "Checked",
        &format!(
            "{} modules, {warnings} warning(s)",
            resolution.order.len()
        ),
    );
    Ok(CheckSummary {
        modules: resolution.order.len(),
        warnings,
    })
}
