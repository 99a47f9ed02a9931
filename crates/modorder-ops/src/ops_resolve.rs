//! Operation: resolve the load order and persist it.

use std::path::Path;

use modorder_core::config::GlobalConfig;
use modorder_resolver::{ModContext, Resolution};

use crate::ops_pool;

/// Options for `modorder resolve`.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Compute and print the order without writing the pool file.
    pub dry_run: bool,
}

/// Resolve the pools stored at `pool_path`, print the order and
/// diagnostics, and write the result back unless `dry_run` is set.
///
/// A failed resolution leaves the pool file untouched.
pub fn resolve(
    pool_path: &Path,
    config: &GlobalConfig,
    opts: &ResolveOptions,
) -> miette::Result<Resolution> {
    let mut ctx = ops_pool::load_context(pool_path, config)?;
    let resolution = run(&mut ctx, config)?;

    for entry in &resolution.order {
        println!("{entry}");
    }

    if opts.dry_run {
        modorder_util::progress::status_info("Dry run", "pool file not written");
    } else {
        ops_pool::save_context(&ctx, pool_path)?;
        modorder_util::progress::status(
            "Finished",
            &format!(
                "{} modules ordered, written to {}",
                resolution.order.len(),
                pool_path.display()
            ),
        );
    }
    Ok(resolution)
}

/// Resolve `ctx` in place, reporting progress and diagnostics on stderr.
pub fn run(ctx: &mut ModContext, config: &GlobalConfig) -> miette::Result<Resolution> {
    modorder_util::progress::status(
        "Resolving",
        &format!(
            "{} active, {} inactive modules",
            ctx.active().len(),
            ctx.inactive().len()
        ),
    );

    let result = ctx.resolve();
    crate::print_diagnostics(
        ctx.active().iter().chain(ctx.inactive()),
        config.output.show_warnings,
    );

    match result {
        Ok(resolution) => {
            for id in &resolution.activated {
                let name = ctx.find(id).map(|m| m.to_string()).unwrap_or_else(|| id.clone());
                modorder_util::progress::status("Activated", &name);
            }
            Ok(resolution)
        }
        Err(e) => {
            modorder_util::progress::status_error("Failed", "load order left unchanged");
            Err(e.into())
        }
    }
}
