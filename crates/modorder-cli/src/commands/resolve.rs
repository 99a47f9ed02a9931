//! Handler for `modorder resolve`.

use std::path::Path;

use miette::Result;

use modorder_ops::ops_resolve::{self, ResolveOptions};

pub fn exec(pool: Option<&Path>, dry_run: bool) -> Result<()> {
    let (pool_path, config) = super::workspace(pool)?;
    ops_resolve::resolve(&pool_path, &config, &ResolveOptions { dry_run })?;
    Ok(())
}
