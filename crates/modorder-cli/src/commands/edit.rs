//! Handlers for `activate`, `deactivate`, `swap` and `move-to-end`.

use std::path::Path;

use miette::Result;

use modorder_ops::ops_edit::{self, PoolEdit};

pub fn exec(pool: Option<&Path>, edit: PoolEdit) -> Result<()> {
    let (pool_path, config) = super::workspace(pool)?;
    ops_edit::edit(&pool_path, &config, &edit)
}
