use std::path::Path;

use miette::Result;

pub fn exec(pool: Option<&Path>) -> Result<()> {
    let (pool_path, config) = super::workspace(pool)?;
    modorder_ops::ops_list::list(&pool_path, &config)
}
