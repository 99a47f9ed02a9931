//! Operation: locate, load and persist the pool file.

use std::path::{Path, PathBuf};

use modorder_core::config::GlobalConfig;
use modorder_core::poolfile::{PoolFile, POOL_FILE_NAME};
use modorder_resolver::ModContext;
use modorder_util::errors::ModorderError;
use modorder_util::fs::find_in_ancestors;

/// Resolve the pool file path: `explicit` if given, otherwise the nearest
/// `modorder.toml` in `cwd` or one of its parents.
pub fn locate(explicit: Option<&Path>, cwd: &Path) -> miette::Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(if path.is_absolute() {
            path.to_path_buf()
        } else {
            cwd.join(path)
        });
    }
    find_in_ancestors(cwd, POOL_FILE_NAME).ok_or_else(|| {
        ModorderError::PoolFile {
            message: format!(
                "Could not find {POOL_FILE_NAME} in {} or any parent directory",
                cwd.display()
            ),
        }
        .into()
    })
}

/// Read the pool file into a fresh engine context.
pub fn load_context(pool_path: &Path, config: &GlobalConfig) -> miette::Result<ModContext> {
    let file = PoolFile::from_path(pool_path)?;
    tracing::debug!(
        "Loaded {} active and {} inactive modules from {}",
        file.active.len(),
        file.inactive.len(),
        pool_path.display()
    );
    Ok(ModContext::new(
        file.active,
        file.inactive,
        config.resolver.clone(),
    ))
}

/// Persist both pools of `ctx`, in their current order, to `pool_path`.
pub fn save_context(ctx: &ModContext, pool_path: &Path) -> miette::Result<()> {
    let file = PoolFile {
        active: ctx.active().to_vec(),
        inactive: ctx.inactive().to_vec(),
    };
    file.write_to(pool_path)?;
    tracing::info!("Saved pools to {}", pool_path.display());
    Ok(())
}
