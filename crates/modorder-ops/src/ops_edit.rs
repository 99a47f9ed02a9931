//! Operation: edit the pools by hand and persist the result.
//!
//! Edits never resolve; load orders of moved modules are reset and the next
//! `modorder resolve` assigns new ones.

use std::fmt;
use std::path::Path;

use modorder_core::config::GlobalConfig;
use modorder_resolver::{ModContext, PoolError};
use modorder_util::errors::ModorderError;

use crate::ops_pool;

/// A single pool edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEdit {
    Activate(String),
    Deactivate(String),
    Swap(String, String),
    MoveToEnd(String),
}

impl PoolEdit {
    /// Apply the edit to an in-memory context.
    pub fn apply(&self, ctx: &mut ModContext) -> Result<(), PoolError> {
        match self {
            Self::Activate(id) => ctx.activate(id),
            Self::Deactivate(id) => ctx.deactivate(id),
            Self::Swap(first, second) => ctx.swap(first, second),
            Self::MoveToEnd(id) => ctx.move_to_end(id),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Activate(_) => "Activated",
            Self::Deactivate(_) => "Deactivated",
            Self::Swap(..) => "Swapped",
            Self::MoveToEnd(_) => "Moved",
        }
    }
}

impl fmt::Display for PoolEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Activate(id) | Self::Deactivate(id) => write!(f, "{id}"),
            Self::Swap(first, second) => write!(f, "{first} <-> {second}"),
            Self::MoveToEnd(id) => write!(f, "{id} to the end of its pool"),
        }
    }
}

/// Apply `edit` to the pools stored at `pool_path` and write them back.
///
/// A rejected edit leaves the file untouched.
pub fn edit(pool_path: &Path, config: &GlobalConfig, edit: &PoolEdit) -> miette::Result<()> {
    let mut ctx = ops_pool::load_context(pool_path, config)?;
    edit.apply(&mut ctx).map_err(|e| ModorderError::Pool {
        message: e.to_string(),
    })?;
    ops_pool::save_context(&ctx, pool_path)?;
    modorder_util::progress::status(edit.label(), &edit.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use modorder_core::poolfile::PoolFile;

    const SAMPLE: &str = r#"
[[active]]
id = "a"
name = "Alpha"
load-order = 1

[[active]]
id = "b"
name = "Bravo"
load-order = 2

[[inactive]]
id = "c"
name = "Charlie"
"#;

    fn setup() -> (tempfile::TempDir, std::path::PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("modorder.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        (tmp, path)
    }

    fn ids(modules: &[modorder_core::module::Module]) -> Vec<&str> {
        modules.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn activate_appends_to_active_pool() {
        let (_tmp, path) = setup();
        edit(&path, &GlobalConfig::default(), &PoolEdit::Activate("c".into())).unwrap();
        let file = PoolFile::from_path(&path).unwrap();
        assert_eq!(ids(&file.active), vec!["a", "b", "c"]);
        assert!(file.inactive.is_empty());
    }

    #[test]
    fn deactivate_clears_load_order() {
        let (_tmp, path) = setup();
        edit(&path, &GlobalConfig::default(), &PoolEdit::Deactivate("a".into())).unwrap();
        let file = PoolFile::from_path(&path).unwrap();
        assert_eq!(ids(&file.active), vec!["b"]);
        assert_eq!(ids(&file.inactive), vec!["c", "a"]);
        assert_eq!(file.inactive[1].load_order, None);
    }

    #[test]
    fn swap_across_pools_is_rejected() {
        let (_tmp, path) = setup();
        let err = edit(
            &path,
            &GlobalConfig::default(),
            &PoolEdit::Swap("a".into(), "c".into()),
        )
        .unwrap_err();
        assert!(err.to_string().contains("different pools"), "got: {err}");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), SAMPLE);
    }

    #[test]
    fn apply_in_memory() {
        let mut ctx = ModContext::default();
        assert!(matches!(
            PoolEdit::MoveToEnd("x".into()).apply(&mut ctx),
            Err(PoolError::UnknownModule { .. })
        ));
    }
}
