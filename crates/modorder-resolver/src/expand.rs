//! Activation of missing requirements from the inactive pool.

use std::collections::BTreeSet;

use crate::pools::{PoolKind, Pools};

/// Outcome of trying to make a module active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandResult {
    /// The module was moved from the inactive to the active pool.
    Activated,
    AlreadyActive,
    /// No module with this identifier exists in either pool.
    NotFound,
    /// The module is inactive but a conflict forbids activating it.
    Banned,
}

/// Make `target` active if it is sitting in the inactive pool and no
/// conflict bans it. The pools are only touched on [`ExpandResult::Activated`].
pub fn expand(target: &str, pools: &mut Pools, banned: &BTreeSet<String>) -> ExpandResult {
    match pools.locate(target) {
        Some((PoolKind::Active, _)) => ExpandResult::AlreadyActive,
        None => ExpandResult::NotFound,
        Some((PoolKind::Inactive, _)) if banned.contains(target) => ExpandResult::Banned,
        Some((PoolKind::Inactive, _)) => match pools.activate(target) {
            Ok(()) => {
                tracing::info!("Activated '{}' to satisfy a requirement", pools.display_name(target));
                ExpandResult::Activated
            }
            Err(e) => {
                tracing::warn!("Failed to activate '{target}': {e}");
                ExpandResult::NotFound
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modorder_core::module::Module;

    fn pools() -> Pools {
        Pools::new(vec![Module::new("a", "A")], vec![Module::new("b", "B")])
    }

    #[test]
    fn already_active() {
        let mut p = pools();
        assert_eq!(expand("a", &mut p, &BTreeSet::new()), ExpandResult::AlreadyActive);
    }

    #[test]
    fn not_found() {
        let mut p = pools();
        let before = p.clone();
        assert_eq!(expand("zzz", &mut p, &BTreeSet::new()), ExpandResult::NotFound);
        assert_eq!(p, before);
    }

    #[test]
    fn activates_inactive_module() {
        let mut p = pools();
        assert_eq!(expand("b", &mut p, &BTreeSet::new()), ExpandResult::Activated);
        assert!(p.is_active("b"));
        assert!(p.inactive().is_empty());
    }

    #[test]
    fn banned_module_stays_inactive() {
        let mut p = pools();
        let banned = BTreeSet::from(["b".to_string()]);
        assert_eq!(expand("b", &mut p, &banned), ExpandResult::Banned);
        assert!(!p.is_active("b"));
    }
}
