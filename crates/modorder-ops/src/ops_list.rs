//! Operation: print both pools.

use std::path::Path;

use modorder_core::config::GlobalConfig;
use modorder_core::module::Module;

use crate::ops_pool;

/// Render the pools as printed by `modorder list`.
pub fn render(active: &[Module], inactive: &[Module]) -> String {
    let mut out = format!("Active ({}):\n", active.len());
    for module in active {
        match module.load_order {
            Some(n) => out.push_str(&format!("{n:>4}. {module}\n")),
            None => out.push_str(&format!("   -. {module}\n")),
        }
    }
    out.push_str(&format!("Inactive ({}):\n", inactive.len()));
    for module in inactive {
        out.push_str(&format!("      {module}\n"));
    }
    out
}

/// Print the pools stored at `pool_path` without resolving them.
pub fn list(pool_path: &Path, config: &GlobalConfig) -> miette::Result<()> {
    let ctx = ops_pool::load_context(pool_path, config)?;
    print!("{}", render(ctx.active(), ctx.inactive()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_marks_unordered_modules() {
        let mut core = Module::new("core", "Core");
        core.load_order = Some(1);
        let text = render(
            &[core, Module::new("new", "Fresh")],
            &[Module::new("music", "")],
        );
        assert_eq!(
            text,
            "Active (2):\n   1. Core (core)\n   -. Fresh (new)\nInactive (1):\n      music\n"
        );
    }
}
