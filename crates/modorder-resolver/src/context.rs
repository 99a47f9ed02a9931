//! The owned resolution context and its caller-facing operations.

use std::fmt;
use std::sync::Arc;

use modorder_core::config::ResolverConfig;
use modorder_core::module::Module;
use parking_lot::Mutex;

use crate::builder::{build, BuildOutput};
use crate::diagnostics::DiagnosticsReport;
use crate::error::{PoolError, ResolutionError};
use crate::pools::Pools;
use crate::sort::topological_order;

/// One entry of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedModule {
    pub id: String,
    pub name: String,
    /// 1-based position in the active pool.
    pub load_order: usize,
}

impl fmt::Display for OrderedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>4}. {} ({})", self.load_order, self.name, self.id)
    }
}

/// Outcome of a successful [`ModContext::resolve`].
#[derive(Debug, Clone)]
pub struct Resolution {
    pub order: Vec<OrderedModule>,
    /// Modules pulled from the inactive pool, in activation order.
    pub activated: Vec<String>,
    pub report: DiagnosticsReport,
    pub edge_count: usize,
}

/// Active and inactive pools plus the settings used to resolve them.
///
/// All state lives here; nothing is global. Use [`SharedModContext`] when
/// several callers need to mutate the same pools.
#[derive(Debug, Clone, Default)]
pub struct ModContext {
    pools: Pools,
    config: ResolverConfig,
}

impl ModContext {
    /// Create a context, dropping duplicate identifiers (first occurrence
    /// wins, active before inactive).
    pub fn new(active: Vec<Module>, inactive: Vec<Module>, config: ResolverConfig) -> Self {
        Self {
            pools: Pools::new(active, inactive),
            config,
        }
    }

    pub fn active(&self) -> &[Module] {
        self.pools.active()
    }

    pub fn inactive(&self) -> &[Module] {
        self.pools.inactive()
    }

    pub fn find(&self, id: &str) -> Option<&Module> {
        self.pools.find(id)
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.pools.is_active(id)
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Consume the context, returning `(active, inactive)`.
    pub fn into_pools(self) -> (Vec<Module>, Vec<Module>) {
        self.pools.into_parts()
    }

    pub fn activate(&mut self, id: &str) -> Result<(), PoolError> {
        self.pools.activate(id)?;
        tracing::info!("Activated '{}'", self.pools.display_name(id));
        Ok(())
    }

    pub fn deactivate(&mut self, id: &str) -> Result<(), PoolError> {
        self.pools.deactivate(id)?;
        tracing::info!("Deactivated '{}'", self.pools.display_name(id));
        Ok(())
    }

    /// Exchange two modules of the same pool.
    pub fn swap(&mut self, first: &str, second: &str) -> Result<(), PoolError> {
        self.pools.swap(first, second)
    }

    pub fn move_to_end(&mut self, id: &str) -> Result<(), PoolError> {
        self.pools.move_to_end(id)
    }

    /// Compute and commit a load order for the active pool.
    ///
    /// Missing requirements are activated, conflicts and identifier claims
    /// are arbitrated, and the active pool is replaced by its sorted form
    /// with 1-based load orders. Every module's diagnostics are recomputed.
    ///
    /// On error the pools keep their membership, order and load orders;
    /// only the diagnostics found during the attempt are written back.
    pub fn resolve(&mut self) -> Result<Resolution, ResolutionError> {
        let mut working = self.pools.clone();
        let BuildOutput {
            graph,
            report,
            activated,
            stable,
            passes,
            ..
        } = build(&mut working, &self.config);

        if !stable {
            self.record_failure(&report);
            let mut modules: Vec<String> = activated;
            modules.sort();
            modules.dedup();
            tracing::error!("Active set did not settle after {passes} passes");
            return Err(ResolutionError::UnresolvedResidue { modules });
        }

        let indices = match topological_order(&graph) {
            Ok(indices) => indices,
            Err(e) => {
                self.record_failure(&report);
                return Err(e);
            }
        };

        let mut remaining = working.take_active();
        let mut ordered = Vec::with_capacity(remaining.len());
        for idx in indices {
            let id = graph.node(idx).id.as_str();
            if let Some(pos) = remaining.iter().position(|m| m.id == id) {
                ordered.push(remaining.swap_remove(pos));
            }
        }
        working.commit_order(ordered);

        let (active, inactive) = working.modules_mut();
        report.apply(active);
        report.apply(inactive);

        let order: Vec<OrderedModule> = working
            .active()
            .iter()
            .enumerate()
            .map(|(i, m)| OrderedModule {
                id: m.id.clone(),
                name: m.display_name().to_string(),
                load_order: i + 1,
            })
            .collect();

        tracing::info!(
            "Resolved {} active modules ({} activated, {} issues)",
            order.len(),
            activated.len(),
            report.len()
        );
        self.pools = working;
        Ok(Resolution {
            order,
            activated,
            edge_count: graph.edge_count(),
            report,
        })
    }

    fn record_failure(&mut self, report: &DiagnosticsReport) {
        let (active, inactive) = self.pools.modules_mut();
        report.apply(active);
        report.apply(inactive);
    }
}

/// A [`ModContext`] behind a lock, so that every pool mutation and
/// resolution runs to completion before the next one starts.
#[derive(Debug, Clone, Default)]
pub struct SharedModContext {
    inner: Arc<Mutex<ModContext>>,
}

impl SharedModContext {
    pub fn new(context: ModContext) -> Self {
        Self {
            inner: Arc::new(Mutex::new(context)),
        }
    }

    pub fn activate(&self, id: &str) -> Result<(), PoolError> {
        self.inner.lock().activate(id)
    }

    pub fn deactivate(&self, id: &str) -> Result<(), PoolError> {
        self.inner.lock().deactivate(id)
    }

    pub fn swap(&self, first: &str, second: &str) -> Result<(), PoolError> {
        self.inner.lock().swap(first, second)
    }

    pub fn move_to_end(&self, id: &str) -> Result<(), PoolError> {
        self.inner.lock().move_to_end(id)
    }

    pub fn resolve(&self) -> Result<Resolution, ResolutionError> {
        self.inner.lock().resolve()
    }

    /// Run `f` with exclusive access to the context.
    pub fn with<R>(&self, f: impl FnOnce(&mut ModContext) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// A copy of the current context.
    pub fn snapshot(&self) -> ModContext {
        self.inner.lock().clone()
    }
}

impl From<ModContext> for SharedModContext {
    fn from(context: ModContext) -> Self {
        Self::new(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modorder_core::relation::Relation;

    fn ids(modules: &[Module]) -> Vec<&str> {
        modules.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn resolve_assigns_load_orders() {
        let mut ctx = ModContext::new(
            vec![Module::new("b", "Bravo"), Module::new("a", "Alpha")],
            vec![],
            ResolverConfig::default(),
        );
        let res = ctx.resolve().unwrap();
        assert_eq!(ids(ctx.active()), vec!["a", "b"]);
        assert_eq!(ctx.active()[0].load_order, Some(1));
        assert_eq!(ctx.active()[1].load_order, Some(2));
        assert_eq!(res.order[1].to_string(), "   2. Bravo (b)");
    }

    #[test]
    fn pool_edits_leave_diagnostics_alone() {
        let mut ctx = ModContext::new(
            vec![Module::new("a", "A").with_relation(Relation::requirement("missing"))],
            vec![Module::new("b", "B")],
            ResolverConfig::default(),
        );
        ctx.resolve().unwrap();
        assert_eq!(ctx.find("a").unwrap().diagnostics.errors.len(), 1);
        ctx.activate("b").unwrap();
        ctx.move_to_end("a").unwrap();
        assert_eq!(ctx.find("a").unwrap().diagnostics.errors.len(), 1);
    }

    #[test]
    fn diagnostics_do_not_accumulate() {
        let mut ctx = ModContext::new(
            vec![Module::new("a", "A").with_relation(Relation::requirement("missing"))],
            vec![],
            ResolverConfig::default(),
        );
        ctx.resolve().unwrap();
        ctx.resolve().unwrap();
        assert_eq!(ctx.find("a").unwrap().diagnostics.errors.len(), 1);
    }

    #[test]
    fn shared_context_serializes_edits() {
        let shared = SharedModContext::new(ModContext::new(
            vec![Module::new("a", "A")],
            vec![Module::new("b", "B")],
            ResolverConfig::default(),
        ));
        let other = shared.clone();
        let handle = std::thread::spawn(move || other.activate("b"));
        handle.join().unwrap().unwrap();
        assert!(shared.snapshot().is_active("b"));
        let res = shared.resolve().unwrap();
        assert_eq!(res.order.len(), 2);
        assert_eq!(shared.with(|ctx| ctx.active().len()), 2);
    }
}
