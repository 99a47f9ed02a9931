//! Graph construction from declared relations.
//!
//! Building runs in sweeps over the live active pool. A sweep evaluates every
//! relation of every active module against the active set as it stands at
//! that moment, activates missing requirements from the inactive pool, and
//! records ordering edges and diagnostics. Modules activated during a sweep
//! are appended to the pool and therefore visited later in the same sweep.
//!
//! Any activation makes the sweep's view of conditions stale, so the whole
//! sweep is repeated from scratch until one completes without activating
//! anything. Bans are part of that per-sweep state: a conditional conflict
//! that stopped applying after an activation no longer excludes its target.
//! Activations themselves are never undone. The graph, diagnostics and bans
//! of the final sweep are the result; every condition in it was evaluated
//! against the final active set.

use std::collections::{BTreeSet, HashMap};

use modorder_core::config::ResolverConfig;
use modorder_core::module::Module;
use modorder_core::relation::{ConflictLevel, Relation, RelationKind};

use crate::diagnostics::{DiagnosticsReport, IssueKind, Severity};
use crate::expand::{expand, ExpandResult};
use crate::graph::{EdgeOrigin, ModuleGraph};
use crate::pools::Pools;

/// Result of graph construction.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub graph: ModuleGraph,
    pub report: DiagnosticsReport,
    /// Modules moved from the inactive pool, in activation order.
    pub activated: Vec<String>,
    /// Identifiers excluded from activation by error-level conflicts in the
    /// final sweep.
    pub banned: BTreeSet<String>,
    /// Number of sweeps performed.
    pub passes: usize,
    /// `false` if the active set was still changing when the pass limit hit.
    pub stable: bool,
}

/// Build the ordering graph, activating missing requirements in `pools`.
pub fn build(pools: &mut Pools, config: &ResolverConfig) -> BuildOutput {
    let mut activated = Vec::new();
    let max_passes = config.max_passes.max(1);

    let mut pass = 0;
    loop {
        pass += 1;
        let before = activated.len();
        let mut banned = collect_bans(pools);
        let (graph, report) = sweep(pools, &mut banned, &mut activated, config);
        let newly = activated.len() - before;

        if newly == 0 {
            tracing::debug!(
                "Graph built after {pass} pass(es): {} modules, {} edges",
                graph.len(),
                graph.edge_count()
            );
            return BuildOutput {
                graph,
                report,
                activated,
                banned,
                passes: pass,
                stable: true,
            };
        }
        if pass >= max_passes {
            tracing::warn!("Active set still changing after {pass} passes, giving up");
            return BuildOutput {
                graph,
                report,
                activated,
                banned,
                passes: pass,
                stable: false,
            };
        }
        tracing::debug!("Pass {pass} activated {newly} module(s), rebuilding");
    }
}

/// Outcome of evaluating a relation's condition.
enum Gate {
    Open,
    Closed,
    Malformed(String),
}

fn gate(relation: &Relation, pools: &Pools) -> Gate {
    match relation.condition {
        None => Gate::Open,
        Some(ref condition) => match condition.evaluate(pools.active_ids()) {
            Ok(true) => Gate::Open,
            Ok(false) => Gate::Closed,
            Err(e) => Gate::Malformed(e.to_string()),
        },
    }
}

/// Targets of every error-level conflict that applies to the current active
/// set. No requirement may pull these in during the sweep.
fn collect_bans(pools: &Pools) -> BTreeSet<String> {
    let mut banned = BTreeSet::new();
    for module in pools.active() {
        for relation in &module.relations {
            if relation.kind == RelationKind::Conflict
                && relation.target != module.id
                && matches!(gate(relation, pools), Gate::Open)
                && relation.conflict_level() == ConflictLevel::Error
            {
                banned.insert(relation.target.clone());
            }
        }
    }
    banned
}

struct Sweep<'a> {
    pools: &'a mut Pools,
    banned: &'a mut BTreeSet<String>,
    activated: &'a mut Vec<String>,
    config: &'a ResolverConfig,
    report: DiagnosticsReport,
    edges: Vec<(String, String, EdgeOrigin)>,
}

fn sweep(
    pools: &mut Pools,
    banned: &mut BTreeSet<String>,
    activated: &mut Vec<String>,
    config: &ResolverConfig,
) -> (ModuleGraph, DiagnosticsReport) {
    let mut state = Sweep {
        pools,
        banned,
        activated,
        config,
        report: DiagnosticsReport::new(),
        edges: Vec::new(),
    };

    // Indexing instead of iterating: expansion appends to the active pool.
    let mut i = 0;
    while i < state.pools.active().len() {
        let module_id = state.pools.active()[i].id.clone();
        let relations = state.pools.active()[i].relations.clone();
        for relation in &relations {
            state.process_relation(&module_id, relation);
        }
        i += 1;
    }

    let Sweep {
        pools,
        edges,
        mut report,
        ..
    } = state;
    let mut graph = ModuleGraph::from_modules(pools.active());
    for (before, after, origin) in edges {
        if graph.find(&before).is_none() || graph.find(&after).is_none() {
            tracing::warn!("Dropping edge {before} -> {after}: endpoint is not active");
            continue;
        }
        graph.add_edge(&before, &after, origin);
    }
    add_identifier_edges(pools.active(), &mut graph, &mut report);
    (graph, report)
}

impl Sweep<'_> {
    fn process_relation(&mut self, module_id: &str, relation: &Relation) {
        match gate(relation, self.pools) {
            Gate::Open => {}
            Gate::Closed => {
                tracing::debug!("Skipping '{relation}' on {module_id}: condition is false");
                return;
            }
            Gate::Malformed(reason) => {
                self.report.error(module_id, IssueKind::ConditionSyntax, reason);
                return;
            }
        }

        let target = relation.target.as_str();
        if target == module_id {
            tracing::debug!("Ignoring '{relation}' on {module_id}: module refers to itself");
            return;
        }

        if relation.kind == RelationKind::Conflict {
            self.conflict(module_id, relation);
            return;
        }

        if !self.pools.is_active(target) && !self.satisfy(module_id, relation) {
            return;
        }

        let origin = EdgeOrigin::Relation {
            declared_by: module_id.to_string(),
            kind: relation.kind,
        };
        match relation.kind {
            RelationKind::Requirement | RelationKind::OptionalRequirement => {
                self.edges.push((target.to_string(), module_id.to_string(), origin));
            }
            RelationKind::Patch | RelationKind::OptionalPatch => {
                self.edges.push((module_id.to_string(), target.to_string(), origin));
            }
            RelationKind::RequiredAnyOrder | RelationKind::Conflict => {}
        }
    }

    fn conflict(&mut self, module_id: &str, relation: &Relation) {
        let target = relation.target.as_str();
        let level = relation.conflict_level();
        if self.pools.is_active(target) {
            let message = format!(
                "conflicts with '{}' ({target}): {}",
                self.pools.display_name(target),
                relation.message()
            );
            let severity = match level {
                ConflictLevel::Warning => Severity::Warning,
                ConflictLevel::Error => {
                    tracing::error!(
                        "Conflict detected between '{}' and '{}'",
                        self.pools.display_name(module_id),
                        self.pools.display_name(target)
                    );
                    Severity::Error
                }
            };
            self.report
                .push(module_id, IssueKind::ConflictDetected, severity, message);
        }
        if level == ConflictLevel::Error {
            self.banned.insert(target.to_string());
        }
    }

    /// Try to make the inactive target of a relation active.
    ///
    /// Returns `true` if the target is active afterwards.
    fn satisfy(&mut self, module_id: &str, relation: &Relation) -> bool {
        let target = relation.target.as_str();
        if !relation.kind.is_requirement_like() {
            tracing::debug!("'{target}' patched by {module_id} is not active");
            return false;
        }
        let optional = relation.kind.is_optional();
        if optional && !self.config.expand_optional {
            tracing::debug!("Not expanding optional requirement '{target}' of {module_id}");
            return false;
        }
        match expand(target, self.pools, self.banned) {
            ExpandResult::Activated => {
                self.activated.push(target.to_string());
                true
            }
            ExpandResult::AlreadyActive => true,
            ExpandResult::NotFound => {
                if optional {
                    tracing::debug!("Optional requirement '{target}' of {module_id} not found");
                } else {
                    tracing::warn!("Requirement '{target}' of {module_id} not found");
                    self.report.error(
                        module_id,
                        IssueKind::MissingRequiredModule,
                        format!("requires '{target}' which is not installed"),
                    );
                }
                false
            }
            ExpandResult::Banned => {
                if !optional {
                    let message = format!(
                        "requires '{}' ({target}) which is excluded by a conflict",
                        self.pools.display_name(target)
                    );
                    self.report
                        .error(module_id, IssueKind::BannedByConflict, message);
                }
                false
            }
        }
    }
}

/// Order definers of an identifier before the modules overriding it.
///
/// The first active module adding an identifier owns it; later modules adding
/// the same identifier are only warned about.
fn add_identifier_edges(
    active: &[Module],
    graph: &mut ModuleGraph,
    report: &mut DiagnosticsReport,
) {
    let mut owners: HashMap<&str, &Module> = HashMap::new();
    for module in active {
        for id in &module.adds {
            if let Some(owner) = owners.get(id.as_str()).copied() {
                report.warning(
                    &module.id,
                    IssueKind::OverrideShadowed,
                    format!(
                        "adds identifier '{id}' already added by '{}' ({})",
                        owner.display_name(),
                        owner.id
                    ),
                );
            } else {
                owners.insert(id.as_str(), module);
            }
        }
    }

    for module in active {
        if module.settings.ignore_override_check() {
            continue;
        }
        for id in &module.overrides {
            let Some(owner) = owners.get(id.as_str()).copied() else {
                continue;
            };
            if owner.id == module.id {
                continue;
            }
            graph.add_edge(
                &owner.id,
                &module.id,
                EdgeOrigin::Override {
                    identifier: id.clone(),
                },
            );
            report.warning(
                &module.id,
                IssueKind::OverrideShadowed,
                format!(
                    "overrides identifier '{id}' added by '{}' ({})",
                    owner.display_name(),
                    owner.id
                ),
            );
        }
    }
}
