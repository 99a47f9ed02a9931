//! Errors surfaced by the engine to its callers.

use miette::Diagnostic;
use thiserror::Error;

/// A resolution attempt that could not produce an order.
///
/// The active pool is left exactly as it was before the attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ResolutionError {
    /// The ordering constraints contain a cycle.
    #[error("dependency cycle detected: {trace}")]
    #[diagnostic(help("deactivate one of the modules in the cycle and resolve again"))]
    CycleDetected { trace: String },

    /// Modules could not be placed and no cycle explains it.
    #[error("unresolved modules remain: {}", modules.join(", "))]
    UnresolvedResidue { modules: Vec<String> },
}

/// A rejected pool edit.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum PoolError {
    #[error("no module with id '{id}'")]
    UnknownModule { id: String },

    #[error("module '{id}' is already active")]
    AlreadyActive { id: String },

    #[error("module '{id}' is already inactive")]
    AlreadyInactive { id: String },

    #[error("modules '{first}' and '{second}' are in different pools")]
    #[diagnostic(help("swap only reorders modules within the same pool"))]
    DifferentPools { first: String, second: String },
}
