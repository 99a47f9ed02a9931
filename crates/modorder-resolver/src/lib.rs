//! Load order resolution engine.
//!
//! Builds an ordering graph from the relations declared by active modules,
//! pulls missing requirements out of the inactive pool, arbitrates conflicts
//! and identifier overrides, and produces a deterministic topological order.

pub mod builder;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod expand;
pub mod graph;
pub mod pools;
pub mod sort;

pub use context::{ModContext, OrderedModule, Resolution, SharedModContext};
pub use error::{PoolError, ResolutionError};
