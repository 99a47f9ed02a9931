//! Ordering graph over active modules.

use std::collections::HashMap;
use std::fmt;

use modorder_core::module::Module;
use modorder_core::relation::RelationKind;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// A node in the ordering graph.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ModuleNode {
    pub id: String,
    pub name: String,
}

impl fmt::Display for ModuleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Why an edge "source loads before target" exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeOrigin {
    /// Declared by a relation on `declared_by`.
    Relation {
        declared_by: String,
        kind: RelationKind,
    },
    /// The source adds `identifier` and the target overrides it.
    Override { identifier: String },
}

impl fmt::Display for EdgeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relation { declared_by, kind } => write!(f, "{kind} declared by {declared_by}"),
            Self::Override { identifier } => write!(f, "override of '{identifier}'"),
        }
    }
}

/// Ordering constraints between active modules, backed by petgraph.
///
/// An edge `u -> v` means `u` must be loaded before `v`.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    graph: DiGraph<ModuleNode, EdgeOrigin>,
    index: HashMap<String, NodeIndex>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph with one node per module, in slice order.
    pub fn from_modules(modules: &[Module]) -> Self {
        let mut g = Self::new();
        for m in modules {
            g.add_node(&m.id, m.display_name());
        }
        g
    }

    /// Add or retrieve a node. If the id already exists, returns the existing index.
    pub fn add_node(&mut self, id: &str, name: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(ModuleNode {
            id: id.to_string(),
            name: name.to_string(),
        });
        self.index.insert(id.to_string(), idx);
        idx
    }

    /// Add an ordering edge between two known nodes.
    ///
    /// Returns `false` if either endpoint is unknown or the edge already exists;
    /// the first origin recorded for a pair is kept.
    pub fn add_edge(&mut self, before: &str, after: &str, origin: EdgeOrigin) -> bool {
        let (Some(&from), Some(&to)) = (self.index.get(before), self.index.get(after)) else {
            return false;
        };
        if self.graph.edges(from).any(|e| e.target() == to) {
            return false;
        }
        self.graph.add_edge(from, to, origin);
        true
    }

    /// Look up a node by module id.
    pub fn find(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &ModuleNode {
        &self.graph[idx]
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn in_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Incoming).count()
    }

    /// Successors of a node ordered by display name, then id.
    pub fn successors_by_name(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.target())
            .collect();
        out.sort_by(|a, b| {
            let (na, nb) = (&self.graph[*a], &self.graph[*b]);
            (na.name.as_str(), na.id.as_str()).cmp(&(nb.name.as_str(), nb.id.as_str()))
        });
        out
    }

    /// Whether `before -> after` is an edge.
    pub fn has_edge(&self, before: &str, after: &str) -> bool {
        match (self.find(before), self.find(after)) {
            (Some(from), Some(to)) => self.graph.contains_edge(from, to),
            _ => false,
        }
    }

    /// All edges as `(before id, after id, origin)`.
    pub fn edges(&self) -> Vec<(&str, &str, &EdgeOrigin)> {
        self.graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].id.as_str(),
                    self.graph[e.target()].id.as_str(),
                    e.weight(),
                )
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
