//! Deterministic topological ordering (Kahn's algorithm) with cycle tracing.
//!
//! Among nodes that are ready at the same time, the one with the smallest
//! display name (then id) always goes first, so the result does not depend on
//! insertion order.

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::graph::NodeIndex;

use crate::error::ResolutionError;
use crate::graph::ModuleGraph;

/// Order every node so that each edge points forward.
pub fn topological_order(graph: &ModuleGraph) -> Result<Vec<NodeIndex>, ResolutionError> {
    let mut in_degree: HashMap<NodeIndex, usize> = graph
        .node_indices()
        .map(|idx| (idx, graph.in_degree(idx)))
        .collect();

    let key = |idx: NodeIndex| sort_key(graph, idx);

    let mut ready: BTreeSet<(&str, &str, NodeIndex)> = in_degree
        .iter()
        .filter(|(_, &d)| d == 0)
        .map(|(&idx, _)| key(idx))
        .collect();

    let mut order = Vec::with_capacity(graph.len());
    while let Some((_, _, current)) = ready.pop_first() {
        order.push(current);
        for next in graph.successors_by_name(current) {
            if let Some(d) = in_degree.get_mut(&next) {
                *d -= 1;
                if *d == 0 {
                    ready.insert(key(next));
                }
            }
        }
    }

    if order.len() == graph.len() {
        return Ok(order);
    }

    let placed: HashSet<NodeIndex> = order.into_iter().collect();
    let mut residual: Vec<NodeIndex> = graph
        .node_indices()
        .filter(|idx| !placed.contains(idx))
        .collect();
    residual.sort_by(|a, b| key(*a).cmp(&key(*b)));

    match find_cycle(graph, &residual) {
        Some(cycle) => {
            let trace = cycle
                .iter()
                .map(|&idx| graph.node(idx).name.as_str())
                .collect::<Vec<_>>()
                .join(" -> ");
            tracing::error!("Dependency cycle detected: {trace}");
            Err(ResolutionError::CycleDetected { trace })
        }
        None => {
            let modules: Vec<String> = residual
                .iter()
                .map(|&idx| graph.node(idx).name.clone())
                .collect();
            tracing::error!("Unresolved modules: {}", modules.join(", "));
            Err(ResolutionError::UnresolvedResidue { modules })
        }
    }
}

fn sort_key(graph: &ModuleGraph, idx: NodeIndex) -> (&str, &str, NodeIndex) {
    let node = graph.node(idx);
    (node.name.as_str(), node.id.as_str(), idx)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Open,
    Done,
}

/// Iterative depth-first search for a cycle among `nodes`.
///
/// Returns the cycle as a closed path, e.g. `[a, b, a]`.
fn find_cycle(graph: &ModuleGraph, nodes: &[NodeIndex]) -> Option<Vec<NodeIndex>> {
    let allowed: HashSet<NodeIndex> = nodes.iter().copied().collect();
    let mut marks: HashMap<NodeIndex, Mark> = HashMap::new();

    for &start in nodes {
        if marks.contains_key(&start) {
            continue;
        }
        // (node, successors, next successor to visit)
        let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> =
            vec![(start, graph.successors_by_name(start), 0)];
        marks.insert(start, Mark::Open);

        while let Some(frame) = stack.last_mut() {
            if frame.2 >= frame.1.len() {
                marks.insert(frame.0, Mark::Done);
                stack.pop();
                continue;
            }
            let next = frame.1[frame.2];
            frame.2 += 1;
            if !allowed.contains(&next) {
                continue;
            }
            match marks.get(&next) {
                Some(Mark::Open) => {
                    let from = stack.iter().position(|f| f.0 == next).unwrap_or(0);
                    let mut cycle: Vec<NodeIndex> = stack[from..].iter().map(|f| f.0).collect();
                    cycle.push(next);
                    return Some(cycle);
                }
                Some(Mark::Done) => {}
                None => {
                    marks.insert(next, Mark::Open);
                    stack.push((next, graph.successors_by_name(next), 0));
                }
            }
        }
    }
    None
}
