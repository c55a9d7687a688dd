// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Execution order computation.
//!
//! The persisted DAG only records provenance; on its own it leaves many nodes
//! incomparable. [`compute_execution_order`] builds a throwaway adjacency map
//! from it and adds two kinds of helper edges before sorting:
//!
//! 1. For every non-`Synthetic` edge `(v, w)`, each `Synthetic` successor `s`
//!    of `v` gets an edge `s -> w`, so structural completion anchored at `v`
//!    precedes any other reader of `v`'s fields. Only edges pointing forward in
//!    creation order are added; a completion anchor created after `w` cannot
//!    be something `w` waits on.
//! 2. Consecutive nodes of the chronological append order are chained.
//!
//! The helper edges never touch the persisted graph.
//!
//! Sorting is Kahn's algorithm with an ordered ready set, so two engines built
//! from the same call sequence always produce the same order. Identity nodes
//! only anchor ordering and are dropped from the result.

use std::collections::{BTreeMap, BTreeSet};

use crate::errors::EngineError;
use crate::graph::{Dag, EdgeType, NodeId};
use crate::observability::messages::engine::ExecutionOrderComputed;
use crate::observability::messages::validation::CyclicGraphDetected;
use crate::observability::messages::StructuredLog;

/// Compute the node sequence `transform` replays.
///
/// Fails with [`EngineError::CyclicGraph`] before producing any order if the
/// augmented graph has a cycle.
pub fn compute_execution_order(
    dag: &Dag,
    chronological: &[NodeId],
) -> Result<Vec<NodeId>, EngineError> {
    let adjacency = augmented_adjacency(dag, chronological);
    let sorted = topological_sort(&adjacency)?;

    let order: Vec<NodeId> = sorted
        .into_iter()
        .filter(|id| dag.node(*id).map_or(false, |node| !node.is_identity()))
        .collect();

    ExecutionOrderComputed {
        node_count: dag.len(),
        executable_count: order.len(),
    }
    .log();

    Ok(order)
}

fn augmented_adjacency(dag: &Dag, chronological: &[NodeId]) -> BTreeMap<NodeId, BTreeSet<NodeId>> {
    let mut adjacency: BTreeMap<NodeId, BTreeSet<NodeId>> =
        dag.node_ids().map(|id| (id, BTreeSet::new())).collect();

    for edge in dag.edges() {
        adjacency.entry(edge.from).or_default().insert(edge.to);
    }

    for edge in dag.edges().filter(|e| e.edge_type != EdgeType::Synthetic) {
        let anchors = dag
            .successors(edge.from)
            .filter(|(s, ty)| *ty == EdgeType::Synthetic && *s != edge.to && *s < edge.to);
        for (anchor, _) in anchors {
            adjacency.entry(anchor).or_default().insert(edge.to);
        }
    }

    let present: Vec<NodeId> = chronological
        .iter()
        .copied()
        .filter(|id| dag.contains(*id))
        .collect();
    for pair in present.windows(2) {
        if pair[0] != pair[1] {
            adjacency.entry(pair[0]).or_default().insert(pair[1]);
        }
    }

    adjacency
}

/// Kahn's algorithm; the smallest ready handle is always emitted first.
fn topological_sort(
    adjacency: &BTreeMap<NodeId, BTreeSet<NodeId>>,
) -> Result<Vec<NodeId>, EngineError> {
    let mut in_degree: BTreeMap<NodeId, usize> = adjacency.keys().map(|id| (*id, 0)).collect();
    for targets in adjacency.values() {
        for target in targets {
            *in_degree.entry(*target).or_insert(0) += 1;
        }
    }

    let mut ready: BTreeSet<NodeId> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut result = Vec::with_capacity(in_degree.len());

    while let Some(node) = ready.pop_first() {
        result.push(node);
        if let Some(targets) = adjacency.get(&node) {
            for target in targets {
                if let Some(degree) = in_degree.get_mut(target) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(*target);
                    }
                }
            }
        }
    }

    if result.len() != in_degree.len() {
        let emitted: BTreeSet<NodeId> = result.iter().copied().collect();
        let unresolved: Vec<NodeId> = in_degree
            .keys()
            .filter(|id| !emitted.contains(id))
            .copied()
            .collect();
        CyclicGraphDetected { nodes: &unresolved }.log();
        return Err(EngineError::CyclicGraph { nodes: unresolved });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldId;
    use crate::graph::{FieldRef, NodeMeta, TransformationNode};
    use crate::nodes::{IdentityKind, NodeKind};

    fn add(dag: &mut Dag, id: u32, kind: NodeKind) {
        dag.insert_node(TransformationNode {
            id: NodeId(id),
            kind,
            fields: vec![FieldRef {
                id: FieldId(0),
                path: "a".parse().unwrap(),
            }],
            meta: NodeMeta::default(),
        });
    }

    fn identity(kind: IdentityKind) -> NodeKind {
        NodeKind::identity(kind)
    }

    #[test]
    fn test_identity_nodes_are_dropped() {
        let mut dag = Dag::new();
        add(&mut dag, 0, identity(IdentityKind::Organic));
        add(&mut dag, 1, NodeKind::Capitalize);
        dag.set_edge(NodeId(0), NodeId(1), EdgeType::Same);

        let order = compute_execution_order(&dag, &[NodeId(1)]).unwrap();
        assert_eq!(order, vec![NodeId(1)]);
    }

    #[test]
    fn test_chronological_order_breaks_ties() {
        let mut dag = Dag::new();
        add(&mut dag, 0, NodeKind::Capitalize);
        add(&mut dag, 1, NodeKind::Capitalize);
        add(&mut dag, 2, NodeKind::Capitalize);

        let order = compute_execution_order(&dag, &[NodeId(2), NodeId(0), NodeId(1)]).unwrap();
        assert_eq!(order, vec![NodeId(2), NodeId(0), NodeId(1)]);
    }

    #[test]
    fn test_synthetic_anchor_precedes_same_consumer() {
        // 0 -Synthetic-> 1 and 0 -Same-> 2; 1 also waits on 3. Without the
        // helper edge 1 -> 2 the consumer 2 would be emitted before 3 and 1.
        let mut dag = Dag::new();
        add(&mut dag, 0, identity(IdentityKind::Organic));
        add(&mut dag, 1, NodeKind::Capitalize);
        add(&mut dag, 2, NodeKind::Capitalize);
        add(&mut dag, 3, NodeKind::Capitalize);
        dag.set_edge(NodeId(0), NodeId(1), EdgeType::Synthetic);
        dag.set_edge(NodeId(0), NodeId(2), EdgeType::Same);
        dag.set_edge(NodeId(3), NodeId(1), EdgeType::Same);

        let order = compute_execution_order(&dag, &[]).unwrap();
        assert_eq!(order, vec![NodeId(3), NodeId(1), NodeId(2)]);

        let adjacency = augmented_adjacency(&dag, &[]);
        assert!(adjacency[&NodeId(1)].contains(&NodeId(2)));
        // the persisted graph is untouched
        assert_eq!(dag.edge(NodeId(1), NodeId(2)), None);
    }

    #[test]
    fn test_helper_edges_never_point_backwards() {
        // anchor 2 was created after consumer 1, so no 2 -> 1 helper edge
        let mut dag = Dag::new();
        add(&mut dag, 0, NodeKind::Capitalize);
        add(&mut dag, 1, NodeKind::Capitalize);
        add(&mut dag, 2, NodeKind::Capitalize);
        dag.set_edge(NodeId(0), NodeId(1), EdgeType::Same);
        dag.set_edge(NodeId(0), NodeId(2), EdgeType::Synthetic);

        let order = compute_execution_order(&dag, &[NodeId(0), NodeId(1), NodeId(2)]).unwrap();
        assert_eq!(order, vec![NodeId(0), NodeId(1), NodeId(2)]);
    }

    #[test]
    fn test_cycle_is_reported_before_any_order() {
        let mut dag = Dag::new();
        add(&mut dag, 0, NodeKind::Capitalize);
        add(&mut dag, 1, NodeKind::Capitalize);
        add(&mut dag, 2, NodeKind::Capitalize);
        dag.set_edge(NodeId(1), NodeId(0), EdgeType::Same);

        let err = compute_execution_order(&dag, &[NodeId(0), NodeId(1), NodeId(2)]).unwrap_err();
        match err {
            EngineError::CyclicGraph { nodes } => {
                assert_eq!(nodes, vec![NodeId(0), NodeId(1), NodeId(2)]);
            }
            other => panic!("expected CyclicGraph, got {other}"),
        }
    }

    #[test]
    fn test_deleted_nodes_in_chronology_are_ignored() {
        let mut dag = Dag::new();
        add(&mut dag, 0, NodeKind::Capitalize);
        add(&mut dag, 2, NodeKind::Capitalize);
        let order = compute_execution_order(&dag, &[NodeId(0), NodeId(1), NodeId(2)]).unwrap();
        assert_eq!(order, vec![NodeId(0), NodeId(2)]);
    }
}
