// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Arena-backed transformation DAG.
//!
//! Nodes live in a `BTreeMap` keyed by [`NodeId`]; adjacency is stored by
//! handle in both directions. Edges are attributes on ordered node pairs:
//! setting an edge on a pair that already has one replaces its type.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::graph::{NodeId, TransformationNode};

/// Kind of dependency an edge expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    /// Pure value ordering
    Same,
    /// Structural completion of the source must precede consumers of the target
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "DagRepr", try_from = "DagRepr")]
pub struct Dag {
    nodes: BTreeMap<NodeId, TransformationNode>,
    successors: BTreeMap<NodeId, BTreeMap<NodeId, EdgeType>>,
    predecessors: BTreeMap<NodeId, BTreeSet<NodeId>>,
}

impl Dag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_node(&mut self, node: TransformationNode) {
        let id = node.id;
        self.nodes.insert(id, node);
        self.successors.entry(id).or_default();
        self.predecessors.entry(id).or_default();
    }

    /// Remove a node and every edge touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Option<TransformationNode> {
        let node = self.nodes.remove(&id)?;
        if let Some(outgoing) = self.successors.remove(&id) {
            for to in outgoing.keys() {
                if let Some(preds) = self.predecessors.get_mut(to) {
                    preds.remove(&id);
                }
            }
        }
        if let Some(incoming) = self.predecessors.remove(&id) {
            for from in incoming {
                if let Some(succs) = self.successors.get_mut(&from) {
                    succs.remove(&id);
                }
            }
        }
        Some(node)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&TransformationNode> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut TransformationNode> {
        self.nodes.get_mut(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TransformationNode> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Set (or retype) the edge `from -> to`. Both nodes must exist.
    pub fn set_edge(&mut self, from: NodeId, to: NodeId, edge_type: EdgeType) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        self.successors.entry(from).or_default().insert(to, edge_type);
        self.predecessors.entry(to).or_default().insert(from);
        true
    }

    pub fn remove_edge(&mut self, from: NodeId, to: NodeId) -> Option<EdgeType> {
        let removed = self.successors.get_mut(&from)?.remove(&to)?;
        if let Some(preds) = self.predecessors.get_mut(&to) {
            preds.remove(&from);
        }
        Some(removed)
    }

    pub fn edge(&self, from: NodeId, to: NodeId) -> Option<EdgeType> {
        self.successors.get(&from)?.get(&to).copied()
    }

    /// Outgoing edges of `id` in target order.
    pub fn successors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, EdgeType)> + '_ {
        self.successors
            .get(&id)
            .into_iter()
            .flat_map(|succs| succs.iter().map(|(to, ty)| (*to, *ty)))
    }

    pub fn predecessors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.predecessors
            .get(&id)
            .into_iter()
            .flat_map(|preds| preds.iter().copied())
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.successors.iter().flat_map(|(from, succs)| {
            succs.iter().map(move |(to, ty)| Edge {
                from: *from,
                to: *to,
                edge_type: *ty,
            })
        })
    }

    /// Nodes without incoming edges.
    pub fn sources(&self) -> Vec<NodeId> {
        self.nodes
            .keys()
            .filter(|id| self.predecessors.get(id).map_or(true, BTreeSet::is_empty))
            .copied()
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DagRepr {
    nodes: Vec<TransformationNode>,
    edges: Vec<Edge>,
}

impl From<Dag> for DagRepr {
    fn from(dag: Dag) -> Self {
        let edges = dag.edges().collect();
        Self {
            nodes: dag.nodes.into_values().collect(),
            edges,
        }
    }
}

impl TryFrom<DagRepr> for Dag {
    type Error = String;

    fn try_from(repr: DagRepr) -> Result<Self, Self::Error> {
        let mut dag = Dag::new();
        for node in repr.nodes {
            if dag.contains(node.id) {
                return Err(format!("duplicate node id {}", node.id));
            }
            dag.insert_node(node);
        }
        for edge in repr.edges {
            if !dag.set_edge(edge.from, edge.to, edge.edge_type) {
                return Err(format!(
                    "edge {} -> {} references a node that does not exist",
                    edge.from, edge.to
                ));
            }
        }
        Ok(dag)
    }
}
