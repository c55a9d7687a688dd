// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by structural edits and by `transform`.

use thiserror::Error;

use crate::errors::NodeExecutionError;
use crate::fields::{FieldId, KeyPath};
use crate::graph::NodeId;
use crate::nodes::NodeType;

/// Fail-fast precondition and execution errors of the transformation engine.
///
/// Structural edits validate before they mutate anything, so an `Err` from
/// any engine method leaves the engine exactly as it was.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Field {0} does not exist")]
    UnknownField(FieldId),

    #[error("No live field exists at path '{0}'")]
    UnknownPath(KeyPath),

    #[error("'{0}' is not a valid field path")]
    InvalidPath(KeyPath),

    #[error("Field {existing} already exists at path '{path}'")]
    FieldAlreadyExists { path: KeyPath, existing: FieldId },

    #[error("Field {0} was produced by a transformation; only organic fields can be deleted")]
    NotOrganic(FieldId),

    #[error("Transformation node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("Cannot create a many-to-many duplication.")]
    ManyToManyDuplication,

    #[error("Cannot duplicate '{from}' to '{to}': {reason}")]
    UnsupportedDuplication {
        from: KeyPath,
        to: KeyPath,
        reason: &'static str,
    },

    #[error("Cannot rename '{from}' to '{to}': {reason}")]
    InvalidRename {
        from: KeyPath,
        to: KeyPath,
        reason: String,
    },

    #[error("Invalid {node_type} transformation: {reason}")]
    InvalidOptions { node_type: NodeType, reason: String },

    #[error("Transformation graph is cyclic; unresolved nodes: {}", join_ids(.nodes))]
    CyclicGraph { nodes: Vec<NodeId> },

    #[error("Transformation node {node_id} failed: {source}")]
    NodeFailed {
        node_id: NodeId,
        #[source]
        source: NodeExecutionError,
    },

    #[error("Invalid engine snapshot: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Inconsistent engine snapshot: {0}")]
    InvalidSnapshot(String),
}

fn join_ids(nodes: &[NodeId]) -> String {
    nodes
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyclic_graph_message_lists_nodes() {
        let err = EngineError::CyclicGraph {
            nodes: vec![NodeId(3), NodeId(7)],
        };
        assert_eq!(
            err.to_string(),
            "Transformation graph is cyclic; unresolved nodes: 3, 7"
        );
    }

    #[test]
    fn test_many_to_many_message() {
        assert_eq!(
            EngineError::ManyToManyDuplication.to_string(),
            "Cannot create a many-to-many duplication."
        );
    }
}
