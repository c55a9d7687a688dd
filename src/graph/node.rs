// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::fields::{FieldId, FieldType, KeyPath};
use crate::nodes::{IdentityKind, NodeKind, NodeType};

/// Integer handle of a node in the transformation DAG. Never reused once allocated,
/// so handle order is creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declared input of a node: the field and the path it had when the node was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRef {
    pub id: FieldId,
    pub path: KeyPath,
}

/// Options shared by every node kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMeta {
    /// Output paths of a structural transformation. Empty for value-only ones.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub new_field_key_paths: Vec<KeyPath>,
    /// Type the first input had before this node changed it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_type: Option<FieldType>,
}

impl NodeMeta {
    pub fn with_outputs(paths: Vec<KeyPath>) -> Self {
        Self {
            new_field_key_paths: paths,
            from_type: None,
        }
    }
}

/// One operation in the transformation DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationNode {
    pub id: NodeId,
    #[serde(flatten)]
    pub kind: NodeKind,
    pub fields: Vec<FieldRef>,
    #[serde(default)]
    pub meta: NodeMeta,
}

impl TransformationNode {
    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    pub fn is_identity(&self) -> bool {
        matches!(self.kind, NodeKind::Identity(_))
    }

    pub fn identity_kind(&self) -> Option<IdentityKind> {
        match self.kind {
            NodeKind::Identity(options) => Some(options.identity_type),
            _ => None,
        }
    }

    pub fn references(&self, field: FieldId) -> bool {
        self.fields.iter().any(|f| f.id == field)
    }

    /// Declared outputs turn a node into a structural transformation.
    pub fn is_structural(&self) -> bool {
        !self.meta.new_field_key_paths.is_empty()
    }
}
