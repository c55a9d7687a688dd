// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::errors::NodeExecutionError;
use crate::graph::TransformationNode;
use crate::nodes::NodeBehavior;

/// Provenance state an identity node anchors for its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IdentityKind {
    /// The field exists in source documents
    Organic,
    /// The field was created by a transformation
    Synthetic,
    /// The field was logically deleted
    Removal,
    /// The field was relocated by a rename
    Rename,
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityOptions {
    pub identity_type: IdentityKind,
}

/// Identity nodes only anchor ordering; they never change values.
impl NodeBehavior for IdentityOptions {
    fn apply(&self, _node: &TransformationNode, _doc: &mut Value) -> Result<(), NodeExecutionError> {
        Ok(())
    }
}
