// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Node-type registry.
//!
//! Every transformation kind is a variant of [`NodeKind`], carrying its own
//! options. [`NodeKind::behavior`] maps each variant onto the
//! [`NodeBehavior`] that supplies type inference for the graph-construction
//! engine and the value transform `transform` replays. The match is
//! exhaustive, so adding a kind without its behavior does not compile.

mod cast;
mod duplicate;
mod group_by;
mod identity;
mod rename;
mod split_join;
mod text;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::document::{self, type_name};
use crate::engine::TransformationEngine;
use crate::errors::NodeExecutionError;
use crate::fields::{FieldType, KeyPath};
use crate::graph::TransformationNode;

pub use cast::CastTypeOptions;
pub use duplicate::{DuplicateNode, DuplicationShape};
pub use group_by::GroupByOptions;
pub use identity::{IdentityKind, IdentityOptions};
pub use rename::RenameNode;
pub use split_join::{JoinOptions, SplitOptions};
pub use text::{AppendOptions, CapitalizeNode, PrependOptions, SubstringOptions};

/// Type-specific behavior of a transformation kind.
pub trait NodeBehavior {
    /// Type the `input_index`-th input field has after this node runs.
    fn compute_new_source_type(
        &self,
        engine: &TransformationEngine,
        node: &TransformationNode,
        input_index: usize,
    ) -> FieldType {
        node.fields
            .get(input_index)
            .and_then(|field| engine.get_field_type(field.id))
            .unwrap_or_default()
    }

    /// Type of the field created at the `output_index`-th declared output path.
    fn compute_new_field_type(
        &self,
        _engine: &TransformationEngine,
        _node: &TransformationNode,
        _output_index: usize,
    ) -> FieldType {
        FieldType::String
    }

    /// Reject input and output paths this kind cannot work with.
    fn check_shape(&self, inputs: &[KeyPath], outputs: &[KeyPath]) -> Result<(), String> {
        if inputs.len() != 1 || !outputs.is_empty() {
            return Err(format!(
                "expects exactly one input field and no outputs, got {} input(s) and {} output(s)",
                inputs.len(),
                outputs.len()
            ));
        }
        Ok(())
    }

    /// Apply the value transform to the working document.
    fn apply(&self, node: &TransformationNode, doc: &mut Value) -> Result<(), NodeExecutionError>;
}

/// Transformation kinds and their options. Persisted with the tag `typeCode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "typeCode")]
pub enum NodeKind {
    Identity(IdentityOptions),
    Rename,
    Capitalize,
    Substring(SubstringOptions),
    Append(AppendOptions),
    Prepend(PrependOptions),
    Split(SplitOptions),
    Join(JoinOptions),
    Duplicate,
    GroupBy(GroupByOptions),
    CastType(CastTypeOptions),
}

impl NodeKind {
    pub fn identity(kind: IdentityKind) -> Self {
        NodeKind::Identity(IdentityOptions { identity_type: kind })
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Identity(_) => NodeType::Identity,
            NodeKind::Rename => NodeType::Rename,
            NodeKind::Capitalize => NodeType::Capitalize,
            NodeKind::Substring(_) => NodeType::Substring,
            NodeKind::Append(_) => NodeType::Append,
            NodeKind::Prepend(_) => NodeType::Prepend,
            NodeKind::Split(_) => NodeType::Split,
            NodeKind::Join(_) => NodeType::Join,
            NodeKind::Duplicate => NodeType::Duplicate,
            NodeKind::GroupBy(_) => NodeType::GroupBy,
            NodeKind::CastType(_) => NodeType::CastType,
        }
    }

    pub fn behavior(&self) -> &dyn NodeBehavior {
        match self {
            NodeKind::Identity(options) => options,
            NodeKind::Rename => &RenameNode,
            NodeKind::Capitalize => &CapitalizeNode,
            NodeKind::Substring(options) => options,
            NodeKind::Append(options) => options,
            NodeKind::Prepend(options) => options,
            NodeKind::Split(options) => options,
            NodeKind::Join(options) => options,
            NodeKind::Duplicate => &DuplicateNode,
            NodeKind::GroupBy(options) => options,
            NodeKind::CastType(options) => options,
        }
    }
}

/// Plain type code of a [`NodeKind`], without its options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeType {
    Identity,
    Rename,
    Capitalize,
    Substring,
    Append,
    Prepend,
    Split,
    Join,
    Duplicate,
    GroupBy,
    CastType,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Path of the `index`-th declared input, or an error naming the node.
pub(crate) fn input_path(node: &TransformationNode, index: usize) -> Result<&KeyPath, NodeExecutionError> {
    node.fields
        .get(index)
        .map(|field| &field.path)
        .ok_or_else(|| NodeExecutionError::Unwritable {
            location: format!("node {}", node.id),
            reason: format!("missing input #{}", index),
        })
}

/// Path of the `index`-th declared output, or an error naming the node.
pub(crate) fn output_path(node: &TransformationNode, index: usize) -> Result<&KeyPath, NodeExecutionError> {
    node.meta
        .new_field_key_paths
        .get(index)
        .ok_or_else(|| NodeExecutionError::Unwritable {
            location: format!("node {}", node.id),
            reason: format!("missing output #{}", index),
        })
}

/// Outputs are written by binding the wildcards of the input they came from,
/// so an output may not have more wildcards than `source`.
pub(crate) fn check_bindable(source: &KeyPath, outputs: &[KeyPath]) -> Result<(), String> {
    match outputs
        .iter()
        .find(|output| output.wildcard_count() > source.wildcard_count())
    {
        Some(output) => Err(format!(
            "output '{}' has more wildcards than input '{}'",
            output, source
        )),
        None => Ok(()),
    }
}

/// Rewrite every string found at the node's first input. `null`s are left alone.
pub(crate) fn map_strings<F>(node: &TransformationNode, doc: &mut Value, f: F) -> Result<(), NodeExecutionError>
where
    F: Fn(&str) -> String,
{
    let path = input_path(node, 0)?;
    for location in document::resolve(doc, path) {
        let Some(slot) = document::get_mut(doc, &location) else {
            continue;
        };
        match slot {
            Value::String(text) => *text = f(text),
            Value::Null => {}
            other => {
                return Err(NodeExecutionError::TypeMismatch {
                    location: location.to_string(),
                    expected: "string",
                    found: type_name(other),
                })
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kinds_serialize_with_type_code_tag() {
        let kind = NodeKind::Substring(SubstringOptions {
            from: 0,
            length: Some(2),
        });
        assert_eq!(
            serde_json::to_value(&kind).unwrap(),
            json!({"typeCode": "Substring", "from": 0, "length": 2})
        );
        assert_eq!(serde_json::to_value(&NodeKind::Rename).unwrap(), json!({"typeCode": "Rename"}));
        assert_eq!(
            serde_json::to_value(NodeKind::identity(IdentityKind::Removal)).unwrap(),
            json!({"typeCode": "Identity", "identityType": "Removal"})
        );
    }

    #[test]
    fn test_kinds_deserialize_from_type_code() {
        let kind: NodeKind =
            serde_json::from_value(json!({"typeCode": "CastType", "toType": "number"})).unwrap();
        assert_eq!(
            kind,
            NodeKind::CastType(CastTypeOptions {
                to_type: FieldType::Number
            })
        );
        assert_eq!(kind.node_type(), NodeType::CastType);
    }
}
