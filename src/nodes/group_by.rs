// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{self, type_name};
use crate::engine::TransformationEngine;
use crate::errors::NodeExecutionError;
use crate::fields::{FieldType, KeyPath, PathSegment};
use crate::graph::TransformationNode;
use crate::nodes::{check_bindable, input_path, output_path, NodeBehavior};

/// Partitions an array of objects by the value of `subkey`. The i-th output
/// path receives the elements whose `subkey` equals `group_values[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupByOptions {
    pub subkey: String,
    pub group_values: Vec<Value>,
}

impl GroupByOptions {
    /// Element path the grouping key is read from, relative to the grouped array.
    pub fn key_path(&self, array: &KeyPath) -> KeyPath {
        array
            .child(PathSegment::Wildcard)
            .child(PathSegment::key(self.subkey.as_str()))
    }
}

impl NodeBehavior for GroupByOptions {
    fn compute_new_field_type(
        &self,
        _engine: &TransformationEngine,
        _node: &TransformationNode,
        _output_index: usize,
    ) -> FieldType {
        FieldType::Array
    }

    fn check_shape(&self, inputs: &[KeyPath], outputs: &[KeyPath]) -> Result<(), String> {
        if inputs.len() != 1 {
            return Err(format!("expects one array field, got {} input(s)", inputs.len()));
        }
        if outputs.is_empty() || outputs.len() != self.group_values.len() {
            return Err(format!(
                "expects one new path per group value ({}), got {}",
                self.group_values.len(),
                outputs.len()
            ));
        }
        check_bindable(&inputs[0], outputs)
    }

    fn apply(&self, node: &TransformationNode, doc: &mut Value) -> Result<(), NodeExecutionError> {
        let from = input_path(node, 0)?;

        for location in document::resolve(doc, from) {
            let items = match document::get(doc, &location) {
                Some(Value::Array(items)) => items.clone(),
                Some(Value::Null) | None => continue,
                Some(other) => {
                    return Err(NodeExecutionError::TypeMismatch {
                        location: location.to_string(),
                        expected: "array",
                        found: type_name(other),
                    })
                }
            };
            let indices = location.indices();
            for (index, group_value) in self.group_values.iter().enumerate() {
                let group: Vec<Value> = items
                    .iter()
                    .filter(|item| item.get(&self.subkey) == Some(group_value))
                    .cloned()
                    .collect();
                if let Some(target) = document::bind(output_path(node, index)?, &indices) {
                    document::set(doc, &target, Value::Array(group))?;
                }
            }
        }
        Ok(())
    }
}
