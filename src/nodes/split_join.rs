// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structural string transformations that fan out to, or in from, several fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{self, type_name};
use crate::errors::NodeExecutionError;
use crate::fields::KeyPath;
use crate::graph::TransformationNode;
use crate::nodes::{check_bindable, input_path, output_path, NodeBehavior};

/// Splits one string into as many pieces as there are output paths. The last
/// output receives the unsplit remainder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitOptions {
    pub delimiter: String,
}

impl NodeBehavior for SplitOptions {
    fn check_shape(&self, inputs: &[KeyPath], outputs: &[KeyPath]) -> Result<(), String> {
        if inputs.len() != 1 || outputs.is_empty() {
            return Err(format!(
                "expects one input field and at least one new path, got {} input(s) and {} output(s)",
                inputs.len(),
                outputs.len()
            ));
        }
        check_bindable(&inputs[0], outputs)
    }

    fn apply(&self, node: &TransformationNode, doc: &mut Value) -> Result<(), NodeExecutionError> {
        let from = input_path(node, 0)?;
        let outputs = node.meta.new_field_key_paths.len();

        for location in document::resolve(doc, from) {
            let pieces: Vec<String> = match document::get(doc, &location) {
                Some(Value::String(text)) => text
                    .splitn(outputs, self.delimiter.as_str())
                    .map(str::to_string)
                    .collect(),
                Some(Value::Null) | None => continue,
                Some(other) => {
                    return Err(NodeExecutionError::TypeMismatch {
                        location: location.to_string(),
                        expected: "string",
                        found: type_name(other),
                    })
                }
            };
            let indices = location.indices();
            for (index, piece) in pieces.into_iter().enumerate() {
                let Some(target) = document::bind(output_path(node, index)?, &indices) else {
                    continue;
                };
                document::set(doc, &target, Value::String(piece))?;
            }
        }
        Ok(())
    }
}

/// Concatenates the input strings, in input order, into the single output path.
/// Missing and `null` inputs are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinOptions {
    pub delimiter: String,
}

impl NodeBehavior for JoinOptions {
    fn check_shape(&self, inputs: &[KeyPath], outputs: &[KeyPath]) -> Result<(), String> {
        let Some(first) = inputs.first() else {
            return Err("expects at least one input field".to_string());
        };
        if outputs.len() != 1 {
            return Err(format!("expects exactly one new path, got {}", outputs.len()));
        }
        if let Some(odd) = inputs
            .iter()
            .find(|input| input.wildcard_count() != first.wildcard_count())
        {
            return Err(format!(
                "inputs '{}' and '{}' are nested under a different number of arrays",
                first, odd
            ));
        }
        check_bindable(first, outputs)
    }

    fn apply(&self, node: &TransformationNode, doc: &mut Value) -> Result<(), NodeExecutionError> {
        let anchor = input_path(node, 0)?;
        let to = output_path(node, 0)?;

        // locations of the first input decide which array elements get joined
        let mut groups: Vec<Vec<usize>> = document::resolve(doc, anchor)
            .iter()
            .map(|location| location.indices())
            .collect();
        groups.dedup();

        for indices in groups {
            let mut pieces = Vec::with_capacity(node.fields.len());
            for field in &node.fields {
                let Some(location) = document::bind(&field.path, &indices) else {
                    continue;
                };
                match document::get(doc, &location) {
                    Some(Value::String(text)) => pieces.push(text.clone()),
                    Some(Value::Null) | None => {}
                    Some(other) => {
                        return Err(NodeExecutionError::TypeMismatch {
                            location: location.to_string(),
                            expected: "string",
                            found: type_name(other),
                        })
                    }
                }
            }
            if pieces.is_empty() {
                continue;
            }
            if let Some(target) = document::bind(to, &indices) {
                document::set(doc, &target, Value::String(pieces.join(&self.delimiter)))?;
            }
        }
        Ok(())
    }
}
