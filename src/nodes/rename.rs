// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;

use crate::document::{self, type_name};
use crate::errors::NodeExecutionError;
use crate::fields::KeyPath;
use crate::graph::TransformationNode;
use crate::nodes::{check_bindable, input_path, output_path, NodeBehavior};

/// Moves a value from its input path to the single declared output path.
///
/// Renaming to the empty path promotes an object's members into the document
/// itself.
pub struct RenameNode;

impl NodeBehavior for RenameNode {
    fn check_shape(&self, inputs: &[KeyPath], outputs: &[KeyPath]) -> Result<(), String> {
        if inputs.len() != 1 || outputs.len() != 1 {
            return Err(format!(
                "expects one input field and one new path, got {} input(s) and {} output(s)",
                inputs.len(),
                outputs.len()
            ));
        }
        check_bindable(&inputs[0], outputs)
    }

    fn apply(&self, node: &TransformationNode, doc: &mut Value) -> Result<(), NodeExecutionError> {
        let from = input_path(node, 0)?;
        let to = output_path(node, 0)?;

        for location in document::resolve(doc, from) {
            let Some(value) = document::remove(doc, &location) else {
                continue;
            };
            if to.is_root() {
                match (value, doc.as_object_mut()) {
                    (Value::Object(members), Some(root)) => root.extend(members),
                    (Value::Null, _) => {}
                    (other, _) => {
                        return Err(NodeExecutionError::TypeMismatch {
                            location: location.to_string(),
                            expected: "object",
                            found: type_name(&other),
                        })
                    }
                }
                continue;
            }
            let Some(target) = document::bind(to, &location.indices()) else {
                continue;
            };
            document::set(doc, &target, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldId;
    use crate::graph::{FieldRef, NodeId, NodeMeta};
    use crate::nodes::NodeKind;
    use serde_json::json;

    fn rename(from: &str, to: &str) -> TransformationNode {
        TransformationNode {
            id: NodeId(1),
            kind: NodeKind::Rename,
            fields: vec![FieldRef {
                id: FieldId(0),
                path: from.parse().unwrap(),
            }],
            meta: NodeMeta::with_outputs(vec![to.parse().unwrap()]),
        }
    }

    #[test]
    fn test_moves_value_to_new_key() {
        let mut doc = json!({"name": "Bob"});
        RenameNode.apply(&rename("name", "firstname"), &mut doc).unwrap();
        assert_eq!(doc, json!({"firstname": "Bob"}));
    }

    #[test]
    fn test_moves_nested_value_out_of_wrapper() {
        let mut doc = json!({"meta": {"school": "Stanford"}});
        RenameNode.apply(&rename("meta.school", "skool"), &mut doc).unwrap();
        assert_eq!(doc, json!({"meta": {}, "skool": "Stanford"}));
    }

    #[test]
    fn test_renames_inside_array_elements() {
        let mut doc = json!({"list": [{"a": 1}, {"b": 2}, {"a": 3}]});
        RenameNode.apply(&rename("list.*.a", "list.*.z"), &mut doc).unwrap();
        assert_eq!(doc, json!({"list": [{"z": 1}, {"b": 2}, {"z": 3}]}));
    }

    #[test]
    fn test_promotes_object_members_to_root() {
        let mut doc = json!({"meta": {"school": "x", "sport": "y"}, "name": "Bob"});
        RenameNode.apply(&rename("meta", ""), &mut doc).unwrap();
        assert_eq!(doc, json!({"school": "x", "sport": "y", "name": "Bob"}));
    }

    #[test]
    fn test_shape_requires_one_output() {
        let input: KeyPath = "list.*.a".parse().unwrap();
        assert!(RenameNode.check_shape(&[input.clone()], &[]).is_err());
        assert!(RenameNode
            .check_shape(&[input.clone()], &["list.*.z".parse().unwrap()])
            .is_ok());
        assert!(RenameNode
            .check_shape(&[input], &["x.*.*".parse().unwrap()])
            .is_err());
    }
}
