// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;

use crate::document;
use crate::engine::TransformationEngine;
use crate::errors::{EngineError, NodeExecutionError};
use crate::fields::{FieldType, KeyPath};
use crate::graph::TransformationNode;
use crate::nodes::{input_path, output_path, NodeBehavior};

/// How the wildcards of a duplicate's source map onto its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicationShape {
    /// Same array nesting on both sides; each element is copied in place.
    OneToOne,
    /// Values under a single wildcard are gathered into one array.
    ManyToOne,
}

impl DuplicationShape {
    /// Classify a duplication by counting the wildcards on each side.
    ///
    /// ```
    /// use the_transmogrifier::nodes::DuplicationShape;
    ///
    /// let from = "foo.*.bar".parse().unwrap();
    /// let to = "a.b.baz".parse().unwrap();
    /// assert_eq!(DuplicationShape::classify(&from, &to).unwrap(), DuplicationShape::ManyToOne);
    /// ```
    pub fn classify(from: &KeyPath, to: &KeyPath) -> Result<Self, EngineError> {
        match (from.wildcard_count(), to.wildcard_count()) {
            (source, target) if source == target => Ok(DuplicationShape::OneToOne),
            (1, 0) => Ok(DuplicationShape::ManyToOne),
            (0, _) => Err(EngineError::UnsupportedDuplication {
                from: from.clone(),
                to: to.clone(),
                reason: "one-to-many duplication is not supported",
            }),
            _ => Err(EngineError::ManyToManyDuplication),
        }
    }
}

/// Copies the value, and the registered structure under it, to a new path.
pub struct DuplicateNode;

impl DuplicateNode {
    fn shape(node: &TransformationNode) -> Result<DuplicationShape, NodeExecutionError> {
        let from = input_path(node, 0)?;
        let to = output_path(node, 0)?;
        DuplicationShape::classify(from, to).map_err(|err| NodeExecutionError::Unwritable {
            location: to.to_string(),
            reason: err.to_string(),
        })
    }
}

impl NodeBehavior for DuplicateNode {
    fn compute_new_field_type(
        &self,
        engine: &TransformationEngine,
        node: &TransformationNode,
        _output_index: usize,
    ) -> FieldType {
        match DuplicateNode::shape(node) {
            Ok(DuplicationShape::ManyToOne) => FieldType::Array,
            _ => node
                .fields
                .first()
                .and_then(|field| engine.get_field_type(field.id))
                .unwrap_or_default(),
        }
    }

    fn check_shape(&self, inputs: &[KeyPath], outputs: &[KeyPath]) -> Result<(), String> {
        if inputs.len() != 1 || outputs.len() != 1 {
            return Err(format!(
                "expects one input field and one new path, got {} input(s) and {} output(s)",
                inputs.len(),
                outputs.len()
            ));
        }
        Ok(())
    }

    fn apply(&self, node: &TransformationNode, doc: &mut Value) -> Result<(), NodeExecutionError> {
        let from = input_path(node, 0)?;
        let to = output_path(node, 0)?;
        let locations = document::resolve(doc, from);

        match DuplicateNode::shape(node)? {
            DuplicationShape::OneToOne => {
                for location in locations {
                    let Some(value) = document::get(doc, &location).cloned() else {
                        continue;
                    };
                    if let Some(target) = document::bind(to, &location.indices()) {
                        document::set(doc, &target, value)?;
                    }
                }
            }
            DuplicationShape::ManyToOne => {
                if locations.is_empty() {
                    return Ok(());
                }
                let gathered = locations
                    .iter()
                    .filter_map(|location| document::get(doc, location).cloned())
                    .collect();
                if let Some(target) = document::bind(to, &[]) {
                    document::set(doc, &target, Value::Array(gathered))?;
                }
            }
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

    fn path(s: &str) -> KeyPath {
        s.parse().unwrap()
    }

    fn duplicate(from: &str, to: &str) -> TransformationNode {
        TransformationNode {
            id: NodeId(2),
            kind: NodeKind::Duplicate,
            fields: vec![FieldRef {
                id: FieldId(0),
                path: path(from),
            }],
            meta: NodeMeta::with_outputs(vec![path(to)]),
        }
    }

    #[test]
    fn test_classification_table_driven() {
        let test_cases = vec![
            ("a", "d", Some(DuplicationShape::OneToOne)),
            ("l.*.a", "l.*.b", Some(DuplicationShape::OneToOne)),
            ("foo.*.bar", "a.b.baz", Some(DuplicationShape::ManyToOne)),
            ("a", "l.*.b", None),
            ("x.*.y.*.z", "q", None),
        ];

        for (from, to, expected) in test_cases {
            let shape = DuplicationShape::classify(&path(from), &path(to)).ok();
            assert_eq!(shape, expected, "{} -> {}", from, to);
        }
    }

    #[test]
    fn test_many_to_many_error_message() {
        let err = DuplicationShape::classify(&path("x.*.y.*.z"), &path("q")).unwrap_err();
        assert_eq!(err.to_string(), "Cannot create a many-to-many duplication.");
    }

    #[test]
    fn test_one_to_one_copies_subtree() {
        let node = duplicate("a", "d");
        let mut doc = json!({"a": {"b": 1, "c": [2]}});
        DuplicateNode.apply(&node, &mut doc).unwrap();
        assert_eq!(doc, json!({"a": {"b": 1, "c": [2]}, "d": {"b": 1, "c": [2]}}));
    }

    #[test]
    fn test_one_to_one_within_array_elements() {
        let node = duplicate("l.*.a", "l.*.b");
        let mut doc = json!({"l": [{"a": 1}, {"a": 2}]});
        DuplicateNode.apply(&node, &mut doc).unwrap();
        assert_eq!(doc, json!({"l": [{"a": 1, "b": 1}, {"a": 2, "b": 2}]}));
    }

    #[test]
    fn test_many_to_one_gathers_into_array() {
        let node = duplicate("foo.*.bar", "a.b.baz");
        let mut doc = json!({"foo": [{"bar": 1}, {"other": 0}, {"bar": 3}]});
        DuplicateNode.apply(&node, &mut doc).unwrap();
        assert_eq!(doc["a"], json!({"b": {"baz": [1, 3]}}));
    }
}
