// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Value-only string transformations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::NodeExecutionError;
use crate::graph::TransformationNode;
use crate::nodes::{map_strings, NodeBehavior};

/// Uppercases every character of the input string.
pub struct CapitalizeNode;

impl NodeBehavior for CapitalizeNode {
    fn apply(&self, node: &TransformationNode, doc: &mut Value) -> Result<(), NodeExecutionError> {
        map_strings(node, doc, |text| text.to_uppercase())
    }
}

/// Keeps `length` characters starting at character `from` (the rest of the
/// string when `length` is absent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstringOptions {
    pub from: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
}

impl NodeBehavior for SubstringOptions {
    fn apply(&self, node: &TransformationNode, doc: &mut Value) -> Result<(), NodeExecutionError> {
        map_strings(node, doc, |text| {
            let chars = text.chars().skip(self.from);
            match self.length {
                Some(length) => chars.take(length).collect(),
                None => chars.collect(),
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendOptions {
    pub text: String,
}

impl NodeBehavior for AppendOptions {
    fn apply(&self, node: &TransformationNode, doc: &mut Value) -> Result<(), NodeExecutionError> {
        map_strings(node, doc, |text| format!("{}{}", text, self.text))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrependOptions {
    pub text: String,
}

impl NodeBehavior for PrependOptions {
    fn apply(&self, node: &TransformationNode, doc: &mut Value) -> Result<(), NodeExecutionError> {
        map_strings(node, doc, |text| format!("{}{}", self.text, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldId;
    use crate::graph::{FieldRef, NodeId, NodeMeta};
    use crate::nodes::NodeKind;
    use serde_json::json;

    fn node_on(path: &str, kind: NodeKind) -> TransformationNode {
        TransformationNode {
            id: NodeId(1),
            kind,
            fields: vec![FieldRef {
                id: FieldId(0),
                path: path.parse().unwrap(),
            }],
            meta: NodeMeta::default(),
        }
    }

    fn run(node: &TransformationNode, mut doc: Value) -> Result<Value, NodeExecutionError> {
        node.kind.behavior().apply(node, &mut doc)?;
        Ok(doc)
    }

    #[test]
    fn test_text_nodes_table_driven() {
        struct TestCase {
            name: &'static str,
            kind: NodeKind,
            input: &'static str,
            expected: &'static str,
        }

        let test_cases = vec![
            TestCase {
                name: "capitalize",
                kind: NodeKind::Capitalize,
                input: "Bob",
                expected: "BOB",
            },
            TestCase {
                name: "substring with length",
                kind: NodeKind::Substring(SubstringOptions { from: 1, length: Some(2) }),
                input: "hello",
                expected: "el",
            },
            TestCase {
                name: "substring to end",
                kind: NodeKind::Substring(SubstringOptions { from: 2, length: None }),
                input: "hello",
                expected: "llo",
            },
            TestCase {
                name: "substring past the end",
                kind: NodeKind::Substring(SubstringOptions { from: 9, length: Some(2) }),
                input: "hello",
                expected: "",
            },
            TestCase {
                name: "append",
                kind: NodeKind::Append(AppendOptions { text: "!".to_string() }),
                input: "hi",
                expected: "hi!",
            },
            TestCase {
                name: "prepend",
                kind: NodeKind::Prepend(PrependOptions { text: "Dr. ".to_string() }),
                input: "Who",
                expected: "Dr. Who",
            },
        ];

        for case in test_cases {
            let node = node_on("name", case.kind);
            let out = run(&node, json!({"name": case.input})).unwrap();
            assert_eq!(out, json!({"name": case.expected}), "case: {}", case.name);
        }
    }

    #[test]
    fn test_applies_to_every_array_element() {
        let node = node_on("tags.*", NodeKind::Capitalize);
        let out = run(&node, json!({"tags": ["a", null, "c"]})).unwrap();
        assert_eq!(out, json!({"tags": ["A", null, "C"]}));
    }

    #[test]
    fn test_missing_value_is_skipped() {
        let node = node_on("name", NodeKind::Capitalize);
        assert_eq!(run(&node, json!({"age": 3})).unwrap(), json!({"age": 3}));
    }

    #[test]
    fn test_non_string_is_a_type_mismatch() {
        let node = node_on("age", NodeKind::Capitalize);
        let err = run(&node, json!({"age": 3})).unwrap_err();
        assert_eq!(
            err,
            NodeExecutionError::TypeMismatch {
                location: "age".to_string(),
                expected: "string",
                found: "number",
            }
        );
    }
}
