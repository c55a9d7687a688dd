// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::document;
use crate::engine::TransformationEngine;
use crate::errors::NodeExecutionError;
use crate::fields::FieldType;
use crate::graph::TransformationNode;
use crate::nodes::{input_path, NodeBehavior};

/// Coerces the input field to `to_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastTypeOptions {
    pub to_type: FieldType,
}

impl NodeBehavior for CastTypeOptions {
    fn compute_new_source_type(
        &self,
        _engine: &TransformationEngine,
        _node: &TransformationNode,
        _input_index: usize,
    ) -> FieldType {
        self.to_type
    }

    fn apply(&self, node: &TransformationNode, doc: &mut Value) -> Result<(), NodeExecutionError> {
        let path = input_path(node, 0)?;
        for location in document::resolve(doc, path) {
            let Some(slot) = document::get_mut(doc, &location) else {
                continue;
            };
            if slot.is_null() {
                continue;
            }
            let converted = convert(slot.take(), self.to_type);
            match converted {
                Ok(value) => *slot = value,
                Err((original, err)) => {
                    *slot = original;
                    return Err(err);
                }
            }
        }
        Ok(())
    }
}

type Conversion = Result<Value, (Value, NodeExecutionError)>;

fn convert(value: Value, target: FieldType) -> Conversion {
    match target {
        FieldType::String => Ok(to_string(value)),
        FieldType::Number => to_number(value),
        FieldType::Boolean => to_boolean(value),
        FieldType::Array => Ok(match value {
            Value::Array(items) => Value::Array(items),
            other => Value::Array(vec![other]),
        }),
        FieldType::Object => to_object(value),
    }
}

fn failure(value: Value, target: FieldType) -> Conversion {
    let err = NodeExecutionError::Conversion {
        value: value.to_string(),
        target,
    };
    Err((value, err))
}

fn to_string(value: Value) -> Value {
    match value {
        Value::String(text) => Value::String(text),
        Value::Number(number) => Value::String(number.to_string()),
        Value::Bool(flag) => Value::String(flag.to_string()),
        compound => Value::String(compound.to_string()),
    }
}

fn to_number(value: Value) -> Conversion {
    match value {
        Value::Number(number) => Ok(Value::Number(number)),
        Value::Bool(flag) => Ok(Value::from(u8::from(flag))),
        Value::String(ref text) => {
            let trimmed = text.trim();
            if let Ok(integer) = trimmed.parse::<i64>() {
                return Ok(Value::from(integer));
            }
            match trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
                Some(number) => Ok(Value::Number(number)),
                None => failure(value, FieldType::Number),
            }
        }
        other => failure(other, FieldType::Number),
    }
}

fn to_boolean(value: Value) -> Conversion {
    match value {
        Value::Bool(flag) => Ok(Value::Bool(flag)),
        Value::Number(ref number) => Ok(Value::Bool(number.as_f64().map_or(false, |n| n != 0.0))),
        Value::String(ref text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => failure(value, FieldType::Boolean),
        },
        other => failure(other, FieldType::Boolean),
    }
}

fn to_object(value: Value) -> Conversion {
    match value {
        Value::Object(members) => Ok(Value::Object(members)),
        Value::String(ref text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed @ Value::Object(_)) => Ok(parsed),
            _ => failure(value, FieldType::Object),
        },
        other => failure(other, FieldType::Object),
    }
}
