// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Inferred type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl FieldType {
    /// Arrays and objects carry subfields; everything else is a leaf.
    pub fn is_compound(self) -> bool {
        matches!(self, FieldType::Array | FieldType::Object)
    }

    /// Best-effort inference from a sample value. `null` is treated as a string.
    pub fn of_value(value: &Value) -> FieldType {
        match value {
            Value::Array(_) => FieldType::Array,
            Value::Object(_) => FieldType::Object,
            Value::Number(_) => FieldType::Number,
            Value::Bool(_) => FieldType::Boolean,
            Value::String(_) | Value::Null => FieldType::String,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
        };
        write!(f, "{}", name)
    }
}

/// Per-field properties. The inferred type is always present; anything else
/// a collaborator attaches is carried through untouched in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldProperties {
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl FieldProperties {
    pub fn typed(field_type: FieldType) -> Self {
        Self {
            field_type,
            extra: BTreeMap::new(),
        }
    }

    /// Overlay `other` onto these properties: its type wins and its extra
    /// entries replace ours key by key.
    pub fn merge_from(&mut self, other: &FieldProperties) {
        self.field_type = other.field_type;
        for (key, value) in &other.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }
}

impl From<FieldType> for FieldProperties {
    fn from(field_type: FieldType) -> Self {
        Self::typed(field_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_properties_round_trip_with_extra_entries() {
        let mut props = FieldProperties::typed(FieldType::Object);
        props.extra.insert("label".to_string(), json!("Metadata"));

        let encoded = serde_json::to_value(&props).unwrap();
        assert_eq!(encoded, json!({"type": "object", "label": "Metadata"}));

        let decoded: FieldProperties = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, props);
    }

    #[test]
    fn test_merge_from_overrides_type_and_keeps_unrelated_keys() {
        let mut target = FieldProperties::typed(FieldType::String);
        target.extra.insert("keep".to_string(), json!(1));
        let mut source = FieldProperties::typed(FieldType::Number);
        source.extra.insert("format".to_string(), json!("currency"));

        target.merge_from(&source);
        assert_eq!(target.field_type, FieldType::Number);
        assert_eq!(target.extra.get("keep"), Some(&json!(1)));
        assert_eq!(target.extra.get("format"), Some(&json!("currency")));
    }

    #[test]
    fn test_of_value() {
        assert_eq!(FieldType::of_value(&json!([1])), FieldType::Array);
        assert_eq!(FieldType::of_value(&json!({})), FieldType::Object);
        assert_eq!(FieldType::of_value(&json!(1.5)), FieldType::Number);
        assert_eq!(FieldType::of_value(&json!(true)), FieldType::Boolean);
        assert_eq!(FieldType::of_value(&json!("x")), FieldType::String);
    }
}
