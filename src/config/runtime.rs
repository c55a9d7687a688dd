// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::PipelineConfig;
use crate::engine::{FieldSelector, TransformOptions, TransformationEngine};
use crate::errors::ConfigError;
use crate::fields::FieldProperties;
use crate::graph::NodeMeta;

/// Engine builder - turns a pipeline file into a ready-to-use engine.
///
/// Fields are registered in declaration order, disabled fields are switched
/// off, then every transformation is appended with its inputs resolved by
/// their paths at that point of the pipeline.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use the_transmogrifier::config::{EngineBuilder, PipelineConfig};
///
/// let cfg: PipelineConfig = serde_yaml::from_str(
///     r#"
/// fields:
///   - path: [name]
/// transformations:
///   - kind: {typeCode: Rename}
///     fields: [[name]]
///     new_field_key_paths: [[firstname]]
/// "#,
/// )
/// .unwrap();
///
/// let (mut engine, options) = EngineBuilder::from_config(&cfg).unwrap();
/// let out = engine.transform(&json!({"name": "Bob"}), &options).unwrap();
/// assert_eq!(out, json!({"firstname": "Bob"}));
/// ```
pub struct EngineBuilder;

impl EngineBuilder {
    /// Build an engine from configuration.
    ///
    /// # Returns
    /// The engine and the transform options the pipeline asked for.
    pub fn from_config(cfg: &PipelineConfig) -> Result<(TransformationEngine, TransformOptions), ConfigError> {
        let mut engine = TransformationEngine::new();

        let mut disabled = Vec::new();
        for field in &cfg.fields {
            let props = FieldProperties {
                field_type: field.field_type,
                extra: field.properties.clone(),
            };
            let id = engine.add_field(field.path.clone(), props, None)?;
            if !field.enabled {
                disabled.push(id);
            }
        }
        for id in disabled {
            engine.disable_field(id)?;
        }

        for transformation in &cfg.transformations {
            let inputs = transformation
                .fields
                .iter()
                .cloned()
                .map(FieldSelector::Path)
                .collect();
            engine.append_transformation(
                transformation.kind.clone(),
                inputs,
                NodeMeta::with_outputs(transformation.new_field_key_paths.clone()),
            )?;
        }

        Ok((engine, cfg.options.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EngineError;
    use crate::fields::FieldType;
    use serde_json::json;

    #[test]
    fn test_from_config_registers_fields_with_properties() {
        let cfg: PipelineConfig = serde_yaml::from_str(
            r#"
fields:
  - path: [age]
    type: number
    properties:
      unit: years
  - path: [secret]
    enabled: false
"#,
        )
        .unwrap();

        let (engine, options) = EngineBuilder::from_config(&cfg).unwrap();
        assert_eq!(options, TransformOptions::default());

        let age = engine.get_field_id(&"age".parse().unwrap()).unwrap();
        assert_eq!(engine.get_field_type(age), Some(FieldType::Number));
        assert_eq!(engine.get_field_prop(age, "unit"), Some(json!("years")));

        let secret = engine.get_field_id(&"secret".parse().unwrap()).unwrap();
        assert!(!engine.get_field_enabled(secret));
    }

    #[test]
    fn test_from_config_surfaces_engine_errors() {
        let cfg: PipelineConfig = serde_yaml::from_str(
            r#"
fields:
  - path: [tags]
    type: array
  - path: [tags, -1]
  - path: [other]
    type: array
  - path: [other, -1]
    type: array
  - path: [other, -1, -1]
transformations:
  - kind: {typeCode: Duplicate}
    fields: [[other, -1, -1]]
    new_field_key_paths: [[tags, -1]]
"#,
        )
        .unwrap();

        let result = EngineBuilder::from_config(&cfg);
        assert!(matches!(
            result,
            Err(ConfigError::Engine(EngineError::ManyToManyDuplication))
        ));
    }
}
