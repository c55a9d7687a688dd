// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pipeline validation.
//!
//! A pipeline is checked before any engine is built so that every problem in
//! the file is reported at once, instead of only the first one an engine
//! would hit:
//!
//! 1. **Uniqueness**: no two field declarations share a path
//! 2. **Inputs**: every transformation names at least one input
//! 3. **References**: every input path is a declared field or one a previous
//!    transformation produced
//! 4. **Structure**: the engine accepts every field and transformation
//!
//! References are resolved by replaying the pipeline into a scratch engine,
//! so renames, removals, casts and copies move the known paths exactly as
//! they will when the real engine is built. A transformation that fails is
//! skipped; appends are atomic, so the replay carries on from a consistent
//! state.
//!
//! # Example
//! ```rust
//! use the_transmogrifier::config::{validate_pipeline, PipelineConfig};
//! use the_transmogrifier::errors::ValidationError;
//!
//! let cfg: PipelineConfig = serde_yaml::from_str(
//!     r#"
//! fields:
//!   - path: [name]
//! transformations:
//!   - kind: {typeCode: Capitalize}
//!     fields: [[nickname]]
//! "#,
//! )
//! .unwrap();
//!
//! let errors = validate_pipeline(&cfg).unwrap_err();
//! assert_eq!(
//!     errors,
//!     vec![ValidationError::UnresolvedFieldReference {
//!         transformation_index: 0,
//!         missing_path: "nickname".to_string(),
//!     }]
//! );
//! ```

use std::collections::BTreeSet;

use crate::config::{FieldConfig, PipelineConfig, TransformationConfig};
use crate::engine::{FieldSelector, TransformationEngine};
use crate::errors::ValidationError;
use crate::fields::FieldProperties;
use crate::graph::NodeMeta;
use crate::observability::messages::validation::{
    DuplicateFieldPath, UnresolvedFieldReference, ValidationCompleted, ValidationFailed,
    ValidationStarted,
};
use crate::observability::messages::StructuredLog;

/// Validate a pipeline, collecting every error found.
pub fn validate_pipeline(cfg: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let started = ValidationStarted {
        field_count: cfg.fields.len(),
        transformation_count: cfg.transformations.len(),
    };
    let span = started.span("validate_pipeline");
    let _guard = span.enter();
    started.log();

    let mut scratch = TransformationEngine::new();
    let mut errors = Vec::new();

    if let Err(field_errors) = register_fields(&mut scratch, &cfg.fields) {
        errors.extend(field_errors);
    }

    if let Err(transformation_errors) = replay_transformations(&mut scratch, &cfg.transformations) {
        errors.extend(transformation_errors);
    }

    if errors.is_empty() {
        ValidationCompleted {
            field_count: cfg.fields.len(),
            transformation_count: cfg.transformations.len(),
        }
        .log();
        Ok(())
    } else {
        ValidationFailed {
            error_count: errors.len(),
        }
        .log();
        Err(errors)
    }
}

fn register_fields(scratch: &mut TransformationEngine, fields: &[FieldConfig]) -> Result<(), Vec<ValidationError>> {
    let mut seen = BTreeSet::new();
    let mut errors = Vec::new();

    for field in fields {
        if !seen.insert(&field.path) {
            DuplicateFieldPath { path: &field.path }.log();
            errors.push(ValidationError::DuplicateFieldPath {
                path: field.path.to_string(),
            });
            continue;
        }
        let props = FieldProperties {
            field_type: field.field_type,
            extra: field.properties.clone(),
        };
        if let Err(err) = scratch.add_field(field.path.clone(), props, None) {
            errors.push(ValidationError::InvalidField {
                path: field.path.to_string(),
                reason: err.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn replay_transformations(
    scratch: &mut TransformationEngine,
    transformations: &[TransformationConfig],
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (index, transformation) in transformations.iter().enumerate() {
        if transformation.fields.is_empty() {
            errors.push(ValidationError::MissingInputs {
                transformation_index: index,
            });
            continue;
        }

        let mut resolved = true;
        for path in &transformation.fields {
            if scratch.get_field_id(path).is_none() {
                UnresolvedFieldReference {
                    transformation_index: index,
                    path,
                }
                .log();
                errors.push(ValidationError::UnresolvedFieldReference {
                    transformation_index: index,
                    missing_path: path.to_string(),
                });
                resolved = false;
            }
        }
        if !resolved {
            continue;
        }

        let inputs = transformation
            .fields
            .iter()
            .cloned()
            .map(FieldSelector::Path)
            .collect();
        let meta = NodeMeta::with_outputs(transformation.new_field_key_paths.clone());
        if let Err(err) = scratch.append_transformation(transformation.kind.clone(), inputs, meta) {
            errors.push(ValidationError::RejectedTransformation {
                transformation_index: index,
                reason: err.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline(yaml: &str) -> PipelineConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_valid_pipeline_passes() {
        let cfg = pipeline(
            r#"
fields:
  - path: [name]
  - path: [meta]
    type: object
  - path: [meta, school]
transformations:
  - kind: {typeCode: Rename}
    fields: [[meta]]
    new_field_key_paths: [[info]]
  - kind: {typeCode: Capitalize}
    fields: [[info, school]]
  - kind: {typeCode: Duplicate}
    fields: [[info]]
    new_field_key_paths: [[copy]]
  - kind: {typeCode: Append, text: "!"}
    fields: [[copy, school]]
"#,
        );
        assert_eq!(validate_pipeline(&cfg), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let cfg = pipeline(
            r#"
fields:
  - path: [name]
  - path: [name]
transformations:
  - kind: {typeCode: Capitalize}
    fields: []
  - kind: {typeCode: Rename}
    fields: [[name]]
    new_field_key_paths: [[first]]
  - kind: {typeCode: Capitalize}
    fields: [[name]]
"#,
        );
        let errors = validate_pipeline(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::DuplicateFieldPath {
                    path: "name".to_string()
                },
                ValidationError::MissingInputs {
                    transformation_index: 0
                },
                ValidationError::UnresolvedFieldReference {
                    transformation_index: 2,
                    missing_path: "name".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_removed_and_cast_paths_are_no_longer_known() {
        let cfg = pipeline(
            r#"
fields:
  - path: [meta]
    type: object
  - path: [meta, school]
  - path: [old]
transformations:
  - kind: {typeCode: CastType, toType: string}
    fields: [[meta]]
  - kind: {typeCode: Identity, identityType: Removal}
    fields: [[old]]
  - kind: {typeCode: Capitalize}
    fields: [[meta, school]]
  - kind: {typeCode: Capitalize}
    fields: [[old]]
"#,
        );
        let errors = validate_pipeline(&cfg).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_group_by_outputs_carry_element_structure() {
        let cfg = pipeline(
            r#"
fields:
  - path: [items]
    type: array
  - path: [items, -1]
    type: object
  - path: [items, -1, kind]
transformations:
  - kind: {typeCode: GroupBy, subkey: kind, groupValues: [fruit]}
    fields: [[items]]
    new_field_key_paths: [[fruit]]
  - kind: {typeCode: Capitalize}
    fields: [[fruit, -1, kind]]
"#,
        );
        assert_eq!(validate_pipeline(&cfg), Ok(()));
    }

    #[test]
    fn test_cast_between_containers_drops_old_subfields() {
        let cfg = pipeline(
            r#"
fields:
  - path: [meta]
    type: object
  - path: [meta, school]
transformations:
  - kind: {typeCode: CastType, toType: array}
    fields: [[meta]]
  - kind: {typeCode: Capitalize}
    fields: [[meta, school]]
  - kind: {typeCode: Capitalize}
    fields: [[meta, -1]]
"#,
        );
        let errors = validate_pipeline(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::UnresolvedFieldReference {
                transformation_index: 1,
                missing_path: "meta.school".to_string(),
            }]
        );
    }

    #[test]
    fn test_engine_rejections_are_reported_per_transformation() {
        let cfg = pipeline(
            r#"
fields:
  - path: [a]
    type: array
  - path: [a, -1]
    type: array
  - path: [a, -1, -1]
  - path: [name]
  - path: [other]
transformations:
  - kind: {typeCode: Duplicate}
    fields: [[a, -1, -1]]
    new_field_key_paths: [[flat, -1]]
  - kind: {typeCode: Rename}
    fields: [[name]]
    new_field_key_paths: [[other]]
  - kind: {typeCode: Capitalize}
    fields: [[name]]
"#,
        );
        let errors = validate_pipeline(&cfg).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            &errors[0],
            ValidationError::RejectedTransformation { transformation_index: 0, reason }
                if reason == "Cannot create a many-to-many duplication."
        ));
        assert!(matches!(
            errors[1],
            ValidationError::RejectedTransformation {
                transformation_index: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_field_declarations_are_reported() {
        let cfg = pipeline(
            r#"
fields:
  - path: []
  - path: [name]
"#,
        );
        let errors = validate_pipeline(&cfg).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::InvalidField { .. }));
    }
}
