// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::validate_pipeline;
use crate::engine::TransformOptions;
use crate::errors::ConfigError;
use crate::fields::{FieldType, KeyPath};
use crate::nodes::NodeKind;

/// A transformation pipeline as written in a YAML file.
///
/// Fields are registered in the order they are declared, then the
/// transformations are appended in order. Paths are lists of keys, with `-1`
/// standing for "any array element".
///
/// # Example
/// ```yaml
/// options:
///   remove_empty_objects: true
///   failure_strategy: fail_fast
/// fields:
///   - path: [name]
///     type: string
///   - path: [tags]
///     type: array
///   - path: [tags, -1]
/// transformations:
///   - kind: {typeCode: Capitalize}
///     fields: [[name]]
///   - kind: {typeCode: Substring, from: 0, length: 2}
///     fields: [[name]]
///   - kind: {typeCode: Rename}
///     fields: [[name]]
///     new_field_key_paths: [[initials]]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub options: TransformOptions,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
    #[serde(default)]
    pub transformations: Vec<TransformationConfig>,
}

/// A field present in source documents.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldConfig {
    pub path: KeyPath,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Extra properties carried on the field untouched.
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

fn enabled_by_default() -> bool {
    true
}

/// One transformation: its kind and options, the paths of its input fields
/// and, for structural kinds, the paths it creates.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformationConfig {
    pub kind: NodeKind,
    #[serde(default)]
    pub fields: Vec<KeyPath>,
    #[serde(default)]
    pub new_field_key_paths: Vec<KeyPath>,
}

/// Load a pipeline from a YAML file.
pub fn load_pipeline<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let cfg: PipelineConfig = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load a pipeline and check that every field reference resolves.
pub fn load_and_validate_pipeline<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let cfg = load_pipeline(path)?;
    validate_pipeline(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}
