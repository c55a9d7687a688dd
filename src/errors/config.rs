// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use thiserror::Error;

use crate::errors::EngineError;

/// Problems found while validating a pipeline file before building an engine
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Two field declarations share a path
    DuplicateFieldPath {
        /// Dotted path declared more than once
        path: String,
    },
    /// A transformation references a path no declared field (or earlier output) provides
    UnresolvedFieldReference {
        /// Index of the transformation in the pipeline file
        transformation_index: usize,
        /// The path that couldn't be resolved
        missing_path: String,
    },
    /// A transformation declares no input fields
    MissingInputs {
        /// Index of the transformation in the pipeline file
        transformation_index: usize,
    },
    /// A field declaration the engine refuses to register
    InvalidField { path: String, reason: String },
    /// A transformation whose inputs resolve but which the engine refuses to append
    RejectedTransformation {
        transformation_index: usize,
        reason: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateFieldPath { path } => {
                write!(f, "Duplicate field path: '{}'", path)
            }
            ValidationError::UnresolvedFieldReference {
                transformation_index,
                missing_path,
            } => {
                write!(
                    f,
                    "Transformation #{} references '{}' which is not a declared field",
                    transformation_index, missing_path
                )
            }
            ValidationError::MissingInputs {
                transformation_index,
            } => {
                write!(f, "Transformation #{} declares no input fields", transformation_index)
            }
            ValidationError::InvalidField { path, reason } => {
                write!(f, "Field '{}' cannot be declared: {}", path, reason)
            }
            ValidationError::RejectedTransformation {
                transformation_index,
                reason,
            } => {
                write!(f, "Transformation #{} is rejected: {}", transformation_index, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while loading a pipeline file and turning it into an engine
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read pipeline file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse pipeline file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Pipeline validation failed:\n{}", join_lines(.0))]
    Invalid(Vec<ValidationError>),

    #[error("Failed to build engine: {0}")]
    Engine(#[from] EngineError),
}

fn join_lines(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
