// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fields::FieldType;

/// What `transform` does when a node's value transform fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStrategy {
    /// Stop at the first failing node and return the error.
    FailFast,
    /// Skip the failing node, record the error and keep replaying.
    #[default]
    ContinueOnError,
}

/// A single node's value transform could not be applied to a document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NodeExecutionError {
    #[error("expected {expected} at '{location}', found {found}")]
    TypeMismatch {
        location: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot convert {value} to {target}")]
    Conversion { value: String, target: FieldType },

    #[error("cannot write '{location}': {reason}")]
    Unwritable { location: String, reason: String },
}
