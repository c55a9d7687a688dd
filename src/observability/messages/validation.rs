// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for validation warnings and errors.
//!
//! This module contains message types for logging events related to:
//! * Pipeline validation
//! * Duplicate field paths
//! * Unresolved field references
//! * Cycles in the transformation graph

use crate::fields::KeyPath;
use crate::graph::NodeId;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// The augmented transformation graph has a cycle.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_transmogrifier::graph::NodeId;
/// use the_transmogrifier::observability::messages::validation::CyclicGraphDetected;
///
/// let nodes = vec![NodeId(2), NodeId(5)];
/// let msg = CyclicGraphDetected { nodes: &nodes };
///
/// assert_eq!(msg.to_string(), "Cyclic transformation graph detected; unresolved nodes: 2, 5");
/// ```
pub struct CyclicGraphDetected<'a> {
    pub nodes: &'a [NodeId],
}

impl CyclicGraphDetected<'_> {
    fn node_list(&self) -> String {
        self.nodes
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Display for CyclicGraphDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cyclic transformation graph detected; unresolved nodes: {}",
            self.node_list()
        )
    }
}

impl StructuredLog for CyclicGraphDetected<'_> {
    fn log(&self) {
        tracing::error!(
            nodes = self.node_list(),
            unresolved_count = self.nodes.len(),
            "{}", self
        );
    }
}

/// A transformation in a pipeline names a field path nothing declares.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct UnresolvedFieldReference<'a> {
    pub transformation_index: usize,
    pub path: &'a KeyPath,
}

impl Display for UnresolvedFieldReference<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transformation #{} references field '{}' which is neither declared nor produced earlier",
            self.transformation_index, self.path
        )
    }
}

impl StructuredLog for UnresolvedFieldReference<'_> {
    fn log(&self) {
        tracing::error!(
            transformation_index = self.transformation_index,
            path = %self.path,
            "{}", self
        );
    }
}

/// The same field path is declared twice.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct DuplicateFieldPath<'a> {
    pub path: &'a KeyPath,
}

impl Display for DuplicateFieldPath<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Duplicate field path: {}", self.path)
    }
}

impl StructuredLog for DuplicateFieldPath<'_> {
    fn log(&self) {
        tracing::error!(path = %self.path, "{}", self);
    }
}

/// Pipeline validation started.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ValidationStarted {
    pub field_count: usize,
    pub transformation_count: usize,
}

impl Display for ValidationStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting pipeline validation for {} fields and {} transformations",
            self.field_count, self.transformation_count
        )
    }
}

impl StructuredLog for ValidationStarted {
    fn log(&self) {
        tracing::info!(
            field_count = self.field_count,
            transformation_count = self.transformation_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::INFO,
            "span_name",
            name = name,
            field_count = self.field_count,
            transformation_count = self.transformation_count,
        )
    }
}

/// Pipeline validation completed successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ValidationCompleted {
    pub field_count: usize,
    pub transformation_count: usize,
}

impl Display for ValidationCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline validation completed successfully for {} fields and {} transformations",
            self.field_count, self.transformation_count
        )
    }
}

impl StructuredLog for ValidationCompleted {
    fn log(&self) {
        tracing::info!(
            field_count = self.field_count,
            transformation_count = self.transformation_count,
            "{}", self
        );
    }
}

/// Pipeline validation failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_transmogrifier::observability::messages::validation::ValidationFailed;
///
/// let msg = ValidationFailed { error_count: 3 };
///
/// assert_eq!(msg.to_string(), "Pipeline validation failed with 3 errors");
/// ```
pub struct ValidationFailed {
    pub error_count: usize,
}

impl Display for ValidationFailed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline validation failed with {} errors",
            self.error_count
        )
    }
}

impl StructuredLog for ValidationFailed {
    fn log(&self) {
        tracing::error!(
            error_count = self.error_count,
            "{}", self
        );
    }
}
