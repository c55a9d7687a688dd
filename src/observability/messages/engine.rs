// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for engine events.
//!
//! This module contains message types for logging events related to:
//! * Field registration, relocation, removal and type changes
//! * Appending and deleting transformations
//! * Execution order computation
//! * Replaying the graph against a document

use crate::document::Location;
use crate::errors::NodeExecutionError;
use crate::fields::{FieldId, FieldType, KeyPath};
use crate::graph::NodeId;
use crate::nodes::{IdentityKind, NodeType};
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A field was registered.
///
/// # Log Level
/// `debug!` - Graph construction detail
///
/// # Example
/// ```
/// use the_transmogrifier::fields::{FieldId, FieldType};
/// use the_transmogrifier::nodes::IdentityKind;
/// use the_transmogrifier::observability::messages::engine::FieldAdded;
///
/// let path = "meta.school".parse().unwrap();
/// let msg = FieldAdded {
///     field_id: FieldId(4),
///     path: &path,
///     field_type: FieldType::String,
///     identity: IdentityKind::Organic,
/// };
///
/// assert_eq!(msg.to_string(), "Added Organic field 4 at 'meta.school' (string)");
/// ```
pub struct FieldAdded<'a> {
    pub field_id: FieldId,
    pub path: &'a KeyPath,
    pub field_type: FieldType,
    pub identity: IdentityKind,
}

impl Display for FieldAdded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Added {} field {} at '{}' ({})",
            self.identity, self.field_id, self.path, self.field_type
        )
    }
}

impl StructuredLog for FieldAdded<'_> {
    fn log(&self) {
        tracing::debug!(
            field_id = self.field_id.0,
            path = %self.path,
            field_type = %self.field_type,
            identity = %self.identity,
            "{}", self
        );
    }
}

/// A field and the transformations referencing it were deleted.
///
/// # Log Level
/// `debug!` - Graph construction detail
pub struct FieldDeleted {
    pub field_id: FieldId,
}

impl Display for FieldDeleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Deleted field {}", self.field_id)
    }
}

impl StructuredLog for FieldDeleted {
    fn log(&self) {
        tracing::debug!(field_id = self.field_id.0, "{}", self);
    }
}

/// A field moved to a new path.
///
/// # Log Level
/// `debug!` - Graph construction detail
pub struct FieldRenamed<'a> {
    pub field_id: FieldId,
    pub from: &'a KeyPath,
    pub to: &'a KeyPath,
}

impl Display for FieldRenamed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Moved field {} from '{}' to '{}'",
            self.field_id, self.from, self.to
        )
    }
}

impl StructuredLog for FieldRenamed<'_> {
    fn log(&self) {
        tracing::debug!(
            field_id = self.field_id.0,
            from = %self.from,
            to = %self.to,
            "{}", self
        );
    }
}

/// A field was parked on the dead path.
///
/// # Log Level
/// `debug!` - Graph construction detail
pub struct FieldKilled<'a> {
    pub field_id: FieldId,
    pub path: &'a KeyPath,
}

impl Display for FieldKilled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Removed field {} (was '{}')", self.field_id, self.path)
    }
}

impl StructuredLog for FieldKilled<'_> {
    fn log(&self) {
        tracing::debug!(
            field_id = self.field_id.0,
            path = %self.path,
            "{}", self
        );
    }
}

/// A transformation changed the inferred type of one of its inputs.
///
/// # Log Level
/// `debug!` - Graph construction detail
///
/// # Example
/// ```
/// use the_transmogrifier::fields::{FieldId, FieldType};
/// use the_transmogrifier::observability::messages::engine::FieldTypeChanged;
///
/// let msg = FieldTypeChanged {
///     field_id: FieldId(1),
///     from: FieldType::Object,
///     to: FieldType::String,
/// };
///
/// assert_eq!(msg.to_string(), "Field 1 changed type from object to string");
/// ```
pub struct FieldTypeChanged {
    pub field_id: FieldId,
    pub from: FieldType,
    pub to: FieldType,
}

impl Display for FieldTypeChanged {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Field {} changed type from {} to {}",
            self.field_id, self.from, self.to
        )
    }
}

impl StructuredLog for FieldTypeChanged {
    fn log(&self) {
        tracing::debug!(
            field_id = self.field_id.0,
            from = %self.from,
            to = %self.to,
            "{}", self
        );
    }
}

/// A transformation was appended and its structural side effects applied.
///
/// # Log Level
/// `debug!` - Graph construction detail
pub struct TransformationAppended {
    pub node_id: NodeId,
    pub node_type: NodeType,
    pub input_count: usize,
    pub output_count: usize,
}

impl Display for TransformationAppended {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Appended {} node {} with {} input(s) and {} output(s)",
            self.node_type, self.node_id, self.input_count, self.output_count
        )
    }
}

impl StructuredLog for TransformationAppended {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id.0,
            node_type = %self.node_type,
            input_count = self.input_count,
            output_count = self.output_count,
            "{}", self
        );
    }
}

pub struct TransformationDeleted {
    pub node_id: NodeId,
}

impl Display for TransformationDeleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Deleted transformation node {}", self.node_id)
    }
}

impl StructuredLog for TransformationDeleted {
    fn log(&self) {
        tracing::debug!(node_id = self.node_id.0, "{}", self);
    }
}

/// Execution order computed from the augmented graph.
///
/// # Log Level
/// `debug!` - Computed on every uncached transform
///
/// # Example
/// ```
/// use the_transmogrifier::observability::messages::engine::ExecutionOrderComputed;
///
/// let msg = ExecutionOrderComputed {
///     node_count: 7,
///     executable_count: 3,
/// };
///
/// assert_eq!(msg.to_string(), "Computed execution order: 3 of 7 nodes are executable");
/// ```
pub struct ExecutionOrderComputed {
    pub node_count: usize,
    pub executable_count: usize,
}

impl Display for ExecutionOrderComputed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Computed execution order: {} of {} nodes are executable",
            self.executable_count, self.node_count
        )
    }
}

impl StructuredLog for ExecutionOrderComputed {
    fn log(&self) {
        tracing::debug!(
            node_count = self.node_count,
            executable_count = self.executable_count,
            "{}", self
        );
    }
}

/// A node's value transform failed.
///
/// # Log Level
/// `warn!` - The transform continues or aborts per failure strategy
pub struct NodeExecutionFailed<'a> {
    pub node_id: NodeId,
    pub node_type: NodeType,
    pub error: &'a NodeExecutionError,
}

impl Display for NodeExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} node {} failed: {}",
            self.node_type, self.node_id, self.error
        )
    }
}

impl StructuredLog for NodeExecutionFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            node_id = self.node_id.0,
            node_type = %self.node_type,
            error = %self.error,
            "{}", self
        );
    }
}

/// An input value could not be copied into the working document.
///
/// # Log Level
/// `debug!` - The slot is left unseeded and the transform goes on
pub struct InputSlotSkipped<'a> {
    pub location: &'a Location,
    pub error: &'a NodeExecutionError,
}

impl Display for InputSlotSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Left input slot {} unseeded: {}", self.location, self.error)
    }
}

impl StructuredLog for InputSlotSkipped<'_> {
    fn log(&self) {
        tracing::debug!(
            location = %self.location,
            error = %self.error,
            "{}", self
        );
    }
}

/// A document is about to be replayed through the execution order.
///
/// # Log Level
/// `debug!` - Emitted once per transformed document
///
/// # Example
/// ```
/// use the_transmogrifier::observability::messages::engine::TransformStarted;
///
/// let msg = TransformStarted {
///     node_count: 4,
///     include_unknown: true,
/// };
///
/// assert_eq!(msg.to_string(), "Replaying 4 nodes (unknown members kept)");
/// ```
pub struct TransformStarted {
    pub node_count: usize,
    pub include_unknown: bool,
}

impl Display for TransformStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.include_unknown {
            write!(f, "Replaying {} nodes (unknown members kept)", self.node_count)
        } else {
            write!(f, "Replaying {} nodes", self.node_count)
        }
    }
}

impl StructuredLog for TransformStarted {
    fn log(&self) {
        tracing::debug!(
            node_count = self.node_count,
            include_unknown = self.include_unknown,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "transform",
            span_name = name,
            node_count = self.node_count,
            include_unknown = self.include_unknown,
        )
    }
}

/// A document went through the whole execution order.
///
/// # Log Level
/// `debug!` - Emitted once per transformed document
pub struct TransformCompleted {
    pub executed: usize,
    pub failed: usize,
}

impl Display for TransformCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.failed > 0 {
            write!(
                f,
                "Transform completed: {} nodes replayed, {} failed",
                self.executed, self.failed
            )
        } else {
            write!(f, "Transform completed: {} nodes replayed", self.executed)
        }
    }
}

impl StructuredLog for TransformCompleted {
    fn log(&self) {
        tracing::debug!(
            executed = self.executed,
            failed = self.failed,
            "{}", self
        );
    }
}
