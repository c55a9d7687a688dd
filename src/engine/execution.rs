// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Replaying the transformation graph against documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::document;
use crate::errors::{EngineError, FailureStrategy, NodeExecutionError};
use crate::fields::{FieldId, KeyPath};
use crate::graph::NodeId;
use crate::nodes::IdentityKind;
use crate::observability::messages::engine::{
    NodeExecutionFailed, TransformCompleted, TransformStarted,
};
use crate::observability::messages::StructuredLog;

use super::TransformationEngine;

/// Options for [`TransformationEngine::transform`]. Every flag defaults to off
/// and failures default to [`FailureStrategy::ContinueOnError`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Reuse the execution order computed by an earlier call. Structural
    /// edits do not invalidate it; pass `false` after editing.
    pub cache: bool,
    /// Start from the whole input document instead of only its registered fields.
    pub include_unknown: bool,
    /// Strip objects left empty by the transformations.
    pub remove_empty_objects: bool,
    pub failure_strategy: FailureStrategy,
}

/// A node whose value transform failed while the engine kept going.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeFailure {
    pub node_id: NodeId,
    pub error: NodeExecutionError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformReport {
    pub document: Value,
    pub errors: Vec<NodeFailure>,
}

impl TransformReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl TransformationEngine {
    /// Transform `doc` and return the resulting document.
    ///
    /// Node failures are handled per `options.failure_strategy`; use
    /// [`transform_with_report`](Self::transform_with_report) to see the ones
    /// that were skipped.
    pub fn transform(&mut self, doc: &Value, options: &TransformOptions) -> Result<Value, EngineError> {
        self.transform_with_report(doc, options)
            .map(|report| report.document)
    }

    pub fn transform_with_report(
        &mut self,
        doc: &Value,
        options: &TransformOptions,
    ) -> Result<TransformReport, EngineError> {
        let order = self.resolve_order(options.cache)?;

        let started = TransformStarted {
            node_count: order.len(),
            include_unknown: options.include_unknown,
        };
        let span = started.span("transform");
        let _guard = span.enter();
        started.log();

        let mut output = if options.include_unknown {
            doc.clone()
        } else {
            document::seed(doc, &self.seed_paths())
        };

        let mut errors = Vec::new();
        for id in &order {
            let Some(node) = self.dag.node(*id) else {
                continue;
            };
            let Err(error) = node.kind.behavior().apply(node, &mut output) else {
                continue;
            };
            NodeExecutionFailed {
                node_id: node.id,
                node_type: node.node_type(),
                error: &error,
            }
            .log();
            match options.failure_strategy {
                FailureStrategy::FailFast => {
                    return Err(EngineError::NodeFailed {
                        node_id: node.id,
                        source: error,
                    })
                }
                FailureStrategy::ContinueOnError => errors.push(NodeFailure {
                    node_id: node.id,
                    error,
                }),
            }
        }

        if options.remove_empty_objects {
            document::strip_empty_objects(&mut output);
        }

        let visible = self.enabled_closure();
        let retired = self.retired_paths();
        let keep = |path: &KeyPath| match self.registry.id_of(path) {
            Some(field) => visible.contains(&field),
            None => options.include_unknown && !retired.contains(path),
        };
        document::prune(&mut output, &keep);

        TransformCompleted {
            executed: order.len(),
            failed: errors.len(),
        }
        .log();

        Ok(TransformReport {
            document: output,
            errors,
        })
    }

    fn resolve_order(&mut self, use_cache: bool) -> Result<Vec<NodeId>, EngineError> {
        if use_cache {
            if let Some(order) = &self.cached_order {
                return Ok(order.clone());
            }
        }
        let order = self.compute_execution_order()?;
        self.cached_order = Some(order.clone());
        Ok(order)
    }

    /// Paths organic fields were registered at. Those are the paths input
    /// documents use, whatever happened to the fields since.
    fn seed_paths(&self) -> Vec<KeyPath> {
        self.dag
            .nodes()
            .filter(|node| node.identity_kind() == Some(IdentityKind::Organic))
            .filter_map(|node| node.fields.first().map(|field| field.path.clone()))
            .collect()
    }

    /// Enabled fields reachable from a root field through enabled fields only.
    fn enabled_closure(&self) -> BTreeSet<FieldId> {
        let mut visible = BTreeSet::new();
        let mut pending: Vec<FieldId> = self
            .registry
            .roots()
            .into_iter()
            .filter(|root| self.registry.is_enabled(*root))
            .collect();
        while let Some(field) = pending.pop() {
            if !visible.insert(field) {
                continue;
            }
            pending.extend(
                self.registry
                    .children(field)
                    .into_iter()
                    .filter(|child| self.registry.is_enabled(*child)),
            );
        }
        visible
    }

    /// Paths given up by removals.
    fn retired_paths(&self) -> BTreeSet<KeyPath> {
        self.dag
            .nodes()
            .filter(|node| node.identity_kind() == Some(IdentityKind::Removal))
            .filter_map(|node| node.fields.first().map(|field| field.path.clone()))
            .collect()
    }
}
