// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The transformation engine.
//!
//! [`TransformationEngine`] owns the field registry, the transformation DAG
//! and the id counters. Structural edits go through the methods in this
//! module; the graph-construction rules they trigger live in `creation`,
//! replay against documents in `execution` and the persisted form in
//! `serialization`.
//!
//! ```
//! use serde_json::json;
//! use the_transmogrifier::engine::{TransformOptions, TransformationEngine};
//! use the_transmogrifier::fields::FieldType;
//! use the_transmogrifier::graph::NodeMeta;
//! use the_transmogrifier::nodes::{NodeKind, SubstringOptions};
//!
//! let mut engine = TransformationEngine::new();
//! let name = engine.add_field("name".parse().unwrap(), FieldType::String.into(), None).unwrap();
//! engine.append_transformation(NodeKind::Capitalize, vec![name.into()], NodeMeta::default()).unwrap();
//! engine
//!     .append_transformation(
//!         NodeKind::Substring(SubstringOptions { from: 0, length: Some(2) }),
//!         vec![name.into()],
//!         NodeMeta::default(),
//!     )
//!     .unwrap();
//!
//! let out = engine
//!     .transform(&json!({"name": "Bob", "age": 17}), &TransformOptions::default())
//!     .unwrap();
//! assert_eq!(out, json!({"name": "BO"}));
//! ```

mod creation;
mod execution;
mod serialization;

use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::EngineError;
use crate::fields::{FieldId, FieldProperties, FieldRegistry, FieldType, KeyPath, PathSegment};
use crate::graph::{self, Dag, EdgeType, FieldRef, NodeId, NodeMeta, TransformationNode};
use crate::nodes::{IdentityKind, NodeKind};
use crate::observability::messages::engine::{FieldAdded, FieldDeleted, TransformationDeleted};
use crate::observability::messages::StructuredLog;

pub use execution::{NodeFailure, TransformOptions, TransformReport};

/// Names an input field of a transformation, either by id or by its current path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelector {
    Id(FieldId),
    Path(KeyPath),
}

impl From<FieldId> for FieldSelector {
    fn from(id: FieldId) -> Self {
        FieldSelector::Id(id)
    }
}

impl From<KeyPath> for FieldSelector {
    fn from(path: KeyPath) -> Self {
        FieldSelector::Path(path)
    }
}

/// Field registry, transformation DAG and id counters of one document schema.
#[derive(Debug, Default)]
pub struct TransformationEngine {
    registry: FieldRegistry,
    dag: Dag,
    /// Nodes in the order they were appended.
    execution_order: Vec<NodeId>,
    uid_field: u32,
    uid_node: u32,
    cached_order: Option<Vec<NodeId>>,
}

/// Equivalent to a serialization round trip; the cached execution order is not carried over.
impl Clone for TransformationEngine {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            dag: self.dag.clone(),
            execution_order: self.execution_order.clone(),
            uid_field: self.uid_field,
            uid_node: self.uid_node,
            cached_order: None,
        }
    }
}

impl TransformationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field at `path` and anchor it with an identity node.
    ///
    /// Without `source_node` the field is organic (present in source
    /// documents); otherwise it is synthetic and its identity node is linked
    /// from `source_node` by a `Synthetic` edge.
    pub fn add_field(
        &mut self,
        path: KeyPath,
        props: FieldProperties,
        source_node: Option<NodeId>,
    ) -> Result<FieldId, EngineError> {
        validate_field_path(&path)?;
        self.registry.ensure_vacant(&path)?;
        if let Some(source) = source_node {
            if !self.dag.contains(source) {
                return Err(EngineError::UnknownNode(source));
            }
        }

        let id = FieldId(self.uid_field);
        self.uid_field += 1;
        let field_type = props.field_type;
        self.registry.insert(id, path.clone(), props, true)?;

        let kind = match source_node {
            Some(_) => IdentityKind::Synthetic,
            None => IdentityKind::Organic,
        };
        let anchor = self.insert_node(
            NodeKind::identity(kind),
            vec![FieldRef {
                id,
                path: path.clone(),
            }],
            NodeMeta::default(),
        );
        if let Some(source) = source_node {
            self.dag.set_edge(source, anchor, EdgeType::Synthetic);
        }

        FieldAdded {
            field_id: id,
            path: &path,
            field_type,
            identity: kind,
        }
        .log();
        Ok(id)
    }

    /// Delete an organic field together with every transformation that references it.
    ///
    /// Live descendants of the field are deleted the same way, children first.
    pub fn delete_field(&mut self, id: FieldId) -> Result<(), EngineError> {
        if !self.registry.contains(id) {
            return Err(EngineError::UnknownField(id));
        }
        if self.anchor_kind(id) != Some(IdentityKind::Organic) {
            return Err(EngineError::NotOrganic(id));
        }

        for field in self.registry.postorder(id) {
            let referencing: Vec<NodeId> = self
                .dag
                .nodes()
                .filter(|node| node.references(field))
                .map(|node| node.id)
                .collect();
            let (anchors, transformations): (Vec<NodeId>, Vec<NodeId>) = referencing
                .into_iter()
                .partition(|node| self.dag.node(*node).map_or(false, TransformationNode::is_identity));
            for node in transformations {
                self.delete_transformation(node)?;
            }
            for node in anchors {
                self.dag.remove_node(node);
                self.execution_order.retain(|entry| *entry != node);
            }
            self.registry.remove(field);
            FieldDeleted { field_id: field }.log();
        }
        Ok(())
    }

    /// Relocate a field (and everything below it) to `new_path`.
    ///
    /// Returns `None` without touching the graph when `new_path` is the
    /// field's current path.
    pub fn rename_field(&mut self, id: FieldId, new_path: KeyPath) -> Result<Option<NodeId>, EngineError> {
        let current = self.registry.path(id).ok_or(EngineError::UnknownField(id))?;
        if *current == new_path {
            return Ok(None);
        }
        self.append_transformation(
            NodeKind::Rename,
            vec![FieldSelector::Id(id)],
            NodeMeta::with_outputs(vec![new_path]),
        )
        .map(Some)
    }

    /// Replace the type-specific options of a node. The type code, the
    /// declared fields and outputs stay as they are, so no structure is
    /// re-derived.
    pub fn edit_transformation(&mut self, id: NodeId, kind: NodeKind) -> Result<(), EngineError> {
        let node = self.dag.node(id).ok_or(EngineError::UnknownNode(id))?;
        if node.node_type() != kind.node_type() {
            return Err(EngineError::InvalidOptions {
                node_type: node.node_type(),
                reason: format!("cannot change the type code to {}", kind.node_type()),
            });
        }
        let inputs: Vec<KeyPath> = node.fields.iter().map(|field| field.path.clone()).collect();
        kind.behavior()
            .check_shape(&inputs, &node.meta.new_field_key_paths)
            .map_err(|reason| EngineError::InvalidOptions {
                node_type: kind.node_type(),
                reason,
            })?;
        if let Some(node) = self.dag.node_mut(id) {
            node.kind = kind;
        }
        Ok(())
    }

    /// Remove a node from the graph and from the append order.
    ///
    /// A node with exactly one predecessor and one successor is bridged: the
    /// two get linked with the type of the removed node's outgoing edge.
    /// Other topologies are left unlinked.
    pub fn delete_transformation(&mut self, id: NodeId) -> Result<(), EngineError> {
        if !self.dag.contains(id) {
            return Err(EngineError::UnknownNode(id));
        }
        let predecessors: Vec<NodeId> = self.dag.predecessors(id).collect();
        let successors: Vec<(NodeId, EdgeType)> = self.dag.successors(id).collect();

        self.dag.remove_node(id);
        self.execution_order.retain(|entry| *entry != id);

        if let ([from], [(to, edge_type)]) = (predecessors.as_slice(), successors.as_slice()) {
            self.dag.set_edge(*from, *to, *edge_type);
        }
        TransformationDeleted { node_id: id }.log();
        Ok(())
    }

    pub fn enable_field(&mut self, id: FieldId) -> Result<(), EngineError> {
        self.registry.set_enabled(id, true)
    }

    pub fn disable_field(&mut self, id: FieldId) -> Result<(), EngineError> {
        self.registry.set_enabled(id, false)
    }

    pub fn get_field_enabled(&self, id: FieldId) -> bool {
        self.registry.is_enabled(id)
    }

    pub fn get_field_id(&self, path: &KeyPath) -> Option<FieldId> {
        self.registry.id_of(path)
    }

    pub fn get_field_path(&self, id: FieldId) -> Option<&KeyPath> {
        self.registry.path(id)
    }

    pub fn get_field_type(&self, id: FieldId) -> Option<FieldType> {
        self.registry.props(id).map(|props| props.field_type)
    }

    pub fn get_field_props(&self, id: FieldId) -> Option<&FieldProperties> {
        self.registry.props(id)
    }

    pub fn set_field_props(&mut self, id: FieldId, props: FieldProperties) -> Result<(), EngineError> {
        *self.registry.props_mut(id)? = props;
        Ok(())
    }

    /// A single property; `type` reads the inferred field type.
    pub fn get_field_prop(&self, id: FieldId, key: &str) -> Option<Value> {
        let props = self.registry.props(id)?;
        match key {
            "type" => Some(Value::String(props.field_type.to_string())),
            _ => props.extra.get(key).cloned(),
        }
    }

    pub fn set_field_prop(&mut self, id: FieldId, key: &str, value: Value) -> Result<(), EngineError> {
        let props = self.registry.props_mut(id)?;
        if key == "type" {
            props.field_type = serde_json::from_value(value)?;
        } else {
            props.extra.insert(key.to_string(), value);
        }
        Ok(())
    }

    pub fn is_dead(&self, id: FieldId) -> bool {
        self.registry.is_dead(id)
    }

    pub fn get_all_field_ids(&self, include_dead: bool) -> Vec<FieldId> {
        self.registry.ids(include_dead)
    }

    pub fn get_field_children(&self, id: FieldId) -> Vec<FieldId> {
        self.registry.children(id)
    }

    /// Live fields that have no live parent field.
    pub fn root_fields(&self) -> Vec<FieldId> {
        self.registry.roots()
    }

    /// Every live field mapped to its live direct children.
    pub fn create_tree(&self) -> BTreeMap<FieldId, Vec<FieldId>> {
        self.registry.tree()
    }

    /// Transformations (identity nodes excluded) that declare `field` as an
    /// input, in the order they were appended.
    pub fn get_transformations(&self, field: FieldId) -> Vec<NodeId> {
        self.execution_order
            .iter()
            .copied()
            .filter(|id| {
                self.dag
                    .node(*id)
                    .map_or(false, |node| !node.is_identity() && node.references(field))
            })
            .collect()
    }

    pub fn get_transformation(&self, id: NodeId) -> Option<&TransformationNode> {
        self.dag.node(id)
    }

    pub fn dag(&self) -> &Dag {
        &self.dag
    }

    /// Nodes in the order they were appended.
    pub fn chronological_order(&self) -> &[NodeId] {
        &self.execution_order
    }

    pub fn compute_execution_order(&self) -> Result<Vec<NodeId>, EngineError> {
        graph::compute_execution_order(&self.dag, &self.execution_order)
    }

    /// Drop the execution order remembered by `transform`.
    pub fn clear_cached_order(&mut self) {
        self.cached_order = None;
    }

    fn insert_node(&mut self, kind: NodeKind, fields: Vec<FieldRef>, meta: NodeMeta) -> NodeId {
        let id = NodeId(self.uid_node);
        self.uid_node += 1;
        self.dag.insert_node(TransformationNode { id, kind, fields, meta });
        id
    }

    /// The identity node a field was registered with.
    fn anchor(&self, field: FieldId) -> Option<NodeId> {
        self.dag
            .nodes()
            .find(|node| {
                matches!(
                    node.identity_kind(),
                    Some(IdentityKind::Organic) | Some(IdentityKind::Synthetic)
                ) && node.fields.first().map(|f| f.id) == Some(field)
            })
            .map(|node| node.id)
    }

    fn anchor_kind(&self, field: FieldId) -> Option<IdentityKind> {
        self.anchor(field)
            .and_then(|id| self.dag.node(id))
            .and_then(TransformationNode::identity_kind)
    }

    fn resolve(&self, selector: &FieldSelector) -> Result<FieldRef, EngineError> {
        let id = match selector {
            FieldSelector::Id(id) => *id,
            FieldSelector::Path(path) => self
                .registry
                .id_of(path)
                .ok_or_else(|| EngineError::UnknownPath(path.clone()))?,
        };
        match self.registry.path(id) {
            Some(path) if !path.is_dead() => Ok(FieldRef { id, path: path.clone() }),
            _ => Err(EngineError::UnknownField(id)),
        }
    }
}

/// Field paths are non-empty and made of keys and wildcards only.
fn validate_field_path(path: &KeyPath) -> Result<(), EngineError> {
    if path.is_empty() || path.iter().any(|segment| *segment == PathSegment::Null) {
        return Err(EngineError::InvalidPath(path.clone()));
    }
    Ok(())
}
