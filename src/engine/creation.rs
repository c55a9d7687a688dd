// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Graph construction: the structural side effects of appending a transformation.
//!
//! Every appended node is dispatched on its kind. Value-only transformations
//! are chained after the last node of each input field with a `Same` edge.
//! Structural ones (those declaring output paths) are linked with
//! `Synthetic` edges and materialize their outputs, creating missing
//! ancestors on the way. Type changes reported by the node's behavior are
//! propagated to the field registry, killing the subfields of containers
//! that stop being containers.
//!
//! A field's *last node* is the tail of its provenance chain: start at the
//! identity node it was registered with and keep following successors that
//! declare the field as an input.

use crate::errors::EngineError;
use crate::fields::{FieldId, FieldType, KeyPath, PathSegment};
use crate::graph::{EdgeType, FieldRef, NodeId, NodeMeta, TransformationNode};
use crate::nodes::{DuplicationShape, GroupByOptions, IdentityKind, NodeKind, NodeType};
use crate::observability::messages::engine::{
    FieldKilled, FieldRenamed, FieldTypeChanged, TransformationAppended,
};
use crate::observability::messages::StructuredLog;

use super::{validate_field_path, FieldSelector, TransformationEngine};

impl TransformationEngine {
    /// Append a transformation over `inputs` and apply its structural side effects.
    ///
    /// All preconditions are checked before anything is mutated, so an error
    /// leaves the engine unchanged.
    pub fn append_transformation(
        &mut self,
        kind: NodeKind,
        inputs: Vec<FieldSelector>,
        meta: NodeMeta,
    ) -> Result<NodeId, EngineError> {
        let fields = inputs
            .iter()
            .map(|selector| self.resolve(selector))
            .collect::<Result<Vec<_>, _>>()?;
        self.validate_transformation(&kind, &fields, &meta)?;

        let node_type = kind.node_type();
        let input_count = fields.len();
        let output_count = meta.new_field_key_paths.len();
        let id = self.insert_node(kind, fields, meta);
        self.execution_order.push(id);

        let appended = TransformationAppended {
            node_id: id,
            node_type,
            input_count,
            output_count,
        };
        let span = appended.span("append_transformation");
        let _guard = span.enter();
        self.visit(id)?;

        appended.log();
        Ok(id)
    }

    fn validate_transformation(
        &self,
        kind: &NodeKind,
        fields: &[FieldRef],
        meta: &NodeMeta,
    ) -> Result<(), EngineError> {
        let node_type = kind.node_type();
        let invalid = |reason: String| EngineError::InvalidOptions { node_type, reason };
        let inputs: Vec<KeyPath> = fields.iter().map(|field| field.path.clone()).collect();
        let outputs = &meta.new_field_key_paths;

        kind.behavior().check_shape(&inputs, outputs).map_err(invalid)?;

        match kind {
            NodeKind::Identity(options) => {
                if options.identity_type != IdentityKind::Removal {
                    return Err(invalid(format!(
                        "only Removal identity nodes can be appended, got {}",
                        options.identity_type
                    )));
                }
                Ok(())
            }
            NodeKind::Rename => self.validate_rename(&fields[0], &outputs[0]),
            NodeKind::Duplicate => {
                DuplicationShape::classify(&inputs[0], &outputs[0])?;
                if outputs[0].starts_with(&inputs[0]) {
                    return Err(EngineError::UnsupportedDuplication {
                        from: inputs[0].clone(),
                        to: outputs[0].clone(),
                        reason: "a field cannot be duplicated into itself",
                    });
                }
                self.validate_outputs(node_type, outputs)
            }
            NodeKind::GroupBy(_) => {
                let field_type = self.get_field_type(fields[0].id).unwrap_or_default();
                if field_type != FieldType::Array {
                    return Err(invalid(format!(
                        "'{}' is a {} field, expected an array",
                        inputs[0], field_type
                    )));
                }
                if let Some(nested) = outputs.iter().find(|output| output.starts_with(&inputs[0])) {
                    return Err(invalid(format!(
                        "output '{}' lies inside the grouped array",
                        nested
                    )));
                }
                self.validate_outputs(node_type, outputs)
            }
            _ => self.validate_outputs(node_type, outputs),
        }
    }

    fn validate_outputs(&self, node_type: NodeType, outputs: &[KeyPath]) -> Result<(), EngineError> {
        for output in outputs {
            validate_field_path(output)?;
            self.check_ancestors(output)
                .map_err(|reason| EngineError::InvalidOptions { node_type, reason })?;
        }
        Ok(())
    }

    /// Every existing ancestor of `path` must be a container of the right shape.
    fn check_ancestors(&self, path: &KeyPath) -> Result<(), String> {
        let segments = path.segments();
        for len in 1..segments.len() {
            let prefix = KeyPath::new(segments[..len].to_vec());
            let Some(ancestor) = self.registry.id_of(&prefix) else {
                continue;
            };
            let required = container_for(&segments[len]);
            let actual = self.get_field_type(ancestor).unwrap_or_default();
            if actual != required {
                return Err(format!(
                    "'{}' is a {} field and cannot contain '{}'",
                    prefix, actual, path
                ));
            }
        }
        Ok(())
    }

    fn validate_rename(&self, field: &FieldRef, to: &KeyPath) -> Result<(), EngineError> {
        let from = &field.path;
        let invalid = |reason: String| EngineError::InvalidRename {
            from: from.clone(),
            to: to.clone(),
            reason,
        };

        if to == from {
            return Err(invalid("the path is unchanged".to_string()));
        }
        if to.iter().any(|segment| *segment == PathSegment::Null) {
            return Err(invalid("the new path contains null".to_string()));
        }

        let moving = self.registry.preorder(field.id);
        let relocated: Vec<(FieldId, KeyPath)> = if to.is_root() {
            let field_type = self.get_field_type(field.id).unwrap_or_default();
            if field_type != FieldType::Object {
                return Err(invalid(format!(
                    "only object fields can be promoted to the document root, '{}' is a {} field",
                    from, field_type
                )));
            }
            moving
                .iter()
                .skip(1)
                .filter_map(|id| Some((*id, self.registry.path(*id)?.strip_prefix(from)?)))
                .collect()
        } else {
            if to.starts_with(from) {
                return Err(invalid("a field cannot be moved below itself".to_string()));
            }
            self.check_ancestors(to).map_err(invalid)?;
            moving
                .iter()
                .filter_map(|id| Some((*id, self.registry.path(*id)?.splice_prefix(from, to)?)))
                .collect()
        };

        for (_, target) in &relocated {
            if let Some(occupant) = self.registry.id_of(target) {
                if !moving.contains(&occupant) {
                    return Err(invalid(format!(
                        "'{}' is already taken by field {}",
                        target, occupant
                    )));
                }
            }
        }
        Ok(())
    }

    fn visit(&mut self, id: NodeId) -> Result<(), EngineError> {
        let node = self
            .dag
            .node(id)
            .cloned()
            .ok_or(EngineError::UnknownNode(id))?;

        match &node.kind {
            NodeKind::Identity(_) => self.visit_removal(&node),
            NodeKind::Rename => self.visit_rename(&node),
            NodeKind::Duplicate => self.visit_duplicate(&node),
            NodeKind::GroupBy(options) => self.visit_group_by(&node, options),
            NodeKind::Capitalize
            | NodeKind::Substring(_)
            | NodeKind::Append(_)
            | NodeKind::Prepend(_)
            | NodeKind::Split(_)
            | NodeKind::Join(_)
            | NodeKind::CastType(_) => self.visit_default(&node),
        }
    }

    fn visit_default(&mut self, node: &TransformationNode) -> Result<(), EngineError> {
        let edge_type = if node.is_structural() {
            EdgeType::Synthetic
        } else {
            EdgeType::Same
        };
        for field in &node.fields {
            self.link_field(field.id, node.id, edge_type);
        }
        self.change_type_effects(node)?;
        if node.is_structural() {
            self.process_output_fields(node)?;
        }
        Ok(())
    }

    fn visit_removal(&mut self, node: &TransformationNode) -> Result<(), EngineError> {
        let field = node.fields[0].id;
        self.kill_subfields(field)?;
        self.link_field(field, node.id, EdgeType::Same);
        self.registry.kill(field)?;
        FieldKilled {
            field_id: field,
            path: &node.fields[0].path,
        }
        .log();
        Ok(())
    }

    fn visit_rename(&mut self, node: &TransformationNode) -> Result<(), EngineError> {
        let field = node.fields[0].id;
        let from = node.fields[0].path.clone();
        let to = node.meta.new_field_key_paths[0].clone();

        self.link_field(field, node.id, EdgeType::Synthetic);

        if to.is_root() {
            let members: Vec<FieldId> = self
                .registry
                .postorder(field)
                .into_iter()
                .filter(|id| *id != field)
                .collect();
            self.retire_field(field)?;
            for member in members {
                let Some(target) = self.registry.path(member).and_then(|p| p.strip_prefix(&from)) else {
                    continue;
                };
                self.relocate(member, target, node.id)?;
            }
            return Ok(());
        }

        self.ensure_ancestors(&to, node.id)?;
        for member in self.registry.postorder(field) {
            let Some(target) = self.registry.path(member).and_then(|p| p.splice_prefix(&from, &to)) else {
                continue;
            };
            self.relocate(member, target, node.id)?;
        }
        Ok(())
    }

    fn visit_duplicate(&mut self, node: &TransformationNode) -> Result<(), EngineError> {
        let source = node.fields[0].id;
        let to = node.meta.new_field_key_paths[0].clone();
        let shape = DuplicationShape::classify(&node.fields[0].path, &to)?;

        self.visit_default(node)?;

        let root = match shape {
            DuplicationShape::OneToOne => to,
            DuplicationShape::ManyToOne => {
                let element = to.child(PathSegment::Wildcard);
                if self.registry.id_of(&element).is_none() {
                    let props = self.registry.props(source).cloned().unwrap_or_default();
                    self.add_field(element.clone(), props, Some(node.id))?;
                }
                element
            }
        };
        self.copy_nested_structure(source, &root, node.id)
    }

    fn visit_group_by(&mut self, node: &TransformationNode, options: &GroupByOptions) -> Result<(), EngineError> {
        self.visit_default(node)?;

        let array = node.fields[0].path.clone();
        self.add_dependency(&options.key_path(&array), node.id);

        let element = array.child(PathSegment::Wildcard);
        if let Some(element_field) = self.registry.id_of(&element) {
            for output in &node.meta.new_field_key_paths {
                self.copy_nested_structure(element_field, &output.child(PathSegment::Wildcard), node.id)?;
            }
        }
        Ok(())
    }

    /// Record the type change each input undergoes at `node`.
    fn change_type_effects(&mut self, node: &TransformationNode) -> Result<(), EngineError> {
        let behavior = node.kind.behavior();
        let changes: Vec<(usize, FieldId, FieldType, FieldType)> = node
            .fields
            .iter()
            .enumerate()
            .filter_map(|(index, field)| {
                let current = self.get_field_type(field.id)?;
                let next = behavior.compute_new_source_type(self, node, index);
                (current != next).then_some((index, field.id, current, next))
            })
            .collect();

        for (index, field, from, to) in changes {
            if index == 0 {
                if let Some(stored) = self.dag.node_mut(node.id) {
                    stored.meta.from_type = Some(from);
                }
            }
            self.registry.props_mut(field)?.field_type = to;
            FieldTypeChanged {
                field_id: field,
                from,
                to,
            }
            .log();

            if from.is_compound() {
                self.kill_subfields(field)?;
            }
            if to == FieldType::Array {
                let element = match self.registry.path(field) {
                    Some(path) => path.child(PathSegment::Wildcard),
                    None => continue,
                };
                if self.registry.id_of(&element).is_none() {
                    self.add_field(element, FieldType::String.into(), Some(node.id))?;
                }
            }
        }
        Ok(())
    }

    /// Create each declared output (and its missing ancestors) unless a live field is already there.
    fn process_output_fields(&mut self, node: &TransformationNode) -> Result<(), EngineError> {
        let behavior = node.kind.behavior();
        for (index, output) in node.meta.new_field_key_paths.iter().enumerate() {
            self.ensure_ancestors(output, node.id)?;
            if self.registry.id_of(output).is_none() {
                let field_type = behavior.compute_new_field_type(self, node, index);
                self.add_field(output.clone(), field_type.into(), Some(node.id))?;
            }
        }
        Ok(())
    }

    fn ensure_ancestors(&mut self, path: &KeyPath, source: NodeId) -> Result<(), EngineError> {
        let segments = path.segments();
        for len in 1..segments.len() {
            let prefix = KeyPath::new(segments[..len].to_vec());
            if self.registry.id_of(&prefix).is_none() {
                let container = container_for(&segments[len]);
                self.add_field(prefix, container.into(), Some(source))?;
            }
        }
        Ok(())
    }

    /// Mark every proper descendant of `field` removed, children first.
    fn kill_subfields(&mut self, field: FieldId) -> Result<(), EngineError> {
        for descendant in self.registry.postorder(field) {
            if descendant != field {
                self.retire_field(descendant)?;
            }
        }
        Ok(())
    }

    /// Park a field on the dead path behind a new Removal identity node.
    fn retire_field(&mut self, field: FieldId) -> Result<NodeId, EngineError> {
        let path = self
            .registry
            .path(field)
            .cloned()
            .ok_or(EngineError::UnknownField(field))?;
        let removal = self.insert_node(
            NodeKind::identity(IdentityKind::Removal),
            vec![FieldRef {
                id: field,
                path: path.clone(),
            }],
            NodeMeta::default(),
        );
        self.link_field(field, removal, EdgeType::Same);
        self.registry.kill(field)?;
        FieldKilled {
            field_id: field,
            path: &path,
        }
        .log();
        Ok(removal)
    }

    /// Move one field to `target` behind a Rename identity node. Readers of
    /// the old position run before the identity, readers of the new one after.
    fn relocate(&mut self, field: FieldId, target: KeyPath, rename: NodeId) -> Result<(), EngineError> {
        let last = self.field_last_node(field);
        let from = self
            .registry
            .path(field)
            .cloned()
            .ok_or(EngineError::UnknownField(field))?;
        self.registry.set_path(field, target.clone())?;

        let identity = self.insert_node(
            NodeKind::identity(IdentityKind::Rename),
            vec![FieldRef {
                id: field,
                path: target.clone(),
            }],
            NodeMeta::default(),
        );
        if let Some(last) = last {
            self.dag.set_edge(last, identity, EdgeType::Same);
        }
        self.dag.set_edge(rename, identity, EdgeType::Synthetic);

        FieldRenamed {
            field_id: field,
            from: &from,
            to: &target,
        }
        .log();
        Ok(())
    }

    /// Re-create the structure below `source` under `root`.
    ///
    /// Copies are chained after the current last node of the field they were
    /// copied from, so they see the source's history up to this point and
    /// nothing appended later. Targets that already exist receive the
    /// source's properties instead.
    fn copy_nested_structure(&mut self, source: FieldId, root: &KeyPath, node: NodeId) -> Result<(), EngineError> {
        let Some(source_path) = self.registry.path(source).cloned() else {
            return Ok(());
        };
        for member in self.registry.preorder(source) {
            let Some(suffix) = self.registry.path(member).and_then(|p| p.strip_prefix(&source_path)) else {
                continue;
            };
            let target = root.join(&suffix);
            let props = self.registry.props(member).cloned().unwrap_or_default();
            match self.registry.id_of(&target) {
                Some(existing) => self.registry.props_mut(existing)?.merge_from(&props),
                None => {
                    let anchor = self.field_last_node(member).unwrap_or(node);
                    self.add_field(target, props, Some(anchor))?;
                }
            }
        }
        Ok(())
    }

    /// Make `node` depend on the field at `path` without declaring it as an input.
    fn add_dependency(&mut self, path: &KeyPath, node: NodeId) {
        let Some(field) = self.registry.id_of(path) else {
            return;
        };
        if let Some(last) = self.field_last_node(field) {
            if last != node {
                self.dag.set_edge(last, node, EdgeType::Synthetic);
            }
        }
    }

    fn link_field(&mut self, field: FieldId, node: NodeId, edge_type: EdgeType) {
        if let Some(last) = self.field_last_node(field) {
            if last != node {
                self.dag.set_edge(last, node, edge_type);
            }
        }
    }

    pub(crate) fn field_last_node(&self, field: FieldId) -> Option<NodeId> {
        let mut current = self.anchor(field)?;
        for _ in 0..self.dag.len() {
            let next = self
                .dag
                .successors(current)
                .map(|(successor, _)| successor)
                .filter(|successor| {
                    self.dag
                        .node(*successor)
                        .map_or(false, |candidate| candidate.references(field))
                })
                .max();
            match next {
                Some(next) => current = next,
                None => break,
            }
        }
        Some(current)
    }
}

/// Container type a field needs to hold a child addressed by `segment`.
fn container_for(segment: &PathSegment) -> FieldType {
    if segment.is_index() {
        FieldType::Array
    } else {
        FieldType::Object
    }
}
