// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bidirectional field id ↔ path index with enablement and properties.
//!
//! Both directions are updated together on every mutation, so lookups never
//! depend on a cache being invalidated. Only live paths are indexed in the
//! path → id direction; every dead field shares the `[null]` sentinel.

use std::collections::BTreeMap;

use crate::errors::EngineError;
use crate::fields::{FieldId, FieldProperties, KeyPath};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRegistry {
    paths: BTreeMap<FieldId, KeyPath>,
    ids: BTreeMap<KeyPath, FieldId>,
    enabled: BTreeMap<FieldId, bool>,
    props: BTreeMap<FieldId, FieldProperties>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` at `path`. Fails if a live field already occupies `path`.
    pub fn insert(
        &mut self,
        id: FieldId,
        path: KeyPath,
        props: FieldProperties,
        enabled: bool,
    ) -> Result<(), EngineError> {
        self.ensure_vacant(&path)?;
        if !path.is_dead() {
            self.ids.insert(path.clone(), id);
        }
        self.paths.insert(id, path);
        self.enabled.insert(id, enabled);
        self.props.insert(id, props);
        Ok(())
    }

    /// Rewrite the path of an existing field, keeping the reverse index in step.
    pub fn set_path(&mut self, id: FieldId, path: KeyPath) -> Result<(), EngineError> {
        let current = self.paths.get(&id).ok_or(EngineError::UnknownField(id))?;
        if *current == path {
            return Ok(());
        }
        if let Some(&existing) = self.ids.get(&path) {
            if existing != id {
                return Err(EngineError::FieldAlreadyExists { path, existing });
            }
        }
        let old = self.paths.insert(id, path.clone());
        if let Some(old) = old {
            if self.ids.get(&old) == Some(&id) {
                self.ids.remove(&old);
            }
        }
        if !path.is_dead() {
            self.ids.insert(path, id);
        }
        Ok(())
    }

    /// Park the field on the dead sentinel path.
    pub fn kill(&mut self, id: FieldId) -> Result<(), EngineError> {
        self.set_path(id, KeyPath::dead())
    }

    /// Drop every trace of the field. Its id is not handed out again.
    pub fn remove(&mut self, id: FieldId) {
        if let Some(path) = self.paths.remove(&id) {
            if self.ids.get(&path) == Some(&id) {
                self.ids.remove(&path);
            }
        }
        self.enabled.remove(&id);
        self.props.remove(&id);
    }

    pub fn ensure_vacant(&self, path: &KeyPath) -> Result<(), EngineError> {
        match self.ids.get(path) {
            Some(&existing) => Err(EngineError::FieldAlreadyExists {
                path: path.clone(),
                existing,
            }),
            None => Ok(()),
        }
    }

    pub fn contains(&self, id: FieldId) -> bool {
        self.paths.contains_key(&id)
    }

    pub fn path(&self, id: FieldId) -> Option<&KeyPath> {
        self.paths.get(&id)
    }

    pub fn id_of(&self, path: &KeyPath) -> Option<FieldId> {
        self.ids.get(path).copied()
    }

    pub fn is_dead(&self, id: FieldId) -> bool {
        self.paths.get(&id).map(KeyPath::is_dead).unwrap_or(false)
    }

    pub fn is_enabled(&self, id: FieldId) -> bool {
        self.enabled.get(&id).copied().unwrap_or(false)
    }

    pub fn set_enabled(&mut self, id: FieldId, enabled: bool) -> Result<(), EngineError> {
        let slot = self.enabled.get_mut(&id).ok_or(EngineError::UnknownField(id))?;
        *slot = enabled;
        Ok(())
    }

    pub fn props(&self, id: FieldId) -> Option<&FieldProperties> {
        self.props.get(&id)
    }

    pub fn props_mut(&mut self, id: FieldId) -> Result<&mut FieldProperties, EngineError> {
        self.props.get_mut(&id).ok_or(EngineError::UnknownField(id))
    }

    /// All field ids in ascending order; dead fields only when asked for.
    pub fn ids(&self, include_dead: bool) -> Vec<FieldId> {
        self.paths
            .iter()
            .filter(|(_, path)| include_dead || !path.is_dead())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Live `(path, id)` pairs in path order.
    pub fn live_paths(&self) -> impl Iterator<Item = (&KeyPath, FieldId)> {
        self.ids.iter().map(|(path, id)| (path, *id))
    }

    /// Live direct children of the field, in path order.
    pub fn children(&self, id: FieldId) -> Vec<FieldId> {
        let Some(path) = self.paths.get(&id) else {
            return Vec::new();
        };
        if path.is_dead() {
            return Vec::new();
        }
        self.ids
            .range(path.clone()..)
            .skip_while(|(candidate, _)| *candidate == path)
            .take_while(|(candidate, _)| candidate.starts_with(path))
            .filter(|(candidate, _)| candidate.len() == path.len() + 1)
            .map(|(_, child)| *child)
            .collect()
    }

    /// The field followed by all of its live descendants, parents before children.
    pub fn preorder(&self, id: FieldId) -> Vec<FieldId> {
        let mut out = Vec::new();
        self.walk(id, &mut out, false);
        out
    }

    /// All live descendants followed by the field itself, children before parents.
    pub fn postorder(&self, id: FieldId) -> Vec<FieldId> {
        let mut out = Vec::new();
        self.walk(id, &mut out, true);
        out
    }

    fn walk(&self, id: FieldId, out: &mut Vec<FieldId>, post: bool) {
        if !post {
            out.push(id);
        }
        for child in self.children(id) {
            self.walk(child, out, post);
        }
        if post {
            out.push(id);
        }
    }

    /// Live fields whose parent path is not itself a live field.
    pub fn roots(&self) -> Vec<FieldId> {
        self.ids
            .iter()
            .filter(|(path, _)| match path.parent() {
                Some(parent) => parent.is_root() || !self.ids.contains_key(&parent),
                None => true,
            })
            .map(|(_, id)| *id)
            .collect()
    }

    /// Map from every live field to its live direct children.
    pub fn tree(&self) -> BTreeMap<FieldId, Vec<FieldId>> {
        self.ids
            .values()
            .map(|&id| (id, self.children(id)))
            .collect()
    }

    pub(crate) fn entries(
        &self,
    ) -> impl Iterator<Item = (FieldId, &KeyPath, bool, &FieldProperties)> {
        self.paths.iter().filter_map(move |(id, path)| {
            let props = self.props.get(id)?;
            Some((*id, path, self.is_enabled(*id), props))
        })
    }
}
