// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Persisted form of an engine.
//!
//! ```json
//! {
//!   "dag": {"nodes": [{"id": 0, "typeCode": "Identity", "identityType": "Organic", "fields": [...], "meta": {}}],
//!           "edges": [{"from": 0, "to": 1, "type": "Same"}]},
//!   "executionOrder": [1],
//!   "uidField": 1,
//!   "uidNode": 2,
//!   "IDToPathMap": [[0, ["name"]]],
//!   "fieldEnabled": [[0, true]],
//!   "fieldProps": [[0, {"type": "string"}]]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::errors::EngineError;
use crate::fields::{FieldId, FieldProperties, FieldRegistry, KeyPath};
use crate::graph::{Dag, NodeId};

use super::TransformationEngine;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EngineSnapshot {
    dag: Dag,
    #[serde(rename = "executionOrder")]
    execution_order: Vec<NodeId>,
    #[serde(rename = "uidField")]
    uid_field: u32,
    #[serde(rename = "uidNode")]
    uid_node: u32,
    #[serde(rename = "IDToPathMap")]
    id_to_path: Vec<(FieldId, KeyPath)>,
    #[serde(rename = "fieldEnabled")]
    field_enabled: Vec<(FieldId, bool)>,
    #[serde(rename = "fieldProps")]
    field_props: Vec<(FieldId, FieldProperties)>,
}

impl From<&TransformationEngine> for EngineSnapshot {
    fn from(engine: &TransformationEngine) -> Self {
        let mut id_to_path = Vec::new();
        let mut field_enabled = Vec::new();
        let mut field_props = Vec::new();
        for (id, path, enabled, props) in engine.registry.entries() {
            id_to_path.push((id, path.clone()));
            field_enabled.push((id, enabled));
            field_props.push((id, props.clone()));
        }
        Self {
            dag: engine.dag.clone(),
            execution_order: engine.execution_order.clone(),
            uid_field: engine.uid_field,
            uid_node: engine.uid_node,
            id_to_path,
            field_enabled,
            field_props,
        }
    }
}

impl TryFrom<EngineSnapshot> for TransformationEngine {
    type Error = EngineError;

    fn try_from(snapshot: EngineSnapshot) -> Result<Self, Self::Error> {
        let inconsistent = EngineError::InvalidSnapshot;

        let ids: BTreeSet<FieldId> = snapshot.id_to_path.iter().map(|(id, _)| *id).collect();
        if ids.len() != snapshot.id_to_path.len() {
            return Err(inconsistent("IDToPathMap lists a field twice".to_string()));
        }
        let enabled_ids: BTreeSet<FieldId> = snapshot.field_enabled.iter().map(|(id, _)| *id).collect();
        let props_ids: BTreeSet<FieldId> = snapshot.field_props.iter().map(|(id, _)| *id).collect();
        if enabled_ids != ids || props_ids != ids {
            return Err(inconsistent(
                "IDToPathMap, fieldEnabled and fieldProps cover different fields".to_string(),
            ));
        }
        if let Some(max) = ids.iter().next_back() {
            if max.0 >= snapshot.uid_field {
                return Err(inconsistent(format!(
                    "field {} is not below uidField {}",
                    max, snapshot.uid_field
                )));
            }
        }
        if let Some(max) = snapshot.dag.node_ids().max() {
            if max.0 >= snapshot.uid_node {
                return Err(inconsistent(format!(
                    "node {} is not below uidNode {}",
                    max, snapshot.uid_node
                )));
            }
        }
        if let Some(missing) = snapshot
            .execution_order
            .iter()
            .find(|id| !snapshot.dag.contains(**id))
        {
            return Err(inconsistent(format!(
                "executionOrder references missing node {}",
                missing
            )));
        }

        let mut enabled: BTreeMap<FieldId, bool> = snapshot.field_enabled.into_iter().collect();
        let mut props: BTreeMap<FieldId, FieldProperties> = snapshot.field_props.into_iter().collect();
        let mut registry = FieldRegistry::new();
        for (id, path) in snapshot.id_to_path {
            let field_enabled = enabled.remove(&id).unwrap_or(true);
            let field_props = props.remove(&id).unwrap_or_default();
            registry.insert(id, path, field_props, field_enabled)?;
        }

        Ok(TransformationEngine {
            registry,
            dag: snapshot.dag,
            execution_order: snapshot.execution_order,
            uid_field: snapshot.uid_field,
            uid_node: snapshot.uid_node,
            cached_order: None,
        })
    }
}

impl Serialize for TransformationEngine {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EngineSnapshot::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TransformationEngine {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let snapshot = EngineSnapshot::deserialize(deserializer)?;
        TransformationEngine::try_from(snapshot).map_err(serde::de::Error::custom)
    }
}

impl TransformationEngine {
    /// Snapshot of the whole engine as JSON.
    pub fn to_json(&self) -> Result<Value, EngineError> {
        Ok(serde_json::to_value(EngineSnapshot::from(self))?)
    }

    /// Rebuild an engine from [`to_json`](Self::to_json) output.
    pub fn load(json: &Value) -> Result<Self, EngineError> {
        let snapshot: EngineSnapshot = serde_json::from_value(json.clone())?;
        TransformationEngine::try_from(snapshot)
    }

    /// Structural equality of the two snapshots. Costs a full serialization
    /// of both engines.
    pub fn equals(&self, other: &TransformationEngine) -> bool {
        match (self.to_json(), other.to_json()) {
            (Ok(left), Ok(right)) => left == right,
            _ => false,
        }
    }
}
