// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Navigation and surgery on `serde_json::Value` documents.
//!
//! A [`KeyPath`] may contain wildcards; [`resolve`] expands it into the
//! [`Location`]s that actually exist in a document, each a concrete chain of
//! member names and array indices.

use serde_json::{Map, Value};
use std::fmt;

use crate::errors::NodeExecutionError;
use crate::fields::{KeyPath, PathSegment};
use crate::observability::messages::engine::InputSlotSkipped;
use crate::observability::messages::StructuredLog;

/// One concrete step into a document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    Key(String),
    Index(usize),
}

/// A concrete location inside a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location(Vec<Step>);

impl Location {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    pub fn push(&mut self, step: Step) {
        self.0.push(step);
    }

    pub fn pop(&mut self) -> Option<Step> {
        self.0.pop()
    }

    /// The array indices this location picked for each wildcard, in order.
    pub fn indices(&self) -> Vec<usize> {
        self.0
            .iter()
            .filter_map(|step| match step {
                Step::Index(i) => Some(*i),
                Step::Key(_) => None,
            })
            .collect()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "$");
        }
        for (i, step) in self.0.iter().enumerate() {
            match step {
                Step::Key(name) if i == 0 => write!(f, "{}", name)?,
                Step::Key(name) => write!(f, ".{}", name)?,
                Step::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Every existing location in `doc` matched by `path`, in document order.
pub fn resolve(doc: &Value, path: &KeyPath) -> Vec<Location> {
    let mut found = Vec::new();
    let mut current = Location::root();
    resolve_into(doc, path.segments(), &mut current, &mut found);
    found
}

fn resolve_into(value: &Value, rest: &[PathSegment], current: &mut Location, found: &mut Vec<Location>) {
    let Some((head, tail)) = rest.split_first() else {
        found.push(current.clone());
        return;
    };
    match (head, value) {
        (PathSegment::Key(name), Value::Object(map)) => {
            if let Some(child) = map.get(name) {
                current.push(Step::Key(name.clone()));
                resolve_into(child, tail, current, found);
                current.pop();
            }
        }
        (PathSegment::Wildcard, Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                current.push(Step::Index(index));
                resolve_into(item, tail, current, found);
                current.pop();
            }
        }
        _ => {}
    }
}

/// Substitute `indices` for the wildcards of `template`, in order.
///
/// Returns `None` when the template has more wildcards than indices or is the
/// dead sentinel.
pub fn bind(template: &KeyPath, indices: &[usize]) -> Option<Location> {
    let mut remaining = indices.iter();
    let mut location = Location::root();
    for segment in template {
        match segment {
            PathSegment::Key(name) => location.push(Step::Key(name.clone())),
            PathSegment::Wildcard => location.push(Step::Index(*remaining.next()?)),
            PathSegment::Null => return None,
        }
    }
    Some(location)
}

pub fn get<'a>(doc: &'a Value, location: &Location) -> Option<&'a Value> {
    location.steps().iter().try_fold(doc, |value, step| match (step, value) {
        (Step::Key(name), Value::Object(map)) => map.get(name),
        (Step::Index(index), Value::Array(items)) => items.get(*index),
        _ => None,
    })
}

pub fn get_mut<'a>(doc: &'a mut Value, location: &Location) -> Option<&'a mut Value> {
    location
        .steps()
        .iter()
        .try_fold(doc, |value, step| match (step, value) {
            (Step::Key(name), Value::Object(map)) => map.get_mut(name),
            (Step::Index(index), Value::Array(items)) => items.get_mut(*index),
            _ => None,
        })
}

/// Write `value` at `location`, creating missing containers on the way.
///
/// `null` slots are turned into the container the next step needs; arrays are
/// padded with `null` up to the requested index.
pub fn set(doc: &mut Value, location: &Location, value: Value) -> Result<(), NodeExecutionError> {
    let mut cursor = doc;
    for step in location.steps() {
        cursor = match step {
            Step::Key(name) => {
                if cursor.is_null() {
                    *cursor = Value::Object(Map::new());
                }
                match cursor {
                    Value::Object(map) => map.entry(name.clone()).or_insert(Value::Null),
                    other => {
                        return Err(NodeExecutionError::Unwritable {
                            location: location.to_string(),
                            reason: format!("expected an object, found {}", type_name(other)),
                        })
                    }
                }
            }
            Step::Index(index) => {
                if cursor.is_null() {
                    *cursor = Value::Array(Vec::new());
                }
                match cursor {
                    Value::Array(items) => {
                        if items.len() <= *index {
                            items.resize(*index + 1, Value::Null);
                        }
                        &mut items[*index]
                    }
                    other => {
                        return Err(NodeExecutionError::Unwritable {
                            location: location.to_string(),
                            reason: format!("expected an array, found {}", type_name(other)),
                        })
                    }
                }
            }
        };
    }
    *cursor = value;
    Ok(())
}

/// Take the value out of `location`. Object members are removed; array slots
/// become `null` so sibling indices stay stable.
pub fn remove(doc: &mut Value, location: &Location) -> Option<Value> {
    let (last, parent_steps) = location.steps().split_last()?;
    let parent = get_mut(doc, &Location(parent_steps.to_vec()))?;
    match (last, parent) {
        (Step::Key(name), Value::Object(map)) => map.remove(name),
        (Step::Index(index), Value::Array(items)) => items.get_mut(*index).map(Value::take),
        _ => None,
    }
}

/// Empty container of the same shape, or the value itself for primitives.
pub fn stub(value: &Value) -> Value {
    match value {
        Value::Array(_) => Value::Array(Vec::new()),
        Value::Object(_) => Value::Object(Map::new()),
        primitive => primitive.clone(),
    }
}

/// Build a working document holding only what lives under `paths`.
///
/// Paths are applied shortest first; compound values are stubbed so that only
/// their registered descendants get copied in.
pub fn seed(input: &Value, paths: &[KeyPath]) -> Value {
    let mut ordered: Vec<&KeyPath> = paths.iter().collect();
    ordered.sort_by_key(|path| path.len());

    let mut output = Value::Object(Map::new());
    for path in ordered {
        for location in resolve(input, path) {
            if let Some(value) = get(input, &location) {
                if let Err(error) = set(&mut output, &location, stub(value)) {
                    InputSlotSkipped {
                        location: &location,
                        error: &error,
                    }
                    .log();
                }
            }
        }
    }
    output
}

/// Remove nested objects that ended up empty, deepest first. The document itself is kept.
pub fn strip_empty_objects(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for child in map.values_mut() {
                strip_empty_objects(child);
            }
            map.retain(|_, child| !matches!(child, Value::Object(inner) if inner.is_empty()));
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                strip_empty_objects(item);
            }
        }
        _ => {}
    }
}

/// Delete every member whose schema path fails `keep`.
///
/// Array elements are judged through the wildcard path of their array; if it
/// fails, the array is emptied.
pub fn prune<F>(value: &mut Value, keep: &F)
where
    F: Fn(&KeyPath) -> bool,
{
    prune_at(value, &KeyPath::root(), keep);
}

fn prune_at<F>(value: &mut Value, path: &KeyPath, keep: &F)
where
    F: Fn(&KeyPath) -> bool,
{
    match value {
        Value::Object(map) => {
            map.retain(|name, _| keep(&path.child(PathSegment::key(name.as_str()))));
            for (name, child) in map.iter_mut() {
                prune_at(child, &path.child(PathSegment::key(name.as_str())), keep);
            }
        }
        Value::Array(items) => {
            let element = path.child(PathSegment::Wildcard);
            if keep(&element) {
                for item in items.iter_mut() {
                    prune_at(item, &element, keep);
                }
            } else {
                items.clear();
            }
        }
        _ => {}
    }
}
