// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Key paths addressing a slot inside a nested JSON document.
//!
//! A [`KeyPath`] is an ordered list of [`PathSegment`]s. Object members are
//! addressed by [`PathSegment::Key`], "any element of this array" by
//! [`PathSegment::Wildcard`] (persisted as the integer `-1`). The one-element
//! path `[null]` is the sentinel every dead field is parked on.
//!
//! # Examples
//! ```
//! use the_transmogrifier::fields::{KeyPath, PathSegment};
//!
//! let path: KeyPath = "tags.*.label".parse().unwrap();
//! assert_eq!(path.len(), 3);
//! assert_eq!(path.segments()[1], PathSegment::Wildcard);
//! assert_eq!(path.wildcard_count(), 1);
//! assert_eq!(path.to_string(), "tags.*.label");
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Persisted value of a wildcard segment.
pub const WILDCARD_INDEX: i64 = -1;

/// One step of a [`KeyPath`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    /// Object member name
    Key(String),
    /// Any element of an array
    Wildcard,
    /// Only ever appears in the dead sentinel path
    Null,
}

impl PathSegment {
    pub fn key(name: impl Into<String>) -> Self {
        PathSegment::Key(name.into())
    }

    /// True when the segment addresses array elements rather than object members.
    pub fn is_index(&self) -> bool {
        matches!(self, PathSegment::Wildcard)
    }
}

impl From<&str> for PathSegment {
    fn from(value: &str) -> Self {
        PathSegment::Key(value.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(value: String) -> Self {
        PathSegment::Key(value)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(name) => write!(f, "{}", name),
            PathSegment::Wildcard => write!(f, "*"),
            PathSegment::Null => write!(f, "null"),
        }
    }
}

impl Serialize for PathSegment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PathSegment::Key(name) => serializer.serialize_str(name),
            PathSegment::Wildcard => serializer.serialize_i64(WILDCARD_INDEX),
            PathSegment::Null => serializer.serialize_unit(),
        }
    }
}

struct PathSegmentVisitor;

impl<'de> Visitor<'de> for PathSegmentVisitor {
    type Value = PathSegment;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a member name, the wildcard index -1 or null")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<PathSegment, E> {
        Ok(PathSegment::Key(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<PathSegment, E> {
        Ok(PathSegment::Key(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<PathSegment, E> {
        if value == WILDCARD_INDEX {
            Ok(PathSegment::Wildcard)
        } else {
            Err(E::custom(format!(
                "unsupported array index {} (only the wildcard {} is addressable)",
                value, WILDCARD_INDEX
            )))
        }
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<PathSegment, E> {
        Err(E::custom(format!(
            "unsupported array index {} (only the wildcard {} is addressable)",
            value, WILDCARD_INDEX
        )))
    }

    fn visit_unit<E: de::Error>(self) -> Result<PathSegment, E> {
        Ok(PathSegment::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<PathSegment, E> {
        Ok(PathSegment::Null)
    }
}

impl<'de> Deserialize<'de> for PathSegment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PathSegmentVisitor)
    }
}

/// Ordered address of a field inside a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyPath(Vec<PathSegment>);

impl KeyPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// The empty path, i.e. the document itself.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// The sentinel path `[null]` of a dead field.
    pub fn dead() -> Self {
        Self(vec![PathSegment::Null])
    }

    pub fn is_dead(&self) -> bool {
        self.0.len() == 1 && self.0[0] == PathSegment::Null
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathSegment> {
        self.0.iter()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// Path of the enclosing container; `None` for the root and the dead sentinel.
    pub fn parent(&self) -> Option<KeyPath> {
        if self.0.is_empty() || self.is_dead() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn child(&self, segment: PathSegment) -> KeyPath {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    pub fn join(&self, suffix: &KeyPath) -> KeyPath {
        let mut segments = self.0.clone();
        segments.extend(suffix.0.iter().cloned());
        Self(segments)
    }

    pub fn starts_with(&self, prefix: &KeyPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Remaining segments after `prefix`, if `prefix` is a prefix of this path.
    pub fn strip_prefix(&self, prefix: &KeyPath) -> Option<KeyPath> {
        self.0.strip_prefix(prefix.0.as_slice()).map(|rest| Self(rest.to_vec()))
    }

    /// Replace `old_prefix` with `new_prefix`; `None` when `old_prefix` does not match.
    pub fn splice_prefix(&self, old_prefix: &KeyPath, new_prefix: &KeyPath) -> Option<KeyPath> {
        self.strip_prefix(old_prefix).map(|suffix| new_prefix.join(&suffix))
    }

    pub fn wildcard_count(&self) -> usize {
        self.0.iter().filter(|segment| segment.is_index()).count()
    }
}

impl From<Vec<PathSegment>> for KeyPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl From<&[&str]> for KeyPath {
    fn from(keys: &[&str]) -> Self {
        Self(keys.iter().map(|key| PathSegment::from(*key)).collect())
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for KeyPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a KeyPath {
    type Item = &'a PathSegment;
    type IntoIter = std::slice::Iter<'a, PathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Dotted notation: `meta.school`, `tags.*.label`; the empty string is the root.
impl FromStr for KeyPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(KeyPath::root());
        }
        Ok(s
            .split('.')
            .map(|part| match part {
                "*" => PathSegment::Wildcard,
                name => PathSegment::key(name),
            })
            .collect())
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> KeyPath {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let p = path("meta.school");
        assert_eq!(p.segments(), &[PathSegment::key("meta"), PathSegment::key("school")]);
        assert_eq!(p.to_string(), "meta.school");
        assert!(path("").is_root());
    }

    #[test]
    fn test_serde_uses_minus_one_and_null() {
        let p = path("tags.*");
        assert_eq!(serde_json::to_string(&p).unwrap(), r#"["tags",-1]"#);
        assert_eq!(serde_json::to_string(&KeyPath::dead()).unwrap(), "[null]");

        let back: KeyPath = serde_json::from_str(r#"["tags",-1,"label"]"#).unwrap();
        assert_eq!(back, path("tags.*.label"));
        let dead: KeyPath = serde_json::from_str("[null]").unwrap();
        assert!(dead.is_dead());
    }

    #[test]
    fn test_rejects_concrete_indices() {
        assert!(serde_json::from_str::<KeyPath>(r#"["tags",3]"#).is_err());
        assert!(serde_json::from_str::<KeyPath>(r#"["tags",-2]"#).is_err());
    }

    #[test]
    fn test_prefix_operations() {
        let p = path("meta.school.name");
        assert!(p.starts_with(&path("meta")));
        assert_eq!(p.strip_prefix(&path("meta")), Some(path("school.name")));
        assert_eq!(p.splice_prefix(&path("meta.school"), &path("skool")), Some(path("skool.name")));
        assert_eq!(p.splice_prefix(&path("other"), &path("x")), None);
        assert_eq!(p.parent(), Some(path("meta.school")));
        assert_eq!(KeyPath::dead().parent(), None);
        assert_eq!(KeyPath::root().parent(), None);
    }

    #[test]
    fn test_dead_sentinel_is_distinct_from_root() {
        assert!(KeyPath::dead().is_dead());
        assert!(!KeyPath::root().is_dead());
        assert!(!path("null").is_dead());
    }
}
