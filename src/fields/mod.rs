// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Field schema: addressable slots inside nested documents.

mod path;
mod registry;
mod types;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use path::{KeyPath, PathSegment, WILDCARD_INDEX};
pub use registry::FieldRegistry;
pub use types::{FieldProperties, FieldType};

/// Integer handle of a field. Never reused once allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(pub u32);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
