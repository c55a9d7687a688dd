// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Document transformation engine.
//!
//! Records a schema of addressable fields and a sequence of transformations
//! over them as a DAG, then replays that DAG against JSON documents.

pub mod config;     // pipeline files + engine builder
pub mod document;   // path resolution inside JSON values
pub mod engine;     // the transformation engine
pub mod errors;     // error handling
pub mod fields;     // paths, types and the field registry
pub mod graph;      // DAG storage + execution order
pub mod nodes;      // transformation kinds
pub mod observability;
