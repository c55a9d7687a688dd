// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Transformation DAG: nodes, edges and execution ordering.

mod dag;
mod node;
mod ordering;

pub use dag::{Dag, Edge, EdgeType};
pub use node::{FieldRef, NodeId, NodeMeta, TransformationNode};
pub use ordering::compute_execution_order;
