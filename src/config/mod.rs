// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! YAML pipeline files: loading, validation and building engines from them.

mod loader;
mod runtime;
mod validation;


pub use loader::{
    load_and_validate_pipeline, load_pipeline, FieldConfig, PipelineConfig, TransformationConfig,
};
pub use runtime::EngineBuilder;
pub use validation::validate_pipeline;
