// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod engine;
mod execution;

pub use config::{ConfigError, ValidationError};
pub use engine::EngineError;
pub use execution::{FailureStrategy, NodeExecutionError};
