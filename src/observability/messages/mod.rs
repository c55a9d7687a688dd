// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `engine` - field registry, graph construction and transform events
//! * `validation` - pipeline validation and cycle detection

pub mod engine;
pub mod validation;

use tracing::Span;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog: std::fmt::Display {
    /// Emit the message as a tracing event.
    fn log(&self);

    /// Open a span for the work this message announces. Messages without
    /// structured span fields get one carrying the rendered message.
    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("span_name", name = name, message = %self)
    }
}
