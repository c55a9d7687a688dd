// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Log messages are plain structs implementing `Display`, so no message text
//! is scattered through the engine as string literals. Each one also knows
//! its own level and structured fields through
//! [`StructuredLog`](messages::StructuredLog).
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - graph construction, ordering and transform events
//! * `messages::validation` - pipeline validation warnings and errors
//!
//! # Usage
//!
//! ```rust
//! use the_transmogrifier::fields::FieldId;
//! use the_transmogrifier::observability::messages::engine::FieldDeleted;
//! use the_transmogrifier::observability::messages::StructuredLog;
//!
//! let msg = FieldDeleted { field_id: FieldId(3) };
//! assert_eq!(msg.to_string(), "Deleted field 3");
//! msg.log();
//! ```

pub mod messages;
