// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable text and
//! [`StructuredLog`] to emit the same event with typed fields at its
//! documented level.
//!
//! # Organization
//!
//! * `script` - header parsing, component registration, process execution
//! * `loader` - script directory scanning and module loading
//! * `runner` - batch evaluation of components against one broker
//! * `stream` - dataflow graph node lifecycle

use tracing::Span;

pub mod loader;
pub mod runner;
pub mod script;
pub mod stream;

/// Emit a message as a structured tracing event or open a span for it.
pub trait StructuredLog {
    /// Log the message at its documented level with structured fields.
    fn log(&self);

    /// Create a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
