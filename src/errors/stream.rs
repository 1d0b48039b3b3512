// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised while wiring a dataflow graph or by a node's hooks.
#[derive(Error, Debug)]
pub enum StreamError {
    /// Two nodes were registered under the same name.
    #[error("Duplicate stream node: '{0}'")]
    DuplicateNode(String),

    /// An upstream handle does not belong to this graph builder.
    #[error("Unknown upstream node: '{0}'")]
    UnknownNode(String),

    /// Raised by user `update`/`produce` hooks.
    #[error("Stream node '{node}' failed: {message}")]
    NodeFailed { node: String, message: String },

    /// A hook panicked; the worker caught it and kept running.
    #[error("Stream node '{node}' panicked: {message}")]
    HookPanicked { node: String, message: String },
}
