// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for dataflow graph node lifecycle events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Graph wired and its node workers spawned.
///
/// # Log Level
/// `info!` - Important operational event
pub struct GraphStarted {
    pub node_count: usize,
    pub consumer_count: usize,
}

impl Display for GraphStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Started dataflow graph: {} nodes, {} consumers",
            self.node_count, self.consumer_count
        )
    }
}

impl StructuredLog for GraphStarted {
    fn log(&self) {
        tracing::info!(
            node_count = self.node_count,
            consumer_count = self.consumer_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("graph_started", span_name = name, node_count = self.node_count)
    }
}

/// A node's `update` or `produce` hook returned an error or panicked.
///
/// # Log Level
/// `error!` - Swallowed; the node keeps running
///
/// # Example
/// ```
/// use scriptwood::observability::messages::stream::NodeHookFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "bad payload");
/// let msg = NodeHookFailed {
///     node: "aggregator",
///     origin: Some("sensor"),
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct NodeHookFailed<'a> {
    pub node: &'a str,
    pub origin: Option<&'a str>,
    pub error: &'a dyn std::error::Error,
}

impl Display for NodeHookFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.origin {
            Some(origin) => write!(
                f,
                "Stream node '{}' failed handling message from '{}': {}",
                self.node, origin, self.error
            ),
            None => write!(f, "Stream node '{}' failed producing: {}", self.node, self.error),
        }
    }
}

impl StructuredLog for NodeHookFailed<'_> {
    fn log(&self) {
        tracing::error!(
            node = self.node,
            origin = ?self.origin,
            error = %self.error,
            error_debug = ?self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("node_hook_failed", span_name = name, node = self.node)
    }
}

/// A node worker exited.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct NodeStopped<'a> {
    pub node: &'a str,
    pub reason: &'a str,
}

impl Display for NodeStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stream node '{}' stopped: {}", self.node, self.reason)
    }
}

impl StructuredLog for NodeStopped<'_> {
    fn log(&self) {
        tracing::debug!(node = self.node, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("node_stopped", span_name = name, node = self.node)
    }
}
