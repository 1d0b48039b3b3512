// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for batch rule evaluation.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Evaluation of a component set is starting.
///
/// # Log Level
/// `info!` - Important operational event
pub struct EvaluationStarted {
    pub component_count: usize,
}

impl Display for EvaluationStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Evaluating {} components", self.component_count)
    }
}

impl StructuredLog for EvaluationStarted {
    fn log(&self) {
        tracing::info!(component_count = self.component_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "evaluation",
            span_name = name,
            component_count = self.component_count
        )
    }
}

/// A component was not invoked because its requirements are unmet.
///
/// # Log Level
/// `info!` - Expected when inputs were not collected
///
/// # Example
/// ```
/// use scriptwood::observability::messages::runner::ComponentSkipped;
///
/// let missing = vec!["specs.hostname".to_string()];
/// let msg = ComponentSkipped {
///     component: "scripts.host_check.report",
///     missing: &missing,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ComponentSkipped<'a> {
    pub component: &'a str,
    pub missing: &'a [String],
}

impl Display for ComponentSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Skipped component '{}': missing {}",
            self.component,
            self.missing.join(", ")
        )
    }
}

impl StructuredLog for ComponentSkipped<'_> {
    fn log(&self) {
        tracing::info!(
            component = self.component,
            missing = ?self.missing,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("component_skipped", span_name = name, component = self.component)
    }
}

/// A component finished.
///
/// # Log Level
/// `debug!` - Per-component detail
pub struct ComponentEvaluated<'a> {
    pub component: &'a str,
    pub completed: bool,
    pub duration: Duration,
}

impl Display for ComponentEvaluated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let result = if self.completed { "a result" } else { "no result" };
        write!(
            f,
            "Component '{}' returned {} in {:?}",
            self.component, result, self.duration
        )
    }
}

impl StructuredLog for ComponentEvaluated<'_> {
    fn log(&self) {
        tracing::debug!(
            component = self.component,
            completed = self.completed,
            duration_ms = self.duration.as_millis(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("component_evaluated", span_name = name, component = self.component)
    }
}
