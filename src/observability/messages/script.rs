// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for script adaptation and execution events.
//!
//! This module contains message types for logging events related to:
//! * Script header parsing
//! * Component registration
//! * Child process execution (start, stderr, completion, failure)
//! * Environment materialization and result decoding

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;
use tracing::Span;

/// Script header parsed into a rule descriptor.
///
/// # Log Level
/// `debug!` - Diagnostic detail
///
/// # Example
/// ```
/// use std::path::Path;
/// use scriptwood::observability::messages::script::ScriptParsed;
///
/// let msg = ScriptParsed {
///     path: Path::new("scripts/uptime.sh"),
///     required_count: 1,
///     optional_count: 2,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct ScriptParsed<'a> {
    pub path: &'a Path,
    pub required_count: usize,
    pub optional_count: usize,
}

impl Display for ScriptParsed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Parsed rule script {}: {} requirements, {} optional",
            self.path.display(),
            self.required_count,
            self.optional_count
        )
    }
}

impl StructuredLog for ScriptParsed<'_> {
    fn log(&self) {
        tracing::debug!(
            path = %self.path.display(),
            required_count = self.required_count,
            optional_count = self.optional_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "script_parsed",
            span_name = name,
            path = %self.path.display(),
        )
    }
}

/// Script adapted and registered as a component.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ComponentRegistered<'a> {
    pub component: &'a str,
    pub path: &'a Path,
}

impl Display for ComponentRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered script component '{}' from {}",
            self.component,
            self.path.display()
        )
    }
}

impl StructuredLog for ComponentRegistered<'_> {
    fn log(&self) {
        tracing::info!(
            component = self.component,
            path = %self.path.display(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "component_registered",
            span_name = name,
            component = self.component,
        )
    }
}

/// Script execution started.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct ScriptExecutionStarted<'a> {
    pub component: &'a str,
    pub interpreter: &'a str,
    pub binding_count: usize,
}

impl Display for ScriptExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Running '{}' with interpreter '{}' and {} bound inputs",
            self.component, self.interpreter, self.binding_count
        )
    }
}

impl StructuredLog for ScriptExecutionStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            component = self.component,
            interpreter = self.interpreter,
            binding_count = self.binding_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "script_execution",
            span_name = name,
            component = self.component,
            interpreter = self.interpreter,
        )
    }
}

/// Script execution finished (regardless of exit status).
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use std::time::Duration;
/// use scriptwood::observability::messages::script::ScriptExecutionCompleted;
///
/// let msg = ScriptExecutionCompleted {
///     component: "scripts.uptime.report",
///     exit_code: Some(0),
///     output_size: 42,
///     duration: Duration::from_millis(12),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ScriptExecutionCompleted<'a> {
    pub component: &'a str,
    pub exit_code: Option<i32>,
    pub output_size: usize,
    pub duration: std::time::Duration,
}

impl Display for ScriptExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Script '{}' finished: exit_code={:?}, output={} bytes, duration={:?}",
            self.component, self.exit_code, self.output_size, self.duration
        )
    }
}

impl StructuredLog for ScriptExecutionCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            component = self.component,
            exit_code = ?self.exit_code,
            output_size = self.output_size,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "script_execution_completed",
            span_name = name,
            component = self.component,
            exit_code = ?self.exit_code,
        )
    }
}

/// One line written by a script to stderr.
///
/// # Log Level
/// `warn!` - Never a failure on its own
pub struct ScriptStderr<'a> {
    pub component: &'a str,
    pub line: &'a str,
}

impl Display for ScriptStderr<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.line)
    }
}

impl StructuredLog for ScriptStderr<'_> {
    fn log(&self) {
        tracing::warn!(component = self.component, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("script_stderr", span_name = name, component = self.component)
    }
}

/// The child process could not be started or driven to completion.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use scriptwood::observability::messages::script::ScriptExecutionFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory");
/// let msg = ScriptExecutionFailed {
///     component: "scripts.uptime.report",
///     interpreter: "/no/such/interpreter",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ScriptExecutionFailed<'a> {
    pub component: &'a str,
    pub interpreter: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ScriptExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Script '{}' failed to run with interpreter '{}': {}",
            self.component, self.interpreter, self.error
        )
    }
}

impl StructuredLog for ScriptExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(
            component = self.component,
            interpreter = self.interpreter,
            error = %self.error,
            error_debug = ?self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "script_execution_failed",
            span_name = name,
            component = self.component,
            error = %self.error,
        )
    }
}

/// Script exceeded the configured execution timeout and was killed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ScriptTimedOut<'a> {
    pub component: &'a str,
    pub timeout: std::time::Duration,
}

impl Display for ScriptTimedOut<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Script '{}' timed out after {:?}",
            self.component, self.timeout
        )
    }
}

impl StructuredLog for ScriptTimedOut<'_> {
    fn log(&self) {
        tracing::error!(
            component = self.component,
            timeout_ms = self.timeout.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("script_timed_out", span_name = name, component = self.component)
    }
}

/// Inputs could not be materialized for a script run.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct EnvironmentBuildFailed<'a> {
    pub component: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for EnvironmentBuildFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to build environment for '{}': {}",
            self.component, self.error
        )
    }
}

impl StructuredLog for EnvironmentBuildFailed<'_> {
    fn log(&self) {
        tracing::error!(
            component = self.component,
            error = %self.error,
            error_debug = ?self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("environment_build_failed", span_name = name, component = self.component)
    }
}

/// Script output could not be decoded into a result.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct OutputDecodeFailed<'a> {
    pub component: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for OutputDecodeFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Could not decode output of '{}': {}",
            self.component, self.error
        )
    }
}

impl StructuredLog for OutputDecodeFailed<'_> {
    fn log(&self) {
        tracing::error!(
            component = self.component,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("output_decode_failed", span_name = name, component = self.component)
    }
}
