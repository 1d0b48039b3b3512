// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for script module discovery and loading.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;
use tracing::Span;

/// Module resolved and loaded.
///
/// # Log Level
/// `debug!` - Diagnostic detail
///
/// # Example
/// ```
/// use std::path::Path;
/// use scriptwood::observability::messages::loader::ModuleLoaded;
///
/// let msg = ModuleLoaded {
///     module: "scripts.nested.uptime",
///     path: Path::new("scripts/nested/uptime.sh"),
///     is_namespace: false,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct ModuleLoaded<'a> {
    pub module: &'a str,
    pub path: &'a Path,
    pub is_namespace: bool,
}

impl Display for ModuleLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let kind = if self.is_namespace { "namespace" } else { "script" };
        write!(
            f,
            "Loaded {} module '{}' from {}",
            kind,
            self.module,
            self.path.display()
        )
    }
}

impl StructuredLog for ModuleLoaded<'_> {
    fn log(&self) {
        tracing::debug!(
            module = self.module,
            path = %self.path.display(),
            is_namespace = self.is_namespace,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("module_loaded", span_name = name, module = self.module)
    }
}

/// Module could not be read, parsed or adapted.
///
/// # Log Level
/// `error!` - The caller only sees "not found", so the cause is logged here
///
/// # Example
/// ```
/// use std::path::Path;
/// use scriptwood::observability::messages::loader::ModuleLoadFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
/// let msg = ModuleLoadFailed {
///     module: "scripts.missing",
///     path: Path::new("scripts/missing.sh"),
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ModuleLoadFailed<'a> {
    pub module: &'a str,
    pub path: &'a Path,
    pub error: &'a dyn std::error::Error,
}

impl Display for ModuleLoadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to load script module '{}' from {}: {}",
            self.module,
            self.path.display(),
            self.error
        )
    }
}

impl StructuredLog for ModuleLoadFailed<'_> {
    fn log(&self) {
        tracing::error!(
            module = self.module,
            path = %self.path.display(),
            error = %self.error,
            error_debug = ?self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "module_load_failed",
            span_name = name,
            module = self.module,
            error = %self.error,
        )
    }
}

/// Directory scan finished.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ScriptsDiscovered<'a> {
    pub root: &'a Path,
    pub component_count: usize,
    pub failed_count: usize,
}

impl Display for ScriptsDiscovered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Discovered {} script components under {} ({} failed to load)",
            self.component_count,
            self.root.display(),
            self.failed_count
        )
    }
}

impl StructuredLog for ScriptsDiscovered<'_> {
    fn log(&self) {
        tracing::info!(
            root = %self.root.display(),
            component_count = self.component_count,
            failed_count = self.failed_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("scripts_discovered", span_name = name, root = %self.root.display())
    }
}
