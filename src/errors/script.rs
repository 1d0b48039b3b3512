// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for script parsing, loading and execution.
//!
//! Parse errors are fatal to one file only. The loader converts every failure
//! it sees into [`ScriptError::ModuleNotFound`] after logging the cause, so a
//! broken script never blocks discovery of its siblings.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScriptError {
    /// The first non-empty line is not a `#!` interpreter directive.
    #[error("Invalid script. Missing interpreter line: {}", path.display())]
    MissingInterpreter { path: PathBuf },

    /// The interpreter directive could not be tokenized into a command line.
    #[error("Invalid interpreter line in {}: '{line}'", path.display())]
    InvalidInterpreter { path: PathBuf, line: String },

    /// A `requires` or `optional` token is not a known dependency.
    #[error("Invalid dependency '{token}' in {}", path.display())]
    UnknownDependency { path: PathBuf, token: String },

    /// Loader root does not exist or is not a directory.
    #[error("Script directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// A dotted module name could not be resolved to a loadable module.
    #[error("No module named '{name}'")]
    ModuleNotFound { name: String },

    /// Script stdout was neither a JSON object nor `key: value` lines.
    #[error("Malformed output line {line_number}: '{line}'")]
    MalformedOutput { line_number: usize, line: String },

    /// File I/O error while reading a script or materializing inputs.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScriptResult<T> = Result<T, ScriptError>;
