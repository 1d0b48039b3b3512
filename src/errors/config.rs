// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors that can occur during configuration validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The configured script directory does not exist
    #[error("Script directory '{directory}' does not exist")]
    MissingScriptDirectory { directory: String },

    /// An input is declared for a name the dependency catalog does not know
    #[error("Input '{input}' is not a known dependency in namespace '{namespace}'")]
    UnknownInput { input: String, namespace: String },

    /// An input provider has neither a path nor inline content
    #[error("Input '{input}' has a provider with neither 'path' nor 'content'")]
    EmptyProvider { input: String },

    /// A package prefix that cannot be used as a dotted module name
    #[error("Invalid package name '{package}'")]
    InvalidPackage { package: String },
}
