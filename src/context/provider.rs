// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::{Path, PathBuf};

/// A resolved dependency value.
///
/// Backed either by a file on disk or by in-memory lines. The `path` is kept
/// even for in-memory content because it names where the content came from;
/// it is only used directly if it exists locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentProvider {
    path: PathBuf,
    content: Vec<String>,
}

impl ContentProvider {
    /// Provider for an existing file.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            content: Vec::new(),
        }
    }

    /// Provider for content collected elsewhere; `origin` need not exist.
    pub fn from_content<I, S>(origin: impl Into<PathBuf>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: origin.into(),
            content: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &[String] {
        &self.content
    }

    /// True if the provider can be handed to a script without materializing.
    pub fn is_on_disk(&self) -> bool {
        !self.path.as_os_str().is_empty() && self.path.exists()
    }
}

/// What the injection context holds for one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Single(ContentProvider),
    /// Ordered; order is preserved into the script's path list.
    Multi(Vec<ContentProvider>),
}

impl Resolved {
    /// False for an empty multi-valued result, which counts as no value.
    pub fn has_value(&self) -> bool {
        match self {
            Resolved::Single(_) => true,
            Resolved::Multi(providers) => !providers.is_empty(),
        }
    }
}

impl From<ContentProvider> for Resolved {
    fn from(provider: ContentProvider) -> Self {
        Resolved::Single(provider)
    }
}

impl From<Vec<ContentProvider>> for Resolved {
    fn from(providers: Vec<ContentProvider>) -> Self {
        Resolved::Multi(providers)
    }
}
