// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-invocation environment construction.
//!
//! Each dependency a script declares becomes one environment variable named
//! after the dependency. Values already backed by a local file are passed as
//! that file's path. In-memory values are written to temporary files first.
//! The [`ExecutionEnvironment`] owns every temporary it creates, so dropping
//! it (normally, on `?`, or during unwinding) removes them all.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempDir, TempPath};

use crate::backends::script::ScriptDescriptor;
use crate::config::consts::PATH_LIST_DELIMITER;
use crate::context::{ContentProvider, Resolved};
use crate::errors::ScriptResult;
use crate::traits::Broker;

/// How one dependency is exposed to the child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// The context had no value; the variable is left unset.
    Absent,
    Path(PathBuf),
    /// Ordered as resolved; rendered joined by `;`.
    PathList(Vec<PathBuf>),
}

impl Binding {
    /// Value as it appears in the child's environment.
    pub fn render(&self) -> Option<String> {
        match self {
            Binding::Absent => None,
            Binding::Path(path) => Some(path.display().to_string()),
            Binding::PathList(paths) => Some(
                paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(PATH_LIST_DELIMITER),
            ),
        }
    }
}

/// Resolved bindings plus the temporaries backing them.
#[derive(Debug, Default)]
pub struct ExecutionEnvironment {
    bindings: Vec<(String, Binding)>,
    // Files drop before the directories that may contain them.
    temp_files: Vec<TempPath>,
    temp_dirs: Vec<TempDir>,
}

impl ExecutionEnvironment {
    /// Resolve every required and optional dependency of `descriptor`
    /// against `broker`.
    pub fn build(descriptor: &ScriptDescriptor, broker: &dyn Broker) -> ScriptResult<Self> {
        let mut env = Self::default();

        for dependency in descriptor.all_dependencies() {
            let binding = match broker.get(dependency).filter(Resolved::has_value) {
                None => Binding::Absent,
                Some(Resolved::Single(provider)) => Binding::Path(env.locate(&provider)?),
                Some(Resolved::Multi(providers)) => {
                    Binding::PathList(env.locate_all(&providers)?)
                }
            };
            env.bindings.push((dependency.name().to_string(), binding));
        }

        Ok(env)
    }

    pub fn bindings(&self) -> &[(String, Binding)] {
        &self.bindings
    }

    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, binding)| binding)
    }

    /// Variables to set on the child, skipping absent bindings.
    pub fn vars(&self) -> impl Iterator<Item = (&str, String)> {
        self.bindings
            .iter()
            .filter_map(|(name, binding)| binding.render().map(|value| (name.as_str(), value)))
    }

    /// Paths of every temporary this environment will remove on drop.
    pub fn temporaries(&self) -> Vec<&Path> {
        self.temp_files
            .iter()
            .map(|p| &**p)
            .chain(self.temp_dirs.iter().map(|d| d.path()))
            .collect()
    }

    fn locate(&mut self, provider: &ContentProvider) -> ScriptResult<PathBuf> {
        if provider.is_on_disk() {
            return Ok(provider.path().to_path_buf());
        }
        let file = NamedTempFile::new()?;
        self.materialize(file, provider)
    }

    fn locate_all(&mut self, providers: &[ContentProvider]) -> ScriptResult<Vec<PathBuf>> {
        let mut shared_dir: Option<PathBuf> = None;
        let mut paths = Vec::with_capacity(providers.len());

        for provider in providers {
            if provider.is_on_disk() {
                paths.push(provider.path().to_path_buf());
                continue;
            }

            let dir = match &shared_dir {
                Some(dir) => dir.clone(),
                None => {
                    let dir = TempDir::new()?;
                    let path = dir.path().to_path_buf();
                    self.temp_dirs.push(dir);
                    shared_dir = Some(path.clone());
                    path
                }
            };

            let file = NamedTempFile::new_in(&dir)?;
            paths.push(self.materialize(file, provider)?);
        }

        Ok(paths)
    }

    fn materialize(&mut self, mut file: NamedTempFile, provider: &ContentProvider) -> ScriptResult<PathBuf> {
        file.write_all(provider.content().join("\n").as_bytes())?;
        file.flush()?;
        let temp_path = file.into_temp_path();
        let path = temp_path.to_path_buf();
        self.temp_files.push(temp_path);
        Ok(path)
    }
}
