// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Dependency identities and the namespace script headers resolve against.

use std::collections::BTreeSet;
use std::fmt;

use crate::config::consts::DEFAULT_DEPENDENCY_NAMESPACE;

/// Collectible inputs every catalog knows about unless told otherwise.
const DEFAULT_DEPENDENCIES: &[&str] = &[
    "cpuinfo",
    "date",
    "dmesg",
    "ethtool",
    "hostname",
    "hosts",
    "installed_rpms",
    "ip_addr",
    "lsblk",
    "lscpu",
    "meminfo",
    "messages",
    "mounts",
    "ps_aux",
    "ps_auxcww",
    "ps_auxww",
    "ps_ef",
    "ps_eo",
    "redhat_release",
    "selinux_config",
    "sestatus",
    "uname",
    "uptime",
];

/// A named input a component can declare it needs.
///
/// The short `name` is what a script sees as its environment variable; the
/// `namespace` only disambiguates for display and registry purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dependency {
    namespace: String,
    name: String,
}

impl Dependency {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `namespace.name`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// The well-known set of dependency names header tokens resolve against.
#[derive(Debug, Clone)]
pub struct DependencyCatalog {
    namespace: String,
    names: BTreeSet<String>,
}

impl DependencyCatalog {
    /// An empty catalog; nothing resolves until names are added.
    pub fn empty(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            names: BTreeSet::new(),
        }
    }

    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Resolve a header token. Accepts either the bare name or the
    /// namespace-qualified form.
    pub fn resolve(&self, token: &str) -> Option<Dependency> {
        let token = token.trim();
        let name = token
            .strip_prefix(self.namespace.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(token);

        if self.names.contains(name) {
            Some(Dependency::new(self.namespace.clone(), name))
        } else {
            None
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for DependencyCatalog {
    fn default() -> Self {
        Self::empty(DEFAULT_DEPENDENCY_NAMESPACE).with_names(DEFAULT_DEPENDENCIES.iter().copied())
    }
}
