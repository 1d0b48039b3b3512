// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Script Module Loading
//!
//! Resolves dotted module names to script files inside one directory so that
//! scripts can be referred to exactly like native components:
//!
//! ```text
//! <root>/                  -> "<package>"              (namespace)
//! <root>/net/              -> "<package>.net"          (namespace)
//! <root>/net/check_dns.sh  -> "<package>.net.check_dns" (script)
//! ```
//!
//! ## Responsibilities
//! - Match a trailing name segment to a directory entry by exact name or stem
//! - Read script sources lazily, once
//! - Adapt rule scripts and export their component under its attribute name
//! - Cache every loaded module so repeat lookups return the same instance
//! - Turn any read/parse failure into a logged "not found"

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::backends::script::{ScriptAdapter, ScriptComponent};
use crate::errors::{ScriptError, ScriptResult};
use crate::observability::messages::loader::{ModuleLoadFailed, ModuleLoaded, ScriptsDiscovered};
use crate::observability::messages::StructuredLog;

/// Where a module came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Fully qualified dotted name.
    pub name: String,
    /// Script file, or directory for namespaces.
    pub file: PathBuf,
    /// Enclosing package: the parent's name for scripts, the module's own
    /// name for namespaces.
    pub package: String,
    /// Root directory of the loader that produced the module.
    pub loader_root: PathBuf,
}

/// Placeholder for a directory; only exists so nested names resolve.
#[derive(Debug)]
pub struct NamespaceModule {
    pub info: ModuleInfo,
}

impl NamespaceModule {
    /// Directory children of this namespace are looked up in.
    pub fn search_path(&self) -> &Path {
        &self.info.file
    }
}

/// A loaded script file.
#[derive(Debug)]
pub struct ScriptModule {
    pub info: ModuleInfo,
    file: ScriptFile,
    /// Empty for scripts without a `type: rule` header.
    exports: BTreeMap<String, Arc<ScriptComponent>>,
}

impl ScriptModule {
    /// Script text, read once when the module was loaded.
    pub fn source(&self) -> ScriptResult<&str> {
        self.file.source()
    }

    pub fn get(&self, attribute: &str) -> Option<&Arc<ScriptComponent>> {
        self.exports.get(attribute)
    }

    /// The module's rule component, if it is a rule script.
    pub fn component(&self) -> Option<&Arc<ScriptComponent>> {
        self.exports.values().next()
    }

    pub fn exports(&self) -> impl Iterator<Item = (&str, &Arc<ScriptComponent>)> {
        self.exports.iter().map(|(name, c)| (name.as_str(), c))
    }
}

/// Result of resolving a dotted name. Cheap to clone; clones share the
/// same underlying module.
#[derive(Debug, Clone)]
pub enum LoadedModule {
    Namespace(Arc<NamespaceModule>),
    Script(Arc<ScriptModule>),
}

impl LoadedModule {
    pub fn info(&self) -> &ModuleInfo {
        match self {
            LoadedModule::Namespace(ns) => &ns.info,
            LoadedModule::Script(script) => &script.info,
        }
    }

    pub fn is_namespace(&self) -> bool {
        matches!(self, LoadedModule::Namespace(_))
    }

    /// True if both handles refer to the same loaded module.
    pub fn same_module(&self, other: &LoadedModule) -> bool {
        match (self, other) {
            (LoadedModule::Namespace(a), LoadedModule::Namespace(b)) => Arc::ptr_eq(a, b),
            (LoadedModule::Script(a), LoadedModule::Script(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A single script file whose source is read on first request.
#[derive(Debug)]
pub struct ScriptFile {
    path: PathBuf,
    source: OnceCell<String>,
}

impl ScriptFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            source: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_package(&self) -> bool {
        self.path.is_dir()
    }

    pub fn source(&self) -> ScriptResult<&str> {
        self.source
            .get_or_try_init(|| fs::read_to_string(&self.path))
            .map(String::as_str)
            .map_err(ScriptError::from)
    }
}

/// One entry reported by [`ScriptLoader::iter_modules`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleEntry {
    pub name: String,
    pub is_package: bool,
}

/// Resolves dotted names under `package` to scripts below `root`.
pub struct ScriptLoader {
    root: PathBuf,
    package: String,
    adapter: ScriptAdapter,
    modules: Mutex<HashMap<String, LoadedModule>>,
}

impl std::fmt::Debug for ScriptLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptLoader")
            .field("root", &self.root)
            .field("package", &self.package)
            .field("loaded_modules", &self.modules.lock().len())
            .finish()
    }
}

fn child_name(parent: &str, leaf: &str) -> String {
    if parent.is_empty() {
        leaf.to_string()
    } else {
        format!("{}.{}", parent, leaf)
    }
}

fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".." && !segment.contains(|c| c == '/' || c == '\\')
}

fn sorted_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

impl ScriptLoader {
    /// Loader over `root` using the global registry and default catalog.
    pub fn new(root: impl AsRef<Path>, package: impl Into<String>) -> ScriptResult<Self> {
        Self::with_adapter(root, package, ScriptAdapter::default())
    }

    pub fn with_adapter(
        root: impl AsRef<Path>,
        package: impl Into<String>,
        adapter: ScriptAdapter,
    ) -> ScriptResult<Self> {
        let root = root.as_ref();
        let canonical = fs::canonicalize(root)
            .ok()
            .filter(|p| p.is_dir())
            .ok_or_else(|| ScriptError::DirectoryNotFound {
                path: root.to_path_buf(),
            })?;

        Ok(Self {
            root: canonical,
            package: package.into(),
            adapter,
            modules: Mutex::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn adapter(&self) -> &ScriptAdapter {
        &self.adapter
    }

    /// Already-loaded module, without attempting to load it.
    pub fn cached(&self, fullname: &str) -> Option<LoadedModule> {
        self.modules.lock().get(fullname).cloned()
    }

    /// Resolve and load `fullname`, or return the cached module.
    ///
    /// Every failure is logged and reported as [`ScriptError::ModuleNotFound`].
    pub fn load_module(&self, fullname: &str) -> ScriptResult<LoadedModule> {
        if let Some(module) = self.cached(fullname) {
            return Ok(module);
        }

        let module = self.resolve(fullname)?;

        // First insert wins so every caller observes one instance.
        let mut modules = self.modules.lock();
        Ok(modules.entry(fullname.to_string()).or_insert(module).clone())
    }

    /// The rule component exported by the script module `fullname`.
    pub fn component(&self, fullname: &str) -> ScriptResult<Arc<ScriptComponent>> {
        let component = match self.load_module(fullname)? {
            LoadedModule::Script(script) => script.component().cloned(),
            LoadedModule::Namespace(_) => None,
        };
        component.ok_or_else(|| Self::not_found(fullname))
    }

    fn not_found(fullname: &str) -> ScriptError {
        ScriptError::ModuleNotFound {
            name: fullname.to_string(),
        }
    }

    fn resolve(&self, fullname: &str) -> ScriptResult<LoadedModule> {
        if fullname == self.package {
            return Ok(self.namespace(fullname, self.root.clone()));
        }

        let relative = if self.package.is_empty() {
            fullname
        } else {
            fullname
                .strip_prefix(self.package.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .ok_or_else(|| Self::not_found(fullname))?
        };

        let (parent_name, leaf) = match fullname.rsplit_once('.') {
            Some((parent, leaf)) if relative.contains('.') || !self.package.is_empty() => (parent, leaf),
            _ => ("", relative),
        };
        if !is_plain_segment(leaf) {
            return Err(Self::not_found(fullname));
        }

        let parent = self.load_module(parent_name).map_err(|_| Self::not_found(fullname))?;
        let search_dir = match parent {
            LoadedModule::Namespace(ns) => ns.search_path().to_path_buf(),
            LoadedModule::Script(_) => return Err(Self::not_found(fullname)),
        };

        let path = self
            .find_entry(&search_dir, leaf)
            .ok_or_else(|| Self::not_found(fullname))?;

        let file = ScriptFile::new(path);
        if file.is_package() {
            return Ok(self.namespace(fullname, file.path().to_path_buf()));
        }

        let path = file.path().to_path_buf();
        self.load_script(fullname, parent_name, file).map_err(|error| {
            ModuleLoadFailed {
                module: fullname,
                path: &path,
                error: &error,
            }
            .log();
            Self::not_found(fullname)
        })
    }

    fn namespace(&self, fullname: &str, dir: PathBuf) -> LoadedModule {
        ModuleLoaded {
            module: fullname,
            path: &dir,
            is_namespace: true,
        }
        .log();

        LoadedModule::Namespace(Arc::new(NamespaceModule {
            info: ModuleInfo {
                name: fullname.to_string(),
                file: dir,
                package: fullname.to_string(),
                loader_root: self.root.clone(),
            },
        }))
    }

    fn load_script(&self, fullname: &str, parent: &str, file: ScriptFile) -> ScriptResult<LoadedModule> {
        let source = file.source()?;
        let component = self.adapter.load(file.path(), source, Some(fullname))?;

        let exports = component
            .map(|c| (c.attribute().to_string(), c))
            .into_iter()
            .collect();

        ModuleLoaded {
            module: fullname,
            path: file.path(),
            is_namespace: false,
        }
        .log();

        Ok(LoadedModule::Script(Arc::new(ScriptModule {
            info: ModuleInfo {
                name: fullname.to_string(),
                file: file.path().to_path_buf(),
                package: parent.to_string(),
                loader_root: self.root.clone(),
            },
            file,
            exports,
        })))
    }

    /// First entry of `dir` named `leaf` exactly, else the first whose name
    /// is `leaf` followed by an extension.
    fn find_entry(&self, dir: &Path, leaf: &str) -> Option<PathBuf> {
        let entries = sorted_entries(dir).ok()?;
        let stem_prefix = format!("{}.", leaf);
        let name_of = |p: &PathBuf| p.file_name().map(|n| n.to_string_lossy().into_owned());

        entries
            .iter()
            .find(|p| name_of(p).as_deref() == Some(leaf))
            .or_else(|| {
                entries
                    .iter()
                    .find(|p| name_of(p).map_or(false, |n| n.starts_with(&stem_prefix)))
            })
            .cloned()
    }

    /// Names loadable directly below the namespace `namespace`, sorted, with
    /// directories flagged as packages.
    pub fn iter_modules(&self, namespace: &str) -> ScriptResult<Vec<ModuleEntry>> {
        let dir = match self.load_module(namespace)? {
            LoadedModule::Namespace(ns) => ns.search_path().to_path_buf(),
            LoadedModule::Script(_) => return Ok(Vec::new()),
        };

        let mut seen = std::collections::HashSet::new();
        let mut modules = Vec::new();

        for path in sorted_entries(&dir)? {
            let is_package = path.is_dir();
            let leaf = if is_package {
                path.file_name()
            } else {
                path.file_stem()
            }
            .map(|n| n.to_string_lossy().into_owned());

            let Some(leaf) = leaf else { continue };
            if leaf == "__init__" || leaf.contains('.') || !seen.insert(leaf.clone()) {
                continue;
            }

            modules.push(ModuleEntry {
                name: child_name(namespace, &leaf),
                is_package,
            });
        }

        Ok(modules)
    }

    /// Load every script below the root and return the rule components.
    ///
    /// Scripts that fail to load are logged and skipped.
    pub fn load_all(&self) -> Vec<Arc<ScriptComponent>> {
        let mut components = Vec::new();
        let mut failed = 0;
        self.walk(&self.package, &mut components, &mut failed);

        ScriptsDiscovered {
            root: &self.root,
            component_count: components.len(),
            failed_count: failed,
        }
        .log();

        components
    }

    fn walk(&self, namespace: &str, components: &mut Vec<Arc<ScriptComponent>>, failed: &mut usize) {
        let entries = match self.iter_modules(namespace) {
            Ok(entries) => entries,
            Err(_) => {
                *failed += 1;
                return;
            }
        };

        for entry in entries {
            if entry.is_package {
                self.walk(&entry.name, components, failed);
                continue;
            }
            match self.load_module(&entry.name) {
                Ok(LoadedModule::Script(script)) => components.extend(script.component().cloned()),
                Ok(LoadedModule::Namespace(_)) => {}
                Err(_) => *failed += 1,
            }
        }
    }
}
