// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::backends::script::ScriptComponent;

static GLOBAL_REGISTRY: Lazy<Arc<ComponentRegistry>> = Lazy::new(|| Arc::new(ComponentRegistry::new()));

/// Script components keyed by qualified name.
///
/// Insertion is idempotent: the first component registered under a name is
/// the one every later caller gets back. The lock makes concurrent loaders
/// safe, though loading is expected to happen from one thread.
#[derive(Default)]
pub struct ComponentRegistry {
    components: Mutex<BTreeMap<String, Arc<ScriptComponent>>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry loaders use unless given their own.
    pub fn global() -> Arc<ComponentRegistry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Return the component registered under `name`, creating and
    /// registering it with `create` if there is none. The flag is true when
    /// `create` ran.
    pub fn get_or_register<F>(&self, name: &str, create: F) -> (Arc<ScriptComponent>, bool)
    where
        F: FnOnce() -> ScriptComponent,
    {
        let mut components = self.components.lock();
        if let Some(existing) = components.get(name) {
            return (Arc::clone(existing), false);
        }
        let component = Arc::new(create());
        components.insert(name.to_string(), Arc::clone(&component));
        (component, true)
    }

    pub fn get(&self, name: &str) -> Option<Arc<ScriptComponent>> {
        self.components.lock().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.lock().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.components.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.lock().is_empty()
    }

    /// Registered components ordered by name.
    pub fn components(&self) -> Vec<Arc<ScriptComponent>> {
        self.components.lock().values().cloned().collect()
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let components = self.components.lock();
        f.debug_struct("ComponentRegistry")
            .field("component_count", &components.len())
            .field("component_names", &components.keys().collect::<Vec<_>>())
            .finish()
    }
}
