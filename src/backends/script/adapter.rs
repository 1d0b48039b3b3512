// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Turning parsed scripts into registrable components.

use std::path::{Component as PathComponent, Path};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::Instrument;

use crate::backends::script::metadata::{self, ScriptDescriptor};
use crate::backends::script::{output, ComponentRegistry, ExecutionEnvironment, ExecutionOptions, ProcessExecutor};
use crate::config::consts::DEFAULT_COMPONENT_ATTRIBUTE;
use crate::context::{Dependency, DependencyCatalog, Requirement, RuleOutcome};
use crate::errors::ScriptResult;
use crate::observability::messages::script::{
    ComponentRegistered, EnvironmentBuildFailed, OutputDecodeFailed,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Broker, Component};

/// A script exposed as a [`Component`].
pub struct ScriptComponent {
    name: String,
    module: String,
    attribute: String,
    descriptor: Arc<ScriptDescriptor>,
    executor: ProcessExecutor,
}

impl ScriptComponent {
    /// Dotted module the component is exported from.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Name the component is exported under within its module.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn descriptor(&self) -> &ScriptDescriptor {
        &self.descriptor
    }

    pub fn path(&self) -> &Path {
        &self.descriptor.path
    }
}

impl std::fmt::Debug for ScriptComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptComponent")
            .field("name", &self.name)
            .field("path", &self.descriptor.path)
            .field("interpreter", &self.descriptor.interpreter_line)
            .finish()
    }
}

#[async_trait]
impl Component for ScriptComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn requires(&self) -> &[Requirement] {
        &self.descriptor.requires
    }

    fn optional(&self) -> &[Dependency] {
        &self.descriptor.optional
    }

    async fn invoke(&self, broker: &dyn Broker) -> RuleOutcome {
        let span = tracing::info_span!("script_component", component = %self.name);

        async {
            // Dropped at the end of this block on every path, taking any
            // materialized inputs with it.
            let env = match ExecutionEnvironment::build(&self.descriptor, broker) {
                Ok(env) => env,
                Err(error) => {
                    EnvironmentBuildFailed {
                        component: &self.name,
                        error: &error,
                    }
                    .log();
                    return RuleOutcome::NoResult;
                }
            };

            let raw = self
                .executor
                .run(
                    &self.name,
                    &self.descriptor.interpreter,
                    &env,
                    &self.descriptor.source,
                )
                .await;
            drop(env);

            let Some(raw) = raw else {
                return RuleOutcome::NoResult;
            };

            match output::decode(&raw) {
                Ok(outcome) => outcome,
                Err(error) => {
                    OutputDecodeFailed {
                        component: &self.name,
                        error: &error,
                    }
                    .log();
                    RuleOutcome::NoResult
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Dotted module name for a script path: directories become the namespace,
/// the file stem the leaf. `rules/net/check.sh` → `rules.net.check`.
pub fn module_name_for(path: &Path) -> String {
    let stemmed = path.with_extension("");
    stemmed
        .components()
        .filter_map(|c| match c {
            PathComponent::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Parses scripts and registers the resulting components.
#[derive(Debug, Clone)]
pub struct ScriptAdapter {
    catalog: DependencyCatalog,
    registry: Arc<ComponentRegistry>,
    options: ExecutionOptions,
}

impl Default for ScriptAdapter {
    fn default() -> Self {
        Self::new(
            DependencyCatalog::default(),
            ComponentRegistry::global(),
            ExecutionOptions::default(),
        )
    }
}

impl ScriptAdapter {
    pub fn new(catalog: DependencyCatalog, registry: Arc<ComponentRegistry>, options: ExecutionOptions) -> Self {
        Self {
            catalog,
            registry,
            options,
        }
    }

    pub fn catalog(&self) -> &DependencyCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    /// Register `descriptor` under `module_name`.
    ///
    /// If a component with the same qualified name is already registered it
    /// is returned unchanged and `descriptor` is discarded.
    pub fn adapt(&self, descriptor: ScriptDescriptor, module_name: &str) -> Arc<ScriptComponent> {
        let attribute = descriptor
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_COMPONENT_ATTRIBUTE.to_string());
        let name = format!("{}.{}", module_name, attribute);

        let (component, created) = self.registry.get_or_register(&name, || ScriptComponent {
            name: name.clone(),
            module: module_name.to_string(),
            attribute,
            descriptor: Arc::new(descriptor),
            executor: ProcessExecutor::new(self.options.clone()),
        });

        if created {
            ComponentRegistered {
                component: &component.name,
                path: &component.descriptor.path,
            }
            .log();
        }

        component
    }

    /// Parse `source` and adapt it if it is a rule script.
    ///
    /// `module_name` defaults to [`module_name_for`] of `path`.
    pub fn load(
        &self,
        path: &Path,
        source: &str,
        module_name: Option<&str>,
    ) -> ScriptResult<Option<Arc<ScriptComponent>>> {
        let Some(descriptor) = metadata::parse(path, source, &self.catalog)? else {
            return Ok(None);
        };

        let module_name = module_name
            .map(str::to_string)
            .unwrap_or_else(|| module_name_for(path));

        Ok(Some(self.adapt(descriptor, &module_name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MapBroker;
    use serde_json::json;

    fn adapter() -> ScriptAdapter {
        ScriptAdapter::new(
            DependencyCatalog::default(),
            Arc::new(ComponentRegistry::new()),
            ExecutionOptions::default(),
        )
    }

    #[test]
    fn test_module_name_for_path() {
        assert_eq!(module_name_for(Path::new("rules/net/check.sh")), "rules.net.check");
        assert_eq!(module_name_for(Path::new("/opt/rules/uptime.py")), "opt.rules.uptime");
        assert_eq!(module_name_for(Path::new("./plain")), "plain");
    }

    #[test]
    fn test_default_and_overridden_names() {
        let adapter = adapter();

        let default = adapter
            .load(Path::new("rules/a.sh"), "#!/bin/sh\n# type: rule\n", None)
            .unwrap()
            .unwrap();
        assert_eq!(default.name(), "rules.a.report");
        assert_eq!(default.module(), "rules.a");
        assert_eq!(default.attribute(), "report");

        let named = adapter
            .load(
                Path::new("rules/b.sh"),
                "#!/bin/sh\n# type: rule\n# name: check_b\n",
                Some("site.rules.b"),
            )
            .unwrap()
            .unwrap();
        assert_eq!(named.name(), "site.rules.b.check_b");
    }

    #[test]
    fn test_adapt_is_idempotent() {
        let adapter = adapter();
        let source = "#!/bin/sh\n# type: rule\n# requires: hostname\n";

        let first = adapter.load(Path::new("rules/c.sh"), source, None).unwrap().unwrap();
        let second = adapter.load(Path::new("rules/c.sh"), source, None).unwrap().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(adapter.registry().len(), 1);
    }

    #[test]
    fn test_non_rule_registers_nothing() {
        let adapter = adapter();
        let loaded = adapter.load(Path::new("rules/d.sh"), "#!/bin/sh\necho hi\n", None).unwrap();
        assert!(loaded.is_none());
        assert!(adapter.registry().is_empty());
    }

    #[tokio::test]
    async fn test_invoke_decodes_key_value_output() {
        let adapter = adapter();
        let component = adapter
            .load(Path::new("rules/e.sh"), "#!/bin/sh\n# type: rule\necho 'KEY: value'\n", None)
            .unwrap()
            .unwrap();

        let outcome = component.invoke(&MapBroker::new()).await;
        assert_eq!(
            outcome.fields().map(|f| serde_json::Value::Object(f.clone())),
            Some(json!({"KEY": "value", "type": "rule"}))
        );
    }

    #[tokio::test]
    async fn test_invoke_with_silent_script_is_no_result() {
        let adapter = adapter();
        let component = adapter
            .load(Path::new("rules/f.sh"), "#!/bin/sh\n# type: rule\ntrue\n", None)
            .unwrap()
            .unwrap();

        assert_eq!(component.invoke(&MapBroker::new()).await, RuleOutcome::NoResult);
    }

    #[tokio::test]
    async fn test_invoke_with_missing_interpreter_is_no_result() {
        let adapter = adapter();
        let component = adapter
            .load(
                Path::new("rules/g.sh"),
                "#!/no/such/interpreter --flag\n# type: rule\necho 'a: b'\n",
                None,
            )
            .unwrap()
            .unwrap();

        assert_eq!(component.invoke(&MapBroker::new()).await, RuleOutcome::NoResult);
    }

    #[tokio::test]
    async fn test_invoke_with_undecodable_output_is_no_result() {
        let adapter = adapter();
        let component = adapter
            .load(Path::new("rules/h.sh"), "#!/bin/sh\n# type: rule\necho 'no colon here'\n", None)
            .unwrap()
            .unwrap();

        assert_eq!(component.invoke(&MapBroker::new()).await, RuleOutcome::NoResult);
    }
}
