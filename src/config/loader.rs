// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::backends::script::ExecutionOptions;
use crate::config::consts::{DEFAULT_DEPENDENCY_NAMESPACE, DEFAULT_SCRIPT_PACKAGE};
use crate::context::DependencyCatalog;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for a script evaluation run.
///
/// Typically loaded from a YAML file by the `scriptwood` binary. Every
/// section except `scripts` is optional.
///
/// # Fields
/// * `scripts` - Where rule scripts live and which package prefix they load under
/// * `execution` - How child processes are started
/// * `dependencies` - The namespace header tokens resolve against
/// * `inputs` - Values handed to scripts, keyed by dependency name
///
/// # Example
/// ```yaml
/// scripts:
///   directory: ./rules
///   package: rules
/// execution:
///   passthrough_env: [PATH]
///   timeout_seconds: 30
/// dependencies:
///   extra: [custom_log]
/// inputs:
///   hostname:
///     path: /etc/hostname
///   messages:
///     - path: /var/log/messages
///     - content: ["Jan 1 kernel: hello"]
/// ```
#[derive(Debug, Deserialize)]
pub struct Config {
    pub scripts: ScriptsConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub dependencies: DependencyConfig,
    #[serde(default)]
    pub inputs: BTreeMap<String, InputConfig>,
}

impl Config {
    /// The dependency catalog described by the `dependencies` section.
    pub fn catalog(&self) -> DependencyCatalog {
        let mut catalog = if self.dependencies.namespace == DEFAULT_DEPENDENCY_NAMESPACE {
            DependencyCatalog::default()
        } else {
            DependencyCatalog::empty(self.dependencies.namespace.clone())
        };

        for name in &self.dependencies.extra {
            catalog.insert(name.clone());
        }
        catalog
    }
}

/// Script directory settings.
#[derive(Debug, Deserialize)]
pub struct ScriptsConfig {
    pub directory: PathBuf,
    #[serde(default = "default_package")]
    pub package: String,
}

fn default_package() -> String {
    DEFAULT_SCRIPT_PACKAGE.to_string()
}

/// Child process settings.
///
/// # Fields
/// * `passthrough_env` - Variables copied from the parent's environment (defaults to `PATH`)
/// * `timeout_seconds` - Kill a script after this long (optional, no limit by default)
#[derive(Debug, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default = "default_passthrough")]
    pub passthrough_env: Vec<String>,
    pub timeout_seconds: Option<u64>,
}

fn default_passthrough() -> Vec<String> {
    vec!["PATH".to_string()]
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            passthrough_env: default_passthrough(),
            timeout_seconds: None,
        }
    }
}

impl ExecutionConfig {
    pub fn options(&self) -> ExecutionOptions {
        ExecutionOptions {
            passthrough_env: self.passthrough_env.clone(),
            timeout: self.timeout_seconds.map(Duration::from_secs),
        }
    }
}

/// Dependency namespace settings.
///
/// A non-default `namespace` starts from an empty catalog, so only `extra`
/// names resolve.
#[derive(Debug, Deserialize)]
pub struct DependencyConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub extra: Vec<String>,
}

fn default_namespace() -> String {
    DEFAULT_DEPENDENCY_NAMESPACE.to_string()
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            extra: Vec::new(),
        }
    }
}

/// A configured value for one dependency: one provider or an ordered list.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum InputConfig {
    Multi(Vec<ProviderConfig>),
    Single(ProviderConfig),
}

/// A file path, inline content lines, or both (content wins when the path
/// does not exist locally).
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    pub path: Option<PathBuf>,
    pub content: Option<Vec<String>>,
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load and validate a config from a YAML file
///
/// Relative script directories are resolved against the config file's own
/// directory before validation.
pub fn load_and_validate_config<P: AsRef<Path>>(
    path: P,
) -> Result<Config, Box<dyn std::error::Error>> {
    let path = path.as_ref();
    let mut cfg = load_config(path)?;

    if cfg.scripts.directory.is_relative() {
        if let Some(base) = path.parent() {
            cfg.scripts.directory = base.join(&cfg.scripts.directory);
        }
    }

    if let Err(validation_errors) = crate::config::validate_config(&cfg) {
        let error_messages: Vec<String> = validation_errors.iter().map(|e| e.to_string()).collect();
        let combined_error = format!(
            "Configuration validation failed:\n{}",
            error_messages.join("\n")
        );
        return Err(combined_error.into());
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_parse_basic_config() {
        let yaml = r#"
scripts:
  directory: /opt/rules
inputs:
  hostname:
    path: /etc/hostname
  messages:
    - path: /var/log/messages
    - content: ["line one", "line two"]
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.scripts.directory, PathBuf::from("/opt/rules"));
        assert_eq!(cfg.scripts.package, "scripts");
        assert_eq!(cfg.execution.passthrough_env, vec!["PATH"]);
        assert_eq!(cfg.execution.timeout_seconds, None);
        assert_eq!(cfg.inputs.len(), 2);

        assert!(matches!(cfg.inputs["hostname"], InputConfig::Single(_)));
        match &cfg.inputs["messages"] {
            InputConfig::Multi(providers) => {
                assert_eq!(providers.len(), 2);
                assert_eq!(
                    providers[1].content,
                    Some(vec!["line one".to_string(), "line two".to_string()])
                );
            }
            other => panic!("Expected multi-valued input, got {:?}", other),
        }
    }

    #[test]
    fn test_execution_options_carry_timeout() {
        let yaml = r#"
scripts:
  directory: /opt/rules
execution:
  passthrough_env: [PATH, LANG]
  timeout_seconds: 5
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        let options = cfg.execution.options();
        assert_eq!(options.passthrough_env, vec!["PATH", "LANG"]);
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_custom_namespace_starts_empty() {
        let yaml = r#"
scripts:
  directory: /opt/rules
dependencies:
  namespace: facts
  extra: [kernel]
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        let catalog = cfg.catalog();
        assert_eq!(catalog.namespace(), "facts");
        assert!(catalog.resolve("kernel").is_some());
        assert!(catalog.resolve("hostname").is_none());
    }

    #[test]
    fn test_load_and_validate_resolves_relative_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("rules")).unwrap();
        let config_path = dir.path().join("scriptwood.yaml");
        std::fs::write(&config_path, "scripts:\n  directory: rules\n").unwrap();

        let cfg = load_and_validate_config(&config_path).unwrap();
        assert_eq!(cfg.scripts.directory, dir.path().join("rules"));
    }

    #[test]
    fn test_load_and_validate_unknown_input() {
        let dir = TempDir::new().unwrap();
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "scripts:\n  directory: {}\ninputs:\n  nonexistent:\n    path: /tmp/x\n",
            dir.path().display()
        )
        .unwrap();

        let result = load_and_validate_config(file.path());
        let error_msg = result.unwrap_err().to_string();
        assert!(error_msg.contains("Input 'nonexistent' is not a known dependency"));
    }
}
