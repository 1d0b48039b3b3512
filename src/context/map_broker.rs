// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::config::{InputConfig, ProviderConfig};
use crate::context::{ContentProvider, Dependency, DependencyCatalog, Resolved};
use crate::errors::ConfigError;
use crate::traits::Broker;

/// In-memory injection context.
///
/// Stands in for the engine's broker when scripts are evaluated outside of
/// it: from the CLI with configured inputs, or from tests.
#[derive(Debug, Default, Clone)]
pub struct MapBroker {
    values: HashMap<Dependency, Resolved>,
}

impl MapBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dependency: Dependency, value: impl Into<Resolved>) {
        self.values.insert(dependency, value.into());
    }

    pub fn with(mut self, dependency: Dependency, value: impl Into<Resolved>) -> Self {
        self.insert(dependency, value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build from configured inputs, resolving names through `catalog`.
    pub fn from_inputs<'a, I>(inputs: I, catalog: &DependencyCatalog) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a String, &'a InputConfig)>,
    {
        let mut broker = Self::new();

        for (name, input) in inputs {
            let dependency = catalog.resolve(name).ok_or_else(|| ConfigError::UnknownInput {
                input: name.clone(),
                namespace: catalog.namespace().to_string(),
            })?;

            let value = match input {
                InputConfig::Single(provider) => Resolved::Single(to_provider(name, provider)?),
                InputConfig::Multi(providers) => Resolved::Multi(
                    providers
                        .iter()
                        .map(|p| to_provider(name, p))
                        .collect::<Result<Vec<_>, _>>()?,
                ),
            };

            broker.insert(dependency, value);
        }

        Ok(broker)
    }
}

fn to_provider(input: &str, config: &ProviderConfig) -> Result<ContentProvider, ConfigError> {
    match (&config.path, &config.content) {
        (_, Some(lines)) => Ok(ContentProvider::from_content(
            config.path.clone().unwrap_or_default(),
            lines.iter().cloned(),
        )),
        (Some(path), None) => Ok(ContentProvider::from_file(path.clone())),
        (None, None) => Err(ConfigError::EmptyProvider {
            input: input.to_string(),
        }),
    }
}

impl Broker for MapBroker {
    fn get(&self, dependency: &Dependency) -> Option<Resolved> {
        self.values.get(dependency).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_builds_single_and_multi_inputs_from_config() {
        let catalog = DependencyCatalog::default();
        let inputs: HashMap<String, InputConfig> = HashMap::from([
            (
                "hostname".to_string(),
                InputConfig::Single(ProviderConfig {
                    path: Some(PathBuf::from("/etc/hostname")),
                    content: None,
                }),
            ),
            (
                "messages".to_string(),
                InputConfig::Multi(vec![
                    ProviderConfig {
                        path: None,
                        content: Some(vec!["a".to_string()]),
                    },
                    ProviderConfig {
                        path: None,
                        content: Some(vec!["b".to_string()]),
                    },
                ]),
            ),
        ]);

        let broker = MapBroker::from_inputs(&inputs, &catalog).unwrap();
        assert_eq!(broker.len(), 2);

        let hostname = catalog.resolve("hostname").unwrap();
        assert_eq!(
            broker.get(&hostname),
            Some(Resolved::Single(ContentProvider::from_file("/etc/hostname")))
        );

        let messages = catalog.resolve("messages").unwrap();
        match broker.get(&messages) {
            Some(Resolved::Multi(providers)) => {
                assert_eq!(providers.len(), 2);
                assert_eq!(providers[1].content(), ["b".to_string()]);
            }
            other => panic!("Expected multi-valued input, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_input_names_are_rejected() {
        let catalog = DependencyCatalog::default();
        let inputs: HashMap<String, InputConfig> = HashMap::from([(
            "bogus".to_string(),
            InputConfig::Single(ProviderConfig {
                path: Some(PathBuf::from("/tmp/x")),
                content: None,
            }),
        )]);

        let err = MapBroker::from_inputs(&inputs, &catalog).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownInput { ref input, .. } if input == "bogus"));
    }

    #[test]
    fn test_empty_provider_is_rejected() {
        let catalog = DependencyCatalog::default();
        let inputs: HashMap<String, InputConfig> = HashMap::from([(
            "uptime".to_string(),
            InputConfig::Single(ProviderConfig {
                path: None,
                content: None,
            }),
        )]);

        assert_eq!(
            MapBroker::from_inputs(&inputs, &catalog).unwrap_err(),
            ConfigError::EmptyProvider {
                input: "uptime".to_string()
            }
        );
    }
}
