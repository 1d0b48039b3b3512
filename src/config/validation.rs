//! Configuration validation.
//!
//! Checks are independent of each other, so all of them run and every error
//! is reported at once rather than one per attempt:
//!
//! 1. **Script directory**: the configured directory exists
//! 2. **Package name**: the prefix is a usable dotted module name
//! 3. **Inputs**: every input names a dependency in the catalog and every
//!    provider has a path or content
//!
//! # Example
//! ```rust
//! use scriptwood::config::{validate_config, Config};
//!
//! let config: Config = serde_yaml::from_str("scripts:\n  directory: /definitely/not/here\n").unwrap();
//!
//! match validate_config(&config) {
//!     Ok(()) => println!("Configuration is valid"),
//!     Err(errors) => {
//!         for error in errors {
//!             eprintln!("Validation error: {}", error);
//!         }
//!     }
//! }
//! ```

use crate::config::{Config, InputConfig};
use crate::errors::ConfigError;

/// Validates a configuration before any script is loaded.
///
/// # Returns
///
/// * `Ok(())` - Configuration is usable
/// * `Err(Vec<ConfigError>)` - Every problem found
pub fn validate_config(config: &Config) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !config.scripts.directory.is_dir() {
        errors.push(ConfigError::MissingScriptDirectory {
            directory: config.scripts.directory.display().to_string(),
        });
    }

    if !is_valid_package(&config.scripts.package) {
        errors.push(ConfigError::InvalidPackage {
            package: config.scripts.package.clone(),
        });
    }

    errors.extend(validate_inputs(config));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Empty is allowed (modules then load without a prefix); otherwise every
/// dotted segment must be non-empty and free of path separators.
fn is_valid_package(package: &str) -> bool {
    package.is_empty()
        || package
            .split('.')
            .all(|segment| !segment.is_empty() && !segment.contains(|c| c == '/' || c == '\\'))
}

fn validate_inputs(config: &Config) -> Vec<ConfigError> {
    let catalog = config.catalog();
    let mut errors = Vec::new();

    for (name, input) in &config.inputs {
        if catalog.resolve(name).is_none() {
            errors.push(ConfigError::UnknownInput {
                input: name.clone(),
                namespace: catalog.namespace().to_string(),
            });
        }

        let providers = match input {
            InputConfig::Single(provider) => std::slice::from_ref(provider),
            InputConfig::Multi(providers) => providers.as_slice(),
        };

        if providers
            .iter()
            .any(|p| p.path.is_none() && p.content.is_none())
        {
            errors.push(ConfigError::EmptyProvider {
                input: name.clone(),
            });
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_for(dir: &std::path::Path, extra: &str) -> Config {
        let yaml = format!("scripts:\n  directory: {}\n{}", dir.display(), extra);
        serde_yaml::from_str(&yaml).unwrap()
    }

    #[test]
    fn test_valid_config() {
        let dir = TempDir::new().unwrap();
        let config = config_for(dir.path(), "inputs:\n  uptime:\n    content: [\"up 3 days\"]\n");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_missing_directory() {
        let config = config_for(std::path::Path::new("/no/such/rules/dir"), "");
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ConfigError::MissingScriptDirectory {
                directory: "/no/such/rules/dir".to_string()
            }]
        );
    }

    #[test]
    fn test_accumulates_all_errors() {
        let dir = TempDir::new().unwrap();
        let config = config_for(
            dir.path(),
            "  package: \"bad..name\"\ninputs:\n  bogus:\n    path: /x\n  hostname: {}\n",
        );

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ConfigError::InvalidPackage {
            package: "bad..name".to_string()
        }));
        assert!(errors.contains(&ConfigError::UnknownInput {
            input: "bogus".to_string(),
            namespace: "specs".to_string()
        }));
        assert!(errors.contains(&ConfigError::EmptyProvider {
            input: "hostname".to_string()
        }));
    }

    #[test]
    fn test_package_names() {
        assert!(is_valid_package(""));
        assert!(is_valid_package("scripts"));
        assert!(is_valid_package("site.rules"));
        assert!(!is_valid_package(".rules"));
        assert!(!is_valid_package("a/b"));
    }
}
