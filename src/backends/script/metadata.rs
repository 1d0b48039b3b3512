// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Script header parsing.
//!
//! A rule script is an ordinary executable file whose comment lines carry its
//! metadata:
//!
//! ```text
//! #!/bin/sh
//! # type: rule
//! # name: check_uptime
//! # requires: uptime
//! # requires: ps_aux, ps_auxww
//! # optional: hostname, redhat_release
//! ```
//!
//! A single token on a `requires` line is one mandatory dependency. Several
//! tokens on one `requires` line form a single "at least one of" group.
//! `optional` tokens are each independently optional.

use std::path::{Path, PathBuf};

use crate::config::consts::RULE_TYPE;
use crate::context::{Dependency, DependencyCatalog, Requirement};
use crate::errors::{ScriptError, ScriptResult};
use crate::observability::messages::{script::ScriptParsed, StructuredLog};

/// Only `rule` scripts become components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptType {
    Rule,
}

/// Everything known about a script file after parsing its header.
#[derive(Debug, Clone)]
pub struct ScriptDescriptor {
    pub path: PathBuf,
    pub source: String,
    /// Directive text after `#!`, as written.
    pub interpreter_line: String,
    /// Program followed by its arguments.
    pub interpreter: Vec<String>,
    pub requires: Vec<Requirement>,
    pub optional: Vec<Dependency>,
    pub name: Option<String>,
    pub script_type: ScriptType,
}

impl ScriptDescriptor {
    /// Every dependency the script may receive, required first, without
    /// duplicates.
    pub fn all_dependencies(&self) -> Vec<&Dependency> {
        let mut seen: Vec<&Dependency> = Vec::new();
        let required = self.requires.iter().flat_map(|r| r.dependencies().iter());
        for dependency in required.chain(self.optional.iter()) {
            if !seen.contains(&dependency) {
                seen.push(dependency);
            }
        }
        seen
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Type,
    Name,
    Requires,
    Optional,
}

impl Keyword {
    fn from_str(keyword: &str) -> Option<Self> {
        match keyword {
            "type" => Some(Keyword::Type),
            "name" => Some(Keyword::Name),
            "requires" => Some(Keyword::Requires),
            "optional" => Some(Keyword::Optional),
            _ => None,
        }
    }
}

/// Split `# keyword: value` into its parts. Lines with `#!` or no known
/// keyword are not header lines.
fn header_line(line: &str) -> Option<(Keyword, &str)> {
    let rest = line.trim().strip_prefix('#')?;
    if rest.starts_with('!') {
        return None;
    }
    let (keyword, value) = rest.split_once(':')?;
    Some((Keyword::from_str(keyword.trim())?, value.trim()))
}

fn parse_dependencies(
    path: &Path,
    value: &str,
    catalog: &DependencyCatalog,
) -> ScriptResult<Vec<Dependency>> {
    value
        .split(',')
        .map(str::trim)
        .map(|token| {
            catalog
                .resolve(token)
                .ok_or_else(|| ScriptError::UnknownDependency {
                    path: path.to_path_buf(),
                    token: token.to_string(),
                })
        })
        .collect()
}

fn parse_interpreter(path: &Path, line: &str) -> ScriptResult<(String, Vec<String>)> {
    let directive = line
        .trim()
        .strip_prefix("#!")
        .ok_or_else(|| ScriptError::MissingInterpreter {
            path: path.to_path_buf(),
        })?
        .trim()
        .to_string();

    match shlex::split(&directive) {
        Some(tokens) if !tokens.is_empty() => Ok((directive, tokens)),
        _ => Err(ScriptError::InvalidInterpreter {
            path: path.to_path_buf(),
            line: directive,
        }),
    }
}

/// Parse a script's header.
///
/// Returns `Ok(None)` for a well-formed script that is not a rule. Any
/// unknown dependency token fails the whole parse, whether or not the file
/// turns out to be a rule.
pub fn parse(
    path: &Path,
    source: &str,
    catalog: &DependencyCatalog,
) -> ScriptResult<Option<ScriptDescriptor>> {
    let first = source
        .lines()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| ScriptError::MissingInterpreter {
            path: path.to_path_buf(),
        })?;
    let (interpreter_line, interpreter) = parse_interpreter(path, first)?;

    let mut is_rule = false;
    let mut name = None;
    let mut requires = Vec::new();
    let mut optional = Vec::new();

    for (keyword, value) in source.lines().filter_map(header_line) {
        match keyword {
            Keyword::Type => is_rule |= value == RULE_TYPE,
            Keyword::Name => name = Some(value.to_string()),
            Keyword::Requires => {
                let mut group = parse_dependencies(path, value, catalog)?;
                if group.len() == 1 {
                    requires.push(Requirement::One(group.remove(0)));
                } else {
                    requires.push(Requirement::AnyOf(group));
                }
            }
            Keyword::Optional => optional.extend(parse_dependencies(path, value, catalog)?),
        }
    }

    if !is_rule {
        return Ok(None);
    }

    ScriptParsed {
        path,
        required_count: requires.len(),
        optional_count: optional.len(),
    }
    .log();

    Ok(Some(ScriptDescriptor {
        path: path.to_path_buf(),
        source: source.to_string(),
        interpreter_line,
        interpreter,
        requires,
        optional,
        name: name.filter(|n| !n.is_empty()),
        script_type: ScriptType::Rule,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(source: &str) -> ScriptResult<Option<ScriptDescriptor>> {
        parse(Path::new("rules/check.sh"), source, &DependencyCatalog::default())
    }

    fn dep(name: &str) -> Dependency {
        DependencyCatalog::default().resolve(name).unwrap()
    }

    #[test]
    fn test_single_token_requires_is_mandatory() {
        let descriptor = parse_str("#!/bin/sh\n# type: rule\n# requires: hostname\n")
            .unwrap()
            .unwrap();

        assert_eq!(descriptor.requires, vec![Requirement::One(dep("hostname"))]);
        assert!(descriptor.optional.is_empty());
    }

    #[test]
    fn test_multi_token_requires_is_one_group() {
        let descriptor = parse_str("#!/bin/sh\n# type: rule\n# requires: hostname, uptime\n")
            .unwrap()
            .unwrap();

        assert_eq!(
            descriptor.requires,
            vec![Requirement::AnyOf(vec![dep("hostname"), dep("uptime")])]
        );
    }

    #[test]
    fn test_requires_lines_accumulate_in_order() {
        let source = "#!/bin/sh\n# requires: uptime\n# type: rule\n# requires: ps_aux, ps_ef\n# optional: hostname, uname\n";
        let descriptor = parse_str(source).unwrap().unwrap();

        assert_eq!(
            descriptor.requires,
            vec![
                Requirement::One(dep("uptime")),
                Requirement::AnyOf(vec![dep("ps_aux"), dep("ps_ef")]),
            ]
        );
        assert_eq!(descriptor.optional, vec![dep("hostname"), dep("uname")]);
    }

    #[test]
    fn test_missing_interpreter_line() {
        let err = parse_str("# type: rule\n# requires: hostname\n").unwrap_err();
        assert!(matches!(err, ScriptError::MissingInterpreter { .. }));

        let err = parse_str("").unwrap_err();
        assert!(matches!(err, ScriptError::MissingInterpreter { .. }));
    }

    #[test]
    fn test_leading_blank_lines_are_skipped() {
        let descriptor = parse_str("\n\n#!/usr/bin/env python3 -u\n# type: rule\n")
            .unwrap()
            .unwrap();
        assert_eq!(descriptor.interpreter, vec!["/usr/bin/env", "python3", "-u"]);
        assert_eq!(descriptor.interpreter_line, "/usr/bin/env python3 -u");
    }

    #[test]
    fn test_quoted_interpreter_arguments() {
        let descriptor = parse_str("#!/bin/sh -c 'cat; echo done'\n# type: rule\n")
            .unwrap()
            .unwrap();
        assert_eq!(descriptor.interpreter, vec!["/bin/sh", "-c", "cat; echo done"]);

        let err = parse_str("#!/bin/sh -c 'unterminated\n# type: rule\n").unwrap_err();
        assert!(matches!(err, ScriptError::InvalidInterpreter { .. }));
    }

    #[test]
    fn test_unknown_dependency_fails_whole_parse() {
        let err = parse_str("#!/bin/sh\n# type: rule\n# requires: hostname, not_a_spec\n").unwrap_err();
        match err {
            ScriptError::UnknownDependency { token, .. } => assert_eq!(token, "not_a_spec"),
            other => panic!("Expected UnknownDependency, got {:?}", other),
        }

        let err = parse_str("#!/bin/sh\n# type: rule\n# optional: bogus\n").unwrap_err();
        assert!(matches!(err, ScriptError::UnknownDependency { .. }));
    }

    #[test]
    fn test_non_rule_is_inert() {
        assert!(parse_str("#!/bin/sh\necho hi\n").unwrap().is_none());
        assert!(parse_str("#!/bin/sh\n# type: parser\n").unwrap().is_none());
    }

    #[test]
    fn test_name_override_and_dependency_union() {
        let source = "#!/bin/sh\n# type: rule\n# name: my_check\n# requires: hostname, uptime\n# optional: uptime, uname\n";
        let descriptor = parse_str(source).unwrap().unwrap();

        assert_eq!(descriptor.name.as_deref(), Some("my_check"));
        let names: Vec<&str> = descriptor.all_dependencies().iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["hostname", "uptime", "uname"]);
    }
}
