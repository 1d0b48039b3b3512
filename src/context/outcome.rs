// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::consts::{RULE_TYPE, RULE_TYPE_KEY};

/// Result of invoking a script component.
///
/// `NoResult` means "no opinion": the script printed nothing, or it could not
/// be run. It is never an error from the engine's point of view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RuleOutcome {
    NoResult,
    Completed(Map<String, Value>),
}

impl RuleOutcome {
    /// Wrap a decoded mapping, stamping the rule discriminator onto it.
    pub fn completed(mut fields: Map<String, Value>) -> Self {
        fields.insert(RULE_TYPE_KEY.to_string(), Value::String(RULE_TYPE.to_string()));
        RuleOutcome::Completed(fields)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RuleOutcome::Completed(_))
    }

    pub fn fields(&self) -> Option<&Map<String, Value>> {
        match self {
            RuleOutcome::Completed(fields) => Some(fields),
            RuleOutcome::NoResult => None,
        }
    }
}
