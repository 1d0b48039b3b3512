// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::context::Dependency;
use crate::traits::Broker;

/// One entry of a component's required set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Must resolve.
    One(Dependency),
    /// At least one member must resolve.
    AnyOf(Vec<Dependency>),
}

impl Requirement {
    /// Every dependency named by this requirement, in declaration order.
    pub fn dependencies(&self) -> &[Dependency] {
        match self {
            Requirement::One(dependency) => std::slice::from_ref(dependency),
            Requirement::AnyOf(group) => group,
        }
    }

    pub fn is_satisfied(&self, broker: &dyn Broker) -> bool {
        let resolves = |d: &Dependency| broker.get(d).map_or(false, |r| r.has_value());
        match self {
            Requirement::One(dependency) => resolves(dependency),
            Requirement::AnyOf(group) => group.iter().any(resolves),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::One(dependency) => write!(f, "{}", dependency),
            Requirement::AnyOf(group) => {
                let names: Vec<String> = group.iter().map(ToString::to_string).collect();
                write!(f, "any of [{}]", names.join(", "))
            }
        }
    }
}

/// Requirements of `requires` that `broker` cannot satisfy.
pub fn unsatisfied<'a>(requires: &'a [Requirement], broker: &dyn Broker) -> Vec<&'a Requirement> {
    requires.iter().filter(|r| !r.is_satisfied(broker)).collect()
}
