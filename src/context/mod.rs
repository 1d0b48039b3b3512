// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Types at the boundary with the injection engine: what a component can ask
//! for, what the context hands back, and what a component returns.

mod dependency;
mod map_broker;
mod outcome;
mod provider;
mod requirement;

pub use dependency::{Dependency, DependencyCatalog};
pub use map_broker::MapBroker;
pub use outcome::RuleOutcome;
pub use provider::{ContentProvider, Resolved};
pub use requirement::{unsatisfied, Requirement};
