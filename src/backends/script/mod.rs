// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Script-backed components.
//!
//! A script declares its interpreter on the first line and its metadata in
//! `# key: value` header comments. Rule scripts become [`ScriptComponent`]s
//! that run the interpreter with inputs bound as environment variables and
//! decode stdout into a [`RuleOutcome`](crate::context::RuleOutcome).

pub mod adapter;
pub mod environment;
pub mod executor;
pub mod loader;
pub mod metadata;
pub mod output;
pub mod registry;


pub use adapter::{module_name_for, ScriptAdapter, ScriptComponent};
pub use environment::{Binding, ExecutionEnvironment};
pub use executor::{ExecutionOptions, ProcessExecutor};
pub use loader::{LoadedModule, ModuleEntry, ModuleInfo, NamespaceModule, ScriptFile, ScriptLoader, ScriptModule};
pub use metadata::{parse, ScriptDescriptor, ScriptType};
pub use registry::ComponentRegistry;
