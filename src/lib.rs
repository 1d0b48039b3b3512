// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // script components and loading
pub mod config;     // YAML config + constants
pub mod context;    // dependencies, providers, outcomes
pub mod engine;     // batch runner + dataflow graph
pub mod errors;     // error handling
pub mod observability;
pub mod traits;     // broker and component seams
