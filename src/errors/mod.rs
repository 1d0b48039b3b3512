// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod script;
mod stream;

pub use config::ConfigError;
pub use script::{ScriptError, ScriptResult};
pub use stream::StreamError;
