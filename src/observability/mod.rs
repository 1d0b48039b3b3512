// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Message types follow a struct-based pattern with `Display` and
//! [`messages::StructuredLog`] implementations so that log text and log fields
//! live in one place instead of being scattered through the code.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::script` - script parsing, adaptation and execution events
//! * `messages::loader` - module discovery and loading events
//! * `messages::runner` - batch evaluation events
//! * `messages::stream` - dataflow node lifecycle events
//!
//! # Usage
//!
//! ```rust
//! use scriptwood::observability::messages::{script::ScriptStderr, StructuredLog};
//!
//! ScriptStderr {
//!     component: "scripts.uptime.report",
//!     line: "warning: load is high",
//! }
//! .log();
//! ```

pub mod messages;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_level` when set. Output goes to stderr so
/// stdout stays free for results. Calling this twice returns an error from
/// the second `try_init` rather than panicking.
pub fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}
