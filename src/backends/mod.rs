// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Component backend implementations.
//!
//! # Available Backends
//!
//! ## Script Backend
//! Executable scripts in any interpreted language adapted to the
//! [`Component`](crate::traits::Component) interface:
//! - **Metadata**: interpreter line plus `# requires:` style header comments
//! - **Inputs**: bound as environment variables holding file paths
//! - **Loading**: dotted module names resolved against a script directory
//!
//! ```rust,no_run
//! use scriptwood::backends::script::ScriptLoader;
//!
//! let loader = ScriptLoader::new("/etc/scriptwood/rules", "scripts")?;
//! let components = loader.load_all();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod script;
