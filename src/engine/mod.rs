// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Execution of components.
//!
//! - [`runner`]: evaluates a set of components against one broker, in order
//! - [`dataflow`]: publish/subscribe graph for streaming values between
//!   concurrently running nodes

pub mod dataflow;
pub mod runner;
#[cfg(test)]
pub mod integration_tests;

pub use dataflow::{Emitter, GraphBuilder, HookResult, Message, NodeHandle, RunningGraph, StreamGraph, StreamNode};
pub use runner::{Evaluation, EvaluationStatus, RuleRunner};
