// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Child process execution for script components.
//!
//! The script body is fed to the interpreter over stdin, never placed on the
//! command line. Stdout is the script's answer; stderr is diagnostics only.
//! Nothing in here returns an error: every failure is logged and reported as
//! "no output" so one broken script cannot abort a batch.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::backends::script::ExecutionEnvironment;
use crate::observability::messages::script::{
    ScriptExecutionCompleted, ScriptExecutionFailed, ScriptExecutionStarted, ScriptStderr,
    ScriptTimedOut,
};
use crate::observability::messages::StructuredLog;

/// How child processes are started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Parent variables copied into the otherwise empty child environment.
    pub passthrough_env: Vec<String>,
    /// Kill the child after this long.
    pub timeout: Option<Duration>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            passthrough_env: vec!["PATH".to_string()],
            timeout: None,
        }
    }
}

/// Runs one interpreter per call.
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    options: ExecutionOptions,
}

impl ProcessExecutor {
    pub fn new(options: ExecutionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    /// Run `interpreter` with `env`, writing `body` to its stdin.
    ///
    /// Returns stdout verbatim, or `None` if it was empty or the process
    /// could not be run.
    pub async fn run(
        &self,
        component: &str,
        interpreter: &[String],
        env: &ExecutionEnvironment,
        body: &str,
    ) -> Option<String> {
        let interpreter_line = interpreter.join(" ");
        let start_msg = ScriptExecutionStarted {
            component,
            interpreter: &interpreter_line,
            binding_count: env.bindings().len(),
        };
        start_msg.log();

        let start_time = Instant::now();
        let result = match self.options.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, self.spawn_and_wait(interpreter, env, body)).await {
                Ok(result) => result,
                Err(_) => {
                    ScriptTimedOut { component, timeout }.log();
                    return None;
                }
            },
            None => self.spawn_and_wait(interpreter, env, body).await,
        };

        let output = match result {
            Ok(output) => output,
            Err(error) => {
                ScriptExecutionFailed {
                    component,
                    interpreter: &interpreter_line,
                    error: &error,
                }
                .log();
                return None;
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines() {
            ScriptStderr { component, line }.log();
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        ScriptExecutionCompleted {
            component,
            exit_code: output.status.code(),
            output_size: stdout.len(),
            duration: start_time.elapsed(),
        }
        .log();

        if stdout.is_empty() {
            None
        } else {
            Some(stdout)
        }
    }

    async fn spawn_and_wait(
        &self,
        interpreter: &[String],
        env: &ExecutionEnvironment,
        body: &str,
    ) -> std::io::Result<std::process::Output> {
        let (program, args) = interpreter.split_first().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty interpreter command")
        })?;

        let mut command = Command::new(program);
        command
            .args(args)
            .env_clear()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        for name in &self.options.passthrough_env {
            if let Some(value) = std::env::var_os(name) {
                command.env(name, value);
            }
        }
        command.envs(env.vars());

        let mut child = command.spawn()?;

        // Write stdin from its own task so a chatty child cannot deadlock
        // against a full stdout pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            let body = body.as_bytes().to_vec();
            tokio::spawn(async move {
                // A child that exits without reading stdin closes the pipe.
                match stdin.write_all(&body).await {
                    Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => Err(e),
                    _ => Ok(()),
                }
            })
        });

        let output = child.wait_with_output().await?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(result) => result?,
                Err(join_error) => return Err(std::io::Error::new(std::io::ErrorKind::Other, join_error)),
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh() -> Vec<String> {
        vec!["/bin/sh".to_string()]
    }

    #[tokio::test]
    async fn test_body_is_fed_over_stdin() {
        let executor = ProcessExecutor::default();
        let env = ExecutionEnvironment::default();

        let output = executor.run("test.stdin", &sh(), &env, "echo \"KEY: value\"\n").await;
        assert_eq!(output.as_deref(), Some("KEY: value\n"));
    }

    #[tokio::test]
    async fn test_empty_stdout_is_no_output() {
        let executor = ProcessExecutor::default();
        let env = ExecutionEnvironment::default();

        let output = executor.run("test.silent", &sh(), &env, "echo oops >&2\nexit 3\n").await;
        assert_eq!(output, None);
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_no_output() {
        let executor = ProcessExecutor::default();
        let env = ExecutionEnvironment::default();
        let interpreter = vec!["/definitely/not/an/interpreter".to_string()];

        let output = executor.run("test.missing", &interpreter, &env, "echo hi\n").await;
        assert_eq!(output, None);

        let output = executor.run("test.empty", &[], &env, "echo hi\n").await;
        assert_eq!(output, None);
    }

    #[tokio::test]
    async fn test_environment_is_cleared_except_passthrough() {
        std::env::set_var("SCRIPTWOOD_EXECUTOR_TEST_SECRET", "leaked");
        let executor = ProcessExecutor::new(ExecutionOptions {
            passthrough_env: vec![],
            timeout: None,
        });
        let env = ExecutionEnvironment::default();

        let output = executor
            .run(
                "test.env",
                &sh(),
                &env,
                "echo \"secret=${SCRIPTWOOD_EXECUTOR_TEST_SECRET:-unset}\"\n",
            )
            .await;
        assert_eq!(output.as_deref(), Some("secret=unset\n"));
    }

    #[tokio::test]
    async fn test_timeout_kills_slow_script() {
        let executor = ProcessExecutor::new(ExecutionOptions {
            passthrough_env: vec!["PATH".to_string()],
            timeout: Some(Duration::from_millis(200)),
        });
        let env = ExecutionEnvironment::default();

        let start = Instant::now();
        let output = executor.run("test.slow", &sh(), &env, "sleep 5\necho late\n").await;
        assert_eq!(output, None);
        assert!(start.elapsed() < Duration::from_secs(4));
    }
}
