//! Subprocess runner shared by the external tool adapters
//!
//! Tools are always started with an argument vector, never through a shell,
//! so user-supplied values such as URLs reach the tool as single opaque
//! arguments.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::errors::ToolError;

/// Lines of stderr kept in error messages
const STDERR_TAIL_LINES: usize = 12;

/// Captured output of a successful run
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
}

/// Runs one external program to completion
#[derive(Debug, Clone)]
pub struct ToolRunner {
    program: PathBuf,
    name: String,
    timeout: Option<Duration>,
}

impl ToolRunner {
    /// Create a runner for `program`, looked up on PATH when not a path
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let name = program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.to_string_lossy().into_owned());
        Self {
            program,
            name,
            timeout: None,
        }
    }

    /// Display name of the tool used in errors and logs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kill the tool if it runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the tool and wait for it to exit; a non-zero exit is an error
    pub async fn run<I, S>(&self, args: I) -> Result<ToolOutput, ToolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(tool = %self.name, "Running {:?}", command.as_std());

        let child = command.spawn().map_err(|e| self.spawn_error(e))?;

        let waited = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                Err(_) => {
                    // dropping the future drops the child, which kills it
                    warn!(
                        tool = %self.name,
                        "Timed out after {} seconds, killing process",
                        limit.as_secs()
                    );
                    return Err(ToolError::TimedOut {
                        tool: self.name.clone(),
                        secs: limit.as_secs(),
                    });
                }
            },
            None => child.wait_with_output().await,
        };

        let output = waited.map_err(|e| ToolError::Io {
            tool: self.name.clone(),
            message: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ToolError::Failed {
                tool: self.name.clone(),
                code: output.status.code(),
                stderr: stderr_tail(&stderr),
            });
        }

        debug!(tool = %self.name, "Exited successfully");
        Ok(ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }

    fn spawn_error(&self, err: std::io::Error) -> ToolError {
        match err.kind() {
            std::io::ErrorKind::NotFound => ToolError::NotFound {
                tool: self.name.clone(),
            },
            _ => ToolError::Io {
                tool: self.name.clone(),
                message: err.to_string(),
            },
        }
    }
}

/// Last few non-empty lines of a tool's stderr
fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect();
    let skip = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[skip..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_errors_name_the_tool_by_file_name() {
        let runner = ToolRunner::new("/nonexistent/fetchclip/bin/yt-dlp");
        let err = runner.run(["--version"]).await.unwrap_err();
        assert_eq!(
            err,
            ToolError::NotFound {
                tool: "yt-dlp".to_string()
            }
        );
    }

    #[test]
    fn test_stderr_tail_keeps_last_lines() {
        let stderr: String = (0..30).map(|i| format!("line {}\n\n", i)).collect();
        let tail = stderr_tail(&stderr);
        assert_eq!(tail.lines().count(), STDERR_TAIL_LINES);
        assert!(tail.ends_with("line 29"));
        assert!(tail.starts_with("line 18"));
    }

    #[tokio::test]
    async fn test_missing_program_is_not_found() {
        let runner = ToolRunner::new("fetchclip-definitely-missing-tool");
        let err = runner.run(["--version"]).await.unwrap_err();
        assert_eq!(
            err,
            ToolError::NotFound {
                tool: "fetchclip-definitely-missing-tool".to_string()
            }
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_failed() {
        let runner = ToolRunner::new("sh");
        let err = runner
            .run(["-c", "echo boom >&2; exit 3"])
            .await
            .unwrap_err();
        match err {
            ToolError::Failed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_arguments_are_not_shell_interpreted() {
        let runner = ToolRunner::new("sh");
        let output = runner
            .run(["-c", "printf '%s' \"$1\"", "sh", "https://example.com/v?a=1&b=$(whoami);"])
            .await
            .unwrap();
        assert_eq!(output.stdout, "https://example.com/v?a=1&b=$(whoami);");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_process() {
        let runner = ToolRunner::new("sh").with_timeout(Some(Duration::from_millis(200)));
        let err = runner.run(["-c", "sleep 5"]).await.unwrap_err();
        assert!(matches!(err, ToolError::TimedOut { .. }));
    }
}
