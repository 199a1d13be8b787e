// src/exec/runner.rs

//! Run one external command to completion.
//!
//! Output handling is selected per call with [`RunMode`]:
//!
//! - `Visible`: announce the command, stream stdout/stderr live to the
//!   [`Terminal`], and print a failure line plus captured stderr on error.
//! - `Silent`: print nothing at all; only the outcome is observable.
//! - `Interactive`: announce, then hand the child our stdin/stdout/stderr
//!   directly (for prompts and TTY-aware tools). Nothing is captured.
//! - `Custom`: copy stdout/stderr into caller-supplied sinks; `announce`
//!   independently decides whether the announcement and failure lines are
//!   printed.
//!
//! In every piped mode stdout and stderr are also captured into the returned
//! [`Execution`], and stderr is attached to [`KubestrapError::Exit`].

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::errors::{KubestrapError, Result};
use crate::exec::invocation::{Execution, Invocation};
use crate::exec::resolver::CommandResolver;
use crate::exec::terminal::{CROSS, Terminal};

type Sink<'a> = &'a mut (dyn AsyncWrite + Unpin + Send);

/// Caller-supplied destinations for the child's output.
///
/// `None` sinks discard. Output is captured in the [`Execution`] either way.
#[derive(Default)]
pub struct CustomIo<'a> {
    pub stdout: Option<Sink<'a>>,
    pub stderr: Option<Sink<'a>>,
    /// Print the "Running command" announcement and failure lines.
    pub announce: bool,
}

impl<'a> CustomIo<'a> {
    pub fn new(stdout: Option<Sink<'a>>, stderr: Option<Sink<'a>>, announce: bool) -> Self {
        Self {
            stdout,
            stderr,
            announce,
        }
    }
}

pub enum RunMode<'a> {
    Visible,
    Silent,
    Interactive,
    Custom(CustomIo<'a>),
}

impl RunMode<'_> {
    fn announces(&self) -> bool {
        match self {
            RunMode::Visible | RunMode::Interactive => true,
            RunMode::Silent => false,
            RunMode::Custom(io) => io.announce,
        }
    }
}

/// Executes logical commands through an injected resolver.
#[derive(Clone)]
pub struct ProcessRunner {
    resolver: Arc<dyn CommandResolver>,
    terminal: Terminal,
}

impl ProcessRunner {
    pub fn new(resolver: impl CommandResolver + 'static) -> Self {
        Self {
            resolver: Arc::new(resolver),
            terminal: Terminal::stdio(),
        }
    }

    pub fn with_terminal(mut self, terminal: Terminal) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    pub async fn run<I, S>(&self, name: &str, args: I) -> Result<Execution>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.execute(&Invocation::new(name, args), RunMode::Visible)
            .await
    }

    pub async fn run_silent<I, S>(&self, name: &str, args: I) -> Result<Execution>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.execute(&Invocation::new(name, args), RunMode::Silent)
            .await
    }

    pub async fn run_interactive<I, S>(&self, name: &str, args: I) -> Result<Execution>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.execute(&Invocation::new(name, args), RunMode::Interactive)
            .await
    }

    pub async fn run_custom<I, S>(
        &self,
        name: &str,
        io: CustomIo<'_>,
        args: I,
    ) -> Result<Execution>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.execute(&Invocation::new(name, args), RunMode::Custom(io))
            .await
    }

    /// Resolve, spawn and wait for exactly one child process.
    pub async fn execute(&self, invocation: &Invocation, mode: RunMode<'_>) -> Result<Execution> {
        let announce = mode.announces();

        let Some(path) = self.resolver.resolve(invocation.name()) else {
            let err = KubestrapError::Resolution(invocation.name().to_string());
            debug!(command = invocation.name(), "command name did not resolve");
            if announce {
                self.report_failure(invocation.name(), &err.to_string());
            }
            return Err(err);
        };

        let display = invocation.display_with(&path);
        if announce {
            self.terminal.println(format!("Running command: {display}"));
        }
        debug!(
            command = invocation.name(),
            path = %path.display(),
            args = ?invocation.args(),
            "spawning process"
        );

        let outcome = match mode {
            RunMode::Interactive => self.spawn_inherited(&path, invocation).await,
            mode => self.spawn_piped(&path, invocation, mode).await,
        };

        let execution = match outcome {
            Ok(execution) => execution,
            Err(err) => {
                // Silent callers observe failures through the returned error only.
                if announce {
                    warn!(command = invocation.name(), error = %err, "process could not be run");
                    self.report_failure(&display, &err.to_string());
                } else {
                    debug!(command = invocation.name(), error = %err, "process could not be run");
                }
                return Err(err);
            }
        };

        debug!(
            command = invocation.name(),
            exit_code = execution.status.code().unwrap_or(-1),
            success = execution.status.success(),
            "process exited"
        );

        if execution.status.success() {
            return Ok(execution);
        }

        let stderr = execution.stderr_text().trim().to_string();
        if announce {
            self.report_failure(&display, &stderr);
        }
        Err(KubestrapError::Exit {
            command: display,
            status: execution.status,
            stderr,
        })
    }

    async fn spawn_piped(
        &self,
        path: &Path,
        invocation: &Invocation,
        mode: RunMode<'_>,
    ) -> Result<Execution> {
        let stdin = if matches!(mode, RunMode::Silent) {
            Stdio::null()
        } else {
            Stdio::inherit()
        };

        let mut child = Command::new(path)
            .args(invocation.args())
            .stdin(stdin)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| KubestrapError::Spawn {
                path: path.to_path_buf(),
                source,
            })?;

        let (out_tee, err_tee) = tees(mode, &self.terminal);
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Drain both pipes while waiting.
        let (stdout, stderr, status) =
            tokio::join!(pump(stdout, out_tee), pump(stderr, err_tee), child.wait());

        Ok(Execution {
            stdout,
            stderr,
            status: status?,
        })
    }

    async fn spawn_inherited(&self, path: &Path, invocation: &Invocation) -> Result<Execution> {
        let mut child = Command::new(path)
            .args(invocation.args())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| KubestrapError::Spawn {
                path: path.to_path_buf(),
                source,
            })?;

        let status = child.wait().await?;
        Ok(Execution {
            stdout: Vec::new(),
            stderr: Vec::new(),
            status,
        })
    }

    fn report_failure(&self, what: &str, detail: &str) {
        self.terminal
            .println(format!("{CROSS} Failed to run command: {what}"));
        if !detail.is_empty() {
            self.terminal.println(detail);
        }
    }
}

impl std::fmt::Debug for ProcessRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessRunner").finish_non_exhaustive()
    }
}

#[derive(Clone, Copy)]
enum Stream {
    Out,
    Err,
}

/// Where one child pipe is copied to, besides the capture buffer.
struct Tee<'a> {
    echo: Option<(Terminal, Stream)>,
    sink: Option<Sink<'a>>,
}

fn tees<'a>(mode: RunMode<'a>, terminal: &Terminal) -> (Tee<'a>, Tee<'a>) {
    match mode {
        RunMode::Visible => (
            Tee {
                echo: Some((terminal.clone(), Stream::Out)),
                sink: None,
            },
            Tee {
                echo: Some((terminal.clone(), Stream::Err)),
                sink: None,
            },
        ),
        RunMode::Custom(io) => (
            Tee {
                echo: None,
                sink: io.stdout,
            },
            Tee {
                echo: None,
                sink: io.stderr,
            },
        ),
        RunMode::Silent | RunMode::Interactive => (
            Tee {
                echo: None,
                sink: None,
            },
            Tee {
                echo: None,
                sink: None,
            },
        ),
    }
}

/// Copy a child pipe to its tee targets until EOF, returning everything read.
///
/// A failing target is dropped (with a warning) and the pipe keeps draining.
async fn pump<R>(reader: Option<R>, mut tee: Tee<'_>) -> Vec<u8>
where
    R: AsyncRead + Unpin,
{
    let mut captured = Vec::new();
    let Some(mut reader) = reader else {
        return captured;
    };

    let mut buf = [0u8; 8192];
    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "reading child output failed");
                break;
            }
        };
        let chunk = &buf[..n];

        if let Some((terminal, stream)) = &tee.echo {
            let written = match stream {
                Stream::Out => terminal.write_out(chunk),
                Stream::Err => terminal.write_err(chunk),
            };
            if let Err(e) = written {
                warn!(error = %e, "terminal write failed; no longer echoing child output");
                tee.echo = None;
            }
        }

        if let Some(sink) = tee.sink.as_mut() {
            let written = sink.write_all(chunk).await;
            if let Err(e) = written {
                warn!(error = %e, "output sink write failed; discarding further output");
                tee.sink = None;
            }
        }

        captured.extend_from_slice(chunk);
    }

    if let Some(sink) = tee.sink.as_mut() {
        if let Err(e) = sink.flush().await {
            warn!(error = %e, "flushing output sink failed");
        }
    }

    captured
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::exec::resolver::ExecutableTable;

    fn sh_runner() -> (ProcessRunner, crate::exec::TerminalCapture) {
        let (terminal, capture) = Terminal::memory();
        let table = ExecutableTable::new().with("sh", "/bin/sh");
        let runner = ProcessRunner::new(table).with_terminal(terminal);
        (runner, capture)
    }

    #[tokio::test]
    async fn visible_announces_and_streams() {
        let (runner, capture) = sh_runner();
        let execution = runner
            .run("sh", ["-c", "printf hello; printf oops >&2"])
            .await
            .unwrap();

        assert_eq!(execution.stdout_text(), "hello");
        assert_eq!(execution.stderr_text(), "oops");
        let out = capture.stdout();
        assert!(out.starts_with("Running command: /bin/sh -c"));
        assert!(out.contains("hello"));
        assert_eq!(capture.stderr(), "oops");
    }

    #[tokio::test]
    async fn exit_error_carries_status_and_stderr() {
        let (runner, capture) = sh_runner();
        let err = runner
            .run("sh", ["-c", "echo broken >&2; exit 3"])
            .await
            .unwrap_err();

        match &err {
            KubestrapError::Exit { status, stderr, .. } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "broken");
            }
            other => panic!("expected Exit error, got {other:?}"),
        }
        assert!(err.to_string().contains("broken"));
        assert!(capture.stdout().contains("Failed to run command"));
    }

    #[tokio::test]
    async fn unknown_name_fails_without_spawning() {
        let (runner, capture) = sh_runner();
        let err = runner.run("kubectl", ["get", "pods"]).await.unwrap_err();
        assert!(matches!(err, KubestrapError::Resolution(ref n) if n == "kubectl"));
        assert!(!capture.stdout().contains("Running command"));
        assert!(capture.stdout().contains("Failed to run command"));
    }

    #[tokio::test]
    async fn missing_executable_is_a_spawn_error() {
        let (terminal, _capture) = Terminal::memory();
        let runner = ProcessRunner::new(
            ExecutableTable::new().with("ghost", "/nonexistent/kubestrap/ghost"),
        )
        .with_terminal(terminal);

        let err = runner.run_silent("ghost", ["x"]).await.unwrap_err();
        assert!(matches!(err, KubestrapError::Spawn { .. }));
    }

    #[tokio::test]
    async fn large_output_does_not_deadlock() {
        let (runner, _capture) = sh_runner();
        let execution = runner
            .run_silent(
                "sh",
                [
                    "-c",
                    "i=0; while [ $i -lt 20000 ]; do \
                     echo line-$i; echo err-$i >&2; i=$((i+1)); done",
                ],
            )
            .await
            .unwrap();
        assert_eq!(execution.stdout_text().lines().count(), 20000);
        assert_eq!(execution.stderr_text().lines().count(), 20000);
    }
}
