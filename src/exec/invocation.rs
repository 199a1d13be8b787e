// src/exec/invocation.rs

use std::path::Path;
use std::process::ExitStatus;

/// A logical command plus its ordered arguments.
///
/// The name is resolved to an executable path by a
/// [`CommandResolver`](super::CommandResolver) only when the invocation is
/// executed; the invocation itself never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    name: String,
    args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Render the invocation as `<path> <args...>` for announcements and
    /// error messages.
    pub fn display_with(&self, path: &Path) -> String {
        let mut line = path.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Output captured from a finished child process.
#[derive(Debug, Clone)]
pub struct Execution {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub status: ExitStatus,
}

impl Execution {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}
