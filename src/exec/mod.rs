// src/exec/mod.rs

//! Process execution layer.
//!
//! Everything that shells out to the external tooling (container runtime,
//! cluster tool, package manager, cluster client) goes through here.
//!
//! - [`invocation`] holds the immutable command description and the captured
//!   result of running it.
//! - [`resolver`] maps logical command names (e.g. `"kubectl"`) to
//!   executable paths. The runner never consults global state; a resolver is
//!   injected at construction.
//! - [`terminal`] is where user-facing announcements and live child output
//!   end up (real stdio in production, memory in tests).
//! - [`runner`] provides `ProcessRunner` and its output modes.
//! - [`retry`] wraps any fallible async operation with bounded attempts and a
//!   fixed delay.
//! - [`verify`] contains the tool verification table and the health check
//!   built on top of the runner.

pub mod invocation;
pub mod resolver;
pub mod retry;
pub mod runner;
pub mod terminal;
pub mod verify;

pub use invocation::{Execution, Invocation};
pub use resolver::{CommandResolver, ExecutableTable};
pub use retry::{RetryError, RetryPolicy, retry};
pub use runner::{CustomIo, ProcessRunner, RunMode};
pub use terminal::{Terminal, TerminalCapture};
pub use verify::{ToolCheck, ToolStatus, VERIFY_COMMANDS, verify_tools};
