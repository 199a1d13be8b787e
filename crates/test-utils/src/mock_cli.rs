//! Stand-ins for the external tools, built on `/bin/sh -c`.
//!
//! Every logical name in a [`mock_table`] resolves to the shell. Tests pick a
//! behaviour by passing one of the script snippets below as arguments, e.g.
//! `runner.run("kubectl", fail())`.

use std::path::PathBuf;

use kubestrap::exec::{ExecutableTable, ProcessRunner, Terminal, TerminalCapture};

pub const SHELL: &str = "/bin/sh";

/// Resolver table mapping each name to `/bin/sh`.
pub fn mock_table<'a>(names: impl IntoIterator<Item = &'a str>) -> ExecutableTable {
    names.into_iter().map(|name| (name, SHELL)).collect()
}

/// Runner over [`mock_table`] whose terminal output is captured.
pub fn mock_runner<'a>(
    names: impl IntoIterator<Item = &'a str>,
) -> (ProcessRunner, TerminalCapture) {
    let (terminal, capture) = Terminal::memory();
    let runner = ProcessRunner::new(mock_table(names)).with_terminal(terminal);
    (runner, capture)
}

/// Runner whose table maps each name to the given path verbatim.
pub fn runner_with(
    entries: impl IntoIterator<Item = (&'static str, PathBuf)>,
) -> (ProcessRunner, TerminalCapture) {
    let (terminal, capture) = Terminal::memory();
    let table: ExecutableTable = entries.into_iter().collect();
    (ProcessRunner::new(table).with_terminal(terminal), capture)
}

/// `sh -c <script>` arguments.
pub fn script(body: &str) -> Vec<String> {
    vec!["-c".to_string(), body.to_string()]
}

/// Prints `SUCCESS` and exits 0.
pub fn success() -> Vec<String> {
    script("echo SUCCESS")
}

/// Prints `FAILURE` to stderr and exits 1.
pub fn fail() -> Vec<String> {
    script("echo FAILURE >&2; exit 1")
}

/// Echoes its own positional arguments, one per line.
pub fn success_with_args(args: &[&str]) -> Vec<String> {
    let mut argv = script(r#"for a in "$@"; do echo "$a"; done"#);
    argv.push("sh".to_string());
    argv.extend(args.iter().map(|a| a.to_string()));
    argv
}

/// Writes only to stderr and exits 0.
pub fn stderr_only() -> Vec<String> {
    script("echo WARNING >&2")
}

/// Fails until the marker file has been touched `failures` times, then
/// succeeds. Lets retry tests observe real processes.
pub fn fail_times(counter: &std::path::Path, failures: u32) -> Vec<String> {
    let path = counter.display();
    script(&format!(
        r#"n=$(cat "{path}" 2>/dev/null || echo 0); n=$((n+1)); echo $n > "{path}"
[ $n -gt {failures} ] || {{ echo "attempt $n" >&2; exit 1; }}
echo "ok after $n""#
    ))
}
