// src/exec/verify.rs

//! Tool availability checks.

use tracing::debug;

use crate::errors::KubestrapError;
use crate::exec::runner::ProcessRunner;

/// Probe arguments per tool. A tool counts as available when its probe exits
/// successfully.
pub const VERIFY_COMMANDS: &[(&str, &[&str])] = &[
    ("docker", &["ps", "-a"]),
    ("helm", &["version"]),
    ("kind", &["version"]),
    ("kubectl", &["version", "--client=true"]),
];

/// Names of every tool in [`VERIFY_COMMANDS`].
pub fn verified_tools() -> impl Iterator<Item = &'static str> {
    VERIFY_COMMANDS.iter().map(|(name, _)| *name)
}

#[derive(Debug)]
pub enum ToolStatus {
    Available,
    /// Not registered with the resolver.
    Missing,
    /// Registered, but the probe failed.
    Broken(KubestrapError),
}

#[derive(Debug)]
pub struct ToolCheck {
    pub tool: &'static str,
    pub status: ToolStatus,
}

impl ToolCheck {
    pub fn is_available(&self) -> bool {
        matches!(self.status, ToolStatus::Available)
    }
}

/// Run every probe silently, one after the other.
pub async fn verify_tools(runner: &ProcessRunner) -> Vec<ToolCheck> {
    let mut checks = Vec::with_capacity(VERIFY_COMMANDS.len());

    for &(tool, args) in VERIFY_COMMANDS {
        let status = match runner.run_silent(tool, args.iter().copied()).await {
            Ok(_) => ToolStatus::Available,
            Err(KubestrapError::Resolution(_)) => ToolStatus::Missing,
            Err(err) => ToolStatus::Broken(err),
        };
        debug!(tool, ?status, "verified tool");
        checks.push(ToolCheck { tool, status });
    }

    checks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_table_matches_known_tools() {
        let table: std::collections::BTreeMap<_, _> = VERIFY_COMMANDS.iter().copied().collect();
        assert_eq!(table["docker"], ["ps", "-a"]);
        assert_eq!(table["kubectl"], ["version", "--client=true"]);
        assert_eq!(table["kind"], ["version"]);
        assert_eq!(table["helm"], ["version"]);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn tool_names_are_listed_in_order() {
        let names: Vec<_> = verified_tools().collect();
        assert_eq!(names, ["docker", "helm", "kind", "kubectl"]);
    }
}
