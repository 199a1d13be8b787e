#![allow(dead_code)]

pub use kubestrap_test_utils::builders::{ChartConfigBuilder, ConfigFileBuilder};
pub use kubestrap_test_utils::mock_cli::*;
pub use kubestrap_test_utils::{init_tracing, with_timeout};

use std::path::PathBuf;

/// First of `candidates` that exists on this machine.
pub fn find_binary(candidates: &[&str]) -> PathBuf {
    candidates
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .unwrap_or_else(|| panic!("none of {candidates:?} found"))
}

/// A binary that ignores its arguments and exits 0.
pub fn true_binary() -> PathBuf {
    find_binary(&["/bin/true", "/usr/bin/true"])
}

/// A binary that ignores its arguments and exits 1.
pub fn false_binary() -> PathBuf {
    find_binary(&["/bin/false", "/usr/bin/false"])
}
