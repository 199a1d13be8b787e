// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::exec::{ExecutableTable, RetryPolicy};
use crate::values::{Node, Overrides};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [executables]
/// kubectl = "/usr/local/bin/kubectl"
///
/// [retry]
/// attempts = 10
/// delay_ms = 3000
///
/// [chart.ingress]
/// repo_name = "ingress-nginx"
/// repo_url = "https://kubernetes.github.io/ingress-nginx"
/// chart = "ingress-nginx/ingress-nginx"
/// release = "ingress"
/// namespace = "ingress-nginx"
/// defaults_file = "defaults/ingress.yaml"
///
/// [chart.ingress.values]
/// "controller.logLevel" = "debug"
/// ```
///
/// All sections are optional.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// Logical command name → absolute executable path.
    #[serde(default)]
    pub executables: BTreeMap<String, PathBuf>,

    /// Policy for operations that are retried (repo adds, readiness waits).
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Helm charts from `[chart.<name>]`.
    #[serde(default)]
    pub chart: BTreeMap<String, ChartConfig>,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub executables: BTreeMap<String, PathBuf>,
    pub retry: RetryPolicy,
    pub chart: BTreeMap<String, ChartConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        executables: BTreeMap<String, PathBuf>,
        retry: RetryPolicy,
        chart: BTreeMap<String, ChartConfig>,
    ) -> Self {
        Self {
            executables,
            retry,
            chart,
        }
    }

    /// Configured executables as a resolver table.
    pub fn executable_table(&self) -> ExecutableTable {
        self.executables
            .iter()
            .map(|(name, path)| (name.clone(), path.clone()))
            .collect()
    }
}

/// `[chart.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    /// Name passed to `helm repo add`.
    pub repo_name: String,

    pub repo_url: String,

    /// Chart reference, usually `<repo_name>/<chart>`.
    pub chart: String,

    pub release: String,

    #[serde(default)]
    pub namespace: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    /// YAML file with the chart's default values. Relative paths are
    /// resolved against the config file's directory.
    #[serde(default)]
    pub defaults_file: Option<PathBuf>,

    /// Dotted-key overrides merged on top of the defaults.
    #[serde(default)]
    pub values: BTreeMap<String, toml::Value>,
}

impl ChartConfig {
    pub fn overrides(&self) -> Overrides {
        self.values
            .iter()
            .map(|(key, value)| (key.clone(), Node::from(value.clone())))
            .collect()
    }
}
