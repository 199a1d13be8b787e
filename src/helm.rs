// src/helm.rs

//! Helm chart installation on top of the runner, the retry executor and the
//! values generator.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::ChartConfig;
use crate::errors::{KubestrapError, Result};
use crate::exec::{ProcessRunner, RetryPolicy, retry};
use crate::fs::FileSystem;
use crate::values::{Tree, generate};

/// Logical command name of the package manager.
pub const HELM: &str = "helm";

pub fn repo_add_args(chart: &ChartConfig) -> Vec<String> {
    vec![
        "repo".into(),
        "add".into(),
        chart.repo_name.clone(),
        chart.repo_url.clone(),
        "--force-update".into(),
    ]
}

pub fn repo_update_args(chart: &ChartConfig) -> Vec<String> {
    vec!["repo".into(), "update".into(), chart.repo_name.clone()]
}

pub fn upgrade_install_args(chart: &ChartConfig, values_path: &Path) -> Vec<String> {
    let mut args = vec![
        "upgrade".to_string(),
        "--install".to_string(),
        chart.release.clone(),
        chart.chart.clone(),
        "--values".to_string(),
        values_path.display().to_string(),
    ];
    if let Some(namespace) = &chart.namespace {
        args.extend(["--namespace".to_string(), namespace.clone()]);
        args.push("--create-namespace".to_string());
    }
    if let Some(version) = &chart.version {
        args.extend(["--version".to_string(), version.clone()]);
    }
    args
}

/// Installs charts described in `[chart.<name>]` sections.
#[derive(Debug)]
pub struct ChartInstaller<'a> {
    runner: &'a ProcessRunner,
    fs: &'a dyn FileSystem,
    policy: RetryPolicy,
    /// Relative `defaults_file` paths are resolved against this directory.
    base_dir: PathBuf,
}

impl<'a> ChartInstaller<'a> {
    pub fn new(
        runner: &'a ProcessRunner,
        fs: &'a dyn FileSystem,
        policy: RetryPolicy,
        base_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            fs,
            policy,
            base_dir: base_dir.into(),
        }
    }

    /// Read the chart's defaults document, or `""` when it has none.
    pub fn defaults_yaml(&self, chart: &ChartConfig) -> Result<String> {
        match &chart.defaults_file {
            Some(file) => self.fs.read_to_string(&self.base_dir.join(file)),
            None => Ok(String::new()),
        }
    }

    /// Write `<values_dir>/<name>-values.yaml` for the chart.
    pub fn write_values(
        &self,
        name: &str,
        chart: &ChartConfig,
        values_dir: &Path,
    ) -> Result<(PathBuf, Tree)> {
        let defaults = self.defaults_yaml(chart)?;
        let path = values_dir.join(format!("{name}-values.yaml"));
        let tree = generate(self.fs, &path, Some(&chart.overrides()), &defaults)?;
        Ok((path, tree))
    }

    /// Add the repository (retried), write the values file, then run
    /// `helm upgrade --install`. Returns the values file path.
    pub async fn install(
        &self,
        name: &str,
        chart: &ChartConfig,
        values_dir: &Path,
    ) -> Result<PathBuf> {
        info!(chart = name, repo = %chart.repo_name, "adding helm repository");
        let add = repo_add_args(chart);
        retry(&self.policy, || self.runner.run_silent(HELM, add.clone()))
            .await
            .map_err(KubestrapError::from)?;

        let update = repo_update_args(chart);
        retry(&self.policy, || self.runner.run_silent(HELM, update.clone()))
            .await
            .map_err(KubestrapError::from)?;

        let (values_path, _) = self.write_values(name, chart, values_dir)?;

        info!(chart = name, release = %chart.release, "installing helm release");
        self.runner
            .run(HELM, upgrade_install_args(chart, &values_path))
            .await?;

        Ok(values_path)
    }
}
