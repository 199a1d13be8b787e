#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use kubestrap::config::{ChartConfig, ConfigFile, RawConfigFile};
use kubestrap::exec::RetryPolicy;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_executable(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.config.executables.insert(name.to_string(), path.into());
        self
    }

    pub fn with_retry(mut self, attempts: u32, delay_ms: u64) -> Self {
        self.config.retry = RetryPolicy::new(attempts, Duration::from_millis(delay_ms));
        self
    }

    pub fn with_chart(mut self, name: &str, chart: ChartConfig) -> Self {
        self.config.chart.insert(name.to_string(), chart);
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ChartConfig`.
pub struct ChartConfigBuilder {
    chart: ChartConfig,
}

impl ChartConfigBuilder {
    pub fn new(repo_name: &str, chart: &str, release: &str) -> Self {
        Self {
            chart: ChartConfig {
                repo_name: repo_name.to_string(),
                repo_url: format!("https://charts.example.com/{repo_name}"),
                chart: chart.to_string(),
                release: release.to_string(),
                namespace: None,
                version: None,
                defaults_file: None,
                values: BTreeMap::new(),
            },
        }
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.chart.namespace = Some(namespace.to_string());
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.chart.version = Some(version.to_string());
        self
    }

    pub fn defaults_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.chart.defaults_file = Some(path.into());
        self
    }

    pub fn value(mut self, key: &str, value: impl Into<toml::Value>) -> Self {
        self.chart.values.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> ChartConfig {
        self.chart
    }
}
