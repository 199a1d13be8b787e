// src/config/validate.rs

use crate::config::model::{ChartConfig, ConfigFile, RawConfigFile};
use crate::errors::{KubestrapError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::KubestrapError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.executables, raw.retry, raw.chart))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_executables(cfg)?;
    for (name, chart) in cfg.chart.iter() {
        validate_chart(name, chart)?;
    }
    Ok(())
}

fn validate_executables(cfg: &RawConfigFile) -> Result<()> {
    for (name, path) in cfg.executables.iter() {
        if !path.is_absolute() {
            return Err(KubestrapError::ConfigError(format!(
                "executable '{}' must be an absolute path (got '{}')",
                name,
                path.display()
            )));
        }
    }
    Ok(())
}

fn validate_chart(name: &str, chart: &ChartConfig) -> Result<()> {
    let required = [
        ("repo_name", &chart.repo_name),
        ("repo_url", &chart.repo_url),
        ("chart", &chart.chart),
        ("release", &chart.release),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(KubestrapError::ConfigError(format!(
                "chart '{}' has an empty `{}`",
                name, field
            )));
        }
    }

    for key in chart.values.keys() {
        if key.split('.').any(str::is_empty) {
            return Err(KubestrapError::ConfigError(format!(
                "chart '{}' has an invalid value key '{}' (empty path segment)",
                name, key
            )));
        }
    }

    Ok(())
}
