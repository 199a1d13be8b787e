// src/logging.rs

//! Diagnostics via `tracing`.
//!
//! Filter resolution, first match wins:
//! 1. `--log-level` sets one level for the whole crate.
//! 2. `KUBESTRAP_LOG` holds a full `EnvFilter` directive string, so
//!    `KUBESTRAP_LOG=kubestrap::exec=debug,warn` works.
//! 3. `info`.
//!
//! Everything goes to stderr. Command announcements and live tool output are
//! user-facing and go through [`crate::exec::Terminal`] instead.

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "KUBESTRAP_LOG";

pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(LOG_ENV).ok().as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("initialising logging: {e}"))
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = cli_level {
        return Ok(EnvFilter::new(level.as_directive()));
    }
    match env.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid {LOG_ENV} value '{directives}'")),
        None => Ok(EnvFilter::new("info")),
    }
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
