// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod helm;
pub mod logging;
pub mod values;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::{ConfigFile, default_config_path, load_and_validate, load_or_default};
use crate::errors::KubestrapError;
use crate::exec::terminal::{CROSS, TICK};
use crate::exec::verify::verified_tools;
use crate::exec::{Invocation, ProcessRunner, RunMode, ToolStatus, retry, verify_tools};
use crate::fs::RealFileSystem;
use crate::helm::ChartInstaller;
use crate::values::generate;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - executable resolution (config table, then `PATH` detection)
/// - the process runner
/// - the selected subcommand
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args
        .config
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    let cfg = if args.config.is_some() {
        load_and_validate(&config_path)
            .with_context(|| format!("loading config {}", config_path.display()))?
    } else {
        load_or_default(&config_path)?
    };

    let mut table = cfg.executable_table();
    table.detect(verified_tools());
    debug!(executables = table.len(), "resolved executable table");

    let runner = ProcessRunner::new(table);
    let base_dir = config_root_dir(&config_path);

    match args.command {
        Command::Verify => verify(&runner).await,
        Command::Values { chart, output } => {
            write_values(&runner, &cfg, &base_dir, &chart, output)
        }
        Command::Install { chart, values_dir } => {
            install(&runner, &cfg, &base_dir, &chart, &values_dir).await
        }
        Command::Exec {
            silent,
            retry: with_retry,
            name,
            args,
        } => exec(&runner, &cfg, silent, with_retry, Invocation::new(name, args)).await,
    }
}

/// Directory that relative paths in the config are resolved against.
///
/// - If the config path has a non-empty parent (e.g. "envs/Kubestrap.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Kubestrap.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

async fn verify(runner: &ProcessRunner) -> Result<()> {
    let checks = verify_tools(runner).await;
    let terminal = runner.terminal();

    for check in &checks {
        match &check.status {
            ToolStatus::Available => terminal.println(format!("{TICK} {}", check.tool)),
            ToolStatus::Missing => terminal.println(format!("{CROSS} {} (not found)", check.tool)),
            ToolStatus::Broken(err) => {
                terminal.println(format!("{CROSS} {} ({err})", check.tool))
            }
        }
    }

    let unavailable = checks.iter().filter(|c| !c.is_available()).count();
    if unavailable > 0 {
        bail!("{unavailable} of {} tools unavailable", checks.len());
    }
    Ok(())
}

fn find_chart<'c>(cfg: &'c ConfigFile, name: &str) -> Result<&'c config::ChartConfig> {
    cfg.chart.get(name).ok_or_else(|| {
        KubestrapError::ConfigError(format!("no [chart.{name}] section in config")).into()
    })
}

fn write_values(
    runner: &ProcessRunner,
    cfg: &ConfigFile,
    base_dir: &Path,
    name: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let chart = find_chart(cfg, name)?;
    let fs = RealFileSystem;
    let installer = ChartInstaller::new(runner, &fs, cfg.retry, base_dir);

    let output = output.unwrap_or_else(|| PathBuf::from(format!("{name}-values.yaml")));
    let defaults = installer.defaults_yaml(chart)?;
    generate(&fs, &output, Some(&chart.overrides()), &defaults)?;

    runner
        .terminal()
        .println(format!("{TICK} wrote values for '{name}' to {}", output.display()));
    Ok(())
}

async fn install(
    runner: &ProcessRunner,
    cfg: &ConfigFile,
    base_dir: &Path,
    name: &str,
    values_dir: &Path,
) -> Result<()> {
    let chart = find_chart(cfg, name)?;
    let fs = RealFileSystem;
    let installer = ChartInstaller::new(runner, &fs, cfg.retry, base_dir);

    let values_path = installer.install(name, chart, values_dir).await?;
    info!(chart = name, values = %values_path.display(), "chart installed");
    runner
        .terminal()
        .println(format!("{TICK} installed '{name}' as release '{}'", chart.release));
    Ok(())
}

async fn exec(
    runner: &ProcessRunner,
    cfg: &ConfigFile,
    silent: bool,
    with_retry: bool,
    invocation: Invocation,
) -> Result<()> {
    let mode = || {
        if silent {
            RunMode::Silent
        } else {
            RunMode::Visible
        }
    };

    if with_retry {
        retry(&cfg.retry, || runner.execute(&invocation, mode()))
            .await
            .map_err(KubestrapError::from)?;
    } else {
        runner.execute(&invocation, mode()).await?;
    }
    Ok(())
}
