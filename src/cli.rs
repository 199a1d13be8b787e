// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `kubestrap`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "kubestrap",
    version,
    about = "Bootstrap local Kubernetes clusters and generate Helm values.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Kubestrap.toml` in the current working directory. A missing
    /// default file is treated as an empty config; a missing explicit file is
    /// an error.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `KUBESTRAP_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check that docker, helm, kind and kubectl are installed and respond.
    Verify,

    /// Write the merged values file for a configured chart.
    Values {
        /// Chart name as in `[chart.<name>]`.
        chart: String,

        /// Output path. Default: `<chart>-values.yaml`.
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Add the chart's repository, write its values file and install it.
    Install {
        /// Chart name as in `[chart.<name>]`.
        chart: String,

        /// Directory for generated values files.
        #[arg(long, value_name = "DIR", default_value = ".kubestrap")]
        values_dir: PathBuf,
    },

    /// Run a tool by its logical name, e.g. `kubestrap exec kubectl get pods`.
    Exec {
        /// Suppress all output; only the exit status is reported.
        #[arg(long)]
        silent: bool,

        /// Retry on failure using the `[retry]` policy.
        #[arg(long)]
        retry: bool,

        /// Logical command name (key of `[executables]` or found on PATH).
        name: String,

        /// Arguments passed through to the tool.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exec_passes_hyphenated_args_through() {
        let args = CliArgs::try_parse_from([
            "kubestrap", "exec", "--retry", "kubectl", "get", "pods", "-A",
        ])
        .unwrap();
        match args.command {
            Command::Exec {
                silent,
                retry,
                name,
                args,
            } => {
                assert!(!silent);
                assert!(retry);
                assert_eq!(name, "kubectl");
                assert_eq!(args, ["get", "pods", "-A"]);
            }
            other => panic!("expected exec, got {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args = CliArgs::try_parse_from([
            "kubestrap", "values", "ingress", "--config", "dev.toml", "--log-level", "debug",
        ])
        .unwrap();
        assert_eq!(args.config.as_deref(), Some("dev.toml"));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(matches!(
            args.command,
            Command::Values { ref chart, output: None } if chart == "ingress"
        ));
    }
}
