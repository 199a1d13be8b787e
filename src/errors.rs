// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::exec::retry::RetryError;

#[derive(Error, Debug)]
pub enum KubestrapError {
    /// The logical command name has no registered executable. Nothing was
    /// spawned.
    #[error("unknown command '{0}': no executable path registered")]
    Resolution(String),

    #[error("failed to start '{}': {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("command '{command}' failed with {status}{}", stderr_suffix(.stderr))]
    Exit {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("retry failed after {attempts} attempts{}", last_suffix(.last.as_deref()))]
    RetryExhausted {
        attempts: u32,
        #[source]
        last: Option<Box<KubestrapError>>,
    },

    #[error("YAML parsing error: {0}")]
    Parse(String),

    #[error("writing '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KubestrapError {
    /// Stderr captured from the failing process, if this is an exit error
    /// (directly or as the last attempt of an exhausted retry).
    pub fn captured_stderr(&self) -> Option<&str> {
        match self {
            KubestrapError::Exit { stderr, .. } => Some(stderr.as_str()),
            KubestrapError::RetryExhausted { last: Some(last), .. } => last.captured_stderr(),
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for KubestrapError {
    fn from(err: serde_yaml::Error) -> Self {
        KubestrapError::Parse(err.to_string())
    }
}

impl From<RetryError<KubestrapError>> for KubestrapError {
    fn from(err: RetryError<KubestrapError>) -> Self {
        KubestrapError::RetryExhausted {
            attempts: err.attempts,
            last: err.last.map(Box::new),
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

fn last_suffix(last: Option<&KubestrapError>) -> String {
    match last {
        Some(err) => format!(": {err}"),
        None => String::new(),
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, KubestrapError>;
