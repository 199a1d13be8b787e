// src/exec/resolver.rs

//! Logical command name → executable path resolution.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Anything that can turn a logical command name into an executable path.
///
/// Returning `None` means the name is unknown; the runner then fails with a
/// resolution error without spawning anything.
pub trait CommandResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<PathBuf>;
}

/// An unset table resolves nothing.
impl<R: CommandResolver> CommandResolver for Option<R> {
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        self.as_ref().and_then(|r| r.resolve(name))
    }
}

/// Name → path table, usually filled from `[executables]` in the config and
/// from `PATH` detection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutableTable {
    paths: BTreeMap<String, PathBuf>,
}

impl ExecutableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.paths.insert(name.into(), path.into());
    }

    pub fn with(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.insert(name, path);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.paths.get(name).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Fill in any of `names` not already in the table by searching `PATH`.
    ///
    /// Entries already present are never replaced.
    pub fn detect<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        let Some(search_path) = env::var_os("PATH") else {
            debug!("PATH is not set; skipping executable detection");
            return;
        };
        let dirs: Vec<PathBuf> = env::split_paths(&search_path).collect();

        for name in names {
            if self.paths.contains_key(name) {
                continue;
            }
            if let Some(found) = find_in_dirs(name, &dirs) {
                debug!(name, path = %found.display(), "detected executable on PATH");
                self.paths.insert(name.to_string(), found);
            }
        }
    }
}

impl CommandResolver for ExecutableTable {
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        self.paths.get(name).cloned()
    }
}

impl<K, V> FromIterator<(K, V)> for ExecutableTable
where
    K: Into<String>,
    V: Into<PathBuf>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            paths: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn find_in_dirs(name: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
