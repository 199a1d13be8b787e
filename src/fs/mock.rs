// src/fs/mock.rs

use super::FileSystem;
use crate::errors::{KubestrapError, Result};
use anyhow::anyhow;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// In-memory filesystem for tests.
///
/// Writes under a path registered with [`deny_writes_under`] fail with a
/// permission error and leave nothing behind.
///
/// [`deny_writes_under`]: MockFileSystem::deny_writes_under
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
    denied: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let mut files = self.files.lock().unwrap();
        files.insert(path.as_ref().to_path_buf(), content.into());
    }

    pub fn deny_writes_under(&self, dir: impl AsRef<Path>) {
        self.denied.lock().unwrap().push(dir.as_ref().to_path_buf());
    }

    /// File contents as UTF-8, if the file exists.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let files = self.files.lock().unwrap();
        files
            .get(path.as_ref())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let files = self.files.lock().unwrap();
        match files.get(path) {
            Some(content) => String::from_utf8(content.clone())
                .map_err(|e| anyhow!("Invalid UTF-8 in {:?}: {}", path, e).into()),
            None => Err(anyhow!("File not found: {:?}", path).into()),
        }
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let denied = self.denied.lock().unwrap();
        if denied.iter().any(|dir| path.starts_with(dir)) {
            return Err(KubestrapError::Write {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only directory"),
            });
        }
        drop(denied);

        self.add_file(path, contents);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        files.contains_key(path)
    }
}
