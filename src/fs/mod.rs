// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use tempfile::NamedTempFile;

use crate::errors::{KubestrapError, Result};

pub mod mock;

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Replace `path` with `contents` so that readers see either the old file
    /// or the complete new one, never a partial write.
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()>;

    fn exists(&self, path: &Path) -> bool;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading file {:?}", path))?;
        Ok(contents)
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let write_err = |source: std::io::Error| KubestrapError::Write {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_err)?;

        // The temp file lives next to the target so the final rename never
        // crosses filesystems.
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(contents).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_creates_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("values.yaml");
        let fs = RealFileSystem;

        fs.write_atomic(&path, b"a: 1\n").unwrap();
        assert_eq!(fs.read_to_string(&path).unwrap(), "a: 1\n");

        fs.write_atomic(&path, b"a: 2\n").unwrap();
        assert_eq!(fs.read_to_string(&path).unwrap(), "a: 2\n");

        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn write_under_a_file_fails_with_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let err = RealFileSystem
            .write_atomic(&blocker.join("values.yaml"), b"a: 1\n")
            .unwrap_err();
        assert!(matches!(err, KubestrapError::Write { .. }));
    }

    #[test]
    fn read_missing_file_mentions_path() {
        let err = RealFileSystem
            .read_to_string(Path::new("/nonexistent/kubestrap/defaults.yaml"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("defaults.yaml"));
    }
}
