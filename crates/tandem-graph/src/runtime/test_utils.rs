//! In-memory runtime for tests.
//!
//! Files live in a map keyed by absolute path; directories are implied by
//! the files below them. Writes are recorded so tests can assert on what a
//! publisher produced.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{FileMetadata, Runtime, RuntimeError, RuntimeResult};

#[derive(Debug)]
pub struct TestRuntime {
    cwd: PathBuf,
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
}

impl TestRuntime {
    /// Create an empty runtime rooted at `cwd`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            files: Mutex::new(BTreeMap::new()),
        }
    }

    /// Create a runtime holding `(path, content)` pairs; relative paths are
    /// placed under `cwd`.
    pub fn with_files(cwd: impl Into<PathBuf>, files: &[(&str, &str)]) -> Self {
        let runtime = Self::new(cwd);
        for (path, content) in files {
            runtime.insert(path, content);
        }
        runtime
    }

    pub fn insert(&self, path: impl AsRef<Path>, content: &str) {
        let path = self.absolute(path.as_ref());
        self.files.lock().insert(path, content.as_bytes().to_vec());
    }

    /// Content of a file as text, if present.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = self.absolute(path.as_ref());
        self.files
            .lock()
            .get(&path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Every file path currently stored, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.lock().keys().cloned().collect()
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files
            .lock()
            .keys()
            .any(|file| file != path && file.starts_with(path))
    }
}

#[async_trait]
impl Runtime for TestRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let path = self.absolute(path);
        self.files
            .lock()
            .get(&path)
            .cloned()
            .ok_or(RuntimeError::FileNotFound(path))
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        let path = self.absolute(path);
        self.files.lock().insert(path, content.to_vec());
        Ok(())
    }

    async fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        let path = self.absolute(path);
        if let Some(bytes) = self.files.lock().get(&path) {
            return Ok(FileMetadata {
                size: bytes.len() as u64,
                is_dir: false,
                is_file: true,
            });
        }
        if self.is_dir(&path) {
            return Ok(FileMetadata {
                size: 0,
                is_dir: true,
                is_file: false,
            });
        }
        Err(RuntimeError::FileNotFound(path))
    }

    fn exists(&self, path: &Path) -> bool {
        let path = self.absolute(path);
        self.files.lock().contains_key(&path) || self.is_dir(&path)
    }

    async fn create_dir(&self, _path: &Path, _recursive: bool) -> RuntimeResult<()> {
        Ok(())
    }
}
