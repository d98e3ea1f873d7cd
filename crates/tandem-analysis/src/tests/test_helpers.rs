//! Shared test utilities for analysis tests.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tandem_graph::{NativeRuntime, PackageManifest, Runtime};
use tempfile::TempDir;

use crate::{ModuleResolution, OxcAnalyzer};

/// Create a test project with the given `(path, content)` files.
///
/// Returns the root path of the created project.
pub fn create_test_project(temp: &TempDir, files: &[(&str, &str)]) -> PathBuf {
    let root = temp.path().to_path_buf();

    for (path, content) in files {
        let file_path = root.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|_| panic!("Failed to create parent directory for {}", path));
        }
        fs::write(&file_path, content).unwrap_or_else(|_| panic!("Failed to write file {}", path));
    }

    root
}

pub fn native_runtime() -> Arc<dyn Runtime> {
    Arc::new(NativeRuntime::new())
}

pub fn analyzer(root: &std::path::Path, runtime: &Arc<dyn Runtime>) -> OxcAnalyzer {
    OxcAnalyzer::new(root, ModuleResolution::Static, Arc::clone(runtime))
}

pub fn manifest(json: &str) -> PackageManifest {
    PackageManifest::from_json(json).expect("valid manifest")
}
