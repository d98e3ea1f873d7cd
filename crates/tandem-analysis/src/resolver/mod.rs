//! Node-style module resolution.
//!
//! Relative and absolute specifiers resolve to files with extension and
//! index fallbacks. Bare specifiers resolve through the nearest
//! `node_modules` installation. Platform modules are recognised and left
//! alone.

mod builtins;
mod extensions;
mod packages;

pub use builtins::is_builtin;
pub use extensions::{
    EXTENSIONS, declaration_companions, prefer_declaration, resolve_with_extensions,
};
pub use packages::{find_package_dir, resolve_package, split_bare_specifier};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use path_clean::PathClean;
use tandem_graph::{Runtime, is_vendored_path};

use crate::context::Resolution;
use crate::options::ModuleResolution;

/// Module resolver bound to a project root.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    root: PathBuf,
    resolution: ModuleResolution,
    runtime: Arc<dyn Runtime>,
}

impl ModuleResolver {
    pub fn new(root: impl Into<PathBuf>, resolution: ModuleResolution, runtime: Arc<dyn Runtime>) -> Self {
        Self {
            root: root.into(),
            resolution,
            runtime,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolution(&self) -> ModuleResolution {
        self.resolution
    }

    /// Resolve `specifier` as written in the file `from`.
    ///
    /// 1. `node:` and core module names are builtins
    /// 2. Relative paths resolve against the importing file's folder
    /// 3. Absolute paths resolve against the project root
    /// 4. Anything else is a package looked up in `node_modules`
    pub async fn resolve(&self, specifier: &str, from: &Path) -> Resolution {
        let runtime = self.runtime.as_ref();

        if specifier.starts_with('.') || specifier.starts_with('/') {
            let base = if specifier.starts_with('/') {
                self.root.clone()
            } else {
                from.parent().map(Path::to_path_buf).unwrap_or_default()
            };
            let relative = specifier.trim_start_matches('/');
            let candidate = base.join(relative).clean();

            return match resolve_with_extensions(&candidate, runtime).await {
                Some(path) if is_vendored_path(&path) => Resolution::Vendored(path),
                Some(path) => Resolution::Local(path),
                None => Resolution::Unresolved,
            };
        }

        if is_builtin(specifier) {
            return Resolution::Builtin;
        }

        let Some((name, subpath)) = split_bare_specifier(specifier) else {
            return Resolution::Unresolved;
        };
        let from_dir = from.parent().unwrap_or(&self.root);

        match find_package_dir(name, from_dir, runtime).await {
            Some(package_dir) => Resolution::Vendored(
                resolve_package(&package_dir, subpath, self.resolution, runtime).await,
            ),
            None => Resolution::Unresolved,
        }
    }
}
