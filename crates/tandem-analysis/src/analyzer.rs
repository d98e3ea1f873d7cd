//! Project analyzer capability and its oxc-backed implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tandem_graph::Runtime;

use crate::context::{ModuleSpecifier, Reference, SourceContext};
use crate::error::{AnalyzeError, Result};
use crate::options::ModuleResolution;
use crate::parser::extract_specifiers;
use crate::resolver::ModuleResolver;

/// Maximum size of a single source file (10MB)
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Answers "what does this file import" for a project.
#[async_trait]
pub trait ProjectAnalyzer: Send + Sync {
    /// Analysis context of `file`: its text and resolved specifiers.
    async fn context(&self, file: &Path) -> Result<Arc<SourceContext>>;

    /// Every file `file` references, once per distinct specifier.
    async fn references(&self, file: &Path) -> Result<Vec<Reference>> {
        Ok(self.context(file).await?.references())
    }
}

/// Analyzer that parses with oxc and resolves with [`ModuleResolver`].
///
/// Contexts are cached per path for the analyzer's lifetime, so a file
/// reached from several entry points is read and parsed once.
#[derive(Debug)]
pub struct OxcAnalyzer {
    resolver: ModuleResolver,
    runtime: Arc<dyn Runtime>,
    cache: Mutex<FxHashMap<PathBuf, Arc<SourceContext>>>,
}

impl OxcAnalyzer {
    pub fn new(root: impl Into<PathBuf>, resolution: ModuleResolution, runtime: Arc<dyn Runtime>) -> Self {
        Self {
            resolver: ModuleResolver::new(root, resolution, Arc::clone(&runtime)),
            runtime,
            cache: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn resolver(&self) -> &ModuleResolver {
        &self.resolver
    }

    async fn read_source(&self, path: &Path) -> Result<String> {
        if let Ok(metadata) = self.runtime.metadata(path).await {
            if metadata.size > MAX_FILE_SIZE {
                return Err(AnalyzeError::FileTooLarge {
                    path: path.to_path_buf(),
                    size: metadata.size,
                    max: MAX_FILE_SIZE,
                });
            }
        }

        self.runtime
            .read_to_string(path)
            .await
            .map_err(|source| AnalyzeError::ReadFile {
                path: path.to_path_buf(),
                source,
            })
    }

    async fn analyze(&self, path: &Path) -> Result<SourceContext> {
        let source = self.read_source(path).await?;
        let parsed = extract_specifiers(path, &source);

        let mut specifiers = Vec::with_capacity(parsed.specifiers.len());
        for raw in parsed.specifiers {
            let resolution = self.resolver.resolve(&raw.value, path).await;
            specifiers.push(ModuleSpecifier {
                value: raw.value,
                span: raw.span,
                kind: raw.kind,
                resolution,
            });
        }

        tracing::debug!(
            file = %path.display(),
            specifiers = specifiers.len(),
            diagnostics = parsed.diagnostics.len(),
            "analyzed file"
        );

        Ok(SourceContext {
            path: path.to_path_buf(),
            source,
            specifiers,
            diagnostics: parsed.diagnostics,
        })
    }
}

#[async_trait]
impl ProjectAnalyzer for OxcAnalyzer {
    async fn context(&self, file: &Path) -> Result<Arc<SourceContext>> {
        let cached = self.cache.lock().get(file).cloned();
        if let Some(cached) = cached {
            return Ok(cached);
        }

        let context = Arc::new(self.analyze(file).await?);
        self.cache
            .lock()
            .entry(file.to_path_buf())
            .or_insert_with(|| Arc::clone(&context));
        Ok(context)
    }
}
