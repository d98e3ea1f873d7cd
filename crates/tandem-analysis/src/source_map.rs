//! Companion source-map lookup.
//!
//! Best effort: a missing directive, an inline `data:` map, or a map file
//! that cannot be read all mean "no map" and never fail a scan.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use path_clean::PathClean;
use regex::Regex;
use tandem_graph::Runtime;

static DIRECTIVE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?://|/\*)[#@][ \t]*sourceMappingURL=([^\s'`*]+)").ok()
});

/// The URL named by the last `sourceMappingURL` directive in `source`.
pub fn source_map_directive(source: &str) -> Option<&str> {
    DIRECTIVE
        .as_ref()?
        .captures_iter(source)
        .last()
        .and_then(|captures| captures.get(1))
        .map(|url| url.as_str())
}

/// Path of the readable source map that `file` points at, if any.
pub async fn locate_source_map(file: &Path, source: &str, runtime: &dyn Runtime) -> Option<PathBuf> {
    let url = source_map_directive(source)?;
    if url.starts_with("data:") || url.contains("://") {
        return None;
    }

    let url = url.split(['?', '#']).next().unwrap_or(url);
    let candidate = file.parent()?.join(url).clean();

    if runtime.is_readable(&candidate).await {
        Some(candidate)
    } else {
        tracing::debug!(
            file = %file.display(),
            map = %candidate.display(),
            "source map directive points at an unreadable file"
        );
        None
    }
}
