//! Package file contents.

use tandem_graph::Runtime;
use tandem_link::LinkedBundle;

use crate::error::{BuildError, Result};

/// One file of a package, ready to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFile {
    /// `/`-separated path inside the package.
    pub target: String,
    pub contents: Vec<u8>,
}

/// Content of every linked resource, sorted by target path.
///
/// Substituted files use their rewritten text; everything else is read from
/// its source path.
pub async fn collect_files(bundle: &LinkedBundle, runtime: &dyn Runtime) -> Result<Vec<PackageFile>> {
    let mut files = Vec::with_capacity(bundle.contents.len());
    for resource in &bundle.contents {
        let contents = match &resource.substituted_content {
            Some(content) => content.clone().into_bytes(),
            None => runtime
                .read_file(&resource.source_file_path)
                .await
                .map_err(|source| BuildError::Io {
                    path: resource.source_file_path.clone(),
                    source,
                })?,
        };
        files.push(PackageFile {
            target: resource.target_file_path.clone(),
            contents,
        });
    }
    files.sort_by(|a, b| a.target.cmp(&b.target));
    Ok(files)
}

/// Whether `target` stays inside the package directory.
pub fn is_contained(target: &str) -> bool {
    !target.is_empty()
        && !target.starts_with('/')
        && !target.contains('\\')
        && target
            .split('/')
            .all(|segment| !segment.is_empty() && segment != ".." && segment != ".")
}
