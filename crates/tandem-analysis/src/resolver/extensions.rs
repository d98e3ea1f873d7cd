//! Extension and index-file probing for local module files.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tandem_graph::Runtime;

/// Extensions tried, in order, for an extensionless specifier.
pub const EXTENSIONS: &[&str] = &[
    "js", "mjs", "cjs", "jsx", "ts", "mts", "cts", "tsx", "d.ts", "d.mts", "d.cts", "json",
];

/// Executable extension paired with the declaration extension describing it.
const DECLARATION_PAIRS: &[(&str, &str)] = &[
    ("js", "d.ts"),
    ("jsx", "d.ts"),
    ("ts", "d.ts"),
    ("tsx", "d.ts"),
    ("mjs", "d.mts"),
    ("mts", "d.mts"),
    ("cjs", "d.cts"),
    ("cts", "d.cts"),
];

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(".");
    raw.push(ext);
    PathBuf::from(raw)
}

fn is_declaration_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    name.ends_with(".d.ts") || name.ends_with(".d.mts") || name.ends_with(".d.cts")
}

/// Declaration files that may describe `path`, most specific first.
///
/// `index.js` yields `index.d.ts`; a declaration file yields nothing.
pub fn declaration_companions(path: &Path) -> Vec<PathBuf> {
    if is_declaration_file(path) {
        return Vec::new();
    }
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return Vec::new();
    };

    DECLARATION_PAIRS
        .iter()
        .filter(|(source, _)| *source == ext)
        .map(|(_, declaration)| append_extension(&path.with_extension(""), declaration))
        .collect()
}

/// The declaration companion of `path` if one exists, otherwise `path` itself.
pub async fn prefer_declaration(path: PathBuf, runtime: &dyn Runtime) -> PathBuf {
    if is_declaration_file(&path) {
        return path;
    }
    for candidate in declaration_companions(&path) {
        if runtime.is_readable(&candidate).await {
            return candidate;
        }
    }
    path
}

/// Try the path as written, then with each extension appended.
///
/// TypeScript-style `./x.js` specifiers that only have an `x.ts` or
/// `x.d.ts` on disk are also accepted.
pub async fn try_extensions(base_path: &Path, runtime: &dyn Runtime) -> Option<PathBuf> {
    if runtime.is_readable(base_path).await {
        return Some(base_path.to_path_buf());
    }

    for ext in EXTENSIONS {
        let with_ext = append_extension(base_path, ext);
        if runtime.is_readable(&with_ext).await {
            return Some(with_ext);
        }
    }

    let written = base_path.extension().and_then(|e| e.to_str());
    if let Some(written) = written {
        let stem = base_path.with_extension("");
        for (source, declaration) in DECLARATION_PAIRS {
            if *source != written {
                continue;
            }
            let declaration = append_extension(&stem, declaration);
            if runtime.is_readable(&declaration).await {
                return Some(declaration);
            }
        }
        for swapped in ["ts", "tsx", "mts", "cts"] {
            let candidate = append_extension(&stem, swapped);
            if written != swapped && runtime.is_readable(&candidate).await {
                return Some(candidate);
            }
        }
    }

    None
}

/// Try `dir/index.<ext>` for each extension.
pub async fn try_index_files(dir_path: &Path, runtime: &dyn Runtime) -> Option<PathBuf> {
    if !runtime.exists(dir_path) {
        return None;
    }

    match runtime.metadata(dir_path).await {
        Ok(metadata) if metadata.is_dir => {}
        _ => return None,
    }

    for ext in EXTENSIONS {
        let index = dir_path.join(format!("index.{}", ext));
        if runtime.is_readable(&index).await {
            return Some(index);
        }
    }

    None
}

/// Resolve a local file path with extension and index file fallbacks.
pub async fn resolve_with_extensions(candidate: &Path, runtime: &dyn Runtime) -> Option<PathBuf> {
    if let Some(resolved) = try_extensions(candidate, runtime).await {
        return Some(resolved);
    }
    try_index_files(candidate, runtime).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_graph::TestRuntime;

    #[test]
    fn companions_follow_module_flavour() {
        assert_eq!(
            declaration_companions(Path::new("/p/a.js")),
            vec![PathBuf::from("/p/a.d.ts")]
        );
        assert_eq!(
            declaration_companions(Path::new("/p/a.mjs")),
            vec![PathBuf::from("/p/a.d.mts")]
        );
        assert_eq!(
            declaration_companions(Path::new("/p/a.b.cjs")),
            vec![PathBuf::from("/p/a.b.d.cts")]
        );
        assert!(declaration_companions(Path::new("/p/a.d.ts")).is_empty());
        assert!(declaration_companions(Path::new("/p/README")).is_empty());
    }

    #[tokio::test]
    async fn appends_extensions_without_replacing_dots() {
        let runtime = TestRuntime::with_files("/p", &[("utils.helper.js", "")]);
        assert_eq!(
            resolve_with_extensions(Path::new("/p/utils.helper"), &runtime).await,
            Some(PathBuf::from("/p/utils.helper.js"))
        );
    }

    #[tokio::test]
    async fn falls_back_to_index_files() {
        let runtime = TestRuntime::with_files("/p", &[("lib/index.mjs", "")]);
        assert_eq!(
            resolve_with_extensions(Path::new("/p/lib"), &runtime).await,
            Some(PathBuf::from("/p/lib/index.mjs"))
        );
    }

    #[tokio::test]
    async fn js_specifier_matches_typescript_sources() {
        let runtime = TestRuntime::with_files("/p", &[("types.d.ts", ""), ("util.ts", "")]);
        assert_eq!(
            resolve_with_extensions(Path::new("/p/types.js"), &runtime).await,
            Some(PathBuf::from("/p/types.d.ts"))
        );
        assert_eq!(
            resolve_with_extensions(Path::new("/p/util.js"), &runtime).await,
            Some(PathBuf::from("/p/util.ts"))
        );
    }

    #[tokio::test]
    async fn prefers_existing_declaration() {
        let runtime = TestRuntime::with_files("/p", &[("a.js", ""), ("a.d.ts", ""), ("b.js", "")]);
        assert_eq!(
            prefer_declaration(PathBuf::from("/p/a.js"), &runtime).await,
            PathBuf::from("/p/a.d.ts")
        );
        assert_eq!(
            prefer_declaration(PathBuf::from("/p/b.js"), &runtime).await,
            PathBuf::from("/p/b.js")
        );
    }
}
