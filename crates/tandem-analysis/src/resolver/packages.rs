//! Bare specifier resolution through `node_modules`.

use std::path::{Path, PathBuf};

use path_clean::PathClean;
use serde_json::Value;

use tandem_graph::Runtime;

use super::extensions::resolve_with_extensions;
use crate::options::ModuleResolution;

/// Split a bare specifier into its package name and optional subpath.
///
/// `@scope/pkg/feature` yields `("@scope/pkg", Some("feature"))`.
pub fn split_bare_specifier(specifier: &str) -> Option<(&str, Option<&str>)> {
    let split_at = if specifier.starts_with('@') {
        let first = specifier.find('/')?;
        if first == 1 || first + 1 == specifier.len() {
            return None;
        }
        specifier[first + 1..].find('/').map(|second| first + 1 + second)
    } else {
        specifier.find('/')
    };

    match split_at {
        Some(idx) => {
            let subpath = &specifier[idx + 1..];
            Some((&specifier[..idx], (!subpath.is_empty()).then_some(subpath)))
        }
        None => Some((specifier, None)),
    }
}

/// Locate `node_modules/<name>` walking up from `from_dir`.
pub async fn find_package_dir(name: &str, from_dir: &Path, runtime: &dyn Runtime) -> Option<PathBuf> {
    let mut current = Some(from_dir);
    while let Some(dir) = current {
        if dir.file_name().is_some_and(|n| n == "node_modules") {
            current = dir.parent();
            continue;
        }
        let candidate = dir.join("node_modules").join(name);
        if runtime.exists(&candidate) {
            if let Ok(meta) = runtime.metadata(&candidate).await {
                if meta.is_dir {
                    return Some(candidate);
                }
            }
        }
        current = dir.parent();
    }
    None
}

async fn read_package_json(package_dir: &Path, runtime: &dyn Runtime) -> Option<Value> {
    let content = runtime.read_to_string(&package_dir.join("package.json")).await.ok()?;
    serde_json::from_str(&content).ok()
}

/// Pick a target out of an `exports` value for the given conditions.
fn select_export_target<'v>(value: &'v Value, conditions: &[&str]) -> Option<&'v str> {
    match value {
        Value::String(target) => Some(target.as_str()),
        Value::Array(items) => items.iter().find_map(|item| select_export_target(item, conditions)),
        Value::Object(map) => conditions
            .iter()
            .find_map(|condition| map.get(*condition))
            .and_then(|nested| select_export_target(nested, conditions)),
        _ => None,
    }
}

fn export_entry<'v>(exports: &'v Value, subpath: Option<&str>) -> Option<&'v Value> {
    let key = match subpath {
        Some(sub) => format!("./{}", sub),
        None => ".".to_string(),
    };
    match exports {
        Value::Object(map) if map.keys().any(|k| k.starts_with('.')) => map.get(&key),
        // Sugar: `"exports": "./index.js"` or a bare condition map.
        _ if subpath.is_none() => Some(exports),
        _ => None,
    }
}

/// Resolve the file a bare import lands on inside an installed package.
///
/// Falls back to the package folder itself when the package is installed
/// but its entry file cannot be found; the package name is all that is
/// needed from a vendored reference.
pub async fn resolve_package(
    package_dir: &Path,
    subpath: Option<&str>,
    resolution: ModuleResolution,
    runtime: &dyn Runtime,
) -> PathBuf {
    let manifest = read_package_json(package_dir, runtime).await;

    if let Some(exports) = manifest.as_ref().and_then(|m| m.get("exports")) {
        let target = export_entry(exports, subpath)
            .and_then(|entry| select_export_target(entry, resolution.conditions()));
        if let Some(target) = target {
            let candidate = package_dir.join(target).clean();
            if runtime.is_readable(&candidate).await {
                return candidate;
            }
        }
    }

    if let Some(sub) = subpath {
        let candidate = package_dir.join(sub).clean();
        return resolve_with_extensions(&candidate, runtime)
            .await
            .unwrap_or(candidate);
    }

    if let Some(manifest) = &manifest {
        for field in resolution.entry_fields() {
            if let Some(entry) = manifest.get(*field).and_then(Value::as_str) {
                let candidate = package_dir.join(entry).clean();
                if let Some(found) = resolve_with_extensions(&candidate, runtime).await {
                    return found;
                }
            }
        }
    }

    resolve_with_extensions(&package_dir.join("index"), runtime)
        .await
        .unwrap_or_else(|| package_dir.to_path_buf())
}
