//! Published `package.json` generation.

use std::path::Path;

use serde_json::{Map, Value, json};
use tandem_config::PackageConfig;
use tandem_link::LinkedBundle;

/// Build the `package.json` of a linked bundle.
///
/// Keys come out in a fixed order: `name`, `version`, `main`, `types`,
/// `exports`, `dependencies`, `peerDependencies`. Dependency sections are
/// sorted by name and omitted when empty. Sibling packages go to
/// `peerDependencies` when `package` declares them as peers.
pub fn build_manifest(bundle: &LinkedBundle, package: &PackageConfig) -> Value {
    let mut manifest = Map::new();
    manifest.insert("name".into(), json!(bundle.name));
    manifest.insert("version".into(), json!(bundle.version));

    let entries: Vec<(Option<&str>, Option<&str>)> = bundle
        .entry_points
        .iter()
        .map(|entry| {
            let import = bundle
                .resource(&entry.import)
                .map(|r| r.target_file_path.as_str());
            let types = entry
                .types
                .as_deref()
                .and_then(|types| bundle.resource(types))
                .map(|r| r.target_file_path.as_str());
            (import, types)
        })
        .collect();

    if let Some((import, types)) = entries.first() {
        if let Some(import) = import {
            manifest.insert("main".into(), json!(import));
        }
        if let Some(types) = types {
            manifest.insert("types".into(), json!(types));
        }
    }

    let mut exports = Map::new();
    for (index, (import, types)) in entries.iter().enumerate() {
        let Some(import) = import else { continue };
        let key = if index == 0 {
            ".".to_string()
        } else {
            match Path::new(import).file_stem() {
                Some(stem) => format!("./{}", stem.to_string_lossy()),
                None => continue,
            }
        };
        if exports.contains_key(&key) {
            tracing::warn!(package = %bundle.name, export = %key, "duplicate export subpath skipped");
            continue;
        }

        let mut conditions = Map::new();
        if let Some(types) = types {
            conditions.insert("types".into(), json!(relative(types)));
        }
        conditions.insert("default".into(), json!(relative(import)));
        exports.insert(key, Value::Object(conditions));
    }
    if !exports.is_empty() {
        manifest.insert("exports".into(), Value::Object(exports));
    }

    let mut dependencies: Vec<(&str, &str)> = Vec::new();
    let mut peers: Vec<(&str, &str)> = Vec::new();
    for record in bundle.bundle_dependencies.records() {
        let section = if package.is_peer(&record.name) {
            &mut peers
        } else {
            &mut dependencies
        };
        section.push((record.name.as_str(), record.version.as_str()));
    }
    for record in bundle.external_dependencies.records() {
        if !dependencies.iter().any(|(name, _)| *name == record.name) {
            dependencies.push((record.name.as_str(), record.version.as_str()));
        }
    }

    if let Some(section) = sorted_section(dependencies) {
        manifest.insert("dependencies".into(), section);
    }
    if let Some(section) = sorted_section(peers) {
        manifest.insert("peerDependencies".into(), section);
    }

    Value::Object(manifest)
}

/// The parts of a manifest that feed change detection.
pub fn dependency_sections(manifest: &Value) -> Value {
    json!({
        "dependencies": manifest.get("dependencies").cloned().unwrap_or(Value::Null),
        "peerDependencies": manifest.get("peerDependencies").cloned().unwrap_or(Value::Null),
    })
}

fn relative(target: &str) -> String {
    format!("./{target}")
}

fn sorted_section(mut entries: Vec<(&str, &str)>) -> Option<Value> {
    if entries.is_empty() {
        return None;
    }
    entries.sort_by(|a, b| a.0.cmp(b.0));
    let section: Map<String, Value> = entries
        .into_iter()
        .map(|(name, version)| (name.to_string(), json!(version)))
        .collect();
    Some(Value::Object(section))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use indexmap::IndexSet;
    use pretty_assertions::assert_eq;
    use tandem_analysis::EntryPoint;
    use tandem_graph::DependencyLedger;
    use tandem_link::LinkedResource;

    use super::*;

    fn resource(source: &str, target: &str) -> LinkedResource {
        LinkedResource {
            source_file_path: PathBuf::from(source),
            target_file_path: target.to_string(),
            direct_dependencies: IndexSet::new(),
            context: None,
            is_substituted: false,
            is_explicitly_included: false,
            substituted_content: None,
        }
    }

    fn bundle() -> LinkedBundle {
        let mut bundle_dependencies = DependencyLedger::new();
        bundle_dependencies.record("@acme/theme", "2.0.0", &PathBuf::from("/b/index.js"));
        bundle_dependencies.record("@acme/core", "1.4.0", &PathBuf::from("/b/index.js"));
        let mut external_dependencies = DependencyLedger::new();
        external_dependencies.record("zod", "^3.0.0", &PathBuf::from("/b/index.js"));
        external_dependencies.record("chalk", "^5.0.0", &PathBuf::from("/b/cli.js"));

        LinkedBundle {
            name: "@acme/app".to_string(),
            version: "0.2.0".to_string(),
            contents: vec![
                resource("/b/index.js", "index.js"),
                resource("/b/index.d.ts", "index.d.ts"),
                resource("/b/bin/cli.js", "bin/cli.js"),
            ],
            entry_points: vec![
                EntryPoint::new("/b/index.js").with_types("/b/index.d.ts"),
                EntryPoint::new("/b/bin/cli.js"),
            ],
            bundle_dependencies,
            external_dependencies,
        }
    }

    #[test]
    fn manifest_fields_and_order() {
        let package = PackageConfig::new("@acme/app", "0.2.0", "build")
            .with_dependency("@acme/core")
            .with_peer_dependency("@acme/theme");

        let manifest = build_manifest(&bundle(), &package);
        assert_eq!(
            manifest,
            json!({
                "name": "@acme/app",
                "version": "0.2.0",
                "main": "index.js",
                "types": "index.d.ts",
                "exports": {
                    ".": { "types": "./index.d.ts", "default": "./index.js" },
                    "./cli": { "default": "./bin/cli.js" }
                },
                "dependencies": {
                    "@acme/core": "1.4.0",
                    "chalk": "^5.0.0",
                    "zod": "^3.0.0"
                },
                "peerDependencies": { "@acme/theme": "2.0.0" }
            })
        );

        let keys: Vec<_> = manifest.as_object().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            vec!["name", "version", "main", "types", "exports", "dependencies", "peerDependencies"]
        );
    }

    #[test]
    fn empty_sections_are_omitted() {
        let mut bundle = bundle();
        bundle.bundle_dependencies = DependencyLedger::new();
        bundle.external_dependencies = DependencyLedger::new();
        let manifest = build_manifest(&bundle, &PackageConfig::new("@acme/app", "0.2.0", "build"));

        assert!(manifest.get("dependencies").is_none());
        assert!(manifest.get("peerDependencies").is_none());
        assert_eq!(
            dependency_sections(&manifest),
            json!({ "dependencies": null, "peerDependencies": null })
        );
    }
}
