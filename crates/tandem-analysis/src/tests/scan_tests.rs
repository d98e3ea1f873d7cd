use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::test_helpers::*;
use crate::{AnalyzeError, ScanOptions, scan};

fn relative(root: &Path, paths: impl IntoIterator<Item = PathBuf>) -> Vec<String> {
    paths
        .into_iter()
        .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect()
}

#[tokio::test]
async fn diamond_is_flattened_once_per_file() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(
        &temp,
        &[
            ("entry.js", "import './a.js';\nimport './b.js';"),
            ("a.js", "import './c.js';"),
            ("b.js", "import { c } from './c.js';"),
            ("c.js", "export const c = 1;"),
        ],
    );
    let runtime = native_runtime();
    let analyzer = analyzer(&root, &runtime);
    let manifest = manifest("{}");

    let graph = scan(
        Path::new("entry.js"),
        &root,
        ScanOptions::default(),
        &analyzer,
        &manifest,
        runtime.as_ref(),
    )
    .await
    .unwrap();

    assert_eq!(graph.len(), 4);
    let flat = graph.flatten(graph.entry()).unwrap();
    assert_eq!(
        relative(&root, flat.files.iter().map(|f| f.path.clone())),
        vec!["entry.js", "a.js", "b.js", "c.js"]
    );
    assert_eq!(
        relative(&root, flat.files[0].dependencies.iter().cloned()),
        vec!["a.js", "b.js"]
    );
}

#[tokio::test]
async fn cycles_are_visited_once() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(
        &temp,
        &[
            ("a.js", "import './b.js';\nimport './a.js';"),
            ("b.js", "import './a.js';"),
        ],
    );
    let runtime = native_runtime();
    let analyzer = analyzer(&root, &runtime);
    let manifest = manifest("{}");

    let graph = scan(
        Path::new("a.js"),
        &root,
        ScanOptions::default(),
        &analyzer,
        &manifest,
        runtime.as_ref(),
    )
    .await
    .unwrap();

    assert_eq!(graph.len(), 2);
    let a = root.join("a.js").to_string_lossy().into_owned();
    let b = root.join("b.js").to_string_lossy().into_owned();
    assert!(graph.graph().has_connection(&a, &b));
    assert!(graph.graph().has_connection(&b, &a));
    assert!(graph.graph().has_connection(&a, &a));
}

#[tokio::test]
async fn deep_chains_do_not_recurse() {
    let temp = TempDir::new().unwrap();
    let depth = 400;
    let files: Vec<(String, String)> = (0..depth)
        .map(|i| {
            let content = if i == depth - 1 {
                "export const x = 1;".to_string()
            } else {
                format!("export * from './level{}.js';", i + 1)
            };
            (format!("level{}.js", i), content)
        })
        .collect();
    let borrowed: Vec<(&str, &str)> = files
        .iter()
        .map(|(p, c)| (p.as_str(), c.as_str()))
        .collect();
    let root = create_test_project(&temp, &borrowed);
    let runtime = native_runtime();
    let analyzer = analyzer(&root, &runtime);
    let manifest = manifest("{}");

    let graph = scan(
        Path::new("level0.js"),
        &root,
        ScanOptions::default(),
        &analyzer,
        &manifest,
        runtime.as_ref(),
    )
    .await
    .unwrap();
    assert_eq!(graph.len(), depth);
}

#[tokio::test]
async fn package_references_follow_manifest_pins() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(
        &temp,
        &[
            (
                "index.js",
                "import React from 'react';\nimport { test } from 'vitest';\nimport pad from 'left-pad';\nimport { x } from './x.js';\nimport fs from 'node:fs';",
            ),
            ("x.js", "import { transform } from '@babel/core';\nexport const x = 1;"),
            ("node_modules/react/package.json", r#"{"main": "index.js"}"#),
            ("node_modules/react/index.js", ""),
            ("node_modules/vitest/index.js", ""),
            ("node_modules/left-pad/index.js", ""),
            ("node_modules/@babel/core/lib/index.js", ""),
            ("node_modules/@babel/core/package.json", r#"{"main": "lib/index.js"}"#),
        ],
    );
    let runtime = native_runtime();
    let analyzer = analyzer(&root, &runtime);
    let manifest = manifest(
        r#"{
            "dependencies": { "react": "^18.2.0" },
            "devDependencies": { "vitest": "^1.0.0" },
            "peerDependencies": { "@babel/core": "^7.0.0" }
        }"#,
    );

    let without_dev = scan(
        Path::new("index.js"),
        &root,
        ScanOptions::default(),
        &analyzer,
        &manifest,
        runtime.as_ref(),
    )
    .await
    .unwrap();
    // @babel/core is only a peer, so it is presumed satisfied and dropped.
    assert_eq!(
        without_dev.external().names().collect::<Vec<_>>(),
        vec!["react"]
    );

    let options = ScanOptions {
        include_dev_dependencies: true,
        ..ScanOptions::default()
    };
    let with_dev = scan(
        Path::new("index.js"),
        &root,
        options,
        &analyzer,
        &manifest,
        runtime.as_ref(),
    )
    .await
    .unwrap();
    assert_eq!(
        with_dev.external().names().collect::<Vec<_>>(),
        vec!["react", "vitest"]
    );

    let react = with_dev.external().get("react").unwrap();
    assert_eq!(react.version, "^18.2.0");
    assert_eq!(react.referenced_from().to_vec(), vec![root.join("index.js")]);
    assert!(with_dev.node(&root.join("x.js")).unwrap().external.is_empty());

    let index = with_dev.node(&root.join("index.js")).unwrap();
    assert_eq!(
        index.external.iter().cloned().collect::<Vec<_>>(),
        vec!["react".to_string(), "vitest".to_string()]
    );
}

#[tokio::test]
async fn unresolved_import_names_specifier_and_file() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(
        &temp,
        &[("index.js", "import './present.js';"), ("present.js", "import './gone.js';")],
    );
    let runtime = native_runtime();
    let analyzer = analyzer(&root, &runtime);
    let manifest = manifest("{}");

    let err = scan(
        Path::new("index.js"),
        &root,
        ScanOptions::default(),
        &analyzer,
        &manifest,
        runtime.as_ref(),
    )
    .await
    .unwrap_err();

    match err {
        AnalyzeError::UnresolvedImport { specifier, from } => {
            assert_eq!(specifier, "./gone.js");
            assert_eq!(from, root.join("present.js"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unparseable_vendored_path_is_an_error() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(
        &temp,
        &[
            ("index.js", "import './node_modules/.cache/x.js';"),
            ("node_modules/.cache/x.js", ""),
        ],
    );
    let runtime = native_runtime();
    let analyzer = analyzer(&root, &runtime);
    let manifest = manifest("{}");

    let err = scan(
        Path::new("index.js"),
        &root,
        ScanOptions::default(),
        &analyzer,
        &manifest,
        runtime.as_ref(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AnalyzeError::InvalidVendoredPath { .. }));
}

#[tokio::test]
async fn compile_errors_abort_only_when_requested() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(&temp, &[("index.js", "export const = ;")]);
    let runtime = native_runtime();
    let analyzer = analyzer(&root, &runtime);
    let manifest = manifest("{}");

    let lenient = scan(
        Path::new("index.js"),
        &root,
        ScanOptions::default(),
        &analyzer,
        &manifest,
        runtime.as_ref(),
    )
    .await;
    assert!(lenient.is_ok());

    let strict = ScanOptions {
        fail_on_compile_errors: true,
        ..ScanOptions::default()
    };
    let err = scan(
        Path::new("index.js"),
        &root,
        strict,
        &analyzer,
        &manifest,
        runtime.as_ref(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AnalyzeError::CompileErrors { .. }));
}

#[tokio::test]
async fn source_maps_follow_their_file() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(
        &temp,
        &[
            ("index.js", "import './a.js';\n//# sourceMappingURL=index.js.map\n"),
            ("index.js.map", "{}"),
            ("a.js", "export {};\n//# sourceMappingURL=a.js.map\n"),
        ],
    );
    let runtime = native_runtime();
    let analyzer = analyzer(&root, &runtime);
    let manifest = manifest("{}");
    let options = ScanOptions {
        include_source_map_files: true,
        ..ScanOptions::default()
    };

    let graph = scan(
        Path::new("index.js"),
        &root,
        options,
        &analyzer,
        &manifest,
        runtime.as_ref(),
    )
    .await
    .unwrap();
    let flat = graph.flatten(graph.entry()).unwrap();

    // a.js.map does not exist, so a.js has no companion.
    assert_eq!(
        relative(&root, flat.files.iter().map(|f| f.path.clone())),
        vec!["index.js", "index.js.map", "a.js"]
    );
    assert_eq!(flat.files[0].source_map, Some(root.join("index.js.map")));
    assert_eq!(flat.files[2].source_map, None);
}

#[tokio::test]
async fn declaration_resolution_prefers_companions() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(
        &temp,
        &[
            ("index.js", "export * from './a.js';\nexport * from './b.js';"),
            ("index.d.ts", "export * from './a.js';\nexport * from './b.js';"),
            ("a.js", "export const a = 1;"),
            ("a.d.ts", "export declare const a: number;"),
            ("b.js", "export const b = 1;"),
        ],
    );
    let runtime = native_runtime();
    let analyzer = analyzer(&root, &runtime);
    let manifest = manifest("{}");

    let graph = scan(
        Path::new("index.js"),
        &root,
        ScanOptions::default().declarations(),
        &analyzer,
        &manifest,
        runtime.as_ref(),
    )
    .await
    .unwrap();

    assert_eq!(graph.entry(), root.join("index.d.ts"));
    let flat = graph.flatten(graph.entry()).unwrap();
    assert_eq!(
        relative(&root, flat.files.iter().map(|f| f.path.clone())),
        vec!["index.d.ts", "a.d.ts", "b.js"]
    );
}

#[tokio::test]
async fn flatten_from_inner_node_restricts_ledger() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(
        &temp,
        &[
            ("index.js", "import 'react';\nimport './inner.js';"),
            ("inner.js", "import 'scheduler';"),
            ("node_modules/react/index.js", ""),
            ("node_modules/scheduler/index.js", ""),
        ],
    );
    let runtime = native_runtime();
    let analyzer = analyzer(&root, &runtime);
    let manifest = manifest(r#"{"dependencies": {"react": "18", "scheduler": "0.23"}}"#);

    let graph = scan(
        Path::new("index.js"),
        &root,
        ScanOptions::default(),
        &analyzer,
        &manifest,
        runtime.as_ref(),
    )
    .await
    .unwrap();

    let inner = graph.flatten(&root.join("inner.js")).unwrap();
    assert_eq!(inner.external.names().collect::<Vec<_>>(), vec!["scheduler"]);
    assert!(graph.flatten(&root.join("missing.js")).is_err());
}

#[tokio::test]
async fn missing_entry_is_reported() {
    let temp = TempDir::new().unwrap();
    let root = create_test_project(&temp, &[]);
    let runtime = native_runtime();
    let analyzer = analyzer(&root, &runtime);
    let manifest = manifest("{}");

    let err = scan(
        Path::new("nope.js"),
        &root,
        ScanOptions::default(),
        &analyzer,
        &manifest,
        runtime.as_ref(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AnalyzeError::MissingEntry { .. }));
}
