//! Two packages built from one directory, linked in dependency order.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tandem_analysis::{
    BundleSpec, EntryPoint, ModuleResolution, OxcAnalyzer, ResolvedBundle, ScanOptions,
    resolve_bundle,
};
use tandem_graph::{NativeRuntime, PackageManifest, Runtime};
use tandem_link::link;
use tempfile::TempDir;

fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

async fn resolve(root: &Path, name: &str, entry: EntryPoint) -> ResolvedBundle {
    let runtime: Arc<dyn Runtime> = Arc::new(NativeRuntime::new());
    let analyzer = OxcAnalyzer::new(root, ModuleResolution::Static, Arc::clone(&runtime));
    let manifest = PackageManifest::from_json(r#"{"dependencies": {"lodash": "^4.17.0"}}"#).unwrap();
    let spec = BundleSpec {
        name: name.to_string(),
        project_root: root.to_path_buf(),
        package_root: PathBuf::from("build"),
        entries: vec![entry],
        include: Vec::new(),
        options: ScanOptions::default(),
    };
    resolve_bundle(&spec, &manifest, &analyzer, runtime.as_ref())
        .await
        .unwrap()
}

#[tokio::test]
async fn dependent_imports_shared_files_from_its_sibling() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_tree(
        root,
        &[
            ("build/core.js", "export * from './shared.js';"),
            ("build/core.d.ts", "export * from './shared.js';"),
            ("build/shared.js", "import 'lodash';\nexport const shared = 1;"),
            ("build/shared.d.ts", "export declare const shared: number;"),
            ("build/app.js", "import { shared } from './shared.js';\nimport './local.js';"),
            ("build/local.js", "export {};"),
            ("node_modules/lodash/index.js", ""),
        ],
    );

    let core = resolve(
        root,
        "@acme/core",
        EntryPoint::new("build/core.js").with_types("build/core.d.ts"),
    )
    .await;
    let app = resolve(root, "@acme/app", EntryPoint::new("build/app.js")).await;

    let core = link(&core, "1.2.0", &[]).unwrap();
    assert!(core.substituted().next().is_none());
    assert_eq!(
        core.contents
            .iter()
            .map(|r| r.target_file_path.as_str())
            .collect::<Vec<_>>(),
        vec!["core.js", "shared.js", "core.d.ts", "shared.d.ts"]
    );

    let app = link(&app, "0.1.0", std::slice::from_ref(&core)).unwrap();
    assert_eq!(
        app.contents
            .iter()
            .map(|r| r.target_file_path.as_str())
            .collect::<Vec<_>>(),
        vec!["app.js", "local.js"]
    );

    let app_js = app
        .contents
        .iter()
        .find(|r| r.target_file_path == "app.js")
        .unwrap();
    assert!(app_js.is_substituted);
    assert_eq!(
        app_js.inline_content(),
        Some("import { shared } from '@acme/core/shared.js';\nimport './local.js';")
    );

    assert_eq!(app.bundle_dependencies.get("@acme/core").unwrap().version, "1.2.0");
    // lodash was only imported by shared.js, which app no longer ships.
    assert!(app.external_dependencies.is_empty());
    assert!(core.external_dependencies.contains("lodash"));
}
