//! Loading configurations from disk and the environment.

use std::path::PathBuf;

use figment::Jail;
use pretty_assertions::assert_eq;
use tandem_analysis::{EntryPoint, ModuleResolution};
use tandem_config::{ConfigDiscovery, ConfigError, load_from};

const CONFIG: &str = r#"
out_dir = "out"

[defaults]
include_source_map_files = true

[[packages]]
name = "@acme/core"
version = "1.0.0"
root = "build/core"
entries = [{ import = "build/core/index.js", types = "build/core/index.d.ts" }]
include = ["build/core/README.md"]

[[packages]]
name = "@acme/app"
version = "0.3.0"
root = "build/app"
entries = [{ import = "build/app/index.js" }]
dependencies = ["@acme/core"]
module_resolution = "dynamic"
"#;

#[test]
fn loads_toml_config() {
    Jail::expect_with(|jail| {
        jail.create_file("tandem.toml", CONFIG)?;

        let config = ConfigDiscovery::new(jail.directory()).load().unwrap();
        config.validate().unwrap();

        assert_eq!(config.base_dir, jail.directory());
        assert_eq!(config.out_dir(), jail.directory().join("out"));
        assert_eq!(config.lock_file(), jail.directory().join("tandem.lock.json"));
        assert_eq!(config.packages.len(), 2);

        let core = config.package("@acme/core").unwrap();
        assert_eq!(
            core.entries,
            vec![EntryPoint::new("build/core/index.js").with_types("build/core/index.d.ts")]
        );
        assert_eq!(core.include, vec![PathBuf::from("build/core/README.md")]);
        assert_eq!(core.manifest, PathBuf::from("package.json"));
        assert!(core.options(&config.defaults).include_source_map_files);

        let app = config.package("@acme/app").unwrap();
        assert_eq!(app.dependencies, vec!["@acme/core".to_string()]);
        assert_eq!(
            app.options(&config.defaults).module_resolution,
            ModuleResolution::Dynamic
        );
        Ok(())
    });
}

#[test]
fn environment_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file("tandem.toml", CONFIG)?;
        jail.set_env("TANDEM_OUT_DIR", "elsewhere");
        jail.set_env("TANDEM_DEFAULTS__FAIL_ON_COMPILE_ERRORS", "true");

        let config = load_from(&jail.directory().join("tandem.toml")).unwrap();
        assert_eq!(config.out_dir, PathBuf::from("elsewhere"));
        assert!(config.defaults.fail_on_compile_errors);
        assert!(config.defaults.include_source_map_files);
        Ok(())
    });
}

#[test]
fn loads_package_json_field() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "package.json",
            r#"{
                "name": "monorepo",
                "tandem": {
                    "packages": [
                        {
                            "name": "@acme/core",
                            "version": "1.0.0",
                            "root": "build",
                            "entries": [{ "import": "build/index.js" }]
                        }
                    ]
                }
            }"#,
        )?;

        let discovery = ConfigDiscovery::new(jail.directory());
        assert_eq!(discovery.find().unwrap(), jail.directory().join("package.json"));

        let config = discovery.load().unwrap();
        assert_eq!(config.packages[0].name, "@acme/core");
        assert_eq!(config.out_dir, PathBuf::from("dist/packages"));
        Ok(())
    });
}

#[test]
fn type_errors_surface_as_extract_errors() {
    Jail::expect_with(|jail| {
        jail.create_file("tandem.toml", "packages = \"nope\"")?;

        let err = load_from(&jail.directory().join("tandem.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Extract(_)));
        Ok(())
    });
}

#[test]
fn missing_explicit_file_is_a_read_error() {
    Jail::expect_with(|jail| {
        let err = load_from(&jail.directory().join("custom.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        Ok(())
    });
}
