use serde::{Deserialize, Serialize};

/// Convention used to interpret bare package imports.
///
/// `Static` follows ES module rules (`import` export condition, then the
/// `module` field); `Dynamic` follows CommonJS rules (`require` condition,
/// then `main`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleResolution {
    #[default]
    Static,
    Dynamic,
}

impl ModuleResolution {
    /// Export conditions tried, in order, when a package has an `exports` map.
    pub fn conditions(self) -> &'static [&'static str] {
        match self {
            ModuleResolution::Static => &["import", "module", "node", "default"],
            ModuleResolution::Dynamic => &["require", "node", "default"],
        }
    }

    /// `package.json` fields tried, in order, when `exports` is absent.
    pub fn entry_fields(self) -> &'static [&'static str] {
        match self {
            ModuleResolution::Static => &["module", "main"],
            ModuleResolution::Dynamic => &["main"],
        }
    }
}

impl std::fmt::Display for ModuleResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModuleResolution::Static => f.write_str("static"),
            ModuleResolution::Dynamic => f.write_str("dynamic"),
        }
    }
}

/// Options controlling a module graph scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    pub module_resolution: ModuleResolution,
    /// Locate a companion source map for every visited file.
    pub include_source_map_files: bool,
    /// Scan type-declaration companions instead of executable files.
    pub resolve_declaration_files: bool,
    /// Accept version pins from `devDependencies`.
    pub include_dev_dependencies: bool,
    /// Abort on parser diagnostics instead of logging them.
    pub fail_on_compile_errors: bool,
}

impl ScanOptions {
    pub fn declarations(mut self) -> Self {
        self.resolve_declaration_files = true;
        self
    }
}
