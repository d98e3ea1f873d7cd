//! Per-file analysis context.
//!
//! A [`SourceContext`] holds everything needed to rewrite a file later
//! without parsing it again: the original text and every module-specifier
//! literal together with its byte span and what it resolved to.

use std::path::{Path, PathBuf};

/// Syntactic position a specifier was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecifierKind {
    /// `import ... from "x"` or `import "x"`
    Import,
    /// `export ... from "x"` or `export * from "x"`
    ReExport,
    /// `import("x")`
    DynamicImport,
    /// `require("x")`
    Require,
    /// `import x = require("x")`
    ImportEquals,
}

/// Where a specifier points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A file inside the project.
    Local(PathBuf),
    /// A file (or package folder) inside a `node_modules` tree.
    Vendored(PathBuf),
    /// `node:` prefixed or a known platform module.
    Builtin,
    /// Nothing matched.
    Unresolved,
}

/// Byte range of a string literal in the source, quotes included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LiteralSpan {
    pub start: u32,
    pub end: u32,
}

impl LiteralSpan {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Range of the literal's value, quotes excluded.
    pub fn value_range(&self) -> std::ops::Range<usize> {
        (self.start as usize + 1)..(self.end as usize).saturating_sub(1)
    }
}

/// One module-specifier literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSpecifier {
    pub value: String,
    pub span: LiteralSpan,
    pub kind: SpecifierKind,
    pub resolution: Resolution,
}

impl ModuleSpecifier {
    pub fn local_target(&self) -> Option<&Path> {
        match &self.resolution {
            Resolution::Local(path) => Some(path),
            _ => None,
        }
    }
}

/// A file reference reported by a project analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub specifier: String,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    pub path: PathBuf,
    pub source: String,
    pub specifiers: Vec<ModuleSpecifier>,
    /// Parser diagnostics, rendered.
    pub diagnostics: Vec<String>,
}

impl SourceContext {
    /// References in source order, one per distinct specifier value.
    pub fn references(&self) -> Vec<Reference> {
        let mut seen = rustc_hash::FxHashSet::default();
        self.specifiers
            .iter()
            .filter(|spec| seen.insert(spec.value.as_str()))
            .map(|spec| Reference {
                specifier: spec.value.clone(),
                resolution: spec.resolution.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_range_strips_quotes() {
        let source = r#"import a from "./a.js";"#;
        let start = source.find('"').unwrap() as u32;
        let span = LiteralSpan::new(start, start + 8);
        assert_eq!(&source[span.value_range()], "./a.js");
    }

    #[test]
    fn references_deduplicate_by_specifier() {
        let spec = |value: &str, kind| ModuleSpecifier {
            value: value.to_string(),
            span: LiteralSpan::new(0, 0),
            kind,
            resolution: Resolution::Local(PathBuf::from(format!("/p/{value}"))),
        };
        let context = SourceContext {
            path: PathBuf::from("/p/index.js"),
            source: String::new(),
            specifiers: vec![
                spec("./a.js", SpecifierKind::Import),
                spec("./b.js", SpecifierKind::ReExport),
                spec("./a.js", SpecifierKind::DynamicImport),
            ],
            diagnostics: Vec::new(),
        };

        let names: Vec<_> = context
            .references()
            .into_iter()
            .map(|r| r.specifier)
            .collect();
        assert_eq!(names, vec!["./a.js", "./b.js"]);
    }
}
