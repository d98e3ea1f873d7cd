//! Module-specifier extraction with oxc.

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, CallExpression, ExportAllDeclaration, ExportNamedDeclaration, Expression,
    ImportDeclaration, ImportExpression, StringLiteral, TSImportEqualsDeclaration,
    TSModuleReference,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::{Parser, ParserReturn};
use oxc_span::SourceType;

use crate::context::{LiteralSpan, SpecifierKind};

/// A specifier literal before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSpecifier {
    pub value: String,
    pub span: LiteralSpan,
    pub kind: SpecifierKind,
}

#[derive(Debug, Default)]
pub struct ParsedSource {
    pub specifiers: Vec<RawSpecifier>,
    pub diagnostics: Vec<String>,
}

/// Whether files with this name are parsed for specifiers at all.
pub fn is_parseable(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("js" | "mjs" | "cjs" | "jsx" | "ts" | "mts" | "cts" | "tsx")
    )
}

/// Collect every module-specifier string literal in `source`, in source order.
///
/// Parsing is error tolerant: whatever oxc recovers is still visited and the
/// diagnostics are returned alongside.
pub fn extract_specifiers(path: &Path, source: &str) -> ParsedSource {
    if !is_parseable(path) {
        return ParsedSource::default();
    }

    let source_type = SourceType::from_path(path).unwrap_or_else(|_| SourceType::mjs());
    let allocator = Allocator::default();
    let ParserReturn {
        program,
        errors,
        panicked,
        ..
    } = Parser::new(&allocator, source, source_type).parse();

    let mut diagnostics: Vec<String> = errors.iter().map(|error| error.to_string()).collect();
    if panicked && diagnostics.is_empty() {
        diagnostics.push("parser aborted".to_string());
    }

    let mut collector = SpecifierCollector::default();
    collector.visit_program(&program);

    let mut specifiers = collector.specifiers;
    specifiers.sort_by_key(|spec| spec.span.start);

    ParsedSource {
        specifiers,
        diagnostics,
    }
}

#[derive(Default)]
struct SpecifierCollector {
    specifiers: Vec<RawSpecifier>,
}

impl SpecifierCollector {
    fn push(&mut self, literal: &StringLiteral<'_>, kind: SpecifierKind) {
        self.specifiers.push(RawSpecifier {
            value: literal.value.as_str().to_string(),
            span: LiteralSpan::new(literal.span.start, literal.span.end),
            kind,
        });
    }
}

impl<'a> Visit<'a> for SpecifierCollector {
    fn visit_import_declaration(&mut self, decl: &ImportDeclaration<'a>) {
        self.push(&decl.source, SpecifierKind::Import);
        walk::walk_import_declaration(self, decl);
    }

    fn visit_export_named_declaration(&mut self, decl: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &decl.source {
            self.push(source, SpecifierKind::ReExport);
        }
        walk::walk_export_named_declaration(self, decl);
    }

    fn visit_export_all_declaration(&mut self, decl: &ExportAllDeclaration<'a>) {
        self.push(&decl.source, SpecifierKind::ReExport);
        walk::walk_export_all_declaration(self, decl);
    }

    fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
        if let Expression::StringLiteral(literal) = &expr.source {
            self.push(literal, SpecifierKind::DynamicImport);
        }
        walk::walk_import_expression(self, expr);
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Expression::Identifier(ident) = &call.callee {
            if ident.name.as_str() == "require" && call.arguments.len() == 1 {
                if let Argument::StringLiteral(literal) = &call.arguments[0] {
                    self.push(literal, SpecifierKind::Require);
                }
            }
        }
        walk::walk_call_expression(self, call);
    }

    fn visit_ts_import_equals_declaration(&mut self, decl: &TSImportEqualsDeclaration<'a>) {
        if let TSModuleReference::ExternalModuleReference(reference) = &decl.module_reference {
            self.push(&reference.expression, SpecifierKind::ImportEquals);
        }
        walk::walk_ts_import_equals_declaration(self, decl);
    }
}
