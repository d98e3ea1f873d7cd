//! In-place module-specifier rewriting.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tandem_analysis::SourceContext;
use tandem_analysis::resolver::declaration_companions;

/// Replacement specifier for a literal that resolved to `resolved`.
///
/// Declaration scans depend on the `.d.ts` companion while the literal
/// resolves to the executable file, so companions are matched too.
fn replacement_for<'r>(resolved: &Path, rewrites: &'r IndexMap<PathBuf, String>) -> Option<&'r str> {
    if let Some(found) = rewrites.get(resolved) {
        return Some(found.as_str());
    }
    declaration_companions(resolved)
        .iter()
        .find_map(|companion| rewrites.get(companion))
        .map(String::as_str)
}

/// Rewrite the specifiers of `context.source` whose local target is a key
/// of `rewrites`.
///
/// Only the characters between the quotes of a matching literal change;
/// the quote style and every other byte of the file are preserved.
pub fn rewrite_specifiers(context: &SourceContext, rewrites: &IndexMap<PathBuf, String>) -> String {
    let source = context.source.as_str();
    let mut output = String::with_capacity(source.len());
    let mut cursor = 0usize;

    let mut specifiers: Vec<_> = context.specifiers.iter().collect();
    specifiers.sort_by_key(|spec| spec.span.start);

    for spec in specifiers {
        let Some(target) = spec.local_target() else {
            continue;
        };
        let Some(replacement) = replacement_for(target, rewrites) else {
            continue;
        };

        let range = spec.span.value_range();
        if range.start < cursor || range.end > source.len() || range.start > range.end {
            tracing::warn!(
                file = %context.path.display(),
                specifier = %spec.value,
                "specifier span out of range, leaving literal untouched"
            );
            continue;
        }

        output.push_str(&source[cursor..range.start]);
        output.push_str(replacement);
        cursor = range.end;
    }

    output.push_str(&source[cursor..]);
    output
}
