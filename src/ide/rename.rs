//! Rename locations, safe delete, and module-level file references.

use serde::Serialize;
use tracing::debug;

use crate::base::{FileId, TextRange, TextSpan, normalize_path};
use crate::error::AnalysisResult;
use crate::hir::{Binder, DeclId, Program};
use crate::ide::cancellation::CancellationToken;
use crate::ide::position::name_at;
use crate::ide::references::{ReferenceInfo, ReferenceKind, find_references};

/// A reference occurrence with the rest of its line on either side.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameLocation {
    pub file_name: String,
    #[serde(skip)]
    pub file: FileId,
    pub span: TextSpan,
    pub line: u32,
    /// Line text before the match.
    pub prefix_text: String,
    /// Line text after the match.
    pub suffix_text: String,
}

/// Occurrences to edit when renaming the identifier at `offset` in `anchor`.
///
/// Only occurrences spelled like the identifier are returned, so an alias
/// introduced by `import {x as y}` keeps its own name.
pub fn find_rename_locations(
    binder: &Binder<'_>,
    cancel: &CancellationToken,
    files: &[FileId],
    anchor: FileId,
    offset: u32,
) -> AnalysisResult<Vec<RenameLocation>> {
    let program = binder.program();
    let source = program.file(anchor)?;
    let offset = source.check_offset(offset)?;
    let Some(name) = name_at(&source.syntax(), offset) else {
        return Ok(Vec::new());
    };
    let Some(target) = binder.resolve(anchor, &name) else {
        return Ok(Vec::new());
    };
    let spelling = name.text().to_string();

    let locations = find_references(binder, cancel, &target, files)
        .into_iter()
        .filter_map(|reference| rename_location(program, reference, &spelling))
        .collect::<Vec<_>>();
    debug!(name = %spelling, count = locations.len(), "rename locations");
    Ok(locations)
}

fn rename_location(program: &Program, reference: ReferenceInfo, spelling: &str) -> Option<RenameLocation> {
    let source = program.file(reference.file).ok()?;
    let range = reference.span.to_range();
    if source.text().get(usize::from(range.start())..usize::from(range.end()))? != spelling {
        return None;
    }
    let line_range = source.line_index().line_range(reference.line)?;
    let line = &source.text()[line_range];
    let line_start = usize::from(line_range.start());
    let start = usize::from(range.start()) - line_start;
    let end = usize::from(range.end()) - line_start;
    Some(RenameLocation {
        file_name: reference.file_name,
        file: reference.file,
        span: reference.span,
        line: reference.line,
        prefix_text: line[..start].to_string(),
        suffix_text: line[end.min(line.len())..].to_string(),
    })
}

/// Whether `target` is referenced nowhere outside its own declaration.
///
/// The scan covers the declaring file and every file that imports it,
/// directly or transitively. Library declarations are never safe to delete.
pub fn is_safe_to_delete(binder: &Binder<'_>, cancel: &CancellationToken, target: &DeclId) -> bool {
    let program = binder.program();
    let in_library = program
        .file(target.file)
        .is_ok_and(|file| file.library().is_some());
    if in_library {
        return false;
    }
    let own: Vec<TextRange> = binder
        .siblings(target)
        .iter()
        .filter_map(|id| binder.declaration(id))
        .map(|decl| decl.self_range)
        .collect();
    let closure = program.import_closure(target.file);
    let references = find_references(binder, cancel, target, &closure);
    if cancel.is_cancellation_requested() {
        return false;
    }
    references.iter().all(|reference| {
        let range = reference.span.to_range();
        reference.file == target.file && own.iter().any(|own| own.contains_range(range))
    })
}

/// Safe-delete check for the identifier at `offset`; unresolvable names are not safe.
pub fn get_safe_delete_info(
    binder: &Binder<'_>,
    cancel: &CancellationToken,
    file: FileId,
    offset: u32,
) -> AnalysisResult<bool> {
    let source = binder.program().file(file)?;
    let offset = source.check_offset(offset)?;
    let target = name_at(&source.syntax(), offset).and_then(|name| binder.resolve(file, &name));
    Ok(target.is_some_and(|target| is_safe_to_delete(binder, cancel, &target)))
}

/// Module specifiers in `candidates` that denote `search`.
///
/// With `is_package_module`, `search` is a logical library module path
/// (`std/core`) rather than a file path.
pub fn find_file_references(
    program: &Program,
    search: &str,
    candidates: &[FileId],
    is_package_module: bool,
) -> Vec<ReferenceInfo> {
    let target = if is_package_module {
        program.library_module(search)
    } else {
        program.file_id(&normalize_path(search))
    };
    let Some(target) = target else {
        return Vec::new();
    };
    candidates
        .iter()
        .filter_map(|&file| program.file(file).ok())
        .flat_map(|source| {
            program
                .imports(source.id())
                .iter()
                .filter(move |edge| edge.target == Some(target))
                .map(move |edge| ReferenceInfo {
                    file_name: source.path().to_string(),
                    file: source.id(),
                    span: edge.range.into(),
                    line: source.line_index().line_of(edge.range.start()),
                    kind: ReferenceKind::Read,
                    is_definition: false,
                })
        })
        .collect()
}
