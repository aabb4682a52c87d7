//! Helpers for building hosts and locating text in fixtures.

use ets_analysis::ide::{FileTextChanges, apply_text_changes};
use ets_analysis::{Analysis, AnalysisHost, FileId, TextSpan};

/// A host holding `files` as project files.
pub fn host_with(files: &[(&str, &str)]) -> AnalysisHost {
    let mut host = AnalysisHost::new();
    for (path, text) in files {
        host.set_file_content(path, text);
    }
    host
}

/// File id of `path`, panicking when it is not part of the program.
pub fn file_id(analysis: &Analysis<'_>, path: &str) -> FileId {
    analysis
        .file_id(path)
        .unwrap_or_else(|| panic!("{path} is not part of the program"))
}

/// Byte offset of the first occurrence of `needle`.
pub fn offset_of(text: &str, needle: &str) -> u32 {
    nth_offset_of(text, needle, 0)
}

/// Byte offset of the `n`th (zero-based) occurrence of `needle`.
pub fn nth_offset_of(text: &str, needle: &str, n: usize) -> u32 {
    let (offset, _) = text
        .match_indices(needle)
        .nth(n)
        .unwrap_or_else(|| panic!("occurrence {n} of {needle:?} not found in {text:?}"));
    offset as u32
}

/// Source text covered by `span`.
pub fn slice(text: &str, span: TextSpan) -> &str {
    &text[span.start as usize..span.end() as usize]
}

/// Apply the edits addressed to `path`; unchanged when there are none.
pub fn apply_to(text: &str, path: &str, changes: &[FileTextChanges]) -> String {
    let edits: Vec<_> = changes
        .iter()
        .filter(|c| c.file_name == path)
        .flat_map(|c| c.text_changes.iter().cloned())
        .collect();
    apply_text_changes(text, &edits).expect("edits overlap or are out of range")
}

/// A host holding the three-file rename project.
pub fn rename_host() -> AnalysisHost {
    let mut host = AnalysisHost::new();
    for (path, text) in super::source_fixtures::RENAME_PROJECT.iter() {
        host.set_file_content(path, text);
    }
    host
}
