//! Edit batches shared by code fixes and refactors.

use indexmap::IndexMap;
use serde::Serialize;

use crate::base::{TextRange, TextSize, TextSpan};

/// Replace `span` with `new_text`. Empty spans insert, empty text deletes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextChange {
    pub span: TextSpan,
    pub new_text: String,
}

impl TextChange {
    pub fn replace(range: TextRange, new_text: impl Into<String>) -> Self {
        Self {
            span: range.into(),
            new_text: new_text.into(),
        }
    }

    pub fn delete(range: TextRange) -> Self {
        Self::replace(range, String::new())
    }

    pub fn insert(offset: TextSize, text: impl Into<String>) -> Self {
        Self::replace(TextRange::empty(offset), text)
    }
}

/// Edits of one file. Spans never overlap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTextChanges {
    pub file_name: String,
    pub text_changes: Vec<TextChange>,
}

impl FileTextChanges {
    pub fn new(file_name: impl Into<String>, text_changes: Vec<TextChange>) -> Self {
        Self {
            file_name: file_name.into(),
            text_changes,
        }
    }
}

/// Group batches by file in first-seen order, concatenating their edits.
///
/// Conflicting edits are kept as they are.
pub fn merge_file_changes(batches: impl IntoIterator<Item = FileTextChanges>) -> Vec<FileTextChanges> {
    let mut merged: IndexMap<String, Vec<TextChange>> = IndexMap::new();
    for batch in batches {
        merged
            .entry(batch.file_name)
            .or_default()
            .extend(batch.text_changes);
    }
    merged
        .into_iter()
        .filter(|(_, changes)| !changes.is_empty())
        .map(|(file_name, text_changes)| FileTextChanges { file_name, text_changes })
        .collect()
}

/// Apply non-overlapping edits to `text`.
///
/// Returns `None` when two edits overlap or one falls outside `text`.
pub fn apply_text_changes(text: &str, changes: &[TextChange]) -> Option<String> {
    let mut sorted: Vec<&TextChange> = changes.iter().collect();
    sorted.sort_by_key(|change| (change.span.start, change.span.end()));
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for change in sorted {
        let start = change.span.start as usize;
        let end = change.span.end() as usize;
        if start < cursor {
            return None;
        }
        out.push_str(text.get(cursor..start)?);
        text.get(start..end)?;
        out.push_str(&change.new_text);
        cursor = end;
    }
    out.push_str(text.get(cursor..)?);
    Some(out)
}

/// Formatting preferences handed through to fix and refactor providers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatCodeOptions {
    pub new_line_character: String,
    pub indent_size: u32,
    pub convert_tabs_to_spaces: bool,
}

impl Default for FormatCodeOptions {
    fn default() -> Self {
        Self {
            new_line_character: "\n".to_string(),
            indent_size: 4,
            convert_tabs_to_spaces: true,
        }
    }
}

impl FormatCodeOptions {
    /// Whitespace for `level` indentation steps.
    pub fn indent(&self, level: usize) -> String {
        if self.convert_tabs_to_spaces {
            " ".repeat(self.indent_size as usize * level)
        } else {
            "\t".repeat(level)
        }
    }
}
