//! TODO-style comment scan.

use serde::Serialize;

use crate::base::{FileId, is_whole_word_at};
use crate::error::AnalysisResult;
use crate::hir::Program;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TodoCommentDescriptor {
    pub text: String,
    pub priority: u32,
}

impl TodoCommentDescriptor {
    pub fn new(text: impl Into<String>, priority: u32) -> Self {
        Self {
            text: text.into(),
            priority,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TodoComment {
    pub descriptor: TodoCommentDescriptor,
    /// From the descriptor to the end of the line, without a closing `*/`.
    pub message: String,
    /// Byte offset of the descriptor.
    pub position: u32,
}

/// Comment lines of `file` that start with one of `descriptors`.
///
/// Matching is case-insensitive and whole-word; the first matching
/// descriptor wins.
pub fn todo_comments(
    program: &Program,
    file: FileId,
    descriptors: &[TodoCommentDescriptor],
) -> AnalysisResult<Vec<TodoComment>> {
    let source = program.file(file)?;
    let mut found = Vec::new();
    if descriptors.is_empty() {
        return Ok(found);
    }
    let comments = source
        .syntax()
        .descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|token| token.kind().is_comment());
    for comment in comments {
        let base = u32::from(comment.text_range().start());
        let text = comment.text();
        let mut line_start = 0;
        for line in text.split('\n') {
            let body = line.trim_start_matches(|c: char| c == '/' || c == '*' || c.is_whitespace());
            let at = line_start + (line.len() - body.len());
            line_start += line.len() + 1;
            let Some(descriptor) = descriptors.iter().find(|d| starts_with_word(text, at, &d.text)) else {
                continue;
            };
            let message = body.trim_end();
            let message = message.strip_suffix("*/").unwrap_or(message).trim_end();
            found.push(TodoComment {
                descriptor: descriptor.clone(),
                message: message.to_string(),
                position: base + at as u32,
            });
        }
    }
    Ok(found)
}

fn starts_with_word(text: &str, at: usize, word: &str) -> bool {
    !word.is_empty()
        && text
            .get(at..at + word.len())
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(word))
        && is_whole_word_at(text, at, word)
}
