//! Foundation types for the analysis core.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`FileId`] - Dense per-program file identifiers
//! - [`TextSpan`], [`TextRange`], [`TextSize`] - Source spans (UTF-8 byte offsets)
//! - [`LineIndex`] - Offset to line/character conversion
//! - [`Position`], [`Range`] - Zero-based line/character positions (UTF-16 columns)
//! - [`Severity`], [`DiagnosticCode`] - Diagnostic primitives shared by all producers
//! - Lexical path helpers used as lookup keys
//! - Identifier text helpers (word characters, edit distance)
//!
//! This module has NO dependencies on other crate modules.

mod diagnostic;
mod file_id;
mod path;
mod position;
mod span;
mod text_utils;

pub use diagnostic::{DiagnosticCode, DiagnosticMessage, DiagnosticTag, Severity};
pub use file_id::FileId;
pub use path::{file_name, is_relative_specifier, join_path, normalize_path, parent_dir};
pub use position::{Position, Range};
pub use span::{LineIndex, TextSpan};
pub use text_utils::{find_closest, is_whole_word_at, is_word_character, levenshtein};

// Re-export text-size types for convenience
pub use text_size::{self, TextRange, TextSize};
