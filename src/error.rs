//! Error type for invalid query input.
//!
//! Only caller bugs are errors. A query that simply has no answer returns
//! `None` or an empty list instead.

use thiserror::Error;

use crate::base::FileId;

/// Errors returned for invalid query input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Offset beyond the end of the file's text.
    #[error("offset {offset} is out of range for {file} (length {len})")]
    InvalidOffset { file: FileId, offset: u32, len: u32 },

    /// File id or path not part of the program.
    #[error("unknown file: {0}")]
    UnknownFile(String),

    /// A node handle created by a program that has since been replaced.
    #[error("stale node handle: created by generation {handle}, program is generation {program}")]
    StaleHandle { handle: u64, program: u64 },
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
