//! IDE feature tests
//!
//! Tests for:
//! - Position index and brace matching
//! - Rename, references and safe delete
//! - Diagnostics
//! - Code fixes and refactors
//! - TODO comments and cancellation

mod tests_brace_matching;
mod tests_cancellation;
mod tests_code_fixes;
mod tests_diagnostics;
mod tests_position;
mod tests_refactors;
mod tests_rename;
mod tests_todo_comments;
