//! # ets-analysis
//!
//! Language-service analysis core for a statically typed, ES-like language:
//! position lookups, declaration binding, references and rename, diagnostics,
//! code fixes and refactors over an immutable program snapshot.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → query entry points (position, references, rename, fixes)
//!   ↓
//! hir       → Program snapshot, scopes, module resolution, binder, checker
//!   ↓
//! project   → project configuration (paths, baseUrl, extends, interop)
//!   ↓
//! parser    → Logos lexer, recursive-descent parser, rowan CST, typed AST
//!   ↓
//! base      → Primitives (FileId, TextSpan, LineIndex, Position)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → project → hir → ide)
// ============================================================================

/// Foundation types: FileId, TextSpan, LineIndex, diagnostic primitives
pub mod base;

/// Errors for invalid query input
pub mod error;

/// Parser: Logos lexer, recursive-descent parser, rowan syntax tree
pub mod parser;

/// Project configuration loading
pub mod project;

/// High-level IR: program snapshot and declaration binder
pub mod hir;

/// IDE features: position index, references, rename, diagnostics, fixes
pub mod ide;

// Re-export foundation types
pub use base::{FileId, LineIndex, Position, Range, TextRange, TextSize, TextSpan};
pub use error::{AnalysisError, AnalysisResult};
pub use ide::{Analysis, AnalysisHost};
