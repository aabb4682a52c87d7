//! High-level IR (HIR): the semantic model of a program snapshot.
//!
//! A [`Program`] is an immutable snapshot of every source file, parsed and
//! scope-collected, with its import graph resolved. The [`Binder`] answers
//! "what does this identifier denote" on top of it.
//!
//! ## Layers
//!
//! ```text
//! ProgramBuilder            ← INPUT: paths, texts, config
//!     │
//!     ▼
//! parse + FileScopes        ← per file, in parallel
//!     │
//!     ▼
//! Program                   ← file table, import edges, generation
//!     │
//!     ▼
//! Binder                    ← declarations, exports, members, overloads
//!     │
//!     ▼
//! SemanticChecker           ← semantic findings
//! ```

mod diagnostics;
mod module_resolver;
mod program;
mod resolve;
mod scopes;

pub use diagnostics::{RelatedSpan, SemanticChecker, SemanticDiagnostic, messages};
pub use program::{
    ImportEdge, LibraryInfo, NodeHandle, Program, ProgramBuilder, SourceFile,
};
pub use resolve::{Binder, DeclId, OverloadOracle, Target};
pub use scopes::{
    Arity, DeclKind, Declaration, ExportTarget, FileScopes, ImportBinding, ImportKind,
    LocalDeclId, ModuleRef, Scope, ScopeId, ScopeKind, TypeHint,
};
