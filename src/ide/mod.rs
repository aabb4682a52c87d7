//! IDE features: high-level query APIs for language-server handlers.
//!
//! This module sits between the semantic model (HIR) and the transport
//! layer. Each function answers one editor request.
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: data in, data out; nothing is cached across calls
//! 2. **No LSP types**: results are our own serializable types
//! 3. **Composable**: built on [`Program`](crate::hir::Program) and [`Binder`](crate::hir::Binder)
//!
//! ## Usage
//!
//! The recommended way to use this module is through `AnalysisHost`:
//!
//! ```ignore
//! use ets_analysis::ide::AnalysisHost;
//!
//! let mut host = AnalysisHost::new();
//! host.set_file_content("/p/main.ets", "let x = 1;\nx;");
//!
//! let analysis = host.analysis();
//! let file = analysis.file_id("/p/main.ets").unwrap();
//! let refs = analysis.find_references_at_position(file, 4, &[])?;
//! ```

mod analysis;
mod brace_matching;
mod cancellation;
mod code_fixes;
mod diagnostics;
mod goto;
mod position;
mod references;
mod refactors;
mod rename;
mod text_edit;
mod todo_comments;

pub use analysis::{Analysis, AnalysisHost};
pub use brace_matching::brace_matching;
pub use cancellation::{CancellationHost, CancellationToken};
pub use code_fixes::{
    CodeFixAction, CodeFixContext, CodeFixProvider, CodeFixRegistry, FIX_SPELLING, FixSpelling, PREFER_CONST,
    PreferConst, UNUSED_IDENTIFIER_DELETE, UnusedIdentifierDelete,
};
pub use diagnostics::{
    CodeDescription, Diagnostic, DiagnosticReferences, RelatedInformation, create_diagnostic_for_node,
    create_diagnostic_for_range, format_message, global_diagnostics, option_diagnostics,
    semantic_diagnostics, syntactic_diagnostics,
};
pub use goto::{GotoTarget, definition_at_position};
pub use position::{
    TokenInfo, current_token_value, name_or_dotted_name_span, preceding_token, span_of_enclosing_comment,
    touching_token,
};
pub use refactors::{
    ConvertToNamedExport, ConvertToNamedFunction, ConvertToOptionalChain, EXPORT_NAMED, FUNCTION_NAMED,
    OPTIONAL_CHAIN, RefactorActionInfo, RefactorContext, RefactorProvider, RefactorRegistry,
};
pub use references::{ReferenceInfo, ReferenceKind, find_references, find_references_at_position};
pub use rename::{
    RenameLocation, find_file_references, find_rename_locations, get_safe_delete_info, is_safe_to_delete,
};
pub use text_edit::{FileTextChanges, FormatCodeOptions, TextChange, apply_text_changes, merge_file_changes};
pub use todo_comments::{TodoComment, TodoCommentDescriptor, todo_comments};
