//! Code-fix registry: providers keyed by diagnostic code.
//!
//! A provider turns one diagnostic into zero or more [`CodeFixAction`]s. The
//! registry is built once per host and handed to queries by reference; each
//! provider is also reachable by its fix id for "fix all in program".

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::base::{DiagnosticCode, FileId, TextRange, TextSize, TextSpan};
use crate::error::AnalysisResult;
use crate::hir::{Binder, SourceFile};
use crate::ide::diagnostics::{Diagnostic, format_message, semantic_diagnostics};
use crate::ide::text_edit::{FileTextChanges, FormatCodeOptions, TextChange, merge_file_changes};
use crate::parser::ast::{self, AstNode};
use crate::parser::{SyntaxKind, SyntaxNode};

pub const FIX_SPELLING: &str = "fixSpelling";
pub const UNUSED_IDENTIFIER_DELETE: &str = "unusedIdentifier_delete";
pub const PREFER_CONST: &str = "preferConst";

/// One proposed fix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFixAction {
    pub fix_name: &'static str,
    pub description: String,
    pub changes: Vec<FileTextChanges>,
    /// Id accepted by [`CodeFixRegistry::get_combined_code_fix`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_id: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_all_description: Option<&'static str>,
}

impl CodeFixAction {
    pub fn new(fix_name: &'static str, description: String, changes: Vec<FileTextChanges>) -> Self {
        Self {
            fix_name,
            description,
            changes,
            fix_id: None,
            fix_all_description: None,
        }
    }
}

/// What a provider sees for one triggering diagnostic.
pub struct CodeFixContext<'a> {
    pub source: &'a SourceFile,
    pub diagnostic: &'a Diagnostic,
    pub options: &'a FormatCodeOptions,
}

impl CodeFixContext<'_> {
    /// String field of the diagnostic's structured data.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.diagnostic.data.as_ref()?.get(key).and_then(Value::as_str)
    }
}

pub trait CodeFixProvider: Send + Sync {
    fn fix_id(&self) -> &'static str;

    fn error_codes(&self) -> &'static [DiagnosticCode];

    fn fix_all_description(&self) -> &'static str;

    fn code_actions(&self, context: &CodeFixContext<'_>) -> Vec<CodeFixAction>;

    /// Edits that fix every one of `diagnostics`, all from `source`.
    ///
    /// The default concatenates the edits of each diagnostic's first action.
    fn fix_all_in_file(
        &self,
        source: &SourceFile,
        diagnostics: &[&Diagnostic],
        options: &FormatCodeOptions,
    ) -> Vec<TextChange> {
        diagnostics
            .iter()
            .filter_map(|diagnostic| {
                let context = CodeFixContext {
                    source,
                    diagnostic,
                    options,
                };
                self.code_actions(&context).into_iter().next()
            })
            .flat_map(|action| action.changes)
            .filter(|changes| changes.file_name == source.path())
            .flat_map(|changes| changes.text_changes)
            .collect()
    }
}

/// Providers by diagnostic code and by fix id.
#[derive(Clone, Default)]
pub struct CodeFixRegistry {
    providers: Vec<Arc<dyn CodeFixProvider>>,
    by_code: FxHashMap<DiagnosticCode, Vec<usize>>,
    by_fix_id: FxHashMap<&'static str, usize>,
}

impl std::fmt::Debug for CodeFixRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeFixRegistry")
            .field("fix_ids", &self.fix_ids().collect::<Vec<_>>())
            .finish()
    }
}

impl CodeFixRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spelling, unused-import and prefer-const fixes.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register(Arc::new(FixSpelling))
            .register(Arc::new(UnusedIdentifierDelete))
            .register(Arc::new(PreferConst));
        registry
    }

    /// Add `provider`; a later provider with the same fix id replaces the earlier one's id entry.
    pub fn register(&mut self, provider: Arc<dyn CodeFixProvider>) -> &mut Self {
        let index = self.providers.len();
        for &code in provider.error_codes() {
            self.by_code.entry(code).or_default().push(index);
        }
        self.by_fix_id.insert(provider.fix_id(), index);
        self.providers.push(provider);
        self
    }

    pub fn fix_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.providers.iter().map(|p| p.fix_id())
    }

    pub fn supported_codes(&self) -> impl Iterator<Item = DiagnosticCode> + '_ {
        self.by_code.keys().copied()
    }

    fn providers_for(&self, code: DiagnosticCode) -> impl Iterator<Item = &Arc<dyn CodeFixProvider>> {
        self.by_code
            .get(&code)
            .into_iter()
            .flatten()
            .filter_map(|&index| self.providers.get(index))
    }

    /// Fixes for diagnostics of `file` with one of `error_codes` that touch `start..end`.
    ///
    /// Unknown codes contribute nothing.
    pub fn get_code_fixes_at_position(
        &self,
        binder: &Binder<'_>,
        file: FileId,
        start: u32,
        end: u32,
        error_codes: &[DiagnosticCode],
        options: &FormatCodeOptions,
    ) -> AnalysisResult<Vec<CodeFixAction>> {
        let source = binder.program().file(file)?;
        let start = u32::from(source.check_offset(start)?);
        let end = u32::from(source.check_offset(end)?);
        let span = TextSpan::from_bounds(start.min(end), start.max(end));

        let mut actions = Vec::new();
        if !error_codes.iter().any(|code| self.by_code.contains_key(code)) {
            return Ok(actions);
        }
        let diagnostics = semantic_diagnostics(binder, file)?;
        let triggering = diagnostics
            .iter()
            .filter(|d| error_codes.contains(&d.code) && d.span.intersects(span));
        for diagnostic in triggering {
            let context = CodeFixContext {
                source,
                diagnostic,
                options,
            };
            for provider in self.providers_for(diagnostic.code) {
                actions.extend(provider.code_actions(&context).into_iter().map(|mut action| {
                    action.fix_id = Some(provider.fix_id());
                    action.fix_all_description = Some(provider.fix_all_description());
                    action
                }));
            }
        }
        debug!(%file, count = actions.len(), "code fixes");
        Ok(actions)
    }

    /// Every instance of `fix_id` across the program's own files, merged per file.
    ///
    /// `None` for an unknown fix id.
    pub fn get_combined_code_fix(
        &self,
        binder: &Binder<'_>,
        fix_id: &str,
        options: &FormatCodeOptions,
    ) -> Option<CodeFixAction> {
        let provider = self.by_fix_id.get(fix_id).and_then(|&index| self.providers.get(index))?;
        let codes = provider.error_codes();
        let program = binder.program();
        let mut batches = Vec::new();
        for source in program.files().filter(|f| f.library().is_none()) {
            let Ok(diagnostics) = semantic_diagnostics(binder, source.id()) else {
                continue;
            };
            let matching: Vec<&Diagnostic> = diagnostics.iter().filter(|d| codes.contains(&d.code)).collect();
            if matching.is_empty() {
                continue;
            }
            let edits = provider.fix_all_in_file(source, &matching, options);
            batches.push(FileTextChanges::new(source.path(), edits));
        }
        let changes = merge_file_changes(batches);
        debug!(fix_id, files = changes.len(), "combined code fix");
        Some(CodeFixAction {
            fix_name: provider.fix_id(),
            description: provider.fix_all_description().to_string(),
            changes,
            fix_id: Some(provider.fix_id()),
            fix_all_description: Some(provider.fix_all_description()),
        })
    }
}

// ============================================================================
// Providers
// ============================================================================

/// Replace an unresolved name with the suggestion carried on its diagnostic.
pub struct FixSpelling;

impl CodeFixProvider for FixSpelling {
    fn fix_id(&self) -> &'static str {
        FIX_SPELLING
    }

    fn error_codes(&self) -> &'static [DiagnosticCode] {
        &[DiagnosticCode::Int(2304), DiagnosticCode::Int(2552)]
    }

    fn fix_all_description(&self) -> &'static str {
        "Fix all detected spelling errors"
    }

    fn code_actions(&self, context: &CodeFixContext<'_>) -> Vec<CodeFixAction> {
        let (description, edits) = match context.data_str("suggestion") {
            Some(suggestion) => (
                format_message("Change spelling to '{0}'", &[suggestion]),
                vec![TextChange::replace(context.diagnostic.span.to_range(), suggestion)],
            ),
            None => ("Change spelling".to_string(), Vec::new()),
        };
        vec![CodeFixAction::new(
            FIX_SPELLING,
            description,
            vec![FileTextChanges::new(context.source.path(), edits)],
        )]
    }
}

/// Rewrite a never-reassigned `let` as `const`.
pub struct PreferConst;

impl CodeFixProvider for PreferConst {
    fn fix_id(&self) -> &'static str {
        PREFER_CONST
    }

    fn error_codes(&self) -> &'static [DiagnosticCode] {
        &[DiagnosticCode::Str("prefer-const")]
    }

    fn fix_all_description(&self) -> &'static str {
        "Use 'const' for all never-reassigned variables"
    }

    fn code_actions(&self, context: &CodeFixContext<'_>) -> Vec<CodeFixAction> {
        let replacement = context.data_str("replacement").unwrap_or("const");
        vec![CodeFixAction::new(
            PREFER_CONST,
            format_message("Use '{0}' instead", &[replacement]),
            vec![FileTextChanges::new(
                context.source.path(),
                vec![TextChange::replace(context.diagnostic.span.to_range(), replacement)],
            )],
        )]
    }
}

/// Remove unused import bindings, or the whole import once none is left.
pub struct UnusedIdentifierDelete;

impl CodeFixProvider for UnusedIdentifierDelete {
    fn fix_id(&self) -> &'static str {
        UNUSED_IDENTIFIER_DELETE
    }

    fn error_codes(&self) -> &'static [DiagnosticCode] {
        &[DiagnosticCode::Int(6133), DiagnosticCode::Int(6192)]
    }

    fn fix_all_description(&self) -> &'static str {
        "Delete all unused declarations"
    }

    fn code_actions(&self, context: &CodeFixContext<'_>) -> Vec<CodeFixAction> {
        let range = context.diagnostic.span.to_range();
        let root = context.source.syntax();
        let Some(node) = unused_holder(&root, range) else {
            return Vec::new();
        };
        let description = match ast::ImportDecl::cast(node.clone()) {
            Some(import) => {
                let module = import.module_specifier().and_then(|m| m.value()).unwrap_or_default();
                format_message("Remove import from '{0}'", &[module])
            }
            None => {
                let name = node.descendants().find_map(ast::Name::cast).map(|n| n.text()).unwrap_or_default();
                format_message("Remove unused declaration for: '{0}'", &[name])
            }
        };
        let edits = unused_import_edits(context.source, &[range]);
        if edits.is_empty() {
            return Vec::new();
        }
        vec![CodeFixAction::new(
            UNUSED_IDENTIFIER_DELETE,
            description,
            vec![FileTextChanges::new(context.source.path(), edits)],
        )]
    }

    fn fix_all_in_file(
        &self,
        source: &SourceFile,
        diagnostics: &[&Diagnostic],
        _options: &FormatCodeOptions,
    ) -> Vec<TextChange> {
        let flagged: Vec<TextRange> = diagnostics.iter().map(|d| d.span.to_range()).collect();
        unused_import_edits(source, &flagged)
    }
}

fn unused_holder(root: &SyntaxNode, range: TextRange) -> Option<SyntaxNode> {
    root.descendants().find(|node| {
        node.text_range() == range
            && matches!(
                node.kind(),
                SyntaxKind::IMPORT_DECL
                    | SyntaxKind::IMPORT_SPECIFIER
                    | SyntaxKind::DEFAULT_IMPORT
                    | SyntaxKind::NAMESPACE_IMPORT
            )
    })
}

/// One edit per import declaration touched by `flagged`, so edits never overlap.
fn unused_import_edits(source: &SourceFile, flagged: &[TextRange]) -> Vec<TextChange> {
    let root = source.syntax();
    let mut by_import: IndexMap<TextRange, ast::ImportDecl> = IndexMap::new();
    for &range in flagged {
        let import = unused_holder(&root, range).and_then(|node| node.ancestors().find_map(ast::ImportDecl::cast));
        if let Some(import) = import {
            by_import.entry(import.syntax().text_range()).or_insert(import);
        }
    }
    by_import
        .values()
        .filter_map(|import| import_edit(source, import, flagged))
        .collect()
}

fn import_edit(source: &SourceFile, import: &ast::ImportDecl, flagged: &[TextRange]) -> Option<TextChange> {
    let is_flagged = |node: &SyntaxNode| flagged.contains(&node.text_range());
    let statement = import.syntax().text_range();
    let clause: Vec<SyntaxNode> = import
        .syntax()
        .children()
        .filter(|n| {
            matches!(
                n.kind(),
                SyntaxKind::DEFAULT_IMPORT | SyntaxKind::NAMESPACE_IMPORT | SyntaxKind::NAMED_IMPORTS
            )
        })
        .collect();
    let bindings: Vec<SyntaxNode> = clause
        .iter()
        .flat_map(|node| match node.kind() {
            SyntaxKind::NAMED_IMPORTS => node
                .children()
                .filter(|s| s.kind() == SyntaxKind::IMPORT_SPECIFIER)
                .collect(),
            _ => vec![node.clone()],
        })
        .collect();
    if flagged.contains(&statement) || bindings.iter().all(is_flagged) {
        return Some(TextChange::delete(with_line_end(source.text(), statement)));
    }

    let mut parts = Vec::new();
    for node in &clause {
        match node.kind() {
            SyntaxKind::NAMED_IMPORTS => {
                let kept: Vec<String> = node
                    .children()
                    .filter(|s| s.kind() == SyntaxKind::IMPORT_SPECIFIER && !is_flagged(s))
                    .map(|s| s.text().to_string())
                    .collect();
                if !kept.is_empty() {
                    parts.push(format!("{{ {} }}", kept.join(", ")));
                }
            }
            _ if !is_flagged(node) => parts.push(node.text().to_string()),
            _ => {}
        }
    }
    let first = clause.first()?.text_range();
    let last = clause.last()?.text_range();
    Some(TextChange::replace(first.cover(last), parts.join(", ")))
}

/// `range` plus trailing blanks and one line break, when the line ends there.
fn with_line_end(text: &str, range: TextRange) -> TextRange {
    let end = usize::from(range.end());
    let rest = text.get(end..).unwrap_or_default();
    let blanks = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    let after = &rest[blanks..];
    let newline = if after.starts_with("\r\n") {
        2
    } else if after.starts_with('\n') {
        1
    } else {
        return range;
    };
    let grown = u32::try_from(blanks + newline).unwrap_or(0);
    TextRange::new(range.start(), range.end() + TextSize::from(grown))
}
