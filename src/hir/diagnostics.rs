//! Semantic checks.
//!
//! The checker walks one file at a time and reports what the binder could not
//! make sense of, plus two lint-style findings the code-fix registry acts on:
//! unused imports and `let` bindings that are never reassigned.
//!
//! Results are [`SemanticDiagnostic`]s: byte ranges plus a message template and
//! its arguments. Turning them into line/character diagnostics is the mapper's
//! job in `ide`.

use rustc_hash::FxHashSet;
use serde_json::{Value, json};
use smol_str::SmolStr;
use tracing::debug;

use crate::base::{DiagnosticMessage, DiagnosticTag, FileId, TextRange, find_closest};
use crate::hir::resolve::{Binder, is_lexical_position};
use crate::hir::scopes::LocalDeclId;
use crate::parser::ast::{self, AstNode};
use crate::parser::{SyntaxKind, SyntaxNode};

// ============================================================================
// MESSAGES
// ============================================================================

pub mod messages {
    use crate::base::{DiagnosticCode, DiagnosticMessage, Severity};

    pub const NO_DEFAULT_EXPORT: DiagnosticMessage =
        DiagnosticMessage::error(1192, "Module '{0}' has no default export.");
    pub const CANNOT_FIND_NAME: DiagnosticMessage =
        DiagnosticMessage::error(2304, "Cannot find name '{0}'.");
    pub const NO_EXPORTED_MEMBER: DiagnosticMessage =
        DiagnosticMessage::error(2305, "Module '{0}' has no exported member '{1}'.");
    pub const CANNOT_FIND_MODULE: DiagnosticMessage = DiagnosticMessage::error(
        2307,
        "Cannot find module '{0}' or its corresponding type declarations.",
    );
    pub const CANNOT_FIND_NAME_DID_YOU_MEAN: DiagnosticMessage =
        DiagnosticMessage::error(2552, "Cannot find name '{0}'. Did you mean '{1}'?");
    pub const DECLARED_BUT_NEVER_READ: DiagnosticMessage = DiagnosticMessage::new(
        DiagnosticCode::Int(6133),
        Severity::Hint,
        "'{0}' is declared but its value is never read.",
    );
    pub const ALL_IMPORTS_UNUSED: DiagnosticMessage = DiagnosticMessage::new(
        DiagnosticCode::Int(6192),
        Severity::Hint,
        "All imports in import declaration are unused.",
    );
    pub const PREFER_CONST: DiagnosticMessage = DiagnosticMessage::new(
        DiagnosticCode::Str("prefer-const"),
        Severity::Warning,
        "'{0}' is never reassigned. Use 'const' instead.",
    );
}

/// Names provided by the runtime rather than by any source file.
const AMBIENT_GLOBALS: &[&str] = &[
    // primitive and utility types
    "number", "string", "boolean", "void", "any", "unknown", "never", "object", "bigint",
    "symbol", "int", "long", "short", "byte", "float", "double", "char", "Record", "Partial",
    "Readonly", "ReadonlyArray", "Required", "Pick", "Omit",
    // runtime objects
    "console", "globalThis", "Math", "JSON", "Object", "Number", "String", "Boolean", "Array",
    "Map", "Set", "WeakMap", "WeakSet", "Error", "TypeError", "RangeError", "Promise", "Date",
    "RegExp", "Symbol", "BigInt", "Function", "Int8Array", "Uint8Array", "Int32Array",
    "Float64Array", "ArrayBuffer", "NaN", "Infinity", "isNaN", "parseInt", "parseFloat",
    "setTimeout", "clearTimeout", "setInterval", "clearInterval", "arguments",
];

// ============================================================================
// DIAGNOSTIC
// ============================================================================

/// A finding of the semantic checker, still in byte offsets.
#[derive(Clone, Debug, PartialEq)]
pub struct SemanticDiagnostic {
    pub file: FileId,
    pub range: TextRange,
    pub message: DiagnosticMessage,
    pub args: Vec<String>,
    pub tags: Vec<DiagnosticTag>,
    /// Structured payload for code fixes (`suggestion`, `replacement`).
    pub data: Option<Value>,
    pub related: Vec<RelatedSpan>,
}

/// A secondary location, such as the declaration a suggestion points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedSpan {
    pub file: FileId,
    pub range: TextRange,
    pub message: String,
}

impl SemanticDiagnostic {
    pub fn new(file: FileId, range: TextRange, message: DiagnosticMessage) -> Self {
        Self {
            file,
            range,
            message,
            args: Vec::new(),
            tags: Vec::new(),
            data: None,
            related: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tag(mut self, tag: DiagnosticTag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_related(mut self, related: RelatedSpan) -> Self {
        self.related.push(related);
        self
    }
}

// ============================================================================
// SEMANTIC CHECKER
// ============================================================================

/// Runs semantic checks with a shared binder.
pub struct SemanticChecker<'b, 'p> {
    binder: &'b Binder<'p>,
    diagnostics: Vec<SemanticDiagnostic>,
}

impl<'b, 'p> SemanticChecker<'b, 'p> {
    pub fn new(binder: &'b Binder<'p>) -> Self {
        Self {
            binder,
            diagnostics: Vec::new(),
        }
    }

    /// Unresolved modules of one file (the whole-program pass runs this per file).
    pub fn check_module_resolution(&mut self, file: FileId) {
        for edge in self.binder.program().imports(file) {
            if edge.target.is_none() {
                self.diagnostics.push(
                    SemanticDiagnostic::new(file, edge.range, messages::CANNOT_FIND_MODULE)
                        .with_args([edge.specifier.as_str()]),
                );
            }
        }
    }

    /// Name, import, and lint checks of one file.
    pub fn check_file(&mut self, file: FileId) {
        let Ok(source) = self.binder.program().file(file) else {
            return;
        };
        let root = source.syntax();
        let before = self.diagnostics.len();

        let mut used = FxHashSet::default();
        let mut written = FxHashSet::default();
        for node in root.descendants() {
            match node.kind() {
                SyntaxKind::NAME_REF => {
                    if let Some(local) = self.binder.resolve_local(file, &node) {
                        used.insert(local);
                    } else {
                        self.check_unresolved(file, &node);
                    }
                }
                SyntaxKind::BINARY_EXPR => {
                    let Some(binary) = ast::BinaryExpr::cast(node.clone()) else {
                        continue;
                    };
                    if binary.op_kind().is_some_and(SyntaxKind::is_assignment_op) {
                        self.record_write(file, binary.lhs(), &mut written);
                    }
                }
                SyntaxKind::PREFIX_EXPR | SyntaxKind::POSTFIX_EXPR => {
                    let updates = node
                        .children_with_tokens()
                        .filter_map(|e| e.into_token())
                        .any(|t| matches!(t.kind(), SyntaxKind::PLUS_PLUS | SyntaxKind::MINUS_MINUS));
                    if updates {
                        self.record_write(file, node.first_child(), &mut written);
                    }
                }
                _ => {}
            }
        }

        for import in root.children().filter_map(ast::ImportDecl::cast) {
            self.check_import(file, &import, &used);
        }
        for stmt in root.descendants().filter_map(ast::VariableStmt::cast) {
            self.check_prefer_const(file, &stmt, &written);
        }
        debug!(%file, count = self.diagnostics.len() - before, "semantic check");
    }

    pub fn finish(self) -> Vec<SemanticDiagnostic> {
        self.diagnostics
    }

    fn record_write(&self, file: FileId, target: Option<SyntaxNode>, written: &mut FxHashSet<LocalDeclId>) {
        let Some(target) = target.filter(|t| t.kind() == SyntaxKind::NAME_REF) else {
            return;
        };
        if let Some(local) = self.binder.resolve_local(file, &target) {
            written.insert(local);
        }
    }

    fn check_unresolved(&mut self, file: FileId, name_ref: &SyntaxNode) {
        if !is_lexical_position(name_ref)
            || name_ref.ancestors().any(|a| a.kind() == SyntaxKind::DECORATOR)
        {
            return;
        }
        let Some(name) = ast::NameRef::cast(name_ref.clone()).map(|n| n.text()) else {
            return;
        };
        if AMBIENT_GLOBALS.contains(&name.as_str())
            || self.binder.resolve_target(file, name_ref).is_some()
        {
            return;
        }

        let range = name_ref.text_range();
        let candidates = self.visible_names(file, range);
        let diagnostic = match find_closest(&name, &candidates) {
            Some(suggestion) => {
                let diagnostic = SemanticDiagnostic::new(file, range, messages::CANNOT_FIND_NAME_DID_YOU_MEAN)
                    .with_args([name.as_str(), suggestion])
                    .with_data(json!({ "suggestion": suggestion }));
                match self.declared_at(file, range, suggestion) {
                    Some(related) => diagnostic.with_related(related),
                    None => diagnostic,
                }
            }
            None => SemanticDiagnostic::new(file, range, messages::CANNOT_FIND_NAME).with_args([name]),
        };
        self.diagnostics.push(diagnostic);
    }

    /// Where a suggested name visible at `range` is declared in `file`.
    fn declared_at(&self, file: FileId, range: TextRange, name: &str) -> Option<RelatedSpan> {
        let scopes = self.binder.program().file(file).ok()?.scopes();
        let local = *scopes.lookup(scopes.scope_at(range.start()), name)?.first()?;
        Some(RelatedSpan {
            file,
            range: scopes.decl(local).name_range,
            message: format!("'{name}' is declared here."),
        })
    }

    /// Names in scope at `range`, innermost first, then implicit library exports.
    fn visible_names(&self, file: FileId, range: TextRange) -> Vec<SmolStr> {
        let program = self.binder.program();
        let Ok(source) = program.file(file) else {
            return Vec::new();
        };
        let scopes = source.scopes();
        let mut names = scopes.visible_names(scopes.scope_at(range.start()));
        for lib in program.implicit_libraries() {
            if let Ok(lib) = program.file(lib) {
                names.extend(lib.scopes().exports().map(|(name, _)| name.clone()));
            }
        }
        names.extend(AMBIENT_GLOBALS.iter().map(|name| SmolStr::new_static(name)));
        names
    }

    fn check_import(&mut self, file: FileId, import: &ast::ImportDecl, used: &FxHashSet<LocalDeclId>) {
        let program = self.binder.program();
        let Ok(source) = program.file(file) else {
            return;
        };
        let scopes = source.scopes();
        let specifier = import.module_specifier().and_then(|m| m.value()).unwrap_or_default();
        let target = program.resolve_module(file, &specifier);

        // (binding node range, local name, used)
        let mut bindings: Vec<(TextRange, String, bool)> = Vec::new();
        let mut binding = |name: &ast::Name, holder: TextRange| {
            let is_used = scopes
                .decl_at(name.syntax().text_range())
                .is_some_and(|local| used.contains(&local));
            bindings.push((holder, name.text(), is_used));
        };

        if let Some(name) = import.default_import() {
            let holder = name.syntax().parent().map_or(name.syntax().text_range(), |p| p.text_range());
            binding(&name, holder);
            let missing_default = target.is_some_and(|t| self.binder.module_export(t, "default").is_none());
            if missing_default {
                self.diagnostics.push(
                    SemanticDiagnostic::new(file, name.syntax().text_range(), messages::NO_DEFAULT_EXPORT)
                        .with_args([specifier.as_str()]),
                );
            }
        }
        if let Some(name) = import.namespace_import() {
            let holder = name.syntax().parent().map_or(name.syntax().text_range(), |p| p.text_range());
            binding(&name, holder);
        }
        for spec in import.specifiers() {
            let Some(local) = spec.local() else {
                continue;
            };
            binding(&local, spec.syntax().text_range());
            let (Some(target), Some(imported)) = (target, spec.imported_name()) else {
                continue;
            };
            if self.binder.module_export(target, &imported).is_none() {
                let range = spec
                    .imported()
                    .map_or(local.syntax().text_range(), |name_ref| name_ref.syntax().text_range());
                self.diagnostics.push(
                    SemanticDiagnostic::new(file, range, messages::NO_EXPORTED_MEMBER)
                        .with_args([specifier.as_str(), imported.as_str()]),
                );
            }
        }

        let unused: Vec<&(TextRange, String, bool)> = bindings.iter().filter(|(_, _, used)| !used).collect();
        let decl_range = import.syntax().text_range();
        match (unused.len(), bindings.len()) {
            (0, _) => {}
            (1, 1) => self.diagnostics.push(
                SemanticDiagnostic::new(file, decl_range, messages::DECLARED_BUT_NEVER_READ)
                    .with_args([unused[0].1.as_str()])
                    .with_tag(DiagnosticTag::Unnecessary),
            ),
            (n, total) if n == total => self.diagnostics.push(
                SemanticDiagnostic::new(file, decl_range, messages::ALL_IMPORTS_UNUSED)
                    .with_tag(DiagnosticTag::Unnecessary),
            ),
            _ => {
                for (range, name, _) in unused {
                    self.diagnostics.push(
                        SemanticDiagnostic::new(file, *range, messages::DECLARED_BUT_NEVER_READ)
                            .with_args([name.as_str()])
                            .with_tag(DiagnosticTag::Unnecessary),
                    );
                }
            }
        }
    }

    fn check_prefer_const(&mut self, file: FileId, stmt: &ast::VariableStmt, written: &FxHashSet<LocalDeclId>) {
        let Some(keyword) = stmt.keyword().filter(|k| k.kind() == SyntaxKind::LET_KW) else {
            return;
        };
        let in_loop_header = stmt
            .syntax()
            .parent()
            .is_some_and(|p| matches!(p.kind(), SyntaxKind::FOR_STMT | SyntaxKind::FOR_OF_STMT));
        if in_loop_header {
            return;
        }
        let Ok(source) = self.binder.program().file(file) else {
            return;
        };
        let scopes = source.scopes();

        let mut first_name = None;
        for declarator in stmt.declarators() {
            let Some(name) = declarator.name() else {
                return;
            };
            if declarator.initializer().is_none() {
                return;
            }
            let is_written = scopes
                .decl_at(name.syntax().text_range())
                .is_none_or(|local| written.contains(&local));
            if is_written {
                return;
            }
            first_name.get_or_insert_with(|| name.text());
        }
        let Some(name) = first_name else {
            return;
        };
        self.diagnostics.push(
            SemanticDiagnostic::new(file, keyword.text_range(), messages::PREFER_CONST)
                .with_args([name])
                .with_data(json!({ "replacement": "const" })),
        );
    }
}
