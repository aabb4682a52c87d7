//! Refactor registry: syntactic rewrites keyed by kind.
//!
//! Applicability is a conservative syntactic test at the requested span. A
//! provider that does not apply contributes nothing; so does an unknown kind.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::base::{FileId, TextRange, TextSize};
use crate::error::AnalysisResult;
use crate::hir::{Binder, Program, SourceFile};
use crate::ide::position::touching;
use crate::ide::text_edit::{FileTextChanges, FormatCodeOptions, TextChange};
use crate::parser::ast::{self, AstNode};
use crate::parser::{SyntaxElement, SyntaxKind, SyntaxNode};

pub const OPTIONAL_CHAIN: &str = "refactor.rewrite.optionalChain";
pub const EXPORT_NAMED: &str = "refactor.rewrite.export.named";
pub const FUNCTION_NAMED: &str = "refactor.rewrite.function.named";

/// An applicable refactor with its edits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactorActionInfo {
    pub kind: &'static str,
    pub description: String,
    pub changes: Vec<FileTextChanges>,
}

/// A refactor request after its file and span were validated.
pub struct RefactorContext<'a, 'p> {
    pub binder: &'a Binder<'p>,
    pub source: &'p SourceFile,
    pub range: TextRange,
    pub options: &'a FormatCodeOptions,
}

impl<'p> RefactorContext<'_, 'p> {
    pub fn program(&self) -> &'p Program {
        self.binder.program()
    }

    /// Innermost node covering the requested span.
    ///
    /// For a caret, the token starting at it wins over the one ending there.
    pub fn covering_node(&self) -> Option<SyntaxNode> {
        let root = self.source.syntax();
        if self.range.is_empty() {
            let offset = self.range.start();
            let token = touching(&root, offset, false).or_else(|| touching(&root, offset, true))?;
            return token.parent();
        }
        match root.covering_element(self.range) {
            SyntaxElement::Node(node) => Some(node),
            SyntaxElement::Token(token) => token.parent(),
        }
    }

    fn single_file(&self, edits: Vec<TextChange>) -> Vec<FileTextChanges> {
        vec![FileTextChanges::new(self.source.path(), edits)]
    }
}

pub trait RefactorProvider: Send + Sync {
    fn kind(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Edits when the refactor applies, `None` otherwise.
    fn edits(&self, context: &RefactorContext<'_, '_>) -> Option<Vec<FileTextChanges>>;
}

/// Providers by kind, in registration order.
#[derive(Clone, Default)]
pub struct RefactorRegistry {
    providers: IndexMap<&'static str, Arc<dyn RefactorProvider>>,
}

impl std::fmt::Debug for RefactorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.providers.keys()).finish()
    }
}

impl RefactorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register(Arc::new(ConvertToOptionalChain))
            .register(Arc::new(ConvertToNamedExport))
            .register(Arc::new(ConvertToNamedFunction));
        registry
    }

    pub fn register(&mut self, provider: Arc<dyn RefactorProvider>) -> &mut Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.providers.keys().copied()
    }

    /// Refactors applicable at `start..end` of `file`, restricted to `kind` when given.
    pub fn get_applicable_refactors(
        &self,
        binder: &Binder<'_>,
        file: FileId,
        start: u32,
        end: u32,
        kind: Option<&str>,
        options: &FormatCodeOptions,
    ) -> AnalysisResult<Vec<RefactorActionInfo>> {
        let source = binder.program().file(file)?;
        let start = source.check_offset(start)?;
        let end = source.check_offset(end)?;
        let context = RefactorContext {
            binder,
            source,
            range: TextRange::new(start.min(end), start.max(end)),
            options,
        };
        let selected: Vec<&Arc<dyn RefactorProvider>> = match kind {
            Some(kind) => self.providers.get(kind).into_iter().collect(),
            None => self.providers.values().collect(),
        };
        let actions: Vec<RefactorActionInfo> = selected
            .into_iter()
            .filter_map(|provider| {
                let changes = provider.edits(&context)?;
                Some(RefactorActionInfo {
                    kind: provider.kind(),
                    description: provider.description().to_string(),
                    changes,
                })
            })
            .collect();
        debug!(%file, ?kind, count = actions.len(), "applicable refactors");
        Ok(actions)
    }
}

// ============================================================================
// a && a.b && a.b()  →  a?.b?.()
// ============================================================================

pub struct ConvertToOptionalChain;

fn is_and_chain(node: &SyntaxNode) -> bool {
    ast::BinaryExpr::cast(node.clone()).is_some_and(|b| b.op_kind() == Some(SyntaxKind::AMP_AMP))
}

impl RefactorProvider for ConvertToOptionalChain {
    fn kind(&self) -> &'static str {
        OPTIONAL_CHAIN
    }

    fn description(&self) -> &'static str {
        "Convert to optional chain expression"
    }

    fn edits(&self, context: &RefactorContext<'_, '_>) -> Option<Vec<FileTextChanges>> {
        let mut chain = context.covering_node()?.ancestors().find(is_and_chain)?;
        while let Some(parent) = chain.parent().filter(is_and_chain) {
            chain = parent;
        }

        let mut operands = Vec::new();
        let mut current = chain.clone();
        loop {
            let binary = ast::BinaryExpr::cast(current)?;
            operands.push(binary.rhs()?);
            let lhs = binary.lhs()?;
            if is_and_chain(&lhs) {
                current = lhs;
            } else {
                operands.push(lhs);
                break;
            }
        }
        operands.reverse();

        let texts: Vec<String> = operands.iter().map(|n| n.text().to_string()).collect();
        let extends_previous = operands.iter().zip(&texts).skip(1).zip(&texts).all(|((node, text), prev)| {
            matches!(
                node.kind(),
                SyntaxKind::MEMBER_EXPR | SyntaxKind::CALL_EXPR | SyntaxKind::INDEX_EXPR
            ) && text.len() > prev.len()
                && text.starts_with(prev.as_str())
                && text[prev.len()..].starts_with(['.', '(', '['])
        });
        if !extends_previous {
            return None;
        }

        let last = texts.last()?;
        let mut rewritten = String::with_capacity(last.len() + 2 * texts.len());
        let mut cursor = 0;
        for prefix in &texts[..texts.len() - 1] {
            let at = prefix.len();
            rewritten.push_str(&last[cursor..at]);
            rewritten.push_str("?.");
            cursor = if last[at..].starts_with('.') { at + 1 } else { at };
        }
        rewritten.push_str(&last[cursor..]);
        Some(context.single_file(vec![TextChange::replace(chain.text_range(), rewritten)]))
    }
}

// ============================================================================
// export default → export
// ============================================================================

pub struct ConvertToNamedExport;

impl RefactorProvider for ConvertToNamedExport {
    fn kind(&self) -> &'static str {
        EXPORT_NAMED
    }

    fn description(&self) -> &'static str {
        "Convert default export to named export"
    }

    fn edits(&self, context: &RefactorContext<'_, '_>) -> Option<Vec<FileTextChanges>> {
        let node = context.covering_node()?;
        let (name, edit) = if let Some(decl) = node
            .ancestors()
            .find_map(ast::Declaration::cast)
            .filter(ast::Declaration::is_default_export)
        {
            let name = decl.name()?;
            // only from the declaration head, not its body
            if context.range.start() > name.syntax().text_range().end() {
                return None;
            }
            let default_kw = decl.modifiers()?.token(SyntaxKind::DEFAULT_KW)?;
            let mut end = default_kw.text_range().end();
            let mut next = default_kw.next_token();
            while let Some(token) = next.filter(|t| t.kind() == SyntaxKind::WHITESPACE) {
                end = token.text_range().end();
                next = token.next_token();
            }
            (name.text(), TextChange::delete(TextRange::new(default_kw.text_range().start(), end)))
        } else {
            let export = node.ancestors().find_map(ast::ExportDefault::cast)?;
            let name = ast::NameRef::cast(export.expr()?)?.text();
            let text = format!("export {{ {name} }};");
            (name, TextChange::replace(export.syntax().text_range(), text))
        };

        let mut changes = context.single_file(vec![edit]);
        let program = context.program();
        let module = context.source.id();
        for importer in program.importers(module) {
            let Ok(source) = program.file(importer) else {
                continue;
            };
            let edits = importer_edits(program, source, module, &name, context.options);
            if !edits.is_empty() {
                changes.push(FileTextChanges::new(source.path(), edits));
            }
        }
        Some(changes)
    }
}

/// Rewrite default imports and `default` re-exports of `module` in `source` to use `name`.
fn importer_edits(
    program: &Program,
    source: &SourceFile,
    module: FileId,
    name: &str,
    options: &FormatCodeOptions,
) -> Vec<TextChange> {
    let statements: Vec<TextRange> = program
        .imports(source.id())
        .iter()
        .filter(|edge| edge.target == Some(module))
        .map(|edge| edge.statement)
        .collect();
    let mut edits = Vec::new();
    for node in source.syntax().descendants() {
        if !statements.contains(&node.text_range()) {
            continue;
        }
        if let Some(import) = ast::ImportDecl::cast(node.clone()) {
            edits.extend(default_import_edits(&import, name, options));
        } else if let Some(export) = ast::ExportNamed::cast(node) {
            for spec in export.specifiers() {
                let Some(name_ref) = spec.name_ref().filter(|n| n.text() == "default") else {
                    continue;
                };
                let text = match spec.alias() {
                    Some(_) => name.to_string(),
                    None => format!("{name} as default"),
                };
                edits.push(TextChange::replace(name_ref.syntax().text_range(), text));
            }
        }
    }
    edits
}

fn default_import_edits(import: &ast::ImportDecl, name: &str, options: &FormatCodeOptions) -> Vec<TextChange> {
    let Some(local) = import.default_import() else {
        return Vec::new();
    };
    let Some(default_node) = local.syntax().parent() else {
        return Vec::new();
    };
    let local = local.text();
    let specifier = if local == name {
        local
    } else {
        format!("{name} as {local}")
    };
    let default_range = default_node.text_range();

    if let Some(named) = import.named_imports() {
        let delete_to = TextRange::new(default_range.start(), named.text_range().start());
        return match import.specifiers().next() {
            Some(first) => vec![
                TextChange::delete(delete_to),
                TextChange::insert(first.syntax().text_range().start(), format!("{specifier}, ")),
            ],
            None => vec![TextChange::replace(
                delete_to.cover(named.text_range()),
                format!("{{ {specifier} }}"),
            )],
        };
    }
    let namespace = import
        .syntax()
        .children()
        .find(|n| n.kind() == SyntaxKind::NAMESPACE_IMPORT);
    if let Some(namespace) = namespace {
        // `import d, * as ns` cannot hold named bindings; split off a second import
        let module_text = import
            .module_specifier()
            .map(|m| m.syntax().text().to_string())
            .unwrap_or_default();
        let statement_start = import.syntax().text_range().start();
        return vec![
            TextChange::insert(
                statement_start,
                format!("import {{ {specifier} }} from {module_text};{}", options.new_line_character),
            ),
            TextChange::delete(TextRange::new(default_range.start(), namespace.text_range().start())),
        ];
    }
    vec![TextChange::replace(default_range, format!("{{ {specifier} }}"))]
}

// ============================================================================
// const f = () => ...  →  function f() { ... }
// ============================================================================

pub struct ConvertToNamedFunction;

const FUNCTION_LIKE: [SyntaxKind; 5] = [
    SyntaxKind::FUNCTION_DECL,
    SyntaxKind::FUNCTION_EXPR,
    SyntaxKind::ARROW_FUNCTION,
    SyntaxKind::METHOD_DECL,
    SyntaxKind::CONSTRUCTOR_DECL,
];

impl RefactorProvider for ConvertToNamedFunction {
    fn kind(&self) -> &'static str {
        FUNCTION_NAMED
    }

    fn description(&self) -> &'static str {
        "Convert to named function"
    }

    fn edits(&self, context: &RefactorContext<'_, '_>) -> Option<Vec<FileTextChanges>> {
        let node = context.covering_node()?;
        let stmt = node.ancestors().find_map(ast::VariableStmt::cast)?;
        if stmt.keyword()?.kind() != SyntaxKind::CONST_KW {
            return None;
        }
        let mut declarators = stmt.declarators();
        let declarator = declarators.next()?;
        if declarators.next().is_some() || declarator.type_annotation().is_some() {
            return None;
        }
        let name = declarator.name()?;
        let arrow = ast::ArrowFunction::cast(declarator.initializer()?)?;
        let body = arrow.body()?;

        // caret on an arrow passed to a call, or inside the body
        let innermost_arrow = node
            .ancestors()
            .take_while(|n| n != stmt.syntax())
            .find(|n| n.kind() == SyntaxKind::ARROW_FUNCTION);
        if innermost_arrow.is_some_and(|inner| inner != *arrow.syntax()) {
            return None;
        }
        if context.range.start() >= body.text_range().start() {
            return None;
        }
        let depth = stmt
            .syntax()
            .ancestors()
            .filter(|n| FUNCTION_LIKE.contains(&n.kind()))
            .count();
        if depth >= 2 || comment_before(&body) || uses_lexical_this(&body) {
            return None;
        }

        let options = context.options;
        let base_indent = line_indent(context.source, stmt.syntax().text_range().start());
        let body_text = if body.kind() == SyntaxKind::BLOCK {
            body.text().to_string()
        } else {
            let nl = &options.new_line_character;
            format!(
                "{{{nl}{base_indent}{}return {};{nl}{base_indent}}}",
                options.indent(1),
                body.text()
            )
        };
        let params = arrow
            .param_list()
            .map(|p| p.syntax().text().to_string())
            .unwrap_or_default();
        let params = if params.starts_with('(') {
            params
        } else {
            format!("({params})")
        };
        let modifiers = stmt
            .syntax()
            .children()
            .find(|n| n.kind() == SyntaxKind::MODIFIERS)
            .map(|m| format!("{} ", m.text()))
            .unwrap_or_default();
        let async_kw = if arrow.is_async() { "async " } else { "" };
        let ret = arrow.ret_type().map(|r| r.text().to_string()).unwrap_or_default();
        let text = format!("{modifiers}{async_kw}function {}{params}{ret} {body_text}", name.text());
        Some(context.single_file(vec![TextChange::replace(stmt.syntax().text_range(), text)]))
    }
}

/// A comment between `=>` and the body.
fn comment_before(body: &SyntaxNode) -> bool {
    let mut token = body.first_token().and_then(|t| t.prev_token());
    while let Some(current) = token.filter(|t| t.kind().is_trivia()) {
        if current.kind().is_comment() {
            return true;
        }
        token = current.prev_token();
    }
    false
}

/// `this` that would change meaning once the arrow becomes a function.
fn uses_lexical_this(body: &SyntaxNode) -> bool {
    body.descendants()
        .filter(|n| n.kind() == SyntaxKind::THIS_EXPR)
        .any(|this| {
            !this
                .ancestors()
                .take_while(|n| n != body)
                .any(|n| FUNCTION_LIKE.contains(&n.kind()) && n.kind() != SyntaxKind::ARROW_FUNCTION)
        })
}

fn line_indent(source: &SourceFile, offset: TextSize) -> String {
    let line = source.line_index().line_of(offset);
    source
        .line_index()
        .line_text(line)
        .map(|text| {
            text.chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect()
        })
        .unwrap_or_default()
}
