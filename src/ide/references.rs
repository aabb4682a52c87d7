//! Find references implementation.
//!
//! A scan walks every candidate file in order. Files whose text mentions none
//! of the symbol's spellings are skipped without binding anything; in the
//! rest, each `NAME`/`NAME_REF` with a matching spelling is resolved and
//! compared with the target's identity.

use rustc_hash::FxHashSet;
use serde::Serialize;
use smol_str::SmolStr;
use tracing::debug;

use crate::base::{FileId, TextSpan, is_whole_word_at};
use crate::error::AnalysisResult;
use crate::hir::{Binder, DeclId, DeclKind};
use crate::ide::cancellation::CancellationToken;
use crate::ide::position::name_at;
use crate::parser::ast::{self, AstNode};
use crate::parser::{SyntaxKind, SyntaxNode};

/// How an occurrence uses the symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceKind {
    Read,
    Write,
    /// A declaring name: the declaration itself or an alias binding.
    Declaration,
}

/// A reference to a symbol.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceInfo {
    pub file_name: String,
    #[serde(skip)]
    pub file: FileId,
    pub span: TextSpan,
    /// Zero-based line of `span.start`.
    pub line: u32,
    pub kind: ReferenceKind,
    /// Whether this is the symbol's own declaration (not an alias).
    pub is_definition: bool,
}

impl ReferenceInfo {
    /// Key under which duplicate entries collapse.
    pub fn key(&self) -> (&str, u32, u32) {
        (&self.file_name, self.span.start, self.span.length)
    }
}

/// Every occurrence of `target` in `candidates`, files in the given order,
/// occurrences in source order. A cancelled scan returns nothing.
pub fn find_references(
    binder: &Binder<'_>,
    cancel: &CancellationToken,
    target: &DeclId,
    candidates: &[FileId],
) -> Vec<ReferenceInfo> {
    let symbol = binder.symbol(target);
    let Some(decl) = binder.declaration(&symbol) else {
        return Vec::new();
    };
    let spellings = spellings(binder, &symbol, &decl.name, candidates);
    let program = binder.program();

    let mut seen = FxHashSet::default();
    let mut references = Vec::new();
    for &file in candidates {
        if cancel.throttled_cancellation_check() {
            debug!(%file, "reference scan cancelled");
            return Vec::new();
        }
        let Ok(source) = program.file(file) else {
            continue;
        };
        if !spellings.iter().any(|name| mentions(source.text(), name)) {
            continue;
        }
        for node in source.syntax().descendants() {
            let Some(text) = name_text(&node) else {
                continue;
            };
            if !spellings.contains(text.as_str()) {
                continue;
            }
            let Some(found) = binder.resolve(file, &node) else {
                continue;
            };
            if binder.symbol(&found) != symbol {
                continue;
            }
            let range = node.text_range();
            if !seen.insert((file, range)) {
                continue;
            }
            let is_definition = node.kind() == SyntaxKind::NAME
                && found.file == file
                && found.name_range == range
                && found.kind != DeclKind::ImportBinding;
            references.push(ReferenceInfo {
                file_name: source.path().to_string(),
                file,
                span: range.into(),
                line: source.line_index().line_of(range.start()),
                kind: reference_kind(&node),
                is_definition,
            });
        }
    }
    debug!(target = %decl.name, count = references.len(), "find references");
    references
}

/// References to whatever the identifier at `offset` denotes.
pub fn find_references_at_position(
    binder: &Binder<'_>,
    cancel: &CancellationToken,
    file: FileId,
    offset: u32,
    candidates: &[FileId],
) -> AnalysisResult<Vec<ReferenceInfo>> {
    let source = binder.program().file(file)?;
    let offset = source.check_offset(offset)?;
    let target = name_at(&source.syntax(), offset).and_then(|name| binder.resolve(file, &name));
    Ok(target
        .map(|target| find_references(binder, cancel, &target, candidates))
        .unwrap_or_default())
}

/// The symbol's own name plus every alias some candidate file binds it to.
fn spellings(binder: &Binder<'_>, symbol: &DeclId, name: &str, candidates: &[FileId]) -> FxHashSet<SmolStr> {
    let mut names = FxHashSet::default();
    names.insert(SmolStr::new(name));
    for &file in candidates {
        let Ok(source) = binder.program().file(file) else {
            continue;
        };
        let root = source.syntax();
        let aliases = root
            .descendants()
            .filter(|n| {
                matches!(
                    n.kind(),
                    SyntaxKind::IMPORT_SPECIFIER
                        | SyntaxKind::EXPORT_SPECIFIER
                        | SyntaxKind::DEFAULT_IMPORT
                )
            })
            .filter_map(|n| n.children().find_map(ast::Name::cast));
        for alias in aliases {
            let alias_name = alias.text();
            if names.contains(alias_name.as_str()) {
                continue;
            }
            let same = binder
                .resolve(file, alias.syntax())
                .is_some_and(|found| binder.symbol(&found) == *symbol);
            if same {
                names.insert(SmolStr::new(alias_name));
            }
        }
    }
    names
}

fn mentions(text: &str, name: &str) -> bool {
    text.match_indices(name).any(|(at, _)| is_whole_word_at(text, at, name))
}

fn name_text(node: &SyntaxNode) -> Option<String> {
    match node.kind() {
        SyntaxKind::NAME => ast::Name::cast(node.clone()).map(|n| n.text()),
        SyntaxKind::NAME_REF => ast::NameRef::cast(node.clone()).map(|n| n.text()),
        _ => None,
    }
}

/// Read, write, or declaration.
fn reference_kind(node: &SyntaxNode) -> ReferenceKind {
    if node.kind() == SyntaxKind::NAME {
        return ReferenceKind::Declaration;
    }
    let Some(parent) = node.parent() else {
        return ReferenceKind::Read;
    };
    let is_first = parent
        .first_child()
        .is_some_and(|first| first.text_range() == node.text_range());
    let written = match parent.kind() {
        SyntaxKind::BINARY_EXPR => {
            is_first
                && ast::BinaryExpr::cast(parent.clone())
                    .and_then(|b| b.op_kind())
                    .is_some_and(SyntaxKind::is_assignment_op)
        }
        SyntaxKind::PREFIX_EXPR | SyntaxKind::POSTFIX_EXPR => parent
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .any(|t| matches!(t.kind(), SyntaxKind::PLUS_PLUS | SyntaxKind::MINUS_MINUS)),
        _ => false,
    };
    if written {
        ReferenceKind::Write
    } else {
        ReferenceKind::Read
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::{Program, ProgramBuilder};

    fn program(files: &[(&str, &str)]) -> Program {
        let mut builder = ProgramBuilder::new();
        for (path, text) in files {
            builder.add_file(path, *text);
        }
        builder.build()
    }

    fn all_files(program: &Program) -> Vec<FileId> {
        program.files().map(|f| f.id()).collect()
    }

    fn spans(refs: &[ReferenceInfo]) -> Vec<(String, u32, ReferenceKind)> {
        refs.iter()
            .map(|r| (r.file_name.clone(), r.span.start, r.kind))
            .collect()
    }

    #[test]
    fn test_local_read_write() {
        let text = "let n = 1;\nn = n + 1;\nn++;\nfunction g(n: number) { return n; }";
        let program = program(&[("/a.ets", text)]);
        let binder = Binder::new(&program);
        let refs = find_references_at_position(&binder, &CancellationToken::none(), FileId::new(0), 4, &[FileId::new(0)])
            .unwrap();
        assert_eq!(
            spans(&refs),
            vec![
                ("/a.ets".to_string(), 4, ReferenceKind::Declaration),
                ("/a.ets".to_string(), 11, ReferenceKind::Write),
                ("/a.ets".to_string(), 15, ReferenceKind::Read),
                ("/a.ets".to_string(), 22, ReferenceKind::Write),
            ]
        );
        assert!(refs[0].is_definition);
        assert_eq!(refs[3].line, 2);
    }

    #[test]
    fn test_aliases_across_files() {
        let program = program(&[
            ("/lib.ets", "export function run(): void {}"),
            ("/a.ets", "import { run as go } from \"./lib\";\ngo();"),
            ("/b.ets", "import { run } from \"./lib\";\nrun();\nconst walk = 1;"),
        ]);
        let binder = Binder::new(&program);
        let files = all_files(&program);
        let refs = find_references_at_position(&binder, &CancellationToken::none(), FileId::new(0), 16, &files)
            .unwrap();
        let found: Vec<(String, u32)> = refs.iter().map(|r| (r.file_name.clone(), r.span.start)).collect();
        assert_eq!(
            found,
            vec![
                ("/lib.ets".to_string(), 16),
                ("/a.ets".to_string(), 9),
                ("/a.ets".to_string(), 16),
                ("/a.ets".to_string(), 35),
                ("/b.ets".to_string(), 9),
                ("/b.ets".to_string(), 29),
            ]
        );

        // same set from a use site in another file
        let from_use = find_references_at_position(&binder, &CancellationToken::none(), FileId::new(2), 29, &files)
            .unwrap();
        assert_eq!(from_use, refs);
    }

    #[test]
    fn test_cancelled_scan_is_empty() {
        use std::sync::Arc;
        use std::sync::atomic::AtomicBool;
        use std::time::Duration;

        let program = program(&[("/a.ets", "let x = 1; x;")]);
        let binder = Binder::new(&program);
        let cancel = CancellationToken::new(Duration::ZERO, Some(Arc::new(AtomicBool::new(true))));
        let refs = find_references_at_position(&binder, &cancel, FileId::new(0), 4, &[FileId::new(0)]).unwrap();
        assert!(refs.is_empty());
    }

    #[test]
    fn test_member_references() {
        let text = "class A { m(): void {} }\nlet a = new A();\na.m();\nlet m = 2;\nm;";
        let program = program(&[("/a.ets", text)]);
        let binder = Binder::new(&program);
        let refs = find_references_at_position(&binder, &CancellationToken::none(), FileId::new(0), 10, &[FileId::new(0)])
            .unwrap();
        let starts: Vec<u32> = refs.iter().map(|r| r.span.start).collect();
        assert_eq!(starts, vec![10, 44]);
    }
}
