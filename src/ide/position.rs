//! Position index: from a byte offset to the token and node around it.
//!
//! Every lookup descends the CST with rowan's `token_at_offset`, which is a
//! tree search. Comment and dotted-name queries only look at the token found
//! that way and its ancestors.

use rowan::{NodeOrToken, TokenAtOffset};
use smol_str::SmolStr;

use crate::base::{FileId, TextSize, TextSpan};
use crate::error::AnalysisResult;
use crate::hir::{NodeHandle, Program};
use crate::parser::ast::unquote;
use crate::parser::{SyntaxKind, SyntaxNode, SyntaxToken};

/// A non-trivia token found by a position query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenInfo {
    /// Valid for as long as the program that produced it.
    pub handle: NodeHandle,
    pub kind: SyntaxKind,
    pub span: TextSpan,
    pub text: SmolStr,
}

impl TokenInfo {
    fn new(program: &Program, file: FileId, token: SyntaxToken) -> Self {
        Self {
            handle: program.handle(file, &NodeOrToken::Token(token.clone())),
            kind: token.kind(),
            span: token.text_range().into(),
            text: SmolStr::new(token.text()),
        }
    }
}

/// The token touching `offset`.
///
/// With `include_end`, a token ending exactly at `offset` wins over the one
/// starting there; without it, only `start <= offset < end` matches.
pub fn touching_token(
    program: &Program,
    file: FileId,
    offset: u32,
    include_end: bool,
) -> AnalysisResult<Option<TokenInfo>> {
    let source = program.file(file)?;
    let offset = source.check_offset(offset)?;
    Ok(touching(&source.syntax(), offset, include_end).map(|t| TokenInfo::new(program, file, t)))
}

/// The last non-trivia token ending at or before `offset`.
pub fn preceding_token(program: &Program, file: FileId, offset: u32) -> AnalysisResult<Option<TokenInfo>> {
    let source = program.file(file)?;
    let offset = source.check_offset(offset)?;
    Ok(preceding(&source.syntax(), offset).map(|t| TokenInfo::new(program, file, t)))
}

/// Span of the comment containing `offset`, or the empty span `(0, 0)`.
pub fn span_of_enclosing_comment(
    program: &Program,
    file: FileId,
    offset: u32,
    only_multi_line: bool,
) -> AnalysisResult<TextSpan> {
    let source = program.file(file)?;
    let offset = source.check_offset(offset)?;
    let comment = candidates(&source.syntax(), offset)
        .into_iter()
        .filter(|t| t.kind().is_comment())
        .find(|t| comment_contains(t, offset));
    let span = match comment {
        Some(token) if !only_multi_line || token.kind() == SyntaxKind::BLOCK_COMMENT => {
            TextSpan::from(token.text_range())
        }
        _ => TextSpan::default(),
    };
    Ok(span)
}

/// Span of the maximal dotted name (`a.b.c`, `ns.Type`) around the identifier at `offset`.
pub fn name_or_dotted_name_span(
    program: &Program,
    file: FileId,
    offset: u32,
) -> AnalysisResult<Option<TextSpan>> {
    let source = program.file(file)?;
    let offset = source.check_offset(offset)?;
    Ok(name_at(&source.syntax(), offset).map(|name| {
        let outer = name
            .ancestors()
            .skip(1)
            .take_while(|n| matches!(n.kind(), SyntaxKind::MEMBER_EXPR | SyntaxKind::QUALIFIED_NAME))
            .last()
            .unwrap_or(name);
        TextSpan::from(outer.text_range())
    }))
}

/// Text of the token at `offset` (end-inclusive), with string quotes removed.
pub fn current_token_value(program: &Program, file: FileId, offset: u32) -> AnalysisResult<Option<String>> {
    let source = program.file(file)?;
    let offset = source.check_offset(offset)?;
    Ok(touching(&source.syntax(), offset, true).map(|token| match token.kind() {
        SyntaxKind::STRING => unquote(token.text()).to_string(),
        _ => token.text().to_string(),
    }))
}

// ============================================================================
// Tree search
// ============================================================================

fn candidates(root: &SyntaxNode, offset: TextSize) -> Vec<SyntaxToken> {
    match root.token_at_offset(offset) {
        TokenAtOffset::None => Vec::new(),
        TokenAtOffset::Single(token) => vec![token],
        TokenAtOffset::Between(left, right) => vec![left, right],
    }
}

pub(crate) fn touching(root: &SyntaxNode, offset: TextSize, include_end: bool) -> Option<SyntaxToken> {
    let touches = |token: &SyntaxToken| {
        let range = token.text_range();
        range.start() <= offset && (offset < range.end() || (include_end && offset == range.end()))
    };
    let mut tokens = candidates(root, offset);
    if !include_end {
        tokens.reverse();
    }
    tokens
        .into_iter()
        .filter(|t| !t.kind().is_trivia())
        .find(touches)
}

pub(crate) fn preceding(root: &SyntaxNode, offset: TextSize) -> Option<SyntaxToken> {
    let mut token = root.token_at_offset(offset).left_biased()?;
    loop {
        if !token.kind().is_trivia() && token.text_range().end() <= offset {
            return Some(token);
        }
        token = token.prev_token()?;
    }
}

fn comment_contains(token: &SyntaxToken, offset: TextSize) -> bool {
    let range = token.text_range();
    let inside = range.start() < offset && offset < range.end();
    let at_open_end = token.kind() == SyntaxKind::LINE_COMMENT && offset == range.end();
    let unterminated_block =
        token.kind() == SyntaxKind::BLOCK_COMMENT && !token.text().ends_with("*/") && offset == range.end();
    inside || at_open_end || unterminated_block
}

/// The NAME or NAME_REF under `offset`, preferring the token starting there.
pub(crate) fn name_at(root: &SyntaxNode, offset: TextSize) -> Option<SyntaxNode> {
    touching(root, offset, false)
        .as_ref()
        .and_then(name_node)
        .or_else(|| touching(root, offset, true).as_ref().and_then(name_node))
}

/// The NAME or NAME_REF node owning an identifier token.
pub(crate) fn name_node(token: &SyntaxToken) -> Option<SyntaxNode> {
    let is_word = token.kind() == SyntaxKind::IDENT || token.kind().is_keyword();
    let parent = token.parent().filter(|_| is_word)?;
    matches!(parent.kind(), SyntaxKind::NAME | SyntaxKind::NAME_REF).then_some(parent)
}
