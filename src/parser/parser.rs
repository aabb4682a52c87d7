//! Recursive descent parser for ETS sources
//!
//! Builds a rowan GreenNode tree from tokens.
//! Supports error recovery and produces a lossless CST.
//!
//! Trivia is attached lazily: it is flushed into the tree right before the next
//! real token or the next node start, so every node's range begins at its first
//! real token and ends at its last one.

use super::errors::{SyntaxError, SyntaxErrorKind};
use super::grammar;
use super::lexer::{Lexer, Token};
use super::syntax_kind::SyntaxKind;
use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange, TextSize};

/// Parse result containing the green tree and any errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Get the root syntax node
    pub fn syntax(&self) -> super::SyntaxNode {
        super::SyntaxNode::new_root(self.green.clone())
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse ETS source code into a CST
pub fn parse(input: &str) -> Parse {
    let tokens: Vec<_> = Lexer::new(input).collect();
    let mut parser = Parser::new(&tokens);
    grammar::source_file(&mut parser);
    parser.finish()
}

/// The parser state
pub(crate) struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>]) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    /// Non-trivia tokens from the current position onwards.
    pub(crate) fn lookahead(&self) -> impl Iterator<Item = &Token<'a>> + '_ {
        self.tokens[self.pos..]
            .iter()
            .filter(|token| !token.kind.is_trivia())
    }

    fn nth_token(&self, n: usize) -> Option<&Token<'a>> {
        self.lookahead().nth(n)
    }

    /// Kind of the nth non-trivia token ahead. `ERROR` past the end.
    pub(crate) fn nth(&self, n: usize) -> SyntaxKind {
        self.nth_token(n).map(|t| t.kind).unwrap_or(SyntaxKind::ERROR)
    }

    pub(crate) fn nth_text(&self, n: usize) -> &str {
        self.nth_token(n).map(|t| t.text).unwrap_or("")
    }

    pub(crate) fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    pub(crate) fn current_text(&self) -> &str {
        self.nth_text(0)
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        !self.at_eof() && self.current() == kind
    }

    pub(crate) fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        !self.at_eof() && kinds.contains(&self.current())
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.nth_token(0).is_none()
    }

    /// Whether the trivia before the current token holds a line break.
    pub(crate) fn has_newline_before(&self) -> bool {
        self.tokens[self.pos..]
            .iter()
            .take_while(|token| token.kind.is_trivia())
            .any(|token| token.text.contains('\n'))
    }

    /// Whether the nth and (n+1)th non-trivia tokens touch with nothing in between.
    pub(crate) fn nth_adjacent(&self, n: usize) -> bool {
        match (self.nth_token(n), self.nth_token(n + 1)) {
            (Some(first), Some(second)) => {
                first.offset + TextSize::of(first.text) == second.offset
            }
            _ => false,
        }
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn flush_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            if !token.kind.is_trivia() {
                break;
            }
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    pub(crate) fn bump(&mut self) {
        self.flush_trivia();
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    /// Bump the current token under a different kind (contextual keywords used
    /// as identifiers become `IDENT`).
    pub(crate) fn bump_as(&mut self, kind: SyntaxKind) {
        self.flush_trivia();
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(kind.into(), token.text);
            self.pos += 1;
        }
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(SyntaxErrorKind::Expected(kind.text().unwrap_or("token")));
            false
        }
    }

    /// Statement terminator with automatic insertion before `}`, a line break,
    /// or the end of input.
    pub(crate) fn expect_semi(&mut self) {
        if self.eat(SyntaxKind::SEMICOLON) {
            return;
        }
        if self.at_eof() || self.at(SyntaxKind::R_BRACE) || self.has_newline_before() {
            return;
        }
        self.error(SyntaxErrorKind::Expected(";"));
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    pub(crate) fn error(&mut self, kind: SyntaxErrorKind) {
        let range = match self.nth_token(0) {
            Some(token) => TextRange::at(token.offset, TextSize::of(token.text)),
            None => {
                let end = self
                    .tokens
                    .last()
                    .map(|t| t.offset + TextSize::of(t.text))
                    .unwrap_or_default();
                TextRange::empty(end)
            }
        };
        self.errors.push(SyntaxError::new(kind, range));
    }

    /// Report an error and wrap the current token in an `ERROR` node.
    pub(crate) fn err_and_bump(&mut self, kind: SyntaxErrorKind) {
        self.error(kind);
        if !self.at_eof() {
            self.start_node(SyntaxKind::ERROR);
            self.bump();
            self.finish_node();
        }
    }

    /// Report an error, then skip tokens until one of `recovery` (always
    /// consuming at least one token when not at the end).
    pub(crate) fn err_recover(&mut self, kind: SyntaxErrorKind, recovery: &[SyntaxKind]) {
        self.error(kind);
        if self.at_eof() {
            return;
        }
        self.start_node(SyntaxKind::ERROR);
        let mut consumed = false;
        while !self.at_eof() && !(consumed && self.at_any(recovery)) {
            self.bump();
            consumed = true;
        }
        self.finish_node();
    }

    // =========================================================================
    // Node building helpers
    // =========================================================================

    /// Start the root node without flushing, so leading trivia belongs to it.
    pub(crate) fn start_root(&mut self) {
        self.builder.start_node(SyntaxKind::SOURCE_FILE.into());
    }

    /// Flush trailing trivia and close the root node.
    pub(crate) fn finish_root(&mut self) {
        self.flush_trivia();
        self.builder.finish_node();
    }

    pub(crate) fn start_node(&mut self, kind: SyntaxKind) {
        self.flush_trivia();
        self.builder.start_node(kind.into());
    }

    pub(crate) fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    pub(crate) fn checkpoint(&mut self) -> Checkpoint {
        self.flush_trivia();
        self.builder.checkpoint()
    }

    pub(crate) fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    /// Wrap everything built since `checkpoint` in a finished node of `kind`.
    pub(crate) fn wrap(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.start_node_at(checkpoint, kind);
        self.finish_node();
    }

    /// Raw position, used as a progress guard by loops.
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }
}
