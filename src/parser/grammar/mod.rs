//! Grammar rules for ETS sources
//!
//! Each submodule holds free functions over the shared [`Parser`]:
//! - `items` - imports, exports, and declarations (with modifiers)
//! - `statements` - statement dispatch and control flow
//! - `expressions` - precedence-climbing expression parser
//! - `types` - type annotations, type arguments, and type parameters
//!
//! Names are normalized on the way in: a keyword used in a name position is
//! bumped as `IDENT`, so every `NAME`/`NAME_REF` holds a single `IDENT` or
//! `STRING` token.

pub(crate) mod expressions;
pub(crate) mod items;
pub(crate) mod statements;
pub(crate) mod types;

use super::errors::SyntaxErrorKind;
use super::parser::Parser;
use super::syntax_kind::SyntaxKind;

/// Parse a whole file.
pub(crate) fn source_file(p: &mut Parser<'_>) {
    p.start_root();
    while !p.at_eof() {
        let before = p.pos();
        statements::statement(p);
        if p.pos() == before {
            p.err_and_bump(SyntaxErrorKind::DeclarationOrStatementExpected);
        }
    }
    p.finish_root();
}

/// Identifier or a keyword that is still usable as one in this position.
pub(crate) fn at_ident(p: &Parser<'_>) -> bool {
    at_ident_kind(p.current()) && !p.at_eof()
}

pub(crate) fn at_ident_kind(kind: SyntaxKind) -> bool {
    kind == SyntaxKind::IDENT || kind.is_contextual_keyword()
}

/// Property-like names accept every keyword plus string and numeric literals.
pub(crate) fn at_property_name(p: &Parser<'_>) -> bool {
    if p.at_eof() {
        return false;
    }
    let kind = p.current();
    kind == SyntaxKind::IDENT
        || kind.is_keyword()
        || kind == SyntaxKind::STRING
        || kind == SyntaxKind::NUMBER
}

/// Declaring name: `NAME(IDENT)`.
pub(crate) fn name(p: &mut Parser<'_>) -> bool {
    if at_ident(p) {
        p.start_node(SyntaxKind::NAME);
        p.bump_as(SyntaxKind::IDENT);
        p.finish_node();
        true
    } else {
        p.error(SyntaxErrorKind::IdentifierExpected);
        false
    }
}

/// Referencing name: `NAME_REF(IDENT)`.
pub(crate) fn name_ref(p: &mut Parser<'_>) -> bool {
    if at_ident(p) {
        p.start_node(SyntaxKind::NAME_REF);
        p.bump_as(SyntaxKind::IDENT);
        p.finish_node();
        true
    } else {
        p.error(SyntaxErrorKind::IdentifierExpected);
        false
    }
}

/// A member or property name wrapped in `kind` (`NAME` or `NAME_REF`).
pub(crate) fn property_name(p: &mut Parser<'_>, kind: SyntaxKind) -> bool {
    if !at_property_name(p) {
        p.error(SyntaxErrorKind::IdentifierExpected);
        return false;
    }
    p.start_node(kind);
    match p.current() {
        SyntaxKind::STRING | SyntaxKind::NUMBER => p.bump(),
        _ => p.bump_as(SyntaxKind::IDENT),
    }
    p.finish_node();
    true
}

/// `MODULE_SPECIFIER(STRING)`
pub(crate) fn module_specifier(p: &mut Parser<'_>) {
    if p.at(SyntaxKind::STRING) {
        p.start_node(SyntaxKind::MODULE_SPECIFIER);
        p.bump();
        p.finish_node();
    } else {
        p.error(SyntaxErrorKind::Expected("string literal"));
    }
}

/// Comma-separated list between `open` and `close`, one `element` per entry.
pub(crate) fn delimited(
    p: &mut Parser<'_>,
    open: SyntaxKind,
    close: SyntaxKind,
    mut element: impl FnMut(&mut Parser<'_>),
) {
    p.expect(open);
    while !p.at_eof() && !p.at(close) {
        let before = p.pos();
        element(p);
        if p.at(close) {
            break;
        }
        if !p.eat(SyntaxKind::COMMA) {
            if p.pos() == before {
                p.err_and_bump(SyntaxErrorKind::Expected(","));
            } else {
                p.error(SyntaxErrorKind::Expected(","));
                if !p.at_any(&[SyntaxKind::IDENT, SyntaxKind::STRING, SyntaxKind::NUMBER]) {
                    break;
                }
            }
        }
    }
    p.expect(close);
}
