//! Expression parsing
//!
//! Precedence climbing over a single binding-power table:
//!
//! ```text
//! assignment → conditional → binary(bp) → unary → postfix/call chain → primary
//! ```
//!
//! Binary nodes are built by wrapping the left operand through a checkpoint, so
//! left-associative chains nest to the left. `>>` is recognized here from two
//! adjacent `>` tokens; the lexer never produces it, which keeps nested
//! generic closers (`Map<K, Array<V>>`) unambiguous.

use super::{at_ident, at_ident_kind, delimited, items, name, name_ref, property_name, statements, types};
use crate::parser::errors::SyntaxErrorKind;
use crate::parser::parser::Parser;
use crate::parser::syntax_kind::SyntaxKind;
use rowan::Checkpoint;

/// Tokens an expression error never swallows.
const EXPR_RECOVERY: &[SyntaxKind] = &[
    SyntaxKind::SEMICOLON,
    SyntaxKind::R_PAREN,
    SyntaxKind::R_BRACE,
    SyntaxKind::R_BRACKET,
    SyntaxKind::COMMA,
    SyntaxKind::COLON,
    SyntaxKind::L_BRACE,
];

/// Upper bound on tokens scanned by speculative lookahead.
const LOOKAHEAD_LIMIT: usize = 64;

pub(crate) fn at_expr_start(p: &Parser<'_>) -> bool {
    !p.at_eof() && expr_start_kind(p.current())
}

fn expr_start_kind(kind: SyntaxKind) -> bool {
    at_ident_kind(kind)
        || matches!(
            kind,
            SyntaxKind::NUMBER
                | SyntaxKind::STRING
                | SyntaxKind::THIS_KW
                | SyntaxKind::SUPER_KW
                | SyntaxKind::NEW_KW
                | SyntaxKind::TRUE_KW
                | SyntaxKind::FALSE_KW
                | SyntaxKind::NULL_KW
                | SyntaxKind::UNDEFINED_KW
                | SyntaxKind::L_PAREN
                | SyntaxKind::L_BRACKET
                | SyntaxKind::L_BRACE
                | SyntaxKind::BANG
                | SyntaxKind::MINUS
                | SyntaxKind::PLUS
                | SyntaxKind::TILDE
                | SyntaxKind::PLUS_PLUS
                | SyntaxKind::MINUS_MINUS
                | SyntaxKind::TYPEOF_KW
                | SyntaxKind::VOID_KW
                | SyntaxKind::FUNCTION_KW
        )
}

/// Full expression (assignment level).
pub(crate) fn expr(p: &mut Parser<'_>) {
    if arrow_ahead(p) {
        arrow_function(p);
        return;
    }
    let checkpoint = p.checkpoint();
    conditional(p);
    if !p.at_eof() && p.current().is_assignment_op() {
        p.start_node_at(checkpoint, SyntaxKind::BINARY_EXPR);
        p.bump();
        expr(p);
        p.finish_node();
    }
}

fn conditional(p: &mut Parser<'_>) {
    let checkpoint = p.checkpoint();
    binary(p, 0);
    if p.at(SyntaxKind::QUESTION) {
        p.start_node_at(checkpoint, SyntaxKind::CONDITIONAL_EXPR);
        p.bump();
        expr(p);
        p.expect(SyntaxKind::COLON);
        expr(p);
        p.finish_node();
    }
}

/// Binding power and token count of the binary operator at the cursor.
fn binary_op(p: &Parser<'_>) -> Option<(u8, usize)> {
    if p.at_eof() {
        return None;
    }
    let op = match p.current() {
        SyntaxKind::QUESTION_QUESTION => (1, 1),
        SyntaxKind::PIPE_PIPE => (2, 1),
        SyntaxKind::AMP_AMP => (3, 1),
        SyntaxKind::PIPE => (4, 1),
        SyntaxKind::CARET => (5, 1),
        SyntaxKind::AMP => (6, 1),
        SyntaxKind::EQ_EQ | SyntaxKind::EQ_EQ_EQ | SyntaxKind::BANG_EQ | SyntaxKind::BANG_EQ_EQ => {
            (7, 1)
        }
        SyntaxKind::GT if p.nth(1) == SyntaxKind::GT && p.nth_adjacent(0) => {
            if p.nth(2) == SyntaxKind::GT && p.nth_adjacent(1) {
                (9, 3)
            } else {
                (9, 2)
            }
        }
        SyntaxKind::LT
        | SyntaxKind::GT
        | SyntaxKind::LT_EQ
        | SyntaxKind::GT_EQ
        | SyntaxKind::INSTANCEOF_KW
        | SyntaxKind::IN_KW => (8, 1),
        SyntaxKind::SHL => (9, 1),
        SyntaxKind::PLUS | SyntaxKind::MINUS => (10, 1),
        SyntaxKind::STAR | SyntaxKind::SLASH | SyntaxKind::PERCENT => (11, 1),
        _ => return None,
    };
    Some(op)
}

fn binary(p: &mut Parser<'_>, min_bp: u8) {
    let checkpoint = p.checkpoint();
    unary(p);
    loop {
        if p.at(SyntaxKind::AS_KW) && !p.has_newline_before() && 8 > min_bp {
            p.start_node_at(checkpoint, SyntaxKind::AS_EXPR);
            p.bump();
            types::type_(p);
            p.finish_node();
            continue;
        }
        let Some((bp, width)) = binary_op(p) else {
            break;
        };
        if bp <= min_bp {
            break;
        }
        p.start_node_at(checkpoint, SyntaxKind::BINARY_EXPR);
        for _ in 0..width {
            p.bump();
        }
        binary(p, bp);
        p.finish_node();
    }
}

fn unary(p: &mut Parser<'_>) {
    let prefix = match p.current() {
        _ if p.at_eof() => false,
        SyntaxKind::BANG
        | SyntaxKind::MINUS
        | SyntaxKind::PLUS
        | SyntaxKind::TILDE
        | SyntaxKind::PLUS_PLUS
        | SyntaxKind::MINUS_MINUS
        | SyntaxKind::TYPEOF_KW
        | SyntaxKind::VOID_KW => true,
        SyntaxKind::AWAIT_KW => expr_start_kind(p.nth(1)),
        _ => false,
    };
    if prefix {
        p.start_node(SyntaxKind::PREFIX_EXPR);
        p.bump();
        unary(p);
        p.finish_node();
    } else {
        postfix(p);
    }
}

fn postfix(p: &mut Parser<'_>) {
    let checkpoint = p.checkpoint();
    if !primary(p) {
        return;
    }
    call_chain(p, checkpoint);
    if p.at_any(&[SyntaxKind::PLUS_PLUS, SyntaxKind::MINUS_MINUS]) && !p.has_newline_before() {
        p.start_node_at(checkpoint, SyntaxKind::POSTFIX_EXPR);
        p.bump();
        p.finish_node();
    }
}

/// Member access, optional chaining, indexing, calls, and non-null assertions.
fn call_chain(p: &mut Parser<'_>, checkpoint: Checkpoint) {
    loop {
        match p.current() {
            _ if p.at_eof() => break,
            SyntaxKind::DOT => {
                p.start_node_at(checkpoint, SyntaxKind::MEMBER_EXPR);
                p.bump();
                property_name(p, SyntaxKind::NAME_REF);
                p.finish_node();
            }
            SyntaxKind::QUESTION_DOT => match p.nth(1) {
                SyntaxKind::L_PAREN => {
                    p.start_node_at(checkpoint, SyntaxKind::CALL_EXPR);
                    p.bump();
                    arg_list(p);
                    p.finish_node();
                }
                SyntaxKind::L_BRACKET => {
                    p.start_node_at(checkpoint, SyntaxKind::INDEX_EXPR);
                    p.bump();
                    p.bump();
                    expr(p);
                    p.expect(SyntaxKind::R_BRACKET);
                    p.finish_node();
                }
                _ => {
                    p.start_node_at(checkpoint, SyntaxKind::MEMBER_EXPR);
                    p.bump();
                    property_name(p, SyntaxKind::NAME_REF);
                    p.finish_node();
                }
            },
            SyntaxKind::L_BRACKET => {
                p.start_node_at(checkpoint, SyntaxKind::INDEX_EXPR);
                p.bump();
                expr(p);
                p.expect(SyntaxKind::R_BRACKET);
                p.finish_node();
            }
            SyntaxKind::L_PAREN => {
                p.start_node_at(checkpoint, SyntaxKind::CALL_EXPR);
                arg_list(p);
                p.finish_node();
            }
            SyntaxKind::LT if type_args_call_ahead(p) => {
                p.start_node_at(checkpoint, SyntaxKind::CALL_EXPR);
                types::type_arg_list(p);
                arg_list(p);
                p.finish_node();
            }
            SyntaxKind::BANG if !p.has_newline_before() => {
                p.start_node_at(checkpoint, SyntaxKind::POSTFIX_EXPR);
                p.bump();
                p.finish_node();
            }
            _ => break,
        }
    }
}

/// Returns false (after reporting) when no expression starts at the cursor.
fn primary(p: &mut Parser<'_>) -> bool {
    match p.current() {
        _ if p.at_eof() => {
            p.error(SyntaxErrorKind::ExpressionExpected);
            return false;
        }
        SyntaxKind::ASYNC_KW if p.nth(1) == SyntaxKind::FUNCTION_KW => function_expr(p),
        kind if at_ident_kind(kind) => {
            name_ref(p);
        }
        SyntaxKind::NUMBER
        | SyntaxKind::STRING
        | SyntaxKind::TRUE_KW
        | SyntaxKind::FALSE_KW
        | SyntaxKind::NULL_KW
        | SyntaxKind::UNDEFINED_KW => {
            p.start_node(SyntaxKind::LITERAL);
            p.bump();
            p.finish_node();
        }
        SyntaxKind::THIS_KW => {
            p.start_node(SyntaxKind::THIS_EXPR);
            p.bump();
            p.finish_node();
        }
        SyntaxKind::SUPER_KW => {
            p.start_node(SyntaxKind::SUPER_EXPR);
            p.bump();
            p.finish_node();
        }
        SyntaxKind::L_PAREN => {
            p.start_node(SyntaxKind::PAREN_EXPR);
            p.bump();
            expr(p);
            p.expect(SyntaxKind::R_PAREN);
            p.finish_node();
        }
        SyntaxKind::L_BRACKET => {
            p.start_node(SyntaxKind::ARRAY_LITERAL);
            delimited(p, SyntaxKind::L_BRACKET, SyntaxKind::R_BRACKET, element);
            p.finish_node();
        }
        SyntaxKind::L_BRACE => object_literal(p),
        SyntaxKind::NEW_KW => new_expr(p),
        SyntaxKind::FUNCTION_KW => function_expr(p),
        _ => {
            if p.at_any(EXPR_RECOVERY) {
                p.error(SyntaxErrorKind::ExpressionExpected);
            } else {
                p.err_and_bump(SyntaxErrorKind::ExpressionExpected);
            }
            return false;
        }
    }
    true
}

/// Array element or call argument: `...expr` or `expr`.
fn element(p: &mut Parser<'_>) {
    if p.at(SyntaxKind::DOT_DOT_DOT) {
        p.start_node(SyntaxKind::SPREAD_EXPR);
        p.bump();
        expr(p);
        p.finish_node();
    } else {
        expr(p);
    }
}

pub(crate) fn arg_list(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::ARG_LIST);
    delimited(p, SyntaxKind::L_PAREN, SyntaxKind::R_PAREN, element);
    p.finish_node();
}

fn object_literal(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::OBJECT_LITERAL);
    delimited(p, SyntaxKind::L_BRACE, SyntaxKind::R_BRACE, object_member);
    p.finish_node();
}

/// `name: value`, `name(params) {}`, `[computed]: value`, shorthand `name`, or `...spread`.
fn object_member(p: &mut Parser<'_>) {
    if p.at(SyntaxKind::DOT_DOT_DOT) {
        element(p);
        return;
    }
    p.start_node(SyntaxKind::PROPERTY_ASSIGNMENT);
    if p.at(SyntaxKind::L_BRACKET) {
        p.bump();
        expr(p);
        p.expect(SyntaxKind::R_BRACKET);
        p.expect(SyntaxKind::COLON);
        expr(p);
    } else if super::at_property_name(p) {
        match p.nth(1) {
            SyntaxKind::COLON => {
                property_name(p, SyntaxKind::NAME);
                p.bump();
                expr(p);
            }
            SyntaxKind::L_PAREN | SyntaxKind::LT => {
                property_name(p, SyntaxKind::NAME);
                items::signature(p);
                statements::block(p);
            }
            _ if at_ident(p) => {
                name_ref(p);
            }
            _ => {
                property_name(p, SyntaxKind::NAME);
                p.expect(SyntaxKind::COLON);
            }
        }
    } else {
        p.error(SyntaxErrorKind::IdentifierExpected);
    }
    p.finish_node();
}

/// `new Callee<T>(args)`; the callee is a member chain without calls.
fn new_expr(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::NEW_EXPR);
    p.bump(); // new
    let checkpoint = p.checkpoint();
    if primary(p) {
        while p.at(SyntaxKind::DOT) {
            p.start_node_at(checkpoint, SyntaxKind::MEMBER_EXPR);
            p.bump();
            property_name(p, SyntaxKind::NAME_REF);
            p.finish_node();
        }
    }
    if p.at(SyntaxKind::LT) {
        types::type_arg_list(p);
    }
    if p.at(SyntaxKind::L_PAREN) {
        arg_list(p);
    }
    p.finish_node();
}

fn function_expr(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::FUNCTION_EXPR);
    p.eat(SyntaxKind::ASYNC_KW);
    p.bump(); // function
    p.eat(SyntaxKind::STAR);
    if at_ident(p) {
        name(p);
    }
    items::signature(p);
    statements::block(p);
    p.finish_node();
}

/// `x => ...`, `(a, b): T => ...`, `async (a) => ...`
fn arrow_ahead(p: &Parser<'_>) -> bool {
    if p.at_eof() {
        return false;
    }
    match p.current() {
        SyntaxKind::L_PAREN => paren_arrow_ahead(p, 0),
        SyntaxKind::ASYNC_KW
            if p.nth(1) == SyntaxKind::L_PAREN || at_ident_kind(p.nth(1)) =>
        {
            (p.nth(1) == SyntaxKind::L_PAREN && paren_arrow_ahead(p, 1))
                || p.nth(2) == SyntaxKind::FAT_ARROW
        }
        kind => at_ident_kind(kind) && p.nth(1) == SyntaxKind::FAT_ARROW,
    }
}

/// Whether the parenthesized list starting `skip` tokens ahead is an arrow
/// parameter list (`=>` after the closing paren, possibly behind a return type).
pub(crate) fn paren_arrow_ahead(p: &Parser<'_>, skip: usize) -> bool {
    let mut tokens = p.lookahead().skip(skip).take(LOOKAHEAD_LIMIT);
    let mut depth = 0usize;
    for token in tokens.by_ref() {
        match token.kind {
            SyntaxKind::L_PAREN | SyntaxKind::L_BRACKET | SyntaxKind::L_BRACE => depth += 1,
            SyntaxKind::R_PAREN | SyntaxKind::R_BRACKET | SyntaxKind::R_BRACE => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
    }
    match tokens.next().map(|t| t.kind) {
        Some(SyntaxKind::FAT_ARROW) => true,
        Some(SyntaxKind::COLON) => {
            let mut depth = 0usize;
            for token in tokens {
                match token.kind {
                    SyntaxKind::FAT_ARROW if depth == 0 => return true,
                    SyntaxKind::L_PAREN
                    | SyntaxKind::L_BRACKET
                    | SyntaxKind::L_BRACE
                    | SyntaxKind::LT => depth += 1,
                    SyntaxKind::R_PAREN
                    | SyntaxKind::R_BRACKET
                    | SyntaxKind::R_BRACE
                    | SyntaxKind::GT => {
                        if depth == 0 {
                            return false;
                        }
                        depth -= 1;
                    }
                    SyntaxKind::SEMICOLON | SyntaxKind::EQ => return false,
                    SyntaxKind::COMMA if depth == 0 => return false,
                    _ => {}
                }
            }
            false
        }
        _ => false,
    }
}

/// Whether `<...>` at the cursor is a type-argument list followed by `(`.
fn type_args_call_ahead(p: &Parser<'_>) -> bool {
    let mut depth = 0usize;
    let mut tokens = p.lookahead().take(LOOKAHEAD_LIMIT);
    for token in tokens.by_ref() {
        match token.kind {
            SyntaxKind::LT => depth += 1,
            SyntaxKind::GT => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            SyntaxKind::IDENT
            | SyntaxKind::COMMA
            | SyntaxKind::DOT
            | SyntaxKind::L_BRACKET
            | SyntaxKind::R_BRACKET
            | SyntaxKind::PIPE
            | SyntaxKind::AMP
            | SyntaxKind::STRING
            | SyntaxKind::NUMBER => {}
            kind if kind.is_keyword() => {}
            _ => return false,
        }
    }
    depth == 0 && tokens.next().map(|t| t.kind) == Some(SyntaxKind::L_PAREN)
}

fn arrow_function(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::ARROW_FUNCTION);
    if p.at(SyntaxKind::ASYNC_KW) && p.nth(1) != SyntaxKind::FAT_ARROW {
        p.bump();
    }
    if p.at(SyntaxKind::L_PAREN) {
        items::param_list(p);
        if p.at(SyntaxKind::COLON) {
            types::ret_type(p);
        }
    } else {
        p.start_node(SyntaxKind::PARAM_LIST);
        p.start_node(SyntaxKind::PARAM);
        name(p);
        p.finish_node();
        p.finish_node();
    }
    p.expect(SyntaxKind::FAT_ARROW);
    if p.at(SyntaxKind::L_BRACE) {
        statements::block(p);
    } else {
        expr(p);
    }
    p.finish_node();
}

/// Decorator body: a name with member accesses and calls.
pub(crate) fn decorator_expr(p: &mut Parser<'_>) {
    let checkpoint = p.checkpoint();
    if name_ref(p) {
        call_chain(p, checkpoint);
    }
}
