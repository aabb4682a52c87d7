//! Type parsing
//!
//! In type position `<` always opens a type-argument list, so this is where
//! generic angle brackets get their `TYPE_ARG_LIST`/`TYPE_PARAM_LIST` parents.

use super::{at_ident, delimited, expressions, items, name, name_ref, property_name};
use crate::parser::errors::SyntaxErrorKind;
use crate::parser::parser::Parser;
use crate::parser::syntax_kind::SyntaxKind;

const TYPE_RECOVERY: &[SyntaxKind] = &[
    SyntaxKind::R_PAREN,
    SyntaxKind::R_BRACKET,
    SyntaxKind::R_BRACE,
    SyntaxKind::L_BRACE,
    SyntaxKind::COMMA,
    SyntaxKind::SEMICOLON,
    SyntaxKind::EQ,
    SyntaxKind::GT,
    SyntaxKind::FAT_ARROW,
];

/// `: T`
pub(crate) fn type_annotation(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::TYPE_ANNOTATION);
    p.expect(SyntaxKind::COLON);
    type_(p);
    p.finish_node();
}

/// `: T` after a parameter list
pub(crate) fn ret_type(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::RET_TYPE);
    p.expect(SyntaxKind::COLON);
    type_(p);
    p.finish_node();
}

/// A full type, including unions and intersections.
pub(crate) fn type_(p: &mut Parser<'_>) {
    let checkpoint = p.checkpoint();
    let leading = p.eat(SyntaxKind::PIPE) || p.eat(SyntaxKind::AMP);
    non_union_type(p);
    if leading || p.at_any(&[SyntaxKind::PIPE, SyntaxKind::AMP]) {
        while p.eat(SyntaxKind::PIPE) || p.eat(SyntaxKind::AMP) {
            non_union_type(p);
        }
        p.wrap(checkpoint, SyntaxKind::UNION_TYPE);
    }
}

fn non_union_type(p: &mut Parser<'_>) {
    let checkpoint = p.checkpoint();
    primary_type(p);
    while p.at(SyntaxKind::L_BRACKET) && !p.has_newline_before() {
        p.start_node_at(checkpoint, SyntaxKind::ARRAY_TYPE);
        p.bump();
        if !p.at(SyntaxKind::R_BRACKET) {
            type_(p);
        }
        p.expect(SyntaxKind::R_BRACKET);
        p.finish_node();
    }
}

fn primary_type(p: &mut Parser<'_>) {
    match p.current() {
        _ if p.at_eof() => p.error(SyntaxErrorKind::TypeExpected),
        _ if at_ident(p) => type_ref(p),
        SyntaxKind::TYPEOF_KW => {
            p.start_node(SyntaxKind::TYPE_REF);
            p.bump();
            qualified_name(p);
            p.finish_node();
        }
        SyntaxKind::VOID_KW
        | SyntaxKind::NULL_KW
        | SyntaxKind::UNDEFINED_KW
        | SyntaxKind::TRUE_KW
        | SyntaxKind::FALSE_KW
        | SyntaxKind::NUMBER
        | SyntaxKind::STRING
        | SyntaxKind::THIS_KW
        | SyntaxKind::CONST_KW => {
            p.start_node(SyntaxKind::LITERAL_TYPE);
            p.bump();
            p.finish_node();
        }
        SyntaxKind::MINUS if p.nth(1) == SyntaxKind::NUMBER => {
            p.start_node(SyntaxKind::LITERAL_TYPE);
            p.bump();
            p.bump();
            p.finish_node();
        }
        SyntaxKind::L_PAREN if expressions::paren_arrow_ahead(p, 0) => function_type(p),
        SyntaxKind::LT => function_type(p),
        SyntaxKind::L_PAREN => {
            p.start_node(SyntaxKind::PAREN_TYPE);
            p.bump();
            type_(p);
            p.expect(SyntaxKind::R_PAREN);
            p.finish_node();
        }
        SyntaxKind::L_BRACE => items::interface_body(p),
        SyntaxKind::L_BRACKET => {
            // tuple
            p.start_node(SyntaxKind::ARRAY_TYPE);
            delimited(p, SyntaxKind::L_BRACKET, SyntaxKind::R_BRACKET, type_);
            p.finish_node();
        }
        _ if p.at_any(TYPE_RECOVERY) => p.error(SyntaxErrorKind::TypeExpected),
        _ => p.err_and_bump(SyntaxErrorKind::TypeExpected),
    }
}

/// `A.B.C<T, U>`
fn type_ref(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::TYPE_REF);
    qualified_name(p);
    if p.at(SyntaxKind::LT) {
        type_arg_list(p);
    }
    p.finish_node();
}

/// `NAME_REF` or nested `QUALIFIED_NAME(QUALIFIED_NAME(A . B) . C)`.
fn qualified_name(p: &mut Parser<'_>) {
    let checkpoint = p.checkpoint();
    if !name_ref(p) {
        return;
    }
    while p.at(SyntaxKind::DOT) {
        p.start_node_at(checkpoint, SyntaxKind::QUALIFIED_NAME);
        p.bump();
        property_name(p, SyntaxKind::NAME_REF);
        p.finish_node();
    }
}

/// `<T>(a: T) => R`
fn function_type(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::FUNCTION_TYPE);
    if p.at(SyntaxKind::LT) {
        type_param_list(p);
    }
    items::param_list(p);
    p.expect(SyntaxKind::FAT_ARROW);
    type_(p);
    p.finish_node();
}

/// `<A, B<C>>`
pub(crate) fn type_arg_list(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::TYPE_ARG_LIST);
    delimited(p, SyntaxKind::LT, SyntaxKind::GT, type_);
    p.finish_node();
}

/// `<T extends U = D, ...>`
pub(crate) fn type_param_list(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::TYPE_PARAM_LIST);
    delimited(p, SyntaxKind::LT, SyntaxKind::GT, type_param);
    p.finish_node();
}

fn type_param(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::TYPE_PARAM);
    name(p);
    if p.eat(SyntaxKind::EXTENDS_KW) {
        type_(p);
    }
    if p.eat(SyntaxKind::EQ) {
        type_(p);
    }
    p.finish_node();
}
