//! Imports, exports, and declarations
//!
//! Declarations share a single shape: an optional `MODIFIERS` node (decorators,
//! `export`, `default`, `declare`, `abstract`, `async`, `const` before `enum`)
//! followed by the declaration body. The modifiers are wrapped into the
//! declaration node through a checkpoint taken before them.

use super::{
    at_ident, at_ident_kind, at_property_name, delimited, expressions, module_specifier, name,
    property_name, statements, types,
};
use crate::parser::errors::SyntaxErrorKind;
use crate::parser::parser::Parser;
use crate::parser::syntax_kind::SyntaxKind;
use rowan::Checkpoint;

/// Keywords that open a declaration.
const DECLARATION_KEYWORDS: &[SyntaxKind] = &[
    SyntaxKind::FUNCTION_KW,
    SyntaxKind::CLASS_KW,
    SyntaxKind::INTERFACE_KW,
    SyntaxKind::ENUM_KW,
    SyntaxKind::LET_KW,
    SyntaxKind::CONST_KW,
    SyntaxKind::VAR_KW,
    SyntaxKind::NAMESPACE_KW,
    SyntaxKind::TYPE_KW,
];

/// Class member modifiers (contextual: only modifiers when a name follows).
const MEMBER_MODIFIERS: &[SyntaxKind] = &[
    SyntaxKind::STATIC_KW,
    SyntaxKind::PUBLIC_KW,
    SyntaxKind::PRIVATE_KW,
    SyntaxKind::PROTECTED_KW,
    SyntaxKind::READONLY_KW,
    SyntaxKind::ABSTRACT_KW,
    SyntaxKind::ASYNC_KW,
    SyntaxKind::DECLARE_KW,
];

/// Whether the statement at the cursor is an import, export, or declaration.
pub(crate) fn at_item(p: &Parser<'_>) -> bool {
    match p.current() {
        _ if p.at_eof() => false,
        SyntaxKind::IMPORT_KW => !matches!(p.nth(1), SyntaxKind::L_PAREN | SyntaxKind::DOT),
        SyntaxKind::EXPORT_KW | SyntaxKind::AT => true,
        SyntaxKind::FUNCTION_KW
        | SyntaxKind::CLASS_KW
        | SyntaxKind::INTERFACE_KW
        | SyntaxKind::ENUM_KW
        | SyntaxKind::LET_KW
        | SyntaxKind::CONST_KW
        | SyntaxKind::VAR_KW => true,
        SyntaxKind::NAMESPACE_KW => at_ident_kind(p.nth(1)),
        SyntaxKind::TYPE_KW => {
            at_ident_kind(p.nth(1)) && matches!(p.nth(2), SyntaxKind::EQ | SyntaxKind::LT)
        }
        SyntaxKind::DECLARE_KW | SyntaxKind::ABSTRACT_KW => declaration_follows(p, 1),
        SyntaxKind::ASYNC_KW => p.nth(1) == SyntaxKind::FUNCTION_KW,
        _ => false,
    }
}

/// Whether a declaration (possibly behind more modifiers) starts at token `n`.
fn declaration_follows(p: &Parser<'_>, n: usize) -> bool {
    match p.nth(n) {
        SyntaxKind::DECLARE_KW | SyntaxKind::ABSTRACT_KW => declaration_follows(p, n + 1),
        SyntaxKind::ASYNC_KW => p.nth(n + 1) == SyntaxKind::FUNCTION_KW,
        kind => DECLARATION_KEYWORDS.contains(&kind),
    }
}

/// Parse an import, export, or declaration.
pub(crate) fn item(p: &mut Parser<'_>) {
    match p.current() {
        SyntaxKind::IMPORT_KW => import_decl(p),
        SyntaxKind::EXPORT_KW => match p.nth(1) {
            SyntaxKind::L_BRACE => export_named(p),
            SyntaxKind::TYPE_KW if p.nth(2) == SyntaxKind::L_BRACE => export_named(p),
            SyntaxKind::STAR => export_all(p),
            SyntaxKind::DEFAULT_KW if !declaration_follows(p, 2) => export_default(p),
            _ => declaration(p),
        },
        _ => declaration(p),
    }
}

fn declaration(p: &mut Parser<'_>) {
    let checkpoint = p.checkpoint();
    modifiers(p);
    match p.current() {
        _ if p.at_eof() => {
            p.error(SyntaxErrorKind::DeclarationOrStatementExpected);
            p.wrap(checkpoint, SyntaxKind::ERROR);
        }
        SyntaxKind::FUNCTION_KW => function_decl(p, checkpoint),
        SyntaxKind::CLASS_KW => class_decl(p, checkpoint),
        SyntaxKind::INTERFACE_KW => interface_decl(p, checkpoint),
        SyntaxKind::ENUM_KW => enum_decl(p, checkpoint),
        SyntaxKind::LET_KW | SyntaxKind::CONST_KW | SyntaxKind::VAR_KW => {
            variable_stmt(p, checkpoint)
        }
        SyntaxKind::NAMESPACE_KW => namespace_decl(p, checkpoint),
        SyntaxKind::TYPE_KW => type_alias_decl(p, checkpoint),
        _ => {
            p.error(SyntaxErrorKind::DeclarationOrStatementExpected);
            p.wrap(checkpoint, SyntaxKind::ERROR);
        }
    }
}

/// Declaration-level modifiers. Returns whether any were parsed.
fn modifiers(p: &mut Parser<'_>) -> bool {
    let checkpoint = p.checkpoint();
    let mut any = false;
    loop {
        match p.current() {
            _ if p.at_eof() => break,
            SyntaxKind::AT => decorator(p),
            SyntaxKind::EXPORT_KW | SyntaxKind::DEFAULT_KW => p.bump(),
            SyntaxKind::DECLARE_KW | SyntaxKind::ABSTRACT_KW if declaration_follows(p, 1) => {
                p.bump()
            }
            SyntaxKind::ASYNC_KW if p.nth(1) == SyntaxKind::FUNCTION_KW => p.bump(),
            SyntaxKind::CONST_KW if p.nth(1) == SyntaxKind::ENUM_KW => p.bump(),
            _ => break,
        }
        any = true;
    }
    if any {
        p.wrap(checkpoint, SyntaxKind::MODIFIERS);
    }
    any
}

/// `@expr`
fn decorator(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::DECORATOR);
    p.bump(); // @
    expressions::decorator_expr(p);
    p.finish_node();
}

// =============================================================================
// Imports and exports
// =============================================================================

fn import_decl(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::IMPORT_DECL);
    p.bump(); // import

    if p.at(SyntaxKind::STRING) {
        module_specifier(p);
        p.expect_semi();
        p.finish_node();
        return;
    }

    if p.at(SyntaxKind::TYPE_KW)
        && (matches!(p.nth(1), SyntaxKind::L_BRACE | SyntaxKind::STAR)
            || (at_ident_kind(p.nth(1)) && p.nth(2) == SyntaxKind::FROM_KW))
    {
        p.bump();
    }

    if at_ident(p) && !(p.at(SyntaxKind::FROM_KW) && p.nth(1) == SyntaxKind::STRING) {
        p.start_node(SyntaxKind::DEFAULT_IMPORT);
        name(p);
        p.finish_node();
        p.eat(SyntaxKind::COMMA);
    }

    if p.at(SyntaxKind::STAR) {
        p.start_node(SyntaxKind::NAMESPACE_IMPORT);
        p.bump();
        p.expect(SyntaxKind::AS_KW);
        name(p);
        p.finish_node();
    } else if p.at(SyntaxKind::L_BRACE) {
        p.start_node(SyntaxKind::NAMED_IMPORTS);
        delimited(p, SyntaxKind::L_BRACE, SyntaxKind::R_BRACE, import_specifier);
        p.finish_node();
    }

    p.expect(SyntaxKind::FROM_KW);
    module_specifier(p);
    p.expect_semi();
    p.finish_node();
}

/// `name` or `imported as local` (the imported side may be a string or `default`).
fn import_specifier(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::IMPORT_SPECIFIER);
    if p.at(SyntaxKind::TYPE_KW) && at_ident_kind(p.nth(1)) && p.nth(1) != SyntaxKind::AS_KW {
        p.bump();
    }
    if at_property_name(p) && p.nth(1) == SyntaxKind::AS_KW {
        property_name(p, SyntaxKind::NAME_REF);
        p.bump(); // as
        name(p);
    } else {
        name(p);
    }
    p.finish_node();
}

/// `export { a, b as c } [from "m"];`
fn export_named(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::EXPORT_NAMED);
    p.bump(); // export
    p.eat(SyntaxKind::TYPE_KW);
    delimited(p, SyntaxKind::L_BRACE, SyntaxKind::R_BRACE, export_specifier);
    if p.eat(SyntaxKind::FROM_KW) {
        module_specifier(p);
    }
    p.expect_semi();
    p.finish_node();
}

fn export_specifier(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::EXPORT_SPECIFIER);
    property_name(p, SyntaxKind::NAME_REF);
    if p.eat(SyntaxKind::AS_KW) {
        property_name(p, SyntaxKind::NAME);
    }
    p.finish_node();
}

/// `export * [as ns] from "m";`
fn export_all(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::EXPORT_ALL);
    p.bump(); // export
    p.bump(); // *
    if p.eat(SyntaxKind::AS_KW) {
        property_name(p, SyntaxKind::NAME);
    }
    p.expect(SyntaxKind::FROM_KW);
    module_specifier(p);
    p.expect_semi();
    p.finish_node();
}

/// `export default <expr>;`
fn export_default(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::EXPORT_DEFAULT);
    p.bump(); // export
    p.bump(); // default
    expressions::expr(p);
    p.expect_semi();
    p.finish_node();
}

// =============================================================================
// Declarations
// =============================================================================

/// `function name<T>(params): R { ... }`; a missing body makes an overload signature.
fn function_decl(p: &mut Parser<'_>, checkpoint: Checkpoint) {
    p.start_node_at(checkpoint, SyntaxKind::FUNCTION_DECL);
    p.bump(); // function
    p.eat(SyntaxKind::STAR);
    if at_ident(p) {
        name(p);
    } else if !p.at_any(&[SyntaxKind::L_PAREN, SyntaxKind::LT]) {
        p.error(SyntaxErrorKind::IdentifierExpected);
    }
    signature(p);
    if p.at(SyntaxKind::L_BRACE) {
        statements::block(p);
    } else {
        p.expect_semi();
    }
    p.finish_node();
}

/// `<T>(params): R`
pub(crate) fn signature(p: &mut Parser<'_>) {
    if p.at(SyntaxKind::LT) {
        types::type_param_list(p);
    }
    param_list(p);
    if p.at(SyntaxKind::COLON) {
        types::ret_type(p);
    }
}

pub(crate) fn param_list(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::PARAM_LIST);
    delimited(p, SyntaxKind::L_PAREN, SyntaxKind::R_PAREN, param);
    p.finish_node();
}

/// `[modifiers] [...]name[?][: T][= default]`
fn param(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::PARAM);
    let checkpoint = p.checkpoint();
    let mut any = false;
    while p.at(SyntaxKind::AT)
        || (p.at_any(&[
            SyntaxKind::PUBLIC_KW,
            SyntaxKind::PRIVATE_KW,
            SyntaxKind::PROTECTED_KW,
            SyntaxKind::READONLY_KW,
        ]) && at_ident_kind(p.nth(1)))
    {
        if p.at(SyntaxKind::AT) {
            decorator(p);
        } else {
            p.bump();
        }
        any = true;
    }
    if any {
        p.wrap(checkpoint, SyntaxKind::MODIFIERS);
    }
    p.eat(SyntaxKind::DOT_DOT_DOT);
    if p.at(SyntaxKind::THIS_KW) {
        p.bump();
    } else {
        name(p);
    }
    p.eat(SyntaxKind::QUESTION);
    if p.at(SyntaxKind::COLON) {
        types::type_annotation(p);
    }
    if p.eat(SyntaxKind::EQ) {
        expressions::expr(p);
    }
    p.finish_node();
}

fn class_decl(p: &mut Parser<'_>, checkpoint: Checkpoint) {
    p.start_node_at(checkpoint, SyntaxKind::CLASS_DECL);
    p.bump(); // class
    if at_ident(p) {
        name(p);
    }
    if p.at(SyntaxKind::LT) {
        types::type_param_list(p);
    }
    while p.at_any(&[SyntaxKind::EXTENDS_KW, SyntaxKind::IMPLEMENTS_KW]) {
        heritage_clause(p);
    }
    class_body(p);
    p.finish_node();
}

/// `extends A, B` / `implements I`
fn heritage_clause(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::HERITAGE_CLAUSE);
    p.bump();
    loop {
        types::type_(p);
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.finish_node();
}

fn class_body(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::CLASS_BODY);
    p.expect(SyntaxKind::L_BRACE);
    while !p.at_eof() && !p.at(SyntaxKind::R_BRACE) {
        let before = p.pos();
        class_member(p);
        if p.pos() == before {
            p.err_and_bump(SyntaxErrorKind::DeclarationOrStatementExpected);
        }
    }
    p.expect(SyntaxKind::R_BRACE);
    p.finish_node();
}

fn class_member(p: &mut Parser<'_>) {
    if p.eat(SyntaxKind::SEMICOLON) {
        return;
    }
    let checkpoint = p.checkpoint();
    member_modifiers(p);

    if p.at(SyntaxKind::CONSTRUCTOR_KW) && p.nth(1) == SyntaxKind::L_PAREN {
        p.start_node_at(checkpoint, SyntaxKind::CONSTRUCTOR_DECL);
        p.bump();
        param_list(p);
        body_or_semi(p);
        p.finish_node();
        return;
    }

    if !at_property_name(p) {
        p.err_recover(
            SyntaxErrorKind::IdentifierExpected,
            &[SyntaxKind::SEMICOLON, SyntaxKind::R_BRACE],
        );
        p.eat(SyntaxKind::SEMICOLON);
        return;
    }

    property_name(p, SyntaxKind::NAME);
    if !p.eat(SyntaxKind::QUESTION) {
        p.eat(SyntaxKind::BANG);
    }
    if p.at_any(&[SyntaxKind::L_PAREN, SyntaxKind::LT]) {
        p.start_node_at(checkpoint, SyntaxKind::METHOD_DECL);
        signature(p);
        body_or_semi(p);
        p.finish_node();
    } else {
        p.start_node_at(checkpoint, SyntaxKind::FIELD_DECL);
        if p.at(SyntaxKind::COLON) {
            types::type_annotation(p);
        }
        if p.eat(SyntaxKind::EQ) {
            expressions::expr(p);
        }
        p.expect_semi();
        p.finish_node();
    }
}

/// Member modifiers, including `get`/`set`/`override` written as identifiers.
fn member_modifiers(p: &mut Parser<'_>) {
    let checkpoint = p.checkpoint();
    let mut any = false;
    loop {
        let is_modifier = if p.at(SyntaxKind::AT) {
            true
        } else if p.at_any(MEMBER_MODIFIERS)
            || (p.at(SyntaxKind::IDENT) && matches!(p.current_text(), "get" | "set" | "override"))
        {
            let next = p.nth(1);
            next == SyntaxKind::IDENT
                || next.is_keyword()
                || matches!(next, SyntaxKind::STRING | SyntaxKind::NUMBER)
        } else {
            false
        };
        if !is_modifier {
            break;
        }
        if p.at(SyntaxKind::AT) {
            decorator(p);
        } else {
            p.bump();
        }
        any = true;
    }
    if any {
        p.wrap(checkpoint, SyntaxKind::MODIFIERS);
    }
}

fn body_or_semi(p: &mut Parser<'_>) {
    if p.at(SyntaxKind::L_BRACE) {
        statements::block(p);
    } else {
        p.expect_semi();
    }
}

fn interface_decl(p: &mut Parser<'_>, checkpoint: Checkpoint) {
    p.start_node_at(checkpoint, SyntaxKind::INTERFACE_DECL);
    p.bump(); // interface
    name(p);
    if p.at(SyntaxKind::LT) {
        types::type_param_list(p);
    }
    if p.at(SyntaxKind::EXTENDS_KW) {
        heritage_clause(p);
    }
    interface_body(p);
    p.finish_node();
}

/// `{ member; member, ... }` (also used for object type literals)
pub(crate) fn interface_body(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::INTERFACE_BODY);
    p.expect(SyntaxKind::L_BRACE);
    while !p.at_eof() && !p.at(SyntaxKind::R_BRACE) {
        let before = p.pos();
        type_member(p);
        if !p.eat(SyntaxKind::SEMICOLON) {
            p.eat(SyntaxKind::COMMA);
        }
        if p.pos() == before {
            p.err_and_bump(SyntaxErrorKind::IdentifierExpected);
        }
    }
    p.expect(SyntaxKind::R_BRACE);
    p.finish_node();
}

fn type_member(p: &mut Parser<'_>) {
    let checkpoint = p.checkpoint();
    if p.at(SyntaxKind::READONLY_KW) && at_property_name_kind(p.nth(1)) {
        p.start_node(SyntaxKind::MODIFIERS);
        p.bump();
        p.finish_node();
    }

    match p.current() {
        _ if p.at_eof() => {}
        SyntaxKind::L_PAREN | SyntaxKind::LT => {
            p.start_node_at(checkpoint, SyntaxKind::METHOD_SIGNATURE);
            signature(p);
            p.finish_node();
        }
        SyntaxKind::L_BRACKET => {
            // index signature: `[key: K]: V`
            p.start_node_at(checkpoint, SyntaxKind::PROPERTY_SIGNATURE);
            p.bump();
            p.start_node(SyntaxKind::PARAM);
            name(p);
            if p.at(SyntaxKind::COLON) {
                types::type_annotation(p);
            }
            p.finish_node();
            p.expect(SyntaxKind::R_BRACKET);
            if p.at(SyntaxKind::COLON) {
                types::type_annotation(p);
            }
            p.finish_node();
        }
        _ if at_property_name(p) => {
            property_name(p, SyntaxKind::NAME);
            p.eat(SyntaxKind::QUESTION);
            if p.at_any(&[SyntaxKind::L_PAREN, SyntaxKind::LT]) {
                p.start_node_at(checkpoint, SyntaxKind::METHOD_SIGNATURE);
                signature(p);
            } else {
                p.start_node_at(checkpoint, SyntaxKind::PROPERTY_SIGNATURE);
                if p.at(SyntaxKind::COLON) {
                    types::type_annotation(p);
                }
            }
            p.finish_node();
        }
        _ => {}
    }
}

fn at_property_name_kind(kind: SyntaxKind) -> bool {
    kind == SyntaxKind::IDENT
        || kind.is_keyword()
        || matches!(kind, SyntaxKind::STRING | SyntaxKind::NUMBER)
}

fn enum_decl(p: &mut Parser<'_>, checkpoint: Checkpoint) {
    p.start_node_at(checkpoint, SyntaxKind::ENUM_DECL);
    p.bump(); // enum
    name(p);
    p.start_node(SyntaxKind::ENUM_BODY);
    delimited(p, SyntaxKind::L_BRACE, SyntaxKind::R_BRACE, enum_member);
    p.finish_node();
    p.finish_node();
}

fn enum_member(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::ENUM_MEMBER);
    property_name(p, SyntaxKind::NAME);
    if p.eat(SyntaxKind::EQ) {
        expressions::expr(p);
    }
    p.finish_node();
}

fn namespace_decl(p: &mut Parser<'_>, checkpoint: Checkpoint) {
    p.start_node_at(checkpoint, SyntaxKind::NAMESPACE_DECL);
    p.bump(); // namespace
    name(p);
    p.start_node(SyntaxKind::NAMESPACE_BODY);
    p.expect(SyntaxKind::L_BRACE);
    statements::statement_list(p);
    p.expect(SyntaxKind::R_BRACE);
    p.finish_node();
    p.finish_node();
}

fn type_alias_decl(p: &mut Parser<'_>, checkpoint: Checkpoint) {
    p.start_node_at(checkpoint, SyntaxKind::TYPE_ALIAS_DECL);
    p.bump(); // type
    name(p);
    if p.at(SyntaxKind::LT) {
        types::type_param_list(p);
    }
    p.expect(SyntaxKind::EQ);
    types::type_(p);
    p.expect_semi();
    p.finish_node();
}

fn variable_stmt(p: &mut Parser<'_>, checkpoint: Checkpoint) {
    p.start_node_at(checkpoint, SyntaxKind::VARIABLE_STMT);
    p.bump(); // let / const / var
    loop {
        variable_declarator(p);
        if !p.eat(SyntaxKind::COMMA) {
            break;
        }
    }
    p.expect_semi();
    p.finish_node();
}

/// `name[!][: T][= init]`
pub(crate) fn variable_declarator(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::VARIABLE_DECLARATOR);
    name(p);
    p.eat(SyntaxKind::BANG);
    if p.at(SyntaxKind::COLON) {
        types::type_annotation(p);
    }
    if p.eat(SyntaxKind::EQ) {
        expressions::expr(p);
    }
    p.finish_node();
}
