//! Statement parsing
//!
//! `statement` is the single dispatch point for both file-level and block-level
//! content: declarations, imports and exports are accepted anywhere and
//! classified by the binder later.

use super::expressions;
use super::items;
use super::types;
use crate::parser::errors::SyntaxErrorKind;
use crate::parser::parser::Parser;
use crate::parser::syntax_kind::SyntaxKind;

/// Parse one statement or declaration.
pub(crate) fn statement(p: &mut Parser<'_>) {
    if items::at_item(p) {
        items::item(p);
        return;
    }
    match p.current() {
        SyntaxKind::L_BRACE => block(p),
        SyntaxKind::SEMICOLON => {
            p.start_node(SyntaxKind::EMPTY_STMT);
            p.bump();
            p.finish_node();
        }
        SyntaxKind::IF_KW => if_stmt(p),
        SyntaxKind::WHILE_KW => while_stmt(p),
        SyntaxKind::FOR_KW => for_stmt(p),
        SyntaxKind::RETURN_KW => return_stmt(p),
        SyntaxKind::BREAK_KW | SyntaxKind::CONTINUE_KW => jump_stmt(p),
        SyntaxKind::THROW_KW => throw_stmt(p),
        SyntaxKind::TRY_KW => try_stmt(p),
        _ if expressions::at_expr_start(p) => {
            p.start_node(SyntaxKind::EXPR_STMT);
            expressions::expr(p);
            p.expect_semi();
            p.finish_node();
        }
        _ => p.err_and_bump(SyntaxErrorKind::DeclarationOrStatementExpected),
    }
}

/// `{ statement* }`
pub(crate) fn block(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::BLOCK);
    p.expect(SyntaxKind::L_BRACE);
    statement_list(p);
    p.expect(SyntaxKind::R_BRACE);
    p.finish_node();
}

/// Statements up to (not including) the closing brace.
pub(crate) fn statement_list(p: &mut Parser<'_>) {
    while !p.at_eof() && !p.at(SyntaxKind::R_BRACE) {
        let before = p.pos();
        statement(p);
        if p.pos() == before {
            p.err_and_bump(SyntaxErrorKind::DeclarationOrStatementExpected);
        }
    }
}

fn if_stmt(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::IF_STMT);
    p.bump(); // if
    condition(p);
    statement(p);
    if p.at(SyntaxKind::ELSE_KW) {
        p.start_node(SyntaxKind::ELSE_BRANCH);
        p.bump();
        statement(p);
        p.finish_node();
    }
    p.finish_node();
}

fn while_stmt(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::WHILE_STMT);
    p.bump(); // while
    condition(p);
    statement(p);
    p.finish_node();
}

/// `( expr )`
fn condition(p: &mut Parser<'_>) {
    p.expect(SyntaxKind::L_PAREN);
    expressions::expr(p);
    p.expect(SyntaxKind::R_PAREN);
}

/// `for (init; cond; update) body` or `for (decl of expr) body`.
fn for_stmt(p: &mut Parser<'_>) {
    let checkpoint = p.checkpoint();
    p.bump(); // for
    p.expect(SyntaxKind::L_PAREN);

    if p.at_any(&[SyntaxKind::LET_KW, SyntaxKind::CONST_KW, SyntaxKind::VAR_KW]) {
        p.start_node(SyntaxKind::VARIABLE_STMT);
        p.bump();
        loop {
            items::variable_declarator(p);
            if !p.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        p.finish_node();
    } else if !p.at(SyntaxKind::SEMICOLON) {
        expressions::expr(p);
    }

    let kind = if p.at_any(&[SyntaxKind::OF_KW, SyntaxKind::IN_KW]) {
        p.bump();
        expressions::expr(p);
        SyntaxKind::FOR_OF_STMT
    } else {
        p.expect(SyntaxKind::SEMICOLON);
        if !p.at(SyntaxKind::SEMICOLON) {
            expressions::expr(p);
        }
        p.expect(SyntaxKind::SEMICOLON);
        if !p.at(SyntaxKind::R_PAREN) {
            expressions::expr(p);
        }
        SyntaxKind::FOR_STMT
    };
    p.expect(SyntaxKind::R_PAREN);
    statement(p);
    p.wrap(checkpoint, kind);
}

fn return_stmt(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::RETURN_STMT);
    p.bump(); // return
    if !p.has_newline_before() && expressions::at_expr_start(p) {
        expressions::expr(p);
    }
    p.expect_semi();
    p.finish_node();
}

fn jump_stmt(p: &mut Parser<'_>) {
    let kind = if p.at(SyntaxKind::BREAK_KW) {
        SyntaxKind::BREAK_STMT
    } else {
        SyntaxKind::CONTINUE_STMT
    };
    p.start_node(kind);
    p.bump();
    if super::at_ident(p) && !p.has_newline_before() {
        super::name_ref(p);
    }
    p.expect_semi();
    p.finish_node();
}

fn throw_stmt(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::THROW_STMT);
    p.bump(); // throw
    expressions::expr(p);
    p.expect_semi();
    p.finish_node();
}

/// `try {} catch (e: T) {} finally {}`
fn try_stmt(p: &mut Parser<'_>) {
    p.start_node(SyntaxKind::TRY_STMT);
    p.bump(); // try
    block(p);
    if p.at(SyntaxKind::CATCH_KW) {
        p.start_node(SyntaxKind::CATCH_CLAUSE);
        p.bump();
        if p.eat(SyntaxKind::L_PAREN) {
            p.start_node(SyntaxKind::PARAM);
            super::name(p);
            if p.at(SyntaxKind::COLON) {
                types::type_annotation(p);
            }
            p.finish_node();
            p.expect(SyntaxKind::R_PAREN);
        }
        block(p);
        p.finish_node();
    }
    if p.at(SyntaxKind::FINALLY_KW) {
        p.start_node(SyntaxKind::FINALLY_CLAUSE);
        p.bump();
        block(p);
        p.finish_node();
    }
    p.finish_node();
}

#[cfg(test)]
mod tests {
    use crate::parser::{SyntaxKind, parse};

    fn has_kind(source: &str, kind: SyntaxKind) -> bool {
        let parse = parse(source);
        assert!(parse.ok(), "{source}: {:?}", parse.errors);
        parse.syntax().descendants().any(|n| n.kind() == kind)
    }

    #[test]
    fn test_control_flow_statements() {
        assert!(has_kind("if (a) { b() } else c()", SyntaxKind::ELSE_BRANCH));
        assert!(has_kind("while (i < 10) i++", SyntaxKind::WHILE_STMT));
        assert!(has_kind("for (let i = 0; i < n; i++) {}", SyntaxKind::FOR_STMT));
        assert!(has_kind("for (const x of xs) { use(x) }", SyntaxKind::FOR_OF_STMT));
        assert!(has_kind(
            "try { f() } catch (e: Error) { g() } finally { h() }",
            SyntaxKind::FINALLY_CLAUSE
        ));
    }

    #[test]
    fn test_return_stops_at_line_break() {
        let parse = parse("function f() {\n  return\n  1\n}");
        assert!(parse.ok());
        let ret = parse
            .syntax()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::RETURN_STMT)
            .unwrap();
        assert_eq!(ret.text().to_string(), "return");
    }
}
