//! Matching delimiter pairs.
//!
//! `{}`, `()` and `[]` always pair. `<` and `>` pair only as the brackets of
//! a type-argument or type-parameter list; as operators they match nothing.
//! The decision comes from the parent node kind, never from the surrounding
//! characters.

use rowan::Direction;

use crate::base::{FileId, TextSpan};
use crate::error::AnalysisResult;
use crate::hir::Program;
use crate::ide::position::touching;
use crate::parser::{SyntaxKind, SyntaxToken};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Open,
    Close,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Delimiter {
    open: SyntaxKind,
    close: SyntaxKind,
    side: Side,
}

impl Delimiter {
    fn of(token: SyntaxKind, parent: SyntaxKind) -> Option<Self> {
        use SyntaxKind::*;
        let (open, close, side) = match token {
            L_BRACE => (L_BRACE, R_BRACE, Side::Open),
            R_BRACE => (L_BRACE, R_BRACE, Side::Close),
            L_PAREN => (L_PAREN, R_PAREN, Side::Open),
            R_PAREN => (L_PAREN, R_PAREN, Side::Close),
            L_BRACKET => (L_BRACKET, R_BRACKET, Side::Open),
            R_BRACKET => (L_BRACKET, R_BRACKET, Side::Close),
            LT if brackets_with_angles(parent) => (LT, GT, Side::Open),
            GT if brackets_with_angles(parent) => (LT, GT, Side::Close),
            _ => return None,
        };
        Some(Self { open, close, side })
    }
}

/// Whether `<`/`>` directly under a node of this kind are delimiters.
fn brackets_with_angles(kind: SyntaxKind) -> bool {
    use SyntaxKind::*;
    match kind {
        TYPE_PARAM_LIST | TYPE_ARG_LIST => true,

        SOURCE_FILE | NAME | NAME_REF | QUALIFIED_NAME | IMPORT_DECL | DEFAULT_IMPORT
        | NAMESPACE_IMPORT | NAMED_IMPORTS | IMPORT_SPECIFIER | MODULE_SPECIFIER | EXPORT_NAMED
        | EXPORT_SPECIFIER | EXPORT_ALL | EXPORT_DEFAULT | MODIFIERS | FUNCTION_DECL
        | CLASS_DECL | CLASS_BODY | FIELD_DECL | METHOD_DECL | CONSTRUCTOR_DECL
        | INTERFACE_DECL | INTERFACE_BODY | PROPERTY_SIGNATURE | METHOD_SIGNATURE | ENUM_DECL
        | ENUM_BODY | ENUM_MEMBER | NAMESPACE_DECL | NAMESPACE_BODY | TYPE_ALIAS_DECL
        | VARIABLE_STMT | VARIABLE_DECLARATOR | HERITAGE_CLAUSE | PARAM_LIST | PARAM | RET_TYPE
        | TYPE_ANNOTATION | TYPE_PARAM | DECORATOR => false,

        BLOCK | EXPR_STMT | RETURN_STMT | IF_STMT | ELSE_BRANCH | WHILE_STMT | FOR_STMT
        | FOR_OF_STMT | BREAK_STMT | CONTINUE_STMT | THROW_STMT | TRY_STMT | CATCH_CLAUSE
        | FINALLY_CLAUSE | EMPTY_STMT => false,

        // comparison and shift operators live here
        LITERAL | THIS_EXPR | SUPER_EXPR | PAREN_EXPR | ARRAY_LITERAL | OBJECT_LITERAL
        | PROPERTY_ASSIGNMENT | MEMBER_EXPR | INDEX_EXPR | CALL_EXPR | ARG_LIST | NEW_EXPR
        | ARROW_FUNCTION | FUNCTION_EXPR | BINARY_EXPR | PREFIX_EXPR | POSTFIX_EXPR
        | CONDITIONAL_EXPR | AS_EXPR | SPREAD_EXPR => false,

        TYPE_REF | ARRAY_TYPE | UNION_TYPE | FUNCTION_TYPE | PAREN_TYPE | LITERAL_TYPE => false,

        ERROR | __LAST => false,

        WHITESPACE | LINE_COMMENT | BLOCK_COMMENT | IDENT | NUMBER | STRING | L_BRACE | R_BRACE
        | L_BRACKET | R_BRACKET | L_PAREN | R_PAREN | SEMICOLON | COLON | COMMA | DOT
        | DOT_DOT_DOT | QUESTION_DOT | QUESTION | QUESTION_QUESTION | EQ | EQ_EQ | EQ_EQ_EQ
        | BANG_EQ | BANG_EQ_EQ | LT | GT | LT_EQ | GT_EQ | SHL | FAT_ARROW | PLUS | MINUS
        | STAR | SLASH | PERCENT | PLUS_PLUS | MINUS_MINUS | PLUS_EQ | MINUS_EQ | STAR_EQ
        | SLASH_EQ | BANG | TILDE | AMP | PIPE | CARET | AMP_AMP | PIPE_PIPE | AT | IMPORT_KW
        | EXPORT_KW | FROM_KW | AS_KW | DEFAULT_KW | FUNCTION_KW | CLASS_KW | INTERFACE_KW
        | ENUM_KW | NAMESPACE_KW | TYPE_KW | LET_KW | CONST_KW | VAR_KW | RETURN_KW | IF_KW
        | ELSE_KW | WHILE_KW | FOR_KW | OF_KW | IN_KW | BREAK_KW | CONTINUE_KW | THROW_KW
        | TRY_KW | CATCH_KW | FINALLY_KW | NEW_KW | THIS_KW | SUPER_KW | EXTENDS_KW
        | IMPLEMENTS_KW | CONSTRUCTOR_KW | STATIC_KW | PUBLIC_KW | PRIVATE_KW | PROTECTED_KW
        | READONLY_KW | ABSTRACT_KW | DECLARE_KW | ASYNC_KW | AWAIT_KW | TYPEOF_KW
        | INSTANCEOF_KW | VOID_KW | TRUE_KW | FALSE_KW | NULL_KW | UNDEFINED_KW => false,
    }
}

/// `[open, close]` spans of the pair whose delimiter starts at `offset`, or empty.
pub fn brace_matching(program: &Program, file: FileId, offset: u32) -> AnalysisResult<Vec<TextSpan>> {
    let source = program.file(file)?;
    let offset = source.check_offset(offset)?;
    let Some(token) = touching(&source.syntax(), offset, false) else {
        return Ok(Vec::new());
    };
    if token.text_range().start() != offset {
        return Ok(Vec::new());
    }
    let Some(delimiter) = token.parent().and_then(|p| Delimiter::of(token.kind(), p.kind())) else {
        return Ok(Vec::new());
    };
    let pair = find_partner(&token, delimiter).map(|partner| match delimiter.side {
        Side::Open => vec![token.text_range().into(), partner.text_range().into()],
        Side::Close => vec![partner.text_range().into(), token.text_range().into()],
    });
    Ok(pair.unwrap_or_default())
}

/// Scan the delimiter's siblings for its partner, skipping nested pairs of the same kind.
fn find_partner(token: &SyntaxToken, delimiter: Delimiter) -> Option<SyntaxToken> {
    let (direction, same, other) = match delimiter.side {
        Side::Open => (Direction::Next, delimiter.open, delimiter.close),
        Side::Close => (Direction::Prev, delimiter.close, delimiter.open),
    };
    let mut depth = 0usize;
    for sibling in token.siblings_with_tokens(direction).skip(1) {
        let Some(sibling) = sibling.into_token() else {
            continue;
        };
        if sibling.kind() == same {
            depth += 1;
        } else if sibling.kind() == other {
            if depth == 0 {
                return Some(sibling);
            }
            depth -= 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::ProgramBuilder;

    fn matching(text: &str, offset: u32) -> Vec<(u32, u32)> {
        let program = ProgramBuilder::new().add_file("/a.ets", text).build();
        brace_matching(&program, FileId::new(0), offset)
            .unwrap()
            .into_iter()
            .map(|span| (span.start, span.length))
            .collect()
    }

    #[test]
    fn test_function_body_braces() {
        let text = "function main() { }";
        assert_eq!(matching(text, 16), vec![(16, 1), (18, 1)]);
        assert_eq!(matching(text, 18), vec![(16, 1), (18, 1)]);
        assert_eq!(matching(text, 13), vec![(13, 1), (14, 1)]);
    }

    #[test]
    fn test_generic_angles() {
        let text = "let z = new Map<Object, number>()";
        assert_eq!(matching(text, 15), vec![(15, 1), (30, 1)]);
        assert_eq!(matching(text, 30), vec![(15, 1), (30, 1)]);
    }

    #[test]
    fn test_comparison_is_not_a_pair() {
        assert!(matching("let b = a < c;", 10).is_empty());
        assert!(matching("let b = a > c;", 10).is_empty());
    }

    #[test]
    fn test_not_a_delimiter() {
        let text = "function main() { }";
        assert!(matching(text, 2).is_empty());
        assert!(matching(text, 17).is_empty());
    }

    #[test]
    fn test_empty_and_nested() {
        assert_eq!(matching("let o = {};", 8), vec![(8, 1), (9, 1)]);
        let text = "if (a) { if (b) { } }";
        assert_eq!(matching(text, 16), vec![(16, 1), (18, 1)]);
        assert_eq!(matching(text, 7), vec![(7, 1), (20, 1)]);
    }

    #[test]
    fn test_symmetry() {
        let text = "class A<T> { m(x: Array<T>): void { f((1), [2]); } }";
        for offset in 0..text.len() as u32 {
            let pair = matching(text, offset);
            if let [open, close] = pair.as_slice() {
                assert_eq!(matching(text, open.0), pair);
                assert_eq!(matching(text, close.0), pair);
            }
        }
    }
}
