//! Syntax kinds for the Rowan-based CST
//!
//! This enum defines all possible node and token kinds in the syntax tree.
//! Matches over it are exhaustive wherever a query must decide what a node is,
//! so a new kind cannot silently fall through delimiter or binding logic.

/// All syntax kinds (tokens and nodes)
///
/// Tokens are leaf nodes (identifiers, keywords, punctuation).
/// Nodes are composite (declarations, statements, expressions, types).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments - preserved but not semantically meaningful)
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,  // identifier
    NUMBER, // 42, 3.14, 0xff
    STRING, // "hello" or 'hello'

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_BRACE,          // {
    R_BRACE,          // }
    L_BRACKET,        // [
    R_BRACKET,        // ]
    L_PAREN,          // (
    R_PAREN,          // )
    SEMICOLON,        // ;
    COLON,            // :
    COMMA,            // ,
    DOT,              // .
    DOT_DOT_DOT,      // ...
    QUESTION_DOT,     // ?.
    QUESTION,         // ?
    QUESTION_QUESTION, // ??
    EQ,               // =
    EQ_EQ,            // ==
    EQ_EQ_EQ,         // ===
    BANG_EQ,          // !=
    BANG_EQ_EQ,       // !==
    LT,               // <
    GT,               // >
    LT_EQ,            // <=
    GT_EQ,            // >=
    SHL,              // <<
    FAT_ARROW,        // =>
    PLUS,             // +
    MINUS,            // -
    STAR,             // *
    SLASH,            // /
    PERCENT,          // %
    PLUS_PLUS,        // ++
    MINUS_MINUS,      // --
    PLUS_EQ,          // +=
    MINUS_EQ,         // -=
    STAR_EQ,          // *=
    SLASH_EQ,         // /=
    BANG,             // !
    TILDE,            // ~
    AMP,              // &
    PIPE,             // |
    CARET,            // ^
    AMP_AMP,          // &&
    PIPE_PIPE,        // ||
    AT,               // @

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    IMPORT_KW,
    EXPORT_KW,
    FROM_KW,
    AS_KW,
    DEFAULT_KW,
    FUNCTION_KW,
    CLASS_KW,
    INTERFACE_KW,
    ENUM_KW,
    NAMESPACE_KW,
    TYPE_KW,
    LET_KW,
    CONST_KW,
    VAR_KW,
    RETURN_KW,
    IF_KW,
    ELSE_KW,
    WHILE_KW,
    FOR_KW,
    OF_KW,
    IN_KW,
    BREAK_KW,
    CONTINUE_KW,
    THROW_KW,
    TRY_KW,
    CATCH_KW,
    FINALLY_KW,
    NEW_KW,
    THIS_KW,
    SUPER_KW,
    EXTENDS_KW,
    IMPLEMENTS_KW,
    CONSTRUCTOR_KW,
    STATIC_KW,
    PUBLIC_KW,
    PRIVATE_KW,
    PROTECTED_KW,
    READONLY_KW,
    ABSTRACT_KW,
    DECLARE_KW,
    ASYNC_KW,
    AWAIT_KW,
    TYPEOF_KW,
    INSTANCEOF_KW,
    VOID_KW,
    TRUE_KW,
    FALSE_KW,
    NULL_KW,
    UNDEFINED_KW,

    // =========================================================================
    // NODES
    // =========================================================================
    SOURCE_FILE,

    // Names
    NAME,           // declaring occurrence
    NAME_REF,       // referencing occurrence
    QUALIFIED_NAME, // A.B.C in type position

    // Modules
    IMPORT_DECL,
    DEFAULT_IMPORT,
    NAMESPACE_IMPORT,
    NAMED_IMPORTS,
    IMPORT_SPECIFIER,
    MODULE_SPECIFIER,
    EXPORT_NAMED,
    EXPORT_SPECIFIER,
    EXPORT_ALL,
    EXPORT_DEFAULT,

    // Declarations
    MODIFIERS,
    FUNCTION_DECL,
    CLASS_DECL,
    CLASS_BODY,
    FIELD_DECL,
    METHOD_DECL,
    CONSTRUCTOR_DECL,
    INTERFACE_DECL,
    INTERFACE_BODY,
    PROPERTY_SIGNATURE,
    METHOD_SIGNATURE,
    ENUM_DECL,
    ENUM_BODY,
    ENUM_MEMBER,
    NAMESPACE_DECL,
    NAMESPACE_BODY,
    TYPE_ALIAS_DECL,
    VARIABLE_STMT,
    VARIABLE_DECLARATOR,
    HERITAGE_CLAUSE,
    PARAM_LIST,
    PARAM,
    RET_TYPE,
    TYPE_ANNOTATION,
    TYPE_PARAM_LIST,
    TYPE_PARAM,
    TYPE_ARG_LIST,
    DECORATOR,

    // Statements
    BLOCK,
    EXPR_STMT,
    RETURN_STMT,
    IF_STMT,
    ELSE_BRANCH,
    WHILE_STMT,
    FOR_STMT,
    FOR_OF_STMT,
    BREAK_STMT,
    CONTINUE_STMT,
    THROW_STMT,
    TRY_STMT,
    CATCH_CLAUSE,
    FINALLY_CLAUSE,
    EMPTY_STMT,

    // Expressions
    LITERAL,
    THIS_EXPR,
    SUPER_EXPR,
    PAREN_EXPR,
    ARRAY_LITERAL,
    OBJECT_LITERAL,
    PROPERTY_ASSIGNMENT,
    MEMBER_EXPR,
    INDEX_EXPR,
    CALL_EXPR,
    ARG_LIST,
    NEW_EXPR,
    ARROW_FUNCTION,
    FUNCTION_EXPR,
    BINARY_EXPR,
    PREFIX_EXPR,
    POSTFIX_EXPR,
    CONDITIONAL_EXPR,
    AS_EXPR,
    SPREAD_EXPR,

    // Types
    TYPE_REF,
    ARRAY_TYPE,
    UNION_TYPE,
    FUNCTION_TYPE,
    PAREN_TYPE,
    LITERAL_TYPE,

    // Special
    ERROR,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::LINE_COMMENT | Self::BLOCK_COMMENT)
    }

    /// Check if this is a comment token
    pub fn is_comment(self) -> bool {
        matches!(self, Self::LINE_COMMENT | Self::BLOCK_COMMENT)
    }

    /// Check if this is a keyword
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::IMPORT_KW as u16) && (self as u16) <= (Self::UNDEFINED_KW as u16)
    }

    /// Check if this is a punctuation token
    pub fn is_punct(self) -> bool {
        (self as u16) >= (Self::L_BRACE as u16) && (self as u16) <= (Self::AT as u16)
    }

    /// Check if this is a leaf token kind (as opposed to a composite node kind)
    pub fn is_token(self) -> bool {
        (self as u16) < (Self::SOURCE_FILE as u16)
    }

    /// Keywords that may still be used as identifiers (property names, contextual words)
    pub fn is_contextual_keyword(self) -> bool {
        matches!(
            self,
            Self::FROM_KW
                | Self::AS_KW
                | Self::OF_KW
                | Self::TYPE_KW
                | Self::NAMESPACE_KW
                | Self::CONSTRUCTOR_KW
                | Self::STATIC_KW
                | Self::PUBLIC_KW
                | Self::PRIVATE_KW
                | Self::PROTECTED_KW
                | Self::READONLY_KW
                | Self::ABSTRACT_KW
                | Self::DECLARE_KW
                | Self::ASYNC_KW
                | Self::AWAIT_KW
        )
    }

    /// Assignment operators (the left operand is written).
    pub fn is_assignment_op(self) -> bool {
        matches!(
            self,
            Self::EQ | Self::PLUS_EQ | Self::MINUS_EQ | Self::STAR_EQ | Self::SLASH_EQ
        )
    }

    /// The fixed spelling of a punctuation or keyword token, used for messages.
    pub fn text(self) -> Option<&'static str> {
        let text = match self {
            Self::L_BRACE => "{",
            Self::R_BRACE => "}",
            Self::L_BRACKET => "[",
            Self::R_BRACKET => "]",
            Self::L_PAREN => "(",
            Self::R_PAREN => ")",
            Self::SEMICOLON => ";",
            Self::COLON => ":",
            Self::COMMA => ",",
            Self::DOT => ".",
            Self::EQ => "=",
            Self::LT => "<",
            Self::GT => ">",
            Self::FAT_ARROW => "=>",
            Self::IDENT => "identifier",
            Self::FROM_KW => "from",
            Self::AS_KW => "as",
            Self::WHILE_KW => "while",
            _ => return None,
        };
        Some(text)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EtsLanguage {}

impl rowan::Language for EtsLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<EtsLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<EtsLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<EtsLanguage>;
pub type SyntaxNodeChildren = rowan::SyntaxNodeChildren<EtsLanguage>;
