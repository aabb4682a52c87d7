//! Typed AST wrappers over the untyped rowan CST.
//!
//! Each struct wraps a SyntaxNode and provides methods to access children.
//! Accessors never fail: a missing child (from error recovery) is `None`.

use super::syntax_kind::SyntaxKind;
use super::{SyntaxNode, SyntaxToken};
use rowan::{TextRange, TextSize};

/// Trait for AST nodes that wrap a SyntaxNode
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

// ============================================================================
// Helper macros
// ============================================================================

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

fn child<N: AstNode>(node: &SyntaxNode) -> Option<N> {
    node.children().find_map(N::cast)
}

fn children<N: AstNode>(node: &SyntaxNode) -> impl Iterator<Item = N> {
    node.children().filter_map(N::cast)
}

fn token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

/// First direct child node that is an expression.
fn expr_child(node: &SyntaxNode) -> Option<SyntaxNode> {
    node.children().find(|n| is_expression(n.kind()))
}

/// Whether a node kind is an expression.
pub fn is_expression(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::NAME_REF
            | SyntaxKind::LITERAL
            | SyntaxKind::THIS_EXPR
            | SyntaxKind::SUPER_EXPR
            | SyntaxKind::PAREN_EXPR
            | SyntaxKind::ARRAY_LITERAL
            | SyntaxKind::OBJECT_LITERAL
            | SyntaxKind::MEMBER_EXPR
            | SyntaxKind::INDEX_EXPR
            | SyntaxKind::CALL_EXPR
            | SyntaxKind::NEW_EXPR
            | SyntaxKind::ARROW_FUNCTION
            | SyntaxKind::FUNCTION_EXPR
            | SyntaxKind::BINARY_EXPR
            | SyntaxKind::PREFIX_EXPR
            | SyntaxKind::POSTFIX_EXPR
            | SyntaxKind::CONDITIONAL_EXPR
            | SyntaxKind::AS_EXPR
            | SyntaxKind::SPREAD_EXPR
    )
}

/// Text of a string literal without its quotes.
pub fn unquote(text: &str) -> &str {
    let inner = text
        .strip_prefix('"')
        .or_else(|| text.strip_prefix('\''))
        .unwrap_or(text);
    inner
        .strip_suffix('"')
        .or_else(|| inner.strip_suffix('\''))
        .unwrap_or(inner)
}

/// Range of a string literal's contents, without its quotes.
pub fn unquoted_range(token: &SyntaxToken) -> TextRange {
    let range = token.text_range();
    let text = token.text();
    let quoted = text.len() >= 2 && (text.starts_with('"') || text.starts_with('\''));
    if quoted {
        TextRange::new(range.start() + TextSize::new(1), range.end() - TextSize::new(1))
    } else {
        range
    }
}

// ============================================================================
// Root
// ============================================================================

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    pub fn statements(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.0.children()
    }

    pub fn imports(&self) -> impl Iterator<Item = ImportDecl> + '_ {
        children(&self.0)
    }
}

// ============================================================================
// Names
// ============================================================================

ast_node!(Name, NAME);
ast_node!(NameRef, NAME_REF);

impl Name {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0.first_token()
    }

    /// Identifier text (string-literal names are unquoted).
    pub fn text(&self) -> String {
        self.token()
            .map(|t| unquote(t.text()).to_string())
            .unwrap_or_default()
    }
}

impl NameRef {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0.first_token()
    }

    /// Identifier text (string-literal names are unquoted).
    pub fn text(&self) -> String {
        self.token()
            .map(|t| unquote(t.text()).to_string())
            .unwrap_or_default()
    }
}

ast_node!(QualifiedName, QUALIFIED_NAME);

impl QualifiedName {
    /// Left side: a `NAME_REF` or a nested `QUALIFIED_NAME`.
    pub fn qualifier(&self) -> Option<SyntaxNode> {
        self.0.first_child()
    }

    /// Rightmost segment.
    pub fn segment(&self) -> Option<NameRef> {
        self.0.children().skip(1).find_map(NameRef::cast)
    }
}

// ============================================================================
// Modules
// ============================================================================

ast_node!(ModuleSpecifier, MODULE_SPECIFIER);

impl ModuleSpecifier {
    pub fn string_token(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::STRING)
    }

    /// Specifier text without quotes.
    pub fn value(&self) -> Option<String> {
        self.string_token().map(|t| unquote(t.text()).to_string())
    }

    /// Range of the specifier text without quotes.
    pub fn value_range(&self) -> Option<TextRange> {
        self.string_token().map(|t| unquoted_range(&t))
    }
}

ast_node!(ImportDecl, IMPORT_DECL);

impl ImportDecl {
    pub fn module_specifier(&self) -> Option<ModuleSpecifier> {
        child(&self.0)
    }

    pub fn default_import(&self) -> Option<Name> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::DEFAULT_IMPORT)
            .and_then(|n| child(&n))
    }

    pub fn namespace_import(&self) -> Option<Name> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::NAMESPACE_IMPORT)
            .and_then(|n| child(&n))
    }

    pub fn named_imports(&self) -> Option<SyntaxNode> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::NAMED_IMPORTS)
    }

    pub fn specifiers(&self) -> impl Iterator<Item = ImportSpecifier> {
        self.named_imports()
            .into_iter()
            .flat_map(|named| children::<ImportSpecifier>(&named).collect::<Vec<_>>())
    }

    /// Number of local bindings this declaration introduces.
    pub fn binding_count(&self) -> usize {
        usize::from(self.default_import().is_some())
            + usize::from(self.namespace_import().is_some())
            + self.specifiers().count()
    }
}

ast_node!(ImportSpecifier, IMPORT_SPECIFIER);

impl ImportSpecifier {
    /// `imported` in `imported as local`.
    pub fn imported(&self) -> Option<NameRef> {
        child(&self.0)
    }

    pub fn local(&self) -> Option<Name> {
        child(&self.0)
    }

    /// Name looked up in the target module's exports.
    pub fn imported_name(&self) -> Option<String> {
        match self.imported() {
            Some(imported) => Some(imported.text()),
            None => self.local().map(|n| n.text()),
        }
    }
}

ast_node!(ExportNamed, EXPORT_NAMED);

impl ExportNamed {
    pub fn specifiers(&self) -> impl Iterator<Item = ExportSpecifier> {
        children(&self.0)
    }

    pub fn module_specifier(&self) -> Option<ModuleSpecifier> {
        child(&self.0)
    }
}

ast_node!(ExportSpecifier, EXPORT_SPECIFIER);

impl ExportSpecifier {
    pub fn name_ref(&self) -> Option<NameRef> {
        child(&self.0)
    }

    pub fn alias(&self) -> Option<Name> {
        child(&self.0)
    }

    /// Name visible to importers.
    pub fn exported_name(&self) -> Option<String> {
        match self.alias() {
            Some(alias) => Some(alias.text()),
            None => self.name_ref().map(|n| n.text()),
        }
    }
}

ast_node!(ExportAll, EXPORT_ALL);

impl ExportAll {
    pub fn alias(&self) -> Option<Name> {
        child(&self.0)
    }

    pub fn module_specifier(&self) -> Option<ModuleSpecifier> {
        child(&self.0)
    }
}

ast_node!(ExportDefault, EXPORT_DEFAULT);

impl ExportDefault {
    pub fn expr(&self) -> Option<SyntaxNode> {
        expr_child(&self.0)
    }
}

// ============================================================================
// Declarations
// ============================================================================

ast_node!(Modifiers, MODIFIERS);

impl Modifiers {
    pub fn has(&self, kind: SyntaxKind) -> bool {
        token(&self.0, kind).is_some()
    }

    pub fn token(&self, kind: SyntaxKind) -> Option<SyntaxToken> {
        token(&self.0, kind)
    }

    /// Identifier-spelled modifiers such as `get`/`set`.
    pub fn has_word(&self, word: &str) -> bool {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .any(|t| t.kind() == SyntaxKind::IDENT && t.text() == word)
    }
}

/// Any declaration that may carry modifiers (closed set of declaration kinds).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Declaration {
    Function(FunctionDecl),
    Class(ClassDecl),
    Interface(InterfaceDecl),
    Enum(EnumDecl),
    Namespace(NamespaceDecl),
    TypeAlias(TypeAliasDecl),
    Variable(VariableStmt),
}

impl AstNode for Declaration {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::FUNCTION_DECL
                | SyntaxKind::CLASS_DECL
                | SyntaxKind::INTERFACE_DECL
                | SyntaxKind::ENUM_DECL
                | SyntaxKind::NAMESPACE_DECL
                | SyntaxKind::TYPE_ALIAS_DECL
                | SyntaxKind::VARIABLE_STMT
        )
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::FUNCTION_DECL => Some(Self::Function(FunctionDecl(node))),
            SyntaxKind::CLASS_DECL => Some(Self::Class(ClassDecl(node))),
            SyntaxKind::INTERFACE_DECL => Some(Self::Interface(InterfaceDecl(node))),
            SyntaxKind::ENUM_DECL => Some(Self::Enum(EnumDecl(node))),
            SyntaxKind::NAMESPACE_DECL => Some(Self::Namespace(NamespaceDecl(node))),
            SyntaxKind::TYPE_ALIAS_DECL => Some(Self::TypeAlias(TypeAliasDecl(node))),
            SyntaxKind::VARIABLE_STMT => Some(Self::Variable(VariableStmt(node))),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Function(n) => n.syntax(),
            Self::Class(n) => n.syntax(),
            Self::Interface(n) => n.syntax(),
            Self::Enum(n) => n.syntax(),
            Self::Namespace(n) => n.syntax(),
            Self::TypeAlias(n) => n.syntax(),
            Self::Variable(n) => n.syntax(),
        }
    }
}

impl Declaration {
    pub fn modifiers(&self) -> Option<Modifiers> {
        child(self.syntax())
    }

    pub fn is_exported(&self) -> bool {
        self.modifiers()
            .is_some_and(|m| m.has(SyntaxKind::EXPORT_KW))
    }

    pub fn is_default_export(&self) -> bool {
        self.modifiers()
            .is_some_and(|m| m.has(SyntaxKind::EXPORT_KW) && m.has(SyntaxKind::DEFAULT_KW))
    }

    /// Declared name (variable statements have one per declarator instead).
    pub fn name(&self) -> Option<Name> {
        match self {
            Self::Variable(_) => None,
            _ => child(self.syntax()),
        }
    }
}

ast_node!(FunctionDecl, FUNCTION_DECL);

impl FunctionDecl {
    pub fn name(&self) -> Option<Name> {
        child(&self.0)
    }

    pub fn param_list(&self) -> Option<ParamList> {
        child(&self.0)
    }

    pub fn ret_type(&self) -> Option<SyntaxNode> {
        self.0.children().find(|n| n.kind() == SyntaxKind::RET_TYPE)
    }

    pub fn body(&self) -> Option<SyntaxNode> {
        self.0.children().find(|n| n.kind() == SyntaxKind::BLOCK)
    }
}

ast_node!(ClassDecl, CLASS_DECL);

impl ClassDecl {
    pub fn name(&self) -> Option<Name> {
        child(&self.0)
    }

    pub fn body(&self) -> Option<SyntaxNode> {
        self.0.children().find(|n| n.kind() == SyntaxKind::CLASS_BODY)
    }

    /// Type references in the `extends` clause.
    pub fn extends(&self) -> Vec<TypeRef> {
        heritage_types(&self.0, SyntaxKind::EXTENDS_KW)
    }
}

fn heritage_types(node: &SyntaxNode, keyword: SyntaxKind) -> Vec<TypeRef> {
    node.children()
        .filter(|n| n.kind() == SyntaxKind::HERITAGE_CLAUSE)
        .filter(|n| token(n, keyword).is_some())
        .flat_map(|n| children::<TypeRef>(&n).collect::<Vec<_>>())
        .collect()
}

ast_node!(InterfaceDecl, INTERFACE_DECL);

impl InterfaceDecl {
    pub fn name(&self) -> Option<Name> {
        child(&self.0)
    }

    pub fn body(&self) -> Option<SyntaxNode> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::INTERFACE_BODY)
    }

    pub fn extends(&self) -> Vec<TypeRef> {
        heritage_types(&self.0, SyntaxKind::EXTENDS_KW)
    }
}

ast_node!(EnumDecl, ENUM_DECL);
ast_node!(NamespaceDecl, NAMESPACE_DECL);
ast_node!(TypeAliasDecl, TYPE_ALIAS_DECL);

ast_node!(VariableStmt, VARIABLE_STMT);

impl VariableStmt {
    /// The `let`/`const`/`var` keyword.
    pub fn keyword(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| {
                matches!(
                    t.kind(),
                    SyntaxKind::LET_KW | SyntaxKind::CONST_KW | SyntaxKind::VAR_KW
                )
            })
    }

    pub fn declarators(&self) -> impl Iterator<Item = VariableDeclarator> {
        children(&self.0)
    }
}

ast_node!(VariableDeclarator, VARIABLE_DECLARATOR);

impl VariableDeclarator {
    pub fn name(&self) -> Option<Name> {
        child(&self.0)
    }

    pub fn type_annotation(&self) -> Option<SyntaxNode> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::TYPE_ANNOTATION)
    }

    pub fn initializer(&self) -> Option<SyntaxNode> {
        expr_child(&self.0)
    }
}

ast_node!(ParamList, PARAM_LIST);

impl ParamList {
    pub fn params(&self) -> impl Iterator<Item = Param> {
        children(&self.0)
    }
}

ast_node!(Param, PARAM);

impl Param {
    pub fn name(&self) -> Option<Name> {
        child(&self.0)
    }

    pub fn is_rest(&self) -> bool {
        token(&self.0, SyntaxKind::DOT_DOT_DOT).is_some()
    }

    pub fn is_this(&self) -> bool {
        token(&self.0, SyntaxKind::THIS_KW).is_some()
    }

    /// Optional through `?` or a default value.
    pub fn is_optional(&self) -> bool {
        token(&self.0, SyntaxKind::QUESTION).is_some() || token(&self.0, SyntaxKind::EQ).is_some()
    }

    pub fn type_annotation(&self) -> Option<SyntaxNode> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::TYPE_ANNOTATION)
    }

    /// Constructor parameter properties (`constructor(public x: T)`).
    pub fn is_property(&self) -> bool {
        child::<Modifiers>(&self.0).is_some_and(|m| {
            m.has(SyntaxKind::PUBLIC_KW)
                || m.has(SyntaxKind::PRIVATE_KW)
                || m.has(SyntaxKind::PROTECTED_KW)
                || m.has(SyntaxKind::READONLY_KW)
        })
    }
}

// ============================================================================
// Expressions
// ============================================================================

ast_node!(MemberExpr, MEMBER_EXPR);

impl MemberExpr {
    pub fn object(&self) -> Option<SyntaxNode> {
        self.0.first_child()
    }

    pub fn property(&self) -> Option<NameRef> {
        self.0.children().skip(1).find_map(NameRef::cast)
    }

    /// `a?.b`
    pub fn is_optional(&self) -> bool {
        token(&self.0, SyntaxKind::QUESTION_DOT).is_some()
    }
}

ast_node!(CallExpr, CALL_EXPR);

impl CallExpr {
    pub fn callee(&self) -> Option<SyntaxNode> {
        self.0.first_child()
    }

    pub fn arg_list(&self) -> Option<ArgList> {
        child(&self.0)
    }

    pub fn is_optional(&self) -> bool {
        token(&self.0, SyntaxKind::QUESTION_DOT).is_some()
    }
}

ast_node!(ArgList, ARG_LIST);

impl ArgList {
    pub fn args(&self) -> impl Iterator<Item = SyntaxNode> {
        self.0.children()
    }
}

ast_node!(NewExpr, NEW_EXPR);

impl NewExpr {
    pub fn callee(&self) -> Option<SyntaxNode> {
        expr_child(&self.0)
    }
}

ast_node!(BinaryExpr, BINARY_EXPR);

impl BinaryExpr {
    pub fn lhs(&self) -> Option<SyntaxNode> {
        self.0.children().next()
    }

    pub fn rhs(&self) -> Option<SyntaxNode> {
        self.0.children().nth(1)
    }

    /// First operator token (the second `>` of a shift is not included).
    pub fn op(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| !t.kind().is_trivia())
    }

    pub fn op_kind(&self) -> Option<SyntaxKind> {
        self.op().map(|t| t.kind())
    }
}

ast_node!(ArrowFunction, ARROW_FUNCTION);

impl ArrowFunction {
    pub fn param_list(&self) -> Option<ParamList> {
        child(&self.0)
    }

    pub fn ret_type(&self) -> Option<SyntaxNode> {
        self.0.children().find(|n| n.kind() == SyntaxKind::RET_TYPE)
    }

    pub fn fat_arrow(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::FAT_ARROW)
    }

    /// Block body or expression body.
    pub fn body(&self) -> Option<SyntaxNode> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::BLOCK || is_expression(n.kind()))
    }

    pub fn is_async(&self) -> bool {
        token(&self.0, SyntaxKind::ASYNC_KW).is_some()
    }
}

// ============================================================================
// Types
// ============================================================================

ast_node!(TypeRef, TYPE_REF);

impl TypeRef {
    /// `NAME_REF` or `QUALIFIED_NAME`.
    pub fn path(&self) -> Option<SyntaxNode> {
        self.0
            .children()
            .find(|n| matches!(n.kind(), SyntaxKind::NAME_REF | SyntaxKind::QUALIFIED_NAME))
    }

    /// Rightmost name segment of the path.
    pub fn last_segment(&self) -> Option<NameRef> {
        let path = self.path()?;
        match path.kind() {
            SyntaxKind::QUALIFIED_NAME => QualifiedName::cast(path)?.segment(),
            _ => NameRef::cast(path),
        }
    }
}
