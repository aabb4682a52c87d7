//! Per-file declaration extraction.
//!
//! One pass over a file's CST produces a scope tree, the declarations bound in
//! each scope, the module's export table, and every module specifier it
//! mentions. The result is plain data (`Send + Sync`), extracted in parallel
//! when a program is built and shared by every query afterwards.
//!
//! Scopes keep two tables. `names` holds what is lexically visible inside the
//! scope; `members` holds what is reachable through `x.member` on the owning
//! class, interface, enum, or namespace. Class members are never lexically
//! visible, so bare-identifier lookup needs no special casing for class bodies.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Serialize;
use smol_str::SmolStr;

use crate::base::{TextRange, TextSize};
use crate::parser::ast::{self, AstNode};
use crate::parser::{SyntaxKind, SyntaxNode};

// ============================================================================
// IDS AND KINDS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    /// The file-level scope.
    pub const MODULE: ScopeId = ScopeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a declaration within its file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalDeclId(u32);

impl LocalDeclId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Module,
    Function,
    Block,
    ClassBody,
    InterfaceBody,
    EnumBody,
    Namespace,
}

/// What a declaration declares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeclKind {
    Function,
    Class,
    Interface,
    Variable,
    Enum,
    EnumMember,
    ClassMember,
    Namespace,
    TypeParameter,
    TypeAlias,
    ImportBinding,
}

impl DeclKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Variable => "variable",
            Self::Enum => "enum",
            Self::EnumMember => "enum-member",
            Self::ClassMember => "class-member",
            Self::Namespace => "namespace",
            Self::TypeParameter => "type-parameter",
            Self::TypeAlias => "type-alias",
            Self::ImportBinding => "import-binding",
        }
    }
}

/// Accepted argument counts of a callable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arity {
    pub min: u32,
    /// `None` with a rest parameter.
    pub max: Option<u32>,
}

impl Arity {
    pub fn accepts(&self, count: u32) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }
}

/// Where the type of a value-like declaration can be read from. Both variants
/// hold the range of a `NAME_REF` in the same file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeHint {
    /// The name of the type (`x: Foo`, `new Foo()`, `y as Foo`).
    Type(TextRange),
    /// A callee whose return type is the value's type (`let x = make()`).
    Call(TextRange),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportKind {
    Named(SmolStr),
    Default,
    Namespace,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportBinding {
    pub specifier: SmolStr,
    pub kind: ImportKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub name: SmolStr,
    pub kind: DeclKind,
    /// Range of the declaring `NAME` node; the declaration's identity.
    pub name_range: TextRange,
    /// Range of the whole declaring construct.
    pub node_range: TextRange,
    /// Occurrences inside this range do not count as outside uses.
    pub self_range: TextRange,
    /// Scope whose table the name is registered in.
    pub scope: ScopeId,
    /// Registered in `members` rather than `names`.
    pub is_member: bool,
    pub exported: bool,
    pub default_export: bool,
    pub is_static: bool,
    pub is_const: bool,
    pub is_parameter: bool,
    pub arity: Option<Arity>,
    /// False for overload signatures and abstract members.
    pub has_body: bool,
    pub type_hint: Option<TypeHint>,
    /// Body scope of classes, interfaces, enums, and namespaces.
    pub members: Option<ScopeId>,
    /// `NAME_REF` ranges of the `extends` clause.
    pub heritage: Vec<TextRange>,
    pub import: Option<ImportBinding>,
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    pub range: TextRange,
    /// Declaration this scope is the body of.
    pub owner: Option<LocalDeclId>,
    names: FxHashMap<SmolStr, Vec<LocalDeclId>>,
    members: FxHashMap<SmolStr, Vec<LocalDeclId>>,
}

impl Scope {
    pub fn names(&self, name: &str) -> &[LocalDeclId] {
        self.names.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn members(&self, name: &str) -> &[LocalDeclId] {
        self.members.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn name_keys(&self) -> impl Iterator<Item = &SmolStr> {
        self.names.keys()
    }
}

/// How an export name maps back to something declared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportTarget {
    /// A declaration carrying `export` (or `export default`).
    Local(LocalDeclId),
    /// `export { name as alias }` or `export default name;`
    LocalName { name: SmolStr, range: TextRange },
    /// `export { name as alias } from "m"`
    ReExport { specifier: SmolStr, name: SmolStr },
    /// `export * as ns from "m"`
    ReExportNamespace { specifier: SmolStr },
}

/// A module specifier string in an import or re-export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleRef {
    pub specifier: SmolStr,
    /// Specifier text without quotes.
    pub range: TextRange,
    /// The import/export statement.
    pub statement: TextRange,
}

// ============================================================================
// FILE SCOPES
// ============================================================================

/// Everything declared in one file.
#[derive(Clone, Debug)]
pub struct FileScopes {
    scopes: Vec<Scope>,
    decls: Vec<Declaration>,
    by_name_range: FxHashMap<TextRange, LocalDeclId>,
    exports: IndexMap<SmolStr, ExportTarget>,
    star_exports: Vec<SmolStr>,
    module_refs: Vec<ModuleRef>,
}

impl FileScopes {
    /// Extract scopes and declarations from a parsed file.
    pub fn collect(root: &SyntaxNode) -> Self {
        let mut collector = Collector {
            scopes: Vec::new(),
            decls: Vec::new(),
            by_name_range: FxHashMap::default(),
            exports: IndexMap::new(),
            star_exports: Vec::new(),
            module_refs: Vec::new(),
        };
        let module = collector.new_scope(None, ScopeKind::Module, root.text_range(), None);
        collector.walk_children(root, module);
        FileScopes {
            scopes: collector.scopes,
            decls: collector.decls,
            by_name_range: collector.by_name_range,
            exports: collector.exports,
            star_exports: collector.star_exports,
            module_refs: collector.module_refs,
        }
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn decl(&self, id: LocalDeclId) -> &Declaration {
        &self.decls[id.index()]
    }

    pub fn decls(&self) -> impl Iterator<Item = (LocalDeclId, &Declaration)> {
        self.decls
            .iter()
            .enumerate()
            .map(|(idx, decl)| (LocalDeclId(idx as u32), decl))
    }

    /// Declaration whose `NAME` node spans `range`.
    pub fn decl_at(&self, name_range: TextRange) -> Option<LocalDeclId> {
        self.by_name_range.get(&name_range).copied()
    }

    /// Innermost scope containing `offset`.
    pub fn scope_at(&self, offset: TextSize) -> ScopeId {
        // Scopes are created parent-first and nest, so the last match is innermost.
        self.scopes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, scope)| scope.range.contains(offset))
            .map(|(idx, _)| ScopeId(idx as u32))
            .unwrap_or(ScopeId::MODULE)
    }

    /// Walk the scope chain from `scope` outwards looking for `name`.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&[LocalDeclId]> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id);
            let found = scope.names(name);
            if !found.is_empty() {
                return Some(found);
            }
            current = scope.parent;
        }
        None
    }

    /// Every name visible from `scope`, innermost first.
    pub fn visible_names(&self, scope: ScopeId) -> Vec<SmolStr> {
        let mut names = Vec::new();
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id);
            names.extend(scope.name_keys().cloned());
            current = scope.parent;
        }
        names
    }

    /// Declarations sharing `id`'s name in the same table (overloads, merges).
    pub fn siblings(&self, id: LocalDeclId) -> &[LocalDeclId] {
        let decl = self.decl(id);
        let scope = self.scope(decl.scope);
        if decl.is_member {
            scope.members(&decl.name)
        } else {
            scope.names(&decl.name)
        }
    }

    pub fn export(&self, name: &str) -> Option<&ExportTarget> {
        self.exports.get(name)
    }

    pub fn exports(&self) -> impl Iterator<Item = (&SmolStr, &ExportTarget)> {
        self.exports.iter()
    }

    pub fn star_exports(&self) -> &[SmolStr] {
        &self.star_exports
    }

    pub fn module_refs(&self) -> &[ModuleRef] {
        &self.module_refs
    }
}

// ============================================================================
// COLLECTOR
// ============================================================================

struct Collector {
    scopes: Vec<Scope>,
    decls: Vec<Declaration>,
    by_name_range: FxHashMap<TextRange, LocalDeclId>,
    exports: IndexMap<SmolStr, ExportTarget>,
    star_exports: Vec<SmolStr>,
    module_refs: Vec<ModuleRef>,
}

impl Collector {
    fn new_scope(
        &mut self,
        parent: Option<ScopeId>,
        kind: ScopeKind,
        range: TextRange,
        owner: Option<LocalDeclId>,
    ) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent,
            kind,
            range,
            owner,
            names: FxHashMap::default(),
            members: FxHashMap::default(),
        });
        id
    }

    fn declare(
        &mut self,
        scope: ScopeId,
        is_member: bool,
        name: &ast::Name,
        kind: DeclKind,
        node: &SyntaxNode,
    ) -> LocalDeclId {
        let id = LocalDeclId(self.decls.len() as u32);
        let name_text = SmolStr::new(name.text());
        let name_range = name.syntax().text_range();
        self.decls.push(Declaration {
            name: name_text.clone(),
            kind,
            name_range,
            node_range: node.text_range(),
            self_range: node.text_range(),
            scope,
            is_member,
            exported: false,
            default_export: false,
            is_static: false,
            is_const: false,
            is_parameter: false,
            arity: None,
            has_body: true,
            type_hint: None,
            members: None,
            heritage: Vec::new(),
            import: None,
        });
        self.register(scope, is_member, name_text, id);
        self.by_name_range.insert(name_range, id);
        id
    }

    fn register(&mut self, scope: ScopeId, is_member: bool, name: SmolStr, id: LocalDeclId) {
        let scope = &mut self.scopes[scope.index()];
        let table = if is_member {
            &mut scope.members
        } else {
            &mut scope.names
        };
        table.entry(name).or_default().push(id);
    }

    fn decl_mut(&mut self, id: LocalDeclId) -> &mut Declaration {
        &mut self.decls[id.index()]
    }

    /// Record modifiers and, at module level, the export.
    fn mark_exported(&mut self, id: LocalDeclId, decl: &ast::Declaration, scope: ScopeId) {
        let exported = decl.is_exported();
        let default_export = decl.is_default_export();
        {
            let entry = self.decl_mut(id);
            entry.exported = exported;
            entry.default_export = default_export;
        }
        if exported && scope == ScopeId::MODULE {
            let key = if default_export {
                SmolStr::new_static("default")
            } else {
                self.decls[id.index()].name.clone()
            };
            self.exports.entry(key).or_insert(ExportTarget::Local(id));
        }
    }

    fn walk_children(&mut self, node: &SyntaxNode, scope: ScopeId) {
        for child in node.children() {
            self.walk(&child, scope);
        }
    }

    fn walk(&mut self, node: &SyntaxNode, scope: ScopeId) {
        match node.kind() {
            SyntaxKind::IMPORT_DECL => self.import_decl(node, scope),
            SyntaxKind::EXPORT_NAMED => self.export_named(node, scope),
            SyntaxKind::EXPORT_ALL => self.export_all(node, scope),
            SyntaxKind::EXPORT_DEFAULT => {
                self.export_default(node, scope);
                self.walk_children(node, scope);
            }
            SyntaxKind::FUNCTION_DECL => self.function_decl(node, scope),
            SyntaxKind::CLASS_DECL => self.class_decl(node, scope),
            SyntaxKind::INTERFACE_DECL => self.interface_decl(node, scope),
            SyntaxKind::ENUM_DECL => self.enum_decl(node, scope),
            SyntaxKind::NAMESPACE_DECL => self.namespace_decl(node, scope),
            SyntaxKind::TYPE_ALIAS_DECL => self.type_alias_decl(node, scope),
            SyntaxKind::VARIABLE_STMT => self.variable_stmt(node, scope),
            SyntaxKind::BLOCK | SyntaxKind::FOR_STMT | SyntaxKind::FOR_OF_STMT => {
                let inner = self.new_scope(Some(scope), ScopeKind::Block, node.text_range(), None);
                self.walk_children(node, inner);
            }
            SyntaxKind::CATCH_CLAUSE => {
                let inner = self.new_scope(Some(scope), ScopeKind::Block, node.text_range(), None);
                let param = node.children().find_map(ast::Param::cast);
                if let Some((param, name)) = param.and_then(|p| p.name().map(|n| (p, n))) {
                    let id = self.declare(inner, false, &name, DeclKind::Variable, param.syntax());
                    self.decl_mut(id).is_parameter = true;
                }
                self.walk_children(node, inner);
            }
            SyntaxKind::ARROW_FUNCTION => {
                self.function_scope(node, scope, None, None);
            }
            SyntaxKind::FUNCTION_EXPR => {
                let inner = self.function_scope(node, scope, None, None);
                if let Some(name) = node.children().find_map(ast::Name::cast) {
                    self.declare(inner, false, &name, DeclKind::Function, node);
                }
            }
            SyntaxKind::PROPERTY_ASSIGNMENT
                if node.children().any(|c| c.kind() == SyntaxKind::PARAM_LIST) =>
            {
                self.function_scope(node, scope, None, None);
            }
            _ => self.walk_children(node, scope),
        }
    }

    /// Scope for a function-like node: type parameters, parameters, then body.
    ///
    /// `param_members` receives constructor parameter properties.
    fn function_scope(
        &mut self,
        node: &SyntaxNode,
        parent: ScopeId,
        owner: Option<LocalDeclId>,
        param_members: Option<ScopeId>,
    ) -> ScopeId {
        let scope = self.new_scope(Some(parent), ScopeKind::Function, node.text_range(), owner);
        self.type_params(node, scope);
        if let Some(params) = node.children().find_map(ast::ParamList::cast) {
            for param in params.params() {
                let Some(name) = param.name() else {
                    continue;
                };
                let hint = param.type_annotation().and_then(|t| type_hint_of(&t));
                let id = match param_members {
                    Some(members) if param.is_property() => {
                        let id =
                            self.declare(members, true, &name, DeclKind::ClassMember, param.syntax());
                        self.register(scope, false, SmolStr::new(name.text()), id);
                        id
                    }
                    _ => self.declare(scope, false, &name, DeclKind::Variable, param.syntax()),
                };
                let decl = self.decl_mut(id);
                decl.is_parameter = true;
                decl.type_hint = hint;
            }
        }
        for child in node.children() {
            match child.kind() {
                SyntaxKind::BLOCK => self.walk_children(&child, scope),
                SyntaxKind::NAME | SyntaxKind::TYPE_PARAM_LIST => {}
                _ => self.walk(&child, scope),
            }
        }
        scope
    }

    fn type_params(&mut self, owner: &SyntaxNode, scope: ScopeId) {
        let Some(list) = owner
            .children()
            .find(|c| c.kind() == SyntaxKind::TYPE_PARAM_LIST)
        else {
            return;
        };
        // Uses inside the owner's signature belong to the declaration itself.
        let signature_end = owner
            .children()
            .find(|c| {
                matches!(
                    c.kind(),
                    SyntaxKind::BLOCK
                        | SyntaxKind::CLASS_BODY
                        | SyntaxKind::INTERFACE_BODY
                        | SyntaxKind::ENUM_BODY
                )
            })
            .map(|body| body.text_range().start())
            .unwrap_or_else(|| owner.text_range().end());
        let self_range = TextRange::new(owner.text_range().start(), signature_end);
        for param in list.children().filter(|c| c.kind() == SyntaxKind::TYPE_PARAM) {
            if let Some(name) = param.children().find_map(ast::Name::cast) {
                let id = self.declare(scope, false, &name, DeclKind::TypeParameter, &param);
                self.decl_mut(id).self_range = self_range;
            }
        }
    }

    // ------------------------------------------------------------------------
    // Modules
    // ------------------------------------------------------------------------

    fn module_ref(&mut self, specifier: Option<ast::ModuleSpecifier>, statement: &SyntaxNode) -> Option<SmolStr> {
        let specifier = specifier?;
        let value = SmolStr::new(specifier.value()?);
        let range = specifier.value_range()?;
        self.module_refs.push(ModuleRef {
            specifier: value.clone(),
            range,
            statement: statement.text_range(),
        });
        Some(value)
    }

    fn import_decl(&mut self, node: &SyntaxNode, scope: ScopeId) {
        let Some(import) = ast::ImportDecl::cast(node.clone()) else {
            return;
        };
        let specifier = self
            .module_ref(import.module_specifier(), node)
            .unwrap_or_default();

        let bind = |this: &mut Self, name: ast::Name, kind: ImportKind| {
            let holder = name.syntax().parent().unwrap_or_else(|| node.clone());
            let id = this.declare(scope, false, &name, DeclKind::ImportBinding, &holder);
            this.decl_mut(id).import = Some(ImportBinding {
                specifier: specifier.clone(),
                kind,
            });
        };

        if let Some(name) = import.default_import() {
            bind(self, name, ImportKind::Default);
        }
        if let Some(name) = import.namespace_import() {
            bind(self, name, ImportKind::Namespace);
        }
        for spec in import.specifiers() {
            let (Some(local), Some(imported)) = (spec.local(), spec.imported_name()) else {
                continue;
            };
            bind(self, local, ImportKind::Named(SmolStr::new(imported)));
        }
    }

    fn export_named(&mut self, node: &SyntaxNode, scope: ScopeId) {
        let Some(export) = ast::ExportNamed::cast(node.clone()) else {
            return;
        };
        let source = self.module_ref(export.module_specifier(), node);
        if scope != ScopeId::MODULE {
            return;
        }
        for spec in export.specifiers() {
            let (Some(exported), Some(name_ref)) = (spec.exported_name(), spec.name_ref()) else {
                continue;
            };
            let target = match &source {
                Some(specifier) => ExportTarget::ReExport {
                    specifier: specifier.clone(),
                    name: SmolStr::new(name_ref.text()),
                },
                None => ExportTarget::LocalName {
                    name: SmolStr::new(name_ref.text()),
                    range: name_ref.syntax().text_range(),
                },
            };
            self.exports.entry(SmolStr::new(exported)).or_insert(target);
        }
    }

    fn export_all(&mut self, node: &SyntaxNode, scope: ScopeId) {
        let Some(export) = ast::ExportAll::cast(node.clone()) else {
            return;
        };
        let Some(specifier) = self.module_ref(export.module_specifier(), node) else {
            return;
        };
        if scope != ScopeId::MODULE {
            return;
        }
        match export.alias() {
            Some(alias) => {
                self.exports
                    .entry(SmolStr::new(alias.text()))
                    .or_insert(ExportTarget::ReExportNamespace { specifier });
            }
            None => self.star_exports.push(specifier),
        }
    }

    fn export_default(&mut self, node: &SyntaxNode, scope: ScopeId) {
        let Some(export) = ast::ExportDefault::cast(node.clone()) else {
            return;
        };
        if scope != ScopeId::MODULE {
            return;
        }
        if let Some(name_ref) = export.expr().and_then(ast::NameRef::cast) {
            self.exports
                .entry(SmolStr::new_static("default"))
                .or_insert(ExportTarget::LocalName {
                    name: SmolStr::new(name_ref.text()),
                    range: name_ref.syntax().text_range(),
                });
        }
    }

    // ------------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------------

    fn function_decl(&mut self, node: &SyntaxNode, scope: ScopeId) {
        let Some(function) = ast::FunctionDecl::cast(node.clone()) else {
            return;
        };
        let id = function.name().map(|name| {
            let id = self.declare(scope, false, &name, DeclKind::Function, node);
            self.mark_exported(id, &ast::Declaration::Function(function.clone()), scope);
            let decl = self.decl_mut(id);
            decl.arity = function.param_list().map(|p| arity_of(&p));
            decl.has_body = function.body().is_some();
            decl.type_hint = function.ret_type().and_then(|t| type_hint_of(&t));
            id
        });
        self.function_scope(node, scope, id, None);
    }

    fn class_decl(&mut self, node: &SyntaxNode, scope: ScopeId) {
        let Some(class) = ast::ClassDecl::cast(node.clone()) else {
            return;
        };
        let id = class.name().map(|name| {
            let id = self.declare(scope, false, &name, DeclKind::Class, node);
            self.mark_exported(id, &ast::Declaration::Class(class.clone()), scope);
            id
        });
        let members = self.new_scope(Some(scope), ScopeKind::ClassBody, node.text_range(), id);
        if let Some(id) = id {
            let heritage = heritage_ranges(class.extends());
            let decl = self.decl_mut(id);
            decl.members = Some(members);
            decl.heritage = heritage;
        }
        self.type_params(node, members);

        for child in node.children() {
            match child.kind() {
                SyntaxKind::CLASS_BODY => {
                    for member in child.children() {
                        self.class_member(&member, members);
                    }
                }
                SyntaxKind::NAME | SyntaxKind::TYPE_PARAM_LIST => {}
                _ => self.walk(&child, members),
            }
        }
    }

    fn class_member(&mut self, node: &SyntaxNode, members: ScopeId) {
        let is_static = node
            .children()
            .find_map(ast::Modifiers::cast)
            .is_some_and(|m| m.has(SyntaxKind::STATIC_KW));
        let name = node.children().find_map(ast::Name::cast);
        match node.kind() {
            SyntaxKind::METHOD_DECL => {
                let id = name.map(|name| {
                    let id = self.declare(members, true, &name, DeclKind::ClassMember, node);
                    let decl = self.decl_mut(id);
                    decl.is_static = is_static;
                    id
                });
                if let Some(id) = id {
                    let arity = node.children().find_map(ast::ParamList::cast).map(|p| arity_of(&p));
                    let has_body = node.children().any(|c| c.kind() == SyntaxKind::BLOCK);
                    let hint = node
                        .children()
                        .find(|c| c.kind() == SyntaxKind::RET_TYPE)
                        .and_then(|t| type_hint_of(&t));
                    let decl = self.decl_mut(id);
                    decl.arity = arity;
                    decl.has_body = has_body;
                    decl.type_hint = hint;
                }
                self.function_scope(node, members, None, None);
            }
            SyntaxKind::FIELD_DECL => {
                if let Some(name) = name {
                    let id = self.declare(members, true, &name, DeclKind::ClassMember, node);
                    let hint = node
                        .children()
                        .find(|c| c.kind() == SyntaxKind::TYPE_ANNOTATION)
                        .and_then(|t| type_hint_of(&t))
                        .or_else(|| {
                            node.children()
                                .find(|c| ast::is_expression(c.kind()))
                                .and_then(|init| initializer_hint(&init))
                        });
                    let decl = self.decl_mut(id);
                    decl.is_static = is_static;
                    decl.type_hint = hint;
                }
                for child in node.children() {
                    if child.kind() != SyntaxKind::NAME {
                        self.walk(&child, members);
                    }
                }
            }
            SyntaxKind::CONSTRUCTOR_DECL => {
                self.function_scope(node, members, None, Some(members));
            }
            _ => self.walk(node, members),
        }
    }

    fn interface_decl(&mut self, node: &SyntaxNode, scope: ScopeId) {
        let Some(interface) = ast::InterfaceDecl::cast(node.clone()) else {
            return;
        };
        let id = interface.name().map(|name| {
            let id = self.declare(scope, false, &name, DeclKind::Interface, node);
            self.mark_exported(id, &ast::Declaration::Interface(interface.clone()), scope);
            id
        });
        let members = self.new_scope(Some(scope), ScopeKind::InterfaceBody, node.text_range(), id);
        if let Some(id) = id {
            let heritage = heritage_ranges(interface.extends());
            let decl = self.decl_mut(id);
            decl.members = Some(members);
            decl.heritage = heritage;
        }
        self.type_params(node, members);

        let Some(body) = interface.body() else {
            return;
        };
        for member in body.children() {
            let name = member.children().find_map(ast::Name::cast);
            match member.kind() {
                SyntaxKind::PROPERTY_SIGNATURE => {
                    // index signatures declare a parameter, not a member
                    let is_index = member.children().any(|c| c.kind() == SyntaxKind::PARAM);
                    if let Some(name) = name.filter(|_| !is_index) {
                        let id = self.declare(members, true, &name, DeclKind::ClassMember, &member);
                        self.decl_mut(id).type_hint = member
                            .children()
                            .find(|c| c.kind() == SyntaxKind::TYPE_ANNOTATION)
                            .and_then(|t| type_hint_of(&t));
                    }
                    self.walk_children(&member, members);
                }
                SyntaxKind::METHOD_SIGNATURE => {
                    if let Some(name) = name {
                        let id = self.declare(members, true, &name, DeclKind::ClassMember, &member);
                        let arity = member.children().find_map(ast::ParamList::cast).map(|p| arity_of(&p));
                        let hint = member
                            .children()
                            .find(|c| c.kind() == SyntaxKind::RET_TYPE)
                            .and_then(|t| type_hint_of(&t));
                        let decl = self.decl_mut(id);
                        decl.arity = arity;
                        decl.has_body = false;
                        decl.type_hint = hint;
                    }
                    self.function_scope(&member, members, None, None);
                }
                _ => self.walk(&member, members),
            }
        }
    }

    fn enum_decl(&mut self, node: &SyntaxNode, scope: ScopeId) {
        let name = node.children().find_map(ast::Name::cast);
        let id = name.map(|name| {
            let id = self.declare(scope, false, &name, DeclKind::Enum, node);
            if let Some(decl) = ast::Declaration::cast(node.clone()) {
                self.mark_exported(id, &decl, scope);
            }
            id
        });
        let members = self.new_scope(Some(scope), ScopeKind::EnumBody, node.text_range(), id);
        if let Some(id) = id {
            self.decl_mut(id).members = Some(members);
        }
        let Some(body) = node.children().find(|c| c.kind() == SyntaxKind::ENUM_BODY) else {
            return;
        };
        for member in body.children().filter(|c| c.kind() == SyntaxKind::ENUM_MEMBER) {
            if let Some(name) = member.children().find_map(ast::Name::cast) {
                let id = self.declare(members, true, &name, DeclKind::EnumMember, &member);
                self.decl_mut(id).is_static = true;
            }
            self.walk_children(&member, members);
        }
    }

    fn namespace_decl(&mut self, node: &SyntaxNode, scope: ScopeId) {
        let name = node.children().find_map(ast::Name::cast);
        let id = name.map(|name| {
            let id = self.declare(scope, false, &name, DeclKind::Namespace, node);
            if let Some(decl) = ast::Declaration::cast(node.clone()) {
                self.mark_exported(id, &decl, scope);
            }
            id
        });
        let inner = self.new_scope(Some(scope), ScopeKind::Namespace, node.text_range(), id);
        if let Some(id) = id {
            self.decl_mut(id).members = Some(inner);
        }
        if let Some(body) = node.children().find(|c| c.kind() == SyntaxKind::NAMESPACE_BODY) {
            self.walk_children(&body, inner);
        }
    }

    fn type_alias_decl(&mut self, node: &SyntaxNode, scope: ScopeId) {
        if let Some(name) = node.children().find_map(ast::Name::cast) {
            let id = self.declare(scope, false, &name, DeclKind::TypeAlias, node);
            if let Some(decl) = ast::Declaration::cast(node.clone()) {
                self.mark_exported(id, &decl, scope);
            }
        }
        let inner = self.new_scope(Some(scope), ScopeKind::Block, node.text_range(), None);
        self.type_params(node, inner);
        for child in node.children() {
            if !matches!(child.kind(), SyntaxKind::NAME | SyntaxKind::TYPE_PARAM_LIST) {
                self.walk(&child, inner);
            }
        }
    }

    fn variable_stmt(&mut self, node: &SyntaxNode, scope: ScopeId) {
        let Some(stmt) = ast::VariableStmt::cast(node.clone()) else {
            return;
        };
        let is_const = stmt
            .keyword()
            .is_some_and(|k| k.kind() == SyntaxKind::CONST_KW);
        let declaration = ast::Declaration::Variable(stmt.clone());
        for declarator in stmt.declarators() {
            if let Some(name) = declarator.name() {
                let id = self.declare(scope, false, &name, DeclKind::Variable, declarator.syntax());
                self.mark_exported(id, &declaration, scope);
                let hint = declarator
                    .type_annotation()
                    .and_then(|t| type_hint_of(&t))
                    .or_else(|| declarator.initializer().and_then(|i| initializer_hint(&i)));
                let decl = self.decl_mut(id);
                decl.is_const = is_const;
                decl.type_hint = hint;
            }
            self.walk_children(declarator.syntax(), scope);
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn arity_of(params: &ast::ParamList) -> Arity {
    let mut min = 0;
    let mut max = 0;
    let mut rest = false;
    for param in params.params().filter(|p| !p.is_this()) {
        if param.is_rest() {
            rest = true;
        } else {
            max += 1;
            if !param.is_optional() {
                min += 1;
            }
        }
    }
    Arity {
        min,
        max: (!rest).then_some(max),
    }
}

/// Built-in types with no declaration to look members up in.
const PRIMITIVE_TYPES: &[&str] = &[
    "number", "string", "boolean", "void", "any", "unknown", "never", "object", "bigint", "symbol", "undefined",
    "null",
];

/// Type name of a `TYPE_ANNOTATION`/`RET_TYPE` when it is a plain type reference.
fn type_hint_of(annotation: &SyntaxNode) -> Option<TypeHint> {
    annotation.children().find_map(ast::TypeRef::cast).and_then(type_ref_hint)
}

fn type_ref_hint(type_ref: ast::TypeRef) -> Option<TypeHint> {
    let segment = type_ref.last_segment()?;
    let qualified = type_ref.path().is_some_and(|p| p.kind() == SyntaxKind::QUALIFIED_NAME);
    if !qualified && PRIMITIVE_TYPES.contains(&segment.text().as_str()) {
        return None;
    }
    Some(TypeHint::Type(segment.syntax().text_range()))
}

/// Type implied by an initializer expression.
fn initializer_hint(init: &SyntaxNode) -> Option<TypeHint> {
    match init.kind() {
        SyntaxKind::NEW_EXPR => {
            let callee = ast::NewExpr::cast(init.clone())?.callee()?;
            callee_name(&callee).map(TypeHint::Type)
        }
        SyntaxKind::CALL_EXPR => {
            let callee = ast::CallExpr::cast(init.clone())?.callee()?;
            callee_name(&callee).map(TypeHint::Call)
        }
        SyntaxKind::AS_EXPR => init.children().find_map(ast::TypeRef::cast).and_then(type_ref_hint),
        SyntaxKind::PAREN_EXPR => init
            .children()
            .find(|c| ast::is_expression(c.kind()))
            .and_then(|inner| initializer_hint(&inner)),
        _ => None,
    }
}

/// The `NAME_REF` naming a callee: `f` in `f()`, `g` in `a.g()`.
fn callee_name(callee: &SyntaxNode) -> Option<TextRange> {
    match callee.kind() {
        SyntaxKind::NAME_REF => Some(callee.text_range()),
        SyntaxKind::MEMBER_EXPR => Some(ast::MemberExpr::cast(callee.clone())?.property()?.syntax().text_range()),
        _ => None,
    }
}

fn heritage_ranges(types: Vec<ast::TypeRef>) -> Vec<TextRange> {
    types
        .iter()
        .filter_map(|t| t.last_segment())
        .map(|segment| segment.syntax().text_range())
        .collect()
}
