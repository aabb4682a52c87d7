//! Declaration binder: from an identifier occurrence to the declaration it
//! denotes.
//!
//! Resolution is lazy and per query. A [`Binder`] borrows a [`Program`] and
//! memoizes module export lookups for as long as it lives, so a reference scan
//! over many files resolves each `(module, export name)` pair once.
//!
//! Identities are canonical: an import binding resolves to the declaration it
//! imports, through any chain of re-exports, so every alias of a declaration
//! compares equal. Namespace imports (`import * as ns`) and imports whose
//! module cannot be resolved stay as the import binding itself. An import of a
//! name the resolved module does not export resolves to nothing.

use std::cell::{Cell, RefCell};

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::{trace, warn};

use crate::base::{FileId, TextRange};
use crate::hir::program::Program;
use crate::hir::scopes::{DeclKind, Declaration, ExportTarget, ImportKind, LocalDeclId, ScopeId, TypeHint};
use crate::parser::ast::{self, AstNode};
use crate::parser::{SyntaxKind, SyntaxNode, SyntaxToken};

/// Resolution depth bound for type-hint chains (`let a = f()` where `f(): T`).
const MAX_HINT_DEPTH: u32 = 8;

/// Canonical identity of a declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DeclId {
    pub file: FileId,
    /// Range of the declaring `NAME` node.
    pub name_range: TextRange,
    pub kind: DeclKind,
}

impl DeclId {
    pub fn new(file: FileId, decl: &Declaration) -> Self {
        Self {
            file,
            name_range: decl.name_range,
            kind: decl.kind,
        }
    }
}

/// What a name resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Decl(DeclId),
    /// `export * as ns from "m"` seen through an import.
    Module(FileId),
}

impl Target {
    pub fn decl(self) -> Option<DeclId> {
        match self {
            Target::Decl(id) => Some(id),
            Target::Module(_) => None,
        }
    }
}

/// Checker capability for picking among overloads at a call site.
pub trait OverloadOracle: Send + Sync {
    /// Pick the overload called at `call` (a `CALL_EXPR` range in `file`).
    /// `None` leaves the choice to the arity fallback.
    fn select(&self, file: FileId, call: TextRange, candidates: &[DeclId]) -> Option<DeclId>;
}

/// The thing on the left of a `.`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Container {
    Module(FileId),
    /// Class, enum, or namespace referenced by name.
    Static(DeclId),
    /// A value whose type is the given class or interface.
    Instance(DeclId),
}

/// A call site: its range and argument count.
type CallSite = (TextRange, u32);

pub struct Binder<'p> {
    program: &'p Program,
    exports: RefCell<FxHashMap<(FileId, SmolStr), Option<Target>>>,
    in_progress: RefCell<FxHashSet<(FileId, SmolStr)>>,
    /// Lookups cut short by the cycle guard so far.
    cycle_cuts: Cell<u32>,
}

impl<'p> Binder<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            exports: RefCell::new(FxHashMap::default()),
            in_progress: RefCell::new(FxHashSet::default()),
            cycle_cuts: Cell::new(0),
        }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    // ------------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------------

    /// Resolve a `NAME`, `NAME_REF`, or the identifier token inside one.
    pub fn resolve(&self, file: FileId, node: &SyntaxNode) -> Option<DeclId> {
        self.resolve_target(file, node).and_then(Target::decl)
    }

    pub fn resolve_token(&self, file: FileId, token: &SyntaxToken) -> Option<DeclId> {
        self.resolve(file, &token.parent()?)
    }

    pub fn resolve_target(&self, file: FileId, node: &SyntaxNode) -> Option<Target> {
        let target = match node.kind() {
            SyntaxKind::NAME => self.resolve_name(file, node),
            SyntaxKind::NAME_REF => self.resolve_name_ref(file, node),
            _ => None,
        };
        trace!(%file, range = ?node.text_range(), ?target, "resolved");
        target
    }

    /// The declaration behind an identity.
    pub fn declaration(&self, id: &DeclId) -> Option<&'p Declaration> {
        let scopes = self.program.file(id.file).ok()?.scopes();
        scopes.decl_at(id.name_range).map(|local| scopes.decl(local))
    }

    /// Overloads and merged declarations of `id`, in source order.
    pub fn siblings(&self, id: &DeclId) -> Vec<DeclId> {
        let Ok(file) = self.program.file(id.file) else {
            return vec![*id];
        };
        let scopes = file.scopes();
        let Some(local) = scopes.decl_at(id.name_range) else {
            return vec![*id];
        };
        scopes
            .siblings(local)
            .iter()
            .map(|&sibling| DeclId::new(id.file, scopes.decl(sibling)))
            .collect()
    }

    /// Identity shared by all overloads of a symbol: the first declaration.
    pub fn symbol(&self, id: &DeclId) -> DeclId {
        self.siblings(id).first().copied().unwrap_or(*id)
    }

    /// Lexical binding of a plain identifier, without following imports.
    ///
    /// Member names (`a.b`, `A.B` right sides) and import/export specifier
    /// names have no lexical binding and return `None`.
    pub fn resolve_local(&self, file: FileId, node: &SyntaxNode) -> Option<LocalDeclId> {
        let scopes = self.program.file(file).ok()?.scopes();
        match node.kind() {
            SyntaxKind::NAME => scopes.decl_at(node.text_range()),
            SyntaxKind::NAME_REF => {
                if !is_lexical_position(node) {
                    return None;
                }
                let name = ast::NameRef::cast(node.clone())?.text();
                let scope = scopes.scope_at(node.text_range().start());
                scopes.lookup(scope, &name)?.first().copied()
            }
            _ => None,
        }
    }

    // ------------------------------------------------------------------------
    // Names
    // ------------------------------------------------------------------------

    fn resolve_name(&self, file: FileId, name: &SyntaxNode) -> Option<Target> {
        let parent = name.parent()?;
        match parent.kind() {
            // `export { a as b }`: the alias denotes whatever `a` denotes
            SyntaxKind::EXPORT_SPECIFIER => {
                let name_ref = ast::ExportSpecifier::cast(parent)?.name_ref()?;
                self.resolve_name_ref(file, name_ref.syntax())
            }
            SyntaxKind::EXPORT_ALL | SyntaxKind::PROPERTY_ASSIGNMENT => None,
            _ => {
                let scopes = self.program.file(file).ok()?.scopes();
                let local = scopes.decl_at(name.text_range())?;
                self.canonical(file, local)
            }
        }
    }

    fn resolve_name_ref(&self, file: FileId, name_ref: &SyntaxNode) -> Option<Target> {
        let text = SmolStr::new(ast::NameRef::cast(name_ref.clone())?.text());
        let parent = name_ref.parent()?;
        let is_first_child = parent
            .first_child()
            .is_some_and(|first| first.text_range() == name_ref.text_range());

        match parent.kind() {
            SyntaxKind::MEMBER_EXPR if !is_first_child => {
                let object = ast::MemberExpr::cast(parent)?.object()?;
                let container = self.container_of(file, &object, 0)?;
                self.member_in(container, &text, call_site(name_ref), file)
            }
            SyntaxKind::QUALIFIED_NAME if !is_first_child => {
                let qualifier = ast::QualifiedName::cast(parent)?.qualifier()?;
                let container = self.container_of(file, &qualifier, 0)?;
                self.member_in(container, &text, None, file)
            }
            SyntaxKind::IMPORT_SPECIFIER => {
                let import = parent.ancestors().find_map(ast::ImportDecl::cast)?;
                let specifier = import.module_specifier()?.value()?;
                let target = self.program.resolve_module(file, &specifier)?;
                self.module_export(target, &text)
            }
            SyntaxKind::EXPORT_SPECIFIER => {
                let export = parent.ancestors().find_map(ast::ExportNamed::cast)?;
                match export.module_specifier().and_then(|m| m.value()) {
                    Some(specifier) => {
                        let target = self.program.resolve_module(file, &specifier)?;
                        self.module_export(target, &text)
                    }
                    None => self.lexical(file, ScopeId::MODULE, &text, None),
                }
            }
            _ => {
                let scopes = self.program.file(file).ok()?.scopes();
                let scope = scopes.scope_at(name_ref.text_range().start());
                self.lexical(file, scope, &text, call_site(name_ref))
            }
        }
    }

    /// Scope chain first, then exports of implicitly visible libraries.
    fn lexical(&self, file: FileId, scope: ScopeId, name: &str, call: Option<CallSite>) -> Option<Target> {
        let scopes = self.program.file(file).ok()?.scopes();
        if let Some(&first) = scopes.lookup(scope, name).and_then(|ids| ids.first()) {
            return self
                .canonical(file, first)
                .map(|target| self.with_overload(target, call, file));
        }
        self.program
            .implicit_libraries()
            .filter(|&lib| lib != file)
            .find_map(|lib| self.module_export(lib, name))
            .map(|target| self.with_overload(target, call, file))
    }

    /// Follow an import binding to what it imports.
    ///
    /// `None` when the imported module resolves but has no such export.
    fn canonical(&self, file: FileId, local: LocalDeclId) -> Option<Target> {
        let decl = self.program.file(file).ok()?.scopes().decl(local);
        let own = Target::Decl(DeclId::new(file, decl));
        let Some(binding) = &decl.import else {
            return Some(own);
        };
        let name = match &binding.kind {
            ImportKind::Named(name) => name.as_str(),
            ImportKind::Default => "default",
            ImportKind::Namespace => return Some(own),
        };
        match self.program.resolve_module(file, &binding.specifier) {
            Some(target) => self.module_export(target, name),
            None => Some(own),
        }
    }

    // ------------------------------------------------------------------------
    // Modules
    // ------------------------------------------------------------------------

    /// What `file` exports under `name`, memoized per binder.
    ///
    /// A result computed while the cycle guard cut an enclosing lookup short
    /// is partial, so only the outermost lookup of a cycle is memoized.
    pub fn module_export(&self, file: FileId, name: &str) -> Option<Target> {
        let key = (file, SmolStr::new(name));
        if let Some(cached) = self.exports.borrow().get(&key) {
            return *cached;
        }
        if !self.in_progress.borrow_mut().insert(key.clone()) {
            warn!(%file, name, "re-export cycle");
            self.cycle_cuts.set(self.cycle_cuts.get() + 1);
            return None;
        }
        let cuts_before = self.cycle_cuts.get();
        let result = self.compute_export(file, name);
        let outermost = {
            let mut in_progress = self.in_progress.borrow_mut();
            in_progress.remove(&key);
            in_progress.is_empty()
        };
        if outermost || self.cycle_cuts.get() == cuts_before {
            self.exports.borrow_mut().insert(key, result);
        }
        result
    }

    fn compute_export(&self, file: FileId, name: &str) -> Option<Target> {
        let scopes = self.program.file(file).ok()?.scopes();
        match scopes.export(name) {
            Some(ExportTarget::Local(local)) => self.canonical(file, *local),
            Some(ExportTarget::LocalName { name: local, .. }) => {
                let first = scopes.lookup(ScopeId::MODULE, local)?.first().copied()?;
                self.canonical(file, first)
            }
            Some(ExportTarget::ReExport { specifier, name }) => {
                let target = self.program.resolve_module(file, specifier)?;
                self.module_export(target, name)
            }
            Some(ExportTarget::ReExportNamespace { specifier }) => {
                self.program.resolve_module(file, specifier).map(Target::Module)
            }
            None if name == "default" => None,
            None => scopes.star_exports().iter().find_map(|specifier| {
                let target = self.program.resolve_module(file, specifier)?;
                self.module_export(target, name)
            }),
        }
    }

    // ------------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------------

    fn container_of(&self, file: FileId, expr: &SyntaxNode, depth: u32) -> Option<Container> {
        if depth > MAX_HINT_DEPTH {
            return None;
        }
        match expr.kind() {
            SyntaxKind::NAME_REF => {
                let target = self.resolve_name_ref(file, expr)?;
                self.container_of_target(target, depth)
            }
            SyntaxKind::MEMBER_EXPR => {
                let property = ast::MemberExpr::cast(expr.clone())?.property()?;
                let target = self.resolve_name_ref(file, property.syntax())?;
                self.container_of_target(target, depth)
            }
            SyntaxKind::QUALIFIED_NAME => {
                let segment = ast::QualifiedName::cast(expr.clone())?.segment()?;
                let target = self.resolve_name_ref(file, segment.syntax())?;
                self.container_of_target(target, depth)
            }
            SyntaxKind::THIS_EXPR => self.enclosing_class(file, expr),
            SyntaxKind::SUPER_EXPR => {
                let container = self.enclosing_class(file, expr)?;
                let (Container::Instance(class) | Container::Static(class)) = container else {
                    return None;
                };
                let base = self.bases(&class).into_iter().next()?;
                Some(match container {
                    Container::Static(_) => Container::Static(base),
                    _ => Container::Instance(base),
                })
            }
            SyntaxKind::NEW_EXPR => {
                let callee = ast::NewExpr::cast(expr.clone())?.callee()?;
                match self.container_of(file, &callee, depth + 1)? {
                    Container::Static(class) => Some(Container::Instance(class)),
                    _ => None,
                }
            }
            SyntaxKind::CALL_EXPR => {
                let callee = ast::CallExpr::cast(expr.clone())?.callee()?;
                let name_ref = match callee.kind() {
                    SyntaxKind::MEMBER_EXPR => ast::MemberExpr::cast(callee)?.property()?.syntax().clone(),
                    SyntaxKind::NAME_REF => callee,
                    _ => return None,
                };
                let function = self.resolve_name_ref(file, &name_ref)?.decl()?;
                self.instance_type(&function, depth + 1)
            }
            SyntaxKind::PAREN_EXPR | SyntaxKind::POSTFIX_EXPR => {
                let inner = expr.children().find(|c| ast::is_expression(c.kind()))?;
                self.container_of(file, &inner, depth + 1)
            }
            SyntaxKind::AS_EXPR => {
                let type_ref = expr.children().find_map(ast::TypeRef::cast)?;
                let segment = type_ref.last_segment()?;
                let target = self.resolve_name_ref(file, segment.syntax())?.decl()?;
                type_container(target)
            }
            _ => None,
        }
    }

    fn container_of_target(&self, target: Target, depth: u32) -> Option<Container> {
        let id = match target {
            Target::Module(file) => return Some(Container::Module(file)),
            Target::Decl(id) => id,
        };
        match id.kind {
            DeclKind::Class | DeclKind::Enum | DeclKind::Namespace | DeclKind::Interface => {
                Some(Container::Static(id))
            }
            DeclKind::ImportBinding => {
                let binding = self.declaration(&id)?.import.as_ref()?;
                match binding.kind {
                    ImportKind::Namespace => self
                        .program
                        .resolve_module(id.file, &binding.specifier)
                        .map(Container::Module),
                    _ => None,
                }
            }
            DeclKind::Variable | DeclKind::ClassMember | DeclKind::Function => {
                self.instance_type(&id, depth + 1)
            }
            DeclKind::EnumMember | DeclKind::TypeParameter | DeclKind::TypeAlias => None,
        }
    }

    /// Instance container of the type a value declaration carries.
    fn instance_type(&self, id: &DeclId, depth: u32) -> Option<Container> {
        if depth > MAX_HINT_DEPTH {
            return None;
        }
        let hint = self.declaration(id)?.type_hint?;
        match hint {
            TypeHint::Type(range) => {
                let name_ref = self.name_ref_at(id.file, range)?;
                let target = self.resolve_name_ref(id.file, &name_ref)?.decl()?;
                type_container(target)
            }
            TypeHint::Call(range) => {
                let name_ref = self.name_ref_at(id.file, range)?;
                let function = self.resolve_name_ref(id.file, &name_ref)?.decl()?;
                self.instance_type(&function, depth + 1)
            }
        }
    }

    /// `this` inside a class: the instance, or the class itself in static members.
    fn enclosing_class(&self, file: FileId, node: &SyntaxNode) -> Option<Container> {
        let mut is_static = false;
        for ancestor in node.ancestors() {
            match ancestor.kind() {
                SyntaxKind::METHOD_DECL | SyntaxKind::FIELD_DECL => {
                    is_static = ancestor
                        .children()
                        .find_map(ast::Modifiers::cast)
                        .is_some_and(|m| m.has(SyntaxKind::STATIC_KW));
                }
                SyntaxKind::CLASS_DECL => {
                    let name = ast::ClassDecl::cast(ancestor)?.name()?;
                    let scopes = self.program.file(file).ok()?.scopes();
                    let local = scopes.decl_at(name.syntax().text_range())?;
                    let id = DeclId::new(file, scopes.decl(local));
                    return Some(if is_static {
                        Container::Static(id)
                    } else {
                        Container::Instance(id)
                    });
                }
                _ => {}
            }
        }
        None
    }

    fn member_in(
        &self,
        container: Container,
        name: &str,
        call: Option<CallSite>,
        call_file: FileId,
    ) -> Option<Target> {
        let target = match container {
            Container::Module(file) => self.module_export(file, name)?,
            Container::Static(id) => self.type_member(&id, name, Some(true))?,
            Container::Instance(id) => self.type_member(&id, name, Some(false))?,
        };
        Some(self.with_overload(target, call, call_file))
    }

    /// Member `name` of a class, interface, enum, or namespace, walking `extends`.
    fn type_member(&self, owner: &DeclId, name: &str, want_static: Option<bool>) -> Option<Target> {
        let mut visited = FxHashSet::default();
        let mut queue = vec![*owner];
        while let Some(current) = queue.pop() {
            if !visited.insert(current) {
                warn!(owner = ?owner, "inheritance cycle");
                continue;
            }
            if let Some(found) = self.own_member(&current, name, want_static) {
                return Some(found);
            }
            // later bases are pushed first so the first base is searched first
            queue.extend(self.bases(&current).into_iter().rev());
        }
        None
    }

    fn own_member(&self, owner: &DeclId, name: &str, want_static: Option<bool>) -> Option<Target> {
        let scopes = self.program.file(owner.file).ok()?.scopes();
        // merged namespaces and interfaces contribute members from every declaration
        for sibling in self.siblings(owner) {
            let Some(decl) = self.declaration(&sibling) else {
                continue;
            };
            let Some(members) = decl.members else {
                continue;
            };
            let scope = scopes.scope(members);
            let found = if decl.kind == DeclKind::Namespace {
                scope
                    .names(name)
                    .iter()
                    .copied()
                    .find(|&id| scopes.decl(id).exported)
            } else {
                let candidates = scope.members(name);
                let matching = candidates.iter().copied().find(|&id| {
                    let member = scopes.decl(id);
                    want_static.is_none_or(|s| decl.kind == DeclKind::Enum || member.is_static == s)
                });
                matching.or_else(|| candidates.first().copied())
            };
            if let Some(local) = found {
                return self.canonical(owner.file, local);
            }
        }
        None
    }

    /// Declarations named in the `extends` clause.
    pub fn bases(&self, id: &DeclId) -> Vec<DeclId> {
        let Some(decl) = self.declaration(id) else {
            return Vec::new();
        };
        decl.heritage
            .iter()
            .filter_map(|&range| {
                let name_ref = self.name_ref_at(id.file, range)?;
                self.resolve_name_ref(id.file, &name_ref)?.decl()
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Overloads
    // ------------------------------------------------------------------------

    fn with_overload(&self, target: Target, call: Option<CallSite>, call_file: FileId) -> Target {
        let (Target::Decl(id), Some(call)) = (target, call) else {
            return target;
        };
        let candidates = self.siblings(&id);
        if candidates.len() <= 1 {
            return target;
        }
        Target::Decl(self.pick_overload(call_file, &candidates, call))
    }

    fn pick_overload(&self, file: FileId, candidates: &[DeclId], (range, args): CallSite) -> DeclId {
        let selected = self
            .program
            .overload_oracle()
            .and_then(|oracle| oracle.select(file, range, candidates))
            .filter(|selected| candidates.contains(selected));
        if let Some(selected) = selected {
            return selected;
        }
        candidates
            .iter()
            .copied()
            .find(|candidate| {
                self.declaration(candidate)
                    .and_then(|decl| decl.arity)
                    .is_some_and(|arity| arity.accepts(args))
            })
            .unwrap_or(candidates[0])
    }

    fn name_ref_at(&self, file: FileId, range: TextRange) -> Option<SyntaxNode> {
        let root = self.program.file(file).ok()?.syntax();
        let element = root.covering_element(range);
        let start = match element {
            rowan::NodeOrToken::Node(node) => node,
            rowan::NodeOrToken::Token(token) => token.parent()?,
        };
        start
            .ancestors()
            .find(|node| node.kind() == SyntaxKind::NAME_REF && node.text_range() == range)
    }
}

fn type_container(target: DeclId) -> Option<Container> {
    match target.kind {
        DeclKind::Class | DeclKind::Interface => Some(Container::Instance(target)),
        DeclKind::Enum => Some(Container::Static(target)),
        _ => None,
    }
}

/// Whether a `NAME_REF` is looked up in the scope chain.
pub(crate) fn is_lexical_position(name_ref: &SyntaxNode) -> bool {
    let Some(parent) = name_ref.parent() else {
        return true;
    };
    let is_first_child = parent
        .first_child()
        .is_some_and(|first| first.text_range() == name_ref.text_range());
    match parent.kind() {
        SyntaxKind::MEMBER_EXPR | SyntaxKind::QUALIFIED_NAME => is_first_child,
        SyntaxKind::IMPORT_SPECIFIER => false,
        SyntaxKind::EXPORT_SPECIFIER => parent
            .ancestors()
            .find_map(ast::ExportNamed::cast)
            .is_some_and(|export| export.module_specifier().is_none()),
        _ => true,
    }
}

/// The call a callee name takes part in: `f(..)` or `a.f(..)`.
fn call_site(name_ref: &SyntaxNode) -> Option<CallSite> {
    let parent = name_ref.parent()?;
    let callee = if parent.kind() == SyntaxKind::MEMBER_EXPR {
        let property = ast::MemberExpr::cast(parent.clone())?.property()?;
        if property.syntax().text_range() != name_ref.text_range() {
            return None;
        }
        parent
    } else {
        name_ref.clone()
    };
    let call = ast::CallExpr::cast(callee.parent()?)?;
    if call.callee()?.text_range() != callee.text_range() {
        return None;
    }
    let args = call.arg_list().map_or(0, |list| list.args().count() as u32);
    Some((call.syntax().text_range(), args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::program::ProgramBuilder;

    fn program(files: &[(&str, &str)]) -> Program {
        let mut builder = ProgramBuilder::new();
        for (path, text) in files {
            builder.add_file(path, *text);
        }
        builder.build()
    }

    /// Resolve the identifier at the `n`th occurrence of `needle` in `file`.
    fn resolve_nth(program: &Program, file: u32, needle: &str, n: usize) -> Option<DeclId> {
        let file = FileId::new(file);
        let source = program.file(file).unwrap();
        let offset = source
            .text()
            .match_indices(needle)
            .nth(n)
            .map(|(idx, _)| idx)
            .unwrap();
        let token = source
            .syntax()
            .token_at_offset((offset as u32).into())
            .right_biased()
            .unwrap();
        Binder::new(program).resolve_token(file, &token)
    }

    fn decl_offset(_program: &Program, id: DeclId) -> (u32, u32) {
        (id.file.raw(), id.name_range.start().into())
    }

    const BARREL_CYCLE: [(&str, &str); 4] = [
        ("/a.ets", "export * from \"./b\";\nexport * from \"./c\";"),
        ("/b.ets", "export * from \"./a\";"),
        ("/c.ets", "export const x = 1;"),
        ("/d.ets", "import { x } from \"./a\";\nimport { x as y } from \"./b\";\nx;\ny;"),
    ];

    fn resolve_in(binder: &Binder<'_>, program: &Program, needle: &str) -> Option<(u32, u32)> {
        let file = FileId::new(3);
        let source = program.file(file).unwrap();
        let offset = source.text().find(needle).unwrap() as u32;
        let token = source.syntax().token_at_offset(offset.into()).right_biased().unwrap();
        binder
            .resolve_token(file, &token)
            .map(|id| decl_offset(program, id))
    }

    #[test]
    fn test_barrel_cycle_resolution_ignores_query_order() {
        let program = program(&BARREL_CYCLE);
        let through_c = Some((2, 13));

        let binder = Binder::new(&program);
        assert_eq!(resolve_in(&binder, &program, "x;"), through_c);
        assert_eq!(resolve_in(&binder, &program, "y;"), through_c);

        let binder = Binder::new(&program);
        assert_eq!(resolve_in(&binder, &program, "y;"), through_c);
        assert_eq!(resolve_in(&binder, &program, "x;"), through_c);
    }

    #[test]
    fn test_missing_export_resolves_to_nothing() {
        let program = program(&[
            ("/m.ets", "export const a = 1;"),
            ("/main.ets", "import { nope } from \"./m\";\nnope;"),
        ]);
        assert_eq!(resolve_nth(&program, 1, "nope", 0), None);
        assert_eq!(resolve_nth(&program, 1, "nope", 1), None);
    }

    #[test]
    fn test_local_shadowing() {
        let program = program(&[("/a.ets", "let x = 1;\nfunction f() { let x = 2; return x; }\nx;")]);
        let inner = resolve_nth(&program, 0, "x", 2).unwrap();
        assert_eq!(decl_offset(&program, inner), (0, 30));
        let outer = resolve_nth(&program, 0, "x", 3).unwrap();
        assert_eq!(decl_offset(&program, outer), (0, 4));
    }

    #[test]
    fn test_import_alias_is_canonical() {
        let program = program(&[
            ("/a.ets", "export function abc() {}"),
            ("/b.ets", "import { abc as z } from \"./a\";\nz();"),
        ]);
        let decl = resolve_nth(&program, 1, "z", 1).unwrap();
        assert_eq!(decl.kind, DeclKind::Function);
        assert_eq!(decl_offset(&program, decl), (0, 16));
        // the imported side of the specifier too
        assert_eq!(resolve_nth(&program, 1, "abc", 0), Some(decl));
    }

    #[test]
    fn test_re_export_chain_and_namespace_import() {
        let program = program(&[
            ("/a.ets", "export class Foo { static make() {} }"),
            ("/b.ets", "export { Foo as Bar } from \"./a\";\nexport * from \"./a\";"),
            ("/c.ets", "import * as ns from \"./b\";\nns.Bar.make();\nns.Foo;"),
        ]);
        let bar = resolve_nth(&program, 2, "Bar", 0).unwrap();
        assert_eq!(decl_offset(&program, bar), (0, 13));
        let foo = resolve_nth(&program, 2, "Foo", 0).unwrap();
        assert_eq!(foo, bar);
        let make = resolve_nth(&program, 2, "make", 0).unwrap();
        assert_eq!(make.kind, DeclKind::ClassMember);
    }

    #[test]
    fn test_members_through_type_hints() {
        let program = program(&[(
            "/a.ets",
            "class Base { greet() {} }\nclass A extends Base { run() { this.greet(); } }\nfunction make(): A { return new A(); }\nlet a = make();\na.run();\nnew A().greet();",
        )]);
        let greet_decl = resolve_nth(&program, 0, "greet", 0).unwrap();
        assert_eq!(resolve_nth(&program, 0, "greet", 1), Some(greet_decl));
        assert_eq!(resolve_nth(&program, 0, "greet", 2), Some(greet_decl));
        let run = resolve_nth(&program, 0, "run", 1).unwrap();
        assert_eq!(run, resolve_nth(&program, 0, "run", 0).unwrap());
    }

    #[test]
    fn test_overload_fallback_by_arity() {
        let program = program(&[(
            "/a.ets",
            "function f(a: number): void;\nfunction f(a: number, b: number): void;\nfunction f(...xs: number[]) {}\nf(1, 2);\nf();",
        )]);
        let two = resolve_nth(&program, 0, "f(", 3).unwrap();
        assert_eq!(decl_offset(&program, two), (0, 38));
        let none = resolve_nth(&program, 0, "f(", 4).unwrap();
        assert_eq!(decl_offset(&program, none), (0, 78));
        let binder = Binder::new(&program);
        assert_eq!(binder.symbol(&two), binder.symbol(&none));
    }

    struct PickLast;

    impl OverloadOracle for PickLast {
        fn select(&self, _file: FileId, _call: TextRange, candidates: &[DeclId]) -> Option<DeclId> {
            candidates.last().copied()
        }
    }

    #[test]
    fn test_overload_oracle_wins() {
        let mut builder = ProgramBuilder::new();
        builder
            .add_file("/a.ets", "function f(a: number): void;\nfunction f(a: string) {}\nf(1);")
            .with_overload_oracle(std::sync::Arc::new(PickLast));
        let program = builder.build();
        let picked = resolve_nth(&program, 0, "f(", 2).unwrap();
        assert_eq!(decl_offset(&program, picked), (0, 38));
    }

    #[test]
    fn test_unresolved_names_and_import_cycles() {
        let program = program(&[
            ("/a.ets", "export { x } from \"./b\";\nmissing;"),
            ("/b.ets", "export { x } from \"./a\";"),
            ("/c.ets", "import { x } from \"./a\";\nx;"),
        ]);
        assert_eq!(resolve_nth(&program, 0, "missing", 0), None);
        // the cycle leaves the import binding as its own identity
        let x = resolve_nth(&program, 2, "x", 1).unwrap();
        assert_eq!(x.kind, DeclKind::ImportBinding);
    }

    #[test]
    fn test_implicit_library_names() {
        let mut builder = ProgramBuilder::new();
        builder
            .add_library_file("std/core", "/std/core.d.ets", "export class Console { log(m: string): void; }\nexport let console: Console;", true)
            .add_file("/a.ets", "console.log(\"hi\");");
        let program = builder.build();
        let log = resolve_nth(&program, 1, "log", 0).unwrap();
        assert_eq!(log.file, FileId::new(0));
        assert_eq!(log.kind, DeclKind::ClassMember);
    }

    #[test]
    fn test_enum_and_namespace_members() {
        let program = program(&[(
            "/a.ets",
            "enum Color { Red, Green }\nnamespace N { export const k = 1; const hidden = 2; }\nColor.Green;\nN.k;\nN.hidden;",
        )]);
        assert_eq!(resolve_nth(&program, 0, "Green", 1).unwrap().kind, DeclKind::EnumMember);
        assert_eq!(resolve_nth(&program, 0, "k", 1).unwrap().kind, DeclKind::Variable);
        assert_eq!(resolve_nth(&program, 0, "hidden", 1), None);
    }

    #[test]
    fn test_resolve_local_ignores_members() {
        let program = program(&[("/a.ets", "import { a } from \"./m\";\nlet o = { a: 1 };\no.a;\na;")]);
        let file = program.file(FileId::new(0)).unwrap();
        let binder = Binder::new(&program);
        let root = file.syntax();
        let refs: Vec<SyntaxNode> = root
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::NAME_REF)
            .collect();
        let locals: Vec<Option<LocalDeclId>> = refs
            .iter()
            .map(|n| binder.resolve_local(FileId::new(0), n))
            .collect();
        // `o`, `a` (member), `a` (bare)
        assert!(locals[0].is_some());
        assert!(locals[1].is_none());
        assert!(locals[2].is_some());
    }
}
