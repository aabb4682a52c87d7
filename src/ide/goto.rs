//! Go-to-definition implementation.

use smol_str::SmolStr;

use crate::base::{FileId, TextSpan};
use crate::error::AnalysisResult;
use crate::hir::{Binder, DeclId, DeclKind, Target};
use crate::ide::position::{name_at, touching};
use crate::parser::SyntaxKind;

/// A target location for go-to-definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GotoTarget {
    /// The file containing the target.
    pub file: FileId,
    pub file_name: String,
    /// Span of the declaring name; empty at offset 0 for a module target.
    pub span: TextSpan,
    /// `None` when the target is a whole module.
    pub kind: Option<DeclKind>,
    pub name: SmolStr,
}

/// Resolve the identifier at `offset` to the declaration(s) it denotes.
///
/// Overloaded functions yield every overload, the one picked for the call site
/// first. A module specifier string yields the module's file.
pub fn definition_at_position(binder: &Binder<'_>, file: FileId, offset: u32) -> AnalysisResult<Vec<GotoTarget>> {
    let program = binder.program();
    let source = program.file(file)?;
    let offset = source.check_offset(offset)?;
    let root = source.syntax();

    if let Some(token) = touching(&root, offset, false).filter(|t| t.kind() == SyntaxKind::STRING) {
        let is_specifier = token.parent().is_some_and(|p| p.kind() == SyntaxKind::MODULE_SPECIFIER);
        let target = is_specifier
            .then(|| program.resolve_module(file, crate::parser::ast::unquote(token.text())))
            .flatten();
        return Ok(target.into_iter().filter_map(|id| module_target(binder, id)).collect());
    }

    let Some(name) = name_at(&root, offset) else {
        return Ok(Vec::new());
    };
    let targets = match binder.resolve_target(file, &name) {
        Some(Target::Decl(id)) => {
            let mut ids = vec![id];
            ids.extend(binder.siblings(&id).into_iter().filter(|sibling| *sibling != id));
            ids.iter().filter_map(|id| decl_target(binder, id)).collect()
        }
        Some(Target::Module(id)) => module_target(binder, id).into_iter().collect(),
        None => Vec::new(),
    };
    Ok(targets)
}

fn decl_target(binder: &Binder<'_>, id: &DeclId) -> Option<GotoTarget> {
    let decl = binder.declaration(id)?;
    let file = binder.program().file(id.file).ok()?;
    Some(GotoTarget {
        file: id.file,
        file_name: file.path().to_string(),
        span: id.name_range.into(),
        kind: Some(decl.kind),
        name: decl.name.clone(),
    })
}

fn module_target(binder: &Binder<'_>, id: FileId) -> Option<GotoTarget> {
    let file = binder.program().file(id).ok()?;
    Some(GotoTarget {
        file: id,
        file_name: file.path().to_string(),
        span: TextSpan::default(),
        kind: None,
        name: SmolStr::new(crate::base::file_name(file.path())),
    })
}
