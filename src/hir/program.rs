//! Immutable program snapshots.
//!
//! A [`Program`] is built once from a set of source texts and never mutated:
//! queries borrow it, and a changed file means a new program with a new
//! generation. Node handles carry the generation they were created in so a
//! handle that outlives its program fails fast instead of pointing at
//! whatever now occupies the same range.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use rayon::prelude::*;
use rowan::NodeOrToken;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::debug;

use crate::base::{FileId, LineIndex, TextRange, TextSize, normalize_path};
use crate::error::{AnalysisError, AnalysisResult};
use crate::hir::module_resolver::ModuleResolver;
use crate::hir::resolve::OverloadOracle;
use crate::hir::scopes::FileScopes;
use crate::parser::{Parse, SyntaxElement, SyntaxError, SyntaxKind, SyntaxNode, parse};
use crate::project::{ConfigLoad, ConfigProblem, ProjectConfig};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

// ============================================================================
// SOURCE FILE
// ============================================================================

/// A file that belongs to a library rather than the project.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibraryInfo {
    /// Logical module path (`std/core`) importable without a relative prefix.
    pub module_path: String,
    /// Exports are visible in every file without an import.
    pub implicit: bool,
}

/// One parsed file of a program.
#[derive(Clone)]
pub struct SourceFile {
    id: FileId,
    path: String,
    text: Arc<str>,
    parse: Parse,
    line_index: LineIndex,
    scopes: Arc<FileScopes>,
    library: Option<LibraryInfo>,
}

impl SourceFile {
    pub fn id(&self) -> FileId {
        self.id
    }

    /// Normalized path.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> TextSize {
        TextSize::of(&*self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Fresh root of the file's CST.
    pub fn syntax(&self) -> SyntaxNode {
        self.parse.syntax()
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.parse.errors
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn scopes(&self) -> &FileScopes {
        &self.scopes
    }

    pub fn library(&self) -> Option<&LibraryInfo> {
        self.library.as_ref()
    }

    /// Validate a caller-supplied offset.
    pub fn check_offset(&self, offset: u32) -> AnalysisResult<TextSize> {
        let len = self.len();
        if offset > u32::from(len) {
            return Err(AnalysisError::InvalidOffset {
                file: self.id,
                offset,
                len: len.into(),
            });
        }
        Ok(TextSize::new(offset))
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("len", &self.len())
            .field("errors", &self.parse.errors.len())
            .finish()
    }
}

// ============================================================================
// IMPORT GRAPH
// ============================================================================

/// A module specifier in an import or re-export, with its resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportEdge {
    pub specifier: SmolStr,
    /// Specifier text without quotes.
    pub range: TextRange,
    pub statement: TextRange,
    pub target: Option<FileId>,
}

/// Stable reference to a syntax element of one program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    pub generation: u64,
    pub file: FileId,
    pub range: TextRange,
    pub kind: SyntaxKind,
}

// ============================================================================
// PROGRAM
// ============================================================================

/// An immutable set of parsed files plus their import graph.
pub struct Program {
    generation: u64,
    files: IndexMap<String, SourceFile>,
    by_module: FxHashMap<String, FileId>,
    imports: Vec<Vec<ImportEdge>>,
    config: ProjectConfig,
    config_problems: Vec<ConfigProblem>,
    oracle: Option<Arc<dyn OverloadOracle>>,
}

impl Program {
    pub fn builder() -> ProgramBuilder {
        ProgramBuilder::new()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn file(&self, id: FileId) -> AnalysisResult<&SourceFile> {
        self.files
            .get_index(id.index())
            .map(|(_, file)| file)
            .ok_or_else(|| AnalysisError::UnknownFile(id.to_string()))
    }

    pub fn file_by_path(&self, path: &str) -> AnalysisResult<&SourceFile> {
        self.files
            .get(normalize_path(path).as_str())
            .ok_or_else(|| AnalysisError::UnknownFile(path.to_string()))
    }

    pub fn file_id(&self, path: &str) -> Option<FileId> {
        self.files
            .get_index_of(normalize_path(path).as_str())
            .map(|idx| FileId::new(idx as u32))
    }

    /// Files in the order they were added.
    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.values()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn config_problems(&self) -> &[ConfigProblem] {
        &self.config_problems
    }

    pub fn overload_oracle(&self) -> Option<&dyn OverloadOracle> {
        self.oracle.as_deref()
    }

    /// Import and re-export specifiers of `file`, in source order.
    pub fn imports(&self, file: FileId) -> &[ImportEdge] {
        self.imports.get(file.index()).map(Vec::as_slice).unwrap_or_default()
    }

    /// Edge of `file` whose specifier text is `specifier`.
    pub fn resolve_module(&self, file: FileId, specifier: &str) -> Option<FileId> {
        self.imports(file)
            .iter()
            .find(|edge| edge.specifier == specifier)
            .and_then(|edge| edge.target)
    }

    /// Files importing `file` directly.
    pub fn importers(&self, file: FileId) -> Vec<FileId> {
        self.imports
            .iter()
            .enumerate()
            .filter(|(_, edges)| edges.iter().any(|edge| edge.target == Some(file)))
            .map(|(idx, _)| FileId::new(idx as u32))
            .collect()
    }

    /// `file` plus every file that imports it, directly or through other
    /// importers. Cycles in the import graph are fine.
    pub fn import_closure(&self, file: FileId) -> Vec<FileId> {
        let mut seen = FxHashSet::default();
        let mut order = vec![file];
        seen.insert(file);
        let mut next = 0;
        while next < order.len() {
            let current = order[next];
            next += 1;
            for importer in self.importers(current) {
                if seen.insert(importer) {
                    order.push(importer);
                }
            }
        }
        order.sort();
        order
    }

    /// Library file registered under a logical module path.
    pub fn library_module(&self, module_path: &str) -> Option<FileId> {
        self.by_module.get(module_path).copied()
    }

    /// Library files whose exports are visible everywhere.
    pub fn implicit_libraries(&self) -> impl Iterator<Item = FileId> + '_ {
        self.files
            .values()
            .filter(|file| file.library.as_ref().is_some_and(|lib| lib.implicit))
            .map(|file| file.id)
    }

    pub fn handle(&self, file: FileId, element: &SyntaxElement) -> NodeHandle {
        NodeHandle {
            generation: self.generation,
            file,
            range: element.text_range(),
            kind: element.kind(),
        }
    }

    /// Turn a handle back into the element it was created from.
    pub fn resolve_handle(&self, handle: &NodeHandle) -> AnalysisResult<SyntaxElement> {
        if handle.generation != self.generation {
            return Err(AnalysisError::StaleHandle {
                handle: handle.generation,
                program: self.generation,
            });
        }
        let file = self.file(handle.file)?;
        let len = file.len();
        let out_of_range = || AnalysisError::InvalidOffset {
            file: handle.file,
            offset: handle.range.end().into(),
            len: len.into(),
        };
        if handle.range.end() > len {
            return Err(out_of_range());
        }

        let is_target = |kind: SyntaxKind, range: TextRange| kind == handle.kind && range == handle.range;
        let element = file.syntax().covering_element(handle.range);
        let start = match element {
            NodeOrToken::Token(token) => {
                if is_target(token.kind(), token.text_range()) {
                    return Ok(NodeOrToken::Token(token));
                }
                token.parent()
            }
            NodeOrToken::Node(node) => Some(node),
        };
        start
            .into_iter()
            .flat_map(|node| node.ancestors())
            .find(|node| is_target(node.kind(), node.text_range()))
            .map(NodeOrToken::Node)
            .ok_or_else(out_of_range)
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("generation", &self.generation)
            .field("files", &self.files.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

#[derive(Clone)]
struct Input {
    text: Arc<str>,
    library: Option<LibraryInfo>,
}

/// Collects source texts and configuration, then builds a [`Program`].
#[derive(Clone, Default)]
pub struct ProgramBuilder {
    inputs: IndexMap<String, Input>,
    config: ConfigLoad,
    oracle: Option<Arc<dyn OverloadOracle>>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a project file. Adding a path twice replaces its text.
    pub fn add_file(&mut self, path: &str, text: impl Into<Arc<str>>) -> &mut Self {
        self.insert(path, text.into(), None)
    }

    /// Add a library file importable by `module_path`.
    pub fn add_library_file(
        &mut self,
        module_path: &str,
        path: &str,
        text: impl Into<Arc<str>>,
        implicit: bool,
    ) -> &mut Self {
        let library = LibraryInfo {
            module_path: module_path.to_string(),
            implicit,
        };
        self.insert(path, text.into(), Some(library))
    }

    fn insert(&mut self, path: &str, text: Arc<str>, library: Option<LibraryInfo>) -> &mut Self {
        let path = normalize_path(path);
        match self.inputs.get_mut(&path) {
            Some(input) => {
                input.text = text;
                input.library = library;
            }
            None => {
                self.inputs.insert(path, Input { text, library });
            }
        }
        self
    }

    pub fn remove_file(&mut self, path: &str) -> bool {
        self.inputs.shift_remove(normalize_path(path).as_str()).is_some()
    }

    pub fn with_config(&mut self, load: ConfigLoad) -> &mut Self {
        self.config = load;
        self
    }

    pub fn with_overload_oracle(&mut self, oracle: Arc<dyn OverloadOracle>) -> &mut Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.inputs.keys().map(String::as_str)
    }

    /// Parse every file (in parallel), extract scopes, and resolve imports.
    pub fn build(&self) -> Program {
        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);

        let inputs: Vec<(&String, &Input)> = self.inputs.iter().collect();
        let parsed: Vec<SourceFile> = inputs
            .par_iter()
            .enumerate()
            .map(|(idx, (path, input))| {
                let parse = parse(&input.text);
                let scopes = FileScopes::collect(&parse.syntax());
                SourceFile {
                    id: FileId::new(idx as u32),
                    path: (*path).clone(),
                    text: input.text.clone(),
                    line_index: LineIndex::new(input.text.clone()),
                    parse,
                    scopes: Arc::new(scopes),
                    library: input.library.clone(),
                }
            })
            .collect();

        let mut files = IndexMap::with_capacity(parsed.len());
        let mut by_module = FxHashMap::default();
        for file in parsed {
            if let Some(library) = &file.library {
                by_module.insert(library.module_path.clone(), file.id);
            }
            files.insert(file.path.clone(), file);
        }

        let resolver = ModuleResolver {
            by_path: &files,
            by_module: &by_module,
            config: &self.config.config,
        };
        let imports: Vec<Vec<ImportEdge>> = files
            .values()
            .map(|file| {
                file.scopes
                    .module_refs()
                    .iter()
                    .map(|module_ref| ImportEdge {
                        specifier: module_ref.specifier.clone(),
                        range: module_ref.range,
                        statement: module_ref.statement,
                        target: resolver.resolve(&file.path, &module_ref.specifier),
                    })
                    .collect()
            })
            .collect();

        debug!(
            generation,
            files = files.len(),
            edges = imports.iter().map(Vec::len).sum::<usize>(),
            "built program"
        );

        Program {
            generation,
            files,
            by_module,
            imports,
            config: self.config.config.clone(),
            config_problems: self.config.problems.clone(),
            oracle: self.oracle.clone(),
        }
    }
}
