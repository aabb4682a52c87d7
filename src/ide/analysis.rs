//! AnalysisHost and Analysis: state management for every query.
//!
//! The `AnalysisHost` owns the mutable inputs (file texts, configuration,
//! fix and refactor registries) and hands out `Analysis` snapshots. A
//! snapshot borrows one immutable [`Program`]; every query it answers sees
//! the same generation.
//!
//! ## Usage
//!
//! ```ignore
//! let mut host = AnalysisHost::new();
//! host.set_file_content("/p/main.ets", "let x = 1;");
//!
//! let analysis = host.analysis();
//! let file = analysis.file_id("/p/main.ets").unwrap();
//! let token = analysis.touching_token(file, 4, false)?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::base::{DiagnosticCode, FileId, TextSpan};
use crate::error::AnalysisResult;
use crate::hir::{Binder, OverloadOracle, Program, ProgramBuilder};
use crate::project::{ConfigFiles, ConfigLoad, load_project_config};

use super::{
    CancellationHost, CancellationToken, CodeFixAction, CodeFixRegistry, Diagnostic, DiagnosticReferences,
    FormatCodeOptions, GotoTarget, RefactorActionInfo, RefactorRegistry, ReferenceInfo, RenameLocation,
    TodoComment, TodoCommentDescriptor, TokenInfo,
};

/// Owns all inputs of the analysis layer.
///
/// Apply changes via `set_file_content()` and `remove_file()`, then get a
/// consistent snapshot via `analysis()`.
pub struct AnalysisHost {
    builder: ProgramBuilder,
    program: Option<Program>,
    code_fixes: CodeFixRegistry,
    refactors: RefactorRegistry,
    cancellation_host: Option<Arc<dyn CancellationHost>>,
    cancellation_throttle: Duration,
}

impl Default for AnalysisHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisHost {
    /// A host with the default fix and refactor providers.
    pub fn new() -> Self {
        Self::with_registries(CodeFixRegistry::with_defaults(), RefactorRegistry::with_defaults())
    }

    pub fn with_registries(code_fixes: CodeFixRegistry, refactors: RefactorRegistry) -> Self {
        Self {
            builder: ProgramBuilder::new(),
            program: None,
            code_fixes,
            refactors,
            cancellation_host: None,
            cancellation_throttle: Duration::from_millis(20),
        }
    }

    /// Set the text of a project file, adding it if needed.
    pub fn set_file_content(&mut self, path: &str, text: &str) {
        self.builder.add_file(path, text);
        self.program = None;
    }

    /// Add a library file importable by its logical `module_path`.
    pub fn set_library_file(&mut self, module_path: &str, path: &str, text: &str, implicit: bool) {
        self.builder.add_library_file(module_path, path, text, implicit);
        self.program = None;
    }

    /// Returns whether the file was known.
    pub fn remove_file(&mut self, path: &str) -> bool {
        let removed = self.builder.remove_file(path);
        if removed {
            self.program = None;
        }
        removed
    }

    pub fn has_file(&self, path: &str) -> bool {
        let path = crate::base::normalize_path(path);
        self.builder.paths().any(|known| known == path)
    }

    pub fn file_count(&self) -> usize {
        self.builder.paths().count()
    }

    pub fn set_config(&mut self, load: ConfigLoad) {
        self.builder.with_config(load);
        self.program = None;
    }

    /// Read the configuration at `entry` and its `extends` chain from disk.
    ///
    /// Problems are kept and reported by the option diagnostics pass.
    pub fn load_config(&mut self, entry: &str) {
        let files = ConfigFiles::load(entry);
        let load = load_project_config(entry, &files);
        info!(entry, problems = load.problems.len(), "loaded project configuration");
        self.set_config(load);
    }

    pub fn set_overload_oracle(&mut self, oracle: Arc<dyn OverloadOracle>) {
        self.builder.with_overload_oracle(oracle);
        self.program = None;
    }

    /// Host polled by the cancellation token of each snapshot.
    pub fn set_cancellation_host(&mut self, host: Option<Arc<dyn CancellationHost>>, throttle: Duration) {
        self.cancellation_host = host;
        self.cancellation_throttle = throttle;
    }

    pub fn code_fixes_mut(&mut self) -> &mut CodeFixRegistry {
        &mut self.code_fixes
    }

    pub fn refactors_mut(&mut self) -> &mut RefactorRegistry {
        &mut self.refactors
    }

    /// Rebuild the program if any input changed since the last build.
    pub fn program(&mut self) -> &Program {
        let builder = &self.builder;
        self.program.get_or_insert_with(|| build(builder))
    }

    /// A consistent snapshot for querying, rebuilding the program first if needed.
    pub fn analysis(&mut self) -> Analysis<'_> {
        let builder = &self.builder;
        let program: &Program = self.program.get_or_insert_with(|| build(builder));
        Analysis {
            binder: Binder::new(program),
            code_fixes: &self.code_fixes,
            refactors: &self.refactors,
            cancel: CancellationToken::new(self.cancellation_throttle, self.cancellation_host.clone()),
        }
    }
}

fn build(builder: &ProgramBuilder) -> Program {
    let program = builder.build();
    debug!(generation = program.generation(), files = program.file_count(), "rebuilt program");
    program
}

/// An immutable snapshot of the analysis state.
///
/// All queries go through this struct so they see one program generation.
pub struct Analysis<'a> {
    binder: Binder<'a>,
    code_fixes: &'a CodeFixRegistry,
    refactors: &'a RefactorRegistry,
    cancel: CancellationToken,
}

impl<'a> Analysis<'a> {
    pub fn program(&self) -> &'a Program {
        self.binder.program()
    }

    pub fn binder(&self) -> &Binder<'a> {
        &self.binder
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn file_id(&self, path: &str) -> Option<FileId> {
        self.program().file_id(path)
    }

    pub fn file_path(&self, file: FileId) -> Option<&'a str> {
        self.program().file(file).ok().map(|f| f.path())
    }

    /// Project files in program order (libraries excluded).
    pub fn project_files(&self) -> Vec<FileId> {
        self.program()
            .files()
            .filter(|f| f.library().is_none())
            .map(|f| f.id())
            .collect()
    }

    // ==================== Position index ====================

    pub fn touching_token(&self, file: FileId, offset: u32, include_end: bool) -> AnalysisResult<Option<TokenInfo>> {
        super::touching_token(self.program(), file, offset, include_end)
    }

    pub fn preceding_token(&self, file: FileId, offset: u32) -> AnalysisResult<Option<TokenInfo>> {
        super::preceding_token(self.program(), file, offset)
    }

    pub fn span_of_enclosing_comment(&self, file: FileId, offset: u32, only_multi_line: bool) -> AnalysisResult<TextSpan> {
        super::span_of_enclosing_comment(self.program(), file, offset, only_multi_line)
    }

    pub fn name_or_dotted_name_span(&self, file: FileId, offset: u32) -> AnalysisResult<Option<TextSpan>> {
        super::name_or_dotted_name_span(self.program(), file, offset)
    }

    pub fn current_token_value(&self, file: FileId, offset: u32) -> AnalysisResult<Option<String>> {
        super::current_token_value(self.program(), file, offset)
    }

    pub fn brace_matching(&self, file: FileId, offset: u32) -> AnalysisResult<Vec<TextSpan>> {
        super::brace_matching(self.program(), file, offset)
    }

    pub fn todo_comments(&self, file: FileId, descriptors: &[TodoCommentDescriptor]) -> AnalysisResult<Vec<TodoComment>> {
        super::todo_comments(self.program(), file, descriptors)
    }

    // ==================== Binding and references ====================

    pub fn definition_at_position(&self, file: FileId, offset: u32) -> AnalysisResult<Vec<GotoTarget>> {
        super::definition_at_position(&self.binder, file, offset)
    }

    /// References across `files`, or every project file when `files` is empty.
    pub fn find_references_at_position(
        &self,
        file: FileId,
        offset: u32,
        files: &[FileId],
    ) -> AnalysisResult<Vec<ReferenceInfo>> {
        let candidates = self.candidates(files);
        super::find_references_at_position(&self.binder, &self.cancel, file, offset, &candidates)
    }

    /// Rename locations across `files`, or every project file when `files` is empty.
    pub fn find_rename_locations(&self, files: &[FileId], file: FileId, offset: u32) -> AnalysisResult<Vec<RenameLocation>> {
        let candidates = self.candidates(files);
        super::find_rename_locations(&self.binder, &self.cancel, &candidates, file, offset)
    }

    pub fn get_safe_delete_info(&self, file: FileId, offset: u32) -> AnalysisResult<bool> {
        super::get_safe_delete_info(&self.binder, &self.cancel, file, offset)
    }

    /// Import sites of the file at path `search` (or library module when `is_package_module`).
    pub fn find_file_references(&self, search: &str, is_package_module: bool) -> Vec<ReferenceInfo> {
        let candidates: Vec<FileId> = self.program().files().map(|f| f.id()).collect();
        super::find_file_references(self.program(), search, &candidates, is_package_module)
    }

    fn candidates(&self, files: &[FileId]) -> Vec<FileId> {
        if files.is_empty() {
            self.project_files()
        } else {
            files.to_vec()
        }
    }

    // ==================== Diagnostics ====================

    pub fn syntactic_diagnostics(&self, file: FileId) -> AnalysisResult<Vec<Diagnostic>> {
        super::syntactic_diagnostics(self.program(), file)
    }

    pub fn semantic_diagnostics(&self, file: FileId) -> AnalysisResult<Vec<Diagnostic>> {
        super::semantic_diagnostics(&self.binder, file)
    }

    pub fn global_diagnostics(&self) -> DiagnosticReferences {
        super::global_diagnostics(&self.binder)
    }

    pub fn option_diagnostics(&self) -> DiagnosticReferences {
        super::option_diagnostics(self.program())
    }

    // ==================== Fixes and refactors ====================

    pub fn get_code_fixes_at_position(
        &self,
        file: FileId,
        start: u32,
        end: u32,
        error_codes: &[DiagnosticCode],
        options: &FormatCodeOptions,
    ) -> AnalysisResult<Vec<CodeFixAction>> {
        self.code_fixes
            .get_code_fixes_at_position(&self.binder, file, start, end, error_codes, options)
    }

    pub fn get_combined_code_fix(&self, fix_id: &str, options: &FormatCodeOptions) -> Option<CodeFixAction> {
        self.code_fixes.get_combined_code_fix(&self.binder, fix_id, options)
    }

    pub fn get_applicable_refactors(
        &self,
        file: FileId,
        start: u32,
        end: u32,
        kind: Option<&str>,
        options: &FormatCodeOptions,
    ) -> AnalysisResult<Vec<RefactorActionInfo>> {
        self.refactors
            .get_applicable_refactors(&self.binder, file, start, end, kind, options)
    }
}
