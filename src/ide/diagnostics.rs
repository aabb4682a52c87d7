//! Diagnostic mapper: byte-range findings to line/character diagnostics.
//!
//! Four passes feed it:
//!
//! - syntactic: parse errors of one file
//! - semantic: checker findings of one file
//! - global: module resolution across the whole program
//! - option: project configuration problems
//!
//! Global and option passes accumulate into one [`DiagnosticReferences`] in
//! discovery order.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::base::{
    DiagnosticCode, DiagnosticMessage, DiagnosticTag, FileId, Range, Severity, TextRange, TextSpan,
};
use crate::error::AnalysisResult;
use crate::hir::{Binder, NodeHandle, Program, SemanticChecker, SemanticDiagnostic, SourceFile};
use crate::parser::SyntaxError;

/// Secondary location attached to a diagnostic.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedInformation {
    pub file_name: String,
    pub range: Range,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CodeDescription {
    pub href: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub file_name: String,
    /// `None` for configuration files, which are not part of the program.
    #[serde(skip)]
    pub file: Option<FileId>,
    /// Byte span; zero for configuration problems.
    #[serde(skip)]
    pub span: TextSpan,
    pub range: Range,
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<DiagnosticTag>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<RelatedInformation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_description: Option<CodeDescription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Accumulated output of the global and option passes.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DiagnosticReferences {
    pub diagnostic: Vec<Diagnostic>,
}

/// Substitute `{0}`, `{1}`, ... with `args`. Placeholders without an argument stay verbatim.
pub fn format_message(template: &str, args: &[impl AsRef<str>]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        let closed = digits > 0 && after[digits..].starts_with('}');
        let arg = closed
            .then(|| after[..digits].parse::<usize>().ok())
            .flatten()
            .and_then(|index| args.get(index));
        match arg {
            Some(arg) => {
                out.push_str(arg.as_ref());
                rest = &after[digits + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Build a diagnostic covering `range` of `source`.
pub fn create_diagnostic_for_range(
    source: &SourceFile,
    range: TextRange,
    message: &DiagnosticMessage,
    args: &[impl AsRef<str>],
) -> Diagnostic {
    Diagnostic {
        file_name: source.path().to_string(),
        file: Some(source.id()),
        span: range.into(),
        range: source.line_index().range(range),
        severity: message.severity,
        code: message.code,
        message: format_message(message.template, args),
        tags: Vec::new(),
        related_information: Vec::new(),
        code_description: None,
        data: None,
    }
}

/// Build a diagnostic covering the node behind `handle`.
pub fn create_diagnostic_for_node(
    program: &Program,
    handle: &NodeHandle,
    message: &DiagnosticMessage,
    args: &[impl AsRef<str>],
) -> AnalysisResult<Diagnostic> {
    let element = program.resolve_handle(handle)?;
    let source = program.file(handle.file)?;
    Ok(create_diagnostic_for_range(source, element.text_range(), message, args))
}

fn from_semantic(program: &Program, finding: SemanticDiagnostic) -> Option<Diagnostic> {
    let source = program.file(finding.file).ok()?;
    let mut diagnostic = create_diagnostic_for_range(source, finding.range, &finding.message, finding.args.as_slice());
    diagnostic.tags = finding.tags;
    diagnostic.data = finding.data;
    diagnostic.related_information = finding
        .related
        .into_iter()
        .filter_map(|related| {
            let file = program.file(related.file).ok()?;
            Some(RelatedInformation {
                file_name: file.path().to_string(),
                range: file.line_index().range(related.range),
                message: related.message,
            })
        })
        .collect();
    diagnostic.code_description = rule_docs(diagnostic.code).map(|href| CodeDescription { href: href.to_string() });
    Some(diagnostic)
}

/// Documentation of lint-style rules, keyed by their string code.
fn rule_docs(code: DiagnosticCode) -> Option<&'static str> {
    match code {
        DiagnosticCode::Str("prefer-const") => Some("https://eslint.org/docs/latest/rules/prefer-const"),
        _ => None,
    }
}

fn from_syntax(source: &SourceFile, error: &SyntaxError) -> Diagnostic {
    let message = DiagnosticMessage::error(error.kind.code(), "");
    let mut diagnostic = create_diagnostic_for_range(source, error.range, &message, &[] as &[&str]);
    diagnostic.message = error.message();
    diagnostic
}

/// Parse errors of `file`.
pub fn syntactic_diagnostics(program: &Program, file: FileId) -> AnalysisResult<Vec<Diagnostic>> {
    let source = program.file(file)?;
    Ok(source.errors().iter().map(|error| from_syntax(source, error)).collect())
}

/// Checker findings of `file`.
pub fn semantic_diagnostics(binder: &Binder<'_>, file: FileId) -> AnalysisResult<Vec<Diagnostic>> {
    let program = binder.program();
    program.file(file)?;
    let mut checker = SemanticChecker::new(binder);
    checker.check_file(file);
    let diagnostics: Vec<Diagnostic> = checker
        .finish()
        .into_iter()
        .filter_map(|finding| from_semantic(program, finding))
        .collect();
    debug!(%file, count = diagnostics.len(), "semantic diagnostics");
    Ok(diagnostics)
}

/// Whole-program pass: unresolved module specifiers, files in program order.
pub fn global_diagnostics(binder: &Binder<'_>) -> DiagnosticReferences {
    let program = binder.program();
    let mut checker = SemanticChecker::new(binder);
    for source in program.files() {
        checker.check_module_resolution(source.id());
    }
    let diagnostic: Vec<Diagnostic> = checker
        .finish()
        .into_iter()
        .filter_map(|finding| from_semantic(program, finding))
        .collect();
    debug!(count = diagnostic.len(), "global diagnostics");
    DiagnosticReferences { diagnostic }
}

/// Configuration-only pass.
pub fn option_diagnostics(program: &Program) -> DiagnosticReferences {
    let diagnostic = program
        .config_problems()
        .iter()
        .map(|problem| Diagnostic {
            file_name: problem.file.clone(),
            file: None,
            span: TextSpan::default(),
            range: problem.range,
            severity: problem.severity(),
            code: problem.code(),
            message: format_message(problem.message.template, problem.args.as_slice()),
            tags: Vec::new(),
            related_information: Vec::new(),
            code_description: None,
            data: None,
        })
        .collect();
    DiagnosticReferences { diagnostic }
}
