//! Diagnostics through the analysis snapshot.

use rstest::rstest;

use ets_analysis::Position;
use ets_analysis::base::{DiagnosticCode, DiagnosticTag, Severity};
use ets_analysis::ide::Diagnostic;

use crate::helpers::host_helpers::*;
use crate::helpers::source_fixtures::*;

fn semantic(text: &str) -> Vec<Diagnostic> {
    let mut host = host_with(&[("/p/main.ets", text)]);
    host.set_library_file(STDLIB_MODULE, STDLIB_PATH, STDLIB_SOURCE, false);
    let analysis = host.analysis();
    let file = file_id(&analysis, "/p/main.ets");
    analysis.semantic_diagnostics(file).unwrap()
}

fn codes(diagnostics: &[Diagnostic]) -> Vec<DiagnosticCode> {
    diagnostics.iter().map(|d| d.code).collect()
}

// =============================================================================
// SYNTACTIC
// =============================================================================

#[rstest]
#[case("let = ;")]
#[case("function f( {")]
#[case("import { a from \"./m\";")]
fn test_syntax_errors_are_errors(#[case] text: &str) {
    let mut host = host_with(&[("/p/main.ets", text)]);
    let analysis = host.analysis();
    let file = file_id(&analysis, "/p/main.ets");
    let diagnostics = analysis.syntactic_diagnostics(file).unwrap();
    assert!(!diagnostics.is_empty(), "no syntax error for {text:?}");
    assert!(diagnostics.iter().all(|d| d.severity == Severity::Error));
    assert!(diagnostics.iter().all(|d| d.file_name == "/p/main.ets"));
}

#[test]
fn test_clean_file_has_no_syntax_errors() {
    let mut host = host_with(&[("/p/main.ets", "const x: number = 1;\nexport { x };")]);
    let analysis = host.analysis();
    let file = file_id(&analysis, "/p/main.ets");
    assert!(analysis.syntactic_diagnostics(file).unwrap().is_empty());
}

#[rstest]
#[case("/* header */\nconst x = 1;")]
#[case("const x = /* a ** b */ 1;")]
#[case("/**\n * Docs.\n **/\nfunction f(): void {}")]
fn test_block_comments_are_not_syntax_errors(#[case] text: &str) {
    let mut host = host_with(&[("/p/main.ets", text)]);
    let analysis = host.analysis();
    let file = file_id(&analysis, "/p/main.ets");
    assert!(analysis.syntactic_diagnostics(file).unwrap().is_empty(), "{text:?}");
}

// =============================================================================
// SEMANTIC
// =============================================================================

#[test]
fn test_unresolved_name_maps_to_line_and_column() {
    let diagnostics = semantic("const a = 1;\na;\n  nowhere;");
    let missing = diagnostics
        .iter()
        .find(|d| d.code == DiagnosticCode::Int(2304))
        .expect("2304 expected");
    assert_eq!(missing.range.start, Position::new(2, 2));
    assert_eq!(missing.range.end, Position::new(2, 9));
    assert_eq!(missing.message, "Cannot find name 'nowhere'.");
}

#[test]
fn test_spelling_suggestion_carries_data() {
    let diagnostics = semantic("const count = 1;\ncont;");
    let typo = diagnostics
        .iter()
        .find(|d| d.code == DiagnosticCode::Int(2552))
        .expect("2552 expected");
    assert_eq!(typo.data.as_ref().unwrap()["suggestion"], "count");
}

#[test]
fn test_library_imports_resolve() {
    let diagnostics = semantic("import { print } from \"std/core\";\nprint(\"hi\");");
    assert!(diagnostics.is_empty(), "unexpected {:?}", codes(&diagnostics));

    let missing = semantic("import { shout } from \"std/core\";\nshout();");
    assert!(codes(&missing).contains(&DiagnosticCode::Int(2305)));
}

#[test]
fn test_unused_imports_are_tagged_unnecessary() {
    let diagnostics = semantic("import { print, println } from \"std/core\";\nprint(\"x\");");
    let unused = diagnostics
        .iter()
        .find(|d| d.code == DiagnosticCode::Int(6133))
        .expect("6133 expected");
    assert_eq!(unused.tags, vec![DiagnosticTag::Unnecessary]);
    assert_eq!(unused.severity, Severity::Hint);

    let all_unused = semantic("import { print, println } from \"std/core\";");
    assert_eq!(codes(&all_unused), vec![DiagnosticCode::Int(6192)]);
}

#[test]
fn test_prefer_const() {
    let diagnostics = semantic("let fixed = 1;\nlet moving = 1;\nmoving = 2;\nfixed + moving;");
    let prefer: Vec<&Diagnostic> = diagnostics
        .iter()
        .filter(|d| d.code == DiagnosticCode::Str("prefer-const"))
        .collect();
    assert_eq!(prefer.len(), 1);
    assert_eq!(prefer[0].range.start, Position::new(0, 0));
    assert_eq!(prefer[0].severity, Severity::Warning);
}

// =============================================================================
// GLOBAL
// =============================================================================

#[test]
fn test_global_pass_accumulates_across_files() {
    let mut host = host_with(&[
        ("/p/a.ets", "import { x } from \"./missing\";\nx;"),
        ("/p/b.ets", "export const b = 1;"),
        ("/p/c.ets", "import d from \"lost/pkg\";\nd;"),
    ]);
    let analysis = host.analysis();
    let global = analysis.global_diagnostics();
    let found: Vec<(&str, u32)> = global
        .diagnostic
        .iter()
        .map(|d| (d.file_name.as_str(), d.range.start.line))
        .collect();
    assert_eq!(found, vec![("/p/a.ets", 0), ("/p/c.ets", 0)]);
    assert!(global.diagnostic.iter().all(|d| d.code == DiagnosticCode::Int(2307)));
    assert!(global.diagnostic.iter().all(|d| d.severity == Severity::Error));
}

#[test]
fn test_serialized_diagnostics() {
    let diagnostics = semantic("nowhere;");
    let json = serde_json::to_value(&diagnostics).unwrap();
    assert_eq!(json[0]["fileName"], "/p/main.ets");
    assert_eq!(json[0]["code"], 2304);
    assert_eq!(json[0]["range"]["end"]["character"], 7);
}
