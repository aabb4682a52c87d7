//! Code fix tests: single fixes, combined fixes and custom providers.

use std::sync::Arc;

use rstest::rstest;

use ets_analysis::TextSize;
use ets_analysis::base::DiagnosticCode;
use ets_analysis::ide::{
    CodeFixAction, CodeFixContext, CodeFixProvider, FIX_SPELLING, FileTextChanges, FormatCodeOptions,
    PREFER_CONST, TextChange, UNUSED_IDENTIFIER_DELETE,
};

use crate::helpers::host_helpers::*;

const MAIN: &str = "/p/main.ets";

fn fixes_at(text: &str, needle: &str, code: DiagnosticCode) -> Vec<CodeFixAction> {
    let mut host = host_with(&[(MAIN, text), ("/p/m.ets", "export const a = 1;\nexport const b = 2;")]);
    let analysis = host.analysis();
    let file = file_id(&analysis, MAIN);
    let start = offset_of(text, needle);
    let end = start + needle.len() as u32;
    analysis
        .get_code_fixes_at_position(file, start, end, &[code], &FormatCodeOptions::default())
        .unwrap()
}

fn still_reported(text: &str, code: DiagnosticCode) -> bool {
    let mut host = host_with(&[(MAIN, text), ("/p/m.ets", "export const a = 1;\nexport const b = 2;")]);
    let analysis = host.analysis();
    let file = file_id(&analysis, MAIN);
    analysis
        .semantic_diagnostics(file)
        .unwrap()
        .iter()
        .any(|d| d.code == code)
}

// =============================================================================
// ROUND TRIP
// =============================================================================

#[rstest]
#[case("const total = 1;\ntotl;", "totl", DiagnosticCode::Int(2552), FIX_SPELLING, "const total = 1;\ntotal;")]
#[case("let x = 1;\nx;", "let", DiagnosticCode::Str("prefer-const"), PREFER_CONST, "const x = 1;\nx;")]
#[case(
    "import { a, b } from \"./m\";\na;",
    "b",
    DiagnosticCode::Int(6133),
    UNUSED_IDENTIFIER_DELETE,
    "import { a } from \"./m\";\na;"
)]
#[case(
    "import { a } from \"./m\";\nexport const k = 1;",
    "import",
    DiagnosticCode::Int(6133),
    UNUSED_IDENTIFIER_DELETE,
    "export const k = 1;"
)]
fn test_fix_removes_its_diagnostic(
    #[case] text: &str,
    #[case] needle: &str,
    #[case] code: DiagnosticCode,
    #[case] fix_id: &str,
    #[case] expected: &str,
) {
    assert!(still_reported(text, code), "{code:?} not reported for {text:?}");
    let actions = fixes_at(text, needle, code);
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].fix_id, Some(fix_id));

    let fixed = apply_to(text, MAIN, &actions[0].changes);
    assert_eq!(fixed, expected);
    assert!(!still_reported(&fixed, code), "{code:?} survives in {fixed:?}");
}

#[test]
fn test_spelling_edit_covers_triggering_range() {
    let text = "const total = 1;\ntotl;";
    let actions = fixes_at(text, "totl", DiagnosticCode::Int(2552));
    let changes = &actions[0].changes;
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].file_name, MAIN);
    let edit = &changes[0].text_changes[0];
    assert_eq!(slice(text, edit.span), "totl");
    assert_eq!(edit.new_text, "total");
}

#[test]
fn test_no_suggestion_yields_empty_edit_list() {
    let actions = fixes_at("zzzzzzzzzz;", "zzzzzzzzzz", DiagnosticCode::Int(2304));
    assert_eq!(actions.len(), 1);
    assert!(actions[0].changes.first().unwrap().text_changes.is_empty());
}

#[rstest]
#[case(DiagnosticCode::Int(1))]
#[case(DiagnosticCode::Str("no-such-rule"))]
fn test_unknown_codes_yield_nothing(#[case] code: DiagnosticCode) {
    assert!(fixes_at("zzzzzzzzzz;", "zzzzzzzzzz", code).is_empty());
}

#[test]
fn test_range_outside_diagnostic_yields_nothing() {
    let text = "const total = 1;\ntotl;";
    assert!(fixes_at(text, "const", DiagnosticCode::Int(2552)).is_empty());
}

// =============================================================================
// COMBINED FIXES
// =============================================================================

#[test]
fn test_combined_fix_spans_files() {
    let a = "let one = 1;\nlet two = 2;\none + two;";
    let b = "let three = 3;\nthree = 4;\nlet four = 4;\nfour;";
    let mut host = host_with(&[("/p/a.ets", a), ("/p/b.ets", b)]);
    let analysis = host.analysis();

    let combined = analysis
        .get_combined_code_fix(PREFER_CONST, &FormatCodeOptions::default())
        .unwrap();
    let files: Vec<&str> = combined.changes.iter().map(|c| c.file_name.as_str()).collect();
    assert_eq!(files, vec!["/p/a.ets", "/p/b.ets"]);
    assert_eq!(
        apply_to(a, "/p/a.ets", &combined.changes),
        "const one = 1;\nconst two = 2;\none + two;"
    );
    assert_eq!(
        apply_to(b, "/p/b.ets", &combined.changes),
        "let three = 3;\nthree = 4;\nconst four = 4;\nfour;"
    );
}

#[test]
fn test_combined_fix_with_nothing_to_fix_is_empty() {
    let mut host = host_with(&[("/p/a.ets", "const done = 1;\ndone;")]);
    let analysis = host.analysis();
    let combined = analysis
        .get_combined_code_fix(FIX_SPELLING, &FormatCodeOptions::default())
        .unwrap();
    assert!(combined.changes.is_empty());
    assert!(analysis.get_combined_code_fix("noSuchFix", &FormatCodeOptions::default()).is_none());
}

// =============================================================================
// CUSTOM PROVIDERS
// =============================================================================

/// Declares an unresolved name at the top of the file.
struct DeclareMissing;

const DECLARE_MISSING: &str = "declareMissing";

impl CodeFixProvider for DeclareMissing {
    fn fix_id(&self) -> &'static str {
        DECLARE_MISSING
    }

    fn error_codes(&self) -> &'static [DiagnosticCode] {
        &[DiagnosticCode::Int(2304)]
    }

    fn fix_all_description(&self) -> &'static str {
        "Declare all missing names"
    }

    fn code_actions(&self, context: &CodeFixContext<'_>) -> Vec<CodeFixAction> {
        let span = context.diagnostic.span;
        let name = &context.source.text()[span.start as usize..span.end() as usize];
        let text = format!("const {name} = 0;{}", context.options.new_line_character);
        let change = TextChange::insert(TextSize::from(0), text);
        vec![CodeFixAction::new(
            DECLARE_MISSING,
            format!("Declare '{name}'"),
            vec![FileTextChanges::new(context.source.path(), vec![change])],
        )]
    }
}

#[test]
fn test_custom_provider_runs_after_defaults() {
    let text = "zzzzzzzzzz;";
    let mut host = host_with(&[(MAIN, text)]);
    host.code_fixes_mut().register(Arc::new(DeclareMissing));
    let analysis = host.analysis();
    let file = file_id(&analysis, MAIN);

    let options = FormatCodeOptions {
        new_line_character: "\r\n".to_string(),
        ..FormatCodeOptions::default()
    };
    let actions = analysis
        .get_code_fixes_at_position(file, 0, 10, &[DiagnosticCode::Int(2304)], &options)
        .unwrap();
    let names: Vec<&str> = actions.iter().map(|a| a.fix_name).collect();
    assert_eq!(names, vec![FIX_SPELLING, DECLARE_MISSING]);
    assert_eq!(actions[1].fix_id, Some(DECLARE_MISSING));
    assert_eq!(
        apply_to(text, MAIN, &actions[1].changes),
        "const zzzzzzzzzz = 0;\r\nzzzzzzzzzz;"
    );
}
