//! Refactor tests through the analysis snapshot.

use std::sync::Arc;

use rstest::rstest;

use ets_analysis::ide::{
    EXPORT_NAMED, FUNCTION_NAMED, FileTextChanges, FormatCodeOptions, OPTIONAL_CHAIN, RefactorActionInfo,
    RefactorContext, RefactorProvider, TextChange,
};

use crate::helpers::host_helpers::*;

const MAIN: &str = "/p/main.ets";

fn refactors_at(text: &str, offset: u32, kind: Option<&str>) -> Vec<RefactorActionInfo> {
    let mut host = host_with(&[(MAIN, text)]);
    let analysis = host.analysis();
    let file = file_id(&analysis, MAIN);
    analysis
        .get_applicable_refactors(file, offset, offset, kind, &FormatCodeOptions::default())
        .unwrap()
}

// =============================================================================
// APPLICABILITY
// =============================================================================

#[rstest]
#[case("let r = a && a.b && a.b();", 14, OPTIONAL_CHAIN, "let r = a?.b?.();")]
#[case("let r = a && a.b && a.b.c;", 10, OPTIONAL_CHAIN, "let r = a?.b?.c;")]
#[case("export default function run(): void {}", 24, EXPORT_NAMED, "export function run(): void {}")]
#[case(
    "const twice = (n: number): number => n * 2;",
    6,
    FUNCTION_NAMED,
    "function twice(n: number): number {\n    return n * 2;\n}"
)]
fn test_refactor_output(#[case] text: &str, #[case] offset: u32, #[case] kind: &str, #[case] expected: &str) {
    let actions = refactors_at(text, offset, Some(kind));
    assert_eq!(actions.len(), 1, "{kind} not applicable at {offset} in {text:?}");
    assert_eq!(actions[0].kind, kind);
    assert_eq!(apply_to(text, MAIN, &actions[0].changes), expected);
}

#[rstest]
#[case("let r = a && b.c;", 10, OPTIONAL_CHAIN)]
#[case("let r = a || a.b;", 10, OPTIONAL_CHAIN)]
#[case("export function run(): void {}", 16, EXPORT_NAMED)]
#[case("items.map((x) => x * 2);", 11, FUNCTION_NAMED)]
#[case("let f = () => 1;\nf = () => 2;", 4, FUNCTION_NAMED)]
#[case("const f = () => /* keep */ 1;", 6, FUNCTION_NAMED)]
fn test_refactor_not_applicable(#[case] text: &str, #[case] offset: u32, #[case] kind: &str) {
    assert!(refactors_at(text, offset, Some(kind)).is_empty());
}

#[test]
fn test_unknown_kind_is_empty() {
    assert!(refactors_at("let r = a && a.b;", 10, Some("refactor.rewrite.unknown")).is_empty());
}

#[test]
fn test_all_kinds_when_unfiltered() {
    let text = "export default function run(): void {}";
    let actions = refactors_at(text, 24, None);
    let kinds: Vec<&str> = actions.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![EXPORT_NAMED]);
}

// =============================================================================
// CROSS-FILE
// =============================================================================

#[test]
fn test_named_export_updates_every_importer() {
    let module = "export default function greet(): void {}";
    let a = "import hello from \"./greeting\";\nhello();";
    let b = "import * as g from \"./greeting\";\nimport greet from \"./greeting\";\ngreet();\ng;";
    let mut host = host_with(&[("/p/greeting.ets", module), ("/p/a.ets", a), ("/p/b.ets", b)]);
    let analysis = host.analysis();
    let file = file_id(&analysis, "/p/greeting.ets");

    let actions = analysis
        .get_applicable_refactors(file, 24, 24, Some(EXPORT_NAMED), &FormatCodeOptions::default())
        .unwrap();
    assert_eq!(actions.len(), 1);
    let changes = &actions[0].changes;
    let files: Vec<&str> = changes.iter().map(|c| c.file_name.as_str()).collect();
    assert_eq!(files, vec!["/p/greeting.ets", "/p/a.ets", "/p/b.ets"]);
    assert_eq!(
        apply_to(a, "/p/a.ets", changes),
        "import { greet as hello } from \"./greeting\";\nhello();"
    );
    assert_eq!(
        apply_to(b, "/p/b.ets", changes),
        "import * as g from \"./greeting\";\nimport { greet } from \"./greeting\";\ngreet();\ng;"
    );
}

// =============================================================================
// CUSTOM PROVIDERS
// =============================================================================

/// Wraps the covering statement in a block.
struct WrapInBlock;

impl RefactorProvider for WrapInBlock {
    fn kind(&self) -> &'static str {
        "refactor.rewrite.block"
    }

    fn description(&self) -> &'static str {
        "Wrap in block"
    }

    fn edits(&self, context: &RefactorContext<'_, '_>) -> Option<Vec<FileTextChanges>> {
        let node = context.covering_node()?;
        let stmt = node
            .ancestors()
            .find(|n| n.parent().is_some_and(|p| p == context.source.syntax()))?;
        let range = stmt.text_range();
        let text = format!("{{ {} }}", stmt.text());
        Some(vec![FileTextChanges::new(
            context.source.path(),
            vec![TextChange::replace(range, text)],
        )])
    }
}

#[test]
fn test_custom_refactor_provider() {
    let text = "run();";
    let mut host = host_with(&[(MAIN, text)]);
    host.refactors_mut().register(Arc::new(WrapInBlock));
    let analysis = host.analysis();
    let file = file_id(&analysis, MAIN);

    let actions = analysis
        .get_applicable_refactors(file, 1, 1, Some("refactor.rewrite.block"), &FormatCodeOptions::default())
        .unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].description, "Wrap in block");
    assert_eq!(apply_to(text, MAIN, &actions[0].changes), "{ run(); }");
}
