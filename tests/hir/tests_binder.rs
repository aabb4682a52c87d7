//! Declaration binder tests, observed through goto-definition.

use std::sync::Arc;

use rstest::rstest;

use ets_analysis::base::TextRange;
use ets_analysis::hir::{DeclId, DeclKind, OverloadOracle};
use ets_analysis::{AnalysisHost, FileId};

use crate::helpers::host_helpers::*;
use crate::helpers::source_fixtures::*;

/// `(file name, start)` of every target of the name at `offset` in `path`.
fn targets(host: &mut AnalysisHost, path: &str, offset: u32) -> Vec<(String, u32)> {
    let analysis = host.analysis();
    let file = file_id(&analysis, path);
    analysis
        .definition_at_position(file, offset)
        .unwrap()
        .into_iter()
        .map(|t| (t.file_name, t.span.start))
        .collect()
}

// =============================================================================
// LOCAL SCOPES
// =============================================================================

#[rstest]
#[case(0, 40)]
#[case(1, 4)]
fn test_nearest_scope_wins(#[case] use_index: usize, #[case] expected: u32) {
    let text = "let x = 1;\nfunction f(): void {\n    let x = 2;\n    x;\n}\nx;";
    let mut host = host_with(&[("/p/a.ets", text)]);
    let offset = nth_offset_of(text, "x;", use_index);
    assert_eq!(targets(&mut host, "/p/a.ets", offset), vec![("/p/a.ets".to_string(), expected)]);
}

#[test]
fn test_free_variable_has_no_target() {
    let mut host = host_with(&[("/p/a.ets", "let y = nowhere;")]);
    assert!(targets(&mut host, "/p/a.ets", 9).is_empty());
}

#[test]
fn test_inherited_member() {
    let text = "class A {\n    m(): void {}\n}\nclass B extends A {}\nlet b = new B();\nb.m();";
    let mut host = host_with(&[("/p/a.ets", text)]);
    let call = text.rfind("m()").unwrap() as u32;
    assert_eq!(
        targets(&mut host, "/p/a.ets", call),
        vec![("/p/a.ets".to_string(), offset_of(text, "m()"))]
    );
}

// =============================================================================
// IMPORTS
// =============================================================================

#[test]
fn test_namespace_import_member() {
    let shapes = "export class Circle {}\nexport function area(): number { return 0; }";
    let main = "import * as shapes from \"./shapes\";\nshapes.area();";
    let mut host = host_with(&[("/p/shapes.ets", shapes), ("/p/main.ets", main)]);
    let area = offset_of(main, "area");
    assert_eq!(
        targets(&mut host, "/p/main.ets", area),
        vec![("/p/shapes.ets".to_string(), offset_of(shapes, "area"))]
    );
}

#[test]
fn test_re_export_chain() {
    let core = "export const VERSION = 1;";
    let index = "export { VERSION as V } from \"./core\";";
    let all = "export * from \"./core\";";
    let main = "import { V } from \"./index\";\nimport { VERSION } from \"./all\";\nV + VERSION;";
    let mut host = host_with(&[
        ("/p/core.ets", core),
        ("/p/index.ets", index),
        ("/p/all.ets", all),
        ("/p/main.ets", main),
    ]);
    let expected = vec![("/p/core.ets".to_string(), 13)];
    assert_eq!(targets(&mut host, "/p/main.ets", offset_of(main, "V +")), expected);
    assert_eq!(targets(&mut host, "/p/main.ets", offset_of(main, "VERSION;")), expected);
}

#[test]
fn test_cyclic_re_exports_terminate() {
    let mut host = host_with(&[
        ("/p/x.ets", "export * from \"./y\";"),
        ("/p/y.ets", "export * from \"./x\";"),
        ("/p/main.ets", "import { nope } from \"./x\";\nnope;"),
    ]);
    assert!(targets(&mut host, "/p/main.ets", 29).is_empty());
}

const BARREL_A: &str = "export * from \"./b\";\nexport * from \"./c\";";
const BARREL_B: &str = "export * from \"./a\";";
const BARREL_C: &str = "export const x = 1;";
const BARREL_USER: &str = "import { x } from \"./a\";\nimport { x as y } from \"./b\";\nx;\ny;";

fn barrel_host() -> AnalysisHost {
    host_with(&[
        ("/p/a.ets", BARREL_A),
        ("/p/b.ets", BARREL_B),
        ("/p/c.ets", BARREL_C),
        ("/p/d.ets", BARREL_USER),
    ])
}

fn reference_keys(analysis: &ets_analysis::Analysis<'_>, offset: u32) -> Vec<(String, u32)> {
    let file = file_id(analysis, "/p/d.ets");
    analysis
        .find_references_at_position(file, offset, &[])
        .unwrap()
        .into_iter()
        .map(|r| (r.file_name, r.span.start))
        .collect()
}

#[test]
fn test_mutual_star_exports_resolve_independent_of_query_order() {
    let x_use = offset_of(BARREL_USER, "x;");
    let y_use = offset_of(BARREL_USER, "y;");
    let expected = vec![("/p/c.ets".to_string(), offset_of(BARREL_C, "x"))];

    let mut host = barrel_host();
    assert_eq!(targets(&mut host, "/p/d.ets", y_use), expected);

    let mut host = barrel_host();
    let analysis = host.analysis();
    let file = file_id(&analysis, "/p/d.ets");
    let via_x = analysis.definition_at_position(file, x_use).unwrap();
    let via_y = analysis.definition_at_position(file, y_use).unwrap();
    assert_eq!(via_x, via_y);
    assert_eq!(via_y[0].file_name, "/p/c.ets");
}

#[test]
fn test_mutual_star_exports_reference_set_is_stable() {
    let x_use = offset_of(BARREL_USER, "x;");
    let y_use = offset_of(BARREL_USER, "y;");

    let mut fresh = barrel_host();
    let from_fresh = reference_keys(&fresh.analysis(), y_use);

    let mut warmed = barrel_host();
    let analysis = warmed.analysis();
    let file = file_id(&analysis, "/p/d.ets");
    analysis.definition_at_position(file, x_use).unwrap();
    let from_warmed = reference_keys(&analysis, y_use);

    assert_eq!(from_warmed, from_fresh);
    assert!(from_fresh.contains(&("/p/c.ets".to_string(), offset_of(BARREL_C, "x"))));
    assert!(from_fresh.contains(&("/p/d.ets".to_string(), x_use)));
    assert!(from_fresh.contains(&("/p/d.ets".to_string(), y_use)));
}

#[test]
fn test_standard_library_by_module_path() {
    let mut host = host_with(&[("/p/main.ets", "import { println } from \"std/core\";\nprintln(\"hi\");")]);
    host.set_library_file(STDLIB_MODULE, STDLIB_PATH, STDLIB_SOURCE, false);
    let expected = vec![(STDLIB_PATH.to_string(), offset_of(STDLIB_SOURCE, "println"))];
    assert_eq!(targets(&mut host, "/p/main.ets", 36), expected);
}

#[test]
fn test_implicit_library_needs_no_import() {
    let mut host = host_with(&[("/p/main.ets", "let c = new Console();\nc.log(\"x\");")]);
    host.set_library_file(STDLIB_MODULE, STDLIB_PATH, STDLIB_SOURCE, true);
    let analysis = host.analysis();
    let file = file_id(&analysis, "/p/main.ets");
    let found = analysis.definition_at_position(file, 12).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].file_name, STDLIB_PATH);
    assert_eq!(found[0].kind, Some(DeclKind::Class));
}

// =============================================================================
// OVERLOADS
// =============================================================================

const OVERLOADS: &str = "function f(a: number): void;\nfunction f(a: number, b: number): void {}\nf(1);\nf(1, 2);";

/// Always picks the last candidate.
struct PickLast;

impl OverloadOracle for PickLast {
    fn select(&self, _file: FileId, _call: TextRange, candidates: &[DeclId]) -> Option<DeclId> {
        candidates.last().copied()
    }
}

#[rstest]
#[case(0, 9)]
#[case(1, 38)]
fn test_arity_fallback(#[case] call: usize, #[case] selected: u32) {
    let mut host = host_with(&[("/p/a.ets", OVERLOADS)]);
    let offset = nth_offset_of(OVERLOADS, "f(1", call);
    let found = targets(&mut host, "/p/a.ets", offset);
    assert_eq!(found[0].1, selected);
    assert_eq!(found.len(), 2, "every overload is listed");
}

#[test]
fn test_oracle_overrides_arity() {
    let mut host = host_with(&[("/p/a.ets", OVERLOADS)]);
    host.set_overload_oracle(Arc::new(PickLast));
    let offset = nth_offset_of(OVERLOADS, "f(1", 0);
    assert_eq!(targets(&mut host, "/p/a.ets", offset)[0].1, 38);
}
