//! Brace matching through the analysis snapshot.

use rstest::rstest;

use crate::helpers::host_helpers::*;

fn pairs(text: &str, offset: u32) -> Vec<(u32, u32)> {
    let mut host = host_with(&[("/test.ets", text)]);
    let analysis = host.analysis();
    let file = file_id(&analysis, "/test.ets");
    analysis
        .brace_matching(file, offset)
        .unwrap()
        .iter()
        .map(|span| (span.start, span.end()))
        .collect()
}

// =============================================================================
// LITERAL SCENARIOS
// =============================================================================

#[test]
fn test_function_body_braces() {
    assert_eq!(pairs("function main() { }", 16), vec![(16, 17), (18, 19)]);
}

#[test]
fn test_generic_type_arguments() {
    let text = "let z = new Map<Object, number>()";
    assert_eq!(pairs(text, 15), vec![(15, 16), (30, 31)]);
}

// =============================================================================
// SYMMETRY AND NEGATIVE CASES
// =============================================================================

#[rstest]
#[case("function main() { }", 16)]
#[case("let z = new Map<Object, number>()", 15)]
#[case("class Box<T> { items: Array<T> = []; }", 9)]
#[case("if (ready) { run(); }", 3)]
#[case("let o = {};", 8)]
fn test_either_side_yields_same_pair(#[case] text: &str, #[case] open: u32) {
    let from_open = pairs(text, open);
    assert_eq!(from_open.len(), 2, "no pair at {open} in {text:?}");
    let close = from_open[1].0;
    assert_eq!(pairs(text, close), from_open);
}

#[rstest]
#[case("let b = a < c;", 10)]
#[case("let b = a >> c;", 10)]
#[case("function main() { }", 3)]
#[case("let s = \"{}\";", 9)]
fn test_no_pair(#[case] text: &str, #[case] offset: u32) {
    assert!(pairs(text, offset).is_empty(), "unexpected pair at {offset} in {text:?}");
}

#[test]
fn test_nested_blocks_report_innermost() {
    let text = "function f() { if (x) { y(); } }";
    let inner_open = nth_offset_of(text, "{", 1);
    let inner_close = nth_offset_of(text, "}", 0);
    assert_eq!(
        pairs(text, inner_open),
        vec![(inner_open, inner_open + 1), (inner_close, inner_close + 1)]
    );
}
