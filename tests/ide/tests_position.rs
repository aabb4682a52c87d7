//! Position index tests: touching/preceding tokens, comments, dotted names.

use rstest::rstest;

use ets_analysis::{AnalysisError, TextSpan};

use crate::helpers::host_helpers::*;

const SOURCE: &str = "// lead\nlet total = a.b.c + count;\n\n\n/* block\n   comment */\nfunction f() {\n\n}\n";

fn with_source<R>(text: &str, query: impl FnOnce(&ets_analysis::Analysis<'_>, ets_analysis::FileId) -> R) -> R {
    let mut host = host_with(&[("/test.ets", text)]);
    let analysis = host.analysis();
    let file = file_id(&analysis, "/test.ets");
    query(&analysis, file)
}

// =============================================================================
// TOUCHING TOKEN
// =============================================================================

#[test]
fn test_touching_token_boundary_law() {
    with_source(SOURCE, |analysis, file| {
        let total = offset_of(SOURCE, "total");
        let end = total + 5;
        let inclusive = analysis.touching_token(file, end, true).unwrap().unwrap();
        assert_eq!(inclusive.text, "total");
        assert_eq!(inclusive.span, TextSpan::new(total, 5));
        // the next token starts one space later
        assert!(analysis.touching_token(file, end, false).unwrap().is_none());

        let dot = offset_of(SOURCE, ".b");
        assert_eq!(analysis.touching_token(file, dot, true).unwrap().unwrap().text, "a");
        assert_eq!(analysis.touching_token(file, dot, false).unwrap().unwrap().text, ".");
    });
}

#[test]
fn test_touching_token_in_trivia_is_none() {
    with_source(SOURCE, |analysis, file| {
        assert!(analysis.touching_token(file, 3, false).unwrap().is_none());
        let blank = offset_of(SOURCE, "\n\n\n") + 1;
        assert!(analysis.touching_token(file, blank, true).unwrap().is_none());
    });
}

#[test]
fn test_out_of_range_offsets_fail_fast() {
    with_source(SOURCE, |analysis, file| {
        let past = SOURCE.len() as u32 + 1;
        assert!(matches!(
            analysis.touching_token(file, past, true),
            Err(AnalysisError::InvalidOffset { .. })
        ));
        assert!(analysis.preceding_token(file, past).is_err());
        assert!(analysis.brace_matching(file, past).is_err());
        // the end of the file itself is a valid position
        assert!(analysis.touching_token(file, SOURCE.len() as u32, true).is_ok());
    });
}

// =============================================================================
// PRECEDING TOKEN
// =============================================================================

#[test]
fn test_preceding_token_skips_blank_lines() {
    with_source(SOURCE, |analysis, file| {
        let close = offset_of(SOURCE, "}");
        let before = analysis.preceding_token(file, close).unwrap().unwrap();
        assert_eq!(before.text, "{");
        assert!(analysis.preceding_token(file, 0).unwrap().is_none());
        // only a comment precedes the first statement
        assert!(analysis.preceding_token(file, 8).unwrap().is_none());
    });
}

#[test]
fn test_preceding_token_is_monotonic() {
    with_source(SOURCE, |analysis, file| {
        let mut last: Option<u32> = None;
        for offset in 0..=SOURCE.len() as u32 {
            let current = analysis
                .preceding_token(file, offset)
                .unwrap()
                .map(|token| token.span.start);
            if let (Some(prev), Some(now)) = (last, current) {
                assert!(prev <= now, "preceding token moved backwards at {offset}");
            }
            if current.is_some() {
                last = current;
            }
        }
    });
}

// =============================================================================
// COMMENTS AND DOTTED NAMES
// =============================================================================

#[rstest]
#[case(3, false, TextSpan::new(0, 7))]
#[case(3, true, TextSpan::new(0, 0))]
#[case(40, true, TextSpan::new(37, 22))]
#[case(12, false, TextSpan::new(0, 0))]
fn test_enclosing_comment(#[case] offset: u32, #[case] only_multi_line: bool, #[case] expected: TextSpan) {
    with_source(SOURCE, |analysis, file| {
        assert_eq!(
            analysis.span_of_enclosing_comment(file, offset, only_multi_line).unwrap(),
            expected
        );
    });
}

#[test]
fn test_dotted_name_covers_whole_chain() {
    with_source(SOURCE, |analysis, file| {
        let chain = offset_of(SOURCE, "a.b.c");
        let expected = Some(TextSpan::new(chain, 5));
        assert_eq!(analysis.name_or_dotted_name_span(file, chain + 2).unwrap(), expected);
        assert_eq!(analysis.name_or_dotted_name_span(file, chain + 4).unwrap(), expected);

        let count = offset_of(SOURCE, "count");
        assert_eq!(
            analysis.name_or_dotted_name_span(file, count + 1).unwrap(),
            Some(TextSpan::new(count, 5))
        );
        let plus = offset_of(SOURCE, "+ count");
        assert_eq!(analysis.name_or_dotted_name_span(file, plus).unwrap(), None);
    });
}

// =============================================================================
// CURRENT TOKEN VALUE
// =============================================================================

#[rstest]
#[case("ab", 2, Some("ab"))]
#[case("\"ab\"", 3, Some("ab"))]
#[case("let x = 'q';", 10, Some("q"))]
#[case("  ", 1, None)]
fn test_current_token_value(#[case] text: &str, #[case] offset: u32, #[case] expected: Option<&str>) {
    with_source(text, |analysis, file| {
        assert_eq!(analysis.current_token_value(file, offset).unwrap().as_deref(), expected);
    });
}

#[test]
fn test_handles_resolve_within_snapshot() {
    with_source(SOURCE, |analysis, file| {
        let token = analysis.touching_token(file, 10, false).unwrap().unwrap();
        let element = analysis.program().resolve_handle(&token.handle).unwrap();
        assert_eq!(element.text_range(), token.span.to_range());
    });
}
