//! TODO comment scanning.

use rstest::rstest;

use ets_analysis::ide::{TodoComment, TodoCommentDescriptor};

use crate::helpers::host_helpers::*;

fn scan(text: &str, descriptors: &[TodoCommentDescriptor]) -> Vec<TodoComment> {
    let mut host = host_with(&[("/p/main.ets", text)]);
    let analysis = host.analysis();
    let file = file_id(&analysis, "/p/main.ets");
    analysis.todo_comments(file, descriptors).unwrap()
}

#[test]
fn test_single_todo() {
    let found = scan("// TODO: Fix this", &[TodoCommentDescriptor::new("TODO", 1)]);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "TODO: Fix this");
    assert_eq!(found[0].descriptor.priority, 1);
    assert_eq!(found[0].position, 3);
}

#[test]
fn test_descriptor_order_and_priorities() {
    let text = "function f() {\n    // HACK: skip cache\n    return 1; /* todo tidy up */\n}\n// note: not a descriptor";
    let descriptors = [
        TodoCommentDescriptor::new("TODO", 1),
        TodoCommentDescriptor::new("HACK", 2),
    ];
    let found: Vec<(String, u32)> = scan(text, &descriptors)
        .into_iter()
        .map(|c| (c.message, c.descriptor.priority))
        .collect();
    assert_eq!(
        found,
        vec![("HACK: skip cache".to_string(), 2), ("todo tidy up".to_string(), 1)]
    );
}

#[rstest]
#[case("// TODOS later")]
#[case("let TODO = 1;")]
#[case("let s = \"// TODO not a comment\";")]
#[case("// nothing to do")]
fn test_no_match(#[case] text: &str) {
    assert!(scan(text, &[TodoCommentDescriptor::new("TODO", 1)]).is_empty());
}

#[test]
fn test_no_descriptors() {
    assert!(scan("// TODO: Fix this", &[]).is_empty());
}
