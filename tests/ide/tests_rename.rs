//! Rename, reference and safe-delete tests across files.

use std::collections::BTreeSet;

use rstest::rstest;

use ets_analysis::ide::{ReferenceKind, RenameLocation};
use ets_analysis::FileId;

use crate::helpers::host_helpers::*;
use crate::helpers::source_fixtures::*;

fn project_path(name: &str) -> String {
    format!("{PROJECT_ROOT}/{name}")
}

fn as_tuples(locations: &[RenameLocation]) -> Vec<(String, u32, u32, u32, String, String)> {
    locations
        .iter()
        .map(|l| {
            (
                l.file_name.clone(),
                l.span.start,
                l.span.end(),
                l.line,
                l.prefix_text.clone(),
                l.suffix_text.clone(),
            )
        })
        .collect()
}

fn expected_uses() -> Vec<(String, u32, u32, u32, String, String)> {
    ABC_USES
        .iter()
        .map(|(file, start, end, line, prefix, suffix)| {
            (file.clone(), *start, *end, *line, prefix.to_string(), suffix.to_string())
        })
        .collect()
}

// =============================================================================
// RENAME
// =============================================================================

#[test]
fn test_rename_from_declaration_finds_every_use() {
    let mut host = rename_host();
    let analysis = host.analysis();
    let first = file_id(&analysis, &project_path("firstFile.ets"));
    let files = [
        file_id(&analysis, &project_path("secondFile.ets")),
        file_id(&analysis, &project_path("thirdFile.ets")),
    ];

    let locations = analysis.find_rename_locations(&files, first, ABC_DECLARATION).unwrap();
    assert_eq!(as_tuples(&locations), expected_uses());
}

#[test]
fn test_rename_locations_spell_the_identifier() {
    let mut host = rename_host();
    let analysis = host.analysis();
    let first = file_id(&analysis, &project_path("firstFile.ets"));

    let locations = analysis.find_rename_locations(&[], first, ABC_DECLARATION).unwrap();
    assert_eq!(locations.len(), ABC_USES.len() + 1, "declaration plus uses");
    for location in &locations {
        let text = analysis.program().file(location.file).unwrap().text();
        assert_eq!(slice(text, location.span), "abc", "at {location:?}");
    }
}

#[rstest]
#[case("secondFile.ets", 42)]
#[case("secondFile.ets", 9)]
#[case("thirdFile.ets", 102)]
#[case("thirdFile.ets", 10)]
fn test_rename_is_symmetric(#[case] seed_file: &str, #[case] offset: u32) {
    let mut host = rename_host();
    let analysis = host.analysis();
    let files = [
        file_id(&analysis, &project_path("secondFile.ets")),
        file_id(&analysis, &project_path("thirdFile.ets")),
    ];
    let seed = file_id(&analysis, &project_path(seed_file));

    let locations = analysis.find_rename_locations(&files, seed, offset).unwrap();
    assert_eq!(as_tuples(&locations), expected_uses());
}

#[test]
fn test_rename_of_unresolved_name_is_empty() {
    let mut host = host_with(&[("/a.ets", "missing();")]);
    let analysis = host.analysis();
    let file = file_id(&analysis, "/a.ets");
    assert!(analysis.find_rename_locations(&[], file, 2).unwrap().is_empty());
}

// =============================================================================
// REFERENCES
// =============================================================================

#[test]
fn test_references_are_symmetric_over_all_occurrences() {
    let mut host = rename_host();
    let analysis = host.analysis();
    let first = file_id(&analysis, &project_path("firstFile.ets"));

    let key = |file: FileId, start: u32| (file, start);
    let seeded = analysis.find_references_at_position(first, ABC_DECLARATION, &[]).unwrap();
    let occurrences: BTreeSet<_> = seeded.iter().map(|r| key(r.file, r.span.start)).collect();
    assert_eq!(occurrences.len(), 9);

    for (file, start) in &occurrences {
        let from_here = analysis.find_references_at_position(*file, *start, &[]).unwrap();
        let set: BTreeSet<_> = from_here.iter().map(|r| key(r.file, r.span.start)).collect();
        assert_eq!(set, occurrences, "seeded at {start} in {file:?}");
    }
}

#[test]
fn test_reference_kinds_and_order() {
    let mut host = rename_host();
    let analysis = host.analysis();
    let first = file_id(&analysis, &project_path("firstFile.ets"));

    let refs = analysis.find_references_at_position(first, ABC_DECLARATION, &[]).unwrap();
    assert!(refs[0].is_definition);
    assert_eq!(refs[0].kind, ReferenceKind::Declaration);
    assert_eq!(refs[0].line, 1);
    // files in program order, source order within each
    let files: Vec<&str> = refs.iter().map(|r| r.file_name.as_str()).collect();
    let mut sorted = files.clone();
    sorted.sort();
    assert_eq!(files, sorted);
    assert!(refs.iter().skip(1).all(|r| !r.is_definition));
}

#[test]
fn test_member_references_through_instance() {
    let mut host = rename_host();
    let analysis = host.analysis();
    let first = file_id(&analysis, &project_path("firstFile.ets"));
    let bar = offset_of(FIRST_FILE, "bar");

    let refs = analysis.find_references_at_position(first, bar, &[]).unwrap();
    let found: Vec<(String, u32)> = refs.iter().map(|r| (r.file_name.clone(), r.span.start)).collect();
    assert_eq!(
        found,
        vec![
            (project_path("firstFile.ets"), bar),
            (project_path("thirdFile.ets"), offset_of(THIRD_FILE, "bar")),
        ]
    );
}

#[test]
fn test_alias_uses_are_references() {
    let mut host = host_with(&[
        ("/p/lib.ets", "export function size(): number { return 1; }"),
        ("/p/a.ets", "import { size as n } from \"./lib\";\nn();\nn();"),
    ]);
    let analysis = host.analysis();
    let lib = file_id(&analysis, "/p/lib.ets");

    let refs = analysis.find_references_at_position(lib, 16, &[]).unwrap();
    let in_importer: Vec<u32> = refs
        .iter()
        .filter(|r| r.file_name == "/p/a.ets")
        .map(|r| r.span.start)
        .collect();
    assert_eq!(in_importer, vec![9, 17, 35, 40]);
}

// =============================================================================
// SAFE DELETE
// =============================================================================

#[rstest]
#[case(offset_of(SAFE_DELETE_SOURCE, "a()"), false)]
#[case(offset_of(SAFE_DELETE_SOURCE, "PI"), true)]
#[case(9, false)]
fn test_safe_delete(#[case] offset: u32, #[case] expected: bool) {
    let mut host = host_with(&[("/a.ets", SAFE_DELETE_SOURCE)]);
    let analysis = host.analysis();
    let file = file_id(&analysis, "/a.ets");
    assert_eq!(analysis.get_safe_delete_info(file, offset).unwrap(), expected);
}

#[test]
fn test_safe_delete_sees_importers() {
    let mut host = host_with(&[
        ("/p/lib.ets", "export const used = 1;\nexport const unused = 2;"),
        ("/p/main.ets", "import { used } from \"./lib\";\nused;"),
    ]);
    let analysis = host.analysis();
    let lib = file_id(&analysis, "/p/lib.ets");
    assert!(!analysis.get_safe_delete_info(lib, 13).unwrap());
    assert!(analysis.get_safe_delete_info(lib, 36).unwrap());
}

#[test]
fn test_empty_namespace_is_safe_to_delete() {
    let mut host = host_with(&[("/a.ets", "namespace Foo {}")]);
    let analysis = host.analysis();
    let file = file_id(&analysis, "/a.ets");
    assert!(analysis.get_safe_delete_info(file, 10).unwrap());
}

// =============================================================================
// FILE REFERENCES
// =============================================================================

#[test]
fn test_file_references_with_and_without_extension() {
    let mut host = host_with(&[
        ("/p/util.ets", "export const u = 1;"),
        ("/p/a.ets", "import { u } from \"./util\";"),
        ("/p/sub/b.ets", "import { u } from \"../util.ets\";"),
        ("/p/c.ets", "import { u } from \"./other\";"),
    ]);
    host.set_library_file(STDLIB_MODULE, STDLIB_PATH, STDLIB_SOURCE, false);
    host.set_file_content("/p/d.ets", "import { print } from \"std/core\";");
    let analysis = host.analysis();

    let refs = analysis.find_file_references("/p/util.ets", false);
    let found: Vec<(&str, u32)> = refs.iter().map(|r| (r.file_name.as_str(), r.span.start)).collect();
    assert_eq!(found, vec![("/p/a.ets", 19), ("/p/sub/b.ets", 19)]);

    let lib = analysis.find_file_references(STDLIB_MODULE, true);
    assert_eq!(lib.len(), 1);
    assert_eq!(lib[0].file_name, "/p/d.ets");
}
