//! Program snapshot tests: module resolution, import graph, handles.

use rstest::rstest;

use ets_analysis::AnalysisError;
use ets_analysis::hir::ProgramBuilder;

use crate::helpers::host_helpers::*;

#[rstest]
#[case("./util")]
#[case("./util.ets")]
#[case("./lib")]
#[case("./lib/index")]
#[case("../p/util")]
fn test_relative_specifiers_resolve(#[case] specifier: &str) {
    let main = format!("import {{ u }} from \"{specifier}\";\nu;");
    let program = ProgramBuilder::new()
        .add_file("/p/util.ets", "export const u = 1;")
        .add_file("/p/lib/index.ets", "export const u = 2;")
        .add_file("/p/main.ets", main.as_str())
        .build();
    let main = program.file_id("/p/main.ets").unwrap();
    assert!(program.resolve_module(main, specifier).is_some(), "{specifier} unresolved");
}

#[test]
fn test_unresolved_specifier_has_no_target() {
    let program = ProgramBuilder::new()
        .add_file("/p/main.ets", "import { u } from \"./nowhere\";")
        .build();
    let main = program.file_id("/p/main.ets").unwrap();
    let edges = program.imports(main);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].specifier, "./nowhere");
    assert_eq!(edges[0].target, None);
}

#[test]
fn test_import_graph() {
    let program = ProgramBuilder::new()
        .add_file("/p/base.ets", "export const b = 1;")
        .add_file("/p/mid.ets", "export * from \"./base\";")
        .add_file("/p/top.ets", "import { b } from \"./mid\";\nb;")
        .add_file("/p/other.ets", "export const o = 1;")
        .build();
    let id = |path: &str| program.file_id(path).unwrap();

    assert_eq!(program.importers(id("/p/base.ets")), vec![id("/p/mid.ets")]);
    assert_eq!(
        program.import_closure(id("/p/base.ets")),
        vec![id("/p/base.ets"), id("/p/mid.ets"), id("/p/top.ets")]
    );
    assert!(program.importers(id("/p/other.ets")).is_empty());
}

#[test]
fn test_paths_are_normalized() {
    let mut host = host_with(&[("/p/./sub/../a.ets", "export const a = 1;")]);
    assert!(host.has_file("/p/a.ets"));
    let analysis = host.analysis();
    assert_eq!(analysis.file_path(file_id(&analysis, "/p/a.ets")), Some("/p/a.ets"));
}

#[test]
fn test_handles_go_stale_after_edit() {
    let mut host = host_with(&[("/p/a.ets", "let value = 1;")]);
    let handle = {
        let analysis = host.analysis();
        let file = file_id(&analysis, "/p/a.ets");
        let token = analysis.touching_token(file, 4, false).unwrap().unwrap();
        assert!(analysis.program().resolve_handle(&token.handle).is_ok());
        token.handle
    };

    host.set_file_content("/p/a.ets", "let value = 2;");
    let analysis = host.analysis();
    assert!(matches!(
        analysis.program().resolve_handle(&handle),
        Err(AnalysisError::StaleHandle { .. })
    ));
}

#[test]
fn test_unknown_file_is_an_error() {
    let mut host = host_with(&[("/p/a.ets", "let value = 1;")]);
    let analysis = host.analysis();
    assert!(matches!(
        analysis.program().file_by_path("/p/missing.ets"),
        Err(AnalysisError::UnknownFile(_))
    ));
}

#[test]
fn test_independent_programs_share_nothing() {
    let first = ProgramBuilder::new().add_file("/p/a.ets", "let a = 1;").build();
    let second = ProgramBuilder::new().add_file("/p/a.ets", "let a = 1;").build();
    assert_ne!(first.generation(), second.generation());
}
