//! Configuration files on disk, loaded through the analysis host.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use rstest::rstest;
use tempfile::TempDir;

use ets_analysis::AnalysisHost;
use ets_analysis::base::{DiagnosticCode, Severity};
use ets_analysis::project::{ConfigFiles, load_project_config};

use crate::helpers::host_helpers::*;

const BASE_CONFIG: &str = r#"{
  "compilerOptions": {
    "baseUrl": "./src"
  }
}"#;

const PROJECT_CONFIG: &str = r#"{
  "extends": "./base",
  "compilerOptions": {
    "paths": { "@utils/*": ["./utils/*"] },
    "dynamicPaths": { "legacy": { "language": "ts", "path": "./interop/legacy.ets" } }
  }
}"#;

const MAIN: &str = "import { square } from \"@utils/math\";\nimport { pad } from \"helpers/fmt\";\nimport { old } from \"legacy\";\nsquare(pad(old));";

/// Project sources relative to the project root.
static SOURCES: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("src/utils/math.ets", "export function square(n: number): number { return n * n; }"),
        ("src/helpers/fmt.ets", "export function pad(n: number): number { return n; }"),
        ("interop/legacy.ets", "export const old = 1;"),
        ("src/main.ets", MAIN),
    ]
});

fn write(root: &Path, relative: &str, text: &str) -> String {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, text).unwrap();
    path.to_string_lossy().into_owned()
}

/// A host over a project written to a fresh directory, with `config` as the entry configuration.
fn project_on_disk(config: &str) -> (TempDir, AnalysisHost, String) {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "base.json", BASE_CONFIG);
    let entry = write(dir.path(), "project.json", config);

    let mut host = AnalysisHost::new();
    for (relative, text) in SOURCES.iter() {
        let path = dir.path().join(relative).to_string_lossy().into_owned();
        host.set_file_content(&path, text);
    }
    host.load_config(&entry);
    let root = dir.path().to_string_lossy().into_owned();
    (dir, host, root)
}

// =============================================================================
// RESOLUTION
// =============================================================================

#[test]
fn test_aliases_base_url_and_interop_resolve() {
    let (_dir, mut host, root) = project_on_disk(PROJECT_CONFIG);
    let analysis = host.analysis();
    assert!(analysis.option_diagnostics().diagnostic.is_empty());
    assert!(analysis.global_diagnostics().diagnostic.is_empty());

    let main = file_id(&analysis, &format!("{root}/src/main.ets"));
    let target = |needle: &str| {
        let found = analysis.definition_at_position(main, nth_offset_of(MAIN, needle, 1)).unwrap();
        found[0].file_name.clone()
    };
    assert_eq!(target("square"), format!("{root}/src/utils/math.ets"));
    assert_eq!(target("pad"), format!("{root}/src/helpers/fmt.ets"));
    assert_eq!(target("old"), format!("{root}/interop/legacy.ets"));
}

#[test]
fn test_config_without_aliases_leaves_imports_unresolved() {
    let (_dir, mut host, _root) = project_on_disk(r#"{ "compilerOptions": {} }"#);
    let analysis = host.analysis();
    let global = analysis.global_diagnostics();
    let unresolved: Vec<&str> = global
        .diagnostic
        .iter()
        .map(|d| d.message.as_str())
        .collect();
    assert_eq!(
        unresolved,
        vec![
            "Cannot find module '@utils/math' or its corresponding type declarations.",
            "Cannot find module 'helpers/fmt' or its corresponding type declarations.",
            "Cannot find module 'legacy' or its corresponding type declarations.",
        ]
    );
}

// =============================================================================
// PROBLEMS
// =============================================================================

#[rstest]
#[case(r#"{ "compilerOptions": { "#, DiagnosticCode::Int(5014))]
#[case(r#"[1, 2]"#, DiagnosticCode::Int(5092))]
#[case(r#"{ "extends": "./missing.json" }"#, DiagnosticCode::Int(5083))]
#[case(r#"{ "compilerOptions": { "baseUrl": 3 } }"#, DiagnosticCode::Int(5024))]
#[case(r#"{ "compilerOptions": { "paths": { "a/*/*": ["./x/*"] } } }"#, DiagnosticCode::Int(5061))]
#[case(r#"{ "compilerOptions": { "paths": { "a/*": "./x/*" } } }"#, DiagnosticCode::Int(5063))]
#[case(r#"{ "compilerOptions": { "paths": { "a/*": [] } } }"#, DiagnosticCode::Int(5066))]
#[case(r#"{ "compilerOptions": { "paths": { "a/*": ["./x/*/*"] } } }"#, DiagnosticCode::Int(5062))]
#[case(r#"{ "compilerOptions": { "paths": { "a/*": ["x/*"] } } }"#, DiagnosticCode::Int(5090))]
#[case(
    r#"{ "compilerOptions": { "dynamicPaths": { "py": { "language": "python" } } } }"#,
    DiagnosticCode::Str("unsupported-interop-language")
)]
fn test_config_problem(#[case] config: &str, #[case] code: DiagnosticCode) {
    let (_dir, mut host, root) = project_on_disk(config);
    let analysis = host.analysis();
    let options = analysis.option_diagnostics();
    assert_eq!(options.diagnostic.len(), 1, "{:?}", options.diagnostic);
    let problem = &options.diagnostic[0];
    assert_eq!(problem.code, code);
    assert_eq!(problem.severity, Severity::Error);
    assert_eq!(problem.file_name, format!("{root}/project.json"));
    assert!(problem.file.is_none());
}

#[test]
fn test_circular_extends() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.json", r#"{ "extends": "./b.json" }"#);
    write(dir.path(), "b.json", "{\n  \"extends\": \"./a.json\"\n}");

    let load = load_project_config(&a, &ConfigFiles::load(&a));
    assert_eq!(load.problems.len(), 1);
    let problem = &load.problems[0];
    assert_eq!(problem.code(), DiagnosticCode::Int(18000));
    assert!(problem.file.ends_with("b.json"));
    assert_eq!(problem.range.start.line, 1);
}

#[test]
fn test_unreadable_entry() {
    let dir = TempDir::new().unwrap();
    let entry = dir.path().join("absent.json").to_string_lossy().into_owned();
    let mut host = host_with(&[("/p/a.ets", "export const a = 1;")]);
    host.load_config(&entry);
    let analysis = host.analysis();
    let codes: Vec<DiagnosticCode> = analysis.option_diagnostics().diagnostic.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![DiagnosticCode::Int(5083)]);
}
