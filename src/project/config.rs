//! Project configuration loading.
//!
//! A project is described by a JSON file:
//!
//! ```json
//! {
//!   "extends": "../base.json",
//!   "compilerOptions": {
//!     "baseUrl": "./src",
//!     "paths": { "@utils/*": ["./utils/*"] },
//!     "dynamicPaths": { "legacy": { "language": "js", "path": "./js/legacy.js" } }
//!   }
//! }
//! ```
//!
//! `extends` chains are followed from the entry file up to the root ancestor;
//! options are then applied root first, so a child overrides its parents.
//! Anything malformed becomes a [`ConfigProblem`] and the offending option is
//! skipped. Loading never fails.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::base::{
    DiagnosticCode, DiagnosticMessage, LineIndex, Position, Range, Severity, TextRange, TextSize,
    join_path, normalize_path, parent_dir,
};

/// Languages an interop module may be declared in.
pub const SUPPORTED_INTEROP_LANGUAGES: &[&str] = &["ets", "ts", "js"];

pub mod messages {
    use crate::base::{DiagnosticCode, DiagnosticMessage, Severity};

    pub const CANNOT_READ_FILE: DiagnosticMessage =
        DiagnosticMessage::error(5083, "Cannot read file '{0}'.");
    pub const FAILED_TO_PARSE: DiagnosticMessage =
        DiagnosticMessage::error(5014, "Failed to parse file '{0}': {1}.");
    pub const ROOT_NOT_OBJECT: DiagnosticMessage =
        DiagnosticMessage::error(5092, "The root value of a '{0}' file must be an object.");
    pub const CIRCULAR_EXTENDS: DiagnosticMessage = DiagnosticMessage::error(
        18000,
        "Circularity detected while resolving configuration: {0}",
    );
    pub const OPTION_TYPE: DiagnosticMessage = DiagnosticMessage::error(
        5024,
        "Compiler option '{0}' requires a value of type {1}.",
    );
    pub const PATTERN_STARS: DiagnosticMessage = DiagnosticMessage::error(
        5061,
        "Pattern '{0}' can have at most one '*' character.",
    );
    pub const SUBSTITUTION_STARS: DiagnosticMessage = DiagnosticMessage::error(
        5062,
        "Substitution '{0}' in pattern '{1}' can have at most one '*' character.",
    );
    pub const SUBSTITUTIONS_NOT_ARRAY: DiagnosticMessage = DiagnosticMessage::error(
        5063,
        "Substitutions for pattern '{0}' should be an array.",
    );
    pub const SUBSTITUTION_TYPE: DiagnosticMessage = DiagnosticMessage::error(
        5064,
        "Substitution '{0}' for pattern '{1}' has incorrect type, expected 'string', got '{2}'.",
    );
    pub const SUBSTITUTIONS_EMPTY: DiagnosticMessage = DiagnosticMessage::error(
        5066,
        "Substitutions for pattern '{0}' shouldn't be an empty array.",
    );
    pub const NON_RELATIVE_WITHOUT_BASE_URL: DiagnosticMessage = DiagnosticMessage::error(
        5090,
        "Non-relative paths are not allowed when 'baseUrl' is not set. Did you forget a leading './'?",
    );
    pub const UNSUPPORTED_INTEROP_LANGUAGE: DiagnosticMessage = DiagnosticMessage::new(
        DiagnosticCode::Str("unsupported-interop-language"),
        Severity::Error,
        "Interop module '{0}' declares unsupported language '{1}'. Expected one of: {2}.",
    );
}

/// A module implemented in another language and reachable through interop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InteropModule {
    pub name: String,
    pub language: String,
    /// Normalized path of the implementation, when given.
    pub path: Option<String>,
}

/// Effective (merged) project configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Normalized directory that non-relative specifiers are looked up in.
    pub base_url: Option<String>,
    /// Alias pattern → substitutions, each already joined onto its base directory.
    pub paths: IndexMap<String, Vec<String>>,
    pub interop: Vec<InteropModule>,
}

/// A configuration problem, reported through the option diagnostics pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigProblem {
    /// Configuration file the problem was found in.
    pub file: String,
    pub range: Range,
    pub message: DiagnosticMessage,
    pub args: Vec<String>,
}

/// Result of loading a configuration chain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigLoad {
    pub config: ProjectConfig,
    pub problems: Vec<ConfigProblem>,
}

/// Configuration texts by normalized path; unreadable files keep their I/O error.
#[derive(Clone, Debug, Default)]
pub struct ConfigFiles {
    files: IndexMap<String, Result<String, String>>,
}

impl ConfigFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, text: impl Into<String>) {
        self.files.insert(normalize_path(path), Ok(text.into()));
    }

    pub fn insert_unreadable(&mut self, path: &str, error: impl Into<String>) {
        self.files.insert(normalize_path(path), Err(error.into()));
    }

    pub fn get(&self, path: &str) -> Option<Result<&str, &str>> {
        self.files
            .get(&normalize_path(path))
            .map(|entry| entry.as_deref().map_err(String::as_str))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Read `entry` and every file its `extends` chain names from disk.
    pub fn load(entry: &str) -> Self {
        let mut files = Self::new();
        let mut next = Some(normalize_path(entry));
        while let Some(path) = next.take() {
            if files.files.contains_key(&path) {
                break;
            }
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    next = serde_json::from_str::<Value>(&text)
                        .ok()
                        .as_ref()
                        .and_then(|root| root.get("extends"))
                        .and_then(Value::as_str)
                        .map(|target| extends_target(&path, target));
                    files.files.insert(path, Ok(text));
                }
                Err(err) => {
                    tracing::debug!(path = %path, error = %err, "config file unreadable");
                    files.files.insert(path, Err(err.to_string()));
                }
            }
        }
        files
    }
}

/// Resolve an `extends` value against the file that declares it.
fn extends_target(from: &str, target: &str) -> String {
    let resolved = join_path(parent_dir(from), target);
    if crate::base::file_name(&resolved).contains('.') {
        resolved
    } else {
        format!("{resolved}.json")
    }
}

#[derive(Debug, Deserialize)]
struct InteropEntry {
    language: Option<String>,
    path: Option<String>,
}

/// One parsed file of the `extends` chain.
struct Layer<'a> {
    path: String,
    text: &'a str,
    options: Map<String, Value>,
}

impl Layer<'_> {
    fn dir(&self) -> &str {
        parent_dir(&self.path)
    }
}

struct Loader {
    problems: Vec<ConfigProblem>,
}

impl Loader {
    fn report(&mut self, file: &str, range: Range, message: DiagnosticMessage, args: Vec<String>) {
        self.problems.push(ConfigProblem {
            file: file.to_string(),
            range,
            message,
            args,
        });
    }
}

/// Load the configuration whose entry file is `entry`.
pub fn load_project_config(entry: &str, files: &ConfigFiles) -> ConfigLoad {
    let mut loader = Loader {
        problems: Vec::new(),
    };
    let layers = collect_layers(&mut loader, &normalize_path(entry), files);

    let mut config = ProjectConfig::default();
    let mut paths_layer: Option<(&Layer<'_>, &Map<String, Value>)> = None;
    let mut interop: IndexMap<String, InteropModule> = IndexMap::new();

    for layer in layers.iter().rev() {
        if let Some(value) = layer.options.get("baseUrl") {
            match value.as_str() {
                Some(base_url) => config.base_url = Some(join_path(layer.dir(), base_url)),
                None => loader.report(
                    &layer.path,
                    locate(layer.text, "\"baseUrl\""),
                    messages::OPTION_TYPE,
                    vec!["baseUrl".to_string(), "string".to_string()],
                ),
            }
        }
        if let Some(value) = layer.options.get("paths") {
            match value.as_object() {
                Some(paths) => paths_layer = Some((layer, paths)),
                None => loader.report(
                    &layer.path,
                    locate(layer.text, "\"paths\""),
                    messages::OPTION_TYPE,
                    vec!["paths".to_string(), "object".to_string()],
                ),
            }
        }
        if let Some(value) = layer.options.get("dynamicPaths") {
            read_interop(&mut loader, layer, value, &mut interop);
        }
    }

    if let Some((layer, paths)) = paths_layer {
        config.paths = read_paths(&mut loader, layer, paths, config.base_url.as_deref());
    }
    config.interop = interop.into_values().collect();

    tracing::debug!(
        entry,
        layers = layers.len(),
        problems = loader.problems.len(),
        "project config loaded"
    );
    ConfigLoad {
        config,
        problems: loader.problems,
    }
}

/// Follow `extends` from the entry file; the entry comes first.
fn collect_layers<'a>(loader: &mut Loader, entry: &str, files: &'a ConfigFiles) -> Vec<Layer<'a>> {
    let mut layers: Vec<Layer<'a>> = Vec::new();
    let mut visited: FxHashSet<String> = FxHashSet::default();
    let mut current = entry.to_string();

    loop {
        if !visited.insert(current.clone()) {
            let mut chain: Vec<&str> = layers.iter().map(|l| l.path.as_str()).collect();
            chain.push(&current);
            tracing::warn!(chain = %chain.join(" -> "), "circular config extends");
            if let Some(last) = layers.last() {
                loader.report(
                    &last.path,
                    locate(last.text, "\"extends\""),
                    messages::CIRCULAR_EXTENDS,
                    vec![chain.join(" -> ")],
                );
            }
            break;
        }

        let (referrer, referrer_range) = match layers.last() {
            Some(last) => (last.path.clone(), locate(last.text, "\"extends\"")),
            None => (current.clone(), Range::default()),
        };

        let text = match files.get(&current) {
            Some(Ok(text)) => text,
            Some(Err(_)) | None => {
                loader.report(
                    &referrer,
                    referrer_range,
                    messages::CANNOT_READ_FILE,
                    vec![current.clone()],
                );
                break;
            }
        };

        let root = match serde_json::from_str::<Value>(text) {
            Ok(root) => root,
            Err(err) => {
                let at = Position::new(
                    err.line().saturating_sub(1) as u32,
                    err.column().saturating_sub(1) as u32,
                );
                loader.report(
                    &current,
                    Range::new(at, at),
                    messages::FAILED_TO_PARSE,
                    vec![current.clone(), err.to_string()],
                );
                break;
            }
        };

        let Value::Object(mut root) = root else {
            loader.report(
                &current,
                Range::default(),
                messages::ROOT_NOT_OBJECT,
                vec![crate::base::file_name(&current).to_string()],
            );
            break;
        };

        let options = match root.remove("compilerOptions") {
            Some(Value::Object(options)) => options,
            Some(_) => {
                loader.report(
                    &current,
                    locate(text, "\"compilerOptions\""),
                    messages::OPTION_TYPE,
                    vec!["compilerOptions".to_string(), "object".to_string()],
                );
                Map::new()
            }
            None => Map::new(),
        };

        let next = match root.get("extends") {
            Some(Value::String(target)) => Some(extends_target(&current, target)),
            Some(_) => {
                loader.report(
                    &current,
                    locate(text, "\"extends\""),
                    messages::OPTION_TYPE,
                    vec!["extends".to_string(), "string".to_string()],
                );
                None
            }
            None => None,
        };

        layers.push(Layer {
            path: current.clone(),
            text,
            options,
        });

        match next {
            Some(next) => current = next,
            None => break,
        }
    }

    layers
}

fn read_paths(
    loader: &mut Loader,
    layer: &Layer<'_>,
    paths: &Map<String, Value>,
    base_url: Option<&str>,
) -> IndexMap<String, Vec<String>> {
    let base = base_url.unwrap_or_else(|| layer.dir());
    let mut result = IndexMap::new();

    for (pattern, value) in paths {
        let pattern_range = locate(layer.text, &format!("\"{pattern}\""));
        if pattern.matches('*').count() > 1 {
            loader.report(
                &layer.path,
                pattern_range,
                messages::PATTERN_STARS,
                vec![pattern.clone()],
            );
            continue;
        }
        let Some(substitutions) = value.as_array() else {
            loader.report(
                &layer.path,
                pattern_range,
                messages::SUBSTITUTIONS_NOT_ARRAY,
                vec![pattern.clone()],
            );
            continue;
        };
        if substitutions.is_empty() {
            loader.report(
                &layer.path,
                pattern_range,
                messages::SUBSTITUTIONS_EMPTY,
                vec![pattern.clone()],
            );
            continue;
        }

        let mut resolved = Vec::new();
        for substitution in substitutions {
            let Some(text) = substitution.as_str() else {
                loader.report(
                    &layer.path,
                    pattern_range,
                    messages::SUBSTITUTION_TYPE,
                    vec![
                        substitution.to_string(),
                        pattern.clone(),
                        json_type_name(substitution).to_string(),
                    ],
                );
                continue;
            };
            let range = locate(layer.text, &format!("\"{text}\""));
            if text.matches('*').count() > 1 {
                loader.report(
                    &layer.path,
                    range,
                    messages::SUBSTITUTION_STARS,
                    vec![text.to_string(), pattern.clone()],
                );
                continue;
            }
            if base_url.is_none() && !crate::base::is_relative_specifier(text) {
                loader.report(
                    &layer.path,
                    range,
                    messages::NON_RELATIVE_WITHOUT_BASE_URL,
                    Vec::new(),
                );
                continue;
            }
            resolved.push(join_path(base, text));
        }
        if !resolved.is_empty() {
            result.insert(pattern.clone(), resolved);
        }
    }
    result
}

fn read_interop(
    loader: &mut Loader,
    layer: &Layer<'_>,
    value: &Value,
    interop: &mut IndexMap<String, InteropModule>,
) {
    let Some(modules) = value.as_object() else {
        loader.report(
            &layer.path,
            locate(layer.text, "\"dynamicPaths\""),
            messages::OPTION_TYPE,
            vec!["dynamicPaths".to_string(), "object".to_string()],
        );
        return;
    };

    for (name, entry) in modules {
        let range = locate(layer.text, &format!("\"{name}\""));
        let entry: InteropEntry = match serde_json::from_value(entry.clone()) {
            Ok(entry) => entry,
            Err(_) => {
                loader.report(
                    &layer.path,
                    range,
                    messages::OPTION_TYPE,
                    vec![format!("dynamicPaths.{name}"), "object".to_string()],
                );
                continue;
            }
        };
        let language = entry.language.unwrap_or_default();
        if !SUPPORTED_INTEROP_LANGUAGES.contains(&language.as_str()) {
            loader.report(
                &layer.path,
                range,
                messages::UNSUPPORTED_INTEROP_LANGUAGE,
                vec![
                    name.clone(),
                    language,
                    SUPPORTED_INTEROP_LANGUAGES.join(", "),
                ],
            );
            continue;
        }
        interop.insert(
            name.clone(),
            InteropModule {
                name: name.clone(),
                language,
                path: entry.path.map(|path| join_path(layer.dir(), &path)),
            },
        );
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "Array",
        Value::Object(_) => "object",
    }
}

/// Range of the first occurrence of `needle` in `text`, or the file start.
fn locate(text: &str, needle: &str) -> Range {
    match text.find(needle) {
        Some(start) => {
            let range = TextRange::at(TextSize::new(start as u32), TextSize::of(needle));
            LineIndex::new(text).range(range)
        }
        None => Range::default(),
    }
}

impl ConfigProblem {
    pub fn code(&self) -> DiagnosticCode {
        self.message.code
    }

    pub fn severity(&self) -> Severity {
        self.message.severity
    }
}
