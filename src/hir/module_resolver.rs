//! Module specifier resolution.
//!
//! Resolution is purely lexical over the program's file table: a specifier maps
//! to a file id or to nothing. Order:
//!
//! 1. relative specifiers against the importing file's directory
//! 2. `paths` aliases (one `*` wildcard per pattern)
//! 3. library module paths (`std/core`)
//! 4. interop module names with a configured path
//! 5. `baseUrl`

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::base::{FileId, is_relative_specifier, join_path, normalize_path, parent_dir};
use crate::project::ProjectConfig;

/// Suffixes tried after a candidate path, in order.
const CANDIDATE_SUFFIXES: &[&str] = &[
    "",
    ".ets",
    ".ts",
    ".d.ets",
    ".d.ts",
    "/index.ets",
    "/index.ts",
];

/// `by_path` is the program's file table; a file's id is its index.
pub(crate) struct ModuleResolver<'a, V> {
    pub by_path: &'a IndexMap<String, V>,
    pub by_module: &'a FxHashMap<String, FileId>,
    pub config: &'a ProjectConfig,
}

impl<V> ModuleResolver<'_, V> {
    /// Resolve `specifier` as written in the file at `from`.
    pub fn resolve(&self, from: &str, specifier: &str) -> Option<FileId> {
        if specifier.is_empty() {
            return None;
        }
        if is_relative_specifier(specifier) {
            return self.probe(&join_path(parent_dir(from), specifier));
        }
        if let Some(found) = self.resolve_alias(specifier) {
            return Some(found);
        }
        if let Some(&found) = self.by_module.get(specifier) {
            return Some(found);
        }
        let interop = self
            .config
            .interop
            .iter()
            .filter(|module| module.name == specifier)
            .filter_map(|module| module.path.as_deref())
            .find_map(|path| self.probe(&normalize_path(path)));
        if interop.is_some() {
            return interop;
        }
        let base_url = self.config.base_url.as_deref()?;
        self.probe(&join_path(base_url, specifier))
    }

    fn resolve_alias(&self, specifier: &str) -> Option<FileId> {
        self.config.paths.iter().find_map(|(pattern, substitutions)| {
            let captured = match_pattern(pattern, specifier)?;
            substitutions
                .iter()
                .find_map(|sub| self.probe(&normalize_path(&sub.replacen('*', captured, 1))))
        })
    }

    fn probe(&self, path: &str) -> Option<FileId> {
        CANDIDATE_SUFFIXES
            .iter()
            .find_map(|suffix| self.by_path.get_index_of(format!("{path}{suffix}").as_str()))
            .map(|idx| FileId::new(idx as u32))
    }
}

/// Match a `paths` key against a specifier, returning the text captured by `*`.
fn match_pattern<'s>(pattern: &str, specifier: &'s str) -> Option<&'s str> {
    match pattern.split_once('*') {
        None => (pattern == specifier).then_some(""),
        Some((prefix, suffix)) => {
            let rest = specifier.strip_prefix(prefix)?;
            let captured = rest.strip_suffix(suffix)?;
            Some(captured)
        }
    }
}
