//! Project configuration: path aliases, `baseUrl`, interop modules.
//!
//! The analysis core consumes configuration read-only; this module turns
//! configuration files into a [`ProjectConfig`] plus the problems found on the
//! way, which the option diagnostics pass reports.

mod config;

pub use config::{
    ConfigFiles, ConfigLoad, ConfigProblem, InteropModule, ProjectConfig,
    SUPPORTED_INTEROP_LANGUAGES, load_project_config, messages,
};
