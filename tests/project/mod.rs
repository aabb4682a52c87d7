//! Project configuration tests
//!
//! Tests for:
//! - Loading `extends` chains from disk
//! - Path aliases and `baseUrl` resolution
//! - Configuration problems reported as option diagnostics

mod tests_config_loading;
