//! HIR tests
//!
//! Tests for:
//! - Declaration binding across scopes, imports and re-exports
//! - Overload selection
//! - Program snapshots and handles

mod tests_binder;
mod tests_program;
