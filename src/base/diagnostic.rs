//! Diagnostic primitives shared by every producer (parser, checker, config loader).

use serde::Serialize;

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// Numeric compiler codes and string codes (lint-style rules) share one field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum DiagnosticCode {
    Int(u32),
    Str(&'static str),
}

impl DiagnosticCode {
    pub fn as_int(&self) -> Option<u32> {
        match self {
            Self::Int(code) => Some(*code),
            Self::Str(_) => None,
        }
    }
}

impl From<u32> for DiagnosticCode {
    fn from(code: u32) -> Self {
        Self::Int(code)
    }
}

impl From<&'static str> for DiagnosticCode {
    fn from(code: &'static str) -> Self {
        Self::Str(code)
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(code) => write!(f, "{code}"),
            Self::Str(code) => f.write_str(code),
        }
    }
}

/// Extra rendering hints attached to a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticTag {
    /// Unused or unreachable code, rendered faded.
    Unnecessary,
    Deprecated,
}

/// A message template with positional `{0}`, `{1}`, ... placeholders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DiagnosticMessage {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub template: &'static str,
}

impl DiagnosticMessage {
    pub const fn error(code: u32, template: &'static str) -> Self {
        Self {
            code: DiagnosticCode::Int(code),
            severity: Severity::Error,
            template,
        }
    }

    pub const fn new(code: DiagnosticCode, severity: Severity, template: &'static str) -> Self {
        Self {
            code,
            severity,
            template,
        }
    }
}
