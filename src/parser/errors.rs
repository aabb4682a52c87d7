//! Syntax error types
//!
//! Every parse error carries a stable numeric code plus the positional
//! arguments of its message template, so the diagnostic layer can render it
//! with the same machinery as semantic diagnostics.

use rowan::TextRange;

/// What went wrong while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxErrorKind {
    /// A specific token was required (`'{0}' expected.`)
    Expected(&'static str),
    /// `Identifier expected.`
    IdentifierExpected,
    /// `Expression expected.`
    ExpressionExpected,
    /// `Type expected.`
    TypeExpected,
    /// `Declaration or statement expected.`
    DeclarationOrStatementExpected,
    /// `Invalid character.`
    InvalidCharacter,
}

impl SyntaxErrorKind {
    /// Numeric diagnostic code.
    pub fn code(&self) -> u32 {
        match self {
            Self::Expected(_) => 1005,
            Self::IdentifierExpected => 1003,
            Self::ExpressionExpected => 1109,
            Self::TypeExpected => 1110,
            Self::DeclarationOrStatementExpected => 1128,
            Self::InvalidCharacter => 1127,
        }
    }

    /// Positional arguments for the message template.
    pub fn args(&self) -> Vec<String> {
        match self {
            Self::Expected(token) => vec![(*token).to_string()],
            _ => Vec::new(),
        }
    }

    /// Fully rendered message.
    pub fn message(&self) -> String {
        match self {
            Self::Expected(token) => format!("'{token}' expected."),
            Self::IdentifierExpected => "Identifier expected.".to_string(),
            Self::ExpressionExpected => "Expression expected.".to_string(),
            Self::TypeExpected => "Type expected.".to_string(),
            Self::DeclarationOrStatementExpected => {
                "Declaration or statement expected.".to_string()
            }
            Self::InvalidCharacter => "Invalid character.".to_string(),
        }
    }
}

/// A syntax error with location and kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, range: TextRange) -> Self {
        Self { kind, range }
    }

    pub fn message(&self) -> String {
        self.kind.message()
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "error TS{}: {} at {:?}",
            self.kind.code(),
            self.kind.message(),
            self.range
        )
    }
}
