//! Parse error type.
//!
//! Grammar functions return `Result<_, ParseError>`; the statement loop
//! turns the error into a [`Diagnostic`], synchronizes and carries on.
//! Semantic problems found while building nodes do not use this type:
//! they go straight into the diagnostic queue and the tree is still built.

use garnet_diagnostic::{Diagnostic, ErrorCode};
use garnet_ir::{Span, Token, TokenKind};

use crate::recovery::TokenSet;

/// A syntax error that aborts the current statement.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
}

impl ParseError {
    #[cold]
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        ParseError {
            code,
            message: message.into(),
            span,
        }
    }

    /// "syntax error, unexpected X, expecting Y".
    #[cold]
    pub fn unexpected(found: &Token, expected: TokenSet) -> Self {
        Self::unexpected_kind(found.kind, found.span, expected)
    }

    #[cold]
    pub fn unexpected_kind(found: TokenKind, span: Span, expected: TokenSet) -> Self {
        let mut message = format!("syntax error, unexpected {}", found.display_name());
        if let Some(list) = expected.format_expected() {
            message.push_str(", expecting ");
            message.push_str(&list);
        }
        ParseError::new(ErrorCode::E1001, message, span)
    }

    /// Syntax error with a free-form explanation.
    #[cold]
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        ParseError::new(ErrorCode::E1001, message, span)
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error(self.code)
            .with_message(self.message)
            .with_label(self.span, "")
    }
}

#[cfg(test)]
mod tests;
