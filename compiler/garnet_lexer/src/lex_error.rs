//! Lexical errors.
//!
//! Every lexical error is fatal for the parse. The scanner returns the
//! first one it meets; [`LexError::into_diagnostic`] converts it for the
//! diagnostic queue.

use garnet_diagnostic::{Diagnostic, ErrorCode};
use garnet_ir::Span;

/// Which family of literal was left open.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LiteralKind {
    String,
    Regexp,
    List,
    Quoted,
}

impl LiteralKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LiteralKind::String => "string",
            LiteralKind::Regexp => "regexp",
            LiteralKind::List => "list",
            LiteralKind::Quoted => "quoted string",
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
pub enum LexErrorKind {
    #[error("unterminated {} meets end of file", kind.as_str())]
    UnterminatedString { kind: LiteralKind, delimiter: char },
    #[error("can't find string \"{id}\" anywhere before EOF")]
    UnterminatedHeredoc { id: String },
    #[error("unterminated here document identifier")]
    UnterminatedHeredocIdentifier,
    #[error("embedded document meets end of file")]
    UnterminatedEmbdoc,
    #[error("{0}")]
    InvalidEscape(&'static str),
    #[error("{0}")]
    InvalidUnicodeEscape(&'static str),
    #[error("{0}")]
    InvalidNumber(&'static str),
    #[error("Invalid char '{0}' in expression")]
    InvalidCharacter(String),
    #[error("{0}")]
    InvalidVariableName(String),
    #[error("incomplete character syntax")]
    IncompleteCharSyntax,
    #[error("invalid multibyte char (UTF-8)")]
    InvalidMultibyte,
    #[error("unknown type of %string")]
    UnknownPercentLiteral,
    #[error("nesting too deep (limit {limit})")]
    NestingTooDeep { limit: u32 },
    #[error("{0}")]
    Io(String),
}

impl LexErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            LexErrorKind::UnterminatedString {
                kind: LiteralKind::Regexp,
                ..
            } => ErrorCode::E0003,
            LexErrorKind::UnterminatedString { .. } | LexErrorKind::Io(_) => ErrorCode::E0001,
            LexErrorKind::UnterminatedHeredoc { .. }
            | LexErrorKind::UnterminatedHeredocIdentifier => ErrorCode::E0002,
            LexErrorKind::UnterminatedEmbdoc => ErrorCode::E0008,
            LexErrorKind::InvalidEscape(_) => ErrorCode::E0004,
            LexErrorKind::InvalidUnicodeEscape(_) => ErrorCode::E0005,
            LexErrorKind::InvalidNumber(_) => ErrorCode::E0006,
            LexErrorKind::InvalidCharacter(_) | LexErrorKind::UnknownPercentLiteral => {
                ErrorCode::E0007
            }
            LexErrorKind::InvalidVariableName(_) => ErrorCode::E0009,
            LexErrorKind::IncompleteCharSyntax => ErrorCode::E0010,
            LexErrorKind::NestingTooDeep { .. } => ErrorCode::E0011,
            LexErrorKind::InvalidMultibyte => ErrorCode::E0012,
        }
    }
}

/// A lexical error with its location.
#[derive(Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
#[error("{kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    #[cold]
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        LexError { kind, span }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        let label = match &self.kind {
            LexErrorKind::UnterminatedString { delimiter, .. } => {
                format!("literal opened here, expected closing `{delimiter}`")
            }
            LexErrorKind::UnterminatedHeredoc { .. } => "heredoc starts here".to_owned(),
            _ => String::new(),
        };
        Diagnostic::fatal(self.kind.code())
            .with_message(self.kind.to_string())
            .with_label(self.span, label)
    }
}

#[cfg(test)]
mod tests;
