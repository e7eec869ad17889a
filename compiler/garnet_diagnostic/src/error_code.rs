//! Error codes for all front-end diagnostics.
//!
//! The first digit after the letter names the phase.

use std::fmt;

/// Error codes for all front-end diagnostics.
///
/// - E0xxx: Lexer errors (fatal)
/// - E1xxx: Parser errors (syntax and semantic)
/// - W0xxx: Lexer warnings
/// - W1xxx: Parser and scope warnings
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Unterminated string, symbol, command or word list
    E0001,
    /// Heredoc identifier never found
    E0002,
    /// Unterminated regexp
    E0003,
    /// Invalid escape sequence
    E0004,
    /// Invalid Unicode escape
    E0005,
    /// Malformed numeric literal
    E0006,
    /// Invalid character in source
    E0007,
    /// Embedded document without `=end`
    E0008,
    /// Invalid global, instance or class variable name
    E0009,
    /// Incomplete character syntax
    E0010,
    /// Nesting too deep
    E0011,
    /// Invalid multibyte character
    E0012,
    /// Unknown source encoding
    E0013,

    // Parser Errors (E1xxx)
    /// Unexpected token
    E1001,
    /// Too many syntax errors, parse aborted
    E1002,
    /// Invalid assignment target
    E1003,
    /// Duplicated argument name
    E1004,
    /// Dynamic constant assignment
    E1005,
    /// Circular argument reference
    E1006,
    /// Ordinary parameter defined alongside a numbered parameter
    E1007,
    /// Numbered parameter used in nested blocks
    E1008,
    /// Assignment to, or declaration of, a numbered parameter name
    E1009,
    /// Duplicated variable name in a pattern
    E1010,
    /// Duplicated key name in a hash pattern
    E1011,
    /// Unknown regexp option
    E1012,
    /// Invalid parameter order
    E1013,
    /// Invalid retry without rescue
    E1014,
    /// Class or module definition in a method body
    E1015,
    /// Both a block argument and a literal block given
    E1016,
    /// Invalid `...` forwarding
    E1017,
    /// Invalid return in class or module body
    E1018,
    /// Pinned name is not a local variable
    E1019,
    /// Constant, instance, class or global variable used as a parameter
    E1020,
    /// Regexp body does not fit its encoding option or the source encoding
    E1021,

    // Lexer Warnings (W0xxx)
    /// Ambiguous operator or argument prefix
    W0001,
    /// Invalid magic comment value
    W0002,
    /// Mixed regexp encoding options
    W0003,
    /// Float literal out of range
    W0004,

    // Parser Warnings (W1xxx)
    /// Assigned but unused variable
    W1001,
    /// Shadowing outer local variable
    W1002,
    /// Possibly useless expression in void context
    W1003,
    /// Duplicated `when` clause literal
    W1004,
    /// Statement not reached
    W1005,
    /// Duplicated hash key in a literal
    W1006,
    /// Named capture conflicts with a local variable
    W1007,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E0005 => "E0005",
            ErrorCode::E0006 => "E0006",
            ErrorCode::E0007 => "E0007",
            ErrorCode::E0008 => "E0008",
            ErrorCode::E0009 => "E0009",
            ErrorCode::E0010 => "E0010",
            ErrorCode::E0011 => "E0011",
            ErrorCode::E0012 => "E0012",
            ErrorCode::E0013 => "E0013",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E1009 => "E1009",
            ErrorCode::E1010 => "E1010",
            ErrorCode::E1011 => "E1011",
            ErrorCode::E1012 => "E1012",
            ErrorCode::E1013 => "E1013",
            ErrorCode::E1014 => "E1014",
            ErrorCode::E1015 => "E1015",
            ErrorCode::E1016 => "E1016",
            ErrorCode::E1017 => "E1017",
            ErrorCode::E1018 => "E1018",
            ErrorCode::E1019 => "E1019",
            ErrorCode::E1020 => "E1020",
            ErrorCode::E1021 => "E1021",
            ErrorCode::W0001 => "W0001",
            ErrorCode::W0002 => "W0002",
            ErrorCode::W0003 => "W0003",
            ErrorCode::W0004 => "W0004",
            ErrorCode::W1001 => "W1001",
            ErrorCode::W1002 => "W1002",
            ErrorCode::W1003 => "W1003",
            ErrorCode::W1004 => "W1004",
            ErrorCode::W1005 => "W1005",
            ErrorCode::W1006 => "W1006",
            ErrorCode::W1007 => "W1007",
        }
    }

    /// Lexical errors stop the parse.
    pub fn is_lexer_error(&self) -> bool {
        self.as_str().starts_with("E0")
    }

    /// Syntax errors come from the grammar, not from reductions.
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, ErrorCode::E1001 | ErrorCode::E1002)
    }

    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests;
