//! Stateful scanner for the garnet front-end.
//!
//! The scanner pulls source one line at a time from a [`LineSource`] and
//! produces tokens on demand. It cannot run ahead of the parser: the
//! meaning of many characters depends on the lexer state the grammar
//! leaves behind, and on which identifiers are local variables in the
//! scope being parsed.
//!
//! - [`Lexer`]: the state machine and its parser-facing setters
//! - [`StrTerm`]: the open literal (string, regexp, word list, heredoc)
//! - [`MagicSettings`]: settings collected from magic comments

mod cursor;
mod escape;
mod heredoc;
mod ident;
mod keywords;
mod lex_error;
mod literal;
mod magic;
mod number;
mod scanner;
mod source;
mod state;

use garnet_diagnostic::Diagnostic;
use garnet_ir::{Name, StringInterner, Token, TokenKind};
use rustc_hash::FxHashSet;

pub use heredoc::{dedent_width, line_indent, HeredocTerm, TAB_WIDTH};
pub use ident::is_numbered_param;
pub use keywords::{lookup as lookup_keyword, text_of as keyword_text, Keyword};
pub use lex_error::{LexError, LexErrorKind, LiteralKind};
pub use literal::{LiteralTerm, StrFunc, StrTerm};
pub use magic::{MagicSettings, ShareablePolicy, SourceEncoding};
pub use scanner::{Lexer, LexerOutput};
pub use source::{LineSource, ReaderLines, SourceError, StrLines};
pub use state::{BitStack, LexState};

/// Answers whether a name is a local variable in the scope being parsed.
pub trait LocalLookup {
    fn is_local(&self, name: Name) -> bool;
}

impl LocalLookup for FxHashSet<Name> {
    fn is_local(&self, name: Name) -> bool {
        self.contains(&name)
    }
}

/// No local variables are in scope.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoLocals;

impl LocalLookup for NoLocals {
    fn is_local(&self, _name: Name) -> bool {
        false
    }
}

/// Tokens of a whole source, scanned without a parser.
#[derive(Debug)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
    pub interner: StringInterner,
    pub diagnostics: Vec<Diagnostic>,
}

/// Scan `source` to the end, entering and leaving interpolations the way
/// the parser would. The last token is always `Eof`.
///
/// No identifier is treated as a local variable.
pub fn tokenize(source: &str) -> Result<TokenStream, LexError> {
    collect_tokens(Lexer::new(StrLines::new(source)))
}

/// Drain `lexer` the way [`tokenize`] does.
pub fn collect_tokens(mut lexer: Lexer<'_>) -> Result<TokenStream, LexError> {
    let mut tokens = Vec::new();
    let mut pending_dvar = false;
    loop {
        let token = lexer.next_token(&NoLocals)?;
        let kind = token.kind;
        tokens.push(token);
        if pending_dvar {
            pending_dvar = false;
            lexer.resume_literal();
        }
        match kind {
            TokenKind::StringDBeg => lexer.suspend_literal()?,
            TokenKind::StringDVar => {
                lexer.suspend_literal()?;
                pending_dvar = true;
            }
            TokenKind::StringDEnd => lexer.resume_literal(),
            TokenKind::Eof => break,
            _ => {}
        }
    }
    let diagnostics = lexer.take_diagnostics();
    let output = lexer.into_output();
    Ok(TokenStream {
        tokens,
        interner: output.interner,
        diagnostics,
    })
}

#[cfg(test)]
mod test_helpers;
