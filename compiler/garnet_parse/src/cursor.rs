//! One-token lookahead over a live [`Lexer`].
//!
//! The scanner's decisions depend on parser feedback (lexer state, the
//! cond/cmdarg stacks, interpolation nesting), so tokens are pulled one
//! at a time and only when the grammar asks for them. Feedback applied
//! while nothing is buffered takes effect for the very next token.
//!
//! A lexical error stops the scan: the error is parked and every later
//! [`peek`](Cursor::peek) yields `Eof`, which unwinds the grammar.

use garnet_ir::{Span, Token, TokenKind};
use garnet_lexer::{LexError, Lexer, LocalLookup};

pub(crate) struct Cursor<'src> {
    lexer: Lexer<'src>,
    lookahead: Option<Token>,
    /// End offset of the last consumed token.
    prev_end: u32,
    halted: bool,
    lex_error: Option<LexError>,
}

impl<'src> Cursor<'src> {
    pub(crate) fn new(lexer: Lexer<'src>) -> Self {
        Cursor {
            lexer,
            lookahead: None,
            prev_end: 0,
            halted: false,
            lex_error: None,
        }
    }

    /// The next token, scanning it if nothing is buffered.
    pub(crate) fn peek(&mut self, locals: &dyn LocalLookup) -> &Token {
        if self.lookahead.is_none() {
            let token = self.fetch(locals);
            self.lookahead = Some(token);
        }
        self.lookahead
            .get_or_insert_with(|| Token::simple(TokenKind::Eof, Span::DUMMY))
    }

    /// Consume the next token.
    pub(crate) fn bump(&mut self, locals: &dyn LocalLookup) -> Token {
        let token = match self.lookahead.take() {
            Some(token) => token,
            None => self.fetch(locals),
        };
        if token.kind != TokenKind::Eof {
            self.prev_end = token.span.end;
        }
        token
    }

    fn fetch(&mut self, locals: &dyn LocalLookup) -> Token {
        let eof = Token::simple(TokenKind::Eof, Span::point(self.prev_end));
        if self.halted {
            return eof;
        }
        match self.lexer.next_token(locals) {
            Ok(token) => token,
            Err(error) => {
                tracing::debug!(%error, "scan stopped");
                self.lex_error = Some(error);
                self.halted = true;
                eof
            }
        }
    }

    /// Whether a token is buffered; feedback to the lexer must wait for it.
    pub(crate) fn has_lookahead(&self) -> bool {
        self.lookahead.is_some()
    }

    /// Stop scanning; later peeks yield `Eof`.
    pub(crate) fn halt(&mut self) {
        self.halted = true;
        self.lookahead = None;
    }

    /// Stop with a lexical error raised outside of a scan.
    pub(crate) fn fail(&mut self, error: LexError) {
        tracing::debug!(%error, "scan stopped");
        self.lex_error = Some(error);
        self.halt();
    }

    /// Enter an interpolation; a nesting overflow stops the scan.
    pub(crate) fn suspend_literal(&mut self) -> bool {
        match self.lexer.suspend_literal() {
            Ok(()) => true,
            Err(error) => {
                self.fail(error);
                false
            }
        }
    }

    /// Leave an interpolation. The closing token must be consumed and
    /// nothing scanned past it.
    pub(crate) fn resume_literal(&mut self) {
        debug_assert!(!self.has_lookahead(), "literal resumed past a buffered token");
        self.lexer.resume_literal();
    }

    pub(crate) fn is_halted(&self) -> bool {
        self.halted
    }

    pub(crate) fn take_lex_error(&mut self) -> Option<LexError> {
        self.lex_error.take()
    }

    pub(crate) fn prev_end(&self) -> u32 {
        self.prev_end
    }

    /// Rewind the end marker, used after a heredoc body so node spans stay
    /// on the opening line.
    pub(crate) fn set_prev_end(&mut self, end: u32) {
        self.prev_end = end;
    }

    pub(crate) fn lexer(&self) -> &Lexer<'src> {
        &self.lexer
    }

    pub(crate) fn lexer_mut(&mut self) -> &mut Lexer<'src> {
        &mut self.lexer
    }

    pub(crate) fn into_lexer(self) -> Lexer<'src> {
        self.lexer
    }
}
