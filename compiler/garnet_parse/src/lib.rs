//! Recursive descent parser for the garnet front-end.
//!
//! A [`Parser`] session owns the [`Lexer`], the [`ScopeTracker`] and an
//! [`AstSink`]. Tokens are pulled one at a time; the grammar feeds lexer
//! state back through explicit calls, and the scope tracker answers the
//! scanner's "is this a local variable" questions as the
//! [`LocalLookup`](garnet_lexer::LocalLookup) argument of every scan.
//!
//! Syntax errors are recorded and the parse resumes at the next statement
//! boundary; lexical errors, nesting overflow and the syntax error limit
//! stop it without a tree.

mod builder;
mod context;
mod cursor;
mod error;
mod grammar;
mod recovery;
mod scope;

pub use builder::{
    is_shareable_literal, literal_concat, named_captures, AstSink, EventListener, EventSink,
    Fragment, TreeSink,
};
pub use context::ParseContext;
pub use error::ParseError;
pub use recovery::{TokenSet, COMMAND_ARG_START, STMTS_END, STMT_BOUNDARY, TERMS, VALUE_START};
pub use scope::{Forwarding, Resolution, ScopeKind, ScopeTracker, VarRole};

use cursor::Cursor;
use garnet_diagnostic::queue::too_many_errors;
use garnet_diagnostic::{Diagnostic, DiagnosticConfig, DiagnosticQueue, ErrorCode};
use garnet_ir::{Name, NodeArena, NodeId, NodeKind, Span, StringLookup, Token, TokenKind};
use garnet_lexer::{LexState, Lexer, LexerOutput};
use garnet_stack::{ensure_sufficient_stack, NestingGuard};
use rustc_hash::FxHashSet;

pub(crate) type PResult<T> = Result<T, ParseError>;

/// Session settings that are not carried by magic comments.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ParserConfig {
    /// Default for `frozen_string_literal` when no magic comment sets it.
    pub frozen_string_literal: bool,
    /// Syntax errors before the parse aborts; 0 means unlimited.
    pub syntax_error_limit: usize,
    /// Report "assigned but unused variable".
    pub warn_unused: bool,
    /// Number of the first source line, as seen by `__LINE__`.
    pub line_offset: u32,
    /// Limit on nested constructs.
    pub max_nesting: u32,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            frozen_string_literal: false,
            syntax_error_limit: DiagnosticConfig::default().syntax_error_limit,
            warn_unused: true,
            line_offset: 1,
            max_nesting: garnet_stack::DEFAULT_MAX_NESTING,
        }
    }
}

/// Everything a finished session produces.
#[derive(Debug)]
pub struct ParsedProgram {
    pub arena: NodeArena,
    /// `None` after a lexical error, nesting overflow or an aborted parse.
    pub root: Option<NodeId>,
    /// Sorted by source position.
    pub diagnostics: Vec<Diagnostic>,
    pub lexer: LexerOutput,
}

impl ParsedProgram {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Parse with a plain tree sink.
pub fn parse(lexer: Lexer<'_>, config: ParserConfig) -> ParsedProgram {
    Parser::new(lexer, config, Box::new(TreeSink::new())).parse_program()
}

/// One parse session.
pub struct Parser<'src> {
    cursor: Cursor<'src>,
    scopes: ScopeTracker,
    sink: Box<dyn AstSink>,
    diagnostics: DiagnosticQueue,
    config: ParserConfig,
    nesting: NestingGuard,
    /// Parameter whose default value is being parsed.
    current_arg: Option<Name>,
    /// Variables bound by the pattern being parsed.
    pattern_vars: FxHashSet<Name>,
    aborted: bool,
}

impl<'src> Parser<'src> {
    pub fn new(lexer: Lexer<'src>, config: ParserConfig, sink: Box<dyn AstSink>) -> Self {
        let diagnostics = DiagnosticQueue::with_config(DiagnosticConfig {
            syntax_error_limit: config.syntax_error_limit,
            ..DiagnosticConfig::default()
        });
        Parser {
            cursor: Cursor::new(lexer),
            scopes: ScopeTracker::new(config.warn_unused),
            sink,
            diagnostics,
            nesting: NestingGuard::new(config.max_nesting),
            config,
            current_arg: None,
            pattern_vars: FxHashSet::default(),
            aborted: false,
        }
    }

    /// Parse the whole source.
    pub fn parse_program(mut self) -> ParsedProgram {
        tracing::debug!("parse started");
        let root = self.parse_top_level();
        self.drain_lexer_diagnostics();
        let lex_error = self.cursor.take_lex_error();
        let failed = lex_error.is_some() || self.aborted;
        if let Some(error) = lex_error {
            self.diagnostics.push(error.into_diagnostic());
        }
        let unused = self.scopes.finish(self.cursor.lexer().interner());
        if !failed {
            for diag in unused {
                self.diagnostics.push(diag);
            }
        }
        let diagnostics = self.diagnostics.flush();
        tracing::debug!(
            nodes = self.sink.arena().len(),
            diagnostics = diagnostics.len(),
            failed,
            "parse finished"
        );
        ParsedProgram {
            arena: self.sink.into_arena(),
            root: if failed { None } else { Some(root) },
            diagnostics,
            lexer: self.cursor.into_lexer().into_output(),
        }
    }

    // Token access

    #[inline]
    fn peek(&mut self) -> &Token {
        self.cursor.peek(&self.scopes)
    }

    #[inline]
    fn peek_kind(&mut self) -> TokenKind {
        self.peek().kind
    }

    #[inline]
    fn peek_span(&mut self) -> Span {
        self.peek().span
    }

    #[inline]
    fn at(&mut self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    #[inline]
    fn at_any(&mut self, set: TokenSet) -> bool {
        let kind = self.peek_kind();
        set.contains(kind)
    }

    /// Consume the next token, reporting it to the sink.
    fn bump(&mut self) -> Token {
        let token = self.cursor.bump(&self.scopes);
        self.sink.on_token(&token);
        self.drain_lexer_diagnostics();
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(TokenSet::single(kind)))
        }
    }

    /// Syntax error for the next token.
    fn unexpected(&mut self, expected: TokenSet) -> ParseError {
        let token = self.peek().clone();
        ParseError::unexpected(&token, expected)
    }

    fn skip_newlines(&mut self) {
        while self.eat(TokenKind::Newline) {}
    }

    fn skip_terms(&mut self) {
        while self.at_any(TERMS) {
            self.bump();
        }
    }

    fn drain_lexer_diagnostics(&mut self) {
        for diag in self.cursor.lexer_mut().take_diagnostics() {
            self.diagnostics.push(diag);
        }
    }

    // Lexer feedback

    fn set_lex_state(&mut self, state: LexState) {
        self.cursor.lexer_mut().set_state(state);
    }

    fn lexer_mut(&mut self) -> &mut Lexer<'src> {
        self.cursor.lexer_mut()
    }

    // Names and nodes

    fn text(&self, name: Name) -> &str {
        self.cursor.lexer().interner().lookup(name)
    }

    fn intern(&mut self, text: &str) -> Name {
        self.cursor.lexer_mut().interner_mut().intern(text)
    }

    fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.sink.alloc(kind, span)
    }

    fn node(&self, id: NodeId) -> &NodeKind {
        self.sink.arena().kind(id)
    }

    fn node_span(&self, id: NodeId) -> Span {
        self.sink.arena().span(id)
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.cursor.prev_end().max(start))
    }

    /// Line number of an offset as `__LINE__` reports it.
    fn line_number(&self, offset: u32) -> u32 {
        let line = self.cursor.lexer().line_of(offset);
        line.saturating_sub(1).saturating_add(self.config.line_offset)
    }

    // Diagnostics

    /// Queue a semantic diagnostic; nothing is added once scanning stopped.
    fn push_diagnostic(&mut self, diag: Diagnostic) {
        if self.cursor.is_halted() {
            return;
        }
        self.diagnostics.push(diag);
    }

    fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        self.push_diagnostic(Diagnostic::error(code).with_message(message).with_label(span, ""));
    }

    fn warn_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        self.push_diagnostic(Diagnostic::warning(code).with_message(message).with_label(span, ""));
    }

    /// Record a syntax error; past the limit the parse aborts.
    fn report(&mut self, error: ParseError) {
        if self.aborted || self.cursor.is_halted() {
            return;
        }
        tracing::debug!(message = %error.message, span = ?error.span, "syntax error");
        let span = error.span;
        self.diagnostics.push(error.into_diagnostic());
        if self.diagnostics.syntax_limit_reached() {
            self.abort(too_many_errors(self.config.syntax_error_limit, span));
        }
    }

    fn abort(&mut self, fatal: Diagnostic) {
        if !self.aborted {
            self.aborted = true;
            self.diagnostics.push(fatal);
            self.cursor.halt();
        }
    }

    // Structure

    /// Run `f` one nesting level deeper, with room on the native stack.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if let Err(err) = self.nesting.enter() {
            let span = self.peek_span();
            self.abort(
                Diagnostic::fatal(ErrorCode::E0011)
                    .with_message(err.to_string())
                    .with_label(span, ""),
            );
            return Err(ParseError::syntax(err.to_string(), span));
        }
        let result = ensure_sufficient_stack(|| f(self));
        self.nesting.exit();
        result
    }

    /// Run `f` inside a fresh scope frame; the frame is popped whatever
    /// `f` returns.
    fn with_scope<T>(&mut self, kind: ScopeKind, f: impl FnOnce(&mut Self) -> T) -> T {
        self.scopes.push_scope(kind);
        let result = f(self);
        let diagnostics = self.scopes.pop_scope(self.cursor.lexer().interner());
        for diag in diagnostics {
            self.diagnostics.push(diag);
        }
        result
    }
}

#[cfg(test)]
mod tests;
