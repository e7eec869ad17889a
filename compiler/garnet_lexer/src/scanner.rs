//! The scanner: lexer state machine and operator disambiguation.
//!
//! [`Lexer::next_token`] produces one token per call. What a character
//! means depends on the lexer state left by the previous token, on
//! whether whitespace preceded it and on the character that follows;
//! the parser steers the state further through the public setters.

use garnet_diagnostic::{Diagnostic, ErrorCode};
use garnet_ir::{Span, StringInterner, Token, TokenKind, TokenValue};
use garnet_stack::NestingGuard;

use crate::cursor::Cursor;
use crate::lex_error::{LexError, LexErrorKind};
use crate::literal::{StrFunc, StrTerm};
use crate::magic::{CommentPosition, MagicSettings};
use crate::source::LineSource;
use crate::state::{BitStack, LexState};
use crate::LocalLookup;

/// Operator method names usable as `:op` symbols, longest first.
const OPERATOR_SYMBOLS: &[&str] = &[
    "[]=", "<=>", "===", "[]", "==", "=~", "!=", "!~", "**", "+@", "-@", "~@", "!@", "<<", ">>",
    "<=", ">=", "+", "-", "*", "/", "%", "^", "&", "|", "~", "!", "<", ">", "`",
];

#[inline]
pub(crate) fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || !b.is_ascii()
}

#[inline]
pub(crate) fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// Saved literal state while an interpolation is parsed.
#[derive(Debug)]
struct Suspended {
    strterm: Option<StrTerm>,
    state: LexState,
    cond: BitStack,
    cmdarg: BitStack,
    brace_nest: i32,
}

/// Everything the scanner leaves behind once the parse is over.
#[derive(Debug)]
pub struct LexerOutput {
    pub source: Vec<u8>,
    pub lines: garnet_diagnostic::span_utils::LineOffsetTable,
    pub interner: StringInterner,
    pub magic: MagicSettings,
    /// Offset just past the `__END__` line, if present.
    pub data_offset: Option<usize>,
}

/// Stateful scanner over a line source.
pub struct Lexer<'src> {
    pub(crate) cursor: Cursor<'src>,
    pub(crate) interner: StringInterner,
    pub(crate) state: LexState,
    pub(crate) last_state: LexState,
    pub(crate) cond: BitStack,
    pub(crate) cmdarg: BitStack,
    pub(crate) paren_nest: i32,
    pub(crate) lpar_beg: i32,
    pub(crate) brace_nest: i32,
    pub(crate) command_start: bool,
    pub(crate) in_kwarg: bool,
    pub(crate) in_argdef: bool,
    pub(crate) space_seen: bool,
    token_seen: bool,
    pub(crate) strterm: Option<StrTerm>,
    suspended: Vec<Suspended>,
    nesting: NestingGuard,
    pub(crate) diagnostics: Vec<Diagnostic>,
    magic: MagicSettings,
    data_offset: Option<usize>,
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: impl LineSource + 'src) -> Self {
        Self::with_max_nesting(source, garnet_stack::DEFAULT_MAX_NESTING)
    }

    pub fn with_max_nesting(source: impl LineSource + 'src, max_nesting: u32) -> Self {
        Lexer {
            cursor: Cursor::new(source),
            interner: StringInterner::new(),
            state: LexState::BEG,
            last_state: LexState::BEG,
            cond: BitStack::default(),
            cmdarg: BitStack::default(),
            paren_nest: 0,
            lpar_beg: -1,
            brace_nest: 0,
            command_start: true,
            in_kwarg: false,
            in_argdef: false,
            space_seen: false,
            token_seen: false,
            strterm: None,
            suspended: Vec::new(),
            nesting: NestingGuard::new(max_nesting),
            diagnostics: Vec::new(),
            magic: MagicSettings::default(),
            data_offset: None,
            finished: false,
        }
    }

    /// Produce the next token.
    ///
    /// `locals` answers whether a bare identifier names a local variable
    /// in the scope the parser is currently in.
    pub fn next_token(&mut self, locals: &dyn LocalLookup) -> Result<Token, LexError> {
        let result = match self.strterm.take() {
            Some(StrTerm::Literal(term)) => self.string_token(term),
            Some(StrTerm::Heredoc(term)) => self.heredoc_token(term),
            None => self.scan(locals),
        };
        if let Some(err) = self.cursor.take_error() {
            return Err(LexError::new(
                LexErrorKind::Io(err.to_string()),
                Span::from_offsets(self.cursor.pos(), self.cursor.pos()),
            ));
        }
        let token = result?;
        if token.kind != TokenKind::Newline {
            self.token_seen = true;
        }
        tracing::trace!(?token, state = ?self.state, "token");
        Ok(token)
    }

    // Parser feedback

    pub fn state(&self) -> LexState {
        self.state
    }

    pub fn set_state(&mut self, state: LexState) {
        self.state = state;
    }

    pub fn cond_push(&mut self, bit: bool) {
        self.cond.push(bit);
    }

    pub fn cond_pop(&mut self) {
        self.cond.pop();
    }

    pub fn cmdarg_push(&mut self, bit: bool) {
        self.cmdarg.push(bit);
    }

    pub fn cmdarg_pop(&mut self) {
        self.cmdarg.pop();
    }

    /// Start a lambda: `{` or `do` at the current paren depth opens its
    /// body. Returns the previous marker for [`end_lambda`](Self::end_lambda).
    pub fn begin_lambda(&mut self) -> i32 {
        std::mem::replace(&mut self.lpar_beg, self.paren_nest)
    }

    pub fn end_lambda(&mut self, saved: i32) {
        self.lpar_beg = saved;
    }

    pub fn set_in_kwarg(&mut self, value: bool) -> bool {
        std::mem::replace(&mut self.in_kwarg, value)
    }

    pub fn set_in_argdef(&mut self, value: bool) -> bool {
        std::mem::replace(&mut self.in_argdef, value)
    }

    pub fn set_command_start(&mut self, value: bool) {
        self.command_start = value;
    }

    /// Leave the current literal to scan an interpolated expression.
    ///
    /// Called while `StringDBeg` or `StringDVar` is the parser's current
    /// token; [`resume_literal`](Self::resume_literal) undoes it.
    pub fn suspend_literal(&mut self) -> Result<(), LexError> {
        if let Err(err) = self.nesting.enter() {
            return Err(LexError::new(
                LexErrorKind::NestingTooDeep { limit: err.limit },
                Span::from_offsets(self.cursor.pos(), self.cursor.pos()),
            ));
        }
        self.suspended.push(Suspended {
            strterm: self.strterm.take(),
            state: self.state,
            cond: self.cond,
            cmdarg: self.cmdarg,
            brace_nest: self.brace_nest,
        });
        self.state = LexState::BEG;
        self.cond.push(false);
        self.cmdarg.push(false);
        self.brace_nest = 0;
        tracing::trace!(depth = self.suspended.len(), "literal suspended");
        Ok(())
    }

    pub fn resume_literal(&mut self) {
        if let Some(saved) = self.suspended.pop() {
            self.nesting.exit();
            self.strterm = saved.strterm;
            self.state = saved.state;
            self.cond = saved.cond;
            self.cmdarg = saved.cmdarg;
            self.brace_nest = saved.brace_nest;
            tracing::trace!(depth = self.suspended.len(), "literal resumed");
        }
    }

    /// Warnings and non-fatal errors collected since the last call.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn magic(&self) -> &MagicSettings {
        &self.magic
    }

    /// Session defaults, set before the first token; magic comments
    /// override them as they are scanned.
    pub fn magic_mut(&mut self) -> &mut MagicSettings {
        &mut self.magic
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn interner_mut(&mut self) -> &mut StringInterner {
        &mut self.interner
    }

    /// 1-based line of a byte offset.
    pub fn line_of(&self, offset: u32) -> u32 {
        self.cursor.line_of(offset as usize)
    }

    /// Source bytes seen so far.
    pub fn source(&self) -> &[u8] {
        self.cursor.buffer()
    }

    pub fn data_offset(&self) -> Option<usize> {
        self.data_offset
    }

    pub fn into_output(self) -> LexerOutput {
        let (source, lines) = self.cursor.into_parts();
        LexerOutput {
            source,
            lines,
            interner: self.interner,
            magic: self.magic,
            data_offset: self.data_offset,
        }
    }

    // Helpers shared by the sub-scanners

    pub(crate) fn token(&self, kind: TokenKind, value: TokenValue, start: usize) -> Token {
        Token {
            kind,
            value,
            span: self.cursor.span_from(start),
            space_before: self.space_seen,
        }
    }

    pub(crate) fn warn(&mut self, span: Span, message: impl Into<String>) {
        self.diagnostics.push(
            Diagnostic::warning(ErrorCode::W0001)
                .with_message(message)
                .with_label(span, ""),
        );
    }

    #[inline]
    pub(crate) fn is_arg(&self) -> bool {
        self.state.any(LexState::ARG_ANY)
    }

    #[inline]
    pub(crate) fn is_end(&self) -> bool {
        self.state.any(LexState::END_ANY)
    }

    #[inline]
    pub(crate) fn is_beg(&self) -> bool {
        self.state.any(LexState::BEG_ANY) || self.state.has_all(LexState::ARG | LexState::LABELED)
    }

    /// An argument starts here: `foo -x`, `foo *a`.
    #[inline]
    pub(crate) fn is_spcarg(&self, next: Option<u8>) -> bool {
        self.is_arg() && self.space_seen && !next.is_some_and(is_space)
    }

    #[inline]
    pub(crate) fn is_label_possible(&self, cmd_state: bool) -> bool {
        (self.state.any(LexState::LABEL | LexState::ENDFN) && !cmd_state) || self.is_arg()
    }

    #[inline]
    pub(crate) fn is_after_operator(&self) -> bool {
        self.state.any(LexState::FNAME | LexState::DOT)
    }

    #[inline]
    pub(crate) fn lambda_beginning(&self) -> bool {
        self.lpar_beg == self.paren_nest
    }

    fn after_operator_state(&self) -> LexState {
        if self.is_after_operator() {
            LexState::ARG
        } else {
            LexState::BEG
        }
    }

    fn arg_ambiguous(&mut self, op: char, start: usize) {
        self.warn(
            Span::from_offsets(start, start + 1),
            format!("ambiguous first argument; put parentheses or a space even after `{op}' operator"),
        );
    }

    /// Binary operator where the spacing suggests something else.
    fn warn_balanced(&mut self, kind: TokenKind, op: &str, syn: &str, start: usize) -> TokenKind {
        let next = self.cursor.peek();
        if !self
            .last_state
            .any(LexState::CLASS | LexState::DOT | LexState::FNAME | LexState::ENDFN)
            && self.space_seen
            && !next.is_some_and(is_space)
        {
            self.warn(
                Span::from_offsets(start, self.cursor.pos()),
                format!(
                    "`{op}' after local variable or literal is interpreted as binary operator even though it seems like {syn}"
                ),
            );
        }
        kind
    }

    fn op_assign(&mut self, op: &str, start: usize) -> Token {
        self.state = LexState::BEG;
        let name = self.interner.intern(op);
        self.token(TokenKind::OpAssign, TokenValue::OpAssign(name), start)
    }

    pub(crate) fn simple(&self, kind: TokenKind, start: usize) -> Token {
        self.token(kind, TokenValue::None, start)
    }

    fn eof_token(&mut self, start: usize) -> Token {
        self.finished = true;
        self.cursor.set_pos(start);
        Token::simple(TokenKind::Eof, Span::from_offsets(start, start))
    }

    fn at_line_start(&self, offset: usize) -> bool {
        self.cursor.line_start(offset) == offset
    }

    // Main dispatch

    fn scan(&mut self, locals: &dyn LocalLookup) -> Result<Token, LexError> {
        if self.finished {
            let end = self.cursor.pos();
            return Ok(Token::simple(TokenKind::Eof, Span::from_offsets(end, end)));
        }
        let cmd_state = std::mem::take(&mut self.command_start);
        self.space_seen = false;
        loop {
            self.last_state = self.state;
            let start = self.cursor.pos();
            let Some(c) = self.cursor.bump() else {
                return Ok(self.eof_token(start));
            };
            let token = match c {
                0 | 0x04 | 0x1a => return Ok(self.eof_token(start)),
                b' ' | b'\t' | 0x0b | 0x0c | b'\r' => {
                    self.space_seen = true;
                    continue;
                }
                b'#' => {
                    self.comment(start);
                    continue;
                }
                b'\n' => match self.newline(start) {
                    Some(token) => token,
                    None => continue,
                },
                b'*' => self.star(start),
                b'!' => self.bang(start),
                b'=' => {
                    if self.at_line_start(start) && self.cursor.looking_at(b"begin") {
                        let after = self.cursor.peek_at(5);
                        if after.is_none() || after.is_some_and(is_space) {
                            self.embedded_document(start)?;
                            continue;
                        }
                    }
                    self.equals(start)
                }
                b'<' => self.less(start)?,
                b'>' => self.greater(start),
                b'"' => {
                    let label = if self.is_label_possible(cmd_state) {
                        StrFunc::LABEL
                    } else {
                        StrFunc::empty()
                    };
                    self.open_literal(
                        TokenKind::StringBeg,
                        StrFunc::DQUOTE | label,
                        b'"',
                        None,
                        start,
                    )
                }
                b'\'' => {
                    let label = if self.is_label_possible(cmd_state) {
                        StrFunc::LABEL
                    } else {
                        StrFunc::empty()
                    };
                    self.open_literal(
                        TokenKind::StringBeg,
                        StrFunc::SQUOTE | label,
                        b'\'',
                        None,
                        start,
                    )
                }
                b'`' => self.backtick(start, cmd_state),
                b'?' => self.question(start)?,
                b'&' => self.ampersand(start),
                b'|' => self.pipe(start),
                b'+' => self.plus(start)?,
                b'-' => self.minus(start),
                b'.' => self.dot(start)?,
                b'0'..=b'9' => {
                    self.cursor.set_pos(start);
                    self.scan_number(start)?
                }
                b')' => {
                    self.cond.pop();
                    self.cmdarg.pop();
                    self.state = LexState::ENDFN;
                    self.paren_nest -= 1;
                    self.simple(TokenKind::RParen, start)
                }
                b']' => {
                    self.cond.pop();
                    self.cmdarg.pop();
                    self.state = LexState::END;
                    self.paren_nest -= 1;
                    self.simple(TokenKind::RBracket, start)
                }
                b'}' => {
                    if self.brace_nest == 0 && !self.suspended.is_empty() {
                        self.state = LexState::END;
                        self.simple(TokenKind::StringDEnd, start)
                    } else {
                        self.brace_nest -= 1;
                        self.cond.pop();
                        self.cmdarg.pop();
                        self.state = LexState::END;
                        self.paren_nest -= 1;
                        self.simple(TokenKind::RBrace, start)
                    }
                }
                b':' => self.colon(start, locals)?,
                b'/' => self.slash(start),
                b'^' => {
                    if self.cursor.eat(b'=') {
                        self.op_assign("^", start)
                    } else {
                        self.state = self.after_operator_state();
                        self.simple(TokenKind::Caret, start)
                    }
                }
                b';' => {
                    self.state = LexState::BEG;
                    self.command_start = true;
                    self.simple(TokenKind::Semi, start)
                }
                b',' => {
                    self.state = LexState::BEG | LexState::LABEL;
                    self.simple(TokenKind::Comma, start)
                }
                b'~' => {
                    if self.is_after_operator() {
                        self.cursor.eat(b'@');
                        self.state = LexState::ARG;
                    } else {
                        self.state = LexState::BEG;
                    }
                    self.simple(TokenKind::Tilde, start)
                }
                b'(' => self.lparen(start),
                b'[' => self.lbracket(start),
                b'{' => self.lbrace(start),
                b'\\' => {
                    if self.cursor.looking_at(b"\r\n") {
                        self.cursor.bump();
                    }
                    if self.cursor.eat(b'\n') {
                        self.space_seen = true;
                        continue;
                    }
                    return Err(LexError::new(
                        LexErrorKind::InvalidCharacter("\\".into()),
                        Span::from_offsets(start, start + 1),
                    ));
                }
                b'%' => self.percent(start)?,
                b'$' => self.global_variable(start)?,
                b'@' => self.instance_variable(start)?,
                b'_' if self.at_line_start(start) && self.end_marker(start) => {
                    return Ok(self.eof_token(start));
                }
                c if is_ident_char(c) => {
                    self.cursor.set_pos(start);
                    self.identifier(start, cmd_state, locals)?
                }
                other => {
                    return Err(LexError::new(
                        LexErrorKind::InvalidCharacter(format!("\\x{other:02X}")),
                        Span::from_offsets(start, start + 1),
                    ));
                }
            };
            return Ok(token);
        }
    }

    /// Skip a comment, applying magic comments.
    fn comment(&mut self, start: usize) {
        let line_start = self.cursor.line_start(start);
        let end = self.cursor.line_end(start);
        let line = self.cursor.line_of(start);
        let at_top = line == 1
            || (line == 2 && self.cursor.slice(0, 2) == b"#!");
        let comment_only = self
            .cursor
            .slice(line_start, start)
            .iter()
            .all(|&b| b == b' ' || b == b'\t');
        let position = CommentPosition {
            at_top,
            comment_only,
            token_seen: self.token_seen,
        };
        let text = self.cursor.slice(start + 1, end).to_vec();
        let span = Span::from_offsets(start, end);
        let diagnostics = self.magic.apply_comment(&text, position, span);
        self.diagnostics.extend(diagnostics);
        self.cursor.set_pos(end);
    }

    /// `=begin` ... `=end` at line starts.
    fn embedded_document(&mut self, start: usize) -> Result<(), LexError> {
        loop {
            self.cursor.skip_to_line_end();
            if !self.cursor.eat(b'\n') {
                return Err(LexError::new(
                    LexErrorKind::UnterminatedEmbdoc,
                    Span::from_offsets(start, start + 6),
                ));
            }
            if self.cursor.looking_at(b"=end") {
                let after = self.cursor.peek_at(4);
                if after.is_none() || after.is_some_and(is_space) {
                    self.cursor.skip_to_line_end();
                    return Ok(());
                }
            }
        }
    }

    /// `__END__` alone on its line stops the scan.
    fn end_marker(&mut self, start: usize) -> bool {
        self.cursor.set_pos(start);
        if !self.cursor.looking_at(b"__END__") {
            self.cursor.set_pos(start + 1);
            return false;
        }
        let after = start + 7;
        let eol = match self.cursor.byte_at(after) {
            None => after,
            Some(b'\n') => after + 1,
            Some(b'\r') if self.cursor.byte_at(after + 1) == Some(b'\n') => after + 2,
            _ => {
                self.cursor.set_pos(start + 1);
                return false;
            }
        };
        tracing::debug!(offset = eol, "__END__ reached");
        self.data_offset = Some(eol);
        true
    }

    /// A newline is a token unless the expression obviously continues.
    fn newline(&mut self, start: usize) -> Option<Token> {
        let beg_like = self
            .state
            .any(LexState::BEG | LexState::CLASS | LexState::FNAME | LexState::DOT)
            && !self.state.any(LexState::LABELED);
        if beg_like || self.state.has_all(LexState::ARG | LexState::LABELED) {
            if beg_like || !self.in_kwarg {
                return None;
            }
        } else if self.continues_on_next_line() {
            return None;
        }
        self.command_start = true;
        self.state = LexState::BEG;
        Some(Token::simple(
            TokenKind::Newline,
            Span::from_offsets(start, start + 1),
        ))
    }

    /// Leading `.meth`, `&.meth` or a comment line continue the expression.
    fn continues_on_next_line(&mut self) -> bool {
        let save = self.cursor.pos();
        loop {
            match self.cursor.peek() {
                Some(b' ' | b'\t' | 0x0b | 0x0c | b'\r') => {
                    self.cursor.bump();
                }
                Some(b'#') => return true,
                Some(b'&') if self.cursor.peek_at(1) == Some(b'.') => return true,
                Some(b'.') if self.cursor.peek_at(1) != Some(b'.') => return true,
                _ => {
                    self.cursor.set_pos(save);
                    return false;
                }
            }
        }
    }

    fn star(&mut self, start: usize) -> Token {
        let kind = if self.cursor.eat(b'*') {
            if self.cursor.eat(b'=') {
                return self.op_assign("**", start);
            }
            let next = self.cursor.peek();
            if self.is_spcarg(next) {
                self.warn(
                    Span::from_offsets(start, start + 2),
                    "`**' interpreted as argument prefix",
                );
                TokenKind::DSplat
            } else if self.is_beg() {
                TokenKind::DSplat
            } else {
                self.warn_balanced(TokenKind::Pow, "**", "argument prefix", start)
            }
        } else {
            if self.cursor.eat(b'=') {
                return self.op_assign("*", start);
            }
            let next = self.cursor.peek();
            if self.is_spcarg(next) {
                self.warn(
                    Span::from_offsets(start, start + 1),
                    "`*' interpreted as argument prefix",
                );
                TokenKind::Splat
            } else if self.is_beg() {
                TokenKind::Splat
            } else {
                self.warn_balanced(TokenKind::Star, "*", "argument prefix", start)
            }
        };
        self.state = self.after_operator_state();
        self.simple(kind, start)
    }

    fn bang(&mut self, start: usize) -> Token {
        if self.is_after_operator() {
            self.state = LexState::ARG;
            if self.cursor.eat(b'@') {
                return self.simple(TokenKind::Bang, start);
            }
        } else {
            self.state = LexState::BEG;
        }
        if self.cursor.eat(b'=') {
            return self.simple(TokenKind::Neq, start);
        }
        if self.cursor.eat(b'~') {
            return self.simple(TokenKind::NMatch, start);
        }
        self.simple(TokenKind::Bang, start)
    }

    fn equals(&mut self, start: usize) -> Token {
        self.state = self.after_operator_state();
        let kind = if self.cursor.eat(b'=') {
            if self.cursor.eat(b'=') {
                TokenKind::Eqq
            } else {
                TokenKind::Eq
            }
        } else if self.cursor.eat(b'~') {
            TokenKind::Match
        } else if self.cursor.eat(b'>') {
            TokenKind::Assoc
        } else {
            TokenKind::Assign
        };
        self.simple(kind, start)
    }

    fn less(&mut self, start: usize) -> Result<Token, LexError> {
        if self.cursor.peek() == Some(b'<')
            && !self.state.any(LexState::DOT | LexState::CLASS)
            && !self.is_end()
            && (!self.is_arg() || self.state.any(LexState::LABELED) || self.space_seen)
        {
            self.cursor.bump();
            if let Some(token) = self.heredoc_identifier(start)? {
                return Ok(token);
            }
            self.cursor.set_pos(start + 1);
        }
        if self.is_after_operator() {
            self.state = LexState::ARG;
        } else {
            if self.state.any(LexState::CLASS) {
                self.command_start = true;
            }
            self.state = LexState::BEG;
        }
        if self.cursor.eat(b'=') {
            if self.cursor.eat(b'>') {
                return Ok(self.simple(TokenKind::Cmp, start));
            }
            return Ok(self.simple(TokenKind::Le, start));
        }
        if self.cursor.eat(b'<') {
            if self.cursor.eat(b'=') {
                return Ok(self.op_assign("<<", start));
            }
            let kind = self.warn_balanced(TokenKind::LShift, "<<", "here document", start);
            return Ok(self.simple(kind, start));
        }
        Ok(self.simple(TokenKind::Lt, start))
    }

    fn greater(&mut self, start: usize) -> Token {
        self.state = self.after_operator_state();
        if self.cursor.eat(b'=') {
            return self.simple(TokenKind::Ge, start);
        }
        if self.cursor.eat(b'>') {
            if self.cursor.eat(b'=') {
                return self.op_assign(">>", start);
            }
            return self.simple(TokenKind::RShift, start);
        }
        self.simple(TokenKind::Gt, start)
    }

    fn backtick(&mut self, start: usize, cmd_state: bool) -> Token {
        if self.state.any(LexState::FNAME) {
            self.state = LexState::ENDFN;
            let name = self.interner.intern("`");
            return self.token(TokenKind::Ident, TokenValue::Name(name), start);
        }
        if self.state.any(LexState::DOT) {
            self.state = if cmd_state {
                LexState::CMDARG
            } else {
                LexState::ARG
            };
            let name = self.interner.intern("`");
            return self.token(TokenKind::Ident, TokenValue::Name(name), start);
        }
        self.open_literal(TokenKind::XStringBeg, StrFunc::XQUOTE, b'`', None, start)
    }

    /// `?` is either the ternary operator or a character literal.
    fn question(&mut self, start: usize) -> Result<Token, LexError> {
        if self.is_end() {
            self.state = LexState::BEG;
            return Ok(self.simple(TokenKind::Question, start));
        }
        let Some(c) = self.cursor.peek() else {
            return Err(LexError::new(
                LexErrorKind::IncompleteCharSyntax,
                Span::from_offsets(start, start + 1),
            ));
        };
        if is_space(c) {
            if !self.is_arg() {
                let name = match c {
                    b' ' => Some('s'),
                    b'\n' => Some('n'),
                    b'\t' => Some('t'),
                    0x0b => Some('v'),
                    b'\r' => Some('r'),
                    0x0c => Some('f'),
                    _ => None,
                };
                if let Some(name) = name {
                    self.warn(
                        Span::from_offsets(start, start + 2),
                        format!("invalid character syntax; use ?\\{name}"),
                    );
                }
            }
            self.state = LexState::BEG;
            return Ok(self.simple(TokenKind::Question, start));
        }
        if (c.is_ascii_alphanumeric() || c == b'_')
            && self.cursor.peek_at(1).is_some_and(is_ident_char)
        {
            self.state = LexState::BEG;
            return Ok(self.simple(TokenKind::Question, start));
        }
        let mut value = Vec::new();
        if c == b'\\' {
            self.cursor.bump();
            match self.cursor.peek() {
                Some(b'u') => {
                    self.cursor.bump();
                    self.read_unicode_escape(&mut value, false)?;
                }
                Some(b) if !b.is_ascii() => self.read_mbchar(&mut value)?,
                _ => {
                    let byte = self.read_escape(crate::escape::EscapeFlags::default())?;
                    value.push(byte);
                }
            }
        } else if !c.is_ascii() {
            self.read_mbchar(&mut value)?;
        } else {
            self.cursor.bump();
            value.push(c);
        }
        self.state = LexState::END;
        Ok(self.token(TokenKind::Char, TokenValue::Str(value), start))
    }

    fn ampersand(&mut self, start: usize) -> Token {
        if self.cursor.eat(b'&') {
            self.state = LexState::BEG;
            if self.cursor.eat(b'=') {
                return self.op_assign("&&", start);
            }
            return self.simple(TokenKind::AndOp, start);
        }
        if self.cursor.eat(b'=') {
            return self.op_assign("&", start);
        }
        if self.cursor.eat(b'.') {
            self.state = LexState::DOT;
            return self.simple(TokenKind::AndDot, start);
        }
        let next = self.cursor.peek();
        let kind = if self.is_spcarg(next) {
            let symbol_follows = next == Some(b':')
                && self
                    .cursor
                    .peek_at(1)
                    .is_some_and(|b| b == b'\'' || b == b'"' || is_ident_char(b));
            if !symbol_follows {
                self.warn(
                    Span::from_offsets(start, start + 1),
                    "`&' interpreted as argument prefix",
                );
            }
            TokenKind::BlockAmper
        } else if self.is_beg() {
            TokenKind::BlockAmper
        } else {
            self.warn_balanced(TokenKind::Amper, "&", "argument prefix", start)
        };
        self.state = self.after_operator_state();
        self.simple(kind, start)
    }

    fn pipe(&mut self, start: usize) -> Token {
        if self.cursor.peek() == Some(b'|') {
            if self.last_state.any(LexState::BEG) && self.cursor.peek_at(1) != Some(b'=') {
                // `{||}`: two separate bars around an empty parameter list.
                self.state = LexState::BEG;
                return self.simple(TokenKind::Pipe, start);
            }
            self.cursor.bump();
            self.state = LexState::BEG;
            if self.cursor.eat(b'=') {
                return self.op_assign("||", start);
            }
            return self.simple(TokenKind::OrOp, start);
        }
        if self.cursor.eat(b'=') {
            return self.op_assign("|", start);
        }
        self.state = if self.is_after_operator() {
            LexState::ARG
        } else {
            LexState::BEG | LexState::LABEL
        };
        self.simple(TokenKind::Pipe, start)
    }

    fn plus(&mut self, start: usize) -> Result<Token, LexError> {
        let next = self.cursor.peek();
        if self.is_after_operator() {
            self.state = LexState::ARG;
            if self.cursor.eat(b'@') {
                return Ok(self.simple(TokenKind::UPlus, start));
            }
            return Ok(self.simple(TokenKind::Plus, start));
        }
        if self.cursor.eat(b'=') {
            return Ok(self.op_assign("+", start));
        }
        let spcarg = !self.is_beg() && self.is_spcarg(next);
        if spcarg {
            self.arg_ambiguous('+', start);
        }
        if self.is_beg() || spcarg {
            self.state = LexState::BEG;
            if next.is_some_and(|b| b.is_ascii_digit()) {
                return self.scan_number(start);
            }
            return Ok(self.simple(TokenKind::UPlus, start));
        }
        self.state = LexState::BEG;
        let kind = self.warn_balanced(TokenKind::Plus, "+", "unary operator", start);
        Ok(self.simple(kind, start))
    }

    fn minus(&mut self, start: usize) -> Token {
        let next = self.cursor.peek();
        if self.is_after_operator() {
            self.state = LexState::ARG;
            if self.cursor.eat(b'@') {
                return self.simple(TokenKind::UMinus, start);
            }
            return self.simple(TokenKind::Minus, start);
        }
        if self.cursor.eat(b'=') {
            return self.op_assign("-", start);
        }
        if self.cursor.eat(b'>') {
            self.state = LexState::ENDFN;
            return self.simple(TokenKind::Arrow, start);
        }
        let spcarg = !self.is_beg() && self.is_spcarg(next);
        if spcarg {
            self.arg_ambiguous('-', start);
        }
        if self.is_beg() || spcarg {
            self.state = LexState::BEG;
            if next.is_some_and(|b| b.is_ascii_digit()) {
                return self.simple(TokenKind::UMinusNum, start);
            }
            return self.simple(TokenKind::UMinus, start);
        }
        self.state = LexState::BEG;
        let kind = self.warn_balanced(TokenKind::Minus, "-", "unary operator", start);
        self.simple(kind, start)
    }

    fn dot(&mut self, start: usize) -> Result<Token, LexError> {
        let is_beg = self.is_beg();
        self.state = LexState::BEG;
        if self.cursor.eat(b'.') {
            if self.cursor.eat(b'.') {
                if self.in_argdef {
                    self.state = LexState::ENDARG;
                    return Ok(self.simple(TokenKind::BDot3, start));
                }
                if self.paren_nest == 0 && self.looking_at_eol() {
                    self.diagnostics.push(
                        Diagnostic::warning(ErrorCode::W0001)
                            .with_message("... at EOL, should be parenthesized?")
                            .with_label(Span::from_offsets(start, start + 3), ""),
                    );
                }
                let kind = if is_beg { TokenKind::BDot3 } else { TokenKind::Dot3 };
                return Ok(self.simple(kind, start));
            }
            let kind = if is_beg { TokenKind::BDot2 } else { TokenKind::Dot2 };
            return Ok(self.simple(kind, start));
        }
        if self.cursor.peek().is_some_and(|b| b.is_ascii_digit()) {
            return Err(LexError::new(
                LexErrorKind::InvalidNumber("no .<digit> floating literal anymore; put 0 before dot"),
                Span::from_offsets(start, start + 2),
            ));
        }
        self.state = LexState::DOT;
        Ok(self.simple(TokenKind::Dot, start))
    }

    fn looking_at_eol(&mut self) -> bool {
        let mut i = 0;
        loop {
            match self.cursor.peek_at(i) {
                Some(b' ' | b'\t' | 0x0c | b'\r' | 0x0b) => i += 1,
                None | Some(b'\n' | b'#') => return true,
                Some(_) => return false,
            }
        }
    }

    fn colon(&mut self, start: usize, locals: &dyn LocalLookup) -> Result<Token, LexError> {
        if self.cursor.eat(b':') {
            if self.is_beg() || self.state.any(LexState::CLASS) || self.is_spcarg(None) {
                self.state = LexState::BEG;
                return Ok(self.simple(TokenKind::Colon3, start));
            }
            self.state = LexState::DOT;
            return Ok(self.simple(TokenKind::Colon2, start));
        }
        let next = self.cursor.peek();
        if self.is_end() || next.is_none() || next.is_some_and(is_space) || next == Some(b'#') {
            let kind = self.warn_balanced(TokenKind::Colon, ":", "symbol literal", start);
            self.state = LexState::BEG;
            return Ok(self.simple(kind, start));
        }
        match next {
            Some(b'"') => {
                self.cursor.bump();
                self.state = LexState::FNAME;
                Ok(self.open_literal(TokenKind::SymBeg, StrFunc::DSYM, b'"', None, start))
            }
            Some(b'\'') => {
                self.cursor.bump();
                self.state = LexState::FNAME;
                Ok(self.open_literal(TokenKind::SymBeg, StrFunc::SSYM, b'\'', None, start))
            }
            _ => self.symbol(start, locals),
        }
    }

    /// `:name`, `:@ivar`, `:$gvar`, `:+` and friends as one token.
    fn symbol(&mut self, start: usize, locals: &dyn LocalLookup) -> Result<Token, LexError> {
        let body_start = self.cursor.pos();
        if let Some(&op) = OPERATOR_SYMBOLS
            .iter()
            .find(|op| self.cursor.looking_at(op.as_bytes()))
        {
            self.cursor.set_pos(body_start + op.len());
            let text = op.strip_suffix('@').filter(|t| *t == "~" || *t == "!").unwrap_or(op);
            let name = self.interner.intern(text);
            self.state = LexState::END;
            return Ok(self.token(TokenKind::Symbol, TokenValue::Name(name), start));
        }
        let next = self.cursor.peek();
        let variable_or_name = next.is_some_and(|b| {
            b == b'@' || b == b'$' || (is_ident_char(b) && !b.is_ascii_digit())
        });
        if !variable_or_name {
            self.state = LexState::BEG;
            return Ok(self.simple(TokenKind::Colon, start));
        }
        self.state = LexState::FNAME;
        let saved_space = self.space_seen;
        self.space_seen = false;
        let inner = self.scan(locals)?;
        self.space_seen = saved_space;
        let Some(name) = inner.name() else {
            self.cursor.set_pos(body_start);
            self.state = LexState::BEG;
            return Ok(self.simple(TokenKind::Colon, start));
        };
        self.state = LexState::END;
        Ok(self.token(TokenKind::Symbol, TokenValue::Name(name), start))
    }

    fn slash(&mut self, start: usize) -> Token {
        if self.is_beg() {
            return self.open_literal(TokenKind::RegexpBeg, StrFunc::REGEXP_LIT, b'/', None, start);
        }
        if self.cursor.eat(b'=') {
            return self.op_assign("/", start);
        }
        let next = self.cursor.peek();
        if self.is_spcarg(next) {
            self.arg_ambiguous('/', start);
            return self.open_literal(TokenKind::RegexpBeg, StrFunc::REGEXP_LIT, b'/', None, start);
        }
        self.state = self.after_operator_state();
        let kind = self.warn_balanced(TokenKind::Slash, "/", "regexp literal", start);
        self.simple(kind, start)
    }

    fn lparen(&mut self, start: usize) -> Token {
        let kind = if self.is_beg() {
            TokenKind::LParen
        } else if !self.space_seen {
            TokenKind::LParenCall
        } else if self.is_arg() || self.state.has_all(LexState::END | LexState::LABEL) {
            TokenKind::LParenArg
        } else {
            if self.state.any(LexState::ENDFN) && !self.lambda_beginning() {
                self.warn(
                    Span::from_offsets(start, start + 1),
                    "parentheses after method name is interpreted as an argument list, not a decomposed argument",
                );
            }
            TokenKind::LParenCall
        };
        self.paren_nest += 1;
        self.cond.push(false);
        self.cmdarg.push(false);
        self.state = LexState::BEG | LexState::LABEL;
        self.simple(kind, start)
    }

    fn lbracket(&mut self, start: usize) -> Token {
        self.paren_nest += 1;
        if self.is_after_operator() {
            if self.cursor.eat(b']') {
                self.paren_nest -= 1;
                self.state = LexState::ARG;
                if self.cursor.eat(b'=') {
                    return self.simple(TokenKind::Aset, start);
                }
                return self.simple(TokenKind::Aref, start);
            }
            self.state = LexState::ARG | LexState::LABEL;
            return self.simple(TokenKind::LBracketIndex, start);
        }
        let kind = if self.is_beg()
            || (self.is_arg() && (self.space_seen || self.state.any(LexState::LABELED)))
        {
            TokenKind::LBracket
        } else {
            TokenKind::LBracketIndex
        };
        self.state = LexState::BEG | LexState::LABEL;
        self.cond.push(false);
        self.cmdarg.push(false);
        self.simple(kind, start)
    }

    fn lbrace(&mut self, start: usize) -> Token {
        self.brace_nest += 1;
        let kind = if self.lambda_beginning() {
            TokenKind::LambdaBeg
        } else if self.state.any(LexState::LABELED) {
            TokenKind::LBrace
        } else if self
            .state
            .any(LexState::ARG_ANY | LexState::END | LexState::ENDFN)
        {
            TokenKind::LBraceBlock
        } else if self.state.any(LexState::ENDARG) {
            TokenKind::LBraceArg
        } else {
            TokenKind::LBrace
        };
        if kind == TokenKind::LBrace {
            self.state = LexState::BEG | LexState::LABEL;
        } else {
            self.command_start = true;
            self.state = LexState::BEG;
        }
        self.paren_nest += 1;
        self.cond.push(false);
        self.cmdarg.push(false);
        self.simple(kind, start)
    }

    fn percent(&mut self, start: usize) -> Result<Token, LexError> {
        if self.is_beg() {
            return self.percent_literal(start);
        }
        if self.cursor.eat(b'=') {
            return Ok(self.op_assign("%", start));
        }
        let next = self.cursor.peek();
        if self.is_spcarg(next) || (self.state.any(LexState::FITEM) && next == Some(b's')) {
            return self.percent_literal(start);
        }
        self.state = self.after_operator_state();
        let kind = self.warn_balanced(TokenKind::Percent, "%", "string literal", start);
        Ok(self.simple(kind, start))
    }
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("cursor", &self.cursor)
            .field("state", &self.state)
            .field("paren_nest", &self.paren_nest)
            .field("brace_nest", &self.brace_nest)
            .field("suspended", &self.suspended.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
