//! The literal engine: strings, symbols, regexps, backticks and word lists.
//!
//! While a literal is open the scanner holds a [`StrTerm`] and every call
//! to `next_token` produces the next fragment: `StringContent` for text,
//! `StringDBeg`/`StringDVar` for interpolation, `WordSep` between list
//! elements and finally `StringEnd`, `LabelEnd` or `RegexpEnd`.

use bitflags::bitflags;
use garnet_diagnostic::{Diagnostic, ErrorCode};
use garnet_ir::{RegexOptions, Span, Token, TokenKind, TokenValue};

use crate::escape::EscapeFlags;
use crate::heredoc::HeredocTerm;
use crate::lex_error::{LexError, LexErrorKind, LiteralKind};
use crate::scanner::{is_space, Lexer};
use crate::state::LexState;

bitflags! {
    /// Per-literal processing rules.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct StrFunc: u16 {
        /// Keep backslashes (regexps).
        const ESCAPE = 0x01;
        /// Decode escapes and allow interpolation.
        const EXPAND = 0x02;
        const REGEXP = 0x04;
        /// Whitespace separates elements.
        const QWORDS = 0x08;
        const SYMBOL = 0x10;
        /// Heredoc terminator may be indented.
        const INDENT = 0x20;
        /// A trailing `:` turns the string into a label.
        const LABEL = 0x40;
        /// Heredoc body is dedented.
        const DEDENT = 0x80;
        /// A separator is due before the first element.
        const LIST = 0x4000;
        /// The closing delimiter was seen; only the end token remains.
        const TERM = 0x8000;

        const SQUOTE = 0;
        const DQUOTE = Self::EXPAND.bits();
        const XQUOTE = Self::EXPAND.bits();
        const REGEXP_LIT = Self::REGEXP.bits() | Self::ESCAPE.bits() | Self::EXPAND.bits();
        const SWORD = Self::QWORDS.bits() | Self::LIST.bits();
        const DWORD = Self::QWORDS.bits() | Self::EXPAND.bits() | Self::LIST.bits();
        const SSYM = Self::SYMBOL.bits();
        const DSYM = Self::SYMBOL.bits() | Self::EXPAND.bits();
    }
}

/// An open delimited literal.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct LiteralTerm {
    pub func: StrFunc,
    pub term: u8,
    /// Opening delimiter when it differs from `term` and nests.
    pub paren: Option<u8>,
    pub nest: u32,
    pub kind: LiteralKind,
    pub opener: Span,
}

/// The active string terminator.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum StrTerm {
    Literal(LiteralTerm),
    Heredoc(HeredocTerm),
}

/// Characters that may follow `$` in a one-character global.
pub(crate) fn is_global_punct(b: u8) -> bool {
    b"~*$?!@/\\;,.=:<>\"&`'+0".contains(&b)
}

/// Regexp metacharacters that keep their backslash when escaped as the
/// delimiter.
fn simple_re_meta(b: u8) -> bool {
    matches!(
        b,
        b'$' | b'*' | b'+' | b'.' | b'?' | b'^' | b'|' | b')' | b']' | b'}' | b'>'
    )
}

/// Stopping points inside [`Lexer::tokadd_string`].
pub(crate) struct Delimiters {
    pub term: u8,
    pub paren: Option<u8>,
}

impl Lexer<'_> {
    /// Install a literal terminator and return its opening token.
    pub(crate) fn open_literal(
        &mut self,
        kind: TokenKind,
        func: StrFunc,
        term: u8,
        paren: Option<u8>,
        start: usize,
    ) -> Token {
        let literal_kind = if func.contains(StrFunc::REGEXP) {
            LiteralKind::Regexp
        } else if func.contains(StrFunc::QWORDS) {
            LiteralKind::List
        } else {
            LiteralKind::String
        };
        let token = self.token(kind, TokenValue::None, start);
        self.strterm = Some(StrTerm::Literal(LiteralTerm {
            func,
            term,
            paren,
            nest: 0,
            kind: literal_kind,
            opener: token.span,
        }));
        token
    }

    /// Next fragment of an open delimited literal.
    pub(crate) fn string_token(&mut self, mut term: LiteralTerm) -> Result<Token, LexError> {
        let start = self.cursor.pos();
        if term.func.contains(StrFunc::TERM) {
            self.cursor.bump();
            self.state = LexState::END;
            return Ok(self.token(TokenKind::StringEnd, TokenValue::None, start));
        }
        let mut space = false;
        if term.func.contains(StrFunc::QWORDS) && self.cursor.peek().is_some_and(is_space) {
            self.cursor.eat_while(is_space);
            space = true;
        }
        if term.func.contains(StrFunc::LIST) {
            term.func.remove(StrFunc::LIST);
            space = true;
        }
        let sep_start = self.cursor.pos();
        let c = self.cursor.peek();
        if c == Some(term.term) && term.nest == 0 {
            if term.func.contains(StrFunc::QWORDS) {
                term.func.insert(StrFunc::TERM);
                self.strterm = Some(StrTerm::Literal(term));
                return Ok(self.token(TokenKind::WordSep, TokenValue::None, sep_start));
            }
            self.cursor.bump();
            return Ok(self.string_term(&term, start));
        }
        if space {
            self.strterm = Some(StrTerm::Literal(term));
            return Ok(self.token(TokenKind::WordSep, TokenValue::None, sep_start));
        }
        let mut buf = Vec::new();
        if term.func.contains(StrFunc::EXPAND) && c == Some(b'#') {
            if let Some(token) = self.string_dvar(start) {
                self.strterm = Some(StrTerm::Literal(term));
                return Ok(token);
            }
            self.cursor.bump();
            buf.push(b'#');
        }
        let delimiters = Delimiters {
            term: term.term,
            paren: term.paren,
        };
        self.tokadd_string(term.func, &delimiters, &mut term.nest, &mut buf)?;
        if self.cursor.is_eof() {
            let kind = term.kind;
            return Err(LexError::new(
                LexErrorKind::UnterminatedString {
                    kind,
                    delimiter: char::from(term.term),
                },
                term.opener,
            ));
        }
        self.strterm = Some(StrTerm::Literal(term));
        Ok(self.token(TokenKind::StringContent, TokenValue::Str(buf), start))
    }

    /// Closing token after the terminator has been consumed.
    fn string_term(&mut self, term: &LiteralTerm, start: usize) -> Token {
        if term.func.contains(StrFunc::REGEXP) {
            let options = self.regexp_options();
            self.state = LexState::END;
            return self.token(TokenKind::RegexpEnd, TokenValue::RegexpEnd(options), start);
        }
        if term.func.contains(StrFunc::LABEL)
            && self.cursor.peek() == Some(b':')
            && self.cursor.peek_at(1) != Some(b':')
        {
            self.cursor.bump();
            self.state = LexState::ARG | LexState::LABELED;
            return self.token(TokenKind::LabelEnd, TokenValue::None, start);
        }
        self.state = LexState::END;
        self.token(TokenKind::StringEnd, TokenValue::None, start)
    }

    fn regexp_options(&mut self) -> RegexOptions {
        let start = self.cursor.pos();
        let mut options = RegexOptions::empty();
        let mut unknown = String::new();
        while let Some(c) = self.cursor.peek().filter(u8::is_ascii_alphabetic) {
            self.cursor.bump();
            match RegexOptions::from_letter(c) {
                Some(flag) => options |= flag,
                None => unknown.push(char::from(c)),
            }
        }
        let span = Span::from_offsets(start, self.cursor.pos());
        if !unknown.is_empty() {
            let plural = if unknown.len() > 1 { "s" } else { "" };
            self.diagnostics.push(
                Diagnostic::error(ErrorCode::E1012)
                    .with_message(format!("unknown regexp option{plural} - {unknown}"))
                    .with_label(span, ""),
            );
        }
        if options.has_conflicting_encoding() {
            self.diagnostics.push(
                Diagnostic::warning(ErrorCode::W0003)
                    .with_message("regexp encoding options conflict")
                    .with_label(span, ""),
            );
        }
        options
    }

    /// `#{`, `#@var` or `#$var` at the cursor (which is on the `#`).
    pub(crate) fn string_dvar(&mut self, start: usize) -> Option<Token> {
        let mut c = self.cursor.peek_at(2);
        match self.cursor.peek_at(1)? {
            b'{' => {
                self.cursor.bump();
                self.cursor.bump();
                self.command_start = true;
                return Some(self.token(TokenKind::StringDBeg, TokenValue::None, start));
            }
            b'$' => {
                if c == Some(b'-') {
                    c = self.cursor.peek_at(3);
                } else if c.is_some_and(|b| is_global_punct(b) || b.is_ascii_digit()) {
                    self.cursor.bump();
                    return Some(self.token(TokenKind::StringDVar, TokenValue::None, start));
                }
            }
            b'@' => {
                if c == Some(b'@') {
                    c = self.cursor.peek_at(3);
                }
            }
            _ => return None,
        }
        let c = c?;
        if !c.is_ascii() || c == b'_' || c.is_ascii_alphabetic() {
            self.cursor.bump();
            return Some(self.token(TokenKind::StringDVar, TokenValue::None, start));
        }
        None
    }

    /// Accumulate literal text until a delimiter, an interpolation, a word
    /// boundary or end of input.
    pub(crate) fn tokadd_string(
        &mut self,
        func: StrFunc,
        delimiters: &Delimiters,
        nest: &mut u32,
        buf: &mut Vec<u8>,
    ) -> Result<(), LexError> {
        while let Some(c) = self.cursor.peek() {
            if delimiters.paren == Some(c) {
                *nest += 1;
            } else if c == delimiters.term {
                if *nest == 0 {
                    break;
                }
                *nest -= 1;
            } else if func.contains(StrFunc::EXPAND)
                && c == b'#'
                && matches!(self.cursor.peek_at(1), Some(b'$' | b'@' | b'{'))
            {
                break;
            } else if c == b'\\' {
                self.cursor.bump();
                self.tokadd_escape(func, delimiters, buf)?;
                continue;
            } else if !c.is_ascii() {
                self.read_mbchar(buf)?;
                continue;
            } else if func.contains(StrFunc::QWORDS) && is_space(c) {
                break;
            }
            self.cursor.bump();
            buf.push(c);
        }
        Ok(())
    }

    /// One backslash sequence; the backslash has been consumed.
    fn tokadd_escape(
        &mut self,
        func: StrFunc,
        delimiters: &Delimiters,
        buf: &mut Vec<u8>,
    ) -> Result<(), LexError> {
        let Some(c) = self.cursor.peek() else {
            return Ok(());
        };
        match c {
            b'\n' => {
                if func.contains(StrFunc::QWORDS) {
                    self.cursor.bump();
                    buf.push(b'\n');
                } else if func.contains(StrFunc::EXPAND) {
                    self.cursor.bump();
                } else {
                    buf.push(b'\\');
                }
            }
            b'\\' => {
                if func.contains(StrFunc::ESCAPE) {
                    buf.push(b'\\');
                }
                self.cursor.bump();
                buf.push(b'\\');
            }
            b'u' if func.contains(StrFunc::EXPAND) => {
                self.cursor.bump();
                self.read_unicode_escape(buf, func.contains(StrFunc::REGEXP))?;
            }
            _ if !c.is_ascii() => {
                if !func.contains(StrFunc::EXPAND) {
                    buf.push(b'\\');
                }
                self.read_mbchar(buf)?;
            }
            _ if func.contains(StrFunc::REGEXP) => {
                if matches!(c, b'c' | b'C' | b'M') {
                    let byte = self.read_escape(EscapeFlags::default())?;
                    buf.extend_from_slice(format!("\\x{byte:02X}").as_bytes());
                } else if c == delimiters.term && !simple_re_meta(c) {
                    self.cursor.bump();
                    buf.push(c);
                } else {
                    self.cursor.bump();
                    buf.push(b'\\');
                    buf.push(c);
                }
            }
            _ if func.contains(StrFunc::EXPAND) => {
                let byte = self.read_escape(EscapeFlags::default())?;
                buf.push(byte);
            }
            _ if func.contains(StrFunc::QWORDS) && is_space(c) => {
                self.cursor.bump();
                buf.push(c);
            }
            _ if c != delimiters.term && Some(c) != delimiters.paren => {
                buf.push(b'\\');
            }
            _ => {
                self.cursor.bump();
                buf.push(c);
            }
        }
        Ok(())
    }

    /// Copy one multibyte UTF-8 character, rejecting malformed sequences.
    pub(crate) fn read_mbchar(&mut self, buf: &mut Vec<u8>) -> Result<(), LexError> {
        let start = self.cursor.pos();
        let len = match self.cursor.peek() {
            Some(0xc2..=0xdf) => 2,
            Some(0xe0..=0xef) => 3,
            Some(0xf0..=0xf4) => 4,
            _ => 0,
        };
        let mut bytes = [0u8; 4];
        for (i, slot) in bytes.iter_mut().enumerate().take(len) {
            *slot = self.cursor.peek_at(i).unwrap_or(0);
        }
        if len == 0 || std::str::from_utf8(&bytes[..len]).is_err() {
            return Err(LexError::new(
                LexErrorKind::InvalidMultibyte,
                Span::from_offsets(start, start + 1),
            ));
        }
        for _ in 0..len {
            self.cursor.bump();
        }
        buf.extend_from_slice(&bytes[..len]);
        Ok(())
    }

    /// `%` literal; the `%` has been consumed and `start` points at it.
    pub(crate) fn percent_literal(&mut self, start: usize) -> Result<Token, LexError> {
        let (letter, open) = match self.cursor.peek() {
            None => {
                return Err(self.unterminated_quoted(start));
            }
            Some(c) if !c.is_ascii_alphanumeric() => {
                if !c.is_ascii() {
                    return Err(self.unknown_percent(start));
                }
                self.cursor.bump();
                (b'Q', c)
            }
            Some(letter) => {
                self.cursor.bump();
                match self.cursor.peek() {
                    None => return Err(self.unterminated_quoted(start)),
                    Some(open) if open.is_ascii_alphanumeric() || !open.is_ascii() => {
                        return Err(self.unknown_percent(start));
                    }
                    Some(open) => {
                        self.cursor.bump();
                        (letter, open)
                    }
                }
            }
        };
        let (term, paren) = match open {
            b'(' => (b')', Some(b'(')),
            b'[' => (b']', Some(b'[')),
            b'{' => (b'}', Some(b'{')),
            b'<' => (b'>', Some(b'<')),
            other => (other, None),
        };
        let (kind, func) = match letter {
            b'Q' => (TokenKind::StringBeg, StrFunc::DQUOTE),
            b'q' => (TokenKind::StringBeg, StrFunc::SQUOTE),
            b'W' => (TokenKind::WordsBeg, StrFunc::DWORD),
            b'w' => (TokenKind::QWordsBeg, StrFunc::SWORD),
            b'I' => (TokenKind::SymbolsBeg, StrFunc::DWORD),
            b'i' => (TokenKind::QSymbolsBeg, StrFunc::SWORD),
            b'x' => (TokenKind::XStringBeg, StrFunc::XQUOTE),
            b'r' => (TokenKind::RegexpBeg, StrFunc::REGEXP_LIT),
            b's' => {
                self.state = LexState::FNAME | LexState::FITEM;
                (TokenKind::SymBeg, StrFunc::SSYM)
            }
            _ => return Err(self.unknown_percent(start)),
        };
        Ok(self.open_literal(kind, func, term, paren, start))
    }

    fn unterminated_quoted(&self, start: usize) -> LexError {
        LexError::new(
            LexErrorKind::UnterminatedString {
                kind: LiteralKind::Quoted,
                delimiter: '%',
            },
            Span::from_offsets(start, self.cursor.pos()),
        )
    }

    fn unknown_percent(&self, start: usize) -> LexError {
        LexError::new(
            LexErrorKind::UnknownPercentLiteral,
            Span::from_offsets(start, self.cursor.pos() + 1),
        )
    }
}
