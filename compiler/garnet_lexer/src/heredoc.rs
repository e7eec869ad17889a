//! Here documents.
//!
//! The body is scanned as soon as the opener is seen: the cursor moves to
//! the line after the opener (or past the previous heredoc's body on the
//! same line), body fragments are produced line by line, and on the
//! terminator line the cursor goes back to the rest of the opening line.
//! The end of the consumed body is parked in the cursor so the opening
//! line's newline skips over it.
//!
//! `<<~` bodies report their common indentation through the `Dedent`
//! value of the closing token; [`dedent_width`] applies it to a line.

use garnet_ir::{Span, Token, TokenKind, TokenValue};

use crate::lex_error::{LexError, LexErrorKind};
use crate::literal::{Delimiters, StrFunc, StrTerm};
use crate::scanner::{is_ident_char, Lexer};
use crate::state::LexState;

/// Columns a tab advances to when measuring indentation.
pub const TAB_WIDTH: u32 = 8;

/// An open heredoc.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct HeredocTerm {
    pub id: Vec<u8>,
    pub func: StrFunc,
    /// Offset of the rest of the opening line.
    pub resume: usize,
    pub opener: Span,
    /// Smallest indentation seen so far in a `<<~` body.
    pub indent: Option<u32>,
}

/// Number of leading bytes of `line` to strip for a dedent of `width`
/// columns.
pub fn dedent_width(line: &[u8], width: u32) -> usize {
    let mut col = 0;
    let mut strip = 0;
    for &b in line {
        if col >= width {
            break;
        }
        match b {
            b' ' => col += 1,
            b'\t' => {
                let next = TAB_WIDTH * (col / TAB_WIDTH + 1);
                if next > width {
                    break;
                }
                col = next;
            }
            _ => break,
        }
        strip += 1;
    }
    strip
}

/// Indentation width of a line, `None` for a whitespace-only line.
pub fn line_indent(line: &[u8]) -> Option<u32> {
    let mut col = 0;
    for &b in line {
        match b {
            b' ' => col += 1,
            b'\t' => col = TAB_WIDTH * (col / TAB_WIDTH + 1),
            b'\n' | b'\r' => return None,
            _ => return Some(col),
        }
    }
    None
}

impl Lexer<'_> {
    /// Try to open a heredoc after `<<`; restores the cursor and returns
    /// `None` when no identifier follows.
    pub(crate) fn heredoc_identifier(&mut self, start: usize) -> Result<Option<Token>, LexError> {
        let after_lt = self.cursor.pos();
        let mut func = StrFunc::empty();
        match self.cursor.peek() {
            Some(b'-') => {
                self.cursor.bump();
                func |= StrFunc::INDENT;
            }
            Some(b'~') => {
                self.cursor.bump();
                func |= StrFunc::INDENT | StrFunc::DEDENT;
            }
            _ => {}
        }
        let mut kind = TokenKind::StringBeg;
        let id = match self.cursor.peek() {
            Some(quote @ (b'\'' | b'"' | b'`')) => {
                self.cursor.bump();
                let id_start = self.cursor.pos();
                loop {
                    match self.cursor.peek() {
                        Some(c) if c == quote => break,
                        None | Some(b'\n') => {
                            return Err(LexError::new(
                                LexErrorKind::UnterminatedHeredocIdentifier,
                                Span::from_offsets(start, self.cursor.pos()),
                            ));
                        }
                        Some(_) => {
                            self.cursor.bump();
                        }
                    }
                }
                let id = self.cursor.slice(id_start, self.cursor.pos()).to_vec();
                self.cursor.bump();
                match quote {
                    b'"' => func |= StrFunc::EXPAND,
                    b'`' => {
                        func |= StrFunc::EXPAND;
                        kind = TokenKind::XStringBeg;
                    }
                    _ => {}
                }
                id
            }
            Some(c) if is_ident_char(c) => {
                let id_start = self.cursor.pos();
                while let Some(c) = self.cursor.peek().filter(|&c| is_ident_char(c)) {
                    if c.is_ascii() {
                        self.cursor.bump();
                    } else {
                        self.read_mbchar(&mut Vec::new())?;
                    }
                }
                func |= StrFunc::EXPAND;
                self.cursor.slice(id_start, self.cursor.pos()).to_vec()
            }
            _ => {
                self.cursor.set_pos(after_lt);
                return Ok(None);
            }
        };
        let token = self.token(kind, TokenValue::None, start);
        let resume = self.cursor.pos();
        let body = match self.cursor.take_heredoc_end() {
            Some(end) => end,
            None => {
                let eol = self.cursor.line_end(resume);
                if self.cursor.byte_at(eol) == Some(b'\n') {
                    eol + 1
                } else {
                    eol
                }
            }
        };
        tracing::trace!(id = %String::from_utf8_lossy(&id), body, "heredoc opened");
        self.cursor.set_pos(body);
        let indent = func.contains(StrFunc::DEDENT).then_some(u32::MAX);
        self.strterm = Some(StrTerm::Heredoc(HeredocTerm {
            id,
            func,
            resume,
            opener: token.span,
            indent,
        }));
        Ok(Some(token))
    }

    /// Does the line at the cursor close the heredoc?
    fn heredoc_terminator(&mut self, term: &HeredocTerm) -> Option<(usize, usize)> {
        let line = self.cursor.pos();
        let mut at = line;
        if term.func.contains(StrFunc::INDENT) {
            while matches!(self.cursor.byte_at(at), Some(b' ' | b'\t')) {
                at += 1;
            }
        }
        let id_start = at;
        for &b in &term.id {
            if self.cursor.byte_at(at) != Some(b) {
                return None;
            }
            at += 1;
        }
        let id_end = at;
        match self.cursor.byte_at(at) {
            None => Some((id_start, id_end)),
            Some(b'\n') => Some((id_start, id_end)),
            Some(b'\r') if self.cursor.byte_at(at + 1) == Some(b'\n') => Some((id_start, id_end)),
            _ => None,
        }
    }

    /// Next fragment of an open heredoc.
    pub(crate) fn heredoc_token(&mut self, mut term: HeredocTerm) -> Result<Token, LexError> {
        let start = self.cursor.pos();
        if self.cursor.is_eof() {
            return Err(LexError::new(
                LexErrorKind::UnterminatedHeredoc {
                    id: String::from_utf8_lossy(&term.id).into_owned(),
                },
                term.opener,
            ));
        }
        let bol = start == self.cursor.line_start(start);
        if bol {
            if let Some((id_start, id_end)) = self.heredoc_terminator(&term) {
                let eol = self.cursor.line_end(id_end);
                let after = if self.cursor.byte_at(eol) == Some(b'\n') {
                    eol + 1
                } else {
                    eol
                };
                self.cursor.set_heredoc_end(Some(after));
                self.cursor.set_pos(term.resume);
                self.state = LexState::END;
                let value = match term.indent {
                    Some(width) => TokenValue::Dedent(if width == u32::MAX { 0 } else { width }),
                    None => TokenValue::None,
                };
                tracing::trace!(resume = term.resume, after, "heredoc closed");
                let mut token = Token::new(
                    TokenKind::StringEnd,
                    value,
                    Span::from_offsets(id_start, id_end),
                );
                token.space_before = self.space_seen;
                return Ok(token);
            }
            if let Some(current) = term.indent {
                let eol = self.cursor.line_end(start);
                let line = self.cursor.slice(start, eol + 1);
                if let Some(width) = line_indent(line) {
                    term.indent = Some(current.min(width));
                }
            }
        }
        let mut buf = Vec::new();
        if term.func.contains(StrFunc::EXPAND) {
            if self.cursor.peek() == Some(b'#') {
                if let Some(token) = self.string_dvar(start) {
                    self.strterm = Some(StrTerm::Heredoc(term));
                    return Ok(token);
                }
                self.cursor.bump();
                buf.push(b'#');
            }
            let delimiters = Delimiters {
                term: b'\n',
                paren: None,
            };
            let mut nest = 0;
            self.tokadd_string(term.func, &delimiters, &mut nest, &mut buf)?;
            if self.cursor.peek() == Some(b'\n') {
                self.cursor.bump();
                buf.push(b'\n');
            }
        } else {
            let eol = self.cursor.line_end(start);
            let end = if self.cursor.byte_at(eol) == Some(b'\n') {
                eol + 1
            } else {
                eol
            };
            buf.extend_from_slice(self.cursor.slice(start, end));
            self.cursor.set_pos(end);
        }
        self.strterm = Some(StrTerm::Heredoc(term));
        Ok(self.token(TokenKind::StringContent, TokenValue::Str(buf), start))
    }
}

#[cfg(test)]
mod tests;
