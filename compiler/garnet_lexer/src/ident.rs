//! Identifiers, reserved words, labels and variables.

use garnet_ir::{Span, Token, TokenKind, TokenValue};

use crate::keywords;
use crate::lex_error::{LexError, LexErrorKind};
use crate::literal::is_global_punct;
use crate::scanner::{is_ident_char, Lexer};
use crate::state::LexState;
use crate::LocalLookup;

/// `_1` through `_9`.
pub fn is_numbered_param(text: &[u8]) -> bool {
    matches!(text, [b'_', b'1'..=b'9'])
}

/// Identifier text must start with an upper-case ASCII letter to be a
/// constant.
#[inline]
fn is_const_start(text: &[u8]) -> bool {
    text.first().is_some_and(u8::is_ascii_uppercase)
}

impl Lexer<'_> {
    /// Copy identifier characters into `buf`, validating multibyte ones.
    fn read_ident(&mut self, buf: &mut Vec<u8>) -> Result<(), LexError> {
        while let Some(c) = self.cursor.peek().filter(|&c| is_ident_char(c)) {
            if c.is_ascii() {
                self.cursor.bump();
                buf.push(c);
            } else {
                self.read_mbchar(buf)?;
            }
        }
        Ok(())
    }

    fn variable_name_error(&self, start: usize, message: String) -> LexError {
        LexError::new(
            LexErrorKind::InvalidVariableName(message),
            Span::from_offsets(start, self.cursor.pos().max(start + 1)),
        )
    }

    /// Identifier, constant, method name, label or reserved word; the
    /// cursor is at the first character.
    pub(crate) fn identifier(
        &mut self,
        start: usize,
        cmd_state: bool,
        locals: &dyn LocalLookup,
    ) -> Result<Token, LexError> {
        let mut text = Vec::new();
        self.read_ident(&mut text)?;
        let mut kind = if is_const_start(&text) {
            TokenKind::Const
        } else {
            TokenKind::Ident
        };

        if let Some(c @ (b'!' | b'?')) = self.cursor.peek() {
            if self.cursor.peek_at(1) != Some(b'=') {
                self.cursor.bump();
                text.push(c);
                kind = TokenKind::FIdent;
            }
        } else if self.state.any(LexState::FNAME)
            && self.cursor.peek() == Some(b'=')
            && !matches!(self.cursor.peek_at(1), Some(b'~' | b'>'))
            && (self.cursor.peek_at(1) != Some(b'=') || self.cursor.peek_at(2) == Some(b'>'))
        {
            // `def name=(value)`
            self.cursor.bump();
            text.push(b'=');
            kind = TokenKind::Ident;
        }

        let last_state = self.state;
        if self.is_label_possible(cmd_state)
            && self.cursor.peek() == Some(b':')
            && self.cursor.peek_at(1) != Some(b':')
        {
            let name = self.interner.intern_bytes(&text);
            let token = self.token(TokenKind::Label, TokenValue::Name(name), start);
            self.cursor.bump();
            self.state = LexState::ARG | LexState::LABELED;
            return Ok(Token {
                span: self.cursor.span_from(start),
                ..token
            });
        }

        if text.is_ascii() && !self.state.any(LexState::DOT) {
            if let Some(kw) = keywords::lookup(&text) {
                return Ok(self.keyword(kw, &text, last_state, start));
            }
        }

        self.state = if self.state.any(LexState::BEG_ANY | LexState::ARG_ANY | LexState::DOT) {
            if cmd_state {
                LexState::CMDARG
            } else {
                LexState::ARG
            }
        } else if self.state == LexState::FNAME {
            LexState::ENDFN
        } else {
            LexState::END
        };

        let name = self.interner.intern_bytes(&text);
        if kind == TokenKind::Ident
            && !last_state.any(LexState::DOT | LexState::FNAME)
            && (locals.is_local(name) || is_numbered_param(&text))
        {
            self.state = LexState::END | LexState::LABEL;
            kind = TokenKind::LocalIdent;
        }
        Ok(self.token(kind, TokenValue::Name(name), start))
    }

    fn keyword(
        &mut self,
        kw: keywords::Keyword,
        text: &[u8],
        last_state: LexState,
        start: usize,
    ) -> Token {
        if last_state.any(LexState::FNAME) {
            self.state = LexState::ENDFN;
            let name = self.interner.intern_bytes(text);
            return self.token(kw.value, TokenValue::Name(name), start);
        }
        self.state = kw.state;
        if self.state.any(LexState::BEG) {
            self.command_start = true;
        }
        let kind = if kw.value == TokenKind::KwDo {
            if self.lambda_beginning() {
                // The lambda body is not itself a lambda start.
                self.lpar_beg = -1;
                TokenKind::KwDoLambda
            } else if self.cond.top() {
                TokenKind::KwDoCond
            } else if self.cmdarg.top() && !last_state.any(LexState::CMDARG) {
                TokenKind::KwDoBlock
            } else {
                TokenKind::KwDo
            }
        } else if last_state.any(LexState::BEG | LexState::LABELED | LexState::CLASS) {
            kw.value
        } else {
            if kw.value != kw.modifier {
                self.state = LexState::BEG | LexState::LABEL;
            }
            kw.modifier
        };
        self.simple(kind, start)
    }

    /// `$name`, `$1`, `$&` and the other special globals; `$` consumed.
    pub(crate) fn global_variable(&mut self, start: usize) -> Result<Token, LexError> {
        let last_state = self.last_state;
        self.state = LexState::END;
        let Some(c) = self.cursor.peek() else {
            return Err(self.variable_name_error(
                start,
                "`$' without identifiers is not allowed as a global variable name".into(),
            ));
        };
        match c {
            b'_' if !self.cursor.peek_at(1).is_some_and(is_ident_char) => {
                self.cursor.bump();
                Ok(self.gvar_token(start))
            }
            b'&' | b'`' | b'\'' | b'+' => {
                self.cursor.bump();
                if last_state.any(LexState::FNAME) {
                    return Ok(self.gvar_token(start));
                }
                Ok(self.token(TokenKind::BackRef, TokenValue::BackRef(c), start))
            }
            b'-' => {
                self.cursor.bump();
                match self.cursor.peek() {
                    Some(n) if is_ident_char(n) => {
                        if n.is_ascii() {
                            self.cursor.bump();
                        } else {
                            self.read_mbchar(&mut Vec::new())?;
                        }
                        Ok(self.gvar_token(start))
                    }
                    _ => Err(self.variable_name_error(
                        start,
                        "`$-' is not allowed as a global variable name".into(),
                    )),
                }
            }
            b'1'..=b'9' => {
                self.cursor.eat_while(|b| b.is_ascii_digit());
                if last_state.any(LexState::FNAME) {
                    return Ok(self.gvar_token(start));
                }
                let digits = self.cursor.slice(start + 1, self.cursor.pos()).to_vec();
                let number = std::str::from_utf8(&digits)
                    .ok()
                    .and_then(|d| d.parse::<u32>().ok())
                    .filter(|n| *n <= (i32::MAX as u32) >> 1);
                let value = match number {
                    Some(n) => n,
                    None => {
                        let span = self.cursor.span_from(start);
                        self.warn(
                            span,
                            format!(
                                "`${}' is too big for a number variable, always nil",
                                String::from_utf8_lossy(&digits)
                            ),
                        );
                        0
                    }
                };
                Ok(self.token(TokenKind::NthRef, TokenValue::NthRef(value), start))
            }
            c if is_global_punct(c) && c != b'0' => {
                self.cursor.bump();
                Ok(self.gvar_token(start))
            }
            c if is_ident_char(c) => {
                self.read_ident(&mut Vec::new())?;
                Ok(self.gvar_token(start))
            }
            c => {
                let message = if crate::scanner::is_space(c) {
                    "`$' without identifiers is not allowed as a global variable name".to_owned()
                } else {
                    format!("`${}' is not allowed as a global variable name", c as char)
                };
                Err(self.variable_name_error(start, message))
            }
        }
    }

    fn gvar_token(&mut self, start: usize) -> Token {
        let name = self
            .interner
            .intern_bytes(self.cursor.slice(start, self.cursor.pos()));
        self.token(TokenKind::GVar, TokenValue::Name(name), start)
    }

    /// `@ivar` or `@@cvar`; the first `@` consumed.
    pub(crate) fn instance_variable(&mut self, start: usize) -> Result<Token, LexError> {
        let (kind, what) = if self.cursor.eat(b'@') {
            (TokenKind::CVar, "a class variable")
        } else {
            (TokenKind::IVar, "an instance variable")
        };
        self.state = if self.last_state.any(LexState::FNAME) {
            LexState::ENDFN
        } else {
            LexState::END
        };
        let prefix = String::from_utf8_lossy(self.cursor.slice(start, self.cursor.pos())).into_owned();
        match self.cursor.peek() {
            Some(c) if c.is_ascii_digit() => {
                return Err(self.variable_name_error(
                    start,
                    format!("`{prefix}{}' is not allowed as {what} name", c as char),
                ));
            }
            Some(c) if is_ident_char(c) => {}
            _ => {
                return Err(self.variable_name_error(
                    start,
                    format!("`{prefix}' without identifiers is not allowed as {what} name"),
                ));
            }
        }
        self.read_ident(&mut Vec::new())?;
        let name = self
            .interner
            .intern_bytes(self.cursor.slice(start, self.cursor.pos()));
        Ok(self.token(kind, TokenValue::Name(name), start))
    }
}

#[cfg(test)]
mod tests;
