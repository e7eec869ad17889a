//! Backslash escapes in double-quoted literals and character literals.

use garnet_ir::Span;

use crate::lex_error::{LexError, LexErrorKind};
use crate::scanner::Lexer;

/// Flags threaded through nested `\M-` / `\C-` escapes.
#[derive(Copy, Clone, Default, Debug)]
pub(crate) struct EscapeFlags {
    meta: bool,
    control: bool,
}

fn is_hex(b: Option<u8>) -> Option<u32> {
    b.and_then(|b| char::from(b).to_digit(16))
}

fn is_octal(b: Option<u8>) -> Option<u32> {
    b.and_then(|b| char::from(b).to_digit(8))
}

impl Lexer<'_> {
    fn escape_error(&self, start: usize, message: &'static str) -> LexError {
        LexError::new(
            LexErrorKind::InvalidEscape(message),
            Span::from_offsets(start, self.cursor.pos()),
        )
    }

    /// Decode one escape; the backslash has already been consumed.
    pub(crate) fn read_escape(&mut self, flags: EscapeFlags) -> Result<u8, LexError> {
        let start = self.cursor.pos().saturating_sub(1);
        let Some(c) = self.cursor.bump() else {
            return Err(self.escape_error(start, "Invalid escape character syntax"));
        };
        Ok(match c {
            b'n' => b'\n',
            b't' => b'\t',
            b'r' => b'\r',
            b'f' => 0x0c,
            b'v' => 0x0b,
            b'a' => 0x07,
            b'e' => 0x1b,
            b'b' => 0x08,
            b's' => b' ',
            b'0'..=b'7' => {
                let mut value = u32::from(c - b'0');
                for _ in 0..2 {
                    let Some(digit) = is_octal(self.cursor.peek()) else {
                        break;
                    };
                    self.cursor.bump();
                    value = value * 8 + digit;
                }
                (value & 0xff) as u8
            }
            b'x' => {
                let mut value = 0;
                let mut digits = 0;
                while digits < 2 {
                    let Some(digit) = is_hex(self.cursor.peek()) else {
                        break;
                    };
                    self.cursor.bump();
                    value = value * 16 + digit;
                    digits += 1;
                }
                if digits == 0 {
                    return Err(self.escape_error(start, "invalid hex escape"));
                }
                (value & 0xff) as u8
            }
            b'M' => {
                if flags.meta {
                    return Err(self.escape_error(start, "duplicate meta escape"));
                }
                if !self.cursor.eat(b'-') {
                    return Err(self.escape_error(start, "Invalid escape character syntax"));
                }
                match self.cursor.bump() {
                    Some(b'\\') => {
                        let inner = self.read_escape(EscapeFlags {
                            meta: true,
                            ..flags
                        })?;
                        inner | 0x80
                    }
                    Some(c) if c.is_ascii() => c | 0x80,
                    _ => return Err(self.escape_error(start, "Invalid escape character syntax")),
                }
            }
            b'C' => {
                if !self.cursor.eat(b'-') {
                    return Err(self.escape_error(start, "Invalid escape character syntax"));
                }
                self.read_control(start, flags)?
            }
            b'c' => self.read_control(start, flags)?,
            other => other,
        })
    }

    fn read_control(&mut self, start: usize, flags: EscapeFlags) -> Result<u8, LexError> {
        if flags.control {
            return Err(self.escape_error(start, "duplicate control escape"));
        }
        match self.cursor.bump() {
            Some(b'\\') => {
                let inner = self.read_escape(EscapeFlags {
                    control: true,
                    ..flags
                })?;
                Ok(inner & 0x9f)
            }
            Some(b'?') => Ok(0x7f),
            Some(c) if c.is_ascii() => Ok(c & 0x9f),
            _ => Err(self.escape_error(start, "Invalid escape character syntax")),
        }
    }

    /// Decode `\uXXXX` or `\u{X ...}`; the `u` has been consumed.
    ///
    /// Inside a regexp the escape is validated and copied verbatim.
    pub(crate) fn read_unicode_escape(
        &mut self,
        out: &mut Vec<u8>,
        verbatim: bool,
    ) -> Result<(), LexError> {
        let start = self.cursor.pos().saturating_sub(2);
        if self.cursor.eat(b'{') {
            let mut count = 0;
            loop {
                self.cursor.eat_while(|b| b == b' ' || b == b'\t');
                match self.cursor.peek() {
                    Some(b'}') => break,
                    Some(b) if b.is_ascii_hexdigit() => {}
                    None | Some(b'\n') => {
                        return Err(self.unicode_error(start, "unterminated Unicode escape"));
                    }
                    Some(_) => return Err(self.unicode_error(start, "invalid Unicode list")),
                }
                let code = self.read_hex_code(start, 6)?;
                if self.cursor.peek().is_some_and(|b| b.is_ascii_hexdigit()) {
                    return Err(self.unicode_error(start, "invalid Unicode codepoint (too large)"));
                }
                if !verbatim {
                    push_code_point(out, code).map_err(|msg| self.unicode_error(start, msg))?;
                }
                count += 1;
            }
            self.cursor.bump();
            if count == 0 {
                return Err(self.unicode_error(start, "invalid Unicode escape"));
            }
        } else {
            let mut code = 0;
            for _ in 0..4 {
                let Some(digit) = is_hex(self.cursor.peek()) else {
                    return Err(self.unicode_error(start, "invalid Unicode escape"));
                };
                self.cursor.bump();
                code = code * 16 + digit;
            }
            if !verbatim {
                push_code_point(out, code).map_err(|msg| self.unicode_error(start, msg))?;
            }
        }
        if verbatim {
            let raw = self.cursor.slice(start, self.cursor.pos()).to_vec();
            out.extend_from_slice(&raw);
        }
        Ok(())
    }

    fn read_hex_code(&mut self, start: usize, max: usize) -> Result<u32, LexError> {
        let mut code: u32 = 0;
        for _ in 0..max {
            let Some(digit) = is_hex(self.cursor.peek()) else {
                break;
            };
            self.cursor.bump();
            code = code * 16 + digit;
        }
        if code > 0x10_ffff {
            return Err(self.unicode_error(start, "invalid Unicode codepoint (too large)"));
        }
        Ok(code)
    }

    fn unicode_error(&self, start: usize, message: &'static str) -> LexError {
        LexError::new(
            LexErrorKind::InvalidUnicodeEscape(message),
            Span::from_offsets(start, self.cursor.pos()),
        )
    }
}

/// Append `code` as UTF-8.
pub(crate) fn push_code_point(out: &mut Vec<u8>, code: u32) -> Result<(), &'static str> {
    let ch = char::from_u32(code).ok_or("invalid Unicode codepoint")?;
    let mut utf8 = [0; 4];
    out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
    Ok(())
}

#[cfg(test)]
mod tests;
