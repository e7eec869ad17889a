//! Numeric literals.
//!
//! Values are folded while scanning: integers that fit in `i64` become
//! `Integer`, larger ones keep their digits, floats are parsed with the
//! standard library, and the `r`/`i` suffixes wrap the result.

use garnet_diagnostic::{Diagnostic, ErrorCode};
use garnet_ir::{NumericValue, Span, Token, TokenKind, TokenValue};

use crate::lex_error::{LexError, LexErrorKind};
use crate::scanner::Lexer;
use crate::state::LexState;

#[derive(Copy, Clone, Default, Debug)]
struct Suffix {
    rational: bool,
    imaginary: bool,
}

impl Lexer<'_> {
    fn number_error(&self, start: usize, message: &'static str) -> LexError {
        LexError::new(
            LexErrorKind::InvalidNumber(message),
            Span::from_offsets(start, self.cursor.pos()),
        )
    }

    /// Scan a number whose first digit is at the cursor. `start` may point
    /// at a preceding `+` sign.
    pub(crate) fn scan_number(&mut self, start: usize) -> Result<Token, LexError> {
        self.state = LexState::END;
        if self.cursor.peek() == Some(b'0') {
            let radix = match self.cursor.peek_at(1) {
                Some(b'x' | b'X') => Some(16),
                Some(b'b' | b'B') => Some(2),
                Some(b'd' | b'D') => Some(10),
                Some(b'o' | b'O') => Some(8),
                _ => None,
            };
            if let Some(radix) = radix {
                self.cursor.bump();
                self.cursor.bump();
                return self.prefixed_number(start, radix, false);
            }
            match self.cursor.peek_at(1) {
                Some(b'_' | b'0'..=b'9') => {
                    self.cursor.bump();
                    return self.prefixed_number(start, 8, true);
                }
                _ => {}
            }
        }
        self.decimal_number(start)
    }

    /// Digits after a radix prefix (or after a leading `0` for octal).
    fn prefixed_number(
        &mut self,
        start: usize,
        radix: u32,
        after_zero: bool,
    ) -> Result<Token, LexError> {
        let mut digits = String::new();
        let mut pending_underscore = false;
        let mut seen_digit = after_zero;
        while let Some(c) = self.cursor.peek() {
            if c == b'_' {
                if pending_underscore || !seen_digit {
                    break;
                }
                pending_underscore = true;
                self.cursor.bump();
                continue;
            }
            if char::from(c).to_digit(radix).is_none() {
                if radix == 8 && c.is_ascii_digit() {
                    self.cursor.bump();
                    return Err(self.number_error(start, "Invalid octal digit"));
                }
                break;
            }
            digits.push(char::from(c));
            seen_digit = true;
            pending_underscore = false;
            self.cursor.bump();
        }
        if digits.is_empty() && !after_zero {
            return Err(self.number_error(start, "numeric literal without digits"));
        }
        if pending_underscore || (digits.is_empty() && self.cursor.peek() == Some(b'_')) {
            return Err(self.number_error(start, "trailing `_' in number"));
        }
        if digits.is_empty() {
            digits.push('0');
        }
        let suffix = self.number_suffix(true);
        let value = integer_value(&digits, radix);
        Ok(self.number_token(start, value, suffix))
    }

    fn decimal_number(&mut self, start: usize) -> Result<Token, LexError> {
        let mut text = String::new();
        let mut is_float = false;
        let mut seen_point = false;
        let mut seen_e = false;
        let mut nondigit: Option<u8> = None;
        while let Some(c) = self.cursor.peek() {
            match c {
                b'0'..=b'9' => {
                    nondigit = None;
                    text.push(char::from(c));
                    self.cursor.bump();
                }
                b'.' => {
                    if nondigit.is_some() || seen_point || seen_e {
                        break;
                    }
                    if !self.cursor.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
                        break;
                    }
                    self.cursor.bump();
                    text.push('.');
                    seen_point = true;
                    is_float = true;
                }
                b'e' | b'E' => {
                    if nondigit.is_some() || seen_e {
                        break;
                    }
                    match self.cursor.peek_at(1) {
                        Some(sign @ (b'+' | b'-')) => {
                            self.cursor.bump();
                            self.cursor.bump();
                            text.push('e');
                            text.push(char::from(sign));
                            nondigit = Some(sign);
                        }
                        Some(b'0'..=b'9') => {
                            self.cursor.bump();
                            text.push('e');
                        }
                        _ => break,
                    }
                    seen_e = true;
                    is_float = true;
                }
                b'_' => {
                    if nondigit.is_some() {
                        break;
                    }
                    nondigit = Some(c);
                    self.cursor.bump();
                }
                _ => break,
            }
        }
        if let Some(c) = nondigit {
            return Err(self.number_error(
                start,
                if c == b'_' {
                    "trailing `_' in number"
                } else {
                    "trailing sign in number exponent"
                },
            ));
        }
        if !is_float {
            let suffix = self.number_suffix(true);
            return Ok(self.number_token(start, integer_value(&text, 10), suffix));
        }
        let suffix = self.number_suffix(!seen_e);
        let value = if suffix.rational {
            float_rational(&text).unwrap_or_else(|| float_value(&text))
        } else {
            let value = float_value(&text);
            if matches!(value, NumericValue::Float(bits) if f64::from_bits(bits).is_infinite()) {
                self.diagnostics.push(
                    Diagnostic::warning(ErrorCode::W0004)
                        .with_message(format!("Float {text} out of range"))
                        .with_label(Span::from_offsets(start, self.cursor.pos()), ""),
                );
            }
            value
        };
        Ok(self.number_token(
            start,
            value,
            Suffix {
                rational: false,
                ..suffix
            },
        ))
    }

    /// Optional `r`, `i` or `ri` suffix. A suffix glued to further
    /// identifier characters is not a suffix at all (`1if`).
    fn number_suffix(&mut self, allow_rational: bool) -> Suffix {
        let save = self.cursor.pos();
        let mut suffix = Suffix::default();
        let mut allow_rational = allow_rational;
        let mut allow_imaginary = true;
        while let Some(c) = self.cursor.peek() {
            if c == b'i' && allow_imaginary {
                suffix.imaginary = true;
                allow_imaginary = false;
                allow_rational = false;
            } else if c == b'r' && allow_rational {
                suffix.rational = true;
                allow_rational = false;
            } else if !c.is_ascii() || c.is_ascii_alphabetic() || c == b'_' {
                self.cursor.set_pos(save);
                return Suffix::default();
            } else {
                break;
            }
            self.cursor.bump();
        }
        suffix
    }

    fn number_token(&self, start: usize, value: NumericValue, suffix: Suffix) -> Token {
        let mut value = value;
        if suffix.rational {
            if let NumericValue::Integer(numerator) = value {
                value = NumericValue::Rational {
                    numerator,
                    denominator: 1,
                };
            }
        }
        if suffix.imaginary {
            value = NumericValue::Imaginary(Box::new(value));
        }
        self.token(TokenKind::Numeric, TokenValue::Number(value), start)
    }
}

fn integer_value(digits: &str, radix: u32) -> NumericValue {
    match i64::from_str_radix(digits, radix) {
        Ok(v) => NumericValue::Integer(v),
        Err(_) => NumericValue::BigInteger {
            negative: false,
            radix,
            digits: digits.trim_start_matches('0').to_owned(),
        },
    }
}

fn float_value(text: &str) -> NumericValue {
    NumericValue::float(text.parse::<f64>().unwrap_or(f64::INFINITY))
}

/// `1.25r` is the exact fraction `5/4`.
fn float_rational(text: &str) -> Option<NumericValue> {
    let (whole, frac) = text.split_once('.')?;
    let denominator = 10i64.checked_pow(u32::try_from(frac.len()).ok()?)?;
    let numerator: i64 = format!("{whole}{frac}").parse().ok()?;
    let divisor = gcd(numerator.unsigned_abs(), denominator.unsigned_abs());
    let divisor = i64::try_from(divisor).ok()?.max(1);
    Some(NumericValue::Rational {
        numerator: numerator / divisor,
        denominator: denominator / divisor,
    })
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests;
