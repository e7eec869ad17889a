use super::gcd;
use crate::test_helpers::{kinds, lex_error, numbers, scan};
use crate::LexErrorKind;
use garnet_diagnostic::ErrorCode;
use garnet_ir::{NumericValue, TokenKind};
use pretty_assertions::assert_eq;

fn int(v: i64) -> NumericValue {
    NumericValue::Integer(v)
}

#[test]
fn test_decimal_integers() {
    assert_eq!(numbers("0"), vec![int(0)]);
    assert_eq!(numbers("42"), vec![int(42)]);
    assert_eq!(numbers("1_000_000"), vec![int(1_000_000)]);
}

#[test]
fn test_prefixed_integers() {
    assert_eq!(numbers("0x1F"), vec![int(31)]);
    assert_eq!(numbers("0b1010"), vec![int(10)]);
    assert_eq!(numbers("0o17"), vec![int(15)]);
    assert_eq!(numbers("017"), vec![int(15)]);
    assert_eq!(numbers("0d19"), vec![int(19)]);
    assert_eq!(numbers("0_7"), vec![int(7)]);
}

#[test]
fn test_big_integer_keeps_digits() {
    assert_eq!(
        numbers("99999999999999999999"),
        vec![NumericValue::BigInteger {
            negative: false,
            radix: 10,
            digits: "99999999999999999999".to_owned(),
        }]
    );
}

#[test]
fn test_floats() {
    assert_eq!(numbers("1.5"), vec![NumericValue::float(1.5)]);
    assert_eq!(numbers("1e3"), vec![NumericValue::float(1000.0)]);
    assert_eq!(numbers("2.5E-3"), vec![NumericValue::float(0.0025)]);
    assert_eq!(numbers("1_0.2_5"), vec![NumericValue::float(10.25)]);
}

#[test]
fn test_rational_and_imaginary_suffixes() {
    assert_eq!(
        numbers("3r"),
        vec![NumericValue::Rational {
            numerator: 3,
            denominator: 1
        }]
    );
    assert_eq!(
        numbers("1.25r"),
        vec![NumericValue::Rational {
            numerator: 5,
            denominator: 4
        }]
    );
    assert_eq!(numbers("2i"), vec![NumericValue::Imaginary(Box::new(int(2)))]);
    assert_eq!(
        numbers("1ri"),
        vec![NumericValue::Imaginary(Box::new(NumericValue::Rational {
            numerator: 1,
            denominator: 1
        }))]
    );
}

#[test]
fn test_suffix_glued_to_identifier_is_not_a_suffix() {
    assert_eq!(
        kinds("1if x"),
        vec![TokenKind::Numeric, TokenKind::KwIfMod, TokenKind::Ident]
    );
    assert_eq!(kinds("1rescue"), vec![TokenKind::Numeric, TokenKind::KwRescueMod]);
}

#[test]
fn test_method_call_on_integer() {
    assert_eq!(
        kinds("1.abs"),
        vec![TokenKind::Numeric, TokenKind::Dot, TokenKind::Ident]
    );
    assert_eq!(
        kinds("1..2"),
        vec![TokenKind::Numeric, TokenKind::Dot2, TokenKind::Numeric]
    );
}

#[test]
fn test_signs() {
    assert_eq!(kinds("-1"), vec![TokenKind::UMinusNum, TokenKind::Numeric]);
    let stream = scan("+1");
    assert_eq!(stream.tokens[0].kind, TokenKind::Numeric);
    assert_eq!(stream.tokens[0].span.start, 0);
    assert_eq!(numbers("+1"), vec![int(1)]);
    assert_eq!(
        kinds("a - 1"),
        vec![TokenKind::Ident, TokenKind::Minus, TokenKind::Numeric]
    );
}

#[test]
fn test_malformed_numbers() {
    let cases = [
        ("1_", "trailing `_' in number"),
        ("1__2", "trailing `_' in number"),
        ("0x", "numeric literal without digits"),
        ("08", "Invalid octal digit"),
        ("1e+", "trailing sign in number exponent"),
    ];
    for (source, message) in cases {
        assert_eq!(
            lex_error(source).kind,
            LexErrorKind::InvalidNumber(message),
            "{source}"
        );
    }
}

#[test]
fn test_leading_dot_float_is_rejected() {
    assert_eq!(
        lex_error(".5").kind,
        LexErrorKind::InvalidNumber("no .<digit> floating literal anymore; put 0 before dot")
    );
}

#[test]
fn test_float_out_of_range_warns() {
    let stream = scan("1e999");
    assert_eq!(stream.diagnostics.len(), 1);
    assert_eq!(stream.diagnostics[0].code, ErrorCode::W0004);
    assert_eq!(stream.diagnostics[0].message, "Float 1e999 out of range");
}

#[test]
fn test_gcd() {
    assert_eq!(gcd(125, 100), 25);
    assert_eq!(gcd(7, 0), 7);
    assert_eq!(gcd(0, 4), 4);
}
