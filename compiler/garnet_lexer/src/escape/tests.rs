use crate::test_helpers::{contents, lex_error};
use crate::LexErrorKind;
use pretty_assertions::assert_eq;

#[test]
fn test_single_character_escapes() {
    assert_eq!(
        contents(r#""a\tb\n\s\e\0""#),
        vec![b"a\tb\n \x1b\0".to_vec()]
    );
}

#[test]
fn test_octal_and_hex() {
    assert_eq!(contents(r#""\101\x41\x4a\7""#), vec![b"AAJ\x07".to_vec()]);
}

#[test]
fn test_meta_and_control() {
    assert_eq!(contents(r#""\M-a""#), vec![vec![0xe1]]);
    assert_eq!(contents(r#""\C-a\ca""#), vec![vec![0x01, 0x01]]);
    assert_eq!(contents(r#""\c?""#), vec![vec![0x7f]]);
    assert_eq!(contents(r#""\M-\C-a""#), vec![vec![0x81]]);
}

#[test]
fn test_unicode_escapes() {
    assert_eq!(
        contents(r#""é\u{1F600 41}""#),
        vec!["é😀A".as_bytes().to_vec()]
    );
}

#[test]
fn test_unknown_escape_is_the_character() {
    assert_eq!(contents(r#""\q\"""#), vec![b"q\"".to_vec()]);
}

#[test]
fn test_single_quotes_keep_backslashes() {
    assert_eq!(contents(r"'a\nb\'c\\'"), vec![b"a\\nb'c\\".to_vec()]);
}

#[test]
fn test_escaped_newline_joins_lines() {
    assert_eq!(contents("\"ab\\\ncd\""), vec![b"abcd".to_vec()]);
}

#[test]
fn test_invalid_hex_escape() {
    assert_eq!(
        lex_error(r#""\xg""#).kind,
        LexErrorKind::InvalidEscape("invalid hex escape")
    );
}

#[test]
fn test_duplicate_meta_escape() {
    assert_eq!(
        lex_error(r#""\M-\M-a""#).kind,
        LexErrorKind::InvalidEscape("duplicate meta escape")
    );
}

#[test]
fn test_invalid_unicode_escapes() {
    assert_eq!(
        lex_error(r#""\u12""#).kind,
        LexErrorKind::InvalidUnicodeEscape("invalid Unicode escape")
    );
    assert_eq!(
        lex_error(r#""\u{110000}""#).kind,
        LexErrorKind::InvalidUnicodeEscape("invalid Unicode codepoint (too large)")
    );
    assert_eq!(
        lex_error(r#""\u{41 zz}""#).kind,
        LexErrorKind::InvalidUnicodeEscape("invalid Unicode list")
    );
    assert_eq!(
        lex_error(r#""\u{D800}""#).kind,
        LexErrorKind::InvalidUnicodeEscape("invalid Unicode codepoint")
    );
}

#[test]
fn test_character_literals() {
    assert_eq!(contents("?a"), vec![b"a".to_vec()]);
    assert_eq!(contents(r"?\n"), vec![b"\n".to_vec()]);
    assert_eq!(contents("?é"), vec!["é".as_bytes().to_vec()]);
}
