use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_unexpected_with_expected_list() {
    let token = Token::simple(TokenKind::Eof, Span::new(10, 10));
    let err = ParseError::unexpected(&token, TokenSet::single(TokenKind::KwEnd));
    assert_eq!(err.message, "syntax error, unexpected end-of-input, expecting `end'");
    assert_eq!(err.code, ErrorCode::E1001);
    assert_eq!(err.to_string(), err.message);
}

#[test]
fn test_unexpected_without_expected_list() {
    let err = ParseError::unexpected_kind(TokenKind::KwEnd, Span::new(0, 3), TokenSet::new());
    assert_eq!(err.message, "syntax error, unexpected `end'");
}

#[test]
fn test_into_diagnostic() {
    let diag = ParseError::syntax("syntax error, unexpected ')'", Span::new(4, 5)).into_diagnostic();
    assert!(diag.is_error());
    assert!(!diag.is_fatal());
    assert_eq!(diag.primary_span(), Some(Span::new(4, 5)));
    assert_eq!(diag.code, ErrorCode::E1001);
}
