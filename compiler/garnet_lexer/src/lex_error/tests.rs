use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_unterminated_messages() {
    let err = LexError::new(
        LexErrorKind::UnterminatedString {
            kind: LiteralKind::String,
            delimiter: '"',
        },
        Span::new(0, 4),
    );
    assert_eq!(err.to_string(), "unterminated string meets end of file");
    let err = LexErrorKind::UnterminatedHeredoc { id: "EOS".into() };
    assert_eq!(err.to_string(), "can't find string \"EOS\" anywhere before EOF");
}

#[test]
fn test_codes_by_kind() {
    let regexp = LexErrorKind::UnterminatedString {
        kind: LiteralKind::Regexp,
        delimiter: '/',
    };
    assert_eq!(regexp.code(), ErrorCode::E0003);
    assert_eq!(LexErrorKind::InvalidMultibyte.code(), ErrorCode::E0012);
    assert_eq!(
        LexErrorKind::NestingTooDeep { limit: 4 }.code(),
        ErrorCode::E0011
    );
}

#[test]
fn test_into_diagnostic_is_fatal() {
    let diag = LexError::new(LexErrorKind::InvalidNumber("trailing `_' in number"), Span::new(2, 5))
        .into_diagnostic();
    assert!(diag.is_fatal());
    assert_eq!(diag.code, ErrorCode::E0006);
    assert_eq!(diag.message, "trailing `_' in number");
    assert_eq!(diag.primary_span(), Some(Span::new(2, 5)));
}
