use super::*;

#[test]
fn test_error_code_display() {
    assert_eq!(ErrorCode::E0001.to_string(), "E0001");
    assert_eq!(ErrorCode::W1001.as_str(), "W1001");
}

#[test]
fn test_phase_classification() {
    assert!(ErrorCode::E0003.is_lexer_error());
    assert!(!ErrorCode::E1001.is_lexer_error());
    assert!(ErrorCode::E1001.is_syntax_error());
    assert!(!ErrorCode::E1004.is_syntax_error());
    assert!(ErrorCode::W0001.is_warning());
    assert!(!ErrorCode::E1010.is_warning());
}
