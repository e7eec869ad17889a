#![allow(clippy::disallowed_types, reason = "proptest macros internally use Arc")]

use super::{dedent_width, line_indent};
use crate::test_helpers::{contents, kinds, lex_error, scan};
use crate::LexErrorKind;
use garnet_ir::{TokenKind as K, TokenValue};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_plain_heredoc() {
    let source = "x = <<EOS\nhello\nEOS\n";
    assert_eq!(
        kinds(source),
        vec![
            K::Ident,
            K::Assign,
            K::StringBeg,
            K::StringContent,
            K::StringEnd,
            K::Newline,
        ]
    );
    assert_eq!(contents(source), vec![b"hello\n".to_vec()]);
}

#[test]
fn test_rest_of_opening_line_resumes() {
    let source = "foo(<<A, <<B)\na\nA\nb\nB\nbar\n";
    assert_eq!(
        kinds(source),
        vec![
            K::Ident,
            K::LParenCall,
            K::StringBeg,
            K::StringContent,
            K::StringEnd,
            K::Comma,
            K::StringBeg,
            K::StringContent,
            K::StringEnd,
            K::RParen,
            K::Newline,
            K::Ident,
            K::Newline,
        ]
    );
    assert_eq!(contents(source), vec![b"a\n".to_vec(), b"b\n".to_vec()]);
}

#[test]
fn test_method_call_after_heredoc_opener() {
    assert_eq!(
        kinds("<<EOS.strip\n x\nEOS\n"),
        vec![
            K::StringBeg,
            K::StringContent,
            K::StringEnd,
            K::Dot,
            K::Ident,
            K::Newline,
        ]
    );
}

#[test]
fn test_squiggly_heredoc_reports_indent() {
    let stream = scan("<<~EOS\n    a\n\n      b\n    EOS\n");
    let end = stream
        .tokens
        .iter()
        .find(|t| t.kind == K::StringEnd)
        .map(|t| t.value.clone());
    assert_eq!(end, Some(TokenValue::Dedent(4)));
    assert_eq!(
        contents("<<~EOS\n    a\n\n      b\n    EOS\n"),
        vec![b"    a\n".to_vec(), b"\n".to_vec(), b"      b\n".to_vec()]
    );
}

#[test]
fn test_dash_heredoc_allows_indented_terminator() {
    let stream = scan("<<-EOS\n  x\n  EOS\n");
    let end = stream.tokens.iter().find(|t| t.kind == K::StringEnd);
    assert_eq!(end.map(|t| t.value.clone()), Some(TokenValue::None));
    assert_eq!(contents("<<-EOS\n  x\n  EOS\n"), vec![b"  x\n".to_vec()]);
}

#[test]
fn test_plain_heredoc_needs_terminator_at_column_zero() {
    assert_eq!(
        lex_error("<<EOS\n  EOS\n").kind,
        LexErrorKind::UnterminatedHeredoc { id: "EOS".into() }
    );
}

#[test]
fn test_single_quoted_heredoc_is_raw() {
    assert_eq!(
        contents("<<'EOS'\n#{x}\\n\nEOS\n"),
        vec![b"#{x}\\n\n".to_vec()]
    );
}

#[test]
fn test_heredoc_interpolation() {
    assert_eq!(
        kinds("<<EOS\na#{b}c\nEOS\n"),
        vec![
            K::StringBeg,
            K::StringContent,
            K::StringDBeg,
            K::Ident,
            K::StringDEnd,
            K::StringContent,
            K::StringEnd,
            K::Newline,
        ]
    );
}

#[test]
fn test_backtick_heredoc() {
    assert_eq!(kinds("<<`CMD`\nls\nCMD\n")[0], K::XStringBeg);
}

#[test]
fn test_shift_is_not_a_heredoc() {
    assert_eq!(kinds("1 << 2"), vec![K::Numeric, K::LShift, K::Numeric]);
}

#[test]
fn test_unterminated_heredoc() {
    let err = lex_error("x = <<EOS\nabc\n");
    assert_eq!(err.kind, LexErrorKind::UnterminatedHeredoc { id: "EOS".into() });
    assert_eq!(err.span.start, 4);
}

#[test]
fn test_unterminated_identifier() {
    assert_eq!(
        lex_error("<<\"EOS\nx\n").kind,
        LexErrorKind::UnterminatedHeredocIdentifier
    );
}

#[test]
fn test_line_indent() {
    assert_eq!(line_indent(b"  x\n"), Some(2));
    assert_eq!(line_indent(b"\tx"), Some(8));
    assert_eq!(line_indent(b"  \tx"), Some(8));
    assert_eq!(line_indent(b"   \n"), None);
    assert_eq!(line_indent(b""), None);
}

#[test]
fn test_dedent_width_with_tabs() {
    assert_eq!(dedent_width(b"    x", 2), 2);
    assert_eq!(dedent_width(b"\tx", 8), 1);
    assert_eq!(dedent_width(b"\tx", 4), 0);
    assert_eq!(dedent_width(b"  \tx", 8), 3);
    assert_eq!(dedent_width(b" x", 4), 1);
}

proptest! {
    #[test]
    fn prop_dedent_by_own_indent_strips_all_spaces(spaces in 0usize..16, word in "[a-z]{1,6}") {
        let line = format!("{}{word}\n", " ".repeat(spaces));
        let indent = line_indent(line.as_bytes());
        prop_assert_eq!(indent, Some(spaces as u32));
        prop_assert_eq!(dedent_width(line.as_bytes(), spaces as u32), spaces);
    }

    #[test]
    fn prop_dedent_never_strips_text(line in "[ \t]{0,8}[a-z]{0,4}", width in 0u32..20) {
        let strip = dedent_width(line.as_bytes(), width);
        prop_assert!(line.as_bytes()[..strip].iter().all(|b| *b == b' ' || *b == b'\t'));
    }
}
