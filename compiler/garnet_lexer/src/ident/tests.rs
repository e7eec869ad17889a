use super::is_numbered_param;
use crate::test_helpers::{kinds, lex_error, name_text, scan};
use crate::{LexErrorKind, Lexer, NoLocals, StrLines};
use garnet_diagnostic::ErrorCode;
use garnet_ir::TokenKind as K;
use pretty_assertions::assert_eq;
use rustc_hash::FxHashSet;

#[test]
fn test_identifier_kinds() {
    assert_eq!(
        kinds("foo Foo foo? bar! café"),
        vec![K::Ident, K::Const, K::FIdent, K::FIdent, K::Ident]
    );
}

#[test]
fn test_bang_before_equals_is_an_operator() {
    assert_eq!(kinds("foo!= 1"), vec![K::Ident, K::Neq, K::Numeric]);
}

#[test]
fn test_setter_name_after_def() {
    let stream = scan("def foo=(v) end");
    assert_eq!(stream.tokens[1].kind, K::Ident);
    assert_eq!(name_text(&stream, &stream.tokens[1]), "foo=");
    assert_eq!(stream.tokens[2].kind, K::LParenCall);
}

#[test]
fn test_setter_name_not_taken_before_equality() {
    let stream = scan("def foo==(v) end");
    assert_eq!(name_text(&stream, &stream.tokens[1]), "foo");
    assert_eq!(stream.tokens[2].kind, K::Eq);
}

#[test]
fn test_keyword_as_method_name() {
    let stream = scan("def end; end");
    assert_eq!(stream.tokens[1].kind, K::KwEnd);
    assert_eq!(name_text(&stream, &stream.tokens[1]), "end");
    assert_eq!(stream.tokens[2].kind, K::Semi);
}

#[test]
fn test_keyword_after_dot_is_identifier() {
    assert_eq!(kinds("foo.class"), vec![K::Ident, K::Dot, K::Ident]);
}

#[test]
fn test_modifier_keywords() {
    assert_eq!(kinds("x if y"), vec![K::Ident, K::KwIfMod, K::Ident]);
    assert_eq!(
        kinds("if x then y end"),
        vec![K::KwIf, K::Ident, K::KwThen, K::Ident, K::KwEnd]
    );
    assert_eq!(
        kinds("x rescue y"),
        vec![K::Ident, K::KwRescueMod, K::Ident]
    );
    assert_eq!(kinds("while x do end")[2], K::KwDo);
}

#[test]
fn test_labels() {
    assert_eq!(
        kinds("foo(a: 1)"),
        vec![K::Ident, K::LParenCall, K::Label, K::Numeric, K::RParen]
    );
    assert_eq!(kinds("foo a: 1"), vec![K::Ident, K::Label, K::Numeric]);
    assert_eq!(
        kinds("foo(a::B)"),
        vec![K::Ident, K::LParenCall, K::Ident, K::Colon2, K::Const, K::RParen]
    );
}

#[test]
fn test_label_name_excludes_colon() {
    let stream = scan("f(key: 1)");
    assert_eq!(name_text(&stream, &stream.tokens[2]), "key");
    assert_eq!(stream.tokens[2].span.end, 6);
}

#[test]
fn test_variables() {
    assert_eq!(
        kinds("@foo @@bar $baz $1 $& $_ $-w $0 $~"),
        vec![
            K::IVar,
            K::CVar,
            K::GVar,
            K::NthRef,
            K::BackRef,
            K::GVar,
            K::GVar,
            K::GVar,
            K::GVar,
        ]
    );
}

#[test]
fn test_back_reference_is_global_in_method_name_position() {
    assert_eq!(kinds("alias $& $a"), vec![K::KwAlias, K::GVar, K::GVar]);
    assert_eq!(kinds("alias $a $&"), vec![K::KwAlias, K::GVar, K::BackRef]);
}

#[test]
fn test_huge_nth_ref_warns() {
    let stream = scan("$99999999999");
    assert_eq!(stream.tokens[0].kind, K::NthRef);
    assert_eq!(stream.diagnostics[0].code, ErrorCode::W0001);
}

#[test]
fn test_invalid_variable_names() {
    let cases = [
        ("@1", "`@1' is not allowed as an instance variable name"),
        ("@@", "`@@' without identifiers is not allowed as a class variable name"),
        ("$", "`$' without identifiers is not allowed as a global variable name"),
        ("$%", "`$%' is not allowed as a global variable name"),
    ];
    for (source, message) in cases {
        assert_eq!(
            lex_error(source).kind,
            LexErrorKind::InvalidVariableName(message.to_owned()),
            "{source}"
        );
    }
}

#[test]
fn test_local_variable_changes_following_minus() {
    assert_eq!(kinds("x -1"), vec![K::Ident, K::UMinusNum, K::Numeric]);

    let mut lexer = Lexer::new(StrLines::new("x -1"));
    let mut locals = FxHashSet::default();
    locals.insert(lexer.interner_mut().intern("x"));
    let first = lexer.next_token(&locals).map(|t| t.kind);
    let second = lexer.next_token(&locals).map(|t| t.kind);
    assert_eq!(first, Ok(K::LocalIdent));
    assert_eq!(second, Ok(K::Minus));
}

#[test]
fn test_numbered_parameters() {
    assert!(is_numbered_param(b"_1"));
    assert!(is_numbered_param(b"_9"));
    assert!(!is_numbered_param(b"_0"));
    assert!(!is_numbered_param(b"_10"));
    let mut lexer = Lexer::new(StrLines::new("_1"));
    assert_eq!(lexer.next_token(&NoLocals).map(|t| t.kind), Ok(K::LocalIdent));
}
