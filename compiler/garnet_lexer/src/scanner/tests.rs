use crate::test_helpers::{kinds, lex_error, name_text, scan};
use crate::{collect_tokens, LexErrorKind, Lexer, NoLocals, StrLines};
use garnet_diagnostic::ErrorCode;
use garnet_ir::{Span, TokenKind as K};
use pretty_assertions::assert_eq;

#[test]
fn test_newlines_end_statements() {
    assert_eq!(kinds("a\nb"), vec![K::Ident, K::Newline, K::Ident]);
    assert_eq!(kinds("a;b"), vec![K::Ident, K::Semi, K::Ident]);
}

#[test]
fn test_newline_after_operator_is_skipped() {
    assert_eq!(kinds("a +\nb"), vec![K::Ident, K::Plus, K::Ident]);
    assert_eq!(kinds("a,\nb"), vec![K::Ident, K::Comma, K::Ident]);
    assert_eq!(kinds("\n\na"), vec![K::Ident]);
}

#[test]
fn test_leading_dot_continues_the_line() {
    assert_eq!(kinds("foo\n  .bar"), vec![K::Ident, K::Dot, K::Ident]);
    assert_eq!(kinds("foo\n  &.bar"), vec![K::Ident, K::AndDot, K::Ident]);
    assert_eq!(
        kinds("foo\n  # note\n  .bar"),
        vec![K::Ident, K::Dot, K::Ident]
    );
    assert_eq!(kinds("foo\n..bar")[1], K::Newline);
}

#[test]
fn test_backslash_continues_the_line() {
    assert_eq!(kinds("a \\\n+ b"), vec![K::Ident, K::Plus, K::Ident]);
}

#[test]
fn test_embedded_document_is_skipped() {
    assert_eq!(kinds("=begin\nx y\n=end\nfoo"), vec![K::Ident]);
    assert_eq!(
        lex_error("=begin\nnever closed\n").kind,
        LexErrorKind::UnterminatedEmbdoc
    );
}

#[test]
fn test_end_marker_stops_scanning() {
    let mut lexer = Lexer::new(StrLines::new("foo\n__END__\nraw data\n"));
    let mut seen = Vec::new();
    loop {
        let Ok(token) = lexer.next_token(&NoLocals) else {
            panic!("unexpected error");
        };
        seen.push(token.kind);
        if token.kind == K::Eof {
            break;
        }
    }
    assert_eq!(seen, vec![K::Ident, K::Newline, K::Eof]);
    assert_eq!(lexer.data_offset(), Some(12));
}

#[test]
fn test_end_marker_must_stand_alone() {
    assert_eq!(kinds("__END__x"), vec![K::Ident]);
    assert_eq!(kinds("x __END__"), vec![K::Ident, K::Ident]);
}

#[test]
fn test_operators() {
    assert_eq!(
        kinds("a && b || c"),
        vec![K::Ident, K::AndOp, K::Ident, K::OrOp, K::Ident]
    );
    assert_eq!(
        kinds("a <=> b === c =~ d != e !~ f ** g"),
        vec![
            K::Ident,
            K::Cmp,
            K::Ident,
            K::Eqq,
            K::Ident,
            K::Match,
            K::Ident,
            K::Neq,
            K::Ident,
            K::NMatch,
            K::Ident,
            K::Pow,
            K::Ident,
        ]
    );
    assert_eq!(
        kinds("a <= b >= c >> d"),
        vec![K::Ident, K::Le, K::Ident, K::Ge, K::Ident, K::RShift, K::Ident]
    );
}

#[test]
fn test_operator_assignment_names() {
    for (source, op) in [("a += 1", "+"), ("a ||= 1", "||"), ("a <<= 1", "<<"), ("a **= 1", "**")] {
        let stream = scan(source);
        assert_eq!(stream.tokens[1].kind, K::OpAssign, "{source}");
        assert_eq!(name_text(&stream, &stream.tokens[1]), op, "{source}");
    }
}

#[test]
fn test_brackets() {
    assert_eq!(
        kinds("foo[1]"),
        vec![K::Ident, K::LBracketIndex, K::Numeric, K::RBracket]
    );
    assert_eq!(
        kinds("foo [1]"),
        vec![K::Ident, K::LBracket, K::Numeric, K::RBracket]
    );
    assert_eq!(kinds("[1]")[0], K::LBracket);
    assert_eq!(kinds("def []=(k, v) end")[1], K::Aset);
    assert_eq!(kinds("def [](k) end")[1], K::Aref);
}

#[test]
fn test_parentheses() {
    assert_eq!(kinds("foo(1)")[1], K::LParenCall);
    assert_eq!(kinds("foo (1)")[1], K::LParenArg);
    assert_eq!(kinds("(1)")[0], K::LParen);
}

#[test]
fn test_braces() {
    assert_eq!(kinds("{}"), vec![K::LBrace, K::RBrace]);
    assert_eq!(
        kinds("proc {||}"),
        vec![K::Ident, K::LBraceBlock, K::Pipe, K::Pipe, K::RBrace]
    );
}

#[test]
fn test_lambda_brace_when_marked() {
    let mut lexer = Lexer::new(StrLines::new("->(x) { x }"));
    let arrow = lexer.next_token(&NoLocals).map(|t| t.kind);
    assert_eq!(arrow, Ok(K::Arrow));
    let saved = lexer.begin_lambda();
    let mut kinds = Vec::new();
    for _ in 0..4 {
        if let Ok(token) = lexer.next_token(&NoLocals) {
            kinds.push(token.kind);
        }
    }
    lexer.end_lambda(saved);
    assert_eq!(kinds, vec![K::LParenCall, K::Ident, K::RParen, K::LambdaBeg]);
}

#[test]
fn test_colon_after_operand_is_not_a_symbol() {
    assert_eq!(kinds(":a :b"), vec![K::Symbol, K::Colon, K::Ident]);
}

#[test]
fn test_colons() {
    assert_eq!(kinds("A::B"), vec![K::Const, K::Colon2, K::Const]);
    assert_eq!(kinds("::B"), vec![K::Colon3, K::Const]);
    assert_eq!(
        kinds("a ? b : c"),
        vec![K::Ident, K::Question, K::Ident, K::Colon, K::Ident]
    );
}

#[test]
fn test_symbols() {
    let stream = scan("[:foo, :+, :[]=, :@iv, :$gv, :if, :Foo, :foo?, :setter=, :!@, :-@]");
    let names: Vec<_> = stream
        .tokens
        .iter()
        .filter(|t| t.kind == K::Symbol)
        .map(|t| name_text(&stream, t))
        .collect();
    assert_eq!(
        names,
        vec!["foo", "+", "[]=", "@iv", "$gv", "if", "Foo", "foo?", "setter=", "!", "-@"]
    );
}

#[test]
fn test_symbol_span_covers_colon() {
    let stream = scan(":abc");
    assert_eq!(stream.tokens[0].span, Span::new(0, 4));
}

#[test]
fn test_ampersand_forms() {
    assert_eq!(
        kinds("foo(&blk)"),
        vec![K::Ident, K::LParenCall, K::BlockAmper, K::Ident, K::RParen]
    );
    assert_eq!(kinds("a & b")[1], K::Amper);
    assert_eq!(kinds("a&.b")[1], K::AndDot);
}

#[test]
fn test_splats() {
    assert_eq!(kinds("*a = b")[0], K::Splat);
    assert_eq!(kinds("**h")[0], K::DSplat);
    assert_eq!(kinds("a * b")[1], K::Star);
}

#[test]
fn test_argument_prefix_warnings() {
    let stream = scan("foo *args");
    assert_eq!(stream.tokens[1].kind, K::Splat);
    assert_eq!(stream.diagnostics.len(), 1);
    assert_eq!(
        stream.diagnostics[0].message,
        "`*' interpreted as argument prefix"
    );

    let stream = scan("foo -1");
    assert_eq!(stream.tokens[1].kind, K::UMinusNum);
    assert_eq!(
        stream.diagnostics[0].message,
        "ambiguous first argument; put parentheses or a space even after `-' operator"
    );
}

#[test]
fn test_ranges() {
    assert_eq!(kinds("1..2"), vec![K::Numeric, K::Dot2, K::Numeric]);
    assert_eq!(kinds("1...2"), vec![K::Numeric, K::Dot3, K::Numeric]);
    assert_eq!(kinds("..2"), vec![K::BDot2, K::Numeric]);
}

#[test]
fn test_spans_and_spacing() {
    let stream = scan("foo  bar");
    assert_eq!(stream.tokens[0].span, Span::new(0, 3));
    assert_eq!(stream.tokens[1].span, Span::new(5, 8));
    assert!(!stream.tokens[0].space_before);
    assert!(stream.tokens[1].space_before);
    assert_eq!(stream.tokens[2].kind, K::Eof);
}

#[test]
fn test_invalid_character() {
    assert_eq!(
        lex_error("a \u{1}").kind,
        LexErrorKind::InvalidCharacter("\\x01".to_owned())
    );
}

#[test]
fn test_magic_comments_are_applied() {
    let mut lexer = Lexer::new(StrLines::new("# frozen_string_literal: true\nx\n"));
    while lexer.next_token(&NoLocals).is_ok_and(|t| t.kind != K::Eof) {}
    assert_eq!(lexer.magic().frozen_string_literal, Some(true));
    assert!(lexer.take_diagnostics().is_empty());
}

#[test]
fn test_late_frozen_string_literal_is_ignored() {
    let stream = scan("x\n# frozen_string_literal: true\n");
    assert_eq!(stream.diagnostics.len(), 1);
    assert_eq!(stream.diagnostics[0].code, ErrorCode::W0002);
}

#[test]
fn test_nesting_limit() {
    let lexer = Lexer::with_max_nesting(StrLines::new(r##""#{"#{"#{x}"}"}""##), 2);
    let Err(err) = collect_tokens(lexer) else {
        panic!("nesting limit was not enforced");
    };
    assert_eq!(err.kind, LexErrorKind::NestingTooDeep { limit: 2 });
}

#[test]
fn test_eof_repeats() {
    let mut lexer = Lexer::new(StrLines::new("x"));
    let kinds: Vec<_> = (0..3)
        .filter_map(|_| lexer.next_token(&NoLocals).ok())
        .map(|t| t.kind)
        .collect();
    assert_eq!(kinds, vec![K::Ident, K::Eof, K::Eof]);
}
