//! Method calls, arguments, blocks and lambdas.

use super::{parse_with, reported, sexp};
use crate::ParserConfig;
use garnet_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

#[test]
fn test_call_with_every_argument_kind() {
    assert_eq!(
        sexp("foo(1, *a, **h, &b)"),
        "(stmts (call nil foo (int 1) (splat (vcall a)) (hash (kwsplat (vcall h))) \
         (block_pass (vcall b))))"
    );
}

#[test]
fn test_command_call() {
    assert_eq!(sexp("puts 1, 2"), "(stmts (call nil puts (int 1) (int 2)))");
}

#[test]
fn test_keyword_arguments_become_trailing_hash() {
    assert_eq!(
        sexp("foo(a: 1)"),
        "(stmts (call nil foo (hash (pair (sym a) (int 1)))))"
    );
    assert_eq!(
        sexp("foo 1, b: 2"),
        "(stmts (call nil foo (int 1) (hash (pair (sym b) (int 2)))))"
    );
}

#[test]
fn test_method_chain() {
    assert_eq!(
        sexp("a.b(1).c"),
        "(stmts (call (call (vcall a) b (int 1)) c))"
    );
    assert_eq!(sexp("a&.b"), "(stmts (csend (vcall a) b))");
}

#[test]
fn test_scoped_constant_then_call() {
    assert_eq!(
        sexp("Foo::Bar.baz"),
        "(stmts (call (const (const Foo) Bar) baz))"
    );
}

#[test]
fn test_index() {
    assert_eq!(
        sexp("a = [1]\na[0]"),
        "(stmts (lasgn a (array (int 1))) (call (lvar a) [] (int 0)))"
    );
}

#[test]
fn test_brace_block_with_params() {
    assert_eq!(
        sexp("foo { |x| x }"),
        "(stmts (call nil foo (block (params (arg x)) (lvar x))))"
    );
}

#[test]
fn test_do_block_on_method_call() {
    assert_eq!(
        sexp("foo.each do |a|\n  a\nend"),
        "(stmts (call (vcall foo) each (block (params (arg a)) (lvar a))))"
    );
}

#[test]
fn test_do_block_binds_to_command() {
    assert_eq!(
        sexp("foo 1 do\n  2\nend"),
        "(stmts (call nil foo (int 1) (block nil (int 2))))"
    );
}

#[test]
fn test_numbered_parameters() {
    assert_eq!(
        sexp("foo { _1 + _2 }"),
        "(stmts (call nil foo (block (numparams 2) (call (lvar _1) + (lvar _2)))))"
    );
}

#[test]
fn test_numbered_parameter_with_ordinary_parameters() {
    let program = parse_with("foo { |x| _1 }", ParserConfig::default());
    assert!(reported(&program, ErrorCode::E1007, "ordinary parameter is defined"));
}

#[test]
fn test_numbered_parameter_in_nested_blocks() {
    let outer = parse_with("foo { _1; bar { _1 } }", ParserConfig::default());
    assert!(reported(
        &outer,
        ErrorCode::E1008,
        "numbered parameter is already used in outer block"
    ));

    let inner = parse_with("foo { bar { _1 }; _1 }", ParserConfig::default());
    assert!(reported(
        &inner,
        ErrorCode::E1008,
        "numbered parameter is already used in inner block"
    ));
}

#[test]
fn test_assigning_numbered_parameter() {
    let program = parse_with("_1 = 1", ParserConfig::default());
    assert!(reported(
        &program,
        ErrorCode::E1009,
        "Can't assign to numbered parameter _1"
    ));
}

#[test]
fn test_block_param_shadowing_outer_local() {
    let program = parse_with("x = 1\nfoo { |x| x }\nx", ParserConfig::default());
    assert!(!program.has_errors());
    assert!(reported(
        &program,
        ErrorCode::W1002,
        "shadowing outer local variable - x"
    ));
}

#[test]
fn test_block_arg_and_literal_block() {
    let program = parse_with("foo(&b) { }", ParserConfig::default());
    assert!(reported(
        &program,
        ErrorCode::E1016,
        "both block arg and actual block given"
    ));
}

#[test]
fn test_lambda_literals() {
    assert_eq!(
        sexp("->(x) { x * 2 }"),
        "(stmts (lambda (params (arg x)) (call (lvar x) * (int 2))))"
    );
    assert_eq!(sexp("-> do 1 end"), "(stmts (lambda nil (int 1)))");
    assert_eq!(sexp("-> { _1 }"), "(stmts (lambda (numparams 1) (lvar _1)))");
}

#[test]
fn test_argument_forwarding() {
    assert_eq!(
        sexp("def m(...)\n  foo(...)\nend"),
        "(stmts (def m (params (forward_arg)) (call nil foo (forwarded_args))))"
    );
    let program = parse_with("def m\n  foo(...)\nend", ParserConfig::default());
    assert!(reported(&program, ErrorCode::E1017, "unexpected ..."));
}

#[test]
fn test_anonymous_block_forwarding() {
    assert_eq!(
        sexp("def m(&) = foo(&)"),
        "(stmts (def m (params (blockarg)) (call nil foo (block_pass)) endless))"
    );
    let program = parse_with("def m\n  foo(&)\nend", ParserConfig::default());
    assert!(reported(&program, ErrorCode::E1017, "no anonymous block parameter"));
}

#[test]
fn test_yield_and_zsuper() {
    assert_eq!(
        sexp("def m\n  yield 1\n  super\nend"),
        "(stmts (def m nil (stmts (yield (int 1)) (zsuper))))"
    );
}

#[test]
fn test_regexp_match_declares_named_captures() {
    assert_eq!(
        sexp("/(?<year>\\d+)/ =~ s\nyear"),
        r#"(stmts (match_with_lvasgn (regex "(?<year>\\d+)") (vcall s) year) (lvar year))"#
    );
}

#[test]
fn test_named_capture_conflicting_with_local_warns() {
    let program = parse_with("year = 1\n/(?<year>\\d+)/ =~ s\nyear", ParserConfig::default());
    assert!(!program.has_errors());
    assert!(reported(
        &program,
        ErrorCode::W1007,
        "named capture conflicts a local variable - year"
    ));

    let repeated = parse_with("/(?<y>.)/ =~ s\n/(?<y>.)/ =~ t\ny", ParserConfig::default());
    assert!(!repeated.diagnostics.iter().any(|d| d.code == ErrorCode::W1007));
}
