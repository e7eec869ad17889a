//! Method, class and module definitions, `alias` and `undef`.

use super::{parse_quiet, parse_with, render, reported, sexp};
use crate::ParserConfig;
use garnet_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

fn assert_reports(source: &str, code: ErrorCode, message: &str) {
    let program = parse_with(source, ParserConfig::default());
    assert!(
        reported(&program, code, message),
        "expected {code}: {message} for {source:?}, got {:?}",
        super::messages(&program)
    );
}

#[test]
fn test_every_parameter_kind() {
    assert_eq!(
        sexp("def m(a, b = 1, *c, d, e:, f: 2, **g, &h)\nend"),
        "(stmts (def m (params (arg a) (optarg b (int 1)) (restarg c) (arg d) (kwarg e) \
         (kwoptarg f (int 2)) (kwrestarg g) (blockarg h)) nil))"
    );
}

#[test]
fn test_parameters_without_parentheses() {
    assert_eq!(
        sexp("def m a, b\n  a\nend"),
        "(stmts (def m (params (arg a) (arg b)) (lvar a)))"
    );
}

#[test]
fn test_endless_method() {
    assert_eq!(
        sexp("def sq(x) = x * x"),
        "(stmts (def sq (params (arg x)) (call (lvar x) * (lvar x)) endless))"
    );
}

#[test]
fn test_endless_setter_is_rejected() {
    assert_reports(
        "def foo=(x) = 1",
        ErrorCode::E1001,
        "setter method cannot be defined in an endless method definition",
    );
}

#[test]
fn test_singleton_method() {
    assert_eq!(sexp("def self.foo; end"), "(stmts (defs (self) foo nil nil))");
}

#[test]
fn test_class_with_superclass() {
    assert_eq!(
        sexp("class Foo < Bar\n  def x; end\nend"),
        "(stmts (class (const Foo) (const Bar) (def x nil nil)))"
    );
}

#[test]
fn test_singleton_class() {
    assert_eq!(
        sexp("class << self\n  def x; end\nend"),
        "(stmts (sclass (self) (def x nil nil)))"
    );
}

#[test]
fn test_module_with_scoped_name() {
    assert_eq!(
        sexp("module A::B; end"),
        "(stmts (module (const (const A) B) nil))"
    );
}

#[test]
fn test_alias_and_undef() {
    assert_eq!(sexp("alias foo bar"), "(stmts (alias (sym foo) (sym bar)))");
    assert_eq!(sexp("alias $a $b"), "(stmts (alias (gvar $a) (gvar $b)))");
    assert_eq!(sexp("undef a, :b"), "(stmts (undef (sym a) (sym b)))");
}

#[test]
fn test_begin_and_end_blocks() {
    assert_eq!(sexp("BEGIN { 1 }"), "(stmts (preexe (int 1)))");
    assert_eq!(sexp("END { 1 }"), "(stmts (postexe (int 1)))");
}

#[test]
fn test_duplicated_argument() {
    assert_reports("def m(a, a); end", ErrorCode::E1004, "duplicated argument name");
}

#[test]
fn test_underscore_arguments_may_repeat() {
    let program = parse_with("def m(_, _); end", ParserConfig::default());
    assert!(!program.has_errors());
}

#[test]
fn test_dynamic_constant_assignment() {
    assert_reports(
        "def m\n  Foo = 1\nend",
        ErrorCode::E1005,
        "dynamic constant assignment",
    );
}

#[test]
fn test_circular_argument_reference() {
    assert_reports(
        "def m(a = a); end",
        ErrorCode::E1006,
        "circular argument reference - a",
    );
}

#[test]
fn test_numbered_parameter_name_as_argument() {
    assert_reports(
        "def m(_1); end",
        ErrorCode::E1009,
        "_1 is reserved for numbered parameter",
    );
}

#[test]
fn test_parameter_order() {
    assert_reports(
        "def m(*a, b = 1); end",
        ErrorCode::E1013,
        "unexpected optional argument",
    );
}

#[test]
fn test_misordered_parameters_keep_written_order() {
    let program = parse_quiet("def m(*a, *b); end");
    assert!(reported(&program, ErrorCode::E1013, "unexpected rest argument"));
    assert_eq!(
        render(&program),
        "(stmts (def m (params (restarg a) (restarg b)) nil))"
    );

    let program = parse_quiet("def m(a, *r, b = 1); end");
    assert!(reported(&program, ErrorCode::E1013, "unexpected optional argument"));
    assert_eq!(
        render(&program),
        "(stmts (def m (params (arg a) (restarg r) (optarg b (int 1))) nil))"
    );
}

#[test]
fn test_class_definition_in_method_body() {
    assert_reports(
        "def m\n  class Foo; end\nend",
        ErrorCode::E1015,
        "class definition in method body",
    );
    assert_reports(
        "def m\n  module Foo; end\nend",
        ErrorCode::E1015,
        "module definition in method body",
    );
}

#[test]
fn test_class_name_must_be_constant() {
    assert_reports(
        "class foo; end",
        ErrorCode::E1001,
        "class/module name must be CONSTANT",
    );
}

#[test]
fn test_return_in_class_body() {
    assert_reports(
        "class Foo\n  return\nend",
        ErrorCode::E1018,
        "Invalid return in class/module body",
    );
    let program = parse_with("class Foo\n  def m\n    return\n  end\nend", ParserConfig::default());
    assert!(!program.has_errors());
}

#[test]
fn test_formal_argument_kinds() {
    assert_reports(
        "def m(Foo); end",
        ErrorCode::E1020,
        "formal argument cannot be a constant",
    );
    assert_reports(
        "def m(@a); end",
        ErrorCode::E1020,
        "formal argument cannot be an instance variable",
    );
}
