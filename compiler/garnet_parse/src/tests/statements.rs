//! Assignment, conditionals, loops, `case` and `begin`/`rescue`.

use super::{codes, parse_with, reported, sexp};
use crate::ParserConfig;
use garnet_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

#[test]
fn test_local_assignment_then_read() {
    assert_eq!(sexp("a = 1\na"), "(stmts (lasgn a (int 1)) (lvar a))");
}

#[test]
fn test_identifier_is_a_call_until_assigned() {
    assert_eq!(
        sexp("foo\nfoo = 1\nfoo"),
        "(stmts (vcall foo) (lasgn foo (int 1)) (lvar foo))"
    );
}

#[test]
fn test_statement_level_assignment_collects_array() {
    assert_eq!(
        sexp("a = 1, 2"),
        "(stmts (lasgn a (array (int 1) (int 2))))"
    );
}

#[test]
fn test_multiple_assignment() {
    assert_eq!(
        sexp("a, b = 1, 2"),
        "(stmts (masgn (mlhs (lasgn a) (lasgn b)) (array (int 1) (int 2))))"
    );
}

#[test]
fn test_multiple_assignment_with_splat_target() {
    assert_eq!(
        sexp("a, *b = c"),
        "(stmts (masgn (mlhs (lasgn a) (splat (lasgn b))) (vcall c)))"
    );
}

#[test]
fn test_nested_target_list() {
    assert_eq!(
        sexp("(a, b), c = d"),
        "(stmts (masgn (mlhs (mlhs (lasgn a) (lasgn b)) (lasgn c)) (vcall d)))"
    );
}

#[test]
fn test_multiple_assignment_inside_parentheses() {
    assert_eq!(
        sexp("(a, b = 1, 2)\na"),
        "(stmts (masgn (mlhs (lasgn a) (lasgn b)) (array (int 1) (int 2))) (lvar a))"
    );
    assert_eq!(
        sexp("(*a, b = c; b)"),
        "(stmts (stmts (masgn (mlhs (splat (lasgn a)) (lasgn b)) (vcall c)) (lvar b)))"
    );
}

#[test]
fn test_attribute_and_index_assignment() {
    assert_eq!(
        sexp("obj.name = 1"),
        "(stmts (attrasgn (vcall obj) name= (int 1)))"
    );
    assert_eq!(
        sexp("a = [1]\na[0] = 2"),
        "(stmts (lasgn a (array (int 1))) (attrasgn (lvar a) []= (int 0) (int 2)))"
    );
}

#[test]
fn test_operator_assignment() {
    assert_eq!(sexp("x ||= 1"), "(stmts (or_asgn (lasgn x) (int 1)))");
    assert_eq!(sexp("x &&= 1"), "(stmts (and_asgn (lasgn x) (int 1)))");
    assert_eq!(sexp("x += 1"), "(stmts (op_asgn (lasgn x) + (int 1)))");
}

#[test]
fn test_binary_precedence() {
    assert_eq!(
        sexp("1 + 2 * 3"),
        "(stmts (call (int 1) + (call (int 2) * (int 3))))"
    );
    assert_eq!(
        sexp("a && b || c"),
        "(stmts (or (and (vcall a) (vcall b)) (vcall c)))"
    );
}

#[test]
fn test_keyword_logic() {
    assert_eq!(
        sexp("a and not b"),
        "(stmts (and (vcall a) (not (vcall b))))"
    );
}

#[test]
fn test_ranges() {
    assert_eq!(sexp("1..2"), "(stmts (irange (int 1) (int 2)))");
    assert_eq!(sexp("1..."), "(stmts (erange (int 1) nil))");
}

#[test]
fn test_ternary() {
    assert_eq!(sexp("a ? 1 : 2"), "(stmts (if (vcall a) (int 1) (int 2)))");
}

#[test]
fn test_if_elsif_else() {
    let source = "if a\n  1\nelsif b\n  2\nelse\n  3\nend";
    assert_eq!(
        sexp(source),
        "(stmts (if (vcall a) (int 1) (if (vcall b) (int 2) (int 3))))"
    );
}

#[test]
fn test_unless_swaps_branches() {
    assert_eq!(
        sexp("unless a then 1 else 2 end"),
        "(stmts (if (vcall a) (int 2) (int 1)))"
    );
}

#[test]
fn test_modifiers() {
    assert_eq!(sexp("x if y"), "(stmts (if (vcall y) (vcall x) nil))");
    assert_eq!(sexp("x unless y"), "(stmts (if (vcall y) nil (vcall x)))");
    assert_eq!(sexp("x while y"), "(stmts (while (vcall y) (vcall x)))");
    assert_eq!(sexp("x until y"), "(stmts (until (vcall y) (vcall x)))");
    assert_eq!(
        sexp("x = 1 if y"),
        "(stmts (if (vcall y) (lasgn x (int 1)) nil))"
    );
}

#[test]
fn test_begin_while_runs_body_first() {
    assert_eq!(
        sexp("begin\n  x\nend while y"),
        "(stmts (while_post (vcall y) (begin (vcall x))))"
    );
}

#[test]
fn test_while_and_until_loops() {
    assert_eq!(sexp("while a\n  b\nend"), "(stmts (while (vcall a) (vcall b)))");
    assert_eq!(sexp("until a; b; end"), "(stmts (until (vcall a) (vcall b)))");
    assert_eq!(sexp("while a do b end"), "(stmts (while (vcall a) (vcall b)))");
}

#[test]
fn test_for_loop() {
    assert_eq!(
        sexp("for i in [1, 2]\n  i\nend"),
        "(stmts (for (lasgn i) (array (int 1) (int 2)) (lvar i)))"
    );
    assert_eq!(
        sexp("for a, b in x; end"),
        "(stmts (for (mlhs (lasgn a) (lasgn b)) (vcall x) nil))"
    );
}

#[test]
fn test_case_when() {
    let source = "case x\nwhen 1, 2 then :a\nwhen *list then :b\nelse :c\nend";
    assert_eq!(
        sexp(source),
        "(stmts (case (vcall x) (when (int 1) (int 2) (sym a)) \
         (when (splat (vcall list)) (sym b)) (sym c)))"
    );
}

#[test]
fn test_case_without_subject() {
    assert_eq!(
        sexp("case\nwhen a then 1\nend"),
        "(stmts (case nil (when (vcall a) (int 1)) nil))"
    );
    assert_eq!(
        sexp("case when a then 1 when b then 2 end"),
        "(stmts (case nil (when (vcall a) (int 1)) (when (vcall b) (int 2)) nil))"
    );
}

#[test]
fn test_duplicate_when_warns() {
    let program = parse_with("case x\nwhen 1 then a\nwhen 1 then b\nend", ParserConfig::default());
    assert!(!program.has_errors());
    assert!(reported(
        &program,
        ErrorCode::W1004,
        "`when' clause on line 3 duplicates `when' clause on line 2 and is ignored"
    ));
}

#[test]
fn test_begin_rescue_ensure() {
    let source = "begin\n  a\nrescue Foo => e\n  b\nensure\n  c\nend";
    assert_eq!(
        sexp(source),
        "(stmts (begin (ensure (rescue (vcall a) (resbody ((const Foo)) (lasgn e) (vcall b)) nil) \
         (vcall c))))"
    );
}

#[test]
fn test_bare_rescue_with_else() {
    let source = "begin\n  a\nrescue\n  b\nelse\n  c\nend";
    assert_eq!(
        sexp(source),
        "(stmts (begin (rescue (vcall a) (resbody () nil (vcall b)) (vcall c))))"
    );
}

#[test]
fn test_rescue_modifier() {
    assert_eq!(sexp("a rescue b"), "(stmts (rescue_mod (vcall a) (vcall b)))");
}

#[test]
fn test_retry_inside_rescue_is_accepted() {
    let source = "begin\n  a\nrescue\n  retry\nend";
    assert_eq!(
        sexp(source),
        "(stmts (begin (rescue (vcall a) (resbody () nil (retry)) nil)))"
    );
}

#[test]
fn test_retry_outside_rescue() {
    let program = parse_with("retry", ParserConfig::default());
    assert!(reported(&program, ErrorCode::E1014, "Invalid retry without rescue"));
}

#[test]
fn test_invalid_assignment_targets() {
    let program = parse_with("nil = 1\nself = 2", ParserConfig::default());
    assert!(reported(&program, ErrorCode::E1003, "Can't assign to nil"));
    assert!(reported(&program, ErrorCode::E1003, "Can't change the value of self"));
    assert!(program.root.is_some());
}

#[test]
fn test_unused_variable_warnings() {
    let program = parse_with("x = 1\ndef m\n  y = 2\nend", ParserConfig::default());
    assert!(!program.has_errors());
    assert!(reported(&program, ErrorCode::W1001, "assigned but unused variable - x"));
    assert!(reported(&program, ErrorCode::W1001, "assigned but unused variable - y"));

    let quiet = parse_with(
        "_x = 1",
        ParserConfig::default(),
    );
    assert_eq!(codes(&quiet), vec![]);
}

#[test]
fn test_void_context_warning() {
    let program = parse_with("1\n2", ParserConfig::default());
    assert_eq!(codes(&program), vec![ErrorCode::W1003]);
}

#[test]
fn test_line_offset_shifts_line_numbers() {
    let config = ParserConfig {
        line_offset: 10,
        ..ParserConfig::default()
    };
    let program = parse_with("\n\n__LINE__", config);
    assert_eq!(super::render(&program), "(stmts (__LINE__ 12))");
    assert_eq!(sexp("\n\n__LINE__"), "(stmts (__LINE__ 3))");
}
