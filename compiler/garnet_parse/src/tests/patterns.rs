//! Pattern matching: `case`/`in`, `expr => pattern` and `expr in pattern`.

use super::{parse_with, reported, sexp};
use crate::ParserConfig;
use garnet_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

/// The pattern and body of a one-clause `case x; in ...; end`.
fn clause(source: &str) -> String {
    let full = sexp(source);
    let prefix = "(stmts (case_match (vcall x) ";
    assert!(full.starts_with(prefix), "unexpected tree {full}");
    full[prefix.len()..].to_string()
}

#[test]
fn test_array_pattern() {
    assert_eq!(
        clause("case x\nin [1, a] then a\nend"),
        "(in (array_pattern nil (int 1) (match_var a)) nil (lvar a)) nil))"
    );
}

#[test]
fn test_array_pattern_without_brackets() {
    assert_eq!(
        clause("case x\nin a, *rest then rest\nend"),
        "(in (array_pattern nil (match_var a) (match_rest rest)) nil (lvar rest)) nil))"
    );
    assert_eq!(
        clause("case x\nin a, then a\nend"),
        "(in (array_pattern nil (match_var a) (match_rest)) nil (lvar a)) nil))"
    );
}

#[test]
fn test_find_pattern() {
    assert_eq!(
        clause("case x\nin [*, 1, *post] then post\nend"),
        "(in (find_pattern nil (match_rest) (int 1) (match_rest post)) nil (lvar post)) nil))"
    );
}

#[test]
fn test_hash_pattern() {
    assert_eq!(
        clause("case x\nin {name: String => n, age:} then n\nend"),
        "(in (hash_pattern nil (pair name (match_as (const String) n)) (pair age)) nil (lvar n)) nil))"
    );
}

#[test]
fn test_hash_pattern_without_braces() {
    assert_eq!(
        clause("case x\nin name:, **rest then name\nend"),
        "(in (hash_pattern nil (pair name) (match_rest rest)) nil (lvar name)) nil))"
    );
    assert_eq!(
        clause("case x\nin {a: 1, **nil} then 1\nend"),
        "(in (hash_pattern nil (pair a (int 1)) (match_nil_pattern)) nil (int 1)) nil))"
    );
}

#[test]
fn test_hash_pattern_with_quoted_keys() {
    assert_eq!(
        clause("case x\nin {\"name\": String, age:} then 1\nend"),
        "(in (hash_pattern nil (pair name (const String)) (pair age)) nil (int 1)) nil))"
    );
    assert_eq!(
        clause("case x\nin \"name\":, **rest then name\nend"),
        "(in (hash_pattern nil (pair name) (match_rest rest)) nil (lvar name)) nil))"
    );
    assert_eq!(
        clause("case x\nin Point(\"px\": 1) then 1\nend"),
        "(in (hash_pattern (const Point) (pair px (int 1))) nil (int 1)) nil))"
    );
}

#[test]
fn test_leading_string_is_still_a_value_pattern() {
    assert_eq!(
        clause("case x\nin \"a\" | \"b\" then 1\nend"),
        r#"(in (match_alt (str "a") (str "b")) nil (int 1)) nil))"#
    );
    assert_eq!(
        clause("case x\nin \"a\", y then y\nend"),
        r#"(in (array_pattern nil (str "a") (match_var y)) nil (lvar y)) nil))"#
    );
}

#[test]
fn test_quoted_key_duplicates_plain_key() {
    let program = parse_with("case x\nin {a: 1, \"a\": 2} then 1\nend", ParserConfig::default());
    assert!(reported(&program, ErrorCode::E1011, "duplicated key name"));

    let interpolated = parse_with("case x\nin {\"#{y}\": 1} then 1\nend", ParserConfig::default());
    assert!(reported(
        &interpolated,
        ErrorCode::E1001,
        "symbol literal with interpolation is not allowed"
    ));
}

#[test]
fn test_constant_patterns() {
    assert_eq!(
        clause("case x\nin Point(px:, py:) then px\nend"),
        "(in (hash_pattern (const Point) (pair px) (pair py)) nil (lvar px)) nil))"
    );
    assert_eq!(
        clause("case x\nin Point[1, 2] then 1\nend"),
        "(in (array_pattern (const Point) (int 1) (int 2)) nil (int 1)) nil))"
    );
}

#[test]
fn test_alternative_pattern() {
    assert_eq!(
        clause("case x\nin 1 | 2 then :low\nend"),
        "(in (match_alt (int 1) (int 2)) nil (sym low)) nil))"
    );
}

#[test]
fn test_range_patterns() {
    assert_eq!(
        sexp("case x\nin 1..5 then :a\nin ..0 then :b\nend"),
        "(stmts (case_match (vcall x) (in (irange (int 1) (int 5)) nil (sym a)) \
         (in (irange nil (int 0)) nil (sym b)) nil))"
    );
}

#[test]
fn test_pinned_values() {
    assert_eq!(
        sexp("y = 1\ncase x\nin ^y then 1\nend"),
        "(stmts (lasgn y (int 1)) (case_match (vcall x) (in (pin (lvar y)) nil (int 1)) nil))"
    );
    assert_eq!(
        clause("case x\nin ^(1 + 1) then 1\nend"),
        "(in (pin (call (int 1) + (int 1))) nil (int 1)) nil))"
    );
}

#[test]
fn test_pin_of_unknown_local() {
    let program = parse_with("case x\nin ^z then 1\nend", ParserConfig::default());
    assert!(reported(&program, ErrorCode::E1019, "z: no such local variable"));
}

#[test]
fn test_guard_clauses() {
    assert_eq!(
        clause("case x\nin [a] if a > 1 then a\nend"),
        "(in (array_pattern nil (match_var a)) (if_guard (call (lvar a) > (int 1))) (lvar a)) nil))"
    );
    assert_eq!(
        clause("case x\nin a unless a then 1\nend"),
        "(in (match_var a) (unless_guard (lvar a)) (int 1)) nil))"
    );
}

#[test]
fn test_else_branch() {
    assert_eq!(
        clause("case x\nin 1\nelse 2\nend"),
        "(in (int 1) nil nil) (int 2)))"
    );
}

#[test]
fn test_one_line_patterns() {
    assert_eq!(
        sexp("x => [a, b]"),
        "(stmts (match_pattern (vcall x) (array_pattern nil (match_var a) (match_var b))))"
    );
    assert_eq!(
        sexp("x in Integer"),
        "(stmts (match_pattern_p (vcall x) (const Integer)))"
    );
}

#[test]
fn test_duplicated_variable_name() {
    let program = parse_with("case x\nin [a, a] then 1\nend", ParserConfig::default());
    assert!(reported(&program, ErrorCode::E1010, "duplicated variable name"));

    let underscore = parse_with("case x\nin [_, _] then 1\nend", ParserConfig::default());
    assert!(!underscore.has_errors());
}

#[test]
fn test_duplicated_key_name() {
    let program = parse_with("case x\nin {a: 1, a: 2} then 1\nend", ParserConfig::default());
    assert!(reported(&program, ErrorCode::E1011, "duplicated key name"));
}

#[test]
fn test_in_without_subject() {
    let program = parse_with("case\nin 1 then 2\nend", ParserConfig::default());
    assert!(reported(&program, ErrorCode::E1001, "syntax error, unexpected `in'"));
}
