//! Properties of the public entry points over generated sources.

#![allow(clippy::disallowed_types, reason = "proptest macros internally use Arc")]

use garnet::{parse_lines, parse_str, ParseOptions, ReaderLines};
use proptest::prelude::*;
use std::io::Cursor;

/// Fragments that recombine into valid and invalid sources alike.
fn source() -> impl Strategy<Value = String> {
    let piece = prop::sample::select(vec![
        "x = 1", "y = x + 2", "foo(x)", "[1, 2]", "{a: 1}", "if x", "end", "def m(a)",
        "\"s#{x}\"", "/re/", "(", ")", "x.each { |v| v }", "case x", "when 1", "rescue",
        ":sym", "1..2", "<<~E\n a\nE",
    ]);
    prop::collection::vec(piece, 0..10).prop_map(|pieces| pieces.join("\n"))
}

proptest! {
    #[test]
    fn parsing_is_deterministic(src in source()) {
        let first = parse_str(&src, ParseOptions::default());
        let second = parse_str(&src, ParseOptions::default());
        prop_assert_eq!(first.sexp(), second.sexp());
        prop_assert_eq!(first.render_diagnostics(), second.render_diagnostics());
    }

    #[test]
    fn line_sources_agree(src in source()) {
        let from_str = parse_str(&src, ParseOptions::default());
        let from_reader = parse_lines(
            ReaderLines::new(Cursor::new(src.clone().into_bytes())),
            ParseOptions::default(),
        );
        prop_assert_eq!(from_str.sexp(), from_reader.sexp());
        prop_assert_eq!(from_str.render_diagnostics(), from_reader.render_diagnostics());
    }

    #[test]
    fn valid_parse_has_a_tree_and_no_errors(src in source()) {
        let output = parse_str(&src, ParseOptions::default());
        if output.is_valid() {
            prop_assert!(output.sexp().is_some());
            prop_assert_eq!(output.errors().count(), 0);
        }
    }
}
