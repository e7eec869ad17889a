//! Parser tests.
//!
//! Organized by category:
//! - `statements`: assignment, conditionals, loops, `case` and `begin`
//! - `calls`: method calls, arguments, blocks and lambdas
//! - `literals`: strings, heredocs, symbols, word lists and hashes
//! - `definitions`: `def`, `class`, `module`, `alias`, `undef` and the
//!   errors tied to them
//! - `patterns`: `case`/`in` and the one-line pattern forms
//! - `recovery`: error recovery, fatal errors and determinism

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]

mod calls;
mod definitions;
mod patterns;
mod statements;

use crate::{parse, ParsedProgram, ParserConfig};
use garnet_diagnostic::ErrorCode;
use garnet_ir::sexp::to_sexp;
use garnet_lexer::{Lexer, StrLines};

fn parse_with(source: &str, config: ParserConfig) -> ParsedProgram {
    parse(Lexer::new(StrLines::new(source)), config)
}

/// Parse without unused-variable warnings.
fn parse_quiet(source: &str) -> ParsedProgram {
    parse_with(
        source,
        ParserConfig {
            warn_unused: false,
            ..ParserConfig::default()
        },
    )
}

/// Render a parse that must not report errors.
fn sexp(source: &str) -> String {
    let program = parse_quiet(source);
    assert!(
        !program.has_errors(),
        "unexpected errors for {source:?}: {:?}",
        messages(&program)
    );
    render(&program)
}

fn render(program: &ParsedProgram) -> String {
    let root = program.root.expect("parse produced no tree");
    to_sexp(&program.arena, root, &program.lexer.interner)
}

fn codes(program: &ParsedProgram) -> Vec<ErrorCode> {
    program.diagnostics.iter().map(|d| d.code).collect()
}

fn messages(program: &ParsedProgram) -> Vec<String> {
    program
        .diagnostics
        .iter()
        .map(|d| format!("{}: {}", d.code, d.message))
        .collect()
}

/// Whether a diagnostic with `code` and exactly `message` was reported.
fn reported(program: &ParsedProgram, code: ErrorCode, message: &str) -> bool {
    program
        .diagnostics
        .iter()
        .any(|d| d.code == code && d.message == message)
}
