//! End-to-end behaviour of the public parse entry points.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]

use garnet::{
    parse_lines, parse_str, ErrorCode, EventListener, Node, NodeId, ParseOptions, ReaderLines,
    Severity, Token,
};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;

fn quiet() -> ParseOptions {
    ParseOptions {
        warn_unused: false,
        ..ParseOptions::default()
    }
}

fn sexp(source: &str) -> String {
    let output = parse_str(source, quiet());
    assert!(output.is_valid(), "{}", output.render_diagnostics());
    output.sexp().expect("valid parse has a tree")
}

#[test]
fn squiggly_heredoc_removes_common_indent() {
    assert_eq!(
        sexp("x = <<~END\n  a\n    b\nEND\n"),
        r#"(stmts (lasgn x (str "a\n  b\n")))"#
    );
}

#[test]
fn word_list_keeps_interpolation_text() {
    assert_eq!(sexp("%w[a b#{1}]"), r#"(stmts (array (str "a") (str "b#{1}")))"#);
}

#[test]
fn identifier_is_local_only_after_assignment() {
    assert_eq!(
        sexp("foo\nfoo = 1\nfoo"),
        "(stmts (vcall foo) (lasgn foo (int 1)) (lvar foo))"
    );
}

#[test]
fn numbered_parameters_set_block_arity() {
    assert_eq!(
        sexp("list.map { _2 }"),
        "(stmts (call (vcall list) map (block (numparams 2) (lvar _2))))"
    );
    let output = parse_str("list.map { |x| _2 }", quiet());
    assert!(!output.is_valid());
    assert!(output.errors().any(|d| d.code == ErrorCode::E1007));
}

#[test]
fn unterminated_string_is_one_fatal_error() {
    let output = parse_str("\"abc", quiet());
    assert!(output.root.is_none());
    assert!(output.sexp().is_none());
    let fatal: Vec<_> = output
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Fatal)
        .collect();
    assert_eq!(fatal.len(), 1);
    assert!(fatal[0].message.contains("unterminated string"), "{}", fatal[0].message);
}

#[test]
fn parsing_twice_gives_the_same_result() {
    let source = "class A\n  def b(x) = x + 1\nend\nA.new.b(2) rescue nil\nif\n";
    let first = parse_str(source, ParseOptions::default());
    let second = parse_str(source, ParseOptions::default());
    assert_eq!(first.sexp(), second.sexp());
    assert_eq!(first.render_diagnostics(), second.render_diagnostics());
}

#[test]
fn reader_and_closure_sources_match_str_source() {
    let source = "a = [1, 2]\na.each do |x|\n  puts x\nend\n";
    let expected = sexp(source);

    let from_reader = parse_lines(ReaderLines::new(Cursor::new(source.as_bytes())), quiet());
    assert_eq!(from_reader.sexp().as_deref(), Some(expected.as_str()));

    let mut lines = source.lines().map(|line| format!("{line}\n").into_bytes());
    let from_closure = parse_lines(move || lines.next(), quiet());
    assert_eq!(from_closure.sexp().as_deref(), Some(expected.as_str()));
}

#[test]
fn end_marker_stops_the_parse() {
    let source = "puts 1\n__END__\nnot ruby (\n";
    let output = parse_str(source, quiet());
    assert!(output.is_valid());
    assert_eq!(output.sexp().as_deref(), Some("(stmts (call nil puts (int 1)))"));
    let offset = output.data_offset.expect("__END__ seen");
    assert_eq!(&source[offset..], "not ruby (\n");
}

#[test]
fn diagnostics_render_with_file_line_and_column() {
    let output = parse_str("x = 1\ny = )\n", ParseOptions::new("demo.rb"));
    let rendered = output.render_diagnostics();
    assert!(rendered.contains("demo.rb:2:5: error[E1001]:"), "{rendered}");
    assert!(rendered.contains("demo.rb:1:1: warning[W1001]: assigned but unused variable - x"));
}

#[test]
fn warnings_do_not_invalidate_the_tree() {
    let output = parse_str("x = 1", ParseOptions::default());
    assert!(output.is_valid());
    assert_eq!(output.warnings().count(), 1);
    assert_eq!(output.errors().count(), 0);
    let span = output.diagnostics[0].primary_span().unwrap();
    assert_eq!(output.snippet(span), b"x");
    assert_eq!(output.line_col(span.start), (1, 1));
}

#[derive(Default)]
struct Seen {
    tokens: usize,
    nodes: Vec<NodeId>,
}

struct Counter(Rc<RefCell<Seen>>);

impl EventListener for Counter {
    fn on_token(&mut self, _token: &Token) {
        self.0.borrow_mut().tokens += 1;
    }

    fn on_node(&mut self, node: &Node) {
        self.0.borrow_mut().nodes.push(node.id);
    }
}

#[test]
fn event_listener_sees_every_node() {
    let seen = Rc::new(RefCell::new(Seen::default()));
    let options = quiet().with_event_listener(Box::new(Counter(Rc::clone(&seen))));
    let output = parse_str("foo(1, 2)", options);
    let root = output.root.unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.nodes.len(), output.ast.len());
    assert_eq!(seen.nodes.last(), Some(&root));
    assert!(seen.tokens >= 6);
}
