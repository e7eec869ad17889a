use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_builder_chain() {
    let diag = Diagnostic::error(ErrorCode::E1004)
        .with_message("duplicated argument name")
        .with_label(Span::new(10, 11), "second declaration")
        .with_secondary_label(Span::new(6, 7), "first declared here");

    assert_eq!(diag.code, ErrorCode::E1004);
    assert!(diag.is_error());
    assert!(!diag.is_fatal());
    assert_eq!(diag.labels.len(), 2);
    assert_eq!(diag.primary_span(), Some(Span::new(10, 11)));
}

#[test]
fn test_render_marks_secondary_labels() {
    let source = b"def m(a, a); end\n";
    let lines = LineOffsetTable::build(source);
    let diag = Diagnostic::error(ErrorCode::E1004)
        .with_message("duplicated argument name")
        .with_label(Span::new(9, 10), "")
        .with_secondary_label(Span::new(6, 7), "first declared here");
    assert_eq!(
        diag.render("t.rb", source, &lines),
        "t.rb:1:10: error[E1004]: duplicated argument name\n      1:7: first declared here"
    );
}

#[test]
fn test_warning_is_not_error() {
    let diag = Diagnostic::warning(ErrorCode::W1001).with_message("assigned but unused variable - x");
    assert!(!diag.is_error());
    assert_eq!(diag.severity.to_string(), "warning");
}

#[test]
fn test_render_with_line_and_column() {
    let source = b"a = 1\nfoo(\"abc\n";
    let lines = LineOffsetTable::build(source);
    let diag = Diagnostic::fatal(ErrorCode::E0001)
        .with_message("unterminated string meets end of file")
        .with_label(Span::new(10, 11), "string starts here");
    assert_eq!(
        diag.render("t.rb", source, &lines),
        "t.rb:2:5: fatal[E0001]: unterminated string meets end of file\n  --> 2:5: string starts here"
    );
}

#[test]
fn test_display() {
    let diag = Diagnostic::error(ErrorCode::E1001)
        .with_message("syntax error, unexpected `end'")
        .with_label(Span::new(0, 3), "");
    assert_eq!(
        diag.to_string(),
        "error [E1001]: syntax error, unexpected `end'\n  --> 0..3: "
    );
}
