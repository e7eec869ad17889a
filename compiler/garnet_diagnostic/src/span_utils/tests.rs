use super::*;

#[test]
fn test_line_lookup() {
    let source = b"a\nbb\n\nccc";
    let table = LineOffsetTable::build(source);
    assert_eq!(table.line_count(), 4);
    assert_eq!(table.line_from_offset(0), 1);
    assert_eq!(table.line_from_offset(2), 2);
    assert_eq!(table.line_from_offset(5), 3);
    assert_eq!(table.line_from_offset(6), 4);
    assert_eq!(table.offset_to_line_col(source, 8), (4, 3));
}

#[test]
fn test_incremental_extend_matches_build() {
    let source = b"one\ntwo\nthree\n";
    let mut table = LineOffsetTable::default();
    table.extend(b"one\n", 0);
    table.extend(b"two\n", 4);
    table.extend(b"three\n", 8);
    let built = LineOffsetTable::build(source);
    for offset in 0..u32::try_from(source.len()).unwrap_or(0) {
        assert_eq!(table.line_from_offset(offset), built.line_from_offset(offset));
    }
}

#[test]
fn test_extend_ignores_already_recorded_lines() {
    let mut table = LineOffsetTable::default();
    table.extend(b"x\n", 0);
    table.extend(b"x\n", 0);
    assert_eq!(table.line_count(), 2);
}

#[test]
fn test_column_counts_characters() {
    let source = "é = 1".as_bytes();
    let table = LineOffsetTable::build(source);
    assert_eq!(table.offset_to_line_col(source, 3), (1, 3));
}

#[test]
fn test_span_lines() {
    let source = b"a\nb\nc\n";
    let table = LineOffsetTable::build(source);
    assert_eq!(table.span_lines(Span::new(0, 4)), (1, 2));
    assert_eq!(table.span_lines(Span::new(4, 4)), (3, 3));
}
