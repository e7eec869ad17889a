use super::*;

fn drain(source: &mut dyn LineSource) -> Vec<Vec<u8>> {
    let mut lines = Vec::new();
    while let Ok(Some(line)) = source.next_line() {
        lines.push(line);
    }
    lines
}

#[test]
fn test_str_lines_keep_terminators() {
    let mut source = StrLines::new("a\nbc\n\nd");
    assert_eq!(
        drain(&mut source),
        vec![b"a\n".to_vec(), b"bc\n".to_vec(), b"\n".to_vec(), b"d".to_vec()]
    );
}

#[test]
fn test_reader_lines_match_str_lines() {
    let text = "x = 1\ny = 2\n";
    let mut reader = ReaderLines::new(std::io::Cursor::new(text.as_bytes()));
    let mut strs = StrLines::new(text);
    assert_eq!(drain(&mut reader), drain(&mut strs));
}

#[test]
fn test_closure_source() {
    let mut lines = vec![b"b\n".to_vec(), b"a\n".to_vec()];
    let mut source = move || lines.pop();
    assert_eq!(drain(&mut source), vec![b"a\n".to_vec(), b"b\n".to_vec()]);
}

#[test]
fn test_empty_source() {
    let mut source = StrLines::new("");
    assert!(matches!(source.next_line(), Ok(None)));
}
