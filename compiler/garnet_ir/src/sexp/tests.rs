use super::*;
use crate::{Span, StringInterner};
use pretty_assertions::assert_eq;

#[test]
fn test_call_with_block() {
    let mut names = StringInterner::new();
    let mut arena = NodeArena::new();
    let foo = names.intern("foo");
    let x = names.intern("x");
    let one = arena.alloc(NodeKind::Numeric(NumericValue::Integer(1)), Span::DUMMY);
    let var = arena.alloc(NodeKind::LocalVar(x), Span::DUMMY);
    let block = arena.alloc(
        NodeKind::Block {
            params: None,
            body: Some(var),
            numbered: 0,
        },
        Span::DUMMY,
    );
    let call = arena.alloc(
        NodeKind::Call {
            receiver: None,
            name: foo,
            args: vec![one],
            block: Some(block),
            op: CallOp::Dot,
        },
        Span::DUMMY,
    );
    assert_eq!(
        to_sexp(&arena, call, &names),
        "(call nil foo (int 1) (block nil (lvar x)))"
    );
}

#[test]
fn test_string_escaping() {
    let names = StringInterner::new();
    let mut arena = NodeArena::new();
    let s = arena.alloc(
        NodeKind::Str {
            value: b"a\"b\n\x01".to_vec(),
            frozen: true,
        },
        Span::DUMMY,
    );
    assert_eq!(to_sexp(&arena, s, &names), r#"(str "a\"b\n\x01" frozen)"#);
}

#[test]
fn test_numbered_block() {
    let names = StringInterner::new();
    let mut arena = NodeArena::new();
    let block = arena.alloc(
        NodeKind::Block {
            params: None,
            body: None,
            numbered: 2,
        },
        Span::DUMMY,
    );
    assert_eq!(to_sexp(&arena, block, &names), "(block (numparams 2) nil)");
}

#[test]
fn test_scoped_const() {
    let mut names = StringInterner::new();
    let mut arena = NodeArena::new();
    let a = names.intern("A");
    let b = names.intern("B");
    let outer = arena.alloc(
        NodeKind::Const {
            scope: ConstScope::TopLevel,
            name: a,
        },
        Span::DUMMY,
    );
    let inner = arena.alloc(
        NodeKind::Const {
            scope: ConstScope::Scoped(outer),
            name: b,
        },
        Span::DUMMY,
    );
    assert_eq!(to_sexp(&arena, inner, &names), "(const (const :: A) B)");
}
