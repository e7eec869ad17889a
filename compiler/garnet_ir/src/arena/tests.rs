use super::*;

#[test]
fn test_alloc_assigns_sequential_ids() {
    let mut arena = NodeArena::new();
    let a = arena.alloc(NodeKind::Nil, Span::new(0, 3));
    let b = arena.alloc(NodeKind::True, Span::new(4, 8));
    assert_eq!(a.index(), 0);
    assert_eq!(b.index(), 1);
    assert_eq!(arena.kind(b), &NodeKind::True);
    assert_eq!(arena.span(a), Span::new(0, 3));
    assert_eq!(arena.get(b).id, b);
}

#[test]
fn test_ast_ids_are_unique() {
    let a = NodeArena::new();
    let b = NodeArena::new();
    assert_ne!(a.ast_id(), b.ast_id());
}

#[test]
fn test_equality_ignores_identity() {
    let mut a = NodeArena::new();
    let mut b = NodeArena::new();
    a.alloc(NodeKind::Line(3), Span::new(0, 8));
    b.alloc(NodeKind::Line(3), Span::new(0, 8));
    assert_eq!(a, b);
    b.alloc(NodeKind::Nil, Span::new(9, 12));
    assert_ne!(a, b);
}
