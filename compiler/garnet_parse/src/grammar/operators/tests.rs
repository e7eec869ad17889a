use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_levels_are_ordered() {
    assert!(Prec::Lowest < Prec::Assign);
    assert!(Prec::OrOp < Prec::AndOp);
    assert!(Prec::Additive < Prec::Multiplicative);
    assert!(Prec::UnaryMinus < Prec::Pow);
    assert!(Prec::Pow < Prec::Unary);
}

#[test]
fn test_next_is_strictly_tighter_below_unary() {
    let mut prec = Prec::Lowest;
    while prec != Prec::Unary {
        let next = prec.next();
        assert!(next > prec, "{prec:?} -> {next:?}");
        prec = next;
    }
    assert_eq!(Prec::Unary.next(), Prec::Unary);
}

#[test]
fn test_binary_table() {
    assert_eq!(
        binary_op(TokenKind::Plus),
        Some((Prec::Additive, Assoc::Left))
    );
    assert_eq!(binary_op(TokenKind::Pow), Some((Prec::Pow, Assoc::Right)));
    assert_eq!(
        binary_op(TokenKind::Eq),
        Some((Prec::Equality, Assoc::NonAssoc))
    );
    assert_eq!(binary_op(TokenKind::Assign), None);
    assert_eq!(binary_op(TokenKind::Dot2), None);
    assert_eq!(binary_op(TokenKind::Splat), None);
}
