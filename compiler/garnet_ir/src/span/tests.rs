use super::*;
use proptest::prelude::*;

#[test]
fn test_span_basic() {
    let span = Span::new(10, 20);
    assert_eq!(span.len(), 10);
    assert!(!span.is_empty());
    assert!(span.contains(15));
    assert!(!span.contains(20));
}

#[test]
fn test_span_merge_covers_both() {
    let merged = Span::new(10, 20).merge(Span::new(15, 30));
    assert_eq!(merged, Span::new(10, 30));
}

#[test]
fn test_from_offsets_saturates() {
    let span = Span::from_offsets(1, usize::MAX);
    assert_eq!(span.start, 1);
    assert_eq!(span.end, u32::MAX);
}

#[test]
fn test_point_is_empty() {
    assert!(Span::point(7).is_empty());
    assert_eq!(format!("{:?}", Span::point(7)), "7..7");
}

#[allow(clippy::disallowed_types, reason = "proptest macros internally use Arc")]
mod proptest_merge {
    use super::*;

    proptest! {
        #[test]
        fn merge_is_commutative_and_idempotent(a in 0u32..1000, b in 0u32..1000, c in 0u32..1000, d in 0u32..1000) {
            let x = Span::new(a.min(b), a.max(b));
            let y = Span::new(c.min(d), c.max(d));
            prop_assert_eq!(x.merge(y), y.merge(x));
            prop_assert_eq!(x.merge(y).merge(y), x.merge(y));
        }
    }
}
