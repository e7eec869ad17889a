use super::*;

#[test]
fn test_deep_recursion() {
    fn deep_recurse(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { deep_recurse(n - 1) + 1 })
    }

    assert_eq!(deep_recurse(100_000), 100_000);
}

#[test]
fn test_returns_closure_result() {
    let result: Result<i32, &str> = ensure_sufficient_stack(|| Ok(123));
    assert_eq!(result, Ok(123));
}

#[test]
fn test_guard_limit() {
    let mut guard = NestingGuard::new(2);
    assert!(guard.enter().is_ok());
    assert!(guard.enter().is_ok());
    assert_eq!(guard.enter(), Err(NestingTooDeep { limit: 2 }));
    guard.exit();
    assert_eq!(guard.depth(), 1);
    assert!(guard.enter().is_ok());
}

#[test]
fn test_guard_exit_saturates() {
    let mut guard = NestingGuard::default();
    guard.exit();
    assert_eq!(guard.depth(), 0);
    assert_eq!(guard.limit(), DEFAULT_MAX_NESTING);
}

#[test]
fn test_error_message() {
    assert_eq!(
        NestingTooDeep { limit: 8 }.to_string(),
        "nesting too deep (limit 8)"
    );
}
