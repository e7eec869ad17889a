use super::*;
use garnet_ir::StringInterner;
use pretty_assertions::assert_eq;

fn span(n: u32) -> Span {
    Span::new(n, n + 1)
}

#[test]
fn test_locals_resolve_through_block_chain() {
    let mut names = StringInterner::new();
    let x = names.intern("x");
    let mut scopes = ScopeTracker::new(false);
    assert!(scopes.declare(x, VarRole::Local, span(0), &names).is_none());
    assert_eq!(scopes.resolve(x), Resolution::Local);

    scopes.push_scope(ScopeKind::Block);
    assert_eq!(scopes.resolve(x), Resolution::Outer { depth: 1 });
    scopes.push_scope(ScopeKind::Lambda);
    assert_eq!(scopes.resolve(x), Resolution::Outer { depth: 2 });
    assert!(scopes.is_local(x));
    let _ = scopes.pop_scope(&names);
    let _ = scopes.pop_scope(&names);
    assert_eq!(scopes.depth(), 1);
}

#[test]
fn test_gate_hides_outer_locals() {
    let mut names = StringInterner::new();
    let x = names.intern("x");
    let mut scopes = ScopeTracker::new(false);
    let _ = scopes.declare(x, VarRole::Local, span(0), &names);
    scopes.push_scope(ScopeKind::Method);
    assert_eq!(scopes.resolve(x), Resolution::Unresolved);
    assert!(!scopes.is_local(x));
    scopes.push_scope(ScopeKind::Block);
    assert_eq!(scopes.resolve(x), Resolution::Unresolved);
}

#[test]
fn test_duplicated_argument() {
    let mut names = StringInterner::new();
    let a = names.intern("a");
    let underscore = names.intern("_");
    let mut scopes = ScopeTracker::new(false);
    scopes.push_scope(ScopeKind::Method);
    assert!(scopes.declare(a, VarRole::Param, span(1), &names).is_none());
    let Some(diag) = scopes.declare(a, VarRole::Param, span(4), &names) else {
        panic!("second `a` was not reported");
    };
    assert_eq!(diag.message, "duplicated argument name");
    assert_eq!(diag.primary_span(), Some(span(4)));
    let secondary: Vec<_> = diag
        .labels
        .iter()
        .filter(|label| !label.is_primary)
        .map(|label| (label.span, label.message.as_str()))
        .collect();
    assert_eq!(secondary, vec![(span(1), "first declared here")]);

    assert!(scopes.declare(underscore, VarRole::Param, span(6), &names).is_none());
    assert!(scopes.declare(underscore, VarRole::Param, span(8), &names).is_none());
}

#[test]
fn test_locals_reassign_freely() {
    let mut names = StringInterner::new();
    let a = names.intern("a");
    let mut scopes = ScopeTracker::new(false);
    assert!(scopes.declare(a, VarRole::Local, span(0), &names).is_none());
    assert!(scopes.declare(a, VarRole::Local, span(5), &names).is_none());
}

#[test]
fn test_block_param_shadowing_warns() {
    let mut names = StringInterner::new();
    let x = names.intern("x");
    let hidden = names.intern("_x");
    let mut scopes = ScopeTracker::new(false);
    let _ = scopes.declare(x, VarRole::Local, span(0), &names);
    let _ = scopes.declare(hidden, VarRole::Local, span(2), &names);
    scopes.push_scope(ScopeKind::Block);
    let diag = scopes.declare(x, VarRole::Param, span(10), &names);
    let diag = diag.map(|d| (d.code, d.message));
    assert_eq!(
        diag,
        Some((ErrorCode::W1002, "shadowing outer local variable - x".to_string()))
    );
    assert!(scopes.declare(hidden, VarRole::Param, span(12), &names).is_none());
}

#[test]
fn test_unused_variable_warning() {
    let mut names = StringInterner::new();
    let used = names.intern("used");
    let unused = names.intern("unused");
    let ignored = names.intern("_ignored");
    let param = names.intern("param");
    let mut scopes = ScopeTracker::new(true);
    scopes.push_scope(ScopeKind::Method);
    let _ = scopes.declare(param, VarRole::Param, span(0), &names);
    let _ = scopes.declare(used, VarRole::Local, span(2), &names);
    let _ = scopes.declare(unused, VarRole::Local, span(4), &names);
    let _ = scopes.declare(ignored, VarRole::Local, span(6), &names);
    scopes.mark_used(used);

    let warnings = scopes.pop_scope(&names);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "assigned but unused variable - unused");
    assert_eq!(warnings[0].primary_span(), Some(span(4)));
}

#[test]
fn test_mark_used_reaches_outer_frame() {
    let mut names = StringInterner::new();
    let x = names.intern("x");
    let mut scopes = ScopeTracker::new(true);
    scopes.push_scope(ScopeKind::Method);
    let _ = scopes.declare(x, VarRole::Local, span(0), &names);
    scopes.push_scope(ScopeKind::Block);
    scopes.mark_used(x);
    assert!(scopes.pop_scope(&names).is_empty());
    assert!(scopes.pop_scope(&names).is_empty());
}

#[test]
fn test_numbered_param_raises_arity() {
    let mut scopes = ScopeTracker::new(false);
    assert_eq!(scopes.numbered_param(1, span(0)), Ok(false));
    scopes.push_scope(ScopeKind::Block);
    assert_eq!(scopes.numbered_param(2, span(3)), Ok(true));
    assert_eq!(scopes.numbered_param(1, span(6)), Ok(true));
    assert_eq!(scopes.numbered_arity(), 2);
}

#[test]
fn test_numbered_param_with_explicit_params() {
    let mut scopes = ScopeTracker::new(false);
    scopes.push_scope(ScopeKind::Block);
    scopes.set_explicit_params();
    let err = scopes.numbered_param(1, span(0)).map_err(|d| d.message);
    assert_eq!(err, Err("ordinary parameter is defined".to_string()));
}

#[test]
fn test_numbered_param_outer_and_inner_conflicts() {
    let mut scopes = ScopeTracker::new(false);
    scopes.push_scope(ScopeKind::Block);
    assert_eq!(scopes.numbered_param(1, span(0)), Ok(true));
    scopes.push_scope(ScopeKind::Block);
    let err = scopes.numbered_param(1, span(5)).map_err(|d| d.message);
    assert_eq!(err, Err("numbered parameter is already used in outer block".to_string()));

    let mut scopes = ScopeTracker::new(false);
    scopes.push_scope(ScopeKind::Block);
    scopes.push_scope(ScopeKind::Block);
    assert_eq!(scopes.numbered_param(1, span(0)), Ok(true));
    let names = StringInterner::new();
    let _ = scopes.pop_scope(&names);
    let err = scopes.numbered_param(1, span(5)).map_err(|d| d.message);
    assert_eq!(err, Err("numbered parameter is already used in inner block".to_string()));
}

#[test]
fn test_sibling_blocks_may_both_use_numbered_params() {
    let names = StringInterner::new();
    let mut scopes = ScopeTracker::new(false);
    scopes.push_scope(ScopeKind::Block);
    scopes.push_scope(ScopeKind::Block);
    assert_eq!(scopes.numbered_param(1, span(0)), Ok(true));
    let _ = scopes.pop_scope(&names);
    scopes.push_scope(ScopeKind::Block);
    assert_eq!(scopes.numbered_param(1, span(9)), Ok(true));
}

#[test]
fn test_declaring_numbered_param_name_is_an_error() {
    let mut names = StringInterner::new();
    let one = names.intern("_1");
    let mut scopes = ScopeTracker::new(false);
    let diag = scopes.declare(one, VarRole::Local, span(0), &names);
    assert_eq!(diag.map(|d| d.code), Some(ErrorCode::E1009));
}

#[test]
fn test_forwarding_is_per_method() {
    let mut scopes = ScopeTracker::new(false);
    assert_eq!(scopes.forwarding(), Forwarding::empty());
    scopes.push_scope(ScopeKind::Method);
    scopes.add_forwarding(Forwarding::ALL);
    scopes.push_scope(ScopeKind::Block);
    assert!(scopes.forwarding().contains(Forwarding::ALL));
    scopes.push_scope(ScopeKind::Class);
    assert_eq!(scopes.forwarding(), Forwarding::empty());
}
