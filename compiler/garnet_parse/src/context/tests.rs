use super::*;

#[test]
fn test_default_context() {
    let ctx = ParseContext::new();
    assert_eq!(ctx, ParseContext::NONE);
    assert!(ctx.allows_block());
    assert!(!ctx.in_def());
    assert!(!ctx.in_class());
    assert!(!ctx.in_rescue());
}

#[test]
fn test_with_and_without() {
    let ctx = ParseContext::new()
        .with(ParseContext::IN_LOOP)
        .with(ParseContext::NO_BLOCK);
    assert!(ctx.has(ParseContext::IN_LOOP));
    assert!(!ctx.allows_block());

    let ctx = ctx.without(ParseContext::NO_BLOCK);
    assert!(ctx.allows_block());
    assert!(ctx.has(ParseContext::IN_LOOP));
}

#[test]
fn test_block_body_keeps_def_and_rescue() {
    let ctx = ParseContext::IN_DEF
        .with(ParseContext::IN_RESCUE)
        .with(ParseContext::NO_BLOCK)
        .with(ParseContext::IN_CLASS);
    let body = ctx.block_body();
    assert!(body.in_def());
    assert!(body.in_rescue());
    assert!(body.has(ParseContext::IN_BLOCK));
    assert!(body.allows_block());
    assert!(!body.in_class());
}
