use super::*;

#[test]
fn test_composite_masks() {
    assert!(LexState::MID.any(LexState::BEG_ANY));
    assert!(LexState::CMDARG.any(LexState::ARG_ANY));
    assert!(!LexState::ARG.any(LexState::END_ANY));
    let labeled_arg = LexState::ARG | LexState::LABELED;
    assert!(labeled_arg.has_all(LexState::ARG | LexState::LABELED));
    assert!(!LexState::ARG.has_all(LexState::ARG | LexState::LABELED));
}

#[test]
fn test_bit_stack_push_pop() {
    let mut stack = BitStack::default();
    stack.push(true);
    stack.push(false);
    assert!(!stack.top());
    stack.pop();
    assert!(stack.top());
    stack.set_top(false);
    assert!(!stack.top());
    stack.pop();
    assert_eq!(stack.bits(), 0);
}
