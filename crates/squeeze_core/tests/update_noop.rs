use squeeze_core::{update, AppState, Msg};

#[test]
fn tick_leaves_state_unchanged() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::Tick);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn tick_does_not_dirty_the_view() {
    let (mut next, effects) = update(AppState::new(), Msg::Tick);

    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
}
