use ktkb_common::{KeyState, time::Instant};
use ktkb_core::{
    hid::{KeyCode, Mods, Report},
    indicators::IndicatorSet,
    keyboard::KeymapHooks,
    keymap::KeyEvent,
    layers::LayerState,
    sim::SimBoard,
};
use ktkb_preonic::{
    CustomKey, PreonicHooks, PreonicKeyboard, keyboard,
    layout::{ADJUST, CONST, KEYMAP, LOWER, NAV, NUM, QWERTY, RAISE, SYM},
};

fn at(ms: u64) -> Instant {
    Instant::from_millis(ms)
}

fn new_keyboard_on(board: SimBoard) -> PreonicKeyboard<SimBoard> {
    let mut kb = keyboard(board, at(0));
    kb.init();
    kb.board_mut().take_reports();
    kb
}

fn new_keyboard() -> PreonicKeyboard<SimBoard> {
    new_keyboard_on(SimBoard::new())
}

fn tap(kb: &mut PreonicKeyboard<SimBoard>, row: u8, col: u8, ms: u64) {
    kb.process(KeyEvent::press(row, col, at(ms)));
    kb.process(KeyEvent::release(row, col, at(ms + 20)));
}

fn first_keyboard_report(board: &mut SimBoard) -> (u8, [u8; 6]) {
    board
        .take_reports()
        .iter()
        .find_map(|r| match r {
            Report::Keyboard(k) => Some((k.modifiers, k.keycodes)),
            _ => None,
        })
        .unwrap()
}

#[test]
fn test_layer_names() {
    assert_eq!(KEYMAP.layer_count(), 11);
    assert_eq!(KEYMAP.layer_name(CONST), Some("const"));
    assert_eq!(KEYMAP.layer_index("adjust"), Some(ADJUST));
}

#[test]
fn test_lower_and_raise_bring_up_adjust() {
    let mut kb = new_keyboard();
    kb.process(KeyEvent::press(4, 4, at(0)));
    assert_eq!(kb.layer_state(), LayerState::only(LOWER));

    kb.process(KeyEvent::press(4, 7, at(10)));
    assert_eq!(kb.layer_state(), LayerState::only(LOWER).on(RAISE).on(ADJUST));
    assert_eq!(kb.current_layer(), ADJUST);

    // AG_SWAP on the adjust layer.
    tap(&mut kb, 2, 6, 20);
    assert!(kb.eeconfig().keymap.swap_alt_gui);

    kb.process(KeyEvent::release(4, 7, at(100)));
    assert_eq!(kb.layer_state(), LayerState::only(LOWER));
    kb.process(KeyEvent::release(4, 4, at(110)));
    assert!(kb.layer_state().is_empty());
}

#[test]
fn test_lower_layer_symbols() {
    let mut kb = new_keyboard();
    kb.process(KeyEvent::press(4, 4, at(0)));
    tap(&mut kb, 0, 3, 10);
    assert_eq!(first_keyboard_report(kb.board_mut()), (0x02, [KeyCode::Three.usage(), 0, 0, 0, 0, 0]));
}

#[test]
fn test_lock_layer_switches_on_release() {
    let mut kb = new_keyboard();
    kb.process(KeyEvent::press(4, 2, at(0)));
    kb.process(KeyEvent::press(2, 1, at(10)));
    assert_eq!(kb.current_layer(), 1);

    kb.process(KeyEvent::release(2, 1, at(30)));
    assert_eq!(kb.layer_state(), LayerState::only(SYM));
    kb.process(KeyEvent::release(4, 2, at(40)));
    assert_eq!(kb.layer_state(), LayerState::only(SYM));

    // TO(0) in the corner goes back.
    tap(&mut kb, 0, 0, 100);
    assert_eq!(kb.current_layer(), QWERTY);
}

#[test]
fn test_const_layer_shifts_letters() {
    let mut kb = new_keyboard();
    kb.process(KeyEvent::press(4, 2, at(0)));
    tap(&mut kb, 3, 0, 10);
    kb.process(KeyEvent::release(4, 2, at(50)));
    assert_eq!(kb.layer_state(), LayerState::only(CONST));

    kb.board_mut().take_reports();
    tap(&mut kb, 1, 1, 100);
    assert_eq!(first_keyboard_report(kb.board_mut()), (0x02, [KeyCode::Q.usage(), 0, 0, 0, 0, 0]));
}

#[test]
fn test_nav_toggle_and_wheel() {
    let mut kb = new_keyboard();
    kb.process(KeyEvent::press(2, 0, at(0)));
    assert!(kb.layer_state().is_empty());
    kb.process(KeyEvent::release(2, 0, at(20)));
    assert_eq!(kb.layer_state(), LayerState::only(NAV));

    kb.process(KeyEvent::press(1, 5, at(50)));
    let reports = kb.board_mut().take_reports();
    assert!(matches!(reports[0], Report::Mouse(m) if m.wheel > 0));
}

#[test]
fn test_num_layer_through_layer_tap() {
    let mut kb = new_keyboard();
    kb.process(KeyEvent::press(2, 3, at(0)));
    kb.process(KeyEvent::press(1, 7, at(50)));
    kb.process(KeyEvent::release(1, 7, at(80)));
    kb.tick(at(200));
    assert!(kb.layer_state().is_on(NUM));

    assert_eq!(first_keyboard_report(kb.board_mut()), (0, [KeyCode::Keypad7.usage(), 0, 0, 0, 0, 0]));
}

#[test]
fn test_backlit_key() {
    let mut kb = new_keyboard();
    let mut hooks = PreonicHooks;

    hooks.process_custom(CustomKey::Backlit, KeyState::Pressed, kb.ops());
    assert_eq!(kb.mods(), Mods::RSHIFT);
    assert_eq!(kb.board().backlight_level, 1);
    assert_eq!(kb.board().indicators, IndicatorSet::STATUS);

    hooks.process_custom(CustomKey::Backlit, KeyState::Released, kb.ops());
    assert_eq!(kb.mods(), Mods::empty());
    assert_eq!(kb.board().indicators, IndicatorSet::empty());
    assert_eq!(kb.eeconfig().backlight.level, 1);
}

#[test]
fn test_qwerty_key_persists_default_layer() {
    let mut kb = new_keyboard();
    kb.ops().set_single_persistent_default_layer(NUM);
    assert_eq!(kb.eeconfig().default_layer, NUM);
    let restarted = new_keyboard_on(kb.board().clone());
    assert_eq!(restarted.default_layer_state(), LayerState::only(NUM));

    let mut hooks = PreonicHooks;
    hooks.process_custom(CustomKey::Qwerty, KeyState::Pressed, kb.ops());
    assert_eq!(kb.default_layer_state(), LayerState::only(QWERTY));

    let restarted = new_keyboard_on(kb.board().clone());
    assert_eq!(restarted.eeconfig().default_layer, QWERTY);
    assert_eq!(restarted.default_layer_state(), LayerState::only(QWERTY));
}

#[test]
fn test_qwerty_key_on_adjust_layer() {
    let mut kb = new_keyboard();
    kb.process(KeyEvent::press(4, 4, at(0)));
    kb.process(KeyEvent::press(4, 7, at(10)));
    kb.process(KeyEvent::press(2, 7, at(20)));
    assert_eq!(kb.eeconfig().default_layer, QWERTY);
    assert_eq!(kb.board().eeprom.writes(), 2);
}
