use ktkb_common::{KeyState, do_on_key_state};
use ktkb_core::{
    hid::KeyCode,
    indicators::IndicatorSet,
    keyboard::{KeyboardOps, KeymapHooks},
};

use crate::layout::{ADJUST, LOWER, QWERTY, RAISE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CustomKey {
    /// Makes qwerty the persisted default layer.
    Qwerty,
    /// Momentary lower layer. Held together with raise, the adjust
    /// layer comes up.
    Lower,
    Raise,
    /// Right shift while held, also stepping the backlight.
    Backlit,
}

#[macro_export]
macro_rules! custom_key_from_alias {
    (u:Qwerty) => {
        $crate::CustomKey::Qwerty
    };
    (u:Lower) => {
        $crate::CustomKey::Lower
    };
    (u:Raise) => {
        $crate::CustomKey::Raise
    };
    (u:Backlit) => {
        $crate::CustomKey::Backlit
    };
}

fn momentary_tri_layer(layer: u8, state: KeyState, ops: &mut dyn KeyboardOps) {
    do_on_key_state!(state, { ops.layer_on(layer) }, { ops.layer_off(layer) });
    ops.update_tri_layer(LOWER, RAISE, ADJUST);
}

#[derive(Default)]
pub struct PreonicHooks;

impl KeymapHooks<CustomKey> for PreonicHooks {
    fn process_custom(&mut self, key: CustomKey, state: KeyState, ops: &mut dyn KeyboardOps) {
        match key {
            CustomKey::Qwerty => {
                if state.is_pressed() {
                    ops.set_single_persistent_default_layer(QWERTY);
                }
            }
            CustomKey::Lower => momentary_tri_layer(LOWER, state, ops),
            CustomKey::Raise => momentary_tri_layer(RAISE, state, ops),
            CustomKey::Backlit => do_on_key_state!(
                state,
                {
                    ops.register_code(KeyCode::RightShift);
                    ops.backlight_step();
                    ops.set_indicators(IndicatorSet::STATUS);
                },
                {
                    ops.unregister_code(KeyCode::RightShift);
                    ops.set_indicators(IndicatorSet::empty());
                }
            ),
        }
    }
}
