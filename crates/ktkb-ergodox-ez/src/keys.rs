use ktkb_common::{KeyState, dev_debug};
use ktkb_core::{
    indicators::IndicatorSet,
    keyboard::{KeyboardOps, KeymapHooks},
    layers::LayerState,
};

use crate::config::{LAYER_COLORS, VERSION_STRING};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CustomKey {
    /// Restores the persisted configuration to its defaults.
    Eprm,
    /// Types the keyboard, keymap and firmware version.
    Vrsn,
    /// Switches the underglow to a static color.
    RgbSld,
}

#[macro_export]
macro_rules! custom_key_from_alias {
    (u:Eprm) => {
        $crate::CustomKey::Eprm
    };
    (u:Vrsn) => {
        $crate::CustomKey::Vrsn
    };
    (u:RgbSld) => {
        $crate::CustomKey::RgbSld
    };
}

/// Right hand LEDs lit while `layer` is the highest active layer.
pub const fn layer_indicators(layer: u8) -> IndicatorSet {
    match layer {
        1 => IndicatorSet::LED_1,
        2 => IndicatorSet::LED_2,
        3 => IndicatorSet::LED_3,
        4 => IndicatorSet::LED_1.union(IndicatorSet::LED_2),
        5 => IndicatorSet::LED_1.union(IndicatorSet::LED_3),
        6 => IndicatorSet::LED_2.union(IndicatorSet::LED_3),
        7 => IndicatorSet::LED_1.union(IndicatorSet::LED_2).union(IndicatorSet::LED_3),
        _ => IndicatorSet::empty(),
    }
}

fn paint_layer(layer: u8, ops: &mut dyn KeyboardOps) {
    if let Some(Some(color)) = LAYER_COLORS.get(layer as usize) {
        ops.rgb_setrgb(*color);
    }
}

#[derive(Default)]
pub struct ErgodoxHooks;

impl KeymapHooks<CustomKey> for ErgodoxHooks {
    fn init(&mut self, ops: &mut dyn KeyboardOps) {
        paint_layer(0, ops);
    }

    fn process_custom(&mut self, key: CustomKey, state: KeyState, ops: &mut dyn KeyboardOps) {
        if !state.is_pressed() {
            return;
        }

        match key {
            CustomKey::Eprm => ops.eeconfig_reset(),
            CustomKey::Vrsn => ops.send_string(VERSION_STRING),
            CustomKey::RgbSld => ops.rgb_mode(1),
        }
    }

    fn layer_state_changed(&mut self, state: LayerState, ops: &mut dyn KeyboardOps) -> LayerState {
        let layer = state.highest();
        dev_debug!("Highest layer now {}", layer);

        ops.set_indicators(layer_indicators(layer));
        paint_layer(layer, ops);
        state
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn test_layer_indicators() {
        assert_eq!(layer_indicators(0), IndicatorSet::empty());
        assert_eq!(layer_indicators(3), IndicatorSet::LED_3);
        assert_eq!(layer_indicators(5), IndicatorSet::LED_1 | IndicatorSet::LED_3);
        assert_eq!(layer_indicators(7), IndicatorSet::LED_1 | IndicatorSet::LED_2 | IndicatorSet::LED_3);
        assert_eq!(layer_indicators(8), IndicatorSet::empty());
    }

    #[test]
    fn test_alias_resolution() {
        assert_eq!(custom_key_from_alias!(u:RgbSld), CustomKey::RgbSld);
    }
}
