use ktkb_core::{config::KeyboardConfig, keymap::Keymap, rgb::Rgb};

use crate::CustomKey;

// The total layers of the layout.
pub const LAYERS: usize = 6;

// Each half is 7 columns wide. The thumb clusters share the last row,
// with the 2 middle columns left unused.
pub const ROWS: usize = 6;
pub const COLS: usize = 14;

pub type TKeymap = Keymap<CustomKey, LAYERS, ROWS, COLS>;

pub const KEYBOARD_CONFIG: KeyboardConfig = {
    let mut config = KeyboardConfig::new();
    // A single tap on a TT key locks its layer.
    config.tap_hold.tapping_toggle = 1;
    config
};

/// Underglow color for each layer, indexed by the highest active layer.
pub const LAYER_COLORS: [Option<Rgb>; 8] = [
    Some(Rgb::new(0x00, 0x00, 0x00)),
    Some(Rgb::new(0x00, 0x00, 0xFF)),
    Some(Rgb::new(0xFF, 0x00, 0x00)),
    Some(Rgb::new(0x00, 0xFF, 0x00)),
    Some(Rgb::new(0xFF, 0xFF, 0x00)),
    Some(Rgb::new(0x00, 0xFF, 0xFF)),
    Some(Rgb::new(0xFF, 0x00, 0xFF)),
    Some(Rgb::new(0xFF, 0xFF, 0xFF)),
];

/// Typed by the `Vrsn` key.
pub const VERSION_STRING: &str = concat!("ergodox_ez/ktao @ ", env!("CARGO_PKG_VERSION"));
