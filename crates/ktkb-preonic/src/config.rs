use ktkb_core::{config::KeyboardConfig, keymap::Keymap};

use crate::CustomKey;

pub const LAYERS: usize = 11;
pub const ROWS: usize = 5;
pub const COLS: usize = 12;

pub type TKeymap = Keymap<CustomKey, LAYERS, ROWS, COLS>;

pub const KEYBOARD_CONFIG: KeyboardConfig = KeyboardConfig::new();
