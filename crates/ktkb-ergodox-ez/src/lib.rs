//! Keymap of an ErgoDox EZ: six layers reached mostly through
//! tap-toggle and layer-tap keys, with the right hand LEDs and the
//! underglow showing the highest active layer.

#![no_std]

pub mod config;
mod keys;
pub mod layout;

pub use keys::{CustomKey, ErgodoxHooks, layer_indicators};

use config::{COLS, KEYBOARD_CONFIG, LAYERS, ROWS};
use ktkb_common::time::Instant;
use ktkb_core::{board::Board, keyboard::Keyboard};

pub type ErgodoxKeyboard<B> = Keyboard<'static, CustomKey, ErgodoxHooks, B, LAYERS, ROWS, COLS>;

/// Builds the keyboard on top of `board`. [`Keyboard::init`] must still
/// be called before feeding it events.
pub fn keyboard<B: Board>(board: B, now: Instant) -> ErgodoxKeyboard<B> {
    Keyboard::new(&layout::KEYMAP, KEYBOARD_CONFIG, ErgodoxHooks, board, now)
}
