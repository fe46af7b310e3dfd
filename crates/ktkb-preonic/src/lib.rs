//! Keymap of a Preonic. Most layers are reached from the lock layer,
//! which switches to them when the key is released.

#![no_std]

pub mod config;
mod keys;
pub mod layout;

pub use keys::{CustomKey, PreonicHooks};

use config::{COLS, KEYBOARD_CONFIG, LAYERS, ROWS};
use ktkb_common::time::Instant;
use ktkb_core::{board::Board, keyboard::Keyboard};

pub type PreonicKeyboard<B> = Keyboard<'static, CustomKey, PreonicHooks, B, LAYERS, ROWS, COLS>;

pub fn keyboard<B: Board>(board: B, now: Instant) -> PreonicKeyboard<B> {
    Keyboard::new(&layout::KEYMAP, KEYBOARD_CONFIG, PreonicHooks, board, now)
}
