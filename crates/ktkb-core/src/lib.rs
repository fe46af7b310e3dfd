#![no_std]

pub mod backlight;
pub mod board;
pub mod config;
pub mod eeconfig;
pub mod hid;
pub mod indicators;
pub mod keyboard;
pub mod keymap;
pub mod keys;
pub mod layers;
pub mod mouse;
pub mod report;
pub mod rgb;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
