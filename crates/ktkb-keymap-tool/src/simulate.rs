use std::{fmt::Debug, time::Duration};

use ktkb_common::time::{Clock, Instant};
use ktkb_core::{
    hid::Report,
    keyboard::{Keyboard, KeymapHooks},
    keymap::{KeyEvent, KeyPos},
    sim::SimBoard,
};
use log::warn;

use crate::steps::{Step, TAP_MILLIS};

/// Time between two ticks while waiting.
const TICK_MILLIS: u64 = 10;

/// A clock only moving forward when told to.
#[derive(Clone, Copy, Debug, Default)]
pub struct ManualClock {
    now: Instant,
}

impl ManualClock {
    pub fn advance(&mut self, millis: u64) {
        self.now = self.now.checked_add(Duration::from_millis(millis)).unwrap_or(self.now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now
    }
}

pub fn describe_report(report: &Report) -> String {
    match report {
        Report::Keyboard(r) => {
            let keys = r.keycodes.iter().filter(|k| **k != 0).map(|k| format!("{k:#04x}")).collect::<Vec<_>>();
            format!("keyboard mods={:#04x} keys=[{}]", r.modifiers, keys.join(", "))
        }
        Report::Consumer(r) => format!("consumer usage={:#06x}", r.usage.get()),
        Report::Mouse(r) => {
            format!("mouse buttons={:#04x} x={} y={} wheel={} pan={}", r.buttons, r.x, r.y, r.wheel, r.pan)
        }
    }
}

/// Runs `steps` on a keyboard built on a [`SimBoard`], and returns what
/// the host and the board would have seen, one line per event.
pub fn simulate<C, U, const LAYERS: usize, const ROWS: usize, const COLS: usize>(
    kb: &mut Keyboard<'static, C, U, SimBoard, LAYERS, ROWS, COLS>,
    clock: &mut ManualClock,
    steps: &[Step],
) -> Vec<String>
where
    C: Copy + Debug,
    U: KeymapHooks<C>,
{
    let mut out = Vec::new();
    let mut drain = |kb: &mut Keyboard<'static, C, U, SimBoard, LAYERS, ROWS, COLS>, now: Instant| {
        for report in kb.board_mut().take_reports() {
            out.push(format!("{:>6}ms {}", now.millis(), describe_report(&report)));
        }
    };

    for step in steps {
        let (row, col) = match *step {
            Step::Press(r, c) | Step::Release(r, c) | Step::Tap(r, c) => (r, c),
            Step::Wait(millis) => {
                let Some(target) = clock.now().millis().checked_add(millis) else {
                    warn!("Skipping {:?}, the clock would overflow", step);
                    continue;
                };
                while clock.now().millis() < target {
                    clock.advance(TICK_MILLIS.min(target - clock.now().millis()));
                    kb.tick(clock.now());
                    drain(kb, clock.now());
                }
                continue;
            }
        };

        if !kb.keymap().contains(KeyPos::new(row, col)) {
            warn!("Skipping {:?}, position out of the keymap", step);
            continue;
        }

        if matches!(step, Step::Press(..) | Step::Tap(..)) {
            kb.process(KeyEvent::press(row, col, clock.now()));
            drain(kb, clock.now());
        }
        if matches!(step, Step::Tap(..)) {
            clock.advance(TAP_MILLIS);
            kb.tick(clock.now());
            drain(kb, clock.now());
        }
        if matches!(step, Step::Release(..) | Step::Tap(..)) {
            kb.process(KeyEvent::release(row, col, clock.now()));
            drain(kb, clock.now());
        }
    }

    out
}

/// Final state of the keyboard after a simulation.
pub fn summary<C, U, const LAYERS: usize, const ROWS: usize, const COLS: usize>(
    kb: &Keyboard<'static, C, U, SimBoard, LAYERS, ROWS, COLS>,
) -> Vec<String>
where
    C: Copy + Debug,
    U: KeymapHooks<C>,
{
    let board = kb.board();
    let current = kb.current_layer();
    vec![
        format!("layers: {} (default {})", kb.layer_state(), kb.default_layer_state()),
        format!("current layer: {} {}", current, kb.keymap().layer_name(current).unwrap_or("?")),
        format!("indicators: {:?}", board.indicators),
        format!("underglow: #{:02x}{:02x}{:02x} mode {}", board.rgb.r, board.rgb.g, board.rgb.b, board.rgb_mode),
        format!("backlight: {}", board.backlight_level),
    ]
}
