use bitflags::bitflags;
use ktkb_common::time::Instant;

use crate::{config::MouseKeyConfig, hid::MouseReport, keys::MouseKey};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MouseButtons: u8 {
        const BUTTON_1 = 1 << 0;
        const BUTTON_2 = 1 << 1;
        const BUTTON_3 = 1 << 2;
        const BUTTON_4 = 1 << 3;
        const BUTTON_5 = 1 << 4;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    struct Motion: u8 {
        const UP = 1 << 0;
        const DOWN = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const WHEEL_UP = 1 << 4;
        const WHEEL_DOWN = 1 << 5;
        const WHEEL_LEFT = 1 << 6;
        const WHEEL_RIGHT = 1 << 7;
    }
}

impl Motion {
    const CURSOR: Motion = Motion::UP.union(Motion::DOWN).union(Motion::LEFT).union(Motion::RIGHT);
    const WHEEL: Motion = Motion::WHEEL_UP
        .union(Motion::WHEEL_DOWN)
        .union(Motion::WHEEL_LEFT)
        .union(Motion::WHEEL_RIGHT);
}

enum MouseKeyKind {
    Button(MouseButtons),
    Motion(Motion),
    Accel(u8),
}

fn classify(key: MouseKey) -> MouseKeyKind {
    match key {
        MouseKey::Up => MouseKeyKind::Motion(Motion::UP),
        MouseKey::Down => MouseKeyKind::Motion(Motion::DOWN),
        MouseKey::Left => MouseKeyKind::Motion(Motion::LEFT),
        MouseKey::Right => MouseKeyKind::Motion(Motion::RIGHT),
        MouseKey::WheelUp => MouseKeyKind::Motion(Motion::WHEEL_UP),
        MouseKey::WheelDown => MouseKeyKind::Motion(Motion::WHEEL_DOWN),
        MouseKey::WheelLeft => MouseKeyKind::Motion(Motion::WHEEL_LEFT),
        MouseKey::WheelRight => MouseKeyKind::Motion(Motion::WHEEL_RIGHT),
        MouseKey::Button1 => MouseKeyKind::Button(MouseButtons::BUTTON_1),
        MouseKey::Button2 => MouseKeyKind::Button(MouseButtons::BUTTON_2),
        MouseKey::Button3 => MouseKeyKind::Button(MouseButtons::BUTTON_3),
        MouseKey::Button4 => MouseKeyKind::Button(MouseButtons::BUTTON_4),
        MouseKey::Button5 => MouseKeyKind::Button(MouseButtons::BUTTON_5),
        MouseKey::Accel0 => MouseKeyKind::Accel(0),
        MouseKey::Accel1 => MouseKeyKind::Accel(1),
        MouseKey::Accel2 => MouseKeyKind::Accel(2),
    }
}

/// Emulates a mouse with keys. Every method returns the report to send,
/// if the state change must be notified to the host.
#[derive(Clone, Debug)]
pub struct MouseKeys {
    config: MouseKeyConfig,
    buttons: MouseButtons,
    motion: Motion,
    accel: Option<u8>,
    cursor_since: Instant,
    wheel_since: Instant,
    last_cursor: Instant,
    last_wheel: Instant,
}

impl MouseKeys {
    pub const fn new(config: MouseKeyConfig) -> Self {
        Self {
            config,
            buttons: MouseButtons::empty(),
            motion: Motion::empty(),
            accel: None,
            cursor_since: Instant::from_millis(0),
            wheel_since: Instant::from_millis(0),
            last_cursor: Instant::from_millis(0),
            last_wheel: Instant::from_millis(0),
        }
    }

    pub const fn buttons(&self) -> MouseButtons {
        self.buttons
    }

    pub fn is_moving(&self) -> bool {
        !self.motion.is_empty()
    }

    fn cursor_delta(&self) -> i8 {
        match self.accel {
            Some(level) => self.config.accel_deltas[(level as usize).min(2)],
            None => self.config.move_delta,
        }
    }

    fn axis(&self, negative: Motion, positive: Motion, delta: i8) -> i8 {
        let mut v: i8 = 0;
        if self.motion.contains(negative) {
            v = v.saturating_sub(delta);
        }
        if self.motion.contains(positive) {
            v = v.saturating_add(delta);
        }
        v
    }

    fn report(&self, cursor: bool, wheel: bool) -> MouseReport {
        let mut report = MouseReport { buttons: self.buttons.bits(), ..Default::default() };
        if cursor {
            let d = self.cursor_delta();
            report.x = self.axis(Motion::LEFT, Motion::RIGHT, d);
            report.y = self.axis(Motion::UP, Motion::DOWN, d);
        }
        if wheel {
            let d = self.config.wheel_delta;
            report.wheel = self.axis(Motion::WHEEL_DOWN, Motion::WHEEL_UP, d);
            report.pan = self.axis(Motion::WHEEL_LEFT, Motion::WHEEL_RIGHT, d);
        }
        report
    }

    pub fn press(&mut self, key: MouseKey, now: Instant) -> Option<MouseReport> {
        match classify(key) {
            MouseKeyKind::Button(b) => {
                self.buttons.insert(b);
                Some(self.report(false, false))
            }
            MouseKeyKind::Motion(m) => {
                if Motion::CURSOR.contains(m) {
                    if !self.motion.intersects(Motion::CURSOR) {
                        self.cursor_since = now;
                    }
                    self.motion.insert(m);
                    self.last_cursor = now;
                    Some(self.report(true, false))
                } else {
                    if !self.motion.intersects(Motion::WHEEL) {
                        self.wheel_since = now;
                    }
                    self.motion.insert(m);
                    self.last_wheel = now;
                    Some(self.report(false, true))
                }
            }
            MouseKeyKind::Accel(level) => {
                self.accel = Some(level);
                None
            }
        }
    }

    pub fn release(&mut self, key: MouseKey, _now: Instant) -> Option<MouseReport> {
        match classify(key) {
            MouseKeyKind::Button(b) => {
                self.buttons.remove(b);
                Some(self.report(false, false))
            }
            MouseKeyKind::Motion(m) => {
                self.motion.remove(m);
                Some(self.report(false, false))
            }
            MouseKeyKind::Accel(level) => {
                if self.accel == Some(level) {
                    self.accel = None;
                }
                None
            }
        }
    }

    /// Repeats the movement of the held keys once their interval elapses.
    pub fn tick(&mut self, now: Instant) -> Option<MouseReport> {
        let cfg = self.config;
        let cursor = self.motion.intersects(Motion::CURSOR)
            && now.has_elapsed(self.cursor_since, cfg.delay)
            && now.has_elapsed(self.last_cursor, cfg.interval);
        let wheel = self.motion.intersects(Motion::WHEEL)
            && now.has_elapsed(self.wheel_since, cfg.delay)
            && now.has_elapsed(self.last_wheel, cfg.wheel_interval);

        if cursor {
            self.last_cursor = now;
        }
        if wheel {
            self.last_wheel = now;
        }

        if cursor || wheel { Some(self.report(cursor, wheel)) } else { None }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn test_buttons_report_immediately() {
        let mut mk = MouseKeys::new(MouseKeyConfig::new());
        let r = mk.press(MouseKey::Button1, at(0)).unwrap();
        assert_eq!(r.buttons, 1);
        let r = mk.press(MouseKey::Button4, at(1)).unwrap();
        assert_eq!(r.buttons, 0b1001);
        let r = mk.release(MouseKey::Button1, at(2)).unwrap();
        assert_eq!(r.buttons, 0b1000);
    }

    #[test]
    fn test_cursor_moves_then_repeats_after_delay() {
        let cfg = MouseKeyConfig::new();
        let mut mk = MouseKeys::new(cfg);
        let r = mk.press(MouseKey::Right, at(0)).unwrap();
        assert_eq!((r.x, r.y), (cfg.move_delta, 0));

        assert_eq!(mk.tick(at(100)), None);
        let r = mk.tick(at(300)).unwrap();
        assert_eq!(r.x, cfg.move_delta);
        assert_eq!(mk.tick(at(320)), None);
        assert!(mk.tick(at(350)).is_some());

        let r = mk.release(MouseKey::Right, at(360)).unwrap();
        assert_eq!(r.x, 0);
        assert_eq!(mk.tick(at(1000)), None);
    }

    #[test]
    fn test_accel_changes_delta() {
        let cfg = MouseKeyConfig::new();
        let mut mk = MouseKeys::new(cfg);
        assert_eq!(mk.press(MouseKey::Accel2, at(0)), None);
        let r = mk.press(MouseKey::Up, at(1)).unwrap();
        assert_eq!(r.y, -cfg.accel_deltas[2]);
        mk.release(MouseKey::Accel2, at(2));
        let r = mk.press(MouseKey::Left, at(3)).unwrap();
        assert_eq!((r.x, r.y), (-cfg.move_delta, -cfg.move_delta));
    }

    #[test]
    fn test_opposite_directions_cancel() {
        let mut mk = MouseKeys::new(MouseKeyConfig::new());
        mk.press(MouseKey::Left, at(0));
        let r = mk.press(MouseKey::Right, at(1)).unwrap();
        assert_eq!(r.x, 0);
    }

    #[test]
    fn test_wheel() {
        let cfg = MouseKeyConfig::new();
        let mut mk = MouseKeys::new(cfg);
        let r = mk.press(MouseKey::WheelDown, at(0)).unwrap();
        assert_eq!(r.wheel, -cfg.wheel_delta);
        assert_eq!((r.x, r.y), (0, 0));
    }
}
