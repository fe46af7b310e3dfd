use ktkb_common::dev_debug;
use serde::{Deserialize, Serialize};

use crate::{config::RgbSteps, keys::RgbAction};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }

    /// Integer HSV to RGB conversion. The hue circle is split in six
    /// regions of 43 steps.
    pub const fn to_rgb(self) -> Rgb {
        if self.s == 0 {
            return Rgb::new(self.v, self.v, self.v);
        }

        let h = self.h as u16;
        let s = self.s as u16;
        let v = self.v as u16;

        let region = h / 43;
        let remainder = (h - region * 43) * 6;

        let p = ((v * (255 - s)) >> 8) as u8;
        let q = ((v * (255 - ((s * remainder) >> 8))) >> 8) as u8;
        let t = ((v * (255 - ((s * (255 - remainder)) >> 8))) >> 8) as u8;
        let v = self.v;

        match region {
            0 => Rgb::new(v, t, p),
            1 => Rgb::new(q, v, p),
            2 => Rgb::new(p, v, t),
            3 => Rgb::new(p, q, v),
            4 => Rgb::new(t, p, v),
            _ => Rgb::new(v, p, q),
        }
    }
}

pub trait RgbDriver {
    /// Paints the whole strip with `color`.
    fn write_rgb(&mut self, color: Rgb);
    fn set_rgb_mode(&mut self, mode: u8);
}

/// Persisted state of the underglow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbConfig {
    pub enabled: bool,
    pub mode: u8,
    pub hue: u8,
    pub sat: u8,
    pub val: u8,
}

impl RgbConfig {
    pub const fn new() -> Self {
        Self { enabled: true, mode: 1, hue: 0, sat: 255, val: 255 }
    }
}

impl Default for RgbConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Underglow state, rendered through a [`RgbDriver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RgbLight {
    config: RgbConfig,
    steps: RgbSteps,
}

impl RgbLight {
    pub const fn new(steps: RgbSteps) -> Self {
        Self { config: RgbConfig::new(), steps }
    }

    pub const fn config(&self) -> RgbConfig {
        self.config
    }

    pub const fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub const fn mode(&self) -> u8 {
        self.config.mode
    }

    pub const fn hsv(&self) -> Hsv {
        Hsv::new(self.config.hue, self.config.sat, self.config.val)
    }

    pub fn restore<D: RgbDriver + ?Sized>(&mut self, config: RgbConfig, driver: &mut D) {
        self.config = config;
        self.config.mode = self.config.mode.clamp(1, self.steps.modes.max(1));
        self.config.val = self.config.val.min(self.steps.val_limit);
        self.render(driver);
    }

    /// Sends the current mode and color to the driver.
    pub fn render<D: RgbDriver + ?Sized>(&self, driver: &mut D) {
        if self.config.enabled {
            driver.set_rgb_mode(self.config.mode);
            driver.write_rgb(self.hsv().to_rgb());
        } else {
            driver.write_rgb(Rgb::OFF);
        }
    }

    /// Paints a color directly, leaving the stored hue, saturation and
    /// value untouched. Ignored while the underglow is off.
    pub fn setrgb<D: RgbDriver + ?Sized>(&self, color: Rgb, driver: &mut D) {
        if self.config.enabled {
            driver.write_rgb(color);
        }
    }

    pub fn set_mode<D: RgbDriver + ?Sized>(&mut self, mode: u8, driver: &mut D) {
        self.config.mode = mode.clamp(1, self.steps.modes.max(1));
        dev_debug!("Underglow mode {}", self.config.mode);
        self.render(driver);
    }

    /// Applies the effect of an underglow key.
    pub fn handle<D: RgbDriver + ?Sized>(&mut self, action: RgbAction, driver: &mut D) {
        let steps = self.steps;
        let c = &mut self.config;
        match action {
            RgbAction::Toggle => c.enabled = !c.enabled,
            RgbAction::ModeNext => {
                c.mode = if c.mode >= steps.modes { 1 } else { c.mode + 1 };
            }
            RgbAction::ModePrev => {
                c.mode = if c.mode <= 1 { steps.modes.max(1) } else { c.mode - 1 };
            }
            RgbAction::HueUp => c.hue = c.hue.wrapping_add(steps.hue_step),
            RgbAction::HueDown => c.hue = c.hue.wrapping_sub(steps.hue_step),
            RgbAction::SatUp => c.sat = c.sat.saturating_add(steps.sat_step),
            RgbAction::SatDown => c.sat = c.sat.saturating_sub(steps.sat_step),
            RgbAction::ValUp => c.val = c.val.saturating_add(steps.val_step).min(steps.val_limit),
            RgbAction::ValDown => c.val = c.val.saturating_sub(steps.val_step),
        }
        self.render(driver);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;

    #[derive(Default)]
    struct Strip {
        colors: Vec<Rgb>,
        mode: u8,
    }

    impl RgbDriver for Strip {
        fn write_rgb(&mut self, color: Rgb) {
            self.colors.push(color);
        }

        fn set_rgb_mode(&mut self, mode: u8) {
            self.mode = mode;
        }
    }

    #[test]
    fn test_hsv_to_rgb_primaries() {
        assert_eq!(Hsv::new(0, 255, 255).to_rgb(), Rgb::new(255, 0, 0));
        assert_eq!(Hsv::new(85, 255, 255).to_rgb().g, 255);
        assert_eq!(Hsv::new(170, 255, 255).to_rgb().b, 255);
        assert_eq!(Hsv::new(123, 0, 77).to_rgb(), Rgb::new(77, 77, 77));
    }

    #[test]
    fn test_toggle_blanks_strip() {
        let mut light = RgbLight::new(RgbSteps::new());
        let mut strip = Strip::default();
        light.handle(RgbAction::Toggle, &mut strip);
        assert!(!light.is_enabled());
        assert_eq!(strip.colors.last(), Some(&Rgb::OFF));

        light.setrgb(Rgb::new(1, 2, 3), &mut strip);
        assert_eq!(strip.colors.last(), Some(&Rgb::OFF));
    }

    #[test]
    fn test_hue_wraps_and_val_saturates() {
        let mut light = RgbLight::new(RgbSteps::new());
        let mut strip = Strip::default();
        light.handle(RgbAction::HueDown, &mut strip);
        assert_eq!(light.hsv().h, 248);
        light.handle(RgbAction::ValUp, &mut strip);
        assert_eq!(light.hsv().v, 255);
        light.handle(RgbAction::ValDown, &mut strip);
        assert_eq!(light.hsv().v, 238);
    }

    #[test]
    fn test_mode_cycles() {
        let mut light = RgbLight::new(RgbSteps { modes: 3, ..RgbSteps::new() });
        let mut strip = Strip::default();
        light.handle(RgbAction::ModePrev, &mut strip);
        assert_eq!(light.mode(), 3);
        light.handle(RgbAction::ModeNext, &mut strip);
        assert_eq!(light.mode(), 1);
        light.set_mode(2, &mut strip);
        assert_eq!(strip.mode, 2);
    }

    #[test]
    fn test_setrgb_keeps_hsv() {
        let light = RgbLight::new(RgbSteps::new());
        let mut strip = Strip::default();
        light.setrgb(Rgb::new(0, 0, 255), &mut strip);
        assert_eq!(strip.colors, [Rgb::new(0, 0, 255)]);
        assert_eq!(light.hsv(), Hsv::new(0, 255, 255));
    }
}
