//! A board that only records what the keyboard asks it to do.

use heapless::Vec;
use ktkb_common::dev_warn;

use crate::{
    backlight::BacklightDriver,
    board::Board,
    eeconfig::RamEeprom,
    hid::{HidError, HidSink, Report},
    indicators::{IndicatorLeds, IndicatorSet},
    rgb::{Rgb, RgbDriver},
};

pub const SIM_REPORTS: usize = 512;
pub const SIM_EEPROM_SIZE: usize = 256;

#[derive(Clone, Debug)]
pub struct SimBoard {
    pub reports: Vec<Report, SIM_REPORTS>,
    pub indicators: IndicatorSet,
    pub rgb: Rgb,
    pub rgb_mode: u8,
    pub backlight_level: u8,
    pub bootloader_requests: u32,
    pub eeprom: RamEeprom<SIM_EEPROM_SIZE>,
    /// While set, every report is refused with [`HidError::WouldBlock`].
    pub busy: bool,
    /// While set, every report is refused with [`HidError::Disconnected`].
    pub disconnected: bool,
}

impl SimBoard {
    pub const fn new() -> Self {
        Self {
            reports: Vec::new(),
            indicators: IndicatorSet::empty(),
            rgb: Rgb::OFF,
            rgb_mode: 0,
            backlight_level: 0,
            bootloader_requests: 0,
            eeprom: RamEeprom::new(),
            busy: false,
            disconnected: false,
        }
    }

    /// Returns the reports received so far, forgetting them.
    pub fn take_reports(&mut self) -> Vec<Report, SIM_REPORTS> {
        core::mem::take(&mut self.reports)
    }
}

impl Default for SimBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl HidSink for SimBoard {
    fn send_report(&mut self, report: &Report) -> Result<(), HidError> {
        if self.disconnected {
            return Err(HidError::Disconnected);
        }
        if self.busy {
            return Err(HidError::WouldBlock);
        }
        if self.reports.push(*report).is_err() {
            dev_warn!("Simulated host full, report refused");
            return Err(HidError::WouldBlock);
        }
        Ok(())
    }
}

impl IndicatorLeds for SimBoard {
    fn set_indicators(&mut self, leds: IndicatorSet) {
        self.indicators = leds;
    }
}

impl RgbDriver for SimBoard {
    fn write_rgb(&mut self, color: Rgb) {
        self.rgb = color;
    }

    fn set_rgb_mode(&mut self, mode: u8) {
        self.rgb_mode = mode;
    }
}

impl BacklightDriver for SimBoard {
    fn set_backlight_level(&mut self, level: u8) {
        self.backlight_level = level;
    }
}

impl Board for SimBoard {
    type Eeprom = RamEeprom<SIM_EEPROM_SIZE>;

    fn eeprom(&mut self) -> &mut Self::Eeprom {
        &mut self.eeprom
    }

    fn jump_to_bootloader(&mut self) {
        self.bootloader_requests += 1;
    }
}
