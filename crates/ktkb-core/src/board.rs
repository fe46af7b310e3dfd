use crate::{
    backlight::BacklightDriver, eeconfig::Eeprom, hid::HidSink, indicators::IndicatorLeds, rgb::RgbDriver,
};

/// Everything the keyboard can drive on the physical board.
pub trait Board: HidSink + IndicatorLeds + RgbDriver + BacklightDriver {
    type Eeprom: Eeprom;

    fn eeprom(&mut self) -> &mut Self::Eeprom;

    /// Reboots into the bootloader. On real hardware this never returns.
    fn jump_to_bootloader(&mut self);
}
