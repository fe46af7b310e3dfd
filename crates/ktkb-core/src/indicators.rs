use bitflags::bitflags;

bitflags! {
    /// Single color indicator LEDs a board may carry.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct IndicatorSet: u8 {
        /// LED on the controller board itself.
        const BOARD = 1 << 0;
        const LED_1 = 1 << 1;
        const LED_2 = 1 << 2;
        const LED_3 = 1 << 3;
        /// Status pin LED.
        const STATUS = 1 << 4;
    }
}

pub trait IndicatorLeds {
    /// Lights exactly the LEDs in `leds`. Every other indicator is
    /// turned off.
    fn set_indicators(&mut self, leds: IndicatorSet);
}
