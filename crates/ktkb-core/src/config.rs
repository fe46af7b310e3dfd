use core::time::Duration;

/// Timings and policies used to tell taps from holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TapHoldConfig {
    /// How long a tap-hold key must be held to count as a hold.
    pub tapping_term: Duration,
    /// Resolve as hold as soon as another key goes down.
    pub hold_on_other_key_press: bool,
    /// Resolve as hold when another key is pressed and released while
    /// the tap-hold key is still down.
    pub permissive_hold: bool,
    /// Consecutive taps a tap-toggle key needs to lock its layer.
    pub tapping_toggle: u8,
}

impl TapHoldConfig {
    pub const fn new() -> Self {
        Self {
            tapping_term: Duration::from_millis(200),
            hold_on_other_key_press: false,
            permissive_hold: false,
            tapping_toggle: 5,
        }
    }
}

impl Default for TapHoldConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MouseKeyConfig {
    /// Wait between the first report of a held movement key and the
    /// start of the repetition.
    pub delay: Duration,
    pub interval: Duration,
    /// Cursor delta per report for the default speed.
    pub move_delta: i8,
    /// Cursor delta per report while accel 0, 1 or 2 is held.
    pub accel_deltas: [i8; 3],
    pub wheel_delta: i8,
    pub wheel_interval: Duration,
}

impl MouseKeyConfig {
    pub const fn new() -> Self {
        Self {
            delay: Duration::from_millis(300),
            interval: Duration::from_millis(50),
            move_delta: 8,
            accel_deltas: [2, 8, 24],
            wheel_delta: 1,
            wheel_interval: Duration::from_millis(100),
        }
    }
}

impl Default for MouseKeyConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Steps applied by the underglow keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RgbSteps {
    pub hue_step: u8,
    pub sat_step: u8,
    pub val_step: u8,
    pub val_limit: u8,
    /// Number of effect modes the board knows about. Mode 1 is a static
    /// color.
    pub modes: u8,
}

impl RgbSteps {
    pub const fn new() -> Self {
        Self { hue_step: 8, sat_step: 17, val_step: 17, val_limit: 255, modes: 10 }
    }
}

impl Default for RgbSteps {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile time configuration of a keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyboardConfig {
    pub tap_hold: TapHoldConfig,
    pub mouse: MouseKeyConfig,
    pub rgb: RgbSteps,
    /// Number of backlight levels, not counting "off".
    pub backlight_levels: u8,
}

impl KeyboardConfig {
    pub const fn new() -> Self {
        Self {
            tap_hold: TapHoldConfig::new(),
            mouse: MouseKeyConfig::new(),
            rgb: RgbSteps::new(),
            backlight_levels: 3,
        }
    }
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self::new()
    }
}
