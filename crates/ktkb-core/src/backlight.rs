use ktkb_common::dev_debug;

pub trait BacklightDriver {
    /// Level 0 is off.
    fn set_backlight_level(&mut self, level: u8);
}

/// Single color backlight with a fixed number of brightness levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backlight {
    level: u8,
    levels: u8,
}

impl Backlight {
    pub const fn new(levels: u8) -> Self {
        Self { level: 0, levels }
    }

    pub const fn level(&self) -> u8 {
        self.level
    }

    pub const fn levels(&self) -> u8 {
        self.levels
    }

    /// Sets the level, clamped to the maximum one.
    pub fn set_level<D: BacklightDriver + ?Sized>(&mut self, level: u8, driver: &mut D) {
        self.level = level.min(self.levels);
        driver.set_backlight_level(self.level);
    }

    /// Goes one level up, wrapping to off after the brightest level.
    pub fn step<D: BacklightDriver + ?Sized>(&mut self, driver: &mut D) {
        let next = if self.level >= self.levels { 0 } else { self.level + 1 };
        dev_debug!("Backlight level {} -> {}", self.level, next);
        self.set_level(next, driver);
    }
}
