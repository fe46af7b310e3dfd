/// Physical state of a key switch.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum KeyState {
    #[default]
    Released = 0,
    Pressed = 1,
}

impl KeyState {
    pub const fn from_bool(value: bool) -> KeyState {
        match value {
            true => KeyState::Pressed,
            false => KeyState::Released,
        }
    }

    pub const fn to_bool(self) -> bool {
        match self {
            KeyState::Released => false,
            KeyState::Pressed => true,
        }
    }

    pub const fn is_pressed(self) -> bool {
        self.to_bool()
    }
}

/// Runs the first block when the given [`KeyState`] is pressed, the
/// second one when it is released.
#[macro_export]
macro_rules! do_on_key_state {
    ($st:expr, $on_pressed:block, $on_released:block) => {
        match $st {
            $crate::KeyState::Pressed => $on_pressed,
            $crate::KeyState::Released => $on_released,
        }
    };
}
