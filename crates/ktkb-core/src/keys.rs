use core::fmt::{Debug, Display, Write};

use crate::hid::{ConsumerKey, KeyCode, Mods};

/// Whether a layer switch takes effect when the key goes down or up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActivateOn {
    Press,
    Release,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerAction {
    /// Layer active only while the key is held.
    Momentary(u8),
    /// Flips the layer when the key is released.
    Toggle(u8),
    /// Makes the layer the only active one.
    To(u8, ActivateOn),
    /// Momentary while held, toggled after enough consecutive taps.
    TapToggle(u8),
    /// Momentary layer when held, the key when tapped.
    LayerTap(u8, KeyCode),
    /// Replaces the default layer, without persisting it.
    DefaultSet(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseKey {
    Up,
    Down,
    Left,
    Right,
    WheelUp,
    WheelDown,
    WheelLeft,
    WheelRight,
    Button1,
    Button2,
    Button3,
    Button4,
    Button5,
    Accel0,
    Accel1,
    Accel2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RgbAction {
    Toggle,
    ModeNext,
    ModePrev,
    HueUp,
    HueDown,
    SatUp,
    SatDown,
    ValUp,
    ValDown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FirmwareAction {
    /// Reboots into the bootloader so new firmware can be flashed.
    Bootloader,
    DebugToggle,
    /// Restores the persisted configuration to its defaults.
    EepromReset,
    AudioOn,
    AudioOff,
    MusicOn,
    MusicOff,
    MusicModeNext,
    MidiOn,
    MidiOff,
    VoiceUp,
    VoiceDown,
    TerminalOn,
    TerminalOff,
    /// Alt and GUI keep their usual meaning.
    AltGuiNormal,
    /// Alt and GUI are reported as each other.
    AltGuiSwap,
}

/// What a key does. `C` is the type of the custom keys defined by the
/// keymap, handled by its [`KeymapHooks`](crate::keyboard::KeymapHooks).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action<C> {
    NoOp,
    /// Takes the action of the next active layer below.
    Transparent,
    Key(KeyCode),
    /// A key sent together with the given modifiers.
    Modified(Mods, KeyCode),
    /// The key when tapped, the modifiers when held.
    ModTap(Mods, KeyCode),
    Consumer(ConsumerKey),
    Mouse(MouseKey),
    Layer(LayerAction),
    Rgb(RgbAction),
    Firmware(FirmwareAction),
    Custom(C),
}

impl<C> Action<C> {
    /// Whether the action can only be told apart from its tap
    /// behaviour after some time or some other key event.
    pub const fn is_tap_hold(&self) -> bool {
        matches!(
            self,
            Action::ModTap(..) | Action::Layer(LayerAction::LayerTap(..))
        )
    }
}

impl<C> From<KeyCode> for Action<C> {
    fn from(value: KeyCode) -> Self {
        Action::Key(value)
    }
}

fn write_mods(f: &mut core::fmt::Formatter<'_>, mods: Mods) -> core::fmt::Result {
    for (i, (name, _)) in mods.iter_names().enumerate() {
        if i > 0 {
            f.write_char('+')?;
        }
        f.write_str(name)?;
    }
    Ok(())
}

impl<C: Debug> Display for Action<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Action::NoOp => f.write_char('_'),
            Action::Transparent => f.write_char('*'),
            Action::Key(k) => write!(f, "{k:?}"),
            Action::Modified(mods, k) => {
                write_mods(f, *mods)?;
                write!(f, "({k:?})")
            }
            Action::ModTap(mods, k) => {
                write!(f, "{k:?}/")?;
                write_mods(f, *mods)
            }
            Action::Consumer(c) => write!(f, "{c:?}"),
            Action::Mouse(m) => write!(f, "Ms{m:?}"),
            Action::Layer(layer) => match layer {
                LayerAction::Momentary(l) => write!(f, "MO({l})"),
                LayerAction::Toggle(l) => write!(f, "TG({l})"),
                LayerAction::To(l, ActivateOn::Press) => write!(f, "TO({l})"),
                LayerAction::To(l, ActivateOn::Release) => write!(f, "TOR({l})"),
                LayerAction::TapToggle(l) => write!(f, "TT({l})"),
                LayerAction::LayerTap(l, k) => write!(f, "LT({l},{k:?})"),
                LayerAction::DefaultSet(l) => write!(f, "DF({l})"),
            },
            Action::Rgb(a) => write!(f, "Rgb{a:?}"),
            Action::Firmware(a) => write!(f, "{a:?}"),
            Action::Custom(c) => write!(f, "{c:?}"),
        }
    }
}
