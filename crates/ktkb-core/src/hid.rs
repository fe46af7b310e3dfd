use core::fmt::Display;

use bitflags::bitflags;
use zerocopy::{FromBytes, Immutable, IntoBytes, TryFromBytes, little_endian::U16};

/// Usages of the HID Keyboard/Keypad page (0x07) that can be placed on a
/// keymap.
#[allow(unused)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, TryFromBytes, Immutable)]
#[repr(u8)]
pub enum KeyCode {
    /// Error emitted by keyboards when the number of maximum simultaneous keys pressed overflows.
    ErrorRollOver = 0x01,

    /// Key a and A
    A = 0x04,
    /// Key b and B
    B = 0x05,
    /// Key c and C
    C = 0x06,
    /// Key d and D
    D = 0x07,
    /// Key e and E
    E = 0x08,
    /// Key f and F
    F = 0x09,
    /// Key g and G
    G = 0x0A,
    /// Key h and H
    H = 0x0B,
    /// Key i and I
    I = 0x0C,
    /// Key j and J
    J = 0x0D,
    /// Key k and K
    K = 0x0E,
    /// Key l and L
    L = 0x0F,
    /// Key m and M
    M = 0x10,
    /// Key n and N
    N = 0x11,
    /// Key o and O
    O = 0x12,
    /// Key p and P
    P = 0x13,
    /// Key q and Q
    Q = 0x14,
    /// Key r and R
    R = 0x15,
    /// Key s and S
    S = 0x16,
    /// Key t and T
    T = 0x17,
    /// Key u and U
    U = 0x18,
    /// Key v and V
    V = 0x19,
    /// Key w and W
    W = 0x1A,
    /// Key x and X
    X = 0x1B,
    /// Key y and Y
    Y = 0x1C,
    /// Key z and Z
    Z = 0x1D,

    /// Key 1 and !
    One = 0x1E,
    /// Key 2 and @
    Two = 0x1F,
    /// Key 3 and #
    Three = 0x20,
    /// Key 4 and $
    Four = 0x21,
    /// Key 5 and %
    Five = 0x22,
    /// Key 6 and ^
    Six = 0x23,
    /// Key 7 and &
    Seven = 0x24,
    /// Key 8 and *
    Eight = 0x25,
    /// Key 9 and (
    Nine = 0x26,
    /// Key 0 and )
    Zero = 0x27,

    Return = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    SpaceBar = 0x2C,
    /// Key - and _
    Hyphen = 0x2D,
    /// Key = and +
    Equals = 0x2E,
    /// Key [ and {
    BracketOpen = 0x2F,
    /// Key ] and }
    BracketClose = 0x30,
    /// Key \ and |
    Backslash = 0x31,
    /// Especial key with a different meaning depending on the locale.
    /// `# ~` on UK layouts, `\ |` on US ones.
    NonUSHash = 0x32,
    /// Key ; and :
    Semicolon = 0x33,
    /// Key ' and "
    Quote = 0x34,
    /// Key ` and ~
    Grave = 0x35,
    /// Key , and <
    Comma = 0x36,
    /// Key . and >
    Period = 0x37,
    /// Key / and ?
    Slash = 0x38,
    CapsLock = 0x39,

    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,
    F5 = 0x3E,
    F6 = 0x3F,
    F7 = 0x40,
    F8 = 0x41,
    F9 = 0x42,
    F10 = 0x43,
    F11 = 0x44,
    F12 = 0x45,

    PrintScreen = 0x46,
    ScrollLock = 0x47,
    Pause = 0x48,
    Insert = 0x49,
    Home = 0x4A,
    PageUp = 0x4B,
    /// Delete forward (or just delete) key
    Delete = 0x4C,
    End = 0x4D,
    PageDown = 0x4E,
    Right = 0x4F,
    Left = 0x50,
    Down = 0x51,
    Up = 0x52,

    /// Num lock and clear key
    NumLock = 0x53,
    KeypadSlash = 0x54,
    KeypadMultiply = 0x55,
    KeypadMinus = 0x56,
    KeypadPlus = 0x57,
    KeypadEnter = 0x58,
    /// Keypad number 1 and End key
    Keypad1 = 0x59,
    /// Keypad number 2 and down arrow key
    Keypad2 = 0x5A,
    /// Keypad number 3 and page down key
    Keypad3 = 0x5B,
    /// Keypad number 4 and left arrow key
    Keypad4 = 0x5C,
    /// Keypad number 5
    Keypad5 = 0x5D,
    /// Keypad number 6 and right arrow key
    Keypad6 = 0x5E,
    /// Keypad number 7 and home key
    Keypad7 = 0x5F,
    /// Keypad number 8 and up arrow
    Keypad8 = 0x60,
    /// Keypad 9 and page up arrow
    Keypad9 = 0x61,
    /// Keypad 0 and insert key
    Keypad0 = 0x62,
    /// Keypad period and delete key
    KeypadPeriod = 0x63,
    /// Especial key with a different meaning depending on the locale.
    /// `\ |` on UK layouts, `< >` on most european ones.
    NonUSBackslash = 0x64,
    /// Application (context menu) key
    Application = 0x65,
    /// Keyboard power, not the system power control of the desktop page.
    Power = 0x66,
    KeypadEquals = 0x67,

    F13 = 0x68,
    F14 = 0x69,
    F15 = 0x6A,
    F16 = 0x6B,
    F17 = 0x6C,
    F18 = 0x6D,
    F19 = 0x6E,
    F20 = 0x6F,
    F21 = 0x70,
    F22 = 0x71,
    F23 = 0x72,
    F24 = 0x73,

    Execute = 0x74,
    Help = 0x75,
    Menu = 0x76,
    Select = 0x77,
    Stop = 0x78,
    Again = 0x79,
    Undo = 0x7A,
    Cut = 0x7B,
    Copy = 0x7C,
    Paste = 0x7D,
    Find = 0x7E,
    KbMute = 0x7F,
    KbVolumeUp = 0x80,
    KbVolumeDown = 0x81,
    LockingCapsLock = 0x82,
    LockingNumLock = 0x83,
    LockingScrollLock = 0x84,
    /// Keypad separator of brazilian layouts.
    KeypadComma = 0x85,
    /// Keypad `=` of AS/400 keyboards.
    KeypadEqualsAs400 = 0x86,

    /// `\ _` (ro) on japanese layouts.
    International1 = 0x87,
    /// Katakana/Hiragana.
    International2 = 0x88,
    /// Yen.
    International3 = 0x89,
    /// Henkan.
    International4 = 0x8A,
    /// Muhenkan.
    International5 = 0x8B,
    International6 = 0x8C,
    International7 = 0x8D,
    International8 = 0x8E,
    International9 = 0x8F,
    /// Hangul/English.
    Lang1 = 0x90,
    /// Hanja.
    Lang2 = 0x91,
    Lang3 = 0x92,
    Lang4 = 0x93,
    Lang5 = 0x94,
    Lang6 = 0x95,
    Lang7 = 0x96,
    Lang8 = 0x97,
    Lang9 = 0x98,

    AlternateErase = 0x99,
    SysReq = 0x9A,
    Cancel = 0x9B,
    Clear = 0x9C,
    Prior = 0x9D,
    /// Second return key of the page. `Return` is the one keyboards send.
    ReturnAlt = 0x9E,
    Separator = 0x9F,
    Out = 0xA0,
    Oper = 0xA1,
    ClearAgain = 0xA2,
    CrSel = 0xA3,
    ExSel = 0xA4,

    LeftControl = 0xE0,
    LeftShift = 0xE1,
    LeftAlt = 0xE2,
    /// Left Windows/Command/Super key
    LeftGui = 0xE3,
    RightControl = 0xE4,
    RightShift = 0xE5,
    RightAlt = 0xE6,
    /// Right Windows/Command/Super key
    RightGui = 0xE7,
}

impl KeyCode {
    #[inline(always)]
    pub const fn usage(self) -> u8 {
        self as u8
    }

    /// The key for a usage id, if the page defines one there.
    pub fn from_usage(usage: u8) -> Option<KeyCode> {
        KeyCode::try_read_from_bytes(&[usage]).ok()
    }

    pub const fn is_modifier(self) -> bool {
        self.usage() >= KeyCode::LeftControl.usage()
    }

    /// The bit that represents this key in the modifiers byte of a
    /// keyboard report, if the key is a modifier.
    pub const fn modifier_bit(self) -> Option<Mods> {
        if self.is_modifier() {
            Some(Mods::from_bits_retain(1 << (self.usage() - KeyCode::LeftControl.usage())))
        } else {
            None
        }
    }
}

bitflags! {
    /// The modifiers byte of a boot keyboard report.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Mods: u8 {
        const LCTRL = 1 << 0;
        const LSHIFT = 1 << 1;
        const LALT = 1 << 2;
        const LGUI = 1 << 3;
        const RCTRL = 1 << 4;
        const RSHIFT = 1 << 5;
        const RALT = 1 << 6;
        const RGUI = 1 << 7;
    }
}

impl Mods {
    /// Exchanges Alt and GUI on both sides of the keyboard.
    pub const fn swap_alt_gui(self) -> Mods {
        let bits = self.bits();
        let alt = bits & (Mods::LALT.bits() | Mods::RALT.bits());
        let gui = bits & (Mods::LGUI.bits() | Mods::RGUI.bits());
        let rest = bits & !(alt | gui);
        Mods::from_bits_retain(rest | (alt << 1) | (gui >> 1))
    }
}

/// Usages of the HID Consumer page (0x0C) reachable from the keymaps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ConsumerKey {
    NextTrack = 0x00B5,
    PrevTrack = 0x00B6,
    Stop = 0x00B7,
    PlayPause = 0x00CD,
    Mute = 0x00E2,
    VolumeUp = 0x00E9,
    VolumeDown = 0x00EA,
    /// AL Calculator
    Calculator = 0x0192,
}

impl ConsumerKey {
    #[inline(always)]
    pub const fn usage(self) -> u16 {
        self as u16
    }
}

/// Boot protocol keyboard input report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable)]
#[repr(C)]
pub struct KeyboardReport {
    pub modifiers: u8,
    pub reserved: u8,
    pub keycodes: [u8; 6],
}

/// Consumer control input report, carrying a single active usage (or 0).
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromBytes, IntoBytes, Immutable)]
#[repr(C)]
pub struct ConsumerReport {
    pub usage: U16,
}

impl ConsumerReport {
    pub fn new(usage: u16) -> Self {
        Self { usage: U16::new(usage) }
    }

    pub fn released() -> Self {
        Self::new(0)
    }
}

/// Relative mouse input report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable)]
#[repr(C)]
pub struct MouseReport {
    pub buttons: u8,
    pub x: i8,
    pub y: i8,
    pub wheel: i8,
    pub pan: i8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Report {
    Keyboard(KeyboardReport),
    Consumer(ConsumerReport),
    Mouse(MouseReport),
}

impl Report {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Report::Keyboard(r) => r.as_bytes(),
            Report::Consumer(r) => r.as_bytes(),
            Report::Mouse(r) => r.as_bytes(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HidError {
    /// The endpoint is busy. The report should be retried later.
    WouldBlock,
    /// The host is gone. Anything pending can be dropped.
    Disconnected,
}

impl Display for HidError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HidError::WouldBlock => write!(f, "HID endpoint busy"),
            HidError::Disconnected => write!(f, "HID host disconnected"),
        }
    }
}

/// Something able to deliver input reports to the USB host. Which
/// endpoints or report ids are used under the hood is implementation
/// specific.
pub trait HidSink {
    fn send_report(&mut self, report: &Report) -> Result<(), HidError>;
}

/// Translates an ASCII character into the key that types it on a US
/// layout, and whether shift must be held for it.
pub const fn ascii_to_key(c: char) -> Option<(KeyCode, bool)> {
    use KeyCode::*;

    let key = match c {
        'a' | 'A' => A,
        'b' | 'B' => B,
        'c' | 'C' => C,
        'd' | 'D' => D,
        'e' | 'E' => E,
        'f' | 'F' => F,
        'g' | 'G' => G,
        'h' | 'H' => H,
        'i' | 'I' => I,
        'j' | 'J' => J,
        'k' | 'K' => K,
        'l' | 'L' => L,
        'm' | 'M' => M,
        'n' | 'N' => N,
        'o' | 'O' => O,
        'p' | 'P' => P,
        'q' | 'Q' => Q,
        'r' | 'R' => R,
        's' | 'S' => S,
        't' | 'T' => T,
        'u' | 'U' => U,
        'v' | 'V' => V,
        'w' | 'W' => W,
        'x' | 'X' => X,
        'y' | 'Y' => Y,
        'z' | 'Z' => Z,
        '1' | '!' => One,
        '2' | '@' => Two,
        '3' | '#' => Three,
        '4' | '$' => Four,
        '5' | '%' => Five,
        '6' | '^' => Six,
        '7' | '&' => Seven,
        '8' | '*' => Eight,
        '9' | '(' => Nine,
        '0' | ')' => Zero,
        '\n' => Return,
        '\t' => Tab,
        ' ' => SpaceBar,
        '-' | '_' => Hyphen,
        '=' | '+' => Equals,
        '[' | '{' => BracketOpen,
        ']' | '}' => BracketClose,
        '\\' | '|' => Backslash,
        ';' | ':' => Semicolon,
        '\'' | '"' => Quote,
        '`' | '~' => Grave,
        ',' | '<' => Comma,
        '.' | '>' => Period,
        '/' | '?' => Slash,
        _ => return None,
    };

    let shifted = matches!(
        c,
        'A'..='Z'
            | '!'
            | '@'
            | '#'
            | '$'
            | '%'
            | '^'
            | '&'
            | '*'
            | '('
            | ')'
            | '_'
            | '+'
            | '{'
            | '}'
            | '|'
            | ':'
            | '"'
            | '~'
            | '<'
            | '>'
            | '?'
    );

    Some((key, shifted))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use zerocopy::IntoBytes;

    use super::*;

    #[test]
    fn test_modifier_bits() {
        assert_eq!(KeyCode::LeftControl.modifier_bit(), Some(Mods::LCTRL));
        assert_eq!(KeyCode::RightShift.modifier_bit(), Some(Mods::RSHIFT));
        assert_eq!(KeyCode::RightGui.modifier_bit(), Some(Mods::RGUI));
        assert_eq!(KeyCode::Z.modifier_bit(), None);
        assert!(!KeyCode::F24.is_modifier());
    }

    #[test]
    fn test_usage_table_is_complete() {
        let defined = (0..=u8::MAX).filter_map(KeyCode::from_usage).collect::<std::vec::Vec<_>>();
        assert_eq!(defined.len(), 1 + (0x04..=0xA4).count() + 8);

        for usage in (0x04..=0xA4).chain(0xE0..=0xE7).chain([0x01]) {
            let key = KeyCode::from_usage(usage).unwrap();
            assert_eq!(key.usage(), usage);
        }
        assert_eq!(KeyCode::from_usage(0xA4), Some(KeyCode::ExSel));
        assert_eq!(KeyCode::from_usage(0x87), Some(KeyCode::International1));
        assert_eq!(KeyCode::from_usage(0x00), None);
        assert_eq!(KeyCode::from_usage(0xA5), None);
        assert_eq!(KeyCode::from_usage(0xE8), None);
    }

    #[test]
    fn test_swap_alt_gui() {
        assert_eq!(Mods::LALT.swap_alt_gui(), Mods::LGUI);
        assert_eq!(Mods::RGUI.swap_alt_gui(), Mods::RALT);
        assert_eq!(
            (Mods::LCTRL | Mods::LALT | Mods::RSHIFT).swap_alt_gui(),
            Mods::LCTRL | Mods::LGUI | Mods::RSHIFT
        );
        assert_eq!((Mods::LALT | Mods::LGUI).swap_alt_gui(), Mods::LALT | Mods::LGUI);
    }

    #[test]
    fn test_report_layouts() {
        let report = KeyboardReport {
            modifiers: Mods::LSHIFT.bits(),
            reserved: 0,
            keycodes: [KeyCode::A.usage(), 0, 0, 0, 0, 0],
        };
        assert_eq!(report.as_bytes(), &[0x02, 0x00, 0x04, 0, 0, 0, 0, 0]);

        let consumer = ConsumerReport::new(ConsumerKey::Calculator.usage());
        assert_eq!(consumer.as_bytes(), &[0x92, 0x01]);

        let mouse = MouseReport { buttons: 1, x: -1, y: 2, wheel: 0, pan: 0 };
        assert_eq!(Report::Mouse(mouse).as_bytes(), &[1, 0xFF, 2, 0, 0]);
    }

    #[test]
    fn test_ascii_to_key() {
        assert_eq!(ascii_to_key('e'), Some((KeyCode::E, false)));
        assert_eq!(ascii_to_key('E'), Some((KeyCode::E, true)));
        assert_eq!(ascii_to_key('@'), Some((KeyCode::Two, true)));
        assert_eq!(ascii_to_key('/'), Some((KeyCode::Slash, false)));
        assert_eq!(ascii_to_key(' '), Some((KeyCode::SpaceBar, false)));
        assert_eq!(ascii_to_key('é'), None);
    }
}
