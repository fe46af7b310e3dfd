use std::collections::HashMap;

use proc_macro2::{Ident, Span};

use crate::KeyRef;

// QMK style short names, mapped to the `KeyCode` variant they stand
// for. Any other identifier is taken as a variant name as is.
thread_local! {
    static KNOWN_STANDARD_KEY_ALIASES: HashMap<KeyRef, &'static str> = {
        let mut aliases = HashMap::new();
        for (alias, variant) in [
            ("Esc", "Escape"),
            ("Bksp", "Backspace"),
            ("Ent", "Return"),
            ("Enter", "Return"),
            ("Spc", "SpaceBar"),
            ("Space", "SpaceBar"),
            ("Del", "Delete"),
            ("Ins", "Insert"),
            ("Insrt", "Insert"),
            ("PgUp", "PageUp"),
            ("PgDn", "PageDown"),
            ("Caps", "CapsLock"),
            ("PrScr", "PrintScreen"),
            ("ScrLk", "ScrollLock"),
            ("NumLk", "NumLock"),
            ("App", "Application"),
            ("LCtl", "LeftControl"),
            ("LSft", "LeftShift"),
            ("LAlt", "LeftAlt"),
            ("LGui", "LeftGui"),
            ("RCtl", "RightControl"),
            ("RSft", "RightShift"),
            ("RAlt", "RightAlt"),
            ("RGui", "RightGui"),
            ("Kp0", "Keypad0"),
            ("Kp1", "Keypad1"),
            ("Kp2", "Keypad2"),
            ("Kp3", "Keypad3"),
            ("Kp4", "Keypad4"),
            ("Kp5", "Keypad5"),
            ("Kp6", "Keypad6"),
            ("Kp7", "Keypad7"),
            ("Kp8", "Keypad8"),
            ("Kp9", "Keypad9"),
            ("KpSlash", "KeypadSlash"),
            ("KpAst", "KeypadMultiply"),
            ("KpMinus", "KeypadMinus"),
            ("KpPlus", "KeypadPlus"),
            ("KpDot", "KeypadPeriod"),
            ("KpEnter", "KeypadEnter"),
            ("KpEq", "KeypadEquals"),
            ("Nuhs", "NonUSHash"),
            ("Nubs", "NonUSBackslash"),
            ("Exec", "Execute"),
            ("Slct", "Select"),
            ("Agin", "Again"),
            ("Pste", "Paste"),
            ("LCap", "LockingCapsLock"),
            ("LNum", "LockingNumLock"),
            ("LScr", "LockingScrollLock"),
            ("KpComma", "KeypadComma"),
            ("Int1", "International1"),
            ("Int2", "International2"),
            ("Int3", "International3"),
            ("Int4", "International4"),
            ("Int5", "International5"),
            ("Int6", "International6"),
            ("Int7", "International7"),
            ("Int8", "International8"),
            ("Int9", "International9"),
            ("Eras", "AlternateErase"),
            ("Clr", "Clear"),
            ("Prir", "Prior"),
            ("Retn", "ReturnAlt"),
            ("Sepr", "Separator"),
            ("Clag", "ClearAgain"),
            ("CrSl", "CrSel"),
            ("ExSl", "ExSel"),
        ] {
            aliases.insert(KeyRef::ident(alias), variant);
        }

        for (n, variant) in ["Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine"]
            .into_iter()
            .enumerate()
        {
            aliases.insert(KeyRef::litnum(n as u32), variant);
        }

        aliases
    };
}

/// The key typing `c` on a US layout, and whether it needs shift.
fn char_key(c: char) -> Option<(&'static str, bool)> {
    let unshifted = match c {
        'a'..='z' => return None,
        '1' => "One",
        '2' => "Two",
        '3' => "Three",
        '4' => "Four",
        '5' => "Five",
        '6' => "Six",
        '7' => "Seven",
        '8' => "Eight",
        '9' => "Nine",
        '0' => "Zero",
        '-' => "Hyphen",
        '=' => "Equals",
        '[' => "BracketOpen",
        ']' => "BracketClose",
        '\\' => "Backslash",
        ';' => "Semicolon",
        '\'' => "Quote",
        '`' => "Grave",
        ',' => "Comma",
        '.' => "Period",
        '/' => "Slash",
        ' ' => "SpaceBar",
        _ => "",
    };
    if !unshifted.is_empty() {
        return Some((unshifted, false));
    }

    let shifted = match c {
        '!' => "One",
        '@' => "Two",
        '#' => "Three",
        '$' => "Four",
        '%' => "Five",
        '^' => "Six",
        '&' => "Seven",
        '*' => "Eight",
        '(' => "Nine",
        ')' => "Zero",
        '_' => "Hyphen",
        '+' => "Equals",
        '{' => "BracketOpen",
        '}' => "BracketClose",
        '|' => "Backslash",
        ':' => "Semicolon",
        '"' => "Quote",
        '~' => "Grave",
        '<' => "Comma",
        '>' => "Period",
        '?' => "Slash",
        _ => return None,
    };
    Some((shifted, true))
}

/// Translates a key reference into the `KeyCode` variant it names, and
/// whether shift must be held to type it.
pub fn translate_standard_key(key: &KeyRef, span: Span) -> Option<(Ident, bool)> {
    if let Some(variant) = KNOWN_STANDARD_KEY_ALIASES.with(|map| map.get(key).copied()) {
        return Some((Ident::new(variant, span), false));
    }

    match key {
        KeyRef::Ident(name) => Some((Ident::new(name, span), false)),
        KeyRef::LitInt(_) => None,
        KeyRef::LitChr(c) => char_key(*c).map(|(variant, shifted)| (Ident::new(variant, span), shifted)),
    }
}

/// Bits of the `Mods` flags added by a modifier wrapper such as
/// `lctl(..)`.
pub fn modifier_bits(func: &str) -> Option<u8> {
    Some(match func {
        "lctl" => 0x01,
        "s" | "lsft" => 0x02,
        "lalt" => 0x04,
        "lgui" => 0x08,
        "rctl" => 0x10,
        "rsft" => 0x20,
        "ralt" => 0x40,
        "rgui" => 0x80,
        _ => return None,
    })
}

/// Bits held by a mod-tap function such as `rctl_t(..)`.
pub fn mod_tap_bits(func: &str) -> Option<u8> {
    let base = func.strip_suffix("_t")?;
    if base == "s" {
        return None;
    }
    modifier_bits(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(key: KeyRef) -> Option<(String, bool)> {
        translate_standard_key(&key, Span::call_site()).map(|(i, s)| (i.to_string(), s))
    }

    #[test]
    fn test_aliases_and_passthrough_names() {
        assert_eq!(variant(KeyRef::ident("Bksp")), Some(("Backspace".to_string(), false)));
        assert_eq!(variant(KeyRef::ident("Home")), Some(("Home".to_string(), false)));
        assert_eq!(variant(KeyRef::litnum(0)), Some(("Zero".to_string(), false)));
        assert_eq!(variant(KeyRef::litnum(12)), None);
        assert_eq!(variant(KeyRef::ident("Int1")), Some(("International1".to_string(), false)));
        assert_eq!(variant(KeyRef::ident("Retn")), Some(("ReturnAlt".to_string(), false)));
        assert_eq!(variant(KeyRef::ident("Lang2")), Some(("Lang2".to_string(), false)));
    }

    #[test]
    fn test_chars() {
        assert_eq!(variant(KeyRef::LitChr('{')), Some(("BracketOpen".to_string(), true)));
        assert_eq!(variant(KeyRef::LitChr('/')), Some(("Slash".to_string(), false)));
        assert_eq!(variant(KeyRef::LitChr('a')), None);
    }

    #[test]
    fn test_modifier_functions() {
        assert_eq!(modifier_bits("s"), Some(0x02));
        assert_eq!(mod_tap_bits("rctl_t"), Some(0x10));
        assert_eq!(mod_tap_bits("s_t"), None);
        assert_eq!(mod_tap_bits("lctl"), None);
    }
}
