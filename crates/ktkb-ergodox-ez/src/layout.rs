use crate::{config::TKeymap, custom_key_from_alias};

pub const BASE: u8 = 0;
pub const SYMBOLS: u8 = 1;
pub const MOUSE: u8 = 2;
pub const ARROWS: u8 = 3;
pub const NUMPAD: u8 = 4;
pub const LOCK: u8 = 5;

// Rows 0 to 4 hold the left half in columns 0 to 6 and the right half
// in columns 7 to 13. Row 5 holds both thumb clusters.
#[rustfmt::skip]
pub static KEYMAP: TKeymap = TKeymap::new(
    ktkb_proc_macros::layers!(
        alias_resolver: custom_key_from_alias,
        layers: [
            {   // 0
                name: "base",
                rows: [
                    [             Esc,                1,         2,               3,               4,           5,             *,  /* | */             *,            6,                 7,         8,           9,                  0,          Bksp],
                    [             Tab,                Q,         W,               E,               R,           T, tt("symbols"),  /* | */  tt("arrows"),            Y,                 U,         I,           O,                  P,           Del],
                    [lt("lock", Caps), lt("symbols", A),         S, lt("numpad", D), lt("arrows", F),           G,             _,  /* | */             _,            H,                 J,         K,           L, lt("symbols", ';'),           Ent],
                    [            LSft,                Z,         X,               C,               V,           B,   tt("mouse"),  /* | */  tt("numpad"),            N,                 M,       ',',         '.',                '/',          RSft],
                    [            LCtl,             LGui,         *,             Spc,            LAlt,           _,             _,  /* | */             _,            _, lt("arrows", Spc),      Left,        Down,                 Up, rctl_t(Right)],
                    [             Ins,              Del,     PrScr,      lalt(Left),   lctl(lsft(R)),       Pause,             _,  /* | */             _,         Home,               End,      PgUp,        PgDn,      lalt(lsft(R)),     lctl(Spc)],
                ]
            },
            {   // 1
                name: "symbols",
                rows: [
                    [      to("base"),               F1,        F2,              F3,              F4,          F5,           F11,  /* | */           F12,           F6,                F7,        F8,          F9,                F10,             *],
                    [               *,                *,         *,             '{',             '}',         '!',             *,  /* | */             *,          '+',               '"',      '\'',         '`',                '~',           Ins],
                    [               *,                *,         *,             '(',             ')',         '&',             _,  /* | */             _,          '!',               '=',       '-',         '>',                  *,             *],
                    [               *,                *,         *,             '<',             '>',         '|',             *,  /* | */             *,          '@',               '/',       '*',        '\\',                '_',             *],
                    [               *,                *,         *,             '[',             ']',           _,             _,  /* | */             _,            _,                 *,         *,           *,                  *,             *],
                    [               *,                *,         *,     lalt(Right),               *,           *,             _,  /* | */             _,            *,                 *,         *,           *,                  *,             *],
                ]
            },
            {   // 2
                name: "mouse",
                rows: [
                    [      to("base"),                *,         *,               *,               *,           *,             *,  /* | */             *,            *,                 *,         *,           *,       c:Calculator,             *],
                    [               *,                *,         *,            m:Up,               *,           *,             *,  /* | */             *,            *,                 *,         *,           *,                  *,             *],
                    [               *,                *,    m:Left,          m:Down,         m:Right,           *,             _,  /* | */             _,            *,          m:Accel0,  m:Accel1,    m:Accel2,                  *,             *],
                    [               *,                *,         *,               *,               *,           *,             *,  /* | */             *,            *,                 *,         *,           *,                  *,             *],
                    [               *,                *,         *,               *,               *,           _,             _,  /* | */             _,            _,                 *,         *,           *,                  *,             *],
                    [      rgb:Toggle,                *, rgb:HueUp,       m:Button1,       m:Button2, rgb:HueDown,             _,  /* | */             _, rgb:ModeNext,          u:RgbSld, rgb:ValUp, rgb:ValDown,                  *,             *],
                ]
            },
            {   // 3
                name: "arrows",
                rows: [
                    [      to("base"),                *,         *,               *,               *,           *,             *,  /* | */             *,            *,                 *,         *,           *,                  *,             *],
                    [               *,                *,         *,               *,               *,           *,             *,  /* | */             *,         PgUp,              Home,        Up,         End,                  *,             *],
                    [               *,                *,         *,               *,               *,           *,             _,  /* | */             _,         PgDn,              Left,      Down,       Right,                  *,             *],
                    [               *,                *,         *,               *,               *,           *,             *,  /* | */             *,            *,                 *,         *,           *,                  *,             *],
                    [               *,                *,         *,               *,               *,           _,             _,  /* | */             _,            _,                 *,         *,           *,                  *,             *],
                    [               *,                *,         *,               *,               *,           *,             _,  /* | */             _,            *,                 *,         *,           *,                  *,             *],
                ]
            },
            {   // 4
                name: "numpad",
                rows: [
                    [      to("base"),                *,         *,               *,               *,           *,             *,  /* | */         NumLk,            *,               Esc,   KpSlash,       KpAst,            KpMinus,             *],
                    [               *,                *,         *,               *,               *,           *,             *,  /* | */             *,            *,               Kp7,       Kp8,         Kp9,       lsft(KpPlus),             *],
                    [               *,                *,         *,               *,               *,           *,             _,  /* | */             _,            *,               Kp4,       Kp5,         Kp6,             KpPlus,             *],
                    [               *,                *,         *,               *,               *,           *,             *,  /* | */             *,            *,               Kp1,       Kp2,         Kp3,                Ent,             *],
                    [               *,                *,         *,               *,               *,           _,             _,  /* | */             _,            _,               Kp0,       Kp0,       KpDot,                Ent,             *],
                    [               *,                *,         *,               *,               *,           *,             _,  /* | */             _,            *,                 *,         *,           *,                  *,           Spc],
                ]
            },
            {   // 5
                name: "lock",
                rows: [
                    [               *,                *,         *,               *,               *,           *,             *,  /* | */             *,            *,                 *,         *,           *,                  *,             *],
                    [               *,                *,         *,               *,               *,           *,             *,  /* | */             *,            *,                 *,         *,           *,                  *,             *],
                    [               *,    to("symbols"),         *,    to("numpad"),    to("arrows"),           *,             _,  /* | */             _,            *,                 *,         *,           *,      to("symbols"),             *],
                    [               *,                *,         *,               *,               *,           *,             *,  /* | */             *,            *,                 *,         *,           *,                  *,             *],
                    [               *,                *,         *,               *,               *,           _,             _,  /* | */             _,            _,      to("arrows"),         *,           *,                  *,             *],
                    [               *,                *,         *,               *,               *,           *,             _,  /* | */             _,            *,                 *,         *,           *,                  *,             *],
                ]
            },
        ]
    )
);
