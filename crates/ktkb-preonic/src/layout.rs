use crate::{config::TKeymap, custom_key_from_alias};

pub const QWERTY: u8 = 0;
pub const LOCK: u8 = 1;
pub const SYM: u8 = 2;
pub const NAV: u8 = 3;
pub const NUM: u8 = 4;
pub const CONST: u8 = 5;
pub const MOUSE: u8 = 6;
pub const FN: u8 = 7;
pub const LOWER: u8 = 8;
pub const RAISE: u8 = 9;
pub const ADJUST: u8 = 10;

#[rustfmt::skip]
pub static KEYMAP: TKeymap = TKeymap::new(
    ktkb_proc_macros::layers!(
        alias_resolver: custom_key_from_alias,
        layers: [
            {   // 0
                name: "qwerty",
                rows: [
                    [         Esc,             1,                2,            3,           4,               5,  /* | */               6,             7,              8,            9,              0,          Bksp],
                    [         Tab,             Q,                W,            E,           R,               T,  /* | */               Y,             U,              I,            O,              P,           Del],
                    [   tg("nav"),  lt("sym", A),                S, lt("num", D),           F,               G,  /* | */               H,             J,              K,            L, lt("sym", ';'),           Ent],
                    [        LSft,   lt("fn", Z),                X,            C,           V,               B,  /* | */               N,             M,            ',',          '.',            '/',          RSft],
                    [        LCtl,          LGui,       mo("lock"),         LAlt,     u:Lower,  lt("nav", Spc),  /* | */  lt("nav", Spc),       u:Raise,           Left,         Down,             Up, rctl_t(Right)],
                ]
            },
            {   // 1
                name: "lock",
                rows: [
                    [to("qwerty"),             *,                *,            *,           *,               *,  /* | */               *,             *,              *,            *,              *,             *],
                    [           *,             *,                *,            *,           *,               *,  /* | */               *,             *,              *,            *,              *,             *],
                    [           *,    tor("sym"),                *,   tor("num"),           *,               *,  /* | */               *,             *,              *,            *,     tor("sym"),  tor("mouse")],
                    [tor("const"),     tor("fn"),                *,            *,           *,               *,  /* | */               *,             *,              *,            *,              *,             *],
                    [           *,             *,                *,            *,           *,      tor("nav"),  /* | */      tor("nav"),             *,              *,            *,              *,             *],
                ]
            },
            {   // 2
                name: "sym",
                rows: [
                    [to("qwerty"),            F1,               F2,           F3,          F4,              F5,  /* | */              F6,            F7,             F8,           F9,            F10,             *],
                    [           *,           F11,              F12,          '{',         '}',             '!',  /* | */             '+',           '"',           '\'',          '`',            '~',           Ins],
                    [           *,             *,                *,          '(',         ')',             '&',  /* | */             '!',           '=',            '-',          '>',              *,             *],
                    [        Caps,             *,                *,          '<',         '>',             '|',  /* | */             '@',           '/',            '*',         '\\',            '_',             *],
                    [           *,             *,                *,          '[',         ']',               *,  /* | */               *,             *,    c:NextTrack, c:VolumeDown,     c:VolumeUp,   c:PlayPause],
                ]
            },
            {   // 3
                name: "nav",
                rows: [
                    [to("qwerty"),             *,                *,            *,           *,               *,  /* | */               *,             *,              *,            *,              *,             *],
                    [           *,             *,                *,        PrScr,       Pause,       m:WheelUp,  /* | */            PgUp,          Home,             Up,          End,              *,             *],
                    [           *,             *,                *,          Ins,         Del,     m:WheelDown,  /* | */            PgDn,          Left,           Down,        Right,              *,             *],
                    [           *,             *,                *,    m:Button4,   m:Button5,               *,  /* | */               *,             *,              *,            *,              *,             *],
                    [           *,             *,                *,            *,           *,               *,  /* | */               *,             *,              *,            *,              *,             *],
                ]
            },
            {   // 4
                name: "num",
                rows: [
                    [to("qwerty"),             *,                *,            *,           *,               *,  /* | */           NumLk,           Esc,        KpSlash,        KpAst,        KpMinus,             *],
                    [           *,             *,                *,            *,           *,               *,  /* | */               *,           Kp7,            Kp8,          Kp9,      s(KpPlus),             *],
                    [           *,             *,                *,            *,           *,               *,  /* | */               *,           Kp4,            Kp5,          Kp6,         KpPlus,             *],
                    [           *,             *,                *,            *,           *,               *,  /* | */               *,           Kp1,            Kp2,          Kp3,        KpEnter,             *],
                    [           *,             *,                *,            *,           *,               *,  /* | */               *,           Kp0,            Kp0,        KpDot,        KpEnter,             *],
                ]
            },
            {   // 5
                name: "const",
                rows: [
                    [to("qwerty"),             *,                *,            *,           *,               *,  /* | */               *,             *,              *,            *,              *,             *],
                    [           *,          s(Q),             s(W),         s(E),        s(R),            s(T),  /* | */            s(Y),          s(U),           s(I),         s(O),           s(P),             *],
                    [           *,          s(A),             s(S),         s(D),        s(F),            s(G),  /* | */            s(H),          s(J),           s(K),         s(L),              *,             *],
                    [           *,          s(Z),             s(X),         s(C),        s(V),            s(B),  /* | */            s(N),          s(M),              *,            *,              *,             *],
                    [           *,             *,                *,            *,           *,             '_',  /* | */             '_',             *,              *,            *,              *,             *],
                ]
            },
            {   // 6
                name: "mouse",
                rows: [
                    [to("qwerty"),             *,                *,            *,           *,               *,  /* | */               *,             *,              *,            *,              *,             *],
                    [           *,             *,                *,            *,           *,               *,  /* | */       m:WheelUp,     m:Button4,           m:Up,    m:Button5,              *,             *],
                    [           *,             *,         m:Accel0,     m:Accel1,    m:Accel2,               *,  /* | */     m:WheelDown,        m:Left,         m:Down,      m:Right,              *,             *],
                    [           *,             *,                *,            *,           *,               *,  /* | */               *,             *,              *,            *,              *,             *],
                    [           *,             *,                *,            *,           *,       m:Button1,  /* | */       m:Button1,     m:Button2,              *,            *,              *,             *],
                ]
            },
            {   // 7
                name: "fn",
                rows: [
                    [to("qwerty"),            F1,               F2,           F3,          F4,              F5,  /* | */              F6,            F7,             F8,           F9,            F10,             *],
                    [           *,            F1,               F2,           F3,          F4,              F5,  /* | */              F6,            F7,             F8,           F9,            F10,             *],
                    [           *,           F11,              F12,            *,           *,               *,  /* | */               *,             *,              *,            *,              *,             *],
                    [           *,             *,                *,            *,           *,               *,  /* | */               *,             *,              *,            *,              *,             *],
                    [           *,             *,                *,            *,           *,               *,  /* | */               *,             *,              *,            *,              *,             *],
                ]
            },
            {   // 8
                name: "lower",
                rows: [
                    [         '~',           '!',              '@',          '#',         '$',             '%',  /* | */             '^',           '&',            '*',          '(',            ')',          Bksp],
                    [         '~',           '!',              '@',          '#',         '$',             '%',  /* | */             '^',           '&',            '*',          '(',            ')',           Del],
                    [         Del,            F1,               F2,           F3,          F4,              F5,  /* | */              F6,           '_',            '+',          '{',            '}',           '|'],
                    [           *,            F7,               F8,           F9,         F10,             F11,  /* | */             F12,       s(Nuhs),        s(Nubs),         Home,            End,             *],
                    [           *,             *,                *,            *,           *,               *,  /* | */               *,             *,    c:NextTrack, c:VolumeDown,     c:VolumeUp,   c:PlayPause],
                ]
            },
            {   // 9
                name: "raise",
                rows: [
                    [         '`',             1,                2,            3,           4,               5,  /* | */               6,             7,              8,            9,              0,          Bksp],
                    [         '`',             1,                2,            3,           4,               5,  /* | */               6,             7,              8,            9,              0,           Del],
                    [         Del,            F1,               F2,           F3,          F4,              F5,  /* | */              F6,           '-',            '=',          '[',            ']',          '\\'],
                    [           *,            F7,               F8,           F9,         F10,             F11,  /* | */             F12,          Nuhs,           Nubs,         PgUp,           PgDn,             *],
                    [           *,             *,                *,            *,           *,               *,  /* | */               *,             *,    c:NextTrack, c:VolumeDown,     c:VolumeUp,   c:PlayPause],
                ]
            },
            {   // 10
                name: "adjust",
                rows: [
                    [          F1,            F2,               F3,           F4,          F5,              F6,  /* | */              F7,            F8,             F9,          F10,            F11,           F12],
                    [           *, fw:Bootloader,   fw:DebugToggle,            *,           *,               *,  /* | */               *, fw:TerminalOn, fw:TerminalOff,            *,              *,           Del],
                    [           *,             *, fw:MusicModeNext,   fw:AudioOn, fw:AudioOff, fw:AltGuiNormal,  /* | */   fw:AltGuiSwap,      u:Qwerty,              *,            *,              *,             *],
                    [           *,  fw:VoiceDown,       fw:VoiceUp,   fw:MusicOn, fw:MusicOff,       fw:MidiOn,  /* | */      fw:MidiOff,             *,              *,            *,              *,             *],
                    [           *,             *,                *,            *,           *,               *,  /* | */               *,             *,              *,            *,              *,             *],
                ]
            },
        ]
    )
);
