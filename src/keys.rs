// Copyright (c) 2025 cellterm contributors. Licensed under Apache License, Version 2.0.

//! Key event and key code types.
//!
//! Key codes occupy two disjoint ranges so a raw `u16` can never be ambiguous: control
//! characters sit at the bottom (`0x00..=0x1F` plus `0x7F`), and named keys (function
//! keys, arrows, navigation) count down from `0xFFFF` so they never collide with either
//! control characters or printable Unicode scalars stored in [`KeyEvent::ch`].

/// ALT modifier bit in [`KeyEvent::modifiers`]. Currently the only modifier tracked.
pub const MOD_ALT: u8 = 0x01;

/// Control-character key codes, with their terminal mnemonics.
pub mod ctrl {
    pub const ENTER: u16 = 0x0D;
    pub const TAB: u16 = 0x09;
    pub const ESC: u16 = 0x1B;
    pub const BACKSPACE: u16 = 0x08;
    pub const BACKSPACE2: u16 = 0x7F;
    pub const SPACE: u16 = 0x20;
    pub const CTRL_A: u16 = 0x01;
    pub const CTRL_C: u16 = 0x03;
}

macro_rules! named_keys {
    ($($name:ident = $offset:expr),+ $(,)?) => {
        $(
            #[doc = concat!("Key code for ", stringify!($name), ".")]
            pub const $name: u16 = 0xFFFF - $offset;
        )+
    };
}

named_keys! {
    F1 = 0,
    F2 = 1,
    F3 = 2,
    F4 = 3,
    F5 = 4,
    F6 = 5,
    F7 = 6,
    F8 = 7,
    F9 = 8,
    F10 = 9,
    F11 = 10,
    F12 = 11,
    INSERT = 12,
    DELETE = 13,
    HOME = 14,
    END = 15,
    PGUP = 16,
    PGDN = 17,
    ARROW_UP = 18,
    ARROW_DOWN = 19,
    ARROW_LEFT = 20,
    ARROW_RIGHT = 21,
}

/// One delivered unit of keyboard input: either a printable character or a named key,
/// optionally modified.
///
/// Exactly one of `ch` / `key` is nonzero in any event produced by
/// [`mod@crate::input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyEvent {
    /// Nonzero iff this event is a printable character.
    pub ch: char,
    /// Nonzero iff this event is a non-printable key (control char or named key).
    pub key: u16,
    /// Modifier bit field; currently only [`MOD_ALT`] is defined.
    pub modifiers: u8,
}

impl KeyEvent {
    /// Build a character event, no modifiers.
    #[must_use]
    pub const fn char(ch: char) -> Self {
        Self {
            ch,
            key: 0,
            modifiers: 0,
        }
    }

    /// Build a character event with ALT set.
    #[must_use]
    pub const fn alt_char(ch: char) -> Self {
        Self {
            ch,
            key: 0,
            modifiers: MOD_ALT,
        }
    }

    /// Build a named/control key event, no modifiers.
    #[must_use]
    pub const fn key(key: u16) -> Self {
        Self {
            ch: '\0',
            key,
            modifiers: 0,
        }
    }

    /// Build a named/control key event with ALT set.
    #[must_use]
    pub const fn alt_key(key: u16) -> Self {
        Self {
            ch: '\0',
            key,
            modifiers: MOD_ALT,
        }
    }

    #[must_use]
    pub const fn is_alt(self) -> bool { self.modifiers & MOD_ALT != 0 }
}
