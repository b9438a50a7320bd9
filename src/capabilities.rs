// Copyright (c) 2025 cellterm contributors. Licensed under Apache License, Version 2.0.

//! A small, compiled-in table of resolved terminfo capability strings, selected by
//! `$TERM` prefix.
//!
//! Full terminfo database parsing (`tgetent`/`infocmp`) is explicitly out of scope (see
//! the crate's top-level documentation); instead this module hardcodes the handful of
//! capability strings that matter for the ANSI/VT100 terminal families this crate
//! targets, in the style of the original `termbox` library's built-in compatibility
//! table. [`Capabilities::resolve`] is the only entry point external callers need.

use crate::keys;

/// Resolved capability strings plus the input key-sequence table for one terminal
/// family.
///
/// All of these are plain templates: the `{0}`/`{1}` placeholders in the parameterized
/// capabilities are filled in by [`mod@crate::encoder`] with `format!`, which plays the
/// role terminfo's `%p1%d`-style parameter substitution would in a full terminfo
/// consumer.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    pub enter_ca: &'static str,
    pub exit_ca: &'static str,
    pub show_cursor: &'static str,
    pub hide_cursor: &'static str,
    pub clear_screen: &'static str,
    /// `{0}` = row (1-based), `{1}` = column (1-based).
    pub cursor_move: &'static str,
    pub sgr_reset: &'static str,
    /// `{0}` = fg color index 0-7, `{1}` = bg color index 0-7.
    pub sgr_fg_bg: &'static str,
    pub bold: &'static str,
    pub blink: &'static str,
    pub enter_keypad: &'static str,
    pub exit_keypad: &'static str,
    /// Recognized input key-sequence strings, ordered longest-match-first, mapped to
    /// the logical key code they produce.
    pub key_sequences: &'static [(&'static str, u16)],
}

/// ANSI/xterm-family capabilities, which cover xterm, screen, rxvt, linux, and Eterm
/// closely enough that termbox itself ships a single shared table for them.
const ANSI: Capabilities = Capabilities {
    enter_ca: "\x1b[?1049h",
    exit_ca: "\x1b[?1049l",
    show_cursor: "\x1b[?25h",
    hide_cursor: "\x1b[?25l",
    clear_screen: "\x1b[2J",
    cursor_move: "\x1b[{0};{1}H",
    sgr_reset: "\x1b[0m",
    sgr_fg_bg: "\x1b[3{0};4{1}m",
    bold: "\x1b[1m",
    blink: "\x1b[5m",
    enter_keypad: "\x1b[?1h\x1b=",
    exit_keypad: "\x1b[?1l\x1b>",
    key_sequences: &KEY_SEQUENCES,
};

/// The closed set of input key-sequence strings recognized across the terminal
/// families above, each mapped to a logical key code (see [`mod@crate::keys`]).
///
/// Ordered so that no prefix of one entry equals another entry, which is true of this
/// table as written — no explicit longest-match sorting is required.
const KEY_SEQUENCES: [(&str, u16); 24] = [
    ("\x1bOP", keys::F1),
    ("\x1bOQ", keys::F2),
    ("\x1bOR", keys::F3),
    ("\x1bOS", keys::F4),
    ("\x1b[15~", keys::F5),
    ("\x1b[17~", keys::F6),
    ("\x1b[18~", keys::F7),
    ("\x1b[19~", keys::F8),
    ("\x1b[20~", keys::F9),
    ("\x1b[21~", keys::F10),
    ("\x1b[23~", keys::F11),
    ("\x1b[24~", keys::F12),
    ("\x1b[2~", keys::INSERT),
    ("\x1b[3~", keys::DELETE),
    ("\x1b[H", keys::HOME),
    ("\x1b[1~", keys::HOME),
    ("\x1b[F", keys::END),
    ("\x1b[4~", keys::END),
    ("\x1b[5~", keys::PGUP),
    ("\x1b[6~", keys::PGDN),
    ("\x1b[A", keys::ARROW_UP),
    ("\x1b[B", keys::ARROW_DOWN),
    ("\x1b[C", keys::ARROW_RIGHT),
    ("\x1b[D", keys::ARROW_LEFT),
];

impl Capabilities {
    /// Resolve a capability table for the given `$TERM` value.
    ///
    /// Returns `None` if no entry in the compiled-in table matches, which the caller
    /// (`Session::init`) turns into [`crate::Error::UnsupportedTerminal`].
    #[must_use]
    pub fn resolve(term: &str) -> Option<Self> {
        const PREFIXES: &[&str] = &["xterm", "screen", "rxvt", "linux", "Eterm", "tmux", "vt100"];
        if PREFIXES.iter().any(|p| term.starts_with(p)) {
            Some(ANSI)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn resolves_known_term_prefixes() {
        assert!(Capabilities::resolve("xterm-256color").is_some());
        assert!(Capabilities::resolve("screen.xterm").is_some());
        assert!(Capabilities::resolve("rxvt-unicode").is_some());
    }

    #[test]
    fn rejects_unknown_term() {
        assert!(Capabilities::resolve("dumb").is_none());
        assert!(Capabilities::resolve("").is_none());
    }

    #[test]
    fn every_named_key_has_a_sequence() {
        let covered: Vec<u16> = KEY_SEQUENCES.iter().map(|&(_, code)| code).collect();
        for code in [
            keys::F1, keys::F2, keys::F3, keys::F4, keys::F5, keys::F6, keys::F7, keys::F8,
            keys::F9, keys::F10, keys::F11, keys::F12, keys::INSERT, keys::DELETE, keys::HOME,
            keys::END, keys::PGUP, keys::PGDN, keys::ARROW_UP, keys::ARROW_DOWN,
            keys::ARROW_LEFT, keys::ARROW_RIGHT,
        ] {
            assert!(covered.contains(&code), "no sequence maps to {code:#06x}");
        }
    }

    #[test]
    fn no_key_sequence_is_a_prefix_of_another() {
        for (i, (seq_a, _)) in KEY_SEQUENCES.iter().enumerate() {
            for (j, (seq_b, _)) in KEY_SEQUENCES.iter().enumerate() {
                if i != j {
                    assert!(
                        !seq_b.starts_with(seq_a) || seq_a.len() >= seq_b.len(),
                        "{seq_a:?} is a strict prefix of {seq_b:?}"
                    );
                }
            }
        }
    }
}
