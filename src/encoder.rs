// Copyright (c) 2025 cellterm contributors. Licensed under Apache License, Version 2.0.

//! The terminfo-driven output encoder: capability lookup plus an attribute-state
//! machine that suppresses redundant SGR resets and cursor moves.
//!
//! [`AttrState`] remembers the last-emitted `(fg, bg)` pair and cursor position so
//! [`mod@crate::render`]'s diff loop only has to ask "did anything change since the
//! last cell we wrote?" rather than re-deriving the terminal's state from scratch.

use std::io::{self, Write};

use tracing::trace;

use crate::{
    capabilities::Capabilities,
    cell::{color_index, has_blink, has_bold},
    utf8,
};

/// Sentinel fg/bg value: no real descriptor can equal this (the low nibble tops out at
/// 7), so the first SGR emission after construction or a forced redraw always fires.
const SENTINEL_COLOR: u16 = 0xFFFF;
/// Sentinel cursor x: one less than any real column, guaranteeing the first cursor
/// move after construction or a forced redraw always fires.
const SENTINEL_X: i64 = -2;

/// Tracks what the terminal last had written to it, so repeated identical SGR or
/// cursor-move sequences can be elided.
#[derive(Debug)]
pub struct AttrState {
    last_fg: u16,
    last_bg: u16,
    last_x: i64,
    last_y: i64,
}

impl Default for AttrState {
    fn default() -> Self { Self::new() }
}

impl AttrState {
    /// A freshly reset state: the next `(fg, bg)` and cursor-move emission are both
    /// guaranteed to fire regardless of what they are.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_fg: SENTINEL_COLOR,
            last_bg: SENTINEL_COLOR,
            last_x: SENTINEL_X,
            last_y: SENTINEL_X,
        }
    }

    /// Force the next SGR and cursor-move emission, as after a full redraw.
    pub fn reset(&mut self) { *self = Self::new(); }

    /// Emit an SGR change (reset + parameterized color + bold/blink) if `(fg, bg)`
    /// differs from what was last written, then remember the new pair.
    fn write_attrs(
        &mut self,
        out: &mut impl Write,
        caps: &Capabilities,
        fg: u16,
        bg: u16,
    ) -> io::Result<()> {
        if fg == self.last_fg && bg == self.last_bg {
            return Ok(());
        }

        out.write_all(caps.sgr_reset.as_bytes())?;
        let sgr = caps
            .sgr_fg_bg
            .replacen("{0}", &color_index(fg).to_string(), 1)
            .replacen("{1}", &color_index(bg).to_string(), 1);
        out.write_all(sgr.as_bytes())?;
        if has_bold(fg) {
            out.write_all(caps.bold.as_bytes())?;
        }
        if has_blink(bg) {
            out.write_all(caps.blink.as_bytes())?;
        }

        self.last_fg = fg;
        self.last_bg = bg;
        Ok(())
    }

    /// Move the cursor to `(x, y)` (0-based) if the last emission did not just
    /// naturally advance the cursor into this cell, then remember the new position.
    /// Always re-emits at the start of a row (`x == 0`).
    fn write_cursor_move(
        &mut self,
        out: &mut impl Write,
        caps: &Capabilities,
        x: usize,
        y: usize,
    ) -> io::Result<()> {
        let (xi, yi) = (x as i64, y as i64);
        let advanced_naturally = x != 0 && self.last_y == yi && self.last_x == xi - 1;
        if !advanced_naturally {
            let seq = caps
                .cursor_move
                .replacen("{0}", &(y + 1).to_string(), 1)
                .replacen("{1}", &(x + 1).to_string(), 1);
            out.write_all(seq.as_bytes())?;
        }
        self.last_x = xi;
        self.last_y = yi;
        Ok(())
    }

    /// Write one cell's worth of output: attribute change (if needed), cursor move (if
    /// needed), then the character itself encoded as UTF-8. Advances the remembered
    /// cursor position to `(x, y)` so the next call in the same row can detect a run.
    pub fn write_cell(
        &mut self,
        out: &mut impl Write,
        caps: &Capabilities,
        x: usize,
        y: usize,
        ch: char,
        fg: u16,
        bg: u16,
    ) -> io::Result<()> {
        self.write_attrs(out, caps, fg, bg)?;
        self.write_cursor_move(out, caps, x, y)?;
        let mut utf8_buf = [0u8; 4];
        let n = utf8::encode(ch, &mut utf8_buf);
        out.write_all(&utf8_buf[..n])?;
        trace!(x, y, ch = %ch, "wrote cell");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cell::{Color, BLINK, BOLD};

    fn caps() -> Capabilities { Capabilities::resolve("xterm").unwrap() }

    #[test]
    fn first_cell_always_emits_sgr_and_cursor_move() {
        let mut state = AttrState::new();
        let mut out = Vec::new();
        state
            .write_cell(&mut out, &caps(), 3, 1, 'A', Color::Red.index(), Color::Black.index())
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b[0m"));
        assert!(text.contains("\x1b[31;40m"));
        assert!(text.contains("\x1b[2;4H"));
        assert!(text.ends_with('A'));
    }

    #[test]
    fn unchanged_attrs_do_not_re_emit_sgr() {
        let mut state = AttrState::new();
        let mut out = Vec::new();
        state
            .write_cell(&mut out, &caps(), 0, 0, 'a', Color::Red.index(), Color::Black.index())
            .unwrap();
        out.clear();
        state
            .write_cell(&mut out, &caps(), 2, 0, 'b', Color::Red.index(), Color::Black.index())
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("\x1b[31;40m"), "must not repeat identical SGR");
    }

    #[test]
    fn run_of_adjacent_cells_elides_cursor_moves() {
        let mut state = AttrState::new();
        let mut out = Vec::new();
        for (i, ch) in "Hello".chars().enumerate() {
            state
                .write_cell(&mut out, &caps(), i, 0, ch, Color::White.index(), Color::Black.index())
                .unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("\x1b[1;1H").count(), 1, "exactly one cursor move");
        assert!(text.ends_with("Hello"));
    }

    #[test]
    fn cursor_move_always_re_emitted_at_start_of_row() {
        let mut state = AttrState::new();
        let mut out = Vec::new();
        state
            .write_cell(&mut out, &caps(), 4, 0, 'x', Color::White.index(), Color::Black.index())
            .unwrap();
        out.clear();
        state
            .write_cell(&mut out, &caps(), 0, 1, 'y', Color::White.index(), Color::Black.index())
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b[2;1H"));
    }

    #[test]
    fn bold_and_blink_attribute_bits_emit_extra_sequences() {
        let mut state = AttrState::new();
        let mut out = Vec::new();
        state
            .write_cell(
                &mut out,
                &caps(),
                0,
                0,
                'x',
                Color::Red.index() | BOLD,
                Color::Black.index() | BLINK,
            )
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b[1m"));
        assert!(text.contains("\x1b[5m"));
    }

    #[test]
    fn reset_forces_fresh_sgr_and_cursor_move() {
        let mut state = AttrState::new();
        let mut out = Vec::new();
        state
            .write_cell(&mut out, &caps(), 0, 0, 'x', Color::Red.index(), Color::Black.index())
            .unwrap();
        state.reset();
        out.clear();
        state
            .write_cell(&mut out, &caps(), 1, 0, 'y', Color::Red.index(), Color::Black.index())
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b[31;40m"));
        assert!(text.contains("\x1b[1;2H"));
    }
}
