// Copyright (c) 2025 cellterm contributors. Licensed under Apache License, Version 2.0.

//! The render engine: a back buffer the application writes into, a front buffer that
//! mirrors what is currently on screen, and a diff-based [`RenderEngine::present`] that
//! drives the output encoder to emit only what changed.

use std::io::{self, Write};

use tracing::trace;

use crate::{
    buffer::CellBuffer,
    capabilities::Capabilities,
    cell::Cell,
    encoder::AttrState,
};

/// Owns the back/front buffer pair and the encoder's attribute state. [`mod@crate::session::Session`]
/// composes one of these and is responsible for observing the resize-pending flag (§4.6)
/// before forwarding to [`RenderEngine::present`] or [`RenderEngine::clear`].
#[derive(Debug)]
pub struct RenderEngine {
    back: CellBuffer,
    front: CellBuffer,
    attrs: AttrState,
}

impl RenderEngine {
    /// Allocate a back/front pair of the given dimensions, both already cleared to the
    /// default cell.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        let mut back = CellBuffer::new(width, height);
        let mut front = CellBuffer::new(width, height);
        back.clear();
        front.clear();
        Self {
            back,
            front,
            attrs: AttrState::new(),
        }
    }

    #[must_use]
    pub const fn width(&self) -> usize { self.back.width() }

    #[must_use]
    pub const fn height(&self) -> usize { self.back.height() }

    /// Overwrite the cell at `(x, y)` in the back buffer. No-op if out of bounds.
    pub fn put_cell(&mut self, x: usize, y: usize, cell: Cell) { self.back.set(x, y, cell); }

    /// Sugar over [`RenderEngine::put_cell`] taking unpacked fields.
    pub fn change_cell(&mut self, x: usize, y: usize, ch: char, fg: u16, bg: u16) {
        self.put_cell(x, y, Cell { ch, fg, bg });
    }

    /// Copy a `w`×`h` rectangle into the back buffer anchored at `(x, y)`. See
    /// [`CellBuffer::blit`] for the bounds policy.
    pub fn blit(&mut self, x: usize, y: usize, w: usize, h: usize, cells: &[Cell]) {
        self.back.blit(x, y, w, h, cells);
    }

    /// Fill the back buffer with the default cell.
    pub fn clear(&mut self) { self.back.clear(); }

    /// Resize both buffers to the terminal's new dimensions: the back buffer preserves
    /// its overlap with the old contents, while the front buffer is resized and then
    /// cleared outright so the next [`RenderEngine::present`] treats every cell as dirty
    /// and forces a full redraw. Also resets the encoder's attribute state, since the
    /// caller is about to emit a fresh screen clear of its own.
    pub fn resize(&mut self, new_width: usize, new_height: usize) {
        self.back.resize(new_width, new_height);
        self.front.resize(new_width, new_height);
        self.front.clear();
        self.attrs.reset();
    }

    /// Diff the back and front buffers in row-major order, writing only the minimal
    /// sequences needed to bring the terminal's display in line with the back buffer,
    /// then flush. After this returns, `front` equals `back` cell-for-cell.
    pub fn present(&mut self, out: &mut impl Write, caps: &Capabilities) -> io::Result<()> {
        let width = self.back.width();
        let height = self.back.height();
        let mut dirty = 0usize;

        for y in 0..height {
            for x in 0..width {
                let back_cell = self.back.get(x, y).expect("x,y within bounds by loop range");
                let front_cell = self.front.get(x, y).expect("x,y within bounds by loop range");
                if back_cell == front_cell {
                    continue;
                }
                dirty += 1;
                self.attrs
                    .write_cell(out, caps, x, y, back_cell.ch, back_cell.fg, back_cell.bg)?;
                self.front.set(x, y, back_cell);
            }
        }

        out.flush()?;
        trace!(dirty, width, height, "presented frame");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cell::Color;

    fn caps() -> Capabilities { Capabilities::resolve("xterm").unwrap() }

    #[test]
    fn empty_present_draws_nothing_and_leaves_front_equal_to_back() {
        let mut engine = RenderEngine::new(10, 3);
        let mut out = Vec::new();
        engine.present(&mut out, &caps()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn single_character_update_emits_sgr_cursor_move_and_char() {
        let mut engine = RenderEngine::new(10, 3);
        engine.change_cell(3, 1, 'A', Color::Red.index(), Color::Black.index());
        let mut out = Vec::new();
        engine.present(&mut out, &caps()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b[31;40m"));
        assert!(text.contains("\x1b[2;4H"));
        assert!(text.ends_with('A'));
    }

    #[test]
    fn horizontal_run_emits_one_cursor_move_for_the_whole_run() {
        let mut engine = RenderEngine::new(10, 3);
        for (i, ch) in "Hello".chars().enumerate() {
            engine.change_cell(i, 0, ch, Color::White.index(), Color::Black.index());
        }
        let mut out = Vec::new();
        engine.present(&mut out, &caps()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("\x1b[1;1H").count(), 1);
        assert!(text.ends_with("Hello"));
    }

    #[test]
    fn present_is_idempotent_once_front_catches_up() {
        let mut engine = RenderEngine::new(4, 4);
        engine.change_cell(0, 0, 'x', Color::Red.index(), Color::Black.index());
        let mut out = Vec::new();
        engine.present(&mut out, &caps()).unwrap();
        out.clear();
        engine.present(&mut out, &caps()).unwrap();
        assert!(out.is_empty(), "second present with no mutations writes nothing");
    }

    #[test]
    fn out_of_bounds_put_and_blit_are_no_ops() {
        let mut engine = RenderEngine::new(4, 4);
        engine.change_cell(100, 100, 'z', Color::Red.index(), Color::Black.index());
        let mut out = Vec::new();
        engine.present(&mut out, &caps()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn resize_forces_full_redraw_on_next_present() {
        let mut engine = RenderEngine::new(10, 3);
        let mut out = Vec::new();
        engine.present(&mut out, &caps()).unwrap();
        out.clear();

        engine.resize(8, 4);
        engine.present(&mut out, &caps()).unwrap();
        let text = String::from_utf8(out).unwrap();
        // Every one of the 32 cells in the new 8x4 grid should be redrawn as a space.
        assert_eq!(text.matches(' ').count(), 32);
    }

    #[test]
    fn resize_preserves_overlap_region() {
        let mut engine = RenderEngine::new(4, 4);
        engine.change_cell(0, 0, 'M', Color::Green.index(), Color::Black.index());
        engine.resize(6, 6);
        assert_eq!(engine.width(), 6);
        assert_eq!(engine.height(), 6);
    }
}
