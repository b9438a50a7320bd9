// Copyright (c) 2025 cellterm contributors. Licensed under Apache License, Version 2.0.

//! [`CellBuffer`]: a dense, row-major 2-D grid of [`Cell`]s.
//!
//! This is the back/front buffer pair the render engine diffs against each other. See
//! [`mod@crate::render`] for the diff algorithm that consumes two of these.

use tracing::trace;

use crate::cell::Cell;

/// A dense W×H grid of cells, stored row-major: the cell at `(x, y)` lives at index
/// `y * width + x`.
///
/// The array length is always exactly `width * height`. [`CellBuffer::resize`]
/// preserves the overlap rectangle between the old and new dimensions and fills
/// everything else with [`Cell::default`].
#[derive(Debug, Clone)]
pub struct CellBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl CellBuffer {
    /// Allocate a buffer of the given dimensions. Contents are uninitialized in the
    /// sense that they hold [`Cell::default`] — callers that want a guaranteed-clear
    /// buffer should call [`CellBuffer::clear`] immediately after, matching the
    /// original design's "init does not clear, caller clears" contract (here `init`
    /// and `clear` happen to produce the same bytes, but the explicit clear documents
    /// intent and stays cheap).
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
        }
    }

    #[must_use]
    pub const fn width(&self) -> usize { self.width }

    #[must_use]
    pub const fn height(&self) -> usize { self.height }

    /// Row-major index for `(x, y)`, or `None` if out of bounds.
    const fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.width || y >= self.height {
            None
        } else {
            Some(y * self.width + x)
        }
    }

    /// Read the cell at `(x, y)`, or `None` if out of bounds.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Overwrite the cell at `(x, y)`. No-op if out of bounds.
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    /// Fill every cell with the default cell.
    pub fn clear(&mut self) { self.cells.fill(Cell::default()); }

    /// Resize to `(new_width, new_height)`, preserving the overlap rectangle with the
    /// current dimensions and filling the rest with [`Cell::default`]. No-op if the
    /// dimensions are unchanged.
    pub fn resize(&mut self, new_width: usize, new_height: usize) {
        if new_width == self.width && new_height == self.height {
            return;
        }

        trace!(
            old_width = self.width,
            old_height = self.height,
            new_width,
            new_height,
            "resizing cell buffer"
        );

        let mut new_cells = vec![Cell::default(); new_width * new_height];
        let overlap_width = self.width.min(new_width);
        let overlap_height = self.height.min(new_height);

        for y in 0..overlap_height {
            let old_row_start = y * self.width;
            let new_row_start = y * new_width;
            new_cells[new_row_start..new_row_start + overlap_width]
                .copy_from_slice(&self.cells[old_row_start..old_row_start + overlap_width]);
        }

        self.width = new_width;
        self.height = new_height;
        self.cells = new_cells;
    }

    /// Copy a `w`×`h` rectangle of `src` (row stride `w`) into this buffer anchored at
    /// `(x, y)` (row stride `width()`). Rejects the whole blit — leaving this buffer
    /// unchanged — if any destination cell would fall outside the buffer, using the
    /// half-open convention `x + w > width || y + h > height` (an on-boundary blit
    /// that exactly fills the buffer is legal).
    pub fn blit(&mut self, x: usize, y: usize, w: usize, h: usize, src: &[Cell]) {
        if w == 0 || h == 0 {
            return;
        }
        if x + w > self.width || y + h > self.height {
            return;
        }
        debug_assert!(src.len() >= w * h, "blit source shorter than w*h");

        for row in 0..h {
            let src_start = row * w;
            let dst_start = (y + row) * self.width + x;
            self.cells[dst_start..dst_start + w].copy_from_slice(&src[src_start..src_start + w]);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cell::Color;

    #[test]
    fn new_buffer_has_correct_length() {
        let buf = CellBuffer::new(10, 3);
        assert_eq!(buf.width(), 10);
        assert_eq!(buf.height(), 3);
        for y in 0..3 {
            for x in 0..10 {
                assert_eq!(buf.get(x, y), Some(Cell::default()));
            }
        }
    }

    #[test]
    fn set_then_get_round_trips_in_bounds() {
        let mut buf = CellBuffer::new(4, 4);
        let cell = Cell::new('A', Color::Red, Color::Black);
        buf.set(1, 2, cell);
        assert_eq!(buf.get(1, 2), Some(cell));
    }

    #[test]
    fn set_out_of_bounds_is_a_no_op() {
        let mut buf = CellBuffer::new(4, 4);
        let snapshot = buf.clone();
        buf.set(4, 0, Cell::new('X', Color::Red, Color::Black));
        buf.set(0, 4, Cell::new('X', Color::Red, Color::Black));
        assert_eq!(buf.get(4, 0), None);
        assert_eq!(buf.get(0, 4), None);
        assert_eq!(format!("{snapshot:?}"), format!("{buf:?}"));
    }

    #[test]
    fn clear_resets_every_cell_to_default() {
        let mut buf = CellBuffer::new(3, 3);
        buf.set(1, 1, Cell::new('Z', Color::Blue, Color::Yellow));
        buf.clear();
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(buf.get(x, y), Some(Cell::default()));
            }
        }
    }

    #[test]
    fn resize_preserves_overlap_and_defaults_the_rest() {
        let mut buf = CellBuffer::new(3, 2);
        let marker = Cell::new('M', Color::Green, Color::Black);
        buf.set(0, 0, marker);
        buf.set(2, 1, marker);

        buf.resize(5, 4);

        assert_eq!(buf.width(), 5);
        assert_eq!(buf.height(), 4);
        assert_eq!(buf.get(0, 0), Some(marker));
        assert_eq!(buf.get(2, 1), Some(marker));
        // Newly exposed cells are default.
        assert_eq!(buf.get(4, 3), Some(Cell::default()));
        assert_eq!(buf.get(3, 0), Some(Cell::default()));
    }

    #[test]
    fn resize_shrink_drops_cells_outside_new_bounds() {
        let mut buf = CellBuffer::new(5, 5);
        buf.set(4, 4, Cell::new('M', Color::Green, Color::Black));
        buf.resize(2, 2);
        assert_eq!(buf.width(), 2);
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.get(0, 0), Some(Cell::default()));
    }

    #[test]
    fn resize_to_same_dimensions_is_a_no_op() {
        let mut buf = CellBuffer::new(3, 3);
        let marker = Cell::new('M', Color::Green, Color::Black);
        buf.set(1, 1, marker);
        buf.resize(3, 3);
        assert_eq!(buf.get(1, 1), Some(marker));
    }

    #[test]
    fn blit_copies_rectangle_with_strided_destination() {
        let mut buf = CellBuffer::new(4, 4);
        let src = vec![
            Cell::new('a', Color::Red, Color::Black),
            Cell::new('b', Color::Red, Color::Black),
            Cell::new('c', Color::Red, Color::Black),
            Cell::new('d', Color::Red, Color::Black),
        ];
        buf.blit(1, 1, 2, 2, &src);
        assert_eq!(buf.get(1, 1), Some(src[0]));
        assert_eq!(buf.get(2, 1), Some(src[1]));
        assert_eq!(buf.get(1, 2), Some(src[2]));
        assert_eq!(buf.get(2, 2), Some(src[3]));
    }

    #[test]
    fn blit_on_boundary_that_exactly_fills_is_legal() {
        let mut buf = CellBuffer::new(2, 2);
        let src = vec![Cell::new('x', Color::Red, Color::Black); 4];
        buf.blit(0, 0, 2, 2, &src);
        assert_eq!(buf.get(1, 1), Some(src[0]));
    }

    #[test]
    fn blit_past_the_edge_is_rejected_wholesale() {
        let mut buf = CellBuffer::new(2, 2);
        let before = buf.clone();
        let src = vec![Cell::new('x', Color::Red, Color::Black); 4];
        buf.blit(1, 1, 2, 2, &src);
        assert_eq!(format!("{before:?}"), format!("{buf:?}"));
    }
}
