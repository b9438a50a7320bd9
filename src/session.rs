// Copyright (c) 2025 cellterm contributors. Licensed under Apache License, Version 2.0.

//! The terminal session: lifecycle (raw mode on `init`, restoration on `shutdown`),
//! ownership of the render engine and input ring buffer, and the blocking event-wait
//! loop that ties the two together with resize notifications.
//!
//! Real terminal I/O, readiness waiting, and SIGWINCH delivery are behind the
//! [`Terminal`] trait so the event-wait algorithm in [`Session::poll_event`] and
//! [`Session::peek_event`] can be exercised without a PTY — see the `MockTerminal` used
//! by this module's own tests.

use std::time::Duration;

use tracing::{debug, trace};

use crate::{
    capabilities::Capabilities,
    error::{Error, Result},
    input::{self, InputMode},
    keys::KeyEvent,
    render::RenderEngine,
    ring_buffer::{RingBuffer, DEFAULT_CAPACITY},
};

/// Bytes read from the terminal stream per readiness wake, matching the scratch area
/// size the event-wait loop reads into.
const READ_CHUNK: usize = 32;

/// Outcome of [`Session::poll_event`] / [`Session::peek_event`], mirroring the
/// `1` / `0` / `-1` return-code contract by name instead of by magic number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// An event was delivered.
    Event(KeyEvent),
    /// `peek_event` timed out with nothing delivered.
    Timeout,
    /// The ring buffer could not hold the bytes just read; they were dropped.
    Overflow,
}

/// Abstraction over the terminal device: raw byte I/O, readiness waiting, dimension
/// queries, and resize-flag plumbing. [`UnixTerminal`] is the real, `rustix`/`mio`-backed
/// implementation; tests substitute an in-memory stand-in.
pub trait Terminal {
    /// Write bytes to the terminal's output stream.
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()>;
    /// Flush the output stream.
    fn flush(&mut self) -> std::io::Result<()>;
    /// Block up to `timeout` (`None` = forever) for the input stream to become
    /// readable or for a resize signal to arrive.
    ///
    /// Returns `Ok(None)` if `timeout` genuinely elapsed with nothing at all to report
    /// (only possible when `timeout` is `Some`). Returns `Ok(Some(true))` if the input
    /// stream is readable. Returns `Ok(Some(false))` if the wait was woken for some
    /// other reason (typically a resize signal) with input not yet readable — callers
    /// must retry rather than treating this as a timeout, per §5's requirement that
    /// signal-interrupted waits are retried transparently.
    fn wait(&mut self, timeout: Option<Duration>) -> std::io::Result<Option<bool>>;
    /// Read up to `buf.len()` bytes from the input stream. `Ok(0)` means no bytes were
    /// actually available (a spurious wake, typically from a resize signal).
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;
    /// Query the terminal's current dimensions in cells.
    fn dimensions(&mut self) -> std::io::Result<(usize, usize)>;
    /// Has a resize been signaled since the last [`Terminal::clear_resize_pending`]?
    fn resize_pending(&self) -> bool;
    /// Clear the resize-pending flag.
    fn clear_resize_pending(&self);
}

/// A terminal session: owns the back/front buffers, the input ring buffer, the
/// resolved capability table, and the backing [`Terminal`].
pub struct Session<T: Terminal> {
    term: T,
    caps: Capabilities,
    render: RenderEngine,
    ring: RingBuffer,
    input_mode: InputMode,
}

impl<T: Terminal> Session<T> {
    /// Bring up a session against an already-opened [`Terminal`]: resolve capabilities
    /// for `term_env` (the value of `$TERM`), query initial dimensions, allocate the
    /// buffers, and emit the enter-CA/keypad/hide-cursor/clear-screen sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedTerminal`] if `term_env` resolves to no compiled-in
    /// capability table, or [`Error::Io`] if the initial dimension query or the setup
    /// write fails.
    pub fn init(mut term: T, term_env: Option<&str>) -> Result<Self> {
        let caps = Capabilities::resolve(term_env.unwrap_or_default())
            .ok_or_else(|| Error::UnsupportedTerminal { term: term_env.map(str::to_owned) })?;

        let (width, height) = term.dimensions()?;
        debug!(width, height, term = term_env, "initializing session");

        term.write_all(caps.enter_ca.as_bytes())?;
        term.write_all(caps.enter_keypad.as_bytes())?;
        term.write_all(caps.hide_cursor.as_bytes())?;
        term.write_all(caps.clear_screen.as_bytes())?;
        term.flush()?;

        Ok(Self {
            term,
            caps,
            render: RenderEngine::new(width, height),
            ring: RingBuffer::new(DEFAULT_CAPACITY),
            input_mode: InputMode::Esc,
        })
    }

    /// Restore the terminal: show cursor, reset SGR, clear screen, exit keypad and
    /// alternate-screen modes, flush. Consumes the session; the backing [`Terminal`]
    /// (and, for the real implementation, the original `termios` settings) is dropped
    /// along with it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the shutdown sequence fails to write.
    pub fn shutdown(mut self) -> Result<()> {
        self.term.write_all(self.caps.show_cursor.as_bytes())?;
        self.term.write_all(self.caps.sgr_reset.as_bytes())?;
        self.term.write_all(self.caps.clear_screen.as_bytes())?;
        self.term.write_all(self.caps.exit_keypad.as_bytes())?;
        self.term.write_all(self.caps.exit_ca.as_bytes())?;
        self.term.flush()?;
        Ok(())
    }

    #[must_use]
    pub fn width(&self) -> usize { self.render.width() }

    #[must_use]
    pub fn height(&self) -> usize { self.render.height() }

    pub fn put_cell(&mut self, x: usize, y: usize, cell: crate::cell::Cell) {
        self.render.put_cell(x, y, cell);
    }

    pub fn change_cell(&mut self, x: usize, y: usize, ch: char, fg: u16, bg: u16) {
        self.render.change_cell(x, y, ch, fg, bg);
    }

    pub fn blit(&mut self, x: usize, y: usize, w: usize, h: usize, cells: &[crate::cell::Cell]) {
        self.render.blit(x, y, w, h, cells);
    }

    /// Fill the back buffer with the default cell, first observing the resize flag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if a pending resize's redraw write fails.
    pub fn clear(&mut self) -> Result<()> {
        self.observe_resize()?;
        self.render.clear();
        Ok(())
    }

    /// Diff back against front and write the minimal bytes needed, first observing the
    /// resize flag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if a pending resize's redraw write, or the diff itself,
    /// fails.
    pub fn present(&mut self) -> Result<()> {
        self.observe_resize()?;
        self.render.present(&mut OutWriter(&mut self.term), &self.caps)?;
        Ok(())
    }

    /// `None` returns the current mode unchanged; `Some(mode)` sets and returns it.
    pub fn select_input_mode(&mut self, mode: Option<InputMode>) -> InputMode {
        if let Some(mode) = mode {
            self.input_mode = mode;
        }
        self.input_mode
    }

    /// Block indefinitely for the next key event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the underlying wait or read fails.
    pub fn poll_event(&mut self) -> Result<WaitOutcome> {
        self.wait_for_event(None)
    }

    /// Wait up to `timeout_ms` milliseconds for the next key event; returns
    /// [`WaitOutcome::Timeout`] if none arrives in time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the underlying wait or read fails.
    pub fn peek_event(&mut self, timeout_ms: u64) -> Result<WaitOutcome> {
        self.wait_for_event(Some(Duration::from_millis(timeout_ms)))
    }

    /// Implements §4.7's shared event-wait loop: try the parser first, then block on
    /// readiness, read, and retry, looping past spurious wakes (a resize signal
    /// interrupting the wait) without letting them shorten the caller's timeout.
    ///
    /// `timeout` is tracked against a deadline rather than re-passed verbatim to each
    /// [`Terminal::wait`] call, so a resize-only wake partway through a `peek_event`
    /// timeout consumes only the time it actually took, not the whole budget again.
    fn wait_for_event(&mut self, timeout: Option<Duration>) -> Result<WaitOutcome> {
        if let input::Extracted::Event(event) = input::extract_event(&mut self.ring, self.input_mode, &self.caps) {
            return Ok(WaitOutcome::Event(event));
        }

        let deadline = timeout.map(|t| std::time::Instant::now() + t);

        loop {
            self.observe_resize()?;

            let remaining = match deadline {
                Some(d) => match d.checked_duration_since(std::time::Instant::now()) {
                    Some(r) => Some(r),
                    None => return Ok(WaitOutcome::Timeout),
                },
                None => None,
            };

            match self.term.wait(remaining)? {
                None => return Ok(WaitOutcome::Timeout),
                Some(false) => continue,
                Some(true) => {}
            }

            let mut scratch = [0u8; READ_CHUNK];
            let n = self.term.read(&mut scratch)?;
            if n == 0 {
                continue;
            }

            if n > self.ring.free_space() {
                trace!(n, free = self.ring.free_space(), "input overflow, dropping bytes");
                return Ok(WaitOutcome::Overflow);
            }
            self.ring.push(&scratch[..n]).expect("just checked free space");

            if let input::Extracted::Event(event) =
                input::extract_event(&mut self.ring, self.input_mode, &self.caps)
            {
                return Ok(WaitOutcome::Event(event));
            }
        }
    }

    /// §4.6: if the backing terminal has a resize pending, query new dimensions,
    /// resize both buffers (forcing a full redraw on the next present), emit a screen
    /// clear, and clear the flag.
    fn observe_resize(&mut self) -> Result<()> {
        if !self.term.resize_pending() {
            return Ok(());
        }

        let (width, height) = self.term.dimensions()?;
        debug!(width, height, "handling pending resize");
        self.render.resize(width, height);
        self.term.write_all(self.caps.sgr_reset.as_bytes())?;
        self.term.write_all(self.caps.clear_screen.as_bytes())?;
        self.term.flush()?;
        self.term.clear_resize_pending();
        Ok(())
    }
}

/// Adapts a `&mut dyn Terminal` to `std::io::Write` so [`RenderEngine::present`] can
/// stay generic over `impl Write` without depending on this module's [`Terminal`] trait.
struct OutWriter<'a, T: Terminal>(&'a mut T);

impl<T: Terminal> std::io::Write for OutWriter<'_, T> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> { self.0.flush() }
}
