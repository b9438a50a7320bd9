// Copyright (c) 2025 cellterm contributors. Licensed under Apache License, Version 2.0.

//! The real, Unix-backed [`mod@crate::session::Terminal`]: `rustix` for raw mode and
//! dimension queries, `mio` to multiplex TTY readiness with a SIGWINCH-driven resize
//! signal.
//!
//! Per the design notes in the crate's top-level documentation, the resize flag is a
//! single process-wide [`AtomicBool`] shared between every [`UnixTerminal`] and the
//! SIGWINCH delivery plumbing — the library does not support more than one open session
//! per process at a time, which matches the controlling-TTY's exclusive-ownership
//! contract anyway.

use std::{
    fs::File,
    io::{self, Read, Write},
    os::fd::{AsFd, AsRawFd},
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use mio::{unix::SourceFd, Events, Interest, Poll, Token};
use rustix::termios::{
    self, ControlModes, InputModes, LocalModes, OptionalActions, OutputModes, SpecialCodeIndex,
    Termios,
};
use signal_hook::consts::signal::SIGWINCH;
use signal_hook_mio::v1_0::Signals;
use tracing::{debug, trace};

use crate::{
    error::{Error, Result},
    session::Terminal,
};

const STDIN_TOKEN: Token = Token(0);
const SIGNAL_TOKEN: Token = Token(1);

/// Set by [`UnixTerminal::wait`] when a SIGWINCH readiness notification arrives, and
/// cleared by [`UnixTerminal::clear_resize_pending`]. Process-wide by design — see the
/// module documentation.
static RESIZE_PENDING: AtomicBool = AtomicBool::new(false);

/// The real terminal backend: opens `/dev/tty` for both directions, puts it into raw
/// mode, and polls it alongside a SIGWINCH self-pipe via `mio`.
pub struct UnixTerminal {
    input: File,
    output: File,
    original_termios: Termios,
    poll: Poll,
    events: Events,
    signals: Signals,
}

impl UnixTerminal {
    /// Open `/dev/tty`, save the current `termios` settings, and switch the terminal
    /// into raw mode: no input/output post-processing, no echo, no canonical line
    /// mode, no signal generation from keys, 8-bit characters, and `VMIN=0 VTIME=0` so
    /// reads return immediately with whatever bytes are available (possibly none).
    ///
    /// Falls back to the process's own stdin/stdout descriptors when `/dev/tty` cannot
    /// be opened — e.g. under a test harness with redirected streams, or a container
    /// without a `/dev/tty` node — so long as those descriptors are themselves a
    /// terminal (the later `tcgetattr` call fails otherwise).
    ///
    /// # Errors
    ///
    /// Returns [`Error::FailedToOpenTty`] if neither `/dev/tty` nor the stdin/stdout
    /// fallback can be opened, [`Error::Termios`] if the current or raw-mode attributes
    /// cannot be read or applied, and [`Error::ResizeSignal`] if the SIGWINCH poller
    /// cannot be installed.
    pub fn open() -> Result<Self> {
        let (input, output) = Self::open_io_pair()?;

        let original_termios = termios::tcgetattr(&input).map_err(|e| Error::Termios(e.into()))?;
        let mut raw = original_termios.clone();
        raw.input_modes.remove(
            InputModes::IGNBRK
                | InputModes::BRKINT
                | InputModes::PARMRK
                | InputModes::ISTRIP
                | InputModes::INLCR
                | InputModes::IGNCR
                | InputModes::ICRNL
                | InputModes::IXON,
        );
        raw.output_modes.remove(OutputModes::OPOST);
        raw.local_modes.remove(
            LocalModes::ECHO
                | LocalModes::ECHONL
                | LocalModes::ICANON
                | LocalModes::ISIG
                | LocalModes::IEXTEN,
        );
        raw.control_modes
            .remove(ControlModes::CSIZE | ControlModes::PARENB);
        raw.control_modes.insert(ControlModes::CS8);
        raw.special_codes[SpecialCodeIndex::VMIN] = 0;
        raw.special_codes[SpecialCodeIndex::VTIME] = 0;
        termios::tcsetattr(&input, OptionalActions::Now, &raw)
            .map_err(|e| Error::Termios(e.into()))?;

        let poll = Poll::new().map_err(Error::Io)?;
        let raw_fd = input.as_raw_fd();
        poll.registry()
            .register(&mut SourceFd(&raw_fd), STDIN_TOKEN, Interest::READABLE)
            .map_err(Error::Io)?;

        let mut signals = Signals::new([SIGWINCH]).map_err(Error::ResizeSignal)?;
        poll.registry()
            .register(&mut signals, SIGNAL_TOKEN, Interest::READABLE)
            .map_err(Error::ResizeSignal)?;

        debug!("entered raw mode");

        Ok(Self {
            input,
            output,
            original_termios,
            poll,
            events: Events::with_capacity(8),
            signals,
        })
    }

    /// Open `/dev/tty` for both directions, falling back to duplicates of the
    /// process's own stdin/stdout descriptors if that fails. `dup` (rather than
    /// stealing the descriptors outright) means this `UnixTerminal`'s `Drop` closing
    /// its own handles never closes the process's original stdin/stdout.
    fn open_io_pair() -> Result<(File, File)> {
        match File::open("/dev/tty") {
            Ok(input) => {
                let output = input.try_clone().map_err(Error::FailedToOpenTty)?;
                Ok((input, output))
            }
            Err(tty_err) => {
                debug!(error = %tty_err, "/dev/tty unavailable, falling back to stdin/stdout");
                let input = rustix::io::dup(io::stdin().as_fd())
                    .map_err(|e| Error::FailedToOpenTty(e.into()))?;
                let output = rustix::io::dup(io::stdout().as_fd())
                    .map_err(|e| Error::FailedToOpenTty(e.into()))?;
                Ok((File::from(input), File::from(output)))
            }
        }
    }
}

impl Drop for UnixTerminal {
    /// Best-effort restore of the original `termios` settings. Errors here are not
    /// actionable (the process is tearing this session down regardless), so they are
    /// swallowed rather than panicking in a destructor.
    fn drop(&mut self) {
        let _ = termios::tcsetattr(&self.input, OptionalActions::Now, &self.original_termios);
    }
}

impl Terminal for UnixTerminal {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> { self.output.write_all(buf) }

    fn flush(&mut self) -> io::Result<()> { self.output.flush() }

    fn wait(&mut self, timeout: Option<Duration>) -> io::Result<Option<bool>> {
        loop {
            match self.poll.poll(&mut self.events, timeout) {
                Ok(()) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        // `timeout`'s deadline elapsed with nothing at all to report: mio only
        // returns an empty event set this way, never for a readiness/signal wake.
        if self.events.is_empty() {
            return Ok(None);
        }

        let mut stdin_ready = false;
        for event in &self.events {
            match event.token() {
                STDIN_TOKEN => stdin_ready = true,
                SIGNAL_TOKEN => {
                    if self.signals.pending().next().is_some() {
                        trace!("SIGWINCH observed, setting resize-pending flag");
                        RESIZE_PENDING.store(true, Ordering::SeqCst);
                    }
                }
                _ => {}
            }
        }
        Ok(Some(stdin_ready))
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.input.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn dimensions(&mut self) -> io::Result<(usize, usize)> {
        let winsize = termios::tcgetwinsize(&self.input)?;
        Ok((winsize.ws_col as usize, winsize.ws_row as usize))
    }

    fn resize_pending(&self) -> bool { RESIZE_PENDING.load(Ordering::SeqCst) }

    fn clear_resize_pending(&self) { RESIZE_PENDING.store(false, Ordering::SeqCst); }
}
