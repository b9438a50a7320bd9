// Copyright (c) 2025 cellterm contributors. Licensed under Apache License, Version 2.0.

//! Error types for the terminal session lifecycle and I/O boundary.
//!
//! Steady-state rendering and event extraction are infallible by design (see
//! [`mod@crate::render`] and [`mod@crate::input`] for how out-of-bounds writes and
//! malformed input bytes are absorbed without raising an error). Only [setup] and
//! [terminal writes] can fail.
//!
//! [setup]: crate::session::Session::init
//! [terminal writes]: crate::session::Session::present

use std::io;

/// Errors that can escape the public API.
///
/// Each variant corresponds to one of the failure modes named in the lifecycle and
/// error-handling design: resolving a capability table, opening the controlling TTY,
/// querying/setting `termios`, installing the resize signal handler, and raw I/O on the
/// terminal streams.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum Error {
    /// `$TERM` did not match any entry in the compiled-in capability table.
    #[error("unsupported terminal (TERM={term:?})")]
    #[diagnostic(
        code(cellterm::unsupported_terminal),
        help("set TERM to one of: xterm, xterm-256color, screen, rxvt, linux, Eterm")
    )]
    UnsupportedTerminal {
        /// The value of `$TERM` at the time of failure, if it was set at all.
        term: Option<String>,
    },

    /// The controlling TTY could not be opened for read or write.
    #[error("failed to open the controlling tty")]
    #[diagnostic(code(cellterm::failed_to_open_tty))]
    FailedToOpenTty(#[source] io::Error),

    /// Querying or applying `termios` attributes failed.
    #[error("failed to configure terminal attributes")]
    #[diagnostic(code(cellterm::termios))]
    Termios(#[source] io::Error),

    /// Installing the SIGWINCH-backed resize signal handler failed.
    #[error("failed to install resize signal handler")]
    #[diagnostic(code(cellterm::resize_signal))]
    ResizeSignal(#[source] io::Error),

    /// A read or write against the terminal streams failed at the OS level.
    #[error("terminal i/o failed")]
    #[diagnostic(code(cellterm::io))]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the crate's public API.
pub type Result<T> = std::result::Result<T, Error>;
