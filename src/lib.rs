// Copyright (c) 2025 cellterm contributors. Licensed under Apache License, Version 2.0.

//! `cellterm` renders character-grid user interfaces to a text terminal and reads
//! keyboard input from it, hiding the terminfo escape-sequence protocol and the raw
//! input byte stream behind a grid of [`Cell`]s.
//!
//! The crate is built from three tightly coupled subsystems:
//!
//! - A double-buffered [`render`] engine: applications mutate a back buffer, and
//!   [`render::RenderEngine::present`] diffs it against a front buffer to emit only
//!   the cursor-move / attribute-change / character bytes needed to catch the
//!   terminal up.
//! - A terminfo-driven [`encoder`], built on a small compiled-in [`capabilities`]
//!   table, that suppresses redundant SGR resets and cursor moves.
//! - An [`input`] pipeline: raw bytes land in a [`ring_buffer::RingBuffer`], out of
//!   which [`input::extract_event`] pulls one [`KeyEvent`] at a time under a
//!   configurable [`input::InputMode`].
//!
//! [`session::Session`] ties all three together behind a lifecycle (`init`/
//! `shutdown`) and reacts to terminal resizes signaled through the platform's
//! [`session::Terminal`] implementation — [`UnixTerminal`] on Unix.
//!
//! # Scope
//!
//! No mouse input, no true-color or 256-color palette (8 basic colors plus
//! bold/underline/blink only), no wide-character column accounting, no scroll
//! regions or alternate character sets. Not thread-safe: a single application thread
//! is expected to drive a [`session::Session`] between `init` and `shutdown`.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(unix)]
//! # fn main() -> cellterm::Result<()> {
//! use cellterm::{Color, Session, UnixTerminal};
//!
//! let term = UnixTerminal::open()?;
//! let mut session = Session::init(term, std::env::var("TERM").ok().as_deref())?;
//! session.change_cell(0, 0, 'H', Color::White.index(), Color::Black.index());
//! session.present()?;
//! session.shutdown()?;
//! # Ok(())
//! # }
//! # #[cfg(not(unix))]
//! # fn main() {}
//! ```

pub mod buffer;
pub mod capabilities;
pub mod cell;
pub mod encoder;
pub mod error;
pub mod input;
pub mod keys;
pub mod render;
pub mod ring_buffer;
pub mod session;
#[cfg(test)]
mod test_support;
#[cfg(unix)]
pub mod unix;
pub mod utf8;

pub use buffer::CellBuffer;
pub use capabilities::Capabilities;
pub use cell::{color_index, has_blink, has_bold, has_underline, Cell, Color, BLINK, BOLD, UNDERLINE};
pub use error::{Error, Result};
pub use input::InputMode;
pub use keys::{ctrl, KeyEvent, MOD_ALT};
pub use render::RenderEngine;
pub use ring_buffer::RingBuffer;
pub use session::{Session, Terminal, WaitOutcome};
#[cfg(unix)]
pub use unix::UnixTerminal;
