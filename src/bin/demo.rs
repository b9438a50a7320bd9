// Copyright (c) 2025 cellterm contributors. Licensed under Apache License, Version 2.0.

//! A minimal exercise of [`cellterm::Session`] end to end: enter the session, draw a
//! greeting, wait for a keypress, and shut down cleanly. Not part of the public
//! library API.

#[cfg(unix)]
fn main() -> cellterm::Result<()> {
    use cellterm::{Color, Session, UnixTerminal, WaitOutcome};

    let term_env = std::env::var("TERM").ok();
    let term = UnixTerminal::open()?;
    let mut session = Session::init(term, term_env.as_deref())?;

    let greeting = "Press any key to exit (q also works)";
    for (i, ch) in greeting.chars().enumerate() {
        if i >= session.width() {
            break;
        }
        session.change_cell(i, 0, ch, Color::White.index(), Color::Black.index());
    }
    session.present()?;

    loop {
        if let WaitOutcome::Event(_) = session.poll_event()? {
            break;
        }
    }

    session.shutdown()
}

#[cfg(not(unix))]
fn main() {
    eprintln!("the cellterm demo only runs on Unix platforms");
}
