// Copyright (c) 2025 cellterm contributors. Licensed under Apache License, Version 2.0.

//! Test-only helpers shared across the crate's `#[cfg(test)] mod tests` blocks.
//!
//! Not part of the public API; `tracing-subscriber` is a dev-dependency precisely so
//! it's only ever linked in here, never pulled into a normal build of the library or
//! `src/bin/demo.rs` (binary targets, unlike Cargo `examples/`, never see
//! dev-dependencies).

/// Install a `tracing-subscriber` `fmt` layer writing to the test harness's captured
/// output, so `trace!`/`debug!` calls in the code under test are visible with
/// `cargo test -- --nocapture`. Idempotent: safe to call from every test that wants it.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
