// Copyright (c) 2025 cellterm contributors. Licensed under Apache License, Version 2.0.

//! A fixed-capacity circular byte queue used only by the input pipeline.
//!
//! [`RingBuffer::push`] fails rather than growing: the caller ([`mod@crate::session`]'s
//! event-wait loop) translates that failure into the input-overflow return code rather
//! than ever reallocating mid-session.

/// Default capacity, sufficient for the bursts of bytes a terminal can produce between
/// two reads of the input stream.
pub const DEFAULT_CAPACITY: usize = 4096;

/// The run did not fit in the remaining free space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("ring buffer overflow: {len} bytes requested, {free} free")]
pub struct Overflow {
    /// Bytes the caller tried to push.
    pub len: usize,
    /// Free space available at the time of the call.
    pub free: usize,
}

/// A circular byte queue over a single contiguous allocation of capacity `C`.
///
/// Free space is always `capacity - len()`. [`RingBuffer::peek`] reads without
/// advancing the head so the input parser can speculatively inspect bytes and leave an
/// incomplete sequence in place; [`RingBuffer::discard`] is the matching advance once
/// the parser commits to having consumed a prefix.
#[derive(Debug)]
pub struct RingBuffer {
    data: Vec<u8>,
    capacity: usize,
    head: usize,
    len: usize,
}

impl RingBuffer {
    /// Allocate a ring buffer with the given fixed capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            capacity,
            head: 0,
            len: 0,
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize { self.capacity }

    #[must_use]
    pub const fn len(&self) -> usize { self.len }

    #[must_use]
    pub const fn is_empty(&self) -> bool { self.len == 0 }

    #[must_use]
    pub const fn free_space(&self) -> usize { self.capacity - self.len }

    /// Append `bytes` to the tail. Fails without modifying the buffer if `bytes` would
    /// not fit in the current free space.
    ///
    /// # Errors
    ///
    /// Returns [`Overflow`] if `bytes.len() > self.free_space()`.
    pub fn push(&mut self, bytes: &[u8]) -> Result<(), Overflow> {
        if bytes.len() > self.free_space() {
            return Err(Overflow {
                len: bytes.len(),
                free: self.free_space(),
            });
        }
        let tail = (self.head + self.len) % self.capacity;
        let first_run = (self.capacity - tail).min(bytes.len());
        self.data[tail..tail + first_run].copy_from_slice(&bytes[..first_run]);
        let remaining = bytes.len() - first_run;
        if remaining > 0 {
            self.data[..remaining].copy_from_slice(&bytes[first_run..]);
        }
        self.len += bytes.len();
        Ok(())
    }

    /// Read up to `out.len()` of the oldest bytes into `out` without discarding them.
    /// Returns the number of bytes actually copied (capped at `self.len()`).
    pub fn peek(&self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.len);
        let first_run = (self.capacity - self.head).min(n);
        out[..first_run].copy_from_slice(&self.data[self.head..self.head + first_run]);
        let remaining = n - first_run;
        if remaining > 0 {
            out[first_run..first_run + remaining].copy_from_slice(&self.data[..remaining]);
        }
        n
    }

    /// Advance the head by `n` bytes, discarding them. Clamps to the current length.
    pub fn discard(&mut self, n: usize) {
        let n = n.min(self.len);
        self.head = (self.head + n) % self.capacity;
        self.len -= n;
    }

    /// Copy out up to `n` of the oldest bytes into a fresh `Vec`, without discarding.
    /// Convenience wrapper over [`RingBuffer::peek`] for callers (mainly tests and the
    /// input parser) that want an owned snapshot.
    #[must_use]
    pub fn peek_vec(&self, n: usize) -> Vec<u8> {
        let mut out = vec![0u8; n.min(self.len)];
        let copied = self.peek(&mut out);
        out.truncate(copied);
        out
    }
}
