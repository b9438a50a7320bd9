// Copyright (c) 2025 cellterm contributors. Licensed under Apache License, Version 2.0.

//! The escape-sequence parser: turns bytes sitting in a [`RingBuffer`] into
//! [`KeyEvent`]s.
//!
//! [`extract_event`] is the single entry point. It peeks at the oldest bytes without
//! discarding them, decides whether it has a complete event, and only then discards
//! exactly the bytes that event consumed — so a partial escape sequence or truncated
//! UTF-8 character is left untouched for the next call once more bytes arrive.

use tracing::trace;

use crate::{
    capabilities::Capabilities,
    keys::{self, ctrl},
    ring_buffer::RingBuffer,
    utf8, KeyEvent,
};

/// How a bare ESC byte (one that does not start a recognized key sequence) is
/// interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// A lone ESC is surfaced immediately as the ESC key; a following byte is a
    /// separate event.
    Esc,
    /// ESC followed by another byte is folded into a single event for that byte with
    /// the ALT modifier set.
    Alt,
}

/// Outcome of [`extract_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extracted {
    /// A complete event was parsed and its bytes discarded from the ring.
    Event(KeyEvent),
    /// The ring holds only a partial sequence; wait for more bytes before retrying.
    NeedMore,
}

/// Peek up to `n` bytes off the front of `ring` into a small on-stack scratch buffer.
/// Input sequences handled here (escape sequences, UTF-8 characters) are all short, so
/// a fixed cap avoids allocating on every call.
const PEEK_CAP: usize = 16;

fn peek(ring: &RingBuffer, n: usize) -> ([u8; PEEK_CAP], usize) {
    let mut buf = [0u8; PEEK_CAP];
    let want = n.min(PEEK_CAP);
    let got = ring.peek(&mut buf[..want]);
    (buf, got)
}

/// Try to extract one key event from the oldest bytes in `ring`.
///
/// See the module documentation and the crate's top-level design notes (§4.3) for the
/// full routing algorithm: escape-sequence match, then control character, then UTF-8.
pub fn extract_event(ring: &mut RingBuffer, mode: InputMode, caps: &Capabilities) -> Extracted {
    if ring.is_empty() {
        return Extracted::NeedMore;
    }

    let (buf, len) = peek(ring, PEEK_CAP);
    let buf = &buf[..len];

    if buf[0] == ctrl::ESC as u8 {
        return extract_escape(ring, buf, mode, caps);
    }

    if buf[0] < 0x20 || buf[0] == 0x7F {
        ring.discard(1);
        let event = KeyEvent::key(u16::from(buf[0]));
        trace!(?event, "control character");
        return Extracted::Event(event);
    }

    match utf8::decode(buf) {
        Some((ch, consumed)) => {
            ring.discard(consumed);
            let event = KeyEvent::char(ch);
            trace!(?event, "utf-8 character");
            Extracted::Event(event)
        }
        None if utf8::lead_byte_length(buf[0]).map(|need| len < need).unwrap_or(false) => {
            // Valid lead byte, just don't have enough bytes yet.
            Extracted::NeedMore
        }
        None => {
            // Garbage byte that isn't a valid UTF-8 lead at all: drop it so the stream
            // can resynchronize instead of stalling forever.
            ring.discard(1);
            Extracted::Event(KeyEvent::key(u16::from(buf[0])))
        }
    }
}

fn extract_escape(
    ring: &mut RingBuffer,
    buf: &[u8],
    mode: InputMode,
    caps: &Capabilities,
) -> Extracted {
    debug_assert_eq!(buf[0], ctrl::ESC as u8);

    // With only the ESC byte itself buffered, no table entry can ever be confirmed (every
    // entry is at least two bytes long), so the table scan below would always read this as
    // "might still be a prefix" and report `NeedMore` — which would make a bare ESC press
    // (the terminal sends exactly one 0x1B byte and nothing else) wait forever in ESC mode.
    // Handle the single-byte case immediately, before the scan, per mode.
    if buf.len() == 1 {
        return match mode {
            InputMode::Esc => {
                ring.discard(1);
                Extracted::Event(KeyEvent::key(keys::ctrl::ESC))
            }
            InputMode::Alt => Extracted::NeedMore,
        };
    }

    // Try every known key sequence. Sequences are short and the table is small, so a
    // linear scan is fine.
    for &(seq, code) in caps.key_sequences {
        let seq_bytes = seq.as_bytes();
        if buf.len() < seq_bytes.len() {
            if seq_bytes.starts_with(buf) {
                return Extracted::NeedMore;
            }
            continue;
        }
        if buf.starts_with(seq_bytes) {
            ring.discard(seq_bytes.len());
            let event = KeyEvent::key(code);
            trace!(?event, "named key sequence");
            return Extracted::Event(event);
        }
    }

    match mode {
        InputMode::Esc => {
            ring.discard(1);
            Extracted::Event(KeyEvent::key(keys::ctrl::ESC))
        }
        InputMode::Alt => {
            if buf[1] == ctrl::ESC as u8 {
                // Two ESCs in a row: emit a standalone ESC, leave the second for the
                // next call.
                ring.discard(1);
                return Extracted::Event(KeyEvent::key(keys::ctrl::ESC));
            }
            if buf[1] < 0x20 || buf[1] == 0x7F {
                ring.discard(2);
                return Extracted::Event(KeyEvent::alt_key(u16::from(buf[1])));
            }
            match utf8::decode(&buf[1..]) {
                Some((ch, consumed)) => {
                    ring.discard(1 + consumed);
                    Extracted::Event(KeyEvent::alt_char(ch))
                }
                None => {
                    // Second byte starts a multi-byte UTF-8 char we haven't fully
                    // buffered yet.
                    Extracted::NeedMore
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn caps() -> Capabilities { Capabilities::resolve("xterm").unwrap() }

    fn ring_with(bytes: &[u8]) -> RingBuffer {
        crate::test_support::init_tracing();
        let mut ring = RingBuffer::new(64);
        ring.push(bytes).unwrap();
        ring
    }

    #[test]
    fn bare_esc_in_esc_mode_is_immediate() {
        let mut ring = ring_with(&[0x1B]);
        let result = extract_event(&mut ring, InputMode::Esc, &caps());
        assert_eq!(result, Extracted::Event(KeyEvent::key(ctrl::ESC)));
        assert!(ring.is_empty());
    }

    #[test]
    fn alt_mode_escape_plus_letter_is_one_event() {
        let mut ring = ring_with(b"\x1ba");
        let result = extract_event(&mut ring, InputMode::Alt, &caps());
        assert_eq!(result, Extracted::Event(KeyEvent::alt_char('a')));
        assert!(ring.is_empty());
    }

    #[test]
    fn alt_mode_lone_esc_needs_more() {
        let mut ring = ring_with(&[0x1B]);
        let result = extract_event(&mut ring, InputMode::Alt, &caps());
        assert_eq!(result, Extracted::NeedMore);
        assert_eq!(ring.len(), 1, "the ESC byte must stay buffered");
    }

    #[test]
    fn known_escape_sequence_maps_to_named_key() {
        let mut ring = ring_with(b"\x1b[A");
        let result = extract_event(&mut ring, InputMode::Esc, &caps());
        assert_eq!(result, Extracted::Event(KeyEvent::key(keys::ARROW_UP)));
        assert!(ring.is_empty());
    }

    #[test]
    fn left_and_right_arrows_are_distinguished() {
        let mut ring = ring_with(b"\x1b[C\x1b[D");
        let right = extract_event(&mut ring, InputMode::Esc, &caps());
        assert_eq!(right, Extracted::Event(KeyEvent::key(keys::ARROW_RIGHT)));
        let left = extract_event(&mut ring, InputMode::Esc, &caps());
        assert_eq!(left, Extracted::Event(KeyEvent::key(keys::ARROW_LEFT)));
        assert!(ring.is_empty());
    }

    #[test]
    fn incomplete_escape_sequence_needs_more() {
        let mut ring = ring_with(&[0x1B, b'[']);
        let result = extract_event(&mut ring, InputMode::Esc, &caps());
        assert_eq!(result, Extracted::NeedMore);
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn control_character_is_extracted_directly() {
        let mut ring = ring_with(&[0x03]); // Ctrl+C
        let result = extract_event(&mut ring, InputMode::Esc, &caps());
        assert_eq!(result, Extracted::Event(KeyEvent::key(ctrl::CTRL_C)));
    }

    #[test]
    fn printable_utf8_decodes_to_char_event() {
        let mut ring = ring_with("é".as_bytes());
        let result = extract_event(&mut ring, InputMode::Esc, &caps());
        assert_eq!(result, Extracted::Event(KeyEvent::char('é')));
        assert!(ring.is_empty());
    }

    #[test]
    fn incomplete_utf8_needs_more() {
        let mut ring = ring_with(&["é".as_bytes()[0]]);
        let result = extract_event(&mut ring, InputMode::Esc, &caps());
        assert_eq!(result, Extracted::NeedMore);
    }

    #[test]
    fn empty_ring_needs_more() {
        let mut ring = RingBuffer::new(16);
        let result = extract_event(&mut ring, InputMode::Esc, &caps());
        assert_eq!(result, Extracted::NeedMore);
    }
}
