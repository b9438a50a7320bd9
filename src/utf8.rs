// Copyright (c) 2025 cellterm contributors. Licensed under Apache License, Version 2.0.

//! UTF-8 byte-level encode/decode, shared by the input parser (decoding terminal input
//! bytes) and the output encoder (encoding cell characters for the terminal).
//!
//! Byte-type detection uses bit-pattern matching, not arithmetic: the leading run of
//! `1` bits before the first `0` in the lead byte says how many bytes the sequence
//! occupies, and the remaining bits in each byte carry the code point a chunk at a
//! time.
//!
//! ```text
//! 0xxxxxxx        ASCII, 1 byte total
//! 110xxxxx 10xxxxxx                  2 bytes total
//! 1110xxxx 10xxxxxx 10xxxxxx         3 bytes total
//! 11110xxx 10xxxxxx 10xxxxxx 10xxxxxx  4 bytes total
//! ```
//!
//! This module covers the full `char` range ([0, 0x10FFFF], excluding surrogates) —
//! see [`decode`] and [`encode`].

const CONT_MASK: u8 = 0xC0;
const CONT_PATTERN: u8 = 0x80;
const CONT_DATA_MASK: u8 = 0x3F;

/// Expected total byte length of a UTF-8 sequence from its lead byte, or `None` if
/// `first_byte` cannot start a valid sequence (a stray continuation byte or a reserved
/// `11111xxx` pattern).
#[must_use]
pub const fn lead_byte_length(first_byte: u8) -> Option<usize> {
    match first_byte {
        0x00..=0x7F => Some(1),
        0xC0..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

/// Decode one UTF-8 character from the head of `buffer`.
///
/// Returns `Some((ch, bytes_consumed))` on a complete, valid sequence; `None` if the
/// buffer holds an incomplete sequence (more bytes needed) or an invalid one (caller
/// should skip a byte and retry — see [`mod@crate::input`]'s handling of garbage
/// input).
#[must_use]
pub fn decode(buffer: &[u8]) -> Option<(char, usize)> {
    let &first = buffer.first()?;
    let len = lead_byte_length(first)?;
    if buffer.len() < len {
        return None; // Incomplete; caller should wait for more bytes.
    }
    for &b in &buffer[1..len] {
        if b & CONT_MASK != CONT_PATTERN {
            return None; // Malformed continuation byte.
        }
    }

    let codepoint: u32 = match len {
        1 => u32::from(first),
        2 => (u32::from(first & 0x1F) << 6) | u32::from(buffer[1] & CONT_DATA_MASK),
        3 => {
            (u32::from(first & 0x0F) << 12)
                | (u32::from(buffer[1] & CONT_DATA_MASK) << 6)
                | u32::from(buffer[2] & CONT_DATA_MASK)
        }
        4 => {
            (u32::from(first & 0x07) << 18)
                | (u32::from(buffer[1] & CONT_DATA_MASK) << 12)
                | (u32::from(buffer[2] & CONT_DATA_MASK) << 6)
                | u32::from(buffer[3] & CONT_DATA_MASK)
        }
        _ => unreachable!("lead_byte_length only returns 1..=4"),
    };

    char::from_u32(codepoint).map(|ch| (ch, len))
}

/// Encode `ch` as UTF-8 into a 4-byte scratch buffer, returning the number of bytes
/// written. The inverse of [`decode`]: picks the shortest length whose range contains
/// the code point, then fills continuation bytes most-significant-chunk-first.
#[must_use]
pub fn encode(ch: char, out: &mut [u8; 4]) -> usize {
    let cp = ch as u32;
    match cp {
        0x0000..=0x007F => {
            out[0] = cp as u8;
            1
        }
        0x0080..=0x07FF => {
            out[0] = 0xC0 | ((cp >> 6) as u8);
            out[1] = CONT_PATTERN | ((cp & 0x3F) as u8);
            2
        }
        0x0800..=0xFFFF => {
            out[0] = 0xE0 | ((cp >> 12) as u8);
            out[1] = CONT_PATTERN | (((cp >> 6) & 0x3F) as u8);
            out[2] = CONT_PATTERN | ((cp & 0x3F) as u8);
            3
        }
        _ => {
            out[0] = 0xF0 | ((cp >> 18) as u8);
            out[1] = CONT_PATTERN | (((cp >> 12) & 0x3F) as u8);
            out[2] = CONT_PATTERN | (((cp >> 6) & 0x3F) as u8);
            out[3] = CONT_PATTERN | ((cp & 0x3F) as u8);
            4
        }
    }
}
