// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Bounded string helpers for NUL-terminated byte buffers.
//!
//! Rule compilers shuttle identifiers between fixed-size buffers before
//! interning them. These helpers follow the BSD `strlcpy`/`strlcat`
//! contract: the destination is always NUL-terminated when it has room for
//! at least one byte, and the return value is the length the result would
//! have had without truncation.
//!
//! "Wide" strings are sequences of two-byte little-endian code units,
//! terminated by a zero unit. A buffer that ends early is treated as if it
//! were terminated there.

/// Length of a NUL-terminated string stored in `buf`.
fn c_len(buf: &[u8]) -> usize {
    buf.iter().position(|&b| b == 0).unwrap_or(buf.len())
}

/// Copies the string in `src` into `dst`, truncating if needed.
///
/// Returns the length of `src`; truncation happened if it is `>= dst.len()`.
pub fn strlcpy(dst: &mut [u8], src: &[u8]) -> usize {
    let src_len = c_len(src);

    let Some(room) = dst.len().checked_sub(1) else {
        return src_len;
    };

    let n = src_len.min(room);

    if let (Some(to), Some(from)) = (dst.get_mut(..n), src.get(..n)) {
        to.copy_from_slice(from);
    }
    if let Some(nul) = dst.get_mut(n) {
        *nul = 0;
    }

    src_len
}

/// Appends the string in `src` to the string in `dst`, truncating if needed.
///
/// Returns the length of the concatenation; truncation happened if it is
/// `>= dst.len()`. If `dst` holds no terminator, nothing is written and
/// `dst.len() + strlen(src)` is returned.
pub fn strlcat(dst: &mut [u8], src: &[u8]) -> usize {
    let dst_len = c_len(dst);
    let src_len = c_len(src);

    if dst_len == dst.len() {
        return dst_len + src_len;
    }

    if let Some(tail) = dst.get_mut(dst_len..) {
        strlcpy(tail, src);
    }

    dst_len + src_len
}

fn wide_units(w_str: &[u8]) -> impl Iterator<Item = (u8, u8)> + '_ {
    w_str
        .chunks(2)
        .map(|unit| match *unit {
            [lo, hi] => (lo, hi),
            [lo] => (lo, 0),
            _ => (0, 0),
        })
        .chain(std::iter::once((0, 0)))
}

/// Number of code units before the terminating zero unit.
pub fn strnlen_w(w_str: &[u8]) -> usize {
    wide_units(w_str)
        .take_while(|&unit| unit != (0, 0))
        .count()
}

/// Compares a wide string against a narrow one.
///
/// Units whose high byte is non-zero sort after every narrow character.
/// Otherwise the result is the difference of the first mismatching
/// (low) bytes, or zero if both strings are equal.
pub fn strcmp_w(w_str: &[u8], s: &[u8]) -> i32 {
    let narrow = s
        .iter()
        .copied()
        .take_while(|&b| b != 0)
        .chain(std::iter::once(0));

    for ((lo, hi), c) in wide_units(w_str).zip(narrow) {
        if hi != 0 {
            return 1;
        }
        if lo != c || c == 0 {
            return i32::from(lo) - i32::from(c);
        }
    }

    0
}

/// Copies the low bytes of a wide string into `dst`, truncating if needed.
///
/// Copying stops at the first unit with a zero low byte. Returns the
/// number of units up to that point.
pub fn strlcpy_w(dst: &mut [u8], w_src: &[u8]) -> usize {
    let units = wide_units(w_src)
        .take_while(|&(lo, _)| lo != 0)
        .count();

    let room = dst.len().saturating_sub(1);

    for (to, (lo, _)) in dst.iter_mut().zip(wide_units(w_src)).take(units.min(room)) {
        *to = lo;
    }

    if let Some(nul) = dst.get_mut(units.min(room)) {
        *nul = 0;
    }

    units
}

/// Finds the first occurrence of `needle` in `haystack`.
///
/// Returns `None` if either buffer is empty.
#[must_use]
pub fn memmem(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if haystack.is_empty() || needle.is_empty() {
        return None;
    }

    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// ASCII-only alphanumeric test, independent of the locale.
#[must_use]
pub fn isalnum(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
}

/// Parses the leading hexadecimal digits of `hex_str`.
///
/// Parsing stops at the first character that is not a hex digit. Digits
/// beyond the 16th shift earlier ones out.
#[must_use]
pub fn xtoi(hex_str: &str) -> u64 {
    hex_str
        .chars()
        .map_while(|c| c.to_digit(16))
        .fold(0, |acc, digit| (acc << 4) | u64::from(digit))
}
