//! Number parsing functions

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::driver_constants::{MASTER_BPM_CLOCK, MASTER_BPM_TICKS_PER_BEAT};
use crate::errors::ParseErrorKind;

fn is_hex(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

fn is_dec(b: u8) -> bool {
    b.is_ascii_digit()
}

/// Length of an optionally negative run of digits at the start of `s`
fn signed_digits_len(s: &str, pattern: impl Fn(u8) -> bool) -> usize {
    let bytes = s.as_bytes();
    let sign = usize::from(bytes.first() == Some(&b'-'));
    let n_digits = bytes[sign..].iter().take_while(|&&b| pattern(b)).count();

    if n_digits > 0 {
        sign + n_digits
    } else {
        0
    }
}

fn parse_radix(s: &str, radix: u32) -> Result<i64, ParseErrorKind> {
    i64::from_str_radix(s, radix).map_err(|_| ParseErrorKind::ExpectedNumber)
}

/// Reads a number from the start of `s`.
///
/// Accepts `[ \t]*` followed by `0x-?HEX`, `$-?HEX` or `-?DEC`.
/// Returns `Ok(None)` if there is no number and the value and the number of bytes read otherwise.
pub fn read_num(s: &str) -> Result<Option<(i64, usize)>, ParseErrorKind> {
    let trimmed = s.trim_start_matches([' ', '\t']);
    let spaces = s.len() - trimmed.len();

    let (prefix, radix) = if trimmed.starts_with("0x") {
        (2, 16)
    } else if trimmed.starts_with('$') {
        (1, 16)
    } else {
        (0, 10)
    };

    let digits = &trimmed[prefix..];
    let len = match radix {
        16 => signed_digits_len(digits, is_hex),
        _ => signed_digits_len(digits, is_dec),
    };

    if len == 0 {
        // `0x` without hex digits is the decimal 0 followed by an `x`
        if prefix == 2 {
            return Ok(Some((0, spaces + 1)));
        }
        return Ok(None);
    }

    let value = parse_radix(&digits[..len], radix)?;
    Ok(Some((value, spaces + prefix + len)))
}

/// Parses a number that fills all of `s` (see [`read_num`])
pub fn parse_num(s: &str) -> Result<i64, ParseErrorKind> {
    match read_num(s)? {
        Some((v, len)) if len == s.len() => Ok(v),
        _ => Err(ParseErrorKind::ExpectedNumber),
    }
}

/// Parses a directive number: `-?#HEX`, `-?$HEX` or `-?DEC`
pub fn parse_num1(s: &str) -> Result<i64, ParseErrorKind> {
    let (negative, rest) = match s.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, s),
    };

    let value = match rest.strip_prefix(['#', '$']) {
        Some(hex) if !hex.is_empty() && hex.bytes().all(is_hex) => parse_radix(hex, 16)?,
        Some(_) => return Err(ParseErrorKind::ExpectedNumber),
        None if !rest.is_empty() && rest.bytes().all(is_dec) => parse_radix(rest, 10)?,
        None => return Err(ParseErrorKind::ExpectedNumber),
    };

    Ok(if negative { -value } else { value })
}

pub fn to_i32(v: i64) -> Result<i32, ParseErrorKind> {
    i32::try_from(v).map_err(|_| ParseErrorKind::NumberOutOfRange(v))
}

pub fn to_u16(v: i64) -> Result<u16, ParseErrorKind> {
    u16::try_from(v).map_err(|_| ParseErrorKind::NumberOutOfRange(v))
}

/// Parses `:` separated numbers, an empty string has no arguments
pub fn parse_colon_list(s: &str) -> Result<Vec<i64>, ParseErrorKind> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    s.split(':').map(|a| parse_num(a.trim())).collect()
}

pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "no" | "false" | "0" => Some(false),
        "yes" | "true" | "1" => Some(true),
        _ => None,
    }
}

/// Converts a float to an i32 using the wrapping, NaN-is-zero semantics of the driver tools.
pub fn to_int32(v: f64) -> i32 {
    if !v.is_finite() {
        return 0;
    }
    let t = v.trunc() % 4294967296.0;
    // `t` is within the i64 range
    (t as i64) as i32
}

/// Converts a `MASTERBPM bpm, wait` pair into a timer-2 preset
pub fn master_bpm_to_time(bpm: f64, wait: i64) -> i32 {
    let ticks = bpm / MASTER_BPM_TICKS_PER_BEAT * (wait as f64);
    to_int32(MASTER_BPM_CLOCK / ticks).wrapping_sub(1)
}
