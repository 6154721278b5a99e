//! Note to timer-preset lookup table

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::notes::SEMITONES_PER_OCTAVE;

/// Preset value for a note outside of the table
pub const SILENT_PRESET: i32 = 0xffff;

/// Timer-3 presets from `C-2` to `B-8`
#[rustfmt::skip]
pub const PITCH_TABLE: [u16; 84] = [
    0xEEE3, 0xE17A, 0xD4D2, 0xC8E0, 0xBD9A, 0xB2F6, 0xA8EA, 0x9F6F, 0x967C, 0x8E0A, 0x8611, 0x7E8B,
    0x7771, 0x70BC, 0x6A68, 0x646F, 0x5ECC, 0x597A, 0x5474, 0x4FB7, 0x4B3D, 0x4704, 0x4308, 0x3F45,
    0x3BB8, 0x385D, 0x3533, 0x3237, 0x2F65, 0x2CBC, 0x2A39, 0x27DB, 0x259E, 0x2381, 0x2183, 0x1FA2,
    0x1DDB, 0x1C2E, 0x1A99, 0x191B, 0x17B2, 0x165D, 0x151C, 0x13ED, 0x12CE, 0x11C0, 0x10C1, 0x0FD0,
    0x0EED, 0x0E16, 0x0D4C, 0x0C8D, 0x0BD8, 0x0B2E, 0x0A8D, 0x09F6, 0x0966, 0x08DF, 0x0860, 0x07E7,
    0x0776, 0x070A, 0x06A5, 0x0646, 0x05EB, 0x0596, 0x0546, 0x04FA, 0x04B2, 0x046F, 0x042F, 0x03F3,
    0x03BA, 0x0384, 0x0352, 0x0322, 0x02F5, 0x02CA, 0x02A2, 0x027C, 0x0258, 0x0237, 0x0217, 0x01F9,
];

/// Returns the timer preset for a semitone (relative to C, may be outside 0..12) and octave.
///
/// The table starts at octave 2, indexes outside of the table return [`SILENT_PRESET`].
pub fn note_preset(semitone: i64, octave: i32) -> i32 {
    let octave_offset = i64::from(octave - 1) * i64::from(SEMITONES_PER_OCTAVE);
    let index = octave_offset + semitone - i64::from(SEMITONES_PER_OCTAVE);

    usize::try_from(index)
        .ok()
        .and_then(|i| PITCH_TABLE.get(i))
        .map_or(SILENT_PRESET, |&p| p.into())
}
