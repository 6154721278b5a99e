//! Sound-driver constants

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

// These values MUST match the sound driver.

/// Number of nested loops the driver can track
pub const MAX_LOOP_ID: i32 = 3;

pub const MAX_WAIT: i32 = 255;
pub const MIN_OCTAVE: i32 = 1;
pub const MAX_OCTAVE: i32 = 9;

pub const MAX_VOLUME: i32 = 15;
pub const MAX_PULSE_WIDTH: i32 = 255;
pub const MAX_QUANTIZE: i32 = 64;
pub const MAX_SUSTAIN: i32 = 64;
pub const MAX_NOTE_LENGTH: i32 = 64;
pub const MAX_NOTE_EXTENSION: u8 = 4;
pub const MAX_EFFECT_TICKS: i32 = 128;

pub const MAX_RAM_ADDRESS: i32 = 255;
pub const RAM_DATA_BITS: u32 = 8;

// Timer 2 preset
pub const DEFAULT_MASTER_TIME: u16 = 260;

/// Number of hardware volume levels
pub const N_HARDWARE_VOLUMES: i32 = 4;

/// Divisors for a dotted note length (`c4.`, `c4..`, ...)
pub const NOTE_EXTENSION_DIVISORS: [f64; MAX_NOTE_EXTENSION as usize + 1] =
    [1.0, 1.5, 1.75, 1.875, 1.9375];

/// Clock rate of the `MASTERBPM` calculation
pub const MASTER_BPM_CLOCK: f64 = 3905.25;
pub const MASTER_BPM_TICKS_PER_BEAT: f64 = 960.0;
