//! Compiler state that is carried between commands

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::driver_constants::{MAX_OCTAVE, MIN_OCTAVE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EffectType {
    None,
    Arpeggio,
    Portamento,
    Random,
}

#[derive(Debug, Clone)]
pub(crate) struct Context {
    pub wait: i32,
    /// Semitone offsets of the second and third effect notes
    pub note2: i64,
    pub note3: i64,
    /// Pending RAM write, `ram_addr < 0` if there is none
    pub ram_addr: i32,
    pub ram_data: i32,
    pub length: i32,
    pub octave: i32,
    /// Hardware volume (0-3)
    pub volume: i32,
    pub pulse: i32,
    pub quantize: i32,
    pub sustain: i32,
    pub arp_ptr: usize,
    pub effect: EffectType,
    pub effect_ticks: i32,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            wait: 24,
            note2: -1,
            note3: -1,
            ram_addr: -1,
            ram_data: -1,
            length: 4,
            octave: 4,
            volume: 3,
            pulse: 128,
            quantize: 64,
            sustain: 64,
            arp_ptr: 0,
            effect: EffectType::None,
            effect_ticks: 1,
        }
    }
}

impl Context {
    pub fn step_octave(&mut self, up: bool) {
        self.octave = match up {
            true => (self.octave + 1).min(MAX_OCTAVE),
            false => (self.octave - 1).max(MIN_OCTAVE),
        };
    }

    pub fn take_ram_write(&mut self) -> Option<(u8, u8)> {
        if self.ram_addr < 0 {
            return None;
        }
        let w = (self.ram_addr as u8, self.ram_data as u8);
        self.ram_addr = -1;
        self.ram_data = -1;
        Some(w)
    }
}

/// Converts an MML volume (0-15) to a hardware volume (0-3)
pub(crate) fn map_volume(volume: i32) -> i32 {
    match volume {
        v if v > 8 => 3,
        v if v > 4 => 2,
        v if v > 2 => 1,
        _ => 0,
    }
}
