//! Hardware register file

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::timers::GeneralTimer;

pub const N_REGISTERS: usize = 0x100;
pub const N_TIMERS: usize = 3;

pub mod addresses {
    pub const TMR1_SCALE: u8 = 0x18;
    pub const TMR1_OSC: u8 = 0x19;
    pub const TMR2_SCALE: u8 = 0x1a;
    pub const TMR2_OSC: u8 = 0x1b;
    pub const TMR3_SCALE: u8 = 0x1c;
    pub const TMR3_OSC: u8 = 0x1d;

    pub const TMR1_CTRL: u8 = 0x30;
    pub const TMR1_PRESET: u8 = 0x32;
    pub const TMR1_PIVOT: u8 = 0x34;

    pub const TMR2_CTRL: u8 = 0x38;
    pub const TMR2_PRESET: u8 = 0x3a;
    pub const TMR2_PIVOT: u8 = 0x3c;

    pub const TMR3_CTRL: u8 = 0x48;
    pub const TMR3_PRESET: u8 = 0x4a;
    pub const TMR3_PIVOT: u8 = 0x4c;

    pub const AUD_CTRL: u8 = 0x70;
    pub const AUD_VOL: u8 = 0x71;
}

const CTRL_WIDE: u8 = 0x80;
const CTRL_ENABLE: u8 = 0x04;

/// What a register offset controls
#[derive(Debug, Clone, Copy)]
enum Register {
    Scale(usize),
    Oscillator(usize),
    LoControl(usize),
    HiControl(usize),
    LoPreset(usize),
    HiPreset(usize),
    LoPivot(usize),
    HiPivot(usize),
    AudioControl,
    AudioVolume,
    Storage,
}

fn decode(reg: u8) -> Register {
    use addresses::*;

    let timer_block = |base: u8, t: usize| match reg - base {
        0 => Register::LoControl(t),
        1 => Register::HiControl(t),
        2 => Register::LoPreset(t),
        3 => Register::HiPreset(t),
        4 => Register::LoPivot(t),
        5 => Register::HiPivot(t),
        _ => Register::Storage,
    };

    match reg {
        TMR1_SCALE | TMR2_SCALE | TMR3_SCALE => Register::Scale(usize::from(reg - TMR1_SCALE) / 2),
        TMR1_OSC | TMR2_OSC | TMR3_OSC => Register::Oscillator(usize::from(reg - TMR1_OSC) / 2),
        0x30..=0x35 => timer_block(TMR1_CTRL, 0),
        0x38..=0x3d => timer_block(TMR2_CTRL, 1),
        0x48..=0x4d => timer_block(TMR3_CTRL, 2),
        AUD_CTRL => Register::AudioControl,
        AUD_VOL => Register::AudioVolume,
        _ => Register::Storage,
    }
}

/// The timer and audio registers.
///
/// Offsets without hardware behaviour are plain storage.
#[derive(Debug, Clone)]
pub struct Registers {
    pub timers: [GeneralTimer; N_TIMERS],
    storage: [u8; N_REGISTERS],
    audio_volume: u8,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    pub fn new() -> Self {
        Self {
            timers: Default::default(),
            storage: [0; N_REGISTERS],
            audio_volume: 0,
        }
    }

    /// Hardware audio volume (0-3)
    pub fn audio_volume(&self) -> u8 {
        self.audio_volume
    }

    pub fn read(&self, reg: u8) -> u8 {
        match decode(reg) {
            Register::Scale(t) => {
                let t = &self.timers[t];
                (t.hi.prescale() << 4) | t.lo.prescale()
            }
            Register::Oscillator(t) => {
                let t = &self.timers[t];
                (t.hi.oscillator() << 1) | t.lo.oscillator()
            }
            Register::LoControl(t) => {
                let t = &self.timers[t];
                let wide = if t.wide_mode { CTRL_WIDE } else { 0 };
                let enabled = if t.lo.enabled() { CTRL_ENABLE } else { 0 };
                wide | enabled
            }
            Register::HiControl(t) => match self.timers[t].hi.enabled() {
                true => CTRL_ENABLE,
                false => 0,
            },
            Register::LoPreset(t) => self.timers[t].lo.preset,
            Register::HiPreset(t) => self.timers[t].hi.preset,
            Register::LoPivot(t) => self.timers[t].pivot.to_le_bytes()[0],
            Register::HiPivot(t) => self.timers[t].pivot.to_le_bytes()[1],
            Register::AudioVolume => self.audio_volume,
            Register::AudioControl | Register::Storage => self.storage[usize::from(reg)],
        }
    }

    pub fn read_u16(&self, reg: u8) -> u16 {
        u16::from_le_bytes([self.read(reg), self.read(reg.wrapping_add(1))])
    }

    pub fn write(&mut self, reg: u8, value: u8) {
        self.storage[usize::from(reg)] = value;

        match decode(reg) {
            Register::Scale(t) => {
                let t = &mut self.timers[t];
                t.hi.set_prescale(value >> 4);
                t.lo.set_prescale(value & 0x0f);
            }
            Register::Oscillator(t) => {
                let t = &mut self.timers[t];
                t.hi.set_oscillator(value >> 1);
                t.lo.set_oscillator(value);
            }
            Register::LoControl(t) => {
                let t = &mut self.timers[t];
                t.wide_mode = value & CTRL_WIDE != 0;
                t.lo.set_enabled(value & CTRL_ENABLE != 0);
            }
            Register::HiControl(t) => {
                self.timers[t].hi.set_enabled(value & CTRL_ENABLE != 0);
            }
            Register::LoPreset(t) => self.timers[t].lo.preset = value,
            Register::HiPreset(t) => self.timers[t].hi.preset = value,
            Register::LoPivot(t) => {
                let p = &mut self.timers[t].pivot;
                *p = (*p & 0xff00) | u16::from(value);
            }
            Register::HiPivot(t) => {
                let p = &mut self.timers[t].pivot;
                *p = (*p & 0x00ff) | (u16::from(value) << 8);
            }
            Register::AudioControl => {
                if value & 3 != 0 {
                    self.audio_volume = 0;
                }
            }
            Register::AudioVolume => self.audio_volume = value & 3,
            Register::Storage => (),
        }
    }

    pub fn write_u16(&mut self, reg: u8, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write(reg, lo);
        self.write(reg.wrapping_add(1), hi);
    }
}
