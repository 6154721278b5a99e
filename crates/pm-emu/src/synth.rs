//! Square wave synthesizer

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::filters::{Filter, FilterState};
use crate::registers::Registers;
use crate::timers::GeneralTimer;

use std::collections::VecDeque;
use std::str::FromStr;

pub const AUDIO_FREQ: u32 = 44100;

/// Maximum number of samples read from the synthesizer at once
pub const SOUND_BUFFER: usize = 2048;

const FIFO_THRESHOLD: usize = (SOUND_BUFFER * 4 * 3) >> 1;

const AUDIO_CONV: f64 = 0x7fffffff as f64 / AUDIO_FREQ as f64 * 2.0;
const AUDIO_INC: u64 = 184969;
const AUDIO_PWM_RANGE: u32 = 8191;

const MIN_FREQUENCY: u32 = 50;
const MAX_FREQUENCY: u32 = 20000;

// Timer clock, indexed by prescale
const COUNT_FREQ_OSC1: [f64; 16] = [
    1.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    4000000.0 / 2.0,
    4000000.0 / 8.0,
    4000000.0 / 32.0,
    4000000.0 / 64.0,
    4000000.0 / 128.0,
    4000000.0 / 256.0,
    4000000.0 / 1024.0,
    4000000.0 / 4096.0,
];

const COUNT_FREQ_OSC2: [f64; 16] = [
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    32768.0,
    32768.0 / 2.0,
    32768.0 / 4.0,
    32768.0 / 8.0,
    32768.0 / 16.0,
    32768.0 / 32.0,
    32768.0 / 64.0,
    32768.0 / 128.0,
];

/// Sample amplitude and PWM multiplier for each hardware volume
const VOLUME_AMPLITUDE: [i32; 4] = [0, 0x2000, 0x2000, 0x4000];
const VOLUME_PWM_MUL: [i32; 4] = [0, 1, 1, 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SoundEngine {
    /// Free running square wave, not clocked by the emulator
    Generated,
    /// Samples the timer 3 output
    #[default]
    Direct,
    /// Square wave derived from the timer 3 settings
    Emulated,
    DirectPwm,
}

impl FromStr for SoundEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "generated" => Ok(Self::Generated),
            "direct" => Ok(Self::Direct),
            "emulated" => Ok(Self::Emulated),
            "direct_pwm" | "directpwm" => Ok(Self::DirectPwm),
            _ => Err(format!("unknown engine {:?}", s)),
        }
    }
}

/// Tone parameters derived from the timer 3 registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneParameters {
    pub frequency: u32,
    /// 0 - 4095
    pub pulse_width: u32,
}

impl ToneParameters {
    pub fn from_timer(tmr3: &GeneralTimer) -> Self {
        let lo = &tmr3.lo;
        let clock = match (lo.enabled(), lo.oscillator()) {
            (false, _) => 0.0,
            (true, 0) => COUNT_FREQ_OSC1[usize::from(lo.prescale())],
            (true, _) => COUNT_FREQ_OSC2[usize::from(lo.prescale())],
        };

        if clock == 0.0 {
            return Self {
                frequency: 0,
                pulse_width: 0,
            };
        }

        let preset = tmr3.preset();
        let pulse_width = match preset {
            0 => 0,
            p => {
                let p = 4095 - (u32::from(tmr3.pivot) * 4096 / u32::from(p)) as i64;
                p.max(0) as u32
            }
        };

        Self {
            frequency: (clock / (f64::from(preset) + 1.0)) as u32,
            pulse_width,
        }
    }

    fn is_audible(&self) -> bool {
        (MIN_FREQUENCY..MAX_FREQUENCY).contains(&self.frequency)
    }

    fn sample_step(&self) -> u32 {
        (f64::from(self.frequency) * AUDIO_CONV) as u32
    }
}

/// Converts the timer 3 output into 16 bit mono samples at [`AUDIO_FREQ`]
#[derive(Debug, Clone)]
pub struct Synth {
    engine: SoundEngine,
    filter: FilterState,

    fifo: VecDeque<i16>,
    audio_cycle_count: u64,
    audio_sample_count: u32,
}

impl Default for Synth {
    fn default() -> Self {
        Self::new(SoundEngine::default(), Filter::default())
    }
}

impl Synth {
    pub fn new(engine: SoundEngine, filter: Filter) -> Self {
        Self {
            engine,
            filter: FilterState::new(filter),
            fifo: VecDeque::with_capacity(FIFO_THRESHOLD + SOUND_BUFFER),
            audio_cycle_count: 0,
            audio_sample_count: 0,
        }
    }

    pub fn engine(&self) -> SoundEngine {
        self.engine
    }

    pub fn change_engine(&mut self, engine: SoundEngine) {
        self.engine = engine;
    }

    pub fn filter(&self) -> Filter {
        self.filter.filter()
    }

    pub fn change_filter(&mut self, filter: Filter) {
        self.filter = FilterState::new(filter);
    }

    /// True if the samples are clocked by [`Synth::sync()`]
    pub fn requires_sync(&self) -> bool {
        self.engine != SoundEngine::Generated
    }

    /// True if enough samples are buffered that the emulator should wait for the output
    pub fn is_fifo_full(&self) -> bool {
        self.requires_sync() && self.fifo.len() >= FIFO_THRESHOLD
    }

    pub fn has_more_to_play(&self) -> bool {
        !self.fifo.is_empty()
    }

    /// Advances the sample clock, rendering at most one sample
    pub fn sync(&mut self, regs: &Registers, cycles: u32) {
        self.audio_cycle_count += AUDIO_INC * u64::from(cycles);
        if self.audio_cycle_count >= 0x0100_0000 {
            self.audio_cycle_count -= 0x0100_0000;

            let sample = match self.engine {
                SoundEngine::Generated => return,
                SoundEngine::Direct => Self::process_direct(regs),
                SoundEngine::Emulated => self.process_emulated(regs),
                SoundEngine::DirectPwm => Self::process_direct_pwm(regs),
            };
            let sample = self.filter.apply(sample);
            self.fifo.push_back(sample);
        }
    }

    fn process_direct(regs: &Registers) -> i32 {
        let tmr3 = &regs.timers[2];
        match tmr3.count() <= tmr3.pivot {
            true => VOLUME_AMPLITUDE[usize::from(regs.audio_volume())],
            false => 0,
        }
    }

    fn process_emulated(&mut self, regs: &Registers) -> i32 {
        let volume = usize::from(regs.audio_volume());
        let tone = ToneParameters::from_timer(&regs.timers[2]);

        if tone.frequency < MIN_FREQUENCY {
            0
        } else if tone.frequency < MAX_FREQUENCY {
            self.audio_sample_count = self.audio_sample_count.wrapping_sub(tone.sample_step());
            if self.audio_sample_count & 0xfff0_0000 >= tone.pulse_width << 20 {
                VOLUME_AMPLITUDE[volume]
            } else {
                0
            }
        } else {
            (tone.pulse_width.min(0xfff) << 2) as i32 * VOLUME_PWM_MUL[volume]
        }
    }

    fn process_direct_pwm(regs: &Registers) -> i32 {
        let volume = usize::from(regs.audio_volume());
        let tmr3 = &regs.timers[2];
        let preset = tmr3.preset();

        let mut pwm = match preset {
            0 => 0,
            p => u32::from(tmr3.pivot) * AUDIO_PWM_RANGE / u32::from(p),
        };
        if pwm > AUDIO_PWM_RANGE {
            // Avoid clipping
            pwm = AUDIO_PWM_RANGE - 1;
        }
        let count = match preset < 128 {
            true => 0,
            false => tmr3.count(),
        };

        let ripple = pwm as i32 * VOLUME_PWM_MUL[volume];
        match count <= tmr3.pivot {
            true => VOLUME_AMPLITUDE[volume] + ripple,
            false => ripple,
        }
    }

    fn generate_sample(&mut self, tone: ToneParameters, volume: u8) -> i16 {
        if tone.is_audible() {
            self.audio_sample_count = self.audio_sample_count.wrapping_add(tone.sample_step());
            if self.audio_sample_count & 0xfff0_0000 >= tone.pulse_width << 20 {
                return self.filter.apply(VOLUME_AMPLITUDE[usize::from(volume)]);
            }
        }
        self.filter.apply(0)
    }

    /// Returns the buffered samples.
    ///
    /// The iterator ends when the buffer is empty.
    /// The generated engine never runs out of samples.
    pub fn samples<'a>(&'a mut self, regs: &Registers) -> Samples<'a> {
        let generated = match self.engine {
            SoundEngine::Generated => Some((
                ToneParameters::from_timer(&regs.timers[2]),
                regs.audio_volume(),
            )),
            _ => None,
        };
        Samples {
            synth: self,
            generated,
        }
    }

    /// Fills `out` with samples, zero filling the remainder if the buffer runs out.
    ///
    /// Returns the number of samples read.
    pub fn read_samples(&mut self, regs: &Registers, out: &mut [i16]) -> usize {
        let mut n = 0;
        for (o, s) in out.iter_mut().zip(self.samples(regs)) {
            *o = s;
            n += 1;
        }
        out[n..].fill(0);
        n
    }
}

pub struct Samples<'a> {
    synth: &'a mut Synth,
    generated: Option<(ToneParameters, u8)>,
}

impl Iterator for Samples<'_> {
    type Item = i16;

    fn next(&mut self) -> Option<i16> {
        match self.generated {
            Some((tone, volume)) => Some(self.synth.generate_sample(tone, volume)),
            None => self.synth.fifo.pop_front(),
        }
    }
}
