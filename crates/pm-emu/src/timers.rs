//! General purpose hardware timers

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

/// Counter decrement per cycle, indexed by prescale (8-15 are the enabled rates).
///
/// Counters are 8.24 fixed point.
const OSC1_DEC: [i64; 16] = [
    0,
    0,
    0,
    0,
    0,
    0,
    0,
    0,
    0x1000000 / 2,    // 2000000 Hz
    0x1000000 / 8,    //  500000 Hz
    0x1000000 / 32,   //  125000 Hz
    0x1000000 / 64,   //   62500 Hz
    0x1000000 / 128,  //   31250 Hz
    0x1000000 / 256,  //   15625 Hz
    0x1000000 / 1024, //    3906.25 Hz
    0x1000000 / 4096, //     976.5625 Hz
];

// Approximate values
const OSC2_DEC: [i64; 16] = [
    0,
    0,
    0,
    0,
    0,
    0,
    0,
    0,
    0x1000000 / 122,   // 32768 Hz
    0x1000000 / 244,   // 16384 Hz
    0x1000000 / 488,   //  8192 Hz
    0x1000000 / 977,   //  4096 Hz
    0x1000000 / 1953,  //  2048 Hz
    0x1000000 / 3906,  //  1024 Hz
    0x1000000 / 7812,  //   512 Hz
    0x1000000 / 15625, //   256 Hz
];

/// Timer events raised by a single [`GeneralTimer::sync()`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerEvents {
    pub lo_underflow: bool,
    /// Also raised when a 16 bit timer underflows
    pub hi_underflow: bool,
    pub pivot: bool,
}

/// One 8 bit half of a [`GeneralTimer`]
#[derive(Debug, Clone)]
pub struct TimerByte {
    pub preset: u8,
    count: i64,
    enabled: bool,
    prescale: u8,
    oscillator: u8,
    dec: i64,
}

impl Default for TimerByte {
    fn default() -> Self {
        Self {
            preset: 0xff,
            count: 0,
            enabled: false,
            prescale: 0,
            oscillator: 0,
            dec: 0,
        }
    }
}

impl TimerByte {
    fn update_dec(&mut self) {
        self.dec = match (self.enabled, self.oscillator) {
            (false, _) => 0,
            (true, 0) => OSC1_DEC[usize::from(self.prescale)],
            (true, _) => OSC2_DEC[usize::from(self.prescale)],
        };
    }

    fn reload(&mut self) {
        self.count = i64::from(self.preset) << 24;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.update_dec();
    }

    pub fn prescale(&self) -> u8 {
        self.prescale
    }

    pub fn set_prescale(&mut self, prescale: u8) {
        self.prescale = prescale & 0x0f;
        self.update_dec();
    }

    pub fn oscillator(&self) -> u8 {
        self.oscillator
    }

    pub fn set_oscillator(&mut self, oscillator: u8) {
        self.oscillator = oscillator & 1;
        self.update_dec();
    }

    /// The top 8 bits of the counter
    pub fn count(&self) -> u8 {
        ((self.count >> 24) & 0xff) as u8
    }
}

/// A general timer.
///
/// Either two independent 8 bit timers or (in wide mode) a single 16 bit timer
/// driven by `lo`.
#[derive(Debug, Clone, Default)]
pub struct GeneralTimer {
    pub wide_mode: bool,
    pub pivot: u16,
    pub hi: TimerByte,
    pub lo: TimerByte,
}

impl GeneralTimer {
    pub fn preset(&self) -> u16 {
        u16::from_le_bytes([self.lo.preset, self.hi.preset])
    }

    pub fn set_preset(&mut self, preset: u16) {
        let [lo, hi] = preset.to_le_bytes();
        self.lo.preset = lo;
        self.hi.preset = hi;
    }

    pub fn count(&self) -> u16 {
        u16::from_le_bytes([self.lo.count(), self.hi.count()])
    }

    /// Advances the timer by `cycles` clock cycles
    pub fn sync(&mut self, cycles: u32) -> TimerEvents {
        let cycles = i64::from(cycles);
        let mut events = TimerEvents::default();

        if self.wide_mode {
            if self.lo.enabled {
                let precount = u16::from(self.lo.count());

                self.lo.count -= self.lo.dec * cycles;
                if self.lo.count < 0 {
                    self.hi.count -= 0x0100_0000;
                    if self.hi.count < 0 {
                        self.lo.reload();
                        self.hi.reload();
                        events.hi_underflow = true;
                    } else {
                        self.lo.count &= 0xffff_ffff;
                    }
                }

                // The new high byte is compared against both counts
                let hi = u16::from(self.hi.count()) << 8;
                let precount = precount | hi;
                let count = hi | u16::from(self.lo.count());
                events.pivot = precount > self.pivot && count <= self.pivot;
            }
        } else {
            if self.lo.enabled {
                self.lo.count -= self.lo.dec * cycles;
                if self.lo.count < 0 {
                    self.lo.reload();
                    events.lo_underflow = true;
                }
            }
            if self.hi.enabled {
                let precount = u16::from(self.hi.count()) << 8;

                self.hi.count -= self.hi.dec * cycles;
                if self.hi.count < 0 {
                    self.hi.reload();
                    events.hi_underflow = true;
                }

                let lo = u16::from(self.lo.count());
                let precount = precount | lo;
                let count = lo | (u16::from(self.hi.count()) << 8);
                events.pivot = precount > self.pivot && count <= self.pivot;
            }
        }

        events
    }
}
