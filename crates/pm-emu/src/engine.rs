//! Music engine
//!
//! Interprets compiled BGM and SFX command streams on every timer 2 interrupt
//! and writes the tone into the timer 3 and audio registers.

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::errors::EngineError;
use crate::registers::{addresses, Registers, N_TIMERS};
use crate::synth::Synth;

use pmmusic::command::{flags, CompiledCommand};

use std::collections::HashMap;

pub const RAM_SIZE: usize = 0x1000;
pub const DEFAULT_RAM_OFFSET: u16 = 0x500;

pub const MAX_MASTER_VOLUME: u8 = 4;

/// Number of cycles emulated between timer updates
pub const HW_CYCLES: u32 = 16;

const DIV_2: u8 = 8;
const DIV_256: u8 = 13;

const TIMER_CTRL_START: u16 = 0x86;
const OSC1_ENABLE: u8 = 0x20;

const IRQ_TIMER: usize = 1;

const RECURSIVE_LIMIT: i32 = 65536;

/// Number of `emulate()` calls the engine stays alive after both streams stop
const PLAY_DECAY: u32 = 36;

const ENABLE_BGM: u8 = 0x01;
const ENABLE_SFX: u8 = 0x02;

/// Hardware volume, indexed by master volume and command volume.
///
/// Bit 2 lowers the pivot.
const VOLUME_TABLE: [[u8; 4]; MAX_MASTER_VOLUME as usize + 1] = [
    [0x00, 0x00, 0x00, 0x00],
    [0x00, 0x00, 0x06, 0x06],
    [0x00, 0x06, 0x06, 0x07],
    [0x00, 0x06, 0x02, 0x02],
    [0x00, 0x06, 0x02, 0x03],
];

pub type EndCallback = Box<dyn FnMut()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamKind {
    Bgm,
    Sfx,
}

#[derive(Debug, Clone, Copy)]
struct LoopMark {
    pattern: usize,
    offset: usize,
    count: i32,
}

enum Tick {
    Waiting,
    Output,
    End,
}

#[derive(Default)]
struct Stream {
    patterns: Vec<Vec<CompiledCommand>>,
    pattern: usize,
    offset: usize,
    wait: u8,

    master_volume: u8,
    play_volume: u8,
    preset: u16,
    pivot: u16,

    loops: HashMap<u8, LoopMark>,
    on_end: Option<EndCallback>,
}

impl Stream {
    fn start(&mut self, patterns: Vec<Vec<CompiledCommand>>, on_end: Option<EndCallback>) {
        self.patterns = patterns;
        self.pattern = 0;
        self.offset = 0;
        self.loops.clear();
        self.wait = 1;

        self.call_on_end();
        self.on_end = on_end;
    }

    fn stop(&mut self) {
        self.patterns.clear();
        self.call_on_end();
    }

    fn call_on_end(&mut self) {
        if let Some(mut f) = self.on_end.take() {
            f();
        }
    }

    fn set_master_volume(&mut self, volume: u8) {
        if volume <= MAX_MASTER_VOLUME {
            self.master_volume = volume;
        } else {
            log::debug!("ignoring master volume {}", volume);
        }
    }

    fn out_of_range(kind: StreamKind) -> EngineError {
        match kind {
            StreamKind::Bgm => EngineError::BgmOutOfRange,
            StreamKind::Sfx => EngineError::SfxOutOfRange,
        }
    }

    fn process(
        &mut self,
        kind: StreamKind,
        ram: &mut [u8],
        limit: &mut i32,
    ) -> Result<Tick, EngineError> {
        self.wait = self.wait.saturating_sub(1);
        if self.wait != 0 {
            return Ok(Tick::Waiting);
        }

        while *limit >= 0 {
            *limit -= 1;

            let cmd = *self
                .patterns
                .get(self.pattern)
                .and_then(|p| p.get(self.offset))
                .ok_or(Self::out_of_range(kind))?;

            log::trace!("{:?} {}:{} {:?}", kind, self.pattern, self.offset, cmd);

            self.wait = cmd.wait;
            if cmd.has(flags::VOL) {
                let table = &VOLUME_TABLE[usize::from(self.master_volume)];
                self.play_volume = table[usize::from(cmd.volume & 3)];
            }
            self.offset += 1;

            if cmd.has(flags::WRITERAM) {
                ram[usize::from(cmd.ram_addr)] = cmd.ram_data;
            }
            if cmd.has(flags::PRESET) {
                self.preset = cmd.preset;
            }
            if cmd.has(flags::PIVOT) {
                self.pivot = cmd.pivot;
            }

            if cmd.has(flags::END) {
                return Ok(Tick::End);
            }
            if cmd.has(flags::PATTERN) {
                match kind {
                    StreamKind::Sfx => return Ok(Tick::End),
                    StreamKind::Bgm => {
                        let p = self.pattern as i64 + i64::from(cmd.pattern);
                        let p = usize::try_from(p)
                            .ok()
                            .filter(|&p| p < self.patterns.len())
                            .ok_or(EngineError::InvalidPattern(cmd.pattern))?;

                        log::debug!("BGM pattern {} -> {}", self.pattern, p);
                        self.pattern = p;
                        self.offset = 0;
                    }
                }
            }

            if cmd.has(flags::MARK) {
                self.loops.insert(
                    cmd.loop_id,
                    LoopMark {
                        pattern: self.pattern,
                        offset: self.offset,
                        count: 0,
                    },
                );
            } else if cmd.has(flags::LOOP) {
                let l = self
                    .loops
                    .get_mut(&cmd.loop_id)
                    .ok_or(EngineError::MissingLoopMark(cmd.loop_id))?;
                if l.count != cmd.loop_num {
                    l.count += 1;
                    self.pattern = l.pattern;
                    self.offset = l.offset;
                }
            }

            if self.wait != 0 {
                return Ok(Tick::Output);
            }
        }

        Ok(Tick::Waiting)
    }

    fn write_output(&self, regs: &mut Registers) {
        let pivot = match self.play_volume & 4 {
            0 => self.pivot,
            _ => self.pivot >> 4,
        };
        regs.write_u16(addresses::TMR3_PRESET, self.preset);
        regs.write_u16(addresses::TMR3_PIVOT, pivot);
        regs.write(addresses::AUD_VOL, self.play_volume & 3);
    }
}

pub struct MusicEngine {
    regs: Registers,
    synth: Synth,

    ram: Box<[u8; RAM_SIZE]>,
    ram_offset: usize,

    enabled: u8,
    bgm: Stream,
    sfx: Stream,

    play_decay: u32,
}

impl MusicEngine {
    /// Creates an engine with both streams stopped.
    ///
    /// `ram_offset` is the location of the `!addr:data` RAM writes and
    /// must leave room for 256 bytes.
    pub fn new(master_time: u16, ram_offset: u16) -> Result<Self, EngineError> {
        use addresses::*;

        if usize::from(ram_offset) + 0x100 > RAM_SIZE {
            return Err(EngineError::RamOffsetOutOfRange(ram_offset));
        }

        let mut regs = Registers::new();

        regs.write_u16(TMR2_PRESET, master_time);

        regs.write(AUD_VOL, 0);
        regs.write_u16(TMR2_CTRL, 0);
        regs.write_u16(TMR3_PRESET, 0);
        regs.write_u16(TMR3_PIVOT, 0);
        regs.write(TMR2_OSC, 0);
        regs.write(TMR3_OSC, 0);
        regs.write(TMR2_SCALE, DIV_256);
        regs.write(TMR3_SCALE, DIV_2);

        regs.write_u16(TMR3_CTRL, TIMER_CTRL_START);
        regs.write(TMR1_OSC, OSC1_ENABLE);

        let mut engine = Self {
            regs,
            synth: Synth::default(),
            ram: Box::new([0; RAM_SIZE]),
            ram_offset: ram_offset.into(),
            enabled: 0,
            bgm: Stream::default(),
            sfx: Stream::default(),
            play_decay: PLAY_DECAY,
        };
        engine.set_bgm_volume(MAX_MASTER_VOLUME);
        engine.set_sfx_volume(MAX_MASTER_VOLUME);

        Ok(engine)
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn synth(&self) -> &Synth {
        &self.synth
    }

    pub fn synth_mut(&mut self) -> &mut Synth {
        &mut self.synth
    }

    /// The RAM written by the `!addr:data` commands
    pub fn ram(&self) -> &[u8] {
        &self.ram[self.ram_offset..]
    }

    /// Master BGM volume (0-4), other values are ignored
    pub fn set_bgm_volume(&mut self, volume: u8) {
        self.bgm.set_master_volume(volume);
    }

    /// Master SFX volume (0-4), other values are ignored
    pub fn set_sfx_volume(&mut self, volume: u8) {
        self.sfx.set_master_volume(volume);
    }

    pub fn set_master_time(&mut self, master_time: u16) {
        self.regs.write_u16(addresses::TMR2_PRESET, master_time);
    }

    fn start_timers(&mut self) {
        use addresses::*;

        self.regs.write_u16(TMR2_CTRL, TIMER_CTRL_START);
        self.regs.write_u16(TMR3_PRESET, 0);
        self.regs.write(TMR3_CTRL, TIMER_CTRL_START as u8);
    }

    fn stop_timers_if_idle(&mut self) {
        if self.enabled == 0 {
            self.regs.write(addresses::TMR2_CTRL, 0);
            self.regs.write(addresses::TMR3_CTRL, 0);
        }
    }

    /// Plays a BGM.
    ///
    /// `patterns` are the BGM's compiled patterns in play order.
    /// `on_end` is called when the BGM ends or is replaced.
    pub fn play_bgm(&mut self, patterns: Vec<Vec<CompiledCommand>>, on_end: Option<EndCallback>) {
        log::debug!("play BGM ({} patterns)", patterns.len());

        self.bgm.start(patterns, on_end);
        self.enabled = (self.enabled & ENABLE_SFX) | ENABLE_BGM;

        if self.enabled & ENABLE_SFX == 0 {
            self.start_timers();
        }
    }

    pub fn stop_bgm(&mut self) {
        log::debug!("stop BGM");

        self.bgm.stop();
        self.enabled &= ENABLE_SFX;
        self.stop_timers_if_idle();
    }

    pub fn is_playing_bgm(&self) -> bool {
        self.enabled & ENABLE_BGM != 0
    }

    /// Plays a sound effect (or a single pattern)
    pub fn play_sfx(&mut self, commands: Vec<CompiledCommand>, on_end: Option<EndCallback>) {
        log::debug!("play SFX ({} commands)", commands.len());

        self.sfx.start(vec![commands], on_end);
        self.enabled = (self.enabled & ENABLE_BGM) | ENABLE_SFX;

        self.start_timers();
    }

    pub fn stop_sfx(&mut self) {
        log::debug!("stop SFX");

        self.sfx.stop();
        self.enabled &= ENABLE_BGM;
        self.stop_timers_if_idle();
    }

    pub fn is_playing_sfx(&self) -> bool {
        self.enabled & ENABLE_SFX != 0
    }

    fn fault(&mut self, e: EngineError) -> EngineError {
        log::warn!("{}, disabling music engine", e);
        self.enabled = 0;
        e
    }

    /// Processes a single timer 2 interrupt
    pub fn irq(&mut self) -> Result<(), EngineError> {
        let mut limit = RECURSIVE_LIMIT;
        let ram = &mut self.ram[self.ram_offset..];

        if self.enabled & ENABLE_BGM != 0 {
            match self.bgm.process(StreamKind::Bgm, ram, &mut limit) {
                Err(e) => return Err(self.fault(e)),
                Ok(Tick::End) => {
                    self.stop_bgm();
                    return Ok(());
                }
                Ok(Tick::Output) => {
                    // SFX has priority
                    if self.sfx.master_volume == 0 || self.enabled & ENABLE_SFX == 0 {
                        self.bgm.write_output(&mut self.regs);
                    }
                }
                Ok(Tick::Waiting) => (),
            }
        }

        let ram = &mut self.ram[self.ram_offset..];

        if self.enabled & ENABLE_SFX != 0 {
            match self.sfx.process(StreamKind::Sfx, ram, &mut limit) {
                Err(e) => return Err(self.fault(e)),
                Ok(Tick::End) => {
                    self.stop_sfx();
                    return Ok(());
                }
                Ok(Tick::Output) => self.sfx.write_output(&mut self.regs),
                Ok(Tick::Waiting) => (),
            }
        }

        if limit <= 0 {
            return Err(self.fault(EngineError::RecursiveOverflow));
        }
        Ok(())
    }

    /// Advances the hardware by `cycles` clock cycles.
    ///
    /// Returns false once the engine has been idle for a while.
    pub fn emulate(&mut self, cycles: u32) -> Result<bool, EngineError> {
        if self.enabled != 0 {
            self.play_decay = PLAY_DECAY;
        } else {
            self.play_decay = self.play_decay.saturating_sub(1);
        }

        let mut remaining = i64::from(cycles);
        while remaining > 0 {
            for t in 0..N_TIMERS {
                let events = self.regs.timers[t].sync(HW_CYCLES);
                if t == IRQ_TIMER && events.hi_underflow {
                    self.irq()?;
                }
            }
            if self.synth.requires_sync() {
                self.synth.sync(&self.regs, HW_CYCLES);
            }
            remaining -= i64::from(HW_CYCLES);
        }

        Ok(self.play_decay != 0)
    }

    /// Reads the rendered samples, see [`Synth::read_samples()`]
    pub fn read_samples(&mut self, out: &mut [i16]) -> usize {
        self.synth.read_samples(&self.regs, out)
    }
}
