//! Emulation loop and audio output

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use crate::engine::MusicEngine;
use crate::errors::{PlayerError, SinkError};
use crate::synth::{AUDIO_FREQ, SOUND_BUFFER};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const STEPS_PER_SECOND: u32 = 72;

/// Number of cycles emulated per player step
pub const CYCLES_PER_STEP: u32 = 4_000_000 / STEPS_PER_SECOND;

const GENERATED_SAMPLES_PER_STEP: usize = (AUDIO_FREQ / STEPS_PER_SECOND) as usize;

const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// A 16 bit mono [`AUDIO_FREQ`] audio output
pub trait Sink {
    fn open(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Called once playback has finished
    fn close(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Returns false if the sink cannot accept a block of samples
    fn is_writable(&self) -> bool {
        true
    }

    /// Maximum number of samples passed to a single `write()` call
    fn block_size(&self) -> usize {
        SOUND_BUFFER
    }

    fn write(&mut self, samples: &[i16]) -> Result<(), SinkError>;
}

/// Runs a [`MusicEngine`], pacing the emulation against the sinks
pub struct Player {
    sinks: Vec<Box<dyn Sink>>,
    stop: Arc<AtomicBool>,
    buffer: Vec<i16>,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            sinks: Vec::new(),
            stop: Arc::new(AtomicBool::new(false)),
            buffer: Vec::with_capacity(SOUND_BUFFER),
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn Sink>) {
        self.sinks.push(sink);
    }

    /// Setting the flag stops playback after the current step
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    fn is_writable(&self) -> bool {
        self.sinks.iter().all(|s| s.is_writable())
    }

    /// Writes up to `max` samples to every sink.
    ///
    /// Returns the number of samples written.
    fn fill(&mut self, engine: &mut MusicEngine, max: usize) -> Result<usize, SinkError> {
        let frames = self
            .sinks
            .iter()
            .map(|s| s.block_size())
            .fold(SOUND_BUFFER, usize::min)
            .min(max);

        self.buffer.resize(frames, 0);
        engine.read_samples(&mut self.buffer);

        for s in &mut self.sinks {
            s.write(&self.buffer)?;
        }
        Ok(frames)
    }

    fn wait_for_sinks(&self) {
        thread::sleep(POLL_INTERVAL);
    }

    fn run(&mut self, engine: &mut MusicEngine) -> Result<(), PlayerError> {
        let mut cont = true;

        while cont {
            if self.is_stopped() {
                log::debug!("playback stopped");
                engine.stop_bgm();
                engine.stop_sfx();
                return Ok(());
            }

            cont = engine.emulate(CYCLES_PER_STEP)?;

            if engine.synth().requires_sync() {
                while !cont || engine.synth().is_fifo_full() {
                    if self.is_stopped() {
                        break;
                    }
                    if self.is_writable() {
                        self.fill(engine, SOUND_BUFFER)?;
                    } else {
                        self.wait_for_sinks();
                    }
                    if !cont && !engine.synth().has_more_to_play() {
                        break;
                    }
                }
            } else {
                let mut remaining = GENERATED_SAMPLES_PER_STEP;
                while remaining > 0 && !self.is_stopped() {
                    if self.is_writable() {
                        remaining -= self.fill(engine, remaining)?;
                    } else {
                        self.wait_for_sinks();
                    }
                }
            }
        }

        Ok(())
    }

    /// Plays until the engine is idle and the output is drained, or until stopped
    pub fn play(&mut self, engine: &mut MusicEngine) -> Result<(), PlayerError> {
        for s in &mut self.sinks {
            s.open()?;
        }

        let r = self.run(engine);

        for s in &mut self.sinks {
            s.close()?;
        }
        r
    }
}
