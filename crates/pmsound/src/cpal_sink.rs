//! Speaker output

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use pm_emu::errors::SinkError;
use pm_emu::synth::SOUND_BUFFER;
use pm_emu::{Sink, AUDIO_FREQ};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use std::thread;
use std::time::{Duration, Instant};

const RING_BUFFER_SIZE: usize = SOUND_BUFFER * 4;

const POLL_INTERVAL: Duration = Duration::from_millis(1);
const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

fn sink_error(e: impl std::fmt::Display) -> SinkError {
    SinkError(e.to_string())
}

/// Plays the player output on the default audio device
pub struct CpalSink {
    producer: HeapProd<i16>,
    consumer: Option<HeapCons<i16>>,
    stream: Option<Stream>,
}

impl CpalSink {
    pub fn new() -> Self {
        let (producer, consumer) = HeapRb::<i16>::new(RING_BUFFER_SIZE).split();

        Self {
            producer,
            consumer: Some(consumer),
            stream: None,
        }
    }

    fn build_stream(&mut self) -> Result<Stream, SinkError> {
        let Some(mut consumer) = self.consumer.take() else {
            return Err(SinkError("audio stream already opened".to_owned()));
        };

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| SinkError("no audio output device".to_owned()))?;

        let rate = SampleRate(AUDIO_FREQ);
        let config: StreamConfig = device
            .supported_output_configs()
            .map_err(sink_error)?
            .find(|c| c.min_sample_rate() <= rate && c.max_sample_rate() >= rate)
            .ok_or_else(|| SinkError(format!("audio device does not support {} Hz", AUDIO_FREQ)))?
            .with_sample_rate(rate)
            .into();

        let channels = usize::from(config.channels).max(1);

        log::debug!(
            "audio device {}, {} channel(s)",
            device.name().unwrap_or_default(),
            channels
        );

        device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(channels) {
                        let s = match consumer.try_pop() {
                            Some(s) => f32::from(s) / 32768.0,
                            None => 0.0,
                        };
                        frame.fill(s);
                    }
                },
                |e| log::error!("audio stream error: {}", e),
                None,
            )
            .map_err(sink_error)
    }
}

impl Default for CpalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for CpalSink {
    fn open(&mut self) -> Result<(), SinkError> {
        let stream = self.build_stream()?;
        stream.play().map_err(sink_error)?;

        self.stream = Some(stream);
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        let start = Instant::now();
        while !self.producer.is_empty() && start.elapsed() < DRAIN_TIMEOUT {
            thread::sleep(POLL_INTERVAL);
        }

        if let Some(stream) = self.stream.take() {
            stream.pause().map_err(sink_error)?;
        }
        Ok(())
    }

    fn is_writable(&self) -> bool {
        self.producer.vacant_len() >= SOUND_BUFFER
    }

    fn write(&mut self, samples: &[i16]) -> Result<(), SinkError> {
        if self.stream.is_none() {
            return Err(SinkError("audio stream is not open".to_owned()));
        }

        let mut samples = samples;
        while !samples.is_empty() {
            let n = self.producer.push_slice(samples);
            samples = &samples[n..];
            if n == 0 {
                thread::sleep(POLL_INTERVAL);
            }
        }
        Ok(())
    }
}
