//! WAV file output

// SPDX-FileCopyrightText: © 2023 Marcus Rowe <undisbeliever@gmail.com>
//
// SPDX-License-Identifier: MIT

use pm_emu::errors::SinkError;
use pm_emu::{Sink, AUDIO_FREQ};

use hound::{SampleFormat, WavSpec, WavWriter};

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

const SPEC: WavSpec = WavSpec {
    channels: 1,
    sample_rate: AUDIO_FREQ,
    bits_per_sample: 16,
    sample_format: SampleFormat::Int,
};

fn hound_error(path: &std::path::Path, e: hound::Error) -> SinkError {
    SinkError(format!("{}: {}", path.display(), e))
}

/// Writes the player output to a 16 bit mono WAV file.
///
/// The file is created by `open()` and finalized by `close()`.
pub struct WavSink {
    path: PathBuf,
    writer: Option<WavWriter<BufWriter<File>>>,
    n_samples: usize,
}

impl WavSink {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            writer: None,
            n_samples: 0,
        }
    }
}

impl Sink for WavSink {
    fn open(&mut self) -> Result<(), SinkError> {
        let writer = WavWriter::create(&self.path, SPEC).map_err(|e| hound_error(&self.path, e))?;
        self.writer = Some(writer);
        self.n_samples = 0;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        if let Some(writer) = self.writer.take() {
            writer.finalize().map_err(|e| hound_error(&self.path, e))?;

            log::info!(
                "wrote {} samples ({:.2} seconds) to {}",
                self.n_samples,
                self.n_samples as f64 / f64::from(AUDIO_FREQ),
                self.path.display()
            );
        }
        Ok(())
    }

    fn write(&mut self, samples: &[i16]) -> Result<(), SinkError> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(SinkError(format!("{} is not open", self.path.display())));
        };

        for &s in samples {
            writer.write_sample(s).map_err(|e| hound_error(&self.path, e))?;
        }
        self.n_samples += samples.len();
        Ok(())
    }
}
