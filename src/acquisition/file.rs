// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Replay of a recorded response from a WAV file
//!
//! Lets a capture saved with [`CapturedSignal::save_wav`] be analysed again
//! without a sound card, e.g. with different smoothing settings.

use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader};
use log::{debug, info};

use super::{CapturedSignal, DuplexAudio, CHUNK_SIZE, SAMPLE_RATE};
use crate::error::{MeasurementError, Result};

/// Device that answers every sweep with the contents of a mono 16-bit WAV file
pub struct WavReplay {
    path: PathBuf,
    samples: Vec<i16>,
}

impl WavReplay {
    /// Load the recorded response
    ///
    /// # Errors
    ///
    /// Fails with [`MeasurementError::DeviceUnavailable`] when the file is not
    /// mono 16-bit PCM at the device sample rate.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let reader = WavReader::open(&path)?;
        let spec = reader.spec();
        debug!("WAV spec for {}: {:?}", path.display(), spec);

        if spec.channels != 1
            || spec.bits_per_sample != 16
            || spec.sample_format != SampleFormat::Int
            || spec.sample_rate != SAMPLE_RATE
        {
            return Err(MeasurementError::DeviceUnavailable(format!(
                "{} must be mono 16-bit PCM at {} Hz (found {} ch, {} bit, {} Hz)",
                path.display(),
                SAMPLE_RATE,
                spec.channels,
                spec.bits_per_sample,
                spec.sample_rate
            )));
        }

        let samples = reader
            .into_samples::<i16>()
            .collect::<std::result::Result<Vec<i16>, hound::Error>>()?;
        info!(
            "Loaded {} recorded samples from {}",
            samples.len(),
            path.display()
        );

        Ok(Self { path, samples })
    }
}

impl DuplexAudio for WavReplay {
    fn name(&self) -> String {
        format!("replay of {}", self.path.display())
    }

    fn play_and_record(&mut self, sweep: &[i16]) -> Result<CapturedSignal> {
        let chunks = sweep.len() / CHUNK_SIZE;
        let available = self.samples.len() / CHUNK_SIZE;
        if available < chunks {
            return Err(MeasurementError::ShortRead {
                chunk: available,
                expected: CHUNK_SIZE,
                received: self.samples.len() % CHUNK_SIZE,
            });
        }
        Ok(CapturedSignal::new(
            self.samples[..chunks * CHUNK_SIZE].to_vec(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::write_wav;
    use tempfile::tempdir;

    #[test]
    fn test_replay_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("capture.wav");
        let recorded: Vec<i16> = (0..3 * CHUNK_SIZE as i32).map(|i| (i % 700) as i16).collect();
        write_wav(&path, &recorded).unwrap();

        let mut replay = WavReplay::new(&path).unwrap();
        let sweep = vec![0i16; 2 * CHUNK_SIZE];
        let captured = replay.play_and_record(&sweep).unwrap();
        assert_eq!(captured.samples(), &recorded[..2 * CHUNK_SIZE]);
    }

    #[test]
    fn test_replay_too_short() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.wav");
        write_wav(&path, &vec![1i16; CHUNK_SIZE + 10]).unwrap();

        let mut replay = WavReplay::new(&path).unwrap();
        let result = replay.play_and_record(&vec![0i16; 2 * CHUNK_SIZE]);
        assert!(matches!(
            result,
            Err(MeasurementError::ShortRead {
                chunk: 1,
                received: 10,
                ..
            })
        ));
    }

    #[test]
    fn test_replay_rejects_stereo() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..64 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        assert!(matches!(
            WavReplay::new(&path),
            Err(MeasurementError::DeviceUnavailable(_))
        ));
    }
}
