// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Audio acquisition module
//!
//! This module plays the excitation sweep through the system under test and
//! records its response. Devices are mono, 16-bit signed PCM at
//! [`SAMPLE_RATE`], and the response is always read back in whole chunks of
//! [`CHUNK_SIZE`] samples.
//!
//! Three devices implement [`DuplexAudio`]:
//! - [`CpalDuplex`] drives a real sound card through CPAL
//! - [`LoopbackDevice`] returns the sweep itself (optionally delayed and scaled)
//! - [`WavReplay`] returns a response previously recorded to a WAV file
//!
//! Captures run on a blocking worker through [`spawn_capture`], which hands
//! back a [`CaptureTask`] future.

mod duplex;
mod file;
mod list;
mod loopback;
mod worker;

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use log::info;

pub use duplex::CpalDuplex;
pub use file::WavReplay;
pub use list::{list_input_devices, list_output_devices};
pub use loopback::LoopbackDevice;
pub use worker::{spawn_capture, CaptureTask, SharedDevice};

use crate::config::AudioConfig;
use crate::error::Result;

/// Device sample rate in Hz
pub const SAMPLE_RATE: u32 = 44_100;

/// Number of samples per playback and capture chunk
pub const CHUNK_SIZE: usize = 1024;

/// The response recorded during one measurement
///
/// Its length always equals the length of the sweep that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedSignal {
    samples: Vec<i16>,
}

impl CapturedSignal {
    pub fn new(samples: Vec<i16>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Write the capture to a mono 16-bit WAV file
    pub fn save_wav<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_wav(path, &self.samples)
    }
}

/// Write mono 16-bit samples at [`SAMPLE_RATE`] to a WAV file
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[i16]) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path.as_ref(), spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    info!(
        "Wrote {} samples to {}",
        samples.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// A device that plays a sweep and records the response in one blocking pass
///
/// Implementations write the whole sweep to the output side and read exactly
/// `sweep.len() / CHUNK_SIZE` chunks from the input side, concatenated in
/// order. A chunk that cannot be filled is a
/// [`MeasurementError::ShortRead`](crate::error::MeasurementError::ShortRead);
/// a device that cannot be opened is a
/// [`MeasurementError::DeviceUnavailable`](crate::error::MeasurementError::DeviceUnavailable).
#[cfg_attr(test, mockall::automock)]
pub trait DuplexAudio: Send {
    /// Human readable description of the device
    fn name(&self) -> String;

    /// Play `sweep` and return the captured response of the same length
    fn play_and_record(&mut self, sweep: &[i16]) -> Result<CapturedSignal>;
}

/// Open the device selected by the audio configuration
///
/// A WAV replay file takes precedence, then the synthetic loopback, and
/// finally the CPAL sound card.
pub fn open_duplex_audio(config: &AudioConfig) -> Result<Box<dyn DuplexAudio>> {
    if let Some(file) = &config.input_file {
        info!("Using recorded response from {}", file);
        return Ok(Box::new(WavReplay::new(file)?));
    }
    if config.loopback {
        info!("Using synthetic loopback device");
        return Ok(Box::new(LoopbackDevice::new()));
    }
    Ok(Box::new(CpalDuplex::new(config)))
}
