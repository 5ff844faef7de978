// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Duplex playback and capture through CPAL

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    mpsc::{self, RecvTimeoutError},
    Arc,
};
use std::time::Duration;

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    BufferSize, Device, Host, SampleRate, StreamConfig,
};
use log::{debug, error, info, warn};

use super::{CapturedSignal, DuplexAudio, CHUNK_SIZE, SAMPLE_RATE};
use crate::config::AudioConfig;
use crate::error::{MeasurementError, Result};

/// Sound card opened through the default CPAL host
///
/// The devices are opened at the start of every measurement and released at
/// its end, so the streams only ever live on the thread running
/// [`DuplexAudio::play_and_record`].
pub struct CpalDuplex {
    input_device: Option<String>,
    output_device: Option<String>,
    read_timeout: Duration,
}

impl CpalDuplex {
    /// Create a duplex device for the names in the audio configuration
    ///
    /// Names are matched as substrings; `None` selects the host default.
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            input_device: config.input_device.clone(),
            output_device: config.output_device.clone(),
            read_timeout: Duration::from_millis(config.read_timeout_ms),
        }
    }

    fn stream_config() -> StreamConfig {
        StreamConfig {
            channels: 1,
            sample_rate: SampleRate(SAMPLE_RATE),
            buffer_size: BufferSize::Fixed(CHUNK_SIZE as u32),
        }
    }

    fn find_input_device(host: &Host, name: Option<&str>) -> Result<Device> {
        match name {
            Some(name) => host
                .input_devices()
                .map_err(|e| MeasurementError::DeviceUnavailable(e.to_string()))?
                .find(|d| d.name().map(|n| n.contains(name)).unwrap_or(false))
                .ok_or_else(|| {
                    MeasurementError::DeviceUnavailable(format!("input device '{}' not found", name))
                }),
            None => host.default_input_device().ok_or_else(|| {
                MeasurementError::DeviceUnavailable("no default input device".to_string())
            }),
        }
    }

    fn find_output_device(host: &Host, name: Option<&str>) -> Result<Device> {
        match name {
            Some(name) => host
                .output_devices()
                .map_err(|e| MeasurementError::DeviceUnavailable(e.to_string()))?
                .find(|d| d.name().map(|n| n.contains(name)).unwrap_or(false))
                .ok_or_else(|| {
                    MeasurementError::DeviceUnavailable(format!(
                        "output device '{}' not found",
                        name
                    ))
                }),
            None => host.default_output_device().ok_or_else(|| {
                MeasurementError::DeviceUnavailable("no default output device".to_string())
            }),
        }
    }
}

impl DuplexAudio for CpalDuplex {
    fn name(&self) -> String {
        format!(
            "cpal (in: {}, out: {})",
            self.input_device.as_deref().unwrap_or("default"),
            self.output_device.as_deref().unwrap_or("default")
        )
    }

    fn play_and_record(&mut self, sweep: &[i16]) -> Result<CapturedSignal> {
        let host = cpal::default_host();
        let output = Self::find_output_device(&host, self.output_device.as_deref())?;
        let input = Self::find_input_device(&host, self.input_device.as_deref())?;
        info!(
            "Opened duplex stream: out '{}', in '{}', {} Hz mono, {} samples per chunk",
            output.name().unwrap_or_else(|_| "Unknown".to_string()),
            input.name().unwrap_or_else(|_| "Unknown".to_string()),
            SAMPLE_RATE,
            CHUNK_SIZE
        );

        let config = Self::stream_config();

        // Playback: the sweep followed by silence until the capture is complete
        let playback: Arc<Vec<i16>> = Arc::new(sweep.to_vec());
        let position = Arc::new(AtomicUsize::new(0));
        let output_stream = {
            let playback = playback.clone();
            let position = position.clone();
            output
                .build_output_stream(
                    &config,
                    move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                        let start = position.load(Ordering::Relaxed);
                        for (i, sample) in data.iter_mut().enumerate() {
                            *sample = playback.get(start + i).copied().unwrap_or(0);
                        }
                        position.store(start + data.len(), Ordering::Relaxed);
                    },
                    |err| error!("Audio output stream error: {}", err),
                    None,
                )
                .map_err(|e| MeasurementError::DeviceUnavailable(e.to_string()))?
        };

        let (sender, receiver) = mpsc::channel::<Vec<i16>>();
        let input_stream = input
            .build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    // The reader is gone once the capture is complete
                    let _ = sender.send(data.to_vec());
                },
                |err| error!("Audio input stream error: {}", err),
                None,
            )
            .map_err(|e| MeasurementError::DeviceUnavailable(e.to_string()))?;

        input_stream
            .play()
            .map_err(|e| MeasurementError::DeviceUnavailable(e.to_string()))?;
        output_stream
            .play()
            .map_err(|e| MeasurementError::DeviceUnavailable(e.to_string()))?;

        let chunks = sweep.len() / CHUNK_SIZE;
        let mut pending: Vec<i16> = Vec::with_capacity(2 * CHUNK_SIZE);
        let mut captured = Vec::with_capacity(chunks * CHUNK_SIZE);

        for chunk in 0..chunks {
            while pending.len() < CHUNK_SIZE {
                match receiver.recv_timeout(self.read_timeout) {
                    Ok(block) => pending.extend_from_slice(&block),
                    Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                        warn!(
                            "Capture stalled on chunk {}/{} with {} samples",
                            chunk + 1,
                            chunks,
                            pending.len()
                        );
                        return Err(MeasurementError::ShortRead {
                            chunk,
                            expected: CHUNK_SIZE,
                            received: pending.len(),
                        });
                    }
                }
            }
            captured.extend(pending.drain(..CHUNK_SIZE));
        }

        debug!(
            "Captured {} chunks, {} of {} sweep samples played",
            chunks,
            position.load(Ordering::Relaxed).min(playback.len()),
            playback.len()
        );

        drop(input_stream);
        drop(output_stream);
        Ok(CapturedSignal::new(captured))
    }
}
