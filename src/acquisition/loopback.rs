// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Synthetic loopback device
//!
//! Stands in for a sound card whose output is wired straight to its input.
//! Useful for dry runs and for checking the pipeline against a known system.

use log::debug;

use super::{CapturedSignal, DuplexAudio, CHUNK_SIZE};
use crate::error::{MeasurementError, Result};

/// Loopback device with an optional gain, delay and chunk limit
#[derive(Debug, Clone)]
pub struct LoopbackDevice {
    gain: f64,
    delay: usize,
    chunk_limit: Option<usize>,
}

impl Default for LoopbackDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackDevice {
    /// Identity loopback: the capture equals the sweep
    pub fn new() -> Self {
        Self {
            gain: 1.0,
            delay: 0,
            chunk_limit: None,
        }
    }

    /// Scale the returned signal (saturating at the 16-bit range)
    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    /// Delay the returned signal by `samples`, padding the start with silence
    pub fn with_delay(mut self, samples: usize) -> Self {
        self.delay = samples;
        self
    }

    /// Stop delivering data after `chunks` chunks, simulating a stalled input
    pub fn with_chunk_limit(mut self, chunks: usize) -> Self {
        self.chunk_limit = Some(chunks);
        self
    }
}

impl DuplexAudio for LoopbackDevice {
    fn name(&self) -> String {
        format!("loopback (gain {}, delay {} samples)", self.gain, self.delay)
    }

    fn play_and_record(&mut self, sweep: &[i16]) -> Result<CapturedSignal> {
        let chunks = sweep.len() / CHUNK_SIZE;
        if let Some(limit) = self.chunk_limit {
            if limit < chunks {
                return Err(MeasurementError::ShortRead {
                    chunk: limit,
                    expected: CHUNK_SIZE,
                    received: 0,
                });
            }
        }

        let delay = self.delay.min(sweep.len());
        let captured: Vec<i16> = std::iter::repeat(0)
            .take(delay)
            .chain(sweep.iter().take(sweep.len() - delay).map(|&s| {
                (s as f64 * self.gain)
                    .round()
                    .clamp(i16::MIN as f64, i16::MAX as f64) as i16
            }))
            .collect();

        debug!("Loopback returned {} samples", captured.len());
        Ok(CapturedSignal::new(captured))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_loopback() {
        let sweep: Vec<i16> = (0..2048).map(|i| (i % 200) as i16 - 100).collect();
        let captured = LoopbackDevice::new().play_and_record(&sweep).unwrap();
        assert_eq!(captured.samples(), &sweep[..]);
    }

    #[test]
    fn test_delay_and_gain() {
        let sweep = vec![1000i16; 1024];
        let captured = LoopbackDevice::new()
            .with_gain(0.5)
            .with_delay(10)
            .play_and_record(&sweep)
            .unwrap();
        assert_eq!(captured.len(), 1024);
        assert!(captured.samples()[..10].iter().all(|&s| s == 0));
        assert!(captured.samples()[10..].iter().all(|&s| s == 500));
    }

    #[test]
    fn test_chunk_limit_is_short_read() {
        let sweep = vec![0i16; 4 * CHUNK_SIZE];
        let result = LoopbackDevice::new()
            .with_chunk_limit(2)
            .play_and_record(&sweep);
        assert!(matches!(
            result,
            Err(MeasurementError::ShortRead { chunk: 2, .. })
        ));
    }
}
