// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Logarithmic frequency grid
//!
//! The FFT produces bins evenly spaced in frequency, while a frequency
//! response is read on a logarithmic axis. This module builds a geometric
//! frequency grid between `f_min` and `f_max` and picks, for every grid
//! point, the nearest source bin. No interpolation takes place.
//!
//! Grid frequencies are
//!
//! ```text
//! freq[i] = f_min * exp(i * ln(f_max / f_min) / N),   i = 0 .. N-1
//! ```
//!
//! so the axis starts at `f_min` and stays strictly below `f_max`.

use log::debug;
use serde::{Deserialize, Serialize};

use super::transfer::TransferFunction;
use crate::acquisition::SAMPLE_RATE;
use crate::error::{MeasurementError, Result};

/// Default number of points on the logarithmic grid
pub const DEFAULT_POINTS: usize = 4048;

/// How a grid frequency selects its source bin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinMapping {
    /// `round((freq - f_min) / (f_max - f_min) * M)`: the span `f_min..f_max`
    /// is stretched linearly over all `M` source values.
    ///
    /// This is the historical mapping. It ignores the sample rate, so the
    /// selected bins do not correspond to the grid frequencies.
    #[default]
    Span,
    /// `round(freq * M / sample_rate)`: the FFT bin that actually holds `freq`.
    Physical,
}

/// Frequency axis with index-aligned amplitude and phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogGrid {
    /// Grid frequencies in Hz, strictly increasing
    pub frequencies: Vec<f64>,
    /// Linear magnitude at every grid frequency
    pub amplitude: Vec<f64>,
    /// Phase in degrees at every grid frequency
    pub phase: Vec<f64>,
}

impl LogGrid {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

/// Remaps linear-bin data onto a logarithmic frequency grid
#[derive(Debug, Clone)]
pub struct LogFrequencyResampler {
    points: usize,
    mapping: BinMapping,
    sample_rate: u32,
}

impl Default for LogFrequencyResampler {
    fn default() -> Self {
        Self {
            points: DEFAULT_POINTS,
            mapping: BinMapping::default(),
            sample_rate: SAMPLE_RATE,
        }
    }
}

impl LogFrequencyResampler {
    /// Create a resampler producing `points` grid frequencies
    pub fn new(points: usize) -> Result<Self> {
        if points == 0 {
            return Err(MeasurementError::invalid(
                "logarithmic grid needs at least one point",
            ));
        }
        Ok(Self {
            points,
            ..Self::default()
        })
    }

    pub fn with_mapping(mut self, mapping: BinMapping) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn points(&self) -> usize {
        self.points
    }

    pub fn mapping(&self) -> BinMapping {
        self.mapping
    }

    /// Geometrically spaced frequencies from `f_min` up to (excluding) `f_max`
    pub fn frequencies(&self, f_min: f64, f_max: f64) -> Vec<f64> {
        let step = (f_max / f_min).ln() / self.points as f64;
        (0..self.points)
            .map(|i| f_min * (i as f64 * step).exp())
            .collect()
    }

    /// Index of the source value selected for `freq` among `len` values
    pub fn source_index(&self, freq: f64, f_min: f64, f_max: f64, len: usize) -> usize {
        let position = match self.mapping {
            BinMapping::Span => (freq - f_min) / (f_max - f_min) * len as f64,
            BinMapping::Physical => freq * len as f64 / self.sample_rate as f64,
        };
        // `as` saturates negative values to zero
        (position.round() as usize).min(len.saturating_sub(1))
    }

    /// Pick one source value for every grid frequency
    ///
    /// # Errors
    ///
    /// [`MeasurementError::InvalidConfiguration`] when `values` is empty or
    /// the frequency range is not positive and increasing.
    pub fn resample(&self, values: &[f64], f_min: f64, f_max: f64) -> Result<Vec<f64>> {
        check_range(f_min, f_max)?;
        if values.is_empty() {
            return Err(MeasurementError::invalid("nothing to resample"));
        }
        Ok(self
            .frequencies(f_min, f_max)
            .into_iter()
            .map(|freq| values[self.source_index(freq, f_min, f_max, values.len())])
            .collect())
    }

    /// Resample the magnitude and phase (degrees) of a transfer function
    pub fn resample_transfer(
        &self,
        transfer: &TransferFunction,
        f_min: f64,
        f_max: f64,
    ) -> Result<LogGrid> {
        let amplitude = self.resample(&transfer.amplitude(), f_min, f_max)?;
        let phase = self.resample(&transfer.phase_degrees(), f_min, f_max)?;
        debug!(
            "Resampled {} bins onto {} log points ({:.1} Hz to {:.1} Hz, {:?} mapping)",
            transfer.len(),
            self.points,
            f_min,
            f_max,
            self.mapping
        );
        Ok(LogGrid {
            frequencies: self.frequencies(f_min, f_max),
            amplitude,
            phase,
        })
    }
}

fn check_range(f_min: f64, f_max: f64) -> Result<()> {
    if !(f_min.is_finite() && f_min > 0.0 && f_max.is_finite() && f_max > f_min) {
        return Err(MeasurementError::invalid(format!(
            "frequency range {} Hz to {} Hz is not increasing",
            f_min, f_max
        )));
    }
    Ok(())
}
