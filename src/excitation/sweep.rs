// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Swept sine synthesis

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::acquisition::{CHUNK_SIZE, SAMPLE_RATE};
use crate::error::{MeasurementError, Result};

/// Peak amplitude of the synthesized sweep (full scale 16-bit)
const AMPLITUDE: f64 = (i16::MAX) as f64;

/// Longest sweep accepted for a measurement, in seconds
pub const MAX_LENGTH_SECONDS: f64 = 60.0;

/// Chunk count of a [`MAX_LENGTH_SECONDS`] sweep
fn max_chunks() -> usize {
    (MAX_LENGTH_SECONDS * SAMPLE_RATE as f64 / CHUNK_SIZE as f64).round() as usize
}

/// How the per-sample phase increment grows over the sweep
///
/// Both laws multiply the phase increment by a constant factor once per
/// sample, they only differ in the base of that factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthLaw {
    /// Factor `2^(log2(f_max - f_min) / N)`, derived from the absolute span.
    ///
    /// The instantaneous frequency ends at `f_min * (f_max - f_min)`, which is
    /// not `f_max`. This reproduces the historical measurement behaviour.
    #[default]
    Span,
    /// Factor `(f_max / f_min)^(1 / N)`, the textbook exponential sweep ending
    /// at `f_max`.
    Ratio,
}

/// Parameters of one excitation sweep
///
/// The length is always kept at a multiple of [`CHUNK_SIZE`] so the capture
/// can be read back in whole chunks. Setting the length in seconds rounds to
/// the nearest chunk, setting it in samples floors to a chunk boundary, and
/// [`SweepSpec::length_seconds`] truncates to whole seconds, so the two views
/// may disagree after rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepSpec {
    f_min: f64,
    f_max: f64,
    length_in_samples: usize,
    #[serde(default)]
    growth_law: GrowthLaw,
}

impl Default for SweepSpec {
    fn default() -> Self {
        let mut spec = Self {
            f_min: 30.0,
            f_max: 20_000.0,
            length_in_samples: 0,
            growth_law: GrowthLaw::Span,
        };
        spec.set_length_seconds(3.0);
        spec
    }
}

impl SweepSpec {
    /// Create a sweep from `f_min` to `f_max` lasting about `length_seconds`
    ///
    /// # Errors
    ///
    /// Returns [`MeasurementError::InvalidConfiguration`] when the frequencies
    /// are not positive and increasing, or when the length rounds to zero chunks
    /// or exceeds [`MAX_LENGTH_SECONDS`].
    pub fn new(f_min: f64, f_max: f64, length_seconds: f64) -> Result<Self> {
        let mut spec = Self {
            f_min,
            f_max,
            length_in_samples: 0,
            growth_law: GrowthLaw::default(),
        };
        spec.set_length_seconds(length_seconds);
        spec.validate()?;
        Ok(spec)
    }

    /// Create a sweep with an explicit length in samples (floored to a chunk multiple)
    pub fn from_samples(f_min: f64, f_max: f64, length_in_samples: usize) -> Result<Self> {
        let mut spec = Self {
            f_min,
            f_max,
            length_in_samples: 0,
            growth_law: GrowthLaw::default(),
        };
        spec.set_length_in_samples(length_in_samples);
        spec.validate()?;
        Ok(spec)
    }

    /// Select the phase increment growth law
    pub fn with_growth_law(mut self, growth_law: GrowthLaw) -> Self {
        self.growth_law = growth_law;
        self
    }

    pub fn f_min(&self) -> f64 {
        self.f_min
    }

    pub fn f_max(&self) -> f64 {
        self.f_max
    }

    pub fn growth_law(&self) -> GrowthLaw {
        self.growth_law
    }

    /// Set the lowest frequency (validated when the measurement starts)
    pub fn set_f_min(&mut self, f_min: f64) {
        self.f_min = f_min;
    }

    /// Set the highest frequency (validated when the measurement starts)
    pub fn set_f_max(&mut self, f_max: f64) {
        self.f_max = f_max;
    }

    pub fn set_growth_law(&mut self, growth_law: GrowthLaw) {
        self.growth_law = growth_law;
    }

    /// Set the length in seconds, rounded to the nearest whole chunk
    ///
    /// Out of range lengths are stored clamped and rejected by
    /// [`SweepSpec::validate`].
    pub fn set_length_seconds(&mut self, seconds: f64) {
        let chunks = (seconds * SAMPLE_RATE as f64 / CHUNK_SIZE as f64).round();
        // NaN casts to zero chunks, infinity stops one past the limit
        let chunks = chunks.clamp(0.0, (max_chunks() + 1) as f64) as usize;
        self.length_in_samples = CHUNK_SIZE * chunks;
    }

    /// Set the length in samples, floored to a whole chunk
    pub fn set_length_in_samples(&mut self, length_in_samples: usize) {
        self.length_in_samples = CHUNK_SIZE * (length_in_samples / CHUNK_SIZE);
    }

    /// Number of samples in the sweep, always a multiple of [`CHUNK_SIZE`]
    pub fn length_in_samples(&self) -> usize {
        self.length_in_samples
    }

    /// Length in whole seconds (fractional seconds are truncated)
    pub fn length_seconds(&self) -> u32 {
        (self.length_in_samples / SAMPLE_RATE as usize) as u32
    }

    /// Exact duration of the sweep in seconds
    pub fn duration(&self) -> f64 {
        self.length_in_samples as f64 / SAMPLE_RATE as f64
    }

    /// Number of capture chunks needed to record the response
    pub fn chunk_count(&self) -> usize {
        self.length_in_samples / CHUNK_SIZE
    }

    /// Check the parameters before a measurement is started
    pub fn validate(&self) -> Result<()> {
        if !(self.f_min.is_finite() && self.f_min > 0.0) {
            return Err(MeasurementError::invalid(format!(
                "lowest frequency must be positive, got {} Hz",
                self.f_min
            )));
        }
        if !(self.f_max.is_finite() && self.f_max > self.f_min) {
            return Err(MeasurementError::invalid(format!(
                "highest frequency {} Hz must exceed lowest frequency {} Hz",
                self.f_max, self.f_min
            )));
        }
        if self.length_in_samples == 0 {
            return Err(MeasurementError::invalid(
                "sweep length rounds to zero samples",
            ));
        }
        if self.chunk_count() > max_chunks() {
            return Err(MeasurementError::invalid(format!(
                "sweep lasts {:.1} s, the limit is {} s",
                self.duration(),
                MAX_LENGTH_SECONDS
            )));
        }
        Ok(())
    }

    /// Multiplicative factor applied to the phase increment after every sample
    pub fn growth_factor(&self) -> f64 {
        let n = self.length_in_samples as f64;
        match self.growth_law {
            GrowthLaw::Span => 2f64.powf((self.f_max - self.f_min).log2() / n),
            GrowthLaw::Ratio => (self.f_max / self.f_min).powf(1.0 / n),
        }
    }
}

/// Synthesizes the excitation sweep described by a [`SweepSpec`]
///
/// Generation is a pure function of the [`SweepSpec`]: equal specs always yield
/// the same samples.
#[derive(Debug, Clone)]
pub struct SweepGenerator {
    spec: SweepSpec,
    sample_rate: u32,
}

impl SweepGenerator {
    /// Create a generator for the fixed device sample rate
    pub fn new(spec: SweepSpec) -> Self {
        Self {
            spec,
            sample_rate: SAMPLE_RATE,
        }
    }

    pub fn spec(&self) -> &SweepSpec {
        &self.spec
    }

    /// Generate `length_in_samples` signed 16-bit samples starting at `f_min`
    pub fn generate(&self) -> Vec<i16> {
        let length = self.spec.length_in_samples();
        let growth = self.spec.growth_factor();

        let mut phi = 0.0f64;
        let mut d_phi = TAU * self.spec.f_min() / self.sample_rate as f64;
        let mut sweep = Vec::with_capacity(length);

        for _ in 0..length {
            let value = (AMPLITUDE * phi.sin()).round();
            sweep.push(value.clamp(i16::MIN as f64, i16::MAX as f64) as i16);
            // Wrapping keeps precision once the increment grows large
            phi = (phi + d_phi).rem_euclid(TAU);
            d_phi *= growth;
        }

        sweep
    }

    /// Generate the sweep as floating point samples in `[-1, 1]`
    pub fn generate_normalized(&self) -> Vec<f64> {
        self.generate()
            .into_iter()
            .map(|s| s as f64 / AMPLITUDE)
            .collect()
    }
}
