// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Transfer function estimation by spectral deconvolution
//!
//! The response of the system under test is divided, bin by bin, by the
//! spectrum of the sweep that excited it:
//!
//! ```text
//! H[k] = FFT(captured)[k] / FFT(sweep)[k]
//! ```
//!
//! # Degenerate reference bins
//!
//! A reference bin whose magnitude is zero (below [`NEGLIGIBLE_MAGNITUDE`]
//! relative to the spectral peak) cannot be divided by. Such bins are
//! excluded and take the value of the nearest usable bin, so no `NaN` or
//! infinity ever leaves the estimator. A reference with no usable bin at all
//! is rejected with [`MeasurementError::DegenerateSpectrum`].
//!
//! # Example
//!
//! ```
//! use rust_sweepmeter::spectral::TransferFunctionEstimator;
//!
//! let sweep: Vec<i16> = (0..1024).map(|i| ((i * 37) % 2001) as i16 - 1000).collect();
//! let mut estimator = TransferFunctionEstimator::new();
//! let h = estimator.estimate(&sweep, &sweep).unwrap();
//!
//! // An identity system has unit gain and zero phase
//! assert!(h.amplitude().iter().all(|a| (a - 1.0).abs() < 1e-9));
//! ```

use log::{debug, warn};
use rustfft::{num_complex::Complex64, FftPlanner};

use crate::error::{MeasurementError, Result};

/// Reference bins below this fraction of the spectral peak are treated as zero
pub const NEGLIGIBLE_MAGNITUDE: f64 = 1e-12;

/// Smallest linear magnitude used when converting to decibels (-240 dB)
pub const MAGNITUDE_FLOOR: f64 = 1e-12;

/// Convert a linear magnitude to decibels, flooring at [`MAGNITUDE_FLOOR`]
pub fn magnitude_to_db(magnitude: f64) -> f64 {
    20.0 * magnitude.max(MAGNITUDE_FLOOR).log10()
}

/// Complex frequency response, one value per FFT bin
#[derive(Debug, Clone)]
pub struct TransferFunction {
    bins: Vec<Complex64>,
    repaired_bins: usize,
}

impl TransferFunction {
    /// Complex value of every bin
    pub fn bins(&self) -> &[Complex64] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Number of bins whose reference was zero and whose value was held
    /// from a neighbour
    pub fn repaired_bins(&self) -> usize {
        self.repaired_bins
    }

    /// Linear magnitude `|H[k]|`
    pub fn amplitude(&self) -> Vec<f64> {
        self.bins.iter().map(|h| h.norm()).collect()
    }

    /// Magnitude in decibels, floored at [`MAGNITUDE_FLOOR`]
    pub fn amplitude_db(&self) -> Vec<f64> {
        self.bins.iter().map(|h| magnitude_to_db(h.norm())).collect()
    }

    /// Phase `arg(H[k])` in radians
    pub fn phase(&self) -> Vec<f64> {
        self.bins.iter().map(|h| h.arg()).collect()
    }

    /// Phase in degrees
    pub fn phase_degrees(&self) -> Vec<f64> {
        self.bins.iter().map(|h| h.arg().to_degrees()).collect()
    }
}

/// FFT deconvolution of a captured response against its excitation
pub struct TransferFunctionEstimator {
    planner: FftPlanner<f64>,
}

impl Default for TransferFunctionEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferFunctionEstimator {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Full complex FFT of a 16-bit signal
    pub fn spectrum(&mut self, signal: &[i16]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = signal
            .iter()
            .map(|&s| Complex64::new(s as f64, 0.0))
            .collect();
        let fft = self.planner.plan_fft_forward(buffer.len());
        fft.process(&mut buffer);
        buffer
    }

    /// Estimate `H = FFT(captured) / FFT(sweep)`
    ///
    /// # Errors
    ///
    /// * [`MeasurementError::InvalidConfiguration`] if the signals are empty
    ///   or differ in length
    /// * [`MeasurementError::DegenerateSpectrum`] if every reference bin is zero
    pub fn estimate(&mut self, sweep: &[i16], captured: &[i16]) -> Result<TransferFunction> {
        if sweep.is_empty() {
            return Err(MeasurementError::invalid("cannot deconvolve an empty sweep"));
        }
        if sweep.len() != captured.len() {
            return Err(MeasurementError::invalid(format!(
                "sweep has {} samples but capture has {}",
                sweep.len(),
                captured.len()
            )));
        }

        let reference = self.spectrum(sweep);
        let response = self.spectrum(captured);

        let peak = reference.iter().map(|x| x.norm()).fold(0.0f64, f64::max);
        let threshold = peak * NEGLIGIBLE_MAGNITUDE;
        let usable: Vec<bool> = reference
            .iter()
            .map(|x| peak > 0.0 && x.norm() > threshold)
            .collect();

        let nearest = nearest_usable(&usable).ok_or_else(|| {
            MeasurementError::DegenerateSpectrum(format!(
                "all {} reference bins are zero",
                reference.len()
            ))
        })?;

        let mut repaired_bins = 0;
        let bins: Vec<Complex64> = (0..reference.len())
            .map(|k| {
                let source = nearest[k];
                if source != k {
                    repaired_bins += 1;
                }
                response[source] / reference[source]
            })
            .collect();

        if repaired_bins > 0 {
            warn!(
                "{} of {} reference bins were zero and held from their neighbours",
                repaired_bins,
                bins.len()
            );
        }
        debug!(
            "Estimated transfer function over {} bins (reference peak {:.3e})",
            bins.len(),
            peak
        );

        Ok(TransferFunction {
            bins,
            repaired_bins,
        })
    }
}

/// For every bin, the index of the closest usable bin (ties go to the lower one)
fn nearest_usable(usable: &[bool]) -> Option<Vec<usize>> {
    if !usable.iter().any(|&u| u) {
        return None;
    }

    let n = usable.len();
    let mut before: Vec<Option<usize>> = vec![None; n];
    let mut last = None;
    for k in 0..n {
        if usable[k] {
            last = Some(k);
        }
        before[k] = last;
    }

    let mut nearest = vec![0; n];
    let mut next = None;
    for k in (0..n).rev() {
        if usable[k] {
            next = Some(k);
        }
        nearest[k] = match (before[k], next) {
            (Some(b), Some(a)) => {
                if k - b <= a - k {
                    b
                } else {
                    a
                }
            }
            (Some(b), None) => b,
            (None, Some(a)) => a,
            (None, None) => return None,
        };
    }
    Some(nearest)
}
