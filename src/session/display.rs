// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Presentation arrays and measurement results

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::acquisition::CapturedSignal;
use crate::error::{MeasurementError, Result};
use crate::excitation::SweepSpec;
use crate::smoothing::{FractionalOctaveSmoother, SmoothingSpec};
use crate::spectral::{magnitude_to_db, LogGrid, TransferFunction};

/// Index-aligned curves handed to presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySeries {
    /// Frequency axis in Hz, ascending
    pub frequencies: Vec<f64>,
    /// Smoothed amplitude in dB
    pub amplitude_db: Vec<f64>,
    /// Smoothed phase in degrees
    pub phase_deg: Vec<f64>,
}

impl DisplaySeries {
    /// Smooth a log grid into display curves
    ///
    /// The amplitude is smoothed in linear units, converted to decibels and,
    /// when `normalize_amplitude` is set, shifted so its mean is 0 dB. The
    /// phase is smoothed in degrees.
    pub fn from_grid(
        grid: &LogGrid,
        smoother: &FractionalOctaveSmoother,
        normalize_amplitude: bool,
        f_min: f64,
        f_max: f64,
    ) -> Result<Self> {
        if grid.amplitude.len() != grid.len() || grid.phase.len() != grid.len() {
            return Err(MeasurementError::invalid(
                "log grid curves are not aligned with its frequency axis",
            ));
        }

        let mut amplitude_db: Vec<f64> = smoother
            .smooth(&grid.amplitude, f_min, f_max)?
            .into_iter()
            .map(magnitude_to_db)
            .collect();
        if normalize_amplitude && !amplitude_db.is_empty() {
            let mean = amplitude_db.iter().sum::<f64>() / amplitude_db.len() as f64;
            amplitude_db.iter_mut().for_each(|a| *a -= mean);
        }

        let phase_deg = smoother.smooth(&grid.phase, f_min, f_max)?;

        Ok(Self {
            frequencies: grid.frequencies.clone(),
            amplitude_db,
            phase_deg,
        })
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

/// Everything produced by one successful measurement
///
/// Results are immutable once published. Re-smoothing produces a new result
/// sharing the capture, transfer function and log grid of the previous one.
#[derive(Debug, Clone)]
pub struct MeasurementResult {
    pub sweep: SweepSpec,
    pub smoothing: SmoothingSpec,
    pub captured: Arc<CapturedSignal>,
    pub transfer: Arc<TransferFunction>,
    pub grid: Arc<LogGrid>,
    pub display: DisplaySeries,
    pub timestamp: DateTime<Utc>,
}

impl MeasurementResult {
    /// Serializable summary for export
    pub fn report(&self) -> MeasurementReport<'_> {
        MeasurementReport {
            timestamp: self.timestamp,
            sweep: &self.sweep,
            length_seconds: self.sweep.duration(),
            smoothing: &self.smoothing,
            repaired_bins: self.transfer.repaired_bins(),
            display: &self.display,
        }
    }
}

/// JSON export of a measurement
#[derive(Debug, Serialize)]
pub struct MeasurementReport<'a> {
    pub timestamp: DateTime<Utc>,
    pub sweep: &'a SweepSpec,
    pub length_seconds: f64,
    pub smoothing: &'a SmoothingSpec,
    pub repaired_bins: usize,
    pub display: &'a DisplaySeries,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn flat_grid(level: f64) -> LogGrid {
        let frequencies: Vec<f64> = (0..400)
            .map(|i| 30.0 * (i as f64 * (20_000.0f64 / 30.0).ln() / 400.0).exp())
            .collect();
        LogGrid {
            amplitude: vec![level; frequencies.len()],
            phase: vec![45.0; frequencies.len()],
            frequencies,
        }
    }

    #[test]
    fn test_flat_curve_in_decibels() {
        let grid = flat_grid(10.0);
        let smoother = FractionalOctaveSmoother::default();
        let series = DisplaySeries::from_grid(&grid, &smoother, false, 30.0, 20_000.0).unwrap();
        assert_eq!(series.len(), grid.len());
        for (a, p) in series.amplitude_db.iter().zip(&series.phase_deg) {
            assert_abs_diff_eq!(*a, 20.0, epsilon = 1e-9);
            assert_abs_diff_eq!(*p, 45.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_mean_normalization() {
        let mut grid = flat_grid(1.0);
        let half = grid.len() / 2;
        grid.amplitude[half..].iter_mut().for_each(|a| *a = 10.0);
        let smoother = FractionalOctaveSmoother::default();
        let series = DisplaySeries::from_grid(&grid, &smoother, true, 30.0, 20_000.0).unwrap();
        let mean = series.amplitude_db.iter().sum::<f64>() / series.len() as f64;
        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-9);
        assert!(series.amplitude_db[0] < 0.0);
        assert!(series.amplitude_db[grid.len() - 1] > 0.0);
    }

    #[test]
    fn test_silent_grid_stays_finite() {
        let grid = flat_grid(0.0);
        let smoother = FractionalOctaveSmoother::default();
        let series = DisplaySeries::from_grid(&grid, &smoother, true, 30.0, 20_000.0).unwrap();
        assert!(series.amplitude_db.iter().all(|a| a.is_finite()));
    }
}
