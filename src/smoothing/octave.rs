// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Fractional-octave smoothing on a logarithmic grid
//!
//! On a geometric grid every octave holds the same number of points, so a
//! fixed-length kernel covers a fixed fraction of an octave everywhere:
//!
//! ```text
//! octaves           = log2(f_max / f_min)
//! points_per_octave = N / octaves
//! window_length     = round(points_per_octave / nth_octave)
//! ```
//!
//! The kernel is divided by its own sum and convolved with the data in
//! "same" mode, so the output has exactly as many points as the input.

use log::debug;
use serde::{Deserialize, Serialize};

use super::window::WindowType;
use crate::error::{MeasurementError, Result};

/// Octave fractions offered for smoothing
pub const SUPPORTED_FRACTIONS: [u32; 4] = [3, 6, 10, 20];

/// Smallest kernel sum accepted after window construction
const MIN_WINDOW_SUM: f64 = 1e-12;

/// Bandwidth and kernel shape of the smoother
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmoothingSpec {
    nth_octave: u32,
    window: WindowType,
}

impl Default for SmoothingSpec {
    fn default() -> Self {
        Self {
            nth_octave: 6,
            window: WindowType::Hamming,
        }
    }
}

impl SmoothingSpec {
    /// Smooth over `1/nth_octave` octave with the given window
    pub fn new(nth_octave: u32, window: WindowType) -> Result<Self> {
        if !SUPPORTED_FRACTIONS.contains(&nth_octave) {
            return Err(MeasurementError::invalid(format!(
                "1/{} octave smoothing is not supported (use one of {:?})",
                nth_octave, SUPPORTED_FRACTIONS
            )));
        }
        Ok(Self { nth_octave, window })
    }

    pub fn nth_octave(&self) -> u32 {
        self.nth_octave
    }

    pub fn window(&self) -> WindowType {
        self.window
    }
}

/// Behaviour where the kernel overhangs the ends of the data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeHandling {
    /// Divide by the weights that actually overlap the data, so a flat
    /// curve stays flat up to the edges
    #[default]
    Normalized,
    /// Treat missing samples as zeros, which pulls the edges towards zero
    ZeroPadded,
}

#[derive(Debug, Clone, Default)]
pub struct FractionalOctaveSmoother {
    spec: SmoothingSpec,
    edges: EdgeHandling,
}

impl FractionalOctaveSmoother {
    pub fn new(spec: SmoothingSpec) -> Self {
        Self {
            spec,
            edges: EdgeHandling::default(),
        }
    }

    pub fn with_edges(mut self, edges: EdgeHandling) -> Self {
        self.edges = edges;
        self
    }

    pub fn spec(&self) -> SmoothingSpec {
        self.spec
    }

    pub fn edges(&self) -> EdgeHandling {
        self.edges
    }

    /// Kernel length for `points` values spread over `f_min..f_max`
    ///
    /// # Errors
    ///
    /// [`MeasurementError::InvalidConfiguration`] when the range is not
    /// increasing or the kernel rounds to fewer than one point.
    pub fn window_length(&self, points: usize, f_min: f64, f_max: f64) -> Result<usize> {
        if !(f_min > 0.0 && f_max > f_min && f_max.is_finite()) {
            return Err(MeasurementError::invalid(format!(
                "cannot smooth over {} Hz to {} Hz",
                f_min, f_max
            )));
        }
        let octaves = (f_max / f_min).log2();
        let points_per_octave = points as f64 / octaves;
        let length = (points_per_octave / self.spec.nth_octave as f64).round();
        if length < 1.0 {
            return Err(MeasurementError::invalid(format!(
                "1/{} octave over {} points rounds to an empty window",
                self.spec.nth_octave, points
            )));
        }
        Ok(length as usize)
    }

    /// Normalized kernel for `points` values spread over `f_min..f_max`
    pub fn kernel(&self, points: usize, f_min: f64, f_max: f64) -> Result<Vec<f64>> {
        let length = self.window_length(points, f_min, f_max)?;
        let window = self.spec.window.build(length);
        let sum: f64 = window.iter().sum();
        if sum <= MIN_WINDOW_SUM {
            return Err(MeasurementError::invalid(format!(
                "{} window of length {} has no weight",
                self.spec.window, length
            )));
        }
        debug!(
            "1/{} octave {} kernel: {} points over {} grid values",
            self.spec.nth_octave, self.spec.window, length, points
        );
        Ok(window.into_iter().map(|w| w / sum).collect())
    }

    /// Smooth log-gridded `data` spanning `f_min..f_max`
    ///
    /// The result always has the same length as `data`.
    pub fn smooth(&self, data: &[f64], f_min: f64, f_max: f64) -> Result<Vec<f64>> {
        let kernel = self.kernel(data.len(), f_min, f_max)?;
        Ok(convolve_same(data, &kernel, self.edges))
    }
}

/// `out[i] = sum_j kernel[j] * data[i + offset - j]`, with `offset = (L - 1) / 2`
fn convolve_same(data: &[f64], kernel: &[f64], edges: EdgeHandling) -> Vec<f64> {
    let n = data.len() as isize;
    let offset = (kernel.len() as isize - 1) / 2;

    (0..n)
        .map(|i| {
            let mut acc = 0.0;
            let mut weight = 0.0;
            for (j, &w) in kernel.iter().enumerate() {
                let k = i + offset - j as isize;
                if (0..n).contains(&k) {
                    acc += w * data[k as usize];
                    weight += w;
                }
            }
            match edges {
                EdgeHandling::ZeroPadded => acc,
                EdgeHandling::Normalized if weight > 0.0 => acc / weight,
                EdgeHandling::Normalized => data[i as usize],
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const F_MIN: f64 = 30.0;
    const F_MAX: f64 = 20_000.0;
    const POINTS: usize = 4048;

    fn smoother(nth: u32, window: WindowType) -> FractionalOctaveSmoother {
        FractionalOctaveSmoother::new(SmoothingSpec::new(nth, window).unwrap())
    }

    #[test]
    fn test_default_window_length() {
        let length = FractionalOctaveSmoother::default()
            .window_length(POINTS, F_MIN, F_MAX)
            .unwrap();
        assert_eq!(length, 72);
    }

    #[test]
    fn test_length_is_preserved() {
        let data: Vec<f64> = (0..POINTS).map(|i| (i as f64 * 0.01).sin()).collect();
        for nth in SUPPORTED_FRACTIONS {
            for window in WindowType::ALL {
                for edges in [EdgeHandling::Normalized, EdgeHandling::ZeroPadded] {
                    let out = smoother(nth, window)
                        .with_edges(edges)
                        .smooth(&data, F_MIN, F_MAX)
                        .unwrap();
                    assert_eq!(out.len(), data.len());
                }
            }
        }
    }

    #[test]
    fn test_constant_maps_to_itself() {
        let data = vec![3.5; POINTS];
        for nth in SUPPORTED_FRACTIONS {
            for window in WindowType::ALL {
                let out = smoother(nth, window).smooth(&data, F_MIN, F_MAX).unwrap();
                for v in out {
                    assert_abs_diff_eq!(v, 3.5, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_zero_padded_edges_are_attenuated() {
        let data = vec![1.0; POINTS];
        let out = FractionalOctaveSmoother::default()
            .with_edges(EdgeHandling::ZeroPadded)
            .smooth(&data, F_MIN, F_MAX)
            .unwrap();
        assert!(out[0] < 0.75);
        assert!(out[POINTS - 1] < 0.75);
        assert_abs_diff_eq!(out[POINTS / 2], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_finer_fraction_shrinks_window() {
        let lengths: Vec<usize> = SUPPORTED_FRACTIONS
            .iter()
            .map(|&nth| {
                smoother(nth, WindowType::Hamming)
                    .window_length(POINTS, F_MIN, F_MAX)
                    .unwrap()
            })
            .collect();
        assert!(lengths.windows(2).all(|w| w[1] < w[0]), "{:?}", lengths);
    }

    #[test]
    fn test_finer_fraction_keeps_narrow_peak() {
        let mut data = vec![0.0; POINTS];
        data[POINTS / 2] = 1.0;
        let peak = |nth| {
            smoother(nth, WindowType::Hanning)
                .smooth(&data, F_MIN, F_MAX)
                .unwrap()
                .into_iter()
                .fold(0.0f64, f64::max)
        };
        assert!(peak(20) > peak(10));
        assert!(peak(10) > peak(3));
    }

    #[test]
    fn test_matches_direct_convolution() {
        // Kernel of length 3 on a short ramp
        let kernel = [0.25, 0.5, 0.25];
        let out = convolve_same(&[0.0, 4.0, 8.0, 4.0], &kernel, EdgeHandling::ZeroPadded);
        assert_eq!(out, vec![1.0, 4.0, 6.0, 4.0]);
        let out = convolve_same(&[4.0, 4.0], &kernel, EdgeHandling::Normalized);
        assert_eq!(out, vec![4.0, 4.0]);
    }

    #[test]
    fn test_invalid_smoothing() {
        assert!(SmoothingSpec::new(7, WindowType::Hamming).is_err());
        // Too few points for even one kernel tap
        let too_short = smoother(20, WindowType::Hamming).smooth(&[1.0; 4], F_MIN, F_MAX);
        assert!(matches!(
            too_short,
            Err(MeasurementError::InvalidConfiguration(_))
        ));
        // Hanning of length two is all zeros
        let degenerate = smoother(3, WindowType::Hanning).kernel(56, F_MIN, F_MAX);
        assert!(degenerate.is_err());
        assert!(FractionalOctaveSmoother::default()
            .smooth(&[1.0; 100], 100.0, 50.0)
            .is_err());
    }
}
