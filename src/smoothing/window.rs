// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Symmetric window functions used as smoothing kernels

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MeasurementError;

/// Shape of the smoothing kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    #[default]
    Hamming,
    Bartlett,
    Blackman,
    Hanning,
}

impl WindowType {
    pub const ALL: [WindowType; 4] = [
        WindowType::Hamming,
        WindowType::Bartlett,
        WindowType::Blackman,
        WindowType::Hanning,
    ];

    /// Build the symmetric window of `length` coefficients
    ///
    /// A window of length 1 is `[1.0]`, and length 0 yields an empty vector.
    pub fn build(self, length: usize) -> Vec<f64> {
        if length == 1 {
            return vec![1.0];
        }
        let m = (length as f64) - 1.0;
        (0..length)
            .map(|n| {
                let n = n as f64;
                match self {
                    WindowType::Hamming => 0.54 - 0.46 * (2.0 * PI * n / m).cos(),
                    WindowType::Hanning => 0.5 - 0.5 * (2.0 * PI * n / m).cos(),
                    WindowType::Blackman => {
                        0.42 - 0.5 * (2.0 * PI * n / m).cos() + 0.08 * (4.0 * PI * n / m).cos()
                    }
                    WindowType::Bartlett => 2.0 / m * (m / 2.0 - (n - m / 2.0).abs()),
                }
            })
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WindowType::Hamming => "hamming",
            WindowType::Bartlett => "bartlett",
            WindowType::Blackman => "blackman",
            WindowType::Hanning => "hanning",
        }
    }
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowType {
    type Err = MeasurementError;

    /// Parses `"blackman"` as well as labels such as `"Blackman Window"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let word = s.split_whitespace().next().unwrap_or("").to_lowercase();
        match word.as_str() {
            "hamming" => Ok(WindowType::Hamming),
            "bartlett" | "triangular" => Ok(WindowType::Bartlett),
            "blackman" => Ok(WindowType::Blackman),
            "hanning" | "hann" => Ok(WindowType::Hanning),
            _ => Err(MeasurementError::invalid(format!(
                "unknown window type '{}'",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_windows_are_symmetric() {
        for window in WindowType::ALL {
            let w = window.build(9);
            assert_eq!(w.len(), 9);
            for i in 0..9 {
                assert_abs_diff_eq!(w[i], w[8 - i], epsilon = 1e-12);
            }
            // Odd lengths peak at exactly one in the middle
            assert_abs_diff_eq!(w[4], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_window_endpoints() {
        assert_abs_diff_eq!(WindowType::Hamming.build(5)[0], 0.08, epsilon = 1e-12);
        assert_abs_diff_eq!(WindowType::Hanning.build(5)[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(WindowType::Bartlett.build(5)[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(WindowType::Blackman.build(5)[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(WindowType::Bartlett.build(5)[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_length_one_window() {
        for window in WindowType::ALL {
            assert_eq!(window.build(1), vec![1.0]);
        }
    }

    #[test]
    fn test_parse_window_labels() {
        assert_eq!("Hamming Window".parse::<WindowType>().unwrap(), WindowType::Hamming);
        assert_eq!("BLACKMAN".parse::<WindowType>().unwrap(), WindowType::Blackman);
        assert_eq!("hann".parse::<WindowType>().unwrap(), WindowType::Hanning);
        assert_eq!(" bartlett".parse::<WindowType>().unwrap(), WindowType::Bartlett);
        assert!("kaiser".parse::<WindowType>().is_err());
        assert!("".parse::<WindowType>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for window in WindowType::ALL {
            assert_eq!(window.to_string().parse::<WindowType>().unwrap(), window);
        }
    }
}
