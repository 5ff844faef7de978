// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::spectral::{BinMapping, LogFrequencyResampler, DEFAULT_POINTS};

/// Settings of the logarithmic display grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Number of points on the frequency axis
    #[serde(default = "default_points")]
    pub points: usize,
    /// How each grid frequency selects its FFT bin
    #[serde(default)]
    pub bin_mapping: BinMapping,
}

fn default_points() -> usize {
    DEFAULT_POINTS
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            points: default_points(),
            bin_mapping: BinMapping::default(),
        }
    }
}

impl DisplayConfig {
    pub fn resampler(&self) -> Result<LogFrequencyResampler> {
        Ok(LogFrequencyResampler::new(self.points)?.with_mapping(self.bin_mapping))
    }
}
