// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Display smoothing configuration

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::smoothing::{EdgeHandling, FractionalOctaveSmoother, SmoothingSpec, WindowType};

/// Settings of the fractional-octave smoother applied before display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Smoothing bandwidth is `1/nth_octave` octave (3, 6, 10 or 20)
    #[serde(default = "default_nth_octave")]
    pub nth_octave: u32,
    /// Kernel shape
    #[serde(default)]
    pub window: WindowType,
    /// Handling of the kernel overhang at both ends of the curve
    #[serde(default)]
    pub edges: EdgeHandling,
    /// Subtract the mean level so the amplitude curve sits around 0 dB
    #[serde(default = "default_normalize_amplitude")]
    pub normalize_amplitude: bool,
}

fn default_nth_octave() -> u32 {
    6
}

fn default_normalize_amplitude() -> bool {
    true
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            nth_octave: default_nth_octave(),
            window: WindowType::default(),
            edges: EdgeHandling::default(),
            normalize_amplitude: default_normalize_amplitude(),
        }
    }
}

impl SmoothingConfig {
    pub fn spec(&self) -> Result<SmoothingSpec> {
        SmoothingSpec::new(self.nth_octave, self.window)
    }

    pub fn smoother(&self) -> Result<FractionalOctaveSmoother> {
        Ok(FractionalOctaveSmoother::new(self.spec()?).with_edges(self.edges))
    }
}
