// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Excitation sweep configuration

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::excitation::{GrowthLaw, SweepSpec};

/// Settings of the excitation sweep
///
/// The length is given in seconds and rounded to a whole number of capture
/// chunks when the [`SweepSpec`] is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Start frequency in Hz
    #[serde(default = "default_f_min")]
    pub f_min: f64,
    /// End frequency in Hz
    #[serde(default = "default_f_max")]
    pub f_max: f64,
    /// Sweep duration in seconds
    #[serde(default = "default_length_seconds")]
    pub length_seconds: f64,
    /// Phase increment growth law
    #[serde(default)]
    pub growth_law: GrowthLaw,
}

fn default_f_min() -> f64 {
    30.0
}

fn default_f_max() -> f64 {
    20_000.0
}

fn default_length_seconds() -> f64 {
    3.0
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            f_min: default_f_min(),
            f_max: default_f_max(),
            length_seconds: default_length_seconds(),
            growth_law: GrowthLaw::default(),
        }
    }
}

impl SweepConfig {
    /// Build the sweep described by this section
    pub fn to_spec(&self) -> Result<SweepSpec> {
        Ok(SweepSpec::new(self.f_min, self.f_max, self.length_seconds)?
            .with_growth_law(self.growth_law))
    }
}
