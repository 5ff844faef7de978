// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides utility functions for working with configuration
//! settings, including validation and schema management.

use anyhow::{Context, Result};
use log::debug;

use super::Config;
use crate::excitation::MAX_LENGTH_SECONDS;
use crate::smoothing::SUPPORTED_FRACTIONS;

/// Lowest frequency accepted for the sweep range, in Hz
pub const MIN_FREQUENCY: f64 = 20.0;

/// Highest frequency accepted for the sweep range, in Hz
pub const MAX_FREQUENCY: f64 = 20_000.0;

/// Output the embedded JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line.
///
/// # Example
///
/// ```bash
/// ./rust_sweepmeter --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let schema_str = include_str!("../../resources/config.schema.json");

    let schema: serde_json::Value =
        serde_json::from_str(schema_str).context("Failed to parse JSON schema")?;

    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;

    println!("{}", formatted_schema);

    Ok(())
}

/// Validates the configuration against rules that the JSON schema cannot express
///
/// # Validation Rules
///
/// - **Frequency range**: both ends within 20 Hz to 20 kHz and `f_min < f_max`
/// - **Sweep length**: strictly positive and long enough for one capture chunk
/// - **Smoothing**: `nth_octave` is one of 3, 6, 10 or 20
/// - **Display grid**: at least two points
/// - **Audio source**: `input_file` and `loopback` are mutually exclusive
///
/// Command line overrides bypass the schema, so this is also run after
/// [`Config::apply_args`].
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");

    let sweep = &config.sweep;
    for (name, value) in [("f_min", sweep.f_min), ("f_max", sweep.f_max)] {
        if !(MIN_FREQUENCY..=MAX_FREQUENCY).contains(&value) {
            anyhow::bail!(
                "sweep.{} = {} Hz is outside {} Hz to {} Hz",
                name,
                value,
                MIN_FREQUENCY,
                MAX_FREQUENCY
            );
        }
    }
    if sweep.f_min >= sweep.f_max {
        anyhow::bail!(
            "sweep.f_min ({} Hz) must be below sweep.f_max ({} Hz)",
            sweep.f_min,
            sweep.f_max
        );
    }
    if sweep.length_seconds.is_nan() || sweep.length_seconds <= 0.0 {
        anyhow::bail!(
            "sweep.length_seconds must be positive, got {}",
            sweep.length_seconds
        );
    }
    if sweep.length_seconds > MAX_LENGTH_SECONDS {
        anyhow::bail!(
            "sweep.length_seconds must not exceed {} s, got {}",
            MAX_LENGTH_SECONDS,
            sweep.length_seconds
        );
    }
    // Also rejects lengths that round to zero chunks
    sweep.to_spec().context("Invalid sweep section")?;

    if !SUPPORTED_FRACTIONS.contains(&config.smoothing.nth_octave) {
        anyhow::bail!(
            "smoothing.nth_octave must be one of {:?}, got {}",
            SUPPORTED_FRACTIONS,
            config.smoothing.nth_octave
        );
    }

    if config.display.points < 2 {
        anyhow::bail!(
            "display.points must be at least 2, got {}",
            config.display.points
        );
    }

    if config.audio.input_file.is_some() && config.audio.loopback {
        anyhow::bail!("audio.input_file and audio.loopback cannot both be set");
    }

    Ok(())
}
