// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration management for the sweep measurement
//!
//! This module provides functionality for loading, validating, and applying
//! configuration settings. The configuration is backed by a YAML file and
//! validated against a JSON schema before it is deserialized.
//!
//! ## Configuration Structure
//!
//! The configuration is organized as a nested structure with sections:
//! - `sweep`: frequency range, duration and growth law of the excitation
//! - `smoothing`: fractional-octave smoothing applied before display
//! - `display`: size and bin mapping of the logarithmic frequency grid
//! - `audio`: sound card selection, WAV replay or synthetic loopback
//!
//! ## Usage
//!
//! ```no_run
//! use rust_sweepmeter::config::Config;
//! use rust_sweepmeter::smoothing::WindowType;
//! use std::path::Path;
//!
//! // Load config from file, creates a default if not found
//! let mut config = Config::from_file(Path::new("config.yaml")).unwrap();
//!
//! // Apply command line overrides if needed
//! config.apply_args(
//!     Some(20.0),                 // Start frequency
//!     None,                       // End frequency
//!     Some(5.0),                  // Length in seconds
//!     Some(10),                   // 1/10 octave smoothing
//!     Some(WindowType::Blackman), // Window
//!     None,                       // Grid points
//!     None,                       // Input device
//!     None,                       // Output device
//!     None,                       // Input file
//!     false,                      // Loopback
//! );
//!
//! println!("Sweep starts at {} Hz", config.sweep.f_min);
//! ```

mod audio;
mod display;
mod smoothing;
mod sweep;
pub mod utils;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

pub use audio::AudioConfig;
pub use display::DisplayConfig;
pub use smoothing::SmoothingConfig;
pub use sweep::SweepConfig;
pub use utils::{output_config_schema, validate_specific_rules};

use crate::smoothing::WindowType;

/// Root configuration structure
///
/// Every section falls back to its defaults when missing from the file, so
/// an empty YAML document describes the default 30 Hz to 20 kHz, 3 s
/// measurement with 1/6 octave Hamming smoothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Excitation sweep settings
    #[serde(default)]
    pub sweep: SweepConfig,

    /// Smoothing settings for the displayed curves
    #[serde(default)]
    pub smoothing: SmoothingConfig,

    /// Logarithmic display grid settings
    #[serde(default)]
    pub display: DisplayConfig,

    /// Audio device settings
    #[serde(default)]
    pub audio: AudioConfig,
}

impl Config {
    /// Helper method to create a sample config file when validation fails
    fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let sample_path = path.with_extension("sample.yaml");
        debug!("Original path: {:?}, Sample path: {:?}", path, sample_path);

        if let Some(parent) = sample_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!("Creating parent directory: {:?}", parent);
                fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "Failed to create parent directory for sample config at {:?}",
                        parent
                    )
                })?;
            }
        }

        Self::default()
            .save_to_file(&sample_path)
            .with_context(|| format!("Failed to save sample config to {:?}", sample_path))?;

        error!(
            "Sample configuration file created at {:?}\nPlease edit and rename it",
            sample_path
        );
        Ok(())
    }

    /// Load configuration from a file
    ///
    /// A missing file is created with the default configuration. A file that
    /// fails schema validation, deserialization or the additional rules of
    /// [`validate_specific_rules`] is rejected, and a `.sample.yaml` file with
    /// the defaults is written next to it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(
                "Configuration file not found at {:?}, creating default",
                path
            );
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;

        // An empty document is valid and means all defaults
        let yaml_value: serde_yml::Value = serde_yml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML configuration from {:?}", path))?;
        let yaml_value = match yaml_value {
            serde_yml::Value::Null => serde_yml::Value::Mapping(Default::default()),
            other => other,
        };

        let json_value = serde_json::to_value(&yaml_value).with_context(|| {
            format!("Failed to convert YAML to JSON for validation: {:?}", path)
        })?;

        let schema_str = include_str!("../../resources/config.schema.json");
        let schema: serde_json::Value =
            serde_json::from_str(schema_str).context("Failed to parse JSON schema")?;

        let validator = jsonschema::draft202012::options()
            .should_validate_formats(true)
            .build(&schema)?;

        debug!("Validating {} configuration against schema", path.display());
        if let Err(error) = validator.validate(&json_value) {
            error!("Configuration validation error before deserialization");
            Self::create_sample_config(path)?;
            anyhow::bail!("Configuration validation failed: {}", error);
        }

        debug!("Schema validation passed, deserializing into Config structure");
        let config: Config = match serde_json::from_value(json_value) {
            Ok(config) => config,
            Err(err) => {
                error!("Configuration deserialization error: {}", err);
                if let Err(e) = Self::create_sample_config(path) {
                    error!("Failed to create sample config: {}", e);
                }
                return Err(anyhow::anyhow!(
                    "Failed to deserialize configuration from {}: {}",
                    path.display(),
                    err
                ));
            }
        };

        if let Err(err) = validate_specific_rules(&config) {
            error!("Configuration specific validation error: {}", err);
            Self::create_sample_config(path)?;
            return Err(err);
        }

        Ok(config)
    }

    /// Save the configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml =
            serde_yml::to_string(self).context("Failed to serialize configuration to YAML")?;

        let mut file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create config file at {:?}", path.as_ref()))?;

        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Apply command line arguments to override configuration values.
    ///
    /// Only arguments that were actually given replace the loaded values.
    /// Call [`validate_specific_rules`] afterwards since overrides bypass
    /// the schema.
    ///
    /// # Parameters
    ///
    /// * `f_min` / `f_max` - Sweep frequency range in Hz
    /// * `length_seconds` - Sweep duration
    /// * `nth_octave` - Smoothing bandwidth divisor
    /// * `window` - Smoothing kernel shape
    /// * `points` - Size of the logarithmic display grid
    /// * `input_device` / `output_device` - Sound card names
    /// * `input_file` - Recorded response to replay instead of capturing
    /// * `loopback` - If true, measure the synthetic identity device
    #[allow(clippy::too_many_arguments)]
    pub fn apply_args(
        &mut self,
        f_min: Option<f64>,
        f_max: Option<f64>,
        length_seconds: Option<f64>,
        nth_octave: Option<u32>,
        window: Option<WindowType>,
        points: Option<usize>,
        input_device: Option<String>,
        output_device: Option<String>,
        input_file: Option<PathBuf>,
        loopback: bool,
    ) {
        if let Some(f_min) = f_min {
            debug!("Overriding start frequency from command line: {}", f_min);
            self.sweep.f_min = f_min;
        }
        if let Some(f_max) = f_max {
            debug!("Overriding end frequency from command line: {}", f_max);
            self.sweep.f_max = f_max;
        }
        if let Some(length) = length_seconds {
            debug!("Overriding sweep length from command line: {}", length);
            self.sweep.length_seconds = length;
        }

        if let Some(nth) = nth_octave {
            debug!("Overriding smoothing fraction from command line: 1/{}", nth);
            self.smoothing.nth_octave = nth;
        }
        if let Some(window) = window {
            debug!("Overriding smoothing window from command line: {}", window);
            self.smoothing.window = window;
        }
        if let Some(points) = points {
            debug!("Overriding grid size from command line: {}", points);
            self.display.points = points;
        }

        if let Some(device) = input_device {
            debug!("Overriding input device from command line: {}", device);
            self.audio.input_device = Some(device);
        }
        if let Some(device) = output_device {
            debug!("Overriding output device from command line: {}", device);
            self.audio.output_device = Some(device);
        }
        if let Some(file) = input_file {
            debug!("Overriding input file from command line: {:?}", file);
            self.audio.input_file = Some(file.to_string_lossy().to_string());
            self.audio.loopback = false;
        }
        if loopback {
            debug!("Using loopback device from command line");
            self.audio.loopback = true;
            self.audio.input_file = None;
        }
    }
}
