// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use anyhow::Result;
use rust_sweepmeter::config::{validate_specific_rules, Config, SweepConfig};
use rust_sweepmeter::excitation::GrowthLaw;
use rust_sweepmeter::smoothing::{EdgeHandling, WindowType};
use rust_sweepmeter::spectral::BinMapping;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_load_and_save() -> Result<()> {
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");

    let mut config = Config::default();
    config.sweep = SweepConfig {
        f_min: 20.0,
        f_max: 16_000.0,
        length_seconds: 5.0,
        growth_law: GrowthLaw::Ratio,
    };
    config.smoothing.nth_octave = 20;
    config.smoothing.window = WindowType::Blackman;
    config.smoothing.edges = EdgeHandling::ZeroPadded;
    config.display.bin_mapping = BinMapping::Physical;
    config.audio.input_device = Some("USB".to_string());

    config.save_to_file(&config_path)?;
    let loaded_config = Config::from_file(&config_path)?;
    assert_eq!(loaded_config, config);

    // Loading a missing file creates it with defaults
    let non_existent_path = temp_dir.path().join("non_existent.yaml");
    let default_config = Config::from_file(&non_existent_path)?;
    assert!(non_existent_path.exists());
    assert_eq!(default_config, Config::default());

    Ok(())
}

#[test]
fn test_default_values() {
    let config = Config::default();
    assert_eq!(config.sweep.f_min, 30.0);
    assert_eq!(config.sweep.f_max, 20_000.0);
    assert_eq!(config.sweep.length_seconds, 3.0);
    assert_eq!(config.sweep.growth_law, GrowthLaw::Span);
    assert_eq!(config.smoothing.nth_octave, 6);
    assert_eq!(config.smoothing.window, WindowType::Hamming);
    assert_eq!(config.smoothing.edges, EdgeHandling::Normalized);
    assert!(config.smoothing.normalize_amplitude);
    assert_eq!(config.display.points, 4048);
    assert_eq!(config.display.bin_mapping, BinMapping::Span);
    assert!(!config.audio.loopback);
    assert_eq!(config.audio.read_timeout_ms, 2000);

    let spec = config.sweep.to_spec().unwrap();
    assert_eq!(spec.length_in_samples(), 132_096);
}

#[test]
fn test_partial_config_uses_defaults() -> Result<()> {
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("partial.yaml");
    fs::write(
        &config_path,
        r#"
smoothing:
  nth_octave: 3
  window: hanning
audio:
  loopback: true
"#,
    )?;

    let config = Config::from_file(&config_path)?;
    assert_eq!(config.smoothing.nth_octave, 3);
    assert_eq!(config.smoothing.window, WindowType::Hanning);
    assert_eq!(config.sweep, SweepConfig::default());
    assert!(config.audio.loopback);

    // An empty document means all defaults
    let empty_path = temp_dir.path().join("empty.yaml");
    fs::write(&empty_path, "")?;
    assert_eq!(Config::from_file(&empty_path)?, Config::default());

    Ok(())
}

#[test]
fn test_apply_args() {
    let mut config = Config::default();
    config.apply_args(
        Some(50.0),
        Some(15_000.0),
        Some(1.5),
        Some(10),
        Some(WindowType::Bartlett),
        Some(1000),
        Some("Scarlett".to_string()),
        None,
        Some(PathBuf::from("capture.wav")),
        false,
    );

    assert_eq!(config.sweep.f_min, 50.0);
    assert_eq!(config.sweep.f_max, 15_000.0);
    assert_eq!(config.sweep.length_seconds, 1.5);
    assert_eq!(config.smoothing.nth_octave, 10);
    assert_eq!(config.smoothing.window, WindowType::Bartlett);
    assert_eq!(config.display.points, 1000);
    assert_eq!(config.audio.input_device.as_deref(), Some("Scarlett"));
    assert_eq!(config.audio.output_device, None);
    assert_eq!(config.audio.input_file.as_deref(), Some("capture.wav"));
    assert!(validate_specific_rules(&config).is_ok());

    // Loopback on the command line replaces the replay file
    config.apply_args(None, None, None, None, None, None, None, None, None, true);
    assert!(config.audio.loopback);
    assert!(config.audio.input_file.is_none());
    assert!(validate_specific_rules(&config).is_ok());
}

#[test]
fn test_specific_rules() {
    let valid = Config::default();
    assert!(validate_specific_rules(&valid).is_ok());

    let mut inverted = Config::default();
    inverted.sweep.f_min = 1000.0;
    inverted.sweep.f_max = 500.0;
    assert!(validate_specific_rules(&inverted).is_err());

    let mut too_low = Config::default();
    too_low.sweep.f_min = 10.0;
    assert!(validate_specific_rules(&too_low).is_err());

    let mut too_high = Config::default();
    too_high.sweep.f_max = 24_000.0;
    assert!(validate_specific_rules(&too_high).is_err());

    let mut no_length = Config::default();
    no_length.sweep.length_seconds = 0.0;
    assert!(validate_specific_rules(&no_length).is_err());

    // Shorter than half a chunk rounds to nothing
    let mut tiny = Config::default();
    tiny.sweep.length_seconds = 0.001;
    assert!(validate_specific_rules(&tiny).is_err());

    let mut endless = Config::default();
    endless.sweep.length_seconds = 1e300;
    assert!(validate_specific_rules(&endless).is_err());

    let mut odd_octave = Config::default();
    odd_octave.smoothing.nth_octave = 12;
    assert!(validate_specific_rules(&odd_octave).is_err());

    let mut one_point = Config::default();
    one_point.display.points = 1;
    assert!(validate_specific_rules(&one_point).is_err());

    let mut both_sources = Config::default();
    both_sources.audio.loopback = true;
    both_sources.audio.input_file = Some("capture.wav".to_string());
    assert!(validate_specific_rules(&both_sources).is_err());
}
