// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use anyhow::Result;
use rust_sweepmeter::config::Config;
use std::fs;
use std::path::Path;
use std::sync::Once;
use tempfile::tempdir;

static INIT: Once = Once::new();

// Setup logger for tests
fn setup() {
    INIT.call_once(|| {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .init();
    });
}

fn assert_rejected_with_sample(contents: &str) -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents)?;

    let result = Config::from_file(&config_path);
    assert!(result.is_err(), "Config loading should have failed");

    let sample_path = config_path.with_extension("sample.yaml");
    assert!(
        Path::new(&sample_path).exists(),
        "Sample config file was not created"
    );

    // The sample holds the defaults and loads cleanly
    let sample_config = Config::from_file(&sample_path)?;
    assert_eq!(sample_config, Config::default());
    Ok(())
}

#[test]
fn test_type_mismatch_creates_sample_file() -> Result<()> {
    assert_rejected_with_sample(
        r#"
sweep:
  f_min: "thirty"       # String instead of number
  length_seconds: []    # Array instead of number
smoothing:
  normalize_amplitude: "yes"
"#,
    )
}

#[test]
fn test_schema_range_error_creates_sample_file() -> Result<()> {
    assert_rejected_with_sample(
        r#"
sweep:
  f_min: 5        # Below the 20 Hz limit
  f_max: 20000
"#,
    )
}

#[test]
fn test_unsupported_fraction_creates_sample_file() -> Result<()> {
    assert_rejected_with_sample(
        r#"
smoothing:
  nth_octave: 12
  window: hamming
"#,
    )
}

#[test]
fn test_unknown_field_creates_sample_file() -> Result<()> {
    assert_rejected_with_sample(
        r#"
display:
  points: 2048
  resolution: high
"#,
    )
}

#[test]
fn test_inverted_range_creates_sample_file() -> Result<()> {
    // Valid for the schema, rejected by the additional rules
    assert_rejected_with_sample(
        r#"
sweep:
  f_min: 10000
  f_max: 100
"#,
    )
}

#[test]
fn test_conflicting_sources_create_sample_file() -> Result<()> {
    assert_rejected_with_sample(
        r#"
audio:
  input_file: "capture.wav"
  loopback: true
"#,
    )
}

#[test]
fn test_malformed_yaml_is_rejected() -> Result<()> {
    setup();
    let temp_dir = tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, "sweep: [unclosed")?;
    assert!(Config::from_file(&config_path).is_err());
    Ok(())
}
