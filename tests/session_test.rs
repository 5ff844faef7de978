// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use std::sync::Arc;

use rust_sweepmeter::acquisition::{LoopbackDevice, CHUNK_SIZE};
use rust_sweepmeter::config::Config;
use rust_sweepmeter::error::MeasurementError;
use rust_sweepmeter::excitation::SweepSpec;
use rust_sweepmeter::session::{MeasurementSession, SessionState};
use rust_sweepmeter::smoothing::{SmoothingSpec, WindowType};
use tempfile::tempdir;

fn short_sweep() -> SweepSpec {
    SweepSpec::from_samples(30.0, 20_000.0, 32 * CHUNK_SIZE).unwrap()
}

#[tokio::test]
async fn test_loopback_session_from_config() {
    let mut config = Config::default();
    config.audio.loopback = true;
    config.sweep.length_seconds = 0.5;

    let mut session = MeasurementSession::from_config(&config).unwrap();
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.latest().is_none());

    let result = session.measure().await.unwrap();
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(result.captured.len(), session.sweep().length_in_samples());
    assert_eq!(result.display.len(), config.display.points);
    assert!(result.display.amplitude_db.iter().all(|a| a.abs() <= 0.5));
}

#[tokio::test]
async fn test_short_read_is_reported() {
    let device = LoopbackDevice::new().with_chunk_limit(4);
    let mut session = MeasurementSession::new(Box::new(device), short_sweep());

    let result = session.measure().await;
    assert!(matches!(
        result,
        Err(MeasurementError::ShortRead { chunk: 4, .. })
    ));
    assert_eq!(session.state(), SessionState::Failed);
    assert!(session.latest().is_none());

    // A failed session accepts the next trigger
    session.set_sweep(
        SweepSpec::from_samples(30.0, 20_000.0, 4 * CHUNK_SIZE).unwrap(),
    )
    .unwrap();
    session.measure().await.unwrap();
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.last_error().is_none());
}

#[tokio::test]
async fn test_measurements_replace_results() {
    let mut session = MeasurementSession::new(Box::new(LoopbackDevice::new()), short_sweep());
    let first = session.measure().await.unwrap();
    let second = session.measure().await.unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(!Arc::ptr_eq(&first.transfer, &second.transfer));
    assert!(Arc::ptr_eq(&session.latest().unwrap(), &second));
    // The old result is untouched and still readable
    assert_eq!(first.display, second.display);
}

#[tokio::test]
async fn test_resmoothing_changes_only_display() {
    let device = LoopbackDevice::new().with_delay(3).with_gain(0.8);
    let mut session = MeasurementSession::new(Box::new(device), short_sweep());
    let measured = session.measure().await.unwrap();

    for nth in [3, 10, 20] {
        let spec = SmoothingSpec::new(nth, WindowType::Bartlett).unwrap();
        let resmoothed = session.set_smoothing(spec).unwrap().unwrap();
        assert!(Arc::ptr_eq(&measured.captured, &resmoothed.captured));
        assert!(Arc::ptr_eq(&measured.grid, &resmoothed.grid));
        assert_eq!(resmoothed.timestamp, measured.timestamp);
        assert_eq!(resmoothed.display.frequencies, measured.display.frequencies);
    }
    assert_eq!(session.smoothing().nth_octave(), 20);
}

#[tokio::test]
async fn test_saved_capture_replays_identically() {
    let dir = tempdir().unwrap();
    let capture_path = dir.path().join("capture.wav");

    let mut config = Config::default();
    config.sweep.length_seconds = 0.5;
    config.audio.loopback = true;
    let mut live = MeasurementSession::from_config(&config).unwrap();
    let measured = live.measure().await.unwrap();
    measured.captured.save_wav(&capture_path).unwrap();

    config.audio.loopback = false;
    config.audio.input_file = Some(capture_path.to_string_lossy().to_string());
    let mut replay = MeasurementSession::from_config(&config).unwrap();
    let replayed = replay.measure().await.unwrap();

    assert_eq!(replayed.captured.samples(), measured.captured.samples());
    assert_eq!(replayed.display, measured.display);
}

#[test]
fn test_start_outside_runtime_is_rejected() {
    let mut session = MeasurementSession::new(Box::new(LoopbackDevice::new()), short_sweep());
    assert!(matches!(
        session.start(),
        Err(MeasurementError::Worker(_))
    ));
    assert_eq!(session.state(), SessionState::Idle);
}
