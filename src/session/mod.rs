// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Measurement session
//!
//! [`MeasurementSession`] sequences one measurement: it synthesizes the
//! sweep, captures the response on a blocking worker, deconvolves the two,
//! resamples onto the logarithmic grid and smooths for display.
//!
//! ```text
//! Idle ──start──▶ Measuring ──finish(ok)──▶ Idle
//!                     │
//!                     └──finish(err)──▶ Failed ──start──▶ Measuring
//! ```
//!
//! Only one measurement may be in flight: [`MeasurementSession::start`]
//! returns [`MeasurementError::Busy`] while another one is running. A
//! completed measurement is published as a whole through an `Arc`, and a
//! failed one leaves the previous result in place.
//!
//! Dropping a [`MeasurementTicket`], or cancelling the future returned by
//! [`MeasurementSession::finish`], abandons the measurement and returns the
//! session to its previous state. The abandoned capture still owns the
//! device until it completes, so the next capture waits for it.
//!
//! ## Usage
//!
//! ```no_run
//! use rust_sweepmeter::acquisition::LoopbackDevice;
//! use rust_sweepmeter::excitation::SweepSpec;
//! use rust_sweepmeter::session::MeasurementSession;
//!
//! # async fn run() -> rust_sweepmeter::error::Result<()> {
//! let mut session = MeasurementSession::new(Box::new(LoopbackDevice::new()), SweepSpec::default());
//! let result = session.measure().await?;
//! println!("{} display points", result.display.len());
//! # Ok(())
//! # }
//! ```

mod display;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use log::{debug, error, info};

pub use display::{DisplaySeries, MeasurementReport, MeasurementResult};

use crate::acquisition::{
    open_duplex_audio, spawn_capture, CaptureTask, CapturedSignal, DuplexAudio, SharedDevice,
    CHUNK_SIZE,
};
use crate::config::Config;
use crate::error::{MeasurementError, Result};
use crate::excitation::{SweepGenerator, SweepSpec};
use crate::smoothing::{FractionalOctaveSmoother, SmoothingSpec};
use crate::spectral::{LogFrequencyResampler, LogGrid, TransferFunctionEstimator};

/// Lifecycle of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Measuring,
    Failed,
}

/// Marks a measurement in flight until dropped
struct InFlight {
    flag: Arc<AtomicBool>,
}

impl InFlight {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self { flag: flag.clone() })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// A measurement whose capture is running
///
/// Hand it back to [`MeasurementSession::finish`] to complete the measurement.
/// Dropping it abandons the measurement.
#[must_use = "a started measurement must be passed to MeasurementSession::finish"]
pub struct MeasurementTicket {
    spec: SweepSpec,
    sweep: Arc<[i16]>,
    capture: CaptureTask,
    in_flight: InFlight,
}

impl MeasurementTicket {
    pub fn spec(&self) -> &SweepSpec {
        &self.spec
    }
}

pub struct MeasurementSession {
    device: SharedDevice,
    device_name: String,
    sweep: SweepSpec,
    smoother: FractionalOctaveSmoother,
    normalize_amplitude: bool,
    resampler: LogFrequencyResampler,
    estimator: TransferFunctionEstimator,
    in_flight: Arc<AtomicBool>,
    // Outcome of the last measurement, Idle or Failed
    state: SessionState,
    latest: Option<Arc<MeasurementResult>>,
    last_error: Option<String>,
}

impl MeasurementSession {
    /// Session measuring `device` with default smoothing and display grid
    pub fn new(device: Box<dyn DuplexAudio>, sweep: SweepSpec) -> Self {
        let device_name = device.name();
        Self {
            device: Arc::new(Mutex::new(device)),
            device_name,
            sweep,
            smoother: FractionalOctaveSmoother::default(),
            normalize_amplitude: true,
            resampler: LogFrequencyResampler::default(),
            estimator: TransferFunctionEstimator::new(),
            in_flight: Arc::new(AtomicBool::new(false)),
            state: SessionState::Idle,
            latest: None,
            last_error: None,
        }
    }

    /// Build a session and open its device from a validated configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let device = open_duplex_audio(&config.audio)?;
        Ok(Self::new(device, config.sweep.to_spec()?)
            .with_smoother(config.smoothing.smoother()?)
            .with_normalized_amplitude(config.smoothing.normalize_amplitude)
            .with_resampler(config.display.resampler()?))
    }

    pub fn with_smoother(mut self, smoother: FractionalOctaveSmoother) -> Self {
        self.smoother = smoother;
        self
    }

    pub fn with_resampler(mut self, resampler: LogFrequencyResampler) -> Self {
        self.resampler = resampler;
        self
    }

    pub fn with_normalized_amplitude(mut self, normalize: bool) -> Self {
        self.normalize_amplitude = normalize;
        self
    }

    pub fn state(&self) -> SessionState {
        if self.in_flight.load(Ordering::Acquire) {
            SessionState::Measuring
        } else {
            self.state
        }
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn sweep(&self) -> &SweepSpec {
        &self.sweep
    }

    pub fn smoothing(&self) -> SmoothingSpec {
        self.smoother.spec()
    }

    /// Latest successful measurement
    pub fn latest(&self) -> Option<Arc<MeasurementResult>> {
        self.latest.clone()
    }

    /// Message of the error that ended the last failed measurement
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Replace the sweep used by the next measurement
    pub fn set_sweep(&mut self, sweep: SweepSpec) -> Result<()> {
        sweep.validate()?;
        self.sweep = sweep;
        Ok(())
    }

    /// Change the smoothing and re-smooth the latest result
    ///
    /// The capture, transfer function and log grid of the latest result are
    /// reused; the device is not touched. Returns the re-smoothed result, if
    /// any. An invalid smoothing leaves both the settings and the published
    /// result unchanged.
    pub fn set_smoothing(&mut self, spec: SmoothingSpec) -> Result<Option<Arc<MeasurementResult>>> {
        let smoother = FractionalOctaveSmoother::new(spec).with_edges(self.smoother.edges());
        smoother.kernel(self.resampler.points(), self.sweep.f_min(), self.sweep.f_max())?;

        let resmoothed = match &self.latest {
            Some(latest) => {
                let display = DisplaySeries::from_grid(
                    &latest.grid,
                    &smoother,
                    self.normalize_amplitude,
                    latest.sweep.f_min(),
                    latest.sweep.f_max(),
                )?;
                Some(Arc::new(MeasurementResult {
                    sweep: latest.sweep,
                    smoothing: spec,
                    captured: latest.captured.clone(),
                    transfer: latest.transfer.clone(),
                    grid: latest.grid.clone(),
                    display,
                    timestamp: latest.timestamp,
                }))
            }
            None => None,
        };

        debug!(
            "Smoothing set to 1/{} octave {}",
            spec.nth_octave(),
            spec.window()
        );
        self.smoother = smoother;
        if let Some(result) = &resmoothed {
            self.latest = Some(result.clone());
        }
        Ok(resmoothed)
    }

    /// Start a measurement and return while the capture runs
    ///
    /// # Errors
    ///
    /// * [`MeasurementError::Busy`] while another measurement is running
    /// * [`MeasurementError::InvalidConfiguration`] when the sweep or the
    ///   smoothing cannot be used; the session state is left unchanged
    /// * [`MeasurementError::Worker`] outside a Tokio runtime
    pub fn start(&mut self) -> Result<MeasurementTicket> {
        if self.in_flight.load(Ordering::Acquire) {
            return Err(MeasurementError::Busy);
        }

        let spec = self.sweep;
        spec.validate()?;
        self.smoother
            .kernel(self.resampler.points(), spec.f_min(), spec.f_max())?;

        let sweep: Arc<[i16]> = SweepGenerator::new(spec).generate().into();
        let in_flight = InFlight::acquire(&self.in_flight).ok_or(MeasurementError::Busy)?;
        let capture = spawn_capture(self.device.clone(), sweep.clone())?;

        info!(
            "Measuring {} from {:.1} Hz to {:.1} Hz over {:.3} s",
            self.device_name,
            spec.f_min(),
            spec.f_max(),
            spec.duration()
        );
        Ok(MeasurementTicket {
            spec,
            sweep,
            capture,
            in_flight,
        })
    }

    /// Wait for the capture of `ticket` and publish the processed result
    ///
    /// On failure the session moves to [`SessionState::Failed`] and keeps
    /// the previously published result.
    pub async fn finish(&mut self, ticket: MeasurementTicket) -> Result<Arc<MeasurementResult>> {
        let MeasurementTicket {
            spec,
            sweep,
            capture,
            // Held until the outcome is recorded
            in_flight: _in_flight,
        } = ticket;

        let outcome = match capture.await {
            Ok(captured) => self.process(spec, &sweep, captured),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(result) => {
                let result = Arc::new(result);
                info!(
                    "Measurement published with {} display points",
                    result.display.len()
                );
                self.latest = Some(result.clone());
                self.last_error = None;
                self.state = SessionState::Idle;
                Ok(result)
            }
            Err(e) => {
                error!("Measurement failed: {}", e);
                self.last_error = Some(e.to_string());
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }

    /// Run a complete measurement
    pub async fn measure(&mut self) -> Result<Arc<MeasurementResult>> {
        let ticket = self.start()?;
        self.finish(ticket).await
    }

    fn process(
        &mut self,
        spec: SweepSpec,
        sweep: &[i16],
        captured: CapturedSignal,
    ) -> Result<MeasurementResult> {
        if captured.len() != sweep.len() {
            return Err(MeasurementError::ShortRead {
                chunk: captured.len() / CHUNK_SIZE,
                expected: CHUNK_SIZE,
                received: captured.len() % CHUNK_SIZE,
            });
        }

        let transfer = self.estimator.estimate(sweep, captured.samples())?;
        let grid: LogGrid =
            self.resampler
                .resample_transfer(&transfer, spec.f_min(), spec.f_max())?;
        let display = DisplaySeries::from_grid(
            &grid,
            &self.smoother,
            self.normalize_amplitude,
            spec.f_min(),
            spec.f_max(),
        )?;

        Ok(MeasurementResult {
            sweep: spec,
            smoothing: self.smoother.spec(),
            captured: Arc::new(captured),
            transfer: Arc::new(transfer),
            grid: Arc::new(grid),
            display,
            timestamp: Utc::now(),
        })
    }
}
