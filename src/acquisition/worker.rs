// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Capture worker
//!
//! A capture blocks for the whole duration of the sweep, so it runs on the
//! Tokio blocking pool. The caller gets a [`CaptureTask`] future that
//! resolves to the captured signal once every chunk has been read. Captures
//! cannot be cancelled once started.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Instant;

use log::{debug, info};
use tokio::task::JoinHandle;

use super::{CapturedSignal, DuplexAudio};
use crate::error::{MeasurementError, Result};

/// Device shared between the session and its capture worker
pub type SharedDevice = Arc<Mutex<Box<dyn DuplexAudio>>>;

/// Pending capture running on a blocking worker thread
#[must_use = "a capture task does nothing unless awaited"]
pub struct CaptureTask {
    handle: JoinHandle<Result<CapturedSignal>>,
}

impl Future for CaptureTask {
    type Output = Result<CapturedSignal>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.handle).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(join_error)) => {
                Poll::Ready(Err(MeasurementError::Worker(join_error.to_string())))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Start playing `sweep` on `device` and recording the response
///
/// # Errors
///
/// Returns [`MeasurementError::Worker`] when called outside a Tokio runtime.
pub fn spawn_capture(device: SharedDevice, sweep: Arc<[i16]>) -> Result<CaptureTask> {
    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|e| MeasurementError::Worker(e.to_string()))?;

    let handle = runtime.spawn_blocking(move || {
        // A panic in an earlier capture must not lock the device forever
        let mut device = device.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let started = Instant::now();
        info!(
            "Capture of {} samples started on {}",
            sweep.len(),
            device.name()
        );
        let result = device.play_and_record(&sweep);
        debug!("Capture finished after {:?}", started.elapsed());
        result
    });

    Ok(CaptureTask { handle })
}
