// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Error taxonomy for a frequency response measurement
//!
//! Every failure that can end a measurement is one of these variants. The
//! session reports exactly one of them per failed measurement and never
//! publishes partial results.

/// Errors raised while configuring, capturing or processing a measurement
#[derive(thiserror::Error, Debug)]
pub enum MeasurementError {
    /// The audio device could not be opened or configured
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// A capture chunk delivered fewer samples than requested
    #[error("Short read on chunk {chunk}: expected {expected} samples, received {received}")]
    ShortRead {
        chunk: usize,
        expected: usize,
        received: usize,
    },

    /// The reference spectrum cannot be used for deconvolution
    #[error("Degenerate reference spectrum: {0}")]
    DegenerateSpectrum(String),

    /// Parameters rejected before a measurement starts
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A measurement is already in flight
    #[error("A measurement is already running")]
    Busy,

    /// The capture worker panicked or was cancelled
    #[error("Capture worker failed: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

impl MeasurementError {
    /// Shorthand for [`MeasurementError::InvalidConfiguration`]
    pub fn invalid(message: impl Into<String>) -> Self {
        MeasurementError::InvalidConfiguration(message.into())
    }
}

/// Result alias used throughout the measurement pipeline
pub type Result<T> = std::result::Result<T, MeasurementError>;
