// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).
//!
//! Spectral analysis module
//!
//! This module turns a sweep and its captured response into a frequency
//! response. [`TransferFunctionEstimator`] deconvolves the two signals with
//! an FFT, and [`LogFrequencyResampler`] picks values from the linear FFT
//! bins onto a logarithmic frequency axis for display.

mod log_grid;
mod transfer;

pub use log_grid::{BinMapping, LogFrequencyResampler, LogGrid, DEFAULT_POINTS};
pub use transfer::{
    magnitude_to_db, TransferFunction, TransferFunctionEstimator, MAGNITUDE_FLOOR,
    NEGLIGIBLE_MAGNITUDE,
};
