// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rust Sweepmeter library
//!
//! This library measures the amplitude and phase response of an acoustic or
//! electronic system by playing a swept sine through it, recording the
//! response and deconvolving the two in the frequency domain.
//!
//! The pipeline runs
//! [`excitation`] → [`acquisition`] → [`spectral`] → [`smoothing`], and
//! [`session::MeasurementSession`] sequences it on every measurement.

pub mod acquisition;
pub mod config;
pub mod error;
pub mod excitation;
pub mod session;
pub mod smoothing;
pub mod spectral;
