// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Fractional-octave smoothing module
//!
//! This module provides the window functions and the smoother applied to
//! log-gridded frequency response curves before display.
//!
//! ## Usage
//!
//! ```
//! use rust_sweepmeter::smoothing::{FractionalOctaveSmoother, SmoothingSpec, WindowType};
//!
//! let spec = SmoothingSpec::new(6, WindowType::Blackman).unwrap();
//! let smoother = FractionalOctaveSmoother::new(spec);
//!
//! let flat = vec![1.0; 4048];
//! let smoothed = smoother.smooth(&flat, 30.0, 20_000.0).unwrap();
//! assert_eq!(smoothed.len(), flat.len());
//! ```

mod octave;
mod window;

pub use octave::{EdgeHandling, FractionalOctaveSmoother, SmoothingSpec, SUPPORTED_FRACTIONS};
pub use window::WindowType;
