// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Excitation signal module
//!
//! This module describes the swept sine used to excite the system under test
//! and synthesizes it as 16-bit PCM samples.
//!
//! ## Usage
//!
//! ```
//! use rust_sweepmeter::excitation::{SweepGenerator, SweepSpec};
//!
//! // 30 Hz to 20 kHz over three seconds
//! let spec = SweepSpec::new(30.0, 20_000.0, 3.0).unwrap();
//! assert_eq!(spec.length_in_samples(), 132_096);
//!
//! let sweep = SweepGenerator::new(spec).generate();
//! assert_eq!(sweep.len(), spec.length_in_samples());
//! ```

mod sweep;

pub use sweep::{GrowthLaw, SweepGenerator, SweepSpec, MAX_LENGTH_SECONDS};
