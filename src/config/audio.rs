// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use serde::{Deserialize, Serialize};

/// Audio device selection
///
/// `input_file` and `loopback` replace the sound card and are mutually
/// exclusive. Without either, the named devices (or the host defaults) are
/// opened through CPAL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Capture device, matched as a substring of the device name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_device: Option<String>,
    /// Playback device, matched as a substring of the device name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_device: Option<String>,
    /// Recorded response (mono 16-bit WAV at 44.1 kHz) replayed instead of capturing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_file: Option<String>,
    /// Use a synthetic identity device instead of the sound card
    #[serde(default)]
    pub loopback: bool,
    /// Maximum wait for one capture chunk, in milliseconds
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_read_timeout_ms() -> u64 {
    2000
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            input_device: None,
            output_device: None,
            input_file: None,
            loopback: false,
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}
