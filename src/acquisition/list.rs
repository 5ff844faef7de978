// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Lists the audio devices known to the default cpal host
use cpal::traits::{DeviceTrait, HostTrait};

/// List available audio input devices
///
/// # Returns
/// A Result containing a vector of device names or an error if the operation fails.
pub fn list_input_devices() -> Result<Vec<String>, anyhow::Error> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| anyhow::anyhow!("Failed to get input devices: {}", e))?;

    Ok(devices
        .map(|device| {
            device
                .name()
                .unwrap_or_else(|_| "Unknown Device".to_string())
        })
        .collect())
}

/// List available audio output devices
pub fn list_output_devices() -> Result<Vec<String>, anyhow::Error> {
    let host = cpal::default_host();
    let devices = host
        .output_devices()
        .map_err(|e| anyhow::anyhow!("Failed to get output devices: {}", e))?;

    Ok(devices
        .map(|device| {
            device
                .name()
                .unwrap_or_else(|_| "Unknown Device".to_string())
        })
        .collect())
}
