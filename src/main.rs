// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the swept-sine frequency response analyzer
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use rust_sweepmeter::acquisition::{list_input_devices, list_output_devices};
use rust_sweepmeter::config::{output_config_schema, validate_specific_rules, Config};
use rust_sweepmeter::session::MeasurementSession;
use rust_sweepmeter::smoothing::WindowType;

/// Frequency response analyzer using swept-sine deconvolution
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (YAML), created with defaults if missing
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Sweep start frequency in Hz
    #[arg(long)]
    f_min: Option<f64>,

    /// Sweep end frequency in Hz
    #[arg(long)]
    f_max: Option<f64>,

    /// Sweep length in seconds
    #[arg(short, long)]
    length: Option<f64>,

    /// Smoothing bandwidth as 1/n octave (3, 6, 10 or 20)
    #[arg(long)]
    octave: Option<u32>,

    /// Smoothing window (hamming, bartlett, blackman or hanning)
    #[arg(long)]
    window: Option<WindowType>,

    /// Number of points on the logarithmic frequency axis
    #[arg(long)]
    points: Option<usize>,

    /// Audio input device
    #[arg(long)]
    input_device: Option<String>,

    /// Audio output device
    #[arg(long)]
    output_device: Option<String>,

    /// Recorded response to analyse instead of capturing (WAV format)
    #[arg(long)]
    input_file: Option<PathBuf>,

    /// Measure a synthetic loopback instead of the sound card
    #[arg(long)]
    loopback: bool,

    /// Output file for results (JSON)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Save the captured response to a WAV file
    #[arg(long)]
    save_capture: Option<PathBuf>,

    /// List audio devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Print the configuration JSON schema and exit
    #[arg(long)]
    show_config_schema: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.show_config_schema {
        return output_config_schema();
    }

    if args.list_devices {
        println!("Input devices:");
        for name in list_input_devices()? {
            println!("- {}", name);
        }
        println!("Output devices:");
        for name in list_output_devices()? {
            println!("- {}", name);
        }
        return Ok(());
    }

    let mut config = Config::from_file(&args.config)?;
    config.apply_args(
        args.f_min,
        args.f_max,
        args.length,
        args.octave,
        args.window,
        args.points,
        args.input_device,
        args.output_device,
        args.input_file,
        args.loopback,
    );
    validate_specific_rules(&config).context("Invalid command line overrides")?;

    println!("Sweep Frequency Response Analyzer");
    println!("---------------------------------");

    let mut session = MeasurementSession::from_config(&config)?;
    info!("Using audio device: {}", session.device_name());
    let result = session.measure().await?;

    if let Some(path) = args.save_capture {
        result.captured.save_wav(&path)?;
        println!("Capture saved to: {}", path.display());
    }

    if let Some(output_path) = args.output {
        println!("Saving results to: {}", output_path.display());
        std::fs::write(
            &output_path,
            serde_json::to_string_pretty(&result.report())?,
        )
        .with_context(|| format!("Failed to write results to {:?}", output_path))?;
    } else {
        let display = &result.display;
        println!("Results:");
        println!(
            "- Sweep: {:.1} Hz to {:.1} Hz, {} samples",
            result.sweep.f_min(),
            result.sweep.f_max(),
            result.sweep.length_in_samples()
        );
        println!(
            "- Smoothing: 1/{} octave, {} window",
            result.smoothing.nth_octave(),
            result.smoothing.window()
        );
        let step = (display.len() / 16).max(1);
        println!("{:>12} {:>10} {:>10}", "Hz", "dB", "deg");
        for i in (0..display.len()).step_by(step) {
            println!(
                "{:>12.1} {:>10.2} {:>10.1}",
                display.frequencies[i], display.amplitude_db[i], display.phase_deg[i]
            );
        }
    }

    Ok(())
}
