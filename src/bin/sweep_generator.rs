// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-sweepmeter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Excitation sweep generator
// Writes the measurement sweep to a mono 16-bit WAV file, e.g. to play it
// from another machine and record the response for offline analysis

use clap::Parser;
use std::path::PathBuf;

use rust_sweepmeter::acquisition::write_wav;
use rust_sweepmeter::excitation::{GrowthLaw, SweepGenerator, SweepSpec};

/// Swept sine generator for frequency response measurements
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output file path (.wav)
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Start frequency in Hz
    #[arg(long, default_value_t = 30.0)]
    f_min: f64,

    /// End frequency in Hz
    #[arg(long, default_value_t = 20000.0)]
    f_max: f64,

    /// Duration in seconds (rounded to whole 1024-sample chunks)
    #[arg(short, long, default_value_t = 3.0)]
    duration: f64,

    /// Use the frequency ratio instead of the frequency span as growth base
    #[arg(long, default_value_t = false)]
    ratio: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let growth_law = if args.ratio {
        GrowthLaw::Ratio
    } else {
        GrowthLaw::Span
    };
    let spec = match SweepSpec::new(args.f_min, args.f_max, args.duration) {
        Ok(spec) => spec.with_growth_law(growth_law),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "Generating {:.1} Hz to {:.1} Hz sweep: {} samples ({:.3} s)",
        spec.f_min(),
        spec.f_max(),
        spec.length_in_samples(),
        spec.duration()
    );

    let sweep = SweepGenerator::new(spec).generate();
    write_wav(&args.output, &sweep)?;

    println!("Sweep written to {}", args.output.display());
    Ok(())
}
