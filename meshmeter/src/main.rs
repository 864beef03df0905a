//! Command-line mesh measurement.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use meshmeter::{load, measure, MeasureOptions};
use tracing_subscriber::EnvFilter;

/// Measure the volume, surface area and axis lengths of a 3D model
/// file (.stl or .obj).
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Path to the mesh file.
    path: PathBuf,
}

/// Format a value with at least two decimal places, adding more for
/// values below 1 so small measurements keep significant digits.
fn display_round(x: f64) -> String {
    let decimals = if x > 0.0 {
        let leading = -x.log10().floor();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let leading = leading.max(0.0) as usize;
        leading + 2
    } else {
        2
    };
    format!("{x:.decimals$}")
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut mesh = match load(&args.path) {
        Ok(mesh) => mesh,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let results = measure(&mut mesh, MeasureOptions::all());
    let extents = results.extents.unwrap_or_default();

    println!("Volume: {}", display_round(results.volume.unwrap_or(0.0)));
    println!(
        "Surface Area: {}",
        display_round(results.area.unwrap_or(0.0))
    );
    println!("X Length: {}", display_round(extents.x));
    println!("Y Length: {}", display_round(extents.y));
    println!("Z Length: {}", display_round(extents.z));
    ExitCode::SUCCESS
}
