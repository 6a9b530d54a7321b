//! Synthetic current-log generator.
//!
//! Writes a logger-style CSV with three slowly drifting, noisy current
//! channels sampled once per second. Useful as a fixture for `idclog`.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use std::path::PathBuf;

const BASE_CURRENT: f64 = 20.0;
const NOISE: f64 = 0.2;
const DRIFT: f64 = 0.3;
const CHANNEL_OFFSETS: [f64; 3] = [0.0, 0.05, -0.05];
const WARN_PROBABILITY: f64 = 0.002;

const HEADER: [&str; 8] = [
    "Date",
    "Time",
    "Laptime",
    "Laptime(ms)",
    "STATUS_MAXMIN",
    "Idc_1(A)",
    "Idc_2(A)",
    "Idc_3(A)",
];

#[derive(Parser, Debug)]
#[command(name = "make_dummy_csv", about = "Generate a synthetic DC current log CSV")]
struct Args {
    /// Output CSV path
    #[arg(long, default_value = "input/sample.csv")]
    output: PathBuf,

    /// Number of one-second samples
    #[arg(long, default_value_t = 7200)]
    seconds: u32,

    /// Logger metadata rows written before the header
    #[arg(long, default_value_t = 0)]
    metadata_rows: usize,

    /// RNG seed; random when omitted
    #[arg(long)]
    seed: Option<u64>,
}

fn start_time() -> Result<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2026, 1, 14)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .context("Invalid start time")
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Preamble rows in the style of a logger export; never contains the header marker
fn metadata_row(index: usize) -> Vec<String> {
    let (key, value) = match index {
        0 => ("Model".to_string(), "DC-LOGGER 3CH".to_string()),
        1 => ("Serial".to_string(), "000000".to_string()),
        2 => ("Interval".to_string(), "1s".to_string()),
        n => (format!("Comment{}", n - 2), String::new()),
    };
    vec![key, value]
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    for i in 0..args.metadata_rows {
        writer.write_record(metadata_row(i))?;
    }
    writer.write_record(HEADER)?;

    let start = start_time()?;
    let period = f64::from(args.seconds.max(1));

    for t in 0..args.seconds {
        let now = start + Duration::seconds(i64::from(t));
        let drift = DRIFT * (2.0 * PI * f64::from(t) / period).sin();

        let currents: Vec<String> = CHANNEL_OFFSETS
            .iter()
            .map(|offset| {
                let noise = rng.gen_range(-NOISE..=NOISE);
                round3(BASE_CURRENT + drift + noise + offset).to_string()
            })
            .collect();

        let status = if rng.gen::<f64>() < WARN_PROBABILITY {
            "WARN"
        } else {
            "NORMAL"
        };

        let mut record = vec![
            now.format("%Y/%m/%d").to_string(),
            now.format("%H:%M:%S").to_string(),
            t.to_string(),
            (u64::from(t) * 1000).to_string(),
            status.to_string(),
        ];
        record.extend(currents);
        writer.write_record(&record)?;
    }

    writer.flush()?;
    tracing::info!(
        "Wrote {} rows to {} (header on row {})",
        args.seconds,
        args.output.display(),
        args.metadata_rows
    );
    Ok(())
}
