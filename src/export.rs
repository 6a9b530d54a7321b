//! Output artifacts: summary table (CSV, JSON) and the time-series plot (PNG).
//!
//! Every function here writes into paths chosen by the caller; creating the
//! output directories is left to the binary.

use ::image::{Rgba, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::analysis::{AnalysisOutcome, ChannelSummary};
use crate::state::{CurrentChannel, CHANNEL_COLORS};

/// Summary table file name inside the output directory
pub const SUMMARY_CSV_FILE: &str = "summary.csv";
/// Summary JSON file name inside the output directory
pub const SUMMARY_JSON_FILE: &str = "summary.json";
/// Plot location relative to the output directory
pub const PLOT_FILE: &str = "plots/idc_timeseries.png";

const PLOT_WIDTH: u32 = 1200;
const PLOT_HEIGHT: u32 = 500;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] ::image::ImageError),
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn write_summary<W: std::io::Write>(writer: W, summaries: &[ChannelSummary]) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for summary in summaries {
        csv_writer.serialize(summary)?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Summary table as CSV text (`column,min,max,mean,std`); nulls are empty fields
pub fn summary_csv_string(summaries: &[ChannelSummary]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_summary(&mut buffer, summaries)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write the summary table as CSV
pub fn write_summary_csv(path: &Path, summaries: &[ChannelSummary]) -> Result<(), ExportError> {
    write_summary(create(path)?, summaries)
}

/// Write the summary table as pretty-printed JSON
pub fn write_summary_json(path: &Path, summaries: &[ChannelSummary]) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(create(path)?, summaries)?;
    Ok(())
}

/// Render the three current channels against the selected axis.
///
/// All channels share one y scale so their relative levels stay comparable.
/// A null axis or channel value breaks the polyline at that row.
pub fn render_timeseries(outcome: &AnalysisOutcome) -> RgbaImage {
    let width = PLOT_WIDTH;
    let height = PLOT_HEIGHT;

    let mut imgbuf = RgbaImage::new(width, height);
    for pixel in imgbuf.pixels_mut() {
        *pixel = Rgba([255, 255, 255, 255]);
    }

    let chart_left = 60u32;
    let chart_right = width - 20;
    let chart_top = 20u32;
    let chart_bottom = height - 40;

    // Frame
    let frame = Rgba([120, 120, 120, 255]);
    draw_line(&mut imgbuf, chart_left, chart_top, chart_right, chart_top, frame);
    draw_line(&mut imgbuf, chart_left, chart_bottom, chart_right, chart_bottom, frame);
    draw_line(&mut imgbuf, chart_left, chart_top, chart_left, chart_bottom, frame);
    draw_line(&mut imgbuf, chart_right, chart_top, chart_right, chart_bottom, frame);

    let channels: Vec<Vec<Option<f64>>> = CurrentChannel::all()
        .iter()
        .map(|c| outcome.table.numeric_column(c.column()).unwrap_or_default())
        .collect();

    let Some((x_min, x_max)) = outcome.axis.range() else {
        return imgbuf;
    };
    let Some((y_min, y_max)) = value_range(&channels) else {
        return imgbuf;
    };

    let x_span = span(x_min, x_max);
    let y_span = span(y_min, y_max);
    let chart_width = (chart_right - chart_left) as f64;
    let chart_height = (chart_bottom - chart_top) as f64;

    for (channel, data) in CurrentChannel::all().iter().zip(channels.iter()) {
        let color = CHANNEL_COLORS[channel.index()];
        let pixel_color = Rgba([color[0], color[1], color[2], 255]);

        let mut prev: Option<(u32, u32)> = None;
        for (x_value, value) in outcome.axis.values.iter().zip(data.iter()) {
            let (Some(x_value), Some(value)) = (x_value, value) else {
                prev = None;
                continue;
            };

            let x_ratio = (x_value - x_min) / x_span;
            let y_ratio = (value - y_min) / y_span;

            let x = chart_left + (x_ratio * chart_width) as u32;
            let y = chart_bottom - (y_ratio * chart_height) as u32;

            match prev {
                Some((px, py)) => draw_line(&mut imgbuf, px, py, x, y, pixel_color),
                None => imgbuf.put_pixel(x, y, pixel_color),
            }
            prev = Some((x, y));
        }
    }

    imgbuf
}

/// Render and save the time-series plot as PNG
pub fn write_timeseries_png(path: &Path, outcome: &AnalysisOutcome) -> Result<(), ExportError> {
    render_timeseries(outcome).save(path)?;
    Ok(())
}

fn value_range(channels: &[Vec<Option<f64>>]) -> Option<(f64, f64)> {
    channels
        .iter()
        .flat_map(|c| c.iter().flatten())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Width of a range, widened to 1.0 when it collapses to a point
fn span(min: f64, max: f64) -> f64 {
    if (max - min).abs() < 0.0001 {
        1.0
    } else {
        max - min
    }
}

/// Draw a line between two points using Bresenham's algorithm
fn draw_line(img: &mut RgbaImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgba<u8>) {
    let dx = (x1 as i32 - x0 as i32).abs();
    let dy = -(y1 as i32 - y0 as i32).abs();
    let sx: i32 = if x0 < x1 { 1 } else { -1 };
    let sy: i32 = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0 as i32;
    let mut y = y0 as i32;

    let (width, height) = img.dimensions();

    loop {
        if x >= 0 && x < width as i32 && y >= 0 && y < height as i32 {
            img.put_pixel(x as u32, y as u32, color);
        }

        if x == x1 as i32 && y == y1 as i32 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
