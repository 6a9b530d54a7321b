//! idclog - Batch analyzer for three-channel DC current logs
//!
//! This library loads CSV exports from DC current data loggers, normalizes
//! their headers into a fixed schema, filters the run by elapsed time and
//! load, and produces per-channel summaries, a time-series plot, and a
//! Markdown report.
//!
//! ## Module Structure
//!
//! - [`parsers`] - Header location and CSV loading into a [`parsers::LogTable`]
//! - [`normalize`] - Column alias resolution into canonical names
//! - [`analysis`] - Timestamps, row filters, axis selection, and summaries
//! - [`export`] - Summary table and PNG plot output
//! - [`report`] - Markdown run report
//! - [`settings`] - Analysis settings persistence
//! - [`state`] - Core schema types and constants

pub mod analysis;
pub mod export;
pub mod normalize;
pub mod parsers;
pub mod report;
pub mod settings;
pub mod state;
