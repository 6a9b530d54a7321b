//! Analysis settings persistence.
//!
//! Settings come from built-in defaults, optionally overridden by a JSON
//! settings file. Command-line flags are applied on top by the binary.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::analysis::{AnalysisError, FilterParameters};
use crate::normalize::ColumnAliases;
use crate::state::{DEFAULT_HEADER_SCAN_DEPTH, DEFAULT_MIN_TOTAL, DEFAULT_OUTPUT_DIR, DEFAULT_SKIP_SEC};

/// Errors reading an explicit settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

}

/// Analysis settings that persist across runs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Settings file version for migration support
    #[serde(default = "default_version")]
    pub version: u32,
    /// Seconds after the first timestamp to discard
    #[serde(default = "default_skip_sec")]
    pub skip_sec: f64,
    /// Minimum total current (A) a row must exceed
    #[serde(default = "default_min_total")]
    pub min_total: f64,
    /// Raw rows scanned for the header marker
    #[serde(default = "default_header_scan_depth")]
    pub header_scan_depth: usize,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Extra source header spellings mapped to canonical column names
    #[serde(default)]
    pub column_aliases: HashMap<String, String>,
}

fn default_version() -> u32 {
    1
}

fn default_skip_sec() -> f64 {
    DEFAULT_SKIP_SEC
}

fn default_min_total() -> f64 {
    DEFAULT_MIN_TOTAL
}

fn default_header_scan_depth() -> usize {
    DEFAULT_HEADER_SCAN_DEPTH
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            version: 1,
            skip_sec: DEFAULT_SKIP_SEC,
            min_total: DEFAULT_MIN_TOTAL,
            header_scan_depth: DEFAULT_HEADER_SCAN_DEPTH,
            output_dir: default_output_dir(),
            column_aliases: HashMap::new(),
        }
    }
}

impl AnalysisSettings {
    /// Get the config directory path for idclog
    pub fn get_config_dir() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::data_dir().map(|p| p.join("idclog"))
        }
        #[cfg(not(target_os = "macos"))]
        {
            dirs::config_dir().map(|p| p.join("idclog"))
        }
    }

    /// Get the path to the settings JSON file
    pub fn get_settings_path() -> Option<PathBuf> {
        Self::get_config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from the per-user config directory.
    ///
    /// A missing or unreadable file yields the defaults; this file is
    /// optional, unlike one named with `--config`.
    pub fn load() -> Self {
        let path = match Self::get_settings_path() {
            Some(p) => p,
            None => return Self::default(),
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring user settings: {}", e);
                Self::default()
            }
        }
    }

    /// Load settings from an explicit file
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn filter_parameters(&self) -> FilterParameters {
        FilterParameters {
            skip_sec: self.skip_sec,
            min_total: self.min_total,
        }
    }

    /// Built-in aliases merged with the user's extra aliases
    pub fn aliases(&self) -> ColumnAliases {
        ColumnAliases::with_custom(&self.column_aliases)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.filter_parameters().validate()?;
        if self.header_scan_depth == 0 {
            return Err(AnalysisError::InvalidParameter(
                "header_scan_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
