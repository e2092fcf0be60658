//! Storage tree layout and logging settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Folder under the storage tree for ingested archive artifacts.
pub const CHORD_SETS_DIR: &str = "chord-sets";
/// Folder under the storage tree for generated MIDI files.
pub const GENERATED_DIR: &str = "generated";
/// Folder under the storage tree holding the categorized library.
pub const TEMPLATES_DIR: &str = "templates";

/// Filesystem locations read and written by the tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of the storage tree.
    /// Default: ./storage/midi
    #[serde(default = "PathsConfig::default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Flat directory of MIDI files the categorizer scans.
    /// Default: ./attached_assets
    #[serde(default = "PathsConfig::default_source_dir")]
    pub source_dir: PathBuf,
}

impl PathsConfig {
    fn default_storage_dir() -> PathBuf {
        PathBuf::from("./storage/midi")
    }

    fn default_source_dir() -> PathBuf {
        PathBuf::from("./attached_assets")
    }

    /// Where `<archive>_processed.json` artifacts land.
    pub fn ingest_dir(&self) -> PathBuf {
        self.storage_dir.join(CHORD_SETS_DIR)
    }

    /// Where generated MIDI files land by default.
    pub fn generated_dir(&self) -> PathBuf {
        self.storage_dir.join(GENERATED_DIR)
    }

    /// Root of the categorized library: nine category folders and the catalog.
    pub fn library_dir(&self) -> PathBuf {
        self.storage_dir.join(TEMPLATES_DIR).join(CHORD_SETS_DIR)
    }

    /// Create the ingest, generated, and library roots if absent.
    pub fn ensure_storage_tree(&self) -> std::io::Result<()> {
        for dir in [self.ingest_dir(), self.generated_dir(), self.library_dir()] {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            storage_dir: Self::default_storage_dir(),
            source_dir: Self::default_source_dir(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log filter (trace, debug, info, warn, error, or an EnvFilter directive).
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}
