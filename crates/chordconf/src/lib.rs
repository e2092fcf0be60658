//! Configuration loading for the chordsets tools.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/chordsets/config.toml` (system)
//! 2. `~/.config/chordsets/config.toml` (user)
//! 3. `./chordsets.toml` (local override), or the file passed with `--config`
//! 4. Environment variables (`CHORDSETS_*`, `RUST_LOG`)
//!
//! # Example Config
//!
//! ```toml
//! [paths]
//! storage_dir = "~/music/storage/midi"
//! source_dir = "./attached_assets"
//!
//! [telemetry]
//! log_level = "debug"
//! ```

pub mod loader;
pub mod paths;

pub use loader::{discover_config_files_with_override, expand_path, ConfigSources};
pub use paths::{PathsConfig, TelemetryConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete chordsets configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChordConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl ChordConfig {
    /// Load configuration from all sources and report where it came from.
    ///
    /// If `config_path` is provided, it takes precedence over the local
    /// `./chordsets.toml` override. System and user configs still load first.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = ChordConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            let file_config = loader::load_from_file(&path)?;
            config = loader::merge_configs(config, file_config);
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources, |key| std::env::var(key).ok());

        Ok((config, sources))
    }
}
