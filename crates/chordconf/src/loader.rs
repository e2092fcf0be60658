//! Config file discovery, loading, and environment variable overlay.

use crate::{ChordConfig, ConfigError, PathsConfig, TelemetryConfig};
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
/// Returns paths in load order (system, user, local/cli).
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    // System config
    let system = PathBuf::from("/etc/chordsets/config.toml");
    if system.exists() {
        files.push(system);
    }

    // User config (XDG_CONFIG_HOME or ~/.config)
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("chordsets/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    // CLI override takes precedence over local
    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    // Local override (current directory)
    let local = PathBuf::from("chordsets.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Load config from a TOML file.
pub fn load_from_file(path: &Path) -> Result<ChordConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_toml(&contents, path)
}

/// Parse config from TOML string. Missing keys take their defaults.
fn parse_toml(contents: &str, path: &Path) -> Result<ChordConfig, ConfigError> {
    let mut config: ChordConfig =
        toml::from_str(contents).map_err(|e: toml::de::Error| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    config.paths.storage_dir = expand_path(&config.paths.storage_dir.to_string_lossy());
    config.paths.source_dir = expand_path(&config.paths.source_dir.to_string_lossy());

    Ok(config)
}

/// Merge two configs, with `overlay` taking precedence wherever it differs
/// from the compiled default.
pub fn merge_configs(base: ChordConfig, overlay: ChordConfig) -> ChordConfig {
    let default_paths = PathsConfig::default();
    let default_telemetry = TelemetryConfig::default();

    ChordConfig {
        paths: PathsConfig {
            storage_dir: if overlay.paths.storage_dir != default_paths.storage_dir {
                overlay.paths.storage_dir
            } else {
                base.paths.storage_dir
            },
            source_dir: if overlay.paths.source_dir != default_paths.source_dir {
                overlay.paths.source_dir
            } else {
                base.paths.source_dir
            },
        },
        telemetry: TelemetryConfig {
            log_level: if overlay.telemetry.log_level != default_telemetry.log_level {
                overlay.telemetry.log_level
            } else {
                base.telemetry.log_level
            },
        },
    }
}

/// Apply environment variable overrides to config.
///
/// `lookup` resolves a variable name; pass `|k| std::env::var(k).ok()` for
/// the process environment.
pub fn apply_env_overrides(
    config: &mut ChordConfig,
    sources: &mut ConfigSources,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(v) = lookup("CHORDSETS_STORAGE_DIR") {
        config.paths.storage_dir = expand_path(&v);
        sources.env_overrides.push("CHORDSETS_STORAGE_DIR".to_string());
    }
    if let Some(v) = lookup("CHORDSETS_SOURCE_DIR") {
        config.paths.source_dir = expand_path(&v);
        sources.env_overrides.push("CHORDSETS_SOURCE_DIR".to_string());
    }
    if let Some(v) = lookup("CHORDSETS_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("CHORDSETS_LOG_LEVEL".to_string());
    }
    // Also support RUST_LOG
    if let Some(v) = lookup("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            home.join(stripped)
        } else {
            PathBuf::from(path)
        }
    } else if let Some(stripped) = path.strip_prefix('$') {
        // Handle $VAR/rest/of/path
        if let Some(slash_pos) = stripped.find('/') {
            let var_name = &stripped[..slash_pos];
            if let Ok(var_value) = std::env::var(var_name) {
                PathBuf::from(var_value).join(&stripped[slash_pos + 1..])
            } else {
                PathBuf::from(path)
            }
        } else {
            std::env::var(stripped)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(path))
        }
    } else {
        PathBuf::from(path)
    }
}
