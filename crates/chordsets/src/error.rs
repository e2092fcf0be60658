//! Error types for the chordsets tools.
//!
//! Two tiers:
//! - Per-file errors (unreadable MIDI, bad JSON, non-UTF-8 text): logged,
//!   the file is left out, the run continues. See [`FileOutcome`].
//! - Run-level errors (archive won't open, storage not writable): end the
//!   run and surface as a failure result.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read archive '{path}': {reason}")]
    Archive { path: PathBuf, reason: String },

    #[error("MIDI analysis failed for '{path}': {source}")]
    Midi {
        path: PathBuf,
        #[source]
        source: midi_analysis::Error,
    },

    #[error("invalid JSON in '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot read text file '{path}': {reason}")]
    Text { path: PathBuf, reason: String },

    #[error("catalog '{path}' is unusable: {reason}")]
    Catalog { path: PathBuf, reason: String },

    #[error("none of the chord symbols could be resolved to pitches")]
    NoPlayableChords,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// `map_err` adapter attaching `path` to an I/O error.
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
        move |source| Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// What happened to one input file in a batch.
#[derive(Debug)]
pub enum FileOutcome<T> {
    /// Parsed; the value joins the output.
    Processed(T),
    /// Not a format this pipeline reads.
    Skipped,
    /// Reading or analysis failed; the file is left out.
    Failed { path: PathBuf, reason: String },
}

impl<T> FileOutcome<T> {
    /// Fold a per-file result into an outcome, logging failures.
    pub fn from_result(path: &Path, result: Result<T>) -> Self {
        match result {
            Ok(value) => FileOutcome::Processed(value),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping file");
                FileOutcome::Failed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            }
        }
    }
}
