//! Just enough music theory to name and voice chords.
//!
//! - [`chord_templates`]: interval templates and pitch-class matching
//! - [`symbols`]: parse chord symbols ("Am7", "F#dim", "C/E") into pitches
//! - [`chordify`]: name groups of notes that start together

pub mod chord_templates;
pub mod chordify;
pub mod symbols;
pub mod types;

pub use chord_templates::{match_chord, note_name, pitch_name, ChordMatch};
pub use chordify::chordify;
pub use symbols::{parse_chord_symbol, ChordSymbol, DEFAULT_OCTAVE};
pub use types::ChordQuality;

/// Errors from chord-symbol parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("empty chord symbol")]
    Empty,

    #[error("unknown root note in '{0}'")]
    UnknownRoot(String),

    #[error("unknown chord quality '{suffix}' in '{symbol}'")]
    UnknownQuality { symbol: String, suffix: String },
}

pub type Result<T> = std::result::Result<T, Error>;
