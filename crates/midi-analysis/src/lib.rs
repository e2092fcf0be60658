pub mod analyze;
pub mod chords;
pub mod estimate;
pub mod midi_writer;
pub mod note;

pub use analyze::{
    extract_notes, scan, scan_smf, KeySignatureEntry, MidiFileContext, MidiScan, TempoChange,
};
pub use chords::{ChordEvent, ChordEvents, CHORD_THRESHOLD};
pub use estimate::{estimate_key, estimate_tempo, DEFAULT_KEY, DEFAULT_TEMPO_BPM};
pub use midi_writer::{build_midi_file, chords_to_midi, ExportOptions, TrackWriter};
pub use note::{note_events, NoteEvent, NoteKind, TimedNote};

/// Errors from MIDI analysis operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("MIDI parse error: {0}")]
    MidiParse(String),

    #[error("tempo of 0 microseconds per beat at tick {tick}")]
    InvalidTempo { tick: u64 },

    #[error("key signature with {sharps} accidentals at tick {tick}")]
    InvalidKeySignature { tick: u64, sharps: i8 },
}

pub type Result<T> = std::result::Result<T, Error>;
