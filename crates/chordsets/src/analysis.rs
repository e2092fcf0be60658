use std::path::Path;

use midi_analysis::{
    estimate_key, estimate_tempo, ChordEvent, KeySignatureEntry, MidiScan, TempoChange,
};
use serde::{Deserialize, Serialize};

use crate::category::{classify, Category};
use crate::error::{Error, Result};

/// Per-file analysis of a chord set MIDI file, as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub filename: String,
    /// Playback length in seconds.
    pub length: f64,
    pub ticks_per_beat: u16,
    pub num_tracks: usize,
    pub chord_progression: Vec<ChordEvent>,
    pub key_signatures: Vec<KeySignatureEntry>,
    pub tempo_changes: Vec<TempoChange>,
    pub estimated_tempo: f64,
    pub estimated_key: String,
    pub chord_count: usize,
}

impl AnalysisRecord {
    pub fn from_scan(filename: impl Into<String>, scan: MidiScan) -> Self {
        let estimated_tempo = estimate_tempo(&scan.tempo_changes);
        let estimated_key = estimate_key(&scan.key_signatures);
        Self {
            filename: filename.into(),
            length: scan.length_seconds,
            ticks_per_beat: scan.ticks_per_beat,
            num_tracks: scan.track_count,
            chord_count: scan.chord_progression.len(),
            chord_progression: scan.chord_progression,
            key_signatures: scan.key_signatures,
            tempo_changes: scan.tempo_changes,
            estimated_tempo,
            estimated_key,
        }
    }

    pub fn category(&self) -> Category {
        classify(self.estimated_tempo, self.chord_count)
    }
}

/// Read and analyze one MIDI file.
pub fn analyze_midi_file(path: &Path) -> Result<AnalysisRecord> {
    let bytes = std::fs::read(path).map_err(Error::io(path))?;
    let scan = midi_analysis::scan(&bytes).map_err(|source| Error::Midi {
        path: path.to_path_buf(),
        source,
    })?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let record = AnalysisRecord::from_scan(filename, scan);
    tracing::debug!(
        path = %path.display(),
        chords = record.chord_count,
        tempo = record.estimated_tempo,
        key = %record.estimated_key,
        "analyzed"
    );
    Ok(record)
}
