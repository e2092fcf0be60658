use crate::analyze::{KeySignatureEntry, TempoChange};

/// Tempo assumed when a file carries no Set Tempo event.
pub const DEFAULT_TEMPO_BPM: f64 = 120.0;

/// Key assumed when a file carries no Key Signature event.
pub const DEFAULT_KEY: &str = "C";

/// The first tempo change's bpm, or [`DEFAULT_TEMPO_BPM`].
pub fn estimate_tempo(tempo_changes: &[TempoChange]) -> f64 {
    tempo_changes
        .first()
        .map(|t| t.bpm)
        .unwrap_or(DEFAULT_TEMPO_BPM)
}

/// The first key signature's key, or [`DEFAULT_KEY`].
pub fn estimate_key(key_signatures: &[KeySignatureEntry]) -> String {
    key_signatures
        .first()
        .map(|k| k.key.clone())
        .unwrap_or_else(|| DEFAULT_KEY.to_string())
}
