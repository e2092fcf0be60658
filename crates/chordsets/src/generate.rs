//! Render a list of chord symbols as a MIDI file, one whole note each.

use std::path::{Path, PathBuf};

use chord_theory::{parse_chord_symbol, DEFAULT_OCTAVE};
use midi_analysis::{chords_to_midi, ExportOptions};
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Progression written by `chord-ingest --generate-midi` when no chords are given.
pub const DEMO_PROGRESSION: [&str; 5] = ["C", "Am", "F", "G", "C"];

/// Default output path: `<generated_dir>/chord_progression_<N>_chords.mid`,
/// N counting the symbols requested, playable or not.
pub fn default_output_path(generated_dir: &Path, symbol_count: usize) -> PathBuf {
    generated_dir.join(format!("chord_progression_{symbol_count}_chords.mid"))
}

/// Resolve symbols to pitch sets, dropping any that don't parse.
pub fn resolve_chords<S: AsRef<str>>(symbols: &[S]) -> Vec<Vec<u8>> {
    symbols
        .iter()
        .filter_map(|symbol| match parse_chord_symbol(symbol.as_ref()) {
            Ok(chord) => Some(chord.pitches(DEFAULT_OCTAVE)),
            Err(e) => {
                warn!(symbol = symbol.as_ref(), error = %e, "skipping chord symbol");
                None
            }
        })
        .filter(|pitches| !pitches.is_empty())
        .collect()
}

/// SMF bytes for `symbols` at `tempo_bpm`.
pub fn render_chords<S: AsRef<str>>(symbols: &[S], tempo_bpm: f64) -> Result<Vec<u8>> {
    let chords = resolve_chords(symbols);
    if chords.is_empty() {
        return Err(Error::NoPlayableChords);
    }
    Ok(chords_to_midi(&chords, tempo_bpm, &ExportOptions::default()))
}

/// Write `symbols` as a MIDI file and return where it went.
///
/// With no `output`, the file lands in `generated_dir` under
/// [`default_output_path`]; the parent directory is created either way.
pub fn generate_midi_from_chords<S: AsRef<str>>(
    symbols: &[S],
    tempo_bpm: f64,
    output: Option<&Path>,
    generated_dir: &Path,
) -> Result<PathBuf> {
    let bytes = render_chords(symbols, tempo_bpm)?;

    let path = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_path(generated_dir, symbols.len()),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(Error::io(parent))?;
    }
    std::fs::write(&path, bytes).map_err(Error::io(&path))?;

    info!(path = %path.display(), chords = symbols.len(), tempo = tempo_bpm, "generated MIDI");
    Ok(path)
}
