//! Fixture builders shared by the integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use midi_analysis::{build_midi_file, TrackWriter};
use zip::write::SimpleFileOptions;

/// One-track file with `chords` block chords of one beat each.
pub fn block_chords_midi(tempo_bpm: f64, chords: &[&[u8]]) -> Vec<u8> {
    let mut track = TrackWriter::new();
    track.tempo_bpm(0, tempo_bpm);
    for (i, pitches) in chords.iter().enumerate() {
        let onset = i as u64 * 480;
        for &p in pitches.iter() {
            track.note_on(onset, 0, p, 96);
        }
        for &p in pitches.iter() {
            track.note_off(onset + 480, 0, p);
        }
    }
    build_midi_file(0, 480, &[track.finish()])
}

static C_MAJOR: [u8; 3] = [60, 64, 67];

/// `count` repetitions of a C major triad.
pub fn c_major_repeated(tempo_bpm: f64, count: usize) -> Vec<u8> {
    let chords: Vec<&[u8]> = (0..count).map(|_| &C_MAJOR[..]).collect();
    block_chords_midi(tempo_bpm, &chords)
}

/// Write a zip archive with the given (name, bytes) entries.
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) -> PathBuf {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, bytes) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
    path.to_path_buf()
}
