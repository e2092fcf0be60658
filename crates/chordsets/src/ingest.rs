//! Chord set archive ingestion.
//!
//! An archive is unpacked into a temporary directory, every file in it is
//! read by the processor for its extension (MIDI, text, JSON), and the
//! results are written as one `<archive>_processed.json` artifact.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use midly::{MetaMessage, Smf, TrackEventKind};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Error, FileOutcome, Result};

/// Characters of a text file kept verbatim in its record.
pub const RAW_CONTENT_CHARS: usize = 500;

/// Time signature reported when a MIDI file declares none.
pub const DEFAULT_TIME_SIGNATURE: &str = "4/4";

const CHORD_ROOTS: [char; 7] = ['C', 'D', 'E', 'F', 'G', 'A', 'B'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    #[serde(rename = "MIDI")]
    Midi,
    #[serde(rename = "Text")]
    Text,
    #[serde(rename = "JSON")]
    Json,
}

impl SourceFormat {
    /// Format for a file extension, ignoring ASCII case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "mid" | "midi" => Some(SourceFormat::Midi),
            "txt" | "chord" => Some(SourceFormat::Text),
            "json" => Some(SourceFormat::Json),
            _ => None,
        }
    }
}

/// One successfully read file from an archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Progression {
    #[serde(rename = "MIDI")]
    Midi {
        filename: String,
        /// One name per group of notes sharing an onset.
        chord_progression: Vec<String>,
        tempo: u32,
        time_signature: String,
    },
    #[serde(rename = "Text")]
    Text {
        filename: String,
        /// Chord-like tokens, one list per line that has any.
        chord_progressions: Vec<Vec<String>>,
        raw_content: String,
    },
    #[serde(rename = "JSON")]
    Json {
        filename: String,
        data: serde_json::Value,
    },
}

impl Progression {
    pub fn format(&self) -> SourceFormat {
        match self {
            Progression::Midi { .. } => SourceFormat::Midi,
            Progression::Text { .. } => SourceFormat::Text,
            Progression::Json { .. } => SourceFormat::Json,
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            Progression::Midi { filename, .. }
            | Progression::Text { filename, .. }
            | Progression::Json { filename, .. } => filename,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestMetadata {
    /// Every regular file in the archive, recognised or not.
    pub file_count: usize,
    /// Format of each progression, in walk order.
    pub formats: Vec<SourceFormat>,
}

/// The `<archive>_processed.json` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChordSetArtifact {
    pub progressions: Vec<Progression>,
    pub metadata: IngestMetadata,
}

/// Result object printed by `chord-ingest --process-zip`.
///
/// Serializes flat, with a `success` flag taken from the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestReport {
    Success {
        chord_set_name: String,
        output_path: PathBuf,
        /// Number of progressions in the artifact.
        chord_count: usize,
        metadata: IngestMetadata,
    },
    Failure {
        error: String,
    },
}

impl IngestReport {
    pub fn failure(error: impl ToString) -> Self {
        IngestReport::Failure {
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, IngestReport::Success { .. })
    }
}

impl Serialize for IngestReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            IngestReport::Success {
                chord_set_name,
                output_path,
                chord_count,
                metadata,
            } => {
                let mut map = serializer.serialize_map(Some(5))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("chord_set_name", chord_set_name)?;
                map.serialize_entry("output_path", output_path)?;
                map.serialize_entry("chord_count", chord_count)?;
                map.serialize_entry("metadata", metadata)?;
                map.end()
            }
            IngestReport::Failure { error } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}

/// Loose chord-token test: starts with a natural note letter, or with `b`/`#`
/// followed by one.
///
/// Deliberately permissive: "Bridge" and "Ev" pass.
pub fn is_chord_symbol(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if CHORD_ROOTS.contains(&first) => true,
        Some('b' | '#') => chars.next().is_some_and(|second| CHORD_ROOTS.contains(&second)),
        _ => false,
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Integer bpm of the first Set Tempo event in track order, or 120.
///
/// Every key signature is checked on the way, so a file the analyzer would
/// reject fails here too.
fn first_tempo(smf: &Smf) -> std::result::Result<u32, midi_analysis::Error> {
    let mut tempo = None;
    for track in &smf.tracks {
        let mut tick = 0u64;
        for event in track {
            tick += event.delta.as_int() as u64;
            match event.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(usec)) if tempo.is_none() => {
                    let usec = usec.as_int();
                    if usec == 0 {
                        return Err(midi_analysis::Error::InvalidTempo { tick });
                    }
                    tempo = Some(midi_analysis::analyze::usec_to_bpm(usec) as u32);
                }
                TrackEventKind::Meta(MetaMessage::KeySignature(sharps, minor)) => {
                    midi_analysis::KeySignatureEntry::new(tick, sharps, minor)?;
                }
                _ => {}
            }
        }
    }
    Ok(tempo.unwrap_or(midi_analysis::DEFAULT_TEMPO_BPM as u32))
}

pub fn process_midi(path: &Path) -> Result<Progression> {
    let midi_error = |source| Error::Midi {
        path: path.to_path_buf(),
        source,
    };

    let bytes = std::fs::read(path).map_err(Error::io(path))?;
    let smf = Smf::parse(&bytes)
        .map_err(|e| midi_error(midi_analysis::Error::MidiParse(e.to_string())))?;

    let tempo = first_tempo(&smf).map_err(midi_error)?;
    let (notes, context) = midi_analysis::extract_notes(&smf);

    Ok(Progression::Midi {
        filename: file_name(path),
        chord_progression: chord_theory::chordify(&notes),
        tempo,
        time_signature: context
            .time_signature_label()
            .unwrap_or_else(|| DEFAULT_TIME_SIGNATURE.to_string()),
    })
}

/// `\r\n` and lone `\r` both end a line.
fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

pub fn process_text(path: &Path) -> Result<Progression> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Text {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let content = normalize_newlines(&content);

    let chord_progressions = content
        .lines()
        .map(|line| {
            line.split_whitespace()
                .filter(|token| is_chord_symbol(token))
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|tokens| !tokens.is_empty())
        .collect();

    Ok(Progression::Text {
        filename: file_name(path),
        chord_progressions,
        raw_content: content.chars().take(RAW_CONTENT_CHARS).collect(),
    })
}

pub fn process_json(path: &Path) -> Result<Progression> {
    let file = File::open(path).map_err(Error::io(path))?;
    let data = serde_json::from_reader(io::BufReader::new(file)).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Progression::Json {
        filename: file_name(path),
        data,
    })
}

fn process_file(path: &Path) -> FileOutcome<Progression> {
    let result = match SourceFormat::from_path(path) {
        Some(SourceFormat::Midi) => process_midi(path),
        Some(SourceFormat::Text) => process_text(path),
        Some(SourceFormat::Json) => process_json(path),
        None => return FileOutcome::Skipped,
    };
    FileOutcome::from_result(path, result)
}

/// Read every file under `dir`, recursively, in file-name order.
pub fn analyze_directory(dir: &Path) -> ChordSetArtifact {
    let mut artifact = ChordSetArtifact::default();

    let walker = WalkDir::new(dir).sort_by_file_name().into_iter();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        artifact.metadata.file_count += 1;
        match process_file(entry.path()) {
            FileOutcome::Processed(progression) => {
                debug!(file = %progression.filename(), format = ?progression.format(), "read");
                artifact.metadata.formats.push(progression.format());
                artifact.progressions.push(progression);
            }
            FileOutcome::Skipped => {
                debug!(path = %entry.path().display(), "unrecognised extension");
            }
            FileOutcome::Failed { .. } => {}
        }
    }

    artifact
}

/// Unpack `archive_path` into `dest`. Entries whose names would escape
/// `dest` are skipped.
pub fn extract_archive(archive_path: &Path, dest: &Path) -> Result<()> {
    let archive_error = |e: zip::result::ZipError| Error::Archive {
        path: archive_path.to_path_buf(),
        reason: e.to_string(),
    };

    let file = File::open(archive_path).map_err(Error::io(archive_path))?;
    let mut archive = zip::ZipArchive::new(io::BufReader::new(file)).map_err(archive_error)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(archive_error)?;

        let Some(relative) = entry.enclosed_name() else {
            warn!(name = %entry.name(), "skipping archive entry with unsafe path");
            continue;
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(Error::io(&out_path))?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::io(parent))?;
        }
        let mut out = File::create(&out_path).map_err(Error::io(&out_path))?;
        io::copy(&mut entry, &mut out).map_err(|e| Error::Archive {
            path: archive_path.to_path_buf(),
            reason: format!("{}: {e}", entry.name()),
        })?;
    }

    Ok(())
}

/// Ingest one archive, writing `<stem>_processed.json` into `output_dir`.
///
/// The extraction directory is removed on every return path.
pub fn ingest_archive(archive_path: &Path, output_dir: &Path) -> Result<IngestReport> {
    ingest_archive_in(archive_path, output_dir, &std::env::temp_dir())
}

/// [`ingest_archive`], extracting under `staging_parent` instead of the
/// system temp directory.
pub fn ingest_archive_in(
    archive_path: &Path,
    output_dir: &Path,
    staging_parent: &Path,
) -> Result<IngestReport> {
    let staging = tempfile::Builder::new()
        .prefix("chordset-")
        .tempdir_in(staging_parent)
        .map_err(Error::io(staging_parent))?;
    extract_archive(archive_path, staging.path())?;

    let artifact = analyze_directory(staging.path());

    let chord_set_name = archive_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    std::fs::create_dir_all(output_dir).map_err(Error::io(output_dir))?;
    let output_path = output_dir.join(format!("{chord_set_name}_processed.json"));

    let json = serde_json::to_string_pretty(&artifact).map_err(|source| Error::Json {
        path: output_path.clone(),
        source,
    })?;
    std::fs::write(&output_path, json).map_err(Error::io(&output_path))?;

    info!(
        archive = %archive_path.display(),
        output = %output_path.display(),
        progressions = artifact.progressions.len(),
        files = artifact.metadata.file_count,
        "chord set ingested"
    );

    Ok(IngestReport::Success {
        chord_set_name,
        output_path,
        chord_count: artifact.progressions.len(),
        metadata: artifact.metadata,
    })
}

/// [`ingest_archive`], with any error turned into a failure report.
pub fn process_chord_zip(archive_path: &Path, output_dir: &Path) -> IngestReport {
    ingest_archive(archive_path, output_dir).unwrap_or_else(|e| {
        tracing::error!(archive = %archive_path.display(), error = %e, "ingest failed");
        IngestReport::failure(e)
    })
}
