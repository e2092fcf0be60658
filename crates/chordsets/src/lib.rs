//! Chord set ingestion and cataloguing.
//!
//! - [`ingest`]: unpack an archive of MIDI, text, and JSON chord files into one artifact
//! - [`categorize`]: bucket a directory of MIDI files by tempo and chord count
//! - [`catalog`]: the persisted catalog and filtered listing
//! - [`generate`]: render chord symbols to a MIDI file

pub mod analysis;
pub mod catalog;
pub mod categorize;
pub mod category;
pub mod error;
pub mod generate;
pub mod ingest;
pub mod telemetry;

pub use analysis::{analyze_midi_file, AnalysisRecord};
pub use catalog::{list_chord_sets, Catalog, ChordSetEntry, ChordSetFilter, CATALOG_FILE};
pub use categorize::{process_chord_sets, CategorizeRun, ProcessSummary};
pub use category::{classify, Category, ComplexityBucket, TempoBucket};
pub use error::{Error, FileOutcome, Result};
pub use generate::{generate_midi_from_chords, DEMO_PROGRESSION};
pub use ingest::{
    is_chord_symbol, process_chord_zip, ChordSetArtifact, IngestMetadata, IngestReport,
    Progression, SourceFormat,
};
