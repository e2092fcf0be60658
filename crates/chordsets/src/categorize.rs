//! Scan a flat directory of MIDI files, bucket each one, copy it into the
//! library, and write the catalog.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::analysis::analyze_midi_file;
use crate::catalog::{Catalog, ChordSetEntry};
use crate::category::Category;
use crate::error::{Error, FileOutcome, Result};

/// Counts from one categorization run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessSummary {
    pub total_files: usize,
    pub processed: usize,
    pub failed: usize,
    pub per_category: BTreeMap<Category, usize>,
    pub catalog_path: PathBuf,
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct CategorizeRun {
    pub catalog: Catalog,
    pub summary: ProcessSummary,
}

fn is_midi_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mid") || e.eq_ignore_ascii_case("midi"))
}

/// MIDI files directly inside `source_dir`, sorted by file name.
pub fn discover_midi_files(source_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(source_dir).map_err(Error::io(source_dir))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(Error::io(source_dir))?;
        let path = entry.path();
        if path.is_file() && is_midi_path(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Create the nine category folders under `library_dir`.
pub fn create_category_dirs(library_dir: &Path) -> Result<()> {
    for category in Category::ALL {
        let dir = library_dir.join(category.dir());
        std::fs::create_dir_all(&dir).map_err(Error::io(&dir))?;
    }
    Ok(())
}

/// Analyze, classify, and copy one file.
fn categorize_file(source: &Path, library_dir: &Path) -> Result<ChordSetEntry> {
    let analysis = analyze_midi_file(source)?;
    let category = analysis.category();

    let storage_path = library_dir.join(category.dir()).join(&analysis.filename);
    std::fs::copy(source, &storage_path).map_err(Error::io(&storage_path))?;

    info!(
        file = %analysis.filename,
        category = %category,
        tempo = analysis.estimated_tempo,
        chords = analysis.chord_count,
        "categorized"
    );

    Ok(ChordSetEntry {
        original_path: source.to_path_buf(),
        storage_path,
        category,
        analysis,
    })
}

/// Categorize every MIDI file in `source_dir` into `library_dir` and
/// overwrite the catalog there.
///
/// Per-file failures (unreadable or unparsable MIDI, failed copy) are
/// logged and counted. Only an unreadable source directory or a library
/// whose folders or catalog can't be written ends the run.
pub fn process_chord_sets(source_dir: &Path, library_dir: &Path) -> Result<CategorizeRun> {
    create_category_dirs(library_dir)?;

    let files = discover_midi_files(source_dir)?;
    info!(count = files.len(), dir = %source_dir.display(), "processing chord set MIDI files");

    let mut catalog = Catalog::new(files.len());
    let mut failed = 0;

    for path in &files {
        match FileOutcome::from_result(path, categorize_file(path, library_dir)) {
            FileOutcome::Processed(entry) => catalog.push(entry),
            FileOutcome::Skipped => {}
            FileOutcome::Failed { .. } => failed += 1,
        }
    }

    let catalog_path = catalog.save(library_dir)?;
    if failed > 0 {
        warn!(failed, "some files could not be categorized");
    }
    info!(path = %catalog_path.display(), processed = catalog.chord_sets.len(), "catalog saved");

    let summary = ProcessSummary {
        total_files: files.len(),
        processed: catalog.chord_sets.len(),
        failed,
        per_category: catalog
            .categories
            .iter()
            .map(|(category, entries)| (*category, entries.len()))
            .collect(),
        catalog_path,
    };

    Ok(CategorizeRun { catalog, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extension_matching_ignores_case() {
        assert!(is_midi_path(Path::new("a.mid")));
        assert!(is_midi_path(Path::new("b.MIDI")));
        assert!(is_midi_path(Path::new("c.Mid")));
        assert!(!is_midi_path(Path::new("d.mp3")));
        assert!(!is_midi_path(Path::new("mid")));
    }

    #[test]
    fn discovery_is_flat_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.mid", "a.MIDI", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/c.mid"), b"").unwrap();

        let names: Vec<String> = discover_midi_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.MIDI", "b.mid"]);
    }

    #[test]
    fn missing_source_dir_is_run_level() {
        let dir = tempfile::tempdir().unwrap();
        let err = process_chord_sets(&dir.path().join("absent"), &dir.path().join("lib"))
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn empty_source_still_writes_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src");
        std::fs::create_dir(&source).unwrap();
        let library = dir.path().join("lib");

        let run = process_chord_sets(&source, &library).unwrap();
        assert_eq!(run.summary.total_files, 0);
        assert!(run.summary.catalog_path.exists());
        for category in Category::ALL {
            assert!(library.join(category.dir()).is_dir());
        }
    }
}
