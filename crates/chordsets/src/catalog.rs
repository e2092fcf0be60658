//! The persisted chord set catalog and filtered queries over it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisRecord;
use crate::category::Category;
use crate::error::{Error, Result};

/// File name of the catalog inside the library root.
pub const CATALOG_FILE: &str = "chord_sets_catalog.json";

/// One categorized chord set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordSetEntry {
    pub original_path: PathBuf,
    pub storage_path: PathBuf,
    pub category: Category,
    pub analysis: AnalysisRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub processed_at: DateTime<Utc>,
    /// MIDI files discovered, including ones that failed analysis.
    pub total_files: usize,
    #[serde(default)]
    pub chord_sets: Vec<ChordSetEntry>,
    /// Only categories with at least one entry appear.
    #[serde(default)]
    pub categories: BTreeMap<Category, Vec<ChordSetEntry>>,
}

impl Catalog {
    pub fn new(total_files: usize) -> Self {
        Self {
            processed_at: Utc::now(),
            total_files,
            chord_sets: Vec::new(),
            categories: BTreeMap::new(),
        }
    }

    /// Append an entry to the flat list and to its category.
    pub fn push(&mut self, entry: ChordSetEntry) {
        self.categories
            .entry(entry.category)
            .or_default()
            .push(entry.clone());
        self.chord_sets.push(entry);
    }

    pub fn path_in(library_dir: &Path) -> PathBuf {
        library_dir.join(CATALOG_FILE)
    }

    /// Write the catalog as pretty JSON, replacing any previous one.
    pub fn save(&self, library_dir: &Path) -> Result<PathBuf> {
        let path = Self::path_in(library_dir);
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::Catalog {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        std::fs::write(&path, json).map_err(Error::io(&path))?;
        Ok(path)
    }

    /// Load the catalog, or `None` if no run has written one yet.
    pub fn load(library_dir: &Path) -> Result<Option<Self>> {
        let path = Self::path_in(library_dir);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io(&path)(e)),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| Error::Catalog {
                path,
                reason: e.to_string(),
            })
    }
}

/// Constraints for [`list_chord_sets`]. The default matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChordSetFilter {
    /// Substring of the category label, e.g. `fast` or `slow-progressions/simple`.
    pub category: Option<String>,
    /// Inclusive estimated-tempo range.
    pub tempo_range: Option<(f64, f64)>,
}

impl ChordSetFilter {
    pub fn matches(&self, entry: &ChordSetEntry) -> bool {
        if let Some(needle) = &self.category {
            if !entry.category.to_string().contains(needle.as_str()) {
                return false;
            }
        }
        if let Some((min, max)) = self.tempo_range {
            let tempo = entry.analysis.estimated_tempo;
            if tempo < min || tempo > max {
                return false;
            }
        }
        true
    }
}

/// Catalog entries passing `filter`, in catalog order.
///
/// Empty when no catalog exists yet.
pub fn list_chord_sets(library_dir: &Path, filter: &ChordSetFilter) -> Result<Vec<ChordSetEntry>> {
    let Some(catalog) = Catalog::load(library_dir)? else {
        tracing::debug!(dir = %library_dir.display(), "no catalog yet");
        return Ok(Vec::new());
    };

    Ok(catalog
        .chord_sets
        .into_iter()
        .filter(|entry| filter.matches(entry))
        .collect())
}
