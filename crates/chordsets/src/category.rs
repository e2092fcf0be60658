//! Nine-way chord set categories: tempo bucket × chord-count bucket.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TempoBucket {
    Slow,
    Medium,
    Fast,
}

impl TempoBucket {
    pub const ALL: [TempoBucket; 3] = [TempoBucket::Slow, TempoBucket::Medium, TempoBucket::Fast];

    pub fn label(&self) -> &'static str {
        match self {
            TempoBucket::Slow => "slow-progressions",
            TempoBucket::Medium => "medium-progressions",
            TempoBucket::Fast => "fast-progressions",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComplexityBucket {
    Simple,
    Standard,
    Complex,
}

impl ComplexityBucket {
    pub const ALL: [ComplexityBucket; 3] = [
        ComplexityBucket::Simple,
        ComplexityBucket::Standard,
        ComplexityBucket::Complex,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ComplexityBucket::Simple => "simple",
            ComplexityBucket::Standard => "standard",
            ComplexityBucket::Complex => "complex",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.label() == label)
    }
}

/// Upper bound of a bucket. Values past every bound land in the fallback.
struct Threshold<B> {
    upper: f64,
    inclusive: bool,
    bucket: B,
}

impl<B: Copy> Threshold<B> {
    fn admits(&self, value: f64) -> bool {
        if self.inclusive {
            value <= self.upper
        } else {
            value < self.upper
        }
    }
}

/// Tempo in bpm: < 80 slow, 80..=140 medium, > 140 fast.
const TEMPO_THRESHOLDS: [Threshold<TempoBucket>; 2] = [
    Threshold {
        upper: 80.0,
        inclusive: false,
        bucket: TempoBucket::Slow,
    },
    Threshold {
        upper: 140.0,
        inclusive: true,
        bucket: TempoBucket::Medium,
    },
];
const TEMPO_FALLBACK: TempoBucket = TempoBucket::Fast;

/// Chord events per file: <= 4 simple, 5..=8 standard, > 8 complex.
const COMPLEXITY_THRESHOLDS: [Threshold<ComplexityBucket>; 2] = [
    Threshold {
        upper: 4.0,
        inclusive: true,
        bucket: ComplexityBucket::Simple,
    },
    Threshold {
        upper: 8.0,
        inclusive: true,
        bucket: ComplexityBucket::Standard,
    },
];
const COMPLEXITY_FALLBACK: ComplexityBucket = ComplexityBucket::Complex;

fn bucket_for<B: Copy>(table: &[Threshold<B>], fallback: B, value: f64) -> B {
    table
        .iter()
        .find(|t| t.admits(value))
        .map(|t| t.bucket)
        .unwrap_or(fallback)
}

pub fn tempo_bucket(bpm: f64) -> TempoBucket {
    bucket_for(&TEMPO_THRESHOLDS, TEMPO_FALLBACK, bpm)
}

pub fn complexity_bucket(chord_count: usize) -> ComplexityBucket {
    bucket_for(&COMPLEXITY_THRESHOLDS, COMPLEXITY_FALLBACK, chord_count as f64)
}

/// A category label such as `medium-progressions/simple`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Category {
    pub tempo: TempoBucket,
    pub complexity: ComplexityBucket,
}

impl Category {
    /// Every category, slow to fast, simple to complex.
    pub const ALL: [Category; 9] = {
        let mut all = [Category {
            tempo: TempoBucket::Slow,
            complexity: ComplexityBucket::Simple,
        }; 9];
        let mut i = 0;
        while i < 9 {
            all[i] = Category {
                tempo: TempoBucket::ALL[i / 3],
                complexity: ComplexityBucket::ALL[i % 3],
            };
            i += 1;
        }
        all
    };

    /// Relative folder for this category under the library root.
    pub fn dir(&self) -> std::path::PathBuf {
        std::path::Path::new(self.tempo.label()).join(self.complexity.label())
    }
}

/// Bucket a chord set by estimated tempo and chord count.
pub fn classify(estimated_tempo: f64, chord_count: usize) -> Category {
    Category {
        tempo: tempo_bucket(estimated_tempo),
        complexity: complexity_bucket(chord_count),
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tempo.label(), self.complexity.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tempo, complexity) = s
            .split_once('/')
            .ok_or_else(|| UnknownCategory(s.to_string()))?;
        Ok(Category {
            tempo: TempoBucket::from_label(tempo).ok_or_else(|| UnknownCategory(s.to_string()))?,
            complexity: ComplexityBucket::from_label(complexity)
                .ok_or_else(|| UnknownCategory(s.to_string()))?,
        })
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.to_string()
    }
}

impl TryFrom<String> for Category {
    type Error = UnknownCategory;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
