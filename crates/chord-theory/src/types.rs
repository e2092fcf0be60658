use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
    Suspended4,
    Suspended2,
    Dominant7,
    Major7,
    Minor7,
    MinorMajor7,
    Diminished7,
    HalfDiminished7,
    Major6,
    Minor6,
    Add9,
    Power,
}

impl ChordQuality {
    /// Suffix for chord symbol display
    pub fn suffix(&self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
            ChordQuality::Suspended4 => "sus4",
            ChordQuality::Suspended2 => "sus2",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::MinorMajor7 => "m(maj7)",
            ChordQuality::Diminished7 => "dim7",
            ChordQuality::HalfDiminished7 => "m7b5",
            ChordQuality::Major6 => "6",
            ChordQuality::Minor6 => "m6",
            ChordQuality::Add9 => "add9",
            ChordQuality::Power => "5",
        }
    }

    /// Parse a symbol suffix, accepting common alternate spellings.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        let quality = match suffix {
            "" | "maj" | "M" => ChordQuality::Major,
            "m" | "min" | "-" => ChordQuality::Minor,
            "dim" | "°" | "o" => ChordQuality::Diminished,
            "aug" | "+" => ChordQuality::Augmented,
            "sus4" | "sus" => ChordQuality::Suspended4,
            "sus2" => ChordQuality::Suspended2,
            "7" | "dom7" => ChordQuality::Dominant7,
            "maj7" | "M7" | "Δ7" | "Δ" => ChordQuality::Major7,
            "m7" | "min7" | "-7" => ChordQuality::Minor7,
            "m(maj7)" | "mMaj7" | "mM7" | "minmaj7" => ChordQuality::MinorMajor7,
            "dim7" | "°7" | "o7" => ChordQuality::Diminished7,
            "m7b5" | "ø" | "ø7" | "min7b5" => ChordQuality::HalfDiminished7,
            "6" | "maj6" => ChordQuality::Major6,
            "m6" | "min6" => ChordQuality::Minor6,
            "add9" => ChordQuality::Add9,
            "5" => ChordQuality::Power,
            _ => return None,
        };
        Some(quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_round_trips() {
        let all = [
            ChordQuality::Major,
            ChordQuality::Minor,
            ChordQuality::Diminished,
            ChordQuality::Augmented,
            ChordQuality::Suspended4,
            ChordQuality::Suspended2,
            ChordQuality::Dominant7,
            ChordQuality::Major7,
            ChordQuality::Minor7,
            ChordQuality::MinorMajor7,
            ChordQuality::Diminished7,
            ChordQuality::HalfDiminished7,
            ChordQuality::Major6,
            ChordQuality::Minor6,
            ChordQuality::Add9,
            ChordQuality::Power,
        ];
        for quality in all {
            assert_eq!(ChordQuality::from_suffix(quality.suffix()), Some(quality));
        }
    }

    #[test]
    fn aliases() {
        assert_eq!(ChordQuality::from_suffix("min"), Some(ChordQuality::Minor));
        assert_eq!(ChordQuality::from_suffix("+"), Some(ChordQuality::Augmented));
        assert_eq!(ChordQuality::from_suffix("ø"), Some(ChordQuality::HalfDiminished7));
        assert_eq!(ChordQuality::from_suffix("13#11"), None);
    }
}
