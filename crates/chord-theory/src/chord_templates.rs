use crate::types::ChordQuality;

/// A chord template: quality enum + interval set from root (as bitmask over 12 pitch classes).
pub struct ChordTemplate {
    pub quality: ChordQuality,
    pub intervals: u16, // bitmask: bit i set means interval i is in the template
    pub size: usize,
}

impl ChordTemplate {
    const fn new(quality: ChordQuality, intervals: &[u8]) -> Self {
        let mut mask = 0u16;
        let mut i = 0;
        while i < intervals.len() {
            mask |= 1 << intervals[i];
            i += 1;
        }
        Self {
            quality,
            intervals: mask,
            size: intervals.len(),
        }
    }

    /// Semitone offsets from the root, ascending.
    pub fn semitones(&self) -> impl Iterator<Item = u8> + '_ {
        (0..12u8).filter(move |i| self.intervals & (1 << i) != 0)
    }
}

/// All recognized chord templates, ordered by specificity (larger first for tiebreaking).
pub static TEMPLATES: &[ChordTemplate] = &[
    // 4-note chords first (more specific)
    ChordTemplate::new(ChordQuality::Dominant7, &[0, 4, 7, 10]),
    ChordTemplate::new(ChordQuality::Major7, &[0, 4, 7, 11]),
    ChordTemplate::new(ChordQuality::Minor7, &[0, 3, 7, 10]),
    ChordTemplate::new(ChordQuality::MinorMajor7, &[0, 3, 7, 11]),
    ChordTemplate::new(ChordQuality::Diminished7, &[0, 3, 6, 9]),
    ChordTemplate::new(ChordQuality::HalfDiminished7, &[0, 3, 6, 10]),
    ChordTemplate::new(ChordQuality::Major6, &[0, 4, 7, 9]),
    ChordTemplate::new(ChordQuality::Minor6, &[0, 3, 7, 9]),
    ChordTemplate::new(ChordQuality::Add9, &[0, 2, 4, 7]),
    // Triads
    ChordTemplate::new(ChordQuality::Major, &[0, 4, 7]),
    ChordTemplate::new(ChordQuality::Minor, &[0, 3, 7]),
    ChordTemplate::new(ChordQuality::Diminished, &[0, 3, 6]),
    ChordTemplate::new(ChordQuality::Augmented, &[0, 4, 8]),
    ChordTemplate::new(ChordQuality::Suspended4, &[0, 5, 7]),
    ChordTemplate::new(ChordQuality::Suspended2, &[0, 2, 7]),
    // Dyad
    ChordTemplate::new(ChordQuality::Power, &[0, 7]),
];

/// The template for a quality.
pub fn template_for(quality: ChordQuality) -> &'static ChordTemplate {
    TEMPLATES
        .iter()
        .find(|t| t.quality == quality)
        .unwrap_or(&TEMPLATES[9]) // major triad
}

const NOTE_NAMES_SHARP: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const NOTE_NAMES_FLAT: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

pub fn note_name(pitch_class: u8, use_flats: bool) -> &'static str {
    let idx = (pitch_class % 12) as usize;
    if use_flats {
        NOTE_NAMES_FLAT[idx]
    } else {
        NOTE_NAMES_SHARP[idx]
    }
}

/// Note name with octave, C4 = MIDI 60.
pub fn pitch_name(pitch: u8) -> String {
    let octave = pitch as i16 / 12 - 1;
    format!("{}{}", note_name(pitch % 12, false), octave)
}

/// Best template match for a set of pitch classes.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordMatch {
    pub root_pitch_class: u8,
    pub symbol: String,
    pub quality: ChordQuality,
    pub confidence: f64,
}

/// Convert a set of pitch classes to an interval bitmask relative to a root.
fn to_interval_mask(pitch_classes: &[u8], root: u8) -> u16 {
    let mut mask = 0u16;
    for &pc in pitch_classes {
        let interval = (pc % 12 + 12 - root) % 12;
        mask |= 1 << interval;
    }
    mask
}

/// Match a set of pitch classes against chord templates.
///
/// Tries all 12 possible roots and all templates, scores by template coverage.
/// `bass_hint` biases root selection when ambiguous.
pub fn match_chord(
    pitch_classes: &[u8],
    bass_hint: Option<u8>,
    use_flats: bool,
) -> Option<ChordMatch> {
    if pitch_classes.len() < 2 {
        return None;
    }

    let mut best_root: u8 = 0;
    let mut best_score = 0.0_f64;
    let mut best_quality = ChordQuality::Major;

    for root in 0..12u8 {
        let intervals = to_interval_mask(pitch_classes, root);

        for template in TEMPLATES {
            // How many template tones are present?
            let matched = (intervals & template.intervals).count_ones() as usize;
            if matched < template.size.min(2) {
                continue;
            }

            // Score: fraction of template matched, penalize extra notes
            let extra = (intervals & !template.intervals).count_ones();
            let mut score = matched as f64 / template.size as f64 - extra as f64 * 0.1;

            // Bonus for bass hint matching root
            if let Some(bass) = bass_hint {
                if bass % 12 == root {
                    score += 0.15;
                }
            }

            // Bonus for complete match (all template tones present)
            if intervals & template.intervals == template.intervals {
                score += 0.1;
            }

            if score > best_score {
                best_score = score;
                best_root = root;
                best_quality = template.quality;
            }
        }
    }

    if best_score > 0.4 {
        let symbol = format!("{}{}", note_name(best_root, use_flats), best_quality.suffix());
        Some(ChordMatch {
            root_pitch_class: best_root,
            symbol,
            quality: best_quality,
            confidence: best_score.min(1.0),
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_major_triad() {
        let pcs = [0, 4, 7]; // C E G
        let result = match_chord(&pcs, None, false).unwrap();
        assert_eq!(result.root_pitch_class, 0);
        assert_eq!(result.symbol, "C");
        assert_eq!(result.quality, ChordQuality::Major);
    }

    #[test]
    fn d_minor_triad() {
        let pcs = [2, 5, 9]; // D F A
        let result = match_chord(&pcs, None, false).unwrap();
        assert_eq!(result.root_pitch_class, 2);
        assert_eq!(result.symbol, "Dm");
        assert_eq!(result.quality, ChordQuality::Minor);
    }

    #[test]
    fn g_dominant_7th() {
        let pcs = [7, 11, 2, 5]; // G B D F
        let result = match_chord(&pcs, None, false).unwrap();
        assert_eq!(result.root_pitch_class, 7);
        assert_eq!(result.symbol, "G7");
        assert_eq!(result.quality, ChordQuality::Dominant7);
    }

    #[test]
    fn bass_hint_disambiguates() {
        let pcs = [0, 4, 7];
        let result = match_chord(&pcs, Some(0), false).unwrap();
        assert_eq!(result.root_pitch_class, 0, "bass on C should favor C as root");
    }

    #[test]
    fn flat_spelling() {
        let pcs = [1, 5, 8]; // Db F Ab
        let result = match_chord(&pcs, None, true).unwrap();
        assert_eq!(result.symbol, "Db");
    }

    #[test]
    fn single_note_no_match() {
        assert!(match_chord(&[0], None, false).is_none());
    }

    #[test]
    fn power_chord() {
        let pcs = [0, 7]; // C G
        let result = match_chord(&pcs, None, false).unwrap();
        assert_eq!(result.symbol, "C5");
        assert_eq!(result.quality, ChordQuality::Power);
    }

    #[test]
    fn template_semitones() {
        let semis: Vec<u8> = template_for(ChordQuality::Minor7).semitones().collect();
        assert_eq!(semis, vec![0, 3, 7, 10]);
        assert_eq!(template_for(ChordQuality::Power).size, 2);
    }

    #[test]
    fn pitch_names_use_octave_four_for_middle_c() {
        assert_eq!(pitch_name(60), "C4");
        assert_eq!(pitch_name(61), "C#4");
        assert_eq!(pitch_name(0), "C-1");
        assert_eq!(pitch_name(127), "G9");
    }
}
