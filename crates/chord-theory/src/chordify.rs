use midi_analysis::TimedNote;

use crate::chord_templates::{match_chord, pitch_name};

/// Name every group of notes that start on the same tick.
///
/// Groups matching a chord template get its symbol ("C", "Am7"), with the
/// lowest note as bass hint. A lone pitch gets its note name ("E4");
/// anything else gets its note names joined with `-`.
///
/// `notes` must be sorted by onset, as [`midi_analysis::extract_notes`] returns them.
pub fn chordify(notes: &[TimedNote]) -> Vec<String> {
    notes
        .chunk_by(|a, b| a.onset_tick == b.onset_tick)
        .map(name_group)
        .collect()
}

fn name_group(group: &[TimedNote]) -> String {
    let mut pitches: Vec<u8> = group.iter().map(|n| n.pitch).collect();
    pitches.sort_unstable();
    pitches.dedup();

    let mut pitch_classes: Vec<u8> = Vec::new();
    for pc in pitches.iter().map(|p| p % 12) {
        if !pitch_classes.contains(&pc) {
            pitch_classes.push(pc);
        }
    }

    if pitches.len() == 1 {
        return pitch_name(pitches[0]);
    }

    let bass = pitches.first().map(|p| p % 12);
    match match_chord(&pitch_classes, bass, false) {
        Some(found) => found.symbol,
        None => pitches
            .iter()
            .map(|p| pitch_name(*p))
            .collect::<Vec<_>>()
            .join("-"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn note(pitch: u8, onset: u64) -> TimedNote {
        TimedNote {
            onset_tick: onset,
            offset_tick: onset + 480,
            pitch,
            velocity: 80,
            channel: 0,
            track_index: 0,
        }
    }

    #[test]
    fn names_simultaneous_groups() {
        let notes = vec![
            note(60, 0),
            note(64, 0),
            note(67, 0),
            note(57, 1920),
            note(60, 1920),
            note(64, 1920),
            note(67, 3840),
            note(71, 3840),
            note(74, 3840),
            note(77, 3840),
        ];

        assert_eq!(chordify(&notes), vec!["C", "Am", "G7"]);
    }

    #[test]
    fn single_pitch_uses_note_name() {
        assert_eq!(chordify(&[note(64, 0), note(62, 480)]), vec!["E4", "D4"]);
    }

    #[test]
    fn octave_doubling_is_one_pitch_class() {
        // C3 + C4 is two pitches but a single pitch class: no template matches
        assert_eq!(chordify(&[note(48, 0), note(60, 0)]), vec!["C3-C4"]);
    }

    #[test]
    fn empty_input() {
        assert!(chordify(&[]).is_empty());
    }
}
