//! Chord event detection over a single track's note events.
//!
//! A chord is reported whenever a note press leaves at least
//! [`CHORD_THRESHOLD`] pitches sounding. Every further press while the
//! threshold is met reports the grown set again; releases never report.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::note::NoteEvent;

/// Minimum number of simultaneously sounding pitches that counts as a chord.
pub const CHORD_THRESHOLD: usize = 3;

/// The set of sounding pitches at the moment a press met the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordEvent {
    pub time: u64,
    /// Distinct pitches, ascending.
    pub notes: Vec<u8>,
    #[serde(rename = "track")]
    pub track_index: usize,
}

/// Lazy chord detection over an ordered stream of note events.
///
/// Owns the active pitch set for one track; consumed once.
pub struct ChordEvents<I> {
    events: I,
    track_index: usize,
    active: BTreeSet<u8>,
}

impl<I> ChordEvents<I>
where
    I: Iterator<Item = NoteEvent>,
{
    pub fn new(events: impl IntoIterator<IntoIter = I>, track_index: usize) -> Self {
        Self {
            events: events.into_iter(),
            track_index,
            active: BTreeSet::new(),
        }
    }
}

impl<I> Iterator for ChordEvents<I>
where
    I: Iterator<Item = NoteEvent>,
{
    type Item = ChordEvent;

    fn next(&mut self) -> Option<ChordEvent> {
        for event in self.events.by_ref() {
            if event.is_press() {
                self.active.insert(event.pitch);
                if self.active.len() >= CHORD_THRESHOLD {
                    return Some(ChordEvent {
                        time: event.time,
                        notes: self.active.iter().copied().collect(),
                        track_index: self.track_index,
                    });
                }
            } else {
                // Zero-velocity note-on releases the pitch; unmatched releases are no-ops.
                self.active.remove(&event.pitch);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn detect_chords(events: &[NoteEvent], track_index: usize) -> Vec<ChordEvent> {
        ChordEvents::new(events.iter().copied(), track_index).collect()
    }

    fn chord(time: u64, notes: &[u8]) -> ChordEvent {
        ChordEvent {
            time,
            notes: notes.to_vec(),
            track_index: 0,
        }
    }

    #[test]
    fn triad_emits_once_at_third_press() {
        let events = [
            NoteEvent::on(0, 67, 100),
            NoteEvent::on(0, 60, 100),
            NoteEvent::on(0, 64, 100),
            NoteEvent::off(480, 60),
            NoteEvent::off(480, 64),
            NoteEvent::off(480, 67),
        ];

        assert_eq!(detect_chords(&events, 0), vec![chord(0, &[60, 64, 67])]);
    }

    #[test]
    fn each_press_above_threshold_emits_again() {
        let events = [
            NoteEvent::on(0, 60, 100),
            NoteEvent::on(0, 64, 100),
            NoteEvent::on(0, 67, 100),
            NoteEvent::on(10, 70, 100),
        ];

        assert_eq!(
            detect_chords(&events, 0),
            vec![chord(0, &[60, 64, 67]), chord(10, &[60, 64, 67, 70])]
        );
    }

    #[test]
    fn repeated_press_of_sounding_pitch_emits_same_set() {
        let events = [
            NoteEvent::on(0, 60, 100),
            NoteEvent::on(0, 64, 100),
            NoteEvent::on(0, 67, 100),
            NoteEvent::on(5, 64, 100),
        ];

        let chords = detect_chords(&events, 0);
        assert_eq!(chords.len(), 2);
        assert_eq!(chords[1], chord(5, &[60, 64, 67]));
    }

    #[test]
    fn releases_never_emit() {
        let events = [
            NoteEvent::on(0, 60, 100),
            NoteEvent::on(0, 62, 100),
            NoteEvent::on(0, 64, 100),
            NoteEvent::on(0, 65, 100),
            NoteEvent::off(100, 65),
            NoteEvent::on(100, 64, 0),
        ];

        let chords = detect_chords(&events, 0);
        assert_eq!(chords.len(), 2);
        assert!(chords.iter().all(|c| c.time == 0));
    }

    #[test]
    fn zero_velocity_note_on_releases() {
        let events = [
            NoteEvent::on(0, 60, 100),
            NoteEvent::on(0, 64, 100),
            NoteEvent::on(10, 60, 0),
            NoteEvent::on(20, 67, 100),
        ];

        assert!(detect_chords(&events, 0).is_empty());
    }

    #[test]
    fn unmatched_release_is_ignored() {
        let events = [
            NoteEvent::off(0, 50),
            NoteEvent::on(0, 60, 100),
            NoteEvent::on(0, 64, 100),
            NoteEvent::on(0, 67, 100),
        ];

        assert_eq!(detect_chords(&events, 0), vec![chord(0, &[60, 64, 67])]);
    }

    #[test]
    fn active_set_holds_unreleased_presses() {
        let events = vec![
            NoteEvent::on(0, 60, 100),
            NoteEvent::on(0, 64, 100),
            NoteEvent::off(10, 60),
            NoteEvent::on(20, 72, 100),
            NoteEvent::off(30, 99),
            NoteEvent::on(40, 67, 100),
        ];

        // 64 and 72 are still held when 67 arrives; the stray release is ignored
        assert_eq!(detect_chords(&events, 0), vec![chord(40, &[64, 67, 72])]);
    }

    #[test]
    fn track_index_is_carried() {
        let events = [
            NoteEvent::on(3, 48, 90),
            NoteEvent::on(3, 52, 90),
            NoteEvent::on(3, 55, 90),
        ];

        let chords = detect_chords(&events, 4);
        assert_eq!(chords[0].track_index, 4);
    }
}
