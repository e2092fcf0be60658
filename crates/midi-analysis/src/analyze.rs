use crate::chords::{ChordEvent, ChordEvents};
use crate::note::{note_events, TimedNote};
use crate::{Error, Result};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Microseconds per beat when no tempo has been set (120 bpm).
const DEFAULT_TEMPO_USEC: u32 = 500_000;

/// Meter information gathered while extracting notes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MidiFileContext {
    pub time_signatures: Vec<TimeSignature>,
}

impl MidiFileContext {
    /// First time signature as `n/d`, if the file declares one.
    pub fn time_signature_label(&self) -> Option<String> {
        self.time_signatures
            .first()
            .map(|ts| format!("{}/{}", ts.numerator, ts.denominator))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSignature {
    pub tick: u64,
    pub numerator: u8,
    pub denominator: u8,
}

/// A Set Tempo event, in beats per minute rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempoChange {
    pub time: u64,
    pub bpm: f64,
}

/// A Key Signature event rendered as a key name ("C", "F#m", "Bb").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySignatureEntry {
    pub time: u64,
    pub key: String,
}

/// Everything one pass over a MIDI file yields for chord-set cataloguing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidiScan {
    pub ticks_per_beat: u16,
    pub track_count: usize,
    /// Playback length in seconds.
    pub length_seconds: f64,
    /// Chord events of every track, in track order.
    pub chord_progression: Vec<ChordEvent>,
    pub tempo_changes: Vec<TempoChange>,
    pub key_signatures: Vec<KeySignatureEntry>,
}

/// Parse MIDI bytes and scan them.
pub fn scan(midi_bytes: &[u8]) -> Result<MidiScan> {
    let smf = Smf::parse(midi_bytes).map_err(|e| Error::MidiParse(e.to_string()))?;
    scan_smf(&smf)
}

/// Walk every track collecting chord events, tempo changes, and key
/// signatures in track order.
pub fn scan_smf(smf: &Smf) -> Result<MidiScan> {
    let mut chord_progression = Vec::new();
    let mut tempo_changes = Vec::new();
    let mut key_signatures = Vec::new();
    // (tick, usec) across all tracks, for the merged tempo map
    let mut tempo_map: Vec<(u64, u32)> = Vec::new();
    let mut end_tick: u64 = 0;

    for (track_index, track) in smf.tracks.iter().enumerate() {
        let mut current_tick: u64 = 0;

        for event in track {
            current_tick += event.delta.as_int() as u64;

            match event.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => {
                    let usec = tempo.as_int();
                    if usec == 0 {
                        return Err(Error::InvalidTempo { tick: current_tick });
                    }
                    tempo_map.push((current_tick, usec));
                    tempo_changes.push(TempoChange {
                        time: current_tick,
                        bpm: round2(usec_to_bpm(usec)),
                    });
                }
                TrackEventKind::Meta(MetaMessage::KeySignature(sharps, minor)) => {
                    key_signatures.push(KeySignatureEntry::new(current_tick, sharps, minor)?);
                }
                _ => {}
            }
        }

        end_tick = end_tick.max(current_tick);
        chord_progression.extend(ChordEvents::new(note_events(track), track_index));
    }

    let (ticks_per_beat, length_seconds) = match smf.header.timing {
        Timing::Metrical(ppq) => {
            let ppq = ppq.as_int();
            (ppq, metrical_length(&mut tempo_map, end_tick, ppq))
        }
        Timing::Timecode(fps, subframes) => {
            let ticks_per_second = fps.as_f32() as f64 * subframes as f64;
            let seconds = if ticks_per_second > 0.0 {
                end_tick as f64 / ticks_per_second
            } else {
                0.0
            };
            (subframes as u16, seconds)
        }
    };

    tracing::debug!(
        tracks = smf.tracks.len(),
        chords = chord_progression.len(),
        length_seconds,
        "scanned MIDI file"
    );

    Ok(MidiScan {
        ticks_per_beat,
        track_count: smf.tracks.len(),
        length_seconds,
        chord_progression,
        tempo_changes,
        key_signatures,
    })
}

/// Seconds from tick 0 to `end_tick` under the merged tempo map.
fn metrical_length(tempo_map: &mut [(u64, u32)], end_tick: u64, ppq: u16) -> f64 {
    if ppq == 0 {
        return 0.0;
    }
    // Stable: equal ticks keep track order
    tempo_map.sort_by_key(|(tick, _)| *tick);

    let ppq = ppq as f64;
    let mut seconds = 0.0;
    let mut last_tick = 0u64;
    let mut usec = DEFAULT_TEMPO_USEC;

    for &(tick, next_usec) in tempo_map.iter() {
        let tick = tick.min(end_tick);
        seconds += (tick - last_tick) as f64 * usec as f64 / 1_000_000.0 / ppq;
        last_tick = tick;
        usec = next_usec;
    }

    seconds + (end_tick - last_tick) as f64 * usec as f64 / 1_000_000.0 / ppq
}

pub fn usec_to_bpm(usec: u32) -> f64 {
    60_000_000.0 / usec as f64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

const MAJOR_KEYS: [&str; 15] = [
    "Cb", "Gb", "Db", "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#",
];
const MINOR_KEYS: [&str; 15] = [
    "Abm", "Ebm", "Bbm", "Fm", "Cm", "Gm", "Dm", "Am", "Em", "Bm", "F#m", "C#m", "G#m", "D#m",
    "A#m",
];

/// Key name from a Key Signature's accidental count (negative = flats).
///
/// `None` outside -7..=7, which no key signature can express.
pub fn key_name(sharps: i8, minor: bool) -> Option<&'static str> {
    let table = if minor { &MINOR_KEYS } else { &MAJOR_KEYS };
    usize::try_from(sharps as i16 + 7)
        .ok()
        .and_then(|i| table.get(i))
        .copied()
}

impl KeySignatureEntry {
    /// Entry for a Key Signature event at `time`, rejecting impossible
    /// accidental counts.
    pub fn new(time: u64, sharps: i8, minor: bool) -> Result<Self> {
        let key =
            key_name(sharps, minor).ok_or(Error::InvalidKeySignature { tick: time, sharps })?;
        Ok(Self {
            time,
            key: key.to_string(),
        })
    }
}

/// Extract all notes from a parsed file, pairing note-on/note-off events.
pub fn extract_notes(smf: &Smf) -> (Vec<TimedNote>, MidiFileContext) {
    let mut all_notes = Vec::new();
    let mut time_signatures = Vec::new();

    for (track_index, track) in smf.tracks.iter().enumerate() {
        let mut current_tick: u64 = 0;
        // Map (channel, pitch) → Vec<(onset_tick, velocity)> for stacking
        let mut pending: HashMap<(u8, u8), Vec<(u64, u8)>> = HashMap::new();

        for event in track {
            current_tick += event.delta.as_int() as u64;

            match event.kind {
                TrackEventKind::Meta(MetaMessage::TimeSignature(num, denom_pow, _, _)) => {
                    time_signatures.push(TimeSignature {
                        tick: current_tick,
                        numerator: num,
                        denominator: 1u8.checked_shl(denom_pow as u32).unwrap_or(0),
                    });
                }
                TrackEventKind::Midi { channel, message } => {
                    let ch = channel.as_int();
                    match message {
                        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                            pending
                                .entry((ch, key.as_int()))
                                .or_default()
                                .push((current_tick, vel.as_int()));
                        }
                        MidiMessage::NoteOff { key, .. } | MidiMessage::NoteOn { key, .. } => {
                            let key = (ch, key.as_int());
                            if let Some((onset, velocity)) =
                                pending.get_mut(&key).and_then(|stack| stack.pop())
                            {
                                all_notes.push(TimedNote {
                                    onset_tick: onset,
                                    offset_tick: current_tick,
                                    pitch: key.1,
                                    velocity,
                                    channel: ch,
                                    track_index,
                                });
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        // Close any unclosed notes at the track's final tick
        for (&(channel, pitch), stack) in &pending {
            for &(onset, velocity) in stack {
                all_notes.push(TimedNote {
                    onset_tick: onset,
                    offset_tick: current_tick,
                    pitch,
                    velocity,
                    channel,
                    track_index,
                });
            }
        }
    }

    // Sort by onset, then pitch for determinism
    all_notes.sort_by(|a, b| a.onset_tick.cmp(&b.onset_tick).then(a.pitch.cmp(&b.pitch)));

    time_signatures.sort_by_key(|t| t.tick);
    time_signatures.dedup_by(|a, b| a.tick == b.tick);

    (all_notes, MidiFileContext { time_signatures })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi_writer::{build_midi_file, TrackWriter};
    use pretty_assertions::assert_eq;

    fn make_test_midi_format1() -> Vec<u8> {
        // Build a minimal format-1 MIDI with 2 tracks
        // Track 0: tempo + time sig
        // Track 1: a few notes on channel 0
        let mut buf = Vec::new();

        // Header: MThd, length 6, format 1, 2 tracks, 480 ppq
        buf.extend_from_slice(b"MThd");
        buf.extend_from_slice(&6u32.to_be_bytes());
        buf.extend_from_slice(&1u16.to_be_bytes()); // format 1
        buf.extend_from_slice(&2u16.to_be_bytes()); // 2 tracks
        buf.extend_from_slice(&480u16.to_be_bytes()); // 480 ppq

        // Track 0: tempo track
        let mut track0 = Vec::new();
        // Set tempo to 120 BPM (500000 usec/beat)
        track0.extend_from_slice(&[0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20]);
        // Time sig 3/4
        track0.extend_from_slice(&[0x00, 0xFF, 0x58, 0x04, 0x03, 0x02, 0x18, 0x08]);
        // Key sig A minor
        track0.extend_from_slice(&[0x00, 0xFF, 0x59, 0x02, 0x00, 0x01]);
        // End of track
        track0.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);

        buf.extend_from_slice(b"MTrk");
        buf.extend_from_slice(&(track0.len() as u32).to_be_bytes());
        buf.extend_from_slice(&track0);

        // Track 1: C4, E4, G4 pressed together, held 480 ticks, twice
        let mut track1 = Vec::new();
        for _ in 0..2 {
            track1.extend_from_slice(&[0x00, 0x90, 60, 100]);
            track1.extend_from_slice(&[0x00, 0x90, 64, 100]);
            track1.extend_from_slice(&[0x00, 0x90, 67, 100]);
            track1.extend_from_slice(&[0x83, 0x60, 0x80, 60, 0]);
            track1.extend_from_slice(&[0x00, 0x80, 64, 0]);
            track1.extend_from_slice(&[0x00, 0x90, 67, 0]);
        }
        // End of track
        track1.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);

        buf.extend_from_slice(b"MTrk");
        buf.extend_from_slice(&(track1.len() as u32).to_be_bytes());
        buf.extend_from_slice(&track1);

        buf
    }

    #[test]
    fn scan_format1() {
        let scan = scan(&make_test_midi_format1()).unwrap();

        assert_eq!(scan.ticks_per_beat, 480);
        assert_eq!(scan.track_count, 2);
        assert_eq!(scan.tempo_changes, vec![TempoChange { time: 0, bpm: 120.0 }]);
        assert_eq!(
            scan.key_signatures,
            vec![KeySignatureEntry { time: 0, key: "Am".into() }]
        );
        assert_eq!(scan.chord_progression.len(), 2);
        assert_eq!(scan.chord_progression[0].notes, vec![60, 64, 67]);
        assert_eq!(scan.chord_progression[0].track_index, 1);
        assert_eq!(scan.chord_progression[1].time, 480);
        // 960 ticks at 120 bpm, 480 ppq
        assert!((scan.length_seconds - 1.0).abs() < 1e-9);
    }

    #[test]
    fn scan_rejects_garbage() {
        assert!(matches!(scan(b"not a midi file"), Err(Error::MidiParse(_))));
    }

    #[test]
    fn tempo_rounded_to_two_decimals() {
        let mut track = TrackWriter::new();
        track.tempo_usec(0, 461_538); // ~130.0001 bpm
        track.tempo_usec(480, 700_000); // 85.714… bpm
        let midi = build_midi_file(0, 480, &[track.finish()]);

        let scan = scan(&midi).unwrap();
        assert_eq!(scan.tempo_changes[0].bpm, 130.0);
        assert_eq!(scan.tempo_changes[1].bpm, 85.71);
        assert_eq!(scan.tempo_changes[1].time, 480);
    }

    #[test]
    fn zero_tempo_is_an_error() {
        let mut track = TrackWriter::new();
        track.tempo_usec(0, 0);
        let midi = build_midi_file(0, 480, &[track.finish()]);

        assert!(matches!(scan(&midi), Err(Error::InvalidTempo { tick: 0 })));
    }

    #[test]
    fn length_follows_tempo_map() {
        // One beat at 120 bpm (0.5 s) then one beat at 60 bpm (1.0 s)
        let mut tempo = TrackWriter::new();
        tempo.tempo_bpm(0, 120.0);
        tempo.tempo_bpm(480, 60.0);
        let mut notes = TrackWriter::new();
        notes.note_on(0, 0, 60, 90);
        notes.note_off(960, 0, 60);
        let midi = build_midi_file(1, 480, &[tempo.finish(), notes.finish()]);

        let scan = scan(&midi).unwrap();
        assert!((scan.length_seconds - 1.5).abs() < 1e-9);
    }

    #[test]
    fn length_without_tempo_uses_default() {
        let mut notes = TrackWriter::new();
        notes.note_on(0, 0, 60, 90);
        notes.note_off(1920, 0, 60);
        let midi = build_midi_file(0, 480, &[notes.finish()]);

        let scan = scan(&midi).unwrap();
        assert!(scan.tempo_changes.is_empty());
        assert!((scan.length_seconds - 2.0).abs() < 1e-9);
    }

    #[test]
    fn chord_progression_in_track_order() {
        let mut late = TrackWriter::new();
        for pitch in [50, 53, 57] {
            late.note_on(0, 0, pitch, 80);
        }
        let mut early = TrackWriter::new();
        for pitch in [60, 64, 67] {
            early.note_on(960, 1, pitch, 80);
        }
        let midi = build_midi_file(1, 480, &[early.finish(), late.finish()]);

        let scan = scan(&midi).unwrap();
        let tracks: Vec<usize> = scan.chord_progression.iter().map(|c| c.track_index).collect();
        assert_eq!(tracks, vec![0, 1]);
        assert_eq!(scan.chord_progression[0].time, 960);
    }

    #[test]
    fn key_names() {
        assert_eq!(key_name(0, false), Some("C"));
        assert_eq!(key_name(-1, false), Some("F"));
        assert_eq!(key_name(2, false), Some("D"));
        assert_eq!(key_name(-3, true), Some("Cm"));
        assert_eq!(key_name(3, true), Some("F#m"));
        assert_eq!(key_name(7, false), Some("C#"));
        assert_eq!(key_name(-7, true), Some("Abm"));
        assert_eq!(key_name(8, false), None);
        assert_eq!(key_name(-8, true), None);
    }

    #[test]
    fn impossible_key_signature_is_an_error() {
        let mut track = TrackWriter::new();
        track.key_signature(240, 9, false);
        let midi = build_midi_file(0, 480, &[track.finish()]);

        assert!(matches!(
            scan(&midi),
            Err(Error::InvalidKeySignature { tick: 240, sharps: 9 })
        ));
    }

    #[test]
    fn extract_notes_from_format1() {
        let midi = make_test_midi_format1();
        let smf = Smf::parse(&midi).unwrap();
        let (notes, context) = extract_notes(&smf);

        assert_eq!(context.time_signature_label().as_deref(), Some("3/4"));
        assert_eq!(notes.len(), 6);

        // All notes on track 1
        assert!(notes.iter().all(|n| n.track_index == 1));

        assert_eq!(notes[0].pitch, 60);
        assert_eq!(notes[1].pitch, 64);
        assert_eq!(notes[2].pitch, 67);

        // Each note is 480 ticks long, including the zero-velocity release
        assert!(notes.iter().all(|n| n.offset_tick - n.onset_tick == 480));
    }

    #[test]
    fn unclosed_notes_end_at_track_end() {
        let mut track = TrackWriter::new();
        track.note_on(0, 3, 62, 70);
        track.note_on(240, 3, 65, 70);
        track.note_off(480, 3, 65);
        track.end_at(960);
        let midi = build_midi_file(0, 480, &[track.finish()]);
        let smf = Smf::parse(&midi).unwrap();

        let (notes, context) = extract_notes(&smf);
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].offset_tick, 960);
        assert_eq!(notes[0].channel, 3);
        assert!(context.time_signature_label().is_none());
    }
}
