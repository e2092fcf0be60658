use serde::{Deserialize, Serialize};

/// Options for rendering a chord sequence to MIDI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Ticks per quarter note. Default: 480.
    pub ppq: u16,
    /// Beats each chord is held. Default: 4 (a whole note in 4/4).
    pub beats_per_chord: u32,
    /// Note-on velocity. Default: 80.
    pub velocity: u8,
    /// MIDI channel 0–15. Default: 0.
    pub channel: u8,
    /// Track name meta event, if any.
    pub track_name: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            ppq: 480,
            beats_per_chord: 4,
            velocity: 80,
            channel: 0,
            track_name: Some("Chord Progression".to_string()),
        }
    }
}

/// Render chords, each a set of pitches held for `beats_per_chord`, as a
/// format-0 Standard MIDI File with a single tempo event.
pub fn chords_to_midi(chords: &[Vec<u8>], tempo_bpm: f64, options: &ExportOptions) -> Vec<u8> {
    let mut track = TrackWriter::new();
    let channel = options.channel.min(15);

    if let Some(name) = &options.track_name {
        track.track_name(0, name);
    }
    track.tempo_bpm(0, tempo_bpm);
    track.time_signature(0, 4, 4);

    let chord_ticks = options.ppq as u64 * options.beats_per_chord as u64;
    for (i, pitches) in chords.iter().enumerate() {
        let onset = i as u64 * chord_ticks;
        for &pitch in pitches {
            track.note_on(onset, channel, pitch.min(127), options.velocity.min(127));
        }
        for &pitch in pitches {
            track.note_off(onset + chord_ticks, channel, pitch.min(127));
        }
    }

    build_midi_file(0, options.ppq, &[track.finish()])
}

/// Accumulates absolute-tick events for one MTrk chunk.
///
/// Events at the same tick keep insertion order, except that note-offs
/// sort ahead of note-ons so back-to-back chords re-trigger cleanly.
#[derive(Debug, Default, Clone)]
pub struct TrackWriter {
    events: Vec<(u64, Vec<u8>)>,
    end_tick: u64,
}

impl TrackWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_name(&mut self, tick: u64, name: &str) -> &mut Self {
        let name_bytes = name.as_bytes();
        let mut event = vec![0xFF, 0x03];
        write_vlq(&mut event, name_bytes.len() as u32);
        event.extend_from_slice(name_bytes);
        self.push(tick, event)
    }

    pub fn tempo_usec(&mut self, tick: u64, usec: u32) -> &mut Self {
        self.push(
            tick,
            vec![
                0xFF,
                0x51,
                0x03,
                (usec >> 16) as u8,
                (usec >> 8) as u8,
                usec as u8,
            ],
        )
    }

    pub fn tempo_bpm(&mut self, tick: u64, bpm: f64) -> &mut Self {
        let usec = if bpm > 0.0 {
            (60_000_000.0 / bpm).round().clamp(1.0, 0xFF_FFFF as f64) as u32
        } else {
            500_000
        };
        self.tempo_usec(tick, usec)
    }

    pub fn time_signature(&mut self, tick: u64, numerator: u8, denominator: u8) -> &mut Self {
        let denom_pow = (denominator.max(1) as f64).log2() as u8;
        self.push(tick, vec![0xFF, 0x58, 0x04, numerator, denom_pow, 0x18, 0x08])
    }

    /// `sharps` is negative for flat keys.
    pub fn key_signature(&mut self, tick: u64, sharps: i8, minor: bool) -> &mut Self {
        self.push(tick, vec![0xFF, 0x59, 0x02, sharps as u8, minor as u8])
    }

    pub fn note_on(&mut self, tick: u64, channel: u8, pitch: u8, velocity: u8) -> &mut Self {
        self.push(tick, vec![0x90 | (channel & 0x0F), pitch & 0x7F, velocity & 0x7F])
    }

    pub fn note_off(&mut self, tick: u64, channel: u8, pitch: u8) -> &mut Self {
        self.push(tick, vec![0x80 | (channel & 0x0F), pitch & 0x7F, 0])
    }

    /// Push the End of Track event out to at least `tick`.
    pub fn end_at(&mut self, tick: u64) -> &mut Self {
        self.end_tick = self.end_tick.max(tick);
        self
    }

    fn push(&mut self, tick: u64, data: Vec<u8>) -> &mut Self {
        self.events.push((tick, data));
        self
    }

    /// Serialize to MTrk chunk data (without the chunk header).
    pub fn finish(&self) -> Vec<u8> {
        let mut events: Vec<&(u64, Vec<u8>)> = self.events.iter().collect();
        events.sort_by(|a, b| {
            a.0.cmp(&b.0).then_with(|| {
                let a_is_off = a.1.first().is_some_and(|b| b & 0xF0 == 0x80);
                let b_is_off = b.1.first().is_some_and(|b| b & 0xF0 == 0x80);
                b_is_off.cmp(&a_is_off) // note-offs first
            })
        });

        let mut track_data = Vec::new();
        let mut last_tick = 0u64;

        for (tick, data) in events {
            let delta = tick.saturating_sub(last_tick);
            write_vlq(&mut track_data, delta as u32);
            track_data.extend_from_slice(data);
            last_tick = *tick;
        }

        // End of track
        write_vlq(&mut track_data, self.end_tick.saturating_sub(last_tick) as u32);
        track_data.extend_from_slice(&[0xFF, 0x2F, 0x00]);

        track_data
    }
}

/// Assemble a complete MIDI file from track data blobs.
pub fn build_midi_file(format: u16, ppq: u16, tracks: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = Vec::new();

    // MThd header
    buf.extend_from_slice(b"MThd");
    buf.extend_from_slice(&6u32.to_be_bytes());
    buf.extend_from_slice(&format.to_be_bytes());
    buf.extend_from_slice(&(tracks.len() as u16).to_be_bytes());
    buf.extend_from_slice(&ppq.to_be_bytes());

    // MTrk chunks
    for track_data in tracks {
        buf.extend_from_slice(b"MTrk");
        buf.extend_from_slice(&(track_data.len() as u32).to_be_bytes());
        buf.extend_from_slice(track_data);
    }

    buf
}

/// Write a variable-length quantity to a byte buffer.
fn write_vlq(buf: &mut Vec<u8>, mut value: u32) {
    if value == 0 {
        buf.push(0);
        return;
    }

    let mut bytes = Vec::new();
    bytes.push((value & 0x7F) as u8);
    value >>= 7;

    while value > 0 {
        bytes.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }

    bytes.reverse();
    buf.extend_from_slice(&bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::{extract_notes, scan};
    use midly::{MetaMessage, Smf, TrackEventKind};

    #[test]
    fn chords_render_as_single_track() {
        let chords = vec![vec![60, 64, 67], vec![57, 60, 64]];
        let midi_bytes = chords_to_midi(&chords, 120.0, &ExportOptions::default());

        let smf = Smf::parse(&midi_bytes).expect("Generated MIDI should be valid");
        assert_eq!(smf.header.format, midly::Format::SingleTrack);
        assert_eq!(smf.tracks.len(), 1);

        let (notes, _) = extract_notes(&smf);
        assert_eq!(notes.len(), 6);
        assert!(notes.iter().all(|n| n.offset_tick - n.onset_tick == 1920));
        assert_eq!(notes[3].onset_tick, 1920);
        assert_eq!(notes[5].offset_tick, 3840);
    }

    #[test]
    fn tempo_and_name_written() {
        let midi_bytes = chords_to_midi(&[vec![60, 64, 67]], 90.0, &ExportOptions::default());
        let smf = Smf::parse(&midi_bytes).unwrap();

        let name = smf.tracks[0].iter().find_map(|e| match e.kind {
            TrackEventKind::Meta(MetaMessage::TrackName(bytes)) => Some(bytes.to_vec()),
            _ => None,
        });
        assert_eq!(name.as_deref(), Some(&b"Chord Progression"[..]));

        let scan = scan(&midi_bytes).unwrap();
        assert_eq!(scan.tempo_changes[0].bpm, 90.0);
        assert_eq!(scan.chord_progression.len(), 1);
    }

    #[test]
    fn back_to_back_chords_release_before_press() {
        let chords = vec![vec![60, 64, 67], vec![60, 64, 67]];
        let midi_bytes = chords_to_midi(&chords, 120.0, &ExportOptions::default());

        // Each repeated chord is detected afresh because offs precede ons
        let scan = scan(&midi_bytes).unwrap();
        assert_eq!(scan.chord_progression.len(), 2);
        assert_eq!(scan.chord_progression[1].time, 1920);
    }

    #[test]
    fn empty_progression_is_still_valid() {
        let midi_bytes = chords_to_midi(&[], 120.0, &ExportOptions::default());
        assert!(Smf::parse(&midi_bytes).is_ok());
    }

    #[test]
    fn key_signature_round_trips() {
        let mut track = TrackWriter::new();
        track.key_signature(0, -2, false).key_signature(960, 1, true);
        let midi = build_midi_file(0, 480, &[track.finish()]);

        let scan = scan(&midi).unwrap();
        let keys: Vec<&str> = scan.key_signatures.iter().map(|k| k.key.as_str()).collect();
        assert_eq!(keys, vec!["Bb", "Em"]);
    }

    #[test]
    fn vlq_encoding() {
        let mut buf = Vec::new();
        write_vlq(&mut buf, 0);
        assert_eq!(buf, vec![0x00]);

        buf.clear();
        write_vlq(&mut buf, 127);
        assert_eq!(buf, vec![0x7F]);

        buf.clear();
        write_vlq(&mut buf, 128);
        assert_eq!(buf, vec![0x81, 0x00]);

        buf.clear();
        write_vlq(&mut buf, 480);
        assert_eq!(buf, vec![0x83, 0x60]);
    }
}
