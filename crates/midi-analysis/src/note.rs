use midly::{MidiMessage, TrackEvent, TrackEventKind};
use serde::{Deserialize, Serialize};

/// Whether a note event starts or releases a pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    On,
    Off,
}

/// A note-on or note-off at an absolute tick within one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub time: u64,
    pub pitch: u8,
    pub velocity: u8,
    pub kind: NoteKind,
}

impl NoteEvent {
    pub fn on(time: u64, pitch: u8, velocity: u8) -> Self {
        Self {
            time,
            pitch,
            velocity,
            kind: NoteKind::On,
        }
    }

    pub fn off(time: u64, pitch: u8) -> Self {
        Self {
            time,
            pitch,
            velocity: 0,
            kind: NoteKind::Off,
        }
    }

    /// A note-on with positive velocity. Zero-velocity note-ons are releases.
    pub fn is_press(&self) -> bool {
        self.kind == NoteKind::On && self.velocity > 0
    }
}

/// Derive note events from a raw track by accumulating delta times.
///
/// Events keep file order, so simultaneous events at the same tick are
/// never reordered.
pub fn note_events(track: &[TrackEvent]) -> Vec<NoteEvent> {
    let mut current_tick: u64 = 0;
    let mut events = Vec::new();

    for event in track {
        current_tick += event.delta.as_int() as u64;

        if let TrackEventKind::Midi { message, .. } = event.kind {
            match message {
                MidiMessage::NoteOn { key, vel } => {
                    events.push(NoteEvent::on(current_tick, key.as_int(), vel.as_int()));
                }
                MidiMessage::NoteOff { key, .. } => {
                    events.push(NoteEvent::off(current_tick, key.as_int()));
                }
                _ => {}
            }
        }
    }

    events
}

/// A single MIDI note with absolute tick timing and source metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedNote {
    pub onset_tick: u64,
    pub offset_tick: u64,
    pub pitch: u8,
    pub velocity: u8,
    pub channel: u8,
    pub track_index: usize,
}
