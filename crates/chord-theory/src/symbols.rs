use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chord_templates::{note_name, template_for};
use crate::types::ChordQuality;
use crate::{Error, Result};

/// Octave the root of a resolved chord sits in (C4 = MIDI 60).
pub const DEFAULT_OCTAVE: i8 = 4;

/// A parsed chord symbol such as `Am7`, `F#dim`, or `C/E`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordSymbol {
    pub root: u8,
    pub quality: ChordQuality,
    /// Slash bass pitch class, when different from the root.
    pub bass: Option<u8>,
    /// Spell with flats when rendering back to text.
    pub flats: bool,
}

impl ChordSymbol {
    /// MIDI pitches in close position with the root in `octave`.
    ///
    /// A slash bass sits below the root. Pitches outside 0–127 are dropped.
    pub fn pitches(&self, octave: i8) -> Vec<u8> {
        let root_midi = (octave as i16 + 1) * 12 + self.root as i16;
        let mut pitches: Vec<i16> = Vec::new();

        if let Some(bass) = self.bass {
            let below = (self.root as i16 - bass as i16).rem_euclid(12);
            let below = if below == 0 { 12 } else { below };
            pitches.push(root_midi - below);
        }

        pitches.extend(
            template_for(self.quality)
                .semitones()
                .map(|s| root_midi + s as i16),
        );

        pitches
            .into_iter()
            .filter_map(|p| u8::try_from(p).ok())
            .filter(|p| *p <= 127)
            .collect()
    }
}

impl fmt::Display for ChordSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", note_name(self.root, self.flats), self.quality.suffix())?;
        if let Some(bass) = self.bass {
            write!(f, "/{}", note_name(bass, self.flats))?;
        }
        Ok(())
    }
}

impl FromStr for ChordSymbol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_chord_symbol(s)
    }
}

/// Parse a chord symbol: root letter, accidentals, quality suffix, optional `/bass`.
pub fn parse_chord_symbol(symbol: &str) -> Result<ChordSymbol> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(Error::Empty);
    }

    let (head, bass_text) = match symbol.split_once('/') {
        Some((head, bass)) => (head, Some(bass)),
        None => (symbol, None),
    };

    let (root, flats, suffix) =
        parse_note(head).ok_or_else(|| Error::UnknownRoot(symbol.to_string()))?;

    let quality = ChordQuality::from_suffix(suffix).ok_or_else(|| Error::UnknownQuality {
        symbol: symbol.to_string(),
        suffix: suffix.to_string(),
    })?;

    let bass = match bass_text {
        Some(text) => match parse_note(text) {
            Some((pc, _, "")) => Some(pc),
            _ => return Err(Error::UnknownRoot(symbol.to_string())),
        },
        None => None,
    };

    Ok(ChordSymbol {
        root,
        quality,
        bass: bass.filter(|b| *b != root),
        flats,
    })
}

/// Split a leading note name off `text`: (pitch class, spelled with flats, rest).
fn parse_note(text: &str) -> Option<(u8, bool, &str)> {
    let mut chars = text.char_indices();
    let (_, letter) = chars.next()?;
    let natural: i16 = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let mut offset = 0i16;
    let mut flats = false;
    let mut rest_start = letter.len_utf8();
    for (idx, c) in chars {
        match c {
            '#' | '♯' => offset += 1,
            'b' | '♭' => {
                offset -= 1;
                flats = true;
            }
            _ => {
                rest_start = idx;
                break;
            }
        }
        rest_start = idx + c.len_utf8();
    }

    let pitch_class = (natural + offset).rem_euclid(12) as u8;
    Some((pitch_class, flats, &text[rest_start..]))
}
