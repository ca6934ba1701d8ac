// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pitch-to-frequency mapping.
//!
//! Two interchangeable derivations are supported: the 12-tone equal
//! temperament formula relative to A4 = 440 Hz, and a static name to
//! frequency lookup table covering C3..B5. A generator instance picks
//! one and sticks with it.

use serde::{Deserialize, Serialize};

/// MIDI note number type (0-127)
pub type MidiNote = u8;

/// Reference pitch: A4
pub const A4_MIDI: MidiNote = 69;
pub const A4_FREQ: f64 = 440.0;

/// Note names in chromatic order (sharps only, matching the table)
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Static name -> frequency table, C3 (MIDI 48) through B5 (MIDI 83).
/// Standard rounded equal-temperament values.
const NAMED_TABLE: [(&str, f64); 36] = [
    ("C3", 130.81),
    ("C#3", 138.59),
    ("D3", 146.83),
    ("D#3", 155.56),
    ("E3", 164.81),
    ("F3", 174.61),
    ("F#3", 185.00),
    ("G3", 196.00),
    ("G#3", 207.65),
    ("A3", 220.00),
    ("A#3", 233.08),
    ("B3", 246.94),
    ("C4", 261.63),
    ("C#4", 277.18),
    ("D4", 293.66),
    ("D#4", 311.13),
    ("E4", 329.63),
    ("F4", 349.23),
    ("F#4", 369.99),
    ("G4", 392.00),
    ("G#4", 415.30),
    ("A4", 440.00),
    ("A#4", 466.16),
    ("B4", 493.88),
    ("C5", 523.25),
    ("C#5", 554.37),
    ("D5", 587.33),
    ("D#5", 622.25),
    ("E5", 659.26),
    ("F5", 698.46),
    ("F#5", 739.99),
    ("G5", 783.99),
    ("G#5", 830.61),
    ("A5", 880.00),
    ("A#5", 932.33),
    ("B5", 987.77),
];

/// First MIDI note covered by the named table (C3)
const NAMED_TABLE_BASE: MidiNote = 48;

/// Convert a MIDI note number to a frequency via 12-TET
pub fn midi_to_freq(note: MidiNote) -> f64 {
    A4_FREQ * 2f64.powf((note as f64 - A4_MIDI as f64) / 12.0)
}

/// Format a MIDI note as a name like "A4" or "C#3"
pub fn note_name(note: MidiNote) -> String {
    let octave = (note / 12) as i16 - 1;
    format!("{}{}", NOTE_NAMES[(note % 12) as usize], octave)
}

/// Parse a note name like "A4", "C#3" or "Eb5" into a MIDI note number
pub fn parse_note_name(s: &str) -> Option<MidiNote> {
    let s = s.trim();
    let split = s
        .char_indices()
        .find(|(_, c)| c.is_ascii_digit() || *c == '-')
        .map(|(i, _)| i)?;
    let (name, octave_str) = s.split_at(split);
    let octave: i16 = octave_str.parse().ok()?;

    let pc = match name.to_uppercase().as_str() {
        "C" => 0,
        "C#" | "DB" => 1,
        "D" => 2,
        "D#" | "EB" => 3,
        "E" => 4,
        "F" => 5,
        "F#" | "GB" => 6,
        "G" => 7,
        "G#" | "AB" => 8,
        "A" => 9,
        "A#" | "BB" => 10,
        "B" => 11,
        _ => return None,
    };

    let midi = (octave + 1) * 12 + pc;
    if !(0..=127).contains(&midi) {
        return None;
    }
    Some(midi as MidiNote)
}

/// Pitch source selection for a generator or synthesizer instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PitchTable {
    /// 12-TET formula from the MIDI note number
    #[default]
    EqualTemperament,
    /// Static name->frequency lookup, C3..B5 only
    NamedTable,
}

impl PitchTable {
    /// Frequency in Hz for a MIDI note, or None if the note is outside
    /// this table's range
    pub fn frequency(&self, note: MidiNote) -> Option<f64> {
        match self {
            PitchTable::EqualTemperament => Some(midi_to_freq(note)),
            PitchTable::NamedTable => {
                let idx = note.checked_sub(NAMED_TABLE_BASE)? as usize;
                NAMED_TABLE.get(idx).map(|(_, freq)| *freq)
            }
        }
    }

    /// Check whether a note is playable through this table
    pub fn covers(&self, note: MidiNote) -> bool {
        self.frequency(note).is_some()
    }
}
