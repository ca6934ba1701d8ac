// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scales and pitch pools.
//!
//! A scale here exists to answer one question: which MIDI notes inside a
//! bounded range are playable for a given key. The generator draws from
//! that pool.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::pitch::MidiNote;

/// Semitone offset type
pub type Semitones = i8;

/// Note names (pitch classes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Note {
    C,
    Cs, // C# / Db
    D,
    Ds, // D# / Eb
    E,
    F,
    Fs, // F# / Gb
    G,
    Gs, // G# / Ab
    A,
    As, // A# / Bb
    B,
}

impl Note {
    /// All notes in chromatic order
    pub const ALL: [Note; 12] = [
        Note::C,
        Note::Cs,
        Note::D,
        Note::Ds,
        Note::E,
        Note::F,
        Note::Fs,
        Note::G,
        Note::Gs,
        Note::A,
        Note::As,
        Note::B,
    ];

    /// Get the pitch class (0-11) for this note
    pub fn pitch_class(self) -> u8 {
        Note::ALL.iter().position(|&n| n == self).unwrap() as u8
    }

    /// Get note from pitch class
    pub fn from_pitch_class(pc: u8) -> Self {
        Note::ALL[(pc % 12) as usize]
    }

    /// Parse note from string (e.g., "C", "C#", "Db", "F#")
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_uppercase();
        match s.as_str() {
            "C" => Some(Note::C),
            "C#" | "CS" | "DB" => Some(Note::Cs),
            "D" => Some(Note::D),
            "D#" | "DS" | "EB" => Some(Note::Ds),
            "E" => Some(Note::E),
            "F" => Some(Note::F),
            "F#" | "FS" | "GB" => Some(Note::Fs),
            "G" => Some(Note::G),
            "G#" | "GS" | "AB" => Some(Note::Gs),
            "A" => Some(Note::A),
            "A#" | "AS" | "BB" => Some(Note::As),
            "B" => Some(Note::B),
            _ => None,
        }
    }

    /// Transpose by semitones
    pub fn transpose(self, semitones: Semitones) -> Self {
        let new_pc = (self.pitch_class() as i8 + semitones).rem_euclid(12) as u8;
        Note::from_pitch_class(new_pc)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 12] = [
            "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
        ];
        write!(f, "{}", NAMES[self.pitch_class() as usize])
    }
}

/// Scale types supported by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleType {
    Major,
    NaturalMinor,
    MajorPentatonic,
    MinorPentatonic,
    Chromatic,
}

impl ScaleType {
    /// Get the intervals (semitones from root) for this scale type
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ScaleType::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleType::NaturalMinor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleType::MajorPentatonic => &[0, 2, 4, 7, 9],
            ScaleType::MinorPentatonic => &[0, 3, 5, 7, 10],
            ScaleType::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        }
    }

    /// Parse scale type from string
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase().replace([' ', '-', '_'], "");
        match s.as_str() {
            "major" | "ionian" => Some(ScaleType::Major),
            "minor" | "naturalminor" | "aeolian" => Some(ScaleType::NaturalMinor),
            "majorpentatonic" | "pentatonicmajor" => Some(ScaleType::MajorPentatonic),
            "minorpentatonic" | "pentatonicminor" | "pentatonic" => {
                Some(ScaleType::MinorPentatonic)
            }
            "chromatic" => Some(ScaleType::Chromatic),
            _ => None,
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            ScaleType::Major => "Major",
            ScaleType::NaturalMinor => "Natural Minor",
            ScaleType::MajorPentatonic => "Major Pentatonic",
            ScaleType::MinorPentatonic => "Minor Pentatonic",
            ScaleType::Chromatic => "Chromatic",
        }
    }
}

/// A complete scale with root and type
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    root: Note,
    scale_type: ScaleType,
    notes: Vec<Note>,
}

impl Scale {
    /// Create a new scale from root and type
    pub fn new(root: Note, scale_type: ScaleType) -> Self {
        let notes = scale_type
            .intervals()
            .iter()
            .map(|&i| root.transpose(i as Semitones))
            .collect();
        Self {
            root,
            scale_type,
            notes,
        }
    }

    /// Parse a scale from strings (e.g., "C", "major")
    pub fn parse(root_str: &str, scale_str: &str) -> Option<Self> {
        let root = Note::from_str(root_str)?;
        let scale_type = ScaleType::from_str(scale_str)?;
        Some(Scale::new(root, scale_type))
    }

    /// Get the root note
    pub fn root(&self) -> Note {
        self.root
    }

    /// Get the scale type
    pub fn scale_type(&self) -> ScaleType {
        self.scale_type
    }

    /// Check if a note is in this scale
    pub fn contains(&self, note: Note) -> bool {
        self.notes.contains(&note)
    }

    /// Check if a MIDI note is in this scale
    pub fn contains_midi(&self, midi_note: MidiNote) -> bool {
        self.contains(Note::from_pitch_class(midi_note % 12))
    }

    /// All MIDI notes of this scale within an inclusive range.
    ///
    /// This is the generator's pitch pool; the default session bounds a
    /// C major pool to E3..E5, as the original app did.
    pub fn midi_notes_in_range(&self, low: MidiNote, high: MidiNote) -> Vec<MidiNote> {
        (low..=high).filter(|&n| self.contains_midi(n)).collect()
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.root, self.scale_type.name())
    }
}
