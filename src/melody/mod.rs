// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Melody data model.
//!
//! Durations are note-value denominators (4 = quarter, 8 = eighth) and
//! beat bookkeeping happens in integer ticks at 48 ticks per beat, so
//! every supported denominator has an exact length and the bar-fill
//! invariant holds without floating point drift.
//!
//! A melody has a stable textual form -- events joined by spaces, each
//! `NAME:DENOM` or `r:DENOM` for a rest (e.g. `A4:8 r:4 C5:8`) -- which
//! is what the preference log persists and re-parses.

pub mod generator;

use std::fmt;

use crate::error::{Error, Result};
use crate::music::pitch::{self, MidiNote};

/// Ticks per beat. 48 makes every denominator of a 4/4 bar exact:
/// a whole note is 192 ticks and 1,2,3,4,6,8,12,16,24,32,48 all divide it.
pub const TICKS_PER_BEAT: u32 = 48;

/// Beats per bar (4/4 time, fixed)
pub const BEATS_PER_BAR: u32 = 4;

/// Ticks in a whole note
pub const WHOLE_NOTE_TICKS: u32 = TICKS_PER_BEAT * BEATS_PER_BAR;

/// A note-value denominator: 1/d of a whole note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DurationUnit(u32);

impl DurationUnit {
    /// Create a duration unit, rejecting denominators whose beat length
    /// is not exact on the tick grid
    pub fn new(denominator: u32) -> Result<Self> {
        if denominator == 0 || WHOLE_NOTE_TICKS % denominator != 0 {
            return Err(Error::Config(format!(
                "unsupported duration denominator {} (must divide {})",
                denominator, WHOLE_NOTE_TICKS
            )));
        }
        Ok(Self(denominator))
    }

    /// The denominator d, meaning 1/d of a whole note
    pub fn denominator(self) -> u32 {
        self.0
    }

    /// Exact length in ticks
    pub fn ticks(self) -> u32 {
        WHOLE_NOTE_TICKS / self.0
    }

    /// Length in beats (derived view; ticks are authoritative)
    pub fn beats(self) -> f64 {
        self.ticks() as f64 / TICKS_PER_BEAT as f64
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an event sounds: a pitch or silence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pitch {
    /// A playable MIDI note
    Note(MidiNote),
    /// Silence for the duration
    Rest,
}

impl Pitch {
    pub fn is_rest(self) -> bool {
        matches!(self, Pitch::Rest)
    }
}

/// One step of a melody: a pitch (or rest) held for a duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub pitch: Pitch,
    pub duration: DurationUnit,
}

impl Event {
    pub fn note(note: MidiNote, duration: DurationUnit) -> Self {
        Self {
            pitch: Pitch::Note(note),
            duration,
        }
    }

    pub fn rest(duration: DurationUnit) -> Self {
        Self {
            pitch: Pitch::Rest,
            duration,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pitch {
            Pitch::Note(n) => write!(f, "{}:{}", pitch::note_name(n), self.duration),
            Pitch::Rest => write!(f, "r:{}", self.duration),
        }
    }
}

impl Event {
    /// Parse a single `NAME:DENOM` / `r:DENOM` token
    pub fn parse(token: &str) -> Result<Self> {
        let (name, denom) = token
            .split_once(':')
            .ok_or_else(|| Error::Validation(format!("malformed event token '{}'", token)))?;
        let denominator: u32 = denom
            .parse()
            .map_err(|_| Error::Validation(format!("bad duration in '{}'", token)))?;
        let duration = DurationUnit::new(denominator)
            .map_err(|_| Error::Validation(format!("bad duration in '{}'", token)))?;

        if name.eq_ignore_ascii_case("r") {
            return Ok(Event::rest(duration));
        }
        let note = pitch::parse_note_name(name)
            .ok_or_else(|| Error::Validation(format!("unknown pitch in '{}'", token)))?;
        Ok(Event::note(note, duration))
    }
}

/// An ordered sequence of events filling a fixed beat budget
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Melody {
    events: Vec<Event>,
}

impl Melody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Exact total length in ticks
    pub fn total_ticks(&self) -> u64 {
        self.events.iter().map(|e| e.duration.ticks() as u64).sum()
    }

    /// Total length in beats (derived from ticks, exact for supported units)
    pub fn total_beats(&self) -> f64 {
        self.total_ticks() as f64 / TICKS_PER_BEAT as f64
    }

    /// Real-time length in seconds at a tempo
    pub fn seconds(&self, tempo_bpm: f64) -> f64 {
        self.total_beats() * 60.0 / tempo_bpm
    }

    /// Parse the stable textual form produced by `Display`
    pub fn parse(s: &str) -> Result<Self> {
        let events = s
            .split_whitespace()
            .map(Event::parse)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { events })
    }
}

impl fmt::Display for Melody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, event) in self.events.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", event)?;
        }
        Ok(())
    }
}
