// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Random melody generator.
//!
//! Fills an exact beat budget with uniformly drawn (pitch, duration)
//! events. Parameters are validated once at construction; each call
//! takes its own seedable RNG so runs are reproducible in tests.

use rand::rngs::StdRng;
use rand::Rng;

use super::{DurationUnit, Event, Melody, Pitch, TICKS_PER_BEAT};
use crate::error::{Error, Result};
use crate::music::pitch::{note_name, MidiNote, PitchTable};

/// How to handle a drawn duration that overshoots the remaining budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FillPolicy {
    /// Substitute the smallest available unit for the overshooting draw.
    /// Terminates without retries and always lands exactly on the budget.
    #[default]
    ClampToSmallest,
    /// Discard the draw and redraw, up to a bounded retry count; after
    /// that the smallest unit is taken. Only valid because construction
    /// guarantees the smallest unit always fits.
    StrictFit,
}

/// Bounded redraws for `FillPolicy::StrictFit`
const MAX_REDRAWS: u32 = 32;

/// Validated generator parameters
#[derive(Debug, Clone)]
pub struct GeneratorParams {
    /// Beat budget per melody (16 = 4 bars, 32 = 8 bars)
    pub target_beats: u32,
    /// Allowed duration denominators
    pub durations: Vec<DurationUnit>,
    /// MIDI notes to draw from
    pub pitch_pool: Vec<MidiNote>,
    /// Probability that an event is a rest instead of a note
    pub rest_weight: f64,
    /// Overshoot handling
    pub fill_policy: FillPolicy,
    /// Pitch source used when rendering or validating pool membership
    pub pitch_table: PitchTable,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        // Original app defaults: 4 bars of eighth notes over a bounded
        // C major pool, no rests.
        Self {
            target_beats: 16,
            durations: vec![DurationUnit::new(8).expect("8 divides the grid")],
            pitch_pool: crate::music::Scale::new(
                crate::music::Note::C,
                crate::music::ScaleType::Major,
            )
            .midi_notes_in_range(52, 76),
            rest_weight: 0.0,
            fill_policy: FillPolicy::ClampToSmallest,
            pitch_table: PitchTable::EqualTemperament,
        }
    }
}

/// Melody generator with eagerly validated parameters
#[derive(Debug, Clone)]
pub struct MelodyGenerator {
    params: GeneratorParams,
    smallest: DurationUnit,
}

impl MelodyGenerator {
    /// Create a generator, validating all parameters up front.
    ///
    /// Fails with a configuration error if the duration set or pitch pool
    /// is empty, a pool pitch is outside the pitch table, the rest weight
    /// is not a probability, or the duration grid cannot land exactly on
    /// the beat budget under the fill policy.
    pub fn new(params: GeneratorParams) -> Result<Self> {
        if params.durations.is_empty() {
            return Err(Error::Config("allowed duration set is empty".to_string()));
        }
        if params.pitch_pool.is_empty() {
            return Err(Error::Config("pitch pool is empty".to_string()));
        }
        if params.target_beats == 0 {
            return Err(Error::Config("target beats must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&params.rest_weight) {
            return Err(Error::Config(format!(
                "rest weight {} is not a probability",
                params.rest_weight
            )));
        }
        for &note in &params.pitch_pool {
            if !params.pitch_table.covers(note) {
                return Err(Error::Config(format!(
                    "pool pitch {} is outside the {:?} table",
                    note_name(note),
                    params.pitch_table
                )));
            }
        }

        let smallest = *params
            .durations
            .iter()
            .min_by_key(|d| d.ticks())
            .expect("non-empty");

        // Both policies rely on every accepted draw keeping the remaining
        // budget a multiple of the smallest unit: the smallest then always
        // fits (StrictFit terminates) and clamping never overshoots.
        let target_ticks = params.target_beats as u64 * TICKS_PER_BEAT as u64;
        if target_ticks % smallest.ticks() as u64 != 0 {
            return Err(Error::Config(format!(
                "smallest duration 1/{} does not divide {} beats",
                smallest.denominator(),
                params.target_beats
            )));
        }
        for &d in &params.durations {
            if d.ticks() % smallest.ticks() != 0 {
                return Err(Error::Config(format!(
                    "duration 1/{} is not a multiple of the smallest unit 1/{}",
                    d.denominator(),
                    smallest.denominator()
                )));
            }
        }

        Ok(Self { params, smallest })
    }

    /// Validated parameters
    pub fn params(&self) -> &GeneratorParams {
        &self.params
    }

    /// Exact tick budget per melody
    pub fn target_ticks(&self) -> u64 {
        self.params.target_beats as u64 * TICKS_PER_BEAT as u64
    }

    /// Generate one melody whose event lengths sum exactly to the budget
    pub fn generate(&self, rng: &mut StdRng) -> Melody {
        let mut melody = Melody::new();
        let mut remaining = self.target_ticks();

        while remaining > 0 {
            let duration = self.draw_duration(remaining, rng);
            let pitch = if self.params.rest_weight > 0.0
                && rng.gen::<f64>() < self.params.rest_weight
            {
                Pitch::Rest
            } else {
                let idx = rng.gen_range(0..self.params.pitch_pool.len());
                Pitch::Note(self.params.pitch_pool[idx])
            };
            melody.push(Event { pitch, duration });
            remaining -= duration.ticks() as u64;
        }

        debug_assert_eq!(melody.total_ticks(), self.target_ticks());
        melody
    }

    fn draw_duration(&self, remaining: u64, rng: &mut StdRng) -> DurationUnit {
        let durations = &self.params.durations;
        let drawn = durations[rng.gen_range(0..durations.len())];
        if drawn.ticks() as u64 <= remaining {
            return drawn;
        }

        match self.params.fill_policy {
            FillPolicy::ClampToSmallest => self.smallest,
            FillPolicy::StrictFit => {
                for _ in 0..MAX_REDRAWS {
                    let redrawn = durations[rng.gen_range(0..durations.len())];
                    if redrawn.ticks() as u64 <= remaining {
                        return redrawn;
                    }
                }
                // Retries exhausted; the smallest unit always fits.
                self.smallest
            }
        }
    }

    /// Check an externally supplied melody against this generator's
    /// invariants: exact beat sum, pitches within the pool, durations
    /// within the allowed set.
    pub fn validate(&self, melody: &Melody) -> Result<()> {
        if melody.total_ticks() != self.target_ticks() {
            return Err(Error::Validation(format!(
                "melody is {} beats, expected {}",
                melody.total_beats(),
                self.params.target_beats
            )));
        }
        for event in melody.events() {
            if !self.params.durations.contains(&event.duration) {
                return Err(Error::Validation(format!(
                    "duration 1/{} is not in the allowed set",
                    event.duration.denominator()
                )));
            }
            if let Pitch::Note(note) = event.pitch {
                if !self.params.pitch_pool.contains(&note) {
                    return Err(Error::Validation(format!(
                        "pitch {} is not in the pool",
                        note_name(note)
                    )));
                }
            }
        }
        Ok(())
    }
}
