// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio rendering.
//!
//! Converts a melody into a mono 16-bit PCM buffer: one pure sinusoid
//! segment per event (zeros for rests), concatenated gaplessly, then
//! peak-normalized to full scale. The quantized buffer is bit-exact for
//! a given melody, tempo and sample rate.

pub mod wav;

use crate::error::{Error, Result};
use crate::melody::{Melody, Pitch};
use crate::music::pitch::{note_name, PitchTable};

/// Default output sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Full-scale magnitude for 16-bit output
pub const FULL_SCALE: f64 = i16::MAX as f64;

/// Pre-normalization sinusoid amplitude. Sub-unity so segment synthesis
/// never clips before the final rescale.
const TONE_AMPLITUDE: f64 = 0.4;

/// Rendering parameters
#[derive(Debug, Clone, Copy)]
pub struct RenderParams {
    /// Tempo in BPM
    pub tempo: f64,
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Pitch-to-frequency source
    pub pitch_table: PitchTable,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            tempo: 100.0,
            sample_rate: DEFAULT_SAMPLE_RATE,
            pitch_table: PitchTable::EqualTemperament,
        }
    }
}

/// A rendered, quantized sample buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Peak absolute sample value
    pub fn peak(&self) -> i16 {
        self.samples
            .iter()
            .map(|s| s.unsigned_abs())
            .max()
            .unwrap_or(0)
            .min(i16::MAX as u16) as i16
    }

    /// Buffer length in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Render a melody to a normalized PCM buffer.
///
/// Each event becomes `round(rate * seconds)` samples, with time points
/// evenly spaced over `[0, seconds)` -- the endpoint is excluded, so
/// consecutive segments butt together without overlap or padding.
pub fn render(melody: &Melody, params: &RenderParams) -> Result<AudioBuffer> {
    if melody.is_empty() {
        return Err(Error::InvalidMelody("melody has no events".to_string()));
    }

    let seconds_per_beat = 60.0 / params.tempo;
    let mut raw: Vec<f64> = Vec::new();

    for event in melody.events() {
        let seconds = seconds_per_beat * event.duration.beats();
        let count = (params.sample_rate as f64 * seconds).round() as usize;

        match event.pitch {
            Pitch::Rest => raw.extend(std::iter::repeat(0.0).take(count)),
            Pitch::Note(note) => {
                let freq = params.pitch_table.frequency(note).ok_or_else(|| {
                    Error::InvalidMelody(format!(
                        "pitch {} is outside the {:?} table",
                        note_name(note),
                        params.pitch_table
                    ))
                })?;
                let omega = std::f64::consts::TAU * freq;
                for i in 0..count {
                    let t = i as f64 * seconds / count as f64;
                    raw.push(TONE_AMPLITUDE * (omega * t).sin());
                }
            }
        }
    }

    Ok(AudioBuffer::new(normalize(&raw), params.sample_rate))
}

/// Rescale so the peak magnitude hits full scale, then quantize to i16.
/// An all-silence buffer is passed through as zeros rather than divided
/// by its zero peak.
fn normalize(raw: &[f64]) -> Vec<i16> {
    let peak = raw.iter().fold(0.0f64, |acc, &x| acc.max(x.abs()));
    if peak == 0.0 {
        return vec![0i16; raw.len()];
    }

    let scale = FULL_SCALE / peak;
    raw.iter()
        .map(|&x| (x * scale).round().clamp(i16::MIN as f64, i16::MAX as f64) as i16)
        .collect()
}
