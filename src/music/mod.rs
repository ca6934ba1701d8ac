// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pitch and scale primitives shared by the generator and synthesizer.

pub mod pitch;
pub mod scale;

pub use pitch::{midi_to_freq, note_name, parse_note_name, MidiNote, PitchTable};
pub use scale::{Note, Scale, ScaleType};
