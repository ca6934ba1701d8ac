// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MELOPREF - melody preference trainer.
//!
//! Generates pairs of short random melodies, renders them to normalized
//! 16-bit PCM WAV, records which one a listener prefers, and repeats,
//! building a preference dataset round by round.

pub mod audio;
pub mod config;
pub mod error;
pub mod melody;
pub mod music;
pub mod session;
pub mod source;
pub mod store;

pub use error::{Error, Result};
