// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Melody sources.
//!
//! A source hands the session two fresh melodies per round. The local
//! source wraps the random generator; the remote source asks an external
//! generative service conditioned on the preference history, validates
//! whatever comes back against the generator invariants, and falls back
//! to local generation on any failure. A remote round never fails
//! outright -- at worst it degrades with a warning.

use anyhow::Result as TransportResult;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::melody::generator::MelodyGenerator;
use crate::melody::{DurationUnit, Event, Melody};
use crate::music::pitch::MidiNote;

/// Where a pair of melodies came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOrigin {
    /// Local random generation
    Local,
    /// External service response that passed validation
    Remote,
    /// External service failed; local generation substituted
    RemoteFallback,
}

/// Two melodies for one round
#[derive(Debug, Clone)]
pub struct MelodyPair {
    pub a: Melody,
    pub b: Melody,
    pub origin: PairOrigin,
}

impl MelodyPair {
    /// True when an external failure was papered over locally; the
    /// caller should tell the listener a substitution occurred.
    pub fn substituted(&self) -> bool {
        self.origin == PairOrigin::RemoteFallback
    }
}

/// Supplies melody pairs for rounds
pub trait MelodySource {
    /// Produce two melodies, optionally conditioned on a bounded summary
    /// of the preference history. Always succeeds.
    fn generate_pair(&mut self, history: &str) -> MelodyPair;
}

/// Local random source
pub struct LocalSource {
    generator: MelodyGenerator,
    rng: StdRng,
}

impl LocalSource {
    /// Seedable for deterministic tests; entropy-seeded otherwise
    pub fn new(generator: MelodyGenerator, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { generator, rng }
    }

    pub fn generator(&self) -> &MelodyGenerator {
        &self.generator
    }
}

impl MelodySource for LocalSource {
    fn generate_pair(&mut self, _history: &str) -> MelodyPair {
        MelodyPair {
            a: self.generator.generate(&mut self.rng),
            b: self.generator.generate(&mut self.rng),
            origin: PairOrigin::Local,
        }
    }
}

/// Request sent to the external service: history summary plus the fixed
/// generation parameters
#[derive(Debug, Clone, Serialize)]
pub struct RemoteRequest {
    pub history: String,
    pub tempo: f64,
    pub target_beats: u32,
    pub durations: Vec<u32>,
    pub pitch_pool: Vec<MidiNote>,
}

/// Transport to the external generation service. Credential handling and
/// timeouts live behind this seam, outside the core.
pub trait Transport {
    /// Send a request, return the raw JSON response body
    fn request(&mut self, request: &RemoteRequest) -> TransportResult<String>;
}

/// Expected response shape: two ordered sequences of [pitch, duration]
/// pairs. A negative pitch encodes a rest. Anything else is a
/// validation failure.
#[derive(Debug, Deserialize)]
struct RemoteResponse {
    melody_a: Vec<(i32, u32)>,
    melody_b: Vec<(i32, u32)>,
}

/// External melody source with unconditional local fallback
pub struct RemoteMelodySource<T: Transport> {
    transport: T,
    local: LocalSource,
    tempo: f64,
}

impl<T: Transport> RemoteMelodySource<T> {
    pub fn new(transport: T, local: LocalSource, tempo: f64) -> Self {
        Self {
            transport,
            local,
            tempo,
        }
    }

    fn try_remote(&mut self, history: &str) -> Result<(Melody, Melody)> {
        let generator = self.local.generator();
        let params = generator.params();
        let request = RemoteRequest {
            history: history.to_string(),
            tempo: self.tempo,
            target_beats: params.target_beats,
            durations: params.durations.iter().map(|d| d.denominator()).collect(),
            pitch_pool: params.pitch_pool.clone(),
        };

        let body = self
            .transport
            .request(&request)
            .map_err(|e| Error::Validation(format!("transport failure: {}", e)))?;
        let response: RemoteResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Validation(format!("malformed response: {}", e)))?;

        let a = decode_events(&response.melody_a)?;
        let b = decode_events(&response.melody_b)?;
        self.local.generator().validate(&a)?;
        self.local.generator().validate(&b)?;
        Ok((a, b))
    }
}

impl<T: Transport> MelodySource for RemoteMelodySource<T> {
    fn generate_pair(&mut self, history: &str) -> MelodyPair {
        match self.try_remote(history) {
            Ok((a, b)) => {
                debug!("external source supplied both melodies");
                MelodyPair {
                    a,
                    b,
                    origin: PairOrigin::Remote,
                }
            }
            Err(err) => {
                warn!(%err, "external melody source failed, substituting local generation");
                let pair = self.local.generate_pair(history);
                MelodyPair {
                    origin: PairOrigin::RemoteFallback,
                    ..pair
                }
            }
        }
    }
}

fn decode_events(pairs: &[(i32, u32)]) -> Result<Melody> {
    let mut melody = Melody::new();
    for &(pitch, denominator) in pairs {
        let duration = DurationUnit::new(denominator)
            .map_err(|_| Error::Validation(format!("bad duration denominator {}", denominator)))?;
        let event = if pitch < 0 {
            Event::rest(duration)
        } else if pitch <= 127 {
            Event::note(pitch as MidiNote, duration)
        } else {
            return Err(Error::Validation(format!("pitch {} out of MIDI range", pitch)));
        };
        melody.push(event);
    }
    Ok(melody)
}
