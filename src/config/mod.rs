// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for MELOPREF.
//!
//! A session file declares the musical knobs the core consumes: tempo,
//! bar count, sample rate, allowed duration denominators, the pitch
//! pool, fill policy, RNG seed and the log location. Defaults reproduce
//! the original app: 100 BPM, 4 bars of eighth notes, C major bounded
//! to E3..E5, 44100 Hz.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::audio::RenderParams;
use crate::error::Error;
use crate::melody::generator::{FillPolicy, GeneratorParams};
use crate::melody::DurationUnit;
use crate::music::pitch::{parse_note_name, PitchTable};
use crate::music::Scale;

/// Root configuration for a listening session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionFile {
    /// Session settings
    pub session: SessionConfig,
}

impl SessionFile {
    /// Load a session configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse a session configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))
    }
}

impl Default for SessionFile {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
        }
    }
}

/// Session-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Tempo in BPM
    #[serde(default = "default_tempo")]
    pub tempo: f64,
    /// Melody length in bars (4 bars = 16 beats, 8 bars = 32 beats)
    #[serde(default = "default_bars")]
    pub bars: u32,
    /// Output sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Allowed duration denominators (8 = eighth notes)
    #[serde(default = "default_durations")]
    pub durations: Vec<u32>,
    /// Probability that an event is a rest
    #[serde(default)]
    pub rest_weight: f64,
    /// Key root (e.g., "C", "F#")
    #[serde(default = "default_key")]
    pub key: String,
    /// Scale type (e.g., "major", "minor", "pentatonic")
    #[serde(default = "default_scale")]
    pub scale: String,
    /// Lowest playable note (inclusive)
    #[serde(default = "default_range_low")]
    pub range_low: String,
    /// Highest playable note (inclusive)
    #[serde(default = "default_range_high")]
    pub range_high: String,
    /// Pitch-to-frequency derivation
    #[serde(default)]
    pub pitch_table: PitchTable,
    /// Overshoot handling when filling the bar
    #[serde(default)]
    pub fill_policy: FillPolicy,
    /// RNG seed for reproducible sessions (entropy if unset)
    #[serde(default)]
    pub seed: Option<u64>,
    /// Preference log location
    #[serde(default = "default_log_path")]
    pub log_path: String,
}

fn default_tempo() -> f64 {
    100.0
}
fn default_bars() -> u32 {
    4
}
fn default_sample_rate() -> u32 {
    44100
}
fn default_durations() -> Vec<u32> {
    vec![8]
}
fn default_key() -> String {
    "C".to_string()
}
fn default_scale() -> String {
    "major".to_string()
}
fn default_range_low() -> String {
    "E3".to_string()
}
fn default_range_high() -> String {
    "E5".to_string()
}
fn default_log_path() -> String {
    "preference_log.json".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tempo: default_tempo(),
            bars: default_bars(),
            sample_rate: default_sample_rate(),
            durations: default_durations(),
            rest_weight: 0.0,
            key: default_key(),
            scale: default_scale(),
            range_low: default_range_low(),
            range_high: default_range_high(),
            pitch_table: PitchTable::default(),
            fill_policy: FillPolicy::default(),
            seed: None,
            log_path: default_log_path(),
        }
    }
}

impl SessionConfig {
    /// Build generator parameters from the musical knobs.
    ///
    /// All invalid combinations surface here or in the generator
    /// constructor, before any round runs.
    pub fn generator_params(&self) -> crate::error::Result<GeneratorParams> {
        if self.tempo <= 0.0 {
            return Err(Error::Config(format!("tempo {} must be positive", self.tempo)));
        }
        if self.bars == 0 {
            return Err(Error::Config("bar count must be positive".to_string()));
        }

        let scale = Scale::parse(&self.key, &self.scale).ok_or_else(|| {
            Error::Config(format!("unknown key/scale: {} {}", self.key, self.scale))
        })?;
        let low = parse_note_name(&self.range_low)
            .ok_or_else(|| Error::Config(format!("bad range_low: {}", self.range_low)))?;
        let high = parse_note_name(&self.range_high)
            .ok_or_else(|| Error::Config(format!("bad range_high: {}", self.range_high)))?;
        if low > high {
            return Err(Error::Config(format!(
                "range_low {} is above range_high {}",
                self.range_low, self.range_high
            )));
        }

        let durations = self
            .durations
            .iter()
            .map(|&d| DurationUnit::new(d))
            .collect::<crate::error::Result<Vec<_>>>()?;

        Ok(GeneratorParams {
            target_beats: self.bars * crate::melody::BEATS_PER_BAR,
            durations,
            pitch_pool: scale.midi_notes_in_range(low, high),
            rest_weight: self.rest_weight,
            fill_policy: self.fill_policy,
            pitch_table: self.pitch_table,
        })
    }

    /// Build render parameters
    pub fn render_params(&self) -> RenderParams {
        RenderParams {
            tempo: self.tempo,
            sample_rate: self.sample_rate,
            pitch_table: self.pitch_table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let yaml = "session: {}\n";
        let config = SessionFile::from_yaml(yaml).unwrap();
        assert_eq!(config.session.tempo, 100.0);
        assert_eq!(config.session.bars, 4);
        assert_eq!(config.session.sample_rate, 44100);
        assert_eq!(config.session.durations, vec![8]);
        assert_eq!(config.session.key, "C");
        assert_eq!(config.session.fill_policy, FillPolicy::ClampToSmallest);
        assert_eq!(config.session.seed, None);
    }

    #[test]
    fn test_parse_session_config() {
        let yaml = r#"
session:
  tempo: 120
  bars: 8
  durations: [2, 4, 8]
  rest_weight: 0.1
  key: "D"
  scale: "minor"
  range_low: "D3"
  range_high: "D5"
  fill_policy: strict_fit
  pitch_table: named_table
  seed: 42
  log_path: "runs/prefs.json"
"#;
        let config = SessionFile::from_yaml(yaml).unwrap();
        let session = &config.session;
        assert_eq!(session.tempo, 120.0);
        assert_eq!(session.bars, 8);
        assert_eq!(session.durations, vec![2, 4, 8]);
        assert_eq!(session.fill_policy, FillPolicy::StrictFit);
        assert_eq!(session.pitch_table, PitchTable::NamedTable);
        assert_eq!(session.seed, Some(42));
        assert_eq!(session.log_path, "runs/prefs.json");
    }

    #[test]
    fn test_generator_params_from_defaults() {
        let config = SessionConfig::default();
        let params = config.generator_params().unwrap();
        assert_eq!(params.target_beats, 16);
        assert_eq!(params.durations.len(), 1);
        assert_eq!(params.durations[0].denominator(), 8);
        // C major E3..E5 pool
        assert_eq!(params.pitch_pool.first(), Some(&52));
        assert_eq!(params.pitch_pool.last(), Some(&76));
    }

    #[test]
    fn test_generator_params_rejects_bad_config() {
        let mut config = SessionConfig::default();
        config.key = "X".to_string();
        assert!(config.generator_params().is_err());

        let mut config = SessionConfig::default();
        config.range_low = "E5".to_string();
        config.range_high = "E3".to_string();
        assert!(config.generator_params().is_err());

        let mut config = SessionConfig::default();
        config.durations = vec![5];
        assert!(config.generator_params().is_err());

        let mut config = SessionConfig::default();
        config.tempo = 0.0;
        assert!(config.generator_params().is_err());
    }

    #[test]
    fn test_render_params_bridge() {
        let mut config = SessionConfig::default();
        config.tempo = 90.0;
        config.sample_rate = 22050;
        let params = config.render_params();
        assert_eq!(params.tempo, 90.0);
        assert_eq!(params.sample_rate, 22050);
    }

    #[test]
    fn test_round_trip() {
        let original = SessionFile::default();
        let yaml = original.to_yaml().unwrap();
        let parsed = SessionFile::from_yaml(&yaml).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.yaml");

        let mut config = SessionFile::default();
        config.session.tempo = 132.0;
        config.save(&path).unwrap();

        let loaded = SessionFile::load(&path).unwrap();
        assert_eq!(loaded.session.tempo, 132.0);
    }
}
