// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for MELOPREF
//!
//! These tests verify that multiple components work together correctly:
//! config through generation, rendering, the WAV container, the
//! preference log and the round state machine.

use rand::rngs::StdRng;
use rand::SeedableRng;

use melopref::audio::{self, wav, RenderParams};
use melopref::config::{SessionConfig, SessionFile};
use melopref::melody::generator::MelodyGenerator;
use melopref::melody::Melody;
use melopref::session::{RoundState, Session};
use melopref::source::{
    LocalSource, MelodySource, PairOrigin, RemoteMelodySource, RemoteRequest, Transport,
};
use melopref::store::{PreferenceLog, Winner};

fn default_session_config() -> SessionConfig {
    SessionFile::default().session
}

/// Config -> generator -> synthesizer -> WAV, end to end
#[test]
fn test_generate_render_encode_pipeline() {
    let config = default_session_config();
    let generator = MelodyGenerator::new(config.generator_params().unwrap()).unwrap();

    let mut rng = StdRng::seed_from_u64(2024);
    let melody = generator.generate(&mut rng);

    // 4 bars of eighth notes at the defaults
    assert_eq!(melody.total_beats(), 16.0);
    assert_eq!(melody.len(), 32);

    let buffer = audio::render(&melody, &config.render_params()).unwrap();

    // 16 beats at 100 BPM = 9.6 seconds
    let expected = (44100.0 * 9.6) as usize;
    assert!((buffer.len() as i64 - expected as i64).abs() <= melody.len() as i64);
    assert_eq!(buffer.peak(), i16::MAX);

    // Container round trip is lossless
    let bytes = wav::encode(&buffer).unwrap();
    assert_eq!(bytes.len(), 44 + 2 * buffer.len());
    assert_eq!(wav::decode(&bytes).unwrap(), buffer);
}

/// The serialized melody column re-parses and re-renders identically
#[test]
fn test_logged_melody_reproduces_audio() {
    let config = default_session_config();
    let generator = MelodyGenerator::new(config.generator_params().unwrap()).unwrap();
    let melody = generator.generate(&mut StdRng::seed_from_u64(7));

    let reparsed = Melody::parse(&melody.to_string()).unwrap();
    assert_eq!(reparsed, melody);

    let params = config.render_params();
    assert_eq!(
        audio::render(&melody, &params).unwrap(),
        audio::render(&reparsed, &params).unwrap()
    );
}

/// Full rounds through the state machine against a real temp store
#[test]
fn test_session_rounds_and_undo() {
    let dir = tempfile::tempdir().unwrap();
    let config = default_session_config();

    let generator = MelodyGenerator::new(config.generator_params().unwrap()).unwrap();
    let source = LocalSource::new(generator, Some(55));
    let store = PreferenceLog::open(dir.path().join("log.json")).unwrap();
    let mut session = Session::new(Box::new(source), store, config.render_params());

    assert_eq!(session.state(), RoundState::AwaitingChoice);

    let first_pair = session.current_pair().clone();
    session.on_choice(Winner::B).unwrap();
    session.on_choice(Winner::A).unwrap();
    assert_eq!(session.count(), 2);

    let entries = session.store().fetch_all().to_vec();
    assert_eq!(entries[0].preferred, Winner::B);
    assert_eq!(entries[0].melody_a, first_pair.a.to_string());
    assert!(entries[1].id > entries[0].id);

    let removed = session.undo().unwrap().unwrap();
    assert_eq!(removed.id, entries[1].id.max(entries[0].id));
    assert_eq!(session.count(), 1);
}

/// The log file written by one session is picked up by the next
#[test]
fn test_log_survives_session_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.json");
    let config = default_session_config();

    {
        let generator = MelodyGenerator::new(config.generator_params().unwrap()).unwrap();
        let source = LocalSource::new(generator, Some(1));
        let store = PreferenceLog::open(&path).unwrap();
        let mut session = Session::new(Box::new(source), store, config.render_params());
        session.on_choice(Winner::A).unwrap();
    }

    let store = PreferenceLog::open(&path).unwrap();
    assert_eq!(store.count(), 1);
    assert_eq!(store.fetch_all()[0].preferred, Winner::A);
    // The stored melody still parses and renders
    let melody = Melody::parse(&store.fetch_all()[0].melody_a).unwrap();
    assert!(audio::render(&melody, &RenderParams::default()).is_ok());
}

struct ShortMelodyTransport;

impl Transport for ShortMelodyTransport {
    fn request(&mut self, request: &RemoteRequest) -> anyhow::Result<String> {
        // One beat short of the requested budget
        let beats = request.target_beats - 1;
        let a: Vec<(i32, u32)> = vec![(60, 4); beats as usize];
        let b: Vec<(i32, u32)> = vec![(64, 4); request.target_beats as usize];
        Ok(serde_json::json!({ "melody_a": a, "melody_b": b }).to_string())
    }
}

/// An invalid external response degrades to local generation but the
/// round still completes and records
#[test]
fn test_external_fallback_round_still_records() {
    let dir = tempfile::tempdir().unwrap();
    let config = SessionConfig {
        durations: vec![2, 4, 8],
        ..default_session_config()
    };

    let generator = MelodyGenerator::new(config.generator_params().unwrap()).unwrap();
    let local = LocalSource::new(generator, Some(9));
    let mut remote = RemoteMelodySource::new(ShortMelodyTransport, local, config.tempo);

    let pair = remote.generate_pair("");
    assert_eq!(pair.origin, PairOrigin::RemoteFallback);
    assert!(pair.substituted());
    assert_eq!(pair.a.total_beats(), 16.0);
    assert_eq!(pair.b.total_beats(), 16.0);

    let store = PreferenceLog::open(dir.path().join("log.json")).unwrap();
    let mut session = Session::new(Box::new(remote), store, config.render_params());
    assert!(session.current_pair().substituted());
    session.on_choice(Winner::A).unwrap();
    assert_eq!(session.count(), 1);
}

/// CSV export carries the same rows the JSON store holds
#[test]
fn test_csv_export_matches_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = default_session_config();

    let generator = MelodyGenerator::new(config.generator_params().unwrap()).unwrap();
    let source = LocalSource::new(generator, Some(3));
    let store = PreferenceLog::open(dir.path().join("log.json")).unwrap();
    let mut session = Session::new(Box::new(source), store, config.render_params());

    session.on_choice(Winner::A).unwrap();
    session.on_choice(Winner::B).unwrap();

    let csv_path = dir.path().join("export.csv");
    session.store().export_csv_file(&csv_path).unwrap();

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3); // header + 2 rows
    assert_eq!(lines[0], "id,melody_a,melody_b,preferred,timestamp");
    for (line, entry) in lines[1..].iter().zip(session.store().fetch_all()) {
        assert!(line.starts_with(&format!("{},{}", entry.id, entry.melody_a)));
    }
}

/// A YAML config drives the whole pipeline
#[test]
fn test_yaml_config_to_audio() {
    let yaml = r#"
session:
  tempo: 120
  bars: 4
  durations: [4]
  key: "A"
  scale: "minor_pentatonic"
  range_low: "A3"
  range_high: "A4"
  seed: 77
"#;
    let config = SessionFile::from_yaml(yaml).unwrap().session;
    let generator = MelodyGenerator::new(config.generator_params().unwrap()).unwrap();
    let melody = generator.generate(&mut StdRng::seed_from_u64(77));

    // 16 beats of quarter notes
    assert_eq!(melody.len(), 16);

    let buffer = audio::render(&melody, &config.render_params()).unwrap();
    // 16 beats at 120 BPM = 8 seconds
    assert_eq!(buffer.len(), 44100 * 8);
    assert_eq!(buffer.peak(), i16::MAX);
}
