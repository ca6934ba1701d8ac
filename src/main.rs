// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use melopref::audio::wav;
use melopref::config::SessionFile;
use melopref::melody::generator::MelodyGenerator;
use melopref::session::Session;
use melopref::source::LocalSource;
use melopref::store::{PreferenceLog, Winner};

fn print_usage() {
    println!("MELOPREF - Melody Preference Trainer");
    println!();
    println!("Usage: melopref [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <FILE>        Load session settings from a YAML file");
    println!("  --listen               Interactive A/B session (default)");
    println!("  --rounds <N>           Headless smoke run: N randomly decided rounds");
    println!("  --render <OUT.wav>     Generate one melody and write it as WAV");
    println!("  --export-csv <FILE>    Export the preference log as CSV");
    println!("  --count                Print the number of recorded preferences");
    println!("  --undo                 Remove the most recent preference");
    println!("  --help                 Show this help message");
}

fn load_config(args: &[String]) -> Result<SessionFile> {
    if let Some(pos) = args.iter().position(|a| a == "--config") {
        let path = args
            .get(pos + 1)
            .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
        SessionFile::load(path)
    } else if Path::new("session.yaml").exists() {
        SessionFile::load("session.yaml")
    } else {
        Ok(SessionFile::default())
    }
}

fn open_session(config: &SessionFile) -> Result<Session> {
    let session = &config.session;
    let generator = MelodyGenerator::new(session.generator_params()?)?;
    let source = LocalSource::new(generator, session.seed);
    let store = PreferenceLog::open(&session.log_path)?;
    Ok(Session::new(
        Box::new(source),
        store,
        session.render_params(),
    ))
}

/// Interactive loop: write both melodies as WAV files, read the choice
/// from stdin. Stands in for the display/transport layer.
fn listen(config: &SessionFile) -> Result<Session> {
    let mut session = open_session(config)?;

    println!("Listen to melody_a.wav and melody_b.wav, then choose.");
    println!("Commands: a, b (prefer), u (undo), q (quit)");

    let stdin = io::stdin();
    loop {
        let (a, b) = session.render_pair()?;
        std::fs::write("melody_a.wav", a)?;
        std::fs::write("melody_b.wav", b)?;
        if session.current_pair().substituted() {
            println!("(external source unavailable, melodies generated locally)");
        }

        print!("[round {}] a/b/u/q> ", session.count() + 1);
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match line.trim() {
            "a" => {
                session.on_choice(Winner::A)?;
            }
            "b" => {
                session.on_choice(Winner::B)?;
            }
            "u" => match session.undo()? {
                Some(entry) => println!("Removed round {}", entry.id),
                None => println!("Nothing to undo"),
            },
            "q" => break,
            other => println!("Unknown command: {}", other),
        }
    }

    println!("Recorded {} preferences", session.count());
    Ok(session)
}

/// Headless run for smoke testing: decide N rounds at random
fn run_rounds(config: &SessionFile, rounds: u32) -> Result<()> {
    let mut session = open_session(config)?;
    let mut rng = match config.session.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for _ in 0..rounds {
        let winner = if rng.gen() { Winner::A } else { Winner::B };
        session.on_choice(winner)?;
    }

    println!("Recorded {} rounds, log now holds {}", rounds, session.count());
    Ok(())
}

fn render_one(config: &SessionFile, out: &str) -> Result<()> {
    let session = &config.session;
    let generator = MelodyGenerator::new(session.generator_params()?)?;
    let mut rng = match session.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let melody = generator.generate(&mut rng);
    let buffer = melopref::audio::render(&melody, &session.render_params())?;
    wav::write_file(&buffer, out)?;

    println!("{}", melody);
    println!(
        "Wrote {} ({} samples, {:.2}s)",
        out,
        buffer.len(),
        buffer.duration_seconds()
    );
    Ok(())
}

fn export_csv(config: &SessionFile, out: &str) -> Result<()> {
    let store = PreferenceLog::open(&config.session.log_path)?;
    store.export_csv_file(out)?;
    println!("Exported {} entries to {}", store.count(), out);
    Ok(())
}

fn undo(config: &SessionFile) -> Result<()> {
    let mut store = PreferenceLog::open(&config.session.log_path)?;
    match store.undo_last()? {
        Some(entry) => println!("Removed round {} (winner {})", entry.id, entry.preferred),
        None => println!("Nothing to undo"),
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = env::args().collect();
    let config = load_config(&args)?;

    let command = args
        .iter()
        .skip(1)
        .find(|a| !a.starts_with("--config") && a.starts_with("--"))
        .cloned()
        .unwrap_or_else(|| "--listen".to_string());

    match command.as_str() {
        "--listen" => {
            listen(&config)?;
        }
        "--rounds" => {
            let pos = args.iter().position(|a| a == "--rounds").unwrap();
            let rounds: u32 = args
                .get(pos + 1)
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| anyhow::anyhow!("--rounds requires a number"))?;
            run_rounds(&config, rounds)?;
        }
        "--render" => {
            let pos = args.iter().position(|a| a == "--render").unwrap();
            let out = args
                .get(pos + 1)
                .ok_or_else(|| anyhow::anyhow!("--render requires an output path"))?;
            render_one(&config, out)?;
        }
        "--export-csv" => {
            let pos = args.iter().position(|a| a == "--export-csv").unwrap();
            let out = args
                .get(pos + 1)
                .ok_or_else(|| anyhow::anyhow!("--export-csv requires an output path"))?;
            export_csv(&config, out)?;
        }
        "--count" => {
            let store = PreferenceLog::open(&config.session.log_path)?;
            println!("{}", store.count());
        }
        "--undo" => {
            undo(&config)?;
        }
        "--help" | "-h" => {
            print_usage();
        }
        other => {
            warn!("unknown option: {}", other);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
