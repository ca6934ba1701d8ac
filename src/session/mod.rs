// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Round state machine.
//!
//! One round: present a pair, record the choice, regenerate. The session
//! owns the store, the melody source and the render settings, and moves
//! through {AwaitingChoice, Recording, Regenerating} on each choice. A
//! storage failure aborts the round and leaves the current pair in
//! place; an empty-log undo is a reported no-op.

use chrono::Utc;
use tracing::{debug, info};

use crate::audio::{self, wav, RenderParams};
use crate::error::Result;
use crate::source::{MelodyPair, MelodySource};
use crate::store::{LogEntry, PreferenceLog, Winner};

/// Bounded history summary: most recent rounds included, oldest dropped
const HISTORY_LIMIT: usize = 16;

/// Where the session is within a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    /// A pair is rendered and waiting on the listener
    AwaitingChoice,
    /// The choice is being written to the log
    Recording,
    /// A fresh pair is being drawn
    Regenerating,
}

/// Drives generate -> render -> record -> regenerate
pub struct Session {
    source: Box<dyn MelodySource>,
    store: PreferenceLog,
    render: RenderParams,
    state: RoundState,
    current: MelodyPair,
}

impl Session {
    /// Create a session and draw the first pair
    pub fn new(mut source: Box<dyn MelodySource>, store: PreferenceLog, render: RenderParams) -> Self {
        let history = history_summary(&store);
        let current = source.generate_pair(&history);
        debug!(origin = ?current.origin, "drew opening pair");
        Self {
            source,
            store,
            render,
            state: RoundState::AwaitingChoice,
            current,
        }
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    /// The pair currently awaiting a choice
    pub fn current_pair(&self) -> &MelodyPair {
        &self.current
    }

    pub fn store(&self) -> &PreferenceLog {
        &self.store
    }

    /// Number of recorded rounds
    pub fn count(&self) -> usize {
        self.store.count()
    }

    /// Render both current melodies to WAV bytes for presentation
    pub fn render_pair(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        let a = wav::encode(&audio::render(&self.current.a, &self.render)?)?;
        let b = wav::encode(&audio::render(&self.current.b, &self.render)?)?;
        Ok((a, b))
    }

    /// Record the listener's choice and start the next round.
    ///
    /// On success the session is back at `AwaitingChoice` with a fresh
    /// pair. On a storage failure the round is aborted: nothing is
    /// recorded and the current pair stays presented.
    pub fn on_choice(&mut self, winner: Winner) -> Result<RoundState> {
        self.state = RoundState::Recording;
        let result = self.store.append(
            winner,
            &self.current.a,
            &self.current.b,
            Utc::now(),
        );

        let id = match result {
            Ok(id) => id,
            Err(err) => {
                self.state = RoundState::AwaitingChoice;
                return Err(err);
            }
        };
        info!(id, winner = %winner, rounds = self.store.count(), "round recorded");

        self.state = RoundState::Regenerating;
        let history = history_summary(&self.store);
        self.current = self.source.generate_pair(&history);
        self.state = RoundState::AwaitingChoice;
        Ok(self.state)
    }

    /// Undo the most recent round. Returns the removed entry, or None if
    /// there was nothing to undo.
    pub fn undo(&mut self) -> Result<Option<LogEntry>> {
        self.store.undo_last()
    }
}

/// Compact textual summary of recent history for the external source
fn history_summary(store: &PreferenceLog) -> String {
    let entries = store.fetch_all();
    let start = entries.len().saturating_sub(HISTORY_LIMIT);
    entries[start..]
        .iter()
        .map(|e| format!("{}:{} a=[{}] b=[{}]", e.id, e.preferred, e.melody_a, e.melody_b))
        .collect::<Vec<_>>()
        .join("\n")
}
