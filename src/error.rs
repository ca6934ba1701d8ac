// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error taxonomy for MELOPREF.
//!
//! Configuration problems are caught eagerly at setup; storage problems
//! abort the current round; external-source validation problems are
//! recovered by falling back to local generation.

use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid generator or session parameters, detected at construction
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed or empty melody reaching the synthesizer
    #[error("invalid melody: {0}")]
    InvalidMelody(String),

    /// External-source response failed the melody invariants
    #[error("validation error: {0}")]
    Validation(String),

    /// Preference log read/write failure
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, Error>;
