// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Append-only preference log.
//!
//! One row per decided round: both melodies (in their stable textual
//! form), the winner, and a UTC timestamp. Ids increase strictly and are
//! never reused -- an undone id stays burned, and the high-water mark is
//! persisted so numbering survives restarts (audit-safe numbering).
//!
//! The log owns its backing file; every mutation rewrites it in full.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::melody::Melody;

/// Which of the two presented melodies was preferred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    A,
    B,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::A => write!(f, "A"),
            Winner::B => write!(f, "B"),
        }
    }
}

/// One recorded preference. Immutable once written; removable only as a
/// whole row via undo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Strictly increasing, never reused
    pub id: u64,
    /// Melody presented as A, serialized textual form
    pub melody_a: String,
    /// Melody presented as B, serialized textual form
    pub melody_b: String,
    /// The listener's choice
    pub preferred: Winner,
    /// RFC 3339 UTC timestamp
    pub timestamp: String,
}

/// On-disk shape of the log file
#[derive(Debug, Default, Serialize, Deserialize)]
struct LogFile {
    next_id: u64,
    entries: Vec<LogEntry>,
}

/// File-backed preference log
#[derive(Debug)]
pub struct PreferenceLog {
    path: PathBuf,
    next_id: u64,
    entries: Vec<LogEntry>,
}

impl PreferenceLog {
    /// Open (or create) a log backed by the given file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = if path.exists() {
            let json = fs::read_to_string(&path)?;
            serde_json::from_str::<LogFile>(&json)?
        } else {
            LogFile {
                next_id: 1,
                ..Default::default()
            }
        };

        debug!(
            entries = file.entries.len(),
            next_id = file.next_id,
            "opened preference log"
        );
        Ok(Self {
            path,
            next_id: file.next_id.max(1),
            entries: file.entries,
        })
    }

    /// Append a decided round. Returns the assigned id after the write
    /// has been made durable.
    pub fn append(
        &mut self,
        preferred: Winner,
        melody_a: &Melody,
        melody_b: &Melody,
        timestamp: DateTime<Utc>,
    ) -> Result<u64> {
        let id = self.next_id;
        self.entries.push(LogEntry {
            id,
            melody_a: melody_a.to_string(),
            melody_b: melody_b.to_string(),
            preferred,
            timestamp: timestamp.to_rfc3339(),
        });
        self.next_id += 1;

        if let Err(err) = self.persist() {
            // Keep memory consistent with disk when the write fails
            self.entries.pop();
            self.next_id = id;
            return Err(err);
        }

        info!(id, winner = %preferred, "recorded preference");
        Ok(id)
    }

    /// All current entries in ascending id order
    pub fn fetch_all(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Remove and return the newest entry. A defined no-op on an empty
    /// log, not an error. The removed id is not reissued.
    pub fn undo_last(&mut self) -> Result<Option<LogEntry>> {
        let Some(entry) = self.entries.pop() else {
            return Ok(None);
        };

        if let Err(err) = self.persist() {
            self.entries.push(entry);
            return Err(err);
        }

        info!(id = entry.id, "undid last preference");
        Ok(Some(entry))
    }

    /// Number of current entries
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Render the log as CSV, same column set and order as the persisted
    /// schema
    pub fn export_csv(&self) -> String {
        let mut csv = String::from("id,melody_a,melody_b,preferred,timestamp\n");
        for entry in &self.entries {
            csv.push_str(&format!(
                "{},{},{},{},{}\n",
                entry.id, entry.melody_a, entry.melody_b, entry.preferred, entry.timestamp
            ));
        }
        csv
    }

    /// Write the CSV export to a file
    pub fn export_csv_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.export_csv())?;
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        let file = LogFile {
            next_id: self.next_id,
            entries: self.entries.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::error::Error;

    fn melody(text: &str) -> Melody {
        Melody::parse(text).unwrap()
    }

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn open_temp() -> (tempfile::TempDir, PreferenceLog) {
        let dir = tempfile::tempdir().unwrap();
        let log = PreferenceLog::open(dir.path().join("log.json")).unwrap();
        (dir, log)
    }

    #[test]
    fn test_append_and_fetch() {
        let (_dir, mut log) = open_temp();
        assert_eq!(log.count(), 0);

        let id = log
            .append(Winner::A, &melody("A4:8"), &melody("C4:8"), ts(0))
            .unwrap();
        assert_eq!(id, 1);
        assert_eq!(log.count(), 1);

        let entries = log.fetch_all();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, 1);
        assert_eq!(entries[0].melody_a, "A4:8");
        assert_eq!(entries[0].melody_b, "C4:8");
        assert_eq!(entries[0].preferred, Winner::A);
    }

    #[test]
    fn test_ids_strictly_increase() {
        let (_dir, mut log) = open_temp();
        let a = log
            .append(Winner::A, &melody("A4:8"), &melody("C4:8"), ts(1))
            .unwrap();
        let b = log
            .append(Winner::B, &melody("D4:8"), &melody("E4:8"), ts(2))
            .unwrap();
        assert!(b > a);
        assert_eq!(log.fetch_all().last().unwrap().id, b);
    }

    #[test]
    fn test_undo_removes_newest_only() {
        // append(A, m1, m2) ; append(B, m3, m4) ; undo => only the first
        // entry remains, id unchanged
        let (_dir, mut log) = open_temp();
        log.append(Winner::A, &melody("A4:8"), &melody("C4:8"), ts(1))
            .unwrap();
        let second = log
            .append(Winner::B, &melody("D4:8"), &melody("E4:8"), ts(2))
            .unwrap();

        let removed = log.undo_last().unwrap().unwrap();
        assert_eq!(removed.id, second);

        let entries = log.fetch_all();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, 1);
        assert_eq!(entries[0].preferred, Winner::A);
        assert_eq!(entries[0].melody_a, "A4:8");
        assert_eq!(entries[0].timestamp, ts(1).to_rfc3339());
    }

    #[test]
    fn test_undo_on_empty_is_noop() {
        let (_dir, mut log) = open_temp();
        assert!(log.undo_last().unwrap().is_none());
        assert_eq!(log.count(), 0);
    }

    #[test]
    fn test_undone_ids_are_never_reused() {
        let (_dir, mut log) = open_temp();
        let first = log
            .append(Winner::A, &melody("A4:8"), &melody("C4:8"), ts(1))
            .unwrap();
        log.undo_last().unwrap();

        let next = log
            .append(Winner::B, &melody("D4:8"), &melody("E4:8"), ts(2))
            .unwrap();
        assert!(next > first);
        assert_eq!(log.count(), 1);
    }

    #[test]
    fn test_persistence_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");

        {
            let mut log = PreferenceLog::open(&path).unwrap();
            log.append(Winner::A, &melody("A4:8"), &melody("C4:8"), ts(1))
                .unwrap();
            log.append(Winner::B, &melody("D4:8"), &melody("E4:8"), ts(2))
                .unwrap();
            log.undo_last().unwrap();
        }

        let mut log = PreferenceLog::open(&path).unwrap();
        assert_eq!(log.count(), 1);
        assert_eq!(log.fetch_all()[0].id, 1);

        // High-water mark survived: id 2 was burned by the undo
        let next = log
            .append(Winner::A, &melody("F4:8"), &melody("G4:8"), ts(3))
            .unwrap();
        assert_eq!(next, 3);
    }

    #[test]
    fn test_entries_round_trip_as_melodies() {
        let (_dir, mut log) = open_temp();
        let a = melody("E3:8 r:4 C#4:8 A4:2");
        let b = melody("G4:4 B4:4");
        log.append(Winner::B, &a, &b, ts(5)).unwrap();

        let entry = &log.fetch_all()[0];
        assert_eq!(Melody::parse(&entry.melody_a).unwrap(), a);
        assert_eq!(Melody::parse(&entry.melody_b).unwrap(), b);
    }

    #[test]
    fn test_csv_export() {
        let (_dir, mut log) = open_temp();
        log.append(Winner::A, &melody("A4:8"), &melody("C4:8"), ts(0))
            .unwrap();

        let csv = log.export_csv();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("id,melody_a,melody_b,preferred,timestamp"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("1,A4:8,C4:8,A,"));
        assert!(row.ends_with("+00:00"));
    }

    #[test]
    fn test_storage_error_on_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the write fail
        let path = dir.path().join("log.json");
        fs::create_dir(&path).unwrap();

        let mut log = PreferenceLog {
            path,
            next_id: 1,
            entries: Vec::new(),
        };
        let result = log.append(Winner::A, &melody("A4:8"), &melody("C4:8"), ts(0));
        assert!(matches!(result, Err(Error::Storage(_))));
        // Failed append must not leave a phantom entry or burn the id
        assert_eq!(log.count(), 0);
        assert_eq!(log.next_id, 1);
    }
}
