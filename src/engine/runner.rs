//! Replay Runner
//!
//! Drives a JSON-lines decoder stream through a fresh engine. One call is
//! one replay; runners share nothing.

use std::io::{BufRead, Write};

use thiserror::Error;
use tracing::{info, warn};

use crate::config::StorageConfig;
use crate::core::digest::StreamDigest;
use crate::decoder::events::DecoderEvent;
use crate::engine::replay::ReplayEngine;
use crate::output::bridge::PersistenceGate;
use crate::output::storage::{SqliteStore, StorageError};

/// Parse failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Reading the decoder stream or flushing the output failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The event store could not be opened.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Totals for one parsed replay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseSummary {
    /// Decoder events handled.
    pub events: u64,
    /// Lines that were not valid decoder events.
    pub skipped: u64,
    /// Entries written to the primary sink.
    pub lines: u64,
    /// Resolved epoch, if any.
    pub epoch: Option<i32>,
    /// SHA-256 of the primary sink.
    pub digest: StreamDigest,
}

impl ParseSummary {
    /// Digest as lowercase hex.
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}

/// Parse one decoder stream into `out`.
///
/// Blank lines are ignored; malformed lines are logged and skipped.
pub fn run_parse<R, W>(input: R, out: W, config: &StorageConfig) -> Result<ParseSummary, ParseError>
where
    R: BufRead,
    W: Write,
{
    let mut engine = if config.enabled {
        let store = SqliteStore::open(&config.db_path)?;
        let gate = PersistenceGate::new(Box::new(store), config.match_id, config.batch_size);
        info!(db = %config.db_path, match_id = ?config.match_id, "storage enabled");
        ReplayEngine::with_persistence(out, gate)
    } else {
        ReplayEngine::new(out)
    };

    let mut events = 0u64;
    let mut skipped = 0u64;
    for (number, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<DecoderEvent>(&line) {
            Ok(event) => {
                engine.handle(event);
                events += 1;
            }
            Err(e) => {
                skipped += 1;
                warn!(line = number + 1, error = %e, "skipping malformed decoder event");
            }
        }
    }

    let output = engine.finish()?;
    Ok(ParseSummary {
        events,
        skipped,
        lines: output.lines,
        epoch: output.epoch,
        digest: output.digest,
    })
}
