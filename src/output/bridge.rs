//! Output Bridge
//!
//! Every entry that clears the epoch gate goes through here exactly once:
//! one JSON line on the primary sink, then (optionally) one routed insert.
//!
//! The match id usually arrives with the terminal file info, long after the
//! first inserts. Until then inserts wait in a pending buffer.

use std::io::{self, Write};

use tracing::{debug, warn};

use crate::core::digest::{OutputDigest, StreamDigest};
use crate::core::entry::Entry;
use crate::output::game_info::GameInfoPayload;
use crate::output::storage::{EventStore, StorageError};

// =============================================================================
// PERSISTENCE GATE
// =============================================================================

/// Batched, match-id-aware writer in front of an event store.
pub struct PersistenceGate {
    store: Box<dyn EventStore + Send>,
    match_id: Option<i64>,
    pending: Vec<Entry>,
    batch_count: usize,
    batch_size: usize,
    inserted: u64,
}

impl PersistenceGate {
    /// Wrap a store. `match_id` is the pre-configured id, if any.
    pub fn new(store: Box<dyn EventStore + Send>, match_id: Option<i64>, batch_size: usize) -> Self {
        Self {
            store,
            match_id,
            pending: Vec::new(),
            batch_count: 0,
            batch_size: batch_size.max(1),
            inserted: 0,
        }
    }

    /// The match id rows are written under.
    pub fn match_id(&self) -> Option<i64> {
        self.match_id
    }

    /// Entries waiting for a match id.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Rows handed to the store so far.
    pub fn inserted(&self) -> u64 {
        self.inserted
    }

    /// Insert now if the match id is known, else hold the entry.
    ///
    /// A failed insert goes back to the pending buffer.
    pub fn enqueue(&mut self, entry: Entry) {
        let Some(match_id) = self.match_id else {
            self.pending.push(entry);
            return;
        };
        self.flush_pending(match_id);
        if let Err(e) = self.insert(match_id, &entry) {
            warn!(error = %e, entry_type = %entry.kind, "insert failed, holding entry for retry");
            self.pending.push(entry);
        }
    }

    /// Adopt the id found in the replay unless one was configured.
    pub fn discover_match_id(&mut self, discovered: i64) {
        match self.match_id {
            Some(configured) if configured != discovered => {
                warn!(configured, discovered, "replay match id differs from configured, keeping configured");
            }
            Some(_) => {}
            None => {
                debug!(match_id = discovered, pending = self.pending.len(), "match id discovered");
                self.match_id = Some(discovered);
                self.flush_pending(discovered);
            }
        }
    }

    /// Write the end-of-match metadata.
    pub fn persist_game_info(&mut self, payload: &GameInfoPayload) -> Result<(), StorageError> {
        let match_id = self.match_id.ok_or(StorageError::MissingMatchId)?;
        self.store.upsert_game_info(match_id, payload)
    }

    /// Last flush. Entries that still have no match id are dropped.
    pub fn finish(&mut self) -> Result<(), StorageError> {
        if let Some(match_id) = self.match_id {
            self.flush_pending(match_id);
        }
        if !self.pending.is_empty() {
            warn!(undeliverable = self.pending.len(), "match id never discovered, discarding buffered rows");
            self.pending.clear();
        }
        self.batch_count = 0;
        self.store.execute_batch()
    }

    fn insert(&mut self, match_id: i64, entry: &Entry) -> Result<(), StorageError> {
        self.store.insert_event(match_id, entry)?;
        self.inserted += 1;
        self.batch_count += 1;
        if self.batch_count >= self.batch_size {
            self.batch_count = 0;
            self.store.execute_batch()?;
        }
        Ok(())
    }

    fn flush_pending(&mut self, match_id: i64) {
        if self.pending.is_empty() {
            return;
        }
        for entry in std::mem::take(&mut self.pending) {
            if let Err(e) = self.insert(match_id, &entry) {
                warn!(error = %e, entry_type = %entry.kind, "retry failed, dropping entry");
            }
        }
    }
}

impl std::fmt::Debug for PersistenceGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceGate")
            .field("match_id", &self.match_id)
            .field("pending", &self.pending.len())
            .field("batch_count", &self.batch_count)
            .finish()
    }
}

// =============================================================================
// BRIDGE
// =============================================================================

/// Primary JSON-lines sink plus the optional persistence gate.
pub struct OutputBridge<W: Write> {
    sink: W,
    digest: OutputDigest,
    persistence: Option<PersistenceGate>,
    write_errors: u64,
}

impl<W: Write> OutputBridge<W> {
    /// JSON output only.
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            digest: OutputDigest::for_output(),
            persistence: None,
            write_errors: 0,
        }
    }

    /// JSON output plus storage.
    pub fn with_persistence(sink: W, gate: PersistenceGate) -> Self {
        Self {
            persistence: Some(gate),
            ..Self::new(sink)
        }
    }

    /// Write one entry. Sink errors are logged and counted, never raised.
    pub fn write(&mut self, entry: Entry) {
        match serde_json::to_vec(&entry) {
            Ok(line) => {
                self.digest.update_line(&line);
                if let Err(e) = self.sink.write_all(&line).and_then(|_| self.sink.write_all(b"\n")) {
                    self.write_errors += 1;
                    warn!(error = %e, entry_type = %entry.kind, "failed to write entry");
                }
            }
            Err(e) => {
                self.write_errors += 1;
                warn!(error = %e, entry_type = %entry.kind, "failed to serialize entry");
            }
        }
        if let Some(gate) = self.persistence.as_mut() {
            gate.enqueue(entry);
        }
    }

    /// The persistence gate, if storage is on.
    pub fn persistence(&mut self) -> Option<&mut PersistenceGate> {
        self.persistence.as_mut()
    }

    /// Lines written so far.
    pub fn lines(&self) -> u64 {
        self.digest.lines()
    }

    /// Failed writes so far.
    pub fn write_errors(&self) -> u64 {
        self.write_errors
    }

    /// Flush the sink, finish storage and return the sink with the digest.
    pub fn finish(mut self) -> io::Result<(W, StreamDigest)> {
        if let Some(gate) = self.persistence.as_mut() {
            if let Err(e) = gate.finish() {
                warn!(error = %e, "final storage flush failed");
            }
        }
        self.sink.flush()?;
        Ok((self.sink, self.digest.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorded {
        rows: Vec<(i64, String)>,
        commits: usize,
        game_info: Vec<i64>,
    }

    /// Store that records calls and fails on a chosen entry type.
    struct MemoryStore {
        log: Arc<Mutex<Recorded>>,
        fail_on: Option<&'static str>,
    }

    impl EventStore for MemoryStore {
        fn insert_event(&mut self, match_id: i64, entry: &Entry) -> Result<(), StorageError> {
            if self.fail_on == Some(entry.kind.as_str()) {
                return Err(StorageError::MissingMatchId);
            }
            self.log.lock().unwrap().rows.push((match_id, entry.kind.clone()));
            Ok(())
        }

        fn execute_batch(&mut self) -> Result<(), StorageError> {
            self.log.lock().unwrap().commits += 1;
            Ok(())
        }

        fn upsert_game_info(&mut self, match_id: i64, _: &GameInfoPayload) -> Result<(), StorageError> {
            self.log.lock().unwrap().game_info.push(match_id);
            Ok(())
        }
    }

    fn gate(match_id: Option<i64>, batch: usize, fail_on: Option<&'static str>) -> (PersistenceGate, Arc<Mutex<Recorded>>) {
        let log = Arc::new(Mutex::new(Recorded::default()));
        let store = MemoryStore { log: log.clone(), fail_on };
        (PersistenceGate::new(Box::new(store), match_id, batch), log)
    }

    #[test]
    fn test_json_lines_and_digest() {
        let mut bridge = OutputBridge::new(Vec::new());
        bridge.write(Entry::draft_start(3));
        bridge.write(Entry::player_slot(0, 1, 1));
        assert_eq!(bridge.lines(), 2);
        let (out, digest) = bridge.finish().unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "{\"time\":3,\"type\":\"draft_start\"}\n{\"time\":0,\"type\":\"player_slot\",\"key\":\"1\",\"value\":1}\n"
        );

        let mut expected = OutputDigest::for_output();
        for line in text.lines() {
            expected.update_line(line.as_bytes());
        }
        assert_eq!(digest, expected.finalize());
    }

    #[test]
    fn test_pending_until_match_id() {
        let (mut gate, log) = gate(None, 1000, None);
        gate.enqueue(Entry::draft_start(0));
        gate.enqueue(Entry::new(1, "pings"));
        assert_eq!(gate.pending(), 2);
        assert!(log.lock().unwrap().rows.is_empty());

        gate.discover_match_id(77);
        assert_eq!(gate.pending(), 0);
        gate.enqueue(Entry::new(2, "chat"));
        let kinds: Vec<_> = log.lock().unwrap().rows.iter().map(|(_, k)| k.clone()).collect();
        assert_eq!(kinds, vec!["draft_start", "pings", "chat"]);
        assert!(log.lock().unwrap().rows.iter().all(|(id, _)| *id == 77));
    }

    #[test]
    fn test_configured_match_id_wins() {
        let (mut gate, log) = gate(Some(5), 1000, None);
        gate.discover_match_id(6);
        assert_eq!(gate.match_id(), Some(5));
        gate.persist_game_info(&GameInfoPayload::default()).unwrap();
        assert_eq!(log.lock().unwrap().game_info, vec![5]);
    }

    #[test]
    fn test_game_info_needs_match_id() {
        let (mut gate, _) = gate(None, 1000, None);
        assert!(matches!(
            gate.persist_game_info(&GameInfoPayload::default()),
            Err(StorageError::MissingMatchId)
        ));
    }

    #[test]
    fn test_batch_threshold() {
        let (mut gate, log) = gate(Some(1), 2, None);
        for t in 0..5 {
            gate.enqueue(Entry::draft_start(t));
        }
        assert_eq!(log.lock().unwrap().commits, 2);
        gate.finish().unwrap();
        assert_eq!(log.lock().unwrap().commits, 3);
        assert_eq!(gate.inserted(), 5);
    }

    #[test]
    fn test_failed_insert_retried_once_then_dropped() {
        let (mut gate, log) = gate(Some(1), 1000, Some("pings"));
        gate.enqueue(Entry::new(0, "pings"));
        assert_eq!(gate.pending(), 1);
        // next enqueue retries the held entry first; the retry fails again
        gate.enqueue(Entry::new(1, "chat"));
        assert_eq!(gate.pending(), 0);
        assert_eq!(log.lock().unwrap().rows.len(), 1);
    }

    #[test]
    fn test_finish_discards_undeliverable() {
        let (mut gate, log) = gate(None, 1000, None);
        gate.enqueue(Entry::draft_start(0));
        gate.finish().unwrap();
        assert_eq!(gate.pending(), 0);
        assert!(log.lock().unwrap().rows.is_empty());
    }

    #[test]
    fn test_bridge_feeds_gate() {
        let (gate, log) = gate(Some(9), 1000, None);
        let mut bridge = OutputBridge::with_persistence(Vec::new(), gate);
        bridge.write(Entry::draft_start(1));
        let _ = bridge.finish().unwrap();
        let recorded = log.lock().unwrap();
        assert_eq!(recorded.rows, vec![(9, "draft_start".to_string())]);
        assert_eq!(recorded.commits, 1);
    }
}
