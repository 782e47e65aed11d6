//! Epoch Resolver
//!
//! Holds every entry back until in-game zero time is known, then releases
//! the backlog in order with times shifted by the epoch.
//!
//! ```text
//!   unresolved ──(first signal)──▶ resolved      later signals ignored
//!       │
//!       └──(end of stream)──▶ exhausted           backlog released unshifted
//! ```

use tracing::debug;

use crate::core::entry::Entry;

/// Which signal established the epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpochSource {
    /// A `GAME_STATE` combat-log entry moving to pre-game.
    CombatLog,
    /// The game-rules start-time property becoming non-zero.
    RulesEntity,
}

/// Result of offering an epoch.
#[derive(Debug, PartialEq)]
pub enum Resolution {
    /// Accepted; the buffered entries, already shifted, in original order.
    Resolved(Vec<Entry>),
    /// An epoch was already set.
    Ignored,
}

/// Epoch state plus the backlog of entries waiting on it.
#[derive(Debug)]
pub struct EpochResolver {
    epoch: Option<i32>,
    /// `None` once released.
    buffer: Option<Vec<Entry>>,
}

impl Default for EpochResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl EpochResolver {
    /// Create an unresolved resolver with an empty backlog.
    pub fn new() -> Self {
        Self {
            epoch: None,
            buffer: Some(Vec::new()),
        }
    }

    /// The epoch, or 0 while unresolved.
    pub fn epoch(&self) -> i32 {
        self.epoch.unwrap_or(0)
    }

    /// True once a signal has been accepted.
    pub fn is_resolved(&self) -> bool {
        self.epoch.is_some()
    }

    /// True while entries are still being held back.
    pub fn is_buffering(&self) -> bool {
        self.epoch.is_none() && self.buffer.is_some()
    }

    /// Number of entries held back.
    pub fn buffered(&self) -> usize {
        self.buffer.as_ref().map_or(0, Vec::len)
    }

    /// Offer an entry. Returns it shifted if it may go downstream now.
    pub fn admit(&mut self, mut entry: Entry) -> Option<Entry> {
        if self.epoch.is_none() {
            if let Some(buffer) = self.buffer.as_mut() {
                buffer.push(entry);
                return None;
            }
        }
        entry.time -= self.epoch();
        Some(entry)
    }

    /// Offer an epoch. Only the first one is honored.
    pub fn resolve(&mut self, epoch: i32, source: EpochSource) -> Resolution {
        if let Some(current) = self.epoch {
            if current != epoch {
                debug!(current, offered = epoch, ?source, "epoch already resolved, ignoring signal");
            }
            return Resolution::Ignored;
        }
        self.epoch = Some(epoch);
        let backlog = self.buffer.take().unwrap_or_default();
        debug!(epoch, ?source, buffered = backlog.len(), "epoch resolved");
        Resolution::Resolved(
            backlog
                .into_iter()
                .map(|mut e| {
                    e.time -= epoch;
                    e
                })
                .collect(),
        )
    }

    /// Release the backlog without waiting for an epoch.
    ///
    /// Entries keep their unshifted times. The backlog is exhausted either
    /// way, so later entries go straight through.
    pub fn force_flush(&mut self) -> Vec<Entry> {
        let epoch = self.epoch();
        self.buffer
            .take()
            .unwrap_or_default()
            .into_iter()
            .map(|mut e| {
                e.time -= epoch;
                e
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry::kind;

    fn entry(time: i32) -> Entry {
        Entry::new(time, kind::CHAT)
    }

    #[test]
    fn test_buffers_until_resolved() {
        let mut r = EpochResolver::new();
        assert!(r.admit(entry(100)).is_none());
        assert!(r.admit(entry(101)).is_none());
        assert_eq!(r.buffered(), 2);

        let Resolution::Resolved(flushed) = r.resolve(90, EpochSource::CombatLog) else {
            panic!("first signal must resolve");
        };
        assert_eq!(flushed.iter().map(|e| e.time).collect::<Vec<_>>(), vec![10, 11]);
        assert_eq!(r.admit(entry(95)).map(|e| e.time), Some(5));
        assert!(!r.is_buffering());
    }

    #[test]
    fn test_second_signal_is_ignored() {
        let mut r = EpochResolver::new();
        r.admit(entry(100));
        assert!(matches!(r.resolve(90, EpochSource::RulesEntity), Resolution::Resolved(_)));
        assert_eq!(r.resolve(80, EpochSource::CombatLog), Resolution::Ignored);
        assert_eq!(r.epoch(), 90);
        // still shifting by the first epoch
        assert_eq!(r.admit(entry(100)).map(|e| e.time), Some(10));
    }

    #[test]
    fn test_force_flush_keeps_raw_times() {
        let mut r = EpochResolver::new();
        r.admit(entry(7));
        r.admit(entry(3));
        let flushed = r.force_flush();
        assert_eq!(flushed.iter().map(|e| e.time).collect::<Vec<_>>(), vec![7, 3]);
        assert!(!r.is_resolved());
        // exhausted: later entries pass straight through
        assert_eq!(r.admit(entry(12)).map(|e| e.time), Some(12));
        assert!(r.force_flush().is_empty());
    }

    #[test]
    fn test_resolution_after_force_flush_shifts_later_entries() {
        let mut r = EpochResolver::new();
        r.force_flush();
        assert_eq!(r.resolve(20, EpochSource::CombatLog), Resolution::Resolved(vec![]));
        assert_eq!(r.admit(entry(25)).map(|e| e.time), Some(5));
    }
}
