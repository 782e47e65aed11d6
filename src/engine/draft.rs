//! Draft Tracker
//!
//! Detects picks and bans by diffing the rules entity's hero arrays every
//! draft tick. A slot is reported the first tick it holds a hero and never
//! again.

use crate::core::coords::round_half_up;
use crate::core::entry::Entry;
use crate::core::property::{get_property, Entity};
use crate::engine::constants::{prop, DRAFT_BAN_SLOTS, DRAFT_SLOTS};

/// Pick and ban detection state; one draft per replay.
#[derive(Debug)]
pub struct DraftTracker {
    started: bool,
    processed: [bool; DRAFT_SLOTS],
    next_order: i32,
}

impl Default for DraftTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DraftTracker {
    /// Create a tracker before any draft activity.
    pub fn new() -> Self {
        Self {
            started: false,
            processed: [false; DRAFT_SLOTS],
            next_order: 1,
        }
    }

    /// True once the draft-start entry has been produced.
    pub fn has_started(&self) -> bool {
        self.started
    }

    /// Number of picks and bans seen so far.
    pub fn processed(&self) -> usize {
        self.processed.iter().filter(|p| **p).count()
    }

    /// Read the draft arrays and return entries for anything new.
    pub fn observe(&mut self, rules: &Entity, time: i32) -> Vec<Entry> {
        let rules = Some(rules);
        let mut out = Vec::new();

        if !self.started {
            let in_control: i64 = get_property(rules, prop::PLAYER_IDS_IN_CONTROL, None).unwrap_or(0);
            if in_control != 0 {
                self.started = true;
                out.push(Entry::draft_start(time));
            }
        }

        for slot in 0..DRAFT_SLOTS {
            if self.processed[slot] {
                continue;
            }
            let raw: i32 = if slot < DRAFT_BAN_SLOTS {
                get_property(rules, prop::BANNED_HEROES, Some(slot))
            } else {
                get_property(rules, prop::SELECTED_HEROES, Some(slot - DRAFT_BAN_SLOTS))
            }
            .unwrap_or(0);
            if raw <= 0 {
                continue;
            }

            self.processed[slot] = true;
            let order = self.next_order;
            self.next_order += 1;

            let extra_time = [0, 1].map(|team| {
                get_property::<f32>(rules, prop::EXTRA_TIME_REMAINING, Some(team)).map(round_half_up)
            });
            out.push(Entry::draft_timing(
                time,
                order,
                slot >= DRAFT_BAN_SLOTS,
                raw / 2,
                get_property(rules, prop::ACTIVE_TEAM, None),
                extra_time,
            ));
        }
        out
    }
}
