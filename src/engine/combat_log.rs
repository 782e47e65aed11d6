//! Combat-Log Classifier
//!
//! Turns decoder combat-log entries into output entries, folding in the
//! visitor results and reporting game-state transitions to the engine.

use crate::core::entry::Entry;
use crate::decoder::combat_log::{CombatLogEntry, CombatLogType};
use crate::engine::visitors::{CombatLogVisitor, GreedStackCounter, TrackStatus, TrackedDeathVisitor};

/// Outcome of classifying one combat-log entry.
#[derive(Debug)]
pub struct Classified {
    /// The built entry.
    pub entry: Entry,
    /// New game state, for `GAME_STATE` entries.
    pub game_state: Option<i32>,
    /// False for internal types that must not reach the output.
    pub surfaced: bool,
}

/// Combat-log classifier with its two visitors.
pub struct CombatLogClassifier<G = GreedStackCounter, T = TrackedDeathVisitor> {
    greed: G,
    track: T,
}

impl Default for CombatLogClassifier {
    fn default() -> Self {
        Self::new(GreedStackCounter::new(), TrackedDeathVisitor::new())
    }
}

impl<G, T> CombatLogClassifier<G, T>
where
    G: CombatLogVisitor<Output = i32>,
    T: CombatLogVisitor<Output = TrackStatus>,
{
    /// Create a classifier around the given visitors.
    pub fn new(greed: G, track: T) -> Self {
        Self { greed, track }
    }

    /// Classify one entry observed at `time` (rounded seconds).
    pub fn classify(&mut self, time: i32, cle: &CombatLogEntry) -> Classified {
        let mut entry = Entry::new(time, cle.kind.name());
        entry.attackername = cle.attacker_name.clone();
        entry.targetname = cle.target_name.clone();
        entry.sourcename = cle.damage_source_name.clone();
        entry.targetsourcename = cle.target_source_name.clone();
        entry.inflictor = cle.inflictor_name.clone();
        entry.attackerhero = Some(cle.is_attacker_hero);
        entry.targethero = Some(cle.is_target_hero);
        entry.attackerillusion = Some(cle.is_attacker_illusion);
        entry.targetillusion = Some(cle.is_target_illusion);
        entry.value = Some(cle.value);
        if cle.stun_duration > 0.0 {
            entry.stun_duration = Some(cle.stun_duration);
        }
        if cle.slow_duration > 0.0 {
            entry.slow_duration = Some(cle.slow_duration);
        }

        // `value` means something different per type
        match cle.kind {
            CombatLogType::Purchase => entry.valuename = cle.value_name.clone(),
            CombatLogType::Gold => entry.gold_reason = Some(cle.gold_reason),
            CombatLogType::Xp => entry.xp_reason = Some(cle.xp_reason),
            _ => {}
        }

        entry.greevils_greed_stack = self.greed.visit(time, cle);
        if let Some(status) = self.track.visit(time, cle) {
            entry.tracked_death = Some(status.tracked);
            entry.tracked_sourcename = status.inflictor;
        }

        let game_state = (cle.kind == CombatLogType::GameState).then_some(cle.value);

        Classified {
            entry,
            game_state,
            surfaced: cle.kind.is_surfaced(),
        }
    }
}
