//! Combat-Log Visitors
//!
//! Small stateful aggregators fed every combat-log entry. Each returns a
//! derived value that the classifier folds into the entry it builds.

use std::collections::{BTreeMap, VecDeque};

use crate::decoder::combat_log::{CombatLogEntry, CombatLogType};

/// A stateful observer of the combat log.
pub trait CombatLogVisitor {
    /// Value derived for one entry.
    type Output;

    /// Observe an entry at a (rounded) game time.
    fn visit(&mut self, time: i32, entry: &CombatLogEntry) -> Option<Self::Output>;
}

// =============================================================================
// GREED STACKS
// =============================================================================

/// Hero whose passive stacks on creep last hits.
pub const GREED_HERO: &str = "npc_dota_hero_alchemist";

/// Seconds a last hit keeps counting towards the stack.
pub const GREED_WINDOW_SECS: i32 = 36;

/// Stack cap.
pub const GREED_MAX_STACKS: usize = 12;

/// Gold reasons for creep and neutral kills.
pub const GOLD_REASON_CREEP: i32 = 13;
/// See [`GOLD_REASON_CREEP`].
pub const GOLD_REASON_NEUTRAL: i32 = 14;

/// Counts Greevil's Greed stacks from creep last hits.
///
/// Reported on the bounty gold entry that follows the kill.
#[derive(Debug, Default)]
pub struct GreedStackCounter {
    last_hits: VecDeque<i32>,
}

impl GreedStackCounter {
    /// Create an empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    fn expire(&mut self, time: i32) {
        while self.last_hits.front().is_some_and(|t| time - t > GREED_WINDOW_SECS) {
            self.last_hits.pop_front();
        }
    }
}

impl CombatLogVisitor for GreedStackCounter {
    type Output = i32;

    fn visit(&mut self, time: i32, entry: &CombatLogEntry) -> Option<i32> {
        match entry.kind {
            CombatLogType::Death
                if entry.attacker_name.as_deref() == Some(GREED_HERO)
                    && !entry.is_target_hero
                    && !entry.is_attacker_illusion =>
            {
                self.expire(time);
                self.last_hits.push_back(time);
                None
            }
            CombatLogType::Gold
                if entry.target_name.as_deref() == Some(GREED_HERO)
                    && (entry.gold_reason == GOLD_REASON_CREEP
                        || entry.gold_reason == GOLD_REASON_NEUTRAL) =>
            {
                self.expire(time);
                Some(self.last_hits.len().min(GREED_MAX_STACKS) as i32)
            }
            _ => None,
        }
    }
}

// =============================================================================
// TRACKED DEATHS
// =============================================================================

/// Modifier applied by Track.
pub const TRACK_MODIFIER: &str = "modifier_bounty_hunter_track";

/// Whether a dying hero was tracked, and by whom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackStatus {
    /// True if the hero carried the track modifier.
    pub tracked: bool,
    /// Caster of the track, if any.
    pub inflictor: Option<String>,
}

/// Attributes hero deaths to an active Track.
#[derive(Debug, Default)]
pub struct TrackedDeathVisitor {
    /// target name -> caster name
    tracked: BTreeMap<String, String>,
}

impl TrackedDeathVisitor {
    /// Create an empty visitor.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CombatLogVisitor for TrackedDeathVisitor {
    type Output = TrackStatus;

    fn visit(&mut self, _time: i32, entry: &CombatLogEntry) -> Option<TrackStatus> {
        let target = entry.target_name.as_deref()?;
        match entry.kind {
            CombatLogType::ModifierAdd if entry.inflictor_name.as_deref() == Some(TRACK_MODIFIER) => {
                if let Some(caster) = entry.attacker_name.as_ref() {
                    self.tracked.insert(target.to_string(), caster.clone());
                }
                None
            }
            CombatLogType::ModifierRemove if entry.inflictor_name.as_deref() == Some(TRACK_MODIFIER) => {
                self.tracked.remove(target);
                None
            }
            CombatLogType::Death if entry.is_target_hero && !entry.is_target_illusion => {
                let inflictor = self.tracked.get(target).cloned();
                Some(TrackStatus {
                    tracked: inflictor.is_some(),
                    inflictor,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creep_kill(time: f32) -> CombatLogEntry {
        let mut e = CombatLogEntry::new(CombatLogType::Death, time);
        e.attacker_name = Some(GREED_HERO.into());
        e.target_name = Some("npc_dota_creep_badguys_melee".into());
        e
    }

    fn bounty(time: f32) -> CombatLogEntry {
        let mut e = CombatLogEntry::new(CombatLogType::Gold, time);
        e.target_name = Some(GREED_HERO.into());
        e.gold_reason = GOLD_REASON_CREEP;
        e
    }

    #[test]
    fn test_greed_counts_within_window() {
        let mut v = GreedStackCounter::new();
        assert_eq!(v.visit(10, &creep_kill(10.0)), None);
        assert_eq!(v.visit(10, &bounty(10.0)), Some(1));
        v.visit(20, &creep_kill(20.0));
        assert_eq!(v.visit(20, &bounty(20.0)), Some(2));
        // first kill falls out of the window
        v.visit(50, &creep_kill(50.0));
        assert_eq!(v.visit(50, &bounty(50.0)), Some(2));
    }

    #[test]
    fn test_greed_caps_stacks() {
        let mut v = GreedStackCounter::new();
        for t in 0..20 {
            v.visit(t, &creep_kill(t as f32));
        }
        assert_eq!(v.visit(20, &bounty(20.0)), Some(GREED_MAX_STACKS as i32));
    }

    #[test]
    fn test_greed_ignores_other_gold() {
        let mut v = GreedStackCounter::new();
        v.visit(1, &creep_kill(1.0));
        let mut passive = bounty(1.0);
        passive.gold_reason = 0;
        assert_eq!(v.visit(1, &passive), None);
        let mut other = bounty(1.0);
        other.target_name = Some("npc_dota_hero_axe".into());
        assert_eq!(v.visit(1, &other), None);
    }

    fn modifier(kind: CombatLogType, target: &str) -> CombatLogEntry {
        let mut e = CombatLogEntry::new(kind, 1.0);
        e.attacker_name = Some("npc_dota_hero_bounty_hunter".into());
        e.target_name = Some(target.into());
        e.inflictor_name = Some(TRACK_MODIFIER.into());
        e
    }

    fn hero_death(target: &str) -> CombatLogEntry {
        let mut e = CombatLogEntry::new(CombatLogType::Death, 2.0);
        e.target_name = Some(target.into());
        e.is_target_hero = true;
        e
    }

    #[test]
    fn test_tracked_death() {
        let mut v = TrackedDeathVisitor::new();
        assert_eq!(v.visit(1, &modifier(CombatLogType::ModifierAdd, "npc_dota_hero_axe")), None);
        assert_eq!(
            v.visit(2, &hero_death("npc_dota_hero_axe")),
            Some(TrackStatus {
                tracked: true,
                inflictor: Some("npc_dota_hero_bounty_hunter".into()),
            })
        );
    }

    #[test]
    fn test_untracked_after_removal() {
        let mut v = TrackedDeathVisitor::new();
        v.visit(1, &modifier(CombatLogType::ModifierAdd, "npc_dota_hero_axe"));
        v.visit(1, &modifier(CombatLogType::ModifierRemove, "npc_dota_hero_axe"));
        assert_eq!(
            v.visit(2, &hero_death("npc_dota_hero_axe")),
            Some(TrackStatus { tracked: false, inflictor: None })
        );
        // non-hero deaths carry nothing
        let mut creep = hero_death("npc_dota_creep");
        creep.is_target_hero = false;
        assert_eq!(v.visit(2, &creep), None);
    }
}
