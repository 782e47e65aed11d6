//! Player Slots
//!
//! Maps entity and owner ids to the stable 0-9 slot, and builds the
//! slot / player-slot / 64-bit-id tables once ten players are on teams.

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::core::entry::{Entry, PLAYER_SLOT_OFFSET};
use crate::core::property::{get_property, Entity};
use crate::engine::constants::{
    prop, DIRE_TEAM_ID, MAX_PLAYER_SEARCH_INDEX, NUM_PLAYERS, RADIANT_TEAM_ID,
    WAITING_FOR_DRAFT_TEAM_ID,
};

/// Resolve the 0-9 slot of a player-owned entity.
///
/// Tries the current player id, the legacy player id, then the owner id.
/// The game stores ids doubled.
pub fn resolve_slot(entity: Option<&Entity>) -> Option<i32> {
    let id = get_property::<i32>(entity, prop::PLAYER_ID, None)
        .or_else(|| get_property(entity, prop::PLAYER_ID_OLD, None))
        .or_else(|| get_property(entity, prop::PLAYER_OWNER_ID, None))?;
    Some(id / 2)
}

/// Result of one initialization attempt.
#[derive(Debug, PartialEq)]
pub enum InitOutcome {
    /// Ten players found; the slot entries to emit.
    Initialized(Vec<Entry>),
    /// A player is still waiting to be drafted onto a team.
    WaitingForDraft,
    /// Fewer than ten players are on teams yet.
    Incomplete(usize),
    /// Already initialized; nothing to do.
    AlreadyInitialized,
}

/// Slot tables built during player initialization.
#[derive(Debug, Default)]
pub struct PlayerSlots {
    initialized: bool,
    /// Player-resource index for each slot.
    valid_indices: Vec<usize>,
    slot_to_player_slot: BTreeMap<i32, i32>,
    steam_id_to_player_slot: BTreeMap<i64, i32>,
    name_to_slot: BTreeMap<String, i32>,
}

impl PlayerSlots {
    /// Create uninitialized tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// True once ten players have been assigned.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Scan the player resource for the ten players on Radiant or Dire.
    ///
    /// Nothing is recorded unless all ten are found; a player waiting to be
    /// drafted aborts the attempt so it can be retried on a later tick.
    pub fn initialize(&mut self, resource: &Entity, time: i32) -> InitOutcome {
        if self.initialized {
            return InitOutcome::AlreadyInitialized;
        }

        let mut found: Vec<(usize, i32, Option<i64>)> = Vec::with_capacity(NUM_PLAYERS);
        let mut index = 0;
        while found.len() < NUM_PLAYERS && index < MAX_PLAYER_SEARCH_INDEX {
            let team: Option<i32> = get_property(Some(resource), prop::PLAYER_TEAM, Some(index));
            match team {
                Some(team) if team == RADIANT_TEAM_ID || team == DIRE_TEAM_ID => {
                    let team_slot: Option<i32> = get_property(Some(resource), prop::TEAM_SLOT, Some(index));
                    if let Some(team_slot) = team_slot {
                        let offset = if team == RADIANT_TEAM_ID { 0 } else { PLAYER_SLOT_OFFSET };
                        let steam_id = get_property(Some(resource), prop::PLAYER_STEAM_ID, Some(index));
                        found.push((index, offset + team_slot, steam_id));
                    }
                }
                Some(WAITING_FOR_DRAFT_TEAM_ID) => {
                    debug!(index, "player waiting for draft, deferring slot assignment");
                    return InitOutcome::WaitingForDraft;
                }
                _ => {}
            }
            index += 1;
        }

        if found.len() < NUM_PLAYERS {
            debug!(found = found.len(), "not enough players on teams yet");
            return InitOutcome::Incomplete(found.len());
        }

        let mut entries = Vec::with_capacity(NUM_PLAYERS);
        for (slot, (index, player_slot, steam_id)) in found.into_iter().enumerate() {
            let slot = slot as i32;
            entries.push(Entry::player_slot(time, slot, player_slot));
            self.valid_indices.push(index);
            self.slot_to_player_slot.insert(slot, player_slot);
            if let Some(steam_id) = steam_id {
                self.steam_id_to_player_slot.insert(steam_id, player_slot);
            }
        }
        self.initialized = true;
        info!(indices = ?self.valid_indices, "players initialized");
        InitOutcome::Initialized(entries)
    }

    /// Player-resource index of a slot.
    pub fn resource_index(&self, slot: usize) -> Option<usize> {
        self.valid_indices.get(slot).copied()
    }

    /// Player slot (0-4, 128-132) of a 0-9 slot.
    pub fn player_slot(&self, slot: i32) -> Option<i32> {
        self.slot_to_player_slot.get(&slot).copied()
    }

    /// Player slot of a 64-bit account id.
    pub fn player_slot_by_steam_id(&self, steam_id: i64) -> Option<i32> {
        self.steam_id_to_player_slot.get(&steam_id).copied()
    }

    /// The whole 64-bit id table.
    pub fn steam_ids(&self) -> &BTreeMap<i64, i32> {
        &self.steam_id_to_player_slot
    }

    /// Register a combat-log name for a slot.
    pub fn register_name(&mut self, name: &str, slot: i32) {
        self.name_to_slot.insert(name.to_string(), slot);
    }

    /// Slot of a combat-log unit name.
    pub fn slot_by_name(&self, name: &str) -> Option<i32> {
        self.name_to_slot.get(name).copied()
    }
}
