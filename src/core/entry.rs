//! Output Entries
//!
//! One flat record per emitted event. The `type` tag selects which optional
//! fields are meaningful; everything else stays `None` and is omitted from
//! the JSON line. Each event family has a named constructor so fields of
//! unrelated families never end up on the same entry.

use serde::{Serialize, Deserialize};

/// Offset added to a team-relative slot for the second team's player slot.
pub const PLAYER_SLOT_OFFSET: i32 = 128;

/// Type tags of the entries the engine produces.
pub mod kind {
    /// Per-second player sample.
    pub const INTERVAL: &str = "interval";
    /// Slot assignment emitted once per player.
    pub const PLAYER_SLOT: &str = "player_slot";
    /// First moment a player is in control of the draft.
    pub const DRAFT_START: &str = "draft_start";
    /// One pick or ban.
    pub const DRAFT_TIMINGS: &str = "draft_timings";
    /// Ability level change.
    pub const ABILITY_LEVEL: &str = "DOTA_ABILITY_LEVEL";
    /// Inventory snapshot on the first second after the epoch.
    pub const STARTING_ITEM: &str = "STARTING_ITEM";
    /// Combat-log purchase; also used for first-seen inventories.
    pub const PURCHASE: &str = "DOTA_COMBATLOG_PURCHASE";
    /// Prefix shared by all combat-log entry types.
    pub const COMBAT_LOG_PREFIX: &str = "DOTA_COMBATLOG_";
    /// Completed pause with its duration.
    pub const GAME_PAUSED: &str = "game_paused";
    /// Observer ward placed or changed.
    pub const OBSERVER: &str = "obs";
    /// Sentry ward placed or changed.
    pub const SENTRY: &str = "sen";
    /// Observer ward left the world.
    pub const OBSERVER_LEFT: &str = "obs_left";
    /// Sentry ward left the world.
    pub const SENTRY_LEFT: &str = "sen_left";
    /// Spectator unit order.
    pub const ACTIONS: &str = "actions";
    /// Location ping.
    pub const PINGS: &str = "pings";
    /// All-chat line.
    pub const CHAT: &str = "chat";
    /// Chat wheel line.
    pub const CHATWHEEL: &str = "chatwheel";
    /// Cosmetics map, emitted at the end.
    pub const COSMETICS: &str = "cosmetics";
    /// Dota Plus hero badge xp map, emitted at the end.
    pub const DOTAPLUS: &str = "dotaplus";
    /// Final file info.
    pub const EPILOGUE: &str = "epilogue";
    /// Neutral token entered the world.
    pub const NEUTRAL_TOKEN: &str = "neutral_token";
    /// Neutral item dropped.
    pub const NEUTRAL_ITEM_HISTORY: &str = "neutral_item_history";
    /// Hero position sample.
    pub const POSITION: &str = "position";
}

/// Item found in a hero inventory slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    /// Entity name, e.g. `item_tango`.
    pub id: String,
    /// Inventory slot (0-5 inventory, 6-8 backpack).
    pub slot: i32,
    /// Stack size for stackable items.
    pub num_charges: Option<i32>,
    // ward dispensers keep sentries here and observers in num_charges
    /// Secondary charge count.
    pub num_secondary_charges: Option<i32>,
}

/// Ability found in a hero ability slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ability {
    /// Entity name, e.g. `axe_berserkers_call`.
    pub id: String,
    /// Current level.
    pub level: Option<i32>,
}

/// One emitted event.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Seconds; tick-relative until the epoch resolves, then game-relative.
    pub time: i32,
    /// Discriminating tag.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_slot: Option<i32>,

    // chat events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player1: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player2: Option<i32>,

    // combat log
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attackername: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targetname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sourcename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targetsourcename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attackerhero: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targethero: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attackerillusion: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targetillusion: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abilitylevel: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inflictor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gold_reason: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp_reason: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valuename: Option<String>,

    // entity samples
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gold: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lh: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stuns: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet_hero_id: Option<i32>,
    /// Inventory walked for this sample; never serialized.
    #[serde(skip)]
    pub hero_inventory: Option<Vec<Item>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itemslot: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charges: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_charges: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub life_state: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kills: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deaths: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assists: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denies: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entityleft: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ehandle: Option<i32>,
    #[serde(rename = "isNeutralActiveDrop", skip_serializing_if = "Option::is_none")]
    pub is_neutral_active_drop: Option<bool>,
    #[serde(rename = "isNeutralPassiveDrop", skip_serializing_if = "Option::is_none")]
    pub is_neutral_passive_drop: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obs_placed: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sen_placed: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creeps_stacked: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camps_stacked: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rune_pickups: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repicked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub randomed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pred_vict: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stun_duration: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slow_duration: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracked_death: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greevils_greed_stack: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracked_sourcename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstblood_claimed: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teamfight_participation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub towers_killed: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roshans_killed: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observers_placed: Option<i32>,

    // draft
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pick: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_active_team: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_extime0: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_extime1: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub networth: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<i32>,
}

impl Entry {
    /// Create an entry with only time and type set.
    pub fn new(time: i32, kind: impl Into<String>) -> Self {
        Self {
            time,
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Slot assignment: `key` is the 0-9 slot, `value` the player slot.
    pub fn player_slot(time: i32, slot: i32, player_slot: i32) -> Self {
        Self {
            key: Some(slot.to_string()),
            value: Some(player_slot),
            ..Self::new(time, kind::PLAYER_SLOT)
        }
    }

    /// Draft start marker.
    pub fn draft_start(time: i32) -> Self {
        Self::new(time, kind::DRAFT_START)
    }

    /// One pick or ban.
    pub fn draft_timing(
        time: i32,
        draft_order: i32,
        pick: bool,
        hero_id: i32,
        active_team: Option<i32>,
        extra_time: [Option<i32>; 2],
    ) -> Self {
        Self {
            draft_order: Some(draft_order),
            pick: Some(pick),
            hero_id: Some(hero_id),
            draft_active_team: active_team,
            draft_extime0: extra_time[0],
            draft_extime1: extra_time[1],
            ..Self::new(time, kind::DRAFT_TIMINGS)
        }
    }

    /// Ability level change for a hero.
    pub fn ability_level(time: i32, hero_name: &str, ability: &Ability) -> Self {
        Self {
            targetname: Some(hero_name.to_string()),
            valuename: Some(ability.id.clone()),
            abilitylevel: ability.level,
            ..Self::new(time, kind::ABILITY_LEVEL)
        }
    }

    /// Item held on the first second after the epoch.
    pub fn starting_item(time: i32, slot: i32, hero_name: &str, item: &Item) -> Self {
        Self {
            slot: Some(slot),
            value: Some(starting_item_player_slot(slot)),
            targetname: Some(hero_name.to_string()),
            valuename: Some(item.id.clone()),
            itemslot: Some(item.slot),
            charges: item.num_charges,
            secondary_charges: item.num_secondary_charges,
            ..Self::new(time, kind::STARTING_ITEM)
        }
    }

    /// Purchase-shaped entry for an item in a first-seen inventory.
    pub fn initial_purchase(time: i32, slot: i32, hero_name: &str, item: &Item) -> Self {
        Self {
            slot: Some(slot),
            value: Some(starting_item_player_slot(slot)),
            targetname: Some(hero_name.to_string()),
            valuename: Some(item.id.clone()),
            charges: item.num_charges,
            ..Self::new(time, kind::PURCHASE)
        }
    }

    /// Completed pause, stamped at the pause start.
    pub fn game_paused(time: i32, duration: i32) -> Self {
        Self {
            key: Some("pause_duration".to_string()),
            value: Some(duration),
            ..Self::new(time, kind::GAME_PAUSED)
        }
    }

    /// True for entries that came from (or mimic) the combat log.
    pub fn is_combat_log(&self) -> bool {
        self.kind.starts_with(kind::COMBAT_LOG_PREFIX)
    }
}

/// Player slot stamped on starting-item entries.
///
/// Slots 5-9 get the second-team offset added on top of the global slot.
pub fn starting_item_player_slot(slot: i32) -> i32 {
    (if slot < 5 { 0 } else { PLAYER_SLOT_OFFSET }) + slot
}
