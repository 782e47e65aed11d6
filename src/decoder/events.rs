//! Decoder Events
//!
//! The closed set of inputs the engine consumes, in the order the decoder
//! produces them. One JSON object per line on the wire, tagged by `event`.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::property::{Entity, PropertyValue};
use crate::decoder::combat_log::CombatLogEntry;

// =============================================================================
// DECODER -> ENGINE
// =============================================================================

/// One decoder callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DecoderEvent {
    /// An entity was created (and entered the world).
    EntityCreated(Entity),

    /// Properties of a live entity changed.
    EntityUpdated {
        index: i32,
        changes: BTreeMap<String, PropertyValue>,
    },

    /// An entity was destroyed.
    EntityDeleted { index: i32 },

    /// A string-table row was set.
    StringTable {
        table: String,
        index: i32,
        name: String,
    },

    /// Raw network tick number.
    NetTick { tick: i32 },

    /// Start of a tick.
    TickStart {
        #[serde(default)]
        synthetic: bool,
    },

    /// End of a tick.
    TickEnd {
        #[serde(default)]
        synthetic: bool,
    },

    /// Classified combat-log entry.
    CombatLog(CombatLogEntry),

    /// A user message.
    UserMessage(UserMessage),

    /// Terminal file info; the last event of a replay.
    FileInfo(FileInfo),
}

// =============================================================================
// USER MESSAGES
// =============================================================================

/// User messages the engine turns into entries.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "message", rename_all = "snake_case")]
pub enum UserMessage {
    /// A player issued a unit order (spectator view).
    SpectatorPlayerUnitOrders {
        /// Index of the ordering player's entity.
        entindex: i32,
        #[serde(default)]
        order_type: i32,
    },

    /// Minimap ping.
    LocationPing {
        #[serde(default)]
        player_id: i32,
    },

    /// Scripted chat event (kills, runes, pauses).
    ChatEvent {
        /// Event enum name, e.g. `CHAT_MESSAGE_RUNE_PICKUP`.
        chat_type: String,
        #[serde(default)]
        value: i32,
        #[serde(default)]
        playerid_1: i32,
        #[serde(default)]
        playerid_2: i32,
    },

    /// Player-typed chat line.
    ChatMessage {
        #[serde(default)]
        channel_type: i32,
        #[serde(default)]
        source_player_id: i32,
        #[serde(default)]
        message_text: String,
    },

    /// Chat wheel phrase.
    ChatWheel {
        #[serde(default)]
        player_id: i32,
        #[serde(default)]
        chat_message_id: i32,
    },

    /// Legacy say-text.
    SayTextS1 {
        #[serde(default)]
        prefix: String,
        #[serde(default)]
        text: String,
    },

    /// Current say-text.
    SayTextS2 {
        #[serde(default)]
        entityindex: i32,
        #[serde(default)]
        param1: String,
        #[serde(default)]
        param2: String,
    },
}

// =============================================================================
// FILE INFO
// =============================================================================

/// Terminal replay metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Replay length in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playback_time: Option<f32>,
    /// Replay length in ticks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playback_ticks: Option<i32>,
    /// Replay length in frames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playback_frames: Option<i32>,
    /// Game metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_info: Option<GameInfo>,
}

impl FileInfo {
    /// Dota-specific metadata, if present.
    pub fn dota(&self) -> Option<&DotaGameInfo> {
        self.game_info.as_ref()?.dota.as_ref()
    }
}

/// Game metadata wrapper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameInfo {
    /// Dota-specific metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dota: Option<DotaGameInfo>,
}

/// Match metadata.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DotaGameInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_mode: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_winner: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leagueid: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radiant_team_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dire_team_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radiant_team_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dire_team_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub player_info: Vec<PlayerInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub picks_bans: Vec<HeroSelectEvent>,
}

/// One player in the match roster.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_fake_client: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steamid: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_team: Option<i32>,
}

/// One pick or ban.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeroSelectEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_pick: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_id: Option<i32>,
}
