//! End-of-match metadata for the `game_info` tables.
//!
//! Built once from the terminal file info. The JSON columns hold only the
//! fields the replay actually carried.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::entry::PLAYER_SLOT_OFFSET;
use crate::decoder::events::{DotaGameInfo, FileInfo};
use crate::engine::constants::{DIRE_TEAM_ID, RADIANT_TEAM_ID};

/// One roster row for `game_players`.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GamePlayer {
    pub player_slot: Option<i32>,
    pub steam_id: Option<i64>,
    pub player_name: Option<String>,
    pub hero_name: Option<String>,
    pub game_team: Option<i32>,
    pub is_fake_client: Option<bool>,
}

/// One pick or ban row for `game_picks_bans`.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PickBan {
    pub is_pick: Option<bool>,
    pub team: Option<i32>,
    pub hero_id: Option<i32>,
}

/// Everything written to `game_info` and its child tables.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameInfoPayload {
    /// Match id as recorded in the replay.
    pub source_match_id: Option<i64>,
    pub playback_time: Option<f32>,
    pub playback_ticks: Option<i32>,
    pub playback_frames: Option<i32>,
    pub game_mode: Option<i32>,
    pub game_winner: Option<i32>,
    pub league_id: Option<i32>,
    pub radiant_team_id: Option<i32>,
    pub dire_team_id: Option<i32>,
    pub radiant_team_tag: Option<String>,
    pub dire_team_tag: Option<String>,
    pub end_time: Option<i32>,
    pub players_json: Option<String>,
    pub picks_bans_json: Option<String>,
    pub raw_file_info_json: String,
    pub players: Vec<GamePlayer>,
    pub picks_bans: Vec<PickBan>,
}

fn put<T: Serialize>(map: &mut Map<String, Value>, key: &str, value: &Option<T>) {
    if let Some(v) = value {
        if let Ok(v) = serde_json::to_value(v) {
            map.insert(key.to_string(), v);
        }
    }
}

impl GameInfoPayload {
    /// Build the payload. `steam_ids` maps 64-bit ids to player slots.
    pub fn build(info: &FileInfo, steam_ids: &BTreeMap<i64, i32>) -> Result<Self, serde_json::Error> {
        let mut payload = Self {
            playback_time: info.playback_time,
            playback_ticks: info.playback_ticks,
            playback_frames: info.playback_frames,
            ..Self::default()
        };
        let mut raw = Map::new();
        put(&mut raw, "playback_time", &info.playback_time);
        put(&mut raw, "playback_ticks", &info.playback_ticks);
        put(&mut raw, "playback_frames", &info.playback_frames);

        if let Some(game_info) = &info.game_info {
            let mut game_map = Map::new();
            if let Some(dota) = &game_info.dota {
                let dota_map = payload.absorb(dota, steam_ids)?;
                if !dota_map.is_empty() {
                    game_map.insert("dota".to_string(), Value::Object(dota_map));
                }
            }
            if !game_map.is_empty() {
                raw.insert("game_info".to_string(), Value::Object(game_map));
            }
        }

        raw.insert("raw_text".to_string(), Value::String(serde_json::to_string(info)?));
        payload.raw_file_info_json = serde_json::to_string(&raw)?;
        Ok(payload)
    }

    fn absorb(&mut self, dota: &DotaGameInfo, steam_ids: &BTreeMap<i64, i32>) -> Result<Map<String, Value>, serde_json::Error> {
        self.source_match_id = dota.match_id;
        self.game_mode = dota.game_mode;
        self.game_winner = dota.game_winner;
        self.league_id = dota.leagueid;
        self.radiant_team_id = dota.radiant_team_id;
        self.dire_team_id = dota.dire_team_id;
        self.radiant_team_tag = dota.radiant_team_tag.clone();
        self.dire_team_tag = dota.dire_team_tag.clone();
        self.end_time = dota.end_time;

        let mut map = Map::new();
        put(&mut map, "match_id", &dota.match_id);
        put(&mut map, "game_mode", &dota.game_mode);
        put(&mut map, "game_winner", &dota.game_winner);
        put(&mut map, "league_id", &dota.leagueid);
        put(&mut map, "radiant_team_id", &dota.radiant_team_id);
        put(&mut map, "dire_team_id", &dota.dire_team_id);
        put(&mut map, "radiant_team_tag", &dota.radiant_team_tag);
        put(&mut map, "dire_team_tag", &dota.dire_team_tag);
        put(&mut map, "end_time", &dota.end_time);

        let mut player_entries = Vec::new();
        for p in &dota.player_info {
            let mut entry = Map::new();
            put(&mut entry, "steam_id", &p.steamid);
            put(&mut entry, "player_name", &p.player_name);
            put(&mut entry, "hero_name", &p.hero_name);
            put(&mut entry, "game_team", &p.game_team);
            put(&mut entry, "is_fake_client", &p.is_fake_client);
            if entry.is_empty() {
                continue;
            }
            let player_slot = p
                .steamid
                .and_then(|id| steam_ids.get(&id).copied())
                .or_else(|| fallback_player_slot(&self.players, p.game_team));
            self.players.push(GamePlayer {
                player_slot,
                steam_id: p.steamid,
                player_name: p.player_name.clone(),
                hero_name: p.hero_name.clone(),
                game_team: p.game_team,
                is_fake_client: p.is_fake_client,
            });
            player_entries.push(Value::Object(entry));
        }
        if !player_entries.is_empty() {
            self.players_json = Some(serde_json::to_string(&player_entries)?);
            map.insert("players".to_string(), Value::Array(player_entries));
        }

        let mut pick_entries = Vec::new();
        for e in &dota.picks_bans {
            let mut entry = Map::new();
            put(&mut entry, "is_pick", &e.is_pick);
            put(&mut entry, "team", &e.team);
            put(&mut entry, "hero_id", &e.hero_id);
            if entry.is_empty() {
                continue;
            }
            self.picks_bans.push(PickBan {
                is_pick: e.is_pick,
                team: e.team,
                hero_id: e.hero_id,
            });
            pick_entries.push(Value::Object(entry));
        }
        if !pick_entries.is_empty() {
            self.picks_bans_json = Some(serde_json::to_string(&pick_entries)?);
            map.insert("picks_bans".to_string(), Value::Array(pick_entries));
        }
        Ok(map)
    }
}

/// Slot from roster order when the 64-bit id is unknown.
fn fallback_player_slot(earlier: &[GamePlayer], team: Option<i32>) -> Option<i32> {
    let count = |t: i32| earlier.iter().filter(|p| p.game_team == Some(t)).count() as i32;
    match team? {
        RADIANT_TEAM_ID => Some(count(RADIANT_TEAM_ID)),
        DIRE_TEAM_ID => Some(PLAYER_SLOT_OFFSET + count(DIRE_TEAM_ID)),
        _ => None,
    }
}
