//! Event Store
//!
//! Type-routed relational sink for emitted entries. Each entry family has
//! its own table; rows are written inside an open transaction that is
//! committed whenever the caller flushes a batch.

use std::time::Duration;

use rusqlite::{params, Connection, ToSql};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::entry::{kind, Entry};
use crate::output::game_info::GameInfoPayload;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database failure.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A write needed a match id that is not known yet.
    #[error("match id not available")]
    MissingMatchId,

    /// A JSON column could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A relational sink for entries and end-of-match metadata.
pub trait EventStore {
    /// Queue one entry for `match_id`. Unroutable entries are skipped.
    fn insert_event(&mut self, match_id: i64, entry: &Entry) -> Result<(), StorageError>;

    /// Make every queued write durable.
    fn execute_batch(&mut self) -> Result<(), StorageError>;

    /// Upsert the match row and replace its roster and pick/ban rows.
    fn upsert_game_info(&mut self, match_id: i64, payload: &GameInfoPayload) -> Result<(), StorageError>;
}

// =============================================================================
// ROUTING
// =============================================================================

/// Destination table of an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// `combat_log_events`
    CombatLog,
    /// `action_events`
    Action,
    /// `ping_events`
    Ping,
    /// `chat_events`
    Chat,
    /// `chat_type_events`, for numeric chat channel types
    ChatType,
    /// `chatwheel_events`
    Chatwheel,
    /// `cosmetics_events`
    Cosmetics,
    /// `dotaplus_events`
    Dotaplus,
    /// `epilogue_events`
    Epilogue,
    /// `neutral_token_events`
    NeutralToken,
    /// `neutral_item_history_events`
    NeutralItemHistory,
    /// `player_slot_events`
    PlayerSlot,
    /// `draft_start_events`
    DraftStart,
    /// `draft_timing_events`
    DraftTiming,
    /// `interval_events`
    Interval,
    /// `ability_level_events`
    AbilityLevel,
    /// `starting_item_events`
    StartingItem,
    /// `game_paused_events`
    GamePaused,
    /// `ward_events`
    Ward,
    /// `position_events`
    Position,
}

/// Pick the table for an entry type.
pub fn route(entry_type: &str) -> Option<Route> {
    if entry_type.starts_with(kind::COMBAT_LOG_PREFIX) {
        return Some(Route::CombatLog);
    }
    let route = match entry_type {
        kind::ACTIONS => Route::Action,
        kind::PINGS => Route::Ping,
        kind::CHAT => Route::Chat,
        kind::CHATWHEEL => Route::Chatwheel,
        kind::COSMETICS => Route::Cosmetics,
        kind::DOTAPLUS => Route::Dotaplus,
        kind::EPILOGUE => Route::Epilogue,
        kind::NEUTRAL_TOKEN => Route::NeutralToken,
        kind::NEUTRAL_ITEM_HISTORY => Route::NeutralItemHistory,
        kind::PLAYER_SLOT => Route::PlayerSlot,
        kind::DRAFT_START => Route::DraftStart,
        kind::DRAFT_TIMINGS => Route::DraftTiming,
        kind::INTERVAL => Route::Interval,
        kind::ABILITY_LEVEL => Route::AbilityLevel,
        kind::STARTING_ITEM => Route::StartingItem,
        kind::GAME_PAUSED => Route::GamePaused,
        kind::OBSERVER | kind::SENTRY | kind::OBSERVER_LEFT | kind::SENTRY_LEFT => Route::Ward,
        kind::POSITION => Route::Position,
        other if other.parse::<i32>().is_ok() => Route::ChatType,
        _ => return None,
    };
    Some(route)
}

// =============================================================================
// SCHEMA
// =============================================================================

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS combat_log_events (
    match_id INTEGER NOT NULL, time INTEGER NOT NULL, type TEXT NOT NULL,
    attackername TEXT, targetname TEXT, sourcename TEXT, targetsourcename TEXT,
    attackerhero INTEGER, targethero INTEGER, attackerillusion INTEGER, targetillusion INTEGER,
    inflictor TEXT, value INTEGER, valuename TEXT, gold_reason INTEGER, xp_reason INTEGER,
    stun_duration REAL, slow_duration REAL, greevils_greed_stack INTEGER,
    tracked_death INTEGER, tracked_sourcename TEXT, created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS action_events (
    match_id INTEGER NOT NULL, time INTEGER NOT NULL, slot INTEGER, "key" TEXT, created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS ping_events (
    match_id INTEGER NOT NULL, time INTEGER NOT NULL, slot INTEGER, created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS chat_type_events (
    match_id INTEGER NOT NULL, time INTEGER NOT NULL, type TEXT NOT NULL,
    player1 INTEGER, player2 INTEGER, value INTEGER, created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS chat_events (
    match_id INTEGER NOT NULL, time INTEGER NOT NULL, slot INTEGER, unit TEXT, "key" TEXT, created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS chatwheel_events (
    match_id INTEGER NOT NULL, time INTEGER NOT NULL, slot INTEGER, "key" TEXT, created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS cosmetics_events (
    match_id INTEGER NOT NULL, time INTEGER NOT NULL, "key" TEXT, created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS dotaplus_events (
    match_id INTEGER NOT NULL, time INTEGER NOT NULL, "key" TEXT, created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS epilogue_events (
    match_id INTEGER NOT NULL, time INTEGER NOT NULL, "key" TEXT, created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS neutral_token_events (
    match_id INTEGER NOT NULL, time INTEGER NOT NULL, slot INTEGER, "key" TEXT, created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS neutral_item_history_events (
    match_id INTEGER NOT NULL, time INTEGER NOT NULL, slot INTEGER, "key" TEXT,
    isNeutralActiveDrop INTEGER, isNeutralPassiveDrop INTEGER, created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS player_slot_events (
    match_id INTEGER NOT NULL, time INTEGER NOT NULL, "key" TEXT, value INTEGER, created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS draft_start_events (
    match_id INTEGER NOT NULL, time INTEGER NOT NULL, created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS draft_timing_events (
    match_id INTEGER NOT NULL, time INTEGER NOT NULL, draft_order INTEGER, pick INTEGER, hero_id INTEGER,
    draft_active_team INTEGER, draft_extime0 INTEGER, draft_extime1 INTEGER, created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS interval_events (
    match_id INTEGER NOT NULL, time INTEGER NOT NULL, slot INTEGER, unit TEXT, hero_id INTEGER,
    variant INTEGER, facet_hero_id INTEGER, level INTEGER, x REAL, y REAL, life_state INTEGER,
    gold INTEGER, lh INTEGER, xp INTEGER, stuns REAL, kills INTEGER, deaths INTEGER, assists INTEGER,
    denies INTEGER, obs_placed INTEGER, sen_placed INTEGER, creeps_stacked INTEGER, camps_stacked INTEGER,
    rune_pickups INTEGER, towers_killed INTEGER, roshans_killed INTEGER, observers_placed INTEGER,
    networth INTEGER, repicked INTEGER, randomed INTEGER, pred_vict INTEGER, firstblood_claimed INTEGER,
    teamfight_participation REAL, stage INTEGER, created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS ability_level_events (
    match_id INTEGER NOT NULL, time INTEGER NOT NULL, targetname TEXT, valuename TEXT,
    abilitylevel INTEGER, created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS starting_item_events (
    match_id INTEGER NOT NULL, time INTEGER NOT NULL, slot INTEGER, targetname TEXT, valuename TEXT,
    value INTEGER, itemslot INTEGER, charges INTEGER, secondary_charges INTEGER, created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS game_paused_events (
    match_id INTEGER NOT NULL, time INTEGER NOT NULL, "key" TEXT, value INTEGER, created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS ward_events (
    match_id INTEGER NOT NULL, time INTEGER NOT NULL, type TEXT NOT NULL, slot INTEGER,
    x REAL, y REAL, z REAL, entityleft INTEGER, ehandle INTEGER, attackername TEXT, created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS position_events (
    match_id INTEGER NOT NULL, time INTEGER NOT NULL, slot INTEGER, unit TEXT, hero_id INTEGER,
    x REAL NOT NULL, y REAL NOT NULL, life_state INTEGER, created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS game_info (
    match_id INTEGER PRIMARY KEY, replay_match_id INTEGER, playback_time REAL, playback_ticks INTEGER,
    playback_frames INTEGER, game_mode INTEGER, game_winner INTEGER, league_id INTEGER,
    radiant_team_id INTEGER, dire_team_id INTEGER, radiant_team_tag TEXT, dire_team_tag TEXT,
    end_time INTEGER, players TEXT, picks_bans TEXT, raw_file_info TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS game_players (
    match_id INTEGER NOT NULL, player_slot INTEGER, steam_id INTEGER, player_name TEXT,
    hero_name TEXT, game_team INTEGER, is_fake_client INTEGER
);
CREATE TABLE IF NOT EXISTS game_picks_bans (
    match_id INTEGER NOT NULL, ord INTEGER NOT NULL, is_pick INTEGER, team INTEGER, hero_id INTEGER
);
"#;

const UPSERT_GAME_INFO: &str = "INSERT INTO game_info (
    match_id, replay_match_id, playback_time, playback_ticks, playback_frames,
    game_mode, game_winner, league_id, radiant_team_id, dire_team_id,
    radiant_team_tag, dire_team_tag, end_time, players, picks_bans, raw_file_info
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
ON CONFLICT(match_id) DO UPDATE SET
    replay_match_id = excluded.replay_match_id,
    playback_time = excluded.playback_time,
    playback_ticks = excluded.playback_ticks,
    playback_frames = excluded.playback_frames,
    game_mode = excluded.game_mode,
    game_winner = excluded.game_winner,
    league_id = excluded.league_id,
    radiant_team_id = excluded.radiant_team_id,
    dire_team_id = excluded.dire_team_id,
    radiant_team_tag = excluded.radiant_team_tag,
    dire_team_tag = excluded.dire_team_tag,
    end_time = excluded.end_time,
    players = excluded.players,
    picks_bans = excluded.picks_bans,
    raw_file_info = excluded.raw_file_info";

// =============================================================================
// SQLITE STORE
// =============================================================================

/// How long a writer waits for another connection's lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// SQLite-backed event store.
pub struct SqliteStore {
    conn: Connection,
    in_transaction: bool,
}

impl SqliteStore {
    /// Open (or create) a database file and ensure the schema exists.
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        // parallel parses share the file
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            in_transaction: false,
        })
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn begin(&mut self) -> Result<(), StorageError> {
        if !self.in_transaction {
            self.conn.execute_batch("BEGIN")?;
            self.in_transaction = true;
        }
        Ok(())
    }

    fn exec(&self, sql: &str, values: &[&dyn ToSql]) -> Result<(), StorageError> {
        self.conn.prepare_cached(sql)?.execute(values)?;
        Ok(())
    }

    fn insert_routed(&self, route: Route, match_id: i64, e: &Entry, now: &str) -> Result<(), StorageError> {
        let t = e.time;
        match route {
            Route::CombatLog => self.exec(
                "INSERT INTO combat_log_events (match_id, time, type, attackername, targetname, sourcename,
                 targetsourcename, attackerhero, targethero, attackerillusion, targetillusion, inflictor,
                 value, valuename, gold_reason, xp_reason, stun_duration, slow_duration, greevils_greed_stack,
                 tracked_death, tracked_sourcename, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22)",
                params![
                    match_id, t, e.kind, e.attackername, e.targetname, e.sourcename,
                    e.targetsourcename, e.attackerhero, e.targethero, e.attackerillusion, e.targetillusion, e.inflictor,
                    e.value, e.valuename, e.gold_reason, e.xp_reason, e.stun_duration, e.slow_duration, e.greevils_greed_stack,
                    e.tracked_death, e.tracked_sourcename, now
                ],
            ),
            Route::Action => self.exec(
                r#"INSERT INTO action_events (match_id, time, slot, "key", created_at) VALUES (?1, ?2, ?3, ?4, ?5)"#,
                params![match_id, t, e.slot, e.key, now],
            ),
            Route::Ping => self.exec(
                "INSERT INTO ping_events (match_id, time, slot, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![match_id, t, e.slot, now],
            ),
            Route::ChatType => self.exec(
                "INSERT INTO chat_type_events (match_id, time, type, player1, player2, value, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![match_id, t, e.kind, e.player1, e.player2, e.value, now],
            ),
            Route::Chat => self.exec(
                r#"INSERT INTO chat_events (match_id, time, slot, unit, "key", created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
                params![match_id, t, e.slot, e.unit, e.key, now],
            ),
            Route::Chatwheel => self.exec(
                r#"INSERT INTO chatwheel_events (match_id, time, slot, "key", created_at) VALUES (?1, ?2, ?3, ?4, ?5)"#,
                params![match_id, t, e.slot, e.key, now],
            ),
            Route::Cosmetics => self.exec(
                r#"INSERT INTO cosmetics_events (match_id, time, "key", created_at) VALUES (?1, ?2, ?3, ?4)"#,
                params![match_id, t, e.key, now],
            ),
            Route::Dotaplus => self.exec(
                r#"INSERT INTO dotaplus_events (match_id, time, "key", created_at) VALUES (?1, ?2, ?3, ?4)"#,
                params![match_id, t, e.key, now],
            ),
            Route::Epilogue => self.exec(
                r#"INSERT INTO epilogue_events (match_id, time, "key", created_at) VALUES (?1, ?2, ?3, ?4)"#,
                params![match_id, t, e.key, now],
            ),
            Route::NeutralToken => self.exec(
                r#"INSERT INTO neutral_token_events (match_id, time, slot, "key", created_at) VALUES (?1, ?2, ?3, ?4, ?5)"#,
                params![match_id, t, e.slot, e.key, now],
            ),
            Route::NeutralItemHistory => self.exec(
                r#"INSERT INTO neutral_item_history_events (match_id, time, slot, "key", isNeutralActiveDrop,
                   isNeutralPassiveDrop, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
                params![match_id, t, e.slot, e.key, e.is_neutral_active_drop, e.is_neutral_passive_drop, now],
            ),
            Route::PlayerSlot => self.exec(
                r#"INSERT INTO player_slot_events (match_id, time, "key", value, created_at) VALUES (?1, ?2, ?3, ?4, ?5)"#,
                params![match_id, t, e.key, e.value, now],
            ),
            Route::DraftStart => self.exec(
                "INSERT INTO draft_start_events (match_id, time, created_at) VALUES (?1, ?2, ?3)",
                params![match_id, t, now],
            ),
            Route::DraftTiming => self.exec(
                "INSERT INTO draft_timing_events (match_id, time, draft_order, pick, hero_id,
                 draft_active_team, draft_extime0, draft_extime1, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    match_id, t, e.draft_order, e.pick, e.hero_id,
                    e.draft_active_team, e.draft_extime0, e.draft_extime1, now
                ],
            ),
            Route::Interval => self.exec(
                "INSERT INTO interval_events (match_id, time, slot, unit, hero_id, variant, facet_hero_id,
                 level, x, y, life_state, gold, lh, xp, stuns, kills, deaths, assists, denies,
                 obs_placed, sen_placed, creeps_stacked, camps_stacked, rune_pickups, towers_killed,
                 roshans_killed, observers_placed, networth, repicked, randomed, pred_vict,
                 firstblood_claimed, teamfight_participation, stage, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18,
                 ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, ?31, ?32, ?33, ?34, ?35)",
                params![
                    match_id, t, e.slot, e.unit, e.hero_id, e.variant, e.facet_hero_id,
                    e.level, e.x, e.y, e.life_state, e.gold, e.lh, e.xp, e.stuns, e.kills, e.deaths, e.assists, e.denies,
                    e.obs_placed, e.sen_placed, e.creeps_stacked, e.camps_stacked, e.rune_pickups, e.towers_killed,
                    e.roshans_killed, e.observers_placed, e.networth, e.repicked, e.randomed, e.pred_vict,
                    e.firstblood_claimed, e.teamfight_participation, e.stage, now
                ],
            ),
            Route::AbilityLevel => self.exec(
                "INSERT INTO ability_level_events (match_id, time, targetname, valuename, abilitylevel, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![match_id, t, e.targetname, e.valuename, e.abilitylevel, now],
            ),
            Route::StartingItem => self.exec(
                "INSERT INTO starting_item_events (match_id, time, slot, targetname, valuename, value,
                 itemslot, charges, secondary_charges, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    match_id, t, e.slot, e.targetname, e.valuename, e.value,
                    e.itemslot, e.charges, e.secondary_charges, now
                ],
            ),
            Route::GamePaused => self.exec(
                r#"INSERT INTO game_paused_events (match_id, time, "key", value, created_at) VALUES (?1, ?2, ?3, ?4, ?5)"#,
                params![match_id, t, e.key, e.value, now],
            ),
            Route::Ward => self.exec(
                "INSERT INTO ward_events (match_id, time, type, slot, x, y, z, entityleft, ehandle,
                 attackername, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![match_id, t, e.kind, e.slot, e.x, e.y, e.z, e.entityleft, e.ehandle, e.attackername, now],
            ),
            Route::Position => {
                let (Some(x), Some(y)) = (e.x, e.y) else {
                    debug!(time = t, slot = ?e.slot, "position without coordinates, skipping");
                    return Ok(());
                };
                self.exec(
                    "INSERT INTO position_events (match_id, time, slot, unit, hero_id, x, y, life_state, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    params![match_id, t, e.slot, e.unit, e.hero_id, x, y, e.life_state, now],
                )
            }
        }
    }

    fn write_game_info(&self, match_id: i64, p: &GameInfoPayload) -> Result<(), StorageError> {
        self.exec(
            UPSERT_GAME_INFO,
            params![
                match_id, p.source_match_id, p.playback_time, p.playback_ticks, p.playback_frames,
                p.game_mode, p.game_winner, p.league_id, p.radiant_team_id, p.dire_team_id,
                p.radiant_team_tag, p.dire_team_tag, p.end_time, p.players_json, p.picks_bans_json,
                p.raw_file_info_json
            ],
        )?;

        if !p.players.is_empty() {
            self.exec("DELETE FROM game_players WHERE match_id = ?1", params![match_id])?;
            for player in &p.players {
                self.exec(
                    "INSERT INTO game_players (match_id, player_slot, steam_id, player_name, hero_name,
                     game_team, is_fake_client) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        match_id, player.player_slot, player.steam_id, player.player_name,
                        player.hero_name, player.game_team, player.is_fake_client
                    ],
                )?;
            }
        }
        if !p.picks_bans.is_empty() {
            self.exec("DELETE FROM game_picks_bans WHERE match_id = ?1", params![match_id])?;
            for (ord, pb) in p.picks_bans.iter().enumerate() {
                self.exec(
                    "INSERT INTO game_picks_bans (match_id, ord, is_pick, team, hero_id) VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![match_id, ord as i64, pb.is_pick, pb.team, pb.hero_id],
                )?;
            }
        }
        Ok(())
    }
}

impl EventStore for SqliteStore {
    fn insert_event(&mut self, match_id: i64, entry: &Entry) -> Result<(), StorageError> {
        let Some(route) = route(&entry.kind) else {
            debug!(entry_type = %entry.kind, "unknown event type, not stored");
            return Ok(());
        };
        self.begin()?;
        let now = chrono::Utc::now().to_rfc3339();
        self.insert_routed(route, match_id, entry, &now)
    }

    fn execute_batch(&mut self) -> Result<(), StorageError> {
        if self.in_transaction {
            self.conn.execute_batch("COMMIT")?;
            self.in_transaction = false;
        }
        Ok(())
    }

    fn upsert_game_info(&mut self, match_id: i64, p: &GameInfoPayload) -> Result<(), StorageError> {
        self.begin()?;
        // the match row and its children land together or not at all
        self.conn.execute_batch("SAVEPOINT game_info")?;
        match self.write_game_info(match_id, p) {
            Ok(()) => {
                self.conn.execute_batch("RELEASE game_info")?;
                Ok(())
            }
            Err(e) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK TO game_info; RELEASE game_info") {
                    warn!(match_id, error = %rollback, "game info rollback failed");
                    self.in_transaction = !self.conn.is_autocommit();
                }
                Err(e)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::game_info::{GamePlayer, PickBan};

    fn count(store: &SqliteStore, table: &str) -> i64 {
        store
            .connection()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_routes() {
        assert_eq!(route("DOTA_COMBATLOG_DAMAGE"), Some(Route::CombatLog));
        assert_eq!(route("DOTA_COMBATLOG_PURCHASE"), Some(Route::CombatLog));
        assert_eq!(route("obs_left"), Some(Route::Ward));
        assert_eq!(route("draft_timings"), Some(Route::DraftTiming));
        assert_eq!(route("12"), Some(Route::ChatType));
        assert_eq!(route("CHAT_MESSAGE_RUNE_PICKUP"), None);
        assert_eq!(route("position"), Some(Route::Position));
    }

    #[test]
    fn test_insert_and_commit() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut ward = Entry::new(300, kind::OBSERVER);
        ward.x = Some(100.5);
        ward.attackername = Some("npc_dota_hero_axe".into());
        store.insert_event(1, &ward).unwrap();
        store.insert_event(1, &Entry::draft_start(-60)).unwrap();
        store.insert_event(1, &Entry::new(5, "DOTA_COMBATLOG_HEAL")).unwrap();
        store.execute_batch().unwrap();

        assert_eq!(count(&store, "ward_events"), 1);
        assert_eq!(count(&store, "draft_start_events"), 1);
        assert_eq!(count(&store, "combat_log_events"), 1);
        let (x, attacker): (f64, String) = store
            .connection()
            .query_row("SELECT x, attackername FROM ward_events", [], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap();
        assert_eq!(x, 100.5);
        assert_eq!(attacker, "npc_dota_hero_axe");
    }

    #[test]
    fn test_unknown_and_partial_rows_skipped() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.insert_event(1, &Entry::new(0, "CHAT_MESSAGE_AEGIS")).unwrap();
        let mut pos = Entry::new(0, kind::POSITION);
        pos.x = Some(1.0);
        store.insert_event(1, &pos).unwrap();
        store.execute_batch().unwrap();
        assert_eq!(count(&store, "position_events"), 0);
        assert_eq!(count(&store, "chat_type_events"), 0);
    }

    fn payload(players: usize) -> GameInfoPayload {
        GameInfoPayload {
            source_match_id: Some(42),
            game_mode: Some(22),
            raw_file_info_json: "{}".into(),
            players: (0..players)
                .map(|i| GamePlayer {
                    player_slot: Some(i as i32),
                    ..GamePlayer::default()
                })
                .collect(),
            picks_bans: vec![PickBan {
                is_pick: Some(true),
                team: Some(2),
                hero_id: Some(1),
            }],
            ..GameInfoPayload::default()
        }
    }

    #[test]
    fn test_game_info_upsert_replaces_children() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.upsert_game_info(42, &payload(10)).unwrap();
        store.execute_batch().unwrap();
        let mut second = payload(2);
        second.game_mode = Some(2);
        store.upsert_game_info(42, &second).unwrap();
        store.execute_batch().unwrap();

        assert_eq!(count(&store, "game_info"), 1);
        assert_eq!(count(&store, "game_players"), 2);
        assert_eq!(count(&store, "game_picks_bans"), 1);
        let mode: i64 = store
            .connection()
            .query_row("SELECT game_mode FROM game_info WHERE match_id = 42", [], |r| r.get(0))
            .unwrap();
        assert_eq!(mode, 2);
    }

    #[test]
    fn test_failed_game_info_rewrite_keeps_previous_rows() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.upsert_game_info(42, &payload(10)).unwrap();
        store.execute_batch().unwrap();

        store
            .connection()
            .execute_batch(
                "CREATE TRIGGER reject_slot_five BEFORE INSERT ON game_players
                 WHEN NEW.player_slot = 5 BEGIN SELECT RAISE(ABORT, 'slot 5 rejected'); END;",
            )
            .unwrap();
        let mut second = payload(10);
        second.game_mode = Some(3);
        assert!(store.upsert_game_info(42, &second).is_err());

        // a later event shares the open transaction and commits it
        store.insert_event(42, &Entry::draft_start(-60)).unwrap();
        store.execute_batch().unwrap();

        assert_eq!(count(&store, "game_players"), 10);
        assert_eq!(count(&store, "game_picks_bans"), 1);
        assert_eq!(count(&store, "draft_start_events"), 1);
        let mode: i64 = store
            .connection()
            .query_row("SELECT game_mode FROM game_info WHERE match_id = 42", [], |r| r.get(0))
            .unwrap();
        assert_eq!(mode, 22);
    }
}
