//! Game constants, class names and property names.
//!
//! Property names carry a `%i` placeholder where the decoder exposes an
//! array; see [`crate::core::property::get_property`].

// =============================================================================
// GAME
// =============================================================================

/// Number of players in a match.
pub const NUM_PLAYERS: usize = 10;

/// Upper bound on player-resource indices scanned during initialization.
pub const MAX_PLAYER_SEARCH_INDEX: usize = 30;

/// Server ticks per game second.
pub const TICKS_PER_SECOND: i32 = 30;

/// Pings beyond this count are dropped.
pub const MAX_PING_COUNT: u32 = 10_000;

/// Added to a 32-bit account id to get the 64-bit id.
pub const STEAM_ID_OFFSET: i64 = 76_561_197_960_265_728;

/// Radiant team number.
pub const RADIANT_TEAM_ID: i32 = 2;

/// Dire team number.
pub const DIRE_TEAM_ID: i32 = 3;

/// Team number of a player waiting to be drafted onto a team.
pub const WAITING_FOR_DRAFT_TEAM_ID: i32 = 14;

/// Game state: hero selection.
pub const GAME_STATE_DRAFT: i32 = 2;

/// Game state: pre-game (horn countdown).
pub const GAME_STATE_PRE_GAME: i32 = 5;

/// Game state: ancient destroyed.
pub const GAME_STATE_POST_GAME: i32 = 6;

/// Life state: alive.
pub const LIFE_STATE_ALIVE: i32 = 0;

/// Life state: dead.
pub const LIFE_STATE_DEAD: i32 = 1;

/// Life state assumed for an entity seen for the first time.
pub const LIFE_STATE_UNKNOWN: i32 = 2;

/// Chat channel of all-chat.
pub const CHAT_CHANNEL_ALL_CHAT: i32 = 11;

/// Shift of the facet-source hero id inside the packed facet key.
pub const FACET_KEY_HERO_ID_SHIFT: u32 = 32;

/// Mask of the variant inside the packed facet key.
pub const FACET_KEY_VARIANT_MASK: i64 = 0xFF;

/// Slots in the draft arrays: 14 bans then 10 picks.
pub const DRAFT_SLOTS: usize = 24;

/// Ban slots at the start of the draft arrays.
pub const DRAFT_BAN_SLOTS: usize = 14;

/// Ability slots on a hero.
pub const MAX_ABILITIES: usize = 32;

/// Inventory slots on a hero (inventory and backpack).
pub const MAX_INVENTORY_SLOTS: usize = 8;

// =============================================================================
// CLASS NAMES
// =============================================================================

/// Cosmetic item worn by a hero.
pub const CLASS_WEARABLE_ITEM: &str = "CDOTAWearableItem";
/// Game rules holder.
pub const CLASS_GAMERULES_PROXY: &str = "CDOTAGamerulesProxy";
/// Per-player resource arrays.
pub const CLASS_PLAYER_RESOURCE: &str = "CDOTA_PlayerResource";
/// Radiant team data arrays.
pub const CLASS_DATA_RADIANT: &str = "CDOTA_DataRadiant";
/// Dire team data arrays.
pub const CLASS_DATA_DIRE: &str = "CDOTA_DataDire";
/// Prefix of item classes.
pub const CLASS_PREFIX_ITEM: &str = "CDOTA_Item_";
/// Prefix of hero classes.
pub const CLASS_PREFIX_HERO: &str = "CDOTA_Unit_Hero_";
/// Prefix of hero names in the combat log.
pub const COMBAT_LOG_HERO_PREFIX: &str = "npc_dota_hero_";

// =============================================================================
// PROPERTY NAMES
// =============================================================================

#[allow(missing_docs)]
pub mod prop {
    pub const PLAYER_ID: &str = "m_nPlayerID";
    /// Pre-7.31 name; sentry wards still carry it.
    pub const PLAYER_ID_OLD: &str = "m_iPlayerID";
    pub const PLAYER_OWNER_ID: &str = "m_iPlayerOwnerID";

    pub const GAME_TIME: &str = "m_pGameRules.m_fGameTime";
    pub const GAME_PAUSED: &str = "m_pGameRules.m_bGamePaused";
    pub const PAUSE_START_TICK: &str = "m_pGameRules.m_nPauseStartTick";
    pub const TOTAL_PAUSED_TICKS: &str = "m_pGameRules.m_nTotalPausedTicks";
    pub const GAME_START_TIME: &str = "m_pGameRules.m_flGameStartTime";
    pub const GAME_STATE: &str = "m_pGameRules.m_nGameState";
    pub const PLAYER_IDS_IN_CONTROL: &str = "m_pGameRules.m_iPlayerIDsInControl";
    pub const ACTIVE_TEAM: &str = "m_pGameRules.m_iActiveTeam";
    pub const EXTRA_TIME_REMAINING: &str = "m_pGameRules.m_fExtraTimeRemaining.%i";
    pub const BANNED_HEROES: &str = "m_pGameRules.m_BannedHeroes.%i";
    pub const SELECTED_HEROES: &str = "m_pGameRules.m_SelectedHeroes.%i";

    pub const CELL_X: &str = "CBodyComponent.m_cellX";
    pub const CELL_Y: &str = "CBodyComponent.m_cellY";
    pub const CELL_Z: &str = "CBodyComponent.m_cellZ";
    pub const VEC_X: &str = "CBodyComponent.m_vecX";
    pub const VEC_Y: &str = "CBodyComponent.m_vecY";
    pub const VEC_Z: &str = "CBodyComponent.m_vecZ";

    pub const LIFE_STATE: &str = "m_lifeState";
    pub const HERO_FACET_KEY: &str = "m_iHeroFacetKey";
    pub const OWNER_ENTITY: &str = "m_hOwnerEntity";
    pub const ITEMS: &str = "m_hItems.%i";
    pub const ABILITIES: &str = "m_hAbilities.%i";
    pub const ABILITIES_VEC: &str = "m_vecAbilities.%i";
    pub const ENTITY_NAME_INDEX: &str = "m_pEntity.m_nameStringableIndex";
    pub const CURRENT_CHARGES: &str = "m_iCurrentCharges";
    pub const SECONDARY_CHARGES: &str = "m_iSecondaryCharges";
    pub const ABILITY_LEVEL: &str = "m_iLevel";

    pub const ACCOUNT_ID: &str = "m_iAccountID";
    pub const ITEM_DEFINITION_INDEX: &str = "m_iItemDefinitionIndex";
    pub const NEUTRAL_ACTIVE_DROP: &str = "m_bIsNeutralActiveDrop";
    pub const NEUTRAL_PASSIVE_DROP: &str = "m_bIsNeutralPassiveDrop";
    pub const NEUTRAL_DROP_TEAM: &str = "m_nNeutralDropTeam";

    // player resource, indexed by player index
    pub const PLAYER_TEAM: &str = "m_vecPlayerData.%i.m_iPlayerTeam";
    pub const PLAYER_STEAM_ID: &str = "m_vecPlayerData.%i.m_iPlayerSteamID";
    pub const TEAM_SLOT: &str = "m_vecPlayerTeamData.%i.m_iTeamSlot";
    pub const SELECTED_HERO_ID: &str = "m_vecPlayerTeamData.%i.m_nSelectedHeroID";
    pub const SELECTED_HERO: &str = "m_vecPlayerTeamData.%i.m_hSelectedHero";
    pub const SELECTED_HERO_VARIANT: &str = "m_vecPlayerTeamData.%i.m_nSelectedHeroVariant";
    pub const HAS_REPICKED: &str = "m_vecPlayerTeamData.%i.m_bHasRepicked";
    pub const HAS_RANDOMED: &str = "m_vecPlayerTeamData.%i.m_bHasRandomed";
    pub const HAS_PREDICTED_VICTORY: &str = "m_vecPlayerTeamData.%i.m_bHasPredictedVictory";
    pub const FIRST_BLOOD_CLAIMED: &str = "m_vecPlayerTeamData.%i.m_iFirstBloodClaimed";
    pub const TEAMFIGHT_PARTICIPATION: &str = "m_vecPlayerTeamData.%i.m_flTeamFightParticipation";
    pub const LEVEL: &str = "m_vecPlayerTeamData.%i.m_iLevel";
    pub const KILLS: &str = "m_vecPlayerTeamData.%i.m_iKills";
    pub const DEATHS: &str = "m_vecPlayerTeamData.%i.m_iDeaths";
    pub const ASSISTS: &str = "m_vecPlayerTeamData.%i.m_iAssists";
    pub const HERO_BADGE_XP: &str = "m_vecPlayerTeamData.%i.m_unSelectedHeroBadgeXP";

    // team data, indexed by team slot
    pub const DENY_COUNT: &str = "m_vecDataTeam.%i.m_iDenyCount";
    pub const OBSERVER_WARDS_PLACED: &str = "m_vecDataTeam.%i.m_iObserverWardsPlaced";
    pub const SENTRY_WARDS_PLACED: &str = "m_vecDataTeam.%i.m_iSentryWardsPlaced";
    pub const CREEPS_STACKED: &str = "m_vecDataTeam.%i.m_iCreepsStacked";
    pub const CAMPS_STACKED: &str = "m_vecDataTeam.%i.m_iCampsStacked";
    pub const RUNE_PICKUPS: &str = "m_vecDataTeam.%i.m_iRunePickups";
    pub const TOWER_KILLS: &str = "m_vecDataTeam.%i.m_iTowerKills";
    pub const ROSHAN_KILLS: &str = "m_vecDataTeam.%i.m_iRoshanKills";
    pub const NET_WORTH: &str = "m_vecDataTeam.%i.m_iNetWorth";
    pub const TOTAL_EARNED_GOLD: &str = "m_vecDataTeam.%i.m_iTotalEarnedGold";
    pub const LAST_HIT_COUNT: &str = "m_vecDataTeam.%i.m_iLastHitCount";
    pub const TOTAL_EARNED_XP: &str = "m_vecDataTeam.%i.m_iTotalEarnedXP";
    pub const STUNS: &str = "m_vecDataTeam.%i.m_fStuns";
}
