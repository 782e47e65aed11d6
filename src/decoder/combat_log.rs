//! Combat Log Entries
//!
//! Classified combat-log entries as the decoder delivers them. The type enum
//! mirrors the game's `DOTA_COMBATLOG_TYPES` values, including the internal
//! types above the gameplay range that are never surfaced as entries.

use serde::{Serialize, Deserialize};

macro_rules! combat_log_types {
    ($($variant:ident = $value:literal => $name:literal,)*) => {
        /// Combat-log entry type.
        #[allow(missing_docs)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum CombatLogType {
            $($variant,)*
        }

        impl CombatLogType {
            /// Numeric value as encoded on the wire.
            pub const fn value(self) -> i32 {
                match self {
                    $(CombatLogType::$variant => $value,)*
                }
            }

            /// Full enum name, e.g. `DOTA_COMBATLOG_DEATH`.
            pub const fn name(self) -> &'static str {
                match self {
                    $(CombatLogType::$variant => $name,)*
                }
            }

            /// Parse a full enum name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(CombatLogType::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

combat_log_types! {
    Invalid = -1 => "DOTA_COMBATLOG_INVALID",
    Damage = 0 => "DOTA_COMBATLOG_DAMAGE",
    Heal = 1 => "DOTA_COMBATLOG_HEAL",
    ModifierAdd = 2 => "DOTA_COMBATLOG_MODIFIER_ADD",
    ModifierRemove = 3 => "DOTA_COMBATLOG_MODIFIER_REMOVE",
    Death = 4 => "DOTA_COMBATLOG_DEATH",
    Ability = 5 => "DOTA_COMBATLOG_ABILITY",
    Item = 6 => "DOTA_COMBATLOG_ITEM",
    Location = 7 => "DOTA_COMBATLOG_LOCATION",
    Gold = 8 => "DOTA_COMBATLOG_GOLD",
    GameState = 9 => "DOTA_COMBATLOG_GAME_STATE",
    Xp = 10 => "DOTA_COMBATLOG_XP",
    Purchase = 11 => "DOTA_COMBATLOG_PURCHASE",
    Buyback = 12 => "DOTA_COMBATLOG_BUYBACK",
    AbilityTrigger = 13 => "DOTA_COMBATLOG_ABILITY_TRIGGER",
    PlayerStats = 14 => "DOTA_COMBATLOG_PLAYERSTATS",
    Multikill = 15 => "DOTA_COMBATLOG_MULTIKILL",
    Killstreak = 16 => "DOTA_COMBATLOG_KILLSTREAK",
    TeamBuildingKill = 17 => "DOTA_COMBATLOG_TEAM_BUILDING_KILL",
    FirstBlood = 18 => "DOTA_COMBATLOG_FIRST_BLOOD",
    ModifierStackEvent = 19 => "DOTA_COMBATLOG_MODIFIER_STACK_EVENT",
    NeutralCampStack = 20 => "DOTA_COMBATLOG_NEUTRAL_CAMP_STACK",
    PickupRune = 21 => "DOTA_COMBATLOG_PICKUP_RUNE",
    RevealedInvisible = 22 => "DOTA_COMBATLOG_REVEALED_INVISIBLE",
    HeroSaved = 23 => "DOTA_COMBATLOG_HERO_SAVED",
    ManaRestored = 24 => "DOTA_COMBATLOG_MANA_RESTORED",
    HeroLevelup = 25 => "DOTA_COMBATLOG_HERO_LEVELUP",
    BottleHealAlly = 26 => "DOTA_COMBATLOG_BOTTLE_HEAL_ALLY",
    EndgameStats = 27 => "DOTA_COMBATLOG_ENDGAME_STATS",
    InterruptChannel = 28 => "DOTA_COMBATLOG_INTERRUPT_CHANNEL",
    AlliedGold = 29 => "DOTA_COMBATLOG_ALLIED_GOLD",
    AegisTaken = 30 => "DOTA_COMBATLOG_AEGIS_TAKEN",
    ManaDamage = 31 => "DOTA_COMBATLOG_MANA_DAMAGE",
    PhysicalDamagePrevented = 32 => "DOTA_COMBATLOG_PHYSICAL_DAMAGE_PREVENTED",
    UnitSummoned = 33 => "DOTA_COMBATLOG_UNIT_SUMMONED",
    AttackEvade = 34 => "DOTA_COMBATLOG_ATTACK_EVADE",
    TreeCut = 35 => "DOTA_COMBATLOG_TREE_CUT",
    SuccessfulScan = 36 => "DOTA_COMBATLOG_SUCCESSFUL_SCAN",
    EndKillstreak = 37 => "DOTA_COMBATLOG_END_KILLSTREAK",
    BloodstoneCharge = 38 => "DOTA_COMBATLOG_BLOODSTONE_CHARGE",
    CriticalDamage = 39 => "DOTA_COMBATLOG_CRITICAL_DAMAGE",
    SpellAbsorb = 40 => "DOTA_COMBATLOG_SPELL_ABSORB",
    UnitTeleported = 41 => "DOTA_COMBATLOG_UNIT_TELEPORTED",
    KillEaterEvent = 42 => "DOTA_COMBATLOG_KILL_EATER_EVENT",
    NeutralItemEarned = 43 => "DOTA_COMBATLOG_NEUTRAL_ITEM_EARNED",
    StatTrackerPlayer = 44 => "DOTA_COMBATLOG_STAT_TRACKER_PLAYER",
}

/// First type value that is internal to the game and never emitted.
pub const FIRST_INTERNAL_TYPE: i32 = CombatLogType::ModifierStackEvent.value();

impl CombatLogType {
    /// True for gameplay types that become output entries.
    pub fn is_surfaced(self) -> bool {
        self.value() < FIRST_INTERNAL_TYPE
    }
}

impl TryFrom<String> for CombatLogType {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        CombatLogType::from_name(&name).ok_or_else(|| format!("unknown combat log type: {}", name))
    }
}

impl From<CombatLogType> for String {
    fn from(kind: CombatLogType) -> Self {
        kind.name().to_string()
    }
}

/// One classified combat-log entry.
///
/// Name fields are already resolved through the combat-log string table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatLogEntry {
    /// Entry type.
    #[serde(rename = "type")]
    pub kind: CombatLogType,
    /// Game time in seconds.
    pub timestamp: f32,
    /// Attacker unit name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attacker_name: Option<String>,
    /// Target unit name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    /// Unit that owns the damage source (e.g. the hero behind a summon).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_source_name: Option<String>,
    /// Unit that owns the target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_source_name: Option<String>,
    /// Ability, item or modifier involved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inflictor_name: Option<String>,
    #[allow(missing_docs)]
    #[serde(default)]
    pub is_attacker_hero: bool,
    #[allow(missing_docs)]
    #[serde(default)]
    pub is_target_hero: bool,
    #[allow(missing_docs)]
    #[serde(default)]
    pub is_attacker_illusion: bool,
    #[allow(missing_docs)]
    #[serde(default)]
    pub is_target_illusion: bool,
    /// Type-dependent numeric value.
    #[serde(default)]
    pub value: i32,
    /// String-table name for `value`; only meaningful for purchases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_name: Option<String>,
    /// Gold change reason.
    #[serde(default)]
    pub gold_reason: i32,
    /// Experience change reason.
    #[serde(default)]
    pub xp_reason: i32,
    /// Stun duration in seconds.
    #[serde(default)]
    pub stun_duration: f32,
    /// Slow duration in seconds.
    #[serde(default)]
    pub slow_duration: f32,
}

impl CombatLogEntry {
    /// Entry with only type and timestamp set.
    pub fn new(kind: CombatLogType, timestamp: f32) -> Self {
        Self {
            kind,
            timestamp,
            attacker_name: None,
            target_name: None,
            damage_source_name: None,
            target_source_name: None,
            inflictor_name: None,
            is_attacker_hero: false,
            is_target_hero: false,
            is_attacker_illusion: false,
            is_target_illusion: false,
            value: 0,
            value_name: None,
            gold_reason: 0,
            xp_reason: 0,
            stun_duration: 0.0,
            slow_duration: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_table() {
        for kind in [
            CombatLogType::Invalid,
            CombatLogType::Damage,
            CombatLogType::GameState,
            CombatLogType::StatTrackerPlayer,
        ] {
            assert_eq!(CombatLogType::from_name(kind.name()), Some(kind));
        }
        assert_eq!(CombatLogType::GameState.value(), 9);
        assert_eq!(CombatLogType::from_name("DOTA_COMBATLOG_NOPE"), None);
    }

    #[test]
    fn test_surfaced_cutoff() {
        assert!(CombatLogType::Damage.is_surfaced());
        assert!(CombatLogType::FirstBlood.is_surfaced());
        assert!(CombatLogType::Invalid.is_surfaced());
        assert!(!CombatLogType::ModifierStackEvent.is_surfaced());
        assert!(!CombatLogType::NeutralItemEarned.is_surfaced());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let cle: CombatLogEntry = serde_json::from_str(
            r#"{"type":"DOTA_COMBATLOG_DEATH","timestamp":12.6,"target_name":"npc_dota_observer_wards"}"#,
        )
        .unwrap();
        assert_eq!(cle.kind, CombatLogType::Death);
        assert_eq!(cle.value, 0);
        assert!(!cle.is_target_hero);
        assert_eq!(cle.target_name.as_deref(), Some("npc_dota_observer_wards"));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let r: Result<CombatLogEntry, _> =
            serde_json::from_str(r#"{"type":"DOTA_COMBATLOG_MYSTERY","timestamp":1.0}"#);
        assert!(r.is_err());
    }
}
