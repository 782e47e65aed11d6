//! Interval Sampler
//!
//! One `interval` entry per player per game second, plus the ability-level
//! and starting-item entries derived from the hero entity while sampling.
//!
//! Per player, entries come out in this order:
//!
//! ```text
//!   DOTA_ABILITY_LEVEL*   levels that changed since the last sample
//!   STARTING_ITEM*        only on the first second after the epoch
//!   DOTA_COMBATLOG_PURCHASE*   first time this slot's inventory is seen
//!   interval
//! ```

use std::collections::BTreeMap;

use crate::core::coords::precise_location;
use crate::core::entry::{kind, Ability, Entry};
use crate::core::property::{get_indexed, get_property, Entity};
use crate::core::world::World;
use crate::engine::constants::{
    prop, CLASS_PREFIX_HERO, COMBAT_LOG_HERO_PREFIX, FACET_KEY_HERO_ID_SHIFT,
    FACET_KEY_VARIANT_MASK, NUM_PLAYERS, RADIANT_TEAM_ID,
};
use crate::engine::inventory::{hero_abilities, hero_inventory};
use crate::engine::slots::PlayerSlots;

/// Seconds between samples.
pub const INTERVAL_SECONDS: i32 = 1;

/// Split a packed facet key into (facet-source hero id, variant).
pub fn decode_facet_key(key: i64) -> (i32, i32) {
    (
        (key >> FACET_KEY_HERO_ID_SHIFT) as i32,
        (key & FACET_KEY_VARIANT_MASK) as i32,
    )
}

/// Both combat-log spellings of a hero class name.
///
/// `CDOTA_Unit_Hero_AntiMage` gives `npc_dota_hero_antimage` and
/// `npc_dota_hero_anti_mage`; the log has used each across patches.
pub fn combat_log_names(class_name: &str) -> Option<(String, String)> {
    let ending = class_name.strip_prefix(CLASS_PREFIX_HERO)?;
    let flat = format!("{}{}", COMBAT_LOG_HERO_PREFIX, ending.to_lowercase());
    let mut snake = String::from(COMBAT_LOG_HERO_PREFIX.trim_end_matches('_'));
    for c in ending.chars() {
        if c.is_ascii_uppercase() {
            snake.push('_');
        }
        snake.push(c.to_ascii_lowercase());
    }
    Some((flat, snake))
}

/// Entities and clocks needed for one sample.
#[derive(Clone, Copy, Debug)]
pub struct SampleContext<'a> {
    /// Entities and string tables.
    pub world: &'a World,
    /// The player resource.
    pub resource: &'a Entity,
    /// Radiant team data, if present.
    pub radiant: Option<&'a Entity>,
    /// Dire team data, if present.
    pub dire: Option<&'a Entity>,
    /// Current game second (pre-epoch).
    pub time: i32,
    /// Resolved epoch, or 0.
    pub epoch: i32,
    /// Game state of the rules entity.
    pub stage: Option<i32>,
}

/// Per-second sampler state.
#[derive(Debug, Default)]
pub struct IntervalSampler {
    next_interval: Option<i32>,
    /// hero name + ability id -> last level
    ability_levels: BTreeMap<String, Option<i32>>,
    starting_items_written: [bool; NUM_PLAYERS],
}

impl IntervalSampler {
    /// Create a sampler with no schedule yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the schedule at `time` if it has not started.
    pub fn prime(&mut self, time: i32) {
        self.next_interval.get_or_insert(time);
    }

    /// True if a sample is due at `time`.
    pub fn is_due(&self, time: i32) -> bool {
        self.next_interval.is_some_and(|next| time >= next)
    }

    /// Next scheduled sample time.
    pub fn next_interval(&self) -> Option<i32> {
        self.next_interval
    }

    /// Sample all players and advance the schedule.
    pub fn sample(&mut self, ctx: &SampleContext<'_>, slots: &mut PlayerSlots) -> Vec<Entry> {
        let mut out = Vec::new();
        for slot in 0..NUM_PLAYERS {
            if let Some(index) = slots.resource_index(slot) {
                self.sample_player(ctx, slots, slot as i32, index, &mut out);
            }
        }
        if let Some(next) = self.next_interval.as_mut() {
            *next += INTERVAL_SECONDS;
        }
        out
    }

    fn sample_player(
        &mut self,
        ctx: &SampleContext<'_>,
        slots: &mut PlayerSlots,
        slot: i32,
        index: usize,
        out: &mut Vec<Entry>,
    ) {
        let res = Some(ctx.resource);
        let at = Some(index);
        let player_team: Option<i32> = get_property(res, prop::PLAYER_TEAM, at);
        let team_slot: i32 = get_property(res, prop::TEAM_SLOT, at).unwrap_or(-1);
        let team = if player_team == Some(RADIANT_TEAM_ID) { ctx.radiant } else { ctx.dire };

        let mut entry = Entry::new(ctx.time, kind::INTERVAL);
        entry.slot = Some(slot);
        entry.repicked = get_property(res, prop::HAS_REPICKED, at);
        entry.randomed = get_property(res, prop::HAS_RANDOMED, at);
        entry.pred_vict = get_property(res, prop::HAS_PREDICTED_VICTORY, at);
        entry.firstblood_claimed = get_property(res, prop::FIRST_BLOOD_CLAIMED, at);
        entry.teamfight_participation = get_property(res, prop::TEAMFIGHT_PARTICIPATION, at);
        entry.level = get_property(res, prop::LEVEL, at);
        entry.kills = get_property(res, prop::KILLS, at);
        entry.deaths = get_property(res, prop::DEATHS, at);
        entry.assists = get_property(res, prop::ASSISTS, at);

        entry.denies = get_indexed(team, prop::DENY_COUNT, team_slot);
        entry.obs_placed = get_indexed(team, prop::OBSERVER_WARDS_PLACED, team_slot);
        entry.sen_placed = get_indexed(team, prop::SENTRY_WARDS_PLACED, team_slot);
        entry.creeps_stacked = get_indexed(team, prop::CREEPS_STACKED, team_slot);
        entry.camps_stacked = get_indexed(team, prop::CAMPS_STACKED, team_slot);
        entry.rune_pickups = get_indexed(team, prop::RUNE_PICKUPS, team_slot);
        entry.towers_killed = get_indexed(team, prop::TOWER_KILLS, team_slot);
        entry.roshans_killed = get_indexed(team, prop::ROSHAN_KILLS, team_slot);
        entry.observers_placed = get_indexed(team, prop::OBSERVER_WARDS_PLACED, team_slot);
        entry.networth = get_indexed(team, prop::NET_WORTH, team_slot);
        entry.stage = ctx.stage;

        // -1 until the player is assigned a team position
        if team_slot >= 0 {
            entry.team = player_team;
            entry.gold = get_indexed(team, prop::TOTAL_EARNED_GOLD, team_slot);
            entry.lh = get_indexed(team, prop::LAST_HIT_COUNT, team_slot);
            entry.xp = get_indexed(team, prop::TOTAL_EARNED_XP, team_slot);
            entry.stuns = get_indexed(team, prop::STUNS, team_slot);
        }

        let hero_id: Option<i32> = get_property(res, prop::SELECTED_HERO_ID, at);
        let hero = get_property::<i32>(res, prop::SELECTED_HERO, at)
            .and_then(|handle| ctx.world.entities.get_by_handle(handle));
        if let Some(hero) = hero {
            let variant = get_property(res, prop::SELECTED_HERO_VARIANT, at);
            self.sample_hero(ctx, slots, hero, hero_id, variant, &mut entry, out);
        }
        out.push(entry);
    }

    #[allow(clippy::too_many_arguments)]
    fn sample_hero(
        &mut self,
        ctx: &SampleContext<'_>,
        slots: &mut PlayerSlots,
        hero: &Entity,
        hero_id: Option<i32>,
        variant: Option<i32>,
        entry: &mut Entry,
        out: &mut Vec<Entry>,
    ) {
        let h = Some(hero);
        let cell_x: Option<i32> = get_property(h, prop::CELL_X, None);
        let cell_y: Option<i32> = get_property(h, prop::CELL_Y, None);
        if cell_x.is_some() && cell_y.is_some() {
            entry.x = precise_location(cell_x, get_property(h, prop::VEC_X, None));
            entry.y = precise_location(cell_y, get_property(h, prop::VEC_Y, None));
        }

        // packed key replaced the separate variant property
        let (facet_hero_id, variant) = match get_property::<i64>(h, prop::HERO_FACET_KEY, None) {
            Some(key) => {
                let (facet_hero, variant) = decode_facet_key(key);
                (Some(facet_hero), Some(variant))
            }
            None => (None, variant),
        };
        entry.unit = Some(hero.class_name.clone());
        entry.hero_id = hero_id;
        entry.variant = variant;
        entry.facet_hero_id = facet_hero_id;
        entry.life_state = get_property(h, prop::LIFE_STATE, None);

        if !hero_id.is_some_and(|id| id > 0) {
            return;
        }
        let Some((name, snake_name)) = combat_log_names(&hero.class_name) else {
            return;
        };
        let slot = entry.slot.unwrap_or_default();
        slots.register_name(&name, slot);
        slots.register_name(&snake_name, slot);

        for ability in hero_abilities(ctx.world, hero) {
            if let Some(changed) = self.track_ability(ctx.time, &name, &ability) {
                out.push(changed);
            }
        }

        let inventory = hero_inventory(ctx.world, hero);
        if ctx.time - ctx.epoch - 1 == 0 {
            out.extend(inventory.iter().map(|item| Entry::starting_item(ctx.time, slot, &name, item)));
        }
        if let Some(written) = self.starting_items_written.get_mut(slot as usize) {
            if !*written {
                *written = true;
                out.extend(inventory.iter().map(|item| Entry::initial_purchase(ctx.time, slot, &name, item)));
            }
        }
        entry.hero_inventory = Some(inventory);
    }

    /// Record an ability level; returns an entry if it changed.
    fn track_ability(&mut self, time: i32, hero_name: &str, ability: &Ability) -> Option<Entry> {
        // ability ids repeat across heroes
        let key = format!("{}{}", hero_name, ability.id);
        match self.ability_levels.get(&key) {
            Some(level) if *level == ability.level => None,
            _ => {
                self.ability_levels.insert(key, ability.level);
                Some(Entry::ability_level(time, hero_name, ability))
            }
        }
    }
}

/// Post-game hero badge XP keyed by player slot.
///
/// Reads raw resource indices 0-9; players whose 64-bit id is unknown are
/// left out.
pub fn collect_dota_plus(resource: &Entity, slots: &PlayerSlots) -> BTreeMap<i32, i32> {
    let res = Some(resource);
    (0..NUM_PLAYERS)
        .filter_map(|i| {
            let xp: i32 = get_property(res, prop::HERO_BADGE_XP, Some(i)).unwrap_or(0);
            let steam_id: i64 = get_property(res, prop::PLAYER_STEAM_ID, Some(i))?;
            Some((slots.player_slot_by_steam_id(steam_id)?, xp))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::property::array_index;
    use crate::core::world::STRING_TABLE_ENTITY_NAMES;
    use crate::engine::slots::InitOutcome;

    const HERO_HANDLE: i32 = 0x8000 | 60;

    fn resource() -> Entity {
        let mut e = Entity::new(2, 2, 10, "CDOTA_PlayerResource");
        for i in 0..NUM_PLAYERS {
            let idx = array_index(i);
            let team = if i < 5 { 2 } else { 3 };
            e = e
                .with(format!("m_vecPlayerData.{}.m_iPlayerTeam", idx), team)
                .with(format!("m_vecPlayerData.{}.m_iPlayerSteamID", idx), 1000 + i as i64)
                .with(format!("m_vecPlayerTeamData.{}.m_iTeamSlot", idx), (i % 5) as i32)
                .with(format!("m_vecPlayerTeamData.{}.m_iLevel", idx), 1)
                .with(format!("m_vecPlayerTeamData.{}.m_unSelectedHeroBadgeXP", idx), 100 * i as i32);
        }
        e.with("m_vecPlayerTeamData.0000.m_nSelectedHeroID", 2)
            .with("m_vecPlayerTeamData.0000.m_hSelectedHero", HERO_HANDLE)
            .with("m_vecPlayerTeamData.0000.m_nSelectedHeroVariant", 1)
    }

    fn radiant() -> Entity {
        Entity::new(3, 3, 11, "CDOTA_DataRadiant")
            .with("m_vecDataTeam.0000.m_iTotalEarnedGold", 625)
            .with("m_vecDataTeam.0000.m_iNetWorth", 600)
            .with("m_vecDataTeam.0000.m_fStuns", 0.5f32)
    }

    fn world(level: i32) -> World {
        let mut world = World::new();
        world.string_tables.set(STRING_TABLE_ENTITY_NAMES, 1, "item_tango".into());
        world.string_tables.set(STRING_TABLE_ENTITY_NAMES, 2, "antimage_mana_break".into());
        world.entities.insert(Entity::new(70, 70, 5, "CDOTA_Item_Tango").with("m_pEntity.m_nameStringableIndex", 1));
        world.entities.insert(
            Entity::new(71, 71, 6, "CDOTA_Ability_AntiMage_ManaBreak")
                .with("m_pEntity.m_nameStringableIndex", 2)
                .with("m_iLevel", level),
        );
        world.entities.insert(
            Entity::new(60, HERO_HANDLE, 9, "CDOTA_Unit_Hero_AntiMage")
                .with("CBodyComponent.m_cellX", 4)
                .with("CBodyComponent.m_cellY", 5)
                .with("CBodyComponent.m_vecX", 64.0f32)
                .with("CBodyComponent.m_vecY", 0.0f32)
                .with("m_lifeState", 0)
                .with("m_hItems.0000", 70)
                .with("m_hAbilities.0000", 71),
        );
        world
    }

    fn initialized_slots(resource: &Entity) -> PlayerSlots {
        let mut slots = PlayerSlots::new();
        assert!(matches!(slots.initialize(resource, 0), InitOutcome::Initialized(_)));
        slots
    }

    fn sample_at(sampler: &mut IntervalSampler, world: &World, slots: &mut PlayerSlots, time: i32, epoch: i32) -> Vec<Entry> {
        let resource = resource();
        let radiant = radiant();
        let ctx = SampleContext {
            world,
            resource: &resource,
            radiant: Some(&radiant),
            dire: None,
            time,
            epoch,
            stage: Some(5),
        };
        sampler.sample(&ctx, slots)
    }

    #[test]
    fn test_facet_key() {
        assert_eq!(decode_facet_key(0x0000_0002_0000_0005), (2, 5));
        assert_eq!(decode_facet_key(0x0000_0087_0000_0103), (135, 3));
    }

    #[test]
    fn test_combat_log_names() {
        assert_eq!(
            combat_log_names("CDOTA_Unit_Hero_AntiMage"),
            Some(("npc_dota_hero_antimage".into(), "npc_dota_hero_anti_mage".into()))
        );
        assert_eq!(
            combat_log_names("CDOTA_Unit_Hero_Axe"),
            Some(("npc_dota_hero_axe".into(), "npc_dota_hero_axe".into()))
        );
        assert_eq!(combat_log_names("CDOTA_NPC_Observer_Ward"), None);
    }

    #[test]
    fn test_schedule() {
        let mut sampler = IntervalSampler::new();
        assert!(!sampler.is_due(100));
        sampler.prime(10);
        sampler.prime(20);
        assert_eq!(sampler.next_interval(), Some(10));
        assert!(sampler.is_due(10));
        assert!(!sampler.is_due(9));
    }

    #[test]
    fn test_sample_order_and_fields() {
        let world = world(1);
        let resource = resource();
        let mut slots = initialized_slots(&resource);
        let mut sampler = IntervalSampler::new();
        sampler.prime(31);

        // first second after the epoch of 30
        let out = sample_at(&mut sampler, &world, &mut slots, 31, 30);
        let kinds: Vec<&str> = out.iter().take(4).map(|e| e.kind.as_str()).collect();
        assert_eq!(kinds, vec!["DOTA_ABILITY_LEVEL", "STARTING_ITEM", "DOTA_COMBATLOG_PURCHASE", "interval"]);
        assert_eq!(out.iter().filter(|e| e.kind == kind::INTERVAL).count(), NUM_PLAYERS);
        assert_eq!(sampler.next_interval(), Some(32));

        let first = &out[3];
        assert_eq!(first.slot, Some(0));
        assert_eq!(first.x, Some(4.5));
        assert_eq!(first.y, Some(5.0));
        assert_eq!(first.unit.as_deref(), Some("CDOTA_Unit_Hero_AntiMage"));
        assert_eq!(first.hero_id, Some(2));
        assert_eq!(first.variant, Some(1));
        assert_eq!(first.facet_hero_id, None);
        assert_eq!(first.gold, Some(625));
        assert_eq!(first.networth, Some(600));
        assert_eq!(first.stuns, Some(0.5));
        assert_eq!(first.team, Some(2));
        assert_eq!(first.stage, Some(5));
        assert_eq!(first.level, Some(1));
        assert_eq!(first.hero_inventory.as_ref().map(Vec::len), Some(1));

        assert_eq!(out[0].targetname.as_deref(), Some("npc_dota_hero_antimage"));
        assert_eq!(out[0].abilitylevel, Some(1));
        assert_eq!(out[1].itemslot, Some(0));
        assert_eq!(out[2].value, Some(0));
        assert_eq!(slots.slot_by_name("npc_dota_hero_anti_mage"), Some(0));

        // dire player without team data entity: counters absent, not zero
        let dire = out.iter().find(|e| e.kind == kind::INTERVAL && e.slot == Some(7)).unwrap();
        assert_eq!(dire.gold, None);
        assert_eq!(dire.team, Some(3));
    }

    #[test]
    fn test_one_time_emissions() {
        let resource = resource();
        let mut slots = initialized_slots(&resource);
        let mut sampler = IntervalSampler::new();
        sampler.prime(31);
        sample_at(&mut sampler, &world(1), &mut slots, 31, 30);

        // same level, later second: only interval entries
        let out = sample_at(&mut sampler, &world(1), &mut slots, 32, 30);
        assert!(out.iter().all(|e| e.kind == kind::INTERVAL));

        // level up
        let out = sample_at(&mut sampler, &world(2), &mut slots, 33, 30);
        assert_eq!(out[0].kind, kind::ABILITY_LEVEL);
        assert_eq!(out[0].abilitylevel, Some(2));
    }

    #[test]
    fn test_facet_key_overrides_variant() {
        let mut world = world(1);
        let hero = world.entities.get(60).unwrap().clone().with("m_iHeroFacetKey", 0x0000_0002_0000_0005i64);
        world.entities.insert(hero);
        let resource = resource();
        let mut slots = initialized_slots(&resource);
        let mut sampler = IntervalSampler::new();
        sampler.prime(0);
        let out = sample_at(&mut sampler, &world, &mut slots, 0, 30);
        let first = out.iter().find(|e| e.kind == kind::INTERVAL).unwrap();
        assert_eq!(first.facet_hero_id, Some(2));
        assert_eq!(first.variant, Some(5));
    }

    #[test]
    fn test_dota_plus() {
        let resource = resource();
        let slots = initialized_slots(&resource);
        let xp = collect_dota_plus(&resource, &slots);
        assert_eq!(xp.len(), NUM_PLAYERS);
        assert_eq!(xp.get(&0), Some(&0));
        assert_eq!(xp.get(&132), Some(&900));
    }
}
