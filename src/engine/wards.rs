//! Ward Lifecycle
//!
//! Wards are plain entities; placement and death are inferred from their
//! life state. Life-state updates are queued during a tick and processed
//! once at the synthetic tick end.
//!
//! ```text
//!   unknown(2) ──▶ alive(0) ──▶ dead(1)
//!                  placed       killed by queued attacker, or plain change
//! ```
//!
//! Killers come from `DEATH` combat-log entries targeting a ward unit and
//! are matched oldest-first per ward class, not per ward instance.

use std::collections::{BTreeMap, VecDeque};

use crate::core::coords::precise_location;
use crate::core::entry::{kind, Entry};
use crate::core::property::{get_property, Entity, FieldPath};
use crate::core::world::World;
use crate::decoder::combat_log::{CombatLogEntry, CombatLogType};
use crate::engine::constants::{prop, LIFE_STATE_ALIVE, LIFE_STATE_DEAD, LIFE_STATE_UNKNOWN};
use crate::engine::slots::resolve_slot;

/// Combat-log unit name of observer wards.
pub const TARGET_OBSERVER: &str = "npc_dota_observer_wards";
/// Combat-log unit name of sentry wards.
pub const TARGET_SENTRY: &str = "npc_dota_sentry_wards";

/// Ward classes and the combat-log unit name each one dies as.
pub const WARD_CLASSES: [(&str, &str); 4] = [
    ("DT_DOTA_NPC_Observer_Ward", TARGET_OBSERVER),
    ("CDOTA_NPC_Observer_Ward", TARGET_OBSERVER),
    ("DT_DOTA_NPC_Observer_Ward_TrueSight", TARGET_SENTRY),
    ("CDOTA_NPC_Observer_Ward_TrueSight", TARGET_SENTRY),
];

/// Combat-log unit name for a ward class, or `None` for non-wards.
pub fn ward_target_name(class_name: &str) -> Option<&'static str> {
    WARD_CLASSES
        .iter()
        .find(|(class, _)| *class == class_name)
        .map(|(_, target)| *target)
}

/// True if the class is a ward class.
pub fn is_ward(class_name: &str) -> bool {
    ward_target_name(class_name).is_some()
}

/// Ward state across the whole replay.
#[derive(Debug)]
pub struct WardTracker {
    /// Life-state field path per class id; `None` if the class lacks it.
    life_state_paths: BTreeMap<i32, Option<FieldPath>>,
    /// Last seen life state per entity index.
    life_states: BTreeMap<i32, i32>,
    /// Pending killers per combat-log ward name.
    killers: BTreeMap<&'static str, VecDeque<String>>,
    /// Entity indices with a life-state change this tick.
    queued: VecDeque<(i32, FieldPath)>,
}

impl Default for WardTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl WardTracker {
    /// Create a tracker with empty killer queues.
    pub fn new() -> Self {
        let killers = [TARGET_OBSERVER, TARGET_SENTRY]
            .into_iter()
            .map(|name| (name, VecDeque::new()))
            .collect();
        Self {
            life_state_paths: BTreeMap::new(),
            life_states: BTreeMap::new(),
            killers,
            queued: VecDeque::new(),
        }
    }

    /// Queue the killer of a ward from a `DEATH` entry.
    pub fn record_kill(&mut self, cle: &CombatLogEntry) {
        if cle.kind != CombatLogType::Death {
            return;
        }
        let Some(target) = cle.target_name.as_deref() else {
            return;
        };
        if let (Some(queue), Some(killer)) = (self.killers.get_mut(target), cle.damage_source_name.as_ref()) {
            queue.push_back(killer.clone());
        }
    }

    /// Killers still waiting for a ward of this unit name to die.
    pub fn pending_killers(&self, target: &str) -> usize {
        self.killers.get(target).map_or(0, VecDeque::len)
    }

    /// A ward entered the world; its life state is processed immediately.
    pub fn on_created(&mut self, world: &World, entity: &Entity, time: i32) -> Option<Entry> {
        if !is_ward(&entity.class_name) {
            return None;
        }
        self.life_states.remove(&entity.index);
        let path = self
            .life_state_paths
            .entry(entity.class_id)
            .or_insert_with(|| entity.field_path(prop::LIFE_STATE))
            .clone()?;
        self.process(world, entity, &path, time)
    }

    /// Properties changed; queue the ward if its life state was touched.
    pub fn on_updated(&mut self, entity: &Entity, touched: &[FieldPath]) {
        if !is_ward(&entity.class_name) {
            return;
        }
        let Some(Some(path)) = self.life_state_paths.get(&entity.class_id) else {
            return;
        };
        if touched.contains(path) {
            self.queued.push_back((entity.index, path.clone()));
        }
    }

    /// A ward was destroyed; forget its cached state.
    pub fn on_deleted(&mut self, entity: &Entity) {
        if is_ward(&entity.class_name) {
            self.life_states.remove(&entity.index);
        }
    }

    /// Drain the queue at a synthetic tick end.
    pub fn on_tick_end(&mut self, world: &World, synthetic: bool, time: i32) -> Vec<Entry> {
        if !synthetic {
            return Vec::new();
        }
        let mut out = Vec::new();
        while let Some((index, path)) = self.queued.pop_front() {
            // deleted before the tick ended
            let Some(entity) = world.entities.get(index) else {
                continue;
            };
            out.extend(self.process(world, entity, &path, time));
        }
        out
    }

    fn process(&mut self, world: &World, entity: &Entity, path: &FieldPath, time: i32) -> Option<Entry> {
        let new_state: i32 = entity.value_at(path)?;
        let old_state = self
            .life_states
            .insert(entity.index, new_state)
            .unwrap_or(LIFE_STATE_UNKNOWN);
        if old_state == new_state {
            return None;
        }
        match new_state {
            LIFE_STATE_ALIVE => Some(build_ward_entry(world, entity, time)),
            LIFE_STATE_DEAD => {
                let mut entry = build_ward_entry(world, entity, time);
                entry.attackername = ward_target_name(&entity.class_name)
                    .and_then(|target| self.killers.get_mut(target))
                    .and_then(VecDeque::pop_front);
                Some(entry)
            }
            _ => None,
        }
    }
}

/// Build a ward entry from the ward's current properties.
fn build_ward_entry(world: &World, ward: &Entity, time: i32) -> Entry {
    let observer = !ward.class_name.contains("TrueSight");
    let e = Some(ward);
    let cells: [Option<i32>; 3] = [
        get_property(e, prop::CELL_X, None),
        get_property(e, prop::CELL_Y, None),
        get_property(e, prop::CELL_Z, None),
    ];
    let life_state: Option<i32> = get_property(e, prop::LIFE_STATE, None);
    let left = life_state == Some(LIFE_STATE_DEAD);

    let kind = match (observer, left) {
        (true, false) => kind::OBSERVER,
        (true, true) => kind::OBSERVER_LEFT,
        (false, false) => kind::SENTRY,
        (false, true) => kind::SENTRY_LEFT,
    };
    let mut entry = Entry::new(time, kind);

    if let [Some(cx), Some(cy), Some(cz)] = cells {
        entry.x = precise_location(Some(cx), get_property(e, prop::VEC_X, None));
        entry.y = precise_location(Some(cy), get_property(e, prop::VEC_Y, None));
        entry.z = precise_location(Some(cz), get_property(e, prop::VEC_Z, None));
    }
    entry.entityleft = Some(left);
    entry.ehandle = Some(ward.handle);

    let owner = get_property::<i32>(e, prop::OWNER_ENTITY, None)
        .and_then(|handle| world.entities.get_by_handle(handle));
    entry.slot = resolve_slot(owner);
    entry
}
