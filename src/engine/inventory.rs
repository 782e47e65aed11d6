//! Inventory and ability extraction.
//!
//! Walks a hero's fixed-size item and ability handle arrays, resolving each
//! handle to an entity and each entity to its name through the
//! `EntityNames` string table.

use thiserror::Error;
use tracing::debug;

use crate::core::entry::{Ability, Item};
use crate::core::property::{get_property, Entity, INVALID_HANDLE};
use crate::core::world::World;
use crate::engine::constants::{prop, MAX_ABILITIES, MAX_INVENTORY_SLOTS};

/// A handle that should resolve to a named entity did not.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    /// No live entity behind an item handle.
    #[error("can't find item by its handle ({0})")]
    UnknownItem(i32),

    /// No live entity behind an ability handle.
    #[error("can't find ability by its handle ({0})")]
    UnknownAbility(i32),

    /// Entity exists but has no row in the `EntityNames` table.
    #[error("can't get name of entity {0} from the EntityNames string table")]
    MissingName(i32),
}

/// Resolve an entity's name through its string-table index.
fn entity_name(world: &World, entity: &Entity) -> Result<String, LookupError> {
    get_property::<i32>(Some(entity), prop::ENTITY_NAME_INDEX, None)
        .and_then(|index| world.entity_name(index))
        .map(str::to_string)
        .ok_or(LookupError::MissingName(entity.index))
}

/// Read one inventory slot. `Ok(None)` means the slot is empty.
pub fn hero_item(world: &World, hero: &Entity, slot: usize) -> Result<Option<Item>, LookupError> {
    let handle = match get_property::<i32>(Some(hero), prop::ITEMS, Some(slot)) {
        Some(h) if h != INVALID_HANDLE => h,
        _ => return Ok(None),
    };
    let item = world
        .entities
        .get_by_handle(handle)
        .ok_or(LookupError::UnknownItem(handle))?;
    let id = entity_name(world, item)?;

    let charges: i32 = get_property(Some(item), prop::CURRENT_CHARGES, None).unwrap_or(0);
    let secondary: i32 = get_property(Some(item), prop::SECONDARY_CHARGES, None).unwrap_or(0);
    Ok(Some(Item {
        id,
        slot: slot as i32,
        num_charges: (charges != 0).then_some(charges),
        num_secondary_charges: (secondary != 0).then_some(secondary),
    }))
}

/// Read one ability slot. `Ok(None)` means the slot is empty.
///
/// Newer replays name the array `m_hAbilities`, older ones `m_vecAbilities`.
pub fn hero_ability(world: &World, hero: &Entity, slot: usize) -> Result<Option<Ability>, LookupError> {
    let handle = get_property::<i32>(Some(hero), prop::ABILITIES, Some(slot))
        .or_else(|| get_property(Some(hero), prop::ABILITIES_VEC, Some(slot)));
    let handle = match handle {
        Some(h) if h != INVALID_HANDLE => h,
        _ => return Ok(None),
    };
    let ability = world
        .entities
        .get_by_handle(handle)
        .ok_or(LookupError::UnknownAbility(handle))?;
    Ok(Some(Ability {
        id: entity_name(world, ability)?,
        level: get_property(Some(ability), prop::ABILITY_LEVEL, None),
    }))
}

/// All filled inventory slots; unresolvable slots are logged and skipped.
pub fn hero_inventory(world: &World, hero: &Entity) -> Vec<Item> {
    (0..MAX_INVENTORY_SLOTS)
        .filter_map(|slot| match hero_item(world, hero, slot) {
            Ok(item) => item,
            Err(e) => {
                debug!(hero = %hero.class_name, slot, error = %e, "skipping inventory slot");
                None
            }
        })
        .collect()
}

/// All filled ability slots; unresolvable slots are logged and skipped.
pub fn hero_abilities(world: &World, hero: &Entity) -> Vec<Ability> {
    (0..MAX_ABILITIES)
        .filter_map(|slot| match hero_ability(world, hero, slot) {
            Ok(ability) => ability,
            Err(e) => {
                debug!(hero = %hero.class_name, slot, error = %e, "skipping ability slot");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::world::STRING_TABLE_ENTITY_NAMES;

    fn world() -> World {
        let mut world = World::new();
        world.string_tables.set(STRING_TABLE_ENTITY_NAMES, 1, "item_tango".into());
        world.string_tables.set(STRING_TABLE_ENTITY_NAMES, 2, "item_ward_dispenser".into());
        world.string_tables.set(STRING_TABLE_ENTITY_NAMES, 3, "axe_berserkers_call".into());
        world.entities.insert(
            Entity::new(100, 100, 5, "CDOTA_Item_Tango")
                .with("m_pEntity.m_nameStringableIndex", 1)
                .with("m_iCurrentCharges", 3)
                .with("m_iSecondaryCharges", 0),
        );
        world.entities.insert(
            Entity::new(101, 101, 6, "CDOTA_Item_WardDispenser")
                .with("m_pEntity.m_nameStringableIndex", 2)
                .with("m_iCurrentCharges", 1)
                .with("m_iSecondaryCharges", 2),
        );
        world.entities.insert(
            Entity::new(102, 102, 7, "CDOTA_Ability_Axe_BerserkersCall")
                .with("m_pEntity.m_nameStringableIndex", 3)
                .with("m_iLevel", 2),
        );
        // no name row
        world.entities.insert(Entity::new(103, 103, 8, "CDOTA_Item_Unknown").with("m_pEntity.m_nameStringableIndex", 99));
        world
    }

    fn hero() -> Entity {
        Entity::new(50, 50, 9, "CDOTA_Unit_Hero_Axe")
            .with("m_hItems.0000", 100)
            .with("m_hItems.0001", INVALID_HANDLE)
            .with("m_hItems.0002", 101)
            .with("m_hItems.0003", 103)
            .with("m_hItems.0004", 999)
            .with("m_vecAbilities.0000", 102)
    }

    #[test]
    fn test_item_charges() {
        let w = world();
        let tango = hero_item(&w, &hero(), 0).unwrap().unwrap();
        assert_eq!(tango.id, "item_tango");
        assert_eq!(tango.num_charges, Some(3));
        assert_eq!(tango.num_secondary_charges, None);

        let wards = hero_item(&w, &hero(), 2).unwrap().unwrap();
        assert_eq!(wards.slot, 2);
        assert_eq!(wards.num_secondary_charges, Some(2));
    }

    #[test]
    fn test_empty_and_invalid_slots() {
        let w = world();
        assert_eq!(hero_item(&w, &hero(), 1), Ok(None));
        assert_eq!(hero_item(&w, &hero(), 7), Ok(None));
        assert_eq!(hero_item(&w, &hero(), 3), Err(LookupError::MissingName(103)));
        assert_eq!(hero_item(&w, &hero(), 4), Err(LookupError::UnknownItem(999)));
    }

    #[test]
    fn test_inventory_skips_failures() {
        let w = world();
        let ids: Vec<_> = hero_inventory(&w, &hero()).into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["item_tango", "item_ward_dispenser"]);
    }

    #[test]
    fn test_ability_array_fallback() {
        let w = world();
        let abilities = hero_abilities(&w, &hero());
        assert_eq!(
            abilities,
            vec![Ability {
                id: "axe_berserkers_call".into(),
                level: Some(2),
            }]
        );
        let newer = Entity::new(50, 50, 9, "CDOTA_Unit_Hero_Axe").with("m_hAbilities.0000", 777);
        assert_eq!(hero_ability(&w, &newer, 0), Err(LookupError::UnknownAbility(777)));
    }
}
