//! Decoder World
//!
//! Live view of the entities and string tables the decoder has delivered so
//! far. Uses BTreeMap so iteration order never depends on hashing.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::property::{Entity, FieldPath, PropertyValue, handle_to_index, INVALID_HANDLE};

/// String table holding entity names, indexed by `m_nameStringableIndex`.
pub const STRING_TABLE_ENTITY_NAMES: &str = "EntityNames";

/// All live entities, addressable by index, handle and class name.
#[derive(Debug, Default)]
pub struct EntityStore {
    by_index: BTreeMap<i32, Entity>,
    by_class: BTreeMap<String, BTreeSet<i32>>,
}

impl EntityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) an entity.
    pub fn insert(&mut self, entity: Entity) {
        if let Some(old) = self.by_index.remove(&entity.index) {
            self.unlink_class(&old.class_name, old.index);
        }
        self.by_class
            .entry(entity.class_name.clone())
            .or_default()
            .insert(entity.index);
        self.by_index.insert(entity.index, entity);
    }

    /// Apply property changes to an entity, returning the touched paths.
    ///
    /// Returns `None` if no entity lives at `index`.
    pub fn update(&mut self, index: i32, changes: BTreeMap<String, PropertyValue>) -> Option<Vec<FieldPath>> {
        self.by_index.get_mut(&index).map(|e| e.apply(changes))
    }

    /// Remove an entity.
    pub fn remove(&mut self, index: i32) -> Option<Entity> {
        let entity = self.by_index.remove(&index)?;
        self.unlink_class(&entity.class_name, index);
        Some(entity)
    }

    fn unlink_class(&mut self, class_name: &str, index: i32) {
        if let Some(set) = self.by_class.get_mut(class_name) {
            set.remove(&index);
            if set.is_empty() {
                self.by_class.remove(class_name);
            }
        }
    }

    /// Look up by index.
    pub fn get(&self, index: i32) -> Option<&Entity> {
        self.by_index.get(&index)
    }

    /// Look up by handle; stale handles (serial mismatch) yield `None`.
    pub fn get_by_handle(&self, handle: i32) -> Option<&Entity> {
        if handle == INVALID_HANDLE {
            return None;
        }
        self.by_index
            .get(&handle_to_index(handle))
            .filter(|e| e.handle == handle)
    }

    /// First live entity of a class (lowest index).
    pub fn get_by_class_name(&self, class_name: &str) -> Option<&Entity> {
        let index = self.by_class.get(class_name)?.iter().next()?;
        self.by_index.get(index)
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    /// True if no entity is live.
    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }
}

/// String tables keyed by table name, then row index.
#[derive(Debug, Default)]
pub struct StringTables {
    tables: BTreeMap<String, BTreeMap<i32, String>>,
}

impl StringTables {
    /// Create empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one row.
    pub fn set(&mut self, table: &str, index: i32, name: String) {
        self.tables.entry(table.to_string()).or_default().insert(index, name);
    }

    /// Look up one row.
    pub fn name_by_index(&self, table: &str, index: i32) -> Option<&str> {
        self.tables.get(table)?.get(&index).map(String::as_str)
    }
}

/// Everything the engine can query about the decoder's current state.
#[derive(Debug, Default)]
pub struct World {
    /// Live entities.
    pub entities: EntityStore,
    /// String tables.
    pub string_tables: StringTables,
}

impl World {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve an entity's name through the `EntityNames` table.
    pub fn entity_name(&self, name_index: i32) -> Option<&str> {
        self.string_tables.name_by_index(STRING_TABLE_ENTITY_NAMES, name_index)
    }
}
