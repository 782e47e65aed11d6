//! Entity Properties
//!
//! Decoded entity snapshots and the version-tolerant property accessor.
//!
//! Property names and array encodings drift between game patches, so every
//! read returns an `Option`: a missing property, a missing array slot or a
//! value of the wrong type all collapse to `None` and the caller falls back.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

/// Placeholder substituted with a zero-padded array index.
pub const INDEX_PLACEHOLDER: &str = "%i";

/// Handle value the decoder uses for "no entity".
pub const INVALID_HANDLE: i32 = 0xFF_FFFF;

/// Number of low handle bits holding the entity index.
pub const HANDLE_INDEX_BITS: u32 = 14;

/// Format an array index the way field paths spell it (`0003`).
pub fn array_index(idx: usize) -> String {
    format!("{:04}", idx)
}

/// Expand the `%i` placeholder of a property name.
pub fn property_name(name: &str, idx: Option<usize>) -> String {
    match idx {
        Some(i) => name.replace(INDEX_PLACEHOLDER, &array_index(i)),
        None => name.to_string(),
    }
}

// =============================================================================
// PROPERTY VALUE
// =============================================================================

/// A decoded property value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Boolean flag.
    Bool(bool),
    /// Any integral value (handles, ids, counters, 64-bit keys).
    Int(i64),
    /// Floating point value.
    Float(f32),
    /// String value.
    Str(String),
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        PropertyValue::Int(v as i64)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<f32> for PropertyValue {
    fn from(v: f32) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Str(v.to_string())
    }
}

/// Typed extraction from a [`PropertyValue`].
///
/// Returns `None` when the stored value has an incompatible type.
pub trait FromProperty: Sized {
    /// Convert, or `None` on type mismatch.
    fn from_property(value: &PropertyValue) -> Option<Self>;
}

impl FromProperty for bool {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromProperty for i32 {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Int(i) => i32::try_from(*i).ok(),
            _ => None,
        }
    }
}

impl FromProperty for i64 {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromProperty for f32 {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Float(f) => Some(*f),
            // JSON encoders drop the fraction of whole floats
            PropertyValue::Int(i) => Some(*i as f32),
            _ => None,
        }
    }
}

impl FromProperty for String {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

// =============================================================================
// ENTITY
// =============================================================================

/// Resolved address of a property within an entity class.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldPath(pub String);

/// Snapshot of one decoded entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity index (slot in the entity list).
    pub index: i32,
    /// Serial-qualified handle other entities use to refer to this one.
    pub handle: i32,
    /// Numeric class id.
    pub class_id: i32,
    /// Class name, e.g. `CDOTA_Unit_Hero_Axe`.
    pub class_name: String,
    /// Current property values keyed by flattened name.
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl Entity {
    /// Create an entity with no properties.
    pub fn new(index: i32, handle: i32, class_id: i32, class_name: impl Into<String>) -> Self {
        Self {
            index,
            handle,
            class_id,
            class_name: class_name.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style property setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Resolve a property name to a field path, if this entity's class has it.
    pub fn field_path(&self, name: &str) -> Option<FieldPath> {
        if self.properties.contains_key(name) {
            Some(FieldPath(name.to_string()))
        } else {
            None
        }
    }

    /// Check whether a property exists.
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Read the value at a resolved field path.
    pub fn value_at<T: FromProperty>(&self, path: &FieldPath) -> Option<T> {
        self.properties.get(&path.0).and_then(T::from_property)
    }

    /// Apply a batch of changed properties, returning the touched field paths.
    pub fn apply(&mut self, changes: BTreeMap<String, PropertyValue>) -> Vec<FieldPath> {
        let mut touched = Vec::with_capacity(changes.len());
        for (name, value) in changes {
            touched.push(FieldPath(name.clone()));
            self.properties.insert(name, value);
        }
        touched
    }
}

/// Entity index encoded in a handle.
#[inline]
pub fn handle_to_index(handle: i32) -> i32 {
    handle & ((1 << HANDLE_INDEX_BITS) - 1)
}

// =============================================================================
// ACCESSOR
// =============================================================================

/// Read a possibly array-indexed property from a possibly absent entity.
///
/// `name` may contain a `%i` placeholder, replaced by `idx` formatted as a
/// four digit array index. Any failure yields `None`.
pub fn get_property<T: FromProperty>(entity: Option<&Entity>, name: &str, idx: Option<usize>) -> Option<T> {
    let entity = entity?;
    let name = property_name(name, idx);
    let path = entity.field_path(&name)?;
    entity.value_at(&path)
}

/// Like [`get_property`] with a signed index; negative indices yield `None`.
pub fn get_indexed<T: FromProperty>(entity: Option<&Entity>, name: &str, idx: i32) -> Option<T> {
    let idx = usize::try_from(idx).ok()?;
    get_property(entity, name, Some(idx))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource() -> Entity {
        Entity::new(5, 5, 1, "CDOTA_PlayerResource")
            .with("m_vecPlayerData.0003.m_iPlayerTeam", 2)
            .with("m_vecPlayerData.0003.m_iPlayerSteamID", 76561198000000001i64)
            .with("m_flStuns", 1.5f32)
            .with("m_bFlag", true)
    }

    #[test]
    fn test_array_index_format() {
        assert_eq!(array_index(3), "0003");
        assert_eq!(array_index(27), "0027");
        assert_eq!(property_name("a.%i.b", Some(12)), "a.0012.b");
        assert_eq!(property_name("a.%i.b", None), "a.%i.b");
    }

    #[test]
    fn test_indexed_read() {
        let e = resource();
        let team: Option<i32> = get_property(Some(&e), "m_vecPlayerData.%i.m_iPlayerTeam", Some(3));
        assert_eq!(team, Some(2));
        let steam: Option<i64> = get_property(Some(&e), "m_vecPlayerData.%i.m_iPlayerSteamID", Some(3));
        assert_eq!(steam, Some(76561198000000001));
    }

    #[test]
    fn test_absence_instead_of_failure() {
        let e = resource();
        // missing slot
        assert_eq!(get_property::<i32>(Some(&e), "m_vecPlayerData.%i.m_iPlayerTeam", Some(4)), None);
        // missing entity
        assert_eq!(get_property::<i32>(None, "m_flStuns", None), None);
        // wrong type
        assert_eq!(get_property::<bool>(Some(&e), "m_flStuns", None), None);
        // out of range for i32
        assert_eq!(get_property::<i32>(Some(&e), "m_vecPlayerData.%i.m_iPlayerSteamID", Some(3)), None);
        // negative index
        assert_eq!(get_indexed::<i32>(Some(&e), "m_vecPlayerData.%i.m_iPlayerTeam", -1), None);
    }

    #[test]
    fn test_float_accepts_whole_numbers() {
        let e = Entity::new(1, 1, 1, "X").with("m_vecX", 64);
        assert_eq!(get_property::<f32>(Some(&e), "m_vecX", None), Some(64.0));
    }

    #[test]
    fn test_apply_reports_touched_paths() {
        let mut e = resource();
        let mut changes = BTreeMap::new();
        changes.insert("m_lifeState".to_string(), PropertyValue::Int(1));
        let touched = e.apply(changes);
        assert_eq!(touched, vec![FieldPath("m_lifeState".into())]);
        assert_eq!(e.value_at::<i32>(&FieldPath("m_lifeState".into())), Some(1));
    }

    #[test]
    fn test_handle_index() {
        let handle = (7 << HANDLE_INDEX_BITS) | 123;
        assert_eq!(handle_to_index(handle), 123);
    }

    #[test]
    fn test_untagged_value_deserialization() {
        let v: BTreeMap<String, PropertyValue> =
            serde_json::from_str(r#"{"a":1,"b":2.5,"c":true,"d":"x"}"#).unwrap();
        assert_eq!(v["a"], PropertyValue::Int(1));
        assert_eq!(v["b"], PropertyValue::Float(2.5));
        assert_eq!(v["c"], PropertyValue::Bool(true));
        assert_eq!(v["d"], PropertyValue::Str("x".into()));
    }
}
