//! Core primitives.
//!
//! Decoder-facing data (entities, properties, string tables), the output
//! entry model, coordinate decoding and the output digest. Nothing in here
//! holds engine state.

pub mod coords;
pub mod digest;
pub mod entry;
pub mod property;
pub mod world;

// Re-export core types
pub use coords::{precise_location, round_half_up, CELL_SIZE};
pub use digest::{OutputDigest, StreamDigest};
pub use entry::{Ability, Entry, Item};
pub use property::{get_indexed, get_property, Entity, FieldPath, PropertyValue};
pub use world::{EntityStore, StringTables, World};
