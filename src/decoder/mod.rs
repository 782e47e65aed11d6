//! Decoder interface.
//!
//! The binary demo decoder runs upstream of this crate. What reaches the
//! engine is its callback sequence, serialized as JSON lines.

pub mod combat_log;
pub mod events;

pub use combat_log::{CombatLogEntry, CombatLogType};
pub use events::{DecoderEvent, FileInfo, UserMessage};
