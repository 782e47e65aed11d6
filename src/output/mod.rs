//! Output side of the engine.
//!
//! The JSON-lines sink with its stream digest, the persistence gate that
//! holds rows until the match id is known, and the SQLite event store.

pub mod bridge;
pub mod game_info;
pub mod storage;

pub use bridge::{OutputBridge, PersistenceGate};
pub use game_info::{GameInfoPayload, GamePlayer, PickBan};
pub use storage::{route, EventStore, Route, SqliteStore, StorageError};
