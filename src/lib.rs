//! # Replay Events
//!
//! Event extraction for decoded Dota 2 replays: entity snapshots, combat-log
//! entries, user messages and tick signals go in, one JSON line per game
//! event comes out, optionally mirrored into a relational store.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      REPLAY EVENTS                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Decoder-facing primitives                 │
//! │  ├── property.rs - Property values, entities, field paths    │
//! │  ├── world.rs    - Entity store and string tables            │
//! │  ├── entry.rs    - Output entry model                        │
//! │  ├── coords.rs   - Cell + offset position decoding           │
//! │  └── digest.rs   - Output stream hashing                     │
//! │                                                              │
//! │  decoder/        - Input events (JSON lines)                 │
//! │                                                              │
//! │  engine/         - State machines (single-threaded)          │
//! │  ├── replay.rs   - ReplayEngine::handle(event)               │
//! │  ├── epoch.rs    - Epoch gate and backlog                    │
//! │  ├── wards.rs    - Ward lifecycle                            │
//! │  ├── draft.rs    - Pick/ban timings                          │
//! │  ├── interval.rs - Per-second player samples                 │
//! │  └── ...                                                     │
//! │                                                              │
//! │  output/         - JSON sink, persistence gate, SQLite       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! An engine owns all of its state. Maps are `BTreeMap`, so two engines fed
//! the same decoder stream write byte-identical output and end with the
//! same stream digest.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod decoder;
pub mod engine;
pub mod output;

// Re-export commonly used types
pub use config::StorageConfig;
pub use core::entry::Entry;
pub use decoder::events::DecoderEvent;
pub use engine::replay::ReplayEngine;
pub use engine::runner::{run_parse, ParseError, ParseSummary};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
