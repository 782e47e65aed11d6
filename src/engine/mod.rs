//! Event Extraction Engine
//!
//! Single-threaded state machines driven by the decoder callback order.
//!
//! ## Module Structure
//!
//! - `replay`: the `ReplayEngine` state object and its `handle(event)` dispatch
//! - `runner`: JSON-lines decoder stream in, JSON-lines entries out
//! - `epoch`: holds entries until in-game zero time is known
//! - `slots`: player initialization and slot lookups
//! - `clock`: game time and pause detection
//! - `combat_log`, `visitors`: combat-log classification
//! - `wards`: ward placement and death
//! - `draft`: pick/ban timings
//! - `interval`, `inventory`: per-second player samples
//! - `messages`: user messages and entering entities
//! - `constants`: game constants and property names

pub mod clock;
pub mod combat_log;
pub mod constants;
pub mod draft;
pub mod epoch;
pub mod interval;
pub mod inventory;
pub mod messages;
pub mod replay;
pub mod runner;
pub mod slots;
pub mod visitors;
pub mod wards;

// Re-export key types
pub use clock::{ClockReading, GameClock};
pub use combat_log::{Classified, CombatLogClassifier};
pub use draft::DraftTracker;
pub use epoch::{EpochResolver, EpochSource, Resolution};
pub use interval::{IntervalSampler, SampleContext};
pub use inventory::LookupError;
pub use messages::{EnteredEntities, MessageHandler};
pub use replay::{EngineOutput, Emitter, ReplayEngine};
pub use runner::{run_parse, ParseError, ParseSummary};
pub use slots::{InitOutcome, PlayerSlots};
pub use visitors::{CombatLogVisitor, GreedStackCounter, TrackStatus, TrackedDeathVisitor};
pub use wards::WardTracker;
