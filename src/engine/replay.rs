//! Replay Engine
//!
//! One state object advanced by `handle(event)`. Events arrive in decoder
//! order on a single thread; nothing here is shared between engines.
//!
//! Every entry leaves through [`Emitter`], which applies the epoch gate
//! before handing it to the output bridge.

use std::collections::BTreeMap;
use std::io::{self, Write};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::coords::round_half_up;
use crate::core::digest::StreamDigest;
use crate::core::entry::{kind, Entry};
use crate::core::property::{get_property, Entity};
use crate::core::world::World;
use crate::decoder::combat_log::CombatLogEntry;
use crate::decoder::events::{DecoderEvent, FileInfo};
use crate::engine::clock::GameClock;
use crate::engine::combat_log::CombatLogClassifier;
use crate::engine::constants::{
    prop, CLASS_DATA_DIRE, CLASS_DATA_RADIANT, CLASS_GAMERULES_PROXY, CLASS_PLAYER_RESOURCE,
    GAME_STATE_DRAFT, GAME_STATE_POST_GAME, GAME_STATE_PRE_GAME,
};
use crate::engine::draft::DraftTracker;
use crate::engine::epoch::{EpochResolver, EpochSource, Resolution};
use crate::engine::interval::{collect_dota_plus, IntervalSampler, SampleContext};
use crate::engine::messages::{EnteredEntities, MessageHandler};
use crate::engine::slots::{InitOutcome, PlayerSlots};
use crate::engine::wards::WardTracker;
use crate::output::bridge::{OutputBridge, PersistenceGate};
use crate::output::game_info::GameInfoPayload;

// =============================================================================
// EMITTER
// =============================================================================

/// Epoch gate in front of the output bridge.
pub struct Emitter<W: Write> {
    epoch: EpochResolver,
    bridge: OutputBridge<W>,
}

impl<W: Write> Emitter<W> {
    fn new(bridge: OutputBridge<W>) -> Self {
        Self {
            epoch: EpochResolver::new(),
            bridge,
        }
    }

    /// Send an entry downstream, or hold it until the epoch is known.
    pub fn emit(&mut self, entry: Entry) {
        if let Some(entry) = self.epoch.admit(entry) {
            self.bridge.write(entry);
        }
    }

    /// Offer an epoch; releases the backlog if it is accepted.
    pub fn resolve(&mut self, epoch: i32, source: EpochSource) {
        if let Resolution::Resolved(backlog) = self.epoch.resolve(epoch, source) {
            for entry in backlog {
                self.bridge.write(entry);
            }
        }
    }

    /// Release the backlog unshifted.
    pub fn force_flush(&mut self) {
        for entry in self.epoch.force_flush() {
            self.bridge.write(entry);
        }
    }

    /// The epoch gate.
    pub fn epoch(&self) -> &EpochResolver {
        &self.epoch
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// What a finished engine hands back.
#[derive(Debug)]
pub struct EngineOutput<W> {
    /// The primary sink, flushed.
    pub sink: W,
    /// SHA-256 of every line written.
    pub digest: StreamDigest,
    /// Lines written.
    pub lines: u64,
    /// Resolved epoch, if any.
    pub epoch: Option<i32>,
}

/// Event-extraction state for one replay.
pub struct ReplayEngine<W: Write> {
    world: World,
    /// Current game second (pre-epoch).
    time: i32,
    post_game: bool,
    epilogue: bool,
    dota_plus: BTreeMap<i32, i32>,
    dota_plus_done: bool,
    slots: PlayerSlots,
    classifier: CombatLogClassifier,
    wards: WardTracker,
    draft: DraftTracker,
    clock: GameClock,
    sampler: IntervalSampler,
    messages: MessageHandler,
    entered: EnteredEntities,
    emitter: Emitter<W>,
}

impl<W: Write> ReplayEngine<W> {
    /// Engine writing JSON lines to `sink`.
    pub fn new(sink: W) -> Self {
        Self::with_bridge(OutputBridge::new(sink))
    }

    /// Engine writing JSON lines to `sink` and rows through `gate`.
    pub fn with_persistence(sink: W, gate: PersistenceGate) -> Self {
        Self::with_bridge(OutputBridge::with_persistence(sink, gate))
    }

    fn with_bridge(bridge: OutputBridge<W>) -> Self {
        Self {
            world: World::new(),
            time: 0,
            post_game: false,
            epilogue: false,
            dota_plus: BTreeMap::new(),
            dota_plus_done: false,
            slots: PlayerSlots::new(),
            classifier: CombatLogClassifier::default(),
            wards: WardTracker::new(),
            draft: DraftTracker::new(),
            clock: GameClock::new(),
            sampler: IntervalSampler::new(),
            messages: MessageHandler::new(),
            entered: EnteredEntities::new(),
            emitter: Emitter::new(bridge),
        }
    }

    /// Current game second (pre-epoch).
    pub fn time(&self) -> i32 {
        self.time
    }

    /// Entity and string-table state.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Player slot tables.
    pub fn slots(&self) -> &PlayerSlots {
        &self.slots
    }

    /// Epoch gate state.
    pub fn epoch(&self) -> &EpochResolver {
        self.emitter.epoch()
    }

    /// True once the game reached post-game.
    pub fn is_post_game(&self) -> bool {
        self.post_game
    }

    /// True once the terminal file info was handled.
    pub fn has_epilogue(&self) -> bool {
        self.epilogue
    }

    /// Lines written so far.
    pub fn lines(&self) -> u64 {
        self.emitter.bridge.lines()
    }

    /// Advance the engine by one decoder event.
    pub fn handle(&mut self, event: DecoderEvent) {
        match event {
            DecoderEvent::EntityCreated(entity) => self.on_entity_created(entity),
            DecoderEvent::EntityUpdated { index, changes } => {
                if let Some(touched) = self.world.entities.update(index, changes) {
                    if let Some(entity) = self.world.entities.get(index) {
                        self.wards.on_updated(entity, &touched);
                    }
                }
            }
            DecoderEvent::EntityDeleted { index } => {
                if let Some(entity) = self.world.entities.remove(index) {
                    self.wards.on_deleted(&entity);
                }
            }
            DecoderEvent::StringTable { table, index, name } => {
                self.world.string_tables.set(&table, index, name);
            }
            DecoderEvent::NetTick { tick } => self.clock.set_server_tick(tick),
            DecoderEvent::TickStart { .. } => self.on_tick_start(),
            DecoderEvent::TickEnd { synthetic } => {
                for entry in self.wards.on_tick_end(&self.world, synthetic, self.time) {
                    self.emitter.emit(entry);
                }
            }
            DecoderEvent::CombatLog(cle) => self.on_combat_log(&cle),
            DecoderEvent::UserMessage(message) => {
                if let Some(entry) = self.messages.handle(&self.world, self.time, &message) {
                    self.emitter.emit(entry);
                }
            }
            DecoderEvent::FileInfo(info) => self.on_file_info(&info),
        }
    }

    /// Release anything still held and flush the sinks.
    pub fn finish(mut self) -> io::Result<EngineOutput<W>> {
        if self.emitter.epoch.is_buffering() {
            warn!(
                buffered = self.emitter.epoch.buffered(),
                "epoch never resolved, flushing entries with unshifted times"
            );
            self.emitter.force_flush();
        }
        let lines = self.emitter.bridge.lines();
        let epoch = self.emitter.epoch.is_resolved().then(|| self.emitter.epoch.epoch());
        let (sink, digest) = self.emitter.bridge.finish()?;
        Ok(EngineOutput {
            sink,
            digest,
            lines,
            epoch,
        })
    }

    // =========================================================================
    // HANDLERS
    // =========================================================================

    fn on_entity_created(&mut self, entity: Entity) {
        let index = entity.index;
        self.world.entities.insert(entity);
        let Some(entity) = self.world.entities.get(index) else {
            return;
        };
        if let Some(entry) = self.wards.on_created(&self.world, entity, self.time) {
            self.emitter.emit(entry);
        }
        if let Some(entry) = self.entered.on_entered(entity, self.time, &self.slots) {
            self.emitter.emit(entry);
        }
    }

    fn on_tick_start(&mut self) {
        let mut stage = None;
        if let Some(rules) = self.world.entities.get_by_class_name(CLASS_GAMERULES_PROXY) {
            let reading = self.clock.advance(rules);
            self.time = reading.time;
            if let Some(pause) = reading.pause {
                self.emitter.emit(pause);
            }

            let start: i32 = get_property::<f32>(Some(rules), prop::GAME_START_TIME, None)
                .map(round_half_up)
                .unwrap_or(0);
            if start != 0 {
                self.emitter.resolve(start, EpochSource::RulesEntity);
            }

            stage = get_property::<i32>(Some(rules), prop::GAME_STATE, None);
            if stage == Some(GAME_STATE_DRAFT) {
                for entry in self.draft.observe(rules, self.time) {
                    self.emitter.emit(entry);
                }
            }
            self.sampler.prime(self.time);
        }

        let Some(resource) = self.world.entities.get_by_class_name(CLASS_PLAYER_RESOURCE) else {
            return;
        };
        if !self.slots.is_initialized() {
            if let InitOutcome::Initialized(entries) = self.slots.initialize(resource, self.time) {
                for entry in entries {
                    self.emitter.emit(entry);
                }
            }
        }
        if !self.slots.is_initialized() {
            return;
        }

        if !self.post_game && self.sampler.is_due(self.time) {
            let ctx = SampleContext {
                world: &self.world,
                resource,
                radiant: self.world.entities.get_by_class_name(CLASS_DATA_RADIANT),
                dire: self.world.entities.get_by_class_name(CLASS_DATA_DIRE),
                time: self.time,
                epoch: self.emitter.epoch.epoch(),
                stage,
            };
            for entry in self.sampler.sample(&ctx, &mut self.slots) {
                self.emitter.emit(entry);
            }
        } else if self.post_game && !self.dota_plus_done {
            self.dota_plus = collect_dota_plus(resource, &self.slots);
            self.dota_plus_done = true;
            debug!(players = self.dota_plus.len(), "dota plus levels collected");
        }
    }

    fn on_combat_log(&mut self, cle: &CombatLogEntry) {
        self.time = round_half_up(cle.timestamp);
        self.wards.record_kill(cle);
        let classified = self.classifier.classify(self.time, cle);
        match classified.game_state {
            Some(GAME_STATE_POST_GAME) => self.post_game = true,
            Some(GAME_STATE_PRE_GAME) => self.emitter.resolve(self.time, EpochSource::CombatLog),
            _ => {}
        }
        if classified.surfaced {
            self.emitter.emit(classified.entry);
        }
    }

    fn on_file_info(&mut self, file_info: &FileInfo) {
        let cosmetics = json_key(self.entered.cosmetics());
        self.emitter.emit(Entry {
            key: cosmetics,
            ..Entry::new(0, kind::COSMETICS)
        });
        let dota_plus = json_key(&self.dota_plus);
        self.emitter.emit(Entry {
            key: dota_plus,
            ..Entry::new(0, kind::DOTAPLUS)
        });
        let epilogue = json_key(file_info);
        self.emitter.emit(Entry {
            key: epilogue,
            ..Entry::new(0, kind::EPILOGUE)
        });

        if let Some(gate) = self.emitter.bridge.persistence() {
            match GameInfoPayload::build(file_info, self.slots.steam_ids()) {
                Ok(payload) => {
                    if let Some(match_id) = payload.source_match_id {
                        gate.discover_match_id(match_id);
                    }
                    match gate.persist_game_info(&payload) {
                        Ok(()) => info!(match_id = ?gate.match_id(), players = payload.players.len(), "game info stored"),
                        Err(e) => warn!(error = %e, "failed to store game info"),
                    }
                }
                Err(e) => warn!(error = %e, "failed to encode game info"),
            }
        }

        self.epilogue = true;
        self.emitter.force_flush();
    }
}

/// JSON text for an entry key; logged and left empty on failure.
fn json_key<T: Serialize + ?Sized>(value: &T) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(error = %e, "failed to encode entry key");
            None
        }
    }
}
