//! Game Clock
//!
//! Derives the current game second from the rules entity. Older replays
//! expose the game time directly; newer ones only expose tick counters, so
//! time is rebuilt from the server tick minus paused ticks and pauses are
//! detected from the paused flag.

use crate::core::coords::{round_half_up, ticks_to_seconds};
use crate::core::entry::Entry;
use crate::core::property::{get_property, Entity};
use crate::engine::constants::{prop, TICKS_PER_SECOND};

/// Time read on one tick, plus a completed pause if one just ended.
#[derive(Debug, PartialEq)]
pub struct ClockReading {
    /// Current game second (pre-epoch).
    pub time: i32,
    /// Pause-duration entry for a pause that ended this tick.
    pub pause: Option<Entry>,
}

/// Tick-derived game clock with pause tracking.
#[derive(Debug, Default)]
pub struct GameClock {
    server_tick: i32,
    was_paused: bool,
    pause_start_tick: i32,
    pause_start_game_time: i32,
}

impl GameClock {
    /// Create a clock at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest network tick.
    pub fn set_server_tick(&mut self, tick: i32) {
        self.server_tick = tick;
    }

    /// Latest network tick.
    pub fn server_tick(&self) -> i32 {
        self.server_tick
    }

    /// True while a pause is in progress.
    pub fn is_paused(&self) -> bool {
        self.was_paused
    }

    /// Read the game time from the rules entity.
    pub fn advance(&mut self, rules: &Entity) -> ClockReading {
        let rules = Some(rules);
        if let Some(game_time) = get_property::<f32>(rules, prop::GAME_TIME, None) {
            return ClockReading {
                time: round_half_up(game_time),
                pause: None,
            };
        }

        let paused: bool = get_property(rules, prop::GAME_PAUSED, None).unwrap_or(false);
        let tick = if paused {
            get_property(rules, prop::PAUSE_START_TICK, None).unwrap_or(self.server_tick)
        } else {
            self.server_tick
        };
        let paused_ticks: i32 = get_property(rules, prop::TOTAL_PAUSED_TICKS, None).unwrap_or(0);
        let time = ticks_to_seconds(tick.saturating_sub(paused_ticks), TICKS_PER_SECOND);

        let mut pause = None;
        if paused && !self.was_paused {
            self.pause_start_tick = tick;
            self.pause_start_game_time = time;
            self.was_paused = true;
        } else if !paused && self.was_paused {
            let duration = ticks_to_seconds(tick.saturating_sub(self.pause_start_tick), TICKS_PER_SECOND);
            if duration > 0 {
                pause = Some(Entry::game_paused(self.pause_start_game_time, duration));
            }
            self.was_paused = false;
        }

        ClockReading { time, pause }
    }
}
