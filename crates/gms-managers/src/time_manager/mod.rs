// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Game clock and deferred callbacks.

use gms_core::time::{format_clock, ClockTime, Cooldown, CooldownHandle, CooldownScheduler};
use gms_core::{ConstructError, GameContext, LinkDataLogic, SubManager, SubManagerRegistration};
use serde::{Deserialize, Serialize};
use std::any::Any;

/// Configuration payload of the [`TimeManager`]. Optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeManagerData {
    /// Multiplier applied to every tick delta. `1.0` is real time.
    #[serde(default = "default_time_scale")]
    pub time_scale: f32,
}

fn default_time_scale() -> f32 {
    1.0
}

impl Default for TimeManagerData {
    fn default() -> Self {
        Self {
            time_scale: default_time_scale(),
        }
    }
}

impl LinkDataLogic for TimeManagerData {
    type Logic = TimeManager;

    fn build(data: Option<&Self>) -> Result<TimeManager, ConstructError> {
        let data = data.cloned().unwrap_or_default();
        if !data.time_scale.is_finite() || data.time_scale < 0.0 {
            return Err(ConstructError::InvalidPayload(format!(
                "time_scale must be a non-negative number, got {}",
                data.time_scale
            )));
        }
        Ok(TimeManager::new(data))
    }
}

inventory::submit! {
    SubManagerRegistration::new::<TimeManagerData>(
        "TimeManagerData",
        "Time Manager Data",
        "Time Manager",
    )
}

/// Tracks game time and fires cooldown callbacks without coroutines.
///
/// ```rust,ignore
/// if let Some(time) = context.try_get::<TimeManager>() {
///     time.with(|time| time.schedule(0.5, || log::info!("half a second later")));
/// }
/// ```
///
/// Callbacks run inside the manager's own tick, so they cannot look the
/// `TimeManager` up again; chain follow-up work through events instead.
#[derive(Debug)]
pub struct TimeManager {
    time_scale: f32,
    game_seconds: f64,
    scheduler: CooldownScheduler,
}

impl TimeManager {
    /// Creates a stopped clock.
    pub fn new(data: TimeManagerData) -> Self {
        Self {
            time_scale: data.time_scale,
            game_seconds: 0.0,
            scheduler: CooldownScheduler::new(),
        }
    }

    /// Seconds of game time elapsed since the manager was added.
    pub fn game_seconds(&self) -> f64 {
        self.game_seconds
    }

    /// [`game_seconds`](Self::game_seconds) split for display.
    pub fn formatted_time(&self) -> ClockTime {
        format_clock(self.game_seconds)
    }

    /// Current time scale.
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Changes the time scale. Negative values are clamped to zero (paused).
    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale.max(0.0);
    }

    /// Calls `callback` after `seconds` of game time.
    pub fn schedule(&mut self, seconds: f32, callback: impl FnOnce() + 'static) -> CooldownHandle {
        self.scheduler.schedule(seconds, callback)
    }

    /// Calls `callback(payload)` after `seconds` of game time.
    pub fn schedule_with<P: 'static>(
        &mut self,
        seconds: f32,
        callback: impl FnOnce(P) + 'static,
        payload: P,
    ) -> CooldownHandle {
        self.scheduler.schedule_with(seconds, callback, payload)
    }

    /// Cancels a scheduled callback. Stale handles are ignored.
    pub fn cancel(&mut self, handle: CooldownHandle) -> bool {
        self.scheduler.cancel(handle)
    }

    /// Returns true while `handle` has not fired or been cancelled.
    pub fn is_pending(&self, handle: CooldownHandle) -> bool {
        self.scheduler.is_pending(handle)
    }

    /// Starts a polling-style cooldown on the game clock.
    pub fn start_cooldown(&self, seconds: f32) -> Cooldown {
        Cooldown::start(self.game_seconds, seconds)
    }

    /// Checks a cooldown against the game clock.
    pub fn is_cooled(&self, cooldown: &Cooldown) -> bool {
        cooldown.is_cooled(self.game_seconds)
    }

    /// Number of callbacks waiting to fire.
    pub fn active_cooldowns(&self) -> usize {
        self.scheduler.active_count()
    }
}

impl SubManager for TimeManager {
    fn initialize(&mut self, _context: &GameContext<'_>) -> bool {
        log::debug!("TimeManager: clock started (scale {:.2})", self.time_scale);
        true
    }

    fn uninitialize(&mut self) {
        log::debug!(
            "TimeManager: stopped at {} with {} pending cooldowns",
            self.formatted_time(),
            self.scheduler.active_count()
        );
    }

    fn on_tick(&mut self, context: &GameContext<'_>) {
        let delta = context.delta_seconds * self.time_scale;
        self.game_seconds += f64::from(delta);
        self.scheduler.advance(delta);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
