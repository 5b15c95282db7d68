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

use serde::{Deserialize, Serialize};

/// A start time and a duration, checked against a caller-supplied clock.
///
/// Useful for polling-style waits (weapon reloads, UI blink intervals) where
/// a callback through the [`CooldownScheduler`](super::CooldownScheduler)
/// would be overkill.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Cooldown {
    /// Clock value, in seconds, when the wait started.
    pub started_at: f64,
    /// Length of the wait in seconds.
    pub duration: f32,
}

impl Cooldown {
    /// Starts a wait of `duration` seconds at `now`.
    pub fn start(now: f64, duration: f32) -> Self {
        Self {
            started_at: now,
            duration,
        }
    }

    /// Restarts the same wait at `now`.
    pub fn restart(&mut self, now: f64) {
        self.started_at = now;
    }

    /// Returns true once `duration` seconds have passed.
    pub fn is_cooled(&self, now: f64) -> bool {
        self.pending(now) <= 0.0
    }

    /// Seconds left before the wait is over. Negative once it is.
    pub fn pending(&self, now: f64) -> f32 {
        (self.started_at + f64::from(self.duration) - now) as f32
    }

    /// Progress of the wait in `[0, 1]`. A zero-length wait is complete.
    pub fn normalized(&self, now: f64) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (((now - self.started_at) / f64::from(self.duration)) as f32).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooled_exactly_at_the_deadline() {
        let cooldown = Cooldown::start(10.0, 2.0);
        assert!(!cooldown.is_cooled(11.5));
        assert!(cooldown.is_cooled(12.0));
        assert_eq!(cooldown.pending(11.5), 0.5);
    }

    #[test]
    fn normalized_progress_is_clamped() {
        let cooldown = Cooldown::start(0.0, 4.0);
        assert_eq!(cooldown.normalized(-1.0), 0.0);
        assert_eq!(cooldown.normalized(1.0), 0.25);
        assert_eq!(cooldown.normalized(9.0), 1.0);
        assert_eq!(Cooldown::start(3.0, 0.0).normalized(0.0), 1.0);
    }

    #[test]
    fn restart_moves_the_start_only() {
        let mut cooldown = Cooldown::start(0.0, 1.0);
        cooldown.restart(5.0);
        assert_eq!(cooldown.duration, 1.0);
        assert!(!cooldown.is_cooled(5.5));
    }
}
