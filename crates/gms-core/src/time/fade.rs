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

/// Where a [`Fade`] currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadePhase {
    /// At rest; `advance` does nothing.
    #[default]
    Idle,
    /// Moving toward the target value.
    Fading,
    /// Waiting at the target before fading back.
    Holding,
}

/// A value (typically an alpha) moved toward a target at a fixed speed,
/// one tick at a time.
///
/// A fade may hold at its target and then return on its own to the value it
/// started from, which covers the "show briefly, then fade out" pattern of
/// pickup notifications and title cards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fade {
    value: f32,
    target: f32,
    speed: f32,
    phase: FadePhase,
    elapsed: f32,
    hold: Option<f32>,
    return_to: f32,
}

impl Fade {
    /// An idle fade resting at `value`.
    pub fn new(value: f32) -> Self {
        Self {
            value,
            target: value,
            return_to: value,
            ..Self::default()
        }
    }

    /// Current value.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Value the current phase is heading to.
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Current phase.
    pub fn phase(&self) -> FadePhase {
        self.phase
    }

    /// Returns true while fading or holding.
    pub fn is_running(&self) -> bool {
        self.phase != FadePhase::Idle
    }

    /// Moves toward `target` at `speed` units per second, then stops.
    ///
    /// Replaces whatever the fade was doing, including a pending hold.
    pub fn fade_to(&mut self, target: f32, speed: f32) {
        self.start(target, speed, None);
    }

    /// Moves toward `target`, waits `hold_seconds`, then moves back to the
    /// current value at the same speed.
    pub fn fade_to_and_back(&mut self, target: f32, speed: f32, hold_seconds: f32) {
        self.start(target, speed, Some(hold_seconds.max(0.0)));
    }

    /// Stops in place.
    pub fn stop(&mut self) {
        self.phase = FadePhase::Idle;
        self.hold = None;
        self.elapsed = 0.0;
        self.target = self.value;
    }

    /// Advances by `delta_seconds`. Returns true on the tick the fade comes
    /// to rest.
    pub fn advance(&mut self, delta_seconds: f32) -> bool {
        let delta = delta_seconds.max(0.0);
        match self.phase {
            FadePhase::Idle => false,
            FadePhase::Fading => {
                self.elapsed += delta;
                let step = self.speed * delta;
                let remaining = self.target - self.value;
                if self.speed <= 0.0 || remaining.abs() <= step {
                    self.value = self.target;
                    self.elapsed = 0.0;
                    return self.on_target_reached();
                }
                self.value += step.copysign(remaining);
                false
            }
            FadePhase::Holding => {
                self.elapsed += delta;
                let hold = self.hold.unwrap_or(0.0);
                if self.elapsed >= hold {
                    self.hold = None;
                    self.elapsed = 0.0;
                    self.target = self.return_to;
                    self.phase = FadePhase::Fading;
                }
                false
            }
        }
    }

    fn start(&mut self, target: f32, speed: f32, hold: Option<f32>) {
        self.return_to = self.value;
        self.target = target;
        self.speed = speed;
        self.hold = hold;
        self.elapsed = 0.0;
        self.phase = FadePhase::Fading;
    }

    fn on_target_reached(&mut self) -> bool {
        if self.hold.is_some() {
            self.phase = FadePhase::Holding;
            false
        } else {
            self.phase = FadePhase::Idle;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fades_at_constant_speed_and_stops_on_target() {
        let mut fade = Fade::new(0.0);
        fade.fade_to(1.0, 2.0);

        assert!(!fade.advance(0.25));
        assert_eq!(fade.value(), 0.5);
        assert!(fade.advance(0.5));
        assert_eq!(fade.value(), 1.0);
        assert_eq!(fade.phase(), FadePhase::Idle);
        assert!(!fade.advance(1.0));
    }

    #[test]
    fn holds_then_returns_to_the_start_value() {
        // ARRANGE
        let mut fade = Fade::new(0.0);
        fade.fade_to_and_back(1.0, 4.0, 1.0);

        // ACT / ASSERT
        fade.advance(0.25);
        assert_eq!(fade.phase(), FadePhase::Holding);
        assert_eq!(fade.value(), 1.0);

        fade.advance(1.0);
        assert_eq!(fade.phase(), FadePhase::Fading);
        assert_eq!(fade.target(), 0.0);

        assert!(fade.advance(0.25));
        assert_eq!(fade.value(), 0.0);
        assert!(!fade.is_running());
    }

    #[test]
    fn retargeting_mid_fade_cancels_the_hold() {
        let mut fade = Fade::new(0.0);
        fade.fade_to_and_back(1.0, 1.0, 5.0);
        fade.advance(0.5);

        fade.fade_to(0.0, 1.0);
        assert!(fade.advance(0.5));
        assert_eq!(fade.value(), 0.0);
        assert_eq!(fade.phase(), FadePhase::Idle);
    }
}
