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

//! Tick-driven timing primitives.
//!
//! Nothing in this module reads a wall clock. Every type is advanced by the
//! delta its owner receives from the registry tick, which keeps timers
//! deterministic and trivially testable.

mod cooldown;
mod fade;
mod scheduler;

pub use self::cooldown::Cooldown;
pub use self::fade::{Fade, FadePhase};
pub use self::scheduler::{CooldownHandle, CooldownScheduler};

use std::fmt;

/// A duration split into display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockTime {
    /// Whole hours.
    pub hours: u32,
    /// Minutes within the hour.
    pub minutes: u32,
    /// Seconds within the minute.
    pub seconds: u32,
}

impl fmt::Display for ClockTime {
    /// `MM:SS` below one hour, `HH:MM:SS` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hours == 0 {
            write!(f, "{:02}:{:02}", self.minutes, self.seconds)
        } else {
            write!(
                f,
                "{:02}:{:02}:{:02}",
                self.hours, self.minutes, self.seconds
            )
        }
    }
}

/// Splits `total_seconds` into hours, minutes and seconds.
///
/// Fractions are truncated and negative input reads as zero.
pub fn format_clock(total_seconds: f64) -> ClockTime {
    let total = if total_seconds.is_finite() && total_seconds > 0.0 {
        total_seconds as u64
    } else {
        0
    };
    ClockTime {
        hours: (total / 3600).min(u32::MAX as u64) as u32,
        minutes: ((total / 60) % 60) as u32,
        seconds: (total % 60) as u32,
    }
}
