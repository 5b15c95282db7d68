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

use gms_core::Poolable;
use serde::{Deserialize, Serialize};

/// Mixer group a sound plays through. Each category has its own voice pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AudioCategory {
    /// Interface feedback, not positioned.
    #[default]
    Ui,
    /// Dialogue and barks.
    Voice,
    /// Sound effects played at a world position.
    Positional,
}

impl AudioCategory {
    /// Every category, in sweep order.
    pub const ALL: [AudioCategory; 3] = [Self::Positional, Self::Voice, Self::Ui];

    /// Pool key of the category.
    pub fn pool_key(self) -> &'static str {
        match self {
            Self::Ui => "UI",
            Self::Voice => "Voice",
            Self::Positional => "Position",
        }
    }
}

/// A playback slot. Stands in for a platform audio source.
#[derive(Debug, Default)]
pub struct Voice {
    pub(crate) clip: String,
    pub(crate) position: Option<[f32; 3]>,
    pub(crate) remaining: f32,
}

impl Voice {
    pub(crate) fn play(&mut self, clip: &str, seconds: f32, position: Option<[f32; 3]>) {
        self.clip.clear();
        self.clip.push_str(clip);
        self.remaining = seconds.max(0.0);
        self.position = position;
    }

    pub(crate) fn advance(&mut self, delta_seconds: f32) {
        self.remaining = (self.remaining - delta_seconds).max(0.0);
    }

    /// Clip currently assigned to the voice.
    pub fn clip(&self) -> &str {
        &self.clip
    }

    /// World position for positional sounds.
    pub fn position(&self) -> Option<[f32; 3]> {
        self.position
    }
}

impl Poolable for Voice {
    fn reset(&mut self) {
        self.clip.clear();
        self.position = None;
        self.remaining = 0.0;
    }

    fn is_dormant(&self) -> bool {
        self.remaining <= 0.0
    }
}
