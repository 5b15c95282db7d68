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

//! Event-driven sound playback over pooled voices.

mod voice;

pub use self::voice::{AudioCategory, Voice};

use gms_core::event::EventRegistration;
use gms_core::{
    ConstructError, Cooldown, GameContext, GameEvent, GameEventService, LinkDataLogic, Listener,
    SubManager, SubManagerRegistration, ViewPool,
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// Asks the [`AudioManager`] to play one of `clips`.
#[derive(Debug, Default)]
pub struct PlayAudio {
    /// Mixer group, which also selects the voice pool.
    pub category: AudioCategory,
    /// Candidate clips; the manager rotates through them.
    pub clips: Vec<String>,
    /// Playback length in seconds.
    pub duration: f32,
    /// World position, only meaningful for [`AudioCategory::Positional`].
    pub position: Option<[f32; 3]>,
}

impl GameEvent for PlayAudio {
    const NAME: &'static str = "PlayAudio";
    const DESCRIPTION: &'static str = "Plays a clip through the audio manager's voice pools";

    fn reset(&mut self) {
        self.category = AudioCategory::default();
        self.clips.clear();
        self.duration = 0.0;
        self.position = None;
    }
}

inventory::submit! { EventRegistration::of::<PlayAudio>() }

/// Configuration payload of the [`AudioManager`]. Required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioManagerData {
    /// Asset key of the audio bank.
    pub audio_base_address: String,
    /// Seconds between two sweeps returning finished voices to their pool.
    #[serde(default = "default_dormant_check_seconds")]
    pub dormant_check_seconds: f32,
    /// Upper bound of simultaneously playing voices per category.
    #[serde(default = "default_max_voices")]
    pub max_voices_per_category: usize,
}

fn default_dormant_check_seconds() -> f32 {
    3.0
}

fn default_max_voices() -> usize {
    16
}

impl AudioManagerData {
    /// Payload for the bank at `audio_base_address`, with default limits.
    pub fn new(audio_base_address: impl Into<String>) -> Self {
        Self {
            audio_base_address: audio_base_address.into(),
            dormant_check_seconds: default_dormant_check_seconds(),
            max_voices_per_category: default_max_voices(),
        }
    }
}

impl LinkDataLogic for AudioManagerData {
    type Logic = AudioManager;

    fn build(data: Option<&Self>) -> Result<AudioManager, ConstructError> {
        let data = data.ok_or(ConstructError::MissingPayload {
            data: "Audio Manager Data",
            logic: "Audio Manager",
        })?;
        if data.audio_base_address.is_empty() {
            return Err(ConstructError::InvalidPayload(
                "audio_base_address is empty".to_string(),
            ));
        }
        Ok(AudioManager::new(data.clone()))
    }
}

inventory::submit! {
    SubManagerRegistration::new::<AudioManagerData>(
        "AudioManagerData",
        "Audio Manager Data",
        "Audio Manager",
    )
}

#[derive(Debug)]
struct PlayRequest {
    category: AudioCategory,
    clips: Vec<String>,
    duration: f32,
    position: Option<[f32; 3]>,
}

/// Plays sounds requested through [`PlayAudio`] events.
///
/// Requests are queued by the event listener and started on the manager's
/// next tick. Finished voices are returned to their category pool every
/// `dormant_check_seconds`.
pub struct AudioManager {
    data: AudioManagerData,
    events: Option<GameEventService>,
    listener: Option<Listener<PlayAudio>>,
    inbox: Rc<RefCell<VecDeque<PlayRequest>>>,
    pool: ViewPool<Voice>,
    playing: HashMap<AudioCategory, Vec<Voice>>,
    clock: f64,
    dormant_check: Cooldown,
    clip_cursor: usize,
}

impl AudioManager {
    /// Creates an idle manager; it starts listening once initialized.
    pub fn new(data: AudioManagerData) -> Self {
        let dormant_check = Cooldown::start(0.0, data.dormant_check_seconds);
        Self {
            data,
            events: None,
            listener: None,
            inbox: Rc::new(RefCell::new(VecDeque::new())),
            pool: ViewPool::new("AudioSources"),
            playing: HashMap::new(),
            clock: 0.0,
            dormant_check,
            clip_cursor: 0,
        }
    }

    /// The payload the manager was built from.
    pub fn data(&self) -> &AudioManagerData {
        &self.data
    }

    /// Returns true between `initialize` and `uninitialize`.
    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    /// Voices currently assigned in `category`, finished ones included until
    /// the next dormant sweep.
    pub fn playing(&self, category: AudioCategory) -> &[Voice] {
        self.playing.get(&category).map_or(&[][..], Vec::as_slice)
    }

    /// Parked voices ready for reuse in `category`.
    pub fn available_voices(&self, category: AudioCategory) -> usize {
        self.pool.available(category.pool_key())
    }

    fn play(&mut self, request: PlayRequest) {
        if request.clips.is_empty() {
            log::debug!(
                "AudioManager: ignoring {:?} request without clips",
                request.category
            );
            return;
        }
        let playing = self.playing.entry(request.category).or_default();
        if playing.len() >= self.data.max_voices_per_category {
            // Finished voices wait for the periodic sweep; reclaim them first.
            self.pool.sweep_dormant(request.category.pool_key(), playing);
        }
        if playing.len() >= self.data.max_voices_per_category {
            log::warn!(
                "AudioManager: all {} {:?} voices are busy, request dropped",
                self.data.max_voices_per_category,
                request.category
            );
            return;
        }

        let clip = &request.clips[self.clip_cursor % request.clips.len()];
        self.clip_cursor = self.clip_cursor.wrapping_add(1);

        let mut voice = self
            .pool
            .get_or_create(request.category.pool_key(), Voice::default);
        voice.play(clip, request.duration, request.position);
        log::trace!("AudioManager: playing `{clip}` on {:?}", request.category);
        playing.push(voice);
    }

    fn return_dormant_voices(&mut self) {
        for category in AudioCategory::ALL {
            if let Some(playing) = self.playing.get_mut(&category) {
                let returned = self.pool.sweep_dormant(category.pool_key(), playing);
                if returned > 0 {
                    log::trace!("AudioManager: {returned} {category:?} voices back in the pool");
                }
            }
        }
    }
}

impl SubManager for AudioManager {
    fn initialize(&mut self, context: &GameContext<'_>) -> bool {
        let inbox = self.inbox.clone();
        let listener: Listener<PlayAudio> = Rc::new(move |event: &PlayAudio| {
            inbox.borrow_mut().push_back(PlayRequest {
                category: event.category,
                clips: event.clips.clone(),
                duration: event.duration,
                position: event.position,
            });
        });
        context.events.register(listener.clone());
        self.listener = Some(listener);
        self.events = Some(context.events.clone());

        log::info!(
            "AudioManager: listening, bank `{}`",
            self.data.audio_base_address
        );
        true
    }

    fn uninitialize(&mut self) {
        if let (Some(events), Some(listener)) = (self.events.take(), self.listener.take()) {
            events.unregister(&listener);
        }
        self.inbox.borrow_mut().clear();
        self.playing.clear();
        self.pool.clear();
        log::info!("AudioManager: released bank `{}`", self.data.audio_base_address);
    }

    fn on_tick(&mut self, context: &GameContext<'_>) {
        self.clock += f64::from(context.delta_seconds);

        let requests: Vec<PlayRequest> = self.inbox.borrow_mut().drain(..).collect();
        for request in requests {
            self.play(request);
        }

        for voice in self.playing.values_mut().flatten() {
            voice.advance(context.delta_seconds);
        }

        if self.dormant_check.is_cooled(self.clock) {
            self.dormant_check.restart(self.clock);
            self.return_dormant_voices();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_a_bank_address() {
        assert!(matches!(
            AudioManagerData::build(None),
            Err(ConstructError::MissingPayload { .. })
        ));
        assert!(matches!(
            AudioManagerData::build(Some(&AudioManagerData::new(""))),
            Err(ConstructError::InvalidPayload(_))
        ));
    }

    #[test]
    fn rotates_through_candidate_clips() {
        let mut manager = AudioManager::new(AudioManagerData::new("Audio/Bank"));
        for _ in 0..3 {
            manager.play(PlayRequest {
                category: AudioCategory::Voice,
                clips: vec!["hello".to_string(), "hey".to_string()],
                duration: 1.0,
                position: None,
            });
        }

        let clips: Vec<&str> = manager
            .playing(AudioCategory::Voice)
            .iter()
            .map(Voice::clip)
            .collect();
        assert_eq!(clips, vec!["hello", "hey", "hello"]);
    }

    #[test]
    fn drops_requests_over_the_voice_limit() {
        let mut data = AudioManagerData::new("Audio/Bank");
        data.max_voices_per_category = 1;
        let mut manager = AudioManager::new(data);
        for _ in 0..2 {
            manager.play(PlayRequest {
                category: AudioCategory::Ui,
                clips: vec!["click".to_string()],
                duration: 0.1,
                position: None,
            });
        }
        assert_eq!(manager.playing(AudioCategory::Ui).len(), 1);
    }

    #[test]
    fn finished_voices_are_reclaimed_before_dropping_a_request() {
        // --- 1. Fill the category with short clips ---
        let mut data = AudioManagerData::new("Audio/Bank");
        data.max_voices_per_category = 2;
        let mut manager = AudioManager::new(data);
        let click = || PlayRequest {
            category: AudioCategory::Ui,
            clips: vec!["click".to_string()],
            duration: 0.1,
            position: None,
        };
        manager.play(click());
        manager.play(click());

        // --- 2. Let both finish, well before the periodic sweep ---
        for voice in manager.playing.entry(AudioCategory::Ui).or_default() {
            voice.advance(1.0);
        }

        // --- 3. A new request still gets a voice ---
        manager.play(click());
        let playing = manager.playing(AudioCategory::Ui);
        assert_eq!(playing.len(), 1);
        assert_eq!(playing[0].clip(), "click");
        assert_eq!(manager.available_voices(AudioCategory::Ui), 1);
    }
}
