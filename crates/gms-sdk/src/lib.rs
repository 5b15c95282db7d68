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

//! The public-facing SDK of the framework.
//!
//! Games create one [`GameInstance`], hand it a [`ConfigSource`] for the
//! root configuration, and call [`GameInstance::tick`] once per frame.
//! Everything else (submanagers, events, timers) is reached from there.

pub mod config;
pub mod instance;

pub use config::{ConfigError, ConfigSource, InstanceSettings, RonFileSource, StaticSource};
pub use instance::{GameInstance, GameInstanceError, InstanceState};

pub mod prelude {
    pub use crate::config::{ConfigSource, InstanceSettings, RonFileSource, StaticSource};
    pub use crate::instance::{GameInstance, InstanceState};
    pub use gms_core::event::EventRegistration;
    pub use gms_core::time::{Cooldown, CooldownHandle, Fade, FadePhase};
    pub use gms_core::{
        ConstructError, DataSet, GameContext, GameEvent, GameEventCaller, GameEventService,
        GameManagerData, LinkDataLogic, Listener, RegistryError, SubManager, SubManagerData,
        SubManagerRef, SubManagerRegistration,
    };
    pub use gms_managers::{AudioCategory, AudioManager, PlayAudio, TimeManager};
}
