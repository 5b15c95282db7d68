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

//! Per-frame context handed to every submanager.

use crate::event::GameEventService;
use crate::sub_manager::{SubManager, SubManagerLookup, SubManagerRef};

/// Context providing access to the registry façade, the event bus, and the
/// frame clock.
///
/// This is the only way a submanager reaches its collaborators; nothing in
/// the framework is reachable through globals.
pub struct GameContext<'a> {
    /// Typed lookup and add/remove requests against the owning registry.
    pub sub_managers: &'a dyn SubManagerLookup,

    /// The event bus shared by every subsystem.
    pub events: &'a GameEventService,

    /// Seconds elapsed since the previous tick.
    pub delta_seconds: f32,

    /// Number of ticks the registry has run before this one.
    pub frame: u64,
}

impl<'a> GameContext<'a> {
    /// Looks up the first active submanager of type `T`.
    pub fn try_get<T: SubManager>(&self) -> Option<SubManagerRef<T>> {
        self.sub_managers.try_get::<T>()
    }
}
