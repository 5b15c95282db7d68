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

//! Name-based discovery of event types.

use super::bus::GameEventService;
use super::game_event::{AnyGameEvent, GameEvent};
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Static description of an event type, submitted with `inventory::submit!`.
#[derive(Clone, Copy)]
pub struct EventRegistration {
    /// The event's [`GameEvent::NAME`].
    pub name: &'static str,
    /// The event's [`GameEvent::DESCRIPTION`].
    pub description: &'static str,
    /// `TypeId` of the event type.
    pub type_id: fn() -> TypeId,
    /// Creates a fresh, default instance.
    pub create: fn() -> Box<dyn AnyGameEvent>,
}

impl EventRegistration {
    /// Describes event type `E`.
    pub const fn of<E: GameEvent>() -> Self {
        Self {
            name: E::NAME,
            description: E::DESCRIPTION,
            type_id: TypeId::of::<E>,
            create: create_event::<E>,
        }
    }
}

impl std::fmt::Debug for EventRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRegistration")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

inventory::collect!(EventRegistration);

fn create_event<E: GameEvent>() -> Box<dyn AnyGameEvent> {
    Box::new(E::default())
}

static EVENTS_BY_NAME: OnceLock<HashMap<&'static str, &'static EventRegistration>> =
    OnceLock::new();

/// Every submitted event registration.
pub fn registered_events() -> impl Iterator<Item = &'static EventRegistration> {
    inventory::iter::<EventRegistration>.into_iter()
}

/// Finds the event registered under `name`.
///
/// The first call scans every registration and caches the mapping for the
/// lifetime of the process; the set of event types is fixed at build time.
pub fn find_event_by_name(name: &str) -> Option<&'static EventRegistration> {
    EVENTS_BY_NAME
        .get_or_init(|| {
            let mut by_name = HashMap::new();
            for registration in registered_events() {
                if by_name.insert(registration.name, registration).is_some() {
                    log::warn!("Duplicate event name `{}`.", registration.name);
                }
            }
            log::debug!("Cached {} event names.", by_name.len());
            by_name
        })
        .get(name)
        .copied()
}

/// Triggers an event picked by name, e.g. from a UI button binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEventCaller {
    /// Name of the event to publish.
    pub selected_event_name: String,
}

impl GameEventCaller {
    /// A caller bound to `event_name`.
    pub fn new(event_name: impl Into<String>) -> Self {
        Self {
            selected_event_name: event_name.into(),
        }
    }

    /// Publishes a default instance of the selected event.
    ///
    /// Returns `false` (and logs an error) if no event has that name.
    pub fn trigger(&self, events: &GameEventService) -> bool {
        let Some(registration) = find_event_by_name(&self.selected_event_name) else {
            log::error!(
                "GameEvent with name '{}' not found!",
                self.selected_event_name
            );
            return false;
        };

        events.publish_dyn(events.acquire_registered(registration));
        true
    }
}
