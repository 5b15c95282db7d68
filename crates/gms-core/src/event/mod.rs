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

//! Provides decoupled, typed publish/subscribe between subsystems.
//!
//! The primary component is the [`GameEventService`], a synchronous bus that
//! dispatches each published event to the listeners of its concrete type and
//! then recycles the event through a per-type pool.
//!
//! Events are plain structs implementing [`GameEvent`]. Submitting an
//! [`EventRegistration`] makes an event discoverable by name, which is what
//! designer-facing callers such as [`GameEventCaller`] rely on.

mod bus;
mod game_event;
mod registry;

pub use self::bus::{GameEventService, Listener};
pub use self::game_event::{AnyGameEvent, GameEvent};
pub use self::registry::{
    find_event_by_name, registered_events, EventRegistration, GameEventCaller,
};
