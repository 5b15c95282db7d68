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

use std::any::Any;

/// A typed message carried by the [`GameEventService`](super::GameEventService).
///
/// Event fields are ordinary struct fields. Instances are pooled, so
/// [`reset`](GameEvent::reset) must leave no trace of the previous use; the
/// default implementation restores [`Default`].
pub trait GameEvent: Default + 'static {
    /// Unique name used by designer-facing lookups.
    const NAME: &'static str;

    /// Short description for tooling.
    const DESCRIPTION: &'static str = "";

    /// Clears the event before it goes back to its pool.
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Object-safe view of any [`GameEvent`], used by the non-generic publish path.
pub trait AnyGameEvent: Any {
    /// The event's registered name.
    fn event_name(&self) -> &'static str;

    /// Clears the event for reuse.
    fn reset_event(&mut self);

    /// Borrows the event as `Any` for listener downcasts.
    fn as_any(&self) -> &dyn Any;

    /// Mutable `Any` view, used to fill an event obtained by name.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Converts the boxed event back into its concrete type.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<E: GameEvent> AnyGameEvent for E {
    fn event_name(&self) -> &'static str {
        E::NAME
    }

    fn reset_event(&mut self) {
        GameEvent::reset(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
