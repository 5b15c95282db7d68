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

use super::game_event::{AnyGameEvent, GameEvent};
use super::registry::EventRegistration;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A listener for events of type `E`.
///
/// Listeners are identified by their allocation: unregistering needs the same
/// `Rc` (or a clone of it) that was registered.
pub type Listener<E> = Rc<dyn Fn(&E)>;

type ErasedListener = Rc<dyn Fn(&dyn Any)>;

#[derive(Clone)]
struct ListenerEntry {
    key: *const (),
    call: ErasedListener,
}

#[derive(Default)]
struct EventServiceInner {
    /// Copy-on-write so a dispatch in flight keeps the list it started with.
    listeners: RefCell<HashMap<TypeId, Rc<Vec<ListenerEntry>>>>,
    pools: RefCell<HashMap<TypeId, Vec<Box<dyn AnyGameEvent>>>>,
    allocations: RefCell<HashMap<TypeId, usize>>,
}

/// Typed, pooled publish/subscribe bus.
///
/// The service is a cheap handle: clones share the same listeners and pools,
/// so a subsystem can keep one to unregister itself during cleanup.
///
/// Dispatch is synchronous and single-threaded. Listeners registered or
/// unregistered while an event is being dispatched only affect later
/// dispatches.
#[derive(Clone, Default)]
pub struct GameEventService {
    inner: Rc<EventServiceInner>,
}

impl GameEventService {
    /// Creates an empty event service.
    pub fn new() -> Self {
        log::info!("GameEventService initialized.");
        Self::default()
    }

    /// Registers a listener for events of type `E`.
    ///
    /// Registering the same listener twice makes it run twice per publish.
    pub fn register<E: GameEvent>(&self, listener: Listener<E>) {
        let key = Rc::as_ptr(&listener) as *const ();
        let call: ErasedListener = Rc::new(move |event: &dyn Any| {
            if let Some(event) = event.downcast_ref::<E>() {
                listener(event);
            }
        });

        let mut listeners = self.inner.listeners.borrow_mut();
        let entries = listeners.entry(TypeId::of::<E>()).or_default();
        Rc::make_mut(entries).push(ListenerEntry { key, call });
        log::trace!("Registered listener for `{}`.", E::NAME);
    }

    /// Removes the most recent registration of `listener`.
    ///
    /// Returns `false` if it was not registered. Removing the last listener of
    /// a type drops the type's entry.
    pub fn unregister<E: GameEvent>(&self, listener: &Listener<E>) -> bool {
        let key = Rc::as_ptr(listener) as *const ();
        let type_id = TypeId::of::<E>();

        let mut listeners = self.inner.listeners.borrow_mut();
        let Some(entries) = listeners.get_mut(&type_id) else {
            return false;
        };
        let Some(position) = entries.iter().rposition(|entry| entry.key == key) else {
            return false;
        };

        let entries = Rc::make_mut(entries);
        entries.remove(position);
        if entries.is_empty() {
            listeners.remove(&type_id);
        }
        true
    }

    /// Number of listeners currently registered for `E`.
    pub fn listener_count<E: GameEvent>(&self) -> usize {
        self.inner
            .listeners
            .borrow()
            .get(&TypeId::of::<E>())
            .map_or(0, |entries| entries.len())
    }

    /// Returns `true` if any listener is registered for `E`.
    pub fn has_listeners<E: GameEvent>(&self) -> bool {
        self.inner
            .listeners
            .borrow()
            .contains_key(&TypeId::of::<E>())
    }

    /// Takes a reset event of type `E` from its pool, or creates a new one.
    pub fn acquire<E: GameEvent>(&self) -> Box<E> {
        let type_id = TypeId::of::<E>();
        let pooled = self
            .inner
            .pools
            .borrow_mut()
            .get_mut(&type_id)
            .and_then(Vec::pop);

        match pooled.and_then(|event| event.into_any().downcast::<E>().ok()) {
            Some(event) => event,
            None => {
                self.count_allocation(type_id);
                Box::new(E::default())
            }
        }
    }

    /// Non-generic [`acquire`](Self::acquire) for events looked up by name.
    pub fn acquire_registered(&self, registration: &EventRegistration) -> Box<dyn AnyGameEvent> {
        let type_id = (registration.type_id)();
        let pooled = self
            .inner
            .pools
            .borrow_mut()
            .get_mut(&type_id)
            .and_then(Vec::pop);

        pooled.unwrap_or_else(|| {
            self.count_allocation(type_id);
            (registration.create)()
        })
    }

    /// Dispatches `event` to the listeners of `E`, then recycles it.
    pub fn publish<E: GameEvent>(&self, event: Box<E>) {
        self.publish_dyn(event);
    }

    /// Dispatches an event to the listeners of its concrete runtime type,
    /// then resets it and returns it to that type's pool.
    ///
    /// Publishing with no listeners is not an error; the event is recycled
    /// all the same.
    pub fn publish_dyn(&self, event: Box<dyn AnyGameEvent>) {
        let type_id = event.as_any().type_id();
        let snapshot = self.inner.listeners.borrow().get(&type_id).cloned();

        log::trace!("Publishing `{}`.", event.event_name());

        if let Some(entries) = snapshot {
            for entry in entries.iter() {
                (entry.call)(event.as_any());
            }
        }

        self.release(type_id, event);
    }

    /// Acquires an event, lets `fill` set its fields, and publishes it.
    pub fn trigger<E: GameEvent>(&self, fill: impl FnOnce(&mut E)) {
        let mut event = self.acquire::<E>();
        fill(&mut event);
        self.publish(event);
    }

    /// Number of idle events of type `E` waiting in the pool.
    pub fn pooled<E: GameEvent>(&self) -> usize {
        self.inner
            .pools
            .borrow()
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Number of `E` instances ever created by this service.
    pub fn allocations<E: GameEvent>(&self) -> usize {
        self.inner
            .allocations
            .borrow()
            .get(&TypeId::of::<E>())
            .copied()
            .unwrap_or(0)
    }

    fn release(&self, type_id: TypeId, mut event: Box<dyn AnyGameEvent>) {
        event.reset_event();
        self.inner
            .pools
            .borrow_mut()
            .entry(type_id)
            .or_default()
            .push(event);
    }

    fn count_allocation(&self, type_id: TypeId) {
        *self
            .inner
            .allocations
            .borrow_mut()
            .entry(type_id)
            .or_insert(0) += 1;
    }
}

impl std::fmt::Debug for GameEventService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEventService")
            .field("event_types", &self.inner.listeners.borrow().len())
            .finish()
    }
}
