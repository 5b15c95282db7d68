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

//! Traits for pluggable gameplay subsystems (SubManagers).

use crate::context::GameContext;
use crate::data::{DataSet, SubManagerData};
use crate::error::RegistryError;
use std::any::{Any, TypeId};
use std::cell::{Ref, RefCell, RefMut};
use std::marker::PhantomData;
use std::rc::Rc;

/// Shared handle to a live submanager.
///
/// The registry is the owner; handles given out to callers only keep the
/// instance alive, they never put it back into a set.
pub type SubManagerHandle = Rc<RefCell<dyn SubManager>>;

/// The contract every gameplay subsystem implements.
///
/// The registry never looks past this interface: it initializes an instance
/// once after it is added, ticks it every frame, and uninitializes it before
/// removing it.
pub trait SubManager: Any {
    /// Called once, after the edit queue that added this instance is drained.
    ///
    /// Returns `false` when the subsystem could not set itself up. The
    /// registry logs the failure and keeps the instance.
    fn initialize(&mut self, context: &GameContext<'_>) -> bool;

    /// Runs unsubscriptions and cleanup. Called right before removal.
    fn uninitialize(&mut self);

    /// Per-frame update.
    fn on_tick(&mut self, context: &GameContext<'_>);

    /// Whether `other` stands for the same subsystem as `self`.
    ///
    /// Two instances of the same concrete type are considered equal, which is
    /// what makes a second add of the same variant a no-op.
    fn identity_equals(&self, other: &dyn SubManager) -> bool {
        self.as_any().type_id() == other.as_any().type_id()
    }

    /// Allows downcasting to concrete submanager types.
    fn as_any(&self) -> &dyn Any;

    /// Allows mutable downcasting to concrete submanager types.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A typed view over a [`SubManagerHandle`] returned by lookups.
///
/// Borrowing fails gracefully (returns `None`) when the instance is already
/// borrowed, for example when a submanager looks itself up during its own
/// tick.
pub struct SubManagerRef<T: SubManager> {
    handle: SubManagerHandle,
    _marker: PhantomData<fn() -> T>,
}

impl<T: SubManager> SubManagerRef<T> {
    /// Wraps an untyped handle. A handle of another type simply never borrows.
    pub fn new(handle: SubManagerHandle) -> Self {
        Self {
            handle,
            _marker: PhantomData,
        }
    }

    /// Immutably borrows the instance as `T`.
    pub fn borrow(&self) -> Option<Ref<'_, T>> {
        let guard = self.handle.try_borrow().ok()?;
        Ref::filter_map(guard, |sub_manager| sub_manager.as_any().downcast_ref::<T>()).ok()
    }

    /// Mutably borrows the instance as `T`.
    pub fn borrow_mut(&self) -> Option<RefMut<'_, T>> {
        let guard = self.handle.try_borrow_mut().ok()?;
        RefMut::filter_map(guard, |sub_manager| {
            sub_manager.as_any_mut().downcast_mut::<T>()
        })
        .ok()
    }

    /// Runs `f` against a mutable borrow, if one can be taken.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.borrow_mut().map(|mut sub_manager| f(&mut sub_manager))
    }

    /// The untyped handle.
    pub fn handle(&self) -> &SubManagerHandle {
        &self.handle
    }
}

impl<T: SubManager> Clone for SubManagerRef<T> {
    fn clone(&self) -> Self {
        Self::new(self.handle.clone())
    }
}

/// The narrow façade collaborators use to reach the registry.
///
/// It is handed out through [`GameContext`] so submanagers can find each
/// other and request composition changes without holding the registry.
pub trait SubManagerLookup {
    /// Returns the first active instance whose concrete type is `type_id`,
    /// searching the base set before the dynamic set.
    fn find_by_type(&self, type_id: TypeId) -> Option<SubManagerHandle>;

    /// Builds the instance described by `descriptor` and queues it for
    /// addition at the next drain.
    fn request_add(
        &self,
        descriptor: &SubManagerData,
        payloads: &DataSet,
    ) -> Result<SubManagerHandle, RegistryError>;

    /// Queues the active instance matching `descriptor` for removal.
    fn request_remove(&self, descriptor: &SubManagerData) -> Result<(), RegistryError>;
}

impl dyn SubManagerLookup + '_ {
    /// Typed lookup; first match wins when several instances share a type.
    pub fn try_get<T: SubManager>(&self) -> Option<SubManagerRef<T>> {
        self.find_by_type(TypeId::of::<T>()).map(SubManagerRef::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        ticks: u32,
    }

    impl SubManager for Counter {
        fn initialize(&mut self, _context: &GameContext<'_>) -> bool {
            true
        }
        fn uninitialize(&mut self) {}
        fn on_tick(&mut self, _context: &GameContext<'_>) {
            self.ticks += 1;
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct Other;

    impl SubManager for Other {
        fn initialize(&mut self, _context: &GameContext<'_>) -> bool {
            true
        }
        fn uninitialize(&mut self) {}
        fn on_tick(&mut self, _context: &GameContext<'_>) {}
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn identity_is_the_concrete_type() {
        let a = Counter { ticks: 0 };
        let b = Counter { ticks: 7 };
        assert!(a.identity_equals(&b));
        assert!(!a.identity_equals(&Other));
    }

    #[test]
    fn typed_ref_downcasts_and_mutates() {
        let handle: SubManagerHandle = Rc::new(RefCell::new(Counter { ticks: 0 }));
        let typed = SubManagerRef::<Counter>::new(handle.clone());

        typed.with(|counter| counter.ticks = 3);
        assert_eq!(typed.borrow().map(|c| c.ticks), Some(3));
    }

    #[test]
    fn typed_ref_of_wrong_type_never_borrows() {
        let handle: SubManagerHandle = Rc::new(RefCell::new(Other));
        let typed = SubManagerRef::<Counter>::new(handle);
        assert!(typed.borrow().is_none());
        assert!(typed.borrow_mut().is_none());
    }

    #[test]
    fn borrow_fails_while_already_borrowed() {
        let handle: SubManagerHandle = Rc::new(RefCell::new(Counter { ticks: 0 }));
        let typed = SubManagerRef::<Counter>::new(handle.clone());

        let _held = handle.borrow_mut();
        assert!(typed.borrow().is_none());
        assert!(typed.with(|c| c.ticks).is_none());
    }
}
