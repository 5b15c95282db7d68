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

//! SubManager registry with ordered ticking and a deferred edit queue.

use crate::edit::{EditOp, SubManagerEdit};
use gms_core::{
    DataSet, GameContext, GameEventService, GameManagerData, RegistryError, SubManager,
    SubManagerCatalog, SubManagerData, SubManagerHandle, SubManagerLookup, SubManagerRef,
};
use std::any::TypeId;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

/// A live instance together with the logic type captured when it was built.
#[derive(Clone)]
pub struct SubManagerSlot {
    type_id: TypeId,
    type_name: &'static str,
    handle: SubManagerHandle,
}

impl SubManagerSlot {
    /// `TypeId` of the concrete logic type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Rust path of the concrete logic type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Shared handle to the instance.
    pub fn handle(&self) -> &SubManagerHandle {
        &self.handle
    }

    /// Whether `other` stands for the same subsystem.
    ///
    /// The same allocation always matches. Otherwise the instances decide
    /// through [`SubManager::identity_equals`]; if either one is mutably
    /// borrowed the captured types are compared instead.
    fn is_same_as(&self, other: &SubManagerSlot) -> bool {
        if Rc::ptr_eq(&self.handle, &other.handle) {
            return true;
        }
        match (self.handle.try_borrow(), other.handle.try_borrow()) {
            (Ok(mine), Ok(theirs)) => mine.identity_equals(&*theirs),
            _ => self.type_id == other.type_id,
        }
    }
}

impl std::fmt::Debug for SubManagerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubManagerSlot")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Owns the active submanagers and applies composition changes between
/// frames.
///
/// Instances live in one of two ordered sets. The base set holds the
/// subsystems a game always needs and is ticked and searched first; the
/// dynamic set holds everything added and removed at runtime. Adds and
/// removes are only queued by [`request_add`](Self::request_add) and
/// [`request_remove`](Self::request_remove); the queue is drained inside
/// [`tick`](Self::tick) after both sets have been ticked.
///
/// All methods take `&self` so submanagers can reach the registry through
/// their [`GameContext`] while it is ticking them.
pub struct SubManagerRegistry {
    catalog: Arc<SubManagerCatalog>,
    base: RefCell<Vec<SubManagerSlot>>,
    dynamic: RefCell<Vec<SubManagerSlot>>,
    pending: RefCell<VecDeque<SubManagerEdit>>,
    frame: Cell<u64>,
}

impl SubManagerRegistry {
    /// Creates an empty registry resolving descriptors through `catalog`.
    pub fn new(catalog: Arc<SubManagerCatalog>) -> Self {
        log::info!(
            "SubManagerRegistry: created with {} registered variants",
            catalog.len()
        );
        Self {
            catalog,
            base: RefCell::new(Vec::new()),
            dynamic: RefCell::new(Vec::new()),
            pending: RefCell::new(VecDeque::new()),
            frame: Cell::new(0),
        }
    }

    /// The catalog used to resolve descriptors.
    pub fn catalog(&self) -> &SubManagerCatalog {
        &self.catalog
    }

    /// Number of instances in the base set.
    pub fn base_len(&self) -> usize {
        self.base.borrow().len()
    }

    /// Number of instances in the dynamic set.
    pub fn dynamic_len(&self) -> usize {
        self.dynamic.borrow().len()
    }

    /// Number of edits waiting for the next drain.
    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Number of completed ticks.
    pub fn frame(&self) -> u64 {
        self.frame.get()
    }

    /// Typed lookup over the base set, then the dynamic set.
    ///
    /// Only the first instance of `T` is ever returned.
    pub fn try_get<T: SubManager>(&self) -> Option<SubManagerRef<T>> {
        self.find_by_type(TypeId::of::<T>()).map(SubManagerRef::new)
    }

    /// Returns true if an instance of `T` is active.
    pub fn contains<T: SubManager>(&self) -> bool {
        self.find_by_type(TypeId::of::<T>()).is_some()
    }

    /// Builds the instance described by `descriptor` and queues its `Add`.
    ///
    /// The instance is not initialized and not visible to lookups until the
    /// next drain. The returned handle lets the caller keep a reference.
    pub fn request_add(
        &self,
        descriptor: &SubManagerData,
        payloads: &DataSet,
    ) -> Result<SubManagerHandle, RegistryError> {
        let name = &descriptor.data_type_name;
        if !descriptor.loads {
            log::warn!("SubManagerRegistry: `{name}` is flagged as not loading, request ignored");
            return Err(RegistryError::NotLoaded(name.clone()));
        }

        let Some(registration) = self.catalog.resolve(name) else {
            log::warn!("SubManagerRegistry: no submanager registered for `{name}`");
            return Err(RegistryError::UnknownType(name.clone()));
        };

        let handle = (registration.construct)(payloads).map_err(|source| {
            log::warn!("SubManagerRegistry: could not construct `{name}`: {source}");
            RegistryError::Construct {
                name: name.clone(),
                source,
            }
        })?;

        let slot = SubManagerSlot {
            type_id: (registration.logic_type)(),
            type_name: (registration.logic_type_name)(),
            handle: handle.clone(),
        };
        let edit = SubManagerEdit::add(slot, descriptor.is_base);
        log::debug!(
            "SubManagerRegistry: queued add of {} to the {} set",
            edit.target.type_name,
            edit.set_name()
        );
        self.pending.borrow_mut().push_back(edit);
        Ok(handle)
    }

    /// Queues the removal of the first active instance of the descriptor's
    /// logic type, searched in the set selected by `is_base`.
    pub fn request_remove(&self, descriptor: &SubManagerData) -> Result<(), RegistryError> {
        let name = &descriptor.data_type_name;
        let Some(registration) = self.catalog.resolve(name) else {
            log::warn!("SubManagerRegistry: no submanager registered for `{name}`");
            return Err(RegistryError::UnknownType(name.clone()));
        };

        let type_id = (registration.logic_type)();
        let target = self
            .set(descriptor.is_base)
            .borrow()
            .iter()
            .find(|slot| slot.type_id == type_id)
            .cloned();
        let Some(target) = target else {
            log::warn!(
                "SubManagerRegistry: no active `{}` to remove",
                (registration.logic_type_name)()
            );
            return Err(RegistryError::NotFound(name.clone()));
        };

        let edit = SubManagerEdit::remove(target, descriptor.is_base);
        log::debug!(
            "SubManagerRegistry: queued removal of {} from the {} set",
            edit.target.type_name,
            edit.set_name()
        );
        self.pending.borrow_mut().push_back(edit);
        Ok(())
    }

    /// Decodes the payloads of `data` and queues an add for every descriptor
    /// that loads.
    ///
    /// Failed requests are logged and skipped. Returns the decoded payloads
    /// so later runtime requests can reuse them.
    pub fn load_data(&self, data: &GameManagerData) -> DataSet {
        let payloads = self.catalog.decode_payloads(data);
        let mut queued = 0;
        for descriptor in data.sub_manager_data_list.iter().filter(|d| d.loads) {
            if self.request_add(descriptor, &payloads).is_ok() {
                queued += 1;
            }
        }
        log::info!(
            "SubManagerRegistry: queued {queued} of {} configured submanagers",
            data.sub_manager_data_list.len()
        );
        payloads
    }

    /// Runs one frame.
    ///
    /// Ticks the base set then the dynamic set in insertion order, drains
    /// the edit queue, and finally initializes the instances the drain added,
    /// in the order their adds were queued.
    pub fn tick(&self, events: &GameEventService, delta_seconds: f32) {
        let context = GameContext {
            sub_managers: self,
            events,
            delta_seconds,
            frame: self.frame.get(),
        };

        Self::tick_set(&self.base, &context);
        Self::tick_set(&self.dynamic, &context);

        let added = self.drain_pending();
        for slot in added {
            self.initialize_slot(&slot, &context);
        }

        self.frame.set(self.frame.get() + 1);
    }

    /// Uninitializes and drops every instance and discards pending edits.
    ///
    /// The dynamic set goes first; each set is torn down in reverse order of
    /// insertion.
    pub fn shutdown(&self) {
        let discarded = std::mem::take(&mut *self.pending.borrow_mut()).len();
        let dynamic = std::mem::take(&mut *self.dynamic.borrow_mut());
        let base = std::mem::take(&mut *self.base.borrow_mut());
        let total = dynamic.len() + base.len();

        for slot in dynamic.iter().rev().chain(base.iter().rev()) {
            Self::uninitialize_slot(slot);
        }
        log::info!(
            "SubManagerRegistry: shut down {total} submanagers, {discarded} pending edits discarded"
        );
    }

    fn set(&self, is_base: bool) -> &RefCell<Vec<SubManagerSlot>> {
        if is_base {
            &self.base
        } else {
            &self.dynamic
        }
    }

    fn tick_set(set: &RefCell<Vec<SubManagerSlot>>, context: &GameContext<'_>) {
        for slot in set.borrow().iter() {
            match slot.handle.try_borrow_mut() {
                Ok(mut sub_manager) => sub_manager.on_tick(context),
                Err(_) => log::warn!(
                    "SubManagerRegistry: {} is borrowed elsewhere, skipping its tick",
                    slot.type_name
                ),
            }
        }
    }

    /// Applies every queued edit. Returns the slots actually appended.
    fn drain_pending(&self) -> Vec<SubManagerSlot> {
        let mut added = Vec::new();
        loop {
            let Some(edit) = self.pending.borrow_mut().pop_front() else {
                break;
            };
            match edit.op {
                EditOp::Add => {
                    if self.apply_add(&edit) {
                        added.push(edit.target);
                    }
                }
                EditOp::Remove => self.apply_remove(&edit),
            }
        }
        added
    }

    fn apply_add(&self, edit: &SubManagerEdit) -> bool {
        let duplicate = self
            .base
            .borrow()
            .iter()
            .chain(self.dynamic.borrow().iter())
            .any(|slot| slot.is_same_as(&edit.target));
        if duplicate {
            log::debug!(
                "SubManagerRegistry: {} is already active, add ignored",
                edit.target.type_name
            );
            return false;
        }

        self.set(edit.is_base).borrow_mut().push(edit.target.clone());
        log::info!(
            "SubManagerRegistry: added {} to the {} set",
            edit.target.type_name,
            edit.set_name()
        );
        true
    }

    fn apply_remove(&self, edit: &SubManagerEdit) {
        let set = self.set(edit.is_base);
        let present = set.borrow().iter().any(|slot| slot.is_same_as(&edit.target));
        if !present {
            log::debug!(
                "SubManagerRegistry: {} already left the {} set, removal skipped",
                edit.target.type_name,
                edit.set_name()
            );
            return;
        }

        Self::uninitialize_slot(&edit.target);

        let mut set = set.borrow_mut();
        if let Some(index) = set.iter().position(|slot| slot.is_same_as(&edit.target)) {
            set.remove(index);
        }
        log::info!(
            "SubManagerRegistry: removed {} from the {} set",
            edit.target.type_name,
            edit.set_name()
        );
    }

    fn initialize_slot(&self, slot: &SubManagerSlot, context: &GameContext<'_>) {
        let still_active = self
            .base
            .borrow()
            .iter()
            .chain(self.dynamic.borrow().iter())
            .any(|active| Rc::ptr_eq(&active.handle, &slot.handle));
        if !still_active {
            return;
        }

        match slot.handle.try_borrow_mut() {
            Ok(mut sub_manager) => {
                if !sub_manager.initialize(context) {
                    log::warn!(
                        "SubManagerRegistry: {} failed to initialize, it stays registered",
                        slot.type_name
                    );
                }
            }
            Err(_) => log::error!(
                "SubManagerRegistry: {} is borrowed elsewhere and could not be initialized",
                slot.type_name
            ),
        }
    }

    fn uninitialize_slot(slot: &SubManagerSlot) {
        match slot.handle.try_borrow_mut() {
            Ok(mut sub_manager) => sub_manager.uninitialize(),
            Err(_) => log::error!(
                "SubManagerRegistry: {} is borrowed elsewhere and could not be uninitialized",
                slot.type_name
            ),
        }
    }
}

impl SubManagerLookup for SubManagerRegistry {
    fn find_by_type(&self, type_id: TypeId) -> Option<SubManagerHandle> {
        let base = self.base.borrow();
        let dynamic = self.dynamic.borrow();
        base.iter()
            .chain(dynamic.iter())
            .find(|slot| slot.type_id == type_id)
            .map(|slot| slot.handle.clone())
    }

    fn request_add(
        &self,
        descriptor: &SubManagerData,
        payloads: &DataSet,
    ) -> Result<SubManagerHandle, RegistryError> {
        SubManagerRegistry::request_add(self, descriptor, payloads)
    }

    fn request_remove(&self, descriptor: &SubManagerData) -> Result<(), RegistryError> {
        SubManagerRegistry::request_remove(self, descriptor)
    }
}

impl std::fmt::Debug for SubManagerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubManagerRegistry")
            .field("base", &*self.base.borrow())
            .field("dynamic", &*self.dynamic.borrow())
            .field("pending", &self.pending.borrow().len())
            .field("frame", &self.frame.get())
            .finish()
    }
}
