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

//! Compile-time table linking configuration payloads to logic types.
//!
//! Every submanager variant is described by a [`SubManagerRegistration`]:
//! the data type name designers pick, display names for tooling, and the
//! functions that decode its payload and construct its logic instance.
//!
//! Registrations are collected with [`inventory`] so a crate only has to
//! submit one next to its payload type:
//!
//! ```rust,ignore
//! inventory::submit! {
//!     SubManagerRegistration::new::<TimeManagerData>(
//!         "TimeManagerData",
//!         "Time Manager Data",
//!         "Time Manager",
//!     )
//! }
//! ```

use crate::data::{DataSet, GameManagerData};
use crate::error::ConstructError;
use crate::sub_manager::{SubManager, SubManagerHandle};
use serde::de::DeserializeOwned;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Links a configuration payload type to the logic type it builds.
pub trait LinkDataLogic: DeserializeOwned + Send + Sync + 'static {
    /// The submanager built from this payload.
    type Logic: SubManager;

    /// Builds the logic instance. `data` is `None` when no payload of this
    /// type was authored; logic types that cannot run without one return
    /// [`ConstructError::MissingPayload`].
    fn build(data: Option<&Self>) -> Result<Self::Logic, ConstructError>;
}

/// One entry of the submanager catalog.
#[derive(Clone, Copy)]
pub struct SubManagerRegistration {
    /// Key used by [`SubManagerData::data_type_name`](crate::SubManagerData).
    pub data_type_name: &'static str,
    /// Human readable name of the payload type.
    pub data_display_name: &'static str,
    /// Human readable name of the logic type.
    pub display_name: &'static str,
    /// `TypeId` of the logic type.
    pub logic_type: fn() -> TypeId,
    /// Full Rust path of the logic type, for logs.
    pub logic_type_name: fn() -> &'static str,
    /// Decodes a raw payload into its typed, boxed form.
    pub decode: fn(ron::Value) -> Result<Box<dyn Any + Send + Sync>, ConstructError>,
    /// Builds a logic instance from the payloads at hand.
    pub construct: fn(&DataSet) -> Result<SubManagerHandle, ConstructError>,
}

impl SubManagerRegistration {
    /// Describes the variant linked through `D`.
    pub const fn new<D: LinkDataLogic>(
        data_type_name: &'static str,
        data_display_name: &'static str,
        display_name: &'static str,
    ) -> Self {
        Self {
            data_type_name,
            data_display_name,
            display_name,
            logic_type: TypeId::of::<D::Logic>,
            logic_type_name: std::any::type_name::<D::Logic>,
            decode: decode_payload::<D>,
            construct: construct_logic::<D>,
        }
    }
}

impl std::fmt::Debug for SubManagerRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubManagerRegistration")
            .field("data_type_name", &self.data_type_name)
            .field("display_name", &self.display_name)
            .finish()
    }
}

inventory::collect!(SubManagerRegistration);

fn decode_payload<D: LinkDataLogic>(
    value: ron::Value,
) -> Result<Box<dyn Any + Send + Sync>, ConstructError> {
    value
        .into_rust::<D>()
        .map(|data| Box::new(data) as Box<dyn Any + Send + Sync>)
        .map_err(|e| ConstructError::InvalidPayload(e.to_string()))
}

fn construct_logic<D: LinkDataLogic>(
    payloads: &DataSet,
) -> Result<SubManagerHandle, ConstructError> {
    let logic = D::build(payloads.get::<D>())?;
    let handle: SubManagerHandle = Rc::new(RefCell::new(logic));
    Ok(handle)
}

/// The lookup table from data type name to registration.
#[derive(Debug, Default, Clone)]
pub struct SubManagerCatalog {
    entries: HashMap<&'static str, SubManagerRegistration>,
    order: Vec<&'static str>,
}

impl SubManagerCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding every registration submitted with
    /// `inventory::submit!` across the linked crates.
    pub fn collected() -> Self {
        let mut catalog = Self::new();
        for registration in inventory::iter::<SubManagerRegistration> {
            catalog.register(*registration);
        }
        log::debug!(
            "SubManagerCatalog: collected {} registrations",
            catalog.len()
        );
        catalog
    }

    /// Adds a registration, replacing any entry with the same data type name.
    pub fn register(&mut self, registration: SubManagerRegistration) {
        let key = registration.data_type_name;
        if self.entries.insert(key, registration).is_some() {
            log::warn!("SubManagerCatalog: replaced registration for `{key}`");
        } else {
            self.order.push(key);
        }
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, registration: SubManagerRegistration) -> Self {
        self.register(registration);
        self
    }

    /// Resolves a data type name.
    pub fn resolve(&self, data_type_name: &str) -> Option<&SubManagerRegistration> {
        self.entries.get(data_type_name)
    }

    /// All registrations in registration order, for designer-facing pickers.
    pub fn iter(&self) -> impl Iterator<Item = &SubManagerRegistration> {
        self.order.iter().filter_map(|key| self.entries.get(key))
    }

    /// Number of registered variants.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decodes every raw payload of `data` that has a catalog entry.
    ///
    /// Unknown keys and undecodable payloads are logged and skipped; the
    /// matching submanager then fails at construction if it needs its data.
    pub fn decode_payloads(&self, data: &GameManagerData) -> DataSet {
        let mut payloads = DataSet::new();
        for (name, value) in &data.sub_managers {
            let Some(registration) = self.resolve(name) else {
                log::warn!("SubManagerCatalog: payload `{name}` has no registered submanager");
                continue;
            };
            match (registration.decode)(value.clone()) {
                Ok(payload) => payloads.insert_boxed(payload),
                Err(e) => log::warn!("SubManagerCatalog: could not decode `{name}`: {e}"),
            }
        }
        payloads
    }
}
