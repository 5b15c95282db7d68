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

//! Design-time data describing which submanagers to spawn.
//!
//! A [`GameManagerData`] is the root configuration asset: a list of
//! [`SubManagerData`] descriptors plus the raw configuration payloads keyed by
//! data type name. Payloads stay as [`ron::Value`] until the catalog decodes
//! them into their typed form and stores them in a [`DataSet`].

use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};

/// Selects a submanager variant by its data type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubManagerData {
    /// Key of the variant in the submanager catalog, e.g. `"TimeManagerData"`.
    pub data_type_name: String,

    /// If false the registry refuses to build this submanager.
    #[serde(default = "default_loads")]
    pub loads: bool,

    /// If true the submanager goes into the base set, which is ticked first
    /// and is not meant to be unloaded while the game runs.
    #[serde(default)]
    pub is_base: bool,
}

fn default_loads() -> bool {
    true
}

impl SubManagerData {
    /// A loading, dynamic descriptor for `data_type_name`.
    pub fn new(data_type_name: impl Into<String>) -> Self {
        Self {
            data_type_name: data_type_name.into(),
            loads: true,
            is_base: false,
        }
    }

    /// Marks the descriptor as targeting the base set.
    pub fn base(mut self) -> Self {
        self.is_base = true;
        self
    }

    /// Sets the `loads` flag.
    pub fn with_loads(mut self, loads: bool) -> Self {
        self.loads = loads;
        self
    }
}

/// The root configuration asset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameManagerData {
    /// Which submanagers to spawn, in order.
    #[serde(default)]
    pub sub_manager_data_list: Vec<SubManagerData>,

    /// Raw configuration payloads keyed by data type name.
    #[serde(default)]
    pub sub_managers: BTreeMap<String, ron::Value>,
}

impl GameManagerData {
    /// Parses a configuration from RON text.
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }
}

/// Decoded payloads, at most one per payload type.
///
/// The registry builds one of these from a [`GameManagerData`] and hands it
/// to the catalog factories, which look their own payload up by type.
#[derive(Default)]
pub struct DataSet {
    by_type: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl DataSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `payload`, replacing an earlier payload of the same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, payload: T) {
        self.insert_boxed(Box::new(payload));
    }

    /// Stores a payload decoded behind a box, keyed by its concrete type.
    pub fn insert_boxed(&mut self, payload: Box<dyn Any + Send + Sync>) {
        let type_id = (*payload).type_id();
        if self.by_type.insert(type_id, payload).is_some() {
            log::debug!("DataSet: payload replaced by a later entry of the same type");
        }
    }

    /// Chained [`insert`](DataSet::insert).
    #[must_use]
    pub fn with<T: Send + Sync + 'static>(mut self, payload: T) -> Self {
        self.insert(payload);
        self
    }

    /// The payload of type `T`, if the configuration carried one.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.by_type.get(&TypeId::of::<T>())?.downcast_ref::<T>()
    }

    /// Whether a payload of type `T` is stored.
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<T>())
    }

    /// Number of stored payloads.
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

impl std::fmt::Debug for DataSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSet")
            .field("len", &self.by_type.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct AudioData {
        address: String,
    }

    struct LevelData;

    #[test]
    fn factories_find_their_payload_by_type() {
        let mut set = DataSet::new();
        set.insert(AudioData {
            address: "Audio/Base".to_string(),
        });

        let retrieved = set.get::<AudioData>().unwrap();
        assert_eq!(retrieved.address, "Audio/Base");
    }

    #[test]
    fn optional_payloads_may_be_absent() {
        let set = DataSet::new();
        assert!(set.get::<AudioData>().is_none());
    }

    #[test]
    fn decoded_payloads_are_keyed_by_concrete_type() {
        let mut set = DataSet::new();
        set.insert_boxed(Box::new(AudioData {
            address: "a".to_string(),
        }));
        set.insert_boxed(Box::new(LevelData));

        assert_eq!(set.len(), 2);
        assert!(set.contains::<AudioData>());
        assert!(set.contains::<LevelData>());
    }

    #[test]
    fn a_later_payload_of_the_same_type_wins() {
        let set = DataSet::new()
            .with(AudioData {
                address: "old".to_string(),
            })
            .with(AudioData {
                address: "new".to_string(),
            });

        assert_eq!(set.get::<AudioData>().unwrap().address, "new");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn descriptors_default_to_loaded_dynamic_entries() {
        let data = GameManagerData::from_ron(
            r#"(
                sub_manager_data_list: [
                    (data_type_name: "TimeManagerData", is_base: true),
                    (data_type_name: "LevelData", loads: false),
                ],
            )"#,
        )
        .unwrap();

        assert_eq!(
            data.sub_manager_data_list[0],
            SubManagerData::new("TimeManagerData").base()
        );
        assert!(!data.sub_manager_data_list[1].loads);
        assert!(!data.sub_manager_data_list[1].is_base);
        assert!(data.sub_managers.is_empty());
    }
}
