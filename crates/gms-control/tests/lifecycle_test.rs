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

use gms_control::SubManagerRegistry;
use gms_core::{
    ConstructError, DataSet, GameContext, GameEventService, GameManagerData, LinkDataLogic,
    RegistryError, SubManager, SubManagerCatalog, SubManagerData, SubManagerRegistration,
};
use serde::Deserialize;
use std::any::Any;
use std::cell::RefCell;
use std::sync::Arc;

// --- Test Setup: journaling submanagers ---

thread_local! {
    static JOURNAL: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

fn record(entry: impl Into<String>) {
    JOURNAL.with(|journal| journal.borrow_mut().push(entry.into()));
}

fn take_journal() -> Vec<String> {
    JOURNAL.with(|journal| std::mem::take(&mut *journal.borrow_mut()))
}

macro_rules! journaling_sub_manager {
    ($logic:ident, $data:ident, $label:literal) => {
        struct $logic;

        impl SubManager for $logic {
            fn initialize(&mut self, _context: &GameContext<'_>) -> bool {
                record(concat!("init ", $label));
                true
            }
            fn uninitialize(&mut self) {
                record(concat!("uninit ", $label));
            }
            fn on_tick(&mut self, _context: &GameContext<'_>) {
                record(concat!("tick ", $label));
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }

        #[derive(Deserialize)]
        struct $data;

        impl LinkDataLogic for $data {
            type Logic = $logic;

            fn build(_data: Option<&Self>) -> Result<$logic, ConstructError> {
                Ok($logic)
            }
        }
    };
}

journaling_sub_manager!(Audio, AudioData, "audio");
journaling_sub_manager!(Level, LevelData, "level");

/// Requires its payload; adds a `Level` from inside its first tick.
struct Spawner {
    spawned: bool,
}

#[derive(Deserialize)]
struct SpawnerData {
    #[allow(dead_code)]
    wave: u32,
}

impl LinkDataLogic for SpawnerData {
    type Logic = Spawner;

    fn build(data: Option<&Self>) -> Result<Spawner, ConstructError> {
        data.ok_or(ConstructError::MissingPayload {
            data: "Spawner Data",
            logic: "Spawner",
        })?;
        Ok(Spawner { spawned: false })
    }
}

impl SubManager for Spawner {
    fn initialize(&mut self, _context: &GameContext<'_>) -> bool {
        record("init spawner");
        true
    }
    fn uninitialize(&mut self) {}
    fn on_tick(&mut self, context: &GameContext<'_>) {
        record("tick spawner");
        if !self.spawned {
            self.spawned = true;
            let queued = context
                .sub_managers
                .request_add(&SubManagerData::new("LevelData"), &DataSet::new());
            assert!(queued.is_ok());
            assert!(context.try_get::<Level>().is_none());
        }
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn registry() -> SubManagerRegistry {
    let catalog = SubManagerCatalog::new()
        .with(SubManagerRegistration::new::<AudioData>(
            "AudioData",
            "Audio Data",
            "Audio",
        ))
        .with(SubManagerRegistration::new::<LevelData>(
            "LevelData",
            "Level Data",
            "Level",
        ))
        .with(SubManagerRegistration::new::<SpawnerData>(
            "SpawnerData",
            "Spawner Data",
            "Spawner",
        ));
    take_journal();
    SubManagerRegistry::new(Arc::new(catalog))
}
// ---

#[test]
fn rejects_descriptors_that_do_not_load() {
    let registry = registry();
    let descriptor = SubManagerData::new("AudioData").with_loads(false);

    let result = registry.request_add(&descriptor, &DataSet::new());

    assert!(matches!(result, Err(RegistryError::NotLoaded(name)) if name == "AudioData"));
    assert_eq!(registry.pending_len(), 0);
}

#[test]
fn rejects_unknown_types_and_failed_construction() {
    let registry = registry();

    let unknown = registry.request_add(&SubManagerData::new("NpcData"), &DataSet::new());
    assert!(matches!(unknown, Err(RegistryError::UnknownType(_))));

    let missing = registry.request_add(&SubManagerData::new("SpawnerData"), &DataSet::new());
    assert!(matches!(
        missing,
        Err(RegistryError::Construct {
            source: ConstructError::MissingPayload { .. },
            ..
        })
    ));
    assert_eq!(registry.pending_len(), 0);
}

#[test]
fn initializes_once_before_the_first_tick() {
    // --- 1. Setup ---
    let registry = registry();
    let events = GameEventService::new();
    registry
        .request_add(&SubManagerData::new("AudioData").base(), &DataSet::new())
        .unwrap();

    // --- 2. Run three frames ---
    for _ in 0..3 {
        registry.tick(&events, 0.1);
    }

    // --- 3. Assert ---
    assert_eq!(
        take_journal(),
        vec!["init audio", "tick audio", "tick audio"]
    );
}

#[test]
fn new_instances_initialize_after_existing_ones_ticked() {
    let registry = registry();
    let events = GameEventService::new();
    registry
        .request_add(&SubManagerData::new("AudioData").base(), &DataSet::new())
        .unwrap();
    registry.tick(&events, 0.1);
    take_journal();

    registry
        .request_add(&SubManagerData::new("LevelData"), &DataSet::new())
        .unwrap();
    registry.tick(&events, 0.1);
    registry.tick(&events, 0.1);

    assert_eq!(
        take_journal(),
        vec![
            "tick audio",
            "init level",
            "tick audio",
            "tick level"
        ]
    );
}

#[test]
fn base_set_ticks_and_resolves_before_dynamic() {
    let registry = registry();
    let events = GameEventService::new();
    registry
        .request_add(&SubManagerData::new("LevelData"), &DataSet::new())
        .unwrap();
    registry
        .request_add(&SubManagerData::new("AudioData").base(), &DataSet::new())
        .unwrap();
    registry.tick(&events, 0.1);
    take_journal();

    registry.tick(&events, 0.1);

    assert_eq!(take_journal(), vec!["tick audio", "tick level"]);
    assert_eq!(registry.base_len(), 1);
    assert_eq!(registry.dynamic_len(), 1);
}

#[test]
fn duplicate_adds_are_ignored() {
    let registry = registry();
    let events = GameEventService::new();
    let descriptor = SubManagerData::new("AudioData");

    registry.request_add(&descriptor, &DataSet::new()).unwrap();
    registry.request_add(&descriptor, &DataSet::new()).unwrap();
    registry.tick(&events, 0.1);
    registry
        .request_add(&descriptor.clone().base(), &DataSet::new())
        .unwrap();
    registry.tick(&events, 0.1);

    assert_eq!(registry.dynamic_len(), 1);
    assert_eq!(registry.base_len(), 0);
    assert_eq!(
        take_journal().iter().filter(|e| *e == "init audio").count(),
        1
    );
}

#[test]
fn add_then_remove_uninitializes_exactly_once() {
    // --- 1. Setup ---
    let registry = registry();
    let events = GameEventService::new();
    let descriptor = SubManagerData::new("LevelData");
    registry.request_add(&descriptor, &DataSet::new()).unwrap();
    registry.tick(&events, 0.1);

    // --- 2. Remove twice before the drain ---
    registry.request_remove(&descriptor).unwrap();
    registry.request_remove(&descriptor).unwrap();
    registry.tick(&events, 0.1);

    // --- 3. Assert ---
    assert_eq!(
        take_journal(),
        vec!["init level", "tick level", "uninit level"]
    );
    assert_eq!(registry.dynamic_len(), 0);
    assert!(matches!(
        registry.request_remove(&descriptor),
        Err(RegistryError::NotFound(_))
    ));
}

#[test]
fn submanagers_can_add_during_their_own_tick() {
    let registry = registry();
    let events = GameEventService::new();
    let payloads = DataSet::new().with(SpawnerData { wave: 1 });
    registry
        .request_add(&SubManagerData::new("SpawnerData").base(), &payloads)
        .unwrap();

    registry.tick(&events, 0.1);
    registry.tick(&events, 0.1);
    registry.tick(&events, 0.1);

    assert_eq!(
        take_journal(),
        vec![
            "init spawner",
            "tick spawner",
            "init level",
            "tick spawner",
            "tick level"
        ]
    );
    assert!(registry.contains::<Level>());
}

#[test]
fn load_data_queues_every_loading_descriptor() {
    let registry = registry();
    let events = GameEventService::new();
    let data = GameManagerData::from_ron(
        r#"(
            sub_manager_data_list: [
                (data_type_name: "AudioData", is_base: true),
                (data_type_name: "LevelData", loads: false),
                (data_type_name: "SpawnerData"),
            ],
            sub_managers: {
                "SpawnerData": (wave: 3),
            },
        )"#,
    )
    .unwrap();

    let payloads = registry.load_data(&data);
    assert!(payloads.contains::<SpawnerData>());
    assert_eq!(registry.pending_len(), 2);

    registry.tick(&events, 0.1);
    assert_eq!(registry.base_len(), 1);
    assert_eq!(registry.dynamic_len(), 1);
    assert!(registry.try_get::<Audio>().is_some());
}

#[test]
fn shutdown_uninitializes_dynamic_first_in_reverse_order() {
    let registry = registry();
    let events = GameEventService::new();
    let payloads = DataSet::new().with(SpawnerData { wave: 1 });
    registry
        .request_add(&SubManagerData::new("AudioData").base(), &payloads)
        .unwrap();
    registry
        .request_add(&SubManagerData::new("LevelData"), &payloads)
        .unwrap();
    registry.tick(&events, 0.1);
    take_journal();

    registry.shutdown();

    assert_eq!(take_journal(), vec!["uninit level", "uninit audio"]);
}
