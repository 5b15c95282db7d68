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

use gms_core::{GameManagerData, RegistryError, SubManagerData};
use gms_managers::{AudioManager, TimeManager};
use gms_sdk::{
    GameInstance, GameInstanceError, InstanceSettings, InstanceState, RonFileSource, StaticSource,
};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tempfile::tempdir;

// The game instance is a process-wide singleton; tests take turns.
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(PoisonError::into_inner)
}

const TIMEOUT: Duration = Duration::from_secs(5);

const CONFIG: &str = r#"(
    sub_manager_data_list: [
        (data_type_name: "TimeManagerData", is_base: true),
        (data_type_name: "AudioManagerData", is_base: false),
    ],
    sub_managers: {
        "AudioManagerData": (audio_base_address: "Audio/MainBank"),
    },
)"#;

fn config() -> GameManagerData {
    GameManagerData::from_ron(CONFIG).unwrap()
}

#[test]
fn only_one_instance_can_run() {
    let _serial = serial();
    let first =
        GameInstance::new(InstanceSettings::default(), StaticSource::new(config())).unwrap();

    let second = GameInstance::new(InstanceSettings::default(), StaticSource::new(config()));
    assert!(matches!(second, Err(GameInstanceError::AlreadyRunning)));
    assert_eq!(first.state(), InstanceState::Uninitialized);

    drop(first);
    let third = GameInstance::new(InstanceSettings::default(), StaticSource::new(config()));
    assert!(third.is_ok());
}

#[test]
fn nothing_is_reachable_before_the_configuration_is_applied() {
    let _serial = serial();
    let instance =
        GameInstance::new(InstanceSettings::default(), StaticSource::new(config())).unwrap();

    assert!(!instance.is_ready());
    assert!(instance.try_get::<TimeManager>().is_none());
    assert!(matches!(
        instance.request_add(&SubManagerData::new("TimeManagerData")),
        Err(RegistryError::NotReady)
    ));
    assert!(matches!(
        instance.request_remove(&SubManagerData::new("TimeManagerData")),
        Err(RegistryError::NotReady)
    ));
}

#[test]
fn loads_the_configuration_from_disk_and_spawns_submanagers() {
    let _serial = serial();

    // --- 1. Setup: a real configuration file ---
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("GameManagerData.ron"), CONFIG).unwrap();

    // --- 2. Create and wait for the load ---
    let mut instance =
        GameInstance::new(InstanceSettings::default(), RonFileSource::new(dir.path())).unwrap();
    assert!(instance.wait_for_config(TIMEOUT));
    assert_eq!(instance.state(), InstanceState::Ready);

    // --- 3. The first tick drains the queued adds ---
    assert!(instance.try_get::<TimeManager>().is_none());
    instance.tick(0.5);
    instance.tick(0.5);

    // --- 4. Assert ---
    let time = instance.try_get::<TimeManager>().unwrap();
    assert_eq!(time.borrow().map(|t| t.game_seconds()), Some(0.5));
    assert!(instance.try_get::<AudioManager>().is_some());
    let registry = instance.registry().unwrap();
    assert_eq!(registry.base_len(), 1);
    assert_eq!(registry.dynamic_len(), 1);
}

#[test]
fn a_failed_load_keeps_the_instance_uninitialized() {
    let _serial = serial();
    let dir = tempdir().unwrap();

    let mut instance = GameInstance::new(
        InstanceSettings::with_key("Missing"),
        RonFileSource::new(dir.path()),
    )
    .unwrap();

    assert!(!instance.wait_for_config(TIMEOUT));
    for _ in 0..3 {
        instance.tick(0.016);
    }
    assert_eq!(instance.state(), InstanceState::Uninitialized);
    assert!(instance.try_get::<TimeManager>().is_none());
}

#[test]
fn swaps_a_group_of_submanagers_at_runtime() {
    let _serial = serial();
    let base_only = GameManagerData::from_ron(
        r#"(sub_manager_data_list: [(data_type_name: "TimeManagerData", is_base: true)])"#,
    )
    .unwrap();
    let mut instance =
        GameInstance::new(InstanceSettings::default(), StaticSource::new(base_only)).unwrap();
    assert!(instance.wait_for_config(TIMEOUT));
    instance.tick(0.016);

    // --- Swap in the audio group ---
    let audio_group = GameManagerData::from_ron(
        r#"(
            sub_manager_data_list: [(data_type_name: "AudioManagerData")],
            sub_managers: { "AudioManagerData": (audio_base_address: "Audio/Cave") },
        )"#,
    )
    .unwrap();
    assert_eq!(instance.enqueue_all(&audio_group), Ok(1));
    instance.tick(0.016);
    let audio = instance.try_get::<AudioManager>().unwrap();
    assert_eq!(
        audio.borrow().map(|a| a.data().audio_base_address.clone()),
        Some("Audio/Cave".to_string())
    );
    drop(audio);

    // --- And out again ---
    assert_eq!(instance.remove_all(&audio_group), Ok(1));
    instance.tick(0.016);
    assert!(instance.try_get::<AudioManager>().is_none());
    assert!(instance.try_get::<TimeManager>().is_some());
}
