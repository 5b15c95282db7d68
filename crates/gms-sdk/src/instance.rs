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

//! The composition root.

use crate::config::{ConfigError, ConfigSource, InstanceSettings};
use flume::{Receiver, RecvTimeoutError, TryRecvError};
use gms_control::SubManagerRegistry;
use gms_core::{
    DataSet, GameEventService, GameManagerData, RegistryError, SubManager, SubManagerCatalog,
    SubManagerData, SubManagerHandle, SubManagerRef,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Runtime;

static INSTANCE_ALIVE: AtomicBool = AtomicBool::new(false);

/// Holds the process-wide "one game instance" slot until dropped.
struct SingletonGuard;

impl SingletonGuard {
    fn acquire() -> Option<Self> {
        INSTANCE_ALIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SingletonGuard)
    }
}

impl Drop for SingletonGuard {
    fn drop(&mut self) {
        INSTANCE_ALIVE.store(false, Ordering::Release);
    }
}

/// Errors raised while creating a [`GameInstance`].
#[derive(Debug, Error)]
pub enum GameInstanceError {
    /// Another instance is alive; it stays authoritative.
    #[error("a game instance is already running")]
    AlreadyRunning,
    /// The configuration runtime could not be started.
    #[error("failed to start the configuration runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Lifecycle of a [`GameInstance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceState {
    /// The root configuration is not applied yet, or failed to load.
    Uninitialized,
    /// The registry exists and submanagers are being ticked.
    Ready,
}

type LoadResult = Result<GameManagerData, ConfigError>;

/// Owns the registry, the event bus, and the configuration loader.
///
/// At most one instance exists per process. Creating it starts loading the
/// root configuration on a background runtime; the result is applied by the
/// first [`tick`](Self::tick) after it arrives, which builds the registry
/// and queues every configured submanager. Until then the instance is
/// [`InstanceState::Uninitialized`]: lookups return `None` and requests fail
/// with [`RegistryError::NotReady`].
pub struct GameInstance {
    settings: InstanceSettings,
    catalog: Arc<SubManagerCatalog>,
    events: GameEventService,
    registry: Option<SubManagerRegistry>,
    payloads: DataSet,
    load: Option<Receiver<LoadResult>>,
    runtime: Option<Runtime>,
    _guard: SingletonGuard,
}

impl GameInstance {
    /// Creates the instance with every submanager linked into the binary.
    pub fn new(
        settings: InstanceSettings,
        source: impl ConfigSource + 'static,
    ) -> Result<Self, GameInstanceError> {
        Self::with_catalog(settings, source, SubManagerCatalog::collected())
    }

    /// Creates the instance with an explicit catalog.
    pub fn with_catalog(
        settings: InstanceSettings,
        source: impl ConfigSource + 'static,
        catalog: SubManagerCatalog,
    ) -> Result<Self, GameInstanceError> {
        let Some(guard) = SingletonGuard::acquire() else {
            log::error!(
                "GameInstance: another instance is already running, refusing to replace it"
            );
            return Err(GameInstanceError::AlreadyRunning);
        };

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("gms-config")
            .build()?;

        let (sender, receiver) = flume::bounded(1);
        let key = settings.game_manager_data_key.clone();
        runtime.spawn(async move {
            let result = source.load(&key).await;
            // The instance may be gone already.
            let _ = sender.send(result);
        });
        log::info!("GameInstance: loading `{}`", settings.game_manager_data_key);

        Ok(Self {
            settings,
            catalog: Arc::new(catalog),
            events: GameEventService::new(),
            registry: None,
            payloads: DataSet::new(),
            load: Some(receiver),
            runtime: Some(runtime),
            _guard: guard,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> InstanceState {
        if self.registry.is_some() {
            InstanceState::Ready
        } else {
            InstanceState::Uninitialized
        }
    }

    /// Returns true once the configuration has been applied.
    pub fn is_ready(&self) -> bool {
        self.state() == InstanceState::Ready
    }

    /// The settings the instance was created with.
    pub fn settings(&self) -> &InstanceSettings {
        &self.settings
    }

    /// The event bus shared with every submanager.
    pub fn events(&self) -> &GameEventService {
        &self.events
    }

    /// The registry, once ready.
    pub fn registry(&self) -> Option<&SubManagerRegistry> {
        self.registry.as_ref()
    }

    /// Payloads decoded from the root configuration.
    pub fn payloads(&self) -> &DataSet {
        &self.payloads
    }

    /// Blocks until the configuration arrives or `timeout` elapses, then
    /// applies it. Returns true if the instance is ready afterwards.
    pub fn wait_for_config(&mut self, timeout: Duration) -> bool {
        if let Some(receiver) = self.load.take() {
            match receiver.recv_timeout(timeout) {
                Ok(result) => self.apply_load(result),
                Err(RecvTimeoutError::Timeout) => self.load = Some(receiver),
                Err(RecvTimeoutError::Disconnected) => {
                    log::error!("GameInstance: configuration loader stopped without a result")
                }
            }
        }
        self.is_ready()
    }

    /// Runs one frame: applies a finished configuration load, then ticks
    /// the registry.
    pub fn tick(&mut self, delta_seconds: f32) {
        self.poll_load();
        if let Some(registry) = &self.registry {
            registry.tick(&self.events, delta_seconds);
        }
    }

    /// Typed lookup; `None` until ready.
    pub fn try_get<T: SubManager>(&self) -> Option<SubManagerRef<T>> {
        self.registry.as_ref()?.try_get::<T>()
    }

    /// Queues the submanager described by `descriptor`, built from the
    /// payloads of the root configuration.
    pub fn request_add(
        &self,
        descriptor: &SubManagerData,
    ) -> Result<SubManagerHandle, RegistryError> {
        self.ready_registry()?.request_add(descriptor, &self.payloads)
    }

    /// Queues the submanager described by `descriptor`, built from the
    /// payloads of `data`.
    pub fn request_add_from(
        &self,
        data: &GameManagerData,
        descriptor: &SubManagerData,
    ) -> Result<SubManagerHandle, RegistryError> {
        let registry = self.ready_registry()?;
        let payloads = self.catalog.decode_payloads(data);
        registry.request_add(descriptor, &payloads)
    }

    /// Queues the removal of the submanager described by `descriptor`.
    pub fn request_remove(&self, descriptor: &SubManagerData) -> Result<(), RegistryError> {
        self.ready_registry()?.request_remove(descriptor)
    }

    /// Queues every loading descriptor of `data`. Returns how many were
    /// accepted.
    pub fn enqueue_all(&self, data: &GameManagerData) -> Result<usize, RegistryError> {
        let registry = self.ready_registry()?;
        let payloads = self.catalog.decode_payloads(data);
        Ok(data
            .sub_manager_data_list
            .iter()
            .filter(|descriptor| descriptor.loads)
            .filter(|descriptor| registry.request_add(descriptor, &payloads).is_ok())
            .count())
    }

    /// Queues the removal of every loading descriptor of `data`. Returns how
    /// many were accepted.
    pub fn remove_all(&self, data: &GameManagerData) -> Result<usize, RegistryError> {
        let registry = self.ready_registry()?;
        Ok(data
            .sub_manager_data_list
            .iter()
            .filter(|descriptor| descriptor.loads)
            .filter(|descriptor| registry.request_remove(descriptor).is_ok())
            .count())
    }

    fn ready_registry(&self) -> Result<&SubManagerRegistry, RegistryError> {
        self.registry.as_ref().ok_or(RegistryError::NotReady)
    }

    fn poll_load(&mut self) {
        let Some(receiver) = &self.load else {
            return;
        };
        match receiver.try_recv() {
            Ok(result) => {
                self.load = None;
                self.apply_load(result);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.load = None;
                log::error!("GameInstance: configuration loader stopped without a result");
            }
        }
    }

    fn apply_load(&mut self, result: LoadResult) {
        match result {
            Ok(data) => {
                let registry = SubManagerRegistry::new(self.catalog.clone());
                self.payloads = registry.load_data(&data);
                self.registry = Some(registry);
                log::info!(
                    "GameInstance: `{}` applied, instance ready",
                    self.settings.game_manager_data_key
                );
            }
            Err(e) => log::error!(
                "GameInstance: could not load `{}`: {e}",
                self.settings.game_manager_data_key
            ),
        }
    }
}

impl Drop for GameInstance {
    fn drop(&mut self) {
        log::info!("GameInstance: shutting down");
        if let Some(registry) = self.registry.take() {
            registry.shutdown();
        }
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl std::fmt::Debug for GameInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameInstance")
            .field("settings", &self.settings)
            .field("state", &self.state())
            .field("registry", &self.registry)
            .finish()
    }
}
