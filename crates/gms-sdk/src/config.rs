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

//! Sources of the root configuration and the instance settings.

use async_trait::async_trait;
use gms_core::GameManagerData;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading the root configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The configuration text is not valid RON for [`GameManagerData`].
    #[error("failed to parse `{path}`: {source}")]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Parser error with its position.
        #[source]
        source: ron::error::SpannedError,
    },
    /// The source has nothing stored under the requested key.
    #[error("no configuration stored under `{0}`")]
    UnknownKey(String),
    /// The loading task was cancelled or panicked.
    #[error("configuration task failed: {0}")]
    Task(String),
}

/// Asynchronously provides the root configuration for an asset key.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Loads the configuration stored under `key`.
    async fn load(&self, key: &str) -> Result<GameManagerData, ConfigError>;
}

/// Reads `<root>/<key>.ron` from disk on a blocking worker.
#[derive(Debug, Clone)]
pub struct RonFileSource {
    root: PathBuf,
}

impl RonFileSource {
    /// A source reading configuration files under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.ron"))
    }

    fn read(path: &Path) -> Result<GameManagerData, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        GameManagerData::from_ron(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[async_trait]
impl ConfigSource for RonFileSource {
    async fn load(&self, key: &str) -> Result<GameManagerData, ConfigError> {
        let path = self.path_for(key);
        log::debug!("RonFileSource: reading {}", path.display());
        tokio::task::spawn_blocking(move || Self::read(&path))
            .await
            .map_err(|e| ConfigError::Task(e.to_string()))?
    }
}

/// Hands over a configuration that is already in memory.
#[derive(Debug, Clone)]
pub struct StaticSource {
    key: Option<String>,
    data: GameManagerData,
}

impl StaticSource {
    /// Answers every key with `data`.
    pub fn new(data: GameManagerData) -> Self {
        Self { key: None, data }
    }

    /// Answers only `key` with `data`.
    pub fn keyed(key: impl Into<String>, data: GameManagerData) -> Self {
        Self {
            key: Some(key.into()),
            data,
        }
    }
}

#[async_trait]
impl ConfigSource for StaticSource {
    async fn load(&self, key: &str) -> Result<GameManagerData, ConfigError> {
        match &self.key {
            Some(expected) if expected != key => Err(ConfigError::UnknownKey(key.to_string())),
            _ => Ok(self.data.clone()),
        }
    }
}

/// Settings of a [`GameInstance`](crate::GameInstance).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSettings {
    /// Asset key of the root configuration.
    #[serde(default = "default_game_manager_data_key")]
    pub game_manager_data_key: String,
}

fn default_game_manager_data_key() -> String {
    "GameManagerData".to_string()
}

impl Default for InstanceSettings {
    fn default() -> Self {
        Self {
            game_manager_data_key: default_game_manager_data_key(),
        }
    }
}

impl InstanceSettings {
    /// Settings loading the configuration stored under `key`.
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            game_manager_data_key: key.into(),
        }
    }
}
