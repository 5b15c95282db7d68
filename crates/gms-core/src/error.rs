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

//! Error types shared by the registry and its callers.
//!
//! None of these are fatal: every registry operation reports failure through
//! a `Result` and leaves its state untouched.

use thiserror::Error;

/// Failure to build a logic instance from its configuration payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructError {
    /// The logic type needs a payload and none of the linked type was supplied.
    #[error("missing configuration payload `{data}` for `{logic}`")]
    MissingPayload {
        /// Display name of the expected payload type.
        data: &'static str,
        /// Display name of the logic type being built.
        logic: &'static str,
    },
    /// The payload was present but its content is unusable.
    #[error("invalid configuration payload: {0}")]
    InvalidPayload(String),
}

/// Reasons a registration request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The descriptor is flagged as not loading.
    #[error("submanager `{0}` is flagged as not loading")]
    NotLoaded(String),
    /// No catalog entry matches the descriptor's data type name.
    #[error("no submanager registered for data type `{0}`")]
    UnknownType(String),
    /// The catalog entry exists but construction failed.
    #[error("failed to construct `{name}`: {source}")]
    Construct {
        /// Data type name of the descriptor.
        name: String,
        /// Underlying construction failure.
        #[source]
        source: ConstructError,
    },
    /// No active instance of the resolved type lives in the targeted set.
    #[error("no active `{0}` to remove")]
    NotFound(String),
    /// The composition root has not finished loading its configuration.
    #[error("game instance is not ready")]
    NotReady,
}
