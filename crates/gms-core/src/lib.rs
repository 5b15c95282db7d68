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

//! # GMS Core
//!
//! Foundational crate containing the submanager contract, the data model used
//! to describe submanagers, the pooled event bus and the tick-driven timers.
//!
//! Concrete submanagers live in higher-level crates; the registry that owns
//! them lives in `gms-control`.

#![warn(missing_docs)]

pub mod catalog;
pub mod context;
pub mod data;
pub mod error;
pub mod event;
pub mod pool;
pub mod sub_manager;
pub mod time;

pub use catalog::{LinkDataLogic, SubManagerCatalog, SubManagerRegistration};
pub use context::GameContext;
pub use data::{DataSet, GameManagerData, SubManagerData};
pub use error::{ConstructError, RegistryError};
pub use event::{AnyGameEvent, GameEvent, GameEventCaller, GameEventService, Listener};
pub use pool::{Poolable, ViewPool};
pub use sub_manager::{SubManager, SubManagerHandle, SubManagerLookup, SubManagerRef};
pub use time::{format_clock, ClockTime, Cooldown, CooldownHandle, CooldownScheduler, Fade};
