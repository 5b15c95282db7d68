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

//! Submanagers shipped with the framework.
//!
//! Each one is registered in the submanager catalog under its payload
//! type name (`"TimeManagerData"`, `"AudioManagerData"`), so linking this
//! crate is enough for a configuration to request them.

pub mod audio_manager;
pub mod time_manager;

pub use audio_manager::{AudioCategory, AudioManager, AudioManagerData, PlayAudio};
pub use time_manager::{TimeManager, TimeManagerData};
