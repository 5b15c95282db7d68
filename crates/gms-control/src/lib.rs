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

//! Owns the live submanagers and drives their lifecycle.
//!
//! The [`SubManagerRegistry`] keeps two ordered sets (base and dynamic),
//! ticks them once per frame and applies queued add/remove edits only
//! between frames, so a set is never mutated while it is being iterated.

pub mod edit;
pub mod registry;

pub use edit::{EditOp, SubManagerEdit};
pub use registry::{SubManagerRegistry, SubManagerSlot};
