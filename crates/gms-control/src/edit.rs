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

//! Deferred registry edits.

use crate::registry::SubManagerSlot;

/// What a queued edit does to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    /// Append the target unless an identical instance is already active.
    Add,
    /// Uninitialize the target, then take it out of its set.
    Remove,
}

/// One pending change to the registry, consumed exactly once by the drain.
#[derive(Debug, Clone)]
pub struct SubManagerEdit {
    /// Instance the edit applies to.
    pub target: SubManagerSlot,
    /// Add or remove.
    pub op: EditOp,
    /// Selects the base set instead of the dynamic set.
    pub is_base: bool,
}

impl SubManagerEdit {
    /// An `Add` edit.
    pub fn add(target: SubManagerSlot, is_base: bool) -> Self {
        Self {
            target,
            op: EditOp::Add,
            is_base,
        }
    }

    /// A `Remove` edit.
    pub fn remove(target: SubManagerSlot, is_base: bool) -> Self {
        Self {
            target,
            op: EditOp::Remove,
            is_base,
        }
    }

    /// Name of the set the edit targets, for logs.
    pub fn set_name(&self) -> &'static str {
        if self.is_base {
            "base"
        } else {
            "dynamic"
        }
    }
}
