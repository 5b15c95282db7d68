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

//! Categorized pools of reusable view-side objects.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// An object that can be parked in a [`ViewPool`].
pub trait Poolable {
    /// Clears per-use state before the object is parked.
    fn reset(&mut self);

    /// Returns true once the object finished its work and may be returned.
    fn is_dormant(&self) -> bool;
}

/// Free lists of reusable objects, keyed by category (e.g. "UI", "Voice").
///
/// Objects are handed out by value and must be given back through
/// [`return_to_pool`](Self::return_to_pool). Acquisition is guarded by a
/// mutex so a pool can be shared with loader threads.
#[derive(Debug)]
pub struct ViewPool<T> {
    name: String,
    categories: Mutex<HashMap<String, Vec<T>>>,
}

impl<T: Poolable> ViewPool<T> {
    /// Creates an empty pool. `name` only shows up in logs.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            categories: Mutex::new(HashMap::new()),
        }
    }

    /// The pool's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Takes a parked object of `category`, or builds one with `create`.
    pub fn get_or_create(&self, category: &str, create: impl FnOnce() -> T) -> T {
        let parked = self
            .lock()
            .entry(category.to_owned())
            .or_default()
            .pop();
        match parked {
            Some(item) => item,
            None => {
                log::trace!("ViewPool '{}': new object in '{category}'", self.name);
                create()
            }
        }
    }

    /// Resets `item` and parks it under `category`.
    pub fn return_to_pool(&self, category: &str, mut item: T) {
        item.reset();
        self.lock()
            .entry(category.to_owned())
            .or_default()
            .push(item);
    }

    /// Moves every dormant object out of `in_use` and back into the pool.
    ///
    /// Returns how many objects were returned. Objects still at work stay in
    /// `in_use` in their original order.
    pub fn sweep_dormant(&self, category: &str, in_use: &mut Vec<T>) -> usize {
        let mut returned = 0;
        let mut index = 0;
        while index < in_use.len() {
            if in_use[index].is_dormant() {
                let item = in_use.remove(index);
                self.return_to_pool(category, item);
                returned += 1;
            } else {
                index += 1;
            }
        }
        returned
    }

    /// Number of parked objects in `category`.
    pub fn available(&self, category: &str) -> usize {
        self.lock().get(category).map_or(0, Vec::len)
    }

    /// Drops every parked object of every category.
    pub fn clear(&self) -> usize {
        let mut categories = self.lock();
        let dropped = categories.values().map(Vec::len).sum();
        categories.clear();
        log::debug!("ViewPool '{}': dropped {dropped} parked objects", self.name);
        dropped
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<T>>> {
        // A panic while holding the lock cannot leave a free list half-edited.
        self.categories.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
