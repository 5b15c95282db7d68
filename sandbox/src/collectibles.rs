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

//! Sample submanager: counts pickups, plays a sound, shows a fading notice.

use gms_sdk::prelude::*;
use serde::Deserialize;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Published by gameplay when the player picks something up.
#[derive(Debug, Default)]
pub struct ItemCollected {
    pub key: String,
    pub amount: u32,
}

impl GameEvent for ItemCollected {
    const NAME: &'static str = "ItemCollected";
    const DESCRIPTION: &'static str = "The player collected an item";
}

inventory::submit! { EventRegistration::of::<ItemCollected>() }

#[derive(Debug, Clone, Deserialize)]
pub struct CollectiblesData {
    pub pickup_clips: Vec<String>,
    pub notice_hold_seconds: f32,
    pub notice_fade_speed: f32,
    pub combo_window_seconds: f32,
}

impl LinkDataLogic for CollectiblesData {
    type Logic = CollectiblesManager;

    fn build(data: Option<&Self>) -> Result<CollectiblesManager, ConstructError> {
        let data = data.ok_or(ConstructError::MissingPayload {
            data: "Collectibles Data",
            logic: "Collectibles Manager",
        })?;
        Ok(CollectiblesManager::new(data.clone()))
    }
}

inventory::submit! {
    SubManagerRegistration::new::<CollectiblesData>(
        "CollectiblesData",
        "Collectibles Data",
        "Collectibles Manager",
    )
}

pub struct CollectiblesManager {
    data: CollectiblesData,
    totals: BTreeMap<String, u32>,
    inbox: Rc<RefCell<Vec<(String, u32)>>>,
    listener: Option<(GameEventService, Listener<ItemCollected>)>,
    notice: Fade,
    combo: Rc<Cell<u32>>,
    // Pending combo reset and the clock it was scheduled on.
    combo_reset: Option<(SubManagerRef<TimeManager>, CooldownHandle)>,
}

impl CollectiblesManager {
    fn new(data: CollectiblesData) -> Self {
        Self {
            data,
            totals: BTreeMap::new(),
            inbox: Rc::new(RefCell::new(Vec::new())),
            listener: None,
            notice: Fade::new(0.0),
            combo: Rc::new(Cell::new(0)),
            combo_reset: None,
        }
    }

    pub fn total(&self, key: &str) -> u32 {
        self.totals.get(key).copied().unwrap_or(0)
    }

    pub fn notice_alpha(&self) -> f32 {
        self.notice.value()
    }

    pub fn combo(&self) -> u32 {
        self.combo.get()
    }

    fn collect(&mut self, key: String, amount: u32, context: &GameContext<'_>) {
        let total = self.totals.entry(key.clone()).or_insert(0);
        *total += amount;
        log::info!("Collected {amount} x {key} (total {total})");

        let clips = self.data.pickup_clips.clone();
        context.events.trigger(|e: &mut PlayAudio| {
            e.category = AudioCategory::Ui;
            e.clips = clips;
            e.duration = 0.4;
        });

        self.notice.fade_to_and_back(
            1.0,
            self.data.notice_fade_speed,
            self.data.notice_hold_seconds,
        );

        self.combo.set(self.combo.get() + 1);
        if let Some(time) = context.try_get::<TimeManager>() {
            let combo = self.combo.clone();
            let window = self.data.combo_window_seconds;
            let previous = self.combo_reset.take().map(|(_, handle)| handle);
            let handle = time.with(|time| {
                if let Some(handle) = previous {
                    time.cancel(handle);
                }
                time.schedule(window, move || {
                    log::info!("Combo of {} ended", combo.get());
                    combo.set(0);
                })
            });
            self.combo_reset = handle.map(|handle| (time, handle));
        }
    }
}

impl SubManager for CollectiblesManager {
    fn initialize(&mut self, context: &GameContext<'_>) -> bool {
        let inbox = self.inbox.clone();
        let listener: Listener<ItemCollected> = Rc::new(move |e: &ItemCollected| {
            inbox.borrow_mut().push((e.key.clone(), e.amount));
        });
        context.events.register(listener.clone());
        self.listener = Some((context.events.clone(), listener));
        true
    }

    fn uninitialize(&mut self) {
        if let Some((events, listener)) = self.listener.take() {
            events.unregister(&listener);
        }
        if let Some((time, handle)) = self.combo_reset.take() {
            time.with(|time| time.cancel(handle));
        }
        log::info!("Collectibles at unload: {:?}", self.totals);
    }

    fn on_tick(&mut self, context: &GameContext<'_>) {
        let collected: Vec<(String, u32)> = self.inbox.borrow_mut().drain(..).collect();
        for (key, amount) in collected {
            self.collect(key, amount, context);
        }
        self.notice.advance(context.delta_seconds);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
