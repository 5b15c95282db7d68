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

//! Deferred callbacks fired from the tick instead of from a coroutine.

use std::any::{Any, TypeId};
use std::collections::HashMap;

// Absorbs the rounding of summed f32 frame deltas.
const DEADLINE_EPSILON: f64 = 1e-6;

/// Identifies one scheduled callback.
///
/// Handles are generation-checked: once the callback fired or was swept,
/// the handle goes stale and every operation on it is a no-op, even if the
/// underlying slot has been reused by a newer callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CooldownHandle {
    index: usize,
    generation: u32,
}

/// Pool key: plain callbacks share one pool, parameterized callbacks get one
/// pool per payload type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Shape {
    Plain,
    Payload(TypeId),
}

trait PendingCall {
    /// Invokes and clears the callback. Returns false if there was none.
    fn fire(&mut self) -> bool;
    fn clear(&mut self);
    fn is_armed(&self) -> bool;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[derive(Default)]
struct PlainCall {
    callback: Option<Box<dyn FnOnce()>>,
}

impl PendingCall for PlainCall {
    fn fire(&mut self) -> bool {
        match self.callback.take() {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        self.callback = None;
    }

    fn is_armed(&self) -> bool {
        self.callback.is_some()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct PayloadCall<P> {
    callback: Option<Box<dyn FnOnce(P)>>,
    payload: Option<P>,
}

impl<P> Default for PayloadCall<P> {
    fn default() -> Self {
        Self {
            callback: None,
            payload: None,
        }
    }
}

impl<P: 'static> PendingCall for PayloadCall<P> {
    fn fire(&mut self) -> bool {
        match (self.callback.take(), self.payload.take()) {
            (Some(callback), Some(payload)) => {
                callback(payload);
                true
            }
            _ => false,
        }
    }

    fn clear(&mut self) {
        self.callback = None;
        self.payload = None;
    }

    fn is_armed(&self) -> bool {
        self.callback.is_some()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct Slot {
    generation: u32,
    shape: Shape,
    started_at: f64,
    cool_time: f64,
    call: Box<dyn PendingCall>,
}

/// Runs callbacks once a number of seconds of game time has passed.
///
/// Slots are recycled: a fired or cancelled callback returns its slot (and
/// its boxed storage) to the pool of its shape, and the next `schedule` of
/// that shape reuses it instead of allocating.
#[derive(Default)]
pub struct CooldownScheduler {
    now: f64,
    slots: Vec<Slot>,
    active: Vec<usize>,
    free: HashMap<Shape, Vec<usize>>,
}

impl CooldownScheduler {
    /// Creates an empty scheduler with its clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of callbacks waiting for their deadline, cancelled ones
    /// included until the next sweep.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of recycled slots ready for reuse.
    pub fn pooled_count(&self) -> usize {
        self.free.values().map(Vec::len).sum()
    }

    /// Calls `callback` once `seconds` of game time have passed.
    pub fn schedule(&mut self, seconds: f32, callback: impl FnOnce() + 'static) -> CooldownHandle {
        let index = self.acquire_slot(Shape::Plain, || Box::new(PlainCall::default()));
        let slot = &mut self.slots[index];
        match slot.call.as_any_mut().downcast_mut::<PlainCall>() {
            Some(call) => call.callback = Some(Box::new(callback)),
            None => {
                slot.call = Box::new(PlainCall {
                    callback: Some(Box::new(callback)),
                })
            }
        }
        self.arm(index, seconds)
    }

    /// Calls `callback(payload)` once `seconds` of game time have passed.
    pub fn schedule_with<P: 'static>(
        &mut self,
        seconds: f32,
        callback: impl FnOnce(P) + 'static,
        payload: P,
    ) -> CooldownHandle {
        let shape = Shape::Payload(TypeId::of::<P>());
        let index = self.acquire_slot(shape, || Box::new(PayloadCall::<P>::default()));
        let slot = &mut self.slots[index];
        match slot.call.as_any_mut().downcast_mut::<PayloadCall<P>>() {
            Some(call) => {
                call.callback = Some(Box::new(callback));
                call.payload = Some(payload);
            }
            None => {
                slot.call = Box::new(PayloadCall {
                    callback: Some(Box::new(callback)),
                    payload: Some(payload),
                })
            }
        }
        self.arm(index, seconds)
    }

    /// Drops the callback of `handle` without calling it.
    ///
    /// The slot is not recycled right away; its deadline is forced into the
    /// past so the next [`advance`](Self::advance) sweeps it. Returns false
    /// for stale handles and for callbacks already cancelled.
    pub fn cancel(&mut self, handle: CooldownHandle) -> bool {
        let Some(slot) = self.live_slot_mut(handle) else {
            return false;
        };
        if !slot.call.is_armed() {
            return false;
        }
        slot.call.clear();
        slot.cool_time = 0.0;
        log::trace!("CooldownScheduler: cancelled slot {}", handle.index);
        true
    }

    /// Returns true while `handle` still has a callback waiting to fire.
    pub fn is_pending(&self, handle: CooldownHandle) -> bool {
        self.live_slot(handle)
            .is_some_and(|slot| slot.call.is_armed())
    }

    /// Seconds left before `handle` fires, or `None` if it is not pending.
    pub fn remaining(&self, handle: CooldownHandle) -> Option<f32> {
        self.live_slot(handle)
            .filter(|slot| slot.call.is_armed())
            .map(|slot| (slot.started_at + slot.cool_time - self.now).max(0.0) as f32)
    }

    /// Moves the clock forward by `delta_seconds` and fires every callback
    /// whose wait is over, in the order they were scheduled.
    ///
    /// Returns the number of callbacks invoked. Cancelled entries are swept
    /// without being counted.
    pub fn advance(&mut self, delta_seconds: f32) -> usize {
        self.now += f64::from(delta_seconds.max(0.0));

        let mut fired = 0;
        let active = std::mem::take(&mut self.active);
        let mut still_waiting = Vec::with_capacity(active.len());
        for index in active {
            let slot = &mut self.slots[index];
            if self.now - slot.started_at + DEADLINE_EPSILON < slot.cool_time {
                still_waiting.push(index);
                continue;
            }
            if slot.call.fire() {
                fired += 1;
            }
            slot.generation = slot.generation.wrapping_add(1);
            self.free.entry(slot.shape).or_default().push(index);
        }
        // Callbacks cannot reach the scheduler, so nothing was added meanwhile.
        self.active = still_waiting;

        if fired > 0 {
            log::trace!("CooldownScheduler: fired {fired} callbacks at {:.3}s", self.now);
        }
        fired
    }

    fn acquire_slot(
        &mut self,
        shape: Shape,
        create: impl FnOnce() -> Box<dyn PendingCall>,
    ) -> usize {
        if let Some(index) = self.free.get_mut(&shape).and_then(Vec::pop) {
            return index;
        }
        self.slots.push(Slot {
            generation: 0,
            shape,
            started_at: 0.0,
            cool_time: 0.0,
            call: create(),
        });
        self.slots.len() - 1
    }

    fn arm(&mut self, index: usize, seconds: f32) -> CooldownHandle {
        let slot = &mut self.slots[index];
        slot.started_at = self.now;
        slot.cool_time = f64::from(seconds.max(0.0));
        self.active.push(index);
        CooldownHandle {
            index,
            generation: slot.generation,
        }
    }

    fn live_slot(&self, handle: CooldownHandle) -> Option<&Slot> {
        self.slots
            .get(handle.index)
            .filter(|slot| slot.generation == handle.generation)
    }

    fn live_slot_mut(&mut self, handle: CooldownHandle) -> Option<&mut Slot> {
        self.slots
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
    }
}

impl std::fmt::Debug for CooldownScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CooldownScheduler")
            .field("now", &self.now)
            .field("active", &self.active.len())
            .field("pooled", &self.pooled_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn fires_on_the_first_tick_past_the_deadline() {
        // ARRANGE
        let mut scheduler = CooldownScheduler::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        scheduler.schedule(2.0, move || counter.set(counter.get() + 1));

        // ACT / ASSERT
        assert_eq!(scheduler.advance(1.0), 0);
        assert_eq!(hits.get(), 0);
        assert_eq!(scheduler.advance(1.0), 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(scheduler.advance(1.0), 0);
        assert_eq!(hits.get(), 1);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn decimal_deadlines_fire_on_the_tick_that_reaches_them() {
        let cases = [(0.3, 0.1, 3), (0.7, 0.1, 7), (1.0, 1.0 / 60.0, 60)];
        for (seconds, delta, expected_tick) in cases {
            let mut scheduler = CooldownScheduler::new();
            let hits = Rc::new(Cell::new(0));
            let counter = hits.clone();
            scheduler.schedule(seconds, move || counter.set(counter.get() + 1));

            let mut fired_at = None;
            for tick in 1..=expected_tick + 2 {
                if scheduler.advance(delta) > 0 {
                    fired_at = Some(tick);
                    break;
                }
            }
            assert_eq!(fired_at, Some(expected_tick), "{seconds}s with {delta}s ticks");
            assert_eq!(hits.get(), 1);
        }
    }

    #[test]
    fn fires_in_scheduling_order() {
        let mut scheduler = CooldownScheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for (name, seconds) in [("b", 0.5), ("a", 0.2), ("c", 0.5)] {
            let order = order.clone();
            scheduler.schedule(seconds, move || order.borrow_mut().push(name));
        }

        assert_eq!(scheduler.advance(1.0), 3);
        assert_eq!(*order.borrow(), vec!["b", "a", "c"]);
    }

    #[test]
    fn parameterized_callbacks_receive_their_payload() {
        let mut scheduler = CooldownScheduler::new();
        let received = Rc::new(Cell::new(0usize));
        let sink = received.clone();
        scheduler.schedule_with(0.1, move |index: usize| sink.set(index), 7usize);

        scheduler.advance(0.1);
        assert_eq!(received.get(), 7);
    }

    #[test]
    fn recycled_slots_are_reused_per_shape() {
        let mut scheduler = CooldownScheduler::new();
        scheduler.schedule(0.0, || {});
        scheduler.schedule_with(0.0, |_: u8| {}, 1u8);
        scheduler.advance(0.0);
        assert_eq!(scheduler.pooled_count(), 2);

        // A payload of another type cannot reuse the u8 slot.
        scheduler.schedule_with(1.0, |_: String| {}, String::from("x"));
        assert_eq!(scheduler.pooled_count(), 2);

        scheduler.schedule(1.0, || {});
        scheduler.schedule_with(1.0, |_: u8| {}, 2u8);
        assert_eq!(scheduler.pooled_count(), 0);
        assert_eq!(scheduler.active_count(), 3);
    }

    #[test]
    fn cancel_skips_the_callback_and_sweeps_next_scan() {
        // ARRANGE
        let mut scheduler = CooldownScheduler::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let handle = scheduler.schedule(10.0, move || counter.set(counter.get() + 1));

        // ACT
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle), "second cancel is a no-op");
        assert_eq!(scheduler.active_count(), 1);
        let fired = scheduler.advance(0.0);

        // ASSERT
        assert_eq!(fired, 0);
        assert_eq!(hits.get(), 0);
        assert_eq!(scheduler.active_count(), 0);
        assert_eq!(scheduler.pooled_count(), 1);
    }

    #[test]
    fn stale_handles_cannot_touch_reused_slots() {
        let mut scheduler = CooldownScheduler::new();
        let old = scheduler.schedule(0.5, || {});
        scheduler.advance(1.0);
        assert!(!scheduler.cancel(old));

        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let new = scheduler.schedule(0.5, move || counter.set(counter.get() + 1));
        assert_ne!(old, new);
        assert!(!scheduler.cancel(old));
        assert!(scheduler.is_pending(new));
        assert_eq!(scheduler.remaining(new), Some(0.5));

        scheduler.advance(0.5);
        assert_eq!(hits.get(), 1);
        assert!(!scheduler.is_pending(new));
    }
}
