// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slot bookkeeping: running/paused state and arm generations.

use core::time::Duration;

use hashbrown::HashMap;

use crate::backend::TimerBackend;
use crate::backends::ManualBackend;
use crate::types::{TimerEvent, TimerSlot};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    Running,
    Paused,
}

#[derive(Copy, Clone, Debug)]
struct Slot {
    phase: Phase,
    period: Duration,
    repeat: bool,
    generation: u64,
}

/// Owner of all timer slots of a scanning session.
///
/// The scheduler only tracks state; the backend `B` does the waiting. Events
/// produced by the backend must be passed back through [`Scheduler::accept`]
/// before acting on them.
///
/// ## Example
///
/// ```rust
/// use core::time::Duration;
/// use understory_scan_timer::{Scheduler, TimerSlot, backends::ManualBackend};
///
/// let mut scheduler = Scheduler::new(ManualBackend::default());
/// scheduler.start(TimerSlot::Scan, Duration::from_millis(800));
/// scheduler.pause(TimerSlot::Scan);
/// assert!(!scheduler.is_running(TimerSlot::Scan));
///
/// scheduler.resume(TimerSlot::Scan);
/// assert!(scheduler.is_running(TimerSlot::Scan));
/// ```
#[derive(Debug)]
pub struct Scheduler<B: TimerBackend = ManualBackend> {
    slots: HashMap<TimerSlot, Slot>,
    next_generation: u64,
    backend: B,
}

impl<B: TimerBackend + Default> Default for Scheduler<B> {
    fn default() -> Self {
        Self::new(B::default())
    }
}

impl<B: TimerBackend> Scheduler<B> {
    /// Create a scheduler over `backend` with every slot stopped.
    pub fn new(backend: B) -> Self {
        Self {
            slots: HashMap::new(),
            next_generation: 1,
            backend,
        }
    }

    /// Start a repeating slot with the given interval.
    ///
    /// Starting a slot that is already running is a no-op. Starting a paused
    /// slot discards the pause and arms with the new interval.
    pub fn start(&mut self, slot: TimerSlot, interval: Duration) {
        self.start_with(slot, interval, true);
    }

    /// Start a one-shot slot that fires once after `delay`.
    ///
    /// Like [`Scheduler::start`], this is a no-op while the slot is running.
    /// An accepted one-shot event stops the slot, so it may be started again
    /// from the event handler.
    pub fn start_once(&mut self, slot: TimerSlot, delay: Duration) {
        self.start_with(slot, delay, false);
    }

    /// Stop and immediately re-arm a one-shot slot.
    pub fn restart_once(&mut self, slot: TimerSlot, delay: Duration) {
        self.stop(slot);
        self.start_once(slot, delay);
    }

    fn start_with(&mut self, slot: TimerSlot, period: Duration, repeat: bool) {
        if self.is_running(slot) {
            tracing::trace!(?slot, "start ignored, slot already running");
            return;
        }
        let generation = self.arm(slot, period, repeat);
        self.slots.insert(
            slot,
            Slot {
                phase: Phase::Running,
                period,
                repeat,
                generation,
            },
        );
    }

    /// Change the interval of a slot.
    ///
    /// A running slot is re-armed only if the interval actually changes; the
    /// new interval starts counting from now. A paused slot keeps the new
    /// interval for [`Scheduler::resume`]. A stopped slot is left alone.
    pub fn set_interval(&mut self, slot: TimerSlot, interval: Duration) {
        let Some(state) = self.slots.get(&slot).copied() else {
            return;
        };
        if state.period == interval {
            return;
        }
        let generation = match state.phase {
            Phase::Running => self.arm(slot, interval, state.repeat),
            Phase::Paused => state.generation,
        };
        if let Some(state) = self.slots.get_mut(&slot) {
            state.period = interval;
            state.generation = generation;
        }
    }

    /// Suspend a running slot. Pausing anything else is a no-op.
    pub fn pause(&mut self, slot: TimerSlot) {
        let Some(state) = self.slots.get_mut(&slot) else {
            return;
        };
        if state.phase == Phase::Running {
            state.phase = Phase::Paused;
            self.backend.disarm(slot);
        }
    }

    /// Resume a paused slot with a fresh full interval.
    pub fn resume(&mut self, slot: TimerSlot) {
        let Some(state) = self.slots.get(&slot).copied() else {
            return;
        };
        if state.phase != Phase::Paused {
            return;
        }
        let generation = self.arm(slot, state.period, state.repeat);
        if let Some(state) = self.slots.get_mut(&slot) {
            state.phase = Phase::Running;
            state.generation = generation;
        }
    }

    /// Stop a slot. Stopping a stopped slot is a no-op.
    pub fn stop(&mut self, slot: TimerSlot) {
        if self.slots.remove(&slot).is_some() {
            self.backend.disarm(slot);
        }
    }

    /// Stop every slot.
    pub fn stop_all(&mut self) {
        for (slot, _) in self.slots.drain() {
            self.backend.disarm(slot);
        }
    }

    /// Whether the slot is armed and counting.
    pub fn is_running(&self, slot: TimerSlot) -> bool {
        self.slots
            .get(&slot)
            .is_some_and(|s| s.phase == Phase::Running)
    }

    /// Whether the slot is paused.
    pub fn is_paused(&self, slot: TimerSlot) -> bool {
        self.slots
            .get(&slot)
            .is_some_and(|s| s.phase == Phase::Paused)
    }

    /// Current interval of a running or paused slot.
    pub fn interval(&self, slot: TimerSlot) -> Option<Duration> {
        self.slots.get(&slot).map(|s| s.period)
    }

    /// Check an event against the current arm of its slot.
    ///
    /// Returns `false` for events whose slot is stopped or paused, or whose
    /// generation belongs to an earlier arm. Accepting a one-shot event stops
    /// its slot.
    pub fn accept(&mut self, event: &TimerEvent) -> bool {
        let Some(state) = self.slots.get(&event.slot).copied() else {
            tracing::trace!(slot = ?event.slot, "dropping tick for stopped slot");
            return false;
        };
        if state.phase != Phase::Running || state.generation != event.generation {
            tracing::trace!(
                slot = ?event.slot,
                generation = event.generation,
                current = state.generation,
                "dropping stale tick"
            );
            return false;
        }
        if !state.repeat {
            self.slots.remove(&event.slot);
        }
        true
    }

    /// Shared access to the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn arm(&mut self, slot: TimerSlot, period: Duration, repeat: bool) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.backend
            .arm(TimerEvent { slot, generation }, period, repeat);
        generation
    }
}
