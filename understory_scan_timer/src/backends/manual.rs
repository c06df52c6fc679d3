// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic backend: arms are recorded and fired by the caller.

use core::time::Duration;

use hashbrown::HashMap;

use crate::backend::TimerBackend;
use crate::types::{TimerEvent, TimerSlot};

/// A recorded arm.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Armed {
    /// Event that will be delivered when the arm fires.
    pub event: TimerEvent,
    /// Requested delay or period.
    pub period: Duration,
    /// Whether the arm survives firing.
    pub repeat: bool,
}

/// Backend that never waits on its own.
///
/// Arms are kept in a table; [`ManualBackend::fire`] produces the event the
/// real backend would have delivered. One-shot arms are removed when fired.
#[derive(Clone, Debug, Default)]
pub struct ManualBackend {
    armed: HashMap<TimerSlot, Armed>,
}

impl ManualBackend {
    /// Create a backend with nothing armed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire a slot, returning the event if the slot was armed.
    pub fn fire(&mut self, slot: TimerSlot) -> Option<TimerEvent> {
        let armed = *self.armed.get(&slot)?;
        if !armed.repeat {
            self.armed.remove(&slot);
        }
        Some(armed.event)
    }

    /// The current arm of a slot, if any.
    pub fn armed(&self, slot: TimerSlot) -> Option<&Armed> {
        self.armed.get(&slot)
    }

    /// Whether a slot is armed.
    pub fn is_armed(&self, slot: TimerSlot) -> bool {
        self.armed.contains_key(&slot)
    }
}

impl TimerBackend for ManualBackend {
    fn arm(&mut self, event: TimerEvent, period: Duration, repeat: bool) {
        self.armed.insert(
            event.slot,
            Armed {
                event,
                period,
                repeat,
            },
        );
    }

    fn disarm(&mut self, slot: TimerSlot) {
        self.armed.remove(&slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_fires_once() {
        let mut backend = ManualBackend::new();
        let event = TimerEvent {
            slot: TimerSlot::Hold,
            generation: 3,
        };
        backend.arm(event, Duration::from_millis(500), false);

        assert_eq!(backend.fire(TimerSlot::Hold), Some(event));
        assert_eq!(backend.fire(TimerSlot::Hold), None);
    }

    #[test]
    fn repeating_fires_until_disarmed() {
        let mut backend = ManualBackend::new();
        let event = TimerEvent {
            slot: TimerSlot::Scan,
            generation: 1,
        };
        backend.arm(event, Duration::from_millis(1000), true);

        assert_eq!(backend.fire(TimerSlot::Scan), Some(event));
        assert_eq!(backend.fire(TimerSlot::Scan), Some(event));
        backend.disarm(TimerSlot::Scan);
        assert!(!backend.is_armed(TimerSlot::Scan));
        assert_eq!(backend.fire(TimerSlot::Scan), None);
    }
}
