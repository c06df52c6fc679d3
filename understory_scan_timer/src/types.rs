// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timer slot identifiers and the events backends deliver.

/// Identifies one of the independent timers a scanning session runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerSlot {
    /// The periodic scan tick that advances the highlight in auto mode.
    Scan,
    /// Switch hold detection and hold-action repeats.
    Hold,
    /// Confirmation delay before a fixed cursor or radar point is tapped.
    AutoSelect,
    /// Fallback when item scanning starts without any targets.
    Watchdog,
}

/// A timer expiry, posted by a backend into the engine's queue.
///
/// The `generation` identifies the arm that produced the event; the
/// [`Scheduler`](crate::Scheduler) only accepts events from the current arm.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimerEvent {
    /// Slot that expired.
    pub slot: TimerSlot,
    /// Arm generation the event belongs to.
    pub generation: u64,
}
