// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend trait for timer delivery.

use core::time::Duration;

use crate::types::{TimerEvent, TimerSlot};

/// Timer delivery abstraction used by [`Scheduler`][crate::Scheduler].
///
/// A backend owns the mechanics of waiting. It must never invoke engine code
/// directly: expiries are reported as [`TimerEvent`] values through whatever
/// queue the backend was built with.
pub trait TimerBackend {
    /// Arm `event.slot` so that `event` is delivered after `period`.
    ///
    /// When `repeat` is true the event is delivered again every `period` until
    /// the slot is disarmed. Arming a slot that is already armed replaces the
    /// previous arm.
    fn arm(&mut self, event: TimerEvent, period: Duration, repeat: bool);

    /// Disarm a slot. Disarming an idle slot does nothing.
    fn disarm(&mut self, slot: TimerSlot);
}
