// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Switch bindings and timing configuration.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::action::SwitchAction;

/// Physical identity of a switch, as reported by the platform (a key code,
/// a gamepad button, ...).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SwitchCode(pub u32);

/// What a switch does when tapped and when held.
///
/// Hold action `i` becomes due after `(i + 1) * hold_time` of continuous hold,
/// so longer presses reach actions later in the list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchBinding {
    /// Physical switch.
    pub code: SwitchCode,
    /// Action on a short press.
    pub press: SwitchAction,
    /// Actions on increasingly long holds.
    #[serde(default)]
    pub hold: SmallVec<[SwitchAction; 2]>,
}

impl SwitchBinding {
    /// A binding with only a press action.
    pub fn new(code: u32, press: SwitchAction) -> Self {
        Self {
            code: SwitchCode(code),
            press,
            hold: SmallVec::new(),
        }
    }

    /// Append a hold action.
    #[must_use]
    pub fn with_hold(mut self, action: SwitchAction) -> Self {
        self.hold.push(action);
        self
    }

    /// The action that auto-repeats once every hold action has fired: the last
    /// hold action, or the press action when there are none, if it is a
    /// movement.
    pub fn repeat_action(&self) -> Option<SwitchAction> {
        let action = self.hold.last().copied().unwrap_or(self.press);
        action.is_movement().then_some(action)
    }
}

/// Switch timing thresholds, in milliseconds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchTimings {
    /// Continuous hold before the first hold action.
    pub hold_time_ms: u64,
    /// Presses of the same switch closer than this to the previous accepted
    /// press are treated as contact bounce. Zero disables suppression.
    pub ignore_repeat_delay_ms: u64,
    /// Interval at which a held movement switch repeats. Zero disables repeat.
    pub move_repeat_delay_ms: u64,
}

impl Default for SwitchTimings {
    fn default() -> Self {
        Self {
            hold_time_ms: 500,
            ignore_repeat_delay_ms: 0,
            move_repeat_delay_ms: 0,
        }
    }
}
