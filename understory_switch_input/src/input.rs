// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Press/hold/release interpretation.

use core::time::Duration;

use hashbrown::{HashMap, HashSet};

use crate::action::SwitchAction;
use crate::binding::{SwitchBinding, SwitchCode, SwitchTimings};

/// Interval between hold polls once the first hold timer has expired.
pub const HOLD_POLL_INTERVAL_MS: u64 = 100;

/// A press that has been claimed and not yet released.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AbsorbedPress {
    /// Switch that was pressed.
    pub code: SwitchCode,
    /// Timestamp of the press, in milliseconds.
    pub pressed_at: u64,
    /// Number of hold actions performed so far.
    pub hold_actions_fired: usize,
    /// Number of movement repeats performed after the hold actions.
    pub repeats: u32,
}

impl AbsorbedPress {
    fn acted(&self) -> bool {
        self.hold_actions_fired > 0 || self.repeats > 0
    }
}

/// Result of a press.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PressOutcome {
    /// Whether the event was claimed. Unclaimed events should be passed on to
    /// the platform.
    pub absorbed: bool,
    /// Arm the hold timer with this delay.
    pub hold_timer: Option<Duration>,
}

/// Result of a release.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ReleaseOutcome {
    /// Whether the event was claimed.
    pub absorbed: bool,
    /// Action to perform.
    pub action: Option<SwitchAction>,
    /// Whether a pending hold timer should be cancelled.
    pub cancel_hold: bool,
}

/// Result of a hold timer expiry.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HoldOutcome {
    /// Action to perform.
    pub action: Option<SwitchAction>,
    /// Re-arm the hold timer with this delay.
    pub rearm: Option<Duration>,
}

/// State machine turning raw switch events into [`SwitchAction`]s.
///
/// Only one press is tracked at a time. Timestamps are caller-supplied
/// milliseconds from any monotonic clock; the machine never reads a clock and
/// never arms timers itself. Instead each outcome says which timer the caller
/// should arm or cancel, and [`SwitchInput::on_hold_timer`] is called when it
/// expires.
///
/// Noisy input is never an error: releases without a press, presses on
/// unbound switches, and overlapping presses are logged and either passed
/// through or swallowed.
///
/// ```
/// use understory_switch_input::{SwitchAction, SwitchBinding, SwitchCode, SwitchInput, SwitchTimings};
///
/// let mut input = SwitchInput::new(SwitchTimings::default());
/// input.bind(SwitchBinding::new(1, SwitchAction::Select).with_hold(SwitchAction::OpenMenu));
///
/// let press = input.on_press(SwitchCode(1), 1_000);
/// assert!(press.absorbed);
/// assert!(press.hold_timer.is_some());
///
/// let release = input.on_release(SwitchCode(1), 1_120);
/// assert_eq!(release.action, Some(SwitchAction::Select));
/// ```
#[derive(Clone, Debug, Default)]
pub struct SwitchInput {
    bindings: HashMap<SwitchCode, SwitchBinding>,
    timings: SwitchTimings,
    absorbed: Option<AbsorbedPress>,
    last_press: HashMap<SwitchCode, u64>,
    /// Codes whose next release belongs to a swallowed press.
    swallowed: HashSet<SwitchCode>,
}

impl SwitchInput {
    /// Create a machine with no bindings.
    pub fn new(timings: SwitchTimings) -> Self {
        Self {
            timings,
            ..Self::default()
        }
    }

    /// Current timings.
    pub fn timings(&self) -> SwitchTimings {
        self.timings
    }

    /// Replace the timings. A press in progress keeps its start time.
    pub fn set_timings(&mut self, timings: SwitchTimings) {
        self.timings = timings;
    }

    /// Add or replace a binding.
    pub fn bind(&mut self, binding: SwitchBinding) {
        self.bindings.insert(binding.code, binding);
    }

    /// Remove a binding, returning it.
    pub fn unbind(&mut self, code: SwitchCode) -> Option<SwitchBinding> {
        self.bindings.remove(&code)
    }

    /// Replace all bindings.
    pub fn set_bindings(&mut self, bindings: impl IntoIterator<Item = SwitchBinding>) {
        self.bindings.clear();
        for binding in bindings {
            self.bind(binding);
        }
    }

    /// The binding for `code`, if any.
    pub fn binding(&self, code: SwitchCode) -> Option<&SwitchBinding> {
        self.bindings.get(&code)
    }

    /// The press currently held, if any.
    pub fn absorbed_press(&self) -> Option<&AbsorbedPress> {
        self.absorbed.as_ref()
    }

    /// Forget any press in progress. Bindings and timings are kept.
    pub fn reset(&mut self) {
        self.absorbed = None;
        self.swallowed.clear();
        self.last_press.clear();
    }

    /// Record a switch press at `now` milliseconds.
    pub fn on_press(&mut self, code: SwitchCode, now: u64) -> PressOutcome {
        let Some(binding) = self.bindings.get(&code) else {
            tracing::debug!(?code, "press on unbound switch");
            return PressOutcome::default();
        };
        let swallowed = PressOutcome {
            absorbed: true,
            hold_timer: None,
        };

        if let Some(held) = &self.absorbed {
            if held.code != code {
                tracing::debug!(?code, held = ?held.code, "press while another switch is held");
                self.swallowed.insert(code);
            }
            return swallowed;
        }

        let delay = self.timings.ignore_repeat_delay_ms;
        if let Some(&last) = self.last_press.get(&code)
            && delay > 0
            && now.saturating_sub(last) < delay
        {
            tracing::debug!(?code, since = now.saturating_sub(last), "suppressing repeated press");
            self.swallowed.insert(code);
            return swallowed;
        }

        let wants_hold = !binding.hold.is_empty()
            || (binding.repeat_action().is_some() && self.timings.move_repeat_delay_ms > 0);
        self.last_press.insert(code, now);
        self.absorbed = Some(AbsorbedPress {
            code,
            pressed_at: now,
            hold_actions_fired: 0,
            repeats: 0,
        });
        PressOutcome {
            absorbed: true,
            hold_timer: wants_hold.then(|| Duration::from_millis(self.timings.hold_time_ms)),
        }
    }

    /// Record a switch release at `now` milliseconds.
    pub fn on_release(&mut self, code: SwitchCode, now: u64) -> ReleaseOutcome {
        if self.swallowed.remove(&code) {
            return ReleaseOutcome {
                absorbed: true,
                ..ReleaseOutcome::default()
            };
        }
        let press = match self.absorbed {
            Some(press) if press.code == code => press,
            _ => {
                tracing::debug!(?code, "release without a matching press");
                return ReleaseOutcome::default();
            }
        };
        self.absorbed = None;

        let action = if press.acted() {
            None
        } else {
            self.bindings.get(&code).map(|binding| {
                let held = now.saturating_sub(press.pressed_at);
                match binding.hold.first() {
                    Some(&first) if held >= self.timings.hold_time_ms => first,
                    _ => binding.press,
                }
            })
        };
        ReleaseOutcome {
            absorbed: true,
            action: action.filter(|a| *a != SwitchAction::None),
            cancel_hold: true,
        }
    }

    /// The hold timer armed by a previous outcome expired at `now`.
    pub fn on_hold_timer(&mut self, now: u64) -> HoldOutcome {
        let Some(press) = self.absorbed.as_mut() else {
            return HoldOutcome::default();
        };
        let Some(binding) = self.bindings.get(&press.code) else {
            return HoldOutcome::default();
        };
        let held = now.saturating_sub(press.pressed_at);
        let poll = Some(Duration::from_millis(HOLD_POLL_INTERVAL_MS));
        let repeat = binding
            .repeat_action()
            .filter(|_| self.timings.move_repeat_delay_ms > 0);
        let repeat_delay = Some(Duration::from_millis(self.timings.move_repeat_delay_ms));

        if press.hold_actions_fired < binding.hold.len() {
            let due = self
                .timings
                .hold_time_ms
                .saturating_mul(press.hold_actions_fired as u64 + 1);
            if held < due {
                return HoldOutcome {
                    action: None,
                    rearm: poll,
                };
            }
            let action = binding.hold[press.hold_actions_fired];
            press.hold_actions_fired += 1;
            tracing::debug!(code = ?press.code, ?action, "hold action");
            let rearm = if press.hold_actions_fired < binding.hold.len() {
                poll
            } else if repeat.is_some() {
                repeat_delay
            } else {
                None
            };
            return HoldOutcome {
                action: Some(action).filter(|a| *a != SwitchAction::None),
                rearm,
            };
        }

        match repeat {
            Some(action) => {
                press.repeats = press.repeats.saturating_add(1);
                HoldOutcome {
                    action: Some(action),
                    rearm: repeat_delay,
                }
            }
            None => HoldOutcome::default(),
        }
    }
}
