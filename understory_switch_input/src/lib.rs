// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Switch Input: binary switches to scanning commands.
//!
//! Accessibility switches are one-bit devices, often mechanically noisy and
//! operated with limited motor control. This crate turns their raw press and
//! release events into [`SwitchAction`]s:
//!
//! - A short press performs the binding's press action on release.
//! - Holding walks the binding's hold actions, each due one hold time after
//!   the previous one.
//! - A held movement switch (`Next`/`Previous`) can auto-repeat.
//! - Presses arriving within the ignore-repeat window of the previous press
//!   are treated as contact bounce and swallowed together with their release.
//!
//! [`SwitchInput`] is a pure state machine in the style of Understory's event
//! state helpers: callers pass millisecond timestamps in and get outcomes back,
//! including which hold timer to arm or cancel.
//!
//! Every event reports whether it was absorbed. Events on unbound switches are
//! not, so the host can pass ordinary keys through to the platform.
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `serde` and `tracing`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod action;
mod binding;
mod input;

pub use action::{SwitchAction, SystemAction};
pub use binding::{SwitchBinding, SwitchCode, SwitchTimings};
pub use input::{
    AbsorbedPress, HOLD_POLL_INTERVAL_MS, HoldOutcome, PressOutcome, ReleaseOutcome, SwitchInput,
};
