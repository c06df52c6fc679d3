// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Scan Timer: restartable timer slots for switch scanning.
//!
//! A scanning session needs a handful of independent timers: the periodic
//! scan tick, a switch hold timer, an auto-select confirmation delay, and a
//! watchdog. This crate models each of them as a [`TimerSlot`] inside a single
//! [`Scheduler`].
//!
//! - Timers never call back into the engine. A [`TimerBackend`] posts a
//!   [`TimerEvent`] into a queue, and whoever owns the engine drains that queue
//!   on its own thread.
//! - Every arm carries a fresh generation. [`Scheduler::accept`] rejects events
//!   from an earlier arm, so a tick that was already in flight when the slot
//!   was stopped, paused, or restarted is dropped instead of acted upon.
//! - Misuse is idempotent: starting a running slot or stopping a stopped one is
//!   a no-op.
//! - Pausing discards the partial interval. [`Scheduler::resume`] arms a fresh
//!   full interval so a paused scan never "catches up".
//!
//! Two backends are provided:
//! - [`backends::ThreadBackend`]: one sleeper thread per armed slot, delivering
//!   events through a `crossbeam_channel`.
//! - [`backends::ManualBackend`]: records armed slots and lets the caller fire
//!   them explicitly, for tests and hosts that drive time themselves.
//!
//! ## Minimal example
//!
//! ```rust
//! use core::time::Duration;
//! use understory_scan_timer::{Scheduler, TimerSlot, backends::ManualBackend};
//!
//! let mut scheduler = Scheduler::new(ManualBackend::default());
//! scheduler.start(TimerSlot::Scan, Duration::from_millis(1000));
//!
//! let tick = scheduler.backend_mut().fire(TimerSlot::Scan).unwrap();
//! assert!(scheduler.accept(&tick));
//!
//! // After stopping, an event from the old arm is stale.
//! scheduler.stop(TimerSlot::Scan);
//! assert!(!scheduler.accept(&tick));
//! ```

mod backend;
pub mod backends;
mod scheduler;
mod types;

pub use backend::TimerBackend;
pub use scheduler::Scheduler;
pub use types::{TimerEvent, TimerSlot};
