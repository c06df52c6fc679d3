// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Scan: a switch-access scanning engine.
//!
//! This crate composes the scanning building blocks into one engine a host
//! can drive:
//!
//! - [`ScanSettings`] are the user's preferences, loadable from JSON with
//!   every field defaulted, and validated before use.
//! - [`EngineContext`] owns item scanning (`understory_scan_tree`), cursor and
//!   radar point scanning (`understory_pointer_scan`), switch interpretation
//!   (`understory_switch_input`), and a timer [`Scheduler`](understory_scan_timer::Scheduler).
//!   It decides what a switch action means for the active [`ScanMethod`].
//! - [`ActivationSink`] and [`HighlightSink`] are the host's side: the engine
//!   reports what to activate and what to draw, and never touches the platform
//!   itself. Sink failures are logged and do not disturb scanning.
//! - [`run_loop`] multiplexes host [`EngineEvent`]s and timer events on one
//!   thread, so every mutation of the engine happens in one place.
//!
//! ## Running a session
//!
//! ```rust,no_run
//! use kurbo::Rect;
//! use understory_scan::{
//!     Activation, EngineContext, EngineEvent, NullSink, ScanSettings, monotonic_clock, run_loop,
//! };
//! use understory_scan_timer::backends::ThreadBackend;
//!
//! let (backend, timers) = ThreadBackend::channel();
//! let (activations, _activated) = crossbeam_channel::unbounded::<Activation>();
//! let engine = EngineContext::new(
//!     ScanSettings::default(),
//!     Rect::new(0.0, 0.0, 1080.0, 1920.0),
//!     activations,
//!     NullSink,
//!     backend,
//! )
//! .unwrap();
//!
//! let (events, inbox) = crossbeam_channel::unbounded();
//! let worker = std::thread::spawn(move || run_loop(engine, &inbox, &timers, monotonic_clock()));
//! events.send(EngineEvent::Start).unwrap();
//! events.send(EngineEvent::Shutdown).unwrap();
//! worker.join().unwrap();
//! ```
//!
//! Hosts with their own event loop can skip [`run_loop`] and call
//! [`EngineContext::handle_timer`] and the switch handlers directly.

mod context;
mod error;
mod run_loop;
mod settings;
mod sinks;

pub use context::{EngineContext, WATCHDOG_TIMEOUT};
pub use error::{SettingsError, SinkError};
pub use run_loop::{EngineEvent, monotonic_clock, run_loop};
pub use settings::{ScanMethod, ScanMode, ScanSettings};
pub use sinks::{
    Activation, ActivationSink, HighlightChange, HighlightScope, HighlightSink, NullSink,
};
