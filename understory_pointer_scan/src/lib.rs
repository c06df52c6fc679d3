// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Pointer Scan: coordinate-based switch scanning.
//!
//! Item scanning needs the screen to expose its targets. When it does not, or
//! when the user prefers it, these engines pick an arbitrary screen point
//! instead:
//!
//! - [`CursorEngine`]: axis sweep. A quarter-screen band, then a thin line,
//!   first across x and then across y. Four selections fix a point.
//! - [`RadarEngine`]: a ray rotates around the screen centre, then a marker
//!   slides along it. Two selections fix a point.
//!
//! Both are pure state machines with the same command surface as item
//! scanning (`start`, `stop`, `tick`, `move_next`, `move_previous`,
//! `swap_direction`, `select`). A fixed point is either tapped straight away
//! or, with a confirmation delay configured, held in a confirming phase where
//! a second select asks for the context menu instead. Timers are the caller's
//! business; the engines only report which interval they want.
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for dependencies such as `kurbo`.
//! - `libm`: enables `no_std` + `alloc` builds that rely on `libm` for floating-point math.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod cursor;
mod outcome;
pub mod radar;

pub use cursor::{CursorConfig, CursorEngine, CursorPhase};
pub use outcome::{PointOutcome, PointerHighlight, SweepDirection};
pub use radar::{RadarConfig, RadarEngine, RadarPhase};
