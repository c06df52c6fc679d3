// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Scan Tree: the row/item/group hierarchy behind switch scanning.
//!
//! A switch user cannot point. Instead, the engine highlights regions of the
//! screen one after another and the user presses a switch when the wanted
//! region is lit. This crate turns a flat list of on-screen [`Target`]s into a
//! hierarchy that keeps the number of presses low, and walks it.
//!
//! - [`build_layout`] clusters targets into rows by vertical centre, rows into
//!   items by horizontal gap, and (optionally) items into groups by
//!   [`GroupKey`]. The result is a [`ScanLayout`]; it is rebuilt wholesale on
//!   every target change.
//! - [`Navigator`] is a pure state machine over a layout. Its state is a
//!   [`Scope`] plus a [`Stop`]; nested scopes have an escape stop past each
//!   edge so the user can always back out of a row without walking all of it.
//! - [`select`] maps the current state to a [`Selection`]: descend, escape, or
//!   activate. Containers holding a single target are never entered.
//! - [`ScanTree`] bundles the three into a session with start/stop/tick and
//!   reports what to draw through [`Highlight`].
//!
//! Nothing here owns a timer or talks to the platform. Empty layouts and stale
//! indices are not errors: every operation degrades to doing nothing.
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_scan_tree::{
//!     HighlightKind, Rebuild, ScanTree, SelectOutcome, Target, TargetId, TickOutcome, TreeConfig,
//! };
//!
//! let mut tree = ScanTree::new(TreeConfig::default());
//! tree.set_targets(
//!     vec![
//!         Target::from_xywh(1, 0.0, 0.0, 40.0, 40.0),
//!         Target::from_xywh(2, 100.0, 0.0, 40.0, 40.0),
//!         Target::from_xywh(3, 0.0, 100.0, 40.0, 40.0),
//!     ],
//!     Rebuild::Reset,
//! );
//! tree.start();
//!
//! // The first tick lights the first row.
//! assert!(matches!(tree.tick(), TickOutcome::Advanced(_)));
//! assert_eq!(tree.highlight().map(|h| h.kind), Some(HighlightKind::Row));
//!
//! // Selecting it descends; the first item is lit straight away.
//! assert_eq!(tree.select(), SelectOutcome::Navigated);
//! assert_eq!(tree.select(), SelectOutcome::Activated(TargetId(1)));
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for dependencies such as `kurbo`.
//! - `libm`: enables `no_std` + `alloc` builds that rely on `libm` for floating-point math.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod builder;
mod highlight;
mod layout;
mod navigator;
mod scan_tree;
mod selector;
mod types;

pub use builder::build_layout;
pub use highlight::{Highlight, HighlightKind, highlight_for};
pub use layout::{ScanGroup, ScanItem, ScanLayout, ScanRow};
pub use navigator::{
    Advance, CycleVerdict, Direction, Edge, Navigator, NavigatorState, Scope, Stop,
    TraversalProgress,
};
pub use scan_tree::{Rebuild, ScanTree, SelectOutcome, TickOutcome};
pub use selector::{Selection, select};
pub use types::{GroupKey, Target, TargetId, TreeConfig};
