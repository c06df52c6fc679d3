// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Traversal state machine over a [`ScanLayout`].
//!
//! The navigator state is a tagged union rather than a bag of flags:
//!
//! - [`Scope`] says which container the cursor walks (all rows, one row, one
//!   item, one group, or the flattened list in sequential mode).
//! - [`Stop`] says where inside that scope the cursor sits: nothing yet
//!   ([`Stop::Armed`]), an element, or the escape stop past one of the edges.
//! - [`TraversalProgress`] is the only record of completed traversals. It is
//!   bumped exactly when the cursor wraps from one end of a scope to the other
//!   and cleared whenever the scope changes.
//!
//! In nested scopes, stepping past an edge lands on the escape stop first.
//! Stepping on in the same direction wraps to the opposite end; stepping back
//! returns to the edge element. The top scope never escapes: it wraps.
//!
//! A scope holding exactly one enterable child is never shown on its own: the
//! navigator descends through it, so a one-row layout is scanned item by item
//! from the start.

use crate::layout::ScanLayout;
use crate::types::TreeConfig;

/// Scan direction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Left to right, top to bottom. Escapes at the right/bottom edge.
    #[default]
    Forward,
    /// Right to left, bottom to top. Escapes at the left/top edge.
    Backward,
}

impl Direction {
    /// The opposite direction.
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// Edge of a scope an escape stop sits past.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Before the first element.
    Start,
    /// After the last element.
    End,
}

/// Container the cursor currently walks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Sequential mode: the flattened target list.
    Flat,
    /// Row/column mode: the list of rows.
    Top,
    /// Items of one row.
    Row {
        /// Row index.
        row: usize,
    },
    /// Targets (or groups, when grouped) of one item.
    Item {
        /// Row index.
        row: usize,
        /// Item index within the row.
        item: usize,
    },
    /// Targets of one group.
    Group {
        /// Row index.
        row: usize,
        /// Item index within the row.
        item: usize,
        /// Group index within the item.
        group: usize,
    },
}

impl Scope {
    /// Whether the scope is inside a row (and therefore has an escape stop).
    pub fn is_nested(self) -> bool {
        matches!(self, Self::Row { .. } | Self::Item { .. } | Self::Group { .. })
    }

    /// The enclosing scope and this scope's index within it.
    pub fn parent(self) -> Option<(Self, usize)> {
        match self {
            Self::Flat | Self::Top => None,
            Self::Row { row } => Some((Self::Top, row)),
            Self::Item { row, item } => Some((Self::Row { row }, item)),
            Self::Group { row, item, group } => Some((Self::Item { row, item }, group)),
        }
    }
}

/// Cursor position inside the current scope.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stop {
    /// Scanning is armed but nothing is highlighted yet.
    Armed,
    /// An element of the scope.
    At(usize),
    /// The "leave this scope" stop past an edge.
    Escape(Edge),
}

/// Completed traversals of the current scope.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TraversalProgress {
    cycles: u32,
}

impl TraversalProgress {
    /// Number of wraps since the scope was entered or the navigator reset.
    pub fn cycles(self) -> u32 {
        self.cycles
    }

    fn record_wrap(&mut self) {
        self.cycles = self.cycles.saturating_add(1);
    }
}

/// Result of a step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Advance {
    /// The scope is empty; nothing moved.
    Empty,
    /// Moved to a neighbouring element (or off [`Stop::Armed`]).
    Moved,
    /// Wrapped to the opposite end, completing a traversal.
    Wrapped,
    /// Moved onto the escape stop.
    Escaping,
    /// Left the escape stop back onto the edge element.
    Resumed,
}

/// Whether auto scanning may continue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CycleVerdict {
    /// Keep scanning.
    Continue,
    /// The cycle limit is reached.
    Stop,
}

/// Snapshot of the traversal state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NavigatorState {
    scope: Scope,
    stop: Stop,
    direction: Direction,
    progress: TraversalProgress,
}

impl NavigatorState {
    /// Current scope.
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Current stop.
    pub fn stop(&self) -> Stop {
        self.stop
    }

    /// Current scan direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Traversal progress of the current scope.
    pub fn progress(&self) -> TraversalProgress {
        self.progress
    }

    /// Completed traversals of the current scope.
    pub fn cycle_count(&self) -> u32 {
        self.progress.cycles
    }

    /// Row under the cursor (the highlighted row, or the row being walked).
    pub fn current_row(&self) -> Option<usize> {
        match (self.scope, self.stop) {
            (Scope::Top, Stop::At(row)) => Some(row),
            (Scope::Row { row } | Scope::Item { row, .. } | Scope::Group { row, .. }, _) => {
                Some(row)
            }
            _ => None,
        }
    }

    /// Group under the cursor, when walking a grouped item or inside a group.
    pub fn current_group(&self, layout: &ScanLayout) -> Option<usize> {
        match (self.scope, self.stop) {
            (Scope::Group { group, .. }, _) => Some(group),
            (Scope::Item { row, item }, Stop::At(group)) => layout
                .item(row, item)
                .filter(|it| it.is_grouped())
                .map(|_| group),
            _ => None,
        }
    }

    /// Column under the cursor: an item inside a row, a target inside an item
    /// or group, or the flattened index in sequential mode.
    pub fn current_column(&self) -> Option<usize> {
        match (self.scope, self.stop) {
            (Scope::Top, _) | (_, Stop::Armed | Stop::Escape(_)) => None,
            (_, Stop::At(column)) => Some(column),
        }
    }

    /// Whether the cursor walks inside a row.
    pub fn is_in_row(&self) -> bool {
        self.scope.is_nested()
    }

    /// Whether the cursor walks inside an item.
    pub fn is_in_item(&self) -> bool {
        matches!(self.scope, Scope::Item { .. } | Scope::Group { .. })
    }

    /// Whether the cursor walks inside a group.
    pub fn is_in_group(&self) -> bool {
        matches!(self.scope, Scope::Group { .. })
    }

    /// Whether the cursor sits on the escape stop.
    pub fn is_escaping(&self) -> bool {
        matches!(self.stop, Stop::Escape(_))
    }

    /// Whether scanning is armed with nothing highlighted.
    pub fn is_armed(&self) -> bool {
        self.stop == Stop::Armed
    }
}

/// Pure state transitions over a [`ScanLayout`].
///
/// Every operation takes the layout it should be interpreted against and
/// checks bounds; on an empty layout or a stale index it does nothing.
///
/// ## Example
///
/// ```rust
/// use understory_scan_tree::{Navigator, Target, TreeConfig, build_layout};
///
/// let config = TreeConfig::default();
/// let targets: Vec<_> = (0..3)
///     .map(|i| Target::from_xywh(i, i as f64 * 100.0, 0.0, 20.0, 20.0))
///     .collect();
/// let layout = build_layout(&targets, &config);
///
/// let mut nav = Navigator::new(&layout, &config);
/// // One row: scanning starts inside it.
/// assert!(nav.state().is_in_row());
/// nav.move_next(&layout);
/// nav.move_next(&layout);
/// assert_eq!(nav.state().current_column(), Some(1));
/// ```
#[derive(Clone, Debug)]
pub struct Navigator {
    state: NavigatorState,
}

impl Navigator {
    /// Create a navigator in the initial state for `layout`.
    pub fn new(layout: &ScanLayout, config: &TreeConfig) -> Self {
        let mut nav = Self {
            state: NavigatorState {
                scope: Scope::Top,
                stop: Stop::Armed,
                direction: Direction::Forward,
                progress: TraversalProgress::default(),
            },
        };
        nav.reset(layout, config);
        nav
    }

    /// Current state.
    pub fn state(&self) -> &NavigatorState {
        &self.state
    }

    /// Return to the initial state. The scan direction is kept.
    pub fn reset(&mut self, layout: &ScanLayout, config: &TreeConfig) {
        self.state.scope = if config.row_column {
            Scope::Top
        } else {
            Scope::Flat
        };
        self.settle(layout);
        self.state.stop = Stop::Armed;
        self.state.progress = TraversalProgress::default();
    }

    /// Keep the state if it is still meaningful for `layout`, otherwise reset.
    ///
    /// Returns whether the state was kept.
    pub fn revalidate(&mut self, layout: &ScanLayout, config: &TreeConfig) -> bool {
        let scope_ok = match self.state.scope {
            Scope::Flat => !config.row_column,
            Scope::Top => config.row_column,
            Scope::Row { row } => config.row_column && layout.row(row).is_some(),
            Scope::Item { row, item } => {
                config.row_column && layout.item(row, item).is_some_and(|it| !it.is_single())
            }
            Scope::Group { row, item, group } => {
                config.row_column
                    && layout
                        .group(row, item, group)
                        .is_some_and(|g| g.targets.len() > 1)
            }
        };
        let stop_ok = match self.state.stop {
            Stop::At(i) => i < child_count(self.state.scope, layout),
            Stop::Armed | Stop::Escape(_) => true,
        };
        if scope_ok && stop_ok {
            true
        } else {
            tracing::debug!(state = ?self.state, "navigator state no longer valid, resetting");
            self.reset(layout, config);
            false
        }
    }

    /// Number of elements in the current scope.
    pub fn child_count(&self, layout: &ScanLayout) -> usize {
        child_count(self.state.scope, layout)
    }

    /// Step forward.
    pub fn move_next(&mut self, layout: &ScanLayout) -> Advance {
        self.step(Direction::Forward, layout)
    }

    /// Step backward.
    pub fn move_previous(&mut self, layout: &ScanLayout) -> Advance {
        self.step(Direction::Backward, layout)
    }

    /// Step in the current scan direction (an auto-scan tick).
    pub fn advance(&mut self, layout: &ScanLayout) -> Advance {
        self.step(self.state.direction, layout)
    }

    fn step(&mut self, direction: Direction, layout: &ScanLayout) -> Advance {
        let n = self.child_count(layout);
        if n == 0 {
            return Advance::Empty;
        }
        let nested = self.state.scope.is_nested();
        let stop = match self.state.stop {
            Stop::At(i) if i >= n => Stop::Armed,
            other => other,
        };
        let last = n - 1;
        let (next, advance) = match (stop, direction) {
            (Stop::Armed, Direction::Forward) => (Stop::At(0), Advance::Moved),
            (Stop::Armed, Direction::Backward) => (Stop::At(last), Advance::Moved),
            (Stop::At(i), Direction::Forward) if i < last => (Stop::At(i + 1), Advance::Moved),
            (Stop::At(i), Direction::Backward) if i > 0 => (Stop::At(i - 1), Advance::Moved),
            (Stop::At(_), Direction::Forward) if nested => {
                (Stop::Escape(Edge::End), Advance::Escaping)
            }
            (Stop::At(_), Direction::Backward) if nested => {
                (Stop::Escape(Edge::Start), Advance::Escaping)
            }
            (Stop::At(_), Direction::Forward) => (Stop::At(0), Advance::Wrapped),
            (Stop::At(_), Direction::Backward) => (Stop::At(last), Advance::Wrapped),
            (Stop::Escape(Edge::End), Direction::Forward) => (Stop::At(0), Advance::Wrapped),
            (Stop::Escape(Edge::End), Direction::Backward) => (Stop::At(last), Advance::Resumed),
            (Stop::Escape(Edge::Start), Direction::Forward) => (Stop::At(0), Advance::Resumed),
            (Stop::Escape(Edge::Start), Direction::Backward) => {
                (Stop::At(last), Advance::Wrapped)
            }
        };
        if advance == Advance::Wrapped {
            self.state.progress.record_wrap();
        }
        self.state.stop = next;
        advance
    }

    /// Leave the current scope from the escape stop.
    ///
    /// The cursor lands on the element that was just left. Scopes that were
    /// only entered because they had a single child are left as well; if no
    /// ancestor has more than one element the navigator re-arms in place.
    /// Returns `false` (and does nothing) unless the cursor is on an escape stop.
    pub fn confirm_escape(&mut self, layout: &ScanLayout) -> bool {
        if !self.state.is_escaping() {
            return false;
        }
        let mut scope = self.state.scope;
        let mut stop = Stop::Armed;
        while let Some((parent, index)) = scope.parent() {
            scope = parent;
            stop = Stop::At(index);
            if child_count(parent, layout) > 1 {
                break;
            }
        }
        if child_count(scope, layout) > 1 {
            self.state.scope = scope;
            self.state.stop = stop;
        } else {
            self.state.scope = scope;
            self.settle(layout);
            self.state.stop = Stop::Armed;
        }
        self.state.progress = TraversalProgress::default();
        true
    }

    /// Cancel the escape stop and resume at the edge element it sits past.
    pub fn deny_escape(&mut self, layout: &ScanLayout) -> bool {
        let Stop::Escape(edge) = self.state.stop else {
            return false;
        };
        let n = self.child_count(layout);
        if n == 0 {
            return false;
        }
        self.state.stop = match edge {
            Edge::Start => Stop::At(0),
            Edge::End => Stop::At(n - 1),
        };
        true
    }

    /// Descend from the row list into `row`.
    pub fn enter_row(&mut self, row: usize, layout: &ScanLayout) -> bool {
        if self.state.scope != Scope::Top || layout.row(row).is_none() {
            return false;
        }
        self.descend(Scope::Row { row }, layout);
        true
    }

    /// Descend from a row into one of its multi-target items.
    pub fn enter_item(&mut self, item: usize, layout: &ScanLayout) -> bool {
        let Scope::Row { row } = self.state.scope else {
            return false;
        };
        if !layout.item(row, item).is_some_and(|it| !it.is_single()) {
            return false;
        }
        self.descend(Scope::Item { row, item }, layout);
        true
    }

    /// Descend from a grouped item into one of its multi-target groups.
    pub fn select_group(&mut self, group: usize, layout: &ScanLayout) -> bool {
        let Scope::Item { row, item } = self.state.scope else {
            return false;
        };
        if !layout
            .group(row, item, group)
            .is_some_and(|g| g.targets.len() > 1)
        {
            return false;
        }
        self.descend(Scope::Group { row, item, group }, layout);
        true
    }

    /// Decide whether auto scanning may continue. A `limit` of zero never stops.
    pub fn handle_cycles(&self, limit: u32) -> CycleVerdict {
        if limit > 0 && self.state.progress.cycles >= limit {
            CycleVerdict::Stop
        } else {
            CycleVerdict::Continue
        }
    }

    /// Toggle the scan direction without moving.
    pub fn swap_scan_direction(&mut self) {
        self.state.direction = self.state.direction.reversed();
    }

    /// Set the scan direction without moving.
    pub fn set_direction(&mut self, direction: Direction) {
        self.state.direction = direction;
    }

    fn descend(&mut self, scope: Scope, layout: &ScanLayout) {
        self.state.scope = scope;
        self.settle(layout);
        let n = self.child_count(layout);
        self.state.stop = match (n, self.state.direction) {
            (0, _) => Stop::Armed,
            (_, Direction::Forward) => Stop::At(0),
            (_, Direction::Backward) => Stop::At(n - 1),
        };
        self.state.progress = TraversalProgress::default();
    }

    fn settle(&mut self, layout: &ScanLayout) {
        while child_count(self.state.scope, layout) == 1 {
            match enterable_first_child(self.state.scope, layout) {
                Some(child) => self.state.scope = child,
                None => break,
            }
        }
    }
}

fn child_count(scope: Scope, layout: &ScanLayout) -> usize {
    match scope {
        Scope::Flat => layout.flat.len(),
        Scope::Top => layout.rows.len(),
        Scope::Row { row } => layout.row(row).map_or(0, |r| r.items.len()),
        Scope::Item { row, item } => layout.item(row, item).map_or(0, |it| it.child_count()),
        Scope::Group { row, item, group } => layout
            .group(row, item, group)
            .map_or(0, |g| g.targets.len()),
    }
}

fn enterable_first_child(scope: Scope, layout: &ScanLayout) -> Option<Scope> {
    match scope {
        Scope::Flat | Scope::Group { .. } => None,
        Scope::Top => {
            let row = layout.row(0)?;
            let only_single = row.items.len() == 1 && row.items[0].is_single();
            (!only_single).then_some(Scope::Row { row: 0 })
        }
        Scope::Row { row } => {
            let item = layout.item(row, 0)?;
            (!item.is_single()).then_some(Scope::Item { row, item: 0 })
        }
        Scope::Item { row, item } => {
            let group = layout.group(row, item, 0)?;
            (group.targets.len() > 1).then_some(Scope::Group { row, item, group: 0 })
        }
    }
}
