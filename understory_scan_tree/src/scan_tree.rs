// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session facade tying the builder, navigator, selector, and highlight
//! together.

use alloc::vec::Vec;

use crate::builder::build_layout;
use crate::highlight::{Highlight, highlight_for};
use crate::layout::ScanLayout;
use crate::navigator::{Advance, CycleVerdict, Direction, Navigator, NavigatorState, Stop};
use crate::selector::{Selection, select};
use crate::types::{Target, TargetId, TreeConfig};

/// How to treat navigator state across a target list refresh.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Rebuild {
    /// Start over from the initial state.
    #[default]
    Reset,
    /// Keep the current position if it still exists in the new layout.
    Preserve,
}

/// Result of an auto-scan tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, or nothing to scan.
    Idle,
    /// The cursor moved.
    Advanced(Advance),
    /// The cycle limit was reached and the session stopped.
    CycleLimitReached,
}

/// Result of a select press.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Nothing was highlighted.
    Nothing,
    /// The cursor descended into or escaped out of a scope.
    Navigated,
    /// A target was chosen; the navigator has been reset.
    Activated(TargetId),
}

/// A scanning session over one target list.
///
/// The tree owns no timers: callers drive [`ScanTree::tick`] from their
/// scheduler, or step manually with [`ScanTree::move_next`] and
/// [`ScanTree::move_previous`].
///
/// ## Example
///
/// ```rust
/// use understory_scan_tree::{Rebuild, ScanTree, SelectOutcome, Target, TargetId, TreeConfig};
///
/// let mut tree = ScanTree::new(TreeConfig::default());
/// let targets = (0..3)
///     .map(|i| Target::from_xywh(i, i as f64 * 100.0, 0.0, 20.0, 20.0))
///     .collect();
/// tree.set_targets(targets, Rebuild::Reset);
///
/// tree.start();
/// assert_eq!(tree.select(), SelectOutcome::Nothing);
/// tree.move_next();
/// tree.move_next();
/// assert_eq!(tree.select(), SelectOutcome::Activated(TargetId(1)));
/// ```
#[derive(Clone, Debug)]
pub struct ScanTree {
    config: TreeConfig,
    targets: Vec<Target>,
    layout: ScanLayout,
    navigator: Navigator,
    running: bool,
}

impl ScanTree {
    /// Create an empty, stopped session.
    pub fn new(config: TreeConfig) -> Self {
        let layout = ScanLayout::empty();
        let navigator = Navigator::new(&layout, &config);
        Self {
            config,
            targets: Vec::new(),
            layout,
            navigator,
            running: false,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Replace the configuration, rebuilding the layout and resetting.
    pub fn set_config(&mut self, config: TreeConfig) {
        self.config = config;
        self.layout = build_layout(&self.targets, &self.config);
        self.navigator.reset(&self.layout, &self.config);
    }

    /// Replace the target list. The layout is rebuilt wholesale.
    pub fn set_targets(&mut self, targets: Vec<Target>, mode: Rebuild) {
        self.layout = build_layout(&targets, &self.config);
        self.targets = targets;
        match mode {
            Rebuild::Reset => self.navigator.reset(&self.layout, &self.config),
            Rebuild::Preserve => {
                self.navigator.revalidate(&self.layout, &self.config);
            }
        }
        tracing::debug!(
            targets = self.layout.flat().len(),
            rows = self.layout.rows().len(),
            ?mode,
            "scan targets replaced"
        );
    }

    /// Current layout.
    pub fn layout(&self) -> &ScanLayout {
        &self.layout
    }

    /// Current navigator state.
    pub fn state(&self) -> &NavigatorState {
        self.navigator.state()
    }

    /// Number of elements in the scope being walked.
    pub fn child_count(&self) -> usize {
        self.navigator.child_count(&self.layout)
    }

    /// Whether the cursor sits on the element a traversal of the current
    /// scope starts from.
    pub fn is_on_first_element(&self) -> bool {
        let n = self.child_count();
        let first = match self.direction() {
            Direction::Forward => 0,
            Direction::Backward => n.saturating_sub(1),
        };
        n > 0 && self.state().stop() == Stop::At(first)
    }

    /// Whether there is nothing to scan.
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// Whether the session is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start the session from the initial state. Does nothing if running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.navigator.reset(&self.layout, &self.config);
        self.running = true;
    }

    /// Stop the session and clear the highlight. Safe to call in any state.
    pub fn stop(&mut self) {
        self.running = false;
        self.navigator.reset(&self.layout, &self.config);
    }

    /// Advance one step in the scan direction.
    ///
    /// Stops the session when the configured cycle limit is reached.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }
        let advance = self.navigator.advance(&self.layout);
        if advance == Advance::Empty {
            return TickOutcome::Idle;
        }
        if self.navigator.handle_cycles(self.config.cycle_limit) == CycleVerdict::Stop {
            tracing::debug!(limit = self.config.cycle_limit, "cycle limit reached");
            self.stop();
            return TickOutcome::CycleLimitReached;
        }
        TickOutcome::Advanced(advance)
    }

    /// Step forward.
    pub fn move_next(&mut self) -> Advance {
        self.navigator.move_next(&self.layout)
    }

    /// Step backward.
    pub fn move_previous(&mut self) -> Advance {
        self.navigator.move_previous(&self.layout)
    }

    /// Reverse the scan direction without moving.
    pub fn swap_direction(&mut self) {
        self.navigator.swap_scan_direction();
    }

    /// Current scan direction.
    pub fn direction(&self) -> Direction {
        self.navigator.state().direction()
    }

    /// Act on the highlighted element.
    pub fn select(&mut self) -> SelectOutcome {
        let layout = &self.layout;
        let selection = select(self.navigator.state(), layout);
        let navigated = match selection {
            Selection::Nothing => return SelectOutcome::Nothing,
            Selection::Activate(id) => {
                self.navigator.reset(layout, &self.config);
                return SelectOutcome::Activated(id);
            }
            Selection::EnterRow(row) => self.navigator.enter_row(row, layout),
            Selection::EnterItem(item) => self.navigator.enter_item(item, layout),
            Selection::EnterGroup(group) => self.navigator.select_group(group, layout),
            Selection::Escape => self.navigator.confirm_escape(layout),
        };
        if navigated {
            SelectOutcome::Navigated
        } else {
            SelectOutcome::Nothing
        }
    }

    /// What should currently be drawn.
    pub fn highlight(&self) -> Option<Highlight> {
        highlight_for(self.navigator.state(), &self.layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::Scope;
    use crate::types::GroupKey;
    use alloc::vec;
    use rstest::rstest;

    fn grid(rows: u64, cols: u64) -> Vec<Target> {
        let mut out = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                out.push(Target::from_xywh(
                    r * 10 + c,
                    c as f64 * 100.0,
                    r as f64 * 100.0,
                    20.0,
                    20.0,
                ));
            }
        }
        out
    }

    fn session(rows: u64, cols: u64, config: TreeConfig) -> ScanTree {
        let mut tree = ScanTree::new(config);
        tree.set_targets(grid(rows, cols), Rebuild::Reset);
        tree
    }

    #[test]
    fn manual_single_row_select_next_next_select() {
        let mut tree = session(1, 3, TreeConfig::default());
        tree.start();
        assert_eq!(tree.select(), SelectOutcome::Nothing);
        tree.move_next();
        tree.move_next();
        assert_eq!(tree.select(), SelectOutcome::Activated(TargetId(1)));
        assert!(tree.state().is_armed());
    }

    #[test]
    fn enter_row_then_activate() {
        let mut tree = session(2, 3, TreeConfig::default());
        tree.start();
        tree.move_next();
        tree.move_next();
        assert_eq!(tree.select(), SelectOutcome::Navigated);
        assert_eq!(tree.state().scope(), Scope::Row { row: 1 });
        tree.move_next();
        assert_eq!(tree.select(), SelectOutcome::Activated(TargetId(11)));
    }

    #[test]
    fn escape_then_select_returns_to_rows() {
        let mut tree = session(2, 2, TreeConfig::default());
        tree.start();
        tree.move_next();
        tree.select();
        tree.move_previous();
        assert!(tree.state().is_escaping());
        assert_eq!(tree.select(), SelectOutcome::Navigated);
        assert_eq!(tree.state().scope(), Scope::Top);
        assert_eq!(tree.state().current_row(), Some(0));
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    fn auto_scan_stops_after_cycle_limit(#[case] limit: u32) {
        let config = TreeConfig {
            cycle_limit: limit,
            ..TreeConfig::default()
        };
        let rows = 3;
        let mut tree = session(rows, 2, config);
        tree.start();
        let mut ticks: u64 = 0;
        loop {
            ticks += 1;
            match tree.tick() {
                TickOutcome::Advanced(_) => {}
                TickOutcome::CycleLimitReached => break,
                TickOutcome::Idle => panic!("idle while running"),
            }
            assert!(ticks < 100, "never stopped");
        }
        // Each traversal visits every row; the wrap that completes the
        // N-th traversal is the stopping tick.
        assert_eq!(ticks, rows * u64::from(limit) + 1);
        assert!(!tree.is_running());
        assert_eq!(tree.tick(), TickOutcome::Idle);
        assert_eq!(tree.highlight(), None);
    }

    #[test]
    fn zero_cycle_limit_scans_forever() {
        let config = TreeConfig {
            cycle_limit: 0,
            ..TreeConfig::default()
        };
        let mut tree = session(2, 2, config);
        tree.start();
        for _ in 0..50 {
            assert!(matches!(tree.tick(), TickOutcome::Advanced(_)));
        }
    }

    #[test]
    fn empty_tree_is_idle() {
        let mut tree = ScanTree::new(TreeConfig::default());
        tree.start();
        assert!(tree.is_empty());
        assert_eq!(tree.tick(), TickOutcome::Idle);
        assert_eq!(tree.select(), SelectOutcome::Nothing);
        assert_eq!(tree.move_next(), Advance::Empty);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut tree = session(2, 2, TreeConfig::default());
        tree.stop();
        tree.start();
        tree.tick();
        tree.stop();
        tree.stop();
        assert!(!tree.is_running());
        assert!(tree.state().is_armed());
    }

    #[test]
    fn preserve_keeps_position_when_still_valid() {
        let mut tree = session(3, 3, TreeConfig::default());
        tree.start();
        tree.move_next();
        tree.move_next();
        tree.set_targets(grid(3, 4), Rebuild::Preserve);
        assert_eq!(tree.state().current_row(), Some(1));

        tree.set_targets(grid(1, 1), Rebuild::Preserve);
        assert!(tree.state().is_armed());
    }

    #[test]
    fn sequential_config_activates_in_reading_order() {
        let config = TreeConfig {
            row_column: false,
            ..TreeConfig::default()
        };
        let mut tree = session(2, 2, config);
        tree.start();
        for _ in 0..3 {
            tree.tick();
        }
        assert_eq!(tree.select(), SelectOutcome::Activated(TargetId(10)));
    }

    #[test]
    fn set_config_rebuilds_existing_targets() {
        let mut tree = session(2, 2, TreeConfig::default());
        assert_eq!(tree.state().scope(), Scope::Top);
        tree.set_config(TreeConfig {
            row_column: false,
            ..TreeConfig::default()
        });
        assert_eq!(tree.state().scope(), Scope::Flat);
        assert_eq!(tree.layout().flat().len(), 4);
    }

    #[test]
    fn grouped_item_enters_group_then_activates() {
        let (a, b) = (GroupKey(7), GroupKey(8));
        let targets = vec![
            Target::from_xywh(1, 0.0, 0.0, 20.0, 20.0).with_group(a),
            Target::from_xywh(2, 30.0, 0.0, 20.0, 20.0).with_group(a),
            Target::from_xywh(3, 60.0, 0.0, 20.0, 20.0).with_group(b),
            Target::from_xywh(4, 90.0, 0.0, 20.0, 20.0).with_group(b),
        ];
        let mut tree = ScanTree::new(TreeConfig {
            grouping: true,
            ..TreeConfig::default()
        });
        tree.set_targets(targets, Rebuild::Reset);
        tree.start();
        assert_eq!(tree.state().scope(), Scope::Item { row: 0, item: 0 });

        tree.move_next();
        assert_eq!(tree.select(), SelectOutcome::Navigated);
        assert_eq!(
            tree.state().scope(),
            Scope::Group {
                row: 0,
                item: 0,
                group: 0
            }
        );
        assert_eq!(tree.state().current_column(), Some(0));

        tree.move_next();
        assert_eq!(tree.select(), SelectOutcome::Activated(TargetId(2)));
    }
}
