// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The built scan hierarchy: rows of items, items of targets or groups.

use alloc::vec::Vec;

use kurbo::Rect;
use smallvec::SmallVec;

use crate::types::{GroupKey, Target};

/// Targets of one item that share a [`GroupKey`].
#[derive(Clone, Debug, PartialEq)]
pub struct ScanGroup {
    pub(crate) key: Option<GroupKey>,
    pub(crate) targets: SmallVec<[Target; 4]>,
}

impl ScanGroup {
    /// Grouping key shared by the targets, or `None` for a singleton group of
    /// an unkeyed target.
    pub fn key(&self) -> Option<GroupKey> {
        self.key
    }

    /// Targets in left-to-right order.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Union of the targets' bounds.
    pub fn bounds(&self) -> Rect {
        union_bounds(&self.targets)
    }
}

/// A single scan stop inside a row.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanItem {
    pub(crate) targets: SmallVec<[Target; 4]>,
    pub(crate) groups: Vec<ScanGroup>,
}

impl ScanItem {
    /// Targets in left-to-right order.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Groups of this item. Empty unless grouping is enabled and the targets
    /// actually split into more than one group with at least one multi-target
    /// group.
    pub fn groups(&self) -> &[ScanGroup] {
        &self.groups
    }

    /// Whether the item holds exactly one target.
    pub fn is_single(&self) -> bool {
        self.targets.len() == 1
    }

    /// Whether stepping inside this item walks groups rather than targets.
    pub fn is_grouped(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Number of stops inside the item.
    pub fn child_count(&self) -> usize {
        if self.is_grouped() {
            self.groups.len()
        } else {
            self.targets.len()
        }
    }

    /// Union of the targets' bounds.
    pub fn bounds(&self) -> Rect {
        union_bounds(&self.targets)
    }
}

/// Items sharing an approximate vertical position.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanRow {
    pub(crate) items: Vec<ScanItem>,
}

impl ScanRow {
    /// Items in left-to-right order.
    pub fn items(&self) -> &[ScanItem] {
        &self.items
    }

    /// Union of all item bounds.
    pub fn bounds(&self) -> Rect {
        self.items
            .iter()
            .map(ScanItem::bounds)
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO)
    }

    /// Iterate the row's targets in scan order.
    pub fn targets(&self) -> impl Iterator<Item = &Target> + '_ {
        self.items.iter().flat_map(|item| item.targets.iter())
    }
}

/// Result of a build: the row hierarchy plus the same targets flattened in
/// scan order for sequential scanning.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanLayout {
    pub(crate) rows: Vec<ScanRow>,
    pub(crate) flat: Vec<Target>,
}

impl ScanLayout {
    /// An empty layout: nothing to scan.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rows in top-to-bottom order.
    pub fn rows(&self) -> &[ScanRow] {
        &self.rows
    }

    /// All targets in scan order (row by row, left to right).
    pub fn flat(&self) -> &[Target] {
        &self.flat
    }

    /// Whether there is nothing to scan.
    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    pub(crate) fn row(&self, row: usize) -> Option<&ScanRow> {
        self.rows.get(row)
    }

    pub(crate) fn item(&self, row: usize, item: usize) -> Option<&ScanItem> {
        self.rows.get(row)?.items.get(item)
    }

    pub(crate) fn group(&self, row: usize, item: usize, group: usize) -> Option<&ScanGroup> {
        self.item(row, item)?.groups.get(group)
    }
}

pub(crate) fn union_bounds(targets: &[Target]) -> Rect {
    targets
        .iter()
        .map(|t| t.rect)
        .reduce(|a, b| a.union(b))
        .unwrap_or(Rect::ZERO)
}
