// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: target identities, targets, and tree configuration.

use kurbo::{Point, Rect};

/// Stable identity of a selectable screen region.
///
/// Identities are supplied by the node-discovery collaborator and must stay
/// the same across target list refreshes for the same on-screen element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

/// Grouping key for targets that should be scanned together inside an item.
///
/// Like focus symbols elsewhere in Understory, the meaning of a key is owned by
/// the host (for example "all keys of the numeric pad").
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroupKey(pub u64);

/// A selectable, axis-aligned screen region.
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    /// Stable identity.
    pub id: TargetId,
    /// Bounds in screen coordinates (device-independent pixels).
    pub rect: Rect,
    /// Optional grouping key, consulted only when grouping is enabled.
    pub group: Option<GroupKey>,
}

impl Target {
    /// Create an ungrouped target.
    pub fn new(id: u64, rect: Rect) -> Self {
        Self {
            id: TargetId(id),
            rect,
            group: None,
        }
    }

    /// Create a target from an origin and a size.
    pub fn from_xywh(id: u64, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(id, Rect::from_origin_size((x, y), (width, height)))
    }

    /// Attach a grouping key.
    #[must_use]
    pub fn with_group(mut self, key: GroupKey) -> Self {
        self.group = Some(key);
        self
    }

    /// Centre of the target's bounds.
    pub fn center(&self) -> Point {
        self.rect.center()
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.rect.x0.is_finite()
            && self.rect.y0.is_finite()
            && self.rect.x1.is_finite()
            && self.rect.y1.is_finite()
    }
}

/// Configuration consumed by the builder, navigator, and selector.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TreeConfig {
    /// Row/column scanning. When false, targets are scanned one by one in
    /// reading order with no descent.
    pub row_column: bool,
    /// Partition multi-target items into groups by [`GroupKey`].
    pub grouping: bool,
    /// Maximum vertical centre distance for two targets to share a row.
    pub row_threshold: f64,
    /// Maximum horizontal gap between boxes for adjacent targets to share an item.
    pub item_threshold: f64,
    /// Number of full traversals without a selection before auto scanning
    /// stops. Zero disables the limit.
    pub cycle_limit: u32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            row_column: true,
            grouping: false,
            row_threshold: 40.0,
            item_threshold: 40.0,
            cycle_limit: 3,
        }
    }
}
