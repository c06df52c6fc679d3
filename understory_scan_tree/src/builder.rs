// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometric clustering of a flat target list into rows, items, and groups.
//!
//! The build is wholesale: every call starts from scratch and nothing from a
//! previous layout survives. Callers swap the result in atomically.

use alloc::vec::Vec;
use core::cmp::Ordering;

use hashbrown::HashSet;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use smallvec::SmallVec;

use crate::layout::{ScanGroup, ScanItem, ScanLayout, ScanRow};
use crate::types::{Target, TargetId, TreeConfig};

/// Build a [`ScanLayout`] from a flat list of targets.
///
/// - Targets are sorted by vertical centre. A new row starts whenever a
///   target's vertical centre is further than `row_threshold` from the centre
///   of the row's first target.
/// - Each row is sorted by horizontal centre. Adjacent targets whose boxes are
///   at most `item_threshold` apart horizontally share an item.
/// - With grouping enabled, multi-target items are partitioned by
///   [`GroupKey`](crate::GroupKey).
///
/// Targets with non-finite bounds are dropped, as are repeated identities
/// (the first occurrence wins). Empty input yields an empty layout.
///
/// ```rust
/// use understory_scan_tree::{Target, TreeConfig, build_layout};
///
/// let targets = vec![
///     Target::from_xywh(1, 0.0, 10.0, 20.0, 20.0),
///     Target::from_xywh(2, 0.0, 200.0, 20.0, 20.0),
/// ];
/// let layout = build_layout(&targets, &TreeConfig::default());
/// assert_eq!(layout.rows().len(), 2);
/// ```
pub fn build_layout(targets: &[Target], config: &TreeConfig) -> ScanLayout {
    let mut seen: HashSet<TargetId> = HashSet::with_capacity(targets.len());
    let mut sorted: Vec<Target> = Vec::with_capacity(targets.len());
    for target in targets {
        if !target.is_finite() {
            tracing::warn!(id = ?target.id, rect = ?target.rect, "dropping target with non-finite bounds");
            continue;
        }
        if !seen.insert(target.id) {
            tracing::debug!(id = ?target.id, "dropping repeated target identity");
            continue;
        }
        sorted.push(target.clone());
    }
    if sorted.is_empty() {
        return ScanLayout::empty();
    }

    sorted.sort_by(compare_vertical);

    let mut rows: Vec<ScanRow> = Vec::new();
    let mut pending: Vec<Target> = Vec::new();
    let mut reference = f64::NAN;
    for target in sorted {
        let cy = target.center().y;
        if !pending.is_empty() && (cy - reference).abs() > config.row_threshold {
            rows.push(build_row(core::mem::take(&mut pending), config));
        }
        if pending.is_empty() {
            reference = cy;
        }
        pending.push(target);
    }
    if !pending.is_empty() {
        rows.push(build_row(pending, config));
    }

    let flat = rows.iter().flat_map(ScanRow::targets).cloned().collect();
    tracing::debug!(rows = rows.len(), "built scan layout");
    ScanLayout { rows, flat }
}

fn build_row(mut targets: Vec<Target>, config: &TreeConfig) -> ScanRow {
    targets.sort_by(compare_horizontal);

    let mut items: Vec<ScanItem> = Vec::new();
    let mut current: SmallVec<[Target; 4]> = SmallVec::new();
    let mut right_edge = f64::NEG_INFINITY;
    for target in targets {
        let gap = target.rect.x0 - right_edge;
        if !current.is_empty() && gap > config.item_threshold {
            items.push(build_item(core::mem::take(&mut current), config));
            right_edge = f64::NEG_INFINITY;
        }
        right_edge = right_edge.max(target.rect.x1);
        current.push(target);
    }
    if !current.is_empty() {
        items.push(build_item(current, config));
    }
    ScanRow { items }
}

fn build_item(targets: SmallVec<[Target; 4]>, config: &TreeConfig) -> ScanItem {
    let groups = if config.grouping && targets.len() > 1 {
        partition_groups(&targets)
    } else {
        Vec::new()
    };
    ScanItem { targets, groups }
}

/// Partition by key, in order of first appearance. Unkeyed targets become
/// singleton groups. A partition that adds no level (one group, or only
/// singletons) is discarded.
fn partition_groups(targets: &[Target]) -> Vec<ScanGroup> {
    let mut groups: Vec<ScanGroup> = Vec::new();
    for target in targets {
        let existing = target
            .group
            .and_then(|key| groups.iter_mut().find(|g| g.key == Some(key)));
        match existing {
            Some(group) => group.targets.push(target.clone()),
            None => {
                let mut members = SmallVec::new();
                members.push(target.clone());
                groups.push(ScanGroup {
                    key: target.group,
                    targets: members,
                });
            }
        }
    }
    if groups.len() < 2 || groups.iter().all(|g| g.targets.len() == 1) {
        return Vec::new();
    }
    groups
}

fn compare_vertical(a: &Target, b: &Target) -> Ordering {
    let (ac, bc) = (a.center(), b.center());
    ac.y.total_cmp(&bc.y).then_with(|| ac.x.total_cmp(&bc.x))
}

fn compare_horizontal(a: &Target, b: &Target) -> Ordering {
    let (ac, bc) = (a.center(), b.center());
    ac.x.total_cmp(&bc.x).then_with(|| ac.y.total_cmp(&bc.y))
}
