// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapping the highlighted element to the effect of a select press.

use crate::layout::ScanLayout;
use crate::navigator::{NavigatorState, Scope, Stop};
use crate::types::TargetId;

/// What a select press on the current state means.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Nothing is highlighted.
    Nothing,
    /// Descend into a row.
    EnterRow(usize),
    /// Descend into a multi-target item of the current row.
    EnterItem(usize),
    /// Descend into a multi-target group of the current item.
    EnterGroup(usize),
    /// Leave the current scope.
    Escape,
    /// Activate a target.
    Activate(TargetId),
}

/// Decide what selecting the highlighted element does.
///
/// A container holding exactly one target is never entered: selecting it
/// activates that target directly. In sequential mode every selection is an
/// activation.
pub fn select(state: &NavigatorState, layout: &ScanLayout) -> Selection {
    let index = match state.stop() {
        Stop::Armed => return Selection::Nothing,
        Stop::Escape(_) => return Selection::Escape,
        Stop::At(index) => index,
    };
    let selection = match state.scope() {
        Scope::Flat => layout.flat.get(index).map(|t| Selection::Activate(t.id)),
        Scope::Top => layout.row(index).map(|row| match row.items.as_slice() {
            [only] if only.is_single() => Selection::Activate(only.targets[0].id),
            _ => Selection::EnterRow(index),
        }),
        Scope::Row { row } => layout.item(row, index).map(|item| {
            if item.is_single() {
                Selection::Activate(item.targets[0].id)
            } else {
                Selection::EnterItem(index)
            }
        }),
        Scope::Item { row, item } => layout.item(row, item).and_then(|it| {
            if it.is_grouped() {
                it.groups.get(index).map(|group| match group.targets.as_slice() {
                    [only] => Selection::Activate(only.id),
                    _ => Selection::EnterGroup(index),
                })
            } else {
                it.targets.get(index).map(|t| Selection::Activate(t.id))
            }
        }),
        Scope::Group { row, item, group } => layout
            .group(row, item, group)
            .and_then(|g| g.targets.get(index))
            .map(|t| Selection::Activate(t.id)),
    };
    selection.unwrap_or(Selection::Nothing)
}
