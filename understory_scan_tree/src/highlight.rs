// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! What should be drawn for the current navigator state.

use kurbo::Rect;
use smallvec::SmallVec;

use crate::layout::ScanLayout;
use crate::navigator::{NavigatorState, Scope, Stop};
use crate::types::{Target, TargetId};

/// Kind of element a highlight covers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HighlightKind {
    /// A whole row.
    Row,
    /// A multi-target item.
    Item,
    /// A group inside an item.
    Group,
    /// A single target.
    Target,
    /// The escape stop; the bounds are those of the scope being left.
    Escape,
}

/// A highlighted region and the targets it covers.
#[derive(Clone, Debug, PartialEq)]
pub struct Highlight {
    /// Kind of element.
    pub kind: HighlightKind,
    /// Union of the covered targets' bounds.
    pub bounds: Rect,
    /// Covered targets in scan order.
    pub targets: SmallVec<[TargetId; 8]>,
}

impl Highlight {
    fn covering<'a>(kind: HighlightKind, targets: impl IntoIterator<Item = &'a Target>) -> Self {
        let targets: SmallVec<[&Target; 8]> = targets.into_iter().collect();
        let bounds = targets
            .iter()
            .map(|t| t.rect)
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO);
        Self {
            kind,
            bounds,
            targets: targets.iter().map(|t| t.id).collect(),
        }
    }
}

/// Compute the highlight for `state`, or `None` when nothing is highlighted.
pub fn highlight_for(state: &NavigatorState, layout: &ScanLayout) -> Option<Highlight> {
    match state.stop() {
        Stop::Armed => None,
        Stop::Escape(_) => scope_highlight(state.scope(), layout),
        Stop::At(index) => element_highlight(state.scope(), index, layout),
    }
}

fn scope_highlight(scope: Scope, layout: &ScanLayout) -> Option<Highlight> {
    let h = match scope {
        Scope::Flat | Scope::Top => return None,
        Scope::Row { row } => Highlight::covering(HighlightKind::Escape, layout.row(row)?.targets()),
        Scope::Item { row, item } => {
            Highlight::covering(HighlightKind::Escape, layout.item(row, item)?.targets.iter())
        }
        Scope::Group { row, item, group } => Highlight::covering(
            HighlightKind::Escape,
            layout.group(row, item, group)?.targets.iter(),
        ),
    };
    Some(h)
}

fn element_highlight(scope: Scope, index: usize, layout: &ScanLayout) -> Option<Highlight> {
    let h = match scope {
        Scope::Flat => Highlight::covering(HighlightKind::Target, layout.flat.get(index)),
        Scope::Top => Highlight::covering(HighlightKind::Row, layout.row(index)?.targets()),
        Scope::Row { row } => {
            let item = layout.item(row, index)?;
            let kind = if item.is_single() {
                HighlightKind::Target
            } else {
                HighlightKind::Item
            };
            Highlight::covering(kind, item.targets.iter())
        }
        Scope::Item { row, item } => {
            let it = layout.item(row, item)?;
            if it.is_grouped() {
                let group = it.groups.get(index)?;
                let kind = if group.targets.len() == 1 {
                    HighlightKind::Target
                } else {
                    HighlightKind::Group
                };
                Highlight::covering(kind, group.targets.iter())
            } else {
                Highlight::covering(HighlightKind::Target, it.targets.get(index))
            }
        }
        Scope::Group { row, item, group } => Highlight::covering(
            HighlightKind::Target,
            layout.group(row, item, group)?.targets.get(index),
        ),
    };
    (!h.targets.is_empty()).then_some(h)
}
