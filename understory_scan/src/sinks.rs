// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Outbound collaborators: who performs activations and who draws highlights.

use crossbeam_channel::Sender;
use kurbo::Point;
use understory_pointer_scan::PointerHighlight;
use understory_scan_tree::{Highlight, TargetId};
use understory_switch_input::SystemAction;

use crate::error::SinkError;

/// A completed selection.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Activation {
    /// Activate a scanned target.
    Target(TargetId),
    /// Tap at a screen point.
    Tap(Point),
    /// Open the context menu at a screen point.
    ContextMenu(Point),
    /// Open the host's action menu.
    Menu,
    /// Perform a platform action.
    System(SystemAction),
}

/// What is currently highlighted, per strategy.
#[derive(Clone, Debug, PartialEq)]
pub enum HighlightScope {
    /// A row, item, group, target, or escape stop of item scanning.
    Tree(Highlight),
    /// The band, line, ray, or point of cursor or radar scanning.
    Pointer(PointerHighlight),
}

/// Performs activations on the engine's behalf.
pub trait ActivationSink {
    /// Perform `activation`. Errors are logged by the engine and otherwise
    /// ignored.
    fn activate(&mut self, activation: &Activation) -> Result<(), SinkError>;
}

/// Draws highlights.
///
/// The engine pairs every `highlight` with a later `unhighlight` of the same
/// scope before highlighting something else.
pub trait HighlightSink {
    /// Show `scope`.
    fn highlight(&mut self, scope: &HighlightScope);
    /// Remove `scope`.
    fn unhighlight(&mut self, scope: &HighlightScope);
}

impl ActivationSink for Sender<Activation> {
    fn activate(&mut self, activation: &Activation) -> Result<(), SinkError> {
        self.send(*activation).map_err(|_| SinkError::Disconnected)
    }
}

impl ActivationSink for Vec<Activation> {
    fn activate(&mut self, activation: &Activation) -> Result<(), SinkError> {
        self.push(*activation);
        Ok(())
    }
}

/// A change of highlight, for hosts that draw from another thread.
#[derive(Clone, Debug, PartialEq)]
pub enum HighlightChange {
    /// `HighlightSink::highlight` was called.
    Show(HighlightScope),
    /// `HighlightSink::unhighlight` was called.
    Hide(HighlightScope),
}

impl HighlightSink for Sender<HighlightChange> {
    fn highlight(&mut self, scope: &HighlightScope) {
        if self.send(HighlightChange::Show(scope.clone())).is_err() {
            tracing::debug!("highlight receiver disconnected");
        }
    }

    fn unhighlight(&mut self, scope: &HighlightScope) {
        if self.send(HighlightChange::Hide(scope.clone())).is_err() {
            tracing::debug!("highlight receiver disconnected");
        }
    }
}

impl HighlightSink for Vec<HighlightChange> {
    fn highlight(&mut self, scope: &HighlightScope) {
        self.push(HighlightChange::Show(scope.clone()));
    }

    fn unhighlight(&mut self, scope: &HighlightScope) {
        self.push(HighlightChange::Hide(scope.clone()));
    }
}

/// A sink that discards everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullSink;

impl ActivationSink for NullSink {
    fn activate(&mut self, _: &Activation) -> Result<(), SinkError> {
        Ok(())
    }
}

impl HighlightSink for NullSink {
    fn highlight(&mut self, _: &HighlightScope) {}
    fn unhighlight(&mut self, _: &HighlightScope) {}
}
