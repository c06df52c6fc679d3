// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Types shared by the cursor and radar engines.

use kurbo::{Point, Rect};

/// Sense in which a sweep advances.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SweepDirection {
    /// Left to right, top to bottom, clockwise on screen.
    #[default]
    Forward,
    /// The opposite sense.
    Backward,
}

impl SweepDirection {
    /// The opposite sense.
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    pub(crate) fn sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }
}

/// Result of a select press on a pointer engine.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PointOutcome {
    /// The engine is idle.
    Nothing,
    /// A coordinate was fixed and the next phase started.
    Narrowed,
    /// The point is fixed and waiting for the confirmation delay.
    Confirming(Point),
    /// Tap at the point. The engine has been reset.
    Tap(Point),
    /// Open the context menu at the point. The engine has been reset.
    ContextMenu(Point),
}

/// What a pointer engine wants drawn.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PointerHighlight {
    /// A quarter-screen band being swept.
    Band(Rect),
    /// A thin sweeping line.
    Line(Rect),
    /// A ray from the screen centre.
    Ray {
        /// Start of the ray.
        origin: Point,
        /// Angle in degrees; 0 points along +x, increasing clockwise on screen.
        angle_deg: f64,
        /// Length of the ray.
        length: f64,
    },
    /// A fixed point awaiting confirmation.
    Point(Point),
}
