// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Commands a switch can be bound to.

use serde::{Deserialize, Serialize};

/// Platform-level navigation the host performs on the user's behalf.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemAction {
    /// Go back.
    Back,
    /// Go to the home screen.
    Home,
    /// Show recent applications.
    Recents,
    /// Open the notification shade.
    Notifications,
}

/// A discrete command produced by switch input.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchAction {
    /// Act on the highlighted element.
    Select,
    /// Step forward.
    Next,
    /// Step backward.
    Previous,
    /// Reverse the scan direction.
    SwapDirection,
    /// Stop the scanning session.
    StopScanning,
    /// Cycle between item, cursor, and radar scanning.
    ToggleScanMethod,
    /// Open the host's action menu.
    OpenMenu,
    /// Perform a platform action.
    System(SystemAction),
    /// Absorb the switch without doing anything.
    #[default]
    None,
}

impl SwitchAction {
    /// Whether the action moves the scan cursor, and so may auto-repeat while
    /// held.
    pub fn is_movement(self) -> bool {
        matches!(self, Self::Next | Self::Previous)
    }
}
