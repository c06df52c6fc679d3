// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use thiserror::Error;
use understory_scan_tree::TargetId;
use understory_switch_input::SwitchCode;

/// Invalid or unreadable scan settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The scan rate is zero.
    #[error("scan rate must be greater than zero")]
    ZeroScanRate,

    /// A clustering threshold is negative or not finite.
    #[error("{name} must be a finite, non-negative number (got {value})")]
    InvalidThreshold {
        /// Setting name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Two bindings claim the same switch.
    #[error("switch {0:?} is bound more than once")]
    DuplicateBinding(SwitchCode),

    /// A binding has hold actions but the hold time is zero.
    #[error("hold actions need a non-zero switch hold time")]
    ZeroHoldTime,

    /// The settings document could not be parsed or written.
    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure reported by an activation collaborator.
///
/// The engine logs these and carries on; they never change scanning state.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The target disappeared before it could be activated.
    #[error("target {0:?} is no longer available")]
    TargetGone(TargetId),

    /// The platform refused or failed to perform the gesture.
    #[error("gesture dispatch failed: {0}")]
    Dispatch(String),

    /// The receiving end has gone away.
    #[error("activation receiver disconnected")]
    Disconnected,
}
