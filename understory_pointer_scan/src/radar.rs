// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Angular radar scanning.
//!
//! A ray rotates around the screen centre; selecting fixes its angle. A marker
//! then slides along the ray, bouncing between the centre and the screen
//! edge; selecting fixes the point.

use core::time::Duration;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect, Vec2};

use crate::outcome::{PointOutcome, PointerHighlight, SweepDirection};

/// Rotation per tick, in degrees.
pub const ANGLE_STEP_DEG: f64 = 10.0;
/// Change of the radius ratio per tick.
pub const RATIO_STEP: f64 = 0.05;

/// Phase of the radar engine.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RadarPhase {
    /// Not scanning.
    Idle,
    /// The ray is rotating.
    Rotating {
        /// Angle in degrees, in `[0, 360)`.
        angle: f64,
    },
    /// The angle is fixed and the marker slides along the ray.
    Moving {
        /// Fixed angle in degrees.
        angle: f64,
        /// Marker distance as a fraction of the reach along `angle`.
        ratio: f64,
        /// Whether the marker is moving away from the centre.
        outward: bool,
    },
    /// The point is fixed and the confirmation delay is running.
    Confirming {
        /// Fixed point.
        point: Point,
    },
}

/// Radar engine configuration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RadarConfig {
    /// Area being scanned; the ray rotates around its centre.
    pub screen: Rect,
    /// Delay between fixing a point and tapping it. Zero taps immediately.
    pub confirm_delay: Duration,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            screen: Rect::ZERO,
            confirm_delay: Duration::ZERO,
        }
    }
}

/// Angular radar scanning state machine.
#[derive(Clone, Debug)]
pub struct RadarEngine {
    config: RadarConfig,
    phase: RadarPhase,
    direction: SweepDirection,
}

impl RadarEngine {
    /// Create an idle engine.
    pub fn new(config: RadarConfig) -> Self {
        Self {
            config,
            phase: RadarPhase::Idle,
            direction: SweepDirection::Forward,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &RadarConfig {
        &self.config
    }

    /// Replace the configuration. A running sweep restarts.
    pub fn set_config(&mut self, config: RadarConfig) {
        self.config = config;
        if self.is_running() {
            self.reset();
        }
    }

    /// Current phase.
    pub fn phase(&self) -> RadarPhase {
        self.phase
    }

    /// Rotation sense.
    pub fn direction(&self) -> SweepDirection {
        self.direction
    }

    /// Whether a sweep or confirmation is in progress.
    pub fn is_running(&self) -> bool {
        self.phase != RadarPhase::Idle
    }

    /// Whether a fixed point is awaiting confirmation.
    pub fn is_confirming(&self) -> bool {
        matches!(self.phase, RadarPhase::Confirming { .. })
    }

    /// Begin rotating from angle 0. Does nothing if already running.
    pub fn start(&mut self) {
        if !self.is_running() {
            self.reset();
        }
    }

    /// Return to rotating from angle 0.
    pub fn reset(&mut self) {
        self.phase = RadarPhase::Rotating { angle: 0.0 };
    }

    /// Stop scanning. Safe to call in any state.
    pub fn stop(&mut self) {
        self.phase = RadarPhase::Idle;
    }

    /// Advance one step.
    pub fn tick(&mut self) {
        self.step(self.direction);
    }

    /// Step forward: rotate in the current sense, or move the marker in its
    /// current sweep direction.
    pub fn move_next(&mut self) {
        self.step(self.direction);
    }

    /// Step backward: the opposite of [`RadarEngine::move_next`].
    pub fn move_previous(&mut self) {
        self.step(self.direction.reversed());
    }

    fn step(&mut self, direction: SweepDirection) {
        match &mut self.phase {
            RadarPhase::Rotating { angle } => {
                *angle = wrap_degrees(*angle + direction.sign() * ANGLE_STEP_DEG);
            }
            RadarPhase::Moving { ratio, outward, .. } => {
                let forward = *outward == (direction == self.direction);
                let next = if forward {
                    *ratio + RATIO_STEP
                } else {
                    *ratio - RATIO_STEP
                };
                if next >= 1.0 - 1e-9 {
                    *ratio = 1.0;
                    *outward = false;
                } else if next <= 1e-9 {
                    *ratio = 0.0;
                    *outward = true;
                } else {
                    *ratio = next;
                }
            }
            RadarPhase::Idle | RadarPhase::Confirming { .. } => {}
        }
    }

    /// Reverse the rotation sense while rotating, or the marker's sweep while
    /// moving. Progress is kept.
    pub fn swap_direction(&mut self) {
        match &mut self.phase {
            RadarPhase::Moving { outward, .. } => *outward = !*outward,
            _ => self.direction = self.direction.reversed(),
        }
    }

    /// Fix the angle, or the point.
    pub fn select(&mut self) -> PointOutcome {
        match self.phase {
            RadarPhase::Idle => PointOutcome::Nothing,
            RadarPhase::Rotating { angle } => {
                tracing::debug!(angle, "radar angle fixed");
                self.phase = RadarPhase::Moving {
                    angle,
                    ratio: 0.0,
                    outward: true,
                };
                PointOutcome::Narrowed
            }
            RadarPhase::Moving { angle, ratio, .. } => {
                let point = self.point_at(angle, ratio);
                tracing::debug!(?point, "radar point fixed");
                if self.config.confirm_delay.is_zero() {
                    self.reset();
                    PointOutcome::Tap(point)
                } else {
                    self.phase = RadarPhase::Confirming { point };
                    PointOutcome::Confirming(point)
                }
            }
            RadarPhase::Confirming { point } => {
                self.reset();
                PointOutcome::ContextMenu(point)
            }
        }
    }

    /// The confirmation delay elapsed: tap the fixed point.
    pub fn confirm_expired(&mut self) -> Option<Point> {
        let RadarPhase::Confirming { point } = self.phase else {
            return None;
        };
        self.reset();
        Some(point)
    }

    /// Centre of rotation.
    pub fn center(&self) -> Point {
        self.config.screen.center()
    }

    /// Distance from the centre to the screen edge along `angle_deg`.
    pub fn reach(&self, angle_deg: f64) -> f64 {
        let screen = self.config.screen;
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let half_w = screen.width() / 2.0;
        let half_h = screen.height() / 2.0;
        let along_x = if cos.abs() > 1e-12 {
            half_w / cos.abs()
        } else {
            f64::INFINITY
        };
        let along_y = if sin.abs() > 1e-12 {
            half_h / sin.abs()
        } else {
            f64::INFINITY
        };
        along_x.min(along_y)
    }

    /// The point at `ratio` of the reach along `angle_deg`.
    pub fn point_at(&self, angle_deg: f64, ratio: f64) -> Point {
        let r = ratio * self.reach(angle_deg);
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        self.center() + Vec2::new(r * cos, r * sin)
    }

    /// What should currently be drawn.
    pub fn highlight(&self) -> Option<PointerHighlight> {
        match self.phase {
            RadarPhase::Idle => None,
            RadarPhase::Rotating { angle } => Some(PointerHighlight::Ray {
                origin: self.center(),
                angle_deg: angle,
                length: self.reach(angle),
            }),
            RadarPhase::Moving { angle, ratio, .. } => Some(PointerHighlight::Ray {
                origin: self.center(),
                angle_deg: angle,
                length: ratio * self.reach(angle),
            }),
            RadarPhase::Confirming { point } => Some(PointerHighlight::Point(point)),
        }
    }
}

/// `angle` folded into `[0, 360)`.
fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle % 360.0;
    if wrapped < 0.0 { wrapped + 360.0 } else { wrapped }
}
