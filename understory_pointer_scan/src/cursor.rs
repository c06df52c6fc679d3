// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-sweep cursor scanning.
//!
//! The point is found in four selections. First a band one quarter of the
//! screen wide sweeps across the four horizontal quarters; selecting narrows
//! to that quarter, where a thin line sweeps until selected again, fixing x.
//! The same two phases then run vertically to fix y.

use core::time::Duration;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect};

use crate::outcome::{PointOutcome, PointerHighlight, SweepDirection};

/// Number of bands an axis is split into during the quadrant phase.
pub const QUADRANTS: usize = 4;
/// Thickness of the sweeping line.
pub const LINE_WIDTH: f64 = 10.0;
/// Distance the line moves per tick.
pub const LINE_STEP: f64 = 10.0;
/// Upper bound on the tick interval while a line sweeps.
pub const LINE_INTERVAL_CAP: Duration = Duration::from_millis(200);

/// A closed interval along one axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Band {
    /// Lower coordinate.
    pub start: f64,
    /// Upper coordinate.
    pub end: f64,
}

impl Band {
    /// Length of the interval.
    pub fn len(self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Whether the interval is empty.
    pub fn is_empty(self) -> bool {
        self.len() == 0.0
    }

    fn quarter(self, index: usize) -> Self {
        let width = self.len() / QUADRANTS as f64;
        let start = self.start + width * index as f64;
        Self {
            start,
            end: start + width,
        }
    }

    /// Largest line offset that keeps the line inside the band, on the step grid.
    fn last_offset(self) -> f64 {
        let room = (self.len() - LINE_WIDTH).max(0.0);
        (room / LINE_STEP).floor() * LINE_STEP
    }

    fn line_center(self, offset: f64) -> f64 {
        (self.start + offset + LINE_WIDTH / 2.0).min(self.end)
    }
}

/// Phase of the cursor engine.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CursorPhase {
    /// Not scanning.
    Idle,
    /// Sweeping horizontal quarters.
    XQuadrant {
        /// Highlighted quarter.
        index: usize,
    },
    /// Sweeping a vertical line inside the chosen horizontal quarter.
    XLine {
        /// The chosen quarter.
        band: Band,
        /// Line position relative to the band start.
        offset: f64,
    },
    /// Sweeping vertical quarters with x fixed.
    YQuadrant {
        /// Fixed x coordinate.
        x: f64,
        /// Highlighted quarter.
        index: usize,
    },
    /// Sweeping a horizontal line inside the chosen vertical quarter.
    YLine {
        /// Fixed x coordinate.
        x: f64,
        /// The chosen quarter.
        band: Band,
        /// Line position relative to the band start.
        offset: f64,
    },
    /// The point is fixed and the confirmation delay is running.
    Confirming {
        /// Fixed point.
        point: Point,
    },
}

/// Cursor engine configuration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CursorConfig {
    /// Area being scanned.
    pub screen: Rect,
    /// Delay between fixing a point and tapping it. During the delay a second
    /// select opens the context menu instead. Zero taps immediately.
    pub confirm_delay: Duration,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            screen: Rect::ZERO,
            confirm_delay: Duration::ZERO,
        }
    }
}

/// Axis-sweep cursor scanning state machine.
///
/// ```rust
/// use kurbo::Rect;
/// use understory_pointer_scan::{CursorConfig, CursorEngine, PointOutcome};
///
/// let mut cursor = CursorEngine::new(CursorConfig {
///     screen: Rect::new(0.0, 0.0, 400.0, 400.0),
///     ..CursorConfig::default()
/// });
/// cursor.start();
/// cursor.select(); // x quarter
/// cursor.select(); // x line
/// cursor.select(); // y quarter
/// let PointOutcome::Tap(point) = cursor.select() else { unreachable!() };
/// assert_eq!(point.x, 5.0);
/// assert_eq!(point.y, 5.0);
/// ```
#[derive(Clone, Debug)]
pub struct CursorEngine {
    config: CursorConfig,
    phase: CursorPhase,
    direction: SweepDirection,
}

impl CursorEngine {
    /// Create an idle engine.
    pub fn new(config: CursorConfig) -> Self {
        Self {
            config,
            phase: CursorPhase::Idle,
            direction: SweepDirection::Forward,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &CursorConfig {
        &self.config
    }

    /// Replace the configuration. A running sweep restarts.
    pub fn set_config(&mut self, config: CursorConfig) {
        self.config = config;
        if self.is_running() {
            self.reset();
        }
    }

    /// Current phase.
    pub fn phase(&self) -> CursorPhase {
        self.phase
    }

    /// Current sweep direction.
    pub fn direction(&self) -> SweepDirection {
        self.direction
    }

    /// Whether a sweep or confirmation is in progress.
    pub fn is_running(&self) -> bool {
        self.phase != CursorPhase::Idle
    }

    /// Whether a fixed point is awaiting confirmation.
    pub fn is_confirming(&self) -> bool {
        matches!(self.phase, CursorPhase::Confirming { .. })
    }

    /// Begin sweeping from the first horizontal quarter. Does nothing if
    /// already running.
    pub fn start(&mut self) {
        if !self.is_running() {
            self.reset();
        }
    }

    /// Return to the first horizontal quarter with no fixed coordinate.
    pub fn reset(&mut self) {
        self.phase = CursorPhase::XQuadrant {
            index: self.first_index(),
        };
    }

    /// Stop sweeping. Safe to call in any state.
    pub fn stop(&mut self) {
        self.phase = CursorPhase::Idle;
    }

    /// Tick interval for the current phase, given the configured scan rate.
    pub fn tick_interval(&self, scan_rate: Duration) -> Duration {
        match self.phase {
            CursorPhase::XLine { .. } | CursorPhase::YLine { .. } => {
                scan_rate.min(LINE_INTERVAL_CAP)
            }
            _ => scan_rate,
        }
    }

    /// Advance the sweep one step in the current direction.
    pub fn tick(&mut self) {
        self.step(self.direction);
    }

    /// Step the sweep forward.
    pub fn move_next(&mut self) {
        self.step(SweepDirection::Forward);
    }

    /// Step the sweep backward.
    pub fn move_previous(&mut self) {
        self.step(SweepDirection::Backward);
    }

    /// Reverse the sweep direction without moving.
    pub fn swap_direction(&mut self) {
        self.direction = self.direction.reversed();
    }

    fn step(&mut self, direction: SweepDirection) {
        self.phase = match self.phase {
            CursorPhase::XQuadrant { index } => CursorPhase::XQuadrant {
                index: step_index(index, direction),
            },
            CursorPhase::XLine { band, offset } => CursorPhase::XLine {
                band,
                offset: step_offset(band, offset, direction),
            },
            CursorPhase::YQuadrant { x, index } => CursorPhase::YQuadrant {
                x,
                index: step_index(index, direction),
            },
            CursorPhase::YLine { x, band, offset } => CursorPhase::YLine {
                x,
                band,
                offset: step_offset(band, offset, direction),
            },
            phase @ (CursorPhase::Idle | CursorPhase::Confirming { .. }) => phase,
        };
    }

    /// Fix the coordinate under the sweep.
    pub fn select(&mut self) -> PointOutcome {
        match self.phase {
            CursorPhase::Idle => PointOutcome::Nothing,
            CursorPhase::XQuadrant { index } => {
                let band = self.x_axis().quarter(index);
                self.phase = CursorPhase::XLine {
                    band,
                    offset: self.first_offset(band),
                };
                PointOutcome::Narrowed
            }
            CursorPhase::XLine { band, offset } => {
                let x = band.line_center(offset);
                tracing::debug!(x, "cursor x fixed");
                self.phase = CursorPhase::YQuadrant {
                    x,
                    index: self.first_index(),
                };
                PointOutcome::Narrowed
            }
            CursorPhase::YQuadrant { x, index } => {
                let band = self.y_axis().quarter(index);
                self.phase = CursorPhase::YLine {
                    x,
                    band,
                    offset: self.first_offset(band),
                };
                PointOutcome::Narrowed
            }
            CursorPhase::YLine { x, band, offset } => {
                self.fix(Point::new(x, band.line_center(offset)))
            }
            CursorPhase::Confirming { point } => {
                self.reset();
                PointOutcome::ContextMenu(point)
            }
        }
    }

    /// The confirmation delay elapsed: tap the fixed point.
    pub fn confirm_expired(&mut self) -> Option<Point> {
        let CursorPhase::Confirming { point } = self.phase else {
            return None;
        };
        self.reset();
        Some(point)
    }

    /// What should currently be drawn.
    pub fn highlight(&self) -> Option<PointerHighlight> {
        let screen = self.config.screen;
        match self.phase {
            CursorPhase::Idle => None,
            CursorPhase::XQuadrant { index } => {
                let q = self.x_axis().quarter(index);
                Some(PointerHighlight::Band(Rect::new(
                    q.start, screen.y0, q.end, screen.y1,
                )))
            }
            CursorPhase::XLine { band, offset } => {
                let x0 = band.start + offset;
                Some(PointerHighlight::Line(Rect::new(
                    x0,
                    screen.y0,
                    (x0 + LINE_WIDTH).min(band.end),
                    screen.y1,
                )))
            }
            CursorPhase::YQuadrant { index, .. } => {
                let q = self.y_axis().quarter(index);
                Some(PointerHighlight::Band(Rect::new(
                    screen.x0, q.start, screen.x1, q.end,
                )))
            }
            CursorPhase::YLine { band, offset, .. } => {
                let y0 = band.start + offset;
                Some(PointerHighlight::Line(Rect::new(
                    screen.x0,
                    y0,
                    screen.x1,
                    (y0 + LINE_WIDTH).min(band.end),
                )))
            }
            CursorPhase::Confirming { point } => Some(PointerHighlight::Point(point)),
        }
    }

    fn fix(&mut self, point: Point) -> PointOutcome {
        tracing::debug!(?point, "cursor point fixed");
        if self.config.confirm_delay.is_zero() {
            self.reset();
            PointOutcome::Tap(point)
        } else {
            self.phase = CursorPhase::Confirming { point };
            PointOutcome::Confirming(point)
        }
    }

    fn x_axis(&self) -> Band {
        Band {
            start: self.config.screen.x0,
            end: self.config.screen.x1,
        }
    }

    fn y_axis(&self) -> Band {
        Band {
            start: self.config.screen.y0,
            end: self.config.screen.y1,
        }
    }

    fn first_index(&self) -> usize {
        match self.direction {
            SweepDirection::Forward => 0,
            SweepDirection::Backward => QUADRANTS - 1,
        }
    }

    fn first_offset(&self, band: Band) -> f64 {
        match self.direction {
            SweepDirection::Forward => 0.0,
            SweepDirection::Backward => band.last_offset(),
        }
    }
}

fn step_index(index: usize, direction: SweepDirection) -> usize {
    match direction {
        SweepDirection::Forward => (index + 1) % QUADRANTS,
        SweepDirection::Backward => (index + QUADRANTS - 1) % QUADRANTS,
    }
}

fn step_offset(band: Band, offset: f64, direction: SweepDirection) -> f64 {
    let last = band.last_offset();
    let next = offset + direction.sign() * LINE_STEP;
    if next > last + f64::EPSILON {
        0.0
    } else if next < -f64::EPSILON {
        last
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(delay_ms: u64) -> CursorEngine {
        CursorEngine::new(CursorConfig {
            screen: Rect::new(0.0, 0.0, 1080.0, 1920.0),
            confirm_delay: Duration::from_millis(delay_ms),
        })
    }

    #[test]
    fn four_selections_fix_both_axes_and_tap() {
        let mut cursor = engine(0);
        cursor.start();
        assert!(matches!(cursor.phase(), CursorPhase::XQuadrant { index: 0 }));

        cursor.tick();
        cursor.tick();
        assert_eq!(cursor.select(), PointOutcome::Narrowed);
        assert!(matches!(cursor.phase(), CursorPhase::XLine { .. }));

        cursor.tick();
        assert_eq!(cursor.select(), PointOutcome::Narrowed);
        let CursorPhase::YQuadrant { x, index: 0 } = cursor.phase() else {
            panic!("expected y quadrant, got {:?}", cursor.phase());
        };
        // Third quarter starts at 540; one line step in, centre of a 10px line.
        assert_eq!(x, 555.0);

        cursor.tick();
        assert_eq!(cursor.select(), PointOutcome::Narrowed);
        assert!(matches!(cursor.phase(), CursorPhase::YLine { .. }));

        let PointOutcome::Tap(point) = cursor.select() else {
            panic!("expected tap");
        };
        assert!(cursor.config().screen.contains(point));
        assert_eq!(point, Point::new(555.0, 485.0));
        assert!(matches!(cursor.phase(), CursorPhase::XQuadrant { index: 0 }));
    }

    #[test]
    fn quadrant_sweep_wraps() {
        let mut cursor = engine(0);
        cursor.start();
        for _ in 0..QUADRANTS {
            cursor.tick();
        }
        assert!(matches!(cursor.phase(), CursorPhase::XQuadrant { index: 0 }));
        cursor.move_previous();
        assert!(matches!(cursor.phase(), CursorPhase::XQuadrant { index: 3 }));
    }

    #[test]
    fn line_wraps_within_its_band() {
        let mut cursor = CursorEngine::new(CursorConfig {
            screen: Rect::new(0.0, 0.0, 120.0, 120.0),
            ..CursorConfig::default()
        });
        cursor.start();
        cursor.select();
        // A 30px quarter fits offsets 0, 10, 20.
        cursor.tick();
        cursor.tick();
        assert!(matches!(cursor.phase(), CursorPhase::XLine { offset, .. } if offset == 20.0));
        cursor.tick();
        assert!(matches!(cursor.phase(), CursorPhase::XLine { offset, .. } if offset == 0.0));
        cursor.move_previous();
        assert!(matches!(cursor.phase(), CursorPhase::XLine { offset, .. } if offset == 20.0));
    }

    #[test]
    fn line_phases_tick_faster() {
        let mut cursor = engine(0);
        cursor.start();
        let rate = Duration::from_millis(1000);
        assert_eq!(cursor.tick_interval(rate), rate);
        cursor.select();
        assert_eq!(cursor.tick_interval(rate), LINE_INTERVAL_CAP);
        assert_eq!(
            cursor.tick_interval(Duration::from_millis(120)),
            Duration::from_millis(120)
        );
    }

    #[test]
    fn confirmation_delay_then_tap_or_menu() {
        let mut cursor = engine(800);
        cursor.start();
        for _ in 0..3 {
            cursor.select();
        }
        let PointOutcome::Confirming(point) = cursor.select() else {
            panic!("expected confirmation");
        };
        assert!(cursor.is_confirming());
        assert_eq!(cursor.highlight(), Some(PointerHighlight::Point(point)));
        assert_eq!(cursor.confirm_expired(), Some(point));
        assert!(!cursor.is_confirming());

        for _ in 0..4 {
            cursor.select();
        }
        assert_eq!(cursor.select(), PointOutcome::ContextMenu(point));
        assert_eq!(cursor.confirm_expired(), None);
    }

    #[test]
    fn backward_direction_starts_at_far_end() {
        let mut cursor = engine(0);
        cursor.swap_direction();
        cursor.start();
        assert!(matches!(cursor.phase(), CursorPhase::XQuadrant { index: 3 }));
        cursor.tick();
        assert!(matches!(cursor.phase(), CursorPhase::XQuadrant { index: 2 }));
    }

    #[test]
    fn stop_and_reset_are_idempotent() {
        let mut cursor = engine(0);
        cursor.stop();
        assert_eq!(cursor.select(), PointOutcome::Nothing);
        assert_eq!(cursor.highlight(), None);
        cursor.start();
        cursor.select();
        cursor.reset();
        cursor.reset();
        assert!(matches!(cursor.phase(), CursorPhase::XQuadrant { index: 0 }));
        cursor.stop();
        cursor.stop();
        assert!(!cursor.is_running());
    }
}
