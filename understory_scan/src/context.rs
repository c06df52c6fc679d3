// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host-owned composition of every scanning component.

use core::time::Duration;

use kurbo::Rect;
use understory_pointer_scan::{CursorEngine, PointOutcome, RadarEngine};
use understory_scan_timer::backends::ManualBackend;
use understory_scan_timer::{Scheduler, TimerBackend, TimerEvent, TimerSlot};
use understory_scan_tree::{Rebuild, ScanTree, SelectOutcome, Target, TickOutcome};
use understory_switch_input::{SwitchAction, SwitchCode, SwitchInput};

use crate::error::SettingsError;
use crate::settings::{ScanMethod, ScanSettings};
use crate::sinks::{Activation, ActivationSink, HighlightScope, HighlightSink};

/// How long item scanning may wait for targets before falling back to cursor
/// scanning.
pub const WATCHDOG_TIMEOUT: Duration = Duration::from_secs(5);

/// One scanning engine: settings, the three strategies, switch input, timers,
/// and the two outbound sinks.
///
/// All mutation happens through `&mut self` on one thread. Timers arrive as
/// [`TimerEvent`]s through [`EngineContext::handle_timer`]; events from an
/// earlier arm of a slot are dropped there. Every operation ends by diffing
/// the active strategy's highlight against what was last sent to the
/// highlight sink.
///
/// ```rust
/// use kurbo::Rect;
/// use understory_scan::{Activation, EngineContext, NullSink, ScanMode, ScanSettings};
/// use understory_scan_timer::backends::ManualBackend;
/// use understory_scan_tree::{Target, TargetId};
/// use understory_switch_input::{SwitchAction, SwitchBinding, SwitchCode};
///
/// let settings = ScanSettings {
///     scan_mode: ScanMode::Manual,
///     bindings: vec![
///         SwitchBinding::new(1, SwitchAction::Select),
///         SwitchBinding::new(2, SwitchAction::Next),
///     ],
///     ..ScanSettings::default()
/// };
/// let mut engine = EngineContext::new(
///     settings,
///     Rect::new(0.0, 0.0, 1080.0, 1920.0),
///     Vec::<Activation>::new(),
///     NullSink,
///     ManualBackend::default(),
/// )
/// .unwrap();
/// engine.set_targets(vec![Target::from_xywh(7, 100.0, 100.0, 80.0, 80.0)]);
///
/// let mut now = 0;
/// for code in [1, 2, 1] {
///     now += 300;
///     engine.on_switch_pressed(SwitchCode(code), now);
///     engine.on_switch_released(SwitchCode(code), now + 50);
/// }
/// assert_eq!(engine.activation_sink(), &[Activation::Target(TargetId(7))]);
/// ```
#[derive(Debug)]
pub struct EngineContext<A, H, B: TimerBackend = ManualBackend> {
    settings: ScanSettings,
    screen: Rect,
    method: ScanMethod,
    scanning: bool,
    /// Held by the host until `resume_scanning`.
    paused: bool,
    tree: ScanTree,
    cursor: CursorEngine,
    radar: RadarEngine,
    input: SwitchInput,
    scheduler: Scheduler<B>,
    activations: A,
    highlights: H,
    shown: Option<HighlightScope>,
}

impl<A: ActivationSink, H: HighlightSink, B: TimerBackend> EngineContext<A, H, B> {
    /// Compose an idle engine.
    pub fn new(
        settings: ScanSettings,
        screen: Rect,
        activations: A,
        highlights: H,
        backend: B,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        let mut input = SwitchInput::new(settings.switch_timings());
        input.set_bindings(settings.bindings.iter().cloned());
        Ok(Self {
            method: settings.scan_method,
            scanning: false,
            paused: false,
            tree: ScanTree::new(settings.tree_config()),
            cursor: CursorEngine::new(settings.cursor_config(screen)),
            radar: RadarEngine::new(settings.radar_config(screen)),
            input,
            scheduler: Scheduler::new(backend),
            activations,
            highlights,
            shown: None,
            settings,
            screen,
        })
    }

    /// Current settings.
    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Apply new settings. A running session restarts under them.
    pub fn set_settings(&mut self, settings: ScanSettings) -> Result<(), SettingsError> {
        settings.validate()?;
        let was_scanning = self.scanning;
        let was_paused = self.paused;
        self.stop_scanning();
        self.tree.set_config(settings.tree_config());
        self.input.set_timings(settings.switch_timings());
        self.input.set_bindings(settings.bindings.iter().cloned());
        self.cursor.set_config(settings.cursor_config(self.screen));
        self.radar.set_config(settings.radar_config(self.screen));
        self.method = settings.scan_method;
        self.settings = settings;
        if was_scanning {
            self.start_scanning();
            if was_paused {
                self.pause_scanning();
            }
        }
        Ok(())
    }

    /// Area scanned by the cursor and radar strategies.
    pub fn screen(&self) -> Rect {
        self.screen
    }

    /// Change the scanned area. Running cursor or radar sweeps restart.
    pub fn set_screen(&mut self, screen: Rect) {
        self.screen = screen;
        self.cursor.set_config(self.settings.cursor_config(screen));
        self.radar.set_config(self.settings.radar_config(screen));
        self.refresh_highlight();
    }

    /// Replace the target list, resetting item scanning.
    pub fn set_targets(&mut self, targets: Vec<Target>) {
        self.replace_targets(targets, Rebuild::Reset);
    }

    /// Replace the target list, keeping the item scanning position when it
    /// still exists.
    pub fn set_targets_preserving(&mut self, targets: Vec<Target>) {
        self.replace_targets(targets, Rebuild::Preserve);
    }

    fn replace_targets(&mut self, targets: Vec<Target>, mode: Rebuild) {
        self.tree.set_targets(targets, mode);
        if self.scanning && self.method == ScanMethod::Item {
            if self.tree.is_empty() {
                self.scheduler.start_once(TimerSlot::Watchdog, WATCHDOG_TIMEOUT);
            } else {
                self.scheduler.stop(TimerSlot::Watchdog);
                if self.settings.is_auto() && self.tree.state().is_armed() {
                    self.tree.tick();
                    self.restart_scan_timer();
                }
            }
        }
        self.refresh_highlight();
    }

    /// Active strategy.
    pub fn scan_method(&self) -> ScanMethod {
        self.method
    }

    /// Switch strategy. A running session continues with the new one.
    pub fn set_scan_method(&mut self, method: ScanMethod) {
        if method == self.method {
            return;
        }
        tracing::info!(from = ?self.method, to = ?method, "scan method changed");
        self.stop_strategy();
        self.method = method;
        if self.scanning {
            self.start_strategy();
        }
        self.refresh_highlight();
    }

    /// Whether a session is running.
    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    /// Whether the scan timer is paused, by the host or while a point awaits
    /// confirmation.
    pub fn is_paused(&self) -> bool {
        self.paused || self.scheduler.is_paused(TimerSlot::Scan)
    }

    /// Start a session with the active strategy. Does nothing if running.
    pub fn start_scanning(&mut self) {
        if self.scanning {
            return;
        }
        self.scanning = true;
        tracing::info!(method = ?self.method, mode = ?self.settings.scan_mode, "scanning started");
        self.start_strategy();
        self.refresh_highlight();
    }

    /// End the session. Safe to call in any state.
    pub fn stop_scanning(&mut self) {
        if !self.scanning {
            return;
        }
        self.scanning = false;
        self.paused = false;
        self.stop_strategy();
        tracing::info!("scanning stopped");
        self.refresh_highlight();
    }

    /// Suspend the scan timer without losing the position.
    ///
    /// The pause holds across manual steps and selections until
    /// [`EngineContext::resume_scanning`] or the session stops.
    pub fn pause_scanning(&mut self) {
        if !self.scanning {
            return;
        }
        self.paused = true;
        self.scheduler.pause(TimerSlot::Scan);
    }

    /// Resume a paused scan timer with a fresh interval.
    ///
    /// A point awaiting confirmation keeps the timer paused until it is tapped
    /// or dismissed.
    pub fn resume_scanning(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        if !self.is_confirming() {
            self.scheduler.resume(TimerSlot::Scan);
        }
    }

    /// Feed a switch press. Returns whether the event was absorbed.
    pub fn on_switch_pressed(&mut self, code: SwitchCode, now: u64) -> bool {
        let outcome = self.input.on_press(code, now);
        if let Some(delay) = outcome.hold_timer {
            self.scheduler.restart_once(TimerSlot::Hold, delay);
        }
        outcome.absorbed
    }

    /// Feed a switch release. Returns whether the event was absorbed.
    pub fn on_switch_released(&mut self, code: SwitchCode, now: u64) -> bool {
        let outcome = self.input.on_release(code, now);
        if outcome.cancel_hold {
            self.scheduler.stop(TimerSlot::Hold);
        }
        if let Some(action) = outcome.action {
            self.perform(action);
        }
        outcome.absorbed
    }

    /// Dispatch a timer event. Stale events are ignored.
    pub fn handle_timer(&mut self, event: TimerEvent, now: u64) {
        if !self.scheduler.accept(&event) {
            return;
        }
        match event.slot {
            TimerSlot::Scan => self.on_scan_tick(),
            TimerSlot::Hold => {
                let outcome = self.input.on_hold_timer(now);
                if let Some(delay) = outcome.rearm {
                    self.scheduler.start_once(TimerSlot::Hold, delay);
                }
                if let Some(action) = outcome.action {
                    self.perform(action);
                }
            }
            TimerSlot::AutoSelect => self.on_confirm_expired(),
            TimerSlot::Watchdog => self.on_watchdog(),
        }
    }

    /// Perform a command on the active strategy.
    pub fn perform(&mut self, action: SwitchAction) {
        tracing::debug!(?action, "switch action");
        match action {
            SwitchAction::Select => self.select(),
            SwitchAction::Next => self.step(true),
            SwitchAction::Previous => self.step(false),
            SwitchAction::SwapDirection => self.swap_direction(),
            SwitchAction::StopScanning => self.stop_scanning(),
            SwitchAction::ToggleScanMethod => self.set_scan_method(self.method.next()),
            SwitchAction::OpenMenu => self.dispatch(Activation::Menu),
            SwitchAction::System(action) => self.dispatch(Activation::System(action)),
            SwitchAction::None => {}
        }
    }

    /// Act on the highlight. While no session runs this only starts one.
    pub fn select(&mut self) {
        if !self.scanning {
            self.start_scanning();
            return;
        }
        match self.method {
            ScanMethod::Item => match self.tree.select() {
                SelectOutcome::Nothing => {}
                SelectOutcome::Navigated => self.restart_scan_timer(),
                SelectOutcome::Activated(id) => {
                    self.dispatch(Activation::Target(id));
                    self.after_activation();
                }
            },
            ScanMethod::Cursor => {
                let outcome = self.cursor.select();
                self.on_point_outcome(outcome);
            }
            ScanMethod::Radar => {
                let outcome = self.radar.select();
                self.on_point_outcome(outcome);
            }
        }
        self.refresh_highlight();
    }

    /// Step the active strategy forward (`true`) or backward.
    ///
    /// While no session runs this starts one, and only steps if the start left
    /// nothing highlighted.
    pub fn step(&mut self, forward: bool) {
        if !self.scanning {
            self.start_scanning();
            if self.shown.is_some() {
                return;
            }
        }
        match (self.method, forward) {
            (ScanMethod::Item, true) => {
                self.tree.move_next();
            }
            (ScanMethod::Item, false) => {
                self.tree.move_previous();
            }
            (ScanMethod::Cursor, true) => self.cursor.move_next(),
            (ScanMethod::Cursor, false) => self.cursor.move_previous(),
            (ScanMethod::Radar, true) => self.radar.move_next(),
            (ScanMethod::Radar, false) => self.radar.move_previous(),
        }
        self.restart_scan_timer();
        self.refresh_highlight();
    }

    /// Reverse the direction of the active strategy.
    pub fn swap_direction(&mut self) {
        match self.method {
            ScanMethod::Item => self.tree.swap_direction(),
            ScanMethod::Cursor => self.cursor.swap_direction(),
            ScanMethod::Radar => self.radar.swap_direction(),
        }
        self.refresh_highlight();
    }

    /// Item scanning state.
    pub fn tree(&self) -> &ScanTree {
        &self.tree
    }

    /// Cursor scanning state.
    pub fn cursor(&self) -> &CursorEngine {
        &self.cursor
    }

    /// Radar scanning state.
    pub fn radar(&self) -> &RadarEngine {
        &self.radar
    }

    /// Switch input state.
    pub fn input(&self) -> &SwitchInput {
        &self.input
    }

    /// Timer state.
    pub fn scheduler(&self) -> &Scheduler<B> {
        &self.scheduler
    }

    /// Mutable timer state, for hosts that drive a manual backend.
    pub fn scheduler_mut(&mut self) -> &mut Scheduler<B> {
        &mut self.scheduler
    }

    /// The activation sink.
    pub fn activation_sink(&self) -> &A {
        &self.activations
    }

    /// The highlight sink.
    pub fn highlight_sink(&self) -> &H {
        &self.highlights
    }

    /// What was last sent to the highlight sink.
    pub fn current_highlight(&self) -> Option<&HighlightScope> {
        self.shown.as_ref()
    }

    fn start_strategy(&mut self) {
        match self.method {
            ScanMethod::Item => {
                self.tree.start();
                if self.tree.is_empty() {
                    tracing::debug!("no targets yet, arming watchdog");
                    self.scheduler.start_once(TimerSlot::Watchdog, WATCHDOG_TIMEOUT);
                } else if self.settings.is_auto() {
                    self.tree.tick();
                }
            }
            ScanMethod::Cursor => self.cursor.start(),
            ScanMethod::Radar => self.radar.start(),
        }
        self.restart_scan_timer();
    }

    fn stop_strategy(&mut self) {
        self.tree.stop();
        self.cursor.stop();
        self.radar.stop();
        for slot in [TimerSlot::Scan, TimerSlot::AutoSelect, TimerSlot::Watchdog] {
            self.scheduler.stop(slot);
        }
    }

    fn scan_interval(&self) -> Duration {
        let rate = self.settings.scan_rate();
        match self.method {
            ScanMethod::Item if self.tree.is_on_first_element() => {
                rate + self.settings.first_item_delay()
            }
            ScanMethod::Item | ScanMethod::Radar => rate,
            ScanMethod::Cursor => self.cursor.tick_interval(rate),
        }
    }

    /// Re-arm the scan timer with a fresh interval, in auto mode. A host pause
    /// leaves the new arm paused.
    fn restart_scan_timer(&mut self) {
        self.scheduler.stop(TimerSlot::Scan);
        if self.scanning && self.settings.is_auto() {
            self.scheduler.start(TimerSlot::Scan, self.scan_interval());
            if self.paused {
                self.scheduler.pause(TimerSlot::Scan);
            }
        }
    }

    fn is_confirming(&self) -> bool {
        match self.method {
            ScanMethod::Item => false,
            ScanMethod::Cursor => self.cursor.is_confirming(),
            ScanMethod::Radar => self.radar.is_confirming(),
        }
    }

    fn on_scan_tick(&mut self) {
        match self.method {
            ScanMethod::Item => match self.tree.tick() {
                TickOutcome::CycleLimitReached => {
                    tracing::info!(limit = self.settings.cycle_limit, "cycle limit reached");
                    self.stop_scanning();
                    return;
                }
                TickOutcome::Advanced(_) => {
                    let interval = self.scan_interval();
                    self.scheduler.set_interval(TimerSlot::Scan, interval);
                }
                TickOutcome::Idle => {}
            },
            ScanMethod::Cursor => self.cursor.tick(),
            ScanMethod::Radar => self.radar.tick(),
        }
        self.refresh_highlight();
    }

    fn on_point_outcome(&mut self, outcome: PointOutcome) {
        match outcome {
            PointOutcome::Nothing => {}
            PointOutcome::Narrowed => self.restart_scan_timer(),
            PointOutcome::Confirming(point) => {
                tracing::debug!(?point, "awaiting confirmation");
                self.scheduler.pause(TimerSlot::Scan);
                self.scheduler
                    .restart_once(TimerSlot::AutoSelect, self.settings.auto_select_delay());
            }
            PointOutcome::Tap(point) => {
                self.dispatch(Activation::Tap(point));
                self.after_activation();
            }
            PointOutcome::ContextMenu(point) => {
                self.scheduler.stop(TimerSlot::AutoSelect);
                self.dispatch(Activation::ContextMenu(point));
                self.after_activation();
            }
        }
    }

    fn on_confirm_expired(&mut self) {
        let point = match self.method {
            ScanMethod::Item => None,
            ScanMethod::Cursor => self.cursor.confirm_expired(),
            ScanMethod::Radar => self.radar.confirm_expired(),
        };
        if let Some(point) = point {
            self.dispatch(Activation::Tap(point));
            self.after_activation();
        }
        self.refresh_highlight();
    }

    fn on_watchdog(&mut self) {
        if self.scanning && self.method == ScanMethod::Item && self.tree.is_empty() {
            tracing::warn!(
                timeout = ?WATCHDOG_TIMEOUT,
                "no scan targets appeared, falling back to cursor scanning"
            );
            self.set_scan_method(ScanMethod::Cursor);
        }
    }

    fn after_activation(&mut self) {
        if self.settings.stop_scanning_on_select {
            self.stop_scanning();
            return;
        }
        if self.method == ScanMethod::Item && self.settings.is_auto() {
            self.tree.tick();
        }
        self.restart_scan_timer();
    }

    fn dispatch(&mut self, activation: Activation) {
        tracing::debug!(?activation, "activating");
        if let Err(err) = self.activations.activate(&activation) {
            tracing::warn!(%err, ?activation, "activation failed");
        }
    }

    fn refresh_highlight(&mut self) {
        let current = match self.method {
            ScanMethod::Item => self.tree.highlight().map(HighlightScope::Tree),
            ScanMethod::Cursor => self.cursor.highlight().map(HighlightScope::Pointer),
            ScanMethod::Radar => self.radar.highlight().map(HighlightScope::Pointer),
        };
        if current == self.shown {
            return;
        }
        if let Some(old) = self.shown.take() {
            self.highlights.unhighlight(&old);
        }
        if let Some(new) = &current {
            self.highlights.highlight(new);
        }
        self.shown = current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use crate::settings::ScanMode;
    use crate::sinks::{HighlightChange, NullSink};
    use kurbo::{Point, Vec2};
    use understory_pointer_scan::{CursorPhase, PointerHighlight, RadarPhase};
    use understory_scan_tree::{HighlightKind, TargetId};
    use understory_switch_input::SwitchBinding;

    const SELECT: SwitchCode = SwitchCode(1);
    const NEXT: SwitchCode = SwitchCode(2);

    type TestEngine = EngineContext<Vec<Activation>, Vec<HighlightChange>>;

    fn settings(mode: ScanMode) -> ScanSettings {
        ScanSettings {
            scan_mode: mode,
            bindings: vec![
                SwitchBinding::new(1, SwitchAction::Select),
                SwitchBinding::new(2, SwitchAction::Next),
            ],
            ..ScanSettings::default()
        }
    }

    fn engine(settings: ScanSettings) -> TestEngine {
        EngineContext::new(
            settings,
            Rect::new(0.0, 0.0, 1080.0, 1920.0),
            Vec::new(),
            Vec::new(),
            ManualBackend::default(),
        )
        .unwrap()
    }

    /// `rows` rows of `cols` well-separated targets, ids `row * 10 + col`.
    fn grid(rows: u64, cols: u64) -> Vec<Target> {
        let mut out = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                out.push(Target::from_xywh(
                    r * 10 + c,
                    c as f64 * 200.0,
                    r as f64 * 200.0,
                    80.0,
                    80.0,
                ));
            }
        }
        out
    }

    fn tap<A: ActivationSink, H: HighlightSink>(
        engine: &mut EngineContext<A, H>,
        code: SwitchCode,
        now: &mut u64,
    ) {
        *now += 400;
        engine.on_switch_pressed(code, *now);
        engine.on_switch_released(code, *now + 40);
    }

    fn fire<A: ActivationSink, H: HighlightSink>(
        engine: &mut EngineContext<A, H>,
        slot: TimerSlot,
        now: u64,
    ) -> bool {
        match engine.scheduler_mut().backend_mut().fire(slot) {
            Some(event) => {
                engine.handle_timer(event, now);
                true
            }
            None => false,
        }
    }

    #[test]
    fn manual_single_row_select_next_next_select_activates_second_item() {
        let mut engine = engine(settings(ScanMode::Manual));
        engine.set_targets(grid(1, 3));
        let mut now = 0;
        tap(&mut engine, SELECT, &mut now);
        assert!(engine.is_scanning());
        assert!(engine.activation_sink().is_empty());
        tap(&mut engine, NEXT, &mut now);
        tap(&mut engine, NEXT, &mut now);
        tap(&mut engine, SELECT, &mut now);
        assert_eq!(engine.activation_sink(), &[Activation::Target(TargetId(1))]);
    }

    #[test]
    fn unbound_switch_is_not_absorbed() {
        let mut engine = engine(settings(ScanMode::Manual));
        assert!(!engine.on_switch_pressed(SwitchCode(99), 0));
        assert!(!engine.on_switch_released(SwitchCode(99), 10));
        assert!(!engine.is_scanning());
    }

    #[test]
    fn bounced_select_arms_once_and_activates_nothing() {
        let mut engine = engine(ScanSettings {
            ignore_repeat_delay_ms: 200,
            ..settings(ScanMode::Manual)
        });
        engine.set_targets(grid(2, 2));
        assert!(engine.on_switch_pressed(SELECT, 1000));
        assert!(engine.on_switch_released(SELECT, 1030));
        assert!(engine.on_switch_pressed(SELECT, 1080));
        assert!(engine.on_switch_released(SELECT, 1100));
        assert!(engine.is_scanning());
        assert!(engine.activation_sink().is_empty());
        assert!(engine.tree().state().is_armed());
    }

    #[test]
    fn auto_start_highlights_first_row_and_ticks() {
        let mut engine = engine(settings(ScanMode::Auto));
        engine.set_targets(grid(3, 2));
        engine.start_scanning();
        assert_eq!(engine.tree().state().current_row(), Some(0));
        assert_eq!(
            engine.scheduler().interval(TimerSlot::Scan),
            Some(Duration::from_millis(1000))
        );
        assert!(fire(&mut engine, TimerSlot::Scan, 1000));
        assert_eq!(engine.tree().state().current_row(), Some(1));
    }

    #[test]
    fn auto_scan_stops_at_cycle_limit() {
        let mut engine = engine(ScanSettings {
            cycle_limit: 2,
            ..settings(ScanMode::Auto)
        });
        engine.set_targets(grid(3, 2));
        engine.start_scanning();
        let mut ticks = 0;
        while engine.is_scanning() {
            ticks += 1;
            assert!(fire(&mut engine, TimerSlot::Scan, ticks * 1000));
            assert!(ticks < 100, "scanning never stopped");
        }
        // Start shows row 0; the wrap completing the second traversal stops it.
        assert_eq!(ticks, 6);
        assert!(!engine.scheduler().is_running(TimerSlot::Scan));
        assert!(engine.current_highlight().is_none());
    }

    #[test]
    fn first_item_delay_lengthens_dwell_on_first_element() {
        let mut engine = engine(ScanSettings {
            first_item_delay_ms: 300,
            ..settings(ScanMode::Auto)
        });
        engine.set_targets(grid(3, 2));
        engine.start_scanning();
        assert_eq!(
            engine.scheduler().interval(TimerSlot::Scan),
            Some(Duration::from_millis(1300))
        );
        fire(&mut engine, TimerSlot::Scan, 1300);
        assert_eq!(
            engine.scheduler().interval(TimerSlot::Scan),
            Some(Duration::from_millis(1000))
        );
    }

    #[test]
    fn watchdog_falls_back_to_cursor_when_no_targets_appear() {
        let mut engine = engine(settings(ScanMode::Auto));
        engine.start_scanning();
        assert!(engine.scheduler().is_running(TimerSlot::Watchdog));
        assert!(fire(&mut engine, TimerSlot::Watchdog, 5000));
        assert_eq!(engine.scan_method(), ScanMethod::Cursor);
        assert!(matches!(engine.cursor().phase(), CursorPhase::XQuadrant { .. }));
        assert!(engine.is_scanning());
    }

    #[test]
    fn watchdog_is_cancelled_when_targets_arrive() {
        let mut engine = engine(settings(ScanMode::Auto));
        engine.start_scanning();
        engine.set_targets(grid(2, 2));
        assert!(!engine.scheduler().is_running(TimerSlot::Watchdog));
        assert!(!fire(&mut engine, TimerSlot::Watchdog, 5000));
        assert_eq!(engine.scan_method(), ScanMethod::Item);
        // Targets arriving mid-session are scanned straight away.
        assert_eq!(engine.tree().state().current_row(), Some(0));
    }

    #[test]
    fn stop_scanning_on_select_ends_session() {
        let mut engine = engine(ScanSettings {
            stop_scanning_on_select: true,
            ..settings(ScanMode::Manual)
        });
        engine.set_targets(grid(1, 1));
        let mut now = 0;
        tap(&mut engine, SELECT, &mut now);
        tap(&mut engine, NEXT, &mut now);
        tap(&mut engine, SELECT, &mut now);
        assert_eq!(engine.activation_sink(), &[Activation::Target(TargetId(0))]);
        assert!(!engine.is_scanning());
    }

    #[derive(Debug, Default)]
    struct FailingSink {
        attempts: usize,
    }

    impl ActivationSink for FailingSink {
        fn activate(&mut self, activation: &Activation) -> Result<(), SinkError> {
            self.attempts += 1;
            match activation {
                Activation::Target(id) => Err(SinkError::TargetGone(*id)),
                _ => Err(SinkError::Dispatch("no gesture service".into())),
            }
        }
    }

    #[test]
    fn sink_errors_are_swallowed() {
        let mut engine = EngineContext::new(
            settings(ScanMode::Manual),
            Rect::new(0.0, 0.0, 100.0, 100.0),
            FailingSink::default(),
            NullSink,
            ManualBackend::default(),
        )
        .unwrap();
        engine.set_targets(grid(1, 2));
        let mut now = 0;
        tap(&mut engine, SELECT, &mut now);
        tap(&mut engine, NEXT, &mut now);
        tap(&mut engine, SELECT, &mut now);
        assert_eq!(engine.activation_sink().attempts, 1);
        assert!(engine.is_scanning());
        tap(&mut engine, NEXT, &mut now);
        tap(&mut engine, SELECT, &mut now);
        assert_eq!(engine.activation_sink().attempts, 2);
    }

    #[test]
    fn highlight_changes_are_paired() {
        let mut engine = engine(settings(ScanMode::Auto));
        engine.set_targets(grid(2, 2));
        engine.start_scanning();
        fire(&mut engine, TimerSlot::Scan, 1000);
        engine.stop_scanning();

        let changes = engine.highlight_sink();
        assert_eq!(changes.len(), 4);
        let kinds: Vec<_> = changes
            .iter()
            .map(|c| match c {
                HighlightChange::Show(HighlightScope::Tree(h)) => (true, h.kind, h.targets[0]),
                HighlightChange::Hide(HighlightScope::Tree(h)) => (false, h.kind, h.targets[0]),
                other => panic!("unexpected change {other:?}"),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                (true, HighlightKind::Row, TargetId(0)),
                (false, HighlightKind::Row, TargetId(0)),
                (true, HighlightKind::Row, TargetId(10)),
                (false, HighlightKind::Row, TargetId(10)),
            ]
        );
    }

    #[test]
    fn stale_scan_tick_after_stop_is_ignored() {
        let mut engine = engine(settings(ScanMode::Auto));
        engine.set_targets(grid(2, 2));
        engine.start_scanning();
        let event = engine
            .scheduler_mut()
            .backend_mut()
            .fire(TimerSlot::Scan)
            .unwrap();
        engine.stop_scanning();
        engine.start_scanning();
        engine.handle_timer(event, 1000);
        assert_eq!(engine.tree().state().current_row(), Some(0));
    }

    #[test]
    fn hold_action_fires_from_hold_timer() {
        let mut engine = engine(ScanSettings {
            bindings: vec![SwitchBinding::new(1, SwitchAction::Select).with_hold(SwitchAction::OpenMenu)],
            ..settings(ScanMode::Manual)
        });
        assert!(engine.on_switch_pressed(SELECT, 0));
        assert!(engine.scheduler().is_running(TimerSlot::Hold));
        assert!(fire(&mut engine, TimerSlot::Hold, 500));
        assert_eq!(engine.activation_sink(), &[Activation::Menu]);
        assert!(engine.on_switch_released(SELECT, 700));
        assert!(!engine.is_scanning());
    }

    #[test]
    fn cursor_confirmation_taps_on_expiry() {
        let mut engine = engine(ScanSettings {
            scan_method: ScanMethod::Cursor,
            auto_select_delay_ms: 600,
            ..settings(ScanMode::Auto)
        });
        engine.start_scanning();
        for _ in 0..3 {
            engine.select();
        }
        assert_eq!(
            engine.scheduler().interval(TimerSlot::Scan),
            Some(understory_pointer_scan::cursor::LINE_INTERVAL_CAP)
        );
        engine.select();
        assert!(engine.cursor().is_confirming());
        assert!(engine.is_paused());
        assert!(fire(&mut engine, TimerSlot::AutoSelect, 0));
        assert!(matches!(engine.activation_sink().as_slice(), [Activation::Tap(_)]));
        assert!(!engine.is_paused());
        assert!(engine.scheduler().is_running(TimerSlot::Scan));
    }

    #[test]
    fn toggle_cycles_methods_and_keeps_session() {
        let mut engine = engine(settings(ScanMode::Manual));
        engine.start_scanning();
        engine.perform(SwitchAction::ToggleScanMethod);
        assert_eq!(engine.scan_method(), ScanMethod::Cursor);
        engine.perform(SwitchAction::ToggleScanMethod);
        assert_eq!(engine.scan_method(), ScanMethod::Radar);
        assert!(engine.radar().is_running());
        assert!(!engine.cursor().is_running());
        engine.perform(SwitchAction::ToggleScanMethod);
        assert_eq!(engine.scan_method(), ScanMethod::Item);
        assert!(engine.is_scanning());
    }

    #[test]
    fn pause_and_resume_scan_timer() {
        let mut engine = engine(settings(ScanMode::Auto));
        engine.set_targets(grid(2, 2));
        engine.start_scanning();
        engine.pause_scanning();
        assert!(engine.is_paused());
        assert!(!fire(&mut engine, TimerSlot::Scan, 1000));
        engine.resume_scanning();
        assert!(fire(&mut engine, TimerSlot::Scan, 2000));
        assert_eq!(engine.tree().state().current_row(), Some(1));
    }

    #[test]
    fn pause_holds_across_select_and_step() {
        let mut engine = engine(settings(ScanMode::Auto));
        engine.set_targets(grid(2, 2));
        engine.start_scanning();
        engine.pause_scanning();

        engine.select();
        assert_eq!(engine.tree().state().current_column(), Some(0));
        assert!(engine.is_paused());
        assert!(engine.scheduler().is_paused(TimerSlot::Scan));
        assert!(!fire(&mut engine, TimerSlot::Scan, 1000));

        engine.step(true);
        assert_eq!(engine.tree().state().current_column(), Some(1));
        assert!(engine.is_paused());
        assert!(!fire(&mut engine, TimerSlot::Scan, 2000));

        engine.resume_scanning();
        assert!(!engine.is_paused());
        assert!(fire(&mut engine, TimerSlot::Scan, 3000));
    }

    #[test]
    fn resume_waits_for_pending_confirmation() {
        let mut engine = engine(ScanSettings {
            scan_method: ScanMethod::Cursor,
            auto_select_delay_ms: 600,
            ..settings(ScanMode::Auto)
        });
        engine.start_scanning();
        engine.pause_scanning();
        for _ in 0..4 {
            engine.select();
        }
        assert!(engine.cursor().is_confirming());

        engine.resume_scanning();
        assert!(engine.is_paused());
        assert!(!fire(&mut engine, TimerSlot::Scan, 0));

        assert!(fire(&mut engine, TimerSlot::AutoSelect, 600));
        assert!(matches!(engine.activation_sink().as_slice(), [Activation::Tap(_)]));
        assert!(!engine.is_paused());
        assert!(engine.scheduler().is_running(TimerSlot::Scan));
    }

    #[test]
    fn stopping_clears_pause() {
        let mut engine = engine(settings(ScanMode::Auto));
        engine.set_targets(grid(2, 2));
        engine.start_scanning();
        engine.pause_scanning();
        engine.stop_scanning();
        assert!(!engine.is_paused());
        engine.start_scanning();
        assert!(!engine.is_paused());
        assert!(engine.scheduler().is_running(TimerSlot::Scan));
    }

    #[test]
    fn pause_is_ignored_while_idle() {
        let mut engine = engine(settings(ScanMode::Auto));
        engine.pause_scanning();
        assert!(!engine.is_paused());
    }

    #[test]
    fn new_settings_restart_running_session() {
        let mut engine = engine(settings(ScanMode::Auto));
        engine.set_targets(grid(3, 2));
        engine.start_scanning();
        fire(&mut engine, TimerSlot::Scan, 1000);
        assert_eq!(engine.tree().state().current_row(), Some(1));

        engine
            .set_settings(ScanSettings {
                scan_rate_ms: 500,
                cycle_limit: 7,
                ..settings(ScanMode::Auto)
            })
            .unwrap();
        assert!(engine.is_scanning());
        assert_eq!(engine.settings().scan_rate_ms, 500);
        assert_eq!(engine.tree().config().cycle_limit, 7);
        assert_eq!(engine.tree().state().current_row(), Some(0));
        assert_eq!(
            engine.scheduler().interval(TimerSlot::Scan),
            Some(Duration::from_millis(500))
        );
    }

    #[test]
    fn new_settings_keep_pause_and_may_switch_method() {
        let mut engine = engine(settings(ScanMode::Auto));
        engine.set_targets(grid(2, 2));
        engine.start_scanning();
        engine.pause_scanning();

        engine
            .set_settings(ScanSettings {
                scan_method: ScanMethod::Radar,
                ..settings(ScanMode::Auto)
            })
            .unwrap();
        assert_eq!(engine.scan_method(), ScanMethod::Radar);
        assert!(engine.radar().is_running());
        assert!(!engine.tree().is_running());
        assert!(engine.is_paused());
        assert!(!fire(&mut engine, TimerSlot::Scan, 1000));
    }

    #[test]
    fn rejected_settings_leave_engine_untouched() {
        let mut engine = engine(settings(ScanMode::Auto));
        engine.set_targets(grid(2, 2));
        engine.start_scanning();
        let err = engine
            .set_settings(ScanSettings {
                scan_rate_ms: 0,
                ..ScanSettings::default()
            })
            .unwrap_err();
        assert!(matches!(err, SettingsError::ZeroScanRate));
        assert!(engine.is_scanning());
        assert_eq!(engine.settings().bindings.len(), 2);
    }

    #[test]
    fn new_screen_restarts_cursor_sweep_over_it() {
        let mut engine = engine(ScanSettings {
            scan_method: ScanMethod::Cursor,
            ..settings(ScanMode::Manual)
        });
        engine.start_scanning();
        engine.select();
        assert!(matches!(engine.cursor().phase(), CursorPhase::XLine { .. }));

        let screen = Rect::new(0.0, 0.0, 400.0, 800.0);
        engine.set_screen(screen);
        assert_eq!(engine.screen(), screen);
        assert_eq!(engine.cursor().phase(), CursorPhase::XQuadrant { index: 0 });
        assert_eq!(engine.radar().center(), Point::new(200.0, 400.0));

        let band = HighlightScope::Pointer(PointerHighlight::Band(Rect::new(
            0.0, 0.0, 100.0, 800.0,
        )));
        assert_eq!(engine.current_highlight(), Some(&band));
        assert_eq!(
            engine.highlight_sink().last(),
            Some(&HighlightChange::Show(band))
        );
    }

    #[test]
    fn preserving_targets_keeps_position_while_valid() {
        let mut engine = engine(settings(ScanMode::Auto));
        engine.set_targets(grid(3, 2));
        engine.start_scanning();
        fire(&mut engine, TimerSlot::Scan, 1000);
        assert_eq!(engine.tree().state().current_row(), Some(1));

        engine.set_targets_preserving(grid(3, 2));
        assert_eq!(engine.tree().state().current_row(), Some(1));

        // Row 1 no longer exists: scanning restarts inside the only row.
        engine.set_targets_preserving(grid(1, 2));
        assert_eq!(engine.tree().state().current_row(), Some(0));
        assert_eq!(engine.tree().state().current_column(), Some(0));
        assert!(engine.scheduler().is_running(TimerSlot::Scan));
    }

    #[test]
    fn replacing_targets_resets_position() {
        let mut engine = engine(settings(ScanMode::Auto));
        engine.set_targets(grid(3, 2));
        engine.start_scanning();
        fire(&mut engine, TimerSlot::Scan, 1000);
        engine.set_targets(grid(3, 2));
        assert_eq!(engine.tree().state().current_row(), Some(0));
    }

    #[test]
    fn radar_session_taps_fixed_point() {
        let mut engine = engine(ScanSettings {
            scan_method: ScanMethod::Radar,
            ..settings(ScanMode::Manual)
        });
        engine.start_scanning();
        for _ in 0..4 {
            engine.step(true);
        }
        engine.select();
        assert!(matches!(engine.radar().phase(), RadarPhase::Moving { .. }));
        for _ in 0..6 {
            engine.step(true);
        }
        engine.select();

        let radar = engine.radar();
        let r = 0.30 * radar.reach(40.0);
        let (sin, cos) = 40.0_f64.to_radians().sin_cos();
        let expected = radar.center() + Vec2::new(r * cos, r * sin);
        match engine.activation_sink().as_slice() {
            [Activation::Tap(point)] => {
                assert!(
                    (*point - expected).hypot() < 1e-6,
                    "tapped {point:?}, expected {expected:?}"
                );
            }
            other => panic!("unexpected activations {other:?}"),
        }
        assert_eq!(engine.radar().phase(), RadarPhase::Rotating { angle: 0.0 });
        assert!(engine.is_scanning());
    }
}
