// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single-threaded event loop multiplexing host events and timer events.

use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use understory_scan_timer::{TimerBackend, TimerEvent};
use understory_scan_tree::Target;
use understory_switch_input::{SwitchAction, SwitchCode};

use crate::context::EngineContext;
use crate::settings::{ScanMethod, ScanSettings};
use crate::sinks::{ActivationSink, HighlightSink};

/// Input posted to [`run_loop`] by the host.
#[derive(Debug)]
pub enum EngineEvent {
    /// The on-screen targets changed.
    Targets {
        /// New target list.
        targets: Vec<Target>,
        /// Keep the item scanning position if it still exists.
        preserve: bool,
    },
    /// A switch went down.
    SwitchPressed {
        /// Switch code.
        code: SwitchCode,
        /// Receives whether the press was absorbed.
        reply: Option<Sender<bool>>,
    },
    /// A switch went up.
    SwitchReleased {
        /// Switch code.
        code: SwitchCode,
        /// Receives whether the release was absorbed.
        reply: Option<Sender<bool>>,
    },
    /// Perform a command as if a switch bound to it had been pressed.
    Action(SwitchAction),
    /// Replace the settings.
    Settings(Box<ScanSettings>),
    /// Change the scan method.
    Method(ScanMethod),
    /// Start scanning.
    Start,
    /// Stop scanning.
    Stop,
    /// Leave the loop.
    Shutdown,
}

/// A millisecond clock starting at zero when called.
pub fn monotonic_clock() -> impl FnMut() -> u64 {
    let origin = Instant::now();
    move || u64::try_from(origin.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Drive `engine` until [`EngineEvent::Shutdown`] arrives or the event
/// channel disconnects, then hand it back.
///
/// `timers` must be the queue the engine's timer backend posts into. Each
/// event is stamped with `clock()` before it is handled, so tests can supply a
/// scripted clock.
pub fn run_loop<A, H, B>(
    mut engine: EngineContext<A, H, B>,
    events: &Receiver<EngineEvent>,
    timers: &Receiver<TimerEvent>,
    mut clock: impl FnMut() -> u64,
) -> EngineContext<A, H, B>
where
    A: ActivationSink,
    H: HighlightSink,
    B: TimerBackend,
{
    tracing::debug!("scan loop started");
    loop {
        crossbeam_channel::select! {
            recv(events) -> event => {
                let Ok(event) = event else {
                    tracing::debug!("event channel closed");
                    break;
                };
                if !handle_event(&mut engine, event, clock()) {
                    break;
                }
            }
            recv(timers) -> event => {
                let Ok(event) = event else {
                    tracing::warn!("timer channel closed");
                    break;
                };
                engine.handle_timer(event, clock());
            }
        }
    }
    engine.stop_scanning();
    tracing::debug!("scan loop finished");
    engine
}

/// Returns `false` when the loop should end.
fn handle_event<A, H, B>(engine: &mut EngineContext<A, H, B>, event: EngineEvent, now: u64) -> bool
where
    A: ActivationSink,
    H: HighlightSink,
    B: TimerBackend,
{
    match event {
        EngineEvent::Targets { targets, preserve } => {
            if preserve {
                engine.set_targets_preserving(targets);
            } else {
                engine.set_targets(targets);
            }
        }
        EngineEvent::SwitchPressed { code, reply } => {
            let absorbed = engine.on_switch_pressed(code, now);
            send_reply(reply, absorbed);
        }
        EngineEvent::SwitchReleased { code, reply } => {
            let absorbed = engine.on_switch_released(code, now);
            send_reply(reply, absorbed);
        }
        EngineEvent::Action(action) => engine.perform(action),
        EngineEvent::Settings(settings) => {
            if let Err(err) = engine.set_settings(*settings) {
                tracing::warn!(%err, "rejected settings");
            }
        }
        EngineEvent::Method(method) => engine.set_scan_method(method),
        EngineEvent::Start => engine.start_scanning(),
        EngineEvent::Stop => engine.stop_scanning(),
        EngineEvent::Shutdown => return false,
    }
    true
}

fn send_reply(reply: Option<Sender<bool>>, absorbed: bool) {
    if let Some(reply) = reply
        && reply.send(absorbed).is_err()
    {
        tracing::trace!("switch reply dropped");
    }
}
