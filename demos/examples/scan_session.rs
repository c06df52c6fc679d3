// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A scripted auto-scan session over a small keypad.
//!
//! This example shows how to:
//! - load `ScanSettings` from JSON,
//! - run the engine on its own thread with real timers,
//! - feed it switch events and print what it highlights and activates.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_scan_demos --example scan_session`

use std::thread;
use std::time::Duration;

use kurbo::Rect;
use tracing_subscriber::EnvFilter;
use understory_scan::{
    Activation, EngineContext, EngineEvent, HighlightChange, HighlightScope, ScanSettings,
    monotonic_clock, run_loop,
};
use understory_scan_timer::backends::ThreadBackend;
use understory_scan_tree::Target;
use understory_switch_input::SwitchCode;

const SETTINGS: &str = r#"{
    "scan_rate_ms": 400,
    "first_item_delay_ms": 200,
    "cycle_limit": 2,
    "bindings": [
        { "code": 66, "press": "select", "hold": ["open_menu"] },
        { "code": 62, "press": "next" }
    ]
}"#;

/// A 3x3 keypad, ids 1 through 9.
fn keypad() -> Vec<Target> {
    (0..9)
        .map(|i| {
            let (row, col) = (i / 3, i % 3);
            Target::from_xywh(
                i + 1,
                100.0 + col as f64 * 150.0,
                400.0 + row as f64 * 150.0,
                100.0,
                100.0,
            )
        })
        .collect()
}

fn describe(scope: &HighlightScope) -> String {
    match scope {
        HighlightScope::Tree(h) => format!("{:?} {:?}", h.kind, h.targets.as_slice()),
        HighlightScope::Pointer(p) => format!("{p:?}"),
    }
}

fn tap(events: &crossbeam_channel::Sender<EngineEvent>, code: u32) {
    for event in [
        EngineEvent::SwitchPressed {
            code: SwitchCode(code),
            reply: None,
        },
        EngineEvent::SwitchReleased {
            code: SwitchCode(code),
            reply: None,
        },
    ] {
        if events.send(event).is_err() {
            tracing::warn!(code, "engine loop gone, switch event dropped");
            return;
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = match ScanSettings::from_json(SETTINGS) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::error!(%err, "bad settings");
            return;
        }
    };

    let (backend, timers) = ThreadBackend::channel();
    let (activation_tx, activation_rx) = crossbeam_channel::unbounded::<Activation>();
    let (highlight_tx, highlight_rx) = crossbeam_channel::unbounded::<HighlightChange>();
    let engine = match EngineContext::new(
        settings,
        Rect::new(0.0, 0.0, 600.0, 1000.0),
        activation_tx,
        highlight_tx,
        backend,
    ) {
        Ok(engine) => engine,
        Err(err) => {
            tracing::error!(%err, "engine rejected settings");
            return;
        }
    };

    let (events, inbox) = crossbeam_channel::unbounded();
    let worker = thread::spawn(move || run_loop(engine, &inbox, &timers, monotonic_clock()));

    let printer = thread::spawn(move || {
        for change in highlight_rx {
            match change {
                HighlightChange::Show(scope) => println!("  show {}", describe(&scope)),
                HighlightChange::Hide(_) => {}
            }
        }
    });

    if events
        .send(EngineEvent::Targets {
            targets: keypad(),
            preserve: false,
        })
        .is_err()
    {
        tracing::warn!("engine loop gone before targets were posted");
        return;
    }

    // Arm with the select switch, descend into whichever row is lit, then pick
    // whichever key is lit.
    tap(&events, 66);
    thread::sleep(Duration::from_millis(800));
    tap(&events, 66);
    thread::sleep(Duration::from_millis(700));
    tap(&events, 66);

    // Then leave it alone until the cycle limit stops the scan.
    thread::sleep(Duration::from_secs(6));
    if events.send(EngineEvent::Shutdown).is_err() {
        tracing::debug!("engine loop already finished");
    }

    // Dropping the engine closes the highlight channel and ends the printer.
    if worker.join().is_err() {
        tracing::warn!("engine thread panicked");
    }
    if printer.join().is_err() {
        tracing::warn!("printer thread panicked");
    }
    for activation in activation_rx.try_iter() {
        println!("activated {activation:?}");
    }
}
