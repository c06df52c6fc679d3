// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thread-per-slot backend delivering events over a `crossbeam_channel`.

use core::time::Duration;
use std::thread;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use hashbrown::HashMap;

use crate::backend::TimerBackend;
use crate::types::{TimerEvent, TimerSlot};

/// Backend that sleeps on a dedicated thread per armed slot.
///
/// Each arm spawns a thread that waits on a cancellation channel with a
/// timeout. A timeout posts the event; disconnection (the backend dropped the
/// cancel sender because the slot was disarmed or re-armed) ends the thread.
/// Events are only ever sent, never handled, on these threads.
#[derive(Debug)]
pub struct ThreadBackend {
    events: Sender<TimerEvent>,
    cancels: HashMap<TimerSlot, Sender<()>>,
}

impl ThreadBackend {
    /// Create a backend posting into `events`.
    pub fn new(events: Sender<TimerEvent>) -> Self {
        Self {
            events,
            cancels: HashMap::new(),
        }
    }

    /// Create a backend together with the receiving end of its event queue.
    pub fn channel() -> (Self, Receiver<TimerEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self::new(tx), rx)
    }
}

impl TimerBackend for ThreadBackend {
    fn arm(&mut self, event: TimerEvent, period: Duration, repeat: bool) {
        self.disarm(event.slot);

        let (cancel_tx, cancel_rx) = crossbeam_channel::bounded::<()>(1);
        let events = self.events.clone();
        let spawned = thread::Builder::new()
            .name(format!("scan-timer-{:?}", event.slot))
            .spawn(move || {
                loop {
                    match cancel_rx.recv_timeout(period) {
                        Err(RecvTimeoutError::Timeout) => {
                            if events.send(event).is_err() || !repeat {
                                break;
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            });

        match spawned {
            Ok(_) => {
                self.cancels.insert(event.slot, cancel_tx);
            }
            Err(err) => {
                tracing::warn!(slot = ?event.slot, %err, "failed to spawn timer thread");
            }
        }
    }

    fn disarm(&mut self, slot: TimerSlot) {
        // Dropping the sender disconnects the sleeper.
        self.cancels.remove(&slot);
    }
}

impl Drop for ThreadBackend {
    fn drop(&mut self) {
        self.cancels.clear();
    }
}
