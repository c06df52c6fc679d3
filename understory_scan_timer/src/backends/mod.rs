// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for timer delivery.
//!
//! - `thread`: one sleeper thread per armed slot; events go through a `crossbeam_channel`.
//! - `manual`: records arms and fires them on request (deterministic, no threads).

pub(crate) mod manual;
pub(crate) mod thread;

pub use manual::{Armed, ManualBackend};
pub use thread::ThreadBackend;
