// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Interfaces of the subsystems the main loop drives but does not implement.
//!
//! Every hook is called at most once per loop iteration and is expected to
//! return promptly. A hook returning `Err` is logged and the loop carries on.

use crate::input::InputDispatcher;
use anyhow::Result;
use pdg_core::EventManager;

/// Anything the runtime owns and shuts down at teardown.
pub trait Subsystem: Send {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Releases the subsystem's resources. Called exactly once, in the fixed
    /// teardown order.
    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Draws frames into the main port.
///
/// The runtime brackets each frame: `begin_frame`, then a
/// [`PORT_DRAW`](pdg_core::EventType::PORT_DRAW) event for the application to
/// draw in, then `end_frame`.
pub trait FrameRenderer: Subsystem {
    /// Prepares the port for drawing frame `frame_num`.
    fn begin_frame(&mut self, frame_num: u32) -> Result<()>;

    /// Presents frame `frame_num`.
    fn end_frame(&mut self, frame_num: u32) -> Result<()>;
}

/// Polls the platform for input.
pub trait InputPoller: Subsystem {
    /// Reports pending platform input through `input`, which posts the
    /// resulting events synchronously.
    fn poll_input(&mut self, input: &mut InputDispatcher<'_>) -> Result<()>;
}

/// A background service (network, audio) given a slice of the loop.
pub trait IdleService: Subsystem {
    /// Does a bounded amount of pending work. Events produced here may be
    /// posted directly or enqueued.
    fn idle(&mut self, events: &EventManager) -> Result<()>;
}
