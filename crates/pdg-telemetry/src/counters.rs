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

//! Counters describing what the main loop did over its lifetime.

use serde::{Deserialize, Serialize};

/// Totals accumulated by the main loop and reported at teardown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopCounters {
    /// Completed loop iterations.
    pub iterations: u64,
    /// Timer events posted.
    pub timers_fired: u64,
    /// Events taken off the cross-thread queue.
    pub queued_events: u64,
    /// Frames drawn.
    pub frames_drawn: u64,
    /// Sleeps cut short by the wake signal.
    pub wakeups: u64,
    /// Collaborator hooks that returned an error.
    pub collaborator_errors: u64,
}

impl LoopCounters {
    /// Logs the totals at `info` level.
    pub fn log_summary(&self) {
        log::info!("--- Main Loop Summary ---");
        log::info!("  Iterations: {}", self.iterations);
        log::info!("  Frames drawn: {}", self.frames_drawn);
        log::info!("  Timers fired: {}", self.timers_fired);
        log::info!("  Queued events drained: {}", self.queued_events);
        log::info!("  Signalled wake-ups: {}", self.wakeups);
        if self.collaborator_errors > 0 {
            log::warn!("  Collaborator errors: {}", self.collaborator_errors);
        }
        log::info!("-------------------------");
    }
}
