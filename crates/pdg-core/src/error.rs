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

//! Error types for the event queue and the timer scheduler.
//!
//! The hot-path API (`start_timer`, `cancel_timer`, ...) reports failure as a
//! plain `bool`. These types back the `try_*` variants used by Rust callers
//! that want to know *why* something was refused.

use crate::timer::TimerId;
use thiserror::Error;

/// Reasons a timer operation can be refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimerError {
    /// Timer id `0` is reserved and can never be scheduled.
    #[error("timer id 0 is illegal")]
    InvalidId,
    /// A timer with this id is already active.
    #[error("timer {0} is already active")]
    AlreadyActive(TimerId),
    /// No active timer has this id.
    #[error("no active timer with id {0}")]
    NotFound(TimerId),
}

/// Reasons an event could not be placed on the cross-thread queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The queue is bounded and currently holds `capacity` entries.
    #[error("event queue is full ({capacity} entries)")]
    Full {
        /// The configured capacity of the queue.
        capacity: usize,
    },
    /// The event manager has been torn down.
    #[error("event queue is closed")]
    Closed,
    /// The wildcard type can be registered for but never posted.
    #[error("event type {0} cannot be posted")]
    IllegalType(i32),
}
