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

//! # PDG Core
//!
//! The event distribution model and timer scheduler of the PDG framework.
//!
//! Everything in this crate is driven from a single scheduler thread. Other
//! threads only ever talk to it through [`EventManager::enqueue_event`], which
//! pushes onto a mutex-guarded FIFO and wakes the scheduler.

#![warn(missing_docs)]

pub mod clock;
pub mod error;
pub mod event;
pub mod sync;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{QueueError, TimerError};
pub use event::{
    handler_fn, EventEmitter, EventHandler, EventManager, EventPayload, EventType, QueueCapacity,
    QueuedEvent, SharedHandler, UserData,
};
pub use sync::{WakeHandle, WakeSignal};
pub use timer::{TimerId, TimerManager};
