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

//! Event codes, payloads, handlers and the emitters that dispatch them.

mod emitter;
mod handler;
mod manager;
mod payload;
mod types;

pub use emitter::EventEmitter;
pub use handler::{handler_fn, EventHandler, FnHandler, SharedHandler};
pub use manager::{EventManager, QueueCapacity, QueuedEvent};
pub use payload::{
    EventPayload, KeyInfo, KeyPressInfo, ModifierKeys, MouseInfo, NetInfo, Point, PortDrawInfo,
    PortResizeInfo, ScrollWheelInfo, ShutdownInfo, SoundEventCode, SoundEventInfo, StartupInfo,
    TimerInfo, UserData,
};
pub use types::{keys, EventType};
