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

//! The PDG runtime: a single-threaded cooperative main loop that fires timers,
//! draws frames, drains the cross-thread event queue, polls input and idles
//! background services, then tears everything down in a fixed order.

#![warn(missing_docs)]

pub mod collaborators;
pub mod config;
pub mod input;
pub mod runtime;

pub use collaborators::{FrameRenderer, IdleService, InputPoller, Subsystem};
pub use config::{ConfigError, RuntimeConfig};
pub use input::{InputDispatcher, InputState, MouseAction, RawInput};
pub use runtime::{
    LoopPhase, QuitHandle, Runtime, RuntimeBuilder, ShutdownReport, TeardownStage,
};

/// Commonly used items from every PDG crate.
pub mod prelude {
    pub use crate::{
        FrameRenderer, IdleService, InputDispatcher, InputPoller, QuitHandle, Runtime,
        RuntimeConfig, Subsystem,
    };
    pub use pdg_core::event::{keys, ModifierKeys, TimerInfo};
    pub use pdg_core::{
        handler_fn, EventEmitter, EventHandler, EventManager, EventPayload, EventType,
        SharedHandler, TimerManager, UserData,
    };
}
