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

//! The handler capability invoked by emitters.

use super::emitter::EventEmitter;
use super::payload::EventPayload;
use super::types::EventType;
use std::sync::Arc;

/// Something that reacts to events.
///
/// A handler is shared: the same instance may be registered under several
/// event types and on several emitters. Registration holds one strong
/// reference; removing the registration drops it.
pub trait EventHandler: Send + Sync {
    /// Handles one event.
    ///
    /// `source` is the emitter the event is reported as coming from. Return
    /// `Ok(true)` to consume the event and stop dispatch, `Ok(false)` to let
    /// the next handler see it. An `Err` is logged and treated as `Ok(false)`.
    fn handle_event(
        &self,
        source: &EventEmitter,
        event_type: EventType,
        payload: &EventPayload,
    ) -> anyhow::Result<bool>;
}

/// A reference-counted handler, the unit of registration.
pub type SharedHandler = Arc<dyn EventHandler>;

/// Adapter turning a closure into an [`EventHandler`].
pub struct FnHandler<F>(F);

impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&EventEmitter, EventType, &EventPayload) -> anyhow::Result<bool> + Send + Sync,
{
    fn handle_event(
        &self,
        source: &EventEmitter,
        event_type: EventType,
        payload: &EventPayload,
    ) -> anyhow::Result<bool> {
        (self.0)(source, event_type, payload)
    }
}

/// Wraps a closure as a [`SharedHandler`].
///
/// Keep a clone of the returned handle if the handler will need to be removed
/// later: removal matches on identity.
pub fn handler_fn<F>(f: F) -> SharedHandler
where
    F: Fn(&EventEmitter, EventType, &EventPayload) -> anyhow::Result<bool> + Send + Sync + 'static,
{
    Arc::new(FnHandler(f))
}
