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

//! The central event hub and its cross-thread queue.

use super::emitter::EventEmitter;
use super::handler::SharedHandler;
use super::payload::EventPayload;
use super::types::EventType;
use crate::error::QueueError;
use crate::sync::{WakeHandle, WakeSignal};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

/// How many entries the cross-thread queue may hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueueCapacity {
    /// No limit. Producers never block and never fail for lack of room.
    #[default]
    Unbounded,
    /// At most `n` pending entries. A full queue rejects new entries with
    /// [`QueueError::Full`] instead of blocking the producer.
    Bounded(usize),
}

impl QueueCapacity {
    fn limit(self) -> Option<usize> {
        match self {
            QueueCapacity::Unbounded => None,
            QueueCapacity::Bounded(n) => Some(n),
        }
    }
}

/// An event waiting in the cross-thread queue.
#[derive(Debug)]
pub struct QueuedEvent {
    /// The event type.
    pub event_type: EventType,
    /// The owned payload.
    pub payload: EventPayload,
    /// The emitter it should be delivered to, or `None` for the manager itself.
    ///
    /// Held weakly: a queued event does not keep its destination alive.
    pub target: Option<Weak<EventEmitter>>,
}

impl QueuedEvent {
    /// Returns `true` if the entry was addressed to an emitter that no longer
    /// exists.
    pub fn is_orphaned(&self) -> bool {
        self.target
            .as_ref()
            .is_some_and(|weak| weak.strong_count() == 0)
    }
}

/// The application-wide event hub.
///
/// Wraps an [`EventEmitter`] for the manager's own handlers and adds a
/// mutex-protected FIFO through which any thread can hand events to the
/// scheduler thread. Every enqueue raises the scheduler's [`WakeSignal`].
///
/// Synchronous posting (`post_event`, `post_event_to_emitter`) runs handlers on
/// the calling thread. Only the scheduler thread should drain the queue.
pub struct EventManager {
    emitter: EventEmitter,
    queue: Mutex<VecDeque<QueuedEvent>>,
    capacity: QueueCapacity,
    closed: AtomicBool,
    wake: WakeSignal,
}

impl EventManager {
    /// Creates a manager with an unbounded queue.
    pub fn new() -> Self {
        Self::with_capacity(QueueCapacity::Unbounded)
    }

    /// Creates a manager whose queue follows `capacity`.
    pub fn with_capacity(capacity: QueueCapacity) -> Self {
        log::debug!("Creating event manager, queue capacity {capacity:?}");
        Self {
            emitter: EventEmitter::new(),
            queue: Mutex::new(VecDeque::new()),
            capacity,
            closed: AtomicBool::new(false),
            wake: WakeSignal::new(),
        }
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<QueuedEvent>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The manager's own emitter.
    pub fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    /// Registers a handler on the manager. See [`EventEmitter::add_handler`].
    pub fn add_handler(&self, handler: &SharedHandler, event_type: EventType) {
        self.emitter.add_handler(handler, event_type);
    }

    /// Unregisters a handler from the manager. See [`EventEmitter::remove_handler`].
    pub fn remove_handler(&self, handler: &SharedHandler, event_type: EventType) -> bool {
        self.emitter.remove_handler(handler, event_type)
    }

    /// Blocks `event_type` on the manager.
    pub fn block_event(&self, event_type: EventType) {
        self.emitter.block_event(event_type);
    }

    /// Unblocks `event_type` on the manager.
    pub fn unblock_event(&self, event_type: EventType) {
        self.emitter.unblock_event(event_type);
    }

    /// Returns `true` if `event_type` is blocked on the manager.
    pub fn is_blocked(&self, event_type: EventType) -> bool {
        self.emitter.is_blocked(event_type)
    }

    /// Synchronously posts an event and returns whether a handler consumed it.
    ///
    /// A type blocked on the manager is dropped at once. Otherwise `from`, if
    /// given, gets the first chance to handle the event, then the manager's own
    /// handlers see it with `from` reported as the source.
    ///
    /// ## Arguments
    /// * `event_type` - The event code. [`EventType::ALL`] is never legal.
    /// * `payload` - The event data, borrowed for the duration of the dispatch.
    /// * `from` - The emitter the event originates from, if any.
    pub fn post_event(
        &self,
        event_type: EventType,
        payload: &EventPayload,
        from: Option<&EventEmitter>,
    ) -> bool {
        if self.emitter.is_blocked(event_type) {
            log::debug!("postEvent: event type {event_type} is blocked");
            return false;
        }
        check_payload(event_type, payload);

        let source = from.unwrap_or(&self.emitter);
        let mut handled = false;
        if let Some(origin) = from.filter(|e| !std::ptr::eq(*e, &self.emitter)) {
            handled = origin.emit(origin, event_type, payload);
        }
        if !handled {
            handled = self.emitter.emit(source, event_type, payload);
        }

        if !handled && !event_type.is_noisy() {
            log::debug!("postEvent got unhandled event type {event_type}");
        }
        handled
    }

    /// Dispatches an event directly against `to`, bypassing the manager's own
    /// handlers. With `None`, or with the manager's own emitter, this is
    /// [`post_event`](Self::post_event).
    pub fn post_event_to_emitter(
        &self,
        event_type: EventType,
        payload: &EventPayload,
        to: Option<&EventEmitter>,
    ) -> bool {
        match to {
            Some(target) if !std::ptr::eq(target, &self.emitter) => {
                check_payload(event_type, payload);
                target.emit(target, event_type, payload)
            }
            _ => self.post_event(event_type, payload, None),
        }
    }

    /// Hands an event to the scheduler thread. Callable from any thread.
    ///
    /// The entry is appended under the queue mutex, then the wake signal is
    /// raised so a sleeping scheduler drains it promptly. Never blocks on
    /// queue space.
    ///
    /// ## Returns
    /// `Err(QueueError::Full)` when a bounded queue has no room,
    /// `Err(QueueError::Closed)` once the manager has been shut down,
    /// `Err(QueueError::IllegalType)` for [`EventType::ALL`].
    pub fn enqueue_event(
        &self,
        event_type: EventType,
        payload: EventPayload,
        target: Option<&Arc<EventEmitter>>,
    ) -> Result<(), QueueError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(QueueError::Closed);
        }
        if event_type.is_wildcard() {
            log::warn!("enqueueEvent: the wildcard type cannot be posted, dropping");
            return Err(QueueError::IllegalType(event_type.0));
        }
        check_payload(event_type, &payload);

        {
            let mut queue = self.queue();
            if let Some(limit) = self.capacity.limit() {
                if queue.len() >= limit {
                    log::warn!("Event queue full ({limit} entries), rejecting event type {event_type}");
                    return Err(QueueError::Full { capacity: limit });
                }
            }
            queue.push_back(QueuedEvent {
                event_type,
                payload,
                target: target.map(Arc::downgrade),
            });
        }
        self.wake.signal();
        Ok(())
    }

    /// Pops the oldest queued event. Scheduler thread only.
    pub fn get_queued_event(&self) -> Option<QueuedEvent> {
        self.queue().pop_front()
    }

    /// Number of events waiting in the queue.
    pub fn queued_len(&self) -> usize {
        self.queue().len()
    }

    /// Redelivers one queued event to its destination and returns whether it
    /// was consumed. Entries whose target emitter is gone are dropped.
    pub fn dispatch_queued(&self, event: QueuedEvent) -> bool {
        let QueuedEvent {
            event_type,
            payload,
            target,
        } = event;
        match target {
            None => self.post_event(event_type, &payload, None),
            Some(weak) => match weak.upgrade() {
                Some(emitter) => self.post_event_to_emitter(event_type, &payload, Some(&emitter)),
                None => {
                    log::debug!("Dropping queued event type {event_type}: target emitter is gone");
                    false
                }
            },
        }
    }

    /// Drains the queue completely, redelivering every entry in FIFO order.
    /// Returns the number of entries taken off the queue.
    pub fn drain_queue(&self) -> usize {
        let mut drained = 0;
        while let Some(event) = self.get_queued_event() {
            self.dispatch_queued(event);
            drained += 1;
        }
        drained
    }

    /// Forgets all handlers and blocked types and discards pending queued
    /// events. See [`EventEmitter::clear`] for `release_handlers`.
    pub fn clear(&self, release_handlers: bool) -> Vec<SharedHandler> {
        let detached = self.emitter.clear(release_handlers);
        let discarded: VecDeque<QueuedEvent> = std::mem::take(&mut *self.queue());
        if !discarded.is_empty() {
            log::warn!(
                "Discarding {} unhandled event(s) still in the queue",
                discarded.len()
            );
        }
        detached
    }

    /// Refuses all further enqueues. Called during teardown.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            log::debug!("Event queue closed");
        }
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Blocks until the wake signal is raised or `timeout` elapses.
    /// Returns `true` if signalled.
    pub fn wait_for_wake(&self, timeout: Duration) -> bool {
        self.wake.wait_timeout(timeout)
    }

    /// Raises the wake signal.
    pub fn signal_wake(&self) {
        self.wake.signal();
    }

    /// A handle other threads can use to raise the wake signal.
    pub fn wake_handle(&self) -> WakeHandle {
        self.wake.handle()
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("emitter", &self.emitter)
            .field("queued", &self.queued_len())
            .field("capacity", &self.capacity)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[inline]
fn check_payload(event_type: EventType, payload: &EventPayload) {
    if cfg!(debug_assertions) && !payload.accepts(event_type) {
        log::warn!("Event type {event_type} posted with mismatched payload {payload:?}");
    }
}
