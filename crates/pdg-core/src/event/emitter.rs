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

//! Per-object handler tables and synchronous dispatch.

use super::handler::SharedHandler;
use super::payload::EventPayload;
use super::types::EventType;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One registration of a handler under one key.
struct Registration {
    id: u64,
    handler: SharedHandler,
}

/// A handler captured for one dispatch, with enough identity to check that
/// it is still registered when its turn comes.
struct SnapshotEntry {
    key: EventType,
    id: u64,
    handler: SharedHandler,
}

#[derive(Default)]
struct HandlerTable {
    handlers: HashMap<EventType, Vec<Registration>>,
    blocked: HashSet<EventType>,
    next_id: u64,
}

impl HandlerTable {
    fn snapshot_into(&self, key: EventType, out: &mut Vec<SnapshotEntry>) {
        if let Some(list) = self.handlers.get(&key) {
            out.extend(list.iter().map(|r| SnapshotEntry {
                key,
                id: r.id,
                handler: Arc::clone(&r.handler),
            }));
        }
    }

    fn is_live(&self, key: EventType, id: u64) -> bool {
        self.handlers
            .get(&key)
            .is_some_and(|list| list.iter().any(|r| r.id == id))
    }

    fn drain_all(&mut self) -> Vec<SharedHandler> {
        self.blocked.clear();
        self.handlers
            .drain()
            .flat_map(|(_, list)| list.into_iter().map(|r| r.handler))
            .collect()
    }
}

/// Associates handlers with event types and dispatches events to them.
///
/// The table is guarded by a mutex, so handlers may be added or removed from
/// any thread, including from inside a handler while a dispatch is running.
/// No lock is held while a handler executes.
///
/// Dispatch order is: handlers registered for the exact type, then wildcard
/// handlers ([`EventType::ALL`]), each group in registration order. The first
/// handler that consumes the event ends the dispatch.
pub struct EventEmitter {
    table: Mutex<HandlerTable>,
}

impl EventEmitter {
    /// Creates an emitter with no handlers.
    pub fn new() -> Self {
        Self {
            table: Mutex::new(HandlerTable::default()),
        }
    }

    fn table(&self) -> MutexGuard<'_, HandlerTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `handler` for `event_type`, or for every type when
    /// `event_type` is [`EventType::ALL`].
    ///
    /// Registering the same handler twice under the same type is allowed; it
    /// is then invoked twice per dispatch.
    pub fn add_handler(&self, handler: &SharedHandler, event_type: EventType) {
        let mut table = self.table();
        table.next_id += 1;
        let id = table.next_id;
        let list = table.handlers.entry(event_type).or_default();
        if list.iter().any(|r| Arc::ptr_eq(&r.handler, handler)) {
            log::debug!("addHandler: handler already registered for event type {event_type}");
        }
        list.push(Registration {
            id,
            handler: Arc::clone(handler),
        });
        log::trace!("Registered handler #{id} for event type {event_type}");
    }

    /// Removes a registration of `handler`.
    ///
    /// With a concrete type, the earliest registration under that type is
    /// removed. With [`EventType::ALL`], every registration of the handler is
    /// removed, wildcard and typed alike. Returns `true` if anything was
    /// removed. Safe to call from inside a handler.
    pub fn remove_handler(&self, handler: &SharedHandler, event_type: EventType) -> bool {
        let removed: Vec<SharedHandler> = {
            let mut table = self.table();
            let mut removed = Vec::new();
            if event_type.is_wildcard() {
                for list in table.handlers.values_mut() {
                    list.retain(|r| {
                        let matches = Arc::ptr_eq(&r.handler, handler);
                        if matches {
                            removed.push(Arc::clone(&r.handler));
                        }
                        !matches
                    });
                }
            } else if let Some(list) = table.handlers.get_mut(&event_type) {
                if let Some(pos) = list.iter().position(|r| Arc::ptr_eq(&r.handler, handler)) {
                    removed.push(list.remove(pos).handler);
                }
            }
            table.handlers.retain(|_, list| !list.is_empty());
            removed
        };

        if removed.is_empty() {
            log::debug!("removeHandler: handler not registered for event type {event_type}");
            false
        } else {
            log::trace!(
                "Removed {} registration(s) for event type {event_type}",
                removed.len()
            );
            // Dropped here, outside the lock: a handler's Drop may call back in.
            drop(removed);
            true
        }
    }

    /// Forgets every registration and every blocked type.
    ///
    /// With `release_handlers` the emitter's references are dropped and an
    /// empty vector is returned. Without it, the references are handed back to
    /// the caller instead.
    pub fn clear(&self, release_handlers: bool) -> Vec<SharedHandler> {
        let detached = self.table().drain_all();
        if release_handlers {
            log::trace!("Released {} handler reference(s)", detached.len());
            drop(detached);
            Vec::new()
        } else {
            if !detached.is_empty() {
                log::debug!(
                    "clear: detaching {} handler(s) without releasing them",
                    detached.len()
                );
            }
            detached
        }
    }

    /// Drops every future event of `event_type` before any handler sees it.
    ///
    /// Blocking is a flag, not a counter: one unblock undoes any number of
    /// blocks.
    pub fn block_event(&self, event_type: EventType) {
        if event_type.is_wildcard() {
            log::error!("blockEvent: the wildcard type cannot be blocked");
            return;
        }
        log::debug!("blockEvent for event type {event_type}");
        self.table().blocked.insert(event_type);
    }

    /// Stops blocking `event_type`. Events dropped while blocked are not
    /// recovered.
    pub fn unblock_event(&self, event_type: EventType) {
        if event_type.is_wildcard() {
            log::error!("unblockEvent: the wildcard type cannot be unblocked");
            return;
        }
        log::debug!("unblockEvent for event type {event_type}");
        if !self.table().blocked.remove(&event_type) {
            log::debug!("unblockEvent: event type {event_type} was not blocked");
        }
    }

    /// Returns `true` if `event_type` is currently blocked.
    pub fn is_blocked(&self, event_type: EventType) -> bool {
        self.table().blocked.contains(&event_type)
    }

    /// Number of registrations under exactly `event_type`.
    pub fn handler_count(&self, event_type: EventType) -> usize {
        self.table().handlers.get(&event_type).map_or(0, Vec::len)
    }

    /// Returns `true` if no handler is registered under any type.
    pub fn is_empty(&self) -> bool {
        self.table().handlers.is_empty()
    }

    /// Dispatches an event to this emitter's handlers, reporting it as coming
    /// from `source`. Returns `true` if a handler consumed it.
    ///
    /// The handler lists are snapshotted before the first handler runs.
    /// Handlers added during the dispatch are not invoked by it; handlers
    /// removed during it are skipped when their turn comes.
    pub fn emit(&self, source: &EventEmitter, event_type: EventType, payload: &EventPayload) -> bool {
        if event_type.is_wildcard() {
            log::debug!("emitEvent: ignoring attempt to post the wildcard type");
            return false;
        }

        let snapshot = {
            let table = self.table();
            if table.blocked.contains(&event_type) {
                log::debug!("emitEvent: event type {event_type} is blocked, ignoring");
                return false;
            }
            let mut snapshot = Vec::new();
            table.snapshot_into(event_type, &mut snapshot);
            table.snapshot_into(EventType::ALL, &mut snapshot);
            snapshot
        };

        for entry in snapshot {
            if !self.table().is_live(entry.key, entry.id) {
                continue;
            }
            match entry.handler.handle_event(source, event_type, payload) {
                Ok(true) => return true,
                Ok(false) => {}
                Err(e) => {
                    log::error!("Handler #{} failed on event type {event_type}: {e:#}", entry.id);
                }
            }
        }
        false
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table();
        f.debug_struct("EventEmitter")
            .field("types", &table.handlers.len())
            .field("blocked", &table.blocked)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::handler::{handler_fn, EventHandler};
    use anyhow::anyhow;

    type Log = Arc<Mutex<Vec<&'static str>>>;

    /// Handler that records its name and returns a fixed answer.
    fn recorder(log: &Log, name: &'static str, consume: bool) -> SharedHandler {
        let log = Arc::clone(log);
        handler_fn(move |_, _, _| {
            log.lock().unwrap().push(name);
            Ok(consume)
        })
    }

    fn calls(log: &Log) -> Vec<&'static str> {
        log.lock().unwrap().clone()
    }

    const PING: EventType = EventType::application(1);
    const PONG: EventType = EventType::application(2);

    #[test]
    fn typed_handlers_run_before_wildcard_in_registration_order() {
        let emitter = EventEmitter::new();
        let log = Log::default();
        emitter.add_handler(&recorder(&log, "wild", false), EventType::ALL);
        emitter.add_handler(&recorder(&log, "first", false), PING);
        emitter.add_handler(&recorder(&log, "second", false), PING);

        assert!(!emitter.emit(&emitter, PING, &EventPayload::Empty));
        assert_eq!(calls(&log), vec!["first", "second", "wild"]);
    }

    #[test]
    fn dispatch_stops_at_first_consumer() {
        let emitter = EventEmitter::new();
        let log = Log::default();
        emitter.add_handler(&recorder(&log, "a", false), PING);
        emitter.add_handler(&recorder(&log, "b", true), PING);
        emitter.add_handler(&recorder(&log, "c", true), PING);
        emitter.add_handler(&recorder(&log, "wild", true), EventType::ALL);

        assert!(emitter.emit(&emitter, PING, &EventPayload::Empty));
        assert_eq!(calls(&log), vec!["a", "b"]);
    }

    #[test]
    fn handlers_for_other_types_are_not_invoked() {
        let emitter = EventEmitter::new();
        let log = Log::default();
        emitter.add_handler(&recorder(&log, "pong", true), PONG);

        assert!(!emitter.emit(&emitter, PING, &EventPayload::Empty));
        assert!(calls(&log).is_empty());
    }

    #[test]
    fn blocked_type_invokes_nothing_until_unblocked() {
        let emitter = EventEmitter::new();
        let log = Log::default();
        emitter.add_handler(&recorder(&log, "typed", true), PING);
        emitter.add_handler(&recorder(&log, "wild", true), EventType::ALL);

        emitter.block_event(PING);
        emitter.block_event(PING);
        assert!(emitter.is_blocked(PING));
        assert!(!emitter.emit(&emitter, PING, &EventPayload::Empty));
        assert!(calls(&log).is_empty());

        // Other types still reach the wildcard handler.
        assert!(emitter.emit(&emitter, PONG, &EventPayload::Empty));
        assert_eq!(calls(&log), vec!["wild"]);

        // A single unblock undoes both blocks.
        emitter.unblock_event(PING);
        assert!(emitter.emit(&emitter, PING, &EventPayload::Empty));
        assert_eq!(calls(&log), vec!["wild", "typed"]);
    }

    #[test]
    fn wildcard_type_cannot_be_posted_or_blocked() {
        let emitter = EventEmitter::new();
        let log = Log::default();
        emitter.add_handler(&recorder(&log, "wild", true), EventType::ALL);

        assert!(!emitter.emit(&emitter, EventType::ALL, &EventPayload::Empty));
        emitter.block_event(EventType::ALL);
        assert!(!emitter.is_blocked(EventType::ALL));
        assert!(calls(&log).is_empty());
    }

    #[test]
    fn duplicate_registration_fires_twice() {
        let emitter = EventEmitter::new();
        let log = Log::default();
        let handler = recorder(&log, "dup", false);
        emitter.add_handler(&handler, PING);
        emitter.add_handler(&handler, PING);

        emitter.emit(&emitter, PING, &EventPayload::Empty);
        assert_eq!(calls(&log), vec!["dup", "dup"]);

        // Removing under the type drops one registration at a time.
        assert!(emitter.remove_handler(&handler, PING));
        assert_eq!(emitter.handler_count(PING), 1);
    }

    #[test]
    fn remove_with_wildcard_unregisters_everywhere() {
        let emitter = EventEmitter::new();
        let log = Log::default();
        let handler = recorder(&log, "h", false);
        emitter.add_handler(&handler, PING);
        emitter.add_handler(&handler, PONG);
        emitter.add_handler(&handler, EventType::ALL);
        assert_eq!(Arc::strong_count(&handler), 4);

        assert!(emitter.remove_handler(&handler, EventType::ALL));
        assert_eq!(Arc::strong_count(&handler), 1);
        assert!(emitter.is_empty());
        assert!(!emitter.remove_handler(&handler, PING));
    }

    #[test]
    fn handler_removed_mid_dispatch_is_skipped() {
        let emitter = Arc::new(EventEmitter::new());
        let log = Log::default();
        let victim = recorder(&log, "victim", false);

        let remover = {
            let log = Arc::clone(&log);
            let victim = Arc::clone(&victim);
            handler_fn(move |source, _, _| {
                log.lock().unwrap().push("remover");
                source.remove_handler(&victim, PING);
                Ok(false)
            })
        };

        emitter.add_handler(&remover, PING);
        emitter.add_handler(&victim, PING);

        assert!(!emitter.emit(&emitter, PING, &EventPayload::Empty));
        assert_eq!(calls(&log), vec!["remover"]);
    }

    #[test]
    fn handler_added_mid_dispatch_waits_for_next_dispatch() {
        let emitter = EventEmitter::new();
        let log = Log::default();
        let late = recorder(&log, "late", false);

        let adder = {
            let log = Arc::clone(&log);
            let late = Arc::clone(&late);
            handler_fn(move |source, _, _| {
                log.lock().unwrap().push("adder");
                if source.handler_count(PING) == 1 {
                    source.add_handler(&late, PING);
                }
                Ok(false)
            })
        };
        emitter.add_handler(&adder, PING);

        emitter.emit(&emitter, PING, &EventPayload::Empty);
        assert_eq!(calls(&log), vec!["adder"]);

        emitter.emit(&emitter, PING, &EventPayload::Empty);
        assert_eq!(calls(&log), vec!["adder", "adder", "late"]);
    }

    #[test]
    fn handler_can_remove_itself() {
        let emitter = EventEmitter::new();
        let log = Log::default();
        let slot: Arc<Mutex<Option<SharedHandler>>> = Arc::default();

        let once = {
            let log = Arc::clone(&log);
            let slot = Arc::clone(&slot);
            handler_fn(move |source, event_type, _| {
                log.lock().unwrap().push("once");
                if let Some(me) = slot.lock().unwrap().take() {
                    source.remove_handler(&me, event_type);
                }
                Ok(true)
            })
        };
        *slot.lock().unwrap() = Some(Arc::clone(&once));
        emitter.add_handler(&once, PING);
        drop(once);

        assert!(emitter.emit(&emitter, PING, &EventPayload::Empty));
        assert!(!emitter.emit(&emitter, PING, &EventPayload::Empty));
        assert_eq!(calls(&log), vec!["once"]);
    }

    #[test]
    fn failing_handler_counts_as_not_consumed() {
        struct Failing;
        impl EventHandler for Failing {
            fn handle_event(
                &self,
                _: &EventEmitter,
                _: EventType,
                _: &EventPayload,
            ) -> anyhow::Result<bool> {
                Err(anyhow!("script error"))
            }
        }

        let emitter = EventEmitter::new();
        let log = Log::default();
        let failing: SharedHandler = Arc::new(Failing);
        emitter.add_handler(&failing, PING);
        emitter.add_handler(&recorder(&log, "after", true), PING);

        assert!(emitter.emit(&emitter, PING, &EventPayload::Empty));
        assert_eq!(calls(&log), vec!["after"]);
    }

    #[test]
    fn clear_with_release_drops_references() {
        let emitter = EventEmitter::new();
        let log = Log::default();
        let handler = recorder(&log, "h", true);
        emitter.add_handler(&handler, PING);
        emitter.add_handler(&handler, EventType::ALL);
        emitter.block_event(PONG);

        assert!(emitter.clear(true).is_empty());
        assert_eq!(Arc::strong_count(&handler), 1);
        assert!(emitter.is_empty());
        assert!(!emitter.is_blocked(PONG));
    }

    #[test]
    fn clear_without_release_hands_references_back() {
        let emitter = EventEmitter::new();
        let log = Log::default();
        let handler = recorder(&log, "h", true);
        emitter.add_handler(&handler, PING);

        let detached = emitter.clear(false);
        assert_eq!(detached.len(), 1);
        assert!(Arc::ptr_eq(&detached[0], &handler));
        assert!(!emitter.emit(&emitter, PING, &EventPayload::Empty));
    }

    #[test]
    fn source_is_passed_to_handlers() {
        let target = EventEmitter::new();
        let origin = Arc::new(EventEmitter::new());
        let origin_addr = Arc::as_ptr(&origin) as usize;

        let seen = Arc::new(Mutex::new(0usize));
        let handler = {
            let seen = Arc::clone(&seen);
            handler_fn(move |source, _, _| {
                *seen.lock().unwrap() = source as *const EventEmitter as usize;
                Ok(true)
            })
        };
        target.add_handler(&handler, PING);

        assert!(target.emit(&origin, PING, &EventPayload::Empty));
        assert_eq!(*seen.lock().unwrap(), origin_addr);
    }
}
