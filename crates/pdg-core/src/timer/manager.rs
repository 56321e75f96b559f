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

use super::TimerId;
use crate::clock::{Clock, SystemClock};
use crate::error::TimerError;
use crate::event::{EventManager, EventPayload, EventType, TimerInfo, UserData};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A timer firing later than this is reported with a warning.
pub const LATE_WARNING_MS: u64 = 100;

#[derive(Debug)]
struct Timer {
    /// Distinguishes a timer from a later one reusing the same id.
    serial: u64,
    interval_ms: u64,
    /// Absolute deadline. Stale while the timer is paused.
    fire_at: u64,
    /// Time left when paused; `None` while running.
    remaining_ms: Option<u64>,
    repeating: bool,
    user_data: Option<UserData>,
}

impl Timer {
    #[inline]
    fn is_due(&self, now: u64) -> bool {
        self.remaining_ms.is_none() && self.fire_at <= now
    }

    fn pause(&mut self, now: u64) {
        if self.remaining_ms.is_none() {
            self.remaining_ms = Some(self.fire_at.saturating_sub(now));
        }
    }

    fn resume(&mut self, now: u64) {
        if let Some(remaining) = self.remaining_ms.take() {
            self.fire_at = now.saturating_add(remaining);
        }
    }
}

#[derive(Debug, Default)]
struct TimerTable {
    timers: BTreeMap<TimerId, Timer>,
    all_paused: bool,
    next_serial: u64,
}

/// Holds the active timers and posts [`EventType::TIMER`] events for the ones
/// that come due.
///
/// All methods take `&self`; the table sits behind a mutex that is released
/// before any event is posted, so timer handlers may freely start, cancel,
/// delay or pause timers, including their own.
///
/// Every deadline is measured with the injected [`Clock`].
pub struct TimerManager {
    clock: Arc<dyn Clock>,
    table: Mutex<TimerTable>,
}

impl TimerManager {
    /// Creates an empty timer manager reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            table: Mutex::new(TimerTable::default()),
        }
    }

    fn table(&self) -> MutexGuard<'_, TimerTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current time on this manager's clock.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Starts a timer that fires `interval_ms` from now, and every
    /// `interval_ms` after that if `repeating`.
    ///
    /// Returns `false` if `id` is 0 or already active.
    pub fn start_timer(&self, id: TimerId, interval_ms: u64, repeating: bool) -> bool {
        self.try_start_timer(id, interval_ms, repeating, None).is_ok()
    }

    /// Like [`start_timer`](Self::start_timer), attaching data that is handed
    /// to every [`TimerInfo`] this timer produces. The data is dropped when
    /// the timer is cancelled or, for a one-shot, after it fires.
    pub fn start_timer_with_data(
        &self,
        id: TimerId,
        interval_ms: u64,
        repeating: bool,
        user_data: UserData,
    ) -> bool {
        self.try_start_timer(id, interval_ms, repeating, Some(user_data))
            .is_ok()
    }

    /// Starts a timer, reporting why it was refused.
    pub fn try_start_timer(
        &self,
        id: TimerId,
        interval_ms: u64,
        repeating: bool,
        user_data: Option<UserData>,
    ) -> Result<(), TimerError> {
        if id == 0 {
            log::error!("startTimer: timer id 0 is illegal");
            return Err(TimerError::InvalidId);
        }
        let now = self.clock.now_ms();
        let mut table = self.table();
        if table.timers.contains_key(&id) {
            log::debug!("startTimer: timer [{id}] is already active");
            return Err(TimerError::AlreadyActive(id));
        }
        table.next_serial += 1;
        let serial = table.next_serial;
        table.timers.insert(
            id,
            Timer {
                serial,
                interval_ms,
                fire_at: now.saturating_add(interval_ms),
                remaining_ms: None,
                repeating,
                user_data,
            },
        );
        log::trace!(
            "Timer [{id}] started, interval {interval_ms} ms, {}",
            if repeating { "repeating" } else { "one-shot" }
        );
        Ok(())
    }

    /// Removes a timer. Returns `false` if no such timer was active.
    ///
    /// Takes effect for every later [`check_timers`](Self::check_timers) call,
    /// including the one currently running if called from a timer handler.
    pub fn cancel_timer(&self, id: TimerId) -> bool {
        let removed = self.table().timers.remove(&id);
        match removed {
            Some(_) => {
                log::trace!("Timer [{id}] cancelled");
                true
            }
            None => false,
        }
    }

    /// Removes every timer.
    pub fn cancel_all_timers(&self) {
        let removed = std::mem::take(&mut self.table().timers);
        if !removed.is_empty() {
            log::debug!("Cancelled {} timer(s)", removed.len());
        }
    }

    /// Pushes the next fire of `id` back by `delay_ms`, whatever its interval.
    /// A paused timer stays paused with `delay_ms` added to its remaining time.
    pub fn delay_timer(&self, id: TimerId, delay_ms: u64) -> bool {
        self.try_delay_timer(id, delay_ms).is_ok()
    }

    /// Like [`delay_timer`](Self::delay_timer), reporting a missing timer.
    pub fn try_delay_timer(&self, id: TimerId, delay_ms: u64) -> Result<(), TimerError> {
        let mut table = self.table();
        let timer = table.timers.get_mut(&id).ok_or(TimerError::NotFound(id))?;
        match timer.remaining_ms.as_mut() {
            Some(remaining) => *remaining = remaining.saturating_add(delay_ms),
            None => timer.fire_at = timer.fire_at.saturating_add(delay_ms),
        }
        log::trace!("Timer [{id}] delayed by {delay_ms} ms");
        Ok(())
    }

    /// Makes sure `id` does not fire before the absolute time `at_ms`.
    ///
    /// A deadline already later than `at_ms` is left alone. A paused timer is
    /// resumed first.
    pub fn delay_timer_until(&self, id: TimerId, at_ms: u64) -> bool {
        let now = self.clock.now_ms();
        let mut table = self.table();
        let Some(timer) = table.timers.get_mut(&id) else {
            return false;
        };
        timer.resume(now);
        timer.fire_at = timer.fire_at.max(at_ms);
        log::trace!("Timer [{id}] now fires at {}", timer.fire_at);
        true
    }

    /// Pauses every timer that exists right now. Timers started afterwards
    /// run normally.
    pub fn pause(&self) {
        let now = self.clock.now_ms();
        let mut table = self.table();
        for timer in table.timers.values_mut() {
            timer.pause(now);
        }
        table.all_paused = true;
        log::debug!("All timers paused");
    }

    /// Resumes every paused timer, individually paused ones included.
    pub fn unpause(&self) {
        let now = self.clock.now_ms();
        let mut table = self.table();
        for timer in table.timers.values_mut() {
            timer.resume(now);
        }
        table.all_paused = false;
        log::debug!("All timers resumed");
    }

    /// Returns `true` between [`pause`](Self::pause) and
    /// [`unpause`](Self::unpause).
    pub fn is_paused(&self) -> bool {
        self.table().all_paused
    }

    /// Freezes one timer's remaining time. Returns `false` if it is not active.
    pub fn pause_timer(&self, id: TimerId) -> bool {
        let now = self.clock.now_ms();
        match self.table().timers.get_mut(&id) {
            Some(timer) => {
                timer.pause(now);
                true
            }
            None => false,
        }
    }

    /// Resumes one timer from the time it had left when paused.
    pub fn unpause_timer(&self, id: TimerId) -> bool {
        let now = self.clock.now_ms();
        match self.table().timers.get_mut(&id) {
            Some(timer) => {
                timer.resume(now);
                true
            }
            None => false,
        }
    }

    /// Returns `true` if `id` is active and paused.
    pub fn is_timer_paused(&self, id: TimerId) -> bool {
        self.table()
            .timers
            .get(&id)
            .is_some_and(|t| t.remaining_ms.is_some())
    }

    /// Returns `true` if a timer with this id is active, paused or not.
    pub fn is_timer_active(&self, id: TimerId) -> bool {
        self.table().timers.contains_key(&id)
    }

    /// Absolute time at which `id` fires next, or `None` if it is not active
    /// or paused.
    pub fn when_timer_fires_next(&self, id: TimerId) -> Option<u64> {
        self.table()
            .timers
            .get(&id)
            .filter(|t| t.remaining_ms.is_none())
            .map(|t| t.fire_at)
    }

    /// Milliseconds until the earliest running timer is due; `Some(0)` if one
    /// is overdue, `None` if nothing will ever fire.
    pub fn ms_till_next_fire(&self) -> Option<u64> {
        let now = self.clock.now_ms();
        self.table()
            .timers
            .values()
            .filter(|t| t.remaining_ms.is_none())
            .map(|t| t.fire_at.saturating_sub(now))
            .min()
    }

    /// Number of active timers, paused ones included.
    pub fn active_count(&self) -> usize {
        self.table().timers.len()
    }

    /// Fires every timer that is due, posting one [`EventType::TIMER`] event
    /// per timer through `events`. Returns the number of timers fired.
    ///
    /// Timers fire in ascending deadline order, ties broken by ascending id.
    /// A repeating timer is rescheduled to `now + interval` before its event
    /// is posted, so a long stall produces one fire rather than a burst. A
    /// one-shot timer is removed before its event is posted. Each timer fires
    /// at most once per call, and a timer cancelled by an earlier handler in
    /// the same call does not fire.
    pub fn check_timers(&self, events: &EventManager) -> usize {
        let now = self.clock.now_ms();
        let mut due: Vec<(u64, TimerId, u64)> = self
            .table()
            .timers
            .iter()
            .filter(|(_, t)| t.is_due(now))
            .map(|(&id, t)| (t.fire_at, id, t.serial))
            .collect();
        if due.is_empty() {
            return 0;
        }
        due.sort_unstable();

        let mut fired = 0;
        for (_, id, serial) in due {
            let Some(info) = self.take_fire(id, serial, now) else {
                continue;
            };
            fired += 1;
            let payload = EventPayload::Timer(info);
            if !events.post_event(EventType::TIMER, &payload, None) {
                log::debug!("Timer [{id}] fired but was not handled");
            }
        }
        fired
    }

    /// Claims one fire of timer `id` if it is still the same timer and still
    /// due, updating the table for the next fire.
    fn take_fire(&self, id: TimerId, serial: u64, now: u64) -> Option<TimerInfo> {
        let mut table = self.table();
        let timer = table.timers.get_mut(&id)?;
        if timer.serial != serial || !timer.is_due(now) {
            return None;
        }

        let behind = now - timer.fire_at;
        if behind > LATE_WARNING_MS {
            log::warn!(
                "Timer [{id}] fired {behind} ms late (targeted for {})",
                timer.fire_at
            );
        }
        let mut info = TimerInfo {
            id,
            millisec: now,
            interval_ms: timer.interval_ms,
            elapsed_ms: behind.saturating_add(timer.interval_ms),
            user_data: timer.user_data.clone(),
        };

        if timer.repeating {
            timer.fire_at = now.saturating_add(timer.interval_ms);
        } else if let Some(removed) = table.timers.remove(&id) {
            // Hand over the data itself so it is released with the event.
            info.user_data = removed.user_data;
        }
        Some(info)
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock::new()))
    }
}

impl std::fmt::Debug for TimerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let table = self.table();
        f.debug_struct("TimerManager")
            .field("active", &table.timers.len())
            .field("all_paused", &table.all_paused)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::event::{handler_fn, SharedHandler};

    fn setup() -> (Arc<ManualClock>, TimerManager, EventManager) {
        let clock = Arc::new(ManualClock::new(0));
        let timers = TimerManager::new(clock.clone());
        (clock, timers, EventManager::new())
    }

    /// Records every timer event as (id, elapsed).
    fn record(events: &EventManager) -> Arc<Mutex<Vec<(TimerId, u64)>>> {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&fired);
        let handler: SharedHandler = handler_fn(move |_, _, payload| {
            let info = payload.as_timer().unwrap();
            sink.lock().unwrap().push((info.id, info.elapsed_ms));
            Ok(true)
        });
        events.add_handler(&handler, EventType::TIMER);
        fired
    }

    #[test]
    fn stalled_repeating_timer_fires_once_and_resyncs() {
        let (clock, timers, events) = setup();
        let fired = record(&events);
        assert!(timers.start_timer(1, 100, true));

        clock.set(250);
        assert_eq!(timers.check_timers(&events), 1);
        assert_eq!(*fired.lock().unwrap(), vec![(1, 250)]);
        assert_eq!(timers.when_timer_fires_next(1), Some(350));

        clock.set(349);
        assert_eq!(timers.check_timers(&events), 0);
        clock.set(350);
        assert_eq!(timers.check_timers(&events), 1);
    }

    #[test]
    fn one_shot_is_removed_after_firing() {
        let (clock, timers, events) = setup();
        let fired = record(&events);
        timers.start_timer(5, 10, false);

        clock.set(10);
        assert_eq!(timers.check_timers(&events), 1);
        assert!(!timers.is_timer_active(5));
        clock.set(100);
        assert_eq!(timers.check_timers(&events), 0);
        assert_eq!(*fired.lock().unwrap(), vec![(5, 10)]);
    }

    #[test]
    fn fires_in_deadline_then_id_order() {
        let (clock, timers, events) = setup();
        let fired = record(&events);
        timers.start_timer(9, 20, false);
        timers.start_timer(3, 30, false);
        timers.start_timer(2, 20, false);
        timers.start_timer(7, 10, false);

        clock.set(30);
        timers.check_timers(&events);
        let ids: Vec<TimerId> = fired.lock().unwrap().iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, vec![7, 2, 9, 3]);
    }

    #[test]
    fn illegal_and_duplicate_ids_are_refused() {
        let (_, timers, _) = setup();
        assert_eq!(
            timers.try_start_timer(0, 10, false, None),
            Err(TimerError::InvalidId)
        );
        assert!(timers.start_timer(4, 10, false));
        assert!(!timers.start_timer(4, 20, true));
        assert_eq!(
            timers.try_start_timer(4, 20, true, None),
            Err(TimerError::AlreadyActive(4))
        );
        assert_eq!(timers.try_delay_timer(8, 5), Err(TimerError::NotFound(8)));
    }

    #[test]
    fn cancelled_id_can_be_reused() {
        let (_, timers, _) = setup();
        assert!(timers.start_timer(1, 10, true));
        assert!(timers.cancel_timer(1));
        assert!(!timers.cancel_timer(1));
        assert!(timers.start_timer(1, 50, false));
        assert_eq!(timers.when_timer_fires_next(1), Some(50));
    }

    #[test]
    fn handler_cancelling_its_own_timer_stops_it() {
        let clock = Arc::new(ManualClock::new(0));
        let timers = Arc::new(TimerManager::new(clock.clone()));
        let events = EventManager::new();
        let count = Arc::new(Mutex::new(0));

        let handler = {
            let timers = Arc::clone(&timers);
            let count = Arc::clone(&count);
            handler_fn(move |_, _, payload| {
                *count.lock().unwrap() += 1;
                timers.cancel_timer(payload.as_timer().unwrap().id);
                Ok(true)
            })
        };
        events.add_handler(&handler, EventType::TIMER);
        timers.start_timer(1, 10, true);

        for t in [10, 20, 30, 40] {
            clock.set(t);
            timers.check_timers(&events);
        }
        assert_eq!(*count.lock().unwrap(), 1);
        assert!(!timers.is_timer_active(1));
        events.clear(true);
    }

    #[test]
    fn timer_cancelled_by_earlier_handler_does_not_fire() {
        let clock = Arc::new(ManualClock::new(0));
        let timers = Arc::new(TimerManager::new(clock.clone()));
        let events = EventManager::new();
        let fired = Arc::new(Mutex::new(Vec::new()));

        let handler = {
            let timers = Arc::clone(&timers);
            let fired = Arc::clone(&fired);
            handler_fn(move |_, _, payload| {
                let id = payload.as_timer().unwrap().id;
                fired.lock().unwrap().push(id);
                if id == 1 {
                    timers.cancel_timer(2);
                }
                Ok(true)
            })
        };
        events.add_handler(&handler, EventType::TIMER);
        timers.start_timer(1, 10, false);
        timers.start_timer(2, 10, false);

        clock.set(10);
        assert_eq!(timers.check_timers(&events), 1);
        assert_eq!(*fired.lock().unwrap(), vec![1]);
        events.clear(true);
    }

    #[test]
    fn cancel_all_from_handler_stops_the_rest_of_the_pass() {
        let clock = Arc::new(ManualClock::new(0));
        let timers = Arc::new(TimerManager::new(clock.clone()));
        let events = EventManager::new();
        let fired = Arc::new(Mutex::new(Vec::new()));

        let handler = {
            let timers = Arc::clone(&timers);
            let fired = Arc::clone(&fired);
            handler_fn(move |_, _, payload| {
                fired.lock().unwrap().push(payload.as_timer().unwrap().id);
                timers.cancel_all_timers();
                Ok(true)
            })
        };
        events.add_handler(&handler, EventType::TIMER);
        timers.start_timer(1, 10, true);
        timers.start_timer(2, 10, true);
        timers.start_timer(3, 15, false);

        clock.set(20);
        assert_eq!(timers.check_timers(&events), 1);
        assert_eq!(*fired.lock().unwrap(), vec![1]);
        assert_eq!(timers.active_count(), 0);

        clock.set(100);
        assert_eq!(timers.check_timers(&events), 0);
        events.clear(true);
    }

    #[test]
    fn huge_intervals_and_delays_saturate_instead_of_wrapping() {
        let (clock, timers, events) = setup();
        let fired = record(&events);
        clock.set(10);

        assert!(timers.start_timer(1, u64::MAX, false));
        assert_eq!(timers.when_timer_fires_next(1), Some(u64::MAX));
        assert_eq!(timers.check_timers(&events), 0);

        assert!(timers.start_timer(2, 100, true));
        assert_eq!(timers.when_timer_fires_next(2), Some(110));
        assert!(timers.delay_timer(2, u64::MAX));
        assert_eq!(timers.when_timer_fires_next(2), Some(u64::MAX));
        assert!(timers.delay_timer(2, 1));
        assert_eq!(timers.when_timer_fires_next(2), Some(u64::MAX));

        // Paused: the remaining time saturates, and so does the resumed deadline.
        assert!(timers.pause_timer(2));
        assert!(timers.delay_timer(2, u64::MAX));
        clock.set(500);
        assert!(timers.unpause_timer(2));
        assert_eq!(timers.when_timer_fires_next(2), Some(u64::MAX));

        assert_eq!(timers.check_timers(&events), 0);
        assert!(fired.lock().unwrap().is_empty());
        assert_eq!(timers.active_count(), 2);
    }

    #[test]
    fn repeating_timer_with_huge_interval_reschedules_to_never() {
        let (clock, timers, events) = setup();
        let fired = record(&events);
        assert!(timers.start_timer(1, u64::MAX - 5, true));
        clock.set(u64::MAX - 5);
        assert_eq!(timers.check_timers(&events), 1);
        assert_eq!(timers.when_timer_fires_next(1), Some(u64::MAX));
        assert_eq!(*fired.lock().unwrap(), vec![(1, u64::MAX - 5)]);
    }

    #[test]
    fn handler_restarting_its_own_timer_waits_for_next_check() {
        let clock = Arc::new(ManualClock::new(0));
        let timers = Arc::new(TimerManager::new(clock.clone()));
        let events = EventManager::new();

        let handler = {
            let timers = Arc::clone(&timers);
            handler_fn(move |_, _, payload| {
                let id = payload.as_timer().unwrap().id;
                timers.cancel_timer(id);
                timers.start_timer(id, 0, false);
                Ok(true)
            })
        };
        events.add_handler(&handler, EventType::TIMER);
        timers.start_timer(1, 10, true);

        clock.set(10);
        assert_eq!(timers.check_timers(&events), 1);
        assert!(timers.is_timer_active(1));
        assert_eq!(timers.ms_till_next_fire(), Some(0));
        events.clear(true);
    }

    #[test]
    fn delay_from_handler_applies_after_reschedule() {
        let clock = Arc::new(ManualClock::new(0));
        let timers = Arc::new(TimerManager::new(clock.clone()));
        let events = EventManager::new();
        let handler = {
            let timers = Arc::clone(&timers);
            handler_fn(move |_, _, payload| {
                timers.delay_timer(payload.as_timer().unwrap().id, 25);
                Ok(true)
            })
        };
        events.add_handler(&handler, EventType::TIMER);
        timers.start_timer(1, 100, true);

        clock.set(100);
        timers.check_timers(&events);
        assert_eq!(timers.when_timer_fires_next(1), Some(225));
        events.clear(true);
    }

    #[test]
    fn paused_timer_keeps_its_remaining_time() {
        let (clock, timers, events) = setup();
        let fired = record(&events);
        timers.start_timer(1, 100, false);

        clock.set(40);
        assert!(timers.pause_timer(1));
        assert!(timers.is_timer_paused(1));
        assert_eq!(timers.when_timer_fires_next(1), None);
        assert_eq!(timers.ms_till_next_fire(), None);

        clock.set(500);
        assert_eq!(timers.check_timers(&events), 0);
        assert!(timers.unpause_timer(1));
        assert_eq!(timers.when_timer_fires_next(1), Some(560));

        clock.set(560);
        assert_eq!(timers.check_timers(&events), 1);
        assert_eq!(*fired.lock().unwrap(), vec![(1, 100)]);
    }

    #[test]
    fn global_pause_spares_timers_started_afterwards() {
        let (clock, timers, events) = setup();
        let fired = record(&events);
        timers.start_timer(1, 10, false);
        timers.pause();
        assert!(timers.is_paused());
        timers.start_timer(2, 10, false);

        clock.set(20);
        timers.check_timers(&events);
        assert_eq!(*fired.lock().unwrap(), vec![(2, 20)]);

        timers.unpause();
        assert!(!timers.is_paused());
        assert_eq!(timers.when_timer_fires_next(1), Some(30));
    }

    #[test]
    fn unpause_resumes_individually_paused_timers() {
        let (clock, timers, _) = setup();
        timers.start_timer(1, 50, true);
        clock.set(20);
        timers.pause_timer(1);
        clock.set(100);
        timers.unpause();
        assert!(!timers.is_timer_paused(1));
        assert_eq!(timers.when_timer_fires_next(1), Some(130));
    }

    #[test]
    fn delay_variants() {
        let (clock, timers, _) = setup();
        timers.start_timer(1, 100, true);
        assert!(timers.delay_timer(1, 50));
        assert_eq!(timers.when_timer_fires_next(1), Some(150));

        // An earlier absolute time leaves the deadline alone.
        assert!(timers.delay_timer_until(1, 120));
        assert_eq!(timers.when_timer_fires_next(1), Some(150));
        assert!(timers.delay_timer_until(1, 400));
        assert_eq!(timers.when_timer_fires_next(1), Some(400));

        // Delaying a paused timer adds to its remaining time and keeps it paused.
        clock.set(300);
        timers.pause_timer(1);
        timers.delay_timer(1, 20);
        assert!(timers.is_timer_paused(1));

        // delay_timer_until resumes it.
        assert!(timers.delay_timer_until(1, 0));
        assert!(!timers.is_timer_paused(1));
        assert_eq!(timers.when_timer_fires_next(1), Some(420));
        assert!(!timers.delay_timer_until(99, 0));
    }

    #[test]
    fn next_fire_bound_tracks_earliest_timer() {
        let (clock, timers, _) = setup();
        assert_eq!(timers.ms_till_next_fire(), None);
        timers.start_timer(1, 300, false);
        timers.start_timer(2, 120, true);
        assert_eq!(timers.ms_till_next_fire(), Some(120));
        clock.set(200);
        assert_eq!(timers.ms_till_next_fire(), Some(0));
        timers.cancel_all_timers();
        assert_eq!(timers.ms_till_next_fire(), None);
        assert_eq!(timers.active_count(), 0);
    }

    #[test]
    fn user_data_travels_with_each_fire() {
        let (clock, timers, events) = setup();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler = handler_fn(move |_, _, payload| {
            let info = payload.as_timer().unwrap();
            let label = info
                .user_data
                .as_ref()
                .and_then(|d| d.downcast_ref::<&'static str>())
                .copied();
            sink.lock().unwrap().push(label);
            Ok(true)
        });
        events.add_handler(&handler, EventType::TIMER);

        let data = UserData::new("spawn-wave");
        timers.start_timer_with_data(3, 10, false, data.clone());
        clock.set(10);
        timers.check_timers(&events);

        assert_eq!(*seen.lock().unwrap(), vec![Some("spawn-wave")]);
        assert!(!timers.is_timer_active(3));
    }
}
