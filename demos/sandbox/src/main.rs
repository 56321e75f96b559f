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

// PDG Sandbox
// Headless demo: a heartbeat timer, a worker thread feeding the event queue,
// and a quit once enough work has arrived.

use anyhow::Result;
use pdg_runtime::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const HEARTBEAT_TIMER: i64 = 1;
const WORK_ITEM: EventType = EventType::application(1);
const ITEMS_TO_PROCESS: u32 = 10;

/// A unit of work produced off the main thread.
#[derive(Debug)]
struct WorkItem {
    seq: u32,
    label: String,
}

fn spawn_worker(events: Arc<EventManager>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for seq in 1..=ITEMS_TO_PROCESS {
            thread::sleep(Duration::from_millis(120));
            let item = WorkItem {
                seq,
                label: format!("job-{seq:02}"),
            };
            if let Err(e) = events.enqueue_event(WORK_ITEM, EventPayload::custom(item), None) {
                log::warn!("Worker stopping: {e}");
                return;
            }
        }
        log::info!("Worker finished producing");
    })
}

fn main() -> Result<()> {
    let mut runtime = Runtime::builder()
        .args(std::env::args())
        .init_logging(true)
        .build()?;

    let quit = runtime.quit_handle();
    let processed = Arc::new(AtomicU32::new(0));

    let on_startup = {
        let timers = Arc::clone(runtime.timers());
        handler_fn(move |_, _, _| {
            log::info!("Startup: arming heartbeat");
            timers.start_timer(HEARTBEAT_TIMER, 500, true);
            Ok(false)
        })
    };
    let on_timer = handler_fn(|_, _, payload| {
        if let Some(info) = payload.as_timer() {
            log::info!("Heartbeat at {} ms (elapsed {} ms)", info.millisec, info.elapsed_ms);
        }
        Ok(true)
    });
    let on_work = {
        let processed = Arc::clone(&processed);
        handler_fn(move |_, _, payload| {
            let Some(item) = payload.downcast_custom::<WorkItem>() else {
                return Ok(false);
            };
            let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
            log::info!("Processed {} (#{}), {done}/{ITEMS_TO_PROCESS}", item.label, item.seq);
            if done == ITEMS_TO_PROCESS {
                quit.quit(0);
            }
            Ok(true)
        })
    };
    let on_shutdown = handler_fn(|_, _, payload| {
        if let EventPayload::Shutdown(info) = payload {
            log::info!("Shutdown event received (exit code {})", info.exit_code);
        }
        Ok(false)
    });

    let events = runtime.events();
    events.add_handler(&on_startup, EventType::STARTUP);
    events.add_handler(&on_timer, EventType::TIMER);
    events.add_handler(&on_work, WORK_ITEM);
    events.add_handler(&on_shutdown, EventType::SHUTDOWN);

    let worker = spawn_worker(Arc::clone(events));
    let report = runtime.run()?;
    if worker.join().is_err() {
        log::error!("Worker thread panicked");
    }

    log::info!(
        "Sandbox finished: {} iterations, teardown {:?}",
        report.counters.iterations,
        report.teardown
    );
    drop(runtime);
    std::process::exit(report.exit_code);
}
