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

//! Cross-thread delivery through the event queue, from producer threads to a
//! consumer blocked on the wake signal.

use pdg_core::{handler_fn, EventEmitter, EventManager, EventPayload, EventType};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const NET_CHUNK: EventType = EventType::application(7);

#[test]
fn consumer_wakes_and_delivers_to_target_emitter() {
    let manager = Arc::new(EventManager::new());
    let socket = Arc::new(EventEmitter::new());
    let received = Arc::new(Mutex::new(Vec::<String>::new()));

    let sink = Arc::clone(&received);
    let handler = handler_fn(move |_, _, payload| {
        let text = payload.downcast_custom::<String>().cloned().unwrap_or_default();
        sink.lock().unwrap().push(text);
        Ok(true)
    });
    socket.add_handler(&handler, NET_CHUNK);

    let producer = {
        let manager = Arc::clone(&manager);
        let socket = Arc::clone(&socket);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            manager
                .enqueue_event(NET_CHUNK, EventPayload::custom("hello".to_string()), Some(&socket))
                .unwrap();
        })
    };

    // Nothing is delivered until the consumer drains.
    let started = Instant::now();
    assert!(manager.wait_for_wake(Duration::from_secs(5)));
    assert!(started.elapsed() < Duration::from_secs(5));
    producer.join().unwrap();
    assert!(received.lock().unwrap().is_empty());

    assert_eq!(manager.drain_queue(), 1);
    assert_eq!(*received.lock().unwrap(), vec!["hello".to_string()]);
}

#[test]
fn wake_handle_interrupts_wait_without_an_event() {
    let manager = EventManager::new();
    let handle = manager.wake_handle();

    let waker = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        handle.signal();
    });
    assert!(manager.wait_for_wake(Duration::from_secs(5)));
    waker.join().unwrap();
    assert_eq!(manager.drain_queue(), 0);
}

#[test]
fn interleaved_producers_drain_in_lock_order() {
    let manager = Arc::new(EventManager::new());
    let order = Arc::new(Mutex::new(Vec::<u32>::new()));

    // Each producer enqueues while holding `order`, so the recorded sequence is
    // the order in which the queue mutex was acquired.
    let producers: Vec<_> = (0..8u32)
        .map(|n| {
            let manager = Arc::clone(&manager);
            let order = Arc::clone(&order);
            thread::spawn(move || {
                let mut order = order.lock().unwrap();
                manager
                    .enqueue_event(NET_CHUNK, EventPayload::custom(n), None)
                    .unwrap();
                order.push(n);
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    let mut drained = Vec::new();
    while let Some(event) = manager.get_queued_event() {
        drained.push(*event.payload.downcast_custom::<u32>().unwrap());
    }
    assert_eq!(drained, *order.lock().unwrap());
}
