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

//! The wake-up semaphore shared by the scheduler and its producer threads.

use std::time::Duration;

/// A binary semaphore the scheduler blocks on between loop iterations.
///
/// Backed by a `flume` channel of capacity one: a signal is a unit message, so
/// any number of signals raised while the scheduler is busy collapse into a
/// single pending wake-up. Signalling never blocks.
#[derive(Debug)]
pub struct WakeSignal {
    sender: flume::Sender<()>,
    receiver: flume::Receiver<()>,
}

impl WakeSignal {
    /// Creates an unsignalled semaphore.
    pub fn new() -> Self {
        let (sender, receiver) = flume::bounded(1);
        Self { sender, receiver }
    }

    /// Raises the signal. A signal that is already pending absorbs this one.
    pub fn signal(&self) {
        // Full means a wake-up is already pending, which is all we need.
        let _ = self.sender.try_send(());
    }

    /// Blocks until signalled or until `timeout` elapses.
    ///
    /// Returns `true` when woken by a signal, `false` on timeout. Consumes the
    /// pending signal.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.receiver.recv_timeout(timeout).is_ok()
    }

    /// Consumes a pending signal without blocking.
    pub fn try_take(&self) -> bool {
        self.receiver.try_recv().is_ok()
    }

    /// Returns a cloneable handle other threads can use to raise the signal.
    pub fn handle(&self) -> WakeHandle {
        WakeHandle {
            sender: self.sender.clone(),
        }
    }
}

impl Default for WakeSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// The producer side of a [`WakeSignal`].
#[derive(Debug, Clone)]
pub struct WakeHandle {
    sender: flume::Sender<()>,
}

impl WakeHandle {
    /// Raises the signal. Never blocks.
    pub fn signal(&self) {
        let _ = self.sender.try_send(());
    }
}
