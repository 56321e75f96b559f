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

//! Timer scheduling on the scheduler thread.

mod manager;

pub use manager::{TimerManager, LATE_WARNING_MS};

/// Caller-chosen timer identifier.
///
/// `0` is illegal. Negative ids are reserved for timers the framework itself
/// installs, so applications should use positive ones.
pub type TimerId = i64;
