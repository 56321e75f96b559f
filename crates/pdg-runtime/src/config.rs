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

//! Runtime configuration, loaded from and saved to JSON.

use pdg_core::QueueCapacity;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Poll interval cap when a renderer is attached.
pub const GUI_POLL_INTERVAL_MS: u64 = 25;
/// Poll interval cap for headless runtimes.
pub const HEADLESS_POLL_INTERVAL_MS: u64 = 1000;
/// Default frame rate target.
pub const DEFAULT_TARGET_FPS: f32 = 40.0;

/// Errors raised while loading or saving a [`RuntimeConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The JSON was malformed or did not match the expected shape.
    #[error("config is not valid: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables of the main loop. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Frames per second to aim for. Values `<= 0` fall back to 30.
    pub target_fps: f32,
    /// Longest sleep between two input polls, in milliseconds. `None` picks
    /// 25 ms with a renderer and 1000 ms without.
    pub max_poll_interval_ms: Option<u64>,
    /// Maximum number of pending cross-thread events. `None` is unbounded.
    pub queue_capacity: Option<usize>,
    /// Frames per frame rate sample.
    pub fps_sample_frames: u32,
    /// A sample below `fps_warn_ratio * target_fps` is logged as a drop.
    pub fps_warn_ratio: f32,
    /// Default `env_logger` filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            max_poll_interval_ms: None,
            queue_capacity: None,
            fps_sample_frames: 100,
            fps_warn_ratio: 0.8,
            log_filter: "info".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Parses a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Saves the configuration as pretty-printed JSON.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// The poll interval cap actually used by the main loop.
    pub fn effective_poll_interval(&self, has_renderer: bool) -> u64 {
        self.max_poll_interval_ms.unwrap_or(if has_renderer {
            GUI_POLL_INTERVAL_MS
        } else {
            HEADLESS_POLL_INTERVAL_MS
        })
    }

    /// The queue policy for the event manager.
    pub fn queue_capacity(&self) -> QueueCapacity {
        match self.queue_capacity {
            Some(n) => QueueCapacity::Bounded(n),
            None => QueueCapacity::Unbounded,
        }
    }
}
