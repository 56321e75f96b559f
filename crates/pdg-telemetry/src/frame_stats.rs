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

//! Frame pacing and a rolling frames-per-second estimate.

/// Frame rate used when a non-positive target is requested.
pub const FALLBACK_FPS: f32 = 30.0;

/// Tracks frame numbers, the next redraw deadline and the measured frame rate.
///
/// The rate is recomputed every `sample_frames` frames from the wall time the
/// window took. A sample below `warn_ratio * target_fps` is logged as a
/// frame rate drop.
#[derive(Debug, Clone)]
pub struct FrameStats {
    target_fps: f32,
    sample_frames: u32,
    warn_ratio: f32,
    frame_num: u32,
    next_draw_ms: u64,
    window_start_ms: u64,
    window_frames: u32,
    current_fps: f32,
}

impl FrameStats {
    /// Creates a tracker. The first frame is due immediately.
    pub fn new(target_fps: f32, sample_frames: u32, warn_ratio: f32) -> Self {
        Self {
            target_fps: coerce_fps(target_fps),
            sample_frames: sample_frames.max(1),
            warn_ratio,
            frame_num: 0,
            next_draw_ms: 0,
            window_start_ms: 0,
            window_frames: 0,
            current_fps: 0.0,
        }
    }

    /// Sets the frame rate to aim for. Values `<= 0` fall back to 30.
    pub fn set_target_fps(&mut self, fps: f32) {
        self.target_fps = coerce_fps(fps);
        log::debug!("Target frame rate set to {:.2}", self.target_fps);
    }

    /// The frame rate being aimed for.
    pub fn target_fps(&self) -> f32 {
        self.target_fps
    }

    /// The most recent measured frame rate, `0.0` before the first sample.
    pub fn current_fps(&self) -> f32 {
        self.current_fps
    }

    /// Number of frames drawn so far.
    pub fn frame_num(&self) -> u32 {
        self.frame_num
    }

    /// Milliseconds between frames at the target rate.
    pub fn frame_interval_ms(&self) -> u64 {
        (1000.0 / self.target_fps).floor() as u64
    }

    /// Returns `true` once the redraw deadline has passed.
    pub fn is_draw_due(&self, now_ms: u64) -> bool {
        now_ms >= self.next_draw_ms
    }

    /// Milliseconds until the next redraw deadline, `0` if already due.
    pub fn ms_till_next_draw(&self, now_ms: u64) -> u64 {
        self.next_draw_ms.saturating_sub(now_ms)
    }

    /// Accounts for a frame about to be drawn at `now_ms` and returns its
    /// frame number (starting at 1).
    pub fn begin_frame(&mut self, now_ms: u64) -> u32 {
        if self.frame_num % self.sample_frames == 0 {
            if self.frame_num > 0 {
                self.sample(now_ms);
            }
            self.window_start_ms = now_ms;
            self.window_frames = 0;
        }
        self.next_draw_ms = now_ms + self.frame_interval_ms();
        self.window_frames += 1;
        self.frame_num += 1;
        self.frame_num
    }

    /// Forgets the measured rate, e.g. when there is nothing to draw.
    pub fn reset_fps(&mut self) {
        self.current_fps = 0.0;
    }

    fn sample(&mut self, now_ms: u64) {
        let elapsed = now_ms.saturating_sub(self.window_start_ms).max(1);
        self.current_fps = 1000.0 * self.window_frames as f32 / elapsed as f32;
        log::trace!("frame: {} fps: {:.2}", self.frame_num, self.current_fps);

        let warn_fps = self.warn_ratio * self.target_fps;
        if self.current_fps < warn_fps {
            log::warn!(
                "Frame rate drop: {:.2} fps (target {:.2})",
                self.current_fps,
                self.target_fps
            );
        }
    }
}

fn coerce_fps(fps: f32) -> f32 {
    if fps > 0.0 {
        fps
    } else {
        FALLBACK_FPS
    }
}
