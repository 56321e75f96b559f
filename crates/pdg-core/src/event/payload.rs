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

//! Typed event payloads.
//!
//! Each event code carries one [`EventPayload`] variant. Handlers match on the
//! variant instead of casting an opaque pointer, and anything that crosses the
//! cross-thread queue is simply moved into it.

use super::types::EventType;
use crate::timer::TimerId;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Shared, type-erased application data.
///
/// Cloning shares the same value. The value is released when the last clone is
/// dropped, by whatever `Drop` its concrete type has.
#[derive(Clone)]
pub struct UserData(Arc<dyn Any + Send + Sync>);

impl UserData {
    /// Wraps `value`.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Borrows the value as `T`, if that is its concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Returns `true` if the value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    /// Returns `true` if both handles share the same value.
    pub fn ptr_eq(&self, other: &UserData) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for UserData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UserData(..)")
    }
}

/// A position in port coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Creates a point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Modifier keys held while an input event happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModifierKeys {
    /// Shift is down.
    pub shift: bool,
    /// Control is down.
    pub ctrl: bool,
    /// Alt / option is down.
    pub alt: bool,
    /// Command / meta is down.
    pub meta: bool,
}

/// Payload of [`EventType::STARTUP`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StartupInfo {
    /// Why the application is starting.
    pub reason: i32,
    /// Command line arguments, program name first.
    pub args: Vec<String>,
}

/// Payload of [`EventType::SHUTDOWN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShutdownInfo {
    /// Why the application is shutting down.
    pub exit_reason: i32,
    /// The code the process will exit with.
    pub exit_code: i32,
}

/// Payload of [`EventType::TIMER`].
#[derive(Debug, Clone)]
pub struct TimerInfo {
    /// Which timer fired.
    pub id: TimerId,
    /// Clock reading when the timer fired.
    pub millisec: u64,
    /// The timer's interval.
    pub interval_ms: u64,
    /// Time since the timer was started or last fired, excluding paused time.
    pub elapsed_ms: u64,
    /// Data attached when the timer was started.
    pub user_data: Option<UserData>,
}

/// Payload of [`EventType::KEY_DOWN`] and [`EventType::KEY_UP`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyInfo {
    /// Virtual key code of the physical key.
    pub key_code: i32,
}

/// Payload of [`EventType::KEY_PRESS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyPressInfo {
    /// Modifier keys held.
    pub modifiers: ModifierKeys,
    /// UTF-16 code unit or one of the [`keys`](super::keys) codes, 0 if none.
    pub unicode: u16,
    /// The key is held down and auto-repeating.
    pub is_repeating: bool,
}

/// Payload of mouse events (down, up, move, enter, leave).
///
/// On touch devices `button_number` identifies a finger by the order in which
/// it touched the surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MouseInfo {
    /// Modifier keys held.
    pub modifiers: ModifierKeys,
    /// Pointer position.
    pub mouse_pos: Point,
    /// Left button state.
    pub left_button: bool,
    /// Right button state.
    pub right_button: bool,
    /// Button (or finger) this event is about.
    pub button_number: u8,
    /// Where the last button-down happened.
    pub last_click_pos: Point,
    /// Milliseconds since the last button-down.
    pub last_click_elapsed_ms: u64,
}

/// Payload of [`EventType::SCROLL_WHEEL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScrollWheelInfo {
    /// Modifier keys held.
    pub modifiers: ModifierKeys,
    /// Positive is to the right.
    pub horiz_delta: i32,
    /// Positive is down.
    pub vert_delta: i32,
}

/// Payload of [`EventType::PORT_RESIZED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortResizeInfo {
    /// New width.
    pub width: u32,
    /// New height.
    pub height: u32,
    /// Width before the resize.
    pub old_width: u32,
    /// Height before the resize.
    pub old_height: u32,
    /// Screen orientation.
    pub screen_pos: i32,
    /// Orientation before the resize.
    pub old_screen_pos: i32,
}

/// Payload of [`EventType::PORT_DRAW`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortDrawInfo {
    /// Sequential frame number since startup.
    pub frame_num: u32,
}

/// What happened to a sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEventCode {
    /// A non-looping sound finished.
    DonePlaying,
    /// A looping sound wrapped around.
    Looping,
    /// A sound could not be played.
    FailedToPlay,
}

/// Payload of [`EventType::SOUND_EVENT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundEventInfo {
    /// What happened.
    pub code: SoundEventCode,
    /// Audio collaborator's identifier for the sound.
    pub sound_id: u64,
}

/// Payload of the network events.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetInfo {
    /// Network collaborator's identifier for the connection.
    pub connection_id: u64,
    /// Received bytes, for [`EventType::NET_DATA`].
    pub data: Vec<u8>,
    /// Error description, for [`EventType::NET_ERROR`].
    pub error: Option<String>,
}

/// The payload carried by an event, one variant per payload shape.
#[derive(Debug, Clone, Default)]
pub enum EventPayload {
    /// No data.
    #[default]
    Empty,
    /// See [`StartupInfo`].
    Startup(StartupInfo),
    /// See [`ShutdownInfo`].
    Shutdown(ShutdownInfo),
    /// See [`TimerInfo`].
    Timer(TimerInfo),
    /// See [`KeyInfo`].
    Key(KeyInfo),
    /// See [`KeyPressInfo`].
    KeyPress(KeyPressInfo),
    /// See [`MouseInfo`].
    Mouse(MouseInfo),
    /// See [`ScrollWheelInfo`].
    ScrollWheel(ScrollWheelInfo),
    /// See [`PortResizeInfo`].
    PortResized(PortResizeInfo),
    /// See [`PortDrawInfo`].
    PortDraw(PortDrawInfo),
    /// See [`SoundEventInfo`].
    Sound(SoundEventInfo),
    /// See [`NetInfo`].
    Net(NetInfo),
    /// Application data for application-defined events.
    Custom(UserData),
}

impl EventPayload {
    /// Wraps an arbitrary value as a custom payload.
    pub fn custom<T: Any + Send + Sync>(value: T) -> Self {
        EventPayload::Custom(UserData::new(value))
    }

    /// Returns `true` if this variant is a legal payload for `event_type`.
    ///
    /// Codes outside the framework range accept any payload.
    pub fn accepts(&self, event_type: EventType) -> bool {
        use EventPayload as P;
        match event_type {
            EventType::ALL => false,
            EventType::STARTUP => matches!(self, P::Startup(_)),
            EventType::SHUTDOWN => matches!(self, P::Shutdown(_)),
            EventType::TIMER => matches!(self, P::Timer(_)),
            EventType::KEY_DOWN | EventType::KEY_UP => matches!(self, P::Key(_)),
            EventType::KEY_PRESS => matches!(self, P::KeyPress(_)),
            EventType::MOUSE_DOWN
            | EventType::MOUSE_UP
            | EventType::MOUSE_MOVE
            | EventType::MOUSE_ENTER
            | EventType::MOUSE_LEAVE => matches!(self, P::Mouse(_)),
            EventType::SCROLL_WHEEL => matches!(self, P::ScrollWheel(_)),
            EventType::PORT_RESIZED => matches!(self, P::PortResized(_)),
            EventType::PORT_DRAW => matches!(self, P::PortDraw(_)),
            EventType::SOUND_EVENT => matches!(self, P::Sound(_)),
            EventType::NET_CONNECT
            | EventType::NET_DISCONNECT
            | EventType::NET_DATA
            | EventType::NET_ERROR => matches!(self, P::Net(_)),
            _ => true,
        }
    }

    /// Borrows the timer info, if this is a timer payload.
    pub fn as_timer(&self) -> Option<&TimerInfo> {
        match self {
            EventPayload::Timer(info) => Some(info),
            _ => None,
        }
    }

    /// Borrows custom data as `T`, if this is a custom payload holding a `T`.
    pub fn downcast_custom<T: Any>(&self) -> Option<&T> {
        match self {
            EventPayload::Custom(data) => data.downcast_ref::<T>(),
            _ => None,
        }
    }
}
