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

//! Stable integer event codes.
//!
//! External code (script bindings, network peers, tools) switches on these
//! numbers, so the value of every named code is part of the public contract.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An integer code naming a class of occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventType(pub i32);

impl EventType {
    /// Wildcard key: a handler registered under it sees every event type.
    /// Never a legal type for a posted event.
    pub const ALL: EventType = EventType(0);
    /// Application startup. Payload: [`StartupInfo`](super::StartupInfo).
    pub const STARTUP: EventType = EventType(1);
    /// Application shutdown. Payload: [`ShutdownInfo`](super::ShutdownInfo).
    pub const SHUTDOWN: EventType = EventType(2);
    /// A timer fired. Payload: [`TimerInfo`](super::TimerInfo).
    pub const TIMER: EventType = EventType(3);
    /// A key went down. Payload: [`KeyInfo`](super::KeyInfo).
    pub const KEY_DOWN: EventType = EventType(4);
    /// A key went up. Payload: [`KeyInfo`](super::KeyInfo).
    pub const KEY_UP: EventType = EventType(5);
    /// A key was pressed or is repeating. Payload: [`KeyPressInfo`](super::KeyPressInfo).
    pub const KEY_PRESS: EventType = EventType(6);
    /// A mouse button went down. Payload: [`MouseInfo`](super::MouseInfo).
    pub const MOUSE_DOWN: EventType = EventType(7);
    /// A mouse button went up. Payload: [`MouseInfo`](super::MouseInfo).
    pub const MOUSE_UP: EventType = EventType(8);
    /// The pointer moved. Payload: [`MouseInfo`](super::MouseInfo).
    pub const MOUSE_MOVE: EventType = EventType(9);
    /// A network connection was established. Payload: [`NetInfo`](super::NetInfo).
    pub const NET_CONNECT: EventType = EventType(10);
    /// A network connection closed. Payload: [`NetInfo`](super::NetInfo).
    pub const NET_DISCONNECT: EventType = EventType(11);
    /// Data arrived on a connection. Payload: [`NetInfo`](super::NetInfo).
    pub const NET_DATA: EventType = EventType(12);
    /// A connection failed. Payload: [`NetInfo`](super::NetInfo).
    pub const NET_ERROR: EventType = EventType(13);
    /// Something happened to a playing sound. Payload: [`SoundEventInfo`](super::SoundEventInfo).
    pub const SOUND_EVENT: EventType = EventType(14);
    /// A graphics port was resized. Payload: [`PortResizeInfo`](super::PortResizeInfo).
    pub const PORT_RESIZED: EventType = EventType(15);
    /// Scroll wheel or scroll gesture. Payload: [`ScrollWheelInfo`](super::ScrollWheelInfo).
    pub const SCROLL_WHEEL: EventType = EventType(16);
    /// A sprite's animation changed state.
    pub const SPRITE_ANIMATE: EventType = EventType(17);
    /// A sprite layer changed state.
    pub const SPRITE_LAYER: EventType = EventType(18);
    /// The user touched or clicked a sprite.
    pub const SPRITE_TOUCH: EventType = EventType(19);
    /// A sprite collided with something.
    pub const SPRITE_COLLIDE: EventType = EventType(20);
    /// A joint on a sprite broke apart.
    pub const SPRITE_BREAK: EventType = EventType(21);
    /// The pointer entered a tracking area. Payload: [`MouseInfo`](super::MouseInfo).
    pub const MOUSE_ENTER: EventType = EventType(22);
    /// The pointer left a tracking area. Payload: [`MouseInfo`](super::MouseInfo).
    pub const MOUSE_LEAVE: EventType = EventType(23);
    /// The main port wants to be redrawn. Payload: [`PortDrawInfo`](super::PortDrawInfo).
    pub const PORT_DRAW: EventType = EventType(24);

    /// First code available to applications.
    pub const FIRST_APPLICATION: i32 = 1000;

    /// Returns the `n`th application-defined event type.
    pub const fn application(n: i32) -> EventType {
        EventType(Self::FIRST_APPLICATION + n)
    }

    /// Returns `true` for the wildcard key.
    #[inline]
    pub const fn is_wildcard(self) -> bool {
        self.0 == Self::ALL.0
    }

    /// Returns `true` for application-defined codes.
    #[inline]
    pub const fn is_application(self) -> bool {
        self.0 >= Self::FIRST_APPLICATION
    }

    /// Events fired so often that an unhandled one is not worth reporting.
    pub fn is_noisy(self) -> bool {
        matches!(
            self,
            EventType::MOUSE_MOVE | EventType::KEY_UP | EventType::SPRITE_LAYER | EventType::PORT_DRAW
        )
    }

    /// Display name of a framework code.
    pub fn name(self) -> &'static str {
        match self {
            EventType::ALL => "ALL EVENTS",
            EventType::STARTUP => "eventType_Startup",
            EventType::SHUTDOWN => "eventType_Shutdown",
            EventType::TIMER => "eventType_Timer",
            EventType::KEY_DOWN => "eventType_KeyDown",
            EventType::KEY_UP => "eventType_KeyUp",
            EventType::KEY_PRESS => "eventType_KeyPress",
            EventType::MOUSE_DOWN => "eventType_MouseDown",
            EventType::MOUSE_UP => "eventType_MouseUp",
            EventType::MOUSE_MOVE => "eventType_MouseMove",
            EventType::NET_CONNECT => "eventType_NetConnect",
            EventType::NET_DISCONNECT => "eventType_NetDisconnect",
            EventType::NET_DATA => "eventType_NetData",
            EventType::NET_ERROR => "eventType_NetError",
            EventType::SOUND_EVENT => "eventType_SoundEvent",
            EventType::PORT_RESIZED => "eventType_PortResized",
            EventType::SCROLL_WHEEL => "eventType_ScrollWheel",
            EventType::SPRITE_ANIMATE => "eventType_SpriteAnimate",
            EventType::SPRITE_LAYER => "eventType_SpriteLayer",
            EventType::SPRITE_TOUCH => "eventType_SpriteTouch",
            EventType::SPRITE_COLLIDE => "eventType_SpriteCollide",
            EventType::SPRITE_BREAK => "eventType_SpriteBreak",
            EventType::MOUSE_ENTER => "eventType_MouseEnter",
            EventType::MOUSE_LEAVE => "eventType_MouseLeave",
            EventType::PORT_DRAW => "eventType_PortDraw",
            _ if self.is_application() => "application event",
            _ => "** UNKNOWN EVENT TYPE **",
        }
    }
}

impl From<i32> for EventType {
    fn from(code: i32) -> Self {
        EventType(code)
    }
}

impl From<EventType> for i32 {
    fn from(event_type: EventType) -> Self {
        event_type.0
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}][{}]", self.0, self.name())
    }
}

/// Platform-independent key codes reported in [`KeyPressInfo::unicode`](super::KeyPressInfo).
///
/// Platform layers map their native codes onto these values.
pub mod keys {
    #![allow(missing_docs)]

    pub const BREAK: u16 = 1;
    pub const HOME: u16 = 2;
    pub const END: u16 = 3;
    pub const CLEAR: u16 = 4;
    pub const HELP: u16 = 5;
    pub const PAUSE: u16 = 6;
    pub const MUTE: u16 = 7;
    pub const BACKSPACE: u16 = 8;
    pub const TAB: u16 = 9;
    pub const PAGE_UP: u16 = 11;
    pub const PAGE_DOWN: u16 = 12;
    pub const RETURN: u16 = 13;
    pub const ENTER: u16 = RETURN;
    pub const F1: u16 = 14;
    pub const F2: u16 = 15;
    pub const F3: u16 = 16;
    pub const F4: u16 = 17;
    pub const F5: u16 = 18;
    pub const F6: u16 = 19;
    pub const F7: u16 = 20;
    pub const F8: u16 = 21;
    pub const F9: u16 = 22;
    pub const F10: u16 = 23;
    pub const F11: u16 = 24;
    pub const F12: u16 = 25;
    pub const FIRST_F: u16 = F1;
    pub const LAST_F: u16 = F12;
    pub const INSERT: u16 = 26;
    pub const ESCAPE: u16 = 27;
    pub const LEFT_ARROW: u16 = 28;
    pub const RIGHT_ARROW: u16 = 29;
    pub const UP_ARROW: u16 = 30;
    pub const DOWN_ARROW: u16 = 31;
    pub const FIRST_PRINTABLE: u16 = 32;
    pub const DELETE: u16 = 127;
}
